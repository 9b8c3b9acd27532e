//! Fault-isolated, synchronous multi-listener dispatch.
//!
//! [`Broadcast`] backs both per-property change listeners and the registry-wide
//! created/changed listeners.
//!
//! # Mental model
//!
//! * The subscriber list is an immutable `Vec` published through an [`ArcSwap`].
//! * `subscribe` / `unsubscribe` build a replacement list and publish it with RCU.
//! * `dispatch` pins the current list and walks it on the calling thread.
//!
//! # Invariants
//!
//! * Listeners run in subscription order, each at most once per dispatch.
//! * A listener that panics is logged and skipped; the panic never reaches the caller
//!   of `dispatch` and later listeners still run.
//! * A subscription made or removed while a dispatch is in flight may or may not be
//!   seen by that dispatch, but the pinned list is never torn.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

#[cfg(test)]
mod tests;

/// Handle returned by [`Broadcast::subscribe`]; the only way to remove a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Subscriber<E> {
	id: SubscriptionId,
	listener: Listener<E>,
}

impl<E> Clone for Subscriber<E> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			listener: Arc::clone(&self.listener),
		}
	}
}

/// Multi-listener dispatcher for events of type `E`.
pub struct Broadcast<E> {
	subscribers: ArcSwap<Vec<Subscriber<E>>>,
	next_id: AtomicU64,
}

impl<E> Broadcast<E> {
	/// Creates a dispatcher with no subscribers.
	pub fn new() -> Self {
		Self {
			subscribers: ArcSwap::from_pointee(Vec::new()),
			next_id: AtomicU64::new(1),
		}
	}

	/// Appends `listener` to the dispatch order.
	pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
	where
		F: Fn(&E) + Send + Sync + 'static,
	{
		let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
		let subscriber = Subscriber {
			id,
			listener: Arc::new(listener),
		};
		self.subscribers.rcu(|current| {
			let mut next = Vec::with_capacity(current.len() + 1);
			next.extend(current.iter().cloned());
			next.push(subscriber.clone());
			next
		});
		id
	}

	/// Removes the listener registered under `id`.
	///
	/// Returns `false` if `id` was never issued by this dispatcher or is already removed.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let previous = self.subscribers.rcu(|current| {
			current
				.iter()
				.filter(|subscriber| subscriber.id != id)
				.cloned()
				.collect::<Vec<_>>()
		});
		previous.iter().any(|subscriber| subscriber.id == id)
	}

	/// Invokes every current listener with `event`, in subscription order.
	pub fn dispatch(&self, event: &E) {
		let subscribers = self.subscribers.load_full();
		for subscriber in subscribers.iter() {
			let outcome = panic::catch_unwind(AssertUnwindSafe(|| (subscriber.listener)(event)));
			if let Err(payload) = outcome {
				tracing::warn!(
					subscription = %subscriber.id,
					panic = panic_message(&*payload),
					"listener panicked; continuing dispatch",
				);
			}
		}
	}

	/// Number of current subscribers.
	pub fn len(&self) -> usize {
		self.subscribers.load().len()
	}

	/// Returns `true` if nobody is subscribed.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<E> Default for Broadcast<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> fmt::Debug for Broadcast<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let ids: Vec<SubscriptionId> = self.subscribers.load().iter().map(|s| s.id).collect();
		f.debug_struct("Broadcast").field("subscribers", &ids).finish()
	}
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		message
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.as_str()
	} else {
		"<non-string panic payload>"
	}
}
