//! Observable typed property cells.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::broadcast::{Broadcast, SubscriptionId};

#[cfg(test)]
mod tests;

/// Bounds shared by every property value type.
pub trait PropertyValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> PropertyValue for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

/// A live-updating configuration value.
///
/// Properties handed out by [`DynamicConfig`](crate::DynamicConfig) are bound to a
/// [`PropertyChain`](crate::chain::PropertyChain) and follow its resolved value. Reads
/// are lock-free and always see the most recently published value.
///
/// Listeners run synchronously on the thread that changed the value, so a reader on
/// that thread observes the new value as soon as the producing `set` returns. Keep
/// listener work short.
pub struct DynamicProperty<T> {
	value: ArcSwap<T>,
	listeners: Broadcast<T>,
}

impl<T: PropertyValue> DynamicProperty<T> {
	/// Creates an unbound property holding `initial`.
	pub fn new(initial: T) -> Self {
		Self {
			value: ArcSwap::from_pointee(initial),
			listeners: Broadcast::new(),
		}
	}

	/// Returns a copy of the current value.
	pub fn get(&self) -> T {
		T::clone(&self.value.load())
	}

	/// Returns the current value without cloning it.
	pub fn load(&self) -> Arc<T> {
		self.value.load_full()
	}

	/// Publishes `value` and notifies every listener.
	///
	/// There is no equality check here: deduplication happens in the chain a bound
	/// property is fed by.
	pub fn set(&self, value: T) {
		let value = Arc::new(value);
		self.value.store(Arc::clone(&value));
		self.listeners.dispatch(&value);
	}

	/// Registers `listener` for every subsequent value change.
	pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		self.listeners.subscribe(listener)
	}

	/// Stops delivering changes to the listener registered under `id`.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.listeners.unsubscribe(id)
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}
}

impl<T: PropertyValue> DynamicProperty<Option<T>> {
	/// Returns `true` if the property currently resolves to a value.
	pub fn is_present(&self) -> bool {
		self.value.load().is_some()
	}
}

impl<T: PropertyValue + Default> Default for DynamicProperty<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: fmt::Debug> fmt::Debug for DynamicProperty<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DynamicProperty")
			.field("value", &**self.value.load())
			.field("listeners", &self.listeners.len())
			.finish()
	}
}
