//! Precedence resolution across configuration sources.
//!
//! # Purpose
//!
//! A [`PropertyChain`] combines one slot per configuration source into a single
//! resolved value, falling back to a default, and reports each change of that value
//! to one output listener.
//!
//! # Invariants
//!
//! * Resolved value = parsed value of the lowest-indexed slot that holds a present,
//!   parsable raw value; otherwise the default.
//! * A raw value that fails to parse counts as absent. Parse errors never leave the
//!   chain.
//! * The output listener is invoked on `bind` with the current resolution, and after
//!   that only when the resolved value differs (by `PartialEq`) from the last value
//!   queued for it.
//!
//! # Concurrency & ordering
//!
//! * Slot updates and recomputation happen under a short lock that is never held
//!   while the output listener runs.
//! * Changed resolutions are appended to a per-chain delivery queue in the order the
//!   updates were applied. One caller at a time drains the queue; a caller that finds
//!   a drain in progress only enqueues and returns. Deliveries therefore never overlap
//!   and never reorder.
//! * A listener that pushes into its own chain has its value delivered after the
//!   current delivery completes, on the same thread.
//! * A value enqueued while another thread is draining is delivered by that thread.
//!   Without contention every update is delivered on the caller's thread before `set`
//!   returns.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::broadcast::panic_message;
use crate::parse::PropertyParser;
use crate::property::PropertyValue;


type OutputListener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slot<T> {
	raw: Option<String>,
	value: Option<T>,
}

struct ChainState<T> {
	slots: Vec<Slot<T>>,
	output: Option<OutputListener<T>>,
	/// Last value queued for the output listener.
	latest: Option<T>,
	pending: VecDeque<T>,
	draining: bool,
}

impl<T: PropertyValue> ChainState<T> {
	fn resolve<'a>(&'a self, default: &'a T) -> &'a T {
		self.slots
			.iter()
			.find_map(|slot| slot.value.as_ref())
			.unwrap_or(default)
	}

	fn enqueue_if_changed(&mut self, default: &T) {
		if self.output.is_none() {
			return;
		}
		let resolved = self.resolve(default);
		if self.latest.as_ref() == Some(resolved) {
			return;
		}
		let resolved = resolved.clone();
		self.latest = Some(resolved.clone());
		self.pending.push_back(resolved);
	}

	/// Claims the drain role. Returns `None` if there is nothing to deliver or another
	/// caller is already draining.
	fn begin_drain(&mut self) -> Option<OutputListener<T>> {
		if self.draining || self.pending.is_empty() {
			return None;
		}
		let output = self.output.clone()?;
		self.draining = true;
		Some(output)
	}
}

struct ChainInner<T> {
	name: Option<Arc<str>>,
	default: T,
	parser: Arc<dyn PropertyParser<Output = T>>,
	state: Mutex<ChainState<T>>,
}

impl<T> ChainInner<T> {
	fn label(&self) -> &str {
		self.name.as_deref().unwrap_or("<unnamed>")
	}
}

impl<T: PropertyValue> ChainInner<T> {
	/// Delivers queued values until the queue is empty, then releases the drain role.
	fn drain(&self, output: OutputListener<T>) {
		loop {
			let next = {
				let mut state = self.state.lock();
				match state.pending.pop_front() {
					Some(value) => value,
					None => {
						state.draining = false;
						return;
					}
				}
			};
			tracing::trace!(property = self.label(), value = ?next, "delivering resolved value");
			if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| output(&next))) {
				tracing::warn!(
					property = self.label(),
					panic = panic_message(&*payload),
					"output listener panicked; continuing delivery",
				);
			}
		}
	}
}

/// An ordered set of per-source slots resolved against a default.
///
/// Slots are appended highest precedence first. Binding consumes the chain; from then
/// on the only way in is through the [`SlotHandle`]s.
pub struct PropertyChain<T> {
	inner: Arc<ChainInner<T>>,
}

impl<T: PropertyValue> PropertyChain<T> {
	/// Creates an empty chain resolving to `default` until a slot holds a value.
	pub fn new<P>(default: T, parser: P) -> Self
	where
		P: PropertyParser<Output = T>,
	{
		Self::build(None, default, parser)
	}

	/// Like [`new`](Self::new), with `name` attached to log records.
	pub fn named<P>(name: impl Into<Arc<str>>, default: T, parser: P) -> Self
	where
		P: PropertyParser<Output = T>,
	{
		Self::build(Some(name.into()), default, parser)
	}

	fn build<P>(name: Option<Arc<str>>, default: T, parser: P) -> Self
	where
		P: PropertyParser<Output = T>,
	{
		Self {
			inner: Arc::new(ChainInner {
				name,
				default,
				parser: Arc::new(parser),
				state: Mutex::new(ChainState {
					slots: Vec::new(),
					output: None,
					latest: None,
					pending: VecDeque::new(),
					draining: false,
				}),
			}),
		}
	}

	/// Adds a slot below every existing slot.
	pub fn append_slot(&self) -> SlotHandle<T> {
		let mut state = self.inner.state.lock();
		let index = state.slots.len();
		state.slots.push(Slot {
			raw: None,
			value: None,
		});
		SlotHandle {
			chain: Arc::clone(&self.inner),
			index,
		}
	}

	/// Number of slots appended so far.
	pub fn slot_count(&self) -> usize {
		self.inner.state.lock().slots.len()
	}

	/// Returns the value the chain currently resolves to.
	pub fn resolved(&self) -> T {
		self.inner.state.lock().resolve(&self.inner.default).clone()
	}

	/// Installs the output listener and immediately hands it the current resolution.
	pub fn bind<F>(self, listener: F)
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		let output = {
			let mut state = self.inner.state.lock();
			let initial = state.resolve(&self.inner.default).clone();
			state.output = Some(Arc::new(listener));
			state.latest = Some(initial.clone());
			state.pending.push_back(initial);
			state.begin_drain()
		};
		if let Some(output) = output {
			self.inner.drain(output);
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for PropertyChain<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let slots: Vec<Option<String>> = self.inner.state.lock().slots.iter().map(|slot| slot.raw.clone()).collect();
		f.debug_struct("PropertyChain")
			.field("name", &self.inner.label())
			.field("default", &self.inner.default)
			.field("slots", &slots)
			.finish()
	}
}

/// Write access to one slot of a [`PropertyChain`].
///
/// Cloned handles address the same slot.
pub struct SlotHandle<T> {
	chain: Arc<ChainInner<T>>,
	index: usize,
}

impl<T: PropertyValue> SlotHandle<T> {
	/// Replaces this slot's raw value and re-resolves the chain.
	///
	/// `None` clears the slot. An unparsable value also leaves the slot without a
	/// typed value, so lower-precedence slots or the default take over.
	pub fn set(&self, raw: Option<&str>) {
		let value = raw.and_then(|raw| match self.chain.parser.parse(raw) {
			Ok(value) => Some(value),
			Err(error) => {
				tracing::debug!(
					property = self.chain.label(),
					slot = self.index,
					raw,
					%error,
					"ignoring unparsable value",
				);
				None
			}
		});

		let output = {
			let mut state = self.chain.state.lock();
			let slot = &mut state.slots[self.index];
			slot.raw = raw.map(str::to_owned);
			slot.value = value;
			state.enqueue_if_changed(&self.chain.default);
			state.begin_drain()
		};
		if let Some(output) = output {
			self.chain.drain(output);
		}
	}

	/// Position of this slot; 0 is the highest precedence.
	pub fn index(&self) -> usize {
		self.index
	}
}

impl<T> Clone for SlotHandle<T> {
	fn clone(&self) -> Self {
		Self {
			chain: Arc::clone(&self.chain),
			index: self.index,
		}
	}
}

impl<T> fmt::Debug for SlotHandle<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SlotHandle")
			.field("property", &self.chain.label())
			.field("index", &self.index)
			.finish()
	}
}
