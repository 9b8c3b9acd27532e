//! In-memory, writable configuration source.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use super::{ChangeCallback, ConfigSource, DynamicConfigSource, MutableConfigSource};

/// One property's value plus the callbacks registered for it.
#[derive(Default)]
struct ListenableValue {
	value: ArcSwapOption<String>,
	callbacks: Mutex<Vec<ChangeCallback>>,
}

impl ListenableValue {
	fn set(&self, value: Option<&str>) {
		self.value.store(value.map(|value| Arc::new(value.to_owned())));
		let callbacks = self.callbacks.lock().clone();
		for callback in &callbacks {
			callback(value);
		}
	}

	fn current(&self) -> Option<String> {
		self.value.load_full().map(|value| String::clone(&value))
	}
}

/// Map backed [`DynamicConfigSource`], mostly used to drive configuration in tests.
///
/// Callbacks run on the thread calling [`set`](MutableConfigSource::set), after the new
/// value is stored, in the order they were registered. No internal lock is held while
/// they run, so a callback may read or write this source.
#[derive(Default)]
pub struct MapConfigSource {
	entries: RwLock<FxHashMap<String, Arc<ListenableValue>>>,
}

impl MapConfigSource {
	/// Creates an empty source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a source holding the given `(name, value)` pairs.
	pub fn of<K, V, I>(entries: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: ToString,
	{
		let source = Self::new();
		for (name, value) in entries {
			source.set(name.as_ref(), Some(&value.to_string()));
		}
		source
	}

	/// Copies every value of `other` into this source, notifying as [`set`] does.
	///
	/// [`set`]: MutableConfigSource::set
	pub fn set_all(&self, other: &MapConfigSource) {
		let snapshot: Vec<(String, Option<String>)> = other
			.entries
			.read()
			.iter()
			.map(|(name, entry)| (name.clone(), entry.current()))
			.collect();
		for (name, value) in snapshot {
			self.set(&name, value.as_deref());
		}
	}

	/// Returns the current value of `name`.
	pub fn value(&self, name: &str) -> Option<String> {
		self.entries.read().get(name).and_then(|entry| entry.current())
	}

	fn entry(&self, name: &str) -> Arc<ListenableValue> {
		if let Some(entry) = self.entries.read().get(name) {
			return Arc::clone(entry);
		}
		Arc::clone(self.entries.write().entry(name.to_owned()).or_default())
	}
}

impl MutableConfigSource for MapConfigSource {
	fn set(&self, name: &str, value: Option<&str>) {
		self.entry(name).set(value);
	}
}

impl ConfigSource for MapConfigSource {
	fn get(&self, name: &str) -> Option<String> {
		self.value(name)
	}
}

impl DynamicConfigSource for MapConfigSource {
	fn get(&self, name: &str, on_change: ChangeCallback) -> Option<String> {
		let entry = self.entry(name);
		entry.callbacks.lock().push(on_change);
		entry.current()
	}
}

impl<K: AsRef<str>, V: ToString> FromIterator<(K, V)> for MapConfigSource {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self::of(iter)
	}
}

impl fmt::Debug for MapConfigSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let entries = self.entries.read();
		let mut names: Vec<&String> = entries.keys().collect();
		names.sort();
		let mut map = f.debug_map();
		for name in names {
			map.entry(name, &entries[name].current());
		}
		map.finish()
	}
}
