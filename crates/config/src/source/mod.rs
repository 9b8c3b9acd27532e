//! Configuration sources: where raw property strings come from.
//!
//! A [`DynamicConfig`](crate::DynamicConfig) reads every property through the
//! [`DynamicConfigSource`] capability, which pairs the lookup with a change callback
//! the source keeps for its own lifetime. Sources that never change implement the
//! simpler [`ConfigSource`] and are lifted with [`StaticSourceAdapter`].

use std::fmt;
use std::sync::Arc;

use crate::parse::PropertyParser;
use crate::setting::Setting;

mod env;
mod map;

pub use env::EnvConfigSource;
pub use map::MapConfigSource;

/// Callback a dynamic source invokes with the new raw value of one property.
///
/// `None` means the property was removed from the source.
pub type ChangeCallback = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// A plain name to string lookup.
pub trait ConfigSource: fmt::Debug + Send + Sync {
	/// Returns the raw value of `name`, if the source defines it.
	fn get(&self, name: &str) -> Option<String>;
}

/// A source that can report later changes to the properties it was asked for.
pub trait DynamicConfigSource: fmt::Debug + Send + Sync {
	/// Returns the current raw value of `name` and retains `on_change`, to be invoked
	/// on any thread whenever that value changes.
	fn get(&self, name: &str, on_change: ChangeCallback) -> Option<String>;
}

/// Lifts a [`ConfigSource`] into a [`DynamicConfigSource`] that never reports changes.
pub struct StaticSourceAdapter<S> {
	source: S,
}

impl<S: ConfigSource> StaticSourceAdapter<S> {
	/// Wraps `source`.
	pub fn new(source: S) -> Self {
		Self { source }
	}

	/// Returns the wrapped source.
	pub fn inner(&self) -> &S {
		&self.source
	}
}

impl<S: ConfigSource> DynamicConfigSource for StaticSourceAdapter<S> {
	fn get(&self, name: &str, _on_change: ChangeCallback) -> Option<String> {
		self.source.get(name)
	}
}

impl<S: fmt::Debug> fmt::Debug for StaticSourceAdapter<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.source.fmt(f)
	}
}

/// A source whose values can be written programmatically, mostly from tests.
pub trait MutableConfigSource {
	/// Sets `name` to `value`, or removes it when `value` is `None`, and notifies every
	/// callback registered for `name`.
	fn set(&self, name: &str, value: Option<&str>);

	/// Removes `name`.
	fn clear(&self, name: &str) {
		self.set(name, None);
	}

	/// Writes a typed value for `setting`, rendered in its parser's grammar.
	fn set_setting<P: PropertyParser>(&self, setting: &Setting<P>, value: Option<P::Output>) {
		let raw = value.map(|value| setting.parser().render(&value));
		self.set(setting.name(), raw.as_deref());
	}
}
