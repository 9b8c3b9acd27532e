//! Registry-wide property events.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased property value carried by a [`ConfigEvent`].
pub trait ConfigValue: Any + fmt::Debug + Send + Sync {
	/// Upcasts to `Any` for downcasting.
	fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> ConfigValue for T {
	fn as_any(&self) -> &dyn Any {
		self
	}
}

impl dyn ConfigValue {
	/// Returns the value as a `T`, if that is its concrete type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.as_any().downcast_ref()
	}
}

/// What happened to a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigEventKind {
	/// First request for a property; carries the initially resolved value.
	Created,
	/// The resolved value changed; carries the new value.
	Changed,
}

/// A property creation or change observed by a [`DynamicConfig`](crate::DynamicConfig).
#[derive(Debug, Clone)]
pub struct ConfigEvent {
	/// Whether the property was just created or changed.
	pub kind: ConfigEventKind,
	/// Property name as requested.
	pub name: Arc<str>,
	/// The property's resolved value after the event.
	pub value: Arc<dyn ConfigValue>,
}

impl ConfigEvent {
	pub(crate) fn new<T: ConfigValue>(kind: ConfigEventKind, name: &Arc<str>, value: T) -> Self {
		Self {
			kind,
			name: Arc::clone(name),
			value: Arc::new(value),
		}
	}

	/// Returns the carried value as a `T`, if that is the property's value type.
	pub fn value_as<T: Any>(&self) -> Option<&T> {
		(*self.value).downcast_ref()
	}
}

/// Callback interface for registry-wide events.
///
/// Both methods default to doing nothing, so implementors override only what they need.
pub trait DynamicConfigListener: Send + Sync + 'static {
	/// Called once when a property is first built, with its initial value.
	fn property_created(&self, _name: &str, _value: &dyn ConfigValue) {}

	/// Called after each change of a property's resolved value.
	fn property_changed(&self, _name: &str, _value: &dyn ConfigValue) {}
}
