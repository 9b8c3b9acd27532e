//! The resolution registry: sources in, live typed properties out.
//!
//! # Mental model
//!
//! * A [`DynamicConfig`] holds an ordered list of sources; index 0 has the highest
//!   precedence.
//! * The first request for a `(value type, name)` pair builds one
//!   [`PropertyChain`] with a slot per source, registers each slot's
//!   [`SlotHandle::set`] as that source's change callback, and binds the chain's output
//!   to a fresh [`DynamicProperty`]. Later requests get the same `Arc`.
//! * Registry listeners see one [`ConfigEventKind::Created`] event per property and one
//!   [`ConfigEventKind::Changed`] event per resolved-value change.
//!
//! # Invariants
//!
//! * At most one chain and property exist per cache key for the registry's lifetime.
//!   Entries are never evicted.
//! * Requests with the same key but a different default or parser get the cached
//!   property unchanged; the first request's default and parser win.
//! * For one property, `Created` is dispatched before any `Changed`, and `Changed` is
//!   dispatched after the property's own listeners ran.
//! * A panic while building a property leaves its key empty, so the next request
//!   retries.
//!
//! # Concurrency & ordering
//!
//! * Construction of one key is single-winner: concurrent first requests block until
//!   the winner has wired the chain and read every source, then share its property.
//!   Different keys build in parallel.
//! * The winner binds the chain and dispatches `Created` after the key is cached, so
//!   registry listeners may request any property, including the one being created.
//!   A concurrent requester may receive the property before `Created` is dispatched.
//! * Deliveries for one property follow the chain's queue: a listener that writes to a
//!   source feeding the same property sees its value delivered after every listener
//!   and the registry have observed the current one.
//! * There is no ordering between events of different properties.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use indexmap::IndexSet;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::broadcast::{Broadcast, SubscriptionId};
use crate::chain::PropertyChain;
use crate::parse::{
	BoolParser, ConfigEnum, EnumParser, IntParser, ListParser, LongParser, OptionalParser, PropertyParser, SetParser,
	StringParser,
};
use crate::property::{DynamicProperty, PropertyValue};
use crate::source::{ChangeCallback, ConfigSource, DynamicConfigSource, StaticSourceAdapter};

mod event;

pub use event::{ConfigEvent, ConfigEventKind, ConfigValue, DynamicConfigListener};


type ErasedProperty = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
	value_type: TypeId,
	name: Box<str>,
}

impl CacheKey {
	fn of<T: 'static>(name: &str) -> Self {
		Self {
			value_type: TypeId::of::<T>(),
			name: name.into(),
		}
	}
}

/// A hierarchical set of configuration sources resolved into live properties.
///
/// Each property is resolved by asking every source in turn; the first source that
/// holds a parsable value wins, and the property's default applies when none does.
/// Properties are cached per `(value type, name)` and follow source changes for the
/// lifetime of the registry.
pub struct DynamicConfig {
	sources: Vec<Arc<dyn DynamicConfigSource>>,
	cache: Mutex<FxHashMap<CacheKey, Arc<OnceLock<ErasedProperty>>>>,
	events: Arc<Broadcast<ConfigEvent>>,
}

impl DynamicConfig {
	/// Creates a registry over `sources`, highest precedence first.
	pub fn new(sources: Vec<Arc<dyn DynamicConfigSource>>) -> Self {
		Self {
			sources,
			cache: Mutex::new(FxHashMap::default()),
			events: Arc::new(Broadcast::new()),
		}
	}

	/// Starts an empty [`DynamicConfigBuilder`].
	pub fn builder() -> DynamicConfigBuilder {
		DynamicConfigBuilder::default()
	}

	/// Creates a registry over the sources of `first` followed by those of `second`.
	///
	/// The result has its own empty cache and no listeners.
	pub fn merged(first: &DynamicConfig, second: &DynamicConfig) -> Self {
		let sources = first.sources.iter().chain(&second.sources).cloned().collect();
		Self::new(sources)
	}

	/// The sources of this registry, highest precedence first.
	pub fn sources(&self) -> &[Arc<dyn DynamicConfigSource>] {
		&self.sources
	}

	/// Number of properties built so far.
	pub fn cached_property_count(&self) -> usize {
		self.cache.lock().values().filter(|cell| cell.get().is_some()).count()
	}

	/// Returns the property named `name` with value type `T`, building and binding it on
	/// first request.
	pub fn get_property<T, P>(&self, name: &str, default: T, parser: P) -> Arc<DynamicProperty<T>>
	where
		T: PropertyValue,
		P: PropertyParser<Output = T>,
	{
		let key = CacheKey::of::<T>(name);
		let cell = Arc::clone(self.cache.lock().entry(key).or_default());
		let mut unbound = None;
		let erased = cell.get_or_init(|| {
			let (property, chain) = self.wire_property(name, default, parser);
			let erased: ErasedProperty = Arc::clone(&property) as ErasedProperty;
			unbound = Some((property, chain));
			erased
		});
		if let Some((property, chain)) = unbound {
			self.bind_property(name, &property, chain);
			return property;
		}
		match Arc::clone(erased).downcast::<DynamicProperty<T>>() {
			Ok(property) => property,
			Err(_) => unreachable!("cache key for '{name}' does not match its property type"),
		}
	}

	/// Builds the chain with one slot per source and reads every initial value.
	fn wire_property<T, P>(&self, name: &str, default: T, parser: P) -> (Arc<DynamicProperty<T>>, PropertyChain<T>)
	where
		T: PropertyValue,
		P: PropertyParser<Output = T>,
	{
		tracing::debug!(
			property = name,
			value_type = std::any::type_name::<T>(),
			sources = self.sources.len(),
			"binding property",
		);

		let chain = PropertyChain::named(name, default, parser);
		for source in &self.sources {
			let slot = chain.append_slot();
			let on_change = slot.clone();
			let callback: ChangeCallback = Arc::new(move |raw: Option<&str>| on_change.set(raw));
			let raw = source.get(name, callback);
			slot.set(raw.as_deref());
		}

		let property = Arc::new(DynamicProperty::new(chain.resolved()));
		(property, chain)
	}

	/// Connects the chain's output to `property` and the registry listeners.
	///
	/// The first delivery announces the property as `Created`; every later one is a
	/// `Changed`.
	fn bind_property<T: PropertyValue>(&self, name: &str, property: &Arc<DynamicProperty<T>>, chain: PropertyChain<T>) {
		let name: Arc<str> = Arc::from(name);
		let target = Arc::clone(property);
		let events = Arc::clone(&self.events);
		let created = AtomicBool::new(false);
		chain.bind(move |value: &T| {
			let kind = if created.swap(true, Ordering::AcqRel) {
				target.set(value.clone());
				ConfigEventKind::Changed
			} else {
				if *target.load() != *value {
					target.set(value.clone());
				}
				ConfigEventKind::Created
			};
			events.dispatch(&ConfigEvent::new(kind, &name, value.clone()));
		});
	}

	/// Registers `listener` for every created and changed event.
	pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
	where
		F: Fn(&ConfigEvent) + Send + Sync + 'static,
	{
		self.events.subscribe(listener)
	}

	/// Registers a [`DynamicConfigListener`].
	pub fn add_listener<L: DynamicConfigListener>(&self, listener: L) -> SubscriptionId {
		self.subscribe(move |event: &ConfigEvent| match event.kind {
			ConfigEventKind::Created => listener.property_created(&event.name, &*event.value),
			ConfigEventKind::Changed => listener.property_changed(&event.name, &*event.value),
		})
	}

	/// Removes a registry listener.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.events.unsubscribe(id)
	}

	/// A string property; any raw value parses.
	pub fn string_property(&self, name: &str, default: impl Into<String>) -> Arc<DynamicProperty<String>> {
		self.get_property(name, default.into(), StringParser)
	}

	/// A string property that is `None` when no source holds a value.
	pub fn optional_string_property(&self, name: &str) -> Arc<DynamicProperty<Option<String>>> {
		self.get_property(name, None, OptionalParser(StringParser))
	}

	/// A boolean property accepting `true` or `false`, ignoring case.
	pub fn bool_property(&self, name: &str, default: bool) -> Arc<DynamicProperty<bool>> {
		self.get_property(name, default, BoolParser)
	}

	/// A 32-bit integer property.
	pub fn int_property(&self, name: &str, default: i32) -> Arc<DynamicProperty<i32>> {
		self.get_property(name, default, IntParser)
	}

	/// A 32-bit integer property that is `None` when no source holds a parsable value.
	pub fn optional_int_property(&self, name: &str) -> Arc<DynamicProperty<Option<i32>>> {
		self.get_property(name, None, OptionalParser(IntParser))
	}

	/// A 64-bit integer property.
	pub fn long_property(&self, name: &str, default: i64) -> Arc<DynamicProperty<i64>> {
		self.get_property(name, default, LongParser)
	}

	/// A 64-bit integer property that is `None` when no source holds a parsable value.
	pub fn optional_long_property(&self, name: &str) -> Arc<DynamicProperty<Option<i64>>> {
		self.get_property(name, None, OptionalParser(LongParser))
	}

	/// An enum property matched case-insensitively by variant name.
	pub fn enum_property<E>(&self, name: &str, default: E) -> Arc<DynamicProperty<E>>
	where
		E: ConfigEnum + PropertyValue,
	{
		self.get_property(name, default, EnumParser::new())
	}

	/// An enum property that is `None` when no source holds a known variant.
	pub fn optional_enum_property<E>(&self, name: &str) -> Arc<DynamicProperty<Option<E>>>
	where
		E: ConfigEnum + PropertyValue,
	{
		self.get_property(name, None, OptionalParser(EnumParser::new()))
	}

	/// A comma-separated list of trimmed strings.
	pub fn string_list_property(&self, name: &str, default: Vec<String>) -> Arc<DynamicProperty<Vec<String>>> {
		self.get_property(name, default, ListParser::new(StringParser))
	}

	/// A comma-separated list of 32-bit integers.
	pub fn int_list_property(&self, name: &str, default: Vec<i32>) -> Arc<DynamicProperty<Vec<i32>>> {
		self.get_property(name, default, ListParser::new(IntParser))
	}

	/// A comma-separated list of 64-bit integers.
	pub fn long_list_property(&self, name: &str, default: Vec<i64>) -> Arc<DynamicProperty<Vec<i64>>> {
		self.get_property(name, default, ListParser::new(LongParser))
	}

	/// A comma-separated list of booleans.
	pub fn bool_list_property(&self, name: &str, default: Vec<bool>) -> Arc<DynamicProperty<Vec<bool>>> {
		self.get_property(name, default, ListParser::new(BoolParser))
	}

	/// A comma-separated list of enum variants, duplicates kept.
	pub fn enum_list_property<E>(&self, name: &str, default: Vec<E>) -> Arc<DynamicProperty<Vec<E>>>
	where
		E: ConfigEnum + PropertyValue,
	{
		self.get_property(name, default, ListParser::new(EnumParser::new()))
	}

	/// Like [`enum_list_property`](Self::enum_list_property), keeping the first
	/// occurrence of each variant.
	pub fn enum_set_property<E>(&self, name: &str, default: IndexSet<E>) -> Arc<DynamicProperty<IndexSet<E>>>
	where
		E: ConfigEnum + PropertyValue + Eq + Hash,
	{
		self.get_property(name, default, SetParser::new(EnumParser::new()))
	}
}

impl fmt::Debug for DynamicConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DynamicConfig")
			.field("sources", &self.sources)
			.field("cached_properties", &self.cached_property_count())
			.finish()
	}
}

/// Collects sources for a [`DynamicConfig`], highest precedence first.
#[derive(Default)]
pub struct DynamicConfigBuilder {
	sources: Vec<Arc<dyn DynamicConfigSource>>,
}

impl DynamicConfigBuilder {
	/// Appends a source that reports changes.
	pub fn with_source<S: DynamicConfigSource + 'static>(mut self, source: Arc<S>) -> Self {
		self.sources.push(source);
		self
	}

	/// Appends a source that is read once per property and never reports changes.
	pub fn with_static_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Arc::new(StaticSourceAdapter::new(source)));
		self
	}

	/// Creates the registry over the collected sources.
	pub fn build(self) -> DynamicConfig {
		DynamicConfig::new(self.sources)
	}
}

impl fmt::Debug for DynamicConfigBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DynamicConfigBuilder").field("sources", &self.sources).finish()
	}
}
