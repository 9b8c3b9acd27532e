//! Layered, live-updating configuration.
//!
//! A [`DynamicConfig`] resolves named properties against an ordered list of sources
//! and hands out [`DynamicProperty`] cells that always hold the current resolved value:
//!
//! - **Precedence**: the first source (in registry order) holding a parsable value wins;
//!   otherwise the property's default applies.
//! - **Live updates**: sources that report changes ([`DynamicConfigSource`]) push new raw
//!   values into the property, and listeners hear about every change of the *resolved*
//!   value, never about changes that leave it as it was.
//! - **One cell per property**: repeated requests for the same name and value type
//!   return the same `Arc`.
//!
//! ```ignore
//! use std::sync::Arc;
//! use mimer_config::{DynamicConfig, EnvConfigSource, MapConfigSource, MutableConfigSource};
//!
//! let overrides = Arc::new(MapConfigSource::new());
//! let config = DynamicConfig::builder()
//!     .with_source(Arc::clone(&overrides))
//!     .with_static_source(EnvConfigSource::new())
//!     .build();
//!
//! let timeout = config.long_property("client.timeout-ms", 500);
//! timeout.subscribe(|ms: &i64| println!("timeout is now {ms}ms"));
//!
//! overrides.set("client.timeout-ms", Some("750"));
//! assert_eq!(timeout.get(), 750);
//! ```
//!
//! # Bad values
//!
//! Resolution never fails. A raw value that does not parse for the property's type is
//! treated as absent, so the next source or the default takes over. The rejected value
//! is logged at `debug`.
//!
//! # Listeners
//!
//! Property and registry listeners run synchronously on the thread that changed the
//! source, unless another thread is already delivering for the same property; that
//! thread then delivers the new value once the current one has reached every listener.
//! A panicking listener is logged at `warn` and skipped; the remaining listeners still
//! run.

pub mod broadcast;
pub mod chain;
pub mod config;
pub mod error;
pub mod parse;
pub mod property;
pub mod setting;
pub mod source;

pub use broadcast::{Broadcast, SubscriptionId};
pub use config::{ConfigEvent, ConfigEventKind, ConfigValue, DynamicConfig, DynamicConfigBuilder, DynamicConfigListener};
pub use error::{ParseError, Result};
pub use parse::{
	BoolParser, CollectionParser, ConfigEnum, EnumParser, IntParser, ListParser, LongParser, OptionalParser,
	PropertyParser, SetParser, StringParser,
};
pub use property::{DynamicProperty, PropertyValue};
pub use setting::{BoolSetting, EnumSetting, IntSetting, LongSetting, Setting, StringSetting};
pub use source::{
	ChangeCallback, ConfigSource, DynamicConfigSource, EnvConfigSource, MapConfigSource, MutableConfigSource,
	StaticSourceAdapter,
};
