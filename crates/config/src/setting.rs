//! Named, typed property descriptors.
//!
//! A [`Setting`] keeps a property's name, default and parser together, so call sites
//! that read the property and tests that write it cannot drift apart:
//!
//! ```ignore
//! const POOL_SIZE: IntSetting = Setting::int("pool.size", 4);
//!
//! let size = POOL_SIZE.get_from(&config);
//! source.set_setting(&POOL_SIZE, Some(8));
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::config::DynamicConfig;
use crate::parse::{BoolParser, ConfigEnum, EnumParser, IntParser, LongParser, PropertyParser, StringParser};
use crate::property::{DynamicProperty, PropertyValue};

/// A property name bound to its default value and parser.
#[derive(Debug, Clone)]
pub struct Setting<P: PropertyParser> {
	name: Cow<'static, str>,
	default: P::Output,
	parser: P,
}

/// A string-valued [`Setting`].
pub type StringSetting = Setting<StringParser>;
/// A boolean [`Setting`].
pub type BoolSetting = Setting<BoolParser>;
/// A 32-bit integer [`Setting`].
pub type IntSetting = Setting<IntParser>;
/// A 64-bit integer [`Setting`].
pub type LongSetting = Setting<LongParser>;
/// An enum-valued [`Setting`].
pub type EnumSetting<E> = Setting<EnumParser<E>>;

impl<P: PropertyParser> Setting<P> {
	/// Binds `name` to `default` and `parser`.
	pub fn new(name: impl Into<Cow<'static, str>>, default: P::Output, parser: P) -> Self {
		Self {
			name: name.into(),
			default,
			parser,
		}
	}

	/// Property name looked up in each source.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Value used when no source holds a parsable one.
	pub fn default_value(&self) -> &P::Output {
		&self.default
	}

	/// Parser applied to raw source values.
	pub fn parser(&self) -> &P {
		&self.parser
	}
}

impl<P> Setting<P>
where
	P: PropertyParser + Clone,
	P::Output: PropertyValue,
{
	/// Returns the live property for this setting from `config`.
	pub fn get_from(&self, config: &DynamicConfig) -> Arc<DynamicProperty<P::Output>> {
		config.get_property(&self.name, self.default.clone(), self.parser.clone())
	}
}

impl Setting<StringParser> {
	/// A string setting.
	pub const fn string(name: &'static str, default: String) -> Self {
		Self {
			name: Cow::Borrowed(name),
			default,
			parser: StringParser,
		}
	}
}

impl Setting<BoolParser> {
	/// A boolean setting.
	pub const fn bool(name: &'static str, default: bool) -> Self {
		Self {
			name: Cow::Borrowed(name),
			default,
			parser: BoolParser,
		}
	}
}

impl Setting<IntParser> {
	/// A 32-bit integer setting.
	pub const fn int(name: &'static str, default: i32) -> Self {
		Self {
			name: Cow::Borrowed(name),
			default,
			parser: IntParser,
		}
	}
}

impl Setting<LongParser> {
	/// A 64-bit integer setting.
	pub const fn long(name: &'static str, default: i64) -> Self {
		Self {
			name: Cow::Borrowed(name),
			default,
			parser: LongParser,
		}
	}
}

impl<E: ConfigEnum> Setting<EnumParser<E>> {
	/// An enum setting, matched case-insensitively by variant name.
	pub const fn enumeration(name: &'static str, default: E) -> Self {
		Self {
			name: Cow::Borrowed(name),
			default,
			parser: EnumParser::new(),
		}
	}
}
