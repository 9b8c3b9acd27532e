//! Error types for property value parsing.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors produced when a raw configuration string does not match a property's grammar.
///
/// These never escape a [`PropertyChain`](crate::chain::PropertyChain): a slot whose raw
/// value fails to parse is treated as absent and resolution falls through to the next
/// slot or the default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	/// A boolean value other than `true`/`false` (any case).
	#[error("invalid boolean: '{value}' (expected true or false)")]
	InvalidBool {
		/// The rejected raw value.
		value: String,
	},

	/// A value that is not a decimal integer in range of the target type.
	#[error("invalid integer: '{value}': {source}")]
	InvalidInt {
		/// The rejected raw value.
		value: String,
		/// The underlying integer parse failure.
		source: ParseIntError,
	},

	/// A value that names none of the enum's variants.
	#[error("unknown variant '{value}' (expected one of: {})", expected.join(", "))]
	UnknownVariant {
		/// The rejected raw value.
		value: String,
		/// Variant names accepted by the enum.
		expected: Vec<&'static str>,
	},

	/// One element of a comma-separated collection failed to parse.
	#[error("invalid element {index} in collection: {source}")]
	InvalidElement {
		/// Zero-based position of the element.
		index: usize,
		/// Why the element was rejected.
		source: Box<ParseError>,
	},
}

/// Result type for property parsing.
pub type Result<T> = std::result::Result<T, ParseError>;
