//! String parsers for typed property values.
//!
//! A [`PropertyParser`] turns the raw string a configuration source returns into the
//! value type of a [`DynamicProperty`](crate::DynamicProperty), and renders values back
//! into that grammar for sources that accept typed writes (see
//! [`MutableConfigSource`](crate::source::MutableConfigSource)).
//!
//! Scalar grammars:
//!
//! | Parser | Output | Accepts |
//! |---|---|---|
//! | [`StringParser`] | `String` | anything, verbatim |
//! | [`BoolParser`] | `bool` | `true` / `false`, any case |
//! | [`IntParser`] | `i32` | decimal integers |
//! | [`LongParser`] | `i64` | decimal integers |
//! | [`EnumParser`] | `E: ConfigEnum` | a variant name, any case |
//!
//! Collections are handled by one [`CollectionParser`], parametrized by the element
//! parser and the target container. Elements are comma separated and trimmed; a blank
//! input is the empty collection; one bad element rejects the whole value.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexSet;
use strum::VariantArray;

use crate::error::{ParseError, Result};

#[cfg(test)]
mod tests;

/// Parses raw configuration strings into values of one type.
pub trait PropertyParser: Send + Sync + 'static {
	/// The typed value this parser produces.
	type Output;

	/// Parses a raw source value.
	fn parse(&self, raw: &str) -> Result<Self::Output>;

	/// Renders a value in the grammar accepted by [`parse`](Self::parse).
	fn render(&self, value: &Self::Output) -> String;
}

/// Identity parser for string properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringParser;

impl PropertyParser for StringParser {
	type Output = String;

	fn parse(&self, raw: &str) -> Result<String> {
		Ok(raw.to_owned())
	}

	fn render(&self, value: &String) -> String {
		value.clone()
	}
}

/// Case-insensitive `true`/`false` parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolParser;

impl PropertyParser for BoolParser {
	type Output = bool;

	fn parse(&self, raw: &str) -> Result<bool> {
		if raw.eq_ignore_ascii_case("true") {
			Ok(true)
		} else if raw.eq_ignore_ascii_case("false") {
			Ok(false)
		} else {
			Err(ParseError::InvalidBool {
				value: raw.to_owned(),
			})
		}
	}

	fn render(&self, value: &bool) -> String {
		value.to_string()
	}
}

/// Decimal parser for 32-bit integer properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntParser;

impl PropertyParser for IntParser {
	type Output = i32;

	fn parse(&self, raw: &str) -> Result<i32> {
		raw.parse().map_err(|source| ParseError::InvalidInt {
			value: raw.to_owned(),
			source,
		})
	}

	fn render(&self, value: &i32) -> String {
		value.to_string()
	}
}

/// Decimal parser for 64-bit integer properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct LongParser;

impl PropertyParser for LongParser {
	type Output = i64;

	fn parse(&self, raw: &str) -> Result<i64> {
		raw.parse().map_err(|source| ParseError::InvalidInt {
			value: raw.to_owned(),
			source,
		})
	}

	fn render(&self, value: &i64) -> String {
		value.to_string()
	}
}

/// An enum usable as a property value.
///
/// Implemented for every fieldless enum deriving `strum::VariantArray` and
/// `strum::IntoStaticStr`:
///
/// ```ignore
/// #[derive(Clone, Copy, Debug, PartialEq, strum::VariantArray, strum::IntoStaticStr)]
/// enum Mode { Fast, Safe }
/// ```
pub trait ConfigEnum: Copy + Send + Sync + 'static {
	/// Every variant, in declaration order.
	fn variants() -> &'static [Self];

	/// The canonical name of this variant.
	fn name(&self) -> &'static str;
}

impl<T> ConfigEnum for T
where
	T: VariantArray + Copy + Into<&'static str> + Send + Sync + 'static,
{
	fn variants() -> &'static [Self] {
		T::VARIANTS
	}

	fn name(&self) -> &'static str {
		(*self).into()
	}
}

/// Matches a raw value against the variant names of `E`, ignoring case.
pub struct EnumParser<E> {
	_marker: PhantomData<fn() -> E>,
}

impl<E> EnumParser<E> {
	/// Creates a parser for the variants of `E`.
	pub const fn new() -> Self {
		Self {
			_marker: PhantomData,
		}
	}
}

impl<E> Default for EnumParser<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> Clone for EnumParser<E> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<E> Copy for EnumParser<E> {}

impl<E> fmt::Debug for EnumParser<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "EnumParser<{}>", std::any::type_name::<E>())
	}
}

impl<E: ConfigEnum> PropertyParser for EnumParser<E> {
	type Output = E;

	fn parse(&self, raw: &str) -> Result<E> {
		E::variants()
			.iter()
			.copied()
			.find(|variant| variant.name().eq_ignore_ascii_case(raw))
			.ok_or_else(|| ParseError::UnknownVariant {
				value: raw.to_owned(),
				expected: E::variants().iter().map(ConfigEnum::name).collect(),
			})
	}

	fn render(&self, value: &E) -> String {
		value.name().to_owned()
	}
}

/// Comma-separated collection parser.
///
/// `C` decides the container semantics: [`ListParser`] keeps order and duplicates,
/// [`SetParser`] keeps first-seen order and drops duplicates.
pub struct CollectionParser<P, C> {
	element: P,
	_container: PhantomData<fn() -> C>,
}

/// Order-preserving list of `P` elements.
pub type ListParser<P> = CollectionParser<P, Vec<<P as PropertyParser>::Output>>;

/// Insertion-ordered, deduplicating set of `P` elements.
pub type SetParser<P> = CollectionParser<P, IndexSet<<P as PropertyParser>::Output>>;

impl<P, C> CollectionParser<P, C> {
	/// Creates a collection parser that parses each element with `element`.
	pub const fn new(element: P) -> Self {
		Self {
			element,
			_container: PhantomData,
		}
	}

	/// Returns the element parser.
	pub fn element(&self) -> &P {
		&self.element
	}
}

impl<P: Clone, C> Clone for CollectionParser<P, C> {
	fn clone(&self) -> Self {
		Self::new(self.element.clone())
	}
}

impl<P: Default, C> Default for CollectionParser<P, C> {
	fn default() -> Self {
		Self::new(P::default())
	}
}

impl<P: fmt::Debug, C> fmt::Debug for CollectionParser<P, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CollectionParser")
			.field("element", &self.element)
			.field("container", &std::any::type_name::<C>())
			.finish()
	}
}

impl<P, C> PropertyParser for CollectionParser<P, C>
where
	P: PropertyParser,
	C: FromIterator<P::Output> + Send + Sync + 'static,
	for<'a> &'a C: IntoIterator<Item = &'a P::Output>,
{
	type Output = C;

	fn parse(&self, raw: &str) -> Result<C> {
		split_elements(raw)
			.into_iter()
			.enumerate()
			.map(|(index, element)| {
				self.element
					.parse(element)
					.map_err(|source| ParseError::InvalidElement {
						index,
						source: Box::new(source),
					})
			})
			.collect()
	}

	fn render(&self, value: &C) -> String {
		value
			.into_iter()
			.map(|element| self.element.render(element))
			.collect::<Vec<_>>()
			.join(",")
	}
}

/// Splits on commas and trims each element. Trailing empty elements are dropped, so
/// `"1,2,"` has two elements and a blank string has none.
fn split_elements(raw: &str) -> Vec<&str> {
	let mut elements: Vec<&str> = raw.split(',').map(str::trim).collect();
	while elements.last().is_some_and(|element| element.is_empty()) {
		elements.pop();
	}
	elements
}

/// Wraps a parser's output in `Some`, for properties whose default is `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionalParser<P>(pub P);

impl<P: PropertyParser> PropertyParser for OptionalParser<P> {
	type Output = Option<P::Output>;

	fn parse(&self, raw: &str) -> Result<Option<P::Output>> {
		self.0.parse(raw).map(Some)
	}

	fn render(&self, value: &Option<P::Output>) -> String {
		value
			.as_ref()
			.map(|value| self.0.render(value))
			.unwrap_or_default()
	}
}
