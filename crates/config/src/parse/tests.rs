use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::VariantArray, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
enum Mode {
	First,
	Second,
	Third,
}

#[rstest]
#[case("true", true)]
#[case("TRUE", true)]
#[case("tRuE", true)]
#[case("false", false)]
#[case("False", false)]
fn test_bool_accepts_any_case(#[case] raw: &str, #[case] expected: bool) {
	assert_eq!(BoolParser.parse(raw), Ok(expected));
}

#[rstest]
#[case("yes")]
#[case("1")]
#[case("true[L]")]
#[case(" true")]
#[case("")]
fn test_bool_rejects_other_spellings(#[case] raw: &str) {
	assert!(matches!(
		BoolParser.parse(raw),
		Err(ParseError::InvalidBool { value }) if value == raw
	));
}

#[rstest]
#[case("0", 0)]
#[case("42", 42)]
#[case("-7", -7)]
#[case("+3", 3)]
fn test_int_decimal(#[case] raw: &str, #[case] expected: i32) {
	assert_eq!(IntParser.parse(raw), Ok(expected));
}

#[rstest]
#[case("2d")]
#[case("1s")]
#[case("")]
#[case("1.5")]
#[case("2147483648")]
fn test_int_rejects_malformed(#[case] raw: &str) {
	assert!(matches!(IntParser.parse(raw), Err(ParseError::InvalidInt { .. })));
}

#[test]
fn test_long_accepts_values_beyond_int_range() {
	assert_eq!(LongParser.parse("2147483648"), Ok(2_147_483_648));
	assert!(LongParser.parse("9223372036854775808").is_err());
}

#[test]
fn test_string_is_verbatim() {
	assert_eq!(StringParser.parse("  padded , value "), Ok("  padded , value ".to_string()));
}

#[rstest]
#[case("FIRST", Mode::First)]
#[case("second", Mode::Second)]
#[case("tHiRd", Mode::Third)]
fn test_enum_matches_case_insensitively(#[case] raw: &str, #[case] expected: Mode) {
	assert_eq!(EnumParser::<Mode>::new().parse(raw), Ok(expected));
}

#[test]
fn test_enum_reports_expected_variants() {
	let err = EnumParser::<Mode>::new().parse("MALFORMED").unwrap_err();
	assert_eq!(
		err,
		ParseError::UnknownVariant {
			value: "MALFORMED".to_string(),
			expected: vec!["FIRST", "SECOND", "THIRD"],
		}
	);
	assert_eq!(
		err.to_string(),
		"unknown variant 'MALFORMED' (expected one of: FIRST, SECOND, THIRD)"
	);
}

#[test]
fn test_string_list_trims_elements() {
	let parser = ListParser::new(StringParser);
	assert_eq!(
		parser.parse("1,2,   3   ,4"),
		Ok(vec!["1".to_string(), "2".into(), "3".into(), "4".into()])
	);
}

#[test]
fn test_int_list_ignores_trailing_comma() {
	let parser = ListParser::new(IntParser);
	assert_eq!(parser.parse("1, 2    ,3,4,"), Ok(vec![1, 2, 3, 4]));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case(",")]
fn test_blank_collection_is_empty(#[case] raw: &str) {
	assert_eq!(ListParser::new(IntParser).parse(raw), Ok(Vec::new()));
	assert_eq!(ListParser::new(StringParser).parse(raw), Ok(Vec::new()));
}

#[test]
fn test_one_bad_element_rejects_whole_collection() {
	let parser = ListParser::new(BoolParser);
	let err = parser.parse("true, unparseable value, false").unwrap_err();
	assert_eq!(
		err,
		ParseError::InvalidElement {
			index: 1,
			source: Box::new(ParseError::InvalidBool {
				value: "unparseable value".to_string(),
			}),
		}
	);
}

#[test]
fn test_interior_empty_element_is_kept() {
	assert_eq!(
		ListParser::new(StringParser).parse("a,,b"),
		Ok(vec!["a".to_string(), String::new(), "b".into()])
	);
	assert!(ListParser::new(LongParser).parse("1,,2").is_err());
}

#[test]
fn test_enum_set_keeps_first_seen_order() {
	let parser = SetParser::new(EnumParser::<Mode>::new());
	let set = parser.parse("first,  tHiRd, SECOND  , FIRST").unwrap();
	assert_eq!(
		set.into_iter().collect::<Vec<_>>(),
		vec![Mode::First, Mode::Third, Mode::Second]
	);
}

#[test]
fn test_render_uses_parse_grammar() {
	assert_eq!(BoolParser.render(&true), "true");
	assert_eq!(LongParser.render(&-12), "-12");
	assert_eq!(EnumParser::<Mode>::new().render(&Mode::Second), "SECOND");
	assert_eq!(ListParser::new(IntParser).render(&vec![1, 2, 3]), "1,2,3");
	assert_eq!(OptionalParser(IntParser).render(&None), "");
}

#[test]
fn test_optional_wraps_success_only() {
	assert_eq!(OptionalParser(IntParser).parse("5"), Ok(Some(5)));
	assert!(OptionalParser(IntParser).parse("five").is_err());
}
