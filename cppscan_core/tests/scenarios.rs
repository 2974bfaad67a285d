use cppscan_core::CppScanError;
use cppscan_core::codegen::flashstr::logging_replacements;
use cppscan_core::config::FlashStrConfig;
use cppscan_core::enums::ParseErrorKind;
use cppscan_core::rewrite::{Replacement, apply_replacements};
use cppscan_core::source::{CppSource, TokenFilter};
use cppscan_core::tokenize::{TokenKind, tokenize};
use pretty_assertions::assert_eq;

fn values(raw: &str) -> Vec<Option<i64>> {
    let enums = CppSource::from_text(raw).enum_definitions(None).unwrap();
    assert_eq!(enums.len(), 1);
    enums[0].enumerators.iter().map(|e| e.numeric_value).collect()
}

#[test]
fn test_unscoped_single_enumerator() {
    let enums = CppSource::from_text("enum X { kX };").enum_definitions(None).unwrap();
    assert_eq!(enums.len(), 1);
    let x = &enums[0];
    assert_eq!(x.name, "X");
    assert!(!x.is_scoped);
    assert_eq!(x.underlying_type, None);
    assert_eq!(x.enumerators.len(), 1);
    assert_eq!(x.enumerators[0].name, "kX");
    assert_eq!(x.enumerators[0].print_name(), "X");
    assert_eq!(x.enumerators[0].numeric_value, Some(0));
}

#[test]
fn test_scoped_with_explicit_value() {
    let enums = CppSource::from_text("enum class Y { y1, y2 = 2, y3 };")
        .enum_definitions(None)
        .unwrap();
    assert!(enums[0].is_scoped);
    assert_eq!(values("enum class Y { y1, y2 = 2, y3 };"), [Some(0), Some(2), Some(3)]);
}

#[test]
fn test_identifier_initializer_is_unknown() {
    let raw = "enum class Z : uint8_t { a, b, c = a, d };";
    let enums = CppSource::from_text(raw).enum_definitions(None).unwrap();
    assert_eq!(enums[0].underlying_type.as_deref(), Some("uint8_t"));
    assert_eq!(values(raw), [Some(0), Some(1), None, None]);
    assert!(!enums[0].all_values_known());
    assert_eq!(enums[0].minimum_value(), None);
}

#[test]
fn test_raw_string_keeps_embedded_parens() {
    let raw = r#"auto s = R"abc(text with ) and ( inside)abc";"#;
    let tokens = tokenize(raw).unwrap();
    let raw_strings: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::RawString).collect();
    assert_eq!(raw_strings.len(), 1);
    assert_eq!(raw_strings[0].text, r#"R"abc(text with ) and ( inside)abc""#);
    assert!(!tokens.iter().any(|t| t.kind == TokenKind::LeftParen));
}

#[test]
fn test_malformed_hex_literal() {
    match CppSource::from_text("0x1g").tokens(TokenFilter::All) {
        Err(CppScanError::Lex(err)) => assert_eq!(err.raw_offset, 0),
        other => panic!("expected a lex error, got {other:?}"),
    }
}

#[test]
fn test_zero_enumerators_is_rejected() {
    for raw in ["enum E {};", "enum class E : int { };", "namespace n { enum E {}; }"] {
        match CppSource::from_text(raw).enum_definitions(None) {
            Err(CppScanError::Parse(err)) => {
                assert_eq!(err.kind, ParseErrorKind::EmptyEnumeratorList, "{raw}");
                assert_eq!(err.enum_name, "E");
            }
            other => panic!("expected a parse error for {raw:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_values_are_the_same_on_every_extraction() {
    let raw = "enum A { a1 = 5, a2 };\nenum class B { b1 = 0x10, b2, b3 = a1 };\n";
    let first = CppSource::from_text(raw).enum_definitions(None).unwrap();
    let second = CppSource::from_text(raw).enum_definitions(None).unwrap();
    assert_eq!(first, second);

    let mut again = first.clone();
    for definition in &mut again {
        definition.resolve_values();
    }
    assert_eq!(again, first);
}

/// Checks that `edited` is `raw` with `open` inserted before and `close`
/// after each string literal, and nothing else changed.
fn assert_only_wrappers_inserted(raw: &str, edited: &str, open: &str, close: &str) {
    let strings: Vec<_> = tokenize(raw)
        .unwrap()
        .into_iter()
        .filter(|t| t.kind.is_string_literal())
        .collect();
    assert!(!strings.is_empty());

    let mut raw_pos = 0;
    let mut out = edited;
    for token in &strings {
        for expected in [
            &raw[raw_pos..token.raw_start],
            open,
            &raw[token.raw_start..token.raw_end],
            close,
        ] {
            assert!(out.starts_with(expected), "expected {expected:?} at {out:?}");
            out = &out[expected.len()..];
        }
        raw_pos = token.raw_end;
    }
    assert_eq!(out, &raw[raw_pos..]);
}

#[test]
fn test_wrapping_every_string_preserves_other_bytes() {
    let raw = concat!(
        "// \"not a string\"\n",
        "#define GREETING \"hi\"\n",
        "const char* a = \"one\";\r\n",
        "const char* b = u8\"two\" \"three\";\n",
        "const char* c = \"four\\\n five\";\n",
        "const char* d = R\"x(six \" ) seven)x\";\n",
        "char e = '\"';\n",
    );
    let tokens = tokenize(raw).unwrap();
    let replacements: Vec<Replacement> = tokens
        .iter()
        .filter(|t| t.kind.is_string_literal())
        .flat_map(|t| [Replacement::before(t, "FLASHSTR("), Replacement::after(t, ")")])
        .collect();
    assert_eq!(replacements.len(), 10);

    let edited = apply_replacements(raw, &replacements).unwrap();
    assert_only_wrappers_inserted(raw, &edited, "FLASHSTR(", ")");
    assert!(edited.contains("FLASHSTR(\"four\\\n five\")"));
    assert!(edited.starts_with("// \"not a string\"\n#define GREETING \"hi\"\n"));
}

#[test]
fn test_logging_rewrite_of_file() {
    let raw = concat!(
        "void Handle(int code) {\n",
        "  TAS_VLOG(2) << \"code: \" << code;\n",
        "  TAS_CHECK(code > 0) << \"bad code \"\n",
        "                      << code;\n",
        "  TAS_DCHECK_EQ(code, 1) << R\"(raw)\";\n",
        "}\n",
    );
    let source = CppSource::from_text(raw);
    let config = FlashStrConfig::default();
    let replacements = logging_replacements(
        source.grouped_tokens().unwrap(),
        &config.statement_prefixes,
        &config.wrapper,
    )
    .unwrap();
    let edited = source.edit(&replacements).unwrap();
    assert_only_wrappers_inserted(raw, edited.raw_source(), "FLASHSTR(", ")");

    let again = logging_replacements(
        edited.grouped_tokens().unwrap(),
        &config.statement_prefixes,
        &config.wrapper,
    )
    .unwrap();
    assert!(again.is_empty());
}
