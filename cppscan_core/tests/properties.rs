use cppscan_core::rewrite::{Replacement, apply_replacements};
use cppscan_core::tokenize::{LogicalText, TokenKind, stringify_tokens, tokenize};
use proptest::prelude::*;

const PIECES: &[&str] = &[
    "int", "x1", "_y", "kValue", "42", "0x1F", "017", "10u", "3.5", "1e3", ".25f", "\"s\"",
    "\"a b\"", "'c'", "'\\n'", "u8\"t\"", "L'w'", "R\"(r)\"", "R\"d(a)b)d\"", "+", "-", "<<=",
    "->", "::", "...", "(", ")", "{", "}", "[", "]", ";", ",", "/* c */",
];

const SEPARATORS: &[&str] = &[" ", "  ", "\n", "\t", " \n\t", "\r\n"];

fn pieces_and_text() -> impl Strategy<Value = (Vec<&'static str>, String)> {
    prop::collection::vec((prop::sample::select(PIECES), prop::sample::select(SEPARATORS)), 1..40)
        .prop_map(|parts| {
            let pieces: Vec<&str> = parts.iter().map(|(piece, _)| *piece).collect();
            let text: String = parts
                .iter()
                .map(|(piece, separator)| format!("{piece}{separator}"))
                .collect();
            (pieces, text)
        })
}

proptest! {
    #[test]
    fn test_round_trip_collapses_gaps((pieces, text) in pieces_and_text()) {
        let tokens = tokenize(&text).unwrap();
        prop_assert_eq!(tokens.len(), pieces.len());
        prop_assert_eq!(stringify_tokens(&tokens), pieces.join(" "));
    }

    #[test]
    fn test_tokens_cover_their_raw_text((_pieces, text) in pieces_and_text()) {
        let tokens = tokenize(&text).unwrap();
        let mut prior_end = 0;
        for token in &tokens {
            prop_assert!(prior_end <= token.raw_start);
            prop_assert!(token.raw_start < token.raw_end);
            prop_assert_eq!(&text[token.raw_start..token.raw_end], token.raw_text.as_str());
            prop_assert!(text[prior_end..token.raw_start].chars().all(char::is_whitespace));
            prior_end = token.raw_end;
        }
    }

    #[test]
    fn test_offset_map_round_trip(raw in "[a\\\\\n\r ]{0,64}") {
        let logical = LogicalText::new(&raw);
        let text = logical.text();
        for i in 0..=text.len() {
            let raw_offset = logical.logical_to_raw(i).unwrap();
            prop_assert_eq!(logical.raw_to_logical(raw_offset), Some(i));
            if i < text.len() {
                prop_assert_eq!(raw.as_bytes()[raw_offset], text.as_bytes()[i]);
            }
        }
        prop_assert_eq!(logical.logical_to_raw(text.len() + 1), None);
    }

    #[test]
    fn test_wrapping_a_token_never_corrupts_it(
        prefix in "[a-z ;]{0,8}",
        name in "[A-Za-z_][A-Za-z0-9_]{0,8}",
        suffix in "[a-z ;]{0,8}",
        open in "[A-Z]{1,6}\\(",
    ) {
        let raw = format!("{prefix} {name} {suffix}");
        let tokens = tokenize(&raw).unwrap();
        let token = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Identifier && t.raw_start == prefix.len() + 1)
            .unwrap();
        let edited = apply_replacements(
            &raw,
            &[Replacement::after(token, ")"), Replacement::before(token, open.as_str())],
        )
        .unwrap();
        prop_assert_eq!(edited, format!("{prefix} {open}{name}) {suffix}"));
    }
}

#[test]
fn test_spliced_tokens_report_raw_spans() {
    let raw = "in\\\nt x = \"a\\\r\nb\";";
    let tokens = tokenize(raw).unwrap();
    assert_eq!(tokens[0].text, "int");
    assert_eq!(tokens[0].raw_text, "in\\\nt");
    assert_eq!((tokens[0].raw_start, tokens[0].raw_end), (0, 6));
    assert_eq!(tokens[3].text, "\"ab\"");
    assert_eq!(&raw[tokens[3].raw_start..tokens[3].raw_end], "\"a\\\r\nb\"");
}
