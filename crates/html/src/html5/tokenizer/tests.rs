use super::{RawKind, TokenizeResult, Tokenizer, TokenizerConfig};
use crate::html5::shared::{ParseErrorCode, Token};
use crate::tags::TagId;

fn tokenize(input: &str) -> Vec<Token> {
    tokenize_chunked(&[input])
}

/// Pump until the tokenizer blocks on input or finishes, draining tokens.
fn pump_all(tokenizer: &mut Tokenizer, out: &mut Vec<Token>) {
    loop {
        match tokenizer.pump() {
            TokenizeResult::Progress => out.extend(tokenizer.drain_tokens()),
            TokenizeResult::NeedMoreInput | TokenizeResult::EmittedEof => {
                out.extend(tokenizer.drain_tokens());
                return;
            }
        }
    }
}

fn tokenize_chunked(chunks: &[&str]) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let mut out = Vec::new();
    for chunk in chunks {
        let res = tokenizer.push_str(chunk);
        assert!(
            matches!(
                res,
                TokenizeResult::Progress | TokenizeResult::NeedMoreInput
            ),
            "unexpected push_str result: {res:?}"
        );
        pump_all(&mut tokenizer, &mut out);
    }
    let _ = tokenizer.finish();
    pump_all(&mut tokenizer, &mut out);
    assert_eq!(tokenizer.finish(), TokenizeResult::EmittedEof);
    out
}

fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn simple_element_with_text() {
    let tokens = tokenize("<div>Hello</div>");
    assert_eq!(
        tokens,
        vec![
            Token::start_tag("div", vec![], false),
            Token::Text {
                text: "Hello".to_string()
            },
            Token::end_tag("div"),
            Token::Eof,
        ]
    );
}

#[test]
fn chunked_input_matches_single_chunk() {
    let whole = tokenize("<div class=\"a b\">x &amp; y</div><!--c-->");
    for split in 1.."<div class=\"a b\">x &amp; y</div><!--c-->".len() {
        let input = "<div class=\"a b\">x &amp; y</div><!--c-->";
        if !input.is_char_boundary(split) {
            continue;
        }
        let chunked = tokenize_chunked(&[&input[..split], &input[split..]]);
        assert_eq!(whole, chunked, "token sequence must be chunk-invariant (split at {split})");
    }
}

#[test]
fn attributes_parse_with_all_quote_styles() {
    let tokens = tokenize("<input type=text id='a' data-x=\"1\" disabled>");
    let Token::StartTag {
        name,
        tag_id,
        attrs,
        self_closing,
    } = &tokens[0]
    else {
        panic!("expected start tag, got {:?}", tokens[0]);
    };
    assert_eq!(name, "input");
    assert_eq!(*tag_id, TagId::Input);
    assert!(!self_closing);
    let pairs: Vec<(&str, &str)> = attrs
        .iter()
        .map(|a| (a.name.as_str(), a.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("type", "text"),
            ("id", "a"),
            ("data-x", "1"),
            ("disabled", ""),
        ]
    );
}

#[test]
fn duplicate_attribute_is_dropped_and_reported() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.push_str("<div id=a id=b>");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    let errors = tokenizer.drain_errors();
    let Token::StartTag { attrs, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs[0].value, "a");
    assert!(errors
        .iter()
        .any(|e| e.code == ParseErrorCode::DuplicateAttribute));
}

#[test]
fn tag_names_and_attr_names_are_ascii_lowercased() {
    let tokens = tokenize("<DIV ID=x>");
    let Token::StartTag { name, attrs, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    assert_eq!(name, "div");
    assert_eq!(attrs[0].name, "id");
}

#[test]
fn named_reference_in_text_decodes() {
    let tokens = tokenize("a &amp; b &lt;c&gt;");
    assert_eq!(text_of(&tokens), "a & b <c>");
}

#[test]
fn bare_reference_before_equals_in_attribute_stays_literal() {
    let tokens = tokenize("<a href=\"?q=1&not=2\">x</a>");
    let Token::StartTag { attrs, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    // Legacy rule: `&not` followed by `=` inside an attribute is not expanded.
    assert_eq!(attrs[0].value, "?q=1&not=2");
    // The same sequence in data decodes the bare name.
    let data = tokenize("x &not=2");
    assert_eq!(text_of(&data), "x \u{AC}=2");
}

#[test]
fn numeric_references_decode_in_attribute_values() {
    let tokens = tokenize("<i title=\"&#65;&#x42;\">");
    let Token::StartTag { attrs, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    assert_eq!(attrs[0].value, "AB");
}

#[test]
fn nul_becomes_replacement_with_error() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.push_str("a\0b");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(text_of(&tokens), "a\u{FFFD}b");
    assert!(tokenizer
        .drain_errors()
        .iter()
        .any(|e| e.code == ParseErrorCode::UnexpectedNullCharacter));
}

#[test]
fn comment_variants() {
    assert_eq!(
        tokenize("<!--x-->"),
        vec![
            Token::Comment {
                text: "x".to_string()
            },
            Token::Eof
        ]
    );
    assert_eq!(
        tokenize("<!---->"),
        vec![
            Token::Comment {
                text: String::new()
            },
            Token::Eof
        ]
    );
    // Dashes inside the body stay verbatim.
    assert_eq!(
        tokenize("<!--a-b--c-->"),
        vec![
            Token::Comment {
                text: "a-b--c".to_string()
            },
            Token::Eof
        ]
    );
}

#[test]
fn unterminated_comment_flushes_at_eof_with_error() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.push_str("<!-- open");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(
        tokens,
        vec![
            Token::Comment {
                text: " open".to_string()
            },
            Token::Eof
        ]
    );
    assert!(tokenizer
        .drain_errors()
        .iter()
        .any(|e| e.code == ParseErrorCode::EofInComment));
}

#[test]
fn doctype_with_public_and_system_ids() {
    let tokens =
        tokenize("<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://x\">");
    assert_eq!(
        tokens[0],
        Token::Doctype {
            name: Some("html".to_string()),
            public_id: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
            system_id: Some("http://x".to_string()),
            force_quirks: false,
        }
    );
}

#[test]
fn truncated_doctype_forces_quirks() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.push_str("<!DOCTYPE htm");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(
        tokens[0],
        Token::Doctype {
            name: Some("htm".to_string()),
            public_id: None,
            system_id: None,
            force_quirks: true,
        }
    );
    assert!(tokenizer
        .drain_errors()
        .iter()
        .any(|e| e.code == ParseErrorCode::EofInDoctype));
}

#[test]
fn rawtext_mode_only_closes_on_matching_end_tag() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.push_str("<style>");
    tokenizer.drain_tokens();
    tokenizer.set_raw_mode(RawKind::Rawtext, "style");
    tokenizer.push_str("a { content: \"</div>\" } </style>after");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(
        tokens,
        vec![
            Token::Text {
                text: "a { content: \"</div>\" } ".to_string()
            },
            Token::end_tag("style"),
            Token::Text {
                text: "after".to_string()
            },
            Token::Eof,
        ]
    );
}

#[test]
fn rcdata_decodes_references_but_keeps_tags_as_text() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.set_raw_mode(RawKind::Rcdata, "textarea");
    tokenizer.push_str("a &amp; <b> c</textarea>");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(
        tokens,
        vec![
            Token::Text {
                text: "a & <b> c".to_string()
            },
            Token::end_tag("textarea"),
            Token::Eof,
        ]
    );
}

#[test]
fn script_data_escaped_comment_hides_end_tag() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.set_raw_mode(RawKind::ScriptData, "script");
    tokenizer.push_str("<!--<script>x</script>--></script>");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    // The inner </script> is part of the double-escaped region; only the
    // final one closes the element.
    assert_eq!(
        tokens,
        vec![
            Token::Text {
                text: "<!--<script>x</script>-->".to_string()
            },
            Token::end_tag("script"),
            Token::Eof,
        ]
    );
}

#[test]
fn plaintext_consumes_everything() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.set_raw_mode(RawKind::Plaintext, "plaintext");
    tokenizer.push_str("</plaintext><div>");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(text_of(&tokens), "</plaintext><div>");
}

#[test]
fn unterminated_tag_is_dropped_at_eof_with_error() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.push_str("before<div cla");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(
        tokens,
        vec![
            Token::Text {
                text: "before".to_string()
            },
            Token::Eof
        ]
    );
    assert!(tokenizer
        .drain_errors()
        .iter()
        .any(|e| e.code == ParseErrorCode::EofInTag));
}

#[test]
fn lone_ampersand_and_lt_stay_literal() {
    let tokens = tokenize("a & b < 3");
    assert_eq!(text_of(&tokens), "a & b < 3");
}

#[test]
fn crlf_normalizes_across_chunk_boundary() {
    let whole = tokenize("a\r\nb");
    let split = tokenize_chunked(&["a\r", "\nb"]);
    assert_eq!(whole, split);
    assert_eq!(text_of(&whole), "a\nb");
}

#[test]
fn self_closing_flag_is_reported() {
    let tokens = tokenize("<br/>");
    assert_eq!(tokens[0], Token::start_tag("br", vec![], true));
}

#[test]
fn finish_is_idempotent() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    assert_eq!(tokenizer.finish(), TokenizeResult::EmittedEof);
    assert_eq!(tokenizer.finish(), TokenizeResult::EmittedEof);
    assert_eq!(tokenizer.drain_tokens(), vec![Token::Eof]);
    assert!(tokenizer.drain_tokens().is_empty());
}

#[test]
#[should_panic(expected = "push_str called after finish")]
fn push_str_after_finish_panics() {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.finish();
    tokenizer.push_str("late");
}

#[test]
fn cdata_only_opens_when_allowed() {
    // HTML content: bogus comment plus an error.
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.push_str("<![CDATA[x]]>");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(
        tokens,
        vec![
            Token::Comment {
                text: "[CDATA[x]]".to_string()
            },
            Token::Eof
        ]
    );
    assert!(tokenizer
        .drain_errors()
        .iter()
        .any(|e| e.code == ParseErrorCode::CdataInHtmlContent));

    // Foreign content: text.
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.set_cdata_allowed(true);
    tokenizer.push_str("<![CDATA[x]]>");
    tokenizer.finish();
    let tokens = tokenizer.drain_tokens();
    assert_eq!(text_of(&tokens), "x");
}
