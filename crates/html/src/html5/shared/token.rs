//! HTML5 token model.

use crate::tags::TagId;

/// HTML attribute as tokenized: name plus (possibly empty) value.
///
/// Determinism contract:
/// - Attributes on a `StartTag` are stored in encounter order.
/// - Duplicate attribute names in a single start tag are dropped after the
///   first occurrence and reported ("first-wins" tokenizer behavior).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// ASCII-lowercased attribute name.
    pub name: String,
    /// Decoded attribute value; empty for valueless attributes.
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype {
        /// ASCII-lowercased doctype name.
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        force_quirks: bool,
    },
    StartTag {
        /// ASCII-lowercased tag name.
        name: String,
        /// Static id resolved from `name`; `TagId::Other` for unknown names.
        tag_id: TagId,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        name: String,
        tag_id: TagId,
    },
    Comment {
        text: String,
    },
    /// Decoded text run in source order. NUL characters have already been
    /// replaced with U+FFFD (and reported) by the tokenizer; consumers that
    /// need whitespace/non-whitespace distinctions inspect the run content.
    Text {
        text: String,
    },
    Eof,
}

impl Token {
    /// Start-tag constructor used by tests and fragment drivers.
    pub fn start_tag(name: &str, attrs: Vec<Attribute>, self_closing: bool) -> Token {
        Token::StartTag {
            tag_id: TagId::from_name(name),
            name: name.to_string(),
            attrs,
            self_closing,
        }
    }

    /// End-tag constructor used by tests and fragment drivers.
    pub fn end_tag(name: &str) -> Token {
        Token::EndTag {
            tag_id: TagId::from_name(name),
            name: name.to_string(),
        }
    }
}
