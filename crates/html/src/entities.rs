//! Named character-reference table and longest-match lookup.
//!
//! Contract:
//! - The table is an explicitly limited subset of the HTML named references:
//!   every legacy name that is valid *without* a trailing semicolon (those
//!   drive the attribute-mode compatibility rule), plus the common
//!   semicolon-terminated names. Unknown names pass through undecoded.
//! - Lookup is longest-match over a trie built once at first use; the trie is
//!   read-only afterwards and shared by all tokenizer instances.
//! - Entry names exclude the leading `&` and include the trailing `;` when
//!   the reference requires one.
//!
//! This is intentionally not the full HTML entity list. Keep the behavior
//! narrow and stable; widening the table must not change lookup semantics.

use std::sync::OnceLock;

/// Outcome of walking `input` through the reference trie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamedLookup {
    /// Longest entry matched: (bytes consumed from `input`, expansion).
    pub matched: Option<(usize, &'static str)>,
    /// True when all of `input` lies on a trie path that continues, so a
    /// longer entry could match given more input.
    pub may_extend: bool,
}

/// Longest-match lookup starting immediately after a `&`.
pub fn lookup_named(input: &str) -> NamedLookup {
    trie().lookup(input)
}

/// True when the matched entry name ends with `;`.
pub fn match_has_semicolon(consumed: usize, input: &str) -> bool {
    input.as_bytes().get(consumed.wrapping_sub(1)) == Some(&b';')
}

struct Trie {
    nodes: Vec<TrieNode>,
}

#[derive(Default)]
struct TrieNode {
    // Sorted by byte; references are short ASCII names so linear scan on a
    // small Vec beats hashing here.
    children: Vec<(u8, u32)>,
    value: Option<&'static str>,
}

impl Trie {
    fn build() -> Trie {
        let mut trie = Trie {
            nodes: vec![TrieNode::default()],
        };
        for (name, expansion) in NAMED {
            let mut node = 0usize;
            for &byte in name.as_bytes() {
                node = match trie.nodes[node].children.iter().find(|(b, _)| *b == byte) {
                    Some((_, idx)) => *idx as usize,
                    None => {
                        let idx = trie.nodes.len() as u32;
                        trie.nodes.push(TrieNode::default());
                        trie.nodes[node].children.push((byte, idx));
                        idx as usize
                    }
                };
            }
            trie.nodes[node].value = Some(expansion);
        }
        trie
    }

    fn lookup(&self, input: &str) -> NamedLookup {
        let mut node = 0usize;
        let mut matched = None;
        let mut consumed = 0usize;
        for &byte in input.as_bytes() {
            let next = self.nodes[node]
                .children
                .iter()
                .find(|(b, _)| *b == byte)
                .map(|(_, idx)| *idx as usize);
            match next {
                Some(idx) => {
                    node = idx;
                    consumed += 1;
                    if let Some(value) = self.nodes[node].value {
                        matched = Some((consumed, value));
                    }
                }
                None => {
                    return NamedLookup {
                        matched,
                        may_extend: false,
                    };
                }
            }
        }
        NamedLookup {
            matched,
            may_extend: !self.nodes[node].children.is_empty(),
        }
    }
}

fn trie() -> &'static Trie {
    static TRIE: OnceLock<Trie> = OnceLock::new();
    TRIE.get_or_init(Trie::build)
}

macro_rules! legacy {
    ($name:literal, $value:literal) => {
        ($name, $value)
    };
}

// Legacy names appear twice: bare (no semicolon) and terminated. The bare
// form is what the attribute-mode compatibility rule applies to.
#[rustfmt::skip]
static NAMED: &[(&str, &'static str)] = &[
    legacy!("AElig", "\u{C6}"), ("AElig;", "\u{C6}"),
    legacy!("AMP", "&"), ("AMP;", "&"),
    legacy!("Aacute", "\u{C1}"), ("Aacute;", "\u{C1}"),
    legacy!("Acirc", "\u{C2}"), ("Acirc;", "\u{C2}"),
    legacy!("Agrave", "\u{C0}"), ("Agrave;", "\u{C0}"),
    legacy!("Aring", "\u{C5}"), ("Aring;", "\u{C5}"),
    legacy!("Atilde", "\u{C3}"), ("Atilde;", "\u{C3}"),
    legacy!("Auml", "\u{C4}"), ("Auml;", "\u{C4}"),
    legacy!("COPY", "\u{A9}"), ("COPY;", "\u{A9}"),
    legacy!("Ccedil", "\u{C7}"), ("Ccedil;", "\u{C7}"),
    legacy!("ETH", "\u{D0}"), ("ETH;", "\u{D0}"),
    legacy!("Eacute", "\u{C9}"), ("Eacute;", "\u{C9}"),
    legacy!("Ecirc", "\u{CA}"), ("Ecirc;", "\u{CA}"),
    legacy!("Egrave", "\u{C8}"), ("Egrave;", "\u{C8}"),
    legacy!("Euml", "\u{CB}"), ("Euml;", "\u{CB}"),
    legacy!("GT", ">"), ("GT;", ">"),
    legacy!("Iacute", "\u{CD}"), ("Iacute;", "\u{CD}"),
    legacy!("Icirc", "\u{CE}"), ("Icirc;", "\u{CE}"),
    legacy!("Igrave", "\u{CC}"), ("Igrave;", "\u{CC}"),
    legacy!("Iuml", "\u{CF}"), ("Iuml;", "\u{CF}"),
    legacy!("LT", "<"), ("LT;", "<"),
    legacy!("Ntilde", "\u{D1}"), ("Ntilde;", "\u{D1}"),
    legacy!("Oacute", "\u{D3}"), ("Oacute;", "\u{D3}"),
    legacy!("Ocirc", "\u{D4}"), ("Ocirc;", "\u{D4}"),
    legacy!("Ograve", "\u{D2}"), ("Ograve;", "\u{D2}"),
    legacy!("Oslash", "\u{D8}"), ("Oslash;", "\u{D8}"),
    legacy!("Otilde", "\u{D5}"), ("Otilde;", "\u{D5}"),
    legacy!("Ouml", "\u{D6}"), ("Ouml;", "\u{D6}"),
    legacy!("QUOT", "\""), ("QUOT;", "\""),
    legacy!("REG", "\u{AE}"), ("REG;", "\u{AE}"),
    legacy!("THORN", "\u{DE}"), ("THORN;", "\u{DE}"),
    legacy!("Uacute", "\u{DA}"), ("Uacute;", "\u{DA}"),
    legacy!("Ucirc", "\u{DB}"), ("Ucirc;", "\u{DB}"),
    legacy!("Ugrave", "\u{D9}"), ("Ugrave;", "\u{D9}"),
    legacy!("Uuml", "\u{DC}"), ("Uuml;", "\u{DC}"),
    legacy!("Yacute", "\u{DD}"), ("Yacute;", "\u{DD}"),
    legacy!("aacute", "\u{E1}"), ("aacute;", "\u{E1}"),
    legacy!("acirc", "\u{E2}"), ("acirc;", "\u{E2}"),
    legacy!("acute", "\u{B4}"), ("acute;", "\u{B4}"),
    legacy!("aelig", "\u{E6}"), ("aelig;", "\u{E6}"),
    legacy!("agrave", "\u{E0}"), ("agrave;", "\u{E0}"),
    legacy!("amp", "&"), ("amp;", "&"),
    legacy!("aring", "\u{E5}"), ("aring;", "\u{E5}"),
    legacy!("atilde", "\u{E3}"), ("atilde;", "\u{E3}"),
    legacy!("auml", "\u{E4}"), ("auml;", "\u{E4}"),
    legacy!("brvbar", "\u{A6}"), ("brvbar;", "\u{A6}"),
    legacy!("ccedil", "\u{E7}"), ("ccedil;", "\u{E7}"),
    legacy!("cedil", "\u{B8}"), ("cedil;", "\u{B8}"),
    legacy!("cent", "\u{A2}"), ("cent;", "\u{A2}"),
    legacy!("copy", "\u{A9}"), ("copy;", "\u{A9}"),
    legacy!("curren", "\u{A4}"), ("curren;", "\u{A4}"),
    legacy!("deg", "\u{B0}"), ("deg;", "\u{B0}"),
    legacy!("divide", "\u{F7}"), ("divide;", "\u{F7}"),
    legacy!("eacute", "\u{E9}"), ("eacute;", "\u{E9}"),
    legacy!("ecirc", "\u{EA}"), ("ecirc;", "\u{EA}"),
    legacy!("egrave", "\u{E8}"), ("egrave;", "\u{E8}"),
    legacy!("eth", "\u{F0}"), ("eth;", "\u{F0}"),
    legacy!("euml", "\u{EB}"), ("euml;", "\u{EB}"),
    legacy!("frac12", "\u{BD}"), ("frac12;", "\u{BD}"),
    legacy!("frac14", "\u{BC}"), ("frac14;", "\u{BC}"),
    legacy!("frac34", "\u{BE}"), ("frac34;", "\u{BE}"),
    legacy!("gt", ">"), ("gt;", ">"),
    legacy!("iacute", "\u{ED}"), ("iacute;", "\u{ED}"),
    legacy!("icirc", "\u{EE}"), ("icirc;", "\u{EE}"),
    legacy!("iexcl", "\u{A1}"), ("iexcl;", "\u{A1}"),
    legacy!("igrave", "\u{EC}"), ("igrave;", "\u{EC}"),
    legacy!("iquest", "\u{BF}"), ("iquest;", "\u{BF}"),
    legacy!("iuml", "\u{EF}"), ("iuml;", "\u{EF}"),
    legacy!("laquo", "\u{AB}"), ("laquo;", "\u{AB}"),
    legacy!("lt", "<"), ("lt;", "<"),
    legacy!("macr", "\u{AF}"), ("macr;", "\u{AF}"),
    legacy!("micro", "\u{B5}"), ("micro;", "\u{B5}"),
    legacy!("middot", "\u{B7}"), ("middot;", "\u{B7}"),
    legacy!("nbsp", "\u{A0}"), ("nbsp;", "\u{A0}"),
    legacy!("not", "\u{AC}"), ("not;", "\u{AC}"),
    legacy!("ntilde", "\u{F1}"), ("ntilde;", "\u{F1}"),
    legacy!("oacute", "\u{F3}"), ("oacute;", "\u{F3}"),
    legacy!("ocirc", "\u{F4}"), ("ocirc;", "\u{F4}"),
    legacy!("ograve", "\u{F2}"), ("ograve;", "\u{F2}"),
    legacy!("ordf", "\u{AA}"), ("ordf;", "\u{AA}"),
    legacy!("ordm", "\u{BA}"), ("ordm;", "\u{BA}"),
    legacy!("oslash", "\u{F8}"), ("oslash;", "\u{F8}"),
    legacy!("otilde", "\u{F5}"), ("otilde;", "\u{F5}"),
    legacy!("ouml", "\u{F6}"), ("ouml;", "\u{F6}"),
    legacy!("para", "\u{B6}"), ("para;", "\u{B6}"),
    legacy!("plusmn", "\u{B1}"), ("plusmn;", "\u{B1}"),
    legacy!("pound", "\u{A3}"), ("pound;", "\u{A3}"),
    legacy!("quot", "\""), ("quot;", "\""),
    legacy!("raquo", "\u{BB}"), ("raquo;", "\u{BB}"),
    legacy!("reg", "\u{AE}"), ("reg;", "\u{AE}"),
    legacy!("sect", "\u{A7}"), ("sect;", "\u{A7}"),
    legacy!("shy", "\u{AD}"), ("shy;", "\u{AD}"),
    legacy!("sup1", "\u{B9}"), ("sup1;", "\u{B9}"),
    legacy!("sup2", "\u{B2}"), ("sup2;", "\u{B2}"),
    legacy!("sup3", "\u{B3}"), ("sup3;", "\u{B3}"),
    legacy!("szlig", "\u{DF}"), ("szlig;", "\u{DF}"),
    legacy!("thorn", "\u{FE}"), ("thorn;", "\u{FE}"),
    legacy!("times", "\u{D7}"), ("times;", "\u{D7}"),
    legacy!("uacute", "\u{FA}"), ("uacute;", "\u{FA}"),
    legacy!("ucirc", "\u{FB}"), ("ucirc;", "\u{FB}"),
    legacy!("ugrave", "\u{F9}"), ("ugrave;", "\u{F9}"),
    legacy!("uml", "\u{A8}"), ("uml;", "\u{A8}"),
    legacy!("uuml", "\u{FC}"), ("uuml;", "\u{FC}"),
    legacy!("yacute", "\u{FD}"), ("yacute;", "\u{FD}"),
    legacy!("yen", "\u{A5}"), ("yen;", "\u{A5}"),
    legacy!("yuml", "\u{FF}"), ("yuml;", "\u{FF}"),
    // Semicolon-only names.
    ("OElig;", "\u{152}"),
    ("Scaron;", "\u{160}"),
    ("Yuml;", "\u{178}"),
    ("apos;", "'"),
    ("oelig;", "\u{153}"),
    ("scaron;", "\u{161}"),
    ("fnof;", "\u{192}"),
    ("circ;", "\u{2C6}"),
    ("tilde;", "\u{2DC}"),
    ("ensp;", "\u{2002}"),
    ("emsp;", "\u{2003}"),
    ("thinsp;", "\u{2009}"),
    ("zwnj;", "\u{200C}"),
    ("zwj;", "\u{200D}"),
    ("lrm;", "\u{200E}"),
    ("rlm;", "\u{200F}"),
    ("ndash;", "\u{2013}"),
    ("mdash;", "\u{2014}"),
    ("lsquo;", "\u{2018}"),
    ("rsquo;", "\u{2019}"),
    ("sbquo;", "\u{201A}"),
    ("ldquo;", "\u{201C}"),
    ("rdquo;", "\u{201D}"),
    ("bdquo;", "\u{201E}"),
    ("dagger;", "\u{2020}"),
    ("Dagger;", "\u{2021}"),
    ("bull;", "\u{2022}"),
    ("hellip;", "\u{2026}"),
    ("permil;", "\u{2030}"),
    ("prime;", "\u{2032}"),
    ("Prime;", "\u{2033}"),
    ("lsaquo;", "\u{2039}"),
    ("rsaquo;", "\u{203A}"),
    ("oline;", "\u{203E}"),
    ("frasl;", "\u{2044}"),
    ("euro;", "\u{20AC}"),
    ("trade;", "\u{2122}"),
    ("larr;", "\u{2190}"),
    ("uarr;", "\u{2191}"),
    ("rarr;", "\u{2192}"),
    ("darr;", "\u{2193}"),
    ("harr;", "\u{2194}"),
    ("minus;", "\u{2212}"),
    ("radic;", "\u{221A}"),
    ("infin;", "\u{221E}"),
    ("cap;", "\u{2229}"),
    ("cup;", "\u{222A}"),
    ("int;", "\u{222B}"),
    ("there4;", "\u{2234}"),
    ("asymp;", "\u{2248}"),
    ("ne;", "\u{2260}"),
    ("equiv;", "\u{2261}"),
    ("le;", "\u{2264}"),
    ("ge;", "\u{2265}"),
    ("sum;", "\u{2211}"),
    ("prod;", "\u{220F}"),
    ("alpha;", "\u{3B1}"),
    ("beta;", "\u{3B2}"),
    ("gamma;", "\u{3B3}"),
    ("delta;", "\u{3B4}"),
    ("epsilon;", "\u{3B5}"),
    ("lambda;", "\u{3BB}"),
    ("mu;", "\u{3BC}"),
    ("pi;", "\u{3C0}"),
    ("sigma;", "\u{3C3}"),
    ("omega;", "\u{3C9}"),
    ("Delta;", "\u{394}"),
    ("Omega;", "\u{3A9}"),
];

#[cfg(test)]
mod tests {
    use super::{lookup_named, match_has_semicolon};

    #[test]
    fn longest_match_prefers_semicolon_form() {
        let lookup = lookup_named("amp;x");
        assert_eq!(lookup.matched, Some((4, "&")));
        assert!(match_has_semicolon(4, "amp;x"));
    }

    #[test]
    fn bare_legacy_name_matches_without_semicolon() {
        let lookup = lookup_named("ampx");
        assert_eq!(lookup.matched, Some((3, "&")));
        assert!(!match_has_semicolon(3, "ampx"));
    }

    #[test]
    fn partial_name_reports_possible_extension() {
        let lookup = lookup_named("am");
        assert_eq!(lookup.matched, None);
        assert!(lookup.may_extend);
    }

    #[test]
    fn unknown_name_neither_matches_nor_extends() {
        let lookup = lookup_named("xyzzy;");
        assert_eq!(lookup.matched, None);
        assert!(!lookup.may_extend);
    }

    #[test]
    fn not_vs_notin_longest_match() {
        // "not" is a bare legacy name; input "not;" must take the longer
        // terminated entry.
        let lookup = lookup_named("not;");
        assert_eq!(lookup.matched, Some((4, "\u{AC}")));
    }
}
