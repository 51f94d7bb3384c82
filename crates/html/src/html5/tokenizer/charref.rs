//! Character-reference sub-machine.
//!
//! Invoked from the states that can contain `&` (data, RCDATA, attribute
//! values). Decides on a complete prefix of the input before consuming
//! anything, so a chunk boundary inside a reference simply reports
//! `NeedMoreInput` and the caller retries once more input arrives.

use crate::entities;
use crate::html5::shared::{ParseError, ParseErrorCode};

/// Step outcome. `Consumed(n)` means `n` bytes starting at the `&` were
/// consumed and the decoded (or literal) text was appended to `out`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CharRefStep {
    NeedMoreInput,
    Consumed(usize),
}

// Longest name in the reference table plus slack; bounds the lookahead scan
// used for the ambiguous-ampersand diagnostic.
const MAX_NAME_SCAN: usize = 32;

/// Decode one character reference.
///
/// `input` starts at the `&`. `at` is the absolute position of the `&` for
/// error records. `in_attr` selects attribute-mode decoding (the legacy
/// compatibility rule for bare names).
pub(crate) fn step_char_ref(
    input: &str,
    eos: bool,
    in_attr: bool,
    at: usize,
    out: &mut String,
    errors: &mut Vec<ParseError>,
) -> CharRefStep {
    debug_assert!(input.starts_with('&'), "caller must position at '&'");
    let rest = &input[1..];
    let Some(first) = rest.chars().next() else {
        if eos {
            out.push('&');
            return CharRefStep::Consumed(1);
        }
        return CharRefStep::NeedMoreInput;
    };

    if first == '#' {
        return step_numeric(input, eos, at, out, errors);
    }
    if first.is_ascii_alphanumeric() {
        return step_named(input, eos, in_attr, at, out, errors);
    }
    out.push('&');
    CharRefStep::Consumed(1)
}

fn step_named(
    input: &str,
    eos: bool,
    in_attr: bool,
    at: usize,
    out: &mut String,
    errors: &mut Vec<ParseError>,
) -> CharRefStep {
    let rest = &input[1..];
    let lookup = entities::lookup_named(rest);
    if lookup.may_extend && !eos {
        return CharRefStep::NeedMoreInput;
    }

    if let Some((len, expansion)) = lookup.matched {
        let has_semicolon = entities::match_has_semicolon(len, rest);
        if !has_semicolon {
            // A longer terminated entry could still appear with more input;
            // `may_extend` already covered that above.
            let next = rest[len..].chars().next();
            if next.is_none() && !eos {
                return CharRefStep::NeedMoreInput;
            }
            if in_attr && matches!(next, Some(c) if c == '=' || c.is_ascii_alphanumeric()) {
                // Legacy rule: inside an attribute value a bare name followed
                // by `=` or an alphanumeric is not a reference.
                out.push('&');
                out.push_str(&rest[..len]);
                return CharRefStep::Consumed(1 + len);
            }
            errors.push(ParseError::new(
                ParseErrorCode::MissingSemicolonAfterCharacterReference,
                at,
            ));
        }
        out.push_str(expansion);
        return CharRefStep::Consumed(1 + len);
    }

    // No match: flush the `&` and let the caller re-process the name as
    // ordinary text. The ambiguous-ampersand diagnostic fires only when the
    // alphanumeric run is `;`-terminated within the scan bound.
    let mut scanned = 0usize;
    for ch in rest.chars() {
        if ch == ';' {
            errors.push(ParseError::new(ParseErrorCode::UnknownNamedCharacterReference, at));
            break;
        }
        if !ch.is_ascii_alphanumeric() || scanned >= MAX_NAME_SCAN {
            break;
        }
        scanned += ch.len_utf8();
    }
    if scanned < MAX_NAME_SCAN && rest[scanned..].is_empty() && !eos {
        return CharRefStep::NeedMoreInput;
    }
    out.push('&');
    CharRefStep::Consumed(1)
}

fn step_numeric(
    input: &str,
    eos: bool,
    at: usize,
    out: &mut String,
    errors: &mut Vec<ParseError>,
) -> CharRefStep {
    // input = "&#..."
    let body = &input[2..];
    let (is_hex, digits_at) = match body.chars().next() {
        Some('x') | Some('X') => (true, 3),
        Some(_) => (false, 2),
        None => {
            if !eos {
                return CharRefStep::NeedMoreInput;
            }
            errors.push(ParseError::new(
                ParseErrorCode::AbsenceOfDigitsInNumericCharacterReference,
                at,
            ));
            out.push_str("&#");
            return CharRefStep::Consumed(2);
        }
    };

    let digits = &input[digits_at..];
    let mut value: u32 = 0;
    let mut overflowed = false;
    let mut len = 0usize;
    for ch in digits.chars() {
        let digit = if is_hex {
            ch.to_digit(16)
        } else {
            ch.to_digit(10)
        };
        match digit {
            Some(d) => {
                value = value.saturating_mul(if is_hex { 16 } else { 10 }).saturating_add(d);
                if value > 0x10FFFF {
                    overflowed = true;
                }
                len += 1;
            }
            None => break,
        }
    }

    if len == 0 {
        if digits.is_empty() && !eos {
            return CharRefStep::NeedMoreInput;
        }
        errors.push(ParseError::new(
            ParseErrorCode::AbsenceOfDigitsInNumericCharacterReference,
            at,
        ));
        out.push_str(&input[..digits_at]);
        return CharRefStep::Consumed(digits_at);
    }

    let after = &digits[len..];
    let mut consumed = digits_at + len;
    match after.chars().next() {
        Some(';') => consumed += 1,
        Some(_) => {
            errors.push(ParseError::new(
                ParseErrorCode::MissingSemicolonAfterCharacterReference,
                at,
            ));
        }
        None => {
            if !eos {
                return CharRefStep::NeedMoreInput;
            }
            errors.push(ParseError::new(
                ParseErrorCode::MissingSemicolonAfterCharacterReference,
                at,
            ));
        }
    }

    out.push(decode_scalar(value, overflowed, at, errors));
    CharRefStep::Consumed(consumed)
}

// Windows-1252 remapping for numeric references in the C1 control range.
#[rustfmt::skip]
const C1_REMAP: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

fn decode_scalar(value: u32, overflowed: bool, at: usize, errors: &mut Vec<ParseError>) -> char {
    if overflowed || value > 0x10FFFF {
        errors.push(ParseError::new(
            ParseErrorCode::CharacterReferenceOutsideUnicodeRange,
            at,
        ));
        return '\u{FFFD}';
    }
    if value == 0 {
        errors.push(ParseError::new(ParseErrorCode::NullCharacterReference, at));
        return '\u{FFFD}';
    }
    if (0xD800..=0xDFFF).contains(&value) {
        errors.push(ParseError::new(ParseErrorCode::SurrogateCharacterReference, at));
        return '\u{FFFD}';
    }
    if (0x80..=0x9F).contains(&value) {
        errors.push(ParseError::new(ParseErrorCode::ControlCharacterReference, at));
        return C1_REMAP[(value - 0x80) as usize];
    }
    let ch = char::from_u32(value).unwrap_or('\u{FFFD}');
    if (0xFDD0..=0xFDEF).contains(&value) || (value & 0xFFFE) == 0xFFFE {
        errors.push(ParseError::new(
            ParseErrorCode::NoncharacterCharacterReference,
            at,
        ));
    } else if value < 0x20 && !matches!(value, 0x09 | 0x0A | 0x0C | 0x0D) {
        errors.push(ParseError::new(ParseErrorCode::ControlCharacterReference, at));
    }
    ch
}

#[cfg(test)]
mod tests {
    use super::{step_char_ref, CharRefStep};

    fn run(input: &str, eos: bool, in_attr: bool) -> (CharRefStep, String, usize) {
        let mut out = String::new();
        let mut errors = Vec::new();
        let step = step_char_ref(input, eos, in_attr, 0, &mut out, &mut errors);
        (step, out, errors.len())
    }

    #[test]
    fn named_with_semicolon_decodes() {
        let (step, out, errs) = run("&amp;rest", true, false);
        assert_eq!(step, CharRefStep::Consumed(5));
        assert_eq!(out, "&");
        assert_eq!(errs, 0);
    }

    #[test]
    fn bare_name_in_attr_before_alnum_stays_literal() {
        let (step, out, errs) = run("&ampx", true, true);
        assert_eq!(step, CharRefStep::Consumed(4));
        assert_eq!(out, "&amp");
        assert_eq!(errs, 0);
    }

    #[test]
    fn bare_name_in_data_decodes_with_error() {
        let (step, out, errs) = run("&ampx", true, false);
        assert_eq!(step, CharRefStep::Consumed(4));
        assert_eq!(out, "&");
        assert_eq!(errs, 1);
    }

    #[test]
    fn numeric_hex_decodes() {
        let (step, out, errs) = run("&#x41;", true, false);
        assert_eq!(step, CharRefStep::Consumed(6));
        assert_eq!(out, "A");
        assert_eq!(errs, 0);
    }

    #[test]
    fn out_of_range_numeric_becomes_replacement() {
        let (_, out, errs) = run("&#x110000;", true, false);
        assert_eq!(out, "\u{FFFD}");
        assert_eq!(errs, 1);
    }

    #[test]
    fn c1_control_remaps_via_windows_1252() {
        let (_, out, errs) = run("&#x80;", true, false);
        assert_eq!(out, "\u{20AC}");
        assert_eq!(errs, 1);
    }

    #[test]
    fn chunk_boundary_inside_name_requests_more_input() {
        let (step, _, _) = run("&am", false, false);
        assert_eq!(step, CharRefStep::NeedMoreInput);
    }

    #[test]
    fn lone_ampersand_at_eof_is_literal() {
        let (step, out, errs) = run("&", true, false);
        assert_eq!(step, CharRefStep::Consumed(1));
        assert_eq!(out, "&");
        assert_eq!(errs, 0);
    }
}
