//! CSS parsing recovers per rule and never panics; whatever parsed must
//! serialize, and the serialized form must parse again without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

use css::parse_css;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let outcome = parse_css(&input);
    let serialized = outcome.stylesheet.to_css();
    let _ = parse_css(&serialized);
});
