//! Any byte stream parses to some tree, serializes, and reparses without
//! panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

use dom::{parse_document, serialize_node_to_html, ParseOptions, SerializeOptions};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let outcome = parse_document(&input, &ParseOptions::default());
    let html = serialize_node_to_html(&outcome.document, outcome.root, &SerializeOptions::default());
    let _ = parse_document(&html, &ParseOptions::default());
});
