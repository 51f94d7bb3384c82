//! Chunk-equivalence: splitting the input at an arbitrary boundary yields
//! the same tree as a single-shot parse.

#![no_main]

use libfuzzer_sys::fuzz_target;

use dom::{
    parse_document, serialize_node_to_html, ParseOptions, ParseSession, SerializeOptions,
};

fuzz_target!(|data: &[u8]| {
    let Some((&split_byte, rest)) = data.split_first() else {
        return;
    };
    let input = String::from_utf8_lossy(rest).into_owned();
    if input.is_empty() {
        return;
    }
    let mut split = split_byte as usize % (input.len() + 1);
    while !input.is_char_boundary(split) {
        split -= 1;
    }

    let whole = parse_document(&input, &ParseOptions::default());
    let mut session = ParseSession::new(&ParseOptions::default());
    session.push_str(&input[..split]);
    session.push_str(&input[split..]);
    let chunked = session.finish();

    let opts = SerializeOptions::default();
    assert_eq!(
        serialize_node_to_html(&whole.document, whole.root, &opts),
        serialize_node_to_html(&chunked.document, chunked.root, &opts),
    );
});
