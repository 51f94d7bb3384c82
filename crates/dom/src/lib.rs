//! Arena document model: node storage, mutation, parse drivers, selector
//! queries, and the HTML serializer.
//!
//! Every parse owns a freshly-constructed [`Document`]; nothing is shared
//! across concurrent operations. Node handles are plain indices that stay
//! valid (possibly detached) for the document's lifetime.

pub mod document;
pub mod node;
pub mod parse;
pub mod select;
pub mod serialize;

pub use document::Document;
pub use node::{Attr, ElementData, Node, NodeData, NodeId};
pub use parse::{
    find_first, parse_document, parse_fragment, ParseOptions, ParseOutcome, ParseSession,
};
pub use select::{query_selector, query_selector_all, SelectorList};
pub use serialize::{serialize_node_to_html, SerializeOptions};

// The parser's shared vocabulary, re-exported so downstream crates can stay
// off the `html` crate entirely.
pub use html::{AttrNs, Ns, ParseError, ParseErrorCode, QuirksMode, TagId};
