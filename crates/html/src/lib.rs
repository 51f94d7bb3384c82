//! Spec-grade HTML parsing: a streaming HTML5 tokenizer and the
//! tree-construction algorithm, decoupled from any concrete document model
//! through the [`sink::TreeSink`] trait.
//!
//! The pipeline is a cooperative pull loop: the tokenizer reports
//! `NeedMoreInput` at chunk boundaries and resumes when more text arrives;
//! the tree constructor consumes the token stream and answers with explicit
//! directives (raw-text mode switches) instead of reaching back into the
//! tokenizer.

pub mod entities;
pub mod html5;
pub mod sink;
pub mod tags;

pub use html5::shared::{Attribute, ParseError, ParseErrorCode, Token};
pub use html5::tokenizer::{RawKind, TokenizeResult, Tokenizer, TokenizerConfig, TokenizerStats};
pub use html5::tree_builder::{BuilderStep, FragmentContext, TreeBuilder, TreeBuilderConfig};
pub use sink::{AttrNs, ElemAttr, Ns, QuirksMode, TreeSink};
pub use tags::TagId;
