//! CSS parsing and used-selector pruning.
//!
//! The parser recovers per rule (one diagnostic, skip, continue); the
//! pruning pass is conservative and only drops a rule when every one of its
//! selector clauses is provably unable to match the final tree.

pub mod prune;
pub mod syntax;

pub use prune::{remove_unused_styles, UsedSelectors};
pub use syntax::{
    parse_css, AtBody, AtRule, CssParseOutcome, Declaration, Rule, StyleRule, Stylesheet,
};
