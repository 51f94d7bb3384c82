//! Abstract tree-adapter interface consumed by the tree constructor.
//!
//! The construction algorithm never owns the tree; it mutates a document
//! through this trait so the same algorithm can target the engine's own
//! document model or a host DOM.
//!
//! Invariants:
//! - Handles are opaque, copyable, and stable for the lifetime of one parse.
//! - `append`/`insert_before` detach the child from any previous parent; a
//!   node has at most one parent at all times.
//! - Child ordering is explicit and deterministic.

use crate::html5::shared::{Attribute, ParseError};
use crate::tags::TagId;

/// Element namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ns {
    Html,
    Svg,
    MathMl,
}

/// Attribute namespace for namespaced foreign attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrNs {
    XLink,
    Xml,
    XmlNs,
}

impl AttrNs {
    /// Serialization prefix for this namespace.
    pub fn prefix(self) -> &'static str {
        match self {
            AttrNs::XLink => "xlink",
            AttrNs::Xml => "xml",
            AttrNs::XmlNs => "xmlns",
        }
    }
}

/// Document quirks mode resolved from the doctype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuirksMode {
    #[default]
    NoQuirks,
    LimitedQuirks,
    Quirks,
}

/// Namespace-qualified element attribute as placed in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElemAttr {
    pub ns: Option<AttrNs>,
    pub name: String,
    pub value: String,
}

impl ElemAttr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            ns: None,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn from_token_attr(attr: &Attribute) -> Self {
        Self {
            ns: None,
            name: attr.name.clone(),
            value: attr.value.clone(),
        }
    }
}

/// Tree mutation interface.
///
/// The tree builder keeps its own view of element names/namespaces on the
/// stack of open elements; sink implementations only store and mutate.
pub trait TreeSink {
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Root document handle.
    fn document(&mut self) -> Self::Handle;

    fn create_element(
        &mut self,
        ns: Ns,
        name: &str,
        tag_id: TagId,
        attrs: Vec<ElemAttr>,
    ) -> Self::Handle;

    fn create_comment(&mut self, text: &str) -> Self::Handle;

    /// Append `child` as the last child of `parent`, detaching it first if
    /// it already has a parent.
    fn append(&mut self, parent: Self::Handle, child: Self::Handle);

    /// Insert `child` immediately before `sibling` under `sibling`'s parent
    /// (foster-parenting path; `sibling` is guaranteed to have a parent).
    fn append_before_sibling(&mut self, sibling: Self::Handle, child: Self::Handle);

    /// Append text, coalescing with a trailing text-node child if present.
    fn append_text(&mut self, parent: Self::Handle, text: &str);

    /// Insert text immediately before `sibling`, coalescing with the
    /// preceding sibling when that sibling is a text node.
    fn insert_text_before_sibling(&mut self, sibling: Self::Handle, text: &str);

    /// Whether the node is currently attached to a parent.
    fn has_parent(&self, node: Self::Handle) -> bool;

    fn append_doctype(&mut self, name: &str, public_id: &str, system_id: &str);

    /// Add attributes that are not already present (used for `<html>`/`<body>`
    /// attribute merging on duplicate start tags).
    fn add_attrs_if_missing(&mut self, el: Self::Handle, attrs: Vec<ElemAttr>);

    fn remove_from_parent(&mut self, node: Self::Handle);

    /// Move every child of `from` to the end of `to`'s child list.
    fn reparent_children(&mut self, from: Self::Handle, to: Self::Handle);

    /// The template-content fragment associated with a `<template>` element,
    /// created on first access.
    fn template_content(&mut self, el: Self::Handle) -> Self::Handle;

    fn set_quirks_mode(&mut self, mode: QuirksMode);

    /// Recoverable parse condition; must not abort construction.
    fn parse_error(&mut self, err: ParseError);
}
