//! Node storage: arena slots with a tagged-union payload.
//!
//! Nodes are addressed by [`NodeId`] indices into the owning document's slot
//! vector. Parent links are non-owning back-references; children own nothing
//! either, so tearing down a document is dropping the vector.
//!
//! Invariants:
//! - A node has exactly one parent or none; child order is insertion order.
//! - The tree is acyclic; mutation helpers detach before re-attaching.
//! - Slots are never reused within one document's lifetime, so a `NodeId`
//!   stays valid (possibly detached) until the document is dropped.

use html::{AttrNs, Ns, TagId};

/// Index of a node in its owning document's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Namespace-qualified attribute. Lookup is (namespace, name)-keyed; the
/// namespace-qualified form takes precedence over the plain one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub ns: Option<AttrNs>,
    pub name: String,
    pub value: String,
}

/// Element payload.
#[derive(Clone, Debug)]
pub struct ElementData {
    /// Tag name as serialized (lowercase for HTML, canonical mixed case for
    /// foreign content).
    pub name: String,
    pub tag_id: TagId,
    pub ns: Ns,
    pub attrs: Vec<Attr>,
    /// `<template>` content fragment, created on first access.
    pub template_content: Option<NodeId>,
    /// Shadow-root fragment attached by the component runtime.
    pub shadow_root: Option<NodeId>,
}

/// Kind-specific payload of a node.
#[derive(Clone, Debug)]
pub enum NodeData {
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element(ElementData),
    Text(String),
    Comment(String),
    /// Detached subtree container (template content, shadow roots,
    /// fragment-parse results).
    Fragment,
}

/// One arena slot.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&str> {
        match &self.data {
            NodeData::Comment(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }
}

impl ElementData {
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.ns.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn get_attr_ns(&self, ns: Option<AttrNs>, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.ns == ns && a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Space-separated `class` attribute tokens.
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.get_attr("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }
}
