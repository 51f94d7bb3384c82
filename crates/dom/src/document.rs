//! Arena document: node storage, mutation API, and the parser sink.

use html::{AttrNs, ElemAttr, Ns, ParseError, QuirksMode, TagId, TreeSink};

use crate::node::{Attr, ElementData, Node, NodeData, NodeId};

/// An HTML document (or detached fragment container).
///
/// All nodes live in one slot vector owned by the document; handles are
/// [`NodeId`] indices. Nodes removed from the tree stay allocated (detached)
/// until the document is dropped, which keeps every handle valid for the
/// document's lifetime.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    quirks: QuirksMode,
    pub(crate) parse_errors: Vec<ParseError>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            quirks: QuirksMode::NoQuirks,
            parse_errors: Vec::new(),
        }
    }

    /// Root document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id).data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    // ---- construction ----

    fn new_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("node arena exceeds u32 indices"));
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    pub fn create_element(&mut self, ns: Ns, name: &str) -> NodeId {
        let tag_id = TagId::from_name(&name.to_ascii_lowercase());
        self.new_node(NodeData::Element(ElementData {
            name: name.to_string(),
            tag_id,
            ns,
            attrs: Vec::new(),
            template_content: None,
            shadow_root: None,
        }))
    }

    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.new_node(NodeData::Text(text.to_string()))
    }

    pub fn create_comment_node(&mut self, text: &str) -> NodeId {
        self.new_node(NodeData::Comment(text.to_string()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.new_node(NodeData::Fragment)
    }

    // ---- mutation ----

    /// Detach a node from its parent, leaving the slot allocated.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != node);
        }
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            !self.is_ancestor_of(child, parent),
            "append_child would create a cycle"
        );
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Insert `child` immediately before `before` under `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) {
        debug_assert!(
            !self.is_ancestor_of(child, parent),
            "insert_before would create a cycle"
        );
        self.detach(child);
        let index = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == before)
            .unwrap_or(self.node(parent).children.len());
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.insert(index, child);
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(child).parent == Some(parent) {
            self.detach(child);
        }
    }

    fn is_ancestor_of(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.node(current).parent;
        }
        false
    }

    // ---- attributes ----

    pub fn get_attribute(&self, el: NodeId, name: &str) -> Option<&str> {
        self.element(el)?.get_attr(name)
    }

    pub fn get_attribute_ns(&self, el: NodeId, ns: Option<AttrNs>, name: &str) -> Option<&str> {
        self.element(el)?.get_attr_ns(ns, name)
    }

    pub fn set_attribute(&mut self, el: NodeId, name: &str, value: &str) {
        self.set_attribute_ns(el, None, name, value);
    }

    pub fn set_attribute_ns(&mut self, el: NodeId, ns: Option<AttrNs>, name: &str, value: &str) {
        let Some(element) = self.element_mut(el) else { return };
        match element.attrs.iter_mut().find(|a| a.ns == ns && a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => element.attrs.push(Attr {
                ns,
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attribute(&mut self, el: NodeId, name: &str) {
        if let Some(element) = self.element_mut(el) {
            element.attrs.retain(|a| !(a.ns.is_none() && a.name == name));
        }
    }

    // ---- structured access ----

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&c| self.node(c).is_element())
    }

    pub fn head(&self) -> Option<NodeId> {
        self.find_root_child(TagId::Head)
    }

    pub fn body(&self) -> Option<NodeId> {
        self.find_root_child(TagId::Body)
    }

    fn find_root_child(&self, tag: TagId) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&c| self.element(c).is_some_and(|e| e.tag_id == tag))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.node(node).data {
            NodeData::Text(text) => out.push_str(text),
            _ => {
                for &child in self.children(node) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Overwrite a text node's character data. No-op on other kinds.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let NodeData::Text(existing) = &mut self.node_mut(node).data {
            existing.clear();
            existing.push_str(text);
        }
    }

    /// Overwrite a comment node's data. No-op on other kinds.
    pub fn set_comment_text(&mut self, node: NodeId, text: &str) {
        if let NodeData::Comment(existing) = &mut self.node_mut(node).data {
            existing.clear();
            existing.push_str(text);
        }
    }

    /// The sibling immediately after `node`, if any.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == node)?;
        siblings.get(index + 1).copied()
    }

    /// Replace all children with a single text node (empty text removes all).
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        let children: Vec<NodeId> = self.children(node).to_vec();
        for child in children {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text_node(text);
            self.append_child(node, text_node);
        }
    }

    /// Depth-first preorder walk of the subtree rooted at `node`, including
    /// template-content and shadow-root fragments.
    pub fn walk(&self, node: NodeId, visit: &mut impl FnMut(NodeId)) {
        visit(node);
        if let Some(el) = self.element(node) {
            let extra: Vec<NodeId> = el
                .template_content
                .into_iter()
                .chain(el.shadow_root)
                .collect();
            for fragment in extra {
                self.walk(fragment, visit);
            }
        }
        for &child in self.children(node) {
            self.walk(child, visit);
        }
    }

    /// All descendant element ids in preorder.
    pub fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(node, &mut |id| {
            if self.node(id).is_element() {
                out.push(id);
            }
        });
        out
    }

    /// `<template>` content fragment, created on first access.
    pub fn template_content(&mut self, el: NodeId) -> NodeId {
        if let Some(content) = self.element(el).and_then(|e| e.template_content) {
            return content;
        }
        let content = self.create_fragment();
        if let Some(element) = self.element_mut(el) {
            element.template_content = Some(content);
        }
        content
    }

    /// Attach (or return the existing) shadow-root fragment.
    pub fn attach_shadow(&mut self, el: NodeId) -> NodeId {
        if let Some(root) = self.element(el).and_then(|e| e.shadow_root) {
            return root;
        }
        let root = self.create_fragment();
        if let Some(element) = self.element_mut(el) {
            element.shadow_root = Some(root);
        }
        root
    }

    pub(crate) fn take_parse_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.parse_errors)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSink for Document {
    type Handle = NodeId;

    fn document(&mut self) -> NodeId {
        self.root()
    }

    fn create_element(&mut self, ns: Ns, name: &str, tag_id: TagId, attrs: Vec<ElemAttr>) -> NodeId {
        let attrs = attrs
            .into_iter()
            .map(|a| Attr {
                ns: a.ns,
                name: a.name,
                value: a.value,
            })
            .collect();
        self.new_node(NodeData::Element(ElementData {
            name: name.to_string(),
            tag_id,
            ns,
            attrs,
            template_content: None,
            shadow_root: None,
        }))
    }

    fn create_comment(&mut self, text: &str) -> NodeId {
        self.create_comment_node(text)
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.append_child(parent, child);
    }

    fn append_before_sibling(&mut self, sibling: NodeId, child: NodeId) {
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        self.insert_before(parent, child, sibling);
    }

    fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.node(parent).children.last()
            && let NodeData::Text(existing) = &mut self.node_mut(last).data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text_node(text);
        self.append_child(parent, node);
    }

    fn insert_text_before_sibling(&mut self, sibling: NodeId, text: &str) {
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        let index = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == sibling)
            .unwrap_or(0);
        if index > 0 {
            let prev = self.node(parent).children[index - 1];
            if let NodeData::Text(existing) = &mut self.node_mut(prev).data {
                existing.push_str(text);
                return;
            }
        }
        let node = self.create_text_node(text);
        self.insert_before(parent, node, sibling);
    }

    fn append_doctype(&mut self, name: &str, public_id: &str, system_id: &str) {
        let node = self.new_node(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
        let root = self.root();
        self.append_child(root, node);
    }

    fn add_attrs_if_missing(&mut self, el: NodeId, attrs: Vec<ElemAttr>) {
        let Some(element) = self.element_mut(el) else { return };
        for attr in attrs {
            if !element
                .attrs
                .iter()
                .any(|a| a.ns == attr.ns && a.name == attr.name)
            {
                element.attrs.push(Attr {
                    ns: attr.ns,
                    name: attr.name,
                    value: attr.value,
                });
            }
        }
    }

    fn remove_from_parent(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.node_mut(from).children);
        for &child in &children {
            self.node_mut(child).parent = Some(to);
        }
        self.node_mut(to).children.extend(children);
    }

    fn template_content(&mut self, el: NodeId) -> NodeId {
        Document::template_content(self, el)
    }

    fn has_parent(&self, node: NodeId) -> bool {
        self.node(node).parent.is_some()
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks = mode;
    }

    fn parse_error(&mut self, err: ParseError) {
        self.parse_errors.push(err);
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use html::Ns;

    #[test]
    fn mutation_keeps_single_parent_invariant() {
        let mut doc = Document::new();
        let a = doc.create_element(Ns::Html, "div");
        let b = doc.create_element(Ns::Html, "span");
        let root = doc.root();
        doc.append_child(root, a);
        doc.append_child(a, b);
        assert_eq!(doc.parent(b), Some(a));

        let c = doc.create_element(Ns::Html, "p");
        doc.append_child(root, c);
        doc.append_child(c, b);
        assert_eq!(doc.parent(b), Some(c));
        assert!(doc.children(a).is_empty());
    }

    #[test]
    fn insert_before_orders_children() {
        let mut doc = Document::new();
        let parent = doc.create_element(Ns::Html, "ul");
        let first = doc.create_element(Ns::Html, "li");
        let second = doc.create_element(Ns::Html, "li");
        doc.append_child(parent, second);
        doc.insert_before(parent, first, second);
        assert_eq!(doc.children(parent), &[first, second]);
    }

    #[test]
    fn namespaced_attribute_lookup_takes_precedence() {
        use html::AttrNs;
        let mut doc = Document::new();
        let el = doc.create_element(Ns::Svg, "use");
        doc.set_attribute_ns(el, Some(AttrNs::XLink), "href", "#icon");
        doc.set_attribute(el, "href", "plain");
        assert_eq!(
            doc.get_attribute_ns(el, Some(AttrNs::XLink), "href"),
            Some("#icon")
        );
        assert_eq!(doc.get_attribute(el, "href"), Some("plain"));
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let mut doc = Document::new();
        let div = doc.create_element(Ns::Html, "div");
        let b = doc.create_element(Ns::Html, "b");
        let t1 = doc.create_text_node("a");
        let t2 = doc.create_text_node("b");
        doc.append_child(div, t1);
        doc.append_child(div, b);
        doc.append_child(b, t2);
        assert_eq!(doc.text_content(div), "ab");
        doc.set_text_content(div, "c");
        assert_eq!(doc.text_content(div), "c");
        assert_eq!(doc.children(div).len(), 1);
    }
}
