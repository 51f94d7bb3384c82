//! Virtual-node model.
//!
//! A `VNode` tree is one component render's declarative output. It is
//! ephemeral: produced by `render`, reconciled against the previous tree,
//! then kept only as the baseline for the next render. `elm` is the binding
//! to the live node once patched.

use dom::NodeId;

/// Kind-specific payload.
#[derive(Clone, Debug, PartialEq)]
pub enum VKind {
    Element {
        /// ASCII-lowercase tag name.
        tag: String,
        /// Attributes in declaration order.
        attrs: Vec<(String, String)>,
        children: Vec<VNode>,
    },
    Text {
        text: String,
    },
    /// Content-projection placeholder. Mounts as a marker comment; fallback
    /// children render as following siblings and are shown only while no
    /// light-DOM content is assigned to the slot.
    Slot {
        /// `None` is the default slot.
        name: Option<String>,
        fallback: Vec<VNode>,
    },
}

/// One virtual node.
#[derive(Clone, Debug, PartialEq)]
pub struct VNode {
    pub kind: VKind,
    /// Reconciliation key; list diffing matches keyed nodes by identity.
    pub key: Option<String>,
    /// Live node bound by the last patch.
    pub elm: Option<NodeId>,
}

impl VNode {
    pub fn element(tag: &str) -> VNode {
        VNode {
            kind: VKind::Element {
                tag: tag.to_ascii_lowercase(),
                attrs: Vec::new(),
                children: Vec::new(),
            },
            key: None,
            elm: None,
        }
    }

    pub fn text(text: impl Into<String>) -> VNode {
        VNode {
            kind: VKind::Text { text: text.into() },
            key: None,
            elm: None,
        }
    }

    pub fn slot(name: Option<&str>) -> VNode {
        VNode {
            kind: VKind::Slot {
                name: name.map(str::to_string),
                fallback: Vec::new(),
            },
            key: None,
            elm: None,
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> VNode {
        if let VKind::Element { attrs, .. } = &mut self.kind {
            attrs.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn key(mut self, key: &str) -> VNode {
        self.key = Some(key.to_string());
        self
    }

    pub fn child(mut self, node: VNode) -> VNode {
        if let VKind::Element { children, .. } = &mut self.kind {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = VNode>) -> VNode {
        if let VKind::Element { children, .. } = &mut self.kind {
            children.extend(nodes);
        }
        self
    }

    pub fn fallback(mut self, nodes: impl IntoIterator<Item = VNode>) -> VNode {
        if let VKind::Slot { fallback, .. } = &mut self.kind {
            fallback.extend(nodes);
        }
        self
    }

    /// Whether `other` reconciles against this node in place: same kind
    /// (and tag, for elements) and same key.
    pub fn same_identity(&self, other: &VNode) -> bool {
        if self.key != other.key {
            return false;
        }
        match (&self.kind, &other.kind) {
            (VKind::Element { tag: a, .. }, VKind::Element { tag: b, .. }) => a == b,
            (VKind::Text { .. }, VKind::Text { .. }) => true,
            (VKind::Slot { name: a, .. }, VKind::Slot { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{VKind, VNode};

    #[test]
    fn builders_assemble_the_expected_shape() {
        let node = VNode::element("ul")
            .attr("class", "menu")
            .children([
                VNode::element("li").key("a").child(VNode::text("A")),
                VNode::element("li").key("b").child(VNode::text("B")),
            ]);
        let VKind::Element { tag, attrs, children } = &node.kind else {
            panic!("expected element");
        };
        assert_eq!(tag, "ul");
        assert_eq!(attrs[0], ("class".to_string(), "menu".to_string()));
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].key.as_deref(), Some("b"));
    }

    #[test]
    fn identity_requires_matching_kind_tag_and_key() {
        assert!(VNode::element("div").same_identity(&VNode::element("div")));
        assert!(!VNode::element("div").same_identity(&VNode::element("p")));
        assert!(!VNode::element("div").same_identity(&VNode::text("x")));
        assert!(!VNode::element("div").key("a").same_identity(&VNode::element("div").key("b")));
        assert!(VNode::slot(Some("top")).same_identity(&VNode::slot(Some("top"))));
        assert!(!VNode::slot(None).same_identity(&VNode::slot(Some("top"))));
    }
}
