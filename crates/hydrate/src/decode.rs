//! Client-side decoder: turns annotated markup back into a structural map
//! for exactly one host, ignoring markers that belong to other hosts.

use dom::{parse_document, Document, NodeData, NodeId, ParseOptions};

use crate::markers::{Marker, NodeRef, HOST_ID_ATTR, NODE_ID_ATTR};

/// Structural description of one annotated node.
#[derive(Clone, Debug, PartialEq)]
pub struct HydratedNode {
    /// The live node in the decoded document (for text anchors, the text
    /// node the marker precedes).
    pub elm: NodeId,
    pub node_ref: NodeRef,
    pub kind: HydratedKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HydratedKind {
    Element { tag: String },
    Text { text: String },
    Slot { name: Option<String> },
}

/// One `o.` marker belonging to the decoded host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginalLocationRef {
    pub marker: NodeId,
    pub node_id: u32,
    pub nested: bool,
}

/// Everything recovered for one host id.
#[derive(Clone, Debug, Default)]
pub struct HydratedHost {
    pub host_id: u32,
    /// The element carrying `s-id="<host_id>"`, when present.
    pub root: Option<NodeId>,
    /// Annotated nodes in document order.
    pub nodes: Vec<HydratedNode>,
    pub original_locations: Vec<OriginalLocationRef>,
}

impl HydratedHost {
    /// Node ids in document order, the inverse of the minted sequence.
    pub fn node_ids(&self) -> Vec<u32> {
        self.nodes.iter().map(|n| n.node_ref.node_id).collect()
    }
}

/// Decode annotated markup for one host id.
pub fn client_hydrate_html(html: &str, host_id: u32) -> (Document, HydratedHost) {
    let outcome = parse_document(html, &ParseOptions::default());
    let decoded = client_hydrate(&outcome.document, outcome.root, host_id);
    (outcome.document, decoded)
}

/// Decode an already-built document for one host id.
pub fn client_hydrate(doc: &Document, root: NodeId, host_id: u32) -> HydratedHost {
    let mut result = HydratedHost {
        host_id,
        ..HydratedHost::default()
    };
    doc.walk(root, &mut |id| match doc.node(id).data() {
        NodeData::Element(el) => {
            if result.root.is_none()
                && el.get_attr(HOST_ID_ATTR) == Some(host_id.to_string().as_str())
            {
                result.root = Some(id);
            }
            if let Some(node_ref) = el.get_attr(NODE_ID_ATTR).and_then(NodeRef::parse)
                && node_ref.host_id == host_id
            {
                result.nodes.push(HydratedNode {
                    elm: id,
                    node_ref,
                    kind: HydratedKind::Element {
                        tag: el.name.clone(),
                    },
                });
            }
        }
        NodeData::Comment(text) => match Marker::parse(text) {
            Some(Marker::TextAnchor(node_ref)) if node_ref.host_id == host_id => {
                let Some(next) = doc.next_sibling(id) else { return };
                if let Some(text) = doc.node(next).as_text() {
                    result.nodes.push(HydratedNode {
                        elm: next,
                        node_ref,
                        kind: HydratedKind::Text {
                            text: text.to_string(),
                        },
                    });
                }
            }
            Some(Marker::Slot(node_ref, name)) if node_ref.host_id == host_id => {
                result.nodes.push(HydratedNode {
                    elm: id,
                    node_ref,
                    kind: HydratedKind::Slot { name },
                });
            }
            Some(Marker::OriginalLocation {
                host_id: owner,
                node_id,
                nested,
            }) if owner == host_id => {
                result.original_locations.push(OriginalLocationRef {
                    marker: id,
                    node_id,
                    nested,
                });
            }
            _ => {}
        },
        _ => {}
    });
    result
}
