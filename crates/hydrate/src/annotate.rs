//! Annotation writer: stamps host/node identifiers into a rendered tree so a
//! client can re-attach to server-rendered markup.
//!
//! Ids are monotonic per document and never reused within one pass. Hosts
//! are numbered in document order; node ids run across all hosts. Structural
//! indexes (`depth`, `index`) are computed over the tree as rendered, before
//! any anchors are inserted, so the client sees the same coordinates the
//! server minted.

use std::collections::HashMap;

use dom::{Document, NodeData, NodeId};
use vdom::HostState;

use crate::markers::{Marker, NodeRef, HOST_ID_ATTR, NODE_ID_ATTR};

/// Summary of one annotated host, returned for inspection and tests.
#[derive(Clone, Debug)]
pub struct AnnotatedHost {
    pub host: NodeId,
    pub tag: String,
    pub host_id: u32,
    /// Node ids minted inside this host's rendered subtree.
    pub node_ids: Vec<u32>,
}

enum Op {
    SetAttr(NodeId, &'static str, String),
    RewriteComment(NodeId, String),
    /// Insert a fresh comment with the given text before the node.
    InsertAnchorBefore(NodeId, String),
}

/// Walk the document depth-first and annotate every rendered host.
///
/// Hosts whose tag name appears in `static_component_tags` receive only the
/// host id attribute; their subtree needs no per-node re-attachment.
pub fn insert_vdom_annotations(
    doc: &mut Document,
    hosts: &[&HostState],
    static_component_tags: &[String],
) -> Vec<AnnotatedHost> {
    // Hosts annotate in document order regardless of render order.
    let order = document_positions(doc);
    let mut sorted: Vec<&HostState> = hosts.to_vec();
    sorted.sort_by_key(|state| order.get(&state.host()).copied().unwrap_or(usize::MAX));

    let shadow_hosts: HashMap<NodeId, NodeId> =
        hosts.iter().map(|s| (s.shadow(), s.host())).collect();

    let mut ops = Vec::new();
    let mut annotated = Vec::new();
    let mut next_node_id: u32 = 0;

    for (host_index, state) in sorted.iter().enumerate() {
        let host_id = u32::try_from(host_index).expect("host count fits u32");
        let tag = match doc.element(state.host()) {
            Some(el) => el.name.clone(),
            None => continue,
        };
        ops.push(Op::SetAttr(state.host(), HOST_ID_ATTR, host_id.to_string()));
        if static_component_tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            annotated.push(AnnotatedHost {
                host: state.host(),
                tag,
                host_id,
                node_ids: Vec::new(),
            });
            continue;
        }

        let nested = is_nested_host(doc, state.host(), &shadow_hosts);
        let slot_names: HashMap<NodeId, Option<String>> = state
            .slot_markers()
            .into_iter()
            .map(|(name, marker)| (marker, name))
            .collect();
        let relocation_markers: HashMap<NodeId, NodeId> = state
            .relocations()
            .iter()
            .map(|r| (r.content, r.marker))
            .collect();

        let mut node_ids = Vec::new();
        let children: Vec<NodeId> = doc.children(state.shadow()).to_vec();
        annotate_level(
            doc,
            &children,
            host_id,
            0,
            nested,
            &slot_names,
            &relocation_markers,
            &mut next_node_id,
            &mut node_ids,
            &mut ops,
        );
        annotated.push(AnnotatedHost {
            host: state.host(),
            tag,
            host_id,
            node_ids,
        });
    }

    apply(doc, ops);
    log::debug!(
        "annotated {} host(s), {} node id(s) minted",
        annotated.len(),
        next_node_id
    );
    annotated
}

#[allow(clippy::too_many_arguments)]
fn annotate_level(
    doc: &Document,
    siblings: &[NodeId],
    host_id: u32,
    depth: u32,
    nested: bool,
    slot_names: &HashMap<NodeId, Option<String>>,
    relocation_markers: &HashMap<NodeId, NodeId>,
    next_node_id: &mut u32,
    node_ids: &mut Vec<u32>,
    ops: &mut Vec<Op>,
) {
    for (position, &node) in siblings.iter().enumerate() {
        let index = u32::try_from(position).expect("sibling index fits u32");
        match doc.node(node).data() {
            NodeData::Element(_) => {
                let node_ref = mint(host_id, depth, index, next_node_id, node_ids);
                ops.push(Op::SetAttr(node, NODE_ID_ATTR, node_ref.encode()));
                if let Some(&marker) = relocation_markers.get(&node) {
                    ops.push(Op::RewriteComment(
                        marker,
                        original_location(host_id, node_ref.node_id, nested),
                    ));
                }
                let children: Vec<NodeId> = doc.children(node).to_vec();
                annotate_level(
                    doc,
                    &children,
                    host_id,
                    depth + 1,
                    nested,
                    slot_names,
                    relocation_markers,
                    next_node_id,
                    node_ids,
                    ops,
                );
            }
            NodeData::Text(_) => {
                let node_ref = mint(host_id, depth, index, next_node_id, node_ids);
                ops.push(Op::InsertAnchorBefore(
                    node,
                    Marker::TextAnchor(node_ref).encode(),
                ));
                if let Some(&marker) = relocation_markers.get(&node) {
                    ops.push(Op::RewriteComment(
                        marker,
                        original_location(host_id, node_ref.node_id, nested),
                    ));
                }
            }
            NodeData::Comment(_) => {
                if let Some(name) = slot_names.get(&node) {
                    let node_ref = mint(host_id, depth, index, next_node_id, node_ids);
                    ops.push(Op::RewriteComment(
                        node,
                        Marker::Slot(node_ref, name.clone()).encode(),
                    ));
                }
                // Ordinary comments carry no identity.
            }
            _ => {}
        }
    }
}

fn mint(
    host_id: u32,
    depth: u32,
    index: u32,
    next_node_id: &mut u32,
    node_ids: &mut Vec<u32>,
) -> NodeRef {
    let node_id = *next_node_id;
    *next_node_id += 1;
    node_ids.push(node_id);
    NodeRef {
        host_id,
        node_id,
        depth,
        index,
    }
}

fn original_location(host_id: u32, node_id: u32, nested: bool) -> String {
    Marker::OriginalLocation {
        host_id,
        node_id,
        nested,
    }
    .encode()
}

/// Whether `host` sits inside some other host's shadow tree.
fn is_nested_host(doc: &Document, host: NodeId, shadow_hosts: &HashMap<NodeId, NodeId>) -> bool {
    let mut cursor = host;
    loop {
        match doc.parent(cursor) {
            Some(parent) => cursor = parent,
            // Detached subtree roots are fragments; a shadow fragment here
            // means the host renders inside another component.
            None => return shadow_hosts.contains_key(&cursor),
        }
    }
}

fn document_positions(doc: &Document) -> HashMap<NodeId, usize> {
    let mut order = HashMap::new();
    doc.walk(doc.root(), &mut |id| {
        let next = order.len();
        order.insert(id, next);
    });
    order
}

fn apply(doc: &mut Document, ops: Vec<Op>) {
    for op in ops {
        match op {
            Op::SetAttr(node, name, value) => doc.set_attribute(node, name, &value),
            Op::RewriteComment(node, text) => doc.set_comment_text(node, &text),
            Op::InsertAnchorBefore(node, text) => {
                if let Some(parent) = doc.parent(node) {
                    let anchor = doc.create_comment_node(&text);
                    doc.insert_before(parent, anchor, node);
                }
            }
        }
    }
}
