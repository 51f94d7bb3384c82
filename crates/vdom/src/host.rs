//! Per-host render state: shadow-tree patching, slot projection, and the
//! original-location bookkeeping that lets projected content return home.
//!
//! Projection protocol: a slot mounts as a marker comment in the rendered
//! tree. Light-DOM children of the host relocate to their assigned slot's
//! location; a comment is left behind at the source position and the
//! (content, marker) pair is recorded in a side table. Every re-render first
//! returns all relocated content, patches, then projects fresh, so slot
//! reassignment and unmount restore the light DOM exactly.

use dom::{Document, NodeData, NodeId};

use crate::patch::{patch_list, remove_vnode};
use crate::vnode::{VKind, VNode};

/// One relocated light-DOM node and the marker left at its original spot.
#[derive(Clone, Copy, Debug)]
pub struct Relocation {
    pub content: NodeId,
    pub marker: NodeId,
}

/// Render state for one component host element.
#[derive(Debug)]
pub struct HostState {
    host: NodeId,
    shadow: NodeId,
    rendered: Vec<VNode>,
    relocations: Vec<Relocation>,
}

impl HostState {
    /// Attach (or reuse) the host's shadow fragment as the render target.
    pub fn new(doc: &mut Document, host: NodeId) -> Self {
        let shadow = doc.attach_shadow(host);
        Self {
            host,
            shadow,
            rendered: Vec::new(),
            relocations: Vec::new(),
        }
    }

    pub fn host(&self) -> NodeId {
        self.host
    }

    pub fn shadow(&self) -> NodeId {
        self.shadow
    }

    pub fn rendered(&self) -> &[VNode] {
        &self.rendered
    }

    pub fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }

    /// Slot markers of the current render: (slot name, marker comment).
    pub fn slot_markers(&self) -> Vec<(Option<String>, NodeId)> {
        collect_slots(&self.rendered)
            .into_iter()
            .map(|s| (s.name, s.marker))
            .collect()
    }
}

/// Reconcile one render's output against the host's previous render, then
/// re-project slotted content.
pub fn render_host(doc: &mut Document, state: &mut HostState, mut new: Vec<VNode>) {
    return_relocated_content(doc, state);
    let old = std::mem::take(&mut state.rendered);
    patch_list(doc, state.shadow, old, &mut new);
    state.rendered = new;
    project_slots(doc, state);
}

/// Tear down the host's rendered tree, restoring the light DOM.
pub fn unmount_host(doc: &mut Document, state: &mut HostState) {
    return_relocated_content(doc, state);
    for vnode in state.rendered.drain(..) {
        remove_vnode(doc, &vnode);
    }
}

/// Undo every recorded relocation: content returns to its marker's position
/// and the marker is removed.
fn return_relocated_content(doc: &mut Document, state: &mut HostState) {
    for relocation in state.relocations.drain(..) {
        if let Some(parent) = doc.parent(relocation.marker) {
            doc.insert_before(parent, relocation.content, relocation.marker);
            doc.detach(relocation.marker);
        }
    }
}

#[derive(Debug)]
struct SlotBinding {
    name: Option<String>,
    marker: NodeId,
    fallback_elms: Vec<NodeId>,
}

fn project_slots(doc: &mut Document, state: &mut HostState) {
    let slots = collect_slots(&state.rendered);
    if slots.is_empty() {
        return;
    }
    // Anchors are captured before any move: content inserts between the
    // marker and its fallback region.
    let anchors: Vec<Option<NodeId>> = slots.iter().map(|s| doc.next_sibling(s.marker)).collect();
    let mut assigned = vec![0usize; slots.len()];

    let light: Vec<NodeId> = doc.children(state.host).to_vec();
    for content in light {
        let slot_name = match doc.node(content).data() {
            NodeData::Element(el) => el.get_attr("slot").map(str::to_string),
            NodeData::Text(_) => None,
            _ => continue,
        };
        let Some(index) = slots
            .iter()
            .position(|s| s.name.as_deref() == slot_name.as_deref())
        else {
            continue;
        };
        let marker = doc.create_comment_node("");
        doc.insert_before(state.host, marker, content);
        let slot_parent = doc
            .parent(slots[index].marker)
            .expect("slot marker is attached");
        match anchors[index] {
            Some(anchor) => doc.insert_before(slot_parent, content, anchor),
            None => doc.append_child(slot_parent, content),
        }
        state.relocations.push(Relocation { content, marker });
        assigned[index] += 1;
    }

    // Native-slot fallback visibility: fallback content shows only while the
    // slot has no assigned nodes.
    for (index, slot) in slots.iter().enumerate() {
        for &fb in &slot.fallback_elms {
            if !doc.node(fb).is_element() {
                continue;
            }
            if assigned[index] > 0 {
                doc.set_attribute(fb, "hidden", "");
            } else {
                doc.remove_attribute(fb, "hidden");
            }
        }
    }
}

fn collect_slots(vnodes: &[VNode]) -> Vec<SlotBinding> {
    let mut out = Vec::new();
    for vnode in vnodes {
        match &vnode.kind {
            VKind::Slot { name, fallback } => {
                if let Some(marker) = vnode.elm {
                    out.push(SlotBinding {
                        name: name.clone(),
                        marker,
                        fallback_elms: fallback.iter().filter_map(|f| f.elm).collect(),
                    });
                }
            }
            VKind::Element { children, .. } => out.extend(collect_slots(children)),
            VKind::Text { .. } => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{render_host, unmount_host, HostState};
    use crate::vnode::VNode;
    use dom::{
        parse_fragment, serialize_node_to_html, Document, NodeId, ParseOptions, SerializeOptions,
    };

    fn host_doc(inner: &str) -> (Document, NodeId) {
        let outcome = parse_fragment(
            &format!("<x-card>{inner}</x-card>"),
            "div",
            &ParseOptions::default(),
        );
        let host = outcome.document.children(outcome.root)[0];
        (outcome.document, host)
    }

    fn shadow_html(doc: &Document, state: &HostState) -> String {
        serialize_node_to_html(doc, state.shadow(), &SerializeOptions::default())
    }

    fn card_render() -> Vec<VNode> {
        vec![
            VNode::element("header").child(VNode::slot(Some("top"))),
            VNode::element("main")
                .child(VNode::slot(None).fallback([VNode::element("em").child(VNode::text("empty"))])),
        ]
    }

    #[test]
    fn light_content_relocates_to_its_slot() {
        let (mut doc, host) = host_doc("<span slot=\"top\">T</span>rest");
        let mut state = HostState::new(&mut doc, host);
        render_host(&mut doc, &mut state, card_render());

        assert_eq!(
            shadow_html(&doc, &state),
            "<header><!----><span slot=\"top\">T</span></header>\
             <main><!---->rest<em hidden>empty</em></main>"
        );
        // Two original-location markers remain in the light DOM.
        assert_eq!(doc.children(host).len(), 2);
        assert!(doc.children(host).iter().all(|&c| doc.node(c).as_comment().is_some()));
        assert_eq!(state.relocations().len(), 2);
    }

    #[test]
    fn fallback_shows_only_without_assigned_content() {
        let (mut doc, host) = host_doc("");
        let mut state = HostState::new(&mut doc, host);
        render_host(&mut doc, &mut state, card_render());
        assert!(shadow_html(&doc, &state).contains("<em>empty</em>"));

        let (mut doc, host) = host_doc("filled");
        let mut state = HostState::new(&mut doc, host);
        render_host(&mut doc, &mut state, card_render());
        assert!(shadow_html(&doc, &state).contains("<em hidden>empty</em>"));
    }

    #[test]
    fn unmount_restores_the_light_dom() {
        let (mut doc, host) = host_doc("<span slot=\"top\">T</span>rest");
        let mut state = HostState::new(&mut doc, host);
        render_host(&mut doc, &mut state, card_render());
        unmount_host(&mut doc, &mut state);

        let html = serialize_node_to_html(&doc, host, &SerializeOptions::default());
        assert_eq!(html, "<x-card><span slot=\"top\">T</span>rest</x-card>");
        assert!(doc.children(state.shadow()).is_empty());
        assert!(state.relocations().is_empty());
    }

    #[test]
    fn rerender_reprojects_after_slot_reassignment() {
        let (mut doc, host) = host_doc("<span slot=\"top\">T</span>");
        let mut state = HostState::new(&mut doc, host);
        render_host(&mut doc, &mut state, card_render());
        assert!(shadow_html(&doc, &state).contains("<header><!----><span"));

        // The slot disappears: content must return to the light DOM.
        let new = vec![VNode::element("main").child(VNode::slot(None))];
        render_host(&mut doc, &mut state, new);
        assert!(state.relocations().is_empty());
        let light = doc.children(host).to_vec();
        assert_eq!(light.len(), 1);
        assert_eq!(doc.text_content(light[0]), "T");
    }
}
