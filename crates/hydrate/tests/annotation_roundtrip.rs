//! End-to-end hydration protocol: render, annotate, serialize, decode.

use dom::{parse_fragment, serialize_node_to_html, Document, NodeId, ParseOptions, SerializeOptions};
use hydrate::{client_hydrate_html, insert_vdom_annotations, HydratedKind};
use vdom::{render_host, HostState, VNode};

fn two_host_page() -> (Document, NodeId, HostState, HostState) {
    let outcome = parse_fragment(
        "<x-card><span slot=\"top\">T</span></x-card><x-note>hello</x-note>",
        "div",
        &ParseOptions::default(),
    );
    let mut doc = outcome.document;
    let root = outcome.root;
    let card = doc.children(root)[0];
    let note = doc.children(root)[1];

    let mut card_state = HostState::new(&mut doc, card);
    render_host(
        &mut doc,
        &mut card_state,
        vec![
            VNode::element("header").child(VNode::slot(Some("top"))),
            VNode::element("p").child(VNode::text("body")),
        ],
    );

    let mut note_state = HostState::new(&mut doc, note);
    render_host(
        &mut doc,
        &mut note_state,
        vec![VNode::element("div").child(VNode::slot(None))],
    );

    (doc, root, card_state, note_state)
}

fn serialize(doc: &Document, root: NodeId) -> String {
    serialize_node_to_html(
        doc,
        root,
        &SerializeOptions {
            serialize_shadow_roots: true,
            ..SerializeOptions::default()
        },
    )
}

#[test]
fn round_trip_recovers_exactly_the_minted_ids() {
    let (mut doc, root, card_state, note_state) = two_host_page();
    let summary = insert_vdom_annotations(&mut doc, &[&card_state, &note_state], &[]);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].tag, "x-card");
    assert_eq!(summary[0].host_id, 0);
    assert_eq!(summary[1].host_id, 1);

    let html = serialize(&doc, root);
    let (_, decoded) = client_hydrate_html(&html, 0);
    assert!(decoded.root.is_some());
    assert_eq!(decoded.node_ids(), summary[0].node_ids);
    assert!(decoded.nodes.iter().all(|n| n.node_ref.host_id == 0));

    let (_, other) = client_hydrate_html(&html, 1);
    assert_eq!(other.node_ids(), summary[1].node_ids);
    // Id spaces are disjoint: node ids are monotonic across the document.
    assert!(summary[0]
        .node_ids
        .iter()
        .all(|id| !summary[1].node_ids.contains(id)));
}

#[test]
fn decoding_ignores_markers_of_other_hosts() {
    let (mut doc, root, card_state, note_state) = two_host_page();
    insert_vdom_annotations(&mut doc, &[&card_state, &note_state], &[]);
    let html = serialize(&doc, root);

    let (_, decoded) = client_hydrate_html(&html, 7);
    assert!(decoded.root.is_none());
    assert!(decoded.nodes.is_empty());
    assert!(decoded.original_locations.is_empty());
}

#[test]
fn slots_text_and_original_locations_decode_structurally() {
    let (mut doc, root, card_state, note_state) = two_host_page();
    insert_vdom_annotations(&mut doc, &[&card_state, &note_state], &[]);
    let html = serialize(&doc, root);

    let (_, card) = client_hydrate_html(&html, 0);
    let slots: Vec<_> = card
        .nodes
        .iter()
        .filter_map(|n| match &n.kind {
            HydratedKind::Slot { name } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(slots, vec![Some("top".to_string())]);
    // The relocated <span slot="top"> left one original-location marker.
    assert_eq!(card.original_locations.len(), 1);
    let span = card
        .nodes
        .iter()
        .find(|n| matches!(&n.kind, HydratedKind::Element { tag } if tag == "span"))
        .expect("relocated span is annotated");
    assert_eq!(card.original_locations[0].node_id, span.node_ref.node_id);
    assert!(!card.original_locations[0].nested);

    let (_, note) = client_hydrate_html(&html, 1);
    let texts: Vec<_> = note
        .nodes
        .iter()
        .filter_map(|n| match &n.kind {
            HydratedKind::Text { text } => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["hello".to_string()]);
}

#[test]
fn static_components_get_only_a_host_id() {
    let (mut doc, root, card_state, note_state) = two_host_page();
    let summary = insert_vdom_annotations(
        &mut doc,
        &[&card_state, &note_state],
        &["x-note".to_string()],
    );
    assert!(summary[1].node_ids.is_empty());

    let html = serialize(&doc, root);
    assert!(html.contains("<x-note s-id=\"1\">"));
    let (_, note) = client_hydrate_html(&html, 1);
    assert!(note.root.is_some());
    assert!(note.nodes.is_empty());
}
