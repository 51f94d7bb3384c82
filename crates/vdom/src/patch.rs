//! Diff/patch: reconcile a render's VNode tree against the previous one with
//! minimal mutation of the live document.
//!
//! Child-list reconciliation is the four-pointer keyed diff: identity match
//! at the old/new start/end pointers first, then a key scan bounded by the
//! remaining range, then create/insert. Keyed reorders reuse every live node
//! and perform moves only.

use dom::{Document, NodeId, Ns};

use crate::vnode::{VKind, VNode};

/// Mount a fresh tree under `parent`, binding `elm` on every vnode.
pub fn mount(doc: &mut Document, parent: NodeId, new: &mut VNode) {
    create_into(doc, parent, new, None);
}

/// Mount a fresh list of trees under `parent`.
pub fn mount_list(doc: &mut Document, parent: NodeId, new: &mut [VNode]) {
    for vnode in new {
        create_into(doc, parent, vnode, None);
    }
}

/// Patch `new` against `old`. When the roots have the same identity this
/// updates in place; otherwise the old tree is replaced wholesale.
pub fn patch(doc: &mut Document, old: &VNode, new: &mut VNode) {
    if old.same_identity(new) {
        patch_vnode(doc, old, new);
        return;
    }
    let anchor = first_elm(old);
    if let Some(elm) = anchor
        && let Some(parent) = doc.parent(elm)
    {
        create_into(doc, parent, new, anchor);
    }
    remove_vnode(doc, old);
}

/// Patch sibling lists bound to the same `parent` (component root renders).
pub fn patch_list(doc: &mut Document, parent: NodeId, old: Vec<VNode>, new: &mut [VNode]) {
    update_children(doc, parent, old, new);
}

fn insert(doc: &mut Document, parent: NodeId, node: NodeId, before: Option<NodeId>) {
    match before {
        Some(before) => doc.insert_before(parent, node, before),
        None => doc.append_child(parent, node),
    }
}

/// Create live nodes for `vnode` under `parent`, before `before`.
fn create_into(doc: &mut Document, parent: NodeId, vnode: &mut VNode, before: Option<NodeId>) {
    match &mut vnode.kind {
        VKind::Element { tag, attrs, children } => {
            let ns = if tag == "svg" { Ns::Svg } else { Ns::Html };
            let elm = doc.create_element(ns, tag);
            for (name, value) in attrs.iter() {
                doc.set_attribute(elm, name, value);
            }
            insert(doc, parent, elm, before);
            for child in children {
                create_into(doc, elm, child, None);
            }
            vnode.elm = Some(elm);
        }
        VKind::Text { text } => {
            let elm = doc.create_text_node(text);
            insert(doc, parent, elm, before);
            vnode.elm = Some(elm);
        }
        VKind::Slot { fallback, .. } => {
            // Marker comment first, fallback content as following siblings.
            // The hydration pass rewrites the marker text later.
            let marker = doc.create_comment_node("");
            insert(doc, parent, marker, before);
            for child in fallback {
                create_into(doc, parent, child, before);
            }
            vnode.elm = Some(marker);
        }
    }
}

fn patch_vnode(doc: &mut Document, old: &VNode, new: &mut VNode) {
    debug_assert!(old.same_identity(new), "patch_vnode requires same identity");
    new.elm = old.elm;
    let Some(elm) = new.elm else { return };
    match (&old.kind, &mut new.kind) {
        (VKind::Text { text: old_text }, VKind::Text { text }) => {
            if old_text != text {
                doc.set_text(elm, text);
            }
        }
        (
            VKind::Element { attrs: old_attrs, children: old_children, .. },
            VKind::Element { attrs, children, .. },
        ) => {
            update_element(doc, elm, old_attrs, attrs);
            update_children(doc, elm, old_children.clone(), children);
        }
        (VKind::Slot { fallback: old_fallback, .. }, VKind::Slot { fallback, .. }) => {
            let same_shape = old_fallback.len() == fallback.len()
                && old_fallback
                    .iter()
                    .zip(fallback.iter())
                    .all(|(a, b)| a.same_identity(b));
            if same_shape {
                for (old_fb, new_fb) in old_fallback.iter().zip(fallback.iter_mut()) {
                    patch_vnode(doc, old_fb, new_fb);
                }
            } else if let Some(parent) = doc.parent(elm) {
                // Reshape: rebuild the fallback region right after the marker.
                for old_fb in old_fallback {
                    remove_vnode(doc, old_fb);
                }
                let anchor = doc.next_sibling(elm);
                for new_fb in fallback {
                    create_into(doc, parent, new_fb, anchor);
                }
            }
        }
        _ => unreachable!("same_identity guarantees matching kinds"),
    }
}

/// Attribute diff: set added/changed attributes, remove absent ones.
pub fn update_element(
    doc: &mut Document,
    elm: NodeId,
    old_attrs: &[(String, String)],
    new_attrs: &[(String, String)],
) {
    for (name, value) in new_attrs {
        let previous = old_attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v);
        if previous != Some(value) {
            doc.set_attribute(elm, name, value);
        }
    }
    for (name, _) in old_attrs {
        if !new_attrs.iter().any(|(n, _)| n == name) {
            doc.remove_attribute(elm, name);
        }
    }
}

fn update_children(doc: &mut Document, parent: NodeId, old: Vec<VNode>, new: &mut [VNode]) {
    let mut old: Vec<Option<VNode>> = old.into_iter().map(Some).collect();
    let mut old_start: usize = 0;
    let mut old_end: isize = old.len() as isize - 1;
    let mut new_start: usize = 0;
    let mut new_end: isize = new.len() as isize - 1;

    while old_start as isize <= old_end && new_start as isize <= new_end {
        if old[old_start].is_none() {
            old_start += 1;
            continue;
        }
        if old[old_end as usize].is_none() {
            old_end -= 1;
            continue;
        }
        if old[old_start].as_ref().is_some_and(|o| o.same_identity(&new[new_start])) {
            let old_node = old[old_start].take().expect("checked above");
            patch_vnode(doc, &old_node, &mut new[new_start]);
            old_start += 1;
            new_start += 1;
        } else if old[old_end as usize]
            .as_ref()
            .is_some_and(|o| o.same_identity(&new[new_end as usize]))
        {
            let old_node = old[old_end as usize].take().expect("checked above");
            patch_vnode(doc, &old_node, &mut new[new_end as usize]);
            old_end -= 1;
            new_end -= 1;
        } else if old[old_start]
            .as_ref()
            .is_some_and(|o| o.same_identity(&new[new_end as usize]))
        {
            // Old start moved right: re-anchor after the old end node.
            let anchor = old[old_end as usize]
                .as_ref()
                .and_then(last_elm)
                .and_then(|e| doc.next_sibling(e));
            let old_node = old[old_start].take().expect("checked above");
            patch_vnode(doc, &old_node, &mut new[new_end as usize]);
            move_vnode(doc, parent, &new[new_end as usize], anchor);
            old_start += 1;
            new_end -= 1;
        } else if old[old_end as usize]
            .as_ref()
            .is_some_and(|o| o.same_identity(&new[new_start]))
        {
            // Old end moved left: re-anchor before the old start node.
            let anchor = old[old_start].as_ref().and_then(first_elm);
            let old_node = old[old_end as usize].take().expect("checked above");
            patch_vnode(doc, &old_node, &mut new[new_start]);
            move_vnode(doc, parent, &new[new_start], anchor);
            old_end -= 1;
            new_start += 1;
        } else {
            let anchor = old[old_start].as_ref().and_then(first_elm);
            let found = new[new_start].key.is_some().then(|| {
                (old_start..=old_end as usize)
                    .find(|&i| old[i].as_ref().is_some_and(|o| o.same_identity(&new[new_start])))
            });
            match found.flatten() {
                Some(index) => {
                    let old_node = old[index].take().expect("found above");
                    patch_vnode(doc, &old_node, &mut new[new_start]);
                    move_vnode(doc, parent, &new[new_start], anchor);
                }
                None => create_into(doc, parent, &mut new[new_start], anchor),
            }
            new_start += 1;
        }
    }

    if old_start as isize > old_end {
        // Net insertions, anchored before the first already-patched suffix
        // node (or appended when the suffix is empty).
        let anchor = usize::try_from(new_end + 1)
            .ok()
            .and_then(|i| new.get(i))
            .and_then(first_elm);
        let mut index = new_start;
        while index as isize <= new_end {
            create_into(doc, parent, &mut new[index], anchor);
            index += 1;
        }
    } else if new_start as isize > new_end {
        let mut index = old_start;
        while index as isize <= old_end {
            if let Some(old_node) = old[index].take() {
                remove_vnode(doc, &old_node);
            }
            index += 1;
        }
    }
}

/// First live node of a vnode (slot: the marker).
fn first_elm(vnode: &VNode) -> Option<NodeId> {
    vnode.elm
}

/// Last live node of a vnode (slot: the last fallback node, if any).
fn last_elm(vnode: &VNode) -> Option<NodeId> {
    match &vnode.kind {
        VKind::Slot { fallback, .. } => fallback.last().and_then(last_elm).or(vnode.elm),
        _ => vnode.elm,
    }
}

/// Move every live node of `vnode` before `before` under `parent`.
fn move_vnode(doc: &mut Document, parent: NodeId, vnode: &VNode, before: Option<NodeId>) {
    if let Some(elm) = vnode.elm {
        insert(doc, parent, elm, before);
    }
    if let VKind::Slot { fallback, .. } = &vnode.kind {
        for fb in fallback {
            move_vnode(doc, parent, fb, before);
        }
    }
}

/// Detach every live node of `vnode`.
pub(crate) fn remove_vnode(doc: &mut Document, vnode: &VNode) {
    if let Some(elm) = vnode.elm {
        doc.detach(elm);
    }
    if let VKind::Slot { fallback, .. } = &vnode.kind {
        for fb in fallback {
            remove_vnode(doc, fb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{mount_list, patch_list, update_element};
    use crate::vnode::VNode;
    use dom::{Document, NodeId, Ns};

    fn container(doc: &mut Document) -> NodeId {
        let el = doc.create_element(Ns::Html, "div");
        let root = doc.root();
        doc.append_child(root, el);
        el
    }

    fn keyed_list(keys: &[&str]) -> Vec<VNode> {
        keys.iter()
            .map(|k| VNode::element("li").key(k).child(VNode::text(*k)))
            .collect()
    }

    fn child_texts(doc: &Document, parent: NodeId) -> Vec<String> {
        doc.children(parent)
            .iter()
            .map(|&c| doc.text_content(c))
            .collect()
    }

    #[test]
    fn keyed_reorder_reuses_every_node() {
        let mut doc = Document::new();
        let parent = container(&mut doc);
        let mut old = keyed_list(&["A", "B", "C"]);
        mount_list(&mut doc, parent, &mut old);
        let before: Vec<NodeId> = old.iter().map(|v| v.elm.unwrap()).collect();

        let mut new = keyed_list(&["C", "A", "B"]);
        patch_list(&mut doc, parent, old, &mut new);

        assert_eq!(child_texts(&doc, parent), ["C", "A", "B"]);
        // Move-only: the same three live nodes, no creates or destroys.
        let after: Vec<NodeId> = new.iter().map(|v| v.elm.unwrap()).collect();
        assert_eq!(after[0], before[2]);
        assert_eq!(after[1], before[0]);
        assert_eq!(after[2], before[1]);
        assert_eq!(doc.children(parent).len(), 3);
    }

    #[test]
    fn keyed_insert_and_remove_touch_only_the_edits() {
        let mut doc = Document::new();
        let parent = container(&mut doc);
        let mut old = keyed_list(&["A", "B", "C"]);
        mount_list(&mut doc, parent, &mut old);
        let kept_a = old[0].elm.unwrap();
        let kept_c = old[2].elm.unwrap();

        let mut new = keyed_list(&["A", "X", "C", "Y"]);
        patch_list(&mut doc, parent, old, &mut new);
        assert_eq!(child_texts(&doc, parent), ["A", "X", "C", "Y"]);
        assert_eq!(new[0].elm.unwrap(), kept_a);
        assert_eq!(new[2].elm.unwrap(), kept_c);
    }

    #[test]
    fn text_nodes_update_character_data_in_place() {
        let mut doc = Document::new();
        let parent = container(&mut doc);
        let mut old = vec![VNode::element("p").child(VNode::text("one"))];
        mount_list(&mut doc, parent, &mut old);
        let p = old[0].elm.unwrap();

        let mut new = vec![VNode::element("p").child(VNode::text("two"))];
        patch_list(&mut doc, parent, old, &mut new);
        assert_eq!(new[0].elm.unwrap(), p);
        assert_eq!(doc.text_content(p), "two");
    }

    #[test]
    fn attribute_diff_sets_and_removes() {
        let mut doc = Document::new();
        let el = container(&mut doc);
        let old = [
            ("class".to_string(), "a".to_string()),
            ("gone".to_string(), "1".to_string()),
        ];
        let new = [
            ("class".to_string(), "b".to_string()),
            ("added".to_string(), "2".to_string()),
        ];
        doc.set_attribute(el, "class", "a");
        doc.set_attribute(el, "gone", "1");
        update_element(&mut doc, el, &old, &new);
        assert_eq!(doc.get_attribute(el, "class"), Some("b"));
        assert_eq!(doc.get_attribute(el, "added"), Some("2"));
        assert_eq!(doc.get_attribute(el, "gone"), None);
    }

    #[test]
    fn mismatched_roots_are_replaced() {
        let mut doc = Document::new();
        let parent = container(&mut doc);
        let mut old = vec![VNode::element("span").child(VNode::text("x"))];
        mount_list(&mut doc, parent, &mut old);

        let mut new = vec![VNode::element("em").child(VNode::text("y"))];
        patch_list(&mut doc, parent, old, &mut new);
        assert_eq!(doc.children(parent).len(), 1);
        let only = doc.children(parent)[0];
        assert_eq!(doc.element(only).unwrap().name, "em");
        assert_eq!(doc.text_content(only), "y");
    }

    #[test]
    fn unkeyed_lists_reconcile_positionally() {
        let mut doc = Document::new();
        let parent = container(&mut doc);
        let mut old = vec![
            VNode::element("p").child(VNode::text("a")),
            VNode::element("p").child(VNode::text("b")),
        ];
        mount_list(&mut doc, parent, &mut old);
        let elms: Vec<NodeId> = old.iter().map(|v| v.elm.unwrap()).collect();

        let mut new = vec![
            VNode::element("p").child(VNode::text("b")),
            VNode::element("p").child(VNode::text("c")),
        ];
        patch_list(&mut doc, parent, old, &mut new);
        assert_eq!(child_texts(&doc, parent), ["b", "c"]);
        assert_eq!(new[0].elm.unwrap(), elms[0]);
        assert_eq!(new[1].elm.unwrap(), elms[1]);
    }
}
