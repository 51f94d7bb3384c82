//! Stack of open elements.
//!
//! Each entry keeps the sink handle plus the tag identity the algorithms
//! match on, so scope probes never call back into the sink.

use crate::sink::Ns;
use crate::tags::TagId;

/// Entry in the stack of open elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OpenEntry<H: Copy + Eq> {
    pub(crate) handle: H,
    pub(crate) tag_id: TagId,
    pub(crate) ns: Ns,
    pub(crate) name: String,
    /// HTML integration point (SVG `foreignObject`/`desc`/`title`, or
    /// `annotation-xml` with an HTML encoding attribute). Decided at
    /// element-creation time because it depends on attributes.
    pub(crate) html_ip: bool,
}

/// Scope flavors used by end-tag and auto-close handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    /// Baseline "has an element in scope".
    InScope,
    Button,
    ListItem,
    Table,
    Select,
}

/// Stack of open elements with namespace-aware scope probes.
#[derive(Clone, Debug)]
pub(crate) struct OpenElements<H: Copy + Eq> {
    items: Vec<OpenEntry<H>>,
}

impl<H: Copy + Eq> Default for OpenElements<H> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<H: Copy + Eq> OpenElements<H> {
    pub(crate) fn push(&mut self, entry: OpenEntry<H>) {
        self.items.push(entry);
    }

    pub(crate) fn pop(&mut self) -> Option<OpenEntry<H>> {
        self.items.pop()
    }

    pub(crate) fn current(&self) -> Option<&OpenEntry<H>> {
        self.items.last()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&OpenEntry<H>> {
        self.items.get(index)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub(crate) fn insert(&mut self, index: usize, entry: OpenEntry<H>) {
        self.items.insert(index, entry);
    }

    pub(crate) fn remove(&mut self, index: usize) -> OpenEntry<H> {
        self.items.remove(index)
    }

    pub(crate) fn replace(&mut self, index: usize, entry: OpenEntry<H>) {
        self.items[index] = entry;
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &OpenEntry<H>> + ExactSizeIterator {
        self.items.iter()
    }

    pub(crate) fn index_of(&self, handle: H) -> Option<usize> {
        self.items.iter().rposition(|e| e.handle == handle)
    }

    pub(crate) fn contains(&self, handle: H) -> bool {
        self.index_of(handle).is_some()
    }

    /// Topmost entry with one of the given HTML tag ids, if any.
    pub(crate) fn topmost(&self, tag_id: TagId) -> Option<usize> {
        self.items
            .iter()
            .rposition(|e| e.ns == Ns::Html && e.tag_id == tag_id)
    }

    /// Walk top-down for a matching HTML element until a scope boundary.
    pub(crate) fn has_in_scope(&self, target: TagId, kind: ScopeKind) -> bool {
        self.find_in_scope(target, kind).is_some()
    }

    pub(crate) fn find_in_scope(&self, target: TagId, kind: ScopeKind) -> Option<usize> {
        for index in (0..self.items.len()).rev() {
            let entry = &self.items[index];
            if entry.ns == Ns::Html && entry.tag_id == target {
                return Some(index);
            }
            if is_scope_boundary(entry, kind) {
                return None;
            }
        }
        None
    }

    /// Scope probe for a specific element rather than a tag name (used by
    /// the adoption agency and `<a>`/`<nobr>` handling).
    pub(crate) fn has_element_in_scope(&self, handle: H, kind: ScopeKind) -> bool {
        for index in (0..self.items.len()).rev() {
            let entry = &self.items[index];
            if entry.handle == handle {
                return true;
            }
            if is_scope_boundary(entry, kind) {
                return false;
            }
        }
        false
    }

    /// Pop up to and including the topmost HTML element with the given id.
    pub(crate) fn pop_until_tag(&mut self, tag_id: TagId) -> Option<OpenEntry<H>> {
        let index = self.topmost(tag_id)?;
        self.items.truncate(index + 1);
        self.items.pop()
    }

    /// Pop up to and including the given handle.
    pub(crate) fn pop_until_handle(&mut self, handle: H) -> Option<OpenEntry<H>> {
        let index = self.index_of(handle)?;
        self.items.truncate(index + 1);
        self.items.pop()
    }

}

fn is_scope_boundary<H: Copy + Eq>(entry: &OpenEntry<H>, kind: ScopeKind) -> bool {
    match kind {
        ScopeKind::InScope => is_default_boundary(entry),
        ScopeKind::Button => {
            is_default_boundary(entry) || (entry.ns == Ns::Html && entry.tag_id == TagId::Button)
        }
        ScopeKind::ListItem => {
            is_default_boundary(entry)
                || (entry.ns == Ns::Html && matches!(entry.tag_id, TagId::Ol | TagId::Ul))
        }
        ScopeKind::Table => {
            entry.ns == Ns::Html
                && matches!(entry.tag_id, TagId::Html | TagId::Table | TagId::Template)
        }
        // Select scope inverts the rule: everything except optgroup/option
        // is a boundary.
        ScopeKind::Select => {
            !(entry.ns == Ns::Html && matches!(entry.tag_id, TagId::Optgroup | TagId::Option))
        }
    }
}

fn is_default_boundary<H: Copy + Eq>(entry: &OpenEntry<H>) -> bool {
    match entry.ns {
        Ns::Html => matches!(
            entry.tag_id,
            TagId::Applet
                | TagId::Caption
                | TagId::Html
                | TagId::Table
                | TagId::Td
                | TagId::Th
                | TagId::Marquee
                | TagId::Object
                | TagId::Template
        ),
        Ns::MathMl => matches!(
            entry.tag_id,
            TagId::Mi | TagId::Mo | TagId::Mn | TagId::Ms | TagId::Mtext | TagId::AnnotationXml
        ),
        Ns::Svg => matches!(
            entry.tag_id,
            TagId::ForeignObject | TagId::Desc | TagId::Title
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{OpenElements, OpenEntry, ScopeKind};
    use crate::sink::Ns;
    use crate::tags::TagId;

    fn entry(handle: u32, name: &str) -> OpenEntry<u32> {
        OpenEntry {
            handle,
            tag_id: TagId::from_name(name),
            ns: Ns::Html,
            name: name.to_string(),
            html_ip: false,
        }
    }

    fn foreign(handle: u32, name: &str, ns: Ns) -> OpenEntry<u32> {
        OpenEntry {
            handle,
            tag_id: TagId::from_name(name),
            ns,
            name: name.to_string(),
            html_ip: ns == Ns::Svg && matches!(name, "foreignobject" | "desc" | "title"),
        }
    }

    #[test]
    fn table_hides_elements_from_default_scope() {
        let mut stack = OpenElements::default();
        stack.push(entry(1, "html"));
        stack.push(entry(2, "p"));
        assert!(stack.has_in_scope(TagId::P, ScopeKind::InScope));
        stack.push(entry(3, "table"));
        assert!(!stack.has_in_scope(TagId::P, ScopeKind::InScope));
        // Table scope still sees the table itself.
        assert!(stack.has_in_scope(TagId::Table, ScopeKind::Table));
    }

    #[test]
    fn button_and_list_item_scopes_add_boundaries() {
        let mut stack = OpenElements::default();
        stack.push(entry(1, "html"));
        stack.push(entry(2, "p"));
        stack.push(entry(3, "button"));
        assert!(!stack.has_in_scope(TagId::P, ScopeKind::Button));
        assert!(stack.has_in_scope(TagId::P, ScopeKind::InScope));

        let mut list = OpenElements::default();
        list.push(entry(1, "html"));
        list.push(entry(2, "li"));
        list.push(entry(3, "ul"));
        assert!(!list.has_in_scope(TagId::Li, ScopeKind::ListItem));
    }

    #[test]
    fn svg_integration_points_bound_default_scope() {
        let mut stack = OpenElements::default();
        stack.push(entry(1, "html"));
        stack.push(entry(2, "b"));
        stack.push(foreign(3, "foreignobject", Ns::Svg));
        assert!(!stack.has_in_scope(TagId::B, ScopeKind::InScope));
    }

    #[test]
    fn select_scope_is_inverted() {
        let mut stack = OpenElements::default();
        stack.push(entry(1, "html"));
        stack.push(entry(2, "select"));
        stack.push(entry(3, "optgroup"));
        stack.push(entry(4, "option"));
        assert!(stack.has_in_scope(TagId::Select, ScopeKind::Select));
        let mut blocked = OpenElements::default();
        blocked.push(entry(1, "select"));
        blocked.push(entry(2, "div"));
        assert!(!blocked.has_in_scope(TagId::Select, ScopeKind::Select));
    }

    #[test]
    fn pop_until_tag_returns_matched_entry() {
        let mut stack = OpenElements::default();
        stack.push(entry(1, "html"));
        stack.push(entry(2, "div"));
        stack.push(entry(3, "span"));
        let popped = stack.pop_until_tag(TagId::Div).expect("div on stack");
        assert_eq!(popped.handle, 2);
        assert_eq!(stack.current().map(|e| e.handle), Some(1));
        assert!(stack.pop_until_tag(TagId::Div).is_none());
    }
}
