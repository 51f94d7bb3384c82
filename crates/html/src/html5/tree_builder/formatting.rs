//! Active formatting elements list.
//!
//! Entries keep the originating token's name and attributes so misnested
//! formatting elements can be cloned during the adoption agency algorithm.
//! Duplicate growth is bounded by the Noah's Ark clause: at most
//! `NOAHS_ARK_CAP` structurally-identical entries per marker segment.

use crate::html5::shared::Attribute;
use crate::tags::TagId;

/// Structurally-identical duplicate cap, fixed at 3 by the HTML standard;
/// conformance fixtures depend on the exact value.
pub(crate) const NOAHS_ARK_CAP: usize = 3;

#[derive(Clone, Debug)]
pub(crate) enum FormattingItem<H: Copy + Eq> {
    /// Scope marker pushed when entering applet/object/marquee/template/
    /// caption/td/th.
    Marker,
    Entry(FormattingEntry<H>),
}

#[derive(Clone, Debug)]
pub(crate) struct FormattingEntry<H: Copy + Eq> {
    pub(crate) handle: H,
    pub(crate) tag_id: TagId,
    pub(crate) name: String,
    pub(crate) attrs: Vec<Attribute>,
}

#[derive(Clone, Debug)]
pub(crate) struct FormattingList<H: Copy + Eq> {
    items: Vec<FormattingItem<H>>,
}

impl<H: Copy + Eq> Default for FormattingList<H> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<H: Copy + Eq> FormattingList<H> {
    pub(crate) fn push_marker(&mut self) {
        self.items.push(FormattingItem::Marker);
    }

    /// Push an entry, enforcing the Noah's Ark clause.
    pub(crate) fn push_entry(&mut self, entry: FormattingEntry<H>) {
        let segment_start = self.last_marker_index().map_or(0, |i| i + 1);
        let mut duplicates = Vec::new();
        for (index, item) in self.items.iter().enumerate().skip(segment_start) {
            if let FormattingItem::Entry(existing) = item
                && existing.tag_id == entry.tag_id
                && existing.name == entry.name
                && same_attrs(&existing.attrs, &entry.attrs)
            {
                duplicates.push(index);
            }
        }
        if duplicates.len() >= NOAHS_ARK_CAP {
            self.items.remove(duplicates[0]);
        }
        self.items.push(FormattingItem::Entry(entry));
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&FormattingItem<H>> {
        self.items.get(index)
    }

    pub(crate) fn insert_entry(&mut self, index: usize, entry: FormattingEntry<H>) {
        self.items.insert(index, FormattingItem::Entry(entry));
    }

    pub(crate) fn remove(&mut self, index: usize) -> FormattingItem<H> {
        self.items.remove(index)
    }

    pub(crate) fn replace_entry(&mut self, index: usize, entry: FormattingEntry<H>) {
        self.items[index] = FormattingItem::Entry(entry);
    }

    /// Pop items down to and including the last marker.
    pub(crate) fn clear_to_last_marker(&mut self) {
        while let Some(item) = self.items.pop() {
            if matches!(item, FormattingItem::Marker) {
                break;
            }
        }
    }

    fn last_marker_index(&self) -> Option<usize> {
        self.items
            .iter()
            .rposition(|item| matches!(item, FormattingItem::Marker))
    }

    /// Find the latest entry for an HTML tag after the last marker.
    pub(crate) fn find_after_marker(&self, tag_id: TagId) -> Option<usize> {
        let segment_start = self.last_marker_index().map_or(0, |i| i + 1);
        (segment_start..self.items.len()).rev().find(|&index| {
            matches!(&self.items[index], FormattingItem::Entry(e) if e.tag_id == tag_id)
        })
    }

    pub(crate) fn index_of_handle(&self, handle: H) -> Option<usize> {
        self.items.iter().rposition(
            |item| matches!(item, FormattingItem::Entry(e) if e.handle == handle),
        )
    }

    pub(crate) fn contains_handle(&self, handle: H) -> bool {
        self.index_of_handle(handle).is_some()
    }

    /// Entries after the last marker, bottom-up, for reconstruction.
    pub(crate) fn segment_range(&self) -> std::ops::Range<usize> {
        let start = self.last_marker_index().map_or(0, |i| i + 1);
        start..self.items.len()
    }
}

fn same_attrs(a: &[Attribute], b: &[Attribute]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .all(|attr| b.iter().any(|other| other.name == attr.name && other.value == attr.value))
}

#[cfg(test)]
mod tests {
    use super::{FormattingEntry, FormattingItem, FormattingList, NOAHS_ARK_CAP};
    use crate::tags::TagId;

    fn entry(handle: u32) -> FormattingEntry<u32> {
        FormattingEntry {
            handle,
            tag_id: TagId::B,
            name: "b".to_string(),
            attrs: Vec::new(),
        }
    }

    #[test]
    fn noahs_ark_caps_identical_entries() {
        let mut list = FormattingList::default();
        for i in 0..5 {
            list.push_entry(entry(i));
        }
        let entries: Vec<u32> = (0..list.len())
            .filter_map(|i| match list.get(i) {
                Some(FormattingItem::Entry(e)) => Some(e.handle),
                _ => None,
            })
            .collect();
        assert_eq!(entries.len(), NOAHS_ARK_CAP);
        // Earliest duplicates are evicted first.
        assert_eq!(entries, vec![2, 3, 4]);
    }

    #[test]
    fn marker_resets_the_duplicate_segment() {
        let mut list = FormattingList::default();
        for i in 0..3 {
            list.push_entry(entry(i));
        }
        list.push_marker();
        list.push_entry(entry(10));
        // All four entries survive: the marker bounds the ark segment.
        assert_eq!(list.len(), 5);
        list.clear_to_last_marker();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn find_after_marker_ignores_older_segments() {
        let mut list = FormattingList::default();
        list.push_entry(entry(1));
        list.push_marker();
        assert_eq!(list.find_after_marker(TagId::B), None);
        list.push_entry(entry(2));
        let found = list.find_after_marker(TagId::B).expect("entry in segment");
        assert!(matches!(
            list.get(found),
            Some(FormattingItem::Entry(e)) if e.handle == 2
        ));
    }
}
