//! Compound-selector matching for `query_selector`-style lookups.
//!
//! Supports the selector subset components actually use against server
//! documents: tag names, `#id`, `.class`, `[attr]`, `[attr=value]`, `*`, the
//! descendant combinator, and comma-separated selector lists. Anything
//! richer belongs to a dedicated selector engine, not the document model.

use crate::document::Document;
use crate::node::NodeId;

/// One simple-selector sequence (`ul.menu`, `#top`, `[hidden]`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    universal: bool,
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCheck>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrCheck {
    name: String,
    value: Option<String>,
}

/// Parsed selector list: alternatives, each a descendant chain ending at the
/// subject compound.
#[derive(Clone, Debug)]
pub struct SelectorList {
    alternatives: Vec<Vec<Compound>>,
}

impl SelectorList {
    /// Parse a selector string. Returns `None` when no alternative parses,
    /// mirroring `querySelector`'s behavior of matching nothing rather than
    /// failing the caller.
    pub fn parse(input: &str) -> Option<SelectorList> {
        let alternatives: Vec<Vec<Compound>> = input
            .split(',')
            .filter_map(parse_chain)
            .collect();
        if alternatives.is_empty() {
            return None;
        }
        Some(SelectorList { alternatives })
    }

    /// Whether `el` is matched by any alternative, checking ancestors for
    /// the non-subject compounds.
    pub fn matches(&self, doc: &Document, el: NodeId) -> bool {
        self.alternatives.iter().any(|chain| {
            let (subject, ancestors) = match chain.split_last() {
                Some(split) => split,
                None => return false,
            };
            if !compound_matches(doc, el, subject) {
                return false;
            }
            // Each remaining compound must match some strict ancestor, in
            // order from the subject outward.
            let mut cursor = doc.parent(el);
            for compound in ancestors.iter().rev() {
                loop {
                    let Some(current) = cursor else { return false };
                    cursor = doc.parent(current);
                    if compound_matches(doc, current, compound) {
                        break;
                    }
                }
            }
            true
        })
    }
}

/// First element in preorder under `root` matching `selector`.
pub fn query_selector(doc: &Document, root: NodeId, selector: &str) -> Option<NodeId> {
    let list = SelectorList::parse(selector)?;
    let mut found = None;
    doc.walk(root, &mut |id| {
        if found.is_none() && id != root && doc.node(id).is_element() && list.matches(doc, id) {
            found = Some(id);
        }
    });
    found
}

/// All elements in preorder under `root` matching `selector`.
pub fn query_selector_all(doc: &Document, root: NodeId, selector: &str) -> Vec<NodeId> {
    let Some(list) = SelectorList::parse(selector) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    doc.walk(root, &mut |id| {
        if id != root && doc.node(id).is_element() && list.matches(doc, id) {
            found.push(id);
        }
    });
    found
}

fn parse_chain(input: &str) -> Option<Vec<Compound>> {
    let chain: Vec<Compound> = input
        .split_ascii_whitespace()
        .map(parse_compound)
        .collect::<Option<Vec<_>>>()?;
    if chain.is_empty() { None } else { Some(chain) }
}

fn parse_compound(input: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = input;
    let mut leading = true;
    while !rest.is_empty() {
        let (head, tail) = split_simple(rest)?;
        match head.as_bytes()[0] {
            b'*' => compound.universal = true,
            b'#' => compound.id = Some(head[1..].to_string()),
            b'.' => compound.classes.push(head[1..].to_string()),
            b'[' => {
                let inner = head.strip_prefix('[')?.strip_suffix(']')?;
                let check = match inner.split_once('=') {
                    Some((name, value)) => AttrCheck {
                        name: name.trim().to_ascii_lowercase(),
                        value: Some(value.trim().trim_matches(['"', '\'']).to_string()),
                    },
                    None => AttrCheck {
                        name: inner.trim().to_ascii_lowercase(),
                        value: None,
                    },
                };
                if check.name.is_empty() {
                    return None;
                }
                compound.attrs.push(check);
            }
            _ => {
                if !leading {
                    return None;
                }
                compound.tag = Some(head.to_ascii_lowercase());
            }
        }
        leading = false;
        rest = tail;
    }
    if compound == Compound::default() {
        return None;
    }
    Some(compound)
}

/// Split one simple selector off the front: `div`, `*`, `#x`, `.x`, `[a=b]`.
fn split_simple(input: &str) -> Option<(String, &str)> {
    let bytes = input.as_bytes();
    let end = match bytes[0] {
        b'[' => input.find(']').map(|i| i + 1)?,
        b'*' => 1,
        b'#' | b'.' => {
            1 + input[1..]
                .find(['#', '.', '['])
                .unwrap_or(input.len() - 1)
        }
        _ => input.find(['#', '.', '[']).unwrap_or(input.len()),
    };
    if end == 0 || (matches!(bytes[0], b'#' | b'.') && end == 1) {
        return None;
    }
    Some((input[..end].to_string(), &input[end..]))
}

fn compound_matches(doc: &Document, el: NodeId, compound: &Compound) -> bool {
    let Some(element) = doc.element(el) else {
        return false;
    };
    if let Some(tag) = &compound.tag
        && !element.name.eq_ignore_ascii_case(tag)
    {
        return false;
    }
    if let Some(id) = &compound.id
        && element.get_attr("id") != Some(id.as_str())
    {
        return false;
    }
    if !compound
        .classes
        .iter()
        .all(|class| element.class_list().any(|c| c == class))
    {
        return false;
    }
    compound.attrs.iter().all(|check| match &check.value {
        Some(value) => element.get_attr(&check.name) == Some(value.as_str()),
        None => element.has_attr(&check.name),
    })
}

#[cfg(test)]
mod tests {
    use super::{query_selector, query_selector_all};
    use crate::parse::{parse_fragment, ParseOptions};

    fn doc(input: &str) -> (crate::document::Document, crate::node::NodeId) {
        let outcome = parse_fragment(input, "div", &ParseOptions::default());
        (outcome.document, outcome.root)
    }

    #[test]
    fn matches_tag_id_class_and_attr() {
        let (doc, root) = doc(
            "<ul class=\"menu side\"><li id=\"first\" data-k=\"1\">a</li><li class=\"sel\">b</li></ul>",
        );
        assert!(query_selector(&doc, root, "#first").is_some());
        assert!(query_selector(&doc, root, "li.sel").is_some());
        assert!(query_selector(&doc, root, "[data-k=1]").is_some());
        assert!(query_selector(&doc, root, "ul.menu.side").is_some());
        assert!(query_selector(&doc, root, "li.menu").is_none());
    }

    #[test]
    fn descendant_combinator_requires_an_ancestor() {
        let (doc, root) = doc("<section><p><b>x</b></p></section><b>y</b>");
        let hits = query_selector_all(&doc, root, "section b");
        assert_eq!(hits.len(), 1);
        assert_eq!(doc.text_content(hits[0]), "x");
    }

    #[test]
    fn selector_lists_match_any_alternative() {
        let (doc, root) = doc("<p>a</p><em>b</em>");
        assert_eq!(query_selector_all(&doc, root, "p, em, .missing").len(), 2);
        assert_eq!(query_selector_all(&doc, root, "*").len(), 2);
    }

    #[test]
    fn preorder_first_match_wins() {
        let (doc, root) = doc("<div class=\"x\"><span class=\"x\">in</span></div>");
        let first = query_selector(&doc, root, ".x").unwrap();
        assert_eq!(doc.element(first).unwrap().name, "div");
    }

    #[test]
    fn unparseable_selectors_match_nothing() {
        let (doc, root) = doc("<p>a</p>");
        assert!(query_selector(&doc, root, "").is_none());
        assert!(query_selector(&doc, root, "p >").is_none());
        assert!(query_selector_all(&doc, root, "..").is_empty());
    }
}
