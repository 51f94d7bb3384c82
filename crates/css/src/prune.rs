//! Used-selector pruning: dead-code elimination for collected stylesheets.
//!
//! The pass is conservative. A selector clause is dropped only when one of
//! its recognized components (tag, class, id, attribute name) is provably
//! absent from the final tree; pseudo-classes/elements and any syntax the
//! scanner does not recognize never cause a drop. A rule survives when any
//! of its comma-separated clauses survives.

use std::collections::HashSet;

use diagnostics::{Diagnostic, Diagnostics, Kind};
use dom::{Document, NodeId, TagId};

use crate::syntax::{parse_css, AtBody, Rule, Stylesheet};

/// Tag names, classes, ids, and attribute names present in a tree.
#[derive(Debug, Default)]
pub struct UsedSelectors {
    tags: HashSet<String>,
    classes: HashSet<String>,
    ids: HashSet<String>,
    attrs: HashSet<String>,
}

impl UsedSelectors {
    /// Collect everything present under `root`, including template content
    /// and shadow-root fragments.
    pub fn collect(doc: &Document, root: NodeId) -> Self {
        let mut used = Self::default();
        doc.walk(root, &mut |id| {
            let Some(el) = doc.element(id) else { return };
            used.tags.insert(el.name.to_ascii_lowercase());
            for attr in &el.attrs {
                used.attrs.insert(attr.name.to_ascii_lowercase());
            }
            for class in el.class_list() {
                used.classes.insert(class.to_string());
            }
            if let Some(id_value) = el.get_attr("id") {
                used.ids.insert(id_value.to_string());
            }
        });
        used
    }

    fn has_tag(&self, tag: &str) -> bool {
        tag == "*" || self.tags.contains(&tag.to_ascii_lowercase())
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn has_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn has_attr(&self, attr: &str) -> bool {
        self.attrs.contains(&attr.to_ascii_lowercase())
    }
}

/// Rewrite every `<style>` element under `root`, keeping only rules whose
/// selectors can still match the tree.
pub fn remove_unused_styles(doc: &mut Document, root: NodeId, diags: &mut Diagnostics) {
    let used = UsedSelectors::collect(doc, root);
    let mut styles = Vec::new();
    doc.walk(root, &mut |id| {
        if doc.element(id).is_some_and(|e| e.tag_id == TagId::Style) {
            styles.push(id);
        }
    });
    for style in styles {
        let text = doc.text_content(style);
        if text.trim().is_empty() {
            continue;
        }
        let outcome = parse_css(&text);
        for diag in outcome.diagnostics {
            diags.push(diag);
        }
        let before = outcome.stylesheet.rules.len();
        let pruned = prune_stylesheet(outcome.stylesheet, &used);
        if pruned.rules.len() < before {
            diags.push(Diagnostic::debug(
                Kind::Css,
                "style pruning",
                format!("removed {} of {before} rule(s)", before - pruned.rules.len()),
            ));
        }
        doc.set_text_content(style, &pruned.to_css());
    }
}

fn prune_stylesheet(sheet: Stylesheet, used: &UsedSelectors) -> Stylesheet {
    Stylesheet {
        rules: prune_rules(sheet.rules, used),
    }
}

fn prune_rules(rules: Vec<Rule>, used: &UsedSelectors) -> Vec<Rule> {
    rules
        .into_iter()
        .filter_map(|rule| match rule {
            Rule::Style(style) => {
                if style.selectors.iter().any(|s| clause_may_match(s, used)) {
                    Some(Rule::Style(style))
                } else {
                    None
                }
            }
            Rule::At(mut at) => {
                // Only conditional group rules recurse; @keyframes and the
                // rest are kept whole (animation usage is not tracked).
                let conditional = matches!(
                    at.name.as_str(),
                    "media" | "supports" | "document" | "-moz-document"
                );
                if conditional && matches!(at.body, AtBody::Rules(_)) {
                    let AtBody::Rules(rules) = std::mem::replace(&mut at.body, AtBody::None)
                    else {
                        unreachable!("checked above");
                    };
                    let kept = prune_rules(rules, used);
                    if kept.is_empty() {
                        return None;
                    }
                    at.body = AtBody::Rules(kept);
                }
                Some(Rule::At(at))
            }
        })
        .collect()
}

/// Whether one comma-separated clause could match something in the tree.
fn clause_may_match(clause: &str, used: &UsedSelectors) -> bool {
    for component in scan_components(clause) {
        let present = match &component {
            Component::Tag(tag) => used.has_tag(tag),
            Component::Class(class) => used.has_class(class),
            Component::Id(id) => used.has_id(id),
            Component::Attr(attr) => used.has_attr(attr),
        };
        if !present {
            return false;
        }
    }
    true
}

#[derive(Debug, PartialEq, Eq)]
enum Component {
    Tag(String),
    Class(String),
    Id(String),
    Attr(String),
}

/// Scan the recognizable components out of a selector clause. Pseudo-class
/// and pseudo-element arguments are skipped entirely so `:not(.x)` and
/// friends never count against the clause.
fn scan_components(clause: &str) -> Vec<Component> {
    let mut components = Vec::new();
    let bytes = clause.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                let (name, next) = scan_ident(clause, i + 1);
                if !name.is_empty() {
                    components.push(Component::Class(name));
                }
                i = next;
            }
            b'#' => {
                let (name, next) = scan_ident(clause, i + 1);
                if !name.is_empty() {
                    components.push(Component::Id(name));
                }
                i = next;
            }
            b'[' => {
                let close = clause[i..].find(']').map(|o| i + o).unwrap_or(bytes.len());
                let inner = &clause[i + 1..close.min(clause.len())];
                let name = inner
                    .split(['=', '~', '|', '^', '$', '*'])
                    .next()
                    .unwrap_or("")
                    .trim();
                if !name.is_empty() {
                    components.push(Component::Attr(name.to_string()));
                }
                i = close + 1;
            }
            b':' => {
                // Pseudo: skip the name and any functional argument.
                i += 1;
                while i < bytes.len() && bytes[i] == b':' {
                    i += 1;
                }
                let (_, next) = scan_ident(clause, i);
                i = next;
                if i < bytes.len() && bytes[i] == b'(' {
                    let mut depth = 1;
                    i += 1;
                    while i < bytes.len() && depth > 0 {
                        match bytes[i] {
                            b'(' => depth += 1,
                            b')' => depth -= 1,
                            _ => {}
                        }
                        i += 1;
                    }
                }
            }
            c if c.is_ascii_alphabetic() || c == b'_' || c == b'-' => {
                let (name, next) = scan_ident(clause, i);
                components.push(Component::Tag(name));
                i = next;
            }
            _ => i += 1,
        }
    }
    components
}

fn scan_ident(clause: &str, start: usize) -> (String, usize) {
    let rest = &clause[start.min(clause.len())..];
    let len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    (rest[..len].to_string(), start + len)
}

#[cfg(test)]
mod tests {
    use super::{remove_unused_styles, UsedSelectors};
    use crate::syntax::parse_css;
    use diagnostics::Diagnostics;
    use dom::{parse_document, ParseOptions};

    fn prune(html: &str, css: &str) -> String {
        let outcome = parse_document(html, &ParseOptions::default());
        let used = UsedSelectors::collect(&outcome.document, outcome.root);
        super::prune_stylesheet(parse_css(css).stylesheet, &used).to_css()
    }

    const PAGE: &str = "<div class=\"used\" id=\"main\" data-k=\"1\"><p>x</p></div>";

    #[test]
    fn keeps_rule_when_any_clause_matches() {
        let css = ".used, .unused { color: red }";
        let kept = prune(PAGE, css);
        assert!(kept.contains(".used"));
    }

    #[test]
    fn drops_rule_when_every_clause_is_provably_absent() {
        let kept = prune(PAGE, ".unused { color: red }\n.used { top: 0 }");
        assert!(!kept.contains(".unused"));
        assert!(kept.contains(".used"));
    }

    #[test]
    fn tags_ids_and_attributes_count_as_usage() {
        let kept = prune(PAGE, "p { a: b }\n#main { a: b }\n[data-k] { a: b }\nq { a: b }\n#nope { a: b }");
        assert!(kept.contains("p {"));
        assert!(kept.contains("#main"));
        assert!(kept.contains("[data-k]"));
        assert!(!kept.contains("q {"));
        assert!(!kept.contains("#nope"));
    }

    #[test]
    fn compound_selectors_need_every_component() {
        let kept = prune(PAGE, "div.used { a: b }\ndiv.unused { a: b }\nspan.used { a: b }");
        assert!(kept.contains("div.used"));
        assert!(!kept.contains("div.unused"));
        assert!(!kept.contains("span.used"));
    }

    #[test]
    fn pseudo_classes_never_cause_a_drop() {
        let kept = prune(
            PAGE,
            "p:hover { a: b }\n.used::before { a: b }\np:not(.whatever) { a: b }",
        );
        assert!(kept.contains("p:hover"));
        assert!(kept.contains(".used::before"));
        assert!(kept.contains("p:not(.whatever)"));
    }

    #[test]
    fn media_groups_prune_recursively_and_keyframes_survive() {
        let css = "@media print { .unused { a: b } }\n@media screen { .used { a: b } }\n@keyframes spin { from { left: 0 } }";
        let kept = prune(PAGE, css);
        assert!(!kept.contains("@media print"));
        assert!(kept.contains("@media screen"));
        assert!(kept.contains("@keyframes spin"));
    }

    #[test]
    fn rewrites_style_elements_in_place() {
        let html = "<style>.used { color: red } .unused { color: blue }</style><div class=\"used\"></div>";
        let mut outcome = parse_document(html, &ParseOptions::default());
        let mut diags = Diagnostics::new();
        let root = outcome.root;
        remove_unused_styles(&mut outcome.document, root, &mut diags);
        let style = dom::query_selector(&outcome.document, root, "style").unwrap();
        let text = outcome.document.text_content(style);
        assert!(text.contains(".used"));
        assert!(!text.contains(".unused"));
    }
}
