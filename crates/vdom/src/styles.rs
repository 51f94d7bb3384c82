//! Scoped style attachment.
//!
//! Component-generated CSS is attached once per unique scope id; repeat
//! attachments for the same id are no-ops, so re-renders and multiple
//! instances of one component share a single `<style>` element.

use dom::{Document, NodeId, Ns, TagId};

/// Attribute carrying the scope id on attached `<style>` elements.
pub const STYLE_SCOPE_ATTR: &str = "sty-id";

/// Append `css` as a `<style sty-id="scope_id">` under the document head
/// (falling back to the document element, then the root). Idempotent per
/// scope id.
pub fn attach_styles(doc: &mut Document, scope_id: &str, css: &str) -> NodeId {
    if let Some(existing) = find_scope_style(doc, scope_id) {
        return existing;
    }
    let target = doc
        .head()
        .or_else(|| doc.document_element())
        .unwrap_or_else(|| doc.root());
    let style = doc.create_element(Ns::Html, "style");
    doc.set_attribute(style, STYLE_SCOPE_ATTR, scope_id);
    let text = doc.create_text_node(css);
    doc.append_child(style, text);
    doc.append_child(target, style);
    log::debug!("attached styles for scope {scope_id}");
    style
}

fn find_scope_style(doc: &Document, scope_id: &str) -> Option<NodeId> {
    let mut found = None;
    doc.walk(doc.root(), &mut |id| {
        if found.is_some() {
            return;
        }
        if let Some(el) = doc.element(id)
            && el.tag_id == TagId::Style
            && el.get_attr(STYLE_SCOPE_ATTR) == Some(scope_id)
        {
            found = Some(id);
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::attach_styles;
    use dom::{parse_document, ParseOptions};

    #[test]
    fn attaches_once_per_scope_id() {
        let outcome = parse_document("<p>x</p>", &ParseOptions::default());
        let mut doc = outcome.document;
        let first = attach_styles(&mut doc, "sc-card", ".sc-card{color:red}");
        let again = attach_styles(&mut doc, "sc-card", ".sc-card{color:red}");
        let other = attach_styles(&mut doc, "sc-nav", ".sc-nav{top:0}");
        assert_eq!(first, again);
        assert_ne!(first, other);

        let head = doc.head().unwrap();
        let styles: Vec<_> = doc
            .children(head)
            .iter()
            .filter(|&&c| doc.element(c).is_some_and(|e| e.name == "style"))
            .collect();
        assert_eq!(styles.len(), 2);
    }
}
