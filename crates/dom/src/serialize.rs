//! HTML serializer: the inverse of tokenization + tree construction.
//!
//! Structural round-trip contract: reparsing the output yields the same tree
//! shape, tag names, attribute sets, and text content. Byte-for-byte fidelity
//! is only promised for whitespace-sensitive regions (`pre` and the raw-text
//! elements), which are emitted verbatim; elsewhere pretty printing may
//! normalize whitespace between elements.

use html::TagId;

use crate::document::Document;
use crate::node::{Attr, ElementData, NodeData, NodeId};

/// Output formatting options.
///
/// Everything beyond the defaults is cosmetic: no option may change the
/// reparsed tree beyond whitespace-only text nodes and the opt-in removals.
#[derive(Clone, Debug)]
pub struct SerializeOptions {
    /// Indent element-only regions, one node per line.
    pub pretty: bool,
    /// Soft limit for open tags in pretty mode; longer tags break between
    /// attributes.
    pub approx_line_width: usize,
    /// Drop quotes around attribute values that need none.
    pub remove_attr_quotes: bool,
    /// Drop attributes that are empty and meaningless when absent
    /// (`class=""`, `style=""`, ...).
    pub remove_empty_attrs: bool,
    /// Drop comment nodes. Hydration markers live in comments, so the
    /// runtime never enables this on annotated trees.
    pub remove_comments: bool,
    /// Emit shadow-root fragments as declarative
    /// `<template shadowrootmode="open">` children.
    pub serialize_shadow_roots: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            approx_line_width: 100,
            remove_attr_quotes: false,
            remove_empty_attrs: false,
            remove_comments: false,
            serialize_shadow_roots: false,
        }
    }
}

/// Serialize `node` (or, for document/fragment nodes, its children) to HTML.
pub fn serialize_node_to_html(doc: &Document, node: NodeId, opts: &SerializeOptions) -> String {
    let mut serializer = Serializer {
        doc,
        opts,
        out: String::new(),
    };
    match doc.node(node).data() {
        NodeData::Document | NodeData::Fragment => {
            for &child in doc.children(node) {
                serializer.write_node(child, 0, false);
            }
        }
        _ => serializer.write_node(node, 0, false),
    }
    serializer.out
}

/// Attributes dropped entirely when empty under `remove_empty_attrs`.
const EMPTY_ATTR_PRUNE: [&str; 7] = ["class", "dir", "id", "lang", "name", "style", "title"];

struct Serializer<'a> {
    doc: &'a Document,
    opts: &'a SerializeOptions,
    out: String,
}

impl Serializer<'_> {
    fn write_node(&mut self, id: NodeId, depth: usize, in_pre: bool) {
        match self.doc.node(id).data() {
            NodeData::Document | NodeData::Fragment => {
                for &child in self.doc.children(id) {
                    self.write_node(child, depth, in_pre);
                }
            }
            NodeData::Doctype { name, public_id, system_id } => {
                self.write_doctype(name, public_id, system_id);
            }
            NodeData::Element(el) => self.write_element(id, el, depth, in_pre),
            NodeData::Text(text) => escape_text(text, &mut self.out),
            NodeData::Comment(text) => {
                if !self.opts.remove_comments {
                    self.out.push_str("<!--");
                    self.out.push_str(text);
                    self.out.push_str("-->");
                }
            }
        }
    }

    fn write_doctype(&mut self, name: &str, public_id: &str, system_id: &str) {
        self.out.push_str("<!doctype ");
        self.out.push_str(name);
        if !public_id.is_empty() {
            self.out.push_str(" PUBLIC \"");
            self.out.push_str(public_id);
            self.out.push('"');
            if !system_id.is_empty() {
                self.out.push_str(" \"");
                self.out.push_str(system_id);
                self.out.push('"');
            }
        } else if !system_id.is_empty() {
            self.out.push_str(" SYSTEM \"");
            self.out.push_str(system_id);
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn write_element(&mut self, id: NodeId, el: &ElementData, depth: usize, in_pre: bool) {
        self.write_open_tag(el, depth);
        if el.ns == html::Ns::Html && el.tag_id.is_void() {
            return;
        }

        let raw = is_raw_text(el.tag_id);
        let pre = in_pre || raw || el.tag_id == TagId::Pre;

        if raw {
            // Raw-text content round-trips through the RAWTEXT/RCDATA
            // tokenizer states, so it must not be entity-escaped.
            for &child in self.doc.children(id) {
                if let NodeData::Text(text) = self.doc.node(child).data() {
                    self.out.push_str(text);
                }
            }
            self.write_close_tag(&el.name);
            return;
        }

        let mut children: Vec<NodeId> = Vec::new();
        if self.opts.serialize_shadow_roots
            && let Some(root) = el.shadow_root
        {
            self.write_shadow_template(root, depth + 1, pre);
        }
        if el.tag_id == TagId::Template {
            if let Some(content) = el.template_content {
                children.extend_from_slice(self.doc.children(content));
            }
        } else {
            children.extend_from_slice(self.doc.children(id));
        }

        let block = self.opts.pretty
            && !pre
            && !children.is_empty()
            && children.iter().all(|&c| !self.doc.node(c).is_text());
        for &child in &children {
            if block {
                self.newline_indent(depth + 1);
            }
            self.write_node(child, depth + 1, pre);
        }
        if block {
            self.newline_indent(depth);
        }
        self.write_close_tag(&el.name);
    }

    fn write_shadow_template(&mut self, root: NodeId, depth: usize, in_pre: bool) {
        self.out.push_str("<template shadowrootmode=\"open\">");
        for &child in self.doc.children(root) {
            self.write_node(child, depth + 1, in_pre);
        }
        self.out.push_str("</template>");
    }

    fn write_open_tag(&mut self, el: &ElementData, depth: usize) {
        let mut attrs: Vec<String> = Vec::new();
        for attr in &el.attrs {
            if let Some(text) = self.format_attr(attr) {
                attrs.push(text);
            }
        }

        self.out.push('<');
        self.out.push_str(&el.name);
        let inline_len =
            depth * 2 + el.name.len() + attrs.iter().map(|a| a.len() + 1).sum::<usize>() + 2;
        let break_attrs =
            self.opts.pretty && attrs.len() > 1 && inline_len > self.opts.approx_line_width;
        for attr in &attrs {
            if break_attrs {
                self.newline_indent(depth + 1);
            } else {
                self.out.push(' ');
            }
            self.out.push_str(attr);
        }
        self.out.push('>');
    }

    fn format_attr(&self, attr: &Attr) -> Option<String> {
        if self.opts.remove_empty_attrs
            && attr.value.is_empty()
            && attr.ns.is_none()
            && EMPTY_ATTR_PRUNE.contains(&attr.name.as_str())
        {
            return None;
        }
        let mut text = String::new();
        if let Some(ns) = attr.ns {
            text.push_str(ns.prefix());
            text.push(':');
        }
        text.push_str(&attr.name);
        if attr.value.is_empty() {
            return Some(text);
        }
        text.push('=');
        if self.opts.remove_attr_quotes && can_omit_quotes(&attr.value) {
            text.push_str(&attr.value);
        } else {
            text.push('"');
            escape_attr_value(&attr.value, &mut text);
            text.push('"');
        }
        Some(text)
    }

    fn write_close_tag(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn newline_indent(&mut self, depth: usize) {
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str("  ");
        }
    }
}

/// Elements whose text content is emitted verbatim (the tokenizer re-enters
/// them through RAWTEXT/RCDATA states, never the data state).
fn is_raw_text(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::Script | TagId::Style | TagId::Textarea | TagId::Title
    )
}

fn can_omit_quotes(value: &str) -> bool {
    !value.chars().any(|c| {
        matches!(c, '\t' | '\n' | '\x0C' | ' ' | '"' | '\'' | '=' | '<' | '>' | '`')
    })
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr_value(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{serialize_node_to_html, SerializeOptions};
    use crate::parse::{parse_document, parse_fragment, ParseOptions};

    fn serialize_fragment(input: &str, context: &str, opts: &SerializeOptions) -> String {
        let outcome = parse_fragment(input, context, &ParseOptions::default());
        serialize_node_to_html(&outcome.document, outcome.root, opts)
    }

    #[test]
    fn void_elements_have_no_close_tag() {
        let html = serialize_fragment("<br><img src=\"a.png\">", "div", &SerializeOptions::default());
        assert_eq!(html, "<br><img src=\"a.png\">");
    }

    #[test]
    fn raw_text_content_is_verbatim() {
        let input = "<script>if (a < b && c > d) { run(); }</script>";
        let html = serialize_fragment(input, "div", &SerializeOptions::default());
        assert_eq!(html, input);
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let outcome = parse_fragment("<p title=\"a&quot;b\">1 &lt; 2 &amp; 3</p>", "div", &ParseOptions::default());
        let html = serialize_node_to_html(&outcome.document, outcome.root, &SerializeOptions::default());
        assert_eq!(html, "<p title=\"a&quot;b\">1 &lt; 2 &amp; 3</p>");
    }

    #[test]
    fn namespaced_attributes_keep_their_prefix() {
        let input = "<svg><use xlink:href=\"#icon\"></use></svg>";
        let html = serialize_fragment(input, "div", &SerializeOptions::default());
        assert_eq!(html, "<svg><use xlink:href=\"#icon\"></use></svg>");
    }

    #[test]
    fn template_content_serializes_inside_the_tag() {
        let input = "<template><p>inner</p></template>";
        let html = serialize_fragment(input, "div", &SerializeOptions::default());
        assert_eq!(html, input);
    }

    #[test]
    fn empty_attr_pruning_is_opt_in() {
        let input = "<div class=\"\" data-x=\"\">x</div>";
        let kept = serialize_fragment(input, "div", &SerializeOptions::default());
        assert_eq!(kept, "<div class data-x>x</div>");
        let pruned = serialize_fragment(
            input,
            "div",
            &SerializeOptions {
                remove_empty_attrs: true,
                ..SerializeOptions::default()
            },
        );
        assert_eq!(pruned, "<div data-x>x</div>");
    }

    #[test]
    fn quote_removal_only_when_safe() {
        let input = "<a href=\"/docs\" title=\"two words\">x</a>";
        let html = serialize_fragment(
            input,
            "div",
            &SerializeOptions {
                remove_attr_quotes: true,
                ..SerializeOptions::default()
            },
        );
        assert_eq!(html, "<a href=/docs title=\"two words\">x</a>");
    }

    #[test]
    fn comment_removal_is_opt_in() {
        let input = "<div><!--note-->x</div>";
        let kept = serialize_fragment(input, "div", &SerializeOptions::default());
        assert_eq!(kept, input);
        let stripped = serialize_fragment(
            input,
            "div",
            &SerializeOptions {
                remove_comments: true,
                ..SerializeOptions::default()
            },
        );
        assert_eq!(stripped, "<div>x</div>");
    }

    #[test]
    fn pretty_printing_never_reflows_pre() {
        let input = "<!DOCTYPE html><body><section><div>a</div><div>b</div></section><pre>  two\n spaces</pre></body>";
        let outcome = parse_document(input, &ParseOptions::default());
        let html = serialize_node_to_html(
            &outcome.document,
            outcome.root,
            &SerializeOptions {
                pretty: true,
                ..SerializeOptions::default()
            },
        );
        assert!(html.contains("\n    <section>"));
        assert!(html.contains("<pre>  two\n spaces</pre>"));
    }

    #[test]
    fn shadow_roots_serialize_as_declarative_templates_when_enabled() {
        let mut outcome = parse_fragment("<x-card></x-card>", "div", &ParseOptions::default());
        let host = outcome.document.children(outcome.root)[0];
        let shadow = outcome.document.attach_shadow(host);
        let text = outcome.document.create_text_node("inner");
        outcome.document.append_child(shadow, text);

        let plain = serialize_node_to_html(&outcome.document, outcome.root, &SerializeOptions::default());
        assert_eq!(plain, "<x-card></x-card>");
        let declarative = serialize_node_to_html(
            &outcome.document,
            outcome.root,
            &SerializeOptions {
                serialize_shadow_roots: true,
                ..SerializeOptions::default()
            },
        );
        assert_eq!(
            declarative,
            "<x-card><template shadowrootmode=\"open\">inner</template></x-card>"
        );
    }
}
