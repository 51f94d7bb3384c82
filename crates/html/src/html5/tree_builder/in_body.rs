//! The `in body` insertion mode and the adoption agency algorithm.

use super::formatting::{FormattingEntry, FormattingItem};
use super::modes::InsertionMode;
use super::stack::{OpenEntry, ScopeKind};
use super::{is_all_ws, BuilderStep, TreeBuilder};
use crate::html5::shared::{ParseErrorCode, Token};
use crate::html5::tokenizer::RawKind;
use crate::sink::{ElemAttr, Ns, QuirksMode, TreeSink};
use crate::tags::TagId;

/// Outer-loop bound of the adoption agency algorithm, fixed at 8 by the HTML
/// standard; conformance fixtures depend on the exact value.
const ADOPTION_AGENCY_OUTER_CAP: usize = 8;

/// Inner-loop threshold past which misnested nodes are dropped from the
/// formatting list instead of being cloned.
const ADOPTION_AGENCY_INNER_CAP: usize = 3;

const BLOCK_TAGS: &[TagId] = &[
    TagId::Address,
    TagId::Article,
    TagId::Aside,
    TagId::Blockquote,
    TagId::Center,
    TagId::Details,
    TagId::Dialog,
    TagId::Dir,
    TagId::Div,
    TagId::Dl,
    TagId::Fieldset,
    TagId::Figcaption,
    TagId::Figure,
    TagId::Footer,
    TagId::Header,
    TagId::Hgroup,
    TagId::Main,
    TagId::Menu,
    TagId::Nav,
    TagId::Ol,
    TagId::Section,
    TagId::Summary,
    TagId::Ul,
];

impl<H: Copy + Eq + std::fmt::Debug> TreeBuilder<H> {
    pub(super) fn handle_in_body<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { mut text } => {
                if self.ignore_lf {
                    self.ignore_lf = false;
                    if let Some(stripped) = text.strip_prefix('\n') {
                        text = stripped.to_string();
                    }
                }
                if text.is_empty() {
                    return BuilderStep::Continue;
                }
                self.reconstruct_formatting(sink);
                self.insert_text(sink, &text);
                if !is_all_ws(&text) {
                    self.frameset_ok = false;
                }
                BuilderStep::Continue
            }
            Token::Comment { text } => {
                self.insert_comment(sink, &text);
                BuilderStep::Continue
            }
            Token::Doctype { .. } => {
                self.error(sink, ParseErrorCode::MisplacedDoctype);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Html,
                ref attrs,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                if self.open.topmost(TagId::Template).is_none()
                    && let Some(root) = self.open.get(0)
                {
                    let root = root.handle;
                    sink.add_attrs_if_missing(
                        root,
                        attrs.iter().map(ElemAttr::from_token_attr).collect(),
                    );
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id:
                    TagId::Base
                        | TagId::Basefont
                        | TagId::Bgsound
                        | TagId::Link
                        | TagId::Meta
                        | TagId::Noframes
                        | TagId::Script
                        | TagId::Style
                        | TagId::Template
                        | TagId::Title,
                ..
            }
            | Token::EndTag {
                tag_id: TagId::Template,
                ..
            } => self.handle_in_head(token, sink),
            Token::StartTag {
                tag_id: TagId::Body,
                ref attrs,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                let body = self.open.get(1).cloned();
                let body_ok = body
                    .as_ref()
                    .is_some_and(|e| e.ns == Ns::Html && e.tag_id == TagId::Body);
                if !body_ok || self.open.topmost(TagId::Template).is_some() {
                    return BuilderStep::Continue;
                }
                self.frameset_ok = false;
                if let Some(body) = body {
                    sink.add_attrs_if_missing(
                        body.handle,
                        attrs.iter().map(ElemAttr::from_token_attr).collect(),
                    );
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Frameset,
                ref attrs,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                let body = self.open.get(1).cloned();
                let body_ok = body
                    .as_ref()
                    .is_some_and(|e| e.ns == Ns::Html && e.tag_id == TagId::Body);
                if !body_ok || !self.frameset_ok {
                    return BuilderStep::Continue;
                }
                if let Some(body) = body {
                    sink.remove_from_parent(body.handle);
                }
                self.open.truncate(1);
                self.insert_html_element(sink, name, TagId::Frameset, attrs);
                self.mode = InsertionMode::InFrameset;
                BuilderStep::Continue
            }
            Token::Eof => {
                if !self.template_modes.is_empty() {
                    return self.handle_in_template(Token::Eof, sink);
                }
                let benign = [
                    TagId::Dd,
                    TagId::Dt,
                    TagId::Li,
                    TagId::Optgroup,
                    TagId::Option,
                    TagId::P,
                    TagId::Rb,
                    TagId::Rp,
                    TagId::Rt,
                    TagId::Rtc,
                    TagId::Tbody,
                    TagId::Td,
                    TagId::Tfoot,
                    TagId::Th,
                    TagId::Thead,
                    TagId::Tr,
                    TagId::Body,
                    TagId::Html,
                ];
                if self
                    .open
                    .iter()
                    .any(|e| e.ns == Ns::Html && !benign.contains(&e.tag_id))
                {
                    self.error(sink, ParseErrorCode::UnexpectedEof);
                }
                self.done = true;
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Body,
                ..
            } => {
                self.close_body(sink);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Html,
                ..
            } => {
                if self.close_body(sink) {
                    return self.process_in_mode(Token::end_tag("html"), sink);
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id,
                ref attrs,
                ..
            } if BLOCK_TAGS.contains(&tag_id) || tag_id == TagId::P => {
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                self.insert_html_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id,
                ref attrs,
                ..
            } if tag_id.is_heading() => {
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                if self.open.current().is_some_and(|e| e.tag_id.is_heading()) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                    self.open.pop();
                }
                self.insert_html_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Pre | TagId::Listing),
                ref attrs,
                ..
            } => {
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                self.insert_html_element(sink, name, tag_id, attrs);
                self.ignore_lf = true;
                self.frameset_ok = false;
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Form,
                ref attrs,
                ..
            } => {
                let has_template = self.open.topmost(TagId::Template).is_some();
                if self.form.is_some() && !has_template {
                    self.error(sink, ParseErrorCode::UnexpectedStartTag);
                    return BuilderStep::Continue;
                }
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                let el = self.insert_html_element(sink, name, TagId::Form, attrs);
                if !has_template {
                    self.form = Some(el);
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Li,
                ref attrs,
                ..
            } => {
                self.frameset_ok = false;
                self.auto_close_list_item(sink, &[TagId::Li]);
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                self.insert_html_element(sink, name, TagId::Li, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Dd | TagId::Dt),
                ref attrs,
                ..
            } => {
                self.frameset_ok = false;
                self.auto_close_list_item(sink, &[TagId::Dd, TagId::Dt]);
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                self.insert_html_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Plaintext,
                ref attrs,
                ..
            } => {
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                self.insert_html_element(sink, name, TagId::Plaintext, attrs);
                BuilderStep::SwitchTokenizer(RawKind::Plaintext)
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Button,
                ref attrs,
                ..
            } => {
                if self.open.has_in_scope(TagId::Button, ScopeKind::InScope) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                    self.generate_implied_end_tags(None);
                    self.open.pop_until_tag(TagId::Button);
                }
                self.reconstruct_formatting(sink);
                self.insert_html_element(sink, name, TagId::Button, attrs);
                self.frameset_ok = false;
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::A,
                ref attrs,
                ..
            } => {
                if let Some(index) = self.fmt.find_after_marker(TagId::A) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                    let existing = match self.fmt.get(index) {
                        Some(FormattingItem::Entry(e)) => e.handle,
                        _ => unreachable!("find_after_marker returns entries"),
                    };
                    self.adoption_agency(sink, "a", TagId::A);
                    if let Some(still) = self.fmt.index_of_handle(existing) {
                        self.fmt.remove(still);
                    }
                    if let Some(still) = self.open.index_of(existing) {
                        self.open.remove(still);
                    }
                }
                self.reconstruct_formatting(sink);
                let el = self.insert_html_element(sink, name, TagId::A, attrs);
                self.fmt.push_entry(FormattingEntry {
                    handle: el,
                    tag_id: TagId::A,
                    name: name.clone(),
                    attrs: attrs.clone(),
                });
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id,
                ref attrs,
                ..
            } if tag_id.is_formatting() && tag_id != TagId::A && tag_id != TagId::Nobr => {
                self.reconstruct_formatting(sink);
                let el = self.insert_html_element(sink, name, tag_id, attrs);
                self.fmt.push_entry(FormattingEntry {
                    handle: el,
                    tag_id,
                    name: name.clone(),
                    attrs: attrs.clone(),
                });
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Nobr,
                ref attrs,
                ..
            } => {
                self.reconstruct_formatting(sink);
                if self.open.has_in_scope(TagId::Nobr, ScopeKind::InScope) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                    self.adoption_agency(sink, "nobr", TagId::Nobr);
                    self.reconstruct_formatting(sink);
                }
                let el = self.insert_html_element(sink, name, TagId::Nobr, attrs);
                self.fmt.push_entry(FormattingEntry {
                    handle: el,
                    tag_id: TagId::Nobr,
                    name: name.clone(),
                    attrs: attrs.clone(),
                });
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Applet | TagId::Marquee | TagId::Object),
                ref attrs,
                ..
            } => {
                self.reconstruct_formatting(sink);
                self.insert_html_element(sink, name, tag_id, attrs);
                self.fmt.push_marker();
                self.frameset_ok = false;
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Table,
                ref attrs,
                ..
            } => {
                if self.quirks != QuirksMode::Quirks
                    && self.open.has_in_scope(TagId::P, ScopeKind::Button)
                {
                    self.close_p_element(sink);
                }
                self.insert_html_element(sink, name, TagId::Table, attrs);
                self.frameset_ok = false;
                self.mode = InsertionMode::InTable;
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id:
                    tag_id @ (TagId::Area | TagId::Br | TagId::Embed | TagId::Img | TagId::Keygen
                        | TagId::Wbr),
                ref attrs,
                ..
            } => {
                self.reconstruct_formatting(sink);
                self.insert_void_element(sink, name, tag_id, attrs);
                self.frameset_ok = false;
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Input,
                ref attrs,
                ..
            } => {
                self.reconstruct_formatting(sink);
                self.insert_void_element(sink, name, TagId::Input, attrs);
                let hidden = attrs
                    .iter()
                    .any(|a| a.name == "type" && a.value.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Param | TagId::Source | TagId::Track),
                ref attrs,
                ..
            } => {
                self.insert_void_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Hr,
                ref attrs,
                ..
            } => {
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                self.insert_void_element(sink, name, TagId::Hr, attrs);
                self.frameset_ok = false;
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Image,
                attrs,
                self_closing,
                ..
            } => {
                // Historical alias: retarget as <img>.
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                self.process_in_mode(
                    Token::StartTag {
                        name: "img".to_string(),
                        tag_id: TagId::Img,
                        attrs,
                        self_closing,
                    },
                    sink,
                )
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Textarea,
                ref attrs,
                ..
            } => {
                let step = self.insert_raw_element(sink, name, TagId::Textarea, attrs, RawKind::Rcdata);
                self.ignore_lf = true;
                self.frameset_ok = false;
                step
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Xmp,
                ref attrs,
                ..
            } => {
                if self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.close_p_element(sink);
                }
                self.reconstruct_formatting(sink);
                self.frameset_ok = false;
                self.insert_raw_element(sink, name, TagId::Xmp, attrs, RawKind::Rawtext)
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Iframe,
                ref attrs,
                ..
            } => {
                self.frameset_ok = false;
                self.insert_raw_element(sink, name, TagId::Iframe, attrs, RawKind::Rawtext)
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Noembed,
                ref attrs,
                ..
            } => self.insert_raw_element(sink, name, TagId::Noembed, attrs, RawKind::Rawtext),
            Token::StartTag {
                ref name,
                tag_id: TagId::Noscript,
                ref attrs,
                ..
            } if self.config.scripting_enabled => {
                self.insert_raw_element(sink, name, TagId::Noscript, attrs, RawKind::Rawtext)
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Select,
                ref attrs,
                ..
            } => {
                self.reconstruct_formatting(sink);
                self.insert_html_element(sink, name, TagId::Select, attrs);
                self.frameset_ok = false;
                self.mode = if matches!(
                    self.mode,
                    InsertionMode::InTable
                        | InsertionMode::InCaption
                        | InsertionMode::InTableBody
                        | InsertionMode::InRow
                        | InsertionMode::InCell
                ) {
                    InsertionMode::InSelectInTable
                } else {
                    InsertionMode::InSelect
                };
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Optgroup | TagId::Option),
                ref attrs,
                ..
            } => {
                if self.open.current().is_some_and(|e| e.tag_id == TagId::Option) {
                    self.open.pop();
                }
                self.reconstruct_formatting(sink);
                self.insert_html_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Rb | TagId::Rtc),
                ref attrs,
                ..
            } => {
                if self.open.has_in_scope(TagId::Ruby, ScopeKind::InScope) {
                    self.generate_implied_end_tags(None);
                    if self.open.current().is_some_and(|e| e.tag_id != TagId::Ruby) {
                        self.error(sink, ParseErrorCode::MisnestedTag);
                    }
                }
                self.insert_html_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Rp | TagId::Rt),
                ref attrs,
                ..
            } => {
                if self.open.has_in_scope(TagId::Ruby, ScopeKind::InScope) {
                    self.generate_implied_end_tags(Some(TagId::Rtc));
                    if self
                        .open
                        .current()
                        .is_some_and(|e| !matches!(e.tag_id, TagId::Ruby | TagId::Rtc))
                    {
                        self.error(sink, ParseErrorCode::MisnestedTag);
                    }
                }
                self.insert_html_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Math,
                ref attrs,
                self_closing,
            } => {
                self.reconstruct_formatting(sink);
                self.insert_foreign_element(sink, Ns::MathMl, name, TagId::Math, attrs);
                if self_closing {
                    self.open.pop();
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Svg,
                ref attrs,
                self_closing,
            } => {
                self.reconstruct_formatting(sink);
                self.insert_foreign_element(sink, Ns::Svg, name, TagId::Svg, attrs);
                if self_closing {
                    self.open.pop();
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id:
                    TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Frame
                        | TagId::Head
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id,
                ref attrs,
                ..
            } => {
                self.reconstruct_formatting(sink);
                self.insert_html_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Form,
                ..
            } => {
                self.handle_form_end(sink);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::P, ..
            } => {
                if !self.open.has_in_scope(TagId::P, ScopeKind::Button) {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    self.insert_html_element(sink, "p", TagId::P, &[]);
                }
                self.close_p_element(sink);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Li, ..
            } => {
                if !self.open.has_in_scope(TagId::Li, ScopeKind::ListItem) {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.generate_implied_end_tags(Some(TagId::Li));
                if self.open.current().is_some_and(|e| e.tag_id != TagId::Li) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                }
                self.open.pop_until_tag(TagId::Li);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: tag_id @ (TagId::Dd | TagId::Dt),
                ..
            } => {
                if !self.open.has_in_scope(tag_id, ScopeKind::InScope) {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.generate_implied_end_tags(Some(tag_id));
                if self.open.current().is_some_and(|e| e.tag_id != tag_id) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                }
                self.open.pop_until_tag(tag_id);
                BuilderStep::Continue
            }
            Token::EndTag { tag_id, .. } if tag_id.is_heading() => {
                let any_open = [
                    TagId::H1,
                    TagId::H2,
                    TagId::H3,
                    TagId::H4,
                    TagId::H5,
                    TagId::H6,
                ]
                .iter()
                .any(|h| self.open.has_in_scope(*h, ScopeKind::InScope));
                if !any_open {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.generate_implied_end_tags(None);
                if self.open.current().is_some_and(|e| e.tag_id != tag_id) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                }
                while let Some(entry) = self.open.pop() {
                    if entry.ns == Ns::Html && entry.tag_id.is_heading() {
                        break;
                    }
                }
                BuilderStep::Continue
            }
            Token::EndTag { ref name, tag_id } if tag_id.is_formatting() => {
                self.adoption_agency(sink, name, tag_id);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: tag_id @ (TagId::Applet | TagId::Marquee | TagId::Object),
                ..
            } => {
                if !self.open.has_in_scope(tag_id, ScopeKind::InScope) {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.generate_implied_end_tags(None);
                if self.open.current().is_some_and(|e| e.tag_id != tag_id) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                }
                self.open.pop_until_tag(tag_id);
                self.fmt.clear_to_last_marker();
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Br, ..
            } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                self.reconstruct_formatting(sink);
                self.insert_void_element(sink, "br", TagId::Br, &[]);
                self.frameset_ok = false;
                BuilderStep::Continue
            }
            Token::EndTag { tag_id, .. } if BLOCK_TAGS.contains(&tag_id) => {
                if !self.open.has_in_scope(tag_id, ScopeKind::InScope) {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.generate_implied_end_tags(None);
                if self.open.current().is_some_and(|e| e.tag_id != tag_id) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                }
                self.open.pop_until_tag(tag_id);
                BuilderStep::Continue
            }
            Token::EndTag { ref name, tag_id } => {
                self.any_other_end_tag(sink, name, tag_id);
                BuilderStep::Continue
            }
        }
    }

    fn close_body<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) -> bool {
        if !self.open.has_in_scope(TagId::Body, ScopeKind::InScope) {
            self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
            return false;
        }
        let benign = [
            TagId::Dd,
            TagId::Dt,
            TagId::Li,
            TagId::Optgroup,
            TagId::Option,
            TagId::P,
            TagId::Rb,
            TagId::Rp,
            TagId::Rt,
            TagId::Rtc,
            TagId::Tbody,
            TagId::Td,
            TagId::Tfoot,
            TagId::Th,
            TagId::Thead,
            TagId::Tr,
            TagId::Body,
            TagId::Html,
        ];
        if self
            .open
            .iter()
            .any(|e| e.ns == Ns::Html && !benign.contains(&e.tag_id))
        {
            self.error(sink, ParseErrorCode::MisnestedTag);
        }
        self.mode = InsertionMode::AfterBody;
        true
    }

    fn handle_form_end<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) {
        if self.open.topmost(TagId::Template).is_none() {
            let node = self.form.take();
            let Some(node) = node else {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                return;
            };
            if !self.open.has_element_in_scope(node, ScopeKind::InScope) {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                return;
            }
            self.generate_implied_end_tags(None);
            if self.open.current().is_some_and(|e| e.handle != node) {
                self.error(sink, ParseErrorCode::MisnestedTag);
            }
            if let Some(index) = self.open.index_of(node) {
                self.open.remove(index);
            }
        } else {
            if !self.open.has_in_scope(TagId::Form, ScopeKind::InScope) {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                return;
            }
            self.generate_implied_end_tags(None);
            if self.open.current().is_some_and(|e| e.tag_id != TagId::Form) {
                self.error(sink, ParseErrorCode::MisnestedTag);
            }
            self.open.pop_until_tag(TagId::Form);
        }
    }

    pub(super) fn close_p_element<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) {
        self.generate_implied_end_tags(Some(TagId::P));
        if self.open.current().is_some_and(|e| e.tag_id != TagId::P) {
            self.error(sink, ParseErrorCode::MisnestedTag);
        }
        self.open.pop_until_tag(TagId::P);
    }

    /// Walk from the current node closing `li`/`dd`/`dt` candidates, per the
    /// list-item auto-closing rules.
    fn auto_close_list_item<S: TreeSink<Handle = H>>(&mut self, sink: &mut S, targets: &[TagId]) {
        for index in (0..self.open.len()).rev() {
            let entry = self.open.get(index).expect("index in range").clone();
            if entry.ns == Ns::Html && targets.contains(&entry.tag_id) {
                self.generate_implied_end_tags(Some(entry.tag_id));
                if self.open.current().is_some_and(|e| e.handle != entry.handle) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                }
                self.open.pop_until_handle(entry.handle);
                return;
            }
            let special = is_special_entry(&entry);
            let exempt = entry.ns == Ns::Html
                && matches!(entry.tag_id, TagId::Address | TagId::Div | TagId::P);
            if special && !exempt {
                return;
            }
        }
    }

    /// "Any other end tag" in body: close a matching open element, or report
    /// and ignore if a special element intervenes.
    pub(super) fn any_other_end_tag<S: TreeSink<Handle = H>>(
        &mut self,
        sink: &mut S,
        name: &str,
        tag_id: TagId,
    ) {
        for index in (0..self.open.len()).rev() {
            let entry = self.open.get(index).expect("index in range").clone();
            let matches_token = entry.ns == Ns::Html
                && if tag_id == TagId::Other {
                    entry.name == name
                } else {
                    entry.tag_id == tag_id
                };
            if matches_token {
                self.generate_implied_end_tags(Some(tag_id));
                if self.open.current().is_some_and(|e| e.handle != entry.handle) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                }
                self.open.pop_until_handle(entry.handle);
                return;
            }
            if is_special_entry(&entry) {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                return;
            }
        }
    }

    /// The adoption agency algorithm, bounded to eight outer iterations.
    pub(super) fn adoption_agency<S: TreeSink<Handle = H>>(
        &mut self,
        sink: &mut S,
        subject_name: &str,
        subject: TagId,
    ) {
        // Fast path: current node matches and has no formatting entry.
        if let Some(current) = self.open.current()
            && current.ns == Ns::Html
            && current.tag_id == subject
            && !self.fmt.contains_handle(current.handle)
        {
            self.open.pop();
            return;
        }

        for _ in 0..ADOPTION_AGENCY_OUTER_CAP {
            let Some(fmt_index) = self.fmt.find_after_marker(subject) else {
                self.any_other_end_tag(sink, subject_name, subject);
                return;
            };
            let fmt_entry = match self.fmt.get(fmt_index) {
                Some(FormattingItem::Entry(e)) => e.clone(),
                _ => unreachable!("find_after_marker returns entries"),
            };

            let Some(fmt_stack_index) = self.open.index_of(fmt_entry.handle) else {
                self.error(sink, ParseErrorCode::MisnestedTag);
                self.fmt.remove(fmt_index);
                return;
            };
            if !self
                .open
                .has_element_in_scope(fmt_entry.handle, ScopeKind::InScope)
            {
                self.error(sink, ParseErrorCode::MisnestedTag);
                return;
            }
            if self.open.current().is_some_and(|e| e.handle != fmt_entry.handle) {
                self.error(sink, ParseErrorCode::MisnestedTag);
            }

            // Furthest block: lowest special element above the formatting
            // element on the stack.
            let furthest = ((fmt_stack_index + 1)..self.open.len()).find(|&i| {
                is_special_entry(self.open.get(i).expect("index in range"))
            });
            let Some(furthest_index) = furthest else {
                self.open.truncate(fmt_stack_index);
                self.fmt.remove(fmt_index);
                return;
            };

            let furthest_block = self.open.get(furthest_index).expect("index in range").clone();
            let common_ancestor_index = fmt_stack_index - 1;
            let mut bookmark = fmt_index;

            let mut node_index = furthest_index;
            let mut last_node = furthest_block.handle;
            let mut inner_counter = 0usize;
            loop {
                inner_counter += 1;
                node_index -= 1;
                let node = self.open.get(node_index).expect("index in range").clone();
                if node.handle == fmt_entry.handle {
                    break;
                }
                let node_fmt_index = self.fmt.index_of_handle(node.handle);
                if inner_counter > ADOPTION_AGENCY_INNER_CAP && node_fmt_index.is_some() {
                    let idx = node_fmt_index.expect("checked above");
                    self.fmt.remove(idx);
                    if idx < bookmark {
                        bookmark -= 1;
                    }
                    self.open.remove(node_index);
                    continue;
                }
                let Some(node_fmt_index) = node_fmt_index else {
                    self.open.remove(node_index);
                    continue;
                };

                // Clone the intermediate formatting element.
                let entry = match self.fmt.get(node_fmt_index) {
                    Some(FormattingItem::Entry(e)) => e.clone(),
                    _ => unreachable!("handle index points at an entry"),
                };
                let clone = sink.create_element(
                    Ns::Html,
                    &entry.name,
                    entry.tag_id,
                    entry.attrs.iter().map(ElemAttr::from_token_attr).collect(),
                );
                let new_entry = FormattingEntry {
                    handle: clone,
                    tag_id: entry.tag_id,
                    name: entry.name.clone(),
                    attrs: entry.attrs.clone(),
                };
                self.fmt.replace_entry(node_fmt_index, new_entry.clone());
                self.open.replace(
                    node_index,
                    OpenEntry {
                        handle: clone,
                        tag_id: entry.tag_id,
                        ns: Ns::Html,
                        name: entry.name.clone(),
                        html_ip: false,
                    },
                );
                if last_node == furthest_block.handle {
                    bookmark = node_fmt_index + 1;
                }
                sink.remove_from_parent(last_node);
                sink.append(clone, last_node);
                last_node = clone;
            }

            sink.remove_from_parent(last_node);
            let pos = self.appropriate_place(sink, Some(common_ancestor_index));
            self.insert_at(sink, pos, last_node);

            // Fresh element for the formatting entry; the old children of the
            // furthest block move under it.
            let clone = sink.create_element(
                Ns::Html,
                &fmt_entry.name,
                fmt_entry.tag_id,
                fmt_entry
                    .attrs
                    .iter()
                    .map(ElemAttr::from_token_attr)
                    .collect(),
            );
            sink.reparent_children(furthest_block.handle, clone);
            sink.append(furthest_block.handle, clone);

            let fmt_list_index = self
                .fmt
                .index_of_handle(fmt_entry.handle)
                .expect("entry still in list");
            self.fmt.remove(fmt_list_index);
            let bookmark = bookmark.min(self.fmt.len());
            let bookmark = if fmt_list_index < bookmark {
                bookmark - 1
            } else {
                bookmark
            };
            self.fmt.insert_entry(
                bookmark,
                FormattingEntry {
                    handle: clone,
                    tag_id: fmt_entry.tag_id,
                    name: fmt_entry.name.clone(),
                    attrs: fmt_entry.attrs.clone(),
                },
            );

            let old_stack_index = self
                .open
                .index_of(fmt_entry.handle)
                .expect("element still on stack");
            self.open.remove(old_stack_index);
            let furthest_now = self
                .open
                .index_of(furthest_block.handle)
                .expect("furthest block still on stack");
            self.open.insert(
                furthest_now + 1,
                OpenEntry {
                    handle: clone,
                    tag_id: fmt_entry.tag_id,
                    ns: Ns::Html,
                    name: fmt_entry.name.clone(),
                    html_ip: false,
                },
            );
        }
    }
}

pub(super) fn is_special_entry<H: Copy + Eq>(entry: &OpenEntry<H>) -> bool {
    match entry.ns {
        Ns::Html => entry.tag_id.is_special(),
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
