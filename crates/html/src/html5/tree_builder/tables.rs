//! Table, caption, column, row, cell, and select insertion modes.
//!
//! Misplaced table content is foster-parented: it is inserted into the
//! table's parent, immediately before the table, matching the historical
//! browser hoisting behavior.

use super::modes::InsertionMode;
use super::stack::ScopeKind;
use super::{is_all_ws, BuilderStep, TreeBuilder};
use crate::html5::shared::{ParseErrorCode, Token};
use crate::sink::{Ns, TreeSink};
use crate::tags::TagId;

impl<H: Copy + Eq + std::fmt::Debug> TreeBuilder<H> {
    pub(super) fn handle_in_table<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { .. }
                if self.open.current().is_some_and(|e| {
                    e.ns == Ns::Html
                        && matches!(
                            e.tag_id,
                            TagId::Table | TagId::Tbody | TagId::Tfoot | TagId::Thead | TagId::Tr
                        )
                }) =>
            {
                self.pending_table_text.clear();
                self.orig_mode = Some(self.mode);
                self.mode = InsertionMode::InTableText;
                self.process_in_mode(token, sink)
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
                ref name,
                tag_id: TagId::Caption,
                ref attrs,
                ..
            } => {
                self.clear_stack_to_table_context();
                self.fmt.push_marker();
                self.insert_html_element(sink, name, TagId::Caption, attrs);
                self.mode = InsertionMode::InCaption;
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Colgroup,
                ref attrs,
                ..
            } => {
                self.clear_stack_to_table_context();
                self.insert_html_element(sink, name, TagId::Colgroup, attrs);
                self.mode = InsertionMode::InColumnGroup;
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Col, ..
            } => {
                self.clear_stack_to_table_context();
                self.insert_html_element(sink, "colgroup", TagId::Colgroup, &[]);
                self.mode = InsertionMode::InColumnGroup;
                self.process_in_mode(token, sink)
            }
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Tbody | TagId::Tfoot | TagId::Thead),
                ref attrs,
                ..
            } => {
                self.clear_stack_to_table_context();
                self.insert_html_element(sink, name, tag_id, attrs);
                self.mode = InsertionMode::InTableBody;
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Td | TagId::Th | TagId::Tr,
                ..
            } => {
                self.clear_stack_to_table_context();
                self.insert_html_element(sink, "tbody", TagId::Tbody, &[]);
                self.mode = InsertionMode::InTableBody;
                self.process_in_mode(token, sink)
            }
            Token::StartTag {
                tag_id: TagId::Table,
                ..
            } => {
                self.error(sink, ParseErrorCode::MisnestedTag);
                if self.open.find_in_scope(TagId::Table, ScopeKind::Table).is_none() {
                    return BuilderStep::Continue;
                }
                self.open.pop_until_tag(TagId::Table);
                self.reset_insertion_mode();
                self.process_in_mode(token, sink)
            }
            Token::EndTag {
                tag_id: TagId::Table,
                ..
            } => {
                if self.open.find_in_scope(TagId::Table, ScopeKind::Table).is_none() {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.open.pop_until_tag(TagId::Table);
                self.reset_insertion_mode();
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id:
                    TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                ..
            } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Style | TagId::Script | TagId::Template,
                ..
            }
            | Token::EndTag {
                tag_id: TagId::Template,
                ..
            } => self.handle_in_head(token, sink),
            Token::StartTag {
                ref name,
                tag_id: TagId::Input,
                ref attrs,
                ..
            } if attrs
                .iter()
                .any(|a| a.name == "type" && a.value.eq_ignore_ascii_case("hidden")) =>
            {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                self.insert_void_element(sink, name, TagId::Input, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Form,
                ref attrs,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                if self.open.topmost(TagId::Template).is_some() || self.form.is_some() {
                    return BuilderStep::Continue;
                }
                let el = self.insert_html_element(sink, name, TagId::Form, attrs);
                self.form = Some(el);
                self.open.pop();
                BuilderStep::Continue
            }
            Token::Eof => self.handle_in_body(token, sink),
            other => {
                // Foster-parent anything else through the in-body rules.
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                self.foster_parenting = true;
                let step = self.handle_in_body(other, sink);
                self.foster_parenting = false;
                step
            }
        }
    }

    pub(super) fn handle_in_table_text<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { text } => {
                self.pending_table_text.push_str(&text);
                BuilderStep::Continue
            }
            other => {
                let pending = std::mem::take(&mut self.pending_table_text);
                if !pending.is_empty() {
                    if is_all_ws(&pending) {
                        self.insert_text(sink, &pending);
                    } else {
                        self.error(sink, ParseErrorCode::UnexpectedStartTag);
                        self.foster_parenting = true;
                        self.reconstruct_formatting(sink);
                        self.insert_text(sink, &pending);
                        self.frameset_ok = false;
                        self.foster_parenting = false;
                    }
                }
                self.mode = self.orig_mode.take().unwrap_or(InsertionMode::InTable);
                self.process_in_mode(other, sink)
            }
        }
    }

    pub(super) fn handle_in_caption<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::EndTag {
                tag_id: TagId::Caption,
                ..
            } => {
                self.close_caption(sink);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id:
                    TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                ..
            }
            | Token::EndTag {
                tag_id: TagId::Table,
                ..
            } => {
                if self
                    .open
                    .find_in_scope(TagId::Caption, ScopeKind::Table)
                    .is_none()
                {
                    self.error(sink, ParseErrorCode::UnexpectedStartTag);
                    return BuilderStep::Continue;
                }
                self.close_caption(sink);
                self.process_in_mode(token, sink)
            }
            Token::EndTag {
                tag_id:
                    TagId::Body
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                ..
            } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            other => self.handle_in_body(other, sink),
        }
    }

    fn close_caption<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) {
        if self
            .open
            .find_in_scope(TagId::Caption, ScopeKind::Table)
            .is_none()
        {
            self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
            return;
        }
        self.generate_implied_end_tags(None);
        if self
            .open
            .current()
            .is_some_and(|e| e.tag_id != TagId::Caption)
        {
            self.error(sink, ParseErrorCode::MisnestedTag);
        }
        self.open.pop_until_tag(TagId::Caption);
        self.fmt.clear_to_last_marker();
        self.mode = InsertionMode::InTable;
    }

    pub(super) fn handle_in_column_group<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { text } => self.insert_ws_then_reprocess(text, sink),
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
                ..
            } => self.handle_in_body(token, sink),
            Token::StartTag {
                ref name,
                tag_id: TagId::Col,
                ref attrs,
                ..
            } => {
                self.insert_void_element(sink, name, TagId::Col, attrs);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Colgroup,
                ..
            } => {
                if self
                    .open
                    .current()
                    .is_some_and(|e| e.tag_id != TagId::Colgroup)
                {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.open.pop();
                self.mode = InsertionMode::InTable;
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Col, ..
            } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Template,
                ..
            }
            | Token::EndTag {
                tag_id: TagId::Template,
                ..
            } => self.handle_in_head(token, sink),
            Token::Eof => self.handle_in_body(token, sink),
            other => {
                if self
                    .open
                    .current()
                    .is_some_and(|e| e.tag_id != TagId::Colgroup)
                {
                    self.error(sink, ParseErrorCode::UnexpectedStartTag);
                    return BuilderStep::Continue;
                }
                self.open.pop();
                self.mode = InsertionMode::InTable;
                self.process_in_mode(other, sink)
            }
        }
    }

    pub(super) fn handle_in_table_body<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::StartTag {
                ref name,
                tag_id: TagId::Tr,
                ref attrs,
                ..
            } => {
                self.clear_stack_to_table_body_context();
                self.insert_html_element(sink, name, TagId::Tr, attrs);
                self.mode = InsertionMode::InRow;
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Td | TagId::Th,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                self.clear_stack_to_table_body_context();
                self.insert_html_element(sink, "tr", TagId::Tr, &[]);
                self.mode = InsertionMode::InRow;
                self.process_in_mode(token, sink)
            }
            Token::EndTag {
                tag_id: tag_id @ (TagId::Tbody | TagId::Tfoot | TagId::Thead),
                ..
            } => {
                if self.open.find_in_scope(tag_id, ScopeKind::Table).is_none() {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.clear_stack_to_table_body_context();
                self.open.pop();
                self.mode = InsertionMode::InTable;
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id:
                    TagId::Caption | TagId::Col | TagId::Colgroup | TagId::Tbody | TagId::Tfoot
                        | TagId::Thead,
                ..
            }
            | Token::EndTag {
                tag_id: TagId::Table,
                ..
            } => {
                let any_section = [TagId::Tbody, TagId::Thead, TagId::Tfoot]
                    .iter()
                    .any(|t| self.open.find_in_scope(*t, ScopeKind::Table).is_some());
                if !any_section {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.clear_stack_to_table_body_context();
                self.open.pop();
                self.mode = InsertionMode::InTable;
                self.process_in_mode(token, sink)
            }
            Token::EndTag {
                tag_id:
                    TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Td
                        | TagId::Th
                        | TagId::Tr,
                ..
            } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            other => self.handle_in_table(other, sink),
        }
    }

    pub(super) fn handle_in_row<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Td | TagId::Th),
                ref attrs,
                ..
            } => {
                self.clear_stack_to_table_row_context();
                self.insert_html_element(sink, name, tag_id, attrs);
                self.mode = InsertionMode::InCell;
                self.fmt.push_marker();
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Tr, ..
            } => {
                if !self.close_row(sink) {
                    return BuilderStep::Continue;
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id:
                    TagId::Caption | TagId::Col | TagId::Colgroup | TagId::Tbody | TagId::Tfoot
                        | TagId::Thead | TagId::Tr,
                ..
            }
            | Token::EndTag {
                tag_id: TagId::Table,
                ..
            } => {
                if !self.close_row(sink) {
                    return BuilderStep::Continue;
                }
                self.process_in_mode(token, sink)
            }
            Token::EndTag {
                tag_id: tag_id @ (TagId::Tbody | TagId::Tfoot | TagId::Thead),
                ..
            } => {
                if self.open.find_in_scope(tag_id, ScopeKind::Table).is_none() {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                if !self.close_row(sink) {
                    return BuilderStep::Continue;
                }
                self.process_in_mode(token, sink)
            }
            Token::EndTag {
                tag_id:
                    TagId::Body
                        | TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Html
                        | TagId::Td
                        | TagId::Th,
                ..
            } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            other => self.handle_in_table(other, sink),
        }
    }

    fn close_row<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) -> bool {
        if self.open.find_in_scope(TagId::Tr, ScopeKind::Table).is_none() {
            self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
            return false;
        }
        self.clear_stack_to_table_row_context();
        self.open.pop();
        self.mode = InsertionMode::InTableBody;
        true
    }

    pub(super) fn handle_in_cell<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::EndTag {
                tag_id: tag_id @ (TagId::Td | TagId::Th),
                ..
            } => {
                if self.open.find_in_scope(tag_id, ScopeKind::Table).is_none() {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.generate_implied_end_tags(None);
                if self.open.current().is_some_and(|e| e.tag_id != tag_id) {
                    self.error(sink, ParseErrorCode::MisnestedTag);
                }
                self.open.pop_until_tag(tag_id);
                self.fmt.clear_to_last_marker();
                self.mode = InsertionMode::InRow;
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id:
                    TagId::Caption
                        | TagId::Col
                        | TagId::Colgroup
                        | TagId::Tbody
                        | TagId::Td
                        | TagId::Tfoot
                        | TagId::Th
                        | TagId::Thead
                        | TagId::Tr,
                ..
            } => {
                if !self.close_cell(sink) {
                    self.error(sink, ParseErrorCode::UnexpectedStartTag);
                    return BuilderStep::Continue;
                }
                self.process_in_mode(token, sink)
            }
            Token::EndTag {
                tag_id: TagId::Body | TagId::Caption | TagId::Col | TagId::Colgroup | TagId::Html,
                ..
            } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: tag_id @ (TagId::Table | TagId::Tbody | TagId::Tfoot | TagId::Thead | TagId::Tr),
                ..
            } => {
                if self.open.find_in_scope(tag_id, ScopeKind::Table).is_none() {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                if !self.close_cell(sink) {
                    return BuilderStep::Continue;
                }
                self.process_in_mode(token, sink)
            }
            other => self.handle_in_body(other, sink),
        }
    }

    fn close_cell<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) -> bool {
        let cell = [TagId::Td, TagId::Th]
            .into_iter()
            .find(|t| self.open.find_in_scope(*t, ScopeKind::Table).is_some());
        let Some(cell) = cell else {
            return false;
        };
        self.generate_implied_end_tags(None);
        if self.open.current().is_some_and(|e| e.tag_id != cell) {
            self.error(sink, ParseErrorCode::MisnestedTag);
        }
        self.open.pop_until_tag(cell);
        self.fmt.clear_to_last_marker();
        self.mode = InsertionMode::InRow;
        true
    }

    pub(super) fn handle_in_select<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { text } => {
                self.insert_text(sink, &text);
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
                ..
            } => self.handle_in_body(token, sink),
            Token::StartTag {
                ref name,
                tag_id: TagId::Option,
                ref attrs,
                ..
            } => {
                if self.open.current().is_some_and(|e| e.tag_id == TagId::Option) {
                    self.open.pop();
                }
                self.insert_html_element(sink, name, TagId::Option, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Optgroup,
                ref attrs,
                ..
            } => {
                if self.open.current().is_some_and(|e| e.tag_id == TagId::Option) {
                    self.open.pop();
                }
                if self
                    .open
                    .current()
                    .is_some_and(|e| e.tag_id == TagId::Optgroup)
                {
                    self.open.pop();
                }
                self.insert_html_element(sink, name, TagId::Optgroup, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Hr,
                ref attrs,
                ..
            } => {
                if self.open.current().is_some_and(|e| e.tag_id == TagId::Option) {
                    self.open.pop();
                }
                if self
                    .open
                    .current()
                    .is_some_and(|e| e.tag_id == TagId::Optgroup)
                {
                    self.open.pop();
                }
                self.insert_void_element(sink, name, TagId::Hr, attrs);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Optgroup,
                ..
            } => {
                if self.open.current().is_some_and(|e| e.tag_id == TagId::Option)
                    && self
                        .open
                        .get(self.open.len().saturating_sub(2))
                        .is_some_and(|e| e.tag_id == TagId::Optgroup)
                {
                    self.open.pop();
                }
                if self
                    .open
                    .current()
                    .is_some_and(|e| e.tag_id == TagId::Optgroup)
                {
                    self.open.pop();
                } else {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                }
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Option,
                ..
            } => {
                if self.open.current().is_some_and(|e| e.tag_id == TagId::Option) {
                    self.open.pop();
                } else {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                }
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Select,
                ..
            } => {
                if !self.open.has_in_scope(TagId::Select, ScopeKind::Select) {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.open.pop_until_tag(TagId::Select);
                self.reset_insertion_mode();
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Select,
                ..
            } => {
                self.error(sink, ParseErrorCode::MisnestedTag);
                if self.open.has_in_scope(TagId::Select, ScopeKind::Select) {
                    self.open.pop_until_tag(TagId::Select);
                    self.reset_insertion_mode();
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Input | TagId::Keygen | TagId::Textarea,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                if !self.open.has_in_scope(TagId::Select, ScopeKind::Select) {
                    return BuilderStep::Continue;
                }
                self.open.pop_until_tag(TagId::Select);
                self.reset_insertion_mode();
                self.process_in_mode(token, sink)
            }
            Token::StartTag {
                tag_id: TagId::Script | TagId::Template,
                ..
            }
            | Token::EndTag {
                tag_id: TagId::Template,
                ..
            } => self.handle_in_head(token, sink),
            Token::Eof => self.handle_in_body(token, sink),
            Token::StartTag { .. } | Token::EndTag { .. } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                BuilderStep::Continue
            }
        }
    }

    pub(super) fn handle_in_select_in_table<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::StartTag {
                tag_id:
                    TagId::Caption
                        | TagId::Table
                        | TagId::Tbody
                        | TagId::Tfoot
                        | TagId::Thead
                        | TagId::Tr
                        | TagId::Td
                        | TagId::Th,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                self.open.pop_until_tag(TagId::Select);
                self.reset_insertion_mode();
                self.process_in_mode(token, sink)
            }
            Token::EndTag {
                tag_id:
                    tag_id @ (TagId::Caption
                        | TagId::Table
                        | TagId::Tbody
                        | TagId::Tfoot
                        | TagId::Thead
                        | TagId::Tr
                        | TagId::Td
                        | TagId::Th),
                ..
            } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                if self.open.find_in_scope(tag_id, ScopeKind::Table).is_none() {
                    return BuilderStep::Continue;
                }
                self.open.pop_until_tag(TagId::Select);
                self.reset_insertion_mode();
                self.process_in_mode(token, sink)
            }
            other => self.handle_in_select(other, sink),
        }
    }

    fn clear_stack_to_table_context(&mut self) {
        loop {
            let Some(current) = self.open.current() else { return };
            if current.ns == Ns::Html
                && matches!(current.tag_id, TagId::Table | TagId::Template | TagId::Html)
            {
                return;
            }
            self.open.pop();
        }
    }

    fn clear_stack_to_table_body_context(&mut self) {
        loop {
            let Some(current) = self.open.current() else { return };
            if current.ns == Ns::Html
                && matches!(
                    current.tag_id,
                    TagId::Tbody | TagId::Tfoot | TagId::Thead | TagId::Template | TagId::Html
                )
            {
                return;
            }
            self.open.pop();
        }
    }

    fn clear_stack_to_table_row_context(&mut self) {
        loop {
            let Some(current) = self.open.current() else { return };
            if current.ns == Ns::Html
                && matches!(current.tag_id, TagId::Tr | TagId::Template | TagId::Html)
            {
                return;
            }
            self.open.pop();
        }
    }
}
