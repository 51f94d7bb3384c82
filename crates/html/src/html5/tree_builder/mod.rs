//! HTML5 tree constructor.
//!
//! Consumes the token stream and mutates a document through the abstract
//! [`TreeSink`] interface, so the same algorithm targets the engine's own
//! document model or a host DOM. The builder owns all tree-construction
//! state: insertion modes, the stack of open elements, the active formatting
//! list, and the template insertion-mode stack.
//!
//! Invariants:
//! - Tokens are consumed in order; any byte stream produces some tree.
//! - Recoverable conditions are reported through `TreeSink::parse_error` and
//!   never abort construction.
//! - Raw-text tokenizer switches are communicated back to the driver as
//!   explicit [`BuilderStep`] directives; there is no hidden back-channel
//!   into the tokenizer.

use crate::html5::shared::{Attribute, ParseError, ParseErrorCode, Token};
use crate::html5::tokenizer::RawKind;
use crate::sink::{ElemAttr, Ns, QuirksMode, TreeSink};
use crate::tags::TagId;

use formatting::{FormattingEntry, FormattingItem, FormattingList};
use modes::InsertionMode;
use stack::{OpenElements, OpenEntry};

mod foreign;
mod formatting;
mod in_body;
mod modes;
mod stack;
mod tables;

#[cfg(test)]
mod tests;

/// Tree-builder configuration.
#[derive(Clone, Debug)]
pub struct TreeBuilderConfig {
    /// Treat `<noscript>` content as raw text (scripting on) or parse it
    /// (scripting off). Server-side rendering keeps scripting off.
    pub scripting_enabled: bool,
}

impl Default for TreeBuilderConfig {
    fn default() -> Self {
        Self {
            scripting_enabled: false,
        }
    }
}

/// Context element for fragment parsing.
#[derive(Clone, Debug)]
pub struct FragmentContext {
    pub name: String,
    pub tag_id: TagId,
    pub ns: Ns,
}

impl FragmentContext {
    pub fn html(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tag_id: TagId::from_name(name),
            ns: Ns::Html,
        }
    }
}

/// Directive returned from `push_token`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderStep {
    Continue,
    /// The driver must switch the tokenizer into the given raw-text mode for
    /// the element whose start tag was just processed.
    SwitchTokenizer(RawKind),
}

/// HTML5 tree builder, generic over the sink's handle type.
pub struct TreeBuilder<H: Copy + Eq + std::fmt::Debug> {
    config: TreeBuilderConfig,
    mode: InsertionMode,
    orig_mode: Option<InsertionMode>,
    template_modes: Vec<InsertionMode>,
    open: OpenElements<H>,
    fmt: FormattingList<H>,
    doc: H,
    head: Option<OpenEntry<H>>,
    form: Option<H>,
    frameset_ok: bool,
    foster_parenting: bool,
    quirks: QuirksMode,
    pending_table_text: String,
    ignore_lf: bool,
    fragment_ctx: Option<FragmentContext>,
    done: bool,
    /// Ordinal of the token being processed, used as the error position.
    position: usize,
}

enum InsertPos<H> {
    AppendTo(H),
    BeforeSibling(H),
}

impl<H: Copy + Eq + std::fmt::Debug> TreeBuilder<H> {
    /// Builder for a full document parse. `doc` is the sink's document handle.
    pub fn new(config: TreeBuilderConfig, doc: H) -> Self {
        Self {
            config,
            mode: InsertionMode::Initial,
            orig_mode: None,
            template_modes: Vec::new(),
            open: OpenElements::default(),
            fmt: FormattingList::default(),
            doc,
            head: None,
            form: None,
            frameset_ok: true,
            foster_parenting: false,
            quirks: QuirksMode::NoQuirks,
            pending_table_text: String::new(),
            ignore_lf: false,
            fragment_ctx: None,
            done: false,
            position: 0,
        }
    }

    /// Builder for fragment parsing. `root` is an `html` element the driver
    /// created and appended to `doc`; parsed content collects under it.
    pub fn new_fragment(
        config: TreeBuilderConfig,
        doc: H,
        root: H,
        ctx: FragmentContext,
    ) -> Self {
        let mut builder = Self::new(config, doc);
        builder.open.push(OpenEntry {
            handle: root,
            tag_id: TagId::Html,
            ns: Ns::Html,
            name: "html".to_string(),
            html_ip: false,
        });
        if ctx.ns == Ns::Html && ctx.tag_id == TagId::Template {
            builder.template_modes.push(InsertionMode::InTemplate);
        }
        builder.fragment_ctx = Some(ctx);
        builder.reset_insertion_mode();
        builder
    }

    /// Initial tokenizer mode for a fragment context, decided by the context
    /// element the same way a start tag would decide it.
    pub fn fragment_tokenizer_mode(ctx: &FragmentContext, scripting: bool) -> Option<RawKind> {
        if ctx.ns != Ns::Html {
            return None;
        }
        match ctx.tag_id {
            TagId::Title | TagId::Textarea => Some(RawKind::Rcdata),
            TagId::Style | TagId::Xmp | TagId::Iframe | TagId::Noembed | TagId::Noframes => {
                Some(RawKind::Rawtext)
            }
            TagId::Noscript if scripting => Some(RawKind::Rawtext),
            TagId::Script => Some(RawKind::ScriptData),
            TagId::Plaintext => Some(RawKind::Plaintext),
            _ => None,
        }
    }

    /// True while `<![CDATA[` should open a CDATA section: the adjusted
    /// current node is in a foreign namespace.
    pub fn cdata_allowed(&self) -> bool {
        self.adjusted_current_ns() != Some(Ns::Html) && self.adjusted_current_ns().is_some()
    }

    /// Whether parsing has reached the end of the stream.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Push one token through the construction algorithm.
    pub fn push_token<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        self.position += 1;
        if self.done {
            return BuilderStep::Continue;
        }
        if !matches!(token, Token::Text { .. }) {
            self.ignore_lf = false;
        }
        if self.use_foreign_rules(&token) {
            self.process_foreign(token, sink)
        } else {
            self.process_in_mode(token, sink)
        }
    }

    // ---- dispatcher ----

    fn acn(&self) -> Option<(Ns, TagId, bool)> {
        if self.open.is_empty() {
            return None;
        }
        if let Some(ctx) = &self.fragment_ctx
            && self.open.len() == 1
        {
            return Some((ctx.ns, ctx.tag_id, false));
        }
        let current = self.open.current().expect("non-empty stack");
        Some((current.ns, current.tag_id, current.html_ip))
    }

    fn adjusted_current_ns(&self) -> Option<Ns> {
        self.acn().map(|(ns, _, _)| ns)
    }

    fn use_foreign_rules(&self, token: &Token) -> bool {
        let Some((ns, tag_id, html_ip)) = self.acn() else {
            return false;
        };
        if ns == Ns::Html {
            return false;
        }
        let mathml_text_ip = ns == Ns::MathMl
            && matches!(
                tag_id,
                TagId::Mi | TagId::Mo | TagId::Mn | TagId::Ms | TagId::Mtext
            );
        match token {
            Token::StartTag { tag_id: id, .. } => {
                if mathml_text_ip && !matches!(id, TagId::Mglyph | TagId::Malignmark) {
                    return false;
                }
                if ns == Ns::MathMl && tag_id == TagId::AnnotationXml && *id == TagId::Svg {
                    return false;
                }
                if html_ip {
                    return false;
                }
                true
            }
            Token::Text { .. } => !(mathml_text_ip || html_ip),
            Token::Eof => false,
            _ => true,
        }
    }

    fn process_foreign<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match &token {
            Token::Text { text } => {
                self.insert_text(sink, text);
                if !is_all_ws(text) {
                    self.frameset_ok = false;
                }
            }
            Token::Comment { text } => self.insert_comment(sink, text),
            Token::Doctype { .. } => self.error(sink, ParseErrorCode::MisplacedDoctype),
            Token::StartTag {
                name,
                tag_id,
                attrs,
                self_closing,
            } => {
                if foreign::is_breakout_tag(*tag_id, name, attrs) {
                    self.error(sink, ParseErrorCode::UnexpectedStartTag);
                    loop {
                        let Some(current) = self.open.current() else { break };
                        if current.ns == Ns::Html
                            || current.html_ip
                            || (current.ns == Ns::MathMl
                                && matches!(
                                    current.tag_id,
                                    TagId::Mi | TagId::Mo | TagId::Mn | TagId::Ms | TagId::Mtext
                                ))
                        {
                            break;
                        }
                        self.open.pop();
                    }
                    return self.process_in_mode(token, sink);
                }
                let ns = self
                    .adjusted_current_ns()
                    .expect("foreign rules require an open element");
                let el = self.insert_foreign_element(sink, ns, name, *tag_id, attrs);
                if *self_closing {
                    let _ = el;
                    self.open.pop();
                }
            }
            Token::EndTag { name, .. } => {
                let top_matches = self
                    .open
                    .current()
                    .is_some_and(|e| e.name.eq_ignore_ascii_case(name));
                if !top_matches {
                    self.error(sink, ParseErrorCode::UnexpectedEndTag);
                }
                let mut index = self.open.len();
                while index > 0 {
                    index -= 1;
                    let entry = self.open.get(index).expect("index in range");
                    if entry.ns == Ns::Html {
                        // Fall through to the HTML rules for this token.
                        return self.process_in_mode(token, sink);
                    }
                    if entry.name.eq_ignore_ascii_case(name) {
                        self.open.truncate(index);
                        break;
                    }
                }
            }
            Token::Eof => return self.process_in_mode(token, sink),
        }
        BuilderStep::Continue
    }

    // ---- insertion plumbing ----

    fn error<S: TreeSink<Handle = H>>(&mut self, sink: &mut S, code: ParseErrorCode) {
        sink.parse_error(ParseError::new(code, self.position));
    }

    fn appropriate_place<S: TreeSink<Handle = H>>(
        &mut self,
        sink: &mut S,
        override_index: Option<usize>,
    ) -> InsertPos<H> {
        let target_index = match override_index {
            Some(index) => index,
            None => {
                if self.open.is_empty() {
                    return InsertPos::AppendTo(self.doc);
                }
                self.open.len() - 1
            }
        };
        let target = self.open.get(target_index).expect("target on stack").clone();

        if self.foster_parenting
            && target.ns == Ns::Html
            && matches!(
                target.tag_id,
                TagId::Table | TagId::Tbody | TagId::Tfoot | TagId::Thead | TagId::Tr
            )
        {
            let last_template = self.open.iter().rposition(|e| {
                e.ns == Ns::Html && e.tag_id == TagId::Template
            });
            let last_table = self
                .open
                .iter()
                .rposition(|e| e.ns == Ns::Html && e.tag_id == TagId::Table);
            match (last_template, last_table) {
                (Some(t), table) if table.is_none_or(|tb| t > tb) => {
                    let template = self.open.get(t).expect("template on stack").handle;
                    return InsertPos::AppendTo(sink.template_content(template));
                }
                (_, None) => {
                    let first = self.open.get(0).expect("non-empty stack").handle;
                    return InsertPos::AppendTo(first);
                }
                (_, Some(tb)) => {
                    let table = self.open.get(tb).expect("table on stack").handle;
                    if sink.has_parent(table) {
                        return InsertPos::BeforeSibling(table);
                    }
                    let below = self.open.get(tb - 1).expect("table has a stack parent");
                    return InsertPos::AppendTo(below.handle);
                }
            }
        }

        if target.ns == Ns::Html && target.tag_id == TagId::Template {
            return InsertPos::AppendTo(sink.template_content(target.handle));
        }
        InsertPos::AppendTo(target.handle)
    }

    fn insert_at<S: TreeSink<Handle = H>>(&mut self, sink: &mut S, pos: InsertPos<H>, node: H) {
        match pos {
            InsertPos::AppendTo(parent) => sink.append(parent, node),
            InsertPos::BeforeSibling(sibling) => sink.append_before_sibling(sibling, node),
        }
    }

    fn insert_text<S: TreeSink<Handle = H>>(&mut self, sink: &mut S, text: &str) {
        let pos = self.appropriate_place(sink, None);
        match pos {
            InsertPos::AppendTo(parent) => sink.append_text(parent, text),
            InsertPos::BeforeSibling(sibling) => sink.insert_text_before_sibling(sibling, text),
        }
    }

    fn insert_comment<S: TreeSink<Handle = H>>(&mut self, sink: &mut S, text: &str) {
        let comment = sink.create_comment(text);
        let pos = self.appropriate_place(sink, None);
        self.insert_at(sink, pos, comment);
    }

    fn insert_html_element<S: TreeSink<Handle = H>>(
        &mut self,
        sink: &mut S,
        name: &str,
        tag_id: TagId,
        attrs: &[Attribute],
    ) -> H {
        let elem_attrs = attrs.iter().map(ElemAttr::from_token_attr).collect();
        let el = sink.create_element(Ns::Html, name, tag_id, elem_attrs);
        let pos = self.appropriate_place(sink, None);
        self.insert_at(sink, pos, el);
        self.open.push(OpenEntry {
            handle: el,
            tag_id,
            ns: Ns::Html,
            name: name.to_string(),
            html_ip: false,
        });
        el
    }

    fn insert_void_element<S: TreeSink<Handle = H>>(
        &mut self,
        sink: &mut S,
        name: &str,
        tag_id: TagId,
        attrs: &[Attribute],
    ) {
        self.insert_html_element(sink, name, tag_id, attrs);
        self.open.pop();
    }

    fn insert_foreign_element<S: TreeSink<Handle = H>>(
        &mut self,
        sink: &mut S,
        ns: Ns,
        name: &str,
        tag_id: TagId,
        attrs: &[Attribute],
    ) -> H {
        let (adjusted_name, elem_attrs) = match ns {
            Ns::Svg => (
                foreign::adjust_svg_tag_name(name).to_string(),
                foreign::adjust_svg_attrs(attrs),
            ),
            Ns::MathMl => (name.to_string(), foreign::adjust_mathml_attrs(attrs)),
            Ns::Html => (
                name.to_string(),
                attrs.iter().map(ElemAttr::from_token_attr).collect(),
            ),
        };
        let html_ip = match ns {
            Ns::Svg => matches!(tag_id, TagId::ForeignObject | TagId::Desc | TagId::Title),
            Ns::MathMl => {
                tag_id == TagId::AnnotationXml
                    && attrs.iter().any(|a| {
                        a.name == "encoding"
                            && (a.value.eq_ignore_ascii_case("text/html")
                                || a.value.eq_ignore_ascii_case("application/xhtml+xml"))
                    })
            }
            Ns::Html => false,
        };
        let el = sink.create_element(ns, &adjusted_name, tag_id, elem_attrs);
        let pos = self.appropriate_place(sink, None);
        self.insert_at(sink, pos, el);
        self.open.push(OpenEntry {
            handle: el,
            tag_id,
            ns,
            name: name.to_string(),
            html_ip,
        });
        el
    }

    fn insert_raw_element<S: TreeSink<Handle = H>>(
        &mut self,
        sink: &mut S,
        name: &str,
        tag_id: TagId,
        attrs: &[Attribute],
        kind: RawKind,
    ) -> BuilderStep {
        self.insert_html_element(sink, name, tag_id, attrs);
        self.orig_mode = Some(self.mode);
        self.mode = InsertionMode::Text;
        BuilderStep::SwitchTokenizer(kind)
    }

    // ---- shared algorithms ----

    fn generate_implied_end_tags(&mut self, except: Option<TagId>) {
        loop {
            let Some(current) = self.open.current() else { return };
            if current.ns != Ns::Html {
                return;
            }
            let implied = matches!(
                current.tag_id,
                TagId::Dd
                    | TagId::Dt
                    | TagId::Li
                    | TagId::Optgroup
                    | TagId::Option
                    | TagId::P
                    | TagId::Rb
                    | TagId::Rp
                    | TagId::Rt
                    | TagId::Rtc
            );
            if !implied || Some(current.tag_id) == except {
                return;
            }
            self.open.pop();
        }
    }

    fn generate_implied_end_tags_thoroughly(&mut self) {
        loop {
            let Some(current) = self.open.current() else { return };
            if current.ns != Ns::Html {
                return;
            }
            let implied = matches!(
                current.tag_id,
                TagId::Caption
                    | TagId::Colgroup
                    | TagId::Dd
                    | TagId::Dt
                    | TagId::Li
                    | TagId::Optgroup
                    | TagId::Option
                    | TagId::P
                    | TagId::Rb
                    | TagId::Rp
                    | TagId::Rt
                    | TagId::Rtc
                    | TagId::Tbody
                    | TagId::Td
                    | TagId::Tfoot
                    | TagId::Th
                    | TagId::Thead
                    | TagId::Tr
            );
            if !implied {
                return;
            }
            self.open.pop();
        }
    }

    /// Re-open formatting elements whose entries are not yet bound to nodes
    /// on the stack (after they were implicitly closed).
    fn reconstruct_formatting<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) {
        let range = self.fmt.segment_range();
        if range.is_empty() {
            return;
        }
        // Find the earliest entry in the segment that is not on the stack.
        let mut first_unopened = None;
        for index in range.clone().rev() {
            let Some(FormattingItem::Entry(entry)) = self.fmt.get(index) else {
                break;
            };
            if self.open.contains(entry.handle) {
                break;
            }
            first_unopened = Some(index);
        }
        let Some(start) = first_unopened else { return };
        for index in start..range.end {
            let Some(FormattingItem::Entry(entry)) = self.fmt.get(index) else {
                continue;
            };
            let (name, tag_id, attrs) = (entry.name.clone(), entry.tag_id, entry.attrs.clone());
            let el = self.insert_html_element(sink, &name, tag_id, &attrs);
            self.fmt.replace_entry(
                index,
                FormattingEntry {
                    handle: el,
                    tag_id,
                    name,
                    attrs,
                },
            );
        }
    }

    fn reset_insertion_mode(&mut self) {
        for index in (0..self.open.len()).rev() {
            let mut last = false;
            let mut entry = self.open.get(index).expect("index in range").clone();
            if index == 0 {
                last = true;
                if let Some(ctx) = &self.fragment_ctx {
                    entry = OpenEntry {
                        handle: entry.handle,
                        tag_id: ctx.tag_id,
                        ns: ctx.ns,
                        name: ctx.name.clone(),
                        html_ip: false,
                    };
                }
            }
            if entry.ns != Ns::Html {
                continue;
            }
            match entry.tag_id {
                TagId::Select => {
                    self.mode = InsertionMode::InSelect;
                    if !last {
                        for above in (0..index).rev() {
                            let e = self.open.get(above).expect("index in range");
                            if e.ns == Ns::Html && e.tag_id == TagId::Template {
                                break;
                            }
                            if e.ns == Ns::Html && e.tag_id == TagId::Table {
                                self.mode = InsertionMode::InSelectInTable;
                                break;
                            }
                        }
                    }
                    return;
                }
                TagId::Td | TagId::Th if !last => {
                    self.mode = InsertionMode::InCell;
                    return;
                }
                TagId::Tr => {
                    self.mode = InsertionMode::InRow;
                    return;
                }
                TagId::Tbody | TagId::Thead | TagId::Tfoot => {
                    self.mode = InsertionMode::InTableBody;
                    return;
                }
                TagId::Caption => {
                    self.mode = InsertionMode::InCaption;
                    return;
                }
                TagId::Colgroup => {
                    self.mode = InsertionMode::InColumnGroup;
                    return;
                }
                TagId::Table => {
                    self.mode = InsertionMode::InTable;
                    return;
                }
                TagId::Template => {
                    self.mode = *self
                        .template_modes
                        .last()
                        .unwrap_or(&InsertionMode::InTemplate);
                    return;
                }
                TagId::Head if !last => {
                    self.mode = InsertionMode::InHead;
                    return;
                }
                TagId::Body => {
                    self.mode = InsertionMode::InBody;
                    return;
                }
                TagId::Frameset => {
                    self.mode = InsertionMode::InFrameset;
                    return;
                }
                TagId::Html => {
                    self.mode = if self.head.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                    return;
                }
                _ => {}
            }
            if last {
                self.mode = InsertionMode::InBody;
                return;
            }
        }
        self.mode = InsertionMode::InBody;
    }

    // ---- mode dispatch ----

    fn process_in_mode<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match self.mode {
            InsertionMode::Initial => self.handle_initial(token, sink),
            InsertionMode::BeforeHtml => self.handle_before_html(token, sink),
            InsertionMode::BeforeHead => self.handle_before_head(token, sink),
            InsertionMode::InHead => self.handle_in_head(token, sink),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript(token, sink),
            InsertionMode::AfterHead => self.handle_after_head(token, sink),
            InsertionMode::InBody => self.handle_in_body(token, sink),
            InsertionMode::Text => self.handle_text_mode(token, sink),
            InsertionMode::InTable => self.handle_in_table(token, sink),
            InsertionMode::InTableText => self.handle_in_table_text(token, sink),
            InsertionMode::InCaption => self.handle_in_caption(token, sink),
            InsertionMode::InColumnGroup => self.handle_in_column_group(token, sink),
            InsertionMode::InTableBody => self.handle_in_table_body(token, sink),
            InsertionMode::InRow => self.handle_in_row(token, sink),
            InsertionMode::InCell => self.handle_in_cell(token, sink),
            InsertionMode::InSelect => self.handle_in_select(token, sink),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table(token, sink),
            InsertionMode::InTemplate => self.handle_in_template(token, sink),
            InsertionMode::AfterBody => self.handle_after_body(token, sink),
            InsertionMode::InFrameset => self.handle_in_frameset(token, sink),
            InsertionMode::AfterFrameset => self.handle_after_frameset(token, sink),
            InsertionMode::AfterAfterBody => self.handle_after_after_body(token, sink),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset(token, sink),
        }
    }

    // ---- document prologue modes ----

    fn handle_initial<S: TreeSink<Handle = H>>(&mut self, token: Token, sink: &mut S) -> BuilderStep {
        match token {
            Token::Text { text } => {
                let rest = text.trim_start_matches(WS_CHARS);
                if rest.is_empty() {
                    return BuilderStep::Continue;
                }
                self.error(sink, ParseErrorCode::MisplacedDoctype);
                self.quirks = QuirksMode::Quirks;
                sink.set_quirks_mode(QuirksMode::Quirks);
                self.mode = InsertionMode::BeforeHtml;
                self.process_in_mode(
                    Token::Text {
                        text: rest.to_string(),
                    },
                    sink,
                )
            }
            Token::Comment { text } => {
                let comment = sink.create_comment(&text);
                sink.append(self.doc, comment);
                BuilderStep::Continue
            }
            Token::Doctype {
                name,
                public_id,
                system_id,
                force_quirks,
            } => {
                let mode = doctype_quirks(
                    name.as_deref(),
                    public_id.as_deref(),
                    system_id.as_deref(),
                    force_quirks,
                );
                if name.as_deref() != Some("html") || public_id.is_some() {
                    self.error(sink, ParseErrorCode::MisplacedDoctype);
                }
                sink.append_doctype(
                    name.as_deref().unwrap_or(""),
                    public_id.as_deref().unwrap_or(""),
                    system_id.as_deref().unwrap_or(""),
                );
                self.quirks = mode;
                sink.set_quirks_mode(mode);
                self.mode = InsertionMode::BeforeHtml;
                BuilderStep::Continue
            }
            Token::Eof => {
                self.quirks = QuirksMode::Quirks;
                sink.set_quirks_mode(QuirksMode::Quirks);
                self.mode = InsertionMode::BeforeHtml;
                self.process_in_mode(Token::Eof, sink)
            }
            other => {
                self.quirks = QuirksMode::Quirks;
                sink.set_quirks_mode(QuirksMode::Quirks);
                self.mode = InsertionMode::BeforeHtml;
                self.process_in_mode(other, sink)
            }
        }
    }

    fn handle_before_html<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Doctype { .. } => {
                self.error(sink, ParseErrorCode::MisplacedDoctype);
                BuilderStep::Continue
            }
            Token::Comment { text } => {
                let comment = sink.create_comment(&text);
                sink.append(self.doc, comment);
                BuilderStep::Continue
            }
            Token::Text { text } => {
                let rest = text.trim_start_matches(WS_CHARS);
                if rest.is_empty() {
                    return BuilderStep::Continue;
                }
                self.synthesize_html_root(sink);
                self.process_in_mode(
                    Token::Text {
                        text: rest.to_string(),
                    },
                    sink,
                )
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Html,
                ref attrs,
                ..
            } => {
                let el = sink.create_element(
                    Ns::Html,
                    name,
                    TagId::Html,
                    attrs.iter().map(ElemAttr::from_token_attr).collect(),
                );
                sink.append(self.doc, el);
                self.open.push(OpenEntry {
                    handle: el,
                    tag_id: TagId::Html,
                    ns: Ns::Html,
                    name: name.clone(),
                    html_ip: false,
                });
                self.mode = InsertionMode::BeforeHead;
                BuilderStep::Continue
            }
            Token::EndTag { tag_id, .. }
                if !matches!(
                    tag_id,
                    TagId::Head | TagId::Body | TagId::Html | TagId::Br
                ) =>
            {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            other => {
                self.synthesize_html_root(sink);
                self.process_in_mode(other, sink)
            }
        }
    }

    fn synthesize_html_root<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) {
        let el = sink.create_element(Ns::Html, "html", TagId::Html, Vec::new());
        sink.append(self.doc, el);
        self.open.push(OpenEntry {
            handle: el,
            tag_id: TagId::Html,
            ns: Ns::Html,
            name: "html".to_string(),
            html_ip: false,
        });
        self.mode = InsertionMode::BeforeHead;
    }

    fn handle_before_head<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { text } => {
                let rest = text.trim_start_matches(WS_CHARS);
                if rest.is_empty() {
                    return BuilderStep::Continue;
                }
                self.synthesize_head(sink);
                self.process_in_mode(
                    Token::Text {
                        text: rest.to_string(),
                    },
                    sink,
                )
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
                tag_id: TagId::Head,
                ref attrs,
                ..
            } => {
                let el = self.insert_html_element(sink, name, TagId::Head, attrs);
                let _ = el;
                self.head = self.open.current().cloned();
                self.mode = InsertionMode::InHead;
                BuilderStep::Continue
            }
            Token::EndTag { tag_id, .. }
                if !matches!(
                    tag_id,
                    TagId::Head | TagId::Body | TagId::Html | TagId::Br
                ) =>
            {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            other => {
                self.synthesize_head(sink);
                self.process_in_mode(other, sink)
            }
        }
    }

    fn synthesize_head<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) {
        self.insert_html_element(sink, "head", TagId::Head, &[]);
        self.head = self.open.current().cloned();
        self.mode = InsertionMode::InHead;
    }

    fn handle_in_head<S: TreeSink<Handle = H>>(&mut self, token: Token, sink: &mut S) -> BuilderStep {
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
                tag_id:
                    tag_id @ (TagId::Base | TagId::Basefont | TagId::Bgsound | TagId::Link | TagId::Meta),
                ref attrs,
                ..
            } => {
                self.insert_void_element(sink, name, tag_id, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Title,
                ref attrs,
                ..
            } => self.insert_raw_element(sink, name, TagId::Title, attrs, RawKind::Rcdata),
            Token::StartTag {
                ref name,
                tag_id: tag_id @ (TagId::Noframes | TagId::Style),
                ref attrs,
                ..
            } => self.insert_raw_element(sink, name, tag_id, attrs, RawKind::Rawtext),
            Token::StartTag {
                ref name,
                tag_id: TagId::Noscript,
                ref attrs,
                ..
            } => {
                if self.config.scripting_enabled {
                    self.insert_raw_element(sink, name, TagId::Noscript, attrs, RawKind::Rawtext)
                } else {
                    self.insert_html_element(sink, name, TagId::Noscript, attrs);
                    self.mode = InsertionMode::InHeadNoscript;
                    BuilderStep::Continue
                }
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Script,
                ref attrs,
                ..
            } => self.insert_raw_element(sink, name, TagId::Script, attrs, RawKind::ScriptData),
            Token::StartTag {
                ref name,
                tag_id: TagId::Template,
                ref attrs,
                ..
            } => {
                self.insert_html_element(sink, name, TagId::Template, attrs);
                self.fmt.push_marker();
                self.frameset_ok = false;
                self.mode = InsertionMode::InTemplate;
                self.template_modes.push(InsertionMode::InTemplate);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Template,
                ..
            } => self.handle_template_end(sink),
            Token::EndTag {
                tag_id: TagId::Head,
                ..
            } => {
                self.open.pop();
                self.mode = InsertionMode::AfterHead;
                BuilderStep::Continue
            }
            Token::EndTag { tag_id, .. }
                if !matches!(tag_id, TagId::Body | TagId::Html | TagId::Br) =>
            {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Head,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                BuilderStep::Continue
            }
            other => {
                self.open.pop();
                self.mode = InsertionMode::AfterHead;
                self.process_in_mode(other, sink)
            }
        }
    }

    fn handle_template_end<S: TreeSink<Handle = H>>(&mut self, sink: &mut S) -> BuilderStep {
        if self.open.topmost(TagId::Template).is_none() {
            self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
            return BuilderStep::Continue;
        }
        self.generate_implied_end_tags_thoroughly();
        if self
            .open
            .current()
            .is_none_or(|e| e.tag_id != TagId::Template)
        {
            self.error(sink, ParseErrorCode::MisnestedTag);
        }
        self.open.pop_until_tag(TagId::Template);
        self.fmt.clear_to_last_marker();
        self.template_modes.pop();
        self.reset_insertion_mode();
        BuilderStep::Continue
    }

    fn handle_in_head_noscript<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Doctype { .. } => {
                self.error(sink, ParseErrorCode::MisplacedDoctype);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Html,
                ..
            } => self.handle_in_body(token, sink),
            Token::EndTag {
                tag_id: TagId::Noscript,
                ..
            } => {
                self.open.pop();
                self.mode = InsertionMode::InHead;
                BuilderStep::Continue
            }
            Token::Comment { .. } => self.handle_in_head(token, sink),
            Token::Text { ref text } if is_all_ws(text) => self.handle_in_head(token, sink),
            Token::StartTag {
                tag_id:
                    TagId::Basefont
                        | TagId::Bgsound
                        | TagId::Link
                        | TagId::Meta
                        | TagId::Noframes
                        | TagId::Style,
                ..
            } => self.handle_in_head(token, sink),
            Token::StartTag {
                tag_id: TagId::Head | TagId::Noscript,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                BuilderStep::Continue
            }
            Token::EndTag { tag_id, .. } if tag_id != TagId::Br => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            other => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                self.open.pop();
                self.mode = InsertionMode::InHead;
                self.process_in_mode(other, sink)
            }
        }
    }

    fn handle_after_head<S: TreeSink<Handle = H>>(
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
                tag_id: TagId::Body,
                ref attrs,
                ..
            } => {
                self.insert_html_element(sink, name, TagId::Body, attrs);
                self.frameset_ok = false;
                self.mode = InsertionMode::InBody;
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Frameset,
                ref attrs,
                ..
            } => {
                self.insert_html_element(sink, name, TagId::Frameset, attrs);
                self.mode = InsertionMode::InFrameset;
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
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                let Some(head) = self.head.clone() else {
                    return BuilderStep::Continue;
                };
                self.open.push(head.clone());
                let step = self.handle_in_head(token, sink);
                if let Some(index) = self.open.index_of(head.handle) {
                    self.open.remove(index);
                }
                step
            }
            Token::EndTag {
                tag_id: TagId::Template,
                ..
            } => self.handle_template_end(sink),
            Token::EndTag { tag_id, .. }
                if !matches!(tag_id, TagId::Body | TagId::Html | TagId::Br) =>
            {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Head,
                ..
            } => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                BuilderStep::Continue
            }
            other => {
                self.insert_html_element(sink, "body", TagId::Body, &[]);
                self.mode = InsertionMode::InBody;
                self.process_in_mode(other, sink)
            }
        }
    }

    /// Insert the leading-whitespace part of a text run, then reprocess the
    /// remainder through the current mode's anything-else path.
    fn insert_ws_then_reprocess<S: TreeSink<Handle = H>>(
        &mut self,
        text: String,
        sink: &mut S,
    ) -> BuilderStep {
        let rest = text.trim_start_matches(WS_CHARS);
        let ws_len = text.len() - rest.len();
        if ws_len > 0 {
            let ws = &text[..ws_len];
            self.insert_text(sink, ws);
        }
        if rest.is_empty() {
            return BuilderStep::Continue;
        }
        let rest = rest.to_string();
        match self.mode {
            InsertionMode::InHead => {
                self.open.pop();
                self.mode = InsertionMode::AfterHead;
            }
            InsertionMode::AfterHead => {
                self.insert_html_element(sink, "body", TagId::Body, &[]);
                self.mode = InsertionMode::InBody;
            }
            InsertionMode::InColumnGroup => {
                if self
                    .open
                    .current()
                    .is_some_and(|e| e.tag_id == TagId::Colgroup)
                {
                    self.open.pop();
                    self.mode = InsertionMode::InTable;
                } else {
                    self.error(sink, ParseErrorCode::UnexpectedStartTag);
                    return BuilderStep::Continue;
                }
            }
            _ => {}
        }
        self.process_in_mode(Token::Text { text: rest }, sink)
    }

    // ---- text mode ----

    fn handle_text_mode<S: TreeSink<Handle = H>>(
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
                if !text.is_empty() {
                    self.insert_text(sink, &text);
                }
                BuilderStep::Continue
            }
            Token::Eof => {
                self.error(sink, ParseErrorCode::UnexpectedEof);
                self.open.pop();
                self.mode = self.orig_mode.take().unwrap_or(InsertionMode::InBody);
                self.process_in_mode(Token::Eof, sink)
            }
            Token::EndTag { .. } => {
                self.open.pop();
                self.mode = self.orig_mode.take().unwrap_or(InsertionMode::InBody);
                BuilderStep::Continue
            }
            _ => BuilderStep::Continue,
        }
    }

    // ---- trailer modes ----

    fn handle_after_body<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { ref text } if is_all_ws(text) => self.handle_in_body(token, sink),
            Token::Comment { text } => {
                // Comments after </body> attach to the html element.
                let comment = sink.create_comment(&text);
                if let Some(html) = self.open.get(0) {
                    let html = html.handle;
                    sink.append(html, comment);
                }
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
            Token::EndTag {
                tag_id: TagId::Html,
                ..
            } => {
                if self.fragment_ctx.is_some() {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.mode = InsertionMode::AfterAfterBody;
                BuilderStep::Continue
            }
            Token::Eof => {
                self.done = true;
                BuilderStep::Continue
            }
            other => {
                self.error(sink, ParseErrorCode::UnexpectedTokenAfterBody);
                self.mode = InsertionMode::InBody;
                self.process_in_mode(other, sink)
            }
        }
    }

    fn handle_after_after_body<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Comment { text } => {
                let comment = sink.create_comment(&text);
                sink.append(self.doc, comment);
                BuilderStep::Continue
            }
            Token::Doctype { .. } => self.handle_in_body(token, sink),
            Token::Text { ref text } if is_all_ws(text) => self.handle_in_body(token, sink),
            Token::StartTag {
                tag_id: TagId::Html,
                ..
            } => self.handle_in_body(token, sink),
            Token::Eof => {
                self.done = true;
                BuilderStep::Continue
            }
            other => {
                self.error(sink, ParseErrorCode::UnexpectedTokenAfterBody);
                self.mode = InsertionMode::InBody;
                self.process_in_mode(other, sink)
            }
        }
    }

    fn handle_in_frameset<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { text } => {
                let ws: String = text.chars().filter(|c| WS_CHARS.contains(c)).collect();
                if !ws.is_empty() {
                    self.insert_text(sink, &ws);
                }
                if ws.len() != text.len() {
                    self.error(sink, ParseErrorCode::UnexpectedStartTag);
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
                ..
            } => self.handle_in_body(token, sink),
            Token::StartTag {
                ref name,
                tag_id: TagId::Frameset,
                ref attrs,
                ..
            } => {
                self.insert_html_element(sink, name, TagId::Frameset, attrs);
                BuilderStep::Continue
            }
            Token::EndTag {
                tag_id: TagId::Frameset,
                ..
            } => {
                if self.open.len() == 1 {
                    self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                    return BuilderStep::Continue;
                }
                self.open.pop();
                if self.fragment_ctx.is_none()
                    && self
                        .open
                        .current()
                        .is_some_and(|e| e.tag_id != TagId::Frameset)
                {
                    self.mode = InsertionMode::AfterFrameset;
                }
                BuilderStep::Continue
            }
            Token::StartTag {
                ref name,
                tag_id: TagId::Frame,
                ref attrs,
                ..
            } => {
                self.insert_void_element(sink, name, TagId::Frame, attrs);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Noframes,
                ..
            } => self.handle_in_head(token, sink),
            Token::Eof => {
                if self.open.len() != 1 {
                    self.error(sink, ParseErrorCode::UnexpectedEof);
                }
                self.done = true;
                BuilderStep::Continue
            }
            _ => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                BuilderStep::Continue
            }
        }
    }

    fn handle_after_frameset<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { text } => {
                let ws: String = text.chars().filter(|c| WS_CHARS.contains(c)).collect();
                if !ws.is_empty() {
                    self.insert_text(sink, &ws);
                }
                BuilderStep::Continue
            }
            Token::Comment { text } => {
                self.insert_comment(sink, &text);
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Html,
                ..
            } => self.handle_in_body(token, sink),
            Token::EndTag {
                tag_id: TagId::Html,
                ..
            } => {
                self.mode = InsertionMode::AfterAfterFrameset;
                BuilderStep::Continue
            }
            Token::StartTag {
                tag_id: TagId::Noframes,
                ..
            } => self.handle_in_head(token, sink),
            Token::Eof => {
                self.done = true;
                BuilderStep::Continue
            }
            _ => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                BuilderStep::Continue
            }
        }
    }

    fn handle_after_after_frameset<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Comment { text } => {
                let comment = sink.create_comment(&text);
                sink.append(self.doc, comment);
                BuilderStep::Continue
            }
            Token::Doctype { .. } | Token::StartTag {
                tag_id: TagId::Html,
                ..
            } => self.handle_in_body(token, sink),
            Token::Text { ref text } if is_all_ws(text) => self.handle_in_body(token, sink),
            Token::StartTag {
                tag_id: TagId::Noframes,
                ..
            } => self.handle_in_head(token, sink),
            Token::Eof => {
                self.done = true;
                BuilderStep::Continue
            }
            _ => {
                self.error(sink, ParseErrorCode::UnexpectedStartTag);
                BuilderStep::Continue
            }
        }
    }

    // ---- templates ----

    fn handle_in_template<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        sink: &mut S,
    ) -> BuilderStep {
        match token {
            Token::Text { .. } | Token::Comment { .. } | Token::Doctype { .. } => {
                self.handle_in_body(token, sink)
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
            } => self.handle_in_head(token, sink),
            Token::EndTag {
                tag_id: TagId::Template,
                ..
            } => self.handle_template_end(sink),
            Token::StartTag {
                tag_id: TagId::Caption | TagId::Colgroup | TagId::Tbody | TagId::Tfoot | TagId::Thead,
                ..
            } => self.retarget_template(token, InsertionMode::InTable, sink),
            Token::StartTag {
                tag_id: TagId::Col, ..
            } => self.retarget_template(token, InsertionMode::InColumnGroup, sink),
            Token::StartTag {
                tag_id: TagId::Tr, ..
            } => self.retarget_template(token, InsertionMode::InTableBody, sink),
            Token::StartTag {
                tag_id: TagId::Td | TagId::Th,
                ..
            } => self.retarget_template(token, InsertionMode::InRow, sink),
            Token::StartTag { .. } => self.retarget_template(token, InsertionMode::InBody, sink),
            Token::EndTag { .. } => {
                self.error(sink, ParseErrorCode::EndTagWithoutMatchingStartTag);
                BuilderStep::Continue
            }
            Token::Eof => {
                if self.open.topmost(TagId::Template).is_none() {
                    self.done = true;
                    return BuilderStep::Continue;
                }
                self.error(sink, ParseErrorCode::UnexpectedEof);
                self.open.pop_until_tag(TagId::Template);
                self.fmt.clear_to_last_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
                self.process_in_mode(Token::Eof, sink)
            }
        }
    }

    fn retarget_template<S: TreeSink<Handle = H>>(
        &mut self,
        token: Token,
        mode: InsertionMode,
        sink: &mut S,
    ) -> BuilderStep {
        self.template_modes.pop();
        self.template_modes.push(mode);
        self.mode = mode;
        self.process_in_mode(token, sink)
    }
}

pub(crate) const WS_CHARS: [char; 4] = ['\t', '\n', '\x0C', ' '];

pub(crate) fn is_all_ws(text: &str) -> bool {
    text.chars().all(|c| WS_CHARS.contains(&c))
}

/// Quirks-mode resolution from the doctype, using the common public-id
/// prefix set (abbreviated relative to the full legacy list).
fn doctype_quirks(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> QuirksMode {
    if force_quirks || name != Some("html") {
        return QuirksMode::Quirks;
    }
    let public = public_id.unwrap_or("").to_ascii_lowercase();
    let system = system_id.unwrap_or("").to_ascii_lowercase();
    const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
        "+//silmaril//dtd html pro v0r11 19970101//",
        "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
        "-//as//dtd html 3.0 aswedit + extensions//",
        "-//ietf//dtd html 2.0//",
        "-//ietf//dtd html//",
        "-//metrius//dtd metrius presentational//",
        "-//netscape comm. corp.//dtd html//",
        "-//sun microsystems corp.//dtd hotjava html//",
        "-//w3c//dtd html 3 1995-03-24//",
        "-//w3c//dtd html 3.2//",
        "-//w3c//dtd html 3.2 final//",
        "-//w3c//dtd html 4.0 frameset//",
        "-//w3c//dtd html 4.0 transitional//",
        "-//w3c//dtd w3 html//",
        "-//w3o//dtd w3 html 3.0//",
        "-//webtechs//dtd mozilla html 2.0//",
        "-//webtechs//dtd mozilla html//",
    ];
    if public == "-//w3o//dtd w3 html strict 3.0//en//"
        || public == "-/w3c/dtd html 4.0 transitional/en"
        || public == "html"
        || system == "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"
        || QUIRKY_PUBLIC_PREFIXES.iter().any(|p| public.starts_with(p))
    {
        return QuirksMode::Quirks;
    }
    if system_id.is_none()
        && (public.starts_with("-//w3c//dtd html 4.01 frameset//")
            || public.starts_with("-//w3c//dtd html 4.01 transitional//"))
    {
        return QuirksMode::Quirks;
    }
    if public.starts_with("-//w3c//dtd xhtml 1.0 frameset//")
        || public.starts_with("-//w3c//dtd xhtml 1.0 transitional//")
        || (system_id.is_some()
            && (public.starts_with("-//w3c//dtd html 4.01 frameset//")
                || public.starts_with("-//w3c//dtd html 4.01 transitional//")))
    {
        return QuirksMode::LimitedQuirks;
    }
    QuirksMode::NoQuirks
}
