//! HTML5 tokenizer.
//!
//! Streaming tokenizer over decoded text: it consumes buffered input and
//! emits tokens in batches. The tokenizer is an explicit state machine and is
//! resumable at chunk boundaries.
//!
//! Invariants:
//! - Chunk-equivalence: feeding input in one chunk or many chunks yields the
//!   same token sequence for equivalent text input.
//! - Malformed input never aborts tokenization. NUL becomes U+FFFD with a
//!   reported error; unterminated constructs are flushed by the EOF rules.
//! - Raw-text mode switches (`<script>`, `<style>`, `<title>`, ...) are the
//!   tree constructor's call, delivered through `set_raw_mode`; the tokenizer
//!   never switches on tag identity by itself.

use memchr::{memchr, memchr2, memchr3};

use crate::html5::shared::{Attribute, ParseError, ParseErrorCode, Token};
use crate::tags::TagId;
use charref::{step_char_ref, CharRefStep};
use states::State;

mod charref;
mod states;

#[cfg(test)]
mod tests;

/// Configuration for the tokenizer.
#[derive(Clone, Debug)]
pub struct TokenizerConfig {
    /// Emit an `Eof` token when the stream ends.
    pub emit_eof: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { emit_eof: true }
    }
}

/// Streaming tokenizer result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenizeResult {
    /// Progress was made and at least one token may be available.
    Progress,
    /// More input is required to continue.
    NeedMoreInput,
    /// EOF has been emitted and no further input will be consumed.
    EmittedEof,
}

/// Raw-text tokenization modes selected by the tree constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawKind {
    Rcdata,
    Rawtext,
    ScriptData,
    Plaintext,
}

/// Minimal tokenizer instrumentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenizerStats {
    pub steps: u64,
    pub state_transitions: u64,
    pub tokens_emitted: u64,
    pub budget_exhaustions: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Progress,
    NeedMoreInput,
}

const MAX_STEPS_PER_PUMP: usize = 16_384;

const WS: [char; 4] = ['\t', '\n', '\x0C', ' '];

fn is_ws(c: char) -> bool {
    WS.contains(&c)
}

#[derive(Debug, Default)]
struct TagBuilder {
    is_end: bool,
    name: String,
    attrs: Vec<Attribute>,
    self_closing: bool,
    attr_name: String,
    attr_value: String,
    attr_open: bool,
}

impl TagBuilder {
    fn reset(&mut self, is_end: bool) {
        self.is_end = is_end;
        self.name.clear();
        self.attrs.clear();
        self.self_closing = false;
        self.attr_name.clear();
        self.attr_value.clear();
        self.attr_open = false;
    }

    fn start_attr(&mut self) {
        self.attr_name.clear();
        self.attr_value.clear();
        self.attr_open = true;
    }
}

#[derive(Debug, Default)]
struct DoctypeBuilder {
    name: Option<String>,
    public_id: Option<String>,
    system_id: Option<String>,
    force_quirks: bool,
}

/// HTML5 tokenizer.
pub struct Tokenizer {
    config: TokenizerConfig,
    state: State,
    buf: String,
    cursor: usize,
    eos: bool,
    eof_emitted: bool,
    pending_cr: bool,
    cdata_allowed: bool,
    paused: bool,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
    text_buf: String,
    tag: TagBuilder,
    comment_buf: String,
    doctype: DoctypeBuilder,
    temp_buf: String,
    last_start_tag: Option<String>,
    stats: TokenizerStats,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self {
            config,
            state: State::Data,
            buf: String::new(),
            cursor: 0,
            eos: false,
            eof_emitted: false,
            pending_cr: false,
            cdata_allowed: false,
            paused: false,
            tokens: Vec::new(),
            errors: Vec::new(),
            text_buf: String::new(),
            tag: TagBuilder::default(),
            comment_buf: String::new(),
            doctype: DoctypeBuilder::default(),
            temp_buf: String::new(),
            last_start_tag: None,
            stats: TokenizerStats::default(),
        }
    }

    /// Append a chunk of decoded text and run one pump.
    ///
    /// The tokenizer pauses after emitting each start tag so the driver can
    /// feed the tree constructor and apply a raw-text mode switch before the
    /// element's content is tokenized. Callers loop: drain tokens, then call
    /// [`Tokenizer::pump`] again until `NeedMoreInput` (or `EmittedEof`).
    ///
    /// Newline normalization (CRLF and lone CR to LF) happens here so that a
    /// CRLF pair split across chunks still collapses to one LF.
    pub fn push_str(&mut self, chunk: &str) -> TokenizeResult {
        assert!(
            !self.eos,
            "Tokenizer::push_str called after finish(); this violates the end-of-stream contract"
        );
        self.append_normalized(chunk);
        self.pump()
    }

    /// Mark end-of-stream and run one pump of the per-state EOF rules.
    ///
    /// As with `push_str`, the tokenizer may pause on a start tag before
    /// reaching EOF; callers keep pumping until `EmittedEof`.
    pub fn finish(&mut self) -> TokenizeResult {
        self.eos = true;
        if self.eof_emitted {
            return TokenizeResult::EmittedEof;
        }
        self.pump()
    }

    /// Drain the tokens produced so far.
    pub fn drain_tokens(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.tokens)
    }

    /// Drain the parse errors recorded so far.
    pub fn drain_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Return a copy of current instrumentation counters.
    pub fn stats(&self) -> TokenizerStats {
        self.stats
    }

    /// Tree-constructor directive: switch to a raw-text mode for the content
    /// of the element whose start tag was just processed.
    pub fn set_raw_mode(&mut self, kind: RawKind, tag_name: &str) {
        self.last_start_tag = Some(tag_name.to_string());
        let next = match kind {
            RawKind::Rcdata => State::Rcdata,
            RawKind::Rawtext => State::Rawtext,
            RawKind::ScriptData => State::ScriptData,
            RawKind::Plaintext => State::Plaintext,
        };
        self.transition_to(next);
    }

    /// Tree-constructor directive: whether `<![CDATA[` opens a CDATA section
    /// (true only while the adjusted current node is foreign).
    pub fn set_cdata_allowed(&mut self, allowed: bool) {
        self.cdata_allowed = allowed;
    }

    fn append_normalized(&mut self, chunk: &str) {
        let mut rest = chunk;
        if self.pending_cr {
            // The CR was already pushed as LF; drop the LF half of a split CRLF.
            self.pending_cr = false;
            if let Some(stripped) = rest.strip_prefix('\n') {
                rest = stripped;
            }
        }
        if !rest.contains('\r') {
            self.buf.push_str(rest);
            return;
        }
        let mut prev_cr = false;
        for ch in rest.chars() {
            match ch {
                '\r' => {
                    self.buf.push('\n');
                    prev_cr = true;
                }
                '\n' if prev_cr => {
                    prev_cr = false;
                }
                c => {
                    self.buf.push(c);
                    prev_cr = false;
                }
            }
        }
        self.pending_cr = rest.ends_with('\r');
    }

    /// Resume the state machine: run until a pause (start tag emitted), a
    /// chunk boundary, the step budget, or EOF.
    pub fn pump(&mut self) -> TokenizeResult {
        self.paused = false;
        let initial_cursor = self.cursor;
        let initial_tokens = self.tokens.len();
        let initial_transitions = self.stats.state_transitions;
        let mut remaining_budget = MAX_STEPS_PER_PUMP;

        while remaining_budget > 0 && !self.eof_emitted && !self.paused {
            remaining_budget -= 1;
            self.stats.steps = self.stats.steps.saturating_add(1);
            match self.step() {
                Step::Progress => {}
                Step::NeedMoreInput => break,
            }
        }

        if remaining_budget == 0 {
            self.stats.budget_exhaustions = self.stats.budget_exhaustions.saturating_add(1);
            let no_observable_progress = self.cursor == initial_cursor
                && self.tokens.len() == initial_tokens
                && self.stats.state_transitions == initial_transitions;
            assert!(
                !no_observable_progress,
                "tokenizer step budget exhausted without observable progress: state={:?} cursor={}",
                self.state, self.cursor
            );
        }

        if self.eof_emitted {
            return TokenizeResult::EmittedEof;
        }
        let observable_progress = self.cursor != initial_cursor
            || self.tokens.len() != initial_tokens
            || self.stats.state_transitions != initial_transitions;
        if observable_progress {
            TokenizeResult::Progress
        } else {
            TokenizeResult::NeedMoreInput
        }
    }

    fn transition_to(&mut self, next: State) {
        if self.state == next {
            return;
        }
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "html5.tokenizer",
            "state {:?} -> {:?} @{}",
            self.state,
            next,
            self.cursor
        );
        self.state = next;
        self.stats.state_transitions = self.stats.state_transitions.saturating_add(1);
    }

    // ---- cursor helpers ----

    fn rest(&self) -> &str {
        &self.buf[self.cursor..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.cursor += ch.len_utf8();
        Some(ch)
    }

    /// Case-sensitive prefix check at the cursor. `None` means the buffer
    /// ends before a decision can be made.
    fn match_prefix(&self, prefix: &str) -> Option<bool> {
        let rest = self.rest();
        if rest.len() >= prefix.len() {
            return Some(&rest.as_bytes()[..prefix.len()] == prefix.as_bytes());
        }
        if prefix.as_bytes().starts_with(rest.as_bytes()) && !self.eos {
            return None;
        }
        Some(false)
    }

    /// ASCII-case-insensitive prefix check at the cursor.
    fn match_prefix_ci(&self, prefix: &str) -> Option<bool> {
        let rest = self.rest();
        if rest.len() >= prefix.len() {
            return Some(rest.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes()));
        }
        if prefix
            .as_bytes()
            .iter()
            .zip(rest.as_bytes())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
            && !self.eos
        {
            return None;
        }
        Some(false)
    }

    fn error(&mut self, code: ParseErrorCode) {
        self.errors.push(ParseError::new(code, self.cursor));
    }

    // ---- emission ----

    fn flush_text(&mut self) {
        if self.text_buf.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text_buf);
        self.tokens.push(Token::Text { text });
        self.stats.tokens_emitted = self.stats.tokens_emitted.saturating_add(1);
    }

    fn emit(&mut self, token: Token) {
        self.flush_text();
        self.tokens.push(token);
        self.stats.tokens_emitted = self.stats.tokens_emitted.saturating_add(1);
    }

    fn emit_eof(&mut self) {
        self.flush_text();
        if self.config.emit_eof {
            self.tokens.push(Token::Eof);
            self.stats.tokens_emitted = self.stats.tokens_emitted.saturating_add(1);
        }
        self.eof_emitted = true;
    }

    fn commit_attr(&mut self) {
        if !self.tag.attr_open {
            return;
        }
        self.tag.attr_open = false;
        let name = std::mem::take(&mut self.tag.attr_name);
        let value = std::mem::take(&mut self.tag.attr_value);
        if self.tag.attrs.iter().any(|a| a.name == name) {
            self.error(ParseErrorCode::DuplicateAttribute);
            return;
        }
        self.tag.attrs.push(Attribute { name, value });
    }

    fn emit_current_tag(&mut self) {
        self.commit_attr();
        let name = std::mem::take(&mut self.tag.name);
        let tag_id = TagId::from_name(&name);
        if self.tag.is_end {
            if !self.tag.attrs.is_empty() {
                self.error(ParseErrorCode::EndTagWithAttributes);
            }
            if self.tag.self_closing {
                self.error(ParseErrorCode::EndTagWithTrailingSolidus);
            }
            self.emit(Token::EndTag { name, tag_id });
        } else {
            self.last_start_tag = Some(name.clone());
            let attrs = std::mem::take(&mut self.tag.attrs);
            let self_closing = self.tag.self_closing;
            self.emit(Token::StartTag {
                name,
                tag_id,
                attrs,
                self_closing,
            });
            // Pause so the driver can apply a tree-constructor raw-text
            // directive before this element's content is tokenized.
            self.paused = true;
        }
    }

    fn emit_current_comment(&mut self) {
        let text = std::mem::take(&mut self.comment_buf);
        self.emit(Token::Comment { text });
    }

    fn emit_current_doctype(&mut self) {
        let doctype = std::mem::take(&mut self.doctype);
        self.emit(Token::Doctype {
            name: doctype.name,
            public_id: doctype.public_id,
            system_id: doctype.system_id,
            force_quirks: doctype.force_quirks,
        });
    }

    /// `</` + candidate name flushed back to text when a raw-text end tag
    /// turns out not to be the appropriate one.
    fn flush_raw_end_tag_as_text(&mut self) {
        self.text_buf.push_str("</");
        let temp = std::mem::take(&mut self.temp_buf);
        self.text_buf.push_str(&temp);
        self.tag.reset(false);
    }

    fn is_appropriate_end_tag(&self) -> bool {
        match &self.last_start_tag {
            Some(last) => *last == self.tag.name,
            None => false,
        }
    }

    // ---- character-reference entry ----

    /// Decode a reference at the cursor into `out`; cursor is at `&`.
    fn consume_char_ref_into_text(&mut self) -> Step {
        let mut out = std::mem::take(&mut self.text_buf);
        let step = step_char_ref(
            &self.buf[self.cursor..],
            self.eos,
            false,
            self.cursor,
            &mut out,
            &mut self.errors,
        );
        self.text_buf = out;
        match step {
            CharRefStep::NeedMoreInput => Step::NeedMoreInput,
            CharRefStep::Consumed(n) => {
                self.cursor += n;
                Step::Progress
            }
        }
    }

    fn consume_char_ref_into_attr(&mut self) -> Step {
        let mut out = std::mem::take(&mut self.tag.attr_value);
        let step = step_char_ref(
            &self.buf[self.cursor..],
            self.eos,
            true,
            self.cursor,
            &mut out,
            &mut self.errors,
        );
        self.tag.attr_value = out;
        match step {
            CharRefStep::NeedMoreInput => Step::NeedMoreInput,
            CharRefStep::Consumed(n) => {
                self.cursor += n;
                Step::Progress
            }
        }
    }

    // ---- the state machine ----

    fn step(&mut self) -> Step {
        match self.state {
            State::Data => self.step_data(),
            State::Rcdata => self.step_rcdata(),
            State::Rawtext => self.step_rawtext(),
            State::ScriptData => self.step_script_data(),
            State::Plaintext => self.step_plaintext(),
            State::TagOpen => self.step_tag_open(),
            State::EndTagOpen => self.step_end_tag_open(),
            State::TagName => self.step_tag_name(),
            State::RcdataLessThan => self.step_raw_less_than(State::Rcdata, State::RcdataEndTagOpen),
            State::RcdataEndTagOpen => {
                self.step_raw_end_tag_open(State::Rcdata, State::RcdataEndTagName)
            }
            State::RcdataEndTagName => self.step_raw_end_tag_name(State::Rcdata),
            State::RawtextLessThan => {
                self.step_raw_less_than(State::Rawtext, State::RawtextEndTagOpen)
            }
            State::RawtextEndTagOpen => {
                self.step_raw_end_tag_open(State::Rawtext, State::RawtextEndTagName)
            }
            State::RawtextEndTagName => self.step_raw_end_tag_name(State::Rawtext),
            State::ScriptDataLessThan => self.step_script_data_less_than(),
            State::ScriptDataEndTagOpen => {
                self.step_raw_end_tag_open(State::ScriptData, State::ScriptDataEndTagName)
            }
            State::ScriptDataEndTagName => self.step_raw_end_tag_name(State::ScriptData),
            State::ScriptDataEscapeStart => self.step_script_escape_start(),
            State::ScriptDataEscapeStartDash => self.step_script_escape_start_dash(),
            State::ScriptDataEscaped => self.step_script_escaped(),
            State::ScriptDataEscapedDash => self.step_script_escaped_dash(),
            State::ScriptDataEscapedDashDash => self.step_script_escaped_dash_dash(),
            State::ScriptDataEscapedLessThan => self.step_script_escaped_less_than(),
            State::ScriptDataEscapedEndTagOpen => {
                self.step_raw_end_tag_open(State::ScriptDataEscaped, State::ScriptDataEscapedEndTagName)
            }
            State::ScriptDataEscapedEndTagName => {
                self.step_raw_end_tag_name(State::ScriptDataEscaped)
            }
            State::ScriptDataDoubleEscapeStart => {
                self.step_script_double_escape_toggle(State::ScriptDataDoubleEscaped, State::ScriptDataEscaped)
            }
            State::ScriptDataDoubleEscaped => self.step_script_double_escaped(),
            State::ScriptDataDoubleEscapedDash => self.step_script_double_escaped_dash(),
            State::ScriptDataDoubleEscapedDashDash => self.step_script_double_escaped_dash_dash(),
            State::ScriptDataDoubleEscapedLessThan => self.step_script_double_escaped_less_than(),
            State::ScriptDataDoubleEscapeEnd => {
                self.step_script_double_escape_toggle(State::ScriptDataEscaped, State::ScriptDataDoubleEscaped)
            }
            State::BeforeAttributeName => self.step_before_attribute_name(),
            State::AttributeName => self.step_attribute_name(),
            State::AfterAttributeName => self.step_after_attribute_name(),
            State::BeforeAttributeValue => self.step_before_attribute_value(),
            State::AttributeValueDoubleQuoted => self.step_attribute_value_quoted('"'),
            State::AttributeValueSingleQuoted => self.step_attribute_value_quoted('\''),
            State::AttributeValueUnquoted => self.step_attribute_value_unquoted(),
            State::AfterAttributeValueQuoted => self.step_after_attribute_value_quoted(),
            State::SelfClosingStartTag => self.step_self_closing_start_tag(),
            State::BogusComment => self.step_bogus_comment(),
            State::MarkupDeclarationOpen => self.step_markup_declaration_open(),
            State::CommentStart => self.step_comment_start(),
            State::CommentStartDash => self.step_comment_start_dash(),
            State::Comment => self.step_comment(),
            State::CommentLessThan => self.step_comment_less_than(),
            State::CommentLessThanBang => self.step_comment_less_than_bang(),
            State::CommentLessThanBangDash => self.step_comment_less_than_bang_dash(),
            State::CommentLessThanBangDashDash => self.step_comment_less_than_bang_dash_dash(),
            State::CommentEndDash => self.step_comment_end_dash(),
            State::CommentEnd => self.step_comment_end(),
            State::CommentEndBang => self.step_comment_end_bang(),
            State::Doctype => self.step_doctype(),
            State::BeforeDoctypeName => self.step_before_doctype_name(),
            State::DoctypeName => self.step_doctype_name(),
            State::AfterDoctypeName => self.step_after_doctype_name(),
            State::AfterDoctypePublicKeyword => self.step_after_doctype_public_keyword(),
            State::BeforeDoctypePublicIdentifier => self.step_before_doctype_public_identifier(),
            State::DoctypePublicIdentifierDoubleQuoted => self.step_doctype_public_identifier('"'),
            State::DoctypePublicIdentifierSingleQuoted => self.step_doctype_public_identifier('\''),
            State::AfterDoctypePublicIdentifier => self.step_after_doctype_public_identifier(),
            State::BetweenDoctypePublicAndSystemIdentifiers => {
                self.step_between_doctype_public_and_system()
            }
            State::AfterDoctypeSystemKeyword => self.step_after_doctype_system_keyword(),
            State::BeforeDoctypeSystemIdentifier => self.step_before_doctype_system_identifier(),
            State::DoctypeSystemIdentifierDoubleQuoted => self.step_doctype_system_identifier('"'),
            State::DoctypeSystemIdentifierSingleQuoted => self.step_doctype_system_identifier('\''),
            State::AfterDoctypeSystemIdentifier => self.step_after_doctype_system_identifier(),
            State::BogusDoctype => self.step_bogus_doctype(),
            State::CdataSection => self.step_cdata_section(),
            State::CdataSectionBracket => self.step_cdata_section_bracket(),
            State::CdataSectionEnd => self.step_cdata_section_end(),
        }
    }

    fn step_data(&mut self) -> Step {
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            if self.eos {
                self.emit_eof();
                return Step::Progress;
            }
            return Step::NeedMoreInput;
        }
        match rest.as_bytes()[0] {
            b'<' => {
                self.cursor += 1;
                self.transition_to(State::TagOpen);
                Step::Progress
            }
            b'&' => self.consume_char_ref_into_text(),
            0 => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                Step::Progress
            }
            _ => {
                let run = memchr3(b'<', b'&', 0, rest.as_bytes()).unwrap_or(rest.len());
                self.text_buf.push_str(&rest[..run]);
                self.cursor += run;
                Step::Progress
            }
        }
    }

    fn step_rcdata(&mut self) -> Step {
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            if self.eos {
                self.emit_eof();
                return Step::Progress;
            }
            return Step::NeedMoreInput;
        }
        match rest.as_bytes()[0] {
            b'<' => {
                self.cursor += 1;
                self.transition_to(State::RcdataLessThan);
                Step::Progress
            }
            b'&' => self.consume_char_ref_into_text(),
            0 => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                Step::Progress
            }
            _ => {
                let run = memchr3(b'<', b'&', 0, rest.as_bytes()).unwrap_or(rest.len());
                self.text_buf.push_str(&rest[..run]);
                self.cursor += run;
                Step::Progress
            }
        }
    }

    fn step_rawtext(&mut self) -> Step {
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            if self.eos {
                self.emit_eof();
                return Step::Progress;
            }
            return Step::NeedMoreInput;
        }
        match rest.as_bytes()[0] {
            b'<' => {
                self.cursor += 1;
                self.transition_to(State::RawtextLessThan);
                Step::Progress
            }
            0 => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                Step::Progress
            }
            _ => {
                let run = memchr2(b'<', 0, rest.as_bytes()).unwrap_or(rest.len());
                self.text_buf.push_str(&rest[..run]);
                self.cursor += run;
                Step::Progress
            }
        }
    }

    fn step_script_data(&mut self) -> Step {
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            if self.eos {
                self.emit_eof();
                return Step::Progress;
            }
            return Step::NeedMoreInput;
        }
        match rest.as_bytes()[0] {
            b'<' => {
                self.cursor += 1;
                self.transition_to(State::ScriptDataLessThan);
                Step::Progress
            }
            0 => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                Step::Progress
            }
            _ => {
                let run = memchr2(b'<', 0, rest.as_bytes()).unwrap_or(rest.len());
                self.text_buf.push_str(&rest[..run]);
                self.cursor += run;
                Step::Progress
            }
        }
    }

    fn step_plaintext(&mut self) -> Step {
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            if self.eos {
                self.emit_eof();
                return Step::Progress;
            }
            return Step::NeedMoreInput;
        }
        match rest.as_bytes()[0] {
            0 => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                Step::Progress
            }
            _ => {
                let run = memchr(0, rest.as_bytes()).unwrap_or(rest.len());
                self.text_buf.push_str(&rest[..run]);
                self.cursor += run;
                Step::Progress
            }
        }
    }

    fn step_tag_open(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofBeforeTagName);
            self.text_buf.push('<');
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '!' => {
                self.cursor += 1;
                self.transition_to(State::MarkupDeclarationOpen);
                Step::Progress
            }
            '/' => {
                self.cursor += 1;
                self.transition_to(State::EndTagOpen);
                Step::Progress
            }
            c if c.is_ascii_alphabetic() => {
                self.tag.reset(false);
                self.transition_to(State::TagName);
                Step::Progress
            }
            '?' => {
                self.error(ParseErrorCode::UnexpectedQuestionMarkInsteadOfTagName);
                self.comment_buf.clear();
                self.transition_to(State::BogusComment);
                Step::Progress
            }
            _ => {
                self.error(ParseErrorCode::InvalidFirstCharacterOfTagName);
                self.text_buf.push('<');
                self.transition_to(State::Data);
                Step::Progress
            }
        }
    }

    fn step_end_tag_open(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofBeforeTagName);
            self.text_buf.push_str("</");
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if c.is_ascii_alphabetic() => {
                self.tag.reset(true);
                self.transition_to(State::TagName);
                Step::Progress
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingEndTagName);
                self.transition_to(State::Data);
                Step::Progress
            }
            _ => {
                self.error(ParseErrorCode::InvalidFirstCharacterOfTagName);
                self.comment_buf.clear();
                self.transition_to(State::BogusComment);
                Step::Progress
            }
        }
    }

    fn step_tag_name(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInTag);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
                self.transition_to(State::BeforeAttributeName);
            }
            '/' => {
                self.cursor += 1;
                self.transition_to(State::SelfClosingStartTag);
            }
            '>' => {
                self.cursor += 1;
                self.emit_current_tag();
                self.transition_to(State::Data);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.tag.name.push('\u{FFFD}');
            }
            c => {
                self.cursor += c.len_utf8();
                self.tag.name.push(c.to_ascii_lowercase());
            }
        }
        Step::Progress
    }

    // ---- raw-text (RCDATA / RAWTEXT / script data) end-tag scanning ----

    fn step_raw_less_than(&mut self, data_state: State, end_tag_open: State) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.text_buf.push('<');
            self.transition_to(data_state);
            return Step::Progress;
        };
        if c == '/' {
            self.cursor += 1;
            self.temp_buf.clear();
            self.transition_to(end_tag_open);
        } else {
            self.text_buf.push('<');
            self.transition_to(data_state);
        }
        Step::Progress
    }

    fn step_raw_end_tag_open(&mut self, data_state: State, end_tag_name: State) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.text_buf.push_str("</");
            self.transition_to(data_state);
            return Step::Progress;
        };
        if c.is_ascii_alphabetic() {
            self.tag.reset(true);
            self.transition_to(end_tag_name);
        } else {
            self.text_buf.push_str("</");
            self.transition_to(data_state);
        }
        Step::Progress
    }

    fn step_raw_end_tag_name(&mut self, data_state: State) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.flush_raw_end_tag_as_text();
            self.transition_to(data_state);
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                if self.is_appropriate_end_tag() {
                    self.cursor += c.len_utf8();
                    self.transition_to(State::BeforeAttributeName);
                } else {
                    self.flush_raw_end_tag_as_text();
                    self.transition_to(data_state);
                }
            }
            '/' => {
                if self.is_appropriate_end_tag() {
                    self.cursor += 1;
                    self.transition_to(State::SelfClosingStartTag);
                } else {
                    self.flush_raw_end_tag_as_text();
                    self.transition_to(data_state);
                }
            }
            '>' => {
                if self.is_appropriate_end_tag() {
                    self.cursor += 1;
                    self.emit_current_tag();
                    self.transition_to(State::Data);
                } else {
                    self.flush_raw_end_tag_as_text();
                    self.transition_to(data_state);
                }
            }
            c if c.is_ascii_alphabetic() => {
                self.cursor += 1;
                self.tag.name.push(c.to_ascii_lowercase());
                self.temp_buf.push(c);
            }
            _ => {
                self.flush_raw_end_tag_as_text();
                self.transition_to(data_state);
            }
        }
        Step::Progress
    }

    // ---- script data escape states ----

    fn step_script_data_less_than(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.text_buf.push('<');
            self.transition_to(State::ScriptData);
            return Step::Progress;
        };
        match c {
            '/' => {
                self.cursor += 1;
                self.temp_buf.clear();
                self.transition_to(State::ScriptDataEndTagOpen);
            }
            '!' => {
                self.cursor += 1;
                self.text_buf.push_str("<!");
                self.transition_to(State::ScriptDataEscapeStart);
            }
            _ => {
                self.text_buf.push('<');
                self.transition_to(State::ScriptData);
            }
        }
        Step::Progress
    }

    fn step_script_escape_start(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::ScriptData);
            return Step::Progress;
        };
        if c == '-' {
            self.cursor += 1;
            self.text_buf.push('-');
            self.transition_to(State::ScriptDataEscapeStartDash);
        } else {
            self.transition_to(State::ScriptData);
        }
        Step::Progress
    }

    fn step_script_escape_start_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::ScriptData);
            return Step::Progress;
        };
        if c == '-' {
            self.cursor += 1;
            self.text_buf.push('-');
            self.transition_to(State::ScriptDataEscapedDashDash);
        } else {
            self.transition_to(State::ScriptData);
        }
        Step::Progress
    }

    fn step_script_escaped(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInScriptHtmlCommentLikeText);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.text_buf.push('-');
                self.transition_to(State::ScriptDataEscapedDash);
            }
            '<' => {
                self.cursor += 1;
                self.transition_to(State::ScriptDataEscapedLessThan);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
            }
            c => {
                self.cursor += c.len_utf8();
                self.text_buf.push(c);
            }
        }
        Step::Progress
    }

    fn step_script_escaped_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInScriptHtmlCommentLikeText);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.text_buf.push('-');
                self.transition_to(State::ScriptDataEscapedDashDash);
            }
            '<' => {
                self.cursor += 1;
                self.transition_to(State::ScriptDataEscapedLessThan);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                self.transition_to(State::ScriptDataEscaped);
            }
            c => {
                self.cursor += c.len_utf8();
                self.text_buf.push(c);
                self.transition_to(State::ScriptDataEscaped);
            }
        }
        Step::Progress
    }

    fn step_script_escaped_dash_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInScriptHtmlCommentLikeText);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.text_buf.push('-');
            }
            '<' => {
                self.cursor += 1;
                self.transition_to(State::ScriptDataEscapedLessThan);
            }
            '>' => {
                self.cursor += 1;
                self.text_buf.push('>');
                self.transition_to(State::ScriptData);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                self.transition_to(State::ScriptDataEscaped);
            }
            c => {
                self.cursor += c.len_utf8();
                self.text_buf.push(c);
                self.transition_to(State::ScriptDataEscaped);
            }
        }
        Step::Progress
    }

    fn step_script_escaped_less_than(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.text_buf.push('<');
            self.transition_to(State::ScriptDataEscaped);
            return Step::Progress;
        };
        match c {
            '/' => {
                self.cursor += 1;
                self.temp_buf.clear();
                self.transition_to(State::ScriptDataEscapedEndTagOpen);
            }
            c if c.is_ascii_alphabetic() => {
                self.temp_buf.clear();
                self.text_buf.push('<');
                self.transition_to(State::ScriptDataDoubleEscapeStart);
            }
            _ => {
                self.text_buf.push('<');
                self.transition_to(State::ScriptDataEscaped);
            }
        }
        Step::Progress
    }

    fn step_script_double_escape_toggle(&mut self, on_script: State, otherwise: State) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            let fallback = if self.state == State::ScriptDataDoubleEscapeStart {
                State::ScriptDataEscaped
            } else {
                State::ScriptDataDoubleEscaped
            };
            self.transition_to(fallback);
            return Step::Progress;
        };
        match c {
            c if is_ws(c) || c == '/' || c == '>' => {
                self.cursor += c.len_utf8();
                self.text_buf.push(c);
                let next = if self.temp_buf == "script" {
                    on_script
                } else {
                    otherwise
                };
                self.transition_to(next);
            }
            c if c.is_ascii_alphabetic() => {
                self.cursor += 1;
                self.temp_buf.push(c.to_ascii_lowercase());
                self.text_buf.push(c);
            }
            _ => {
                let fallback = if self.state == State::ScriptDataDoubleEscapeStart {
                    State::ScriptDataEscaped
                } else {
                    State::ScriptDataDoubleEscaped
                };
                self.transition_to(fallback);
            }
        }
        Step::Progress
    }

    fn step_script_double_escaped(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInScriptHtmlCommentLikeText);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.text_buf.push('-');
                self.transition_to(State::ScriptDataDoubleEscapedDash);
            }
            '<' => {
                self.cursor += 1;
                self.text_buf.push('<');
                self.transition_to(State::ScriptDataDoubleEscapedLessThan);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
            }
            c => {
                self.cursor += c.len_utf8();
                self.text_buf.push(c);
            }
        }
        Step::Progress
    }

    fn step_script_double_escaped_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInScriptHtmlCommentLikeText);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.text_buf.push('-');
                self.transition_to(State::ScriptDataDoubleEscapedDashDash);
            }
            '<' => {
                self.cursor += 1;
                self.text_buf.push('<');
                self.transition_to(State::ScriptDataDoubleEscapedLessThan);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                self.transition_to(State::ScriptDataDoubleEscaped);
            }
            c => {
                self.cursor += c.len_utf8();
                self.text_buf.push(c);
                self.transition_to(State::ScriptDataDoubleEscaped);
            }
        }
        Step::Progress
    }

    fn step_script_double_escaped_dash_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInScriptHtmlCommentLikeText);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.text_buf.push('-');
            }
            '<' => {
                self.cursor += 1;
                self.text_buf.push('<');
                self.transition_to(State::ScriptDataDoubleEscapedLessThan);
            }
            '>' => {
                self.cursor += 1;
                self.text_buf.push('>');
                self.transition_to(State::ScriptData);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
                self.transition_to(State::ScriptDataDoubleEscaped);
            }
            c => {
                self.cursor += c.len_utf8();
                self.text_buf.push(c);
                self.transition_to(State::ScriptDataDoubleEscaped);
            }
        }
        Step::Progress
    }

    fn step_script_double_escaped_less_than(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::ScriptDataDoubleEscaped);
            return Step::Progress;
        };
        if c == '/' {
            self.cursor += 1;
            self.text_buf.push('/');
            self.temp_buf.clear();
            self.transition_to(State::ScriptDataDoubleEscapeEnd);
        } else {
            self.transition_to(State::ScriptDataDoubleEscaped);
        }
        Step::Progress
    }

    // ---- attribute states ----

    fn step_before_attribute_name(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::AfterAttributeName);
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
            }
            '/' | '>' => {
                self.transition_to(State::AfterAttributeName);
            }
            '=' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedEqualsSignBeforeAttributeName);
                self.tag.start_attr();
                self.tag.attr_name.push('=');
                self.transition_to(State::AttributeName);
            }
            _ => {
                self.tag.start_attr();
                self.transition_to(State::AttributeName);
            }
        }
        Step::Progress
    }

    fn step_attribute_name(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::AfterAttributeName);
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.transition_to(State::AfterAttributeName);
            }
            '/' | '>' => {
                self.transition_to(State::AfterAttributeName);
            }
            '=' => {
                self.cursor += 1;
                self.transition_to(State::BeforeAttributeValue);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.tag.attr_name.push('\u{FFFD}');
            }
            '"' | '\'' | '<' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedCharacterInAttributeName);
                self.tag.attr_name.push(c);
            }
            c => {
                self.cursor += c.len_utf8();
                self.tag.attr_name.push(c.to_ascii_lowercase());
            }
        }
        Step::Progress
    }

    fn step_after_attribute_name(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInTag);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
            }
            '/' => {
                self.cursor += 1;
                self.commit_attr();
                self.transition_to(State::SelfClosingStartTag);
            }
            '=' => {
                self.cursor += 1;
                self.transition_to(State::BeforeAttributeValue);
            }
            '>' => {
                self.cursor += 1;
                self.emit_current_tag();
                self.transition_to(State::Data);
            }
            _ => {
                self.commit_attr();
                self.tag.start_attr();
                self.transition_to(State::AttributeName);
            }
        }
        Step::Progress
    }

    fn step_before_attribute_value(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInTag);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
            }
            '"' => {
                self.cursor += 1;
                self.transition_to(State::AttributeValueDoubleQuoted);
            }
            '\'' => {
                self.cursor += 1;
                self.transition_to(State::AttributeValueSingleQuoted);
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingAttributeValue);
                self.commit_attr();
                self.emit_current_tag();
                self.transition_to(State::Data);
            }
            _ => {
                self.transition_to(State::AttributeValueUnquoted);
            }
        }
        Step::Progress
    }

    fn step_attribute_value_quoted(&mut self, quote: char) -> Step {
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInTag);
            self.emit_eof();
            return Step::Progress;
        }
        match rest.as_bytes()[0] {
            b if b == quote as u8 => {
                self.cursor += 1;
                self.transition_to(State::AfterAttributeValueQuoted);
                Step::Progress
            }
            b'&' => self.consume_char_ref_into_attr(),
            0 => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.tag.attr_value.push('\u{FFFD}');
                Step::Progress
            }
            _ => {
                let run =
                    memchr3(quote as u8, b'&', 0, rest.as_bytes()).unwrap_or(rest.len());
                let taken = &rest[..run];
                self.tag.attr_value.push_str(taken);
                self.cursor += run;
                Step::Progress
            }
        }
    }

    fn step_attribute_value_unquoted(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInTag);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
                self.commit_attr();
                self.transition_to(State::BeforeAttributeName);
                Step::Progress
            }
            '&' => self.consume_char_ref_into_attr(),
            '>' => {
                self.cursor += 1;
                self.commit_attr();
                self.emit_current_tag();
                self.transition_to(State::Data);
                Step::Progress
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.tag.attr_value.push('\u{FFFD}');
                Step::Progress
            }
            '"' | '\'' | '<' | '=' | '`' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedCharacterInUnquotedAttributeValue);
                self.tag.attr_value.push(c);
                Step::Progress
            }
            c => {
                self.cursor += c.len_utf8();
                self.tag.attr_value.push(c);
                Step::Progress
            }
        }
    }

    fn step_after_attribute_value_quoted(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInTag);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
                self.commit_attr();
                self.transition_to(State::BeforeAttributeName);
            }
            '/' => {
                self.cursor += 1;
                self.commit_attr();
                self.transition_to(State::SelfClosingStartTag);
            }
            '>' => {
                self.cursor += 1;
                self.commit_attr();
                self.emit_current_tag();
                self.transition_to(State::Data);
            }
            _ => {
                self.error(ParseErrorCode::MissingWhitespaceBetweenAttributes);
                self.commit_attr();
                self.transition_to(State::BeforeAttributeName);
            }
        }
        Step::Progress
    }

    fn step_self_closing_start_tag(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInTag);
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '>' => {
                self.cursor += 1;
                self.tag.self_closing = true;
                self.emit_current_tag();
                self.transition_to(State::Data);
            }
            _ => {
                self.error(ParseErrorCode::UnexpectedSolidusInTag);
                self.transition_to(State::BeforeAttributeName);
            }
        }
        Step::Progress
    }

    // ---- comments ----

    fn step_bogus_comment(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.emit_current_comment();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '>' => {
                self.cursor += 1;
                self.emit_current_comment();
                self.transition_to(State::Data);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.comment_buf.push('\u{FFFD}');
            }
            c => {
                self.cursor += c.len_utf8();
                self.comment_buf.push(c);
            }
        }
        Step::Progress
    }

    fn step_markup_declaration_open(&mut self) -> Step {
        match self.match_prefix("--") {
            None => return Step::NeedMoreInput,
            Some(true) => {
                self.cursor += 2;
                self.comment_buf.clear();
                self.transition_to(State::CommentStart);
                return Step::Progress;
            }
            Some(false) => {}
        }
        match self.match_prefix_ci("DOCTYPE") {
            None => return Step::NeedMoreInput,
            Some(true) => {
                self.cursor += "DOCTYPE".len();
                self.transition_to(State::Doctype);
                return Step::Progress;
            }
            Some(false) => {}
        }
        match self.match_prefix("[CDATA[") {
            None => return Step::NeedMoreInput,
            Some(true) => {
                self.cursor += "[CDATA[".len();
                if self.cdata_allowed {
                    self.transition_to(State::CdataSection);
                } else {
                    self.error(ParseErrorCode::CdataInHtmlContent);
                    self.comment_buf.clear();
                    self.comment_buf.push_str("[CDATA[");
                    self.transition_to(State::BogusComment);
                }
                return Step::Progress;
            }
            Some(false) => {}
        }
        self.error(ParseErrorCode::IncorrectlyOpenedComment);
        self.comment_buf.clear();
        self.transition_to(State::BogusComment);
        Step::Progress
    }

    fn step_comment_start(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::Comment);
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.transition_to(State::CommentStartDash);
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::AbruptClosingOfEmptyComment);
                self.emit_current_comment();
                self.transition_to(State::Data);
            }
            _ => {
                self.transition_to(State::Comment);
            }
        }
        Step::Progress
    }

    fn step_comment_start_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInComment);
            self.emit_current_comment();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.transition_to(State::CommentEnd);
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::AbruptClosingOfEmptyComment);
                self.emit_current_comment();
                self.transition_to(State::Data);
            }
            _ => {
                self.comment_buf.push('-');
                self.transition_to(State::Comment);
            }
        }
        Step::Progress
    }

    fn step_comment(&mut self) -> Step {
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInComment);
            self.emit_current_comment();
            self.emit_eof();
            return Step::Progress;
        }
        match rest.as_bytes()[0] {
            b'<' => {
                self.cursor += 1;
                self.comment_buf.push('<');
                self.transition_to(State::CommentLessThan);
            }
            b'-' => {
                self.cursor += 1;
                self.transition_to(State::CommentEndDash);
            }
            0 => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.comment_buf.push('\u{FFFD}');
            }
            _ => {
                let run = memchr3(b'<', b'-', 0, rest.as_bytes()).unwrap_or(rest.len());
                self.comment_buf.push_str(&rest[..run]);
                self.cursor += run;
            }
        }
        Step::Progress
    }

    fn step_comment_less_than(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::Comment);
            return Step::Progress;
        };
        match c {
            '!' => {
                self.cursor += 1;
                self.comment_buf.push('!');
                self.transition_to(State::CommentLessThanBang);
            }
            '<' => {
                self.cursor += 1;
                self.comment_buf.push('<');
            }
            _ => {
                self.transition_to(State::Comment);
            }
        }
        Step::Progress
    }

    fn step_comment_less_than_bang(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::Comment);
            return Step::Progress;
        };
        if c == '-' {
            self.cursor += 1;
            self.transition_to(State::CommentLessThanBangDash);
        } else {
            self.transition_to(State::Comment);
        }
        Step::Progress
    }

    fn step_comment_less_than_bang_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::CommentEndDash);
            return Step::Progress;
        };
        if c == '-' {
            self.cursor += 1;
            self.transition_to(State::CommentLessThanBangDashDash);
        } else {
            self.transition_to(State::CommentEndDash);
        }
        Step::Progress
    }

    fn step_comment_less_than_bang_dash_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.transition_to(State::CommentEnd);
            return Step::Progress;
        };
        if c != '>' {
            self.error(ParseErrorCode::NestedComment);
        }
        self.transition_to(State::CommentEnd);
        Step::Progress
    }

    fn step_comment_end_dash(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInComment);
            self.emit_current_comment();
            self.emit_eof();
            return Step::Progress;
        };
        if c == '-' {
            self.cursor += 1;
            self.transition_to(State::CommentEnd);
        } else {
            self.comment_buf.push('-');
            self.transition_to(State::Comment);
        }
        Step::Progress
    }

    fn step_comment_end(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInComment);
            self.emit_current_comment();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '>' => {
                self.cursor += 1;
                self.emit_current_comment();
                self.transition_to(State::Data);
            }
            '!' => {
                self.cursor += 1;
                self.transition_to(State::CommentEndBang);
            }
            '-' => {
                self.cursor += 1;
                self.comment_buf.push('-');
            }
            _ => {
                self.comment_buf.push_str("--");
                self.transition_to(State::Comment);
            }
        }
        Step::Progress
    }

    fn step_comment_end_bang(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInComment);
            self.emit_current_comment();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '-' => {
                self.cursor += 1;
                self.comment_buf.push_str("--!");
                self.transition_to(State::CommentEndDash);
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::IncorrectlyClosedComment);
                self.emit_current_comment();
                self.transition_to(State::Data);
            }
            _ => {
                self.comment_buf.push_str("--!");
                self.transition_to(State::Comment);
            }
        }
        Step::Progress
    }

    // ---- doctype ----

    fn step_doctype(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype = DoctypeBuilder::default();
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
                self.transition_to(State::BeforeDoctypeName);
            }
            '>' => {
                self.transition_to(State::BeforeDoctypeName);
            }
            _ => {
                self.error(ParseErrorCode::MissingWhitespaceBeforeDoctypeName);
                self.transition_to(State::BeforeDoctypeName);
            }
        }
        Step::Progress
    }

    fn step_before_doctype_name(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype = DoctypeBuilder::default();
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingDoctypeName);
                self.doctype = DoctypeBuilder::default();
                self.doctype.force_quirks = true;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.doctype = DoctypeBuilder::default();
                self.doctype.name = Some("\u{FFFD}".to_string());
                self.transition_to(State::DoctypeName);
            }
            c => {
                self.cursor += c.len_utf8();
                self.doctype = DoctypeBuilder::default();
                self.doctype.name = Some(c.to_ascii_lowercase().to_string());
                self.transition_to(State::DoctypeName);
            }
        }
        Step::Progress
    }

    fn step_doctype_name(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
                self.transition_to(State::AfterDoctypeName);
            }
            '>' => {
                self.cursor += 1;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                if let Some(name) = &mut self.doctype.name {
                    name.push('\u{FFFD}');
                }
            }
            c => {
                self.cursor += c.len_utf8();
                if let Some(name) = &mut self.doctype.name {
                    name.push(c.to_ascii_lowercase());
                }
            }
        }
        Step::Progress
    }

    fn step_after_doctype_name(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        if is_ws(c) {
            self.cursor += c.len_utf8();
            return Step::Progress;
        }
        if c == '>' {
            self.cursor += 1;
            self.emit_current_doctype();
            self.transition_to(State::Data);
            return Step::Progress;
        }
        match self.match_prefix_ci("PUBLIC") {
            None => return Step::NeedMoreInput,
            Some(true) => {
                self.cursor += "PUBLIC".len();
                self.transition_to(State::AfterDoctypePublicKeyword);
                return Step::Progress;
            }
            Some(false) => {}
        }
        match self.match_prefix_ci("SYSTEM") {
            None => return Step::NeedMoreInput,
            Some(true) => {
                self.cursor += "SYSTEM".len();
                self.transition_to(State::AfterDoctypeSystemKeyword);
                return Step::Progress;
            }
            Some(false) => {}
        }
        self.error(ParseErrorCode::InvalidCharacterSequenceAfterDoctypeName);
        self.doctype.force_quirks = true;
        self.transition_to(State::BogusDoctype);
        Step::Progress
    }

    fn step_after_doctype_public_keyword(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
                self.transition_to(State::BeforeDoctypePublicIdentifier);
            }
            '"' | '\'' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingWhitespaceAfterDoctypePublicKeyword);
                self.doctype.public_id = Some(String::new());
                self.transition_to(if c == '"' {
                    State::DoctypePublicIdentifierDoubleQuoted
                } else {
                    State::DoctypePublicIdentifierSingleQuoted
                });
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingDoctypePublicIdentifier);
                self.doctype.force_quirks = true;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            _ => {
                self.error(ParseErrorCode::MissingQuoteBeforeDoctypePublicIdentifier);
                self.doctype.force_quirks = true;
                self.transition_to(State::BogusDoctype);
            }
        }
        Step::Progress
    }

    fn step_before_doctype_public_identifier(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
            }
            '"' | '\'' => {
                self.cursor += 1;
                self.doctype.public_id = Some(String::new());
                self.transition_to(if c == '"' {
                    State::DoctypePublicIdentifierDoubleQuoted
                } else {
                    State::DoctypePublicIdentifierSingleQuoted
                });
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingDoctypePublicIdentifier);
                self.doctype.force_quirks = true;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            _ => {
                self.error(ParseErrorCode::MissingQuoteBeforeDoctypePublicIdentifier);
                self.doctype.force_quirks = true;
                self.transition_to(State::BogusDoctype);
            }
        }
        Step::Progress
    }

    fn step_doctype_public_identifier(&mut self, quote: char) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if c == quote => {
                self.cursor += 1;
                self.transition_to(State::AfterDoctypePublicIdentifier);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                if let Some(id) = &mut self.doctype.public_id {
                    id.push('\u{FFFD}');
                }
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::AbruptDoctypePublicIdentifier);
                self.doctype.force_quirks = true;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            c => {
                self.cursor += c.len_utf8();
                if let Some(id) = &mut self.doctype.public_id {
                    id.push(c);
                }
            }
        }
        Step::Progress
    }

    fn step_after_doctype_public_identifier(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
                self.transition_to(State::BetweenDoctypePublicAndSystemIdentifiers);
            }
            '>' => {
                self.cursor += 1;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            '"' | '\'' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers);
                self.doctype.system_id = Some(String::new());
                self.transition_to(if c == '"' {
                    State::DoctypeSystemIdentifierDoubleQuoted
                } else {
                    State::DoctypeSystemIdentifierSingleQuoted
                });
            }
            _ => {
                self.error(ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier);
                self.doctype.force_quirks = true;
                self.transition_to(State::BogusDoctype);
            }
        }
        Step::Progress
    }

    fn step_between_doctype_public_and_system(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
            }
            '>' => {
                self.cursor += 1;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            '"' | '\'' => {
                self.cursor += 1;
                self.doctype.system_id = Some(String::new());
                self.transition_to(if c == '"' {
                    State::DoctypeSystemIdentifierDoubleQuoted
                } else {
                    State::DoctypeSystemIdentifierSingleQuoted
                });
            }
            _ => {
                self.error(ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier);
                self.doctype.force_quirks = true;
                self.transition_to(State::BogusDoctype);
            }
        }
        Step::Progress
    }

    fn step_after_doctype_system_keyword(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
                self.transition_to(State::BeforeDoctypeSystemIdentifier);
            }
            '"' | '\'' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingWhitespaceAfterDoctypeSystemKeyword);
                self.doctype.system_id = Some(String::new());
                self.transition_to(if c == '"' {
                    State::DoctypeSystemIdentifierDoubleQuoted
                } else {
                    State::DoctypeSystemIdentifierSingleQuoted
                });
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingDoctypeSystemIdentifier);
                self.doctype.force_quirks = true;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            _ => {
                self.error(ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier);
                self.doctype.force_quirks = true;
                self.transition_to(State::BogusDoctype);
            }
        }
        Step::Progress
    }

    fn step_before_doctype_system_identifier(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
            }
            '"' | '\'' => {
                self.cursor += 1;
                self.doctype.system_id = Some(String::new());
                self.transition_to(if c == '"' {
                    State::DoctypeSystemIdentifierDoubleQuoted
                } else {
                    State::DoctypeSystemIdentifierSingleQuoted
                });
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::MissingDoctypeSystemIdentifier);
                self.doctype.force_quirks = true;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            _ => {
                self.error(ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier);
                self.doctype.force_quirks = true;
                self.transition_to(State::BogusDoctype);
            }
        }
        Step::Progress
    }

    fn step_doctype_system_identifier(&mut self, quote: char) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if c == quote => {
                self.cursor += 1;
                self.transition_to(State::AfterDoctypeSystemIdentifier);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                if let Some(id) = &mut self.doctype.system_id {
                    id.push('\u{FFFD}');
                }
            }
            '>' => {
                self.cursor += 1;
                self.error(ParseErrorCode::AbruptDoctypeSystemIdentifier);
                self.doctype.force_quirks = true;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            c => {
                self.cursor += c.len_utf8();
                if let Some(id) = &mut self.doctype.system_id {
                    id.push(c);
                }
            }
        }
        Step::Progress
    }

    fn step_after_doctype_system_identifier(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInDoctype);
            self.doctype.force_quirks = true;
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            c if is_ws(c) => {
                self.cursor += c.len_utf8();
            }
            '>' => {
                self.cursor += 1;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            _ => {
                self.error(ParseErrorCode::UnexpectedCharacterAfterDoctypeSystemIdentifier);
                self.transition_to(State::BogusDoctype);
            }
        }
        Step::Progress
    }

    fn step_bogus_doctype(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.emit_current_doctype();
            self.emit_eof();
            return Step::Progress;
        };
        match c {
            '>' => {
                self.cursor += 1;
                self.emit_current_doctype();
                self.transition_to(State::Data);
            }
            '\0' => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
            }
            c => {
                self.cursor += c.len_utf8();
            }
        }
        Step::Progress
    }

    // ---- CDATA ----

    fn step_cdata_section(&mut self) -> Step {
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.error(ParseErrorCode::EofInCdata);
            self.emit_eof();
            return Step::Progress;
        }
        match rest.as_bytes()[0] {
            b']' => {
                self.cursor += 1;
                self.transition_to(State::CdataSectionBracket);
            }
            0 => {
                self.cursor += 1;
                self.error(ParseErrorCode::UnexpectedNullCharacter);
                self.text_buf.push('\u{FFFD}');
            }
            _ => {
                let run = memchr2(b']', 0, rest.as_bytes()).unwrap_or(rest.len());
                self.text_buf.push_str(&rest[..run]);
                self.cursor += run;
            }
        }
        Step::Progress
    }

    fn step_cdata_section_bracket(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.text_buf.push(']');
            self.transition_to(State::CdataSection);
            return Step::Progress;
        };
        if c == ']' {
            self.cursor += 1;
            self.transition_to(State::CdataSectionEnd);
        } else {
            self.text_buf.push(']');
            self.transition_to(State::CdataSection);
        }
        Step::Progress
    }

    fn step_cdata_section_end(&mut self) -> Step {
        let Some(c) = self.peek() else {
            if !self.eos {
                return Step::NeedMoreInput;
            }
            self.text_buf.push_str("]]");
            self.transition_to(State::CdataSection);
            return Step::Progress;
        };
        match c {
            ']' => {
                self.cursor += 1;
                self.text_buf.push(']');
            }
            '>' => {
                self.cursor += 1;
                self.transition_to(State::Data);
            }
            _ => {
                self.text_buf.push_str("]]");
                self.transition_to(State::CdataSection);
            }
        }
        Step::Progress
    }
}
