//! Parse drivers: one-shot document/fragment parsing and a streaming session.
//!
//! The driver owns the cooperative pull loop between tokenizer and tree
//! constructor: the tokenizer pauses after each start tag, the builder's
//! directives (raw-text switches, CDATA gating) are applied, then the
//! tokenizer resumes. `NeedMoreInput` suspends the loop at chunk boundaries.

use html::{
    BuilderStep, FragmentContext, Ns, ParseError, TagId, Token, TokenizeResult, Tokenizer,
    TokenizerConfig, TreeBuilder, TreeBuilderConfig,
};

use crate::document::Document;
use crate::node::NodeId;

/// Parse configuration shared by documents and fragments.
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    pub scripting_enabled: bool,
}

/// Result of a parse: the tree plus accumulated recoverable errors.
#[derive(Debug)]
pub struct ParseOutcome {
    pub document: Document,
    /// Root to read parsed content from: the document root for full parses,
    /// the synthetic context root for fragment parses.
    pub root: NodeId,
    pub errors: Vec<ParseError>,
}

/// Parse a complete HTML document.
pub fn parse_document(input: &str, opts: &ParseOptions) -> ParseOutcome {
    let mut session = ParseSession::new(opts);
    session.push_str(input);
    session.finish()
}

/// Parse a fragment against a context element (the HTML fragment algorithm).
pub fn parse_fragment(input: &str, context: &str, opts: &ParseOptions) -> ParseOutcome {
    let mut session = ParseSession::new_fragment(context, opts);
    session.push_str(input);
    session.finish()
}

/// Streaming parse session: feed chunks, then `finish()`.
///
/// Chunk-equivalence holds: any split of the input produces the same tree as
/// a single-chunk parse.
pub struct ParseSession {
    tokenizer: Tokenizer,
    builder: TreeBuilder<NodeId>,
    document: Document,
    root: NodeId,
}

impl ParseSession {
    pub fn new(opts: &ParseOptions) -> Self {
        let mut document = Document::new();
        let root = document.root();
        let builder = TreeBuilder::new(
            TreeBuilderConfig {
                scripting_enabled: opts.scripting_enabled,
            },
            root,
        );
        Self {
            tokenizer: Tokenizer::new(TokenizerConfig::default()),
            builder,
            document,
            root,
        }
    }

    pub fn new_fragment(context: &str, opts: &ParseOptions) -> Self {
        let mut document = Document::new();
        let doc_root = document.root();
        let root = document.create_element(Ns::Html, "html");
        document.append_child(doc_root, root);
        let ctx = FragmentContext::html(context);
        let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
        if let Some(kind) =
            TreeBuilder::<NodeId>::fragment_tokenizer_mode(&ctx, opts.scripting_enabled)
        {
            tokenizer.set_raw_mode(kind, context);
        }
        let builder = TreeBuilder::new_fragment(
            TreeBuilderConfig {
                scripting_enabled: opts.scripting_enabled,
            },
            doc_root,
            root,
            ctx,
        );
        Self {
            tokenizer,
            builder,
            document,
            root,
        }
    }

    /// Feed one chunk and run the pull loop until more input is needed.
    pub fn push_str(&mut self, chunk: &str) {
        let result = self.tokenizer.push_str(chunk);
        self.drive(result);
    }

    /// Mark end-of-input, drain the EOF rules, and return the outcome.
    pub fn finish(mut self) -> ParseOutcome {
        let result = self.tokenizer.finish();
        self.drive(result);
        debug_assert!(self.builder.is_done(), "EOF must complete construction");
        let mut errors = self.tokenizer.drain_errors();
        errors.extend(self.document.take_parse_errors());
        errors.sort_by_key(|e| e.position);
        if !errors.is_empty() {
            log::debug!("parse recovered from {} error(s)", errors.len());
        }
        ParseOutcome {
            document: self.document,
            root: self.root,
            errors,
        }
    }

    fn drive(&mut self, mut result: TokenizeResult) {
        loop {
            for token in self.tokenizer.drain_tokens() {
                let raw_tag = match &token {
                    Token::StartTag { name, .. } => Some(name.clone()),
                    _ => None,
                };
                match self.builder.push_token(token, &mut self.document) {
                    BuilderStep::Continue => {}
                    BuilderStep::SwitchTokenizer(kind) => {
                        self.tokenizer
                            .set_raw_mode(kind, raw_tag.as_deref().unwrap_or(""));
                    }
                }
                self.tokenizer.set_cdata_allowed(self.builder.cdata_allowed());
            }
            match result {
                TokenizeResult::NeedMoreInput => return,
                TokenizeResult::EmittedEof => {
                    for token in self.tokenizer.drain_tokens() {
                        let _ = self.builder.push_token(token, &mut self.document);
                    }
                    return;
                }
                TokenizeResult::Progress => result = self.tokenizer.pump(),
            }
        }
    }
}

/// Convenience: first descendant with the given tag id, in preorder.
pub fn find_first(doc: &Document, from: NodeId, tag_id: TagId) -> Option<NodeId> {
    let mut found = None;
    doc.walk(from, &mut |id| {
        if found.is_none() && doc.element(id).is_some_and(|e| e.tag_id == tag_id) {
            found = Some(id);
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::{parse_document, parse_fragment, ParseOptions, ParseSession};
    use crate::serialize::{serialize_node_to_html, SerializeOptions};

    fn roundtrip(input: &str) -> String {
        let outcome = parse_document(input, &ParseOptions::default());
        serialize_node_to_html(&outcome.document, outcome.root, &SerializeOptions::default())
    }

    #[test]
    fn document_parse_builds_scaffolding() {
        let html = roundtrip("<p>hi</p>");
        assert_eq!(html, "<html><head></head><body><p>hi</p></body></html>");
    }

    #[test]
    fn doctype_survives_roundtrip() {
        let html = roundtrip("<!DOCTYPE html><p>x</p>");
        assert_eq!(
            html,
            "<!doctype html><html><head></head><body><p>x</p></body></html>"
        );
    }

    #[test]
    fn streaming_chunks_match_single_shot() {
        let input = "<!DOCTYPE html><div class=\"a\"><p>one<p>two</div><script>x < 1 && y</script>";
        let whole = roundtrip(input);
        for split in [1usize, 5, 9, 17, 25, 40, input.len() - 1] {
            if !input.is_char_boundary(split) {
                continue;
            }
            let mut session = ParseSession::new(&ParseOptions::default());
            session.push_str(&input[..split]);
            session.push_str(&input[split..]);
            let outcome = session.finish();
            let chunked = serialize_node_to_html(
                &outcome.document,
                outcome.root,
                &SerializeOptions::default(),
            );
            assert_eq!(whole, chunked, "split at {split}");
        }
    }

    #[test]
    fn malformed_input_never_fails() {
        for input in [
            "<div",
            "</div>",
            "<b><i></b></i>",
            "<!-- unterminated",
            "<table><div>x",
            "\u{0}\u{0}",
            "<p att",
        ] {
            let outcome = parse_document(input, &ParseOptions::default());
            assert!(
                !outcome.errors.is_empty(),
                "expected at least one diagnostic for {input:?}"
            );
            // Serialization must still work on whatever tree came out.
            let _ = serialize_node_to_html(
                &outcome.document,
                outcome.root,
                &SerializeOptions::default(),
            );
        }
    }

    #[test]
    fn fragment_parse_returns_context_children() {
        let outcome = parse_fragment("<li>a</li><li>b</li>", "ul", &ParseOptions::default());
        let children = outcome.document.children(outcome.root);
        assert_eq!(children.len(), 2);
        assert_eq!(
            outcome.document.element(children[0]).map(|e| e.name.as_str()),
            Some("li")
        );
    }

    #[test]
    fn parse_is_idempotent_under_reserialization() {
        let first = roundtrip("<div><p>Hello<b>world</p>!</b></div>");
        let second = roundtrip(&first);
        assert_eq!(first, second);
    }
}
