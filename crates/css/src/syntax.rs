//! Recursive-descent CSS parser.
//!
//! Error recovery is per-rule: a malformed rule produces one positioned
//! diagnostic and is skipped to the next `;`/`}` boundary; the rest of the
//! sheet still parses. Multiple diagnostics accumulate; none abort.

use diagnostics::{Diagnostic, Diagnostics, Kind, Pos};

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Style(StyleRule),
    At(AtRule),
}

/// `selector, selector { name: value; ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct StyleRule {
    /// Comma-separated selector clauses, whitespace-normalized.
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
    pub pos: Pos,
}

/// A single property: `color: red`.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    /// ASCII-lowercased property name.
    pub name: String,
    pub value: String,
}

/// `@name prelude;` or `@name prelude { body }`.
#[derive(Clone, Debug, PartialEq)]
pub struct AtRule {
    /// ASCII-lowercased at-keyword without the `@`.
    pub name: String,
    pub prelude: String,
    pub body: AtBody,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AtBody {
    /// Nested rule list (`@media`, `@supports`, `@document`, `@keyframes`).
    Rules(Vec<Rule>),
    /// Declaration block (`@font-face`, `@page`).
    Declarations(Vec<Declaration>),
    /// Statement form, no block (`@import`, `@charset`, `@namespace`).
    None,
    /// Unrecognized at-rule block, preserved verbatim.
    Raw(String),
}

/// Parse result: whatever parsed plus the recovered conditions.
#[derive(Debug)]
pub struct CssParseOutcome {
    pub stylesheet: Stylesheet,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a stylesheet, recovering per rule.
pub fn parse_css(text: &str) -> CssParseOutcome {
    let mut diags = Diagnostics::new();
    let mut scanner = Scanner::new(text, Pos::new(1, 1));
    let rules = parse_rules(&mut scanner, &mut diags);
    CssParseOutcome {
        stylesheet: Stylesheet { rules },
        diagnostics: diags.into_records(),
    }
}

fn css_warn(diags: &mut Diagnostics, message: impl Into<String>, pos: Pos) {
    diags.push(Diagnostic::warn(Kind::Css, "css parse", message).at(pos));
}

fn parse_rules(scanner: &mut Scanner<'_>, diags: &mut Diagnostics) -> Vec<Rule> {
    let mut rules = Vec::new();
    loop {
        scanner.skip_ws_and_comments(diags);
        if scanner.eof() {
            break;
        }
        if scanner.peek() == Some('}') {
            // Stray close brace at this level.
            css_warn(diags, "unexpected '}'", scanner.pos());
            scanner.bump();
            continue;
        }
        let rule = if scanner.peek() == Some('@') {
            parse_at_rule(scanner, diags)
        } else {
            parse_style_rule(scanner, diags)
        };
        if let Some(rule) = rule {
            rules.push(rule);
        }
    }
    rules
}

fn parse_style_rule(scanner: &mut Scanner<'_>, diags: &mut Diagnostics) -> Option<Rule> {
    let pos = scanner.pos();
    let (prelude, delim) = scanner.consume_prelude();
    match delim {
        Delim::BlockOpen => {
            let (block, block_pos) = scanner.consume_block(diags);
            let selectors = split_selector_list(&prelude);
            if selectors.is_empty() {
                css_warn(diags, "rule has no selectors", pos);
                return None;
            }
            let declarations = parse_declarations(&block, block_pos, diags);
            Some(Rule::Style(StyleRule {
                selectors,
                declarations,
                pos,
            }))
        }
        Delim::Semicolon => {
            css_warn(diags, "unexpected ';' outside a declaration block", pos);
            None
        }
        Delim::Eof => {
            if !prelude.trim().is_empty() {
                css_warn(diags, "unexpected end of stylesheet in selector", pos);
            }
            None
        }
    }
}

fn parse_at_rule(scanner: &mut Scanner<'_>, diags: &mut Diagnostics) -> Option<Rule> {
    let pos = scanner.pos();
    scanner.bump(); // '@'
    let name = scanner.consume_ident().to_ascii_lowercase();
    if name.is_empty() {
        css_warn(diags, "expected an at-keyword after '@'", pos);
        scanner.recover_past_rule();
        return None;
    }
    let (prelude, delim) = scanner.consume_prelude();
    let prelude = normalize_ws(&prelude);
    let body = match delim {
        Delim::Semicolon => AtBody::None,
        Delim::Eof => {
            if is_statement_at_rule(&name) {
                AtBody::None
            } else {
                css_warn(diags, format!("'@{name}' is missing its block"), pos);
                return None;
            }
        }
        Delim::BlockOpen => {
            let (block, block_pos) = scanner.consume_block(diags);
            if is_rule_list_at_rule(&name) {
                let mut inner = Scanner::new(&block, block_pos);
                AtBody::Rules(parse_rules(&mut inner, diags))
            } else if is_declaration_at_rule(&name) {
                AtBody::Declarations(parse_declarations(&block, block_pos, diags))
            } else {
                AtBody::Raw(block.trim().to_string())
            }
        }
    };
    Some(Rule::At(AtRule {
        name,
        prelude,
        body,
        pos,
    }))
}

fn is_rule_list_at_rule(name: &str) -> bool {
    matches!(
        name,
        "media" | "supports" | "document" | "-moz-document" | "keyframes" | "-webkit-keyframes"
    )
}

fn is_declaration_at_rule(name: &str) -> bool {
    matches!(name, "font-face" | "page")
}

fn is_statement_at_rule(name: &str) -> bool {
    matches!(name, "import" | "charset" | "namespace")
}

fn parse_declarations(block: &str, origin: Pos, diags: &mut Diagnostics) -> Vec<Declaration> {
    let mut scanner = Scanner::new(block, origin);
    let mut declarations = Vec::new();
    loop {
        scanner.skip_ws_and_comments(diags);
        if scanner.eof() {
            break;
        }
        if scanner.peek() == Some(';') {
            scanner.bump();
            continue;
        }
        let pos = scanner.pos();
        let (text, _) = scanner.consume_component(&[';']);
        match split_declaration(&text) {
            Some((name, value)) => declarations.push(Declaration { name, value }),
            None => css_warn(diags, format!("malformed declaration '{}'", text.trim()), pos),
        }
    }
    declarations
}

fn split_declaration(text: &str) -> Option<(String, String)> {
    let (name, value) = text.split_once(':')?;
    let name = name.trim().to_ascii_lowercase();
    let value = normalize_ws(value);
    if name.is_empty()
        || value.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }
    Some((name, value))
}

/// Split a selector prelude on top-level commas; strings and bracket/paren
/// groups are opaque.
fn split_selector_list(prelude: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    let mut chars = prelude.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '"' | '\'' => {
                current.push(c);
                for inner in chars.by_ref() {
                    current.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            ',' if depth == 0 => {
                clauses.push(std::mem::take(&mut current));
                continue;
            }
            _ => current.push(c),
        }
    }
    clauses.push(current);
    clauses
        .into_iter()
        .map(|c| normalize_ws(&c))
        .filter(|c| !c.is_empty())
        .collect()
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---- serialization ----

impl Stylesheet {
    /// Serialize with normalized whitespace, one rule per line.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        write_rules(&self.rules, 0, &mut out);
        out
    }
}

fn write_rules(rules: &[Rule], depth: usize, out: &mut String) {
    for rule in rules {
        indent(depth, out);
        match rule {
            Rule::Style(style) => write_style_rule(style, out),
            Rule::At(at) => write_at_rule(at, depth, out),
        }
        out.push('\n');
    }
}

fn write_style_rule(rule: &StyleRule, out: &mut String) {
    out.push_str(&rule.selectors.join(", "));
    out.push_str(" { ");
    write_declarations(&rule.declarations, out);
    out.push('}');
}

fn write_declarations(declarations: &[Declaration], out: &mut String) {
    for decl in declarations {
        out.push_str(&decl.name);
        out.push_str(": ");
        out.push_str(&decl.value);
        out.push_str("; ");
    }
}

fn write_at_rule(rule: &AtRule, depth: usize, out: &mut String) {
    out.push('@');
    out.push_str(&rule.name);
    if !rule.prelude.is_empty() {
        out.push(' ');
        out.push_str(&rule.prelude);
    }
    match &rule.body {
        AtBody::None => out.push(';'),
        AtBody::Declarations(declarations) => {
            out.push_str(" { ");
            write_declarations(declarations, out);
            out.push('}');
        }
        AtBody::Raw(raw) => {
            out.push_str(" { ");
            out.push_str(raw);
            out.push_str(" }");
        }
        AtBody::Rules(rules) => {
            out.push_str(" {\n");
            write_rules(rules, depth + 1, out);
            indent(depth, out);
            out.push('}');
        }
    }
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

// ---- scanning ----

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Delim {
    BlockOpen,
    Semicolon,
    Eof,
}

/// Character scanner with 1-based line/column tracking. Nested scanners start
/// from the enclosing block's origin so inner diagnostics stay absolute.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, origin: Pos) -> Self {
        Self {
            input,
            pos: 0,
            line: origin.line,
            col: origin.column,
        }
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.col)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_ws_and_comments(&mut self, diags: &mut Diagnostics) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek2() == Some('*') => {
                    let start = self.pos();
                    self.bump();
                    self.bump();
                    if !self.skip_to_comment_end() {
                        css_warn(diags, "unterminated comment", start);
                    }
                }
                _ => return,
            }
        }
    }

    fn skip_to_comment_end(&mut self) -> bool {
        while let Some(c) = self.bump() {
            if c == '*' && self.peek() == Some('/') {
                self.bump();
                return true;
            }
        }
        false
    }

    fn consume_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }
        ident
    }

    /// Consume up to (but not including) `{`, or past a terminating `;`.
    fn consume_prelude(&mut self) -> (String, Delim) {
        let (text, delim) = self.consume_component(&[';', '{']);
        match delim {
            Some('{') => {
                self.bump();
                (text, Delim::BlockOpen)
            }
            Some(';') => {
                self.bump();
                (text, Delim::Semicolon)
            }
            _ => (text, Delim::Eof),
        }
    }

    /// Consume raw text until one of `stops` at nesting depth zero, leaving
    /// the stop character unconsumed. Strings, parens, brackets, and comments
    /// are opaque.
    fn consume_component(&mut self, stops: &[char]) -> (String, Option<char>) {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek() else {
                return (text, None);
            };
            if depth == 0 && stops.contains(&c) {
                return (text, Some(c));
            }
            match c {
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '"' | '\'' => {
                    self.bump();
                    text.push(c);
                    self.consume_string_into(c, &mut text);
                    continue;
                }
                '/' if self.peek2() == Some('*') => {
                    self.bump();
                    self.bump();
                    self.skip_to_comment_end();
                    text.push(' ');
                    continue;
                }
                _ => {}
            }
            text.push(c);
            self.bump();
        }
    }

    fn consume_string_into(&mut self, quote: char, text: &mut String) {
        while let Some(c) = self.bump() {
            text.push(c);
            if c == '\\' {
                if let Some(escaped) = self.bump() {
                    text.push(escaped);
                }
                continue;
            }
            if c == quote {
                return;
            }
        }
    }

    /// Consume a `{`-opened block through its matching `}`; returns the inner
    /// text and the position of its first character.
    fn consume_block(&mut self, diags: &mut Diagnostics) -> (String, Pos) {
        let origin = self.pos();
        let mut text = String::new();
        let mut depth = 1usize;
        loop {
            let Some(c) = self.peek() else {
                css_warn(diags, "unterminated block", origin);
                return (text, origin);
            };
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return (text, origin);
                    }
                }
                '"' | '\'' => {
                    self.bump();
                    text.push(c);
                    self.consume_string_into(c, &mut text);
                    continue;
                }
                _ => {}
            }
            text.push(c);
            self.bump();
        }
    }

    /// Error recovery: skip to just past the next top-level `;` or `}`.
    fn recover_past_rule(&mut self) {
        let (_, stop) = self.consume_component(&[';', '}']);
        if stop.is_some() {
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_css, AtBody, Rule};

    fn style_rules(css: &str) -> Vec<super::StyleRule> {
        parse_css(css)
            .stylesheet
            .rules
            .into_iter()
            .filter_map(|r| match r {
                Rule::Style(s) => Some(s),
                Rule::At(_) => None,
            })
            .collect()
    }

    #[test]
    fn parses_selectors_and_declarations() {
        let rules = style_rules("div, #id .cls { color: red; font-size: 12px }");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selectors, vec!["div", "#id .cls"]);
        assert_eq!(rules[0].declarations.len(), 2);
        assert_eq!(rules[0].declarations[0].name, "color");
        assert_eq!(rules[0].declarations[1].value, "12px");
    }

    #[test]
    fn recovers_per_rule_and_reports_positions() {
        let outcome = parse_css("a { color: red }\n}\n.b { left: 1px }");
        assert_eq!(outcome.stylesheet.rules.len(), 2);
        assert_eq!(outcome.diagnostics.len(), 1);
        let pos = outcome.diagnostics[0].pos.expect("positioned");
        assert_eq!((pos.line, pos.column), (2, 1));
    }

    #[test]
    fn malformed_declarations_do_not_drop_the_rule() {
        let outcome = parse_css("a { color red; margin: 0 }");
        let rules = outcome.stylesheet.rules;
        assert_eq!(rules.len(), 1);
        match &rules[0] {
            Rule::Style(rule) => {
                assert_eq!(rule.declarations.len(), 1);
                assert_eq!(rule.declarations[0].name, "margin");
            }
            Rule::At(_) => panic!("expected a style rule"),
        }
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn media_blocks_nest_rules() {
        let outcome = parse_css("@media (min-width: 600px) { a { color: red } b { top: 0 } }");
        match &outcome.stylesheet.rules[0] {
            Rule::At(at) => {
                assert_eq!(at.name, "media");
                assert_eq!(at.prelude, "(min-width: 600px)");
                match &at.body {
                    AtBody::Rules(rules) => assert_eq!(rules.len(), 2),
                    other => panic!("expected nested rules, got {other:?}"),
                }
            }
            Rule::Style(_) => panic!("expected an at-rule"),
        }
    }

    #[test]
    fn statement_and_declaration_at_rules() {
        let outcome =
            parse_css("@charset \"utf-8\";@import url(a.css);@font-face { font-family: X; src: url(x.woff2) }");
        assert!(outcome.diagnostics.is_empty());
        let rules = outcome.stylesheet.rules;
        assert_eq!(rules.len(), 3);
        match &rules[2] {
            Rule::At(at) => match &at.body {
                AtBody::Declarations(decls) => assert_eq!(decls.len(), 2),
                other => panic!("expected declarations, got {other:?}"),
            },
            Rule::Style(_) => panic!("expected an at-rule"),
        }
    }

    #[test]
    fn keyframes_parse_as_nested_rules() {
        let outcome = parse_css("@keyframes spin { from { left: 0 } 50%, 75% { left: 5px } }");
        match &outcome.stylesheet.rules[0] {
            Rule::At(at) => match &at.body {
                AtBody::Rules(rules) => {
                    assert_eq!(rules.len(), 2);
                    match &rules[1] {
                        Rule::Style(frame) => assert_eq!(frame.selectors, vec!["50%", "75%"]),
                        Rule::At(_) => panic!("expected keyframe block"),
                    }
                }
                other => panic!("expected keyframe rules, got {other:?}"),
            },
            Rule::Style(_) => panic!("expected an at-rule"),
        }
    }

    #[test]
    fn strings_and_functions_are_opaque_to_splitting() {
        let rules = style_rules("a[title=\"x, y\"] { background: url(\"a),b.png\") }");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selectors, vec!["a[title=\"x, y\"]"]);
        assert_eq!(rules[0].declarations[0].value, "url(\"a),b.png\")");
    }

    #[test]
    fn unterminated_block_still_yields_the_rule() {
        let outcome = parse_css(".a { color: red");
        assert_eq!(outcome.stylesheet.rules.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn serialization_round_trips_structure() {
        let css = "a, .b { color: red; }\n@media print {\n  #c { top: 0; }\n}\n";
        let outcome = parse_css(css);
        assert!(outcome.diagnostics.is_empty());
        let serialized = outcome.stylesheet.to_css();
        // Serialization is a fixed point: reparsing it serializes identically.
        let reparsed = parse_css(&serialized);
        assert!(reparsed.diagnostics.is_empty());
        assert_eq!(reparsed.stylesheet.to_css(), serialized);
    }
}
