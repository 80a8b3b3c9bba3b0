//! Grammar engine for CSS, Less and SCSS.
//!
//! Recursive descent over the adapter's token stream. A production either
//! succeeds, records a diagnostic and fails with a recoverable signal, or
//! fails fatally when the document ends inside a block. Recovery points scan
//! forward to a small set of sync tokens and carry on.

use csslint_lexer::{Dialect, RawToken};

use crate::classifier::Classifier;
use crate::diagnostics::{Diagnostic, DiagnosticCollector, Severity};
use crate::tokenizer::{Token, Tokenizer};
use crate::LintError;

/// Where the parser is relative to the `@charset` / `@import` preamble.
///
/// Only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Region {
    #[default]
    AtStart,
    SawCharset,
    SawImport,
    SawOther,
}

/// Why a production stopped early.
#[derive(Debug)]
enum Signal {
    /// A diagnostic was recorded; the nearest recovery point resynchronizes.
    Recoverable,
    Fatal(LintError),
}

impl From<LintError> for Signal {
    fn from(error: LintError) -> Self {
        Signal::Fatal(error)
    }
}

type ParseResult<T> = Result<T, Signal>;

/// Loops that must consume at least one token per iteration.
#[derive(Debug, Clone, Copy)]
enum Site {
    RuleList,
    Declarations,
    Selector,
    Expression,
}

impl Site {
    const COUNT: usize = 4;

    fn name(self) -> &'static str {
        match self {
            Site::RuleList => "rule list",
            Site::Declarations => "declaration block",
            Site::Selector => "selector",
            Site::Expression => "expression",
        }
    }
}

/// Last token each loop site started an iteration with.
#[derive(Debug, Default)]
struct ProgressGuard {
    last_seen: [Option<usize>; Site::COUNT],
}

impl ProgressGuard {
    fn check(&mut self, site: Site, token: &Token) -> Result<(), LintError> {
        let slot = &mut self.last_seen[site as usize];
        if *slot == Some(token.seq()) {
            return Err(LintError::NoProgress {
                site: site.name(),
                line: token.start_line,
                column: token.start_column,
            });
        }
        *slot = Some(token.seq());
        Ok(())
    }
}

/// Error-recovering stylesheet grammar checker.
///
/// Owns the token stream and the diagnostic collector for one document.
/// Call [`parse`](Parser::parse) once, then take the diagnostics.
pub struct Parser<I: Iterator<Item = RawToken>> {
    tokenizer: Tokenizer<I>,
    classifier: Classifier,
    diagnostics: DiagnosticCollector,
    dialect: Dialect,
    region: Region,
    guard: ProgressGuard,
    function_depth: usize,
    declaration_depth: usize,
}

impl<I: Iterator<Item = RawToken>> Parser<I> {
    pub fn new(tokenizer: Tokenizer<I>, classifier: Classifier, dialect: Dialect) -> Self {
        Self {
            tokenizer,
            classifier,
            diagnostics: DiagnosticCollector::new(),
            dialect,
            region: Region::AtStart,
            guard: ProgressGuard::default(),
            function_depth: 0,
            declaration_depth: 0,
        }
    }

    /// Check the whole stream.
    ///
    /// Grammar problems become diagnostics; an `Err` means checking stopped
    /// early. Diagnostics recorded before the fault are kept either way.
    pub fn parse(&mut self) -> Result<(), LintError> {
        match self.parse_top_level() {
            Ok(()) | Err(Signal::Recoverable) => Ok(()),
            Err(Signal::Fatal(error)) => Err(error),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_diagnostics()
    }

    fn parse_top_level(&mut self) -> ParseResult<()> {
        self.parse_rule_list(false)
    }

    // =========================================================================
    // Rule lists
    // =========================================================================

    /// Rulesets and at-rules until end of file, or until `}` when `nested`.
    fn parse_rule_list(&mut self, nested: bool) -> ParseResult<()> {
        loop {
            let tok = self.next_token();
            self.guard.check(Site::RuleList, &tok)?;

            if tok.is_eof() {
                if nested {
                    return Err(self.unterminated(&tok));
                }
                return Ok(());
            }
            if nested && self.is_op(&tok, "}") {
                return Ok(());
            }

            let result = if self.is_op(&tok, "@") {
                self.parse_directive(tok)
            } else if self.dialect == Dialect::Scss && self.classifier.is_variable(&tok) {
                self.parse_variable_declaration(tok)
            } else {
                self.advance_region(Region::SawOther);
                self.tokenizer.put_back(tok);
                self.parse_ruleset()
            };

            match result {
                Ok(()) => {}
                Err(Signal::Recoverable) => {
                    let sync = self.recover(!nested, &["{", "}", "@"])?;
                    if sync.is_eof() {
                        return Ok(());
                    }
                    if self.is_op(&sync, "{") {
                        // A broken selector: check its block anyway.
                        self.tokenizer.put_back(sync);
                        self.parse_declarations()?;
                    } else if self.is_op(&sync, "}") {
                        if nested {
                            return Ok(());
                        }
                    } else {
                        self.tokenizer.put_back(sync);
                    }
                }
                Err(fatal) => return Err(fatal),
            }
        }
    }

    // =========================================================================
    // At-rules
    // =========================================================================

    /// `@` has been consumed; dispatch on the directive name.
    fn parse_directive(&mut self, at: Token) -> ParseResult<()> {
        let name = self.next_token();
        if !self.classifier.is_directive(&name) {
            if !name.is_eof() && at.touches(&name) {
                let message = format!("expecting a directive name, got {}", describe(&name));
                return Err(self.reject(name, message));
            }
            self.record(&at, "expecting a directive immediately after @", Severity::Error);
            self.tokenizer.put_back(name);
            return Err(Signal::Recoverable);
        }

        match name.text.to_ascii_lowercase().as_str() {
            "charset" => self.parse_charset(&name),
            "import" => self.parse_import(&name),
            "namespace" => {
                self.advance_region(Region::SawImport);
                self.parse_namespace()
            }
            "media" => {
                self.advance_region(Region::SawOther);
                self.parse_media()
            }
            "page" => {
                self.advance_region(Region::SawOther);
                self.parse_page()
            }
            "font-face" => {
                self.advance_region(Region::SawOther);
                self.parse_declarations()
            }
            "supports" | "document" | "-moz-document" => {
                self.advance_region(Region::SawOther);
                self.skip_to_block()?;
                self.parse_block_body()
            }
            keyframes if keyframes.ends_with("keyframes") => {
                self.advance_region(Region::SawOther);
                self.parse_keyframes()
            }
            _ => self.parse_unknown_directive(),
        }
    }

    /// ```text
    /// @charset "UTF-8";
    /// ```
    fn parse_charset(&mut self, name: &Token) -> ParseResult<()> {
        if self.region != Region::AtStart {
            self.record(name, "@charset allowed only at start of file", Severity::Warning);
        }
        self.advance_region(Region::SawCharset);

        let tok = self.next_token();
        if !self.classifier.is_string(&tok) {
            let message = format!("expecting a string after @charset, got {}", describe(&tok));
            return Err(self.reject(tok, message));
        }
        self.expect_semicolon()
    }

    /// ```text
    /// @import <string | url()> [media-query [, media-query]*];
    /// ```
    fn parse_import(&mut self, name: &Token) -> ParseResult<()> {
        if self.region > Region::SawImport {
            self.record(name, "@import allowed only before other rules", Severity::Warning);
        }
        self.advance_region(Region::SawImport);

        let mut tok = self.next_token();
        if self.dialect == Dialect::Less && self.is_op(&tok, "(") {
            // (reference), (css), ...
            self.skip_parenthesized(tok)?;
            tok = self.next_token();
        }
        if !(self.classifier.is_string(&tok) || self.classifier.is_url(&tok)) {
            let message = format!(
                "expecting a string or url() after @import, got {}",
                describe(&tok)
            );
            return Err(self.reject(tok, message));
        }
        self.parse_identifier_list(false)?;
        self.expect_semicolon()
    }

    /// ```text
    /// @namespace [prefix] <string | url()>;
    /// ```
    fn parse_namespace(&mut self) -> ParseResult<()> {
        let mut tok = self.next_token();
        if !self.classifier.is_url(&tok) && self.is_name(&tok) {
            tok = self.next_token();
        }
        if !(self.classifier.is_string(&tok) || self.classifier.is_url(&tok)) {
            let message = format!(
                "expecting a string or url() after @namespace, got {}",
                describe(&tok)
            );
            return Err(self.reject(tok, message));
        }
        self.expect_semicolon()
    }

    fn parse_media(&mut self) -> ParseResult<()> {
        self.parse_identifier_list(true)?;
        self.parse_block_body()
    }

    /// ```text
    /// @page [:pseudo] { declarations }
    /// ```
    fn parse_page(&mut self) -> ParseResult<()> {
        let tok = self.next_token();
        if self.is_op(&tok, ":") {
            let name = self.next_token();
            if !(tok.touches(&name) && self.is_name(&name)) {
                let message = format!("expecting a page selector after ':', got {}", describe(&name));
                return Err(self.reject(name, message));
            }
        } else {
            self.tokenizer.put_back(tok);
        }
        self.parse_declarations()
    }

    /// ```text
    /// @keyframes name { [selector [, selector]* { declarations }]* }
    /// ```
    fn parse_keyframes(&mut self) -> ParseResult<()> {
        let name = self.next_token();
        let named = self.is_name(&name)
            || self.classifier.is_string(&name)
            || (self.dialect.allows_nesting() && self.classifier.is_variable(&name));
        if !named {
            let message = format!("expecting a keyframes name, got {}", describe(&name));
            return Err(self.reject(name, message));
        }

        let open = self.next_token();
        if !self.is_op(&open, "{") {
            let message = format!("expecting '{{', got {}", describe(&open));
            return Err(self.reject(open, message));
        }

        loop {
            let tok = self.next_token();
            self.guard.check(Site::RuleList, &tok)?;
            if tok.is_eof() {
                return Err(self.unterminated(&tok));
            }
            if self.is_op(&tok, "}") {
                return Ok(());
            }
            self.tokenizer.put_back(tok);

            match self.parse_keyframe_block() {
                Ok(()) => {}
                Err(Signal::Recoverable) => {
                    let sync = self.recover(false, &["{", "}"])?;
                    if !self.is_op(&sync, "{") {
                        return Ok(());
                    }
                    self.tokenizer.put_back(sync);
                    self.parse_declarations()?;
                }
                Err(fatal) => return Err(fatal),
            }
        }
    }

    /// `from`, `to` or percentages, comma-separated, then a block.
    fn parse_keyframe_block(&mut self) -> ParseResult<()> {
        loop {
            let tok = self.next_token();
            if !(self.classifier.is_number(&tok) || self.is_name(&tok)) {
                let message = format!("expecting a keyframe selector, got {}", describe(&tok));
                return Err(self.reject(tok, message));
            }
            let sep = self.next_token();
            if !self.is_op(&sep, ",") {
                self.tokenizer.put_back(sep);
                break;
            }
        }
        self.parse_declarations()
    }

    /// Less `@name: value;`, or an at-rule this checker does not know.
    fn parse_unknown_directive(&mut self) -> ParseResult<()> {
        let tok = self.next_token();
        if self.dialect == Dialect::Less && self.is_op(&tok, ":") {
            return self.parse_variable_value();
        }
        self.advance_region(Region::SawOther);
        self.tokenizer.put_back(tok);
        self.skip_directive()
    }

    /// Skip an unknown at-rule to its `;`, or through its block.
    ///
    /// In Less and SCSS the block is checked as declarations (`@mixin`,
    /// `@include`, `@if` and friends hold declarations and nested rules).
    fn skip_directive(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            let tok = self.next_token();
            if tok.is_eof() {
                self.tokenizer.put_back(tok);
                return Ok(());
            }
            if self.is_op(&tok, "(") {
                depth += 1;
            } else if self.is_op(&tok, ")") {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && self.is_op(&tok, ";") {
                return Ok(());
            } else if depth == 0 && self.is_op(&tok, "}") {
                self.tokenizer.put_back(tok);
                return Ok(());
            } else if depth == 0 && self.is_op(&tok, "{") {
                self.tokenizer.put_back(tok);
                if self.dialect.allows_nesting() {
                    return self.parse_declarations();
                }
                return self.skip_block();
            }
        }
    }

    /// Consume a balanced `{ ... }` without checking it.
    fn skip_block(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            let tok = self.next_token();
            if tok.is_eof() {
                return Err(self.unterminated(&tok));
            }
            if self.is_op(&tok, "{") {
                depth += 1;
            } else if self.is_op(&tok, "}") {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(());
                }
            }
        }
    }

    /// Skip an unchecked prelude up to the next `{`, which is left unread.
    fn skip_to_block(&mut self) -> ParseResult<()> {
        loop {
            let tok = self.next_token();
            if self.is_op(&tok, "{") {
                self.tokenizer.put_back(tok);
                return Ok(());
            }
            if tok.is_eof() || self.classifier.is_operator_choose(&tok, &[";", "}"]) {
                let message = format!("expecting '{{', got {}", describe(&tok));
                return Err(self.reject(tok, message));
            }
        }
    }

    /// The block after a conditional at-rule prelude: rulesets at top
    /// level, declarations when the at-rule sits inside a ruleset.
    fn parse_block_body(&mut self) -> ParseResult<()> {
        if self.declaration_depth > 0 {
            return self.parse_declarations();
        }
        let tok = self.next_token();
        if !self.is_op(&tok, "{") {
            let message = format!("expecting '{{', got {}", describe(&tok));
            return Err(self.reject(tok, message));
        }
        self.parse_rule_list(true)
    }

    /// SCSS `$name: value;`; the variable has been consumed.
    fn parse_variable_declaration(&mut self, variable: Token) -> ParseResult<()> {
        let tok = self.next_token();
        if !self.is_op(&tok, ":") {
            let message = format!(
                "expecting ':' after variable '{}', got {}",
                variable.text,
                describe(&tok)
            );
            return Err(self.reject(tok, message));
        }
        self.parse_variable_value()
    }

    fn parse_variable_value(&mut self) -> ParseResult<()> {
        self.parse_expression()?;
        self.parse_priority()?;
        self.expect_terminator().map(|_| ())
    }

    // =========================================================================
    // Media queries
    // =========================================================================

    /// Comma-separated media queries for `@media` and `@import`.
    ///
    /// Returns whether at least one query was present.
    fn parse_identifier_list(&mut self, required: bool) -> ParseResult<bool> {
        let mut matched_any = false;
        loop {
            if !self.parse_media_query()? {
                let tok = self.next_token();
                if matched_any {
                    let message = format!("expecting a media query after ',', got {}", describe(&tok));
                    return Err(self.reject(tok, message));
                }
                if required {
                    let message = format!("expecting a media type, got {}", describe(&tok));
                    return Err(self.reject(tok, message));
                }
                self.tokenizer.put_back(tok);
                return Ok(false);
            }
            matched_any = true;

            let tok = self.next_token();
            if !self.is_op(&tok, ",") {
                self.tokenizer.put_back(tok);
                return Ok(true);
            }
        }
    }

    /// `screen and (min-width: 100px)`: words and parenthesized features.
    fn parse_media_query(&mut self) -> ParseResult<bool> {
        let mut matched = false;
        loop {
            let tok = self.next_token();
            let word = self.is_name(&tok)
                || (self.dialect.allows_nesting() && self.classifier.is_variable(&tok))
                || (self.dialect == Dialect::Scss && self.classifier.is_string(&tok));
            if word {
                matched = true;
            } else if self.is_op(&tok, "(") {
                self.parse_media_feature()?;
                matched = true;
            } else {
                self.tokenizer.put_back(tok);
                return Ok(matched);
            }
        }
    }

    /// ```text
    /// ( name [: expression] )
    /// ```
    fn parse_media_feature(&mut self) -> ParseResult<()> {
        let name = self.next_token();
        if !self.is_name(&name) {
            let message = format!("expecting a media feature name, got {}", describe(&name));
            return Err(self.reject(name, message));
        }
        let mut tok = self.next_token();
        if self.is_op(&tok, ":") {
            self.parse_expression()?;
            tok = self.next_token();
        }
        if !self.is_op(&tok, ")") {
            let message = format!("expecting ')' after media feature, got {}", describe(&tok));
            return Err(self.reject(tok, message));
        }
        Ok(())
    }

    // =========================================================================
    // Rulesets and selectors
    // =========================================================================

    /// ```text
    /// selector [, selector]* { declarations }
    /// ```
    fn parse_ruleset(&mut self) -> ParseResult<()> {
        self.parse_selector()?;
        if self.dialect == Dialect::Less && self.parse_mixin_tail()? {
            return Ok(());
        }
        loop {
            let tok = self.next_token();
            if !self.is_op(&tok, ",") {
                self.tokenizer.put_back(tok);
                break;
            }
            self.parse_selector()?;
        }
        self.parse_declarations()
    }

    /// Less mixin forms after a selector: `.m;`, `.m(args);` and
    /// `.m(@a) [when (guard)] { ... }`. Returns whether one was consumed.
    fn parse_mixin_tail(&mut self) -> ParseResult<bool> {
        let tok = self.next_token();
        if self.is_op(&tok, ";") {
            return Ok(true);
        }
        if !self.is_op(&tok, "(") {
            self.tokenizer.put_back(tok);
            return Ok(false);
        }
        self.skip_parenthesized(tok)?;

        let tok = self.next_token();
        if self.is_op(&tok, "{") {
            self.tokenizer.put_back(tok);
            self.parse_declarations()?;
            return Ok(true);
        }
        if self.is_word(&tok, "when") {
            self.skip_to_block()?;
            self.parse_declarations()?;
            return Ok(true);
        }
        self.tokenizer.put_back(tok);
        self.parse_priority()?;
        self.expect_terminator()?;
        Ok(true)
    }

    /// ```text
    /// simple_selector [combinator? simple_selector]*
    /// ```
    fn parse_selector(&mut self) -> ParseResult<()> {
        if self.dialect.allows_nesting() {
            // `> a`, `+ b` relative to the parent rule.
            let tok = self.next_token();
            if !self.is_combinator(&tok) {
                self.tokenizer.put_back(tok);
            }
        }

        self.parse_simple_selector(true)?;
        loop {
            let tok = self.next_token();
            self.guard.check(Site::Selector, &tok)?;
            if self.is_combinator(&tok) {
                self.parse_simple_selector(true)?;
                continue;
            }
            self.tokenizer.put_back(tok);
            if !self.parse_simple_selector(false)? {
                return Ok(());
            }
        }
    }

    /// A run of adjacent selector fragments: `a.b#c:hover[x]`.
    ///
    /// Returns whether anything matched; when `required` and nothing did, a
    /// diagnostic is recorded instead.
    fn parse_simple_selector(&mut self, required: bool) -> ParseResult<bool> {
        let mut last: Option<Token> = None;
        loop {
            let tok = self.next_token();
            if last.as_ref().is_some_and(|prev| !prev.touches(&tok)) {
                self.tokenizer.put_back(tok);
                break;
            }
            let first = last.is_none();

            let end = if first && self.classifier.is_tag(&tok) {
                tok
            } else if first && self.classifier.is_identifier(&tok) {
                let message = format!("treating unrecognized name '{}' as a tag name", tok.text);
                self.record(&tok, message, Severity::Warning);
                tok
            } else if self.classifier.is_special_identifier(&tok) {
                tok
            } else if self.classifier.is_operator_choose(&tok, &[".", "#"]) {
                self.parse_selector_name(tok)?
            } else if self.dialect == Dialect::Scss && self.is_op(&tok, "%") {
                // `%placeholder`, only reachable through `@extend`.
                self.parse_selector_name(tok)?
            } else if self.is_op(&tok, ":") {
                self.parse_pseudo(tok)?
            } else if self.is_op(&tok, "[") {
                self.parse_attribute(tok)?
            } else if self.dialect.allows_nesting() && self.is_op(&tok, "&") {
                tok
            } else if self.dialect.allows_nesting() && self.is_interpolation(&tok) {
                self.parse_interpolation(tok)?
            } else {
                self.tokenizer.put_back(tok);
                break;
            };
            last = Some(end);
        }

        if last.is_none() && required {
            let tok = self.next_token();
            let message = format!("expecting a selector, got {}", describe(&tok));
            return Err(self.reject(tok, message));
        }
        Ok(last.is_some())
    }

    /// The name glued to a `.` or `#`.
    fn parse_selector_name(&mut self, op: Token) -> ParseResult<Token> {
        let tok = self.next_token();
        if op.touches(&tok) {
            if self.is_name(&tok) {
                return Ok(tok);
            }
            if self.dialect.allows_nesting() && self.is_interpolation(&tok) {
                return self.parse_interpolation(tok);
            }
            if self.dialect == Dialect::Scss && self.is_op(&op, "#") && self.is_op(&tok, "{") {
                return self.parse_interpolation(tok);
            }
        }
        let message = format!("expecting a name after '{}', got {}", op.text, describe(&tok));
        Err(self.reject(tok, message))
    }

    /// `:name`, `::name` or `:name(...)`; the first `:` has been consumed.
    fn parse_pseudo(&mut self, colon: Token) -> ParseResult<Token> {
        let mut prev = colon;
        let mut tok = self.next_token();
        if self.is_op(&tok, ":") && prev.touches(&tok) {
            prev = tok;
            tok = self.next_token();
        }
        if !(prev.touches(&tok) && self.is_name(&tok)) {
            let message = format!("expecting a pseudo-class name after ':', got {}", describe(&tok));
            return Err(self.reject(tok, message));
        }

        let open = self.next_token();
        if self.is_op(&open, "(") && tok.touches(&open) {
            return self.skip_parenthesized(open);
        }
        self.tokenizer.put_back(open);
        Ok(tok)
    }

    /// ```text
    /// [ name [ (= | ~= | |= | ^= | $= | *=) value ] ]
    /// ```
    ///
    /// Each missing piece is reported and checking continues through the
    /// bracket.
    fn parse_attribute(&mut self, open: Token) -> ParseResult<Token> {
        let name = self.next_token();
        if !(self.classifier.is_attribute(&name) || self.is_name(&name)) {
            let message = format!("expecting an attribute name, got {}", describe(&name));
            self.record(&name, message, Severity::Error);
            self.tokenizer.put_back(name);
        }

        if let Some(op) = self.parse_attribute_operator() {
            let value = self.next_token();
            let valid = self.classifier.is_string(&value)
                || self.classifier.is_number(&value)
                || self.classifier.is_attribute(&value)
                || self.is_name(&value);
            if !valid {
                let message = format!(
                    "expecting a value after '{}', got {}",
                    op.text,
                    describe(&value)
                );
                self.record(&value, message, Severity::Error);
                self.tokenizer.put_back(value);
            }
        }

        let mut tok = self.next_token();
        if self.is_op(&tok, "]") {
            return Ok(tok);
        }
        let message = format!("expecting ']', got {}", describe(&tok));
        self.record(&tok, message, Severity::Error);
        loop {
            if self.is_op(&tok, "]") {
                return Ok(tok);
            }
            if tok.is_eof() || self.classifier.is_operator_choose(&tok, &["{", "}"]) {
                self.tokenizer.put_back(tok);
                return Ok(open);
            }
            tok = self.next_token();
        }
    }

    /// Consumes a match operator if one is next.
    fn parse_attribute_operator(&mut self) -> Option<Token> {
        let tok = self.next_token();
        if self.classifier.is_operator_choose(&tok, &["=", "~=", "|="]) {
            return Some(tok);
        }
        if !self.classifier.is_operator_choose(&tok, &["^", "$", "*"]) {
            self.tokenizer.put_back(tok);
            return None;
        }

        let eq = self.next_token();
        if self.is_op(&eq, "=") && tok.touches(&eq) {
            let mut op = Token::new(tok.style, format!("{}=", tok.text), tok.start_line, tok.start_column);
            op.end_column = eq.end_column;
            return Some(op);
        }
        let message = format!("expecting '=' after '{}', got {}", tok.text, describe(&eq));
        self.record(&eq, message, Severity::Error);
        self.tokenizer.put_back(eq);
        Some(tok)
    }

    /// `@{name}`, `${name}` or SCSS `#{expr}`; the opening token has been
    /// consumed. Returns the closing `}`.
    fn parse_interpolation(&mut self, open: Token) -> ParseResult<Token> {
        let mut empty = true;
        loop {
            let tok = self.next_token();
            if !empty && self.is_op(&tok, "}") {
                return Ok(tok);
            }
            if tok.is_eof() || self.classifier.is_operator_choose(&tok, &["{", "}", ";"]) {
                let message = if empty {
                    format!("expecting a name after '{}', got {}", open.text, describe(&tok))
                } else {
                    format!("expecting '}}' to close '{}', got {}", open.text, describe(&tok))
                };
                return Err(self.reject(tok, message));
            }
            empty = false;
        }
    }

    /// Skip balanced parentheses; `open` has been consumed. Returns the
    /// closing `)`.
    fn skip_parenthesized(&mut self, open: Token) -> ParseResult<Token> {
        let mut depth = 1usize;
        loop {
            let tok = self.next_token();
            if tok.is_eof() || self.classifier.is_operator_choose(&tok, &["{", "}", ";"]) {
                let message = format!(
                    "expecting ')' to match '(' at column {}, got {}",
                    open.start_column + 1,
                    describe(&tok)
                );
                return Err(self.reject(tok, message));
            }
            if self.is_op(&tok, "(") {
                depth += 1;
            } else if self.is_op(&tok, ")") {
                depth -= 1;
                if depth == 0 {
                    return Ok(tok);
                }
            }
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// ```text
    /// { [declaration | ;]* }
    /// ```
    fn parse_declarations(&mut self) -> ParseResult<()> {
        let open = self.next_token();
        if !self.is_op(&open, "{") {
            let message = format!("expecting '{{', got {}", describe(&open));
            return Err(self.reject(open, message));
        }
        self.declaration_depth += 1;
        let result = self.parse_declaration_list();
        self.declaration_depth -= 1;
        result
    }

    fn parse_declaration_list(&mut self) -> ParseResult<()> {
        loop {
            let tok = self.next_token();
            self.guard.check(Site::Declarations, &tok)?;

            if tok.is_eof() {
                return Err(self.unterminated(&tok));
            }
            if self.is_op(&tok, "}") {
                return Ok(());
            }
            if self.is_op(&tok, ";") {
                continue;
            }
            self.tokenizer.put_back(tok);

            match self.parse_declaration() {
                Ok(_) => {}
                Err(Signal::Recoverable) => {
                    let sync = self.recover(false, &[";", "{", "}"])?;
                    if self.is_op(&sync, "{") {
                        self.tokenizer.put_back(sync);
                        self.parse_declarations()?;
                    } else if self.is_op(&sync, "}") {
                        self.tokenizer.put_back(sync);
                    }
                }
                Err(fatal) => return Err(fatal),
            }
        }
    }

    /// ```text
    /// property : expression [!important] [;]
    /// ```
    ///
    /// Returns `true` when the declaration ended with its own `;`; the last
    /// declaration of a block may omit it.
    fn parse_declaration(&mut self) -> ParseResult<bool> {
        let tok = self.next_token();

        if self.dialect.allows_nesting() {
            if self.is_op(&tok, "@") {
                self.parse_directive(tok)?;
                return Ok(true);
            }
            if self.classifier.is_variable(&tok) {
                self.parse_variable_declaration(tok)?;
                return Ok(true);
            }
            if self.starts_nested_rule(&tok) {
                self.tokenizer.put_back(tok);
                self.parse_ruleset()?;
                return Ok(true);
            }
        }

        if !self.classifier.is_identifier(&tok) {
            let message = format!("expecting a property name, got {}", describe(&tok));
            return Err(self.reject(tok, message));
        }

        let colon = self.next_token();
        if !self.is_op(&colon, ":") {
            let message = format!(
                "expecting ':' after '{}', got {}",
                tok.text,
                describe(&colon)
            );
            return Err(self.reject(colon, message));
        }

        self.parse_expression()?;
        self.parse_priority()?;
        self.expect_terminator()
    }

    /// ```text
    /// [! important]
    /// ```
    ///
    /// SCSS also allows `!default`, `!global` and `!optional` flags.
    fn parse_priority(&mut self) -> ParseResult<()> {
        loop {
            let tok = self.next_token();
            if self.classifier.is_important(&tok, "!important") {
                return Ok(());
            }
            if !self.is_op(&tok, "!") {
                self.tokenizer.put_back(tok);
                return Ok(());
            }

            let word = self.next_token();
            if self.classifier.is_important(&word, "important") || self.is_word(&word, "important") {
                return Ok(());
            }
            let scss_flag = self.dialect == Dialect::Scss
                && ["default", "global", "optional"]
                    .iter()
                    .any(|flag| self.is_word(&word, flag));
            if !scss_flag {
                let message = format!("expecting 'important' after '!', got {}", describe(&word));
                return Err(self.reject(word, message));
            }
        }
    }

    /// `;`, or an unread `}` / end of file. Returns whether `;` was there.
    fn expect_terminator(&mut self) -> ParseResult<bool> {
        let tok = self.next_token();
        if self.is_op(&tok, ";") {
            return Ok(true);
        }
        if tok.is_eof() || self.is_op(&tok, "}") {
            self.tokenizer.put_back(tok);
            return Ok(false);
        }
        let message = format!("expecting ';', got {}", describe(&tok));
        Err(self.reject(tok, message))
    }

    fn expect_semicolon(&mut self) -> ParseResult<()> {
        let tok = self.next_token();
        if self.is_op(&tok, ";") {
            return Ok(());
        }
        let message = format!("expecting ';', got {}", describe(&tok));
        Err(self.reject(tok, message))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// ```text
    /// term [operator? term]*
    /// ```
    fn parse_expression(&mut self) -> ParseResult<()> {
        if !self.parse_term()? {
            let tok = self.next_token();
            let message = format!("expecting a value, got {}", describe(&tok));
            return Err(self.reject(tok, message));
        }

        loop {
            let tok = self.next_token();
            self.guard.check(Site::Expression, &tok)?;
            self.tokenizer.put_back(tok);

            let operator = self.parse_operator();
            if self.parse_term()? {
                continue;
            }
            if let Some(operator) = operator {
                let tok = self.next_token();
                let message = format!(
                    "expecting a value after '{}', got {}",
                    operator.text,
                    describe(&tok)
                );
                return Err(self.reject(tok, message));
            }
            return Ok(());
        }
    }

    /// `,` or `/` between terms. Whitespace separation consumes nothing.
    fn parse_operator(&mut self) -> Option<Token> {
        let tok = self.next_token();
        let accepted = self.classifier.is_operator_choose(&tok, &[",", "/"])
            || (self.function_depth > 0 && self.classifier.is_operator_choose(&tok, &["=", "*"]))
            || (self.dialect.allows_nesting() && self.classifier.is_operator_choose(&tok, &["*", "%"]));
        if accepted {
            return Some(tok);
        }
        self.tokenizer.put_back(tok);
        None
    }

    /// ```text
    /// [+|-] number | string | url() | #hex | name[.name]*[(expression)]
    /// ```
    ///
    /// Returns `false`, with nothing consumed, when no term starts here.
    fn parse_term(&mut self) -> ParseResult<bool> {
        let mut tok = self.next_token();

        let mut sign = None;
        if self.classifier.is_operator_choose(&tok, &["+", "-"]) {
            let after = self.next_token();
            sign = Some(std::mem::replace(&mut tok, after));
        }

        if self.classifier.is_number(&tok) {
            return Ok(true);
        }

        if let Some(sign) = sign {
            // Less/SCSS `-$x` and `-(...)`, CSS `calc(a - var(--b))`.
            let lenient = self.dialect.allows_nesting() || self.function_depth > 0;
            if lenient && !self.classifier.is_operator_choose(&tok, &["+", "-"]) {
                self.tokenizer.put_back(tok);
                if self.parse_term()? {
                    return Ok(true);
                }
                tok = self.next_token();
            }
            let message = format!("expecting a number after '{}', got {}", sign.text, describe(&tok));
            return Err(self.reject(tok, message));
        }

        if self.classifier.is_string(&tok) {
            return Ok(true);
        }
        if self.classifier.is_stringeol(&tok) {
            self.record(&tok, "missing string close-quote", Severity::Error);
            return Ok(true);
        }

        if self.classifier.is_value(&tok, None) {
            if tok.text.get(..4).is_some_and(|prefix| prefix.eq_ignore_ascii_case("url(")) {
                if !self.classifier.is_url(&tok) {
                    self.record(&tok, "missing ')' in url()", Severity::Error);
                }
                return Ok(true);
            }
            if tok.text.starts_with('#') {
                if !self.classifier.is_hex_color(&tok) {
                    let message = format!("invalid hex color '{}'", tok.text);
                    self.record(&tok, message, Severity::Error);
                }
                return Ok(true);
            }
        }

        if self.classifier.is_value(&tok, None) || self.classifier.is_identifier(&tok) {
            self.parse_function_or_identifier(tok)?;
            return Ok(true);
        }

        if self.dialect.allows_nesting() {
            if self.classifier.is_variable(&tok) {
                return Ok(true);
            }
            if self.is_interpolation(&tok) {
                self.parse_interpolation(tok)?;
                return Ok(true);
            }
            if self.is_op(&tok, "(") {
                self.parse_arguments(tok)?;
                return Ok(true);
            }
            if self.dialect == Dialect::Less && self.is_op(&tok, "~") {
                let escaped = self.next_token();
                if !self.classifier.is_string(&escaped) {
                    let message = format!("expecting a string after '~', got {}", describe(&escaped));
                    return Err(self.reject(escaped, message));
                }
                return Ok(true);
            }
            if self.dialect == Dialect::Scss && self.is_op(&tok, "#") {
                let open = self.next_token();
                if !(self.is_op(&open, "{") && tok.touches(&open)) {
                    let message = format!("expecting '{{' after '#', got {}", describe(&open));
                    return Err(self.reject(open, message));
                }
                self.parse_interpolation(open)?;
                return Ok(true);
            }
        }

        self.tokenizer.put_back(tok);
        Ok(false)
    }

    /// A name, optionally joined with `.` (and `:` after `progid`) into a
    /// dotted path, optionally called with `( expression )`.
    fn parse_function_or_identifier(&mut self, name: Token) -> ParseResult<()> {
        let mut last = name;
        loop {
            let tok = self.next_token();
            let joins = last.touches(&tok)
                && (self.is_op(&tok, ".")
                    || (self.is_op(&tok, ":") && last.text.eq_ignore_ascii_case("progid")));
            if !joins {
                self.tokenizer.put_back(tok);
                break;
            }

            let part = self.next_token();
            let named = tok.touches(&part)
                && (self.classifier.is_value(&part, None) || self.classifier.is_identifier(&part));
            if !named {
                let message = format!("expecting a name after '{}', got {}", tok.text, describe(&part));
                return Err(self.reject(part, message));
            }
            last = part;
        }

        let open = self.next_token();
        if !(self.is_op(&open, "(") && last.touches(&open)) {
            self.tokenizer.put_back(open);
            return Ok(());
        }
        self.parse_arguments(open)
    }

    /// `( [expression] )`; `open` has been consumed.
    fn parse_arguments(&mut self, open: Token) -> ParseResult<()> {
        let tok = self.next_token();
        if self.is_op(&tok, ")") {
            return Ok(());
        }
        self.tokenizer.put_back(tok);

        self.function_depth += 1;
        let result = self.parse_expression();
        self.function_depth -= 1;
        result?;

        let close = self.next_token();
        if !self.is_op(&close, ")") {
            let message = format!(
                "expecting ')' to match '(' at column {}, got {}",
                open.start_column + 1,
                describe(&close)
            );
            return Err(self.reject(close, message));
        }
        Ok(())
    }

    // =========================================================================
    // Recovery and reporting
    // =========================================================================

    /// Discard tokens until one in `sync`, which is returned consumed.
    ///
    /// End of file stops recovery when `allow_eof`; otherwise the document
    /// ended inside a block and checking cannot continue.
    fn recover(&mut self, allow_eof: bool, sync: &[&str]) -> ParseResult<Token> {
        loop {
            let tok = self.next_token();
            if tok.is_eof() {
                if allow_eof {
                    return Ok(tok);
                }
                return Err(self.unterminated(&tok));
            }
            if self.classifier.is_operator_choose(&tok, sync) {
                tracing::debug!(
                    sync = %tok.text,
                    line = tok.start_line,
                    column = tok.start_column,
                    "resynchronized"
                );
                return Ok(tok);
            }
        }
    }

    fn record(&mut self, token: &Token, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        tracing::debug!(
            line = token.start_line,
            column = token.start_column,
            %severity,
            %message,
            "grammar problem"
        );
        if token.is_eof() {
            self.diagnostics
                .record_at_eof(message, token.start_line, token.start_column, severity);
        } else {
            self.diagnostics.record(message, token.span(), severity);
        }
    }

    /// Record an error at `token`, unread it, and unwind to the nearest
    /// recovery point. `token` must be the most recently read one.
    fn reject(&mut self, token: Token, message: impl Into<String>) -> Signal {
        self.record(&token, message, Severity::Error);
        self.tokenizer.put_back(token);
        Signal::Recoverable
    }

    fn unterminated(&mut self, eof: &Token) -> Signal {
        self.record(eof, "missing '}' before end of file", Severity::Error);
        Signal::Fatal(LintError::UnterminatedInput {
            line: eof.start_line,
            column: eof.start_column,
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn next_token(&mut self) -> Token {
        self.tokenizer.get_next_token()
    }

    fn advance_region(&mut self, to: Region) {
        if to > self.region {
            self.region = to;
        }
    }

    fn is_op(&self, token: &Token, text: &str) -> bool {
        self.classifier.is_operator(token, Some(text))
    }

    fn is_combinator(&self, token: &Token) -> bool {
        self.classifier.is_operator_choose(token, &["+", ">", "~"])
    }

    fn is_interpolation(&self, token: &Token) -> bool {
        self.classifier.is_operator_choose(token, &["@{", "${"])
    }

    /// Anything word-like: selector names, property names, values.
    fn is_name(&self, token: &Token) -> bool {
        self.classifier.is_tag(token)
            || self.classifier.is_special_identifier(token)
            || self.classifier.is_identifier(token)
            || self.classifier.is_value(token, None)
    }

    /// A word-like token spelled `word`, ignoring ASCII case.
    fn is_word(&self, token: &Token, word: &str) -> bool {
        !self.classifier.is_operator(token, None)
            && self.is_name(token)
            && token.text.eq_ignore_ascii_case(word)
    }

    /// Tokens that open a ruleset nested in a Less/SCSS declaration block.
    fn starts_nested_rule(&self, token: &Token) -> bool {
        (self.dialect == Dialect::Scss && self.is_op(token, "%"))
            || self.classifier.is_tag(token)
            || self.classifier.is_special_identifier(token)
            || self.classifier.is_operator_choose(
                token,
                &[".", "#", ":", "[", "&", ">", "+", "~", "@{", "${"],
            )
    }
}

fn describe(token: &Token) -> String {
    if token.is_eof() {
        "end of file".to_string()
    } else {
        format!("'{}'", token.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csslint_lexer::{Scanner, Style};
    use pretty_assertions::assert_eq;

    fn run(source: &str, dialect: Dialect) -> (Vec<Diagnostic>, Result<(), LintError>, Region) {
        let classifier = Classifier::new();
        let tokens = Scanner::tokenize(source, dialect).into_iter();
        let mut parser = Parser::new(Tokenizer::new(tokens, classifier), classifier, dialect);
        let result = parser.parse();
        let region = parser.region();
        (parser.into_diagnostics(), result, region)
    }

    fn messages_in(source: &str, dialect: Dialect) -> Vec<String> {
        run(source, dialect).0.into_iter().map(|d| d.message).collect()
    }

    fn messages(source: &str) -> Vec<String> {
        messages_in(source, Dialect::Css)
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(messages(""), Vec::<String>::new());
        assert_eq!(messages("  /* only a comment */  "), Vec::<String>::new());
    }

    #[test]
    fn test_valid_stylesheet() {
        let source = r#"
a.b#c:hover, ul > li + li ~ p [href^="x"]::before {
  color: #fff;
  margin: 0 auto -1px;
  background: url(a.png) no-repeat;
  font: 12px/1.5 "Helvetica", sans-serif;
}
"#;
        assert_eq!(messages(source), Vec::<String>::new());
    }

    #[test]
    fn test_missing_selector() {
        assert_eq!(messages("{ color: red }"), vec!["expecting a selector, got '{'"]);
    }

    #[test]
    fn test_bad_property_name() {
        assert_eq!(
            messages("p { 12px: red; color: blue }"),
            vec!["expecting a property name, got '12px'"]
        );
    }

    #[test]
    fn test_missing_colon() {
        assert_eq!(
            messages("p { color red; }"),
            vec!["expecting ':' after 'color', got 'red'"]
        );
    }

    #[test]
    fn test_missing_value_reported_once_per_line() {
        assert_eq!(
            messages("p { color: ; margin: ; }"),
            vec!["expecting a value, got ';'"]
        );
    }

    #[test]
    fn test_sign_needs_number() {
        assert_eq!(
            messages("p { margin: - auto }"),
            vec!["expecting a number after '-', got 'auto'"]
        );
    }

    #[test]
    fn test_invalid_hex_color() {
        assert_eq!(messages("p { color: #ggg }"), vec!["invalid hex color '#ggg'"]);
    }

    #[test]
    fn test_priority() {
        assert_eq!(messages("p { color: red ! important }"), Vec::<String>::new());
        assert_eq!(
            messages("p { color: red !bogus }"),
            vec!["expecting 'important' after '!', got 'bogus'"]
        );
    }

    #[test]
    fn test_functions_and_filters() {
        let source = "p {\n  filter: progid:DXImageTransform.Microsoft.Alpha(Opacity=80);\n  width: calc(100% - 10px);\n  color: rgba(0, 0, 0, .5);\n}";
        assert_eq!(messages(source), Vec::<String>::new());
    }

    #[test]
    fn test_unclosed_url() {
        let (diagnostics, result, _) = run("p { background: url(a.png }", Dialect::Css);
        assert_eq!(diagnostics[0].message, "missing ')' in url()");
        assert!(matches!(result, Err(LintError::UnterminatedInput { .. })));
    }

    #[test]
    fn test_unterminated_block() {
        let (diagnostics, result, _) = run("p { color: red;", Dialect::Css);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_at_eof());
        assert_eq!(
            result,
            Err(LintError::UnterminatedInput { line: 0, column: 15 })
        );
    }

    #[test]
    fn test_unterminated_media_block() {
        let (_, result, _) = run("@media screen { p { color: red; }", Dialect::Css);
        assert!(matches!(result, Err(LintError::UnterminatedInput { .. })));
    }

    #[test]
    fn test_directive_gap() {
        let (diagnostics, _, _) = run("@ media screen {}", Dialect::Css);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "expecting a directive immediately after @");
        assert_eq!(diagnostics[0].col_start, Some(0));

        let (diagnostics, _, _) = run("@1x {}", Dialect::Css);
        assert_eq!(diagnostics[0].message, "expecting a directive name, got '1x'");
        assert_eq!(diagnostics[0].col_start, Some(1));
    }

    #[test]
    fn test_charset_placement() {
        assert_eq!(messages("@charset \"UTF-8\"; p {}"), Vec::<String>::new());

        let (diagnostics, _, _) = run("p{} @charset \"UTF-8\";", Dialect::Css);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "@charset allowed only at start of file");
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_import_placement() {
        let (diagnostics, _, region) = run(
            "@charset \"x\";\n@import url(a.css) screen, print;\n@import \"b.css\";",
            Dialect::Css,
        );
        assert_eq!(diagnostics, Vec::new());
        assert_eq!(region, Region::SawImport);

        assert_eq!(
            messages("p {}\n@import \"a.css\";"),
            vec!["@import allowed only before other rules"]
        );
    }

    #[test]
    fn test_media_queries() {
        let source = "@media screen and (min-width: 100px), print {\n  a { color: red }\n}";
        assert_eq!(messages(source), Vec::<String>::new());
        assert_eq!(
            messages("@media { a { color: red } }"),
            vec!["expecting a media type, got '{'"]
        );
    }

    #[test]
    fn test_other_at_rules() {
        let source = r#"@namespace svg url(http://www.w3.org/2000/svg);
@font-face { font-family: "X"; src: url(x.woff) format("woff"); }
@page :first { margin: 1in }
@keyframes spin { from { top: 0 } 50% { top: 1px } to { top: 2px } }
@supports (display: grid) { div { display: grid } }
"#;
        assert_eq!(messages(source), Vec::<String>::new());
    }

    #[test]
    fn test_unknown_at_rules_are_skipped() {
        assert_eq!(messages("@unknown foo; p { color: red }"), Vec::<String>::new());
        assert_eq!(
            messages("@unknown foo { bar baz } p { color: red }"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_attribute_problems() {
        assert_eq!(messages("[=x] {}"), vec!["expecting an attribute name, got '='"]);
        assert_eq!(messages("a[href {}"), vec!["expecting ']', got '{'"]);
    }

    #[test]
    fn test_nested_rule_in_css() {
        assert_eq!(
            messages("p { a { color: red } }"),
            vec!["expecting a property name, got 'a'"]
        );
    }

    #[test]
    fn test_unrecognized_tag_warning() {
        let tokens = vec![
            RawToken::new(Style::Identifier, "foo", 0, 0),
            RawToken::new(Style::Operator, "{}", 0, 4),
            RawToken::new(Style::Eof, "", 0, 6),
        ];
        let classifier = Classifier::new();
        let mut parser = Parser::new(
            Tokenizer::new(tokens.into_iter(), classifier),
            classifier,
            Dialect::Css,
        );
        assert_eq!(parser.parse(), Ok(()));
        let diagnostics = parser.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "treating unrecognized name 'foo' as a tag name");
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_less_stylesheet() {
        let source = r#"@c: blue;
.m(@a) { color: @a; }
.a {
  .m(red);
  &:hover { color: @c; }
  .b;
}
"#;
        assert_eq!(messages_in(source, Dialect::Less), Vec::<String>::new());
    }

    #[test]
    fn test_scss_stylesheet() {
        let source = r#"$gap: 4px !default;
.a {
  margin: $gap * 2;
  .b & { color: red; }
  @include mixin(1px);
}
"#;
        assert_eq!(messages_in(source, Dialect::Scss), Vec::<String>::new());
    }

    #[test]
    fn test_vendor_prefixed_keyframes() {
        assert_eq!(
            messages("@-webkit-keyframes x { from { a: b } }"),
            Vec::<String>::new()
        );
        assert_eq!(
            messages("@-webkit-keyframes { from { top: 0 } }"),
            vec!["expecting a keyframes name, got '{'"]
        );
    }

    #[test]
    fn test_moz_document() {
        assert_eq!(
            messages("@-moz-document url-prefix() { a { b: c } }"),
            Vec::<String>::new()
        );
        assert_eq!(
            messages("@-moz-document url-prefix();"),
            vec!["expecting '{', got ';'"]
        );
    }

    #[test]
    fn test_pseudo_class_arguments() {
        assert_eq!(
            messages("li:not(.a):nth-child(2n+1) { color: red }"),
            Vec::<String>::new()
        );
        assert_eq!(
            messages("li:not(.a { color: red }"),
            vec!["expecting ')' to match '(' at column 7, got '{'"]
        );
    }

    #[test]
    fn test_dash_match_attribute() {
        assert_eq!(messages("[lang|=en] {}"), Vec::<String>::new());
        assert_eq!(messages("[lang|] {}"), vec!["expecting ']', got '|'"]);
    }

    #[test]
    fn test_less_interpolation() {
        let source = ".@{name} { width: @{w}; }";
        assert_eq!(messages_in(source, Dialect::Less), Vec::<String>::new());
        assert_eq!(
            messages_in(".@{} {}", Dialect::Less),
            vec!["expecting a name after '@{', got '}'"]
        );
    }

    #[test]
    fn test_scss_interpolation() {
        let source = "#{$sel} { content: #{$x}; }";
        assert_eq!(messages_in(source, Dialect::Scss), Vec::<String>::new());
        assert_eq!(
            messages_in("a { content: #{}; }", Dialect::Scss),
            vec!["expecting a name after '{', got '}'"]
        );
    }

    #[test]
    fn test_less_escape() {
        let source = ".a { width: ~\"calc(100% - 10px)\"; }";
        assert_eq!(messages_in(source, Dialect::Less), Vec::<String>::new());
        assert_eq!(
            messages_in(".a { width: ~bad; }", Dialect::Less),
            vec!["expecting a string after '~', got 'bad'"]
        );
    }

    #[test]
    fn test_less_import_options() {
        assert_eq!(
            messages_in("@import (reference) \"x\";", Dialect::Less),
            Vec::<String>::new()
        );
        assert_eq!(
            messages_in("@import (reference);", Dialect::Less),
            vec!["expecting a string or url() after @import, got ';'"]
        );
        assert_eq!(
            messages("@import (reference) \"x\";"),
            vec!["expecting a string or url() after @import, got '('"]
        );
    }

    #[test]
    fn test_less_mixin_guard() {
        let source = ".m(@a) when (@a > 10) { width: @a; }";
        assert_eq!(messages_in(source, Dialect::Less), Vec::<String>::new());
        assert_eq!(
            messages_in(".m(@a) when (@a > 10);", Dialect::Less),
            vec!["expecting '{', got ';'"]
        );
    }

    #[test]
    fn test_less_variable_media_query() {
        let source = "@phone: ~\"only screen\";\n@media @phone { a { color: red } }";
        assert_eq!(messages_in(source, Dialect::Less), Vec::<String>::new());
    }

    #[test]
    fn test_scss_flags() {
        let source = ".a { $x: 1px !global; color: $x !optional; }";
        assert_eq!(messages_in(source, Dialect::Scss), Vec::<String>::new());
        assert_eq!(
            messages_in(".a { $x: 1px !globul; }", Dialect::Scss),
            vec!["expecting 'important' after '!', got 'globul'"]
        );
        assert_eq!(
            messages_in(".a { color: red !optional; }", Dialect::Less),
            vec!["expecting 'important' after '!', got 'optional'"]
        );
    }

    #[test]
    fn test_scss_placeholder_selector() {
        let source = "%ph { color: red; }\n.a { %inner { top: 0 } @extend %ph; }";
        assert_eq!(messages_in(source, Dialect::Scss), Vec::<String>::new());
        assert_eq!(
            messages_in("% ph {}", Dialect::Scss),
            vec!["expecting a name after '%', got 'ph'"]
        );
        assert_eq!(messages("%ph {}"), vec!["expecting a selector, got '%'"]);
    }

    #[test]
    fn test_progress_guard() {
        let mut guard = ProgressGuard::default();
        let token = Token::new(Style::Tag, "a", 0, 0);
        assert_eq!(guard.check(Site::Selector, &token), Ok(()));
        assert_eq!(guard.check(Site::Expression, &token), Ok(()));
        assert!(matches!(
            guard.check(Site::Selector, &token),
            Err(LintError::NoProgress { site: "selector", .. })
        ));
    }
}
