use crate::token::{Dialect, RawToken, Style};

/// Grammatical neighbourhood the scanner believes it is in.
///
/// The same word is a tag in a selector, a property name at the start of a
/// declaration and a keyword in a value, so styling depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Selector,
    Property,
    Value,
    Directive,
    Attribute,
}

/// What an open `{` started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    /// `@media`, `@supports`, `@keyframes`: contains rulesets.
    Rules,
    /// A ruleset body: contains declarations (and nested rulesets in Less/SCSS).
    Declarations,
    /// `@{name}` / `${name}` / `#{expr}`: no effect on context.
    Interpolation,
}

/// At-rules whose prelude may contain a `:` that does not start a value.
const KNOWN_DIRECTIVES: &[&str] = &[
    "charset",
    "import",
    "media",
    "page",
    "font-face",
    "namespace",
    "supports",
    "document",
    "-moz-document",
];

/// Style-tagging scanner for CSS, Less and SCSS.
///
/// Works like an editor highlighter: it never fails, it only labels.
/// Consecutive operator characters are emitted as a single `Operator`
/// token; splitting them is the consumer's job.
///
/// Follows the same layout as a hand-written source scanner:
/// - `Vec<char>` source for index-based navigation
/// - A block stack to know what each `{` opened
/// - Context-aware styling of words
/// - Position tracking on every token
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    dialect: Dialect,
    tokens: Vec<RawToken>,
    context: Context,
    blocks: Vec<Block>,
    directive: Option<String>,
    paren_depth: usize,
    attribute_operator_seen: bool,
}

impl Scanner {
    /// Create a new scanner for the given source.
    pub fn new(source: &str, dialect: Dialect) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 0,
            column: 0,
            dialect,
            tokens: Vec::new(),
            context: Context::Selector,
            blocks: Vec::new(),
            directive: None,
            paren_depth: 0,
            attribute_operator_seen: false,
        }
    }

    /// Style-tag the entire source. The last token is always `Style::Eof`.
    pub fn tokenize(source: &str, dialect: Dialect) -> Vec<RawToken> {
        let mut scanner = Scanner::new(source, dialect);
        scanner.scan_tokens();
        scanner.tokens
    }

    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            self.scan_token();
        }
        let (line, column) = (self.line, self.column);
        self.push(Style::Eof, String::new(), line, column);
    }

    fn scan_token(&mut self) {
        let ch = self.peek();
        let next = self.peek_next();

        match ch {
            c if c.is_whitespace() => self.scan_whitespace(),
            '/' if next == '*' => self.scan_block_comment(),
            '/' if next == '/' && self.dialect.allows_nesting() => self.scan_line_comment(),
            '"' | '\'' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(),
            '.' if next.is_ascii_digit() && self.in_value() => self.scan_number(),
            '#' if self.in_value() && is_name_char(next) => self.scan_prefixed(Style::Value),
            '$' if self.dialect == Dialect::Scss && is_name_start(next) => {
                self.scan_prefixed(Style::Variable)
            }
            '@' if self.starts_less_variable(next) => self.scan_prefixed(Style::Variable),
            '!' if self.matches_important() => self.scan_important(),
            '-' if starts_name(ch, next) => self.scan_word(),
            c if is_name_start(c) => self.scan_word(),
            _ => self.scan_operators(),
        }
    }

    // --- Scanners ---

    fn scan_whitespace(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
        let text = self.text_from(start);
        self.push(Style::Default, text, line, column);
    }

    /// `/* ... */`, possibly spanning lines and possibly unterminated.
    fn scan_block_comment(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        self.advance();
        self.advance();
        while !self.is_at_end() && !(self.peek() == '*' && self.peek_next() == '/') {
            self.advance();
        }
        if !self.is_at_end() {
            self.advance();
            self.advance();
        }
        let text = self.text_from(start);
        self.push(Style::Comment, text, line, column);
    }

    /// `// ...` (Less and SCSS only).
    fn scan_line_comment(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        while !self.is_at_end() && !is_newline(self.peek()) {
            self.advance();
        }
        let text = self.text_from(start);
        self.push(Style::Comment, text, line, column);
    }

    /// A quoted string. Hitting a newline or EOF first yields `StringEol`.
    fn scan_string(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        let quote = self.peek();
        self.advance();

        let mut style = Style::StringEol;
        while !self.is_at_end() {
            let c = self.peek();
            if c == quote {
                self.advance();
                style = Style::String;
                break;
            }
            if is_newline(c) {
                break;
            }
            if c == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
            }
            self.advance();
        }

        let text = self.text_from(start);
        self.push(style, text, line, column);
    }

    /// Digits with an optional fraction, then a unit or `%`.
    fn scan_number(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);

        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        if self.peek() == '%' {
            self.advance();
        } else {
            while !self.is_at_end() && self.peek().is_alphabetic() {
                self.advance();
            }
        }

        let text = self.text_from(start);
        self.push(Style::Number, text, line, column);
    }

    /// A one-character prefix glued to a name: `#fff`, `$var`, `@var`.
    fn scan_prefixed(&mut self, style: Style) {
        let (line, column, start) = (self.line, self.column, self.pos);
        self.advance();
        while !self.is_at_end() && is_name_char(self.peek()) {
            self.consume_name_char();
        }
        let text = self.text_from(start);
        self.push(style, text, line, column);
    }

    fn scan_important(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        for _ in 0.."!important".len() {
            self.advance();
        }
        let text = self.text_from(start);
        self.push(Style::Important, text, line, column);
    }

    /// An identifier-like word, styled by context.
    fn scan_word(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        self.consume_name_char();
        while !self.is_at_end() && is_name_char(self.peek()) {
            self.consume_name_char();
        }
        let text = self.text_from(start);

        if self.in_value() && text.eq_ignore_ascii_case("url") && self.peek() == '(' {
            self.scan_url(start, line, column);
            return;
        }

        let style = self.word_style(&text, line, column);
        if style == Style::Directive {
            self.directive = Some(text.to_ascii_lowercase());
        }
        self.push(style, text, line, column);
    }

    /// `url(...)` as one value token; stops before a newline if `)` is missing.
    fn scan_url(&mut self, start: usize, line: usize, column: usize) {
        while !self.is_at_end() && !is_newline(self.peek()) {
            let c = self.peek();
            self.advance();
            if c == ')' {
                break;
            }
        }
        let text = self.text_from(start);
        self.push(Style::Value, text, line, column);
    }

    /// A run of operator characters, emitted as one token.
    fn scan_operators(&mut self) {
        let (line, column, start) = (self.line, self.column, self.pos);
        loop {
            let c = self.peek();
            self.advance();
            self.apply_operator(c);
            if self.is_at_end() || !self.continues_operator_run() {
                break;
            }
        }
        let text = self.text_from(start);
        self.push(Style::Operator, text, line, column);
    }

    // --- Context tracking ---

    /// Update the context for an operator character that was just consumed.
    fn apply_operator(&mut self, c: char) {
        match c {
            '{' => {
                if self.opens_interpolation() {
                    self.blocks.push(Block::Interpolation);
                    return;
                }
                let block = match self.context {
                    Context::Directive if self.directive_opens_rules() => Block::Rules,
                    _ => Block::Declarations,
                };
                self.blocks.push(block);
                self.reset_to_base();
            }
            '}' => {
                if self.blocks.pop() != Some(Block::Interpolation) {
                    self.reset_to_base();
                }
            }
            ';' if self.context != Context::Attribute => self.reset_to_base(),
            ':' => match self.context {
                Context::Property => self.context = Context::Value,
                Context::Directive if self.paren_depth == 0 && !self.directive_is_known() => {
                    self.context = Context::Value
                }
                Context::Selector if self.after_variable() => self.context = Context::Value,
                _ => {}
            },
            '[' if self.context == Context::Selector => {
                self.context = Context::Attribute;
                self.attribute_operator_seen = false;
            }
            ']' if self.context == Context::Attribute => self.context = Context::Selector,
            '=' if self.context == Context::Attribute => self.attribute_operator_seen = true,
            '(' => self.paren_depth += 1,
            ')' => self.paren_depth = self.paren_depth.saturating_sub(1),
            '@' if starts_name(self.peek(), self.peek_next())
                && !matches!(self.context, Context::Value | Context::Attribute) =>
            {
                self.context = Context::Directive;
                self.directive = None;
            }
            _ => {}
        }

        if self.context == Context::Property
            && matches!(c, '{' | '}' | ';')
            && self.starts_nested_selector()
        {
            self.context = Context::Selector;
        }
    }

    fn reset_to_base(&mut self) {
        self.context = match self.blocks.iter().rev().find(|b| **b != Block::Interpolation) {
            Some(Block::Declarations) => Context::Property,
            _ => Context::Selector,
        };
        self.directive = None;
        self.paren_depth = 0;
    }

    fn opens_interpolation(&self) -> bool {
        // `pos` is already past the `{`.
        match self.pos.checked_sub(2).and_then(|i| self.chars.get(i)) {
            Some('@') | Some('$') => true,
            Some('#') => self.dialect == Dialect::Scss,
            _ => false,
        }
    }

    fn directive_opens_rules(&self) -> bool {
        let inside_declarations = self
            .blocks
            .iter()
            .rev()
            .find(|b| **b != Block::Interpolation)
            .is_some_and(|b| *b == Block::Declarations);
        if inside_declarations && self.dialect.allows_nesting() {
            return false;
        }
        self.directive.as_deref().is_some_and(|name| {
            matches!(name, "media" | "supports" | "document" | "-moz-document")
                || name.ends_with("keyframes")
        })
    }

    fn directive_is_known(&self) -> bool {
        self.directive
            .as_deref()
            .is_some_and(|name| KNOWN_DIRECTIVES.contains(&name) || name.ends_with("keyframes"))
    }

    /// Looks ahead from the current position: does a `{` come before `;` or `}`?
    fn starts_nested_selector(&self) -> bool {
        let mut i = self.pos;
        let mut quote: Option<char> = None;
        let mut depth = 0usize;

        while let Some(&c) = self.chars.get(i) {
            if let Some(q) = quote {
                if c == '\\' {
                    i += 1;
                } else if c == q || is_newline(c) {
                    quote = None;
                }
                i += 1;
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '{' if i > 0 && matches!(self.chars[i - 1], '@' | '$' | '#') => {
                    while i < self.chars.len() && self.chars[i] != '}' {
                        i += 1;
                    }
                }
                '{' if depth == 0 => return true,
                ';' | '}' if depth == 0 => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    fn continues_operator_run(&self) -> bool {
        let c = self.peek();
        let next = self.peek_next();

        if c.is_whitespace() || c == '"' || c == '\'' || c.is_ascii_digit() || is_name_start(c) {
            return false;
        }
        !match c {
            '/' => next == '*' || (next == '/' && self.dialect.allows_nesting()),
            '-' => starts_name(c, next),
            '.' => next.is_ascii_digit() && self.in_value(),
            '#' => self.in_value() && is_name_char(next),
            '$' => self.dialect == Dialect::Scss && is_name_start(next),
            '@' => self.starts_less_variable(next),
            '!' => self.matches_important(),
            _ => false,
        }
    }

    fn word_style(&self, text: &str, line: usize, column: usize) -> Style {
        let adjacent = self.adjacent_operator(line, column);
        let last = adjacent.and_then(|op| op.chars().last());

        match self.context {
            Context::Selector => match last {
                Some('.') => Style::Class,
                Some('#') => Style::Id,
                Some(':') if adjacent.is_some_and(|op| op.ends_with("::")) => Style::PseudoElement,
                Some(':') => Style::PseudoClass,
                _ => Style::Tag,
            },
            Context::Property => Style::Identifier,
            Context::Value => {
                let after_bang = self
                    .last_significant()
                    .is_some_and(|t| t.style == Style::Operator && t.text.ends_with('!'));
                if after_bang && text.eq_ignore_ascii_case("important") {
                    Style::Important
                } else {
                    Style::Value
                }
            }
            Context::Directive if last == Some('@') => Style::Directive,
            Context::Directive => Style::Value,
            Context::Attribute if self.attribute_operator_seen => Style::Value,
            Context::Attribute => Style::Attribute,
        }
    }

    /// Text of the previous token if it is an operator ending exactly here.
    fn adjacent_operator(&self, line: usize, column: usize) -> Option<&str> {
        self.tokens
            .last()
            .filter(|t| {
                t.style == Style::Operator
                    && t.line == line
                    && t.column + t.text.chars().count() == column
            })
            .map(|t| t.text.as_str())
    }

    fn last_significant(&self) -> Option<&RawToken> {
        self.tokens.iter().rev().find(|t| !t.style.is_trivia())
    }

    fn after_variable(&self) -> bool {
        self.last_significant()
            .is_some_and(|t| t.style == Style::Variable)
    }

    /// Less `@name` in a value, or in an at-rule prelude after its name
    /// (`@media @phone`).
    fn starts_less_variable(&self, next: char) -> bool {
        self.dialect == Dialect::Less
            && is_name_start(next)
            && (self.context == Context::Value
                || (self.context == Context::Directive && self.directive.is_some()))
    }

    fn in_value(&self) -> bool {
        matches!(self.context, Context::Value | Context::Directive)
    }

    fn matches_important(&self) -> bool {
        let word: String = self.chars.iter().skip(self.pos + 1).take(9).collect();
        word.eq_ignore_ascii_case("important")
            && !self
                .chars
                .get(self.pos + 10)
                .is_some_and(|c| is_name_char(*c))
    }

    // --- Helpers ---

    fn push(&mut self, style: Style, text: String, line: usize, column: usize) {
        self.tokens.push(RawToken::new(style, text, line, column));
    }

    fn text_from(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    /// Consume one name character, including a backslash escape pair.
    fn consume_name_char(&mut self) {
        let escape = self.peek() == '\\';
        self.advance();
        if escape && !self.is_at_end() {
            self.advance();
        }
    }

    fn peek(&self) -> char {
        self.chars.get(self.pos).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.pos + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        // `\r\n` counts once, on the `\n`.
        if c == '\n' || (c == '\r' && self.peek() != '\n') {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}

fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '\\' || (!c.is_ascii() && !c.is_whitespace())
}

/// A word starts here: a name character, or `-` before a name or `--`.
fn starts_name(c: char, next: char) -> bool {
    is_name_start(c) || (c == '-' && (is_name_start(next) || next == '-'))
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}
