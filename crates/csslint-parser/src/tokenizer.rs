//! Adapter between the highlighter's token stream and the grammar.
//!
//! Drops whitespace and comments, splits lumped operator runs into
//! single-operator tokens, numbers every token it hands out, and offers a
//! one-token put-back buffer.

use std::collections::VecDeque;

use csslint_lexer::{RawToken, Style};

use crate::classifier::Classifier;
use crate::diagnostics::Span;

/// Multi-character operators kept whole when a run is split.
const MULTI_CHAR_OPERATORS: &[&str] = &["@{", "${", "~=", "|="];

/// A significant token with its full 0-based extent.
///
/// Tokens never span lines: `end_line == start_line` and `end_column` is the
/// start column plus the character count of `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub style: Style,
    pub text: String,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    seq: usize,
}

impl Token {
    pub fn new(style: Style, text: impl Into<String>, line: usize, column: usize) -> Self {
        let text = text.into();
        let end_column = column + text.chars().count();
        Self {
            style,
            text,
            start_line: line,
            start_column: column,
            end_line: line,
            end_column,
            seq: 0,
        }
    }

    /// Hand-out number; tokens seen twice (put back, or EOF) keep theirs.
    pub fn seq(&self) -> usize {
        self.seq
    }

    pub fn is_eof(&self) -> bool {
        self.style == Style::Eof
    }

    /// Does `next` start exactly where this token ends?
    pub fn touches(&self, next: &Token) -> bool {
        self.end_line == next.start_line && self.end_column == next.start_column
    }

    pub fn span(&self) -> Span {
        Span::new(
            self.start_line,
            self.start_column,
            self.end_line,
            self.end_column,
        )
    }
}

/// Pull-based token source for the parser.
///
/// After the underlying stream is exhausted every call returns the same EOF
/// token; if the stream never produced one, an EOF is synthesized after the
/// last significant token.
pub struct Tokenizer<I: Iterator<Item = RawToken>> {
    source: I,
    classifier: Classifier,
    pending: VecDeque<Token>,
    put_back: Option<Token>,
    eof: Option<Token>,
    next_seq: usize,
    last_end: (usize, usize),
}

impl<I: Iterator<Item = RawToken>> Tokenizer<I> {
    pub fn new(source: I, classifier: Classifier) -> Self {
        Self {
            source,
            classifier,
            pending: VecDeque::new(),
            put_back: None,
            eof: None,
            next_seq: 0,
            last_end: (0, 0),
        }
    }

    /// Next significant token; the put-back slot is drained first.
    pub fn get_next_token(&mut self) -> Token {
        if let Some(token) = self.put_back.take() {
            return token;
        }

        loop {
            if let Some(token) = self.pending.pop_front() {
                return self.issue(token);
            }
            if let Some(eof) = &self.eof {
                return eof.clone();
            }

            match self.source.next() {
                None => {
                    let (line, column) = self.last_end;
                    return self.finish(Token::new(Style::Eof, "", line, column));
                }
                Some(raw) if raw.style == Style::Eof => {
                    return self.finish(Token::new(Style::Eof, "", raw.line, raw.column));
                }
                Some(raw) if raw.style.is_trivia() => continue,
                Some(raw) => {
                    let token = Token::new(raw.style, raw.text, raw.line, raw.column);
                    self.last_end = (token.end_line, token.end_column);
                    if self.classifier.is_operator(&token, None) {
                        self.pending.extend(split_operator(token));
                    } else {
                        self.pending.push_back(token);
                    }
                }
            }
        }
    }

    /// Return `token` so the next [`get_next_token`](Self::get_next_token)
    /// yields it again.
    ///
    /// # Panics
    ///
    /// Panics if a token is already waiting in the put-back slot; two
    /// put-backs in a row are a grammar bug.
    pub fn put_back(&mut self, token: Token) {
        assert!(
            self.put_back.is_none(),
            "put_back called twice without an intervening get_next_token"
        );
        self.put_back = Some(token);
    }

    fn issue(&mut self, mut token: Token) -> Token {
        token.seq = self.next_seq;
        self.next_seq += 1;
        token
    }

    fn finish(&mut self, eof: Token) -> Token {
        let eof = self.issue(eof);
        self.eof = Some(eof.clone());
        eof
    }
}

/// Split a lumped operator run into single operators.
///
/// Matches the multi-character operators greedily and falls back to one
/// character at a time; fragments keep contiguous columns. A run that is
/// already a single operator comes back unchanged.
pub fn split_operator(token: Token) -> Vec<Token> {
    let mut fragments = Vec::new();
    let mut rest = token.text.as_str();
    let mut column = token.start_column;

    while !rest.is_empty() {
        let piece = MULTI_CHAR_OPERATORS
            .iter()
            .copied()
            .find(|op| rest.starts_with(op))
            .or_else(|| rest.chars().next().map(|c| &rest[..c.len_utf8()]))
            .unwrap_or(rest);
        fragments.push((piece, column));
        column += piece.chars().count();
        rest = &rest[piece.len()..];
    }

    if fragments.len() <= 1 {
        return vec![token];
    }

    tracing::trace!(
        text = %token.text,
        line = token.start_line,
        fragments = fragments.len(),
        "split operator run"
    );
    fragments
        .into_iter()
        .map(|(piece, column)| Token::new(token.style, piece, token.start_line, column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use csslint_lexer::{Dialect, Scanner};
    use pretty_assertions::assert_eq;

    fn tokenizer(raw: Vec<RawToken>) -> Tokenizer<std::vec::IntoIter<RawToken>> {
        Tokenizer::new(raw.into_iter(), Classifier::new())
    }

    fn texts(source: &str) -> Vec<String> {
        let mut t = tokenizer(Scanner::tokenize(source, Dialect::Css));
        let mut out = Vec::new();
        loop {
            let token = t.get_next_token();
            if token.is_eof() {
                return out;
            }
            out.push(token.text);
        }
    }

    #[test]
    fn test_token_extent() {
        let token = Token::new(Style::Value, "caf\u{e9}", 2, 4);
        assert_eq!(token.end_line, 2);
        assert_eq!(token.end_column, 8);
        assert!(token.touches(&Token::new(Style::Operator, ";", 2, 8)));
        assert!(!token.touches(&Token::new(Style::Operator, ";", 2, 9)));
    }

    #[test]
    fn test_trivia_is_skipped() {
        assert_eq!(texts("p /* c */ { }"), vec!["p", "{", "}"]);
    }

    #[test]
    fn test_operator_runs_are_split() {
        assert_eq!(texts("a{b:c;}"), vec!["a", "{", "b", ":", "c", ";", "}"]);
    }

    #[test]
    fn test_split_keeps_dictionary_operators() {
        let single = split_operator(Token::new(Style::Operator, "@{", 0, 3));
        assert_eq!(single, vec![Token::new(Style::Operator, "@{", 0, 3)]);

        let pair = split_operator(Token::new(Style::Operator, "@{${", 0, 3));
        assert_eq!(
            pair,
            vec![
                Token::new(Style::Operator, "@{", 0, 3),
                Token::new(Style::Operator, "${", 0, 5),
            ]
        );
    }

    #[test]
    fn test_split_columns_are_contiguous() {
        let pieces = split_operator(Token::new(Style::Operator, "~=\"", 1, 10));
        let columns: Vec<(String, usize)> = pieces
            .into_iter()
            .map(|t| (t.text, t.start_column))
            .collect();
        assert_eq!(
            columns,
            vec![("~=".to_string(), 10), ("\"".to_string(), 12)]
        );
    }

    #[test]
    fn test_put_back_returns_same_token() {
        let mut t = tokenizer(Scanner::tokenize("a b", Dialect::Css));
        let first = t.get_next_token();
        t.put_back(first.clone());
        assert_eq!(t.get_next_token(), first);
        assert_eq!(t.get_next_token().text, "b");
    }

    #[test]
    #[should_panic(expected = "put_back called twice")]
    fn test_double_put_back_panics() {
        let mut t = tokenizer(Scanner::tokenize("a b", Dialect::Css));
        let first = t.get_next_token();
        t.put_back(first.clone());
        t.put_back(first);
    }

    #[test]
    fn test_eof_repeats_with_same_seq() {
        let mut t = tokenizer(Scanner::tokenize("a", Dialect::Css));
        assert_eq!(t.get_next_token().text, "a");
        let eof = t.get_next_token();
        assert!(eof.is_eof());
        assert_eq!(t.get_next_token(), eof);
        assert_eq!(t.get_next_token().seq(), eof.seq());
    }

    #[test]
    fn test_eof_synthesized_when_missing() {
        let mut t = tokenizer(vec![RawToken::new(Style::Tag, "div", 3, 2)]);
        assert_eq!(t.get_next_token().text, "div");
        let eof = t.get_next_token();
        assert!(eof.is_eof());
        assert_eq!((eof.start_line, eof.start_column), (3, 5));
    }

    #[test]
    fn test_seq_increases_per_token() {
        let mut t = tokenizer(Scanner::tokenize("a{}", Dialect::Css));
        let seqs: Vec<usize> = (0..3).map(|_| t.get_next_token().seq()).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }
}
