//! Public entry point: text or highlighter tokens in, diagnostics out.

use csslint_lexer::{Dialect, RawToken, Scanner};

use crate::classifier::Classifier;
use crate::diagnostics::Diagnostic;
use crate::parser::Parser;
use crate::tokenizer::Tokenizer;
use crate::LintError;

/// Per-run settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintOptions {
    pub dialect: Dialect,
}

impl LintOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

/// Outcome of one lint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Set when checking stopped before the end of the document.
    pub fault: Option<LintError>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.fault.is_some() || self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Reusable linter. Holds no per-document state, so one instance can check
/// any number of documents, from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linter {
    options: LintOptions,
    classifier: Classifier,
}

impl Linter {
    pub fn new(options: LintOptions) -> Self {
        Self {
            options,
            classifier: Classifier::new(),
        }
    }

    /// Tokenize `text` with the built-in scanner and check it.
    pub fn run(&self, text: &str) -> LintReport {
        self.run_tokens(Scanner::tokenize(text, self.options.dialect))
    }

    /// Check a token stream produced by some other highlighter.
    pub fn run_tokens<T: IntoIterator<Item = RawToken>>(&self, tokens: T) -> LintReport {
        let tokenizer = Tokenizer::new(tokens.into_iter(), self.classifier);
        let mut parser = Parser::new(tokenizer, self.classifier, self.options.dialect);
        let fault = parser.parse().err();
        if let Some(fault) = &fault {
            tracing::warn!(%fault, dialect = %self.options.dialect, "lint stopped early");
        }
        LintReport {
            diagnostics: parser.into_diagnostics(),
            fault,
        }
    }

    /// Diagnostics only; a fault is logged and the partial list returned.
    pub fn lint(&self, text: &str) -> Vec<Diagnostic> {
        self.run(text).diagnostics
    }
}

/// Lint plain CSS with default options.
pub fn lint(text: &str) -> Vec<Diagnostic> {
    Linter::default().lint(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticCollector, Severity, Span};
    use csslint_lexer::Style;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn assert_normalized(diagnostic: &Diagnostic) {
        if let Some(line_start) = diagnostic.line_start {
            assert!(diagnostic.line_end >= line_start, "{diagnostic:?}");
            if diagnostic.line_end == line_start {
                let col_start = diagnostic.col_start.unwrap_or_default();
                assert!(diagnostic.col_end > col_start, "{diagnostic:?}");
            }
        }
    }

    #[test]
    fn test_valid_css_has_no_diagnostics() {
        assert_eq!(
            lint("p { color: red; font-size: 12px !important; }"),
            Vec::new()
        );
    }

    #[test]
    fn test_missing_semicolon_recovers() {
        let diagnostics = lint("p { color: red font-size: 12 }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "expecting ';', got ':'");
        assert_eq!(diagnostics[0].line_start, Some(0));
        assert_eq!(diagnostics[0].col_start, Some(24));
    }

    #[test]
    fn test_unterminated_string_is_flagged() {
        let report = Linter::default().run("p { content: \"unterminated; }");
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message.contains("close-quote")));
        assert!(report.has_errors());
    }

    #[test]
    fn test_charset_out_of_position() {
        let diagnostics = lint("p{} @charset \"UTF-8\";");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("@charset") && d.message.contains("start of file")));
    }

    #[test]
    fn test_eof_inside_block_returns_partial_results() {
        let report = Linter::default().run("p { color: red;");
        assert!(!report.diagnostics.is_empty());
        assert!(matches!(report.fault, Some(LintError::UnterminatedInput { .. })));
        assert!(!lint("p { color: red;").is_empty());
    }

    #[test]
    fn test_diagnostics_serialize_to_the_wire_format() {
        let diagnostics = lint("p {\n  color }");
        let value = serde_json::to_value(&diagnostics).expect("diagnostics serialize");
        assert_eq!(
            value,
            serde_json::json!([
                {
                    "message": "expecting ':' after 'color', got '}'",
                    "line_start": 1,
                    "col_start": 8,
                    "line_end": 1,
                    "col_end": 9,
                    "severity": 1
                }
            ])
        );

        let eof = serde_json::to_value(&lint("p {")[0]).expect("diagnostic serializes");
        assert_eq!(eof["line_start"], serde_json::Value::Null);
        assert_eq!(eof["severity"], 1);
    }

    #[test]
    fn test_collector_keeps_consecutive_diagnostics_apart() {
        let mut collector = DiagnosticCollector::new();
        let spans = [(0, 0, 0, 3), (0, 5, 0, 6), (1, 0, 2, 4), (2, 8, 2, 9), (3, 0, 3, 1)];
        for (ls, cs, le, ce) in spans {
            collector.record("x", Span::new(ls, cs, le, ce), Severity::Error);
        }
        let kept = collector.diagnostics();
        assert_eq!(kept.len(), 3);
        for pair in kept.windows(2) {
            assert!(pair[0].line_end < pair[1].line_start.unwrap_or(usize::MAX));
        }
    }

    #[test]
    fn test_dialect_changes_the_verdict() {
        let source = ".a { .b { color: red; } }";
        assert_eq!(lint(source).len(), 1);
        let less = Linter::new(LintOptions::new(Dialect::Less));
        assert_eq!(less.lint(source), Vec::new());
    }

    #[test]
    fn test_external_token_stream() {
        let tokens = vec![
            RawToken::new(Style::Tag, "p", 0, 0),
            RawToken::new(Style::Default, " ", 0, 1),
            RawToken::new(Style::Operator, "{", 0, 2),
            RawToken::new(Style::Identifier, "margin", 0, 3),
            RawToken::new(Style::Operator, ":", 0, 9),
            RawToken::new(Style::Value, "2em", 0, 10),
            RawToken::new(Style::Operator, ";}", 0, 13),
            RawToken::new(Style::Eof, "", 0, 15),
        ];
        let report = Linter::default().run_tokens(tokens);
        assert_eq!(report, LintReport { diagnostics: Vec::new(), fault: None });
    }

    #[test]
    fn test_linter_is_reusable() {
        let linter = Linter::default();
        assert_eq!(linter.lint("p { color: red font-size: 1px }").len(), 1);
        assert_eq!(linter.lint("p { color: red; }"), Vec::new());
    }

    fn arb_dialect() -> impl Strategy<Value = Dialect> {
        prop::sample::select(vec![Dialect::Css, Dialect::Less, Dialect::Scss])
    }

    fn arb_raw_token() -> impl Strategy<Value = (u8, &'static str)> {
        (
            0u8..22,
            prop::sample::select(vec![
                "{", "}", ";", ":", "@", "(", ")", ",", "!", "[", "]", "=", ".", "&", "-", "+",
                "@{", "${", ";}", "{}", "):", "a", "color", "important", "12px", "\"s\"",
                "\"s", "url(x", "#fff", "media", "charset", "",
            ]),
        )
    }

    proptest! {
        #[test]
        fn prop_random_token_streams_terminate(
            tokens in prop::collection::vec(arb_raw_token(), 0..80),
            dialect in arb_dialect(),
        ) {
            let raw: Vec<RawToken> = tokens
                .into_iter()
                .enumerate()
                .map(|(line, (code, text))| {
                    RawToken::from_code(code, text, line, 0).expect("codes below 22 are valid")
                })
                .collect();

            let report = Linter::new(LintOptions::new(dialect)).run_tokens(raw);
            for diagnostic in &report.diagnostics {
                assert_normalized(diagnostic);
            }
        }

        #[test]
        fn prop_random_text_terminates(
            text in "[a-z0-9{};:@()\\[\\]#.,!\"'/*$&~=+>% \n-]{0,120}",
            dialect in arb_dialect(),
        ) {
            let report = Linter::new(LintOptions::new(dialect)).run(&text);
            for diagnostic in &report.diagnostics {
                assert_normalized(diagnostic);
            }
            for pair in report.diagnostics.windows(2) {
                if let Some(start) = pair[1].line_start {
                    prop_assert!(pair[0].line_end < start);
                }
            }
        }
    }
}
