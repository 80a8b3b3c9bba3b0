//! csslint parser
//!
//! Error-recovering recursive-descent grammar checker for CSS, Less and
//! SCSS. It consumes style-tagged tokens (from [`csslint_lexer::Scanner`] or
//! any editor highlighter) and reports grammar problems as [`Diagnostic`]s
//! instead of building a syntax tree.
//!
//! # Example
//!
//! ```
//! let diagnostics = csslint_parser::lint("p { color: red font-size: 12px }");
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].message, "expecting ';', got ':'");
//! ```

pub mod classifier;
pub mod diagnostics;
pub mod linter;
pub mod parser;
pub mod tokenizer;

pub use classifier::Classifier;
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, Span};
pub use linter::{lint, LintOptions, LintReport, Linter};
pub use parser::{Parser, Region};
pub use tokenizer::{Token, Tokenizer};

/// A fault that stops a parse early.
///
/// Diagnostics gathered before the fault are still reported; the fault only
/// says why checking did not reach the end of the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LintError {
    #[error("unexpected end of file inside a block at line {}, column {}", .line + 1, .column + 1)]
    UnterminatedInput { line: usize, column: usize },

    #[error("parser made no progress in {site} at line {}, column {}", .line + 1, .column + 1)]
    NoProgress {
        site: &'static str,
        line: usize,
        column: usize,
    },
}
