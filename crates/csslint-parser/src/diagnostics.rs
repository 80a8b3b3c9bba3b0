//! Diagnostics and the collector that decides which ones are kept.

use std::fmt;

use serde::Serialize;

/// How serious a diagnostic is. Serialized as its integer code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    #[default]
    Warning = 0,
    Error = 1,
}

impl Severity {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

impl Serialize for Severity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A 0-based source range, end column exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line_start: usize,
    pub col_start: usize,
    pub line_end: usize,
    pub col_end: usize,
}

impl Span {
    pub fn new(line_start: usize, col_start: usize, line_end: usize, col_end: usize) -> Self {
        Self {
            line_start,
            col_start,
            line_end,
            col_end,
        }
    }

    /// Ranges never end before they start and never cover zero columns on a
    /// single line.
    pub fn normalized(self) -> Self {
        let line_end = self.line_end.max(self.line_start);
        let col_end = if line_end == self.line_start && self.col_end <= self.col_start {
            self.col_start + 1
        } else {
            self.col_end
        };
        Self {
            line_end,
            col_end,
            ..self
        }
    }
}

/// A single lint finding.
///
/// `line_start` and `col_start` are `None` when the problem is anchored at
/// end of file; `line_end`/`col_end` then hold the end-of-file position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line_start: Option<usize>,
    pub col_start: Option<usize>,
    pub line_end: usize,
    pub col_end: usize,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span, severity: Severity) -> Self {
        let span = span.normalized();
        Self {
            message: message.into(),
            line_start: Some(span.line_start),
            col_start: Some(span.col_start),
            line_end: span.line_end,
            col_end: span.col_end,
            severity,
        }
    }

    pub fn at_eof(
        message: impl Into<String>,
        line: usize,
        column: usize,
        severity: Severity,
    ) -> Self {
        Self {
            message: message.into(),
            line_start: None,
            col_start: None,
            line_end: line,
            col_end: column,
            severity,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_at_eof(&self) -> bool {
        self.line_start.is_none()
    }
}

impl fmt::Display for Diagnostic {
    /// `line:column: severity: message`, 1-based for people.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line_start.unwrap_or(self.line_end) + 1;
        let column = self.col_start.unwrap_or(self.col_end) + 1;
        write!(f, "{}:{}: {}: {}", line, column, self.severity, self.message)
    }
}

/// Ordered diagnostic store that keeps one finding per stretch of lines.
///
/// A new diagnostic is kept only if it starts on a line after the previous
/// kept one ends, so a single mistake does not produce a cascade. An
/// end-of-file diagnostic is kept unless the previous one is also at end of
/// file.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a positioned diagnostic. Returns whether it was kept.
    pub fn record(&mut self, message: impl Into<String>, span: Span, severity: Severity) -> bool {
        self.push(Diagnostic::new(message, span, severity))
    }

    /// Record a diagnostic anchored at end of file. Returns whether it was kept.
    pub fn record_at_eof(
        &mut self,
        message: impl Into<String>,
        line: usize,
        column: usize,
        severity: Severity,
    ) -> bool {
        self.push(Diagnostic::at_eof(message, line, column, severity))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn push(&mut self, diagnostic: Diagnostic) -> bool {
        let keep = match self.diagnostics.last() {
            None => true,
            Some(last) => match (last.line_start, diagnostic.line_start) {
                (_, Some(start)) => last.line_end < start,
                (Some(_), None) => true,
                (None, None) => false,
            },
        };
        if keep {
            self.diagnostics.push(diagnostic);
        } else {
            tracing::trace!(message = %diagnostic.message, "suppressed overlapping diagnostic");
        }
        keep
    }
}
