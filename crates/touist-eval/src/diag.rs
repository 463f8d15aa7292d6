//! Diagnostic sink.
//!
//! Passes append `(severity, phase, message, span)` records; the driver
//! renders them against the source file after each pass. Fatal records are
//! produced on the error path and mirror the `EvalError` that aborted the
//! run.

use std::fmt;
use touist_syntax::Span;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// Which pass produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Eval,
    Cnf,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Eval => write!(f, "eval"),
            Phase::Cnf => write!(f, "cnf"),
        }
    }
}

/// A single diagnostic record.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub phase: Phase,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Render as `file:line:col-col: severity: message`.
    pub fn render(&self, file: &str) -> String {
        match self.span {
            Some(span) => format!("{}:{}: {}: {}", file, span, self.severity, self.message),
            None => format!("{}: {}: {}", file, self.severity, self.message),
        }
    }
}

/// Append-only collection of diagnostics for one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a warning.
    pub fn warn(&mut self, phase: Phase, message: impl Into<String>, span: Option<Span>) {
        self.records.push(Diagnostic {
            severity: Severity::Warning,
            phase,
            message: message.into(),
            span,
        });
    }

    /// Append an error.
    pub fn error(&mut self, phase: Phase, message: impl Into<String>, span: Option<Span>) {
        self.records.push(Diagnostic {
            severity: Severity::Error,
            phase,
            message: message.into(),
            span,
        });
    }

    /// Iterate over the records in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check whether any record is at least `Error` severity.
    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|d| d.severity >= Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touist_syntax::{Pos, Span};

    #[test]
    fn test_render_with_span() {
        let mut diags = Diagnostics::new();
        let span = Span::new(Pos::new(2, 3, 10), Pos::new(2, 8, 15));
        diags.warn(Phase::Eval, "bigand over an empty set", Some(span));
        let d = diags.iter().next().unwrap();
        assert_eq!(
            d.render("ex.touist"),
            "ex.touist:2:3-8: warning: bigand over an empty set"
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        let mut diags = Diagnostics::new();
        diags.warn(Phase::Cnf, "w", None);
        assert!(!diags.has_errors());
        diags.error(Phase::Cnf, "e", None);
        assert!(diags.has_errors());
    }
}
