//! Evaluation error types.

use thiserror::Error;
use touist_syntax::Span;

/// An evaluation error. Every variant carries the span of the offending
/// node, dummy for generated code.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error("unknown variable `{name}`")]
    UnknownVariable { name: String, span: Span },

    #[error("type mismatch: expected {expected}, found {found} in `{expr}`")]
    TypeMismatch {
        expected: String,
        found: String,
        expr: String,
        span: Span,
    },

    #[error("generator arity mismatch: {vars} variable(s) for {sets} set(s)")]
    ArityMismatch { vars: usize, sets: usize, span: Span },

    #[error("generator produced nothing: every instantiation was filtered out")]
    EmptyGenerator { span: Span },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("malformed syntax tree: {message}")]
    MalformedAst { message: String, span: Span },

    #[error("program contains no formula")]
    NoFormula { span: Span },
}

impl EvalError {
    /// The source span of this error.
    pub fn span(&self) -> Span {
        match self {
            EvalError::UnknownVariable { span, .. }
            | EvalError::TypeMismatch { span, .. }
            | EvalError::ArityMismatch { span, .. }
            | EvalError::EmptyGenerator { span }
            | EvalError::DivisionByZero { span }
            | EvalError::MalformedAst { span, .. }
            | EvalError::NoFormula { span } => *span,
        }
    }
}

/// Result type for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use touist_syntax::Pos;

    #[test]
    fn test_error_display() {
        let e = EvalError::TypeMismatch {
            expected: "int".to_string(),
            found: "float".to_string(),
            expr: "1.0".to_string(),
            span: Span::dummy(),
        };
        assert_eq!(
            e.to_string(),
            "type mismatch: expected int, found float in `1.0`"
        );
    }

    #[test]
    fn test_span_accessor() {
        let span = Span::new(Pos::new(1, 3, 2), Pos::new(1, 4, 3));
        let e = EvalError::UnknownVariable {
            name: "$x".to_string(),
            span,
        };
        assert_eq!(e.span(), span);
    }
}
