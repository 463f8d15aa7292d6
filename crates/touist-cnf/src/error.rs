//! CNF conversion and clause emission error types.

use thiserror::Error;
use touist_syntax::Span;

/// An error in the CNF or clause emission passes. The input here is
/// evaluator output, so these indicate a pipeline misuse (an unevaluated
/// formula), not a user mistake.
#[derive(Debug, Clone, Error)]
pub enum CnfError {
    #[error("formula still contains {node}; it must be fully evaluated before CNF conversion")]
    UnexpectedNode { node: String, span: Option<Span> },

    #[error("quantifier below a connective; the formula must be in prenex form")]
    MisplacedQuantifier { span: Option<Span> },
}

impl CnfError {
    /// The source span of this error, when one survived evaluation.
    pub fn span(&self) -> Option<Span> {
        match self {
            CnfError::UnexpectedNode { span, .. } | CnfError::MisplacedQuantifier { span } => *span,
        }
    }
}

/// Result type for CNF conversion and clause emission.
pub type CnfResult<T> = Result<T, CnfError>;
