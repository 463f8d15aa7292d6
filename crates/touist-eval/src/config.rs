//! Evaluator configuration.

/// What to do when a `bigand`/`bigor` keeps no instantiation: the neutral
/// element is often unintended at the top level, but legitimate inside a
/// compound formula. The driver picks; the default matches the lenient
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyGeneratorPolicy {
    /// Emit a warning and produce the neutral element.
    #[default]
    Warn,
    /// Abort evaluation with an error.
    Fatal,
}

/// Options threaded through an evaluation run.
///
/// All mutable pass state (global environment, diagnostics) lives in the
/// evaluator itself, so concurrent runs with separate evaluators are safe.
#[derive(Debug, Clone, Default)]
pub struct EvalConfig {
    /// Permit numeric leaves and arithmetic comparisons inside formulas,
    /// for translation to SMT-LIB2 instead of DIMACS.
    pub smt: bool,
    /// Fast type-check traversal: ranges collapse to singletons, set
    /// iteration stops after one element, cardinality constraints expand to
    /// a dummy proposition.
    pub check_only: bool,
    /// Policy for generators that keep no instantiation.
    pub empty_generator: EmptyGeneratorPolicy,
}

impl EvalConfig {
    /// Configuration for the SAT pipeline (the default).
    pub fn sat() -> Self {
        Self::default()
    }

    /// Configuration for the SMT pipeline.
    pub fn smt() -> Self {
        Self {
            smt: true,
            ..Self::default()
        }
    }

    /// Configuration for the linter's fast pass.
    pub fn check_only() -> Self {
        Self {
            check_only: true,
            ..Self::default()
        }
    }
}
