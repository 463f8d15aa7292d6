//! Semantic expansion for TouIST.
//!
//! Takes a parsed [`touist_syntax::Ast`], resolves variables against the
//! two-scope environment, folds expressions to values, instantiates
//! `bigand`/`bigor` generators, encodes cardinality constraints, and
//! returns a purely propositional formula ready for CNF conversion.
//!
//! ```
//! use touist_eval::{EvalConfig, Evaluator};
//! use touist_syntax::Ast;
//!
//! // bigand $i in [1..2]: p($i) end
//! let ast = Ast::Bigand {
//!     vars: vec![Ast::var("$i")],
//!     sets: vec![Ast::Range(Box::new(Ast::Int(1)), Box::new(Ast::Int(2)))],
//!     when: None,
//!     body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
//! };
//! let config = EvalConfig::default();
//! let mut evaluator = Evaluator::new(&config);
//! let formula = evaluator.eval(&ast).unwrap();
//! assert_eq!(formula, Ast::and(Ast::prop("p(1)"), Ast::prop("p(2)")));
//! ```

pub mod config;
pub mod diag;
pub mod env;
pub mod error;
pub mod expr;
pub mod formula;
pub mod props;

pub use config::{EmptyGeneratorPolicy, EvalConfig};
pub use diag::{Diagnostic, Diagnostics, Phase, Severity};
pub use env::{Binding, Env};
pub use error::{EvalError, EvalResult};
pub use expr::Evaluator;
pub use formula::{is_fully_evaluated, CHECK_ONLY_DUMMY};
