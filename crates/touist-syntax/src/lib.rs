//! AST model, source spans, and set values for the TouIST language.
//!
//! A parser is expected to produce the [`Ast`] defined here, with every
//! user-visible node wrapped in [`Ast::Loc`]. The evaluator and the CNF
//! converter live in sibling crates and consume this representation.

pub mod ast;
pub mod pretty;
pub mod set;
pub mod span;

pub use ast::Ast;
pub use pretty::pretty_print;
pub use set::{OrderedF64, SetValue};
pub use span::{Pos, Span};
