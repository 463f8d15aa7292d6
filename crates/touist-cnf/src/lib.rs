//! CNF conversion and clause emission for TouIST.
//!
//! Consumes the evaluator's purely propositional output, rewrites it to a
//! conjunction of clauses with the Tseytin trick, and flattens the result
//! to integer-keyed clauses with a name table, ready for DIMACS (SAT) or
//! QDIMACS (QBF) emission.
//!
//! ```
//! use touist_cnf::{compile_sat, write_dimacs};
//! use touist_syntax::Ast;
//!
//! // (a and b) or (c and d)
//! let f = Ast::or(
//!     Ast::and(Ast::prop("a"), Ast::prop("b")),
//!     Ast::and(Ast::prop("c"), Ast::prop("d")),
//! );
//! let clause_set = compile_sat(&f).unwrap();
//! assert_eq!(clause_set.num_clauses(), 5);
//! let mut out = Vec::new();
//! write_dimacs(&mut out, &clause_set, false).unwrap();
//! ```

pub mod cnf;
pub mod dimacs;
pub mod error;
pub mod prenex;

pub use cnf::{is_cnf, CnfConverter};
pub use dimacs::{write_dimacs, write_qdimacs, write_table, ClauseSet, NameTable};
pub use error::{CnfError, CnfResult};
pub use prenex::{group_blocks, split_prenex, Quant, QuantBlock};

use touist_syntax::Ast;

/// Run the SAT back-end half of the pipeline: CNF conversion followed by
/// clause flattening.
pub fn compile_sat(formula: &Ast) -> CnfResult<ClauseSet> {
    let mut converter = CnfConverter::new();
    let cnf = converter.convert(formula)?;
    ClauseSet::from_cnf(&cnf)
}

/// Run the QBF back-end half of the pipeline: prefix extraction, CNF
/// conversion of the matrix, and clause flattening with the Tseytin
/// auxiliaries existentially quantified innermost.
pub fn compile_qbf(formula: &Ast) -> CnfResult<ClauseSet> {
    let (prefix, matrix) = split_prenex(formula)?;
    let mut converter = CnfConverter::new();
    let cnf = converter.convert(matrix)?;
    let blocks = group_blocks(prefix, converter.aux_names());
    ClauseSet::from_prenex_cnf(blocks, &cnf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_sat_scenario() {
        // (a and b) or (c and d) becomes five clauses over two auxiliaries.
        let f = Ast::or(
            Ast::and(Ast::prop("a"), Ast::prop("b")),
            Ast::and(Ast::prop("c"), Ast::prop("d")),
        );
        let cs = compile_sat(&f).unwrap();
        assert_eq!(cs.num_clauses(), 5);
        assert_eq!(cs.num_vars(), 6);
        assert!(cs.prefix.is_empty());
    }

    #[test]
    fn test_compile_qbf_quantifies_aux_innermost() {
        // forall x: exists y: (x and y) or (not x and not y)
        let matrix = Ast::or(
            Ast::and(Ast::prop("x"), Ast::prop("y")),
            Ast::and(Ast::not(Ast::prop("x")), Ast::not(Ast::prop("y"))),
        );
        let f = Ast::Forall(
            Box::new(Ast::prop("x")),
            Box::new(Ast::Exists(Box::new(Ast::prop("y")), Box::new(matrix))),
        );
        let cs = compile_qbf(&f).unwrap();
        assert_eq!(cs.prefix.len(), 2);
        assert_eq!(cs.prefix[0].quant, Quant::Forall);
        assert_eq!(cs.prefix[0].vars, vec!["x"]);
        assert_eq!(cs.prefix[1].quant, Quant::Exists);
        assert_eq!(cs.prefix[1].vars, vec!["y", "&1", "&2"]);
        // x and y got the lowest indices, before the auxiliaries.
        assert_eq!(cs.table.index_of("x"), Some(1));
        assert_eq!(cs.table.index_of("y"), Some(2));
    }
}
