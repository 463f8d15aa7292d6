//! Clause emission: integer-keyed clauses and DIMACS/QDIMACS writers.

use crate::error::{CnfError, CnfResult};
use crate::prenex::{Quant, QuantBlock};
use std::collections::HashMap;
use std::io;
use touist_syntax::Ast;

/// Bijective mapping between proposition names and the small positive
/// integers DIMACS uses. Indices are assigned on first encounter and start
/// at 1.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    by_name: HashMap<String, i32>,
    names: Vec<String>,
}

impl NameTable {
    /// Index for a name, assigning the next one on first encounter.
    pub fn intern(&mut self, name: &str) -> i32 {
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }
        let index = self.names.len() as i32 + 1;
        self.by_name.insert(name.to_string(), index);
        self.names.push(name.to_string());
        index
    }

    /// Index of an already-interned name.
    pub fn index_of(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    /// Name behind an index.
    pub fn name_of(&self, index: i32) -> Option<&str> {
        if index < 1 {
            return None;
        }
        self.names.get(index as usize - 1).map(String::as_str)
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(name, index)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i as i32 + 1))
    }
}

/// A CNF formula flattened to signed-integer clauses, with its name table
/// and (for QBF) quantifier prefix.
#[derive(Debug, Clone)]
pub struct ClauseSet {
    pub clauses: Vec<Vec<i32>>,
    pub table: NameTable,
    /// Quantifier blocks, outermost first. Empty for plain SAT.
    pub prefix: Vec<QuantBlock>,
}

impl ClauseSet {
    /// Flatten a CNF formula.
    pub fn from_cnf(cnf: &Ast) -> CnfResult<Self> {
        Self::build(Vec::new(), cnf)
    }

    /// Flatten a CNF matrix under a quantifier prefix. Prefix variables are
    /// interned first so they get the lowest indices.
    pub fn from_prenex_cnf(prefix: Vec<QuantBlock>, cnf: &Ast) -> CnfResult<Self> {
        Self::build(prefix, cnf)
    }

    fn build(prefix: Vec<QuantBlock>, cnf: &Ast) -> CnfResult<Self> {
        let mut table = NameTable::default();
        for block in &prefix {
            for var in &block.vars {
                table.intern(var);
            }
        }
        let mut clauses = Vec::new();
        match cnf.peel() {
            // A bare constant never leaves the converter, but flattening
            // one directly still has an obvious meaning.
            Ast::Top => {}
            Ast::Bottom => clauses.push(Vec::new()),
            f => collect_conjuncts(f, &mut table, &mut clauses)?,
        }
        tracing::debug!(
            vars = table.len(),
            clauses = clauses.len(),
            "flattened CNF to clauses"
        );
        Ok(Self {
            clauses,
            table,
            prefix,
        })
    }

    pub fn num_vars(&self) -> usize {
        self.table.len()
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }
}

fn collect_conjuncts(
    ast: &Ast,
    table: &mut NameTable,
    clauses: &mut Vec<Vec<i32>>,
) -> CnfResult<()> {
    match ast.peel() {
        Ast::And(l, r) => {
            collect_conjuncts(l, table, clauses)?;
            collect_conjuncts(r, table, clauses)?;
            Ok(())
        }
        clause => {
            let mut lits = Vec::new();
            collect_literals(clause, table, &mut lits)?;
            clauses.push(lits);
            Ok(())
        }
    }
}

fn collect_literals(ast: &Ast, table: &mut NameTable, lits: &mut Vec<i32>) -> CnfResult<()> {
    match ast.peel() {
        Ast::Or(l, r) => {
            collect_literals(l, table, lits)?;
            collect_literals(r, table, lits)?;
            Ok(())
        }
        Ast::Prop(name) => {
            lits.push(table.intern(name));
            Ok(())
        }
        Ast::Not(x) => match x.peel() {
            Ast::Prop(name) => {
                lits.push(-table.intern(name));
                Ok(())
            }
            other => Err(CnfError::UnexpectedNode {
                node: other.kind_name().to_string(),
                span: x.span(),
            }),
        },
        other => Err(CnfError::UnexpectedNode {
            node: other.kind_name().to_string(),
            span: ast.span(),
        }),
    }
}

/// Write DIMACS CNF: preamble, then one clause per line terminated by `0`.
/// With `inline_table`, the name table precedes the preamble as `c`
/// comment lines.
pub fn write_dimacs<W: io::Write>(
    w: &mut W,
    clause_set: &ClauseSet,
    inline_table: bool,
) -> io::Result<()> {
    if inline_table {
        for (name, index) in clause_set.table.iter() {
            writeln!(w, "c {} {}", name, index)?;
        }
    }
    writeln!(
        w,
        "p cnf {} {}",
        clause_set.num_vars(),
        clause_set.num_clauses()
    )?;
    write_clauses(w, &clause_set.clauses)
}

/// Write QDIMACS: preamble, quantifier lines, then the clauses.
pub fn write_qdimacs<W: io::Write>(w: &mut W, clause_set: &ClauseSet) -> io::Result<()> {
    writeln!(
        w,
        "p cnf {} {}",
        clause_set.num_vars(),
        clause_set.num_clauses()
    )?;
    for block in &clause_set.prefix {
        let kind = match block.quant {
            Quant::Forall => 'a',
            Quant::Exists => 'e',
        };
        write!(w, "{}", kind)?;
        for var in &block.vars {
            // Prefix variables are interned during construction.
            if let Some(index) = clause_set.table.index_of(var) {
                write!(w, " {}", index)?;
            }
        }
        writeln!(w, " 0")?;
    }
    write_clauses(w, &clause_set.clauses)
}

/// Write the standalone name table: one `<name> <int>` line per
/// proposition.
pub fn write_table<W: io::Write>(w: &mut W, table: &NameTable) -> io::Result<()> {
    for (name, index) in table.iter() {
        writeln!(w, "{} {}", name, index)?;
    }
    Ok(())
}

fn write_clauses<W: io::Write>(w: &mut W, clauses: &[Vec<i32>]) -> io::Result<()> {
    for clause in clauses {
        for lit in clause {
            write!(w, "{} ", lit)?;
        }
        writeln!(w, "0")?;
    }
    Ok(())
}
