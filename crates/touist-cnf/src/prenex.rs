//! Quantifier prefix extraction for QBF.
//!
//! Input formulas are assumed prenex: a chain of `Forall`/`Exists` wrappers
//! around a quantifier-free matrix. This module splits the chain off,
//! groups consecutive same-kind quantifiers into blocks, and appends the
//! Tseytin auxiliaries to the innermost existential block.

use crate::error::{CnfError, CnfResult};
use touist_syntax::Ast;

/// Quantifier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quant {
    Forall,
    Exists,
}

/// A maximal run of same-kind quantifiers, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantBlock {
    pub quant: Quant,
    pub vars: Vec<String>,
}

/// Split a prenex formula into its quantifier prefix and matrix.
///
/// Fails if a quantifier occurs below a connective, which means the input
/// was not prenex.
pub fn split_prenex(ast: &Ast) -> CnfResult<(Vec<(Quant, String)>, &Ast)> {
    let mut prefix = Vec::new();
    let mut cur = ast;
    loop {
        match cur.peel() {
            Ast::Forall(p, body) => {
                prefix.push((Quant::Forall, prop_name(p)?));
                cur = body;
            }
            Ast::Exists(p, body) => {
                prefix.push((Quant::Exists, prop_name(p)?));
                cur = body;
            }
            _ => break,
        }
    }
    if contains_quantifier(cur.peel()) {
        return Err(CnfError::MisplacedQuantifier { span: cur.span() });
    }
    Ok((prefix, cur))
}

/// Group a prefix into blocks and append the Tseytin auxiliaries to the
/// innermost existential block, creating one if the prefix ends
/// universally (or is empty).
pub fn group_blocks(prefix: Vec<(Quant, String)>, aux: &[String]) -> Vec<QuantBlock> {
    let mut blocks: Vec<QuantBlock> = Vec::new();
    for (quant, var) in prefix {
        match blocks.last_mut() {
            Some(block) if block.quant == quant => block.vars.push(var),
            _ => blocks.push(QuantBlock {
                quant,
                vars: vec![var],
            }),
        }
    }
    if !aux.is_empty() {
        match blocks.last_mut() {
            Some(block) if block.quant == Quant::Exists => {
                block.vars.extend(aux.iter().cloned());
            }
            _ => blocks.push(QuantBlock {
                quant: Quant::Exists,
                vars: aux.to_vec(),
            }),
        }
    }
    blocks
}

fn prop_name(p: &Ast) -> CnfResult<String> {
    match p.peel() {
        Ast::Prop(name) => Ok(name.clone()),
        other => Err(CnfError::UnexpectedNode {
            node: other.kind_name().to_string(),
            span: p.span(),
        }),
    }
}

fn contains_quantifier(ast: &Ast) -> bool {
    match ast {
        Ast::Forall(..) | Ast::Exists(..) => true,
        Ast::Not(x) => contains_quantifier(x),
        Ast::And(l, r)
        | Ast::Or(l, r)
        | Ast::Xor(l, r)
        | Ast::Implies(l, r)
        | Ast::Equiv(l, r) => contains_quantifier(l) || contains_quantifier(r),
        _ => false,
    }
}
