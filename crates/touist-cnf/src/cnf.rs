//! Conversion to conjunctive normal form.
//!
//! Negations push inward, `Implies`/`Equiv`/`Xor` lower to `And`/`Or`, a
//! literal or clause disjoined with a conjunction distributes into its
//! conjuncts, and a disjunction of two conjunctions takes the Tseytin
//! route: two fresh propositions reify the sides, keeping the clause count
//! linear. Truth constants survive only at the root, where DIMACS cannot
//! express them directly, as `a ∨ ¬a` / `a ∧ ¬a` over a fresh proposition.

use crate::error::{CnfError, CnfResult};
use touist_eval::{Diagnostics, Phase};
use touist_syntax::Ast;

/// One CNF pass. Fresh auxiliary names start at `&1` for every converter,
/// so a converter must not be reused across passes.
#[derive(Debug, Default)]
pub struct CnfConverter {
    fresh: u64,
    aux: Vec<String>,
    diags: Diagnostics,
}

impl CnfConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the Tseytin auxiliaries allocated so far, in allocation
    /// order. QDIMACS emission quantifies these in the innermost
    /// existential block.
    pub fn aux_names(&self) -> &[String] {
        &self.aux
    }

    /// The diagnostics accumulated by this pass.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diags
    }

    /// Take the accumulated diagnostics, leaving the sink empty.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diags)
    }

    fn fresh_prop(&mut self) -> String {
        self.fresh += 1;
        let name = format!("&{}", self.fresh);
        tracing::trace!(name = %name, "allocated auxiliary proposition");
        self.aux.push(name.clone());
        name
    }

    /// Convert an evaluated propositional formula to CNF.
    pub fn convert(&mut self, formula: &Ast) -> CnfResult<Ast> {
        let mut cnf = self.to_cnf(formula)?;
        // The rewrites fold constants as they go; one more pass mops up any
        // constant that a distribution step left below the root.
        if has_inner_constant(&cnf) {
            cnf = self.to_cnf(&cnf)?;
        }
        match cnf {
            Ast::Top => {
                let a = self.fresh_prop();
                self.diags.warn(
                    Phase::Cnf,
                    format!("formula reduced to `Top`, encoded as the tautology clause `{a} or not {a}`"),
                    None,
                );
                Ok(Ast::or(Ast::prop(a.clone()), Ast::not(Ast::prop(a))))
            }
            Ast::Bottom => {
                let a = self.fresh_prop();
                self.diags.warn(
                    Phase::Cnf,
                    format!("formula reduced to `Bot`, encoded as the contradiction `{a} and not {a}`"),
                    None,
                );
                Ok(Ast::and(Ast::prop(a.clone()), Ast::not(Ast::prop(a))))
            }
            f => Ok(f),
        }
    }

    fn to_cnf(&mut self, f: &Ast) -> CnfResult<Ast> {
        match f.peel() {
            Ast::Top | Ast::Bottom | Ast::Prop(_) => Ok(f.peel().clone()),
            Ast::Not(x) => self.cnf_not(x),
            Ast::And(l, r) => {
                let l = self.to_cnf(l)?;
                let r = self.to_cnf(r)?;
                Ok(and_cnf(l, r))
            }
            Ast::Or(l, r) => {
                let l = self.to_cnf(l)?;
                let r = self.to_cnf(r)?;
                Ok(self.or_cnf(l, r))
            }
            Ast::Implies(l, r) => {
                let nl = self.cnf_not(l)?;
                let r = self.to_cnf(r)?;
                Ok(self.or_cnf(nl, r))
            }
            Ast::Equiv(l, r) => {
                let (l, r) = (l.peel().clone(), r.peel().clone());
                self.to_cnf(&Ast::and(
                    Ast::implies(l.clone(), r.clone()),
                    Ast::implies(r, l),
                ))
            }
            Ast::Xor(l, r) => {
                let (l, r) = (l.peel().clone(), r.peel().clone());
                self.to_cnf(&Ast::and(
                    Ast::or(l.clone(), r.clone()),
                    Ast::or(Ast::not(l), Ast::not(r)),
                ))
            }
            other => Err(CnfError::UnexpectedNode {
                node: other.kind_name().to_string(),
                span: f.span(),
            }),
        }
    }

    /// CNF of the negation of `x`: De Morgan, double-negation elimination,
    /// and the negated forms of the derived connectives.
    fn cnf_not(&mut self, x: &Ast) -> CnfResult<Ast> {
        match x.peel() {
            Ast::Top => Ok(Ast::Bottom),
            Ast::Bottom => Ok(Ast::Top),
            Ast::Prop(_) => Ok(Ast::not(x.peel().clone())),
            Ast::Not(y) => self.to_cnf(y),
            Ast::And(l, r) => {
                let nl = self.cnf_not(l)?;
                let nr = self.cnf_not(r)?;
                Ok(self.or_cnf(nl, nr))
            }
            Ast::Or(l, r) => {
                let nl = self.cnf_not(l)?;
                let nr = self.cnf_not(r)?;
                Ok(and_cnf(nl, nr))
            }
            Ast::Implies(l, r) => {
                let lc = self.to_cnf(l)?;
                let nr = self.cnf_not(r)?;
                Ok(and_cnf(lc, nr))
            }
            Ast::Equiv(l, r) => {
                let (l, r) = (l.peel().clone(), r.peel().clone());
                self.to_cnf(&Ast::xor(l, r))
            }
            Ast::Xor(l, r) => {
                let (l, r) = (l.peel().clone(), r.peel().clone());
                self.to_cnf(&Ast::equiv(l, r))
            }
            other => Err(CnfError::UnexpectedNode {
                node: other.kind_name().to_string(),
                span: x.span(),
            }),
        }
    }

    /// Disjunction of two formulas already in CNF.
    fn or_cnf(&mut self, l: Ast, r: Ast) -> Ast {
        match (l, r) {
            (Ast::Top, _) | (_, Ast::Top) => Ast::Top,
            (Ast::Bottom, x) | (x, Ast::Bottom) => x,
            (l @ Ast::And(..), r @ Ast::And(..)) => {
                // Distributing here would square the clause count; reify
                // both sides instead.
                let a = Ast::prop(self.fresh_prop());
                let b = Ast::prop(self.fresh_prop());
                let left = push_lit(Ast::not(a.clone()), l);
                let right = push_lit(Ast::not(b.clone()), r);
                Ast::and(Ast::or(a, b), Ast::and(left, right))
            }
            (l, r @ Ast::And(..)) => push_lit(l, r),
            (l @ Ast::And(..), r) => push_lit(r, l),
            (l, r) => Ast::or(l, r),
        }
    }
}

/// Conjunction of two CNF formulas, folding constants.
fn and_cnf(l: Ast, r: Ast) -> Ast {
    match (l, r) {
        (Ast::Bottom, _) | (_, Ast::Bottom) => Ast::Bottom,
        (Ast::Top, x) | (x, Ast::Top) => x,
        (l, r) => Ast::and(l, r),
    }
}

/// Disjoin a literal (or clause) into every conjunct of a CNF formula:
/// `l ∨ (c1 ∧ c2) ≡ (l ∨ c1) ∧ (l ∨ c2)`.
fn push_lit(l: Ast, cnf: Ast) -> Ast {
    match cnf {
        Ast::And(a, b) => Ast::and(push_lit(l.clone(), *a), push_lit(l, *b)),
        Ast::Top => Ast::Top,
        Ast::Bottom => l,
        clause => Ast::or(l, clause),
    }
}

/// Check for a truth constant strictly below the root.
fn has_inner_constant(f: &Ast) -> bool {
    fn any_constant(f: &Ast) -> bool {
        match f {
            Ast::Top | Ast::Bottom => true,
            Ast::Not(x) => any_constant(x),
            Ast::And(l, r) | Ast::Or(l, r) => any_constant(l) || any_constant(r),
            _ => false,
        }
    }
    match f {
        Ast::Not(x) => any_constant(x),
        Ast::And(l, r) | Ast::Or(l, r) => any_constant(l) || any_constant(r),
        _ => false,
    }
}

/// Check the CNF shape invariant: the formula is `Top`, `Bottom`, or a
/// conjunction of disjunctions of literals.
pub fn is_cnf(ast: &Ast) -> bool {
    fn clause(ast: &Ast) -> bool {
        match ast {
            Ast::Or(l, r) => clause(l) && clause(r),
            lit => lit.is_literal(),
        }
    }
    fn conjunction(ast: &Ast) -> bool {
        match ast {
            Ast::And(l, r) => conjunction(l) && conjunction(r),
            other => clause(other),
        }
    }
    matches!(ast, Ast::Top | Ast::Bottom) || conjunction(ast)
}
