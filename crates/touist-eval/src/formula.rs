//! Formula evaluator.
//!
//! Walks formula-shaped nodes and returns a purely propositional AST:
//! variables become propositions, generators unroll over their sets,
//! cardinality constraints expand to propositional templates, and `Top`/
//! `Bottom` propagate eagerly so degenerate subformulas never materialise.

use crate::config::EmptyGeneratorPolicy;
use crate::diag::Phase;
use crate::env::Binding;
use crate::error::{EvalError, EvalResult};
use crate::expr::{type_error, Evaluator, NumOp};
use touist_syntax::{Ast, SetValue, Span};

/// Name of the placeholder proposition that stands in for a cardinality
/// constraint in check-only mode. The `&` prefix is reserved, so it can
/// never collide with a user proposition.
pub const CHECK_ONLY_DUMMY: &str = "&dummy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenKind {
    Bigand,
    Bigor,
}

#[derive(Debug, Clone, Copy)]
enum CardKind {
    Exact,
    Atleast,
    Atmost,
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn accepts(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CmpOp::Eq => ordering == Equal,
            CmpOp::Ne => ordering != Equal,
            CmpOp::Lt => ordering == Less,
            CmpOp::Le => ordering != Greater,
            CmpOp::Gt => ordering == Greater,
            CmpOp::Ge => ordering != Less,
        }
    }

    fn rebuild(self, l: Ast, r: Ast) -> Ast {
        let (l, r) = (Box::new(l), Box::new(r));
        match self {
            CmpOp::Eq => Ast::Equal(l, r),
            CmpOp::Ne => Ast::NotEqual(l, r),
            CmpOp::Lt => Ast::Lesser(l, r),
            CmpOp::Le => Ast::LesserEq(l, r),
            CmpOp::Gt => Ast::Greater(l, r),
            CmpOp::Ge => Ast::GreaterEq(l, r),
        }
    }
}

impl<'a> Evaluator<'a> {
    /// Evaluate a whole program (or a bare formula).
    ///
    /// Top-level declarations populate the global environment in source
    /// order, later declarations overwriting earlier ones; the remaining
    /// statements are evaluated as formulas and conjoined.
    pub fn eval(&mut self, ast: &Ast) -> EvalResult<Ast> {
        let span = ast.span_or_dummy();
        match ast.peel() {
            Ast::Program(stmts) => {
                for stmt in stmts {
                    if let Ast::Affect { var, value } = stmt.peel() {
                        self.eval_affect(var, value, stmt.span_or_dummy())?;
                    }
                }
                let mut formula: Option<Ast> = None;
                for stmt in stmts {
                    if matches!(stmt.peel(), Ast::Affect { .. }) {
                        continue;
                    }
                    let f = self.eval_formula(stmt)?;
                    formula = Some(match formula {
                        None => f,
                        Some(acc) => conj(acc, f),
                    });
                }
                formula.ok_or(EvalError::NoFormula { span })
            }
            _ => self.eval_formula(ast),
        }
    }

    fn eval_affect(&mut self, var: &Ast, value: &Ast, span: Span) -> EvalResult<()> {
        let (prefix, indices) = match var.peel() {
            Ast::Var { prefix, indices } => (prefix.clone(), indices.clone()),
            other => {
                return Err(EvalError::MalformedAst {
                    message: format!("declaration binds a variable, found {}", other.kind_name()),
                    span,
                })
            }
        };
        let name = self.var_canonical_name(&prefix, &indices, span)?;
        let bound = self.eval_expr(value)?;
        let var_span = var.span().unwrap_or(span);
        self.env.bind_global(name, Binding::new(bound, var_span));
        Ok(())
    }

    /// Evaluate a node expected to produce a formula.
    pub fn eval_formula(&mut self, ast: &Ast) -> EvalResult<Ast> {
        let span = ast.span_or_dummy();
        match ast.peel() {
            Ast::Top | Ast::Bottom | Ast::Prop(_) => Ok(ast.peel().clone()),
            Ast::Bool(b) => Ok(if *b { Ast::Top } else { Ast::Bottom }),
            node @ (Ast::Int(_) | Ast::Float(_)) => {
                if self.config.smt {
                    Ok(node.clone())
                } else {
                    Err(type_error("a formula", node, span))
                }
            }

            Ast::Var { prefix, indices } => self.formula_var(prefix, indices, span),
            Ast::UnexpProp { name, indices } => {
                match self.expand_prop(name, indices, span)? {
                    p @ Ast::Prop(_) => Ok(p),
                    other => Err(type_error("a single proposition", &other, span)),
                }
            }

            Ast::Not(x) => Ok(neg(self.eval_formula(x)?)),
            Ast::And(l, r) => {
                let l = self.eval_formula(l)?;
                let r = self.eval_formula(r)?;
                Ok(conj(l, r))
            }
            Ast::Or(l, r) => {
                let l = self.eval_formula(l)?;
                let r = self.eval_formula(r)?;
                Ok(disj(l, r))
            }
            Ast::Implies(l, r) => {
                let l = self.eval_formula(l)?;
                let r = self.eval_formula(r)?;
                Ok(imply(l, r))
            }
            Ast::Equiv(l, r) => {
                let l = self.eval_formula(l)?;
                let r = self.eval_formula(r)?;
                Ok(iff(l, r))
            }
            Ast::Xor(l, r) => {
                let l = self.eval_formula(l)?;
                let r = self.eval_formula(r)?;
                Ok(excl(l, r))
            }
            Ast::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.expect_bool(cond, span)? {
                    self.eval_formula(then_branch)
                } else {
                    self.eval_formula(else_branch)
                }
            }

            Ast::Equal(l, r) => self.formula_compare(CmpOp::Eq, l, r, ast, span),
            Ast::NotEqual(l, r) => self.formula_compare(CmpOp::Ne, l, r, ast, span),
            Ast::Lesser(l, r) => self.formula_compare(CmpOp::Lt, l, r, ast, span),
            Ast::LesserEq(l, r) => self.formula_compare(CmpOp::Le, l, r, ast, span),
            Ast::Greater(l, r) => self.formula_compare(CmpOp::Gt, l, r, ast, span),
            Ast::GreaterEq(l, r) => self.formula_compare(CmpOp::Ge, l, r, ast, span),

            Ast::Bigand {
                vars,
                sets,
                when,
                body,
            } => self.eval_generator(GenKind::Bigand, vars, sets, when, body, span),
            Ast::Bigor {
                vars,
                sets,
                when,
                body,
            } => self.eval_generator(GenKind::Bigor, vars, sets, when, body, span),

            Ast::Let { var, value, body } => {
                self.eval_let(var, value, body, span, Self::eval_formula)
            }

            Ast::Exact(n, s) => self.eval_cardinality(CardKind::Exact, n, s, span),
            Ast::Atleast(n, s) => self.eval_cardinality(CardKind::Atleast, n, s, span),
            Ast::Atmost(n, s) => self.eval_cardinality(CardKind::Atmost, n, s, span),

            Ast::Forall(p, body) => self.eval_quantifier(p, body, span, Ast::Forall),
            Ast::Exists(p, body) => self.eval_quantifier(p, body, span, Ast::Exists),

            Ast::Affect { .. } | Ast::Program(_) => Err(EvalError::MalformedAst {
                message: format!("{} in formula position", ast.peel().kind_name()),
                span,
            }),

            // Anything else is expression-shaped. A boolean result (a
            // membership or emptiness test, say) folds to a constant; any
            // other value has no business in formula position.
            _ => match self.eval_expr(ast)? {
                Ast::Bool(true) => Ok(Ast::Top),
                Ast::Bool(false) => Ok(Ast::Bottom),
                other => Err(type_error("a formula", &other, span)),
            },
        }
    }

    /// A variable in formula position. Resolves the canonical name, then
    /// falls back to the computed-name form: `$v(a,b)` with `$v` bound to a
    /// proposition `q` denotes `q(a,b)`.
    fn formula_var(
        &mut self,
        prefix: &str,
        indices: &Option<Vec<Ast>>,
        span: Span,
    ) -> EvalResult<Ast> {
        let name = self.var_canonical_name(prefix, indices, span)?;
        if let Some(binding) = self.env.lookup(&name) {
            let value = binding.value.clone();
            return match value {
                Ast::Prop(_) => Ok(value),
                Ast::Int(_) | Ast::Float(_) if self.config.smt => Ok(value),
                other => Err(type_error("a proposition", &other, span)),
            };
        }
        if indices.is_some() {
            if let Some(binding) = self.env.lookup(prefix) {
                let value = binding.value.clone();
                return match value {
                    Ast::Prop(q) => match self.expand_prop(&q, indices, span)? {
                        p @ Ast::Prop(_) => Ok(p),
                        other => Err(type_error("a single proposition", &other, span)),
                    },
                    other => Err(type_error("a proposition", &other, span)),
                };
            }
        }
        Err(EvalError::UnknownVariable { name, span })
    }

    /// A comparison in formula position. In SAT mode it must fold to a
    /// boolean; in SMT mode it may stay structural over arithmetic terms.
    fn formula_compare(
        &mut self,
        op: CmpOp,
        l: &Ast,
        r: &Ast,
        whole: &Ast,
        span: Span,
    ) -> EvalResult<Ast> {
        if !self.config.smt {
            return match self.eval_expr(whole)? {
                Ast::Bool(true) => Ok(Ast::Top),
                Ast::Bool(false) => Ok(Ast::Bottom),
                other => Err(type_error("a bool", &other, span)),
            };
        }
        let lv = self.eval_arith(l)?;
        let rv = self.eval_arith(r)?;
        let folded = match (&lv, &rv) {
            (Ast::Int(a), Ast::Int(b)) => Some(op.accepts(a.cmp(b))),
            (Ast::Float(a), Ast::Float(b)) => {
                Some(op.accepts(a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)))
            }
            (Ast::Int(_), other @ Ast::Float(_)) | (other @ Ast::Float(_), Ast::Int(_)) => {
                return Err(type_error("matching numeric flavors", other, span))
            }
            _ => None,
        };
        match folded {
            Some(true) => Ok(Ast::Top),
            Some(false) => Ok(Ast::Bottom),
            None => Ok(op.rebuild(lv, rv)),
        }
    }

    /// Fold an SMT arithmetic term: numeric literals compute, everything
    /// else keeps its structure with folded children.
    fn eval_arith(&mut self, ast: &Ast) -> EvalResult<Ast> {
        let span = ast.span_or_dummy();
        match ast.peel() {
            node @ (Ast::Int(_) | Ast::Float(_) | Ast::Prop(_)) => Ok(node.clone()),
            Ast::UnexpProp { name, indices } => {
                match self.expand_prop(name, indices, span)? {
                    p @ Ast::Prop(_) => Ok(p),
                    other => Err(type_error("a single proposition", &other, span)),
                }
            }
            Ast::Var { prefix, indices } => self.formula_var(prefix, indices, span),
            Ast::Neg(x) => match self.eval_arith(x)? {
                Ast::Int(n) => Ok(Ast::Int(-n)),
                Ast::Float(v) => Ok(Ast::Float(-v)),
                other => Ok(Ast::Neg(Box::new(other))),
            },
            Ast::Add(l, r) => self.arith_binop(NumOp::Add, l, r, span),
            Ast::Sub(l, r) => self.arith_binop(NumOp::Sub, l, r, span),
            Ast::Mul(l, r) => self.arith_binop(NumOp::Mul, l, r, span),
            Ast::Div(l, r) => self.arith_binop(NumOp::Div, l, r, span),
            Ast::Mod(l, r) => self.arith_binop(NumOp::Mod, l, r, span),
            other => Err(type_error("a numeric term", other, span)),
        }
    }

    fn arith_binop(&mut self, op: NumOp, l: &Ast, r: &Ast, span: Span) -> EvalResult<Ast> {
        let lv = self.eval_arith(l)?;
        let rv = self.eval_arith(r)?;
        match (&lv, &rv) {
            (Ast::Int(a), Ast::Int(b)) => op.apply_int(*a, *b, span),
            (Ast::Float(a), Ast::Float(b)) => op.apply_float(*a, *b, span),
            (Ast::Int(_), other @ Ast::Float(_)) | (other @ Ast::Float(_), Ast::Int(_)) => {
                Err(type_error("matching numeric flavors", other, span))
            }
            _ => Ok(op.rebuild(lv, rv)),
        }
    }

    fn eval_quantifier(
        &mut self,
        p: &Ast,
        body: &Ast,
        span: Span,
        rebuild: impl FnOnce(Box<Ast>, Box<Ast>) -> Ast,
    ) -> EvalResult<Ast> {
        let p = match self.eval_formula(p)? {
            p @ Ast::Prop(_) => p,
            other => return Err(type_error("a proposition", &other, span)),
        };
        let body = self.eval_formula(body)?;
        match body {
            Ast::Top | Ast::Bottom => Ok(body),
            body => Ok(rebuild(Box::new(p), Box::new(body))),
        }
    }

    fn eval_generator(
        &mut self,
        kind: GenKind,
        vars: &[Ast],
        sets: &[Ast],
        when: &Option<Box<Ast>>,
        body: &Ast,
        span: Span,
    ) -> EvalResult<Ast> {
        if vars.is_empty() || vars.len() != sets.len() {
            let vars_span = vars
                .iter()
                .filter_map(Ast::span)
                .reduce(Span::merge)
                .unwrap_or(span);
            return Err(EvalError::ArityMismatch {
                vars: vars.len(),
                sets: sets.len(),
                span: vars_span,
            });
        }

        // N-ary form: unroll one variable at a time. The `when` clause
        // stays attached to the innermost generator so the predicate sees
        // every bound variable.
        if vars.len() > 1 {
            let inner = match kind {
                GenKind::Bigand => Ast::Bigand {
                    vars: vars[1..].to_vec(),
                    sets: sets[1..].to_vec(),
                    when: when.clone(),
                    body: Box::new(body.clone()),
                },
                GenKind::Bigor => Ast::Bigor {
                    vars: vars[1..].to_vec(),
                    sets: sets[1..].to_vec(),
                    when: when.clone(),
                    body: Box::new(body.clone()),
                },
            };
            return self.eval_generator(kind, &vars[..1], &sets[..1], &None, &inner, span);
        }

        let var = &vars[0];
        let prefix = match var.peel() {
            Ast::Var {
                prefix,
                indices: None,
            } => prefix.clone(),
            other => {
                return Err(EvalError::MalformedAst {
                    message: format!(
                        "generator binds a simple variable, found {}",
                        other.kind_name()
                    ),
                    span: var.span().unwrap_or(span),
                })
            }
        };
        let var_span = var.span().unwrap_or(span);

        let set = self.expect_set(&sets[0], span)?;
        let mut elements = enumerate_set(&set);
        if self.config.check_only {
            elements.truncate(1);
        }

        let mut kept = Vec::new();
        for elem in elements {
            self.env
                .push_local(prefix.clone(), Binding::new(elem, var_span));
            let step = self.generator_step(when, body);
            self.env.pop_local();
            if let Some(f) = step? {
                kept.push(f);
            }
        }

        let (neutral, keyword) = match kind {
            GenKind::Bigand => (Ast::Top, "bigand"),
            GenKind::Bigor => (Ast::Bottom, "bigor"),
        };

        if kept.is_empty() {
            match self.config.empty_generator {
                EmptyGeneratorPolicy::Warn => {
                    tracing::warn!(generator = keyword, "generator kept no instantiation");
                    self.diags.warn(
                        Phase::Eval,
                        format!(
                            "{keyword} kept no instantiation, producing `{neutral}`"
                        ),
                        Some(span),
                    );
                }
                EmptyGeneratorPolicy::Fatal => {
                    return Err(EvalError::EmptyGenerator { span });
                }
            }
            return Ok(neutral);
        }

        let folded = kept.into_iter().reduce(|acc, f| match kind {
            GenKind::Bigand => conj(acc, f),
            GenKind::Bigor => disj(acc, f),
        });
        Ok(folded.unwrap_or(neutral))
    }

    fn generator_step(&mut self, when: &Option<Box<Ast>>, body: &Ast) -> EvalResult<Option<Ast>> {
        if let Some(cond) = when {
            let cond_span = cond.span_or_dummy();
            if !self.expect_bool(cond, cond_span)? {
                return Ok(None);
            }
        }
        self.eval_formula(body).map(Some)
    }

    fn eval_cardinality(
        &mut self,
        kind: CardKind,
        n: &Ast,
        set: &Ast,
        span: Span,
    ) -> EvalResult<Ast> {
        let n = match self.eval_expr(n)? {
            Ast::Int(v) => v,
            other => return Err(type_error("an int", &other, n.span().unwrap_or(span))),
        };
        if n < 0 {
            return Err(type_error("a non-negative count", &Ast::Int(n), span));
        }
        let props: Vec<String> = match self.expect_set(set, span)? {
            SetValue::Props(s) => s.into_iter().collect(),
            SetValue::Empty => Vec::new(),
            other => return Err(type_error("a proposition set", &Ast::Set(other), span)),
        };

        if self.config.check_only {
            return Ok(Ast::Prop(CHECK_ONLY_DUMMY.to_string()));
        }

        let n = n as usize;
        let k = props.len();
        match kind {
            CardKind::Exact => Ok(disj_all(combinations(k, n).into_iter().map(|subset| {
                let mut selected = vec![false; k];
                for &i in &subset {
                    selected[i] = true;
                }
                conj_all(props.iter().enumerate().map(|(i, p)| {
                    if selected[i] {
                        Ast::prop(p.clone())
                    } else {
                        Ast::not(Ast::prop(p.clone()))
                    }
                }))
            }))),
            CardKind::Atleast => Ok(disj_all(combinations(k, n).into_iter().map(|subset| {
                conj_all(subset.iter().map(|&i| Ast::prop(props[i].clone())))
            }))),
            CardKind::Atmost => {
                if n >= k {
                    return Ok(Ast::Top);
                }
                Ok(disj_all(combinations(k, k - n).into_iter().map(|subset| {
                    conj_all(subset.iter().map(|&i| Ast::not(Ast::prop(props[i].clone()))))
                })))
            }
        }
    }
}

/// Conjunction with eager neutral-element propagation.
pub(crate) fn conj(l: Ast, r: Ast) -> Ast {
    match (l, r) {
        (Ast::Bottom, _) | (_, Ast::Bottom) => Ast::Bottom,
        (Ast::Top, x) | (x, Ast::Top) => x,
        (l, r) => Ast::and(l, r),
    }
}

/// Disjunction with eager neutral-element propagation.
pub(crate) fn disj(l: Ast, r: Ast) -> Ast {
    match (l, r) {
        (Ast::Top, _) | (_, Ast::Top) => Ast::Top,
        (Ast::Bottom, x) | (x, Ast::Bottom) => x,
        (l, r) => Ast::or(l, r),
    }
}

/// Negation with constant folding.
pub(crate) fn neg(x: Ast) -> Ast {
    match x {
        Ast::Top => Ast::Bottom,
        Ast::Bottom => Ast::Top,
        x => Ast::not(x),
    }
}

/// Implication with constant folding.
pub(crate) fn imply(l: Ast, r: Ast) -> Ast {
    match (l, r) {
        (_, Ast::Top) | (Ast::Bottom, _) => Ast::Top,
        (Ast::Top, x) => x,
        (x, Ast::Bottom) => neg(x),
        (l, r) => Ast::implies(l, r),
    }
}

/// Equivalence with constant folding.
pub(crate) fn iff(l: Ast, r: Ast) -> Ast {
    match (l, r) {
        (Ast::Top, x) | (x, Ast::Top) => x,
        (Ast::Bottom, x) | (x, Ast::Bottom) => neg(x),
        (l, r) => Ast::equiv(l, r),
    }
}

/// Exclusive or with constant folding.
pub(crate) fn excl(l: Ast, r: Ast) -> Ast {
    match (l, r) {
        (Ast::Top, x) | (x, Ast::Top) => neg(x),
        (Ast::Bottom, x) | (x, Ast::Bottom) => x,
        (l, r) => Ast::xor(l, r),
    }
}

fn conj_all(iter: impl IntoIterator<Item = Ast>) -> Ast {
    iter.into_iter().fold(Ast::Top, conj)
}

fn disj_all(iter: impl IntoIterator<Item = Ast>) -> Ast {
    iter.into_iter().fold(Ast::Bottom, disj)
}

/// Enumerate a set's elements as value nodes, in flavor order.
fn enumerate_set(set: &SetValue) -> Vec<Ast> {
    match set {
        SetValue::Empty => Vec::new(),
        SetValue::Ints(s) => s.iter().map(|n| Ast::Int(*n)).collect(),
        SetValue::Floats(s) => s.iter().map(|v| Ast::Float(v.0)).collect(),
        SetValue::Props(s) => s.iter().map(|p| Ast::prop(p.clone())).collect(),
    }
}

/// All `n`-element index subsets of `0..k`, in lexicographic order.
fn combinations(k: usize, n: usize) -> Vec<Vec<usize>> {
    fn go(start: usize, k: usize, n: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == n {
            out.push(current.clone());
            return;
        }
        let remaining = n - current.len();
        for i in start..=(k - remaining) {
            current.push(i);
            go(i + 1, k, n, current, out);
            current.pop();
        }
    }
    if n > k {
        return Vec::new();
    }
    let mut out = Vec::new();
    go(0, k, n, &mut Vec::new(), &mut out);
    out
}

/// Check the evaluator's output-purity invariant: only propositional
/// connectives, quantified propositions, and (for SMT) arithmetic and
/// comparisons over numeric leaves remain.
pub fn is_fully_evaluated(ast: &Ast) -> bool {
    match ast {
        Ast::Prop(_) | Ast::Top | Ast::Bottom | Ast::Int(_) | Ast::Float(_) => true,
        Ast::Not(x) | Ast::Neg(x) => is_fully_evaluated(x),
        Ast::And(l, r)
        | Ast::Or(l, r)
        | Ast::Xor(l, r)
        | Ast::Implies(l, r)
        | Ast::Equiv(l, r)
        | Ast::Add(l, r)
        | Ast::Sub(l, r)
        | Ast::Mul(l, r)
        | Ast::Div(l, r)
        | Ast::Mod(l, r)
        | Ast::Equal(l, r)
        | Ast::NotEqual(l, r)
        | Ast::Lesser(l, r)
        | Ast::LesserEq(l, r)
        | Ast::Greater(l, r)
        | Ast::GreaterEq(l, r) => is_fully_evaluated(l) && is_fully_evaluated(r),
        Ast::Forall(p, body) | Ast::Exists(p, body) => {
            matches!(p.peel(), Ast::Prop(_)) && is_fully_evaluated(body)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalConfig;
    use crate::diag::Severity;

    fn eval(ast: &Ast) -> EvalResult<Ast> {
        let config = EvalConfig::default();
        let mut ev = Evaluator::new(&config);
        ev.eval(ast)
    }

    fn range(lo: i64, hi: i64) -> Ast {
        Ast::Range(Box::new(Ast::Int(lo)), Box::new(Ast::Int(hi)))
    }

    fn p_of(i: i64) -> Ast {
        Ast::prop(format!("p({i})"))
    }

    #[test]
    fn test_bigand_over_range() {
        // bigand $i in [1..3]: p($i) end  =>  p(1) and p(2) and p(3)
        let ast = Ast::Bigand {
            vars: vec![Ast::var("$i")],
            sets: vec![range(1, 3)],
            when: None,
            body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
        };
        let f = eval(&ast).unwrap();
        assert_eq!(f, Ast::and(Ast::and(p_of(1), p_of(2)), p_of(3)));
        assert!(is_fully_evaluated(&f));
    }

    #[test]
    fn test_bigand_when_filters() {
        // bigand $i in [1..5] when $i > 2: p($i) end  =>  p(3) and p(4) and p(5)
        let ast = Ast::Bigand {
            vars: vec![Ast::var("$i")],
            sets: vec![range(1, 5)],
            when: Some(Box::new(Ast::Greater(
                Box::new(Ast::var("$i")),
                Box::new(Ast::Int(2)),
            ))),
            body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
        };
        let f = eval(&ast).unwrap();
        assert_eq!(f, Ast::and(Ast::and(p_of(3), p_of(4)), p_of(5)));
    }

    #[test]
    fn test_nested_bigand_with_computed_name() {
        // $F = [a,b,c]
        // bigand $f in $F: bigand $i in [1..2]: $f($i) end end
        let program = Ast::Program(vec![
            Ast::Affect {
                var: Box::new(Ast::var("$F")),
                value: Box::new(Ast::SetDecl(vec![
                    Ast::prop("a"),
                    Ast::prop("b"),
                    Ast::prop("c"),
                ])),
            },
            Ast::Bigand {
                vars: vec![Ast::var("$f")],
                sets: vec![Ast::var("$F")],
                when: None,
                body: Box::new(Ast::Bigand {
                    vars: vec![Ast::var("$i")],
                    sets: vec![range(1, 2)],
                    when: None,
                    body: Box::new(Ast::var_indexed("$f", vec![Ast::var("$i")])),
                }),
            },
        ]);
        let f = eval(&program).unwrap();
        // The fold nests left inside each bigand and across them.
        let inner = |x: &str, y: &str| Ast::and(Ast::prop(x), Ast::prop(y));
        let want = Ast::and(
            Ast::and(inner("a(1)", "a(2)"), inner("b(1)", "b(2)")),
            inner("c(1)", "c(2)"),
        );
        assert_eq!(f, want);
    }

    #[test]
    fn test_multi_variable_generator() {
        // bigand $i,$j in [1..2],[1..2]: q($i,$j) end
        let ast = Ast::Bigand {
            vars: vec![Ast::var("$i"), Ast::var("$j")],
            sets: vec![range(1, 2), range(1, 2)],
            when: None,
            body: Box::new(Ast::unexp_prop(
                "q",
                Some(vec![Ast::var("$i"), Ast::var("$j")]),
            )),
        };
        let f = eval(&ast).unwrap();
        let q = |i: i64, j: i64| Ast::prop(format!("q({i},{j})"));
        let want = Ast::and(
            Ast::and(q(1, 1), q(1, 2)),
            Ast::and(q(2, 1), q(2, 2)),
        );
        assert_eq!(f, want);
    }

    #[test]
    fn test_generator_arity_mismatch() {
        let ast = Ast::Bigand {
            vars: vec![Ast::var("$i"), Ast::var("$j")],
            sets: vec![range(1, 2)],
            when: None,
            body: Box::new(Ast::prop("a")),
        };
        assert!(matches!(
            eval(&ast),
            Err(EvalError::ArityMismatch { vars: 2, sets: 1, .. })
        ));
    }

    #[test]
    fn test_empty_generator_warns_and_yields_neutral() {
        let config = EvalConfig::default();
        let mut ev = Evaluator::new(&config);
        let bigand = Ast::Bigand {
            vars: vec![Ast::var("$i")],
            sets: vec![Ast::SetDecl(vec![])],
            when: None,
            body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
        };
        assert_eq!(ev.eval(&bigand).unwrap(), Ast::Top);
        let diags = ev.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().severity, Severity::Warning);

        let bigor = Ast::Bigor {
            vars: vec![Ast::var("$i")],
            sets: vec![Ast::SetDecl(vec![])],
            when: None,
            body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
        };
        assert_eq!(ev.eval(&bigor).unwrap(), Ast::Bottom);
    }

    #[test]
    fn test_empty_generator_fatal_policy() {
        let config = EvalConfig {
            empty_generator: EmptyGeneratorPolicy::Fatal,
            ..EvalConfig::default()
        };
        let mut ev = Evaluator::new(&config);
        let ast = Ast::Bigand {
            vars: vec![Ast::var("$i")],
            sets: vec![Ast::SetDecl(vec![])],
            when: None,
            body: Box::new(Ast::prop("a")),
        };
        assert!(matches!(
            ev.eval(&ast),
            Err(EvalError::EmptyGenerator { .. })
        ));
    }

    #[test]
    fn test_when_filtering_everything_is_empty_generator() {
        let ast = Ast::Bigand {
            vars: vec![Ast::var("$i")],
            sets: vec![range(1, 3)],
            when: Some(Box::new(Ast::Greater(
                Box::new(Ast::var("$i")),
                Box::new(Ast::Int(10)),
            ))),
            body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
        };
        assert_eq!(eval(&ast).unwrap(), Ast::Top);
    }

    #[test]
    fn test_exact_encoding() {
        // exact(1, [a,b]) = (a and not b) or (not a and b)
        let ast = Ast::Exact(
            Box::new(Ast::Int(1)),
            Box::new(Ast::SetDecl(vec![Ast::prop("a"), Ast::prop("b")])),
        );
        let f = eval(&ast).unwrap();
        let want = Ast::or(
            Ast::and(Ast::prop("a"), Ast::not(Ast::prop("b"))),
            Ast::and(Ast::not(Ast::prop("a")), Ast::prop("b")),
        );
        assert_eq!(f, want);
    }

    #[test]
    fn test_cardinality_degenerate_cases() {
        let empty = || Box::new(Ast::SetDecl(vec![]));
        let ab = || Box::new(Ast::SetDecl(vec![Ast::prop("a"), Ast::prop("b")]));
        assert_eq!(
            eval(&Ast::Exact(Box::new(Ast::Int(0)), empty())).unwrap(),
            Ast::Top
        );
        assert_eq!(
            eval(&Ast::Exact(Box::new(Ast::Int(2)), empty())).unwrap(),
            Ast::Bottom
        );
        // n greater than the set size
        assert_eq!(
            eval(&Ast::Exact(Box::new(Ast::Int(3)), ab())).unwrap(),
            Ast::Bottom
        );
        assert_eq!(
            eval(&Ast::Atleast(Box::new(Ast::Int(0)), ab())).unwrap(),
            Ast::Top
        );
        assert_eq!(
            eval(&Ast::Atmost(Box::new(Ast::Int(2)), ab())).unwrap(),
            Ast::Top
        );
    }

    #[test]
    fn test_atmost_encoding() {
        // atmost(1, [a,b]) = not a or not b
        let ast = Ast::Atmost(
            Box::new(Ast::Int(1)),
            Box::new(Ast::SetDecl(vec![Ast::prop("a"), Ast::prop("b")])),
        );
        let f = eval(&ast).unwrap();
        let want = Ast::or(Ast::not(Ast::prop("a")), Ast::not(Ast::prop("b")));
        assert_eq!(f, want);
    }

    #[test]
    fn test_check_only_cardinality_dummy() {
        let config = EvalConfig::check_only();
        let mut ev = Evaluator::new(&config);
        let ast = Ast::Exact(
            Box::new(Ast::Int(2)),
            Box::new(Ast::unexp_prop(
                "p",
                Some(vec![Ast::Range(Box::new(Ast::Int(1)), Box::new(Ast::Int(50)))]),
            )),
        );
        assert_eq!(ev.eval(&ast).unwrap(), Ast::prop(CHECK_ONLY_DUMMY));
    }

    #[test]
    fn test_check_only_truncates_generators() {
        let config = EvalConfig::check_only();
        let mut ev = Evaluator::new(&config);
        let ast = Ast::Bigand {
            vars: vec![Ast::var("$i")],
            sets: vec![range(1, 100)],
            when: None,
            body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
        };
        assert_eq!(ev.eval(&ast).unwrap(), p_of(1));
    }

    #[test]
    fn test_top_bottom_shortcuts() {
        assert_eq!(
            eval(&Ast::and(Ast::prop("a"), Ast::Top)).unwrap(),
            Ast::prop("a")
        );
        assert_eq!(eval(&Ast::and(Ast::prop("a"), Ast::Bottom)).unwrap(), Ast::Bottom);
        assert_eq!(eval(&Ast::or(Ast::prop("a"), Ast::Top)).unwrap(), Ast::Top);
        assert_eq!(
            eval(&Ast::or(Ast::prop("a"), Ast::Bottom)).unwrap(),
            Ast::prop("a")
        );
        assert_eq!(
            eval(&Ast::implies(Ast::prop("a"), Ast::Bottom)).unwrap(),
            Ast::not(Ast::prop("a"))
        );
        assert_eq!(eval(&Ast::implies(Ast::Bottom, Ast::prop("a"))).unwrap(), Ast::Top);
        assert_eq!(
            eval(&Ast::implies(Ast::Top, Ast::prop("a"))).unwrap(),
            Ast::prop("a")
        );
        assert_eq!(eval(&Ast::not(Ast::Top)).unwrap(), Ast::Bottom);
    }

    #[test]
    fn test_comparison_folds_inside_indices() {
        // t(1 > 10) materialises the name t(false)
        let ast = Ast::unexp_prop(
            "t",
            Some(vec![Ast::Greater(Box::new(Ast::Int(1)), Box::new(Ast::Int(10)))]),
        );
        assert_eq!(eval(&ast).unwrap(), Ast::prop("t(false)"));
        let ast = Ast::unexp_prop(
            "t",
            Some(vec![Ast::Lesser(Box::new(Ast::Int(1)), Box::new(Ast::Int(10)))]),
        );
        assert_eq!(eval(&ast).unwrap(), Ast::prop("t(true)"));
    }

    #[test]
    fn test_mixed_comparison_is_type_error() {
        // t(1 == 1.0) is a type error
        let ast = Ast::unexp_prop(
            "t",
            Some(vec![Ast::Equal(Box::new(Ast::Int(1)), Box::new(Ast::Float(1.0)))]),
        );
        assert!(matches!(eval(&ast), Err(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn test_membership_folds_in_formula_position() {
        let inside = Ast::In(Box::new(Ast::Int(2)), Box::new(range(1, 3)));
        assert_eq!(eval(&inside).unwrap(), Ast::Top);
        let outside = Ast::In(Box::new(Ast::Int(9)), Box::new(range(1, 3)));
        assert_eq!(eval(&outside).unwrap(), Ast::Bottom);
    }

    #[test]
    fn test_program_conjoins_formulas() {
        let program = Ast::Program(vec![
            Ast::Affect {
                var: Box::new(Ast::var("$x")),
                value: Box::new(Ast::prop("a")),
            },
            Ast::var("$x"),
            Ast::prop("b"),
        ]);
        assert_eq!(
            eval(&program).unwrap(),
            Ast::and(Ast::prop("a"), Ast::prop("b"))
        );
    }

    #[test]
    fn test_program_without_formula() {
        let program = Ast::Program(vec![Ast::Affect {
            var: Box::new(Ast::var("$x")),
            value: Box::new(Ast::Int(1)),
        }]);
        assert!(matches!(eval(&program), Err(EvalError::NoFormula { .. })));
    }

    #[test]
    fn test_let_in_formula() {
        let ast = Ast::Let {
            var: Box::new(Ast::var("$x")),
            value: Box::new(Ast::Int(2)),
            body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$x")]))),
        };
        assert_eq!(eval(&ast).unwrap(), p_of(2));
    }

    #[test]
    fn test_smt_keeps_structural_comparison() {
        let config = EvalConfig::smt();
        let mut ev = Evaluator::new(&config);
        // x > 3 stays structural; 1 + 1 folds
        let ast = Ast::Greater(
            Box::new(Ast::prop("x")),
            Box::new(Ast::Add(Box::new(Ast::Int(1)), Box::new(Ast::Int(2)))),
        );
        let f = ev.eval(&ast).unwrap();
        assert_eq!(
            f,
            Ast::Greater(Box::new(Ast::prop("x")), Box::new(Ast::Int(3)))
        );
        assert!(is_fully_evaluated(&f));
    }

    #[test]
    fn test_quantifier_evaluation() {
        let ast = Ast::Exists(
            Box::new(Ast::prop("a")),
            Box::new(Ast::and(Ast::prop("a"), Ast::prop("b"))),
        );
        let f = eval(&ast).unwrap();
        assert_eq!(
            f,
            Ast::Exists(
                Box::new(Ast::prop("a")),
                Box::new(Ast::and(Ast::prop("a"), Ast::prop("b")))
            )
        );
    }

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(3, 0), vec![Vec::<usize>::new()]);
        assert_eq!(combinations(3, 4), Vec::<Vec<usize>>::new());
        assert_eq!(
            combinations(3, 2),
            vec![vec![0, 1], vec![0, 2], vec![1, 2]]
        );
    }

    #[test]
    fn test_output_purity() {
        let program = Ast::Program(vec![
            Ast::Affect {
                var: Box::new(Ast::var("$S")),
                value: Box::new(range(1, 4)),
            },
            Ast::Bigor {
                vars: vec![Ast::var("$i")],
                sets: vec![Ast::var("$S")],
                when: None,
                body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
            },
        ]);
        let f = eval(&program).unwrap();
        assert!(is_fully_evaluated(&f));
    }
}
