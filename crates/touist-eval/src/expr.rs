//! Expression evaluator.
//!
//! Folds arithmetic, boolean, comparison, range, and set nodes to values
//! (`Int`, `Float`, `Bool`, `Prop`, `Set`). Formula-shaped nodes are the
//! business of the formula evaluator in [`crate::formula`]; both share the
//! [`Evaluator`] state defined here.

use crate::config::EvalConfig;
use crate::diag::Diagnostics;
use crate::env::Env;
use crate::error::{EvalError, EvalResult};
use crate::props::{self, Expansion};
use touist_syntax::{pretty_print, Ast, SetValue, Span};

/// Shared state of one evaluation run: configuration, the two-scope
/// environment, and the diagnostic sink.
pub struct Evaluator<'a> {
    pub(crate) config: &'a EvalConfig,
    pub(crate) env: Env,
    pub(crate) diags: Diagnostics,
}

/// Build a type error from the value that was actually found.
pub(crate) fn type_error(expected: impl Into<String>, found: &Ast, span: Span) -> EvalError {
    EvalError::TypeMismatch {
        expected: expected.into(),
        found: found.kind_name().to_string(),
        expr: pretty_print(found),
        span,
    }
}

/// A binary numeric operator, shared between the strict expression
/// evaluator and the SMT-mode arithmetic folder.
#[derive(Debug, Clone, Copy)]
pub(crate) enum NumOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl NumOp {
    pub(crate) fn apply_int(self, a: i64, b: i64, span: Span) -> EvalResult<Ast> {
        match self {
            NumOp::Add => Ok(Ast::Int(a + b)),
            NumOp::Sub => Ok(Ast::Int(a - b)),
            NumOp::Mul => Ok(Ast::Int(a * b)),
            NumOp::Div => {
                if b == 0 {
                    Err(EvalError::DivisionByZero { span })
                } else {
                    Ok(Ast::Int(a / b))
                }
            }
            NumOp::Mod => {
                if b == 0 {
                    Err(EvalError::DivisionByZero { span })
                } else {
                    Ok(Ast::Int(a % b))
                }
            }
        }
    }

    pub(crate) fn apply_float(self, a: f64, b: f64, span: Span) -> EvalResult<Ast> {
        match self {
            NumOp::Add => Ok(Ast::Float(a + b)),
            NumOp::Sub => Ok(Ast::Float(a - b)),
            NumOp::Mul => Ok(Ast::Float(a * b)),
            NumOp::Div => Ok(Ast::Float(a / b)),
            NumOp::Mod => Err(type_error("two ints", &Ast::Float(b), span)),
        }
    }

    /// Rebuild the structural node, for SMT output.
    pub(crate) fn rebuild(self, l: Ast, r: Ast) -> Ast {
        let (l, r) = (Box::new(l), Box::new(r));
        match self {
            NumOp::Add => Ast::Add(l, r),
            NumOp::Sub => Ast::Sub(l, r),
            NumOp::Mul => Ast::Mul(l, r),
            NumOp::Div => Ast::Div(l, r),
            NumOp::Mod => Ast::Mod(l, r),
        }
    }
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator with an empty environment.
    pub fn new(config: &'a EvalConfig) -> Self {
        Self {
            config,
            env: Env::new(),
            diags: Diagnostics::new(),
        }
    }

    /// The diagnostics accumulated so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diags
    }

    /// Take the accumulated diagnostics, leaving the sink empty.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diags)
    }

    /// Evaluate a node expected to produce a value.
    pub fn eval_expr(&mut self, ast: &Ast) -> EvalResult<Ast> {
        let span = ast.span_or_dummy();
        match ast.peel() {
            Ast::Int(_) | Ast::Float(_) | Ast::Bool(_) | Ast::Prop(_) | Ast::Set(_) => {
                Ok(ast.peel().clone())
            }

            Ast::Var { prefix, indices } => {
                let name = self.var_canonical_name(prefix, indices, span)?;
                match self.env.lookup(&name) {
                    Some(binding) => Ok(binding.value.clone()),
                    None => Err(EvalError::UnknownVariable { name, span }),
                }
            }

            Ast::UnexpProp { name, indices } => self.expand_prop(name, indices, span),

            // === Arithmetic ===
            Ast::Neg(x) => match self.eval_expr(x)? {
                Ast::Int(n) => Ok(Ast::Int(-n)),
                Ast::Float(v) => Ok(Ast::Float(-v)),
                other => Err(type_error("a number", &other, span)),
            },
            Ast::Add(l, r) => self.eval_num(NumOp::Add, l, r, span),
            Ast::Sub(l, r) => self.eval_num(NumOp::Sub, l, r, span),
            Ast::Mul(l, r) => self.eval_num(NumOp::Mul, l, r, span),
            Ast::Div(l, r) => self.eval_num(NumOp::Div, l, r, span),
            Ast::Mod(l, r) => self.eval_num(NumOp::Mod, l, r, span),
            Ast::Sqrt(x) => match self.eval_expr(x)? {
                Ast::Float(v) => Ok(Ast::Float(v.sqrt())),
                other => Err(type_error("a float", &other, span)),
            },
            Ast::ToInt(x) => match self.eval_expr(x)? {
                Ast::Int(n) => Ok(Ast::Int(n)),
                Ast::Float(v) => Ok(Ast::Int(v as i64)),
                other => Err(type_error("a number", &other, span)),
            },
            Ast::ToFloat(x) => match self.eval_expr(x)? {
                Ast::Int(n) => Ok(Ast::Float(n as f64)),
                Ast::Float(v) => Ok(Ast::Float(v)),
                other => Err(type_error("a number", &other, span)),
            },
            Ast::Abs(x) => match self.eval_expr(x)? {
                Ast::Int(n) => Ok(Ast::Int(n.abs())),
                Ast::Float(v) => Ok(Ast::Float(v.abs())),
                other => Err(type_error("a number", &other, span)),
            },

            // === Boolean (strict, value level) ===
            Ast::Not(x) => {
                let v = self.expect_bool(x, span)?;
                Ok(Ast::Bool(!v))
            }
            Ast::And(l, r) => {
                let (a, b) = (self.expect_bool(l, span)?, self.expect_bool(r, span)?);
                Ok(Ast::Bool(a && b))
            }
            Ast::Or(l, r) => {
                let (a, b) = (self.expect_bool(l, span)?, self.expect_bool(r, span)?);
                Ok(Ast::Bool(a || b))
            }
            Ast::Xor(l, r) => {
                let (a, b) = (self.expect_bool(l, span)?, self.expect_bool(r, span)?);
                Ok(Ast::Bool(a != b))
            }
            Ast::Implies(l, r) => {
                let (a, b) = (self.expect_bool(l, span)?, self.expect_bool(r, span)?);
                Ok(Ast::Bool(!a || b))
            }
            Ast::Equiv(l, r) => {
                let (a, b) = (self.expect_bool(l, span)?, self.expect_bool(r, span)?);
                Ok(Ast::Bool(a == b))
            }
            Ast::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.expect_bool(cond, span)? {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }

            // === Comparisons ===
            Ast::Equal(l, r) => {
                let (lv, rv) = (self.eval_expr(l)?, self.eval_expr(r)?);
                self.values_equal(&lv, &rv, span).map(Ast::Bool)
            }
            Ast::NotEqual(l, r) => {
                let (lv, rv) = (self.eval_expr(l)?, self.eval_expr(r)?);
                self.values_equal(&lv, &rv, span).map(|b| Ast::Bool(!b))
            }
            Ast::Lesser(l, r) => self.eval_ord(l, r, span, |o| o == std::cmp::Ordering::Less),
            Ast::LesserEq(l, r) => self.eval_ord(l, r, span, |o| o != std::cmp::Ordering::Greater),
            Ast::Greater(l, r) => self.eval_ord(l, r, span, |o| o == std::cmp::Ordering::Greater),
            Ast::GreaterEq(l, r) => self.eval_ord(l, r, span, |o| o != std::cmp::Ordering::Less),

            // === Set constructors ===
            Ast::SetDecl(elems) => self.eval_set_decl(elems, span),
            Ast::Range(lo, hi) => {
                let (lv, hv) = (self.eval_expr(lo)?, self.eval_expr(hi)?);
                match (&lv, &hv) {
                    (Ast::Int(a), Ast::Int(b)) => {
                        let b = if self.config.check_only { *a } else { *b };
                        Ok(Ast::Set(SetValue::int_range(*a, b)))
                    }
                    (Ast::Float(a), Ast::Float(b)) => {
                        let b = if self.config.check_only { *a } else { *b };
                        Ok(Ast::Set(SetValue::float_range(*a, b)))
                    }
                    (Ast::Int(_), other) | (other, Ast::Int(_)) => {
                        Err(type_error("an int bound", other, span))
                    }
                    (other, _) => Err(type_error("a numeric bound", other, span)),
                }
            }

            // === Set algebra ===
            Ast::Union(l, r) => self.eval_set_binop(l, r, span, SetValue::union),
            Ast::Inter(l, r) => self.eval_set_binop(l, r, span, SetValue::inter),
            Ast::Diff(l, r) => self.eval_set_binop(l, r, span, SetValue::diff),
            Ast::Subset(l, r) => {
                let ls = self.expect_set(l, span)?;
                let rs = self.expect_set(r, span)?;
                let expected = ls.flavor_name();
                let found = Ast::Set(rs.clone());
                ls.subset(rs)
                    .map(Ast::Bool)
                    .ok_or_else(|| type_error(expected, &found, span))
            }
            Ast::In(elem, set) => {
                let ev = self.eval_expr(elem)?;
                let sv = self.expect_set(set, span)?;
                self.set_contains(&ev, &sv, span).map(Ast::Bool)
            }
            Ast::Card(x) => {
                let s = self.expect_set(x, span)?;
                Ok(Ast::Int(s.len() as i64))
            }
            Ast::IsEmpty(x) => {
                let s = self.expect_set(x, span)?;
                Ok(Ast::Bool(s.is_empty()))
            }

            // === Bindings ===
            Ast::Let { var, value, body } => self.eval_let(var, value, body, span, Self::eval_expr),

            other => Err(type_error("a value", other, span)),
        }
    }

    /// Canonical lookup key for a variable reference: the prefix alone, or
    /// `prefix(v1,…,vn)` with every index evaluated and rendered.
    pub(crate) fn var_canonical_name(
        &mut self,
        prefix: &str,
        indices: &Option<Vec<Ast>>,
        span: Span,
    ) -> EvalResult<String> {
        let indices = match indices {
            None => return Ok(prefix.to_string()),
            Some(indices) => indices,
        };
        let mut rendered = Vec::with_capacity(indices.len());
        for idx in indices {
            let idx_span = idx.span().unwrap_or(span);
            let v = self.eval_expr(idx)?;
            let r = props::render_index(&v).ok_or_else(|| type_error("a scalar index", &v, idx_span))?;
            rendered.push(r);
        }
        Ok(props::compose_name(prefix, &rendered))
    }

    /// Expand an indexed proposition to a `Prop` or a proposition set.
    pub(crate) fn expand_prop(
        &mut self,
        name: &str,
        indices: &Option<Vec<Ast>>,
        span: Span,
    ) -> EvalResult<Ast> {
        let indices = match indices {
            None => return Ok(Ast::Prop(name.to_string())),
            Some(indices) => indices,
        };
        let mut values = Vec::with_capacity(indices.len());
        for idx in indices {
            values.push(self.eval_expr(idx)?);
        }
        match props::expand_indices(name, &values) {
            Ok(Expansion::One(name)) => Ok(Ast::Prop(name)),
            Ok(Expansion::Many(names)) => Ok(Ast::Set(SetValue::Props(names))),
            Err(i) => {
                let idx_span = indices[i].span().unwrap_or(span);
                Err(type_error("a scalar or set index", &values[i], idx_span))
            }
        }
    }

    /// Evaluate a `let` with the given body evaluator (expression or
    /// formula), extending the local environment around the body.
    pub(crate) fn eval_let(
        &mut self,
        var: &Ast,
        value: &Ast,
        body: &Ast,
        span: Span,
        eval_body: impl FnOnce(&mut Self, &Ast) -> EvalResult<Ast>,
    ) -> EvalResult<Ast> {
        let (prefix, indices) = match var.peel() {
            Ast::Var { prefix, indices } => (prefix.clone(), indices.clone()),
            other => {
                return Err(EvalError::MalformedAst {
                    message: format!("let binds a variable, found {}", other.kind_name()),
                    span,
                })
            }
        };
        let name = self.var_canonical_name(&prefix, &indices, span)?;
        let bound = self.eval_expr(value)?;
        let var_span = var.span().unwrap_or(span);
        self.env
            .push_local(name, crate::env::Binding::new(bound, var_span));
        let result = eval_body(self, body);
        self.env.pop_local();
        result
    }

    fn eval_num(&mut self, op: NumOp, l: &Ast, r: &Ast, span: Span) -> EvalResult<Ast> {
        let (lv, rv) = (self.eval_expr(l)?, self.eval_expr(r)?);
        match (&lv, &rv) {
            (Ast::Int(a), Ast::Int(b)) => op.apply_int(*a, *b, span),
            (Ast::Float(a), Ast::Float(b)) => op.apply_float(*a, *b, span),
            (Ast::Int(_), other) => Err(type_error("an int", other, span)),
            (Ast::Float(_), other) => Err(type_error("a float", other, span)),
            (other, _) => Err(type_error("a number", other, span)),
        }
    }

    fn eval_ord(
        &mut self,
        l: &Ast,
        r: &Ast,
        span: Span,
        accept: impl Fn(std::cmp::Ordering) -> bool,
    ) -> EvalResult<Ast> {
        let (lv, rv) = (self.eval_expr(l)?, self.eval_expr(r)?);
        let ordering = match (&lv, &rv) {
            (Ast::Int(a), Ast::Int(b)) => a.cmp(b),
            (Ast::Float(a), Ast::Float(b)) => {
                a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
            }
            (Ast::Int(_), other) => return Err(type_error("an int", other, span)),
            (Ast::Float(_), other) => return Err(type_error("a float", other, span)),
            (other, _) => return Err(type_error("a number", other, span)),
        };
        Ok(Ast::Bool(accept(ordering)))
    }

    /// Flavor-checked equality on values.
    fn values_equal(&mut self, l: &Ast, r: &Ast, span: Span) -> EvalResult<bool> {
        match (l, r) {
            (Ast::Int(a), Ast::Int(b)) => Ok(a == b),
            (Ast::Float(a), Ast::Float(b)) => Ok(a == b),
            (Ast::Bool(a), Ast::Bool(b)) => Ok(a == b),
            (Ast::Prop(a), Ast::Prop(b)) => Ok(a == b),
            (Ast::Set(a), Ast::Set(b)) => Ok(a.clone().set_eq(b.clone())),
            (Ast::Int(_), other) => Err(type_error("an int", other, span)),
            (Ast::Float(_), other) => Err(type_error("a float", other, span)),
            (Ast::Bool(_), other) => Err(type_error("a bool", other, span)),
            (Ast::Prop(_), other) => Err(type_error("a proposition", other, span)),
            (Ast::Set(s), other) => Err(type_error(s.flavor_name(), other, span)),
            (other, _) => Err(type_error("a value", other, span)),
        }
    }

    fn eval_set_decl(&mut self, elems: &[Ast], span: Span) -> EvalResult<Ast> {
        if elems.is_empty() {
            return Ok(Ast::Set(SetValue::Empty));
        }
        let mut values = Vec::with_capacity(elems.len());
        for elem in elems {
            values.push(self.eval_expr(elem)?);
        }
        match &values[0] {
            Ast::Int(_) => {
                let mut out = Vec::with_capacity(values.len());
                for (v, elem) in values.iter().zip(elems) {
                    match v {
                        Ast::Int(n) => out.push(*n),
                        other => {
                            return Err(type_error("an int", other, elem.span().unwrap_or(span)))
                        }
                    }
                }
                Ok(Ast::Set(SetValue::ints(out)))
            }
            Ast::Float(_) => {
                let mut out = Vec::with_capacity(values.len());
                for (v, elem) in values.iter().zip(elems) {
                    match v {
                        Ast::Float(x) => out.push(*x),
                        other => {
                            return Err(type_error("a float", other, elem.span().unwrap_or(span)))
                        }
                    }
                }
                Ok(Ast::Set(SetValue::floats(out)))
            }
            Ast::Prop(_) => {
                let mut out = Vec::with_capacity(values.len());
                for (v, elem) in values.iter().zip(elems) {
                    match v {
                        Ast::Prop(name) => out.push(name.clone()),
                        other => return Err(type_error(
                            "a proposition",
                            other,
                            elem.span().unwrap_or(span),
                        )),
                    }
                }
                Ok(Ast::Set(SetValue::props(out)))
            }
            other => Err(type_error(
                "an int, float, or proposition element",
                other,
                elems[0].span().unwrap_or(span),
            )),
        }
    }

    fn eval_set_binop(
        &mut self,
        l: &Ast,
        r: &Ast,
        span: Span,
        op: impl FnOnce(SetValue, SetValue) -> Option<SetValue>,
    ) -> EvalResult<Ast> {
        let ls = self.expect_set(l, span)?;
        let rs = self.expect_set(r, span)?;
        let expected = ls.flavor_name();
        let found = Ast::Set(rs.clone());
        op(ls, rs)
            .map(Ast::Set)
            .ok_or_else(|| type_error(expected, &found, span))
    }

    fn set_contains(&mut self, elem: &Ast, set: &SetValue, span: Span) -> EvalResult<bool> {
        match (elem, set) {
            (_, SetValue::Empty) => Ok(false),
            (Ast::Int(n), SetValue::Ints(s)) => Ok(s.contains(n)),
            (Ast::Float(v), SetValue::Floats(s)) => {
                Ok(s.contains(&touist_syntax::OrderedF64(*v)))
            }
            (Ast::Prop(name), SetValue::Props(s)) => Ok(s.contains(name)),
            (other, _) => Err(type_error(
                format!("an element of the {}", set.flavor_name()),
                other,
                span,
            )),
        }
    }

    pub(crate) fn expect_bool(&mut self, ast: &Ast, span: Span) -> EvalResult<bool> {
        match self.eval_expr(ast)? {
            Ast::Bool(b) => Ok(b),
            other => Err(type_error("a bool", &other, ast.span().unwrap_or(span))),
        }
    }

    pub(crate) fn expect_set(&mut self, ast: &Ast, span: Span) -> EvalResult<SetValue> {
        match self.eval_expr(ast)? {
            Ast::Set(s) => Ok(s),
            other => Err(type_error("a set", &other, ast.span().unwrap_or(span))),
        }
    }
}
