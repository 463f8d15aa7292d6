//! Abstract syntax tree for the TouIST language.
//!
//! The whole language is one flat tagged variant: parser output, evaluator
//! output, and CNF output are all [`Ast`] values, each pass restricting the
//! constructors that may remain. The parser wraps every user-visible node
//! in [`Ast::Loc`]; passes peel the wrapper before matching and keep the
//! span for diagnostics.

use crate::set::SetValue;
use crate::span::Span;

/// An AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    // === Literals and values ===
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// Atomic proposition, identified by its materialised name.
    Prop(String),
    /// The true constant.
    Top,
    /// The false constant.
    Bottom,
    /// A set value (only produced by evaluation, never by the parser).
    Set(SetValue),

    // === Names awaiting resolution ===
    /// Variable reference `$v` or `$v(i1, …, in)`.
    Var {
        /// The `$`-prefixed variable name.
        prefix: String,
        /// Index expressions, if any.
        indices: Option<Vec<Ast>>,
    },
    /// Proposition with unexpanded indices `p(i1, …, in)`.
    UnexpProp {
        /// The proposition name.
        name: String,
        /// Index expressions, if any.
        indices: Option<Vec<Ast>>,
    },

    // === Arithmetic ===
    /// Unary negation.
    Neg(Box<Ast>),
    Add(Box<Ast>, Box<Ast>),
    Sub(Box<Ast>, Box<Ast>),
    Mul(Box<Ast>, Box<Ast>),
    Div(Box<Ast>, Box<Ast>),
    /// Integer modulo.
    Mod(Box<Ast>, Box<Ast>),
    /// Square root (floats).
    Sqrt(Box<Ast>),
    /// Float-to-int truncation.
    ToInt(Box<Ast>),
    /// Int-to-float conversion.
    ToFloat(Box<Ast>),
    /// Absolute value.
    Abs(Box<Ast>),

    // === Boolean connectives ===
    Not(Box<Ast>),
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
    Xor(Box<Ast>, Box<Ast>),
    Implies(Box<Ast>, Box<Ast>),
    Equiv(Box<Ast>, Box<Ast>),
    /// `if c then t else e end`. The condition is an expression; exactly one
    /// branch is evaluated.
    If {
        cond: Box<Ast>,
        then_branch: Box<Ast>,
        else_branch: Box<Ast>,
    },

    // === Comparisons ===
    Equal(Box<Ast>, Box<Ast>),
    NotEqual(Box<Ast>, Box<Ast>),
    Lesser(Box<Ast>, Box<Ast>),
    LesserEq(Box<Ast>, Box<Ast>),
    Greater(Box<Ast>, Box<Ast>),
    GreaterEq(Box<Ast>, Box<Ast>),

    // === Set constructors and operators ===
    /// Set literal `[e1, …, en]`, elements not yet evaluated.
    SetDecl(Vec<Ast>),
    /// Range `[a..b]`.
    Range(Box<Ast>, Box<Ast>),
    Union(Box<Ast>, Box<Ast>),
    Inter(Box<Ast>, Box<Ast>),
    Diff(Box<Ast>, Box<Ast>),
    /// Subset test `subset(A, B)`.
    Subset(Box<Ast>, Box<Ast>),
    /// Membership test `x in S`.
    In(Box<Ast>, Box<Ast>),
    /// Cardinality `card(S)`.
    Card(Box<Ast>),
    /// Emptiness test `empty(S)`.
    IsEmpty(Box<Ast>),

    // === Generators ===
    /// `bigand $v1, … in S1, … when c: body end`.
    Bigand {
        /// Bound variables (parallel to `sets`).
        vars: Vec<Ast>,
        /// Iterated set expressions.
        sets: Vec<Ast>,
        /// Optional filter evaluated under the extended environment.
        when: Option<Box<Ast>>,
        body: Box<Ast>,
    },
    /// `bigor …`, same shape as [`Ast::Bigand`].
    Bigor {
        vars: Vec<Ast>,
        sets: Vec<Ast>,
        when: Option<Box<Ast>>,
        body: Box<Ast>,
    },

    // === Bindings ===
    /// `let $v = value: body`.
    Let {
        var: Box<Ast>,
        value: Box<Ast>,
        body: Box<Ast>,
    },
    /// Top-level declaration `$v = value`.
    Affect {
        var: Box<Ast>,
        value: Box<Ast>,
    },
    /// A whole source file: declarations followed by formulas, conjoined.
    Program(Vec<Ast>),

    // === Cardinality constraints ===
    /// `exact(n, S)`: exactly `n` of the propositions in `S` hold.
    Exact(Box<Ast>, Box<Ast>),
    /// `atleast(n, S)`.
    Atleast(Box<Ast>, Box<Ast>),
    /// `atmost(n, S)`.
    Atmost(Box<Ast>, Box<Ast>),

    // === Quantifiers (QBF) ===
    /// `forall p: body` over a proposition.
    Forall(Box<Ast>, Box<Ast>),
    /// `exists p: body` over a proposition.
    Exists(Box<Ast>, Box<Ast>),

    // === Wrappers ===
    /// Parenthesised expression, kept for faithful diagnostics.
    Paren(Box<Ast>),
    /// Source-location wrapper.
    Loc(Box<Ast>, Span),
}

impl Ast {
    /// Strip [`Ast::Loc`] and [`Ast::Paren`] wrappers.
    pub fn peel(&self) -> &Ast {
        match self {
            Ast::Loc(inner, _) | Ast::Paren(inner) => inner.peel(),
            other => other,
        }
    }

    /// Owned variant of [`Ast::peel`].
    pub fn into_peeled(self) -> Ast {
        match self {
            Ast::Loc(inner, _) | Ast::Paren(inner) => inner.into_peeled(),
            other => other,
        }
    }

    /// The span of the outermost location wrapper, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Ast::Loc(_, span) => Some(*span),
            Ast::Paren(inner) => inner.span(),
            _ => None,
        }
    }

    /// The span of this node, or a dummy span for generated nodes.
    pub fn span_or_dummy(&self) -> Span {
        self.span().unwrap_or_default()
    }

    /// Wrap in a location, unless the span is a dummy.
    pub fn with_span(self, span: Span) -> Ast {
        if span == Span::dummy() {
            self
        } else {
            Ast::Loc(Box::new(self), span)
        }
    }

    /// Check whether this node is a literal: a proposition or its negation.
    pub fn is_literal(&self) -> bool {
        match self.peel() {
            Ast::Prop(_) => true,
            Ast::Not(x) => matches!(x.peel(), Ast::Prop(_)),
            _ => false,
        }
    }

    /// Check whether this node is a value: the output domain of the
    /// expression evaluator.
    pub fn is_value(&self) -> bool {
        matches!(
            self.peel(),
            Ast::Int(_) | Ast::Float(_) | Ast::Bool(_) | Ast::Prop(_) | Ast::Set(_)
        )
    }

    /// Human-readable constructor name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Ast::Int(_) => "int",
            Ast::Float(_) => "float",
            Ast::Bool(_) => "bool",
            Ast::Prop(_) => "proposition",
            Ast::Top => "Top",
            Ast::Bottom => "Bot",
            Ast::Set(s) => s.flavor_name(),
            Ast::Var { .. } => "variable",
            Ast::UnexpProp { .. } => "indexed proposition",
            Ast::Neg(_) => "negation",
            Ast::Add(..) => "addition",
            Ast::Sub(..) => "subtraction",
            Ast::Mul(..) => "multiplication",
            Ast::Div(..) => "division",
            Ast::Mod(..) => "modulo",
            Ast::Sqrt(_) => "sqrt",
            Ast::ToInt(_) => "int conversion",
            Ast::ToFloat(_) => "float conversion",
            Ast::Abs(_) => "abs",
            Ast::Not(_) => "not",
            Ast::And(..) => "and",
            Ast::Or(..) => "or",
            Ast::Xor(..) => "xor",
            Ast::Implies(..) => "implication",
            Ast::Equiv(..) => "equivalence",
            Ast::If { .. } => "if",
            Ast::Equal(..) => "equality",
            Ast::NotEqual(..) => "disequality",
            Ast::Lesser(..) => "comparison",
            Ast::LesserEq(..) => "comparison",
            Ast::Greater(..) => "comparison",
            Ast::GreaterEq(..) => "comparison",
            Ast::SetDecl(_) => "set literal",
            Ast::Range(..) => "range",
            Ast::Union(..) => "union",
            Ast::Inter(..) => "intersection",
            Ast::Diff(..) => "difference",
            Ast::Subset(..) => "subset",
            Ast::In(..) => "membership",
            Ast::Card(_) => "cardinality",
            Ast::IsEmpty(_) => "emptiness test",
            Ast::Bigand { .. } => "bigand",
            Ast::Bigor { .. } => "bigor",
            Ast::Let { .. } => "let",
            Ast::Affect { .. } => "declaration",
            Ast::Program(_) => "program",
            Ast::Exact(..) => "exact",
            Ast::Atleast(..) => "atleast",
            Ast::Atmost(..) => "atmost",
            Ast::Forall(..) => "forall",
            Ast::Exists(..) => "exists",
            Ast::Paren(_) => "parentheses",
            Ast::Loc(inner, _) => inner.kind_name(),
        }
    }
}

/// Convenience constructors used pervasively by the passes and the tests.
impl Ast {
    pub fn prop(name: impl Into<String>) -> Ast {
        Ast::Prop(name.into())
    }

    pub fn var(prefix: impl Into<String>) -> Ast {
        Ast::Var {
            prefix: prefix.into(),
            indices: None,
        }
    }

    pub fn var_indexed(prefix: impl Into<String>, indices: Vec<Ast>) -> Ast {
        Ast::Var {
            prefix: prefix.into(),
            indices: Some(indices),
        }
    }

    pub fn unexp_prop(name: impl Into<String>, indices: Option<Vec<Ast>>) -> Ast {
        Ast::UnexpProp {
            name: name.into(),
            indices,
        }
    }

    pub fn not(x: Ast) -> Ast {
        Ast::Not(Box::new(x))
    }

    pub fn and(l: Ast, r: Ast) -> Ast {
        Ast::And(Box::new(l), Box::new(r))
    }

    pub fn or(l: Ast, r: Ast) -> Ast {
        Ast::Or(Box::new(l), Box::new(r))
    }

    pub fn xor(l: Ast, r: Ast) -> Ast {
        Ast::Xor(Box::new(l), Box::new(r))
    }

    pub fn implies(l: Ast, r: Ast) -> Ast {
        Ast::Implies(Box::new(l), Box::new(r))
    }

    pub fn equiv(l: Ast, r: Ast) -> Ast {
        Ast::Equiv(Box::new(l), Box::new(r))
    }
}
