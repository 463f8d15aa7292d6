//! Best-effort pretty printer for [`Ast`], used by diagnostics.
//!
//! The output is valid-looking TouIST surface syntax with minimal
//! parenthesisation; it is meant for error messages, not round-tripping.

use crate::ast::Ast;
use crate::set::render_float;
use std::fmt;
use std::fmt::Write;

/// Pretty print an AST node to a string.
pub fn pretty_print(ast: &Ast) -> String {
    let mut out = String::new();
    print_ast(&mut out, ast, 0);
    out
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pretty_print(self))
    }
}

/// Binding strength of a node, higher binds tighter. Children printed at a
/// weaker level get parenthesised.
fn precedence(ast: &Ast) -> u8 {
    match ast {
        Ast::Equiv(..) => 1,
        Ast::Implies(..) => 2,
        Ast::Or(..) | Ast::Xor(..) => 3,
        Ast::And(..) => 4,
        Ast::Equal(..)
        | Ast::NotEqual(..)
        | Ast::Lesser(..)
        | Ast::LesserEq(..)
        | Ast::Greater(..)
        | Ast::GreaterEq(..)
        | Ast::In(..) => 5,
        Ast::Add(..) | Ast::Sub(..) | Ast::Union(..) | Ast::Diff(..) => 6,
        Ast::Mul(..) | Ast::Div(..) | Ast::Mod(..) | Ast::Inter(..) => 7,
        Ast::Not(_) | Ast::Neg(_) => 8,
        _ => 9,
    }
}

fn print_binary(out: &mut String, op: &str, l: &Ast, r: &Ast, prec: u8, min_prec: u8) {
    let parens = prec < min_prec;
    if parens {
        out.push('(');
    }
    print_ast(out, l, prec);
    out.push(' ');
    out.push_str(op);
    out.push(' ');
    // Right child gets a stricter minimum so chains print left-associated.
    print_ast(out, r, prec + 1);
    if parens {
        out.push(')');
    }
}

fn print_call(out: &mut String, name: &str, args: &[&Ast]) {
    out.push_str(name);
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        print_ast(out, arg, 0);
    }
    out.push(')');
}

fn print_indices(out: &mut String, indices: &Option<Vec<Ast>>) {
    if let Some(indices) = indices {
        out.push('(');
        for (i, idx) in indices.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            print_ast(out, idx, 0);
        }
        out.push(')');
    }
}

fn print_ast(out: &mut String, ast: &Ast, min_prec: u8) {
    let prec = precedence(ast.peel());
    match ast.peel() {
        Ast::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Ast::Float(v) => out.push_str(&render_float(*v)),
        Ast::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Ast::Prop(name) => out.push_str(name),
        Ast::Top => out.push_str("Top"),
        Ast::Bottom => out.push_str("Bot"),
        Ast::Set(s) => {
            let _ = write!(out, "{s}");
        }
        Ast::Var { prefix, indices } => {
            out.push_str(prefix);
            print_indices(out, indices);
        }
        Ast::UnexpProp { name, indices } => {
            out.push_str(name);
            print_indices(out, indices);
        }
        Ast::Neg(x) => {
            out.push('-');
            print_ast(out, x, prec);
        }
        Ast::Add(l, r) => print_binary(out, "+", l, r, prec, min_prec),
        Ast::Sub(l, r) => print_binary(out, "-", l, r, prec, min_prec),
        Ast::Mul(l, r) => print_binary(out, "*", l, r, prec, min_prec),
        Ast::Div(l, r) => print_binary(out, "/", l, r, prec, min_prec),
        Ast::Mod(l, r) => print_binary(out, "mod", l, r, prec, min_prec),
        Ast::Sqrt(x) => print_call(out, "sqrt", &[x.as_ref()]),
        Ast::ToInt(x) => print_call(out, "int", &[x.as_ref()]),
        Ast::ToFloat(x) => print_call(out, "float", &[x.as_ref()]),
        Ast::Abs(x) => print_call(out, "abs", &[x.as_ref()]),
        Ast::Not(x) => {
            out.push_str("not ");
            print_ast(out, x, prec);
        }
        Ast::And(l, r) => print_binary(out, "and", l, r, prec, min_prec),
        Ast::Or(l, r) => print_binary(out, "or", l, r, prec, min_prec),
        Ast::Xor(l, r) => print_binary(out, "xor", l, r, prec, min_prec),
        Ast::Implies(l, r) => print_binary(out, "=>", l, r, prec, min_prec),
        Ast::Equiv(l, r) => print_binary(out, "<=>", l, r, prec, min_prec),
        Ast::If {
            cond,
            then_branch,
            else_branch,
        } => {
            out.push_str("if ");
            print_ast(out, cond, 0);
            out.push_str(" then ");
            print_ast(out, then_branch, 0);
            out.push_str(" else ");
            print_ast(out, else_branch, 0);
            out.push_str(" end");
        }
        Ast::Equal(l, r) => print_binary(out, "==", l, r, prec, min_prec),
        Ast::NotEqual(l, r) => print_binary(out, "!=", l, r, prec, min_prec),
        Ast::Lesser(l, r) => print_binary(out, "<", l, r, prec, min_prec),
        Ast::LesserEq(l, r) => print_binary(out, "<=", l, r, prec, min_prec),
        Ast::Greater(l, r) => print_binary(out, ">", l, r, prec, min_prec),
        Ast::GreaterEq(l, r) => print_binary(out, ">=", l, r, prec, min_prec),
        Ast::SetDecl(elems) => {
            out.push('[');
            for (i, e) in elems.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                print_ast(out, e, 0);
            }
            out.push(']');
        }
        Ast::Range(lo, hi) => {
            out.push('[');
            print_ast(out, lo, 0);
            out.push_str("..");
            print_ast(out, hi, 0);
            out.push(']');
        }
        Ast::Union(l, r) => print_binary(out, "union", l, r, prec, min_prec),
        Ast::Inter(l, r) => print_binary(out, "inter", l, r, prec, min_prec),
        Ast::Diff(l, r) => print_binary(out, "diff", l, r, prec, min_prec),
        Ast::Subset(l, r) => print_call(out, "subset", &[l.as_ref(), r.as_ref()]),
        Ast::In(l, r) => print_binary(out, "in", l, r, prec, min_prec),
        Ast::Card(x) => print_call(out, "card", &[x.as_ref()]),
        Ast::IsEmpty(x) => print_call(out, "empty", &[x.as_ref()]),
        Ast::Bigand {
            vars,
            sets,
            when,
            body,
        } => print_generator(out, "bigand", vars, sets, when, body),
        Ast::Bigor {
            vars,
            sets,
            when,
            body,
        } => print_generator(out, "bigor", vars, sets, when, body),
        Ast::Let { var, value, body } => {
            out.push_str("let ");
            print_ast(out, var, 0);
            out.push_str(" = ");
            print_ast(out, value, 0);
            out.push_str(": ");
            print_ast(out, body, 0);
        }
        Ast::Affect { var, value } => {
            print_ast(out, var, 0);
            out.push_str(" = ");
            print_ast(out, value, 0);
        }
        Ast::Program(stmts) => {
            for (i, stmt) in stmts.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                print_ast(out, stmt, 0);
            }
        }
        Ast::Exact(n, s) => print_call(out, "exact", &[n.as_ref(), s.as_ref()]),
        Ast::Atleast(n, s) => print_call(out, "atleast", &[n.as_ref(), s.as_ref()]),
        Ast::Atmost(n, s) => print_call(out, "atmost", &[n.as_ref(), s.as_ref()]),
        Ast::Forall(p, body) => {
            out.push_str("forall ");
            print_ast(out, p, 0);
            out.push_str(": ");
            print_ast(out, body, 0);
        }
        Ast::Exists(p, body) => {
            out.push_str("exists ");
            print_ast(out, p, 0);
            out.push_str(": ");
            print_ast(out, body, 0);
        }
        // peel() never returns these two.
        Ast::Paren(inner) => print_ast(out, inner, min_prec),
        Ast::Loc(inner, _) => print_ast(out, inner, min_prec),
    }
}

fn print_generator(
    out: &mut String,
    kw: &str,
    vars: &[Ast],
    sets: &[Ast],
    when: &Option<Box<Ast>>,
    body: &Ast,
) {
    out.push_str(kw);
    out.push(' ');
    for (i, v) in vars.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        print_ast(out, v, 0);
    }
    out.push_str(" in ");
    for (i, s) in sets.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        print_ast(out, s, 0);
    }
    if let Some(when) = when {
        out.push_str(" when ");
        print_ast(out, when, 0);
    }
    out.push_str(": ");
    print_ast(out, body, 0);
    out.push_str(" end");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connective_precedence() {
        // or binds weaker than and: the left or needs parentheses.
        let f = Ast::and(Ast::or(Ast::prop("a"), Ast::prop("b")), Ast::prop("c"));
        assert_eq!(pretty_print(&f), "(a or b) and c");

        let g = Ast::or(Ast::prop("a"), Ast::and(Ast::prop("b"), Ast::prop("c")));
        assert_eq!(pretty_print(&g), "a or b and c");
    }

    #[test]
    fn test_not_binds_tight() {
        let f = Ast::not(Ast::or(Ast::prop("c"), Ast::prop("d")));
        assert_eq!(pretty_print(&f), "not (c or d)");
    }

    #[test]
    fn test_indexed_names() {
        let v = Ast::var_indexed("$v", vec![Ast::Int(1), Ast::Int(2)]);
        assert_eq!(pretty_print(&v), "$v(1,2)");
        let p = Ast::unexp_prop("p", Some(vec![Ast::var("$i")]));
        assert_eq!(pretty_print(&p), "p($i)");
    }

    #[test]
    fn test_generator() {
        let f = Ast::Bigand {
            vars: vec![Ast::var("$i")],
            sets: vec![Ast::Range(Box::new(Ast::Int(1)), Box::new(Ast::Int(3)))],
            when: None,
            body: Box::new(Ast::unexp_prop("p", Some(vec![Ast::var("$i")]))),
        };
        assert_eq!(pretty_print(&f), "bigand $i in [1..3]: p($i) end");
    }

    #[test]
    fn test_cardinality_and_floats() {
        let f = Ast::Exact(
            Box::new(Ast::Int(1)),
            Box::new(Ast::SetDecl(vec![
                Ast::prop("a"),
                Ast::prop("b"),
                Ast::prop("c"),
            ])),
        );
        assert_eq!(pretty_print(&f), "exact(1,[a,b,c])");
        assert_eq!(pretty_print(&Ast::Float(2.0)), "2.0");
    }
}
