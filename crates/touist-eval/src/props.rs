//! Proposition-name materialisation.
//!
//! A parameterised name like `p(a,b,c)` is a plain string built by
//! composing the rendered index values. A set in an index position fans
//! out over its elements, so `p([a,b],c)` denotes the set
//! `{p(a,c), p(b,c)}`.

use std::collections::BTreeSet;
use touist_syntax::set::render_float;
use touist_syntax::{Ast, SetValue};

/// Render a scalar index value the way it appears inside a materialised
/// name. `None` for non-scalar values.
pub fn render_index(value: &Ast) -> Option<String> {
    match value.peel() {
        Ast::Int(n) => Some(n.to_string()),
        Ast::Float(v) => Some(render_float(*v)),
        Ast::Bool(b) => Some(b.to_string()),
        Ast::Prop(name) => Some(name.clone()),
        _ => None,
    }
}

/// Compose a canonical name from a base and rendered indices:
/// `p` + `[1, a]` gives `p(1,a)`.
pub fn compose_name(base: &str, indices: &[String]) -> String {
    if indices.is_empty() {
        return base.to_string();
    }
    let mut name = String::from(base);
    name.push('(');
    name.push_str(&indices.join(","));
    name.push(')');
    name
}

/// The result of expanding an indexed proposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// No set appeared among the indices: a single name.
    One(String),
    /// At least one index was a set: the Cartesian fan-out.
    Many(BTreeSet<String>),
}

/// Expand a proposition name over evaluated index values.
///
/// Scalars contribute a single rendering, sets contribute one rendering per
/// element. `Err(i)` reports the position of an index that is neither.
pub fn expand_indices(name: &str, values: &[Ast]) -> Result<Expansion, usize> {
    let mut per_index: Vec<Vec<String>> = Vec::with_capacity(values.len());
    let mut any_set = false;
    for (i, value) in values.iter().enumerate() {
        match value.peel() {
            Ast::Set(set) => {
                any_set = true;
                per_index.push(set_renderings(set));
            }
            scalar => per_index.push(vec![render_index(scalar).ok_or(i)?]),
        }
    }

    if !any_set {
        let flat: Vec<String> = per_index.into_iter().map(|mut v| v.remove(0)).collect();
        return Ok(Expansion::One(compose_name(name, &flat)));
    }

    let mut names = BTreeSet::new();
    let mut current = Vec::with_capacity(per_index.len());
    product(name, &per_index, &mut current, &mut names);
    Ok(Expansion::Many(names))
}

fn set_renderings(set: &SetValue) -> Vec<String> {
    match set {
        SetValue::Empty => Vec::new(),
        SetValue::Ints(s) => s.iter().map(|n| n.to_string()).collect(),
        SetValue::Floats(s) => s.iter().map(|v| render_float(v.0)).collect(),
        SetValue::Props(s) => s.iter().cloned().collect(),
    }
}

fn product(
    name: &str,
    per_index: &[Vec<String>],
    current: &mut Vec<String>,
    out: &mut BTreeSet<String>,
) {
    if current.len() == per_index.len() {
        out.insert(compose_name(name, current));
        return;
    }
    for rendering in &per_index[current.len()] {
        current.push(rendering.clone());
        product(name, per_index, current, out);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose() {
        assert_eq!(compose_name("p", &[]), "p");
        assert_eq!(
            compose_name("p", &["1".to_string(), "a".to_string()]),
            "p(1,a)"
        );
    }

    #[test]
    fn test_render_index_scalars() {
        assert_eq!(render_index(&Ast::Int(3)).unwrap(), "3");
        assert_eq!(render_index(&Ast::Float(2.0)).unwrap(), "2.0");
        assert_eq!(render_index(&Ast::Bool(false)).unwrap(), "false");
        assert_eq!(render_index(&Ast::prop("q")).unwrap(), "q");
        assert!(render_index(&Ast::Set(SetValue::Empty)).is_none());
    }

    #[test]
    fn test_expand_scalar_only() {
        let e = expand_indices("p", &[Ast::Int(1), Ast::prop("c")]).unwrap();
        assert_eq!(e, Expansion::One("p(1,c)".to_string()));
    }

    #[test]
    fn test_expand_cartesian() {
        // p([a,b], c, [d,e]) = {p(a,c,d), p(a,c,e), p(b,c,d), p(b,c,e)}
        let e = expand_indices(
            "p",
            &[
                Ast::Set(SetValue::props(["a".to_string(), "b".to_string()])),
                Ast::prop("c"),
                Ast::Set(SetValue::props(["d".to_string(), "e".to_string()])),
            ],
        )
        .unwrap();
        let expected: BTreeSet<String> = ["p(a,c,d)", "p(a,c,e)", "p(b,c,d)", "p(b,c,e)"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(e, Expansion::Many(expected));
    }

    #[test]
    fn test_expand_empty_set_index() {
        let e = expand_indices("p", &[Ast::Set(SetValue::Empty)]).unwrap();
        assert_eq!(e, Expansion::Many(BTreeSet::new()));
    }

    #[test]
    fn test_expand_rejects_formula_index() {
        let bad = Ast::and(Ast::prop("a"), Ast::prop("b"));
        assert_eq!(expand_indices("p", &[Ast::Int(1), bad]), Err(1));
    }
}
