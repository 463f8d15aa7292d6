//! Brute-force satisfiability helpers shared by the integration tests.

use std::collections::{BTreeSet, HashMap};
use touist_syntax::Ast;

/// Collect every proposition name in a propositional formula.
pub fn collect_props(ast: &Ast, out: &mut BTreeSet<String>) {
    match ast.peel() {
        Ast::Top | Ast::Bottom => {}
        Ast::Prop(p) => {
            out.insert(p.clone());
        }
        Ast::Not(x) => collect_props(x, out),
        Ast::And(l, r)
        | Ast::Or(l, r)
        | Ast::Xor(l, r)
        | Ast::Implies(l, r)
        | Ast::Equiv(l, r) => {
            collect_props(l, out);
            collect_props(r, out);
        }
        other => panic!("not a propositional formula: {other}"),
    }
}

/// Truth value under an assignment; unassigned propositions are false.
pub fn truth_value(ast: &Ast, assignment: &HashMap<String, bool>) -> bool {
    match ast.peel() {
        Ast::Top => true,
        Ast::Bottom => false,
        Ast::Prop(p) => *assignment.get(p).unwrap_or(&false),
        Ast::Not(x) => !truth_value(x, assignment),
        Ast::And(l, r) => truth_value(l, assignment) && truth_value(r, assignment),
        Ast::Or(l, r) => truth_value(l, assignment) || truth_value(r, assignment),
        Ast::Xor(l, r) => truth_value(l, assignment) != truth_value(r, assignment),
        Ast::Implies(l, r) => !truth_value(l, assignment) || truth_value(r, assignment),
        Ast::Equiv(l, r) => truth_value(l, assignment) == truth_value(r, assignment),
        other => panic!("not a propositional formula: {other}"),
    }
}

/// Exhaustive satisfiability check over every assignment of the formula's
/// propositions. Only usable for small formulas.
pub fn satisfiable(ast: &Ast) -> bool {
    let mut props = BTreeSet::new();
    collect_props(ast, &mut props);
    let props: Vec<String> = props.into_iter().collect();
    let n = props.len();
    assert!(n <= 20, "too many propositions for brute force: {n}");
    (0u64..(1 << n)).any(|bits| {
        let assignment: HashMap<String, bool> = props
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), bits >> i & 1 == 1))
            .collect();
        truth_value(ast, &assignment)
    })
}
