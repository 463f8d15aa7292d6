//! Property tests for the CNF converter: shape, equisatisfiability, and
//! idempotence on random formulas.

mod common;

use common::satisfiable;
use proptest::prelude::*;
use touist_cnf::{is_cnf, CnfConverter};
use touist_syntax::Ast;

fn arb_formula() -> impl Strategy<Value = Ast> {
    let leaf = prop_oneof![
        4 => (0u8..4).prop_map(|i| Ast::prop(format!("v{i}"))),
        1 => Just(Ast::Top),
        1 => Just(Ast::Bottom),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::and(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::or(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::implies(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::equiv(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::xor(a, b)),
            inner.prop_map(Ast::not),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn cnf_output_has_cnf_shape(f in arb_formula()) {
        let cnf = CnfConverter::new().convert(&f).unwrap();
        prop_assert!(is_cnf(&cnf), "not CNF: {cnf}");
    }

    #[test]
    fn cnf_is_equisatisfiable(f in arb_formula()) {
        let cnf = CnfConverter::new().convert(&f).unwrap();
        prop_assert_eq!(satisfiable(&f), satisfiable(&cnf), "formula {} vs cnf {}", f, cnf);
    }

    #[test]
    fn cnf_is_idempotent_up_to_aux_renaming(f in arb_formula()) {
        let cnf = CnfConverter::new().convert(&f).unwrap();
        // A second pass over already-CNF input may only rename auxiliaries,
        // and the converter allocates them deterministically, so the result
        // is structurally equal.
        let again = CnfConverter::new().convert(&cnf).unwrap();
        prop_assert_eq!(&cnf, &again);
    }
}
