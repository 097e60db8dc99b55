//! Algebraic properties of the builtins over generated values

use gurk_parser::parse;
use gurk_runtime::{Cancellation, Engine, ErrorKind, Instruction, Stack, Value};
use num_traits::Zero;
use proptest::prelude::*;

fn eval(source: &str) -> Result<Vec<Value>, ErrorKind> {
    Engine::new()
        .run(&parse(source).unwrap())
        .map(|state| state.stack.to_vec())
        .map_err(|failure| failure.kind)
}

fn single(source: &str) -> Value {
    let mut values = eval(source).unwrap();
    assert_eq!(values.len(), 1, "{}", source);
    values.remove(0)
}

/// Integer literals: machine-sized, plus values far past 64 bits
fn arb_int() -> BoxedStrategy<String> {
    prop_oneof![
        6 => any::<i64>().prop_map(|n| n.to_string()),
        2 => (-20i64..20).prop_map(|n| n.to_string()),
        2 => "-?[1-9][0-9]{19,40}",
    ]
    .boxed()
}

fn arb_nonzero_int() -> BoxedStrategy<String> {
    arb_int().prop_filter("divisor", |s| s != "0").boxed()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Str,
    Atom,
    Vec,
}

/// Value literal source with its kind; names only ever appear inside vectors
fn arb_literal() -> BoxedStrategy<(Kind, String)> {
    let leaf = prop_oneof![
        arb_int().prop_map(|s| (Kind::Int, s)),
        "[a-z0-9 ]{0,8}".prop_map(|s| (Kind::Str, format!("\"{}\"", s))),
        "[a-z][a-z0-9-]{0,6}".prop_map(|s| (Kind::Atom, format!(":{}", s))),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        let item = prop_oneof![
            4 => inner.prop_map(|(_, s)| s),
            1 => "[a-z][a-z0-9-]{0,6}",
        ];
        prop::collection::vec(item, 0..=4)
            .prop_map(|items| (Kind::Vec, format!("({})", items.join(" "))))
    })
    .boxed()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_addition_commutes(a in arb_int(), b in arb_int()) {
        let ab = single(&format!(":math ( + ) import {} {} +", a, b));
        let ba = single(&format!(":math ( + ) import {} {} +", b, a));
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn test_multiplication_commutes(a in arb_int(), b in arb_int()) {
        let ab = single(&format!(":math ( * ) import {} {} *", a, b));
        let ba = single(&format!(":math ( * ) import {} {} *", b, a));
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn test_division_identity(a in arb_int(), b in arb_nonzero_int()) {
        let program = format!(
            ":math ( + * / % ) import {a} {b} / {b} * {a} {b} % +",
            a = a,
            b = b
        );
        prop_assert_eq!(single(&program), single(&a));
    }

    #[test]
    fn test_remainder_takes_divisor_sign(a in arb_int(), b in arb_nonzero_int()) {
        let r = single(&format!(":math ( % ) import {} {} %", a, b));
        let (Value::Int(r), Value::Int(b)) = (r, single(&b)) else {
            panic!("Expected integers");
        };
        prop_assert!(r.is_zero() || r.sign() == b.sign());
        prop_assert!(r.magnitude() < b.magnitude());
    }

    #[test]
    fn test_equality_reflexive((_, literal) in arb_literal()) {
        let result = single(&format!("{0} {0} =", literal));
        prop_assert_eq!(result, Value::boolean(true));
    }

    #[test]
    fn test_equality_agrees_with_structure(
        (kind_a, a) in arb_literal(),
        (kind_b, b) in arb_literal()
    ) {
        let expected = single(&a) == single(&b);
        if kind_a != kind_b {
            prop_assert!(!expected);
        }
        let result = single(&format!("{} {} =", a, b));
        prop_assert_eq!(result, Value::boolean(expected));
    }

    #[test]
    fn test_code_equal_only_to_itself((_, literal) in arb_literal()) {
        let shared = single(&format!("{{ {} }} dup =", literal));
        prop_assert_eq!(shared, Value::boolean(true));
        let separate = single(&format!("{{ {0} }} {{ {0} }} =", literal));
        prop_assert_eq!(separate, Value::boolean(false));
    }

    #[test]
    fn test_failed_case_leaves_stack_identical(
        literals in prop::collection::vec(arb_literal(), 0..6),
        clauses in prop_oneof![
            Just("{ (1 2 3 4 5 6 7) { } }"),
            Just(r#"{ ("NEVER" _) { } (_ :NEVER) { } }"#),
            Just("{ (n :NEVER) { n } }"),
        ]
    ) {
        let setup: Vec<String> = literals.into_iter().map(|(_, s)| s).collect();
        let mut engine = Engine::new();
        let before = engine.run(&parse(&setup.join(" ")).unwrap()).unwrap();
        let expected = before.stack.to_vec();

        let mut call: Vec<Instruction> = parse(clauses).unwrap();
        call.extend(parse("case").unwrap());

        let mut observed: Option<Stack> = None;
        let failure = engine
            .run_from(
                before,
                &call,
                &mut |_: &Instruction, _: &Stack, new: &Stack| -> Result<(), Cancellation> {
                    observed = Some(new.clone());
                    Ok(())
                },
            )
            .unwrap_err();

        prop_assert_eq!(&failure.kind, &ErrorKind::NoMatchingClause);
        // Failure stack is the stack `case` was called with
        let (_, below) = failure.stack.pop().unwrap();
        prop_assert_eq!(below.to_vec(), expected);
        prop_assert!(failure.stack.ptr_eq(observed.as_ref().unwrap()));
    }
}

#[test]
fn test_equality_edge_cases() {
    let literals = [
        "0", "7", "-7", r#""""#, r#""7""#, ":seven", ":true", "()", "(7)", "(7 ())", "(x)",
    ];
    for (i, a) in literals.iter().enumerate() {
        for (j, b) in literals.iter().enumerate() {
            let result = single(&format!("{} {} =", a, b));
            assert_eq!(result, Value::boolean(i == j), "{} = {}", a, b);
        }
    }
}

#[test]
fn test_import_twice_same_outcome() {
    for name in ["+", "-", "*", "<"] {
        let once = eval(&format!(":math ( {0} ) import 9 4 {0}", name)).unwrap();
        let twice = eval(&format!(":math ( {0} ) import :math ( {0} ) import 9 4 {0}", name)).unwrap();
        let both = eval(&format!(":math ( {0} {0} ) import 9 4 {0}", name)).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, both);
    }
}
