//! End-to-end tests: expression in, value out

use mdx_calc::eval::{CompileError, EvalError};
use mdx_calc::types::nullable;
use mdx_calc::{Exp, MdxCalcError, MemoryCube, Type, Value, execute, prepare};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

/// Product (All Products): Drink (Beer, Wine), Food (Bread); one measure
fn products() -> Arc<MemoryCube> {
    let mut b = MemoryCube::builder("Warehouse");
    let product = b.dimension_with_all("Product", "All Products");
    let family = b.level(product, "Family");
    let item = b.level(product, "Item");
    let drink = b.member(family, None, "Drink");
    let food = b.member(family, None, "Food");
    let beer = b.member(item, Some(drink), "Beer");
    let wine = b.member(item, Some(drink), "Wine");
    let bread = b.member(item, Some(food), "Bread");

    let measures = b.measures();
    let units = b.member(measures, None, "Units");
    b.cell(&[beer, units], 4.0)
        .cell(&[wine, units], 2.0)
        .cell(&[bread, units], 9.0)
        .cell(&[drink, units], 6.0)
        .cell(&[food, units], 9.0)
        .cell(&[units], 15.0);
    Arc::new(b.build())
}

fn m(cube: &MemoryCube, name: &str) -> Exp {
    Exp::member(cube.member(name).unwrap_or_else(|| panic!("no member {}", name)))
}

fn items(cube: &MemoryCube) -> Exp {
    Exp::braces(vec![
        m(cube, "[Product].[Drink].[Beer]"),
        m(cube, "[Product].[Drink].[Wine]"),
        m(cube, "[Product].[Food].[Bread]"),
    ])
}

fn run(cube: &Arc<MemoryCube>, exp: Exp) -> mdx_calc::Result<Value> {
    execute(cube.clone(), exp)
}

fn list_names(value: &Value) -> Vec<String> {
    value
        .as_list()
        .map(|list| {
            list.iter()
                .filter_map(|t| t.get(0))
                .map(|m| m.name().to_string())
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_multiply_by_null() {
    let cube = products();
    let exp = Exp::infix("*", Exp::double(2.0), Exp::null());
    let calc = prepare(exp.clone()).unwrap();
    assert_eq!(calc.get_type(), Type::Double);
    let mut evaluator = mdx_calc::Evaluator::new(cube.clone());
    assert!(nullable::is_null(calc.evaluate_double(&mut evaluator).unwrap()));
    assert_eq!(run(&cube, exp).unwrap(), Value::Null);
}

#[test]
fn test_str_to_member_of_empty_string() {
    let cube = products();
    let exp = Exp::infix(
        "+",
        Exp::function("StrToMember", vec![Exp::string("")]),
        Exp::integer(1),
    );
    let error = run(&cube, exp).unwrap_err();
    assert!(error.is_eval());
    assert_eq!(
        error,
        MdxCalcError::Eval(EvalError::empty_expression("StrToMember"))
    );
}

#[test]
fn test_unknown_function_is_compile_error() {
    let cube = products();
    let error = run(&cube, Exp::function("Frobnicate", vec![Exp::integer(1)])).unwrap_err();
    assert!(error.is_compile());
    assert!(matches!(
        error,
        MdxCalcError::Compile(CompileError::UnresolvedFunction { .. })
    ));
}

#[test]
fn test_member_in_value_context() {
    let cube = products();
    let exp = Exp::infix(
        "/",
        m(&cube, "[Product].[Drink]"),
        m(&cube, "[Product].[All Products]"),
    );
    assert_eq!(run(&cube, exp).unwrap(), Value::Double(0.4));
}

// ============================================================================
// Resolution Order
// ============================================================================

#[rstest]
#[case(Exp::integer(2), Exp::integer(3), Type::Double)]
#[case(Exp::double(2.5), Exp::null(), Type::Double)]
fn test_star_on_numbers(#[case] left: Exp, #[case] right: Exp, #[case] expected: Type) {
    let calc = prepare(Exp::infix("*", left, right)).unwrap();
    assert_eq!(calc.get_type(), expected);
}

#[test]
fn test_star_on_sets_is_crossjoin() {
    let cube = products();
    let measures = Exp::braces(vec![m(&cube, "[Measures].[Units]")]);
    let exp = Exp::infix("*", items(&cube), measures);
    let calc = prepare(exp.clone()).unwrap();
    assert_eq!(calc.get_type(), Type::Set(2));

    let value = run(&cube, exp).unwrap();
    assert_eq!(value.as_list().map(|l| l.len()), Some(3));
    assert_eq!(
        run(&cube, Exp::infix("*", Exp::integer(2), Exp::integer(3))).unwrap(),
        Value::Double(6.0)
    );
}

// ============================================================================
// Set Properties
// ============================================================================

#[test]
fn test_hierarchize_is_idempotent() {
    let cube = products();
    let scrambled = Exp::braces(vec![
        m(&cube, "[Product].[Food].[Bread]"),
        m(&cube, "[Product].[Drink].[Wine]"),
        m(&cube, "[Product].[Food]"),
        m(&cube, "[Product].[Drink]"),
    ]);
    let once = Exp::function("Hierarchize", vec![scrambled]);
    let twice = Exp::function("Hierarchize", vec![once.clone()]);

    let once = run(&cube, once).unwrap();
    assert_eq!(list_names(&once), vec!["Food", "Bread", "Drink", "Wine"]);
    assert_eq!(once, run(&cube, twice).unwrap());
}

#[test]
fn test_order_then_count() {
    let cube = products();
    let ordered = Exp::function(
        "Order",
        vec![items(&cube), m(&cube, "[Measures].[Units]"), Exp::symbol("BDESC")],
    );
    assert_eq!(
        list_names(&run(&cube, ordered.clone()).unwrap()),
        vec!["Bread", "Beer", "Wine"]
    );
    let count = Exp::function("Count", vec![ordered]);
    assert_eq!(run(&cube, count).unwrap(), Value::Integer(3));
}

proptest! {
    #[test]
    fn prop_subset_bounds(start in 0i32..6, count in 0i32..6) {
        let cube = products();
        let subset = Exp::function(
            "Subset",
            vec![items(&cube), Exp::integer(start), Exp::integer(count)],
        );
        let value = run(&cube, subset).unwrap();
        let list = value.as_list().cloned().unwrap_or_else(|| mdx_calc::TupleList::empty(0));
        prop_assert_eq!(list.arity(), 1);

        let expected = (3 - start.min(3)).min(count).max(0) as usize;
        prop_assert_eq!(list.len(), expected);
    }

    #[test]
    fn prop_subset_of_everything_is_identity(extra in 0i32..4) {
        let cube = products();
        let whole = run(&cube, items(&cube)).unwrap();
        let subset = Exp::function(
            "Subset",
            vec![items(&cube), Exp::integer(0), Exp::integer(3 + extra)],
        );
        prop_assert_eq!(run(&cube, subset).unwrap(), whole);
    }
}
