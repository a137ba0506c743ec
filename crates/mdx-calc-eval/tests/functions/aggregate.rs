//! Aggregate Function Tests
//!
//! Tests for: Count, Sum, Avg, Min, Max

use crate::common::Sales;
use mdx_calc_ast::Exp;
use mdx_calc_types::{Type, Value};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn states(sales: &Sales) -> Exp {
    Exp::property("Members", sales.level("Store", "State"))
}

// ============================================================================
// Count
// ============================================================================

#[test]
fn test_count() {
    let sales = Sales::new();
    let exp = Exp::function("Count", vec![states(&sales)]);
    assert_eq!(sales.compile(exp.clone()).get_type(), Type::Integer);
    assert_eq!(sales.eval(exp), Value::Integer(4));
}

#[rstest]
#[case("INCLUDEEMPTY", 4)]
#[case("EXCLUDEEMPTY", 3)]
#[case("excludeempty", 3)]
fn test_count_flags(#[case] flag: &str, #[case] expected: i32) {
    let sales = Sales::new();
    let exp = Exp::function("Count", vec![states(&sales), Exp::symbol(flag)]);
    assert_eq!(sales.eval(exp), Value::Integer(expected));
}

#[test]
fn test_count_as_property() {
    let sales = Sales::new();
    let exp = Exp::property("Count", Exp::property("Children", sales.m("[Store].[USA]")));
    assert_eq!(sales.eval(exp), Value::Integer(3));
}

#[test]
fn test_count_ignores_non_empty() {
    let sales = Sales::new();
    let calc = sales.compile(Exp::function("Count", vec![states(&sales)]));
    let mut evaluator = sales.evaluator();
    evaluator.set_non_empty(true);
    assert_eq!(evaluator.execute(&calc).unwrap(), Value::Integer(4));
    assert!(evaluator.non_empty());
}

// ============================================================================
// Numeric Aggregates
// ============================================================================

#[rstest]
#[case("Sum", 22.0)]
#[case("Avg", 22.0 / 3.0)]
#[case("Min", 5.0)]
#[case("Max", 10.0)]
fn test_numeric_aggregates(#[case] function: &str, #[case] expected: f64) {
    let sales = Sales::new();
    let exp = Exp::function(function, vec![states(&sales)]);
    assert_eq!(sales.eval(exp), Value::Double(expected));
}

#[test]
fn test_sum_with_value_expression() {
    let sales = Sales::new();
    let exp = Exp::function(
        "Sum",
        vec![states(&sales), sales.m("[Measures].[Store Cost]")],
    );
    assert_eq!(sales.eval(exp), Value::Double(7.0));
}

#[test]
fn test_sum_with_computed_value() {
    let sales = Sales::new();
    let doubled = Exp::infix("*", sales.m("[Measures].[Unit Sales]"), Exp::integer(2));
    let exp = Exp::function("Sum", vec![states(&sales), doubled]);
    assert_eq!(sales.eval(exp), Value::Double(44.0));
}

#[test]
fn test_aggregate_over_empty_cells_is_null() {
    let sales = Sales::new();
    let exp = Exp::function("Sum", vec![sales.set(&["[Store].[USA].[WA]"])]);
    assert_eq!(sales.eval(exp), Value::Null);

    let exp = Exp::function("Max", vec![sales.set(&["[Store].[USA].[WA]"])]);
    assert_eq!(sales.eval(exp), Value::Null);
}

#[test]
fn test_aggregate_uses_outer_context() {
    let sales = Sales::new();
    let calc = sales.compile(Exp::function(
        "Sum",
        vec![Exp::property("Children", sales.m("[Store].[USA]"))],
    ));
    let mut evaluator = sales.evaluator();
    evaluator.set_context(sales.member("[Gender].[F]"));
    assert_eq!(evaluator.execute(&calc).unwrap(), Value::Double(11.0));
    assert_eq!(
        evaluator.context_member(&sales.hierarchy_ref("Store")),
        Some(sales.member("[Store].[All Stores]"))
    );
}

#[test]
fn test_aggregate_of_crossjoin() {
    let sales = Sales::new();
    let exp = Exp::function(
        "Sum",
        vec![Exp::function(
            "CrossJoin",
            vec![
                sales.set(&["[Store].[USA].[CA]"]),
                sales.set(&["[Gender].[F]", "[Gender].[M]"]),
            ],
        )],
    );
    assert_eq!(sales.eval(exp), Value::Double(10.0));
}
