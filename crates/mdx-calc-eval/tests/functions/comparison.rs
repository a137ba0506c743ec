//! Comparison Operator Tests
//!
//! Tests for: =, <>, <, >, <=, >=, IS

use crate::common::Sales;
use mdx_calc_ast::Exp;
use mdx_calc_types::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("=", 1.0, 1.0, true)]
#[case("=", 1.0, 2.0, false)]
#[case("<>", 1.0, 2.0, true)]
#[case("<", 1.0, 2.0, true)]
#[case(">", 1.0, 2.0, false)]
#[case("<=", 2.0, 2.0, true)]
#[case(">=", 1.0, 2.0, false)]
fn test_numeric_comparison(
    #[case] op: &str,
    #[case] left: f64,
    #[case] right: f64,
    #[case] expected: bool,
) {
    let sales = Sales::new();
    let exp = Exp::infix(op, Exp::double(left), Exp::double(right));
    assert_eq!(sales.eval(exp), Value::Boolean(expected));
}

#[rstest]
#[case("=")]
#[case("<")]
#[case(">=")]
fn test_null_operand_gives_null(#[case] op: &str) {
    let sales = Sales::new();
    assert_eq!(sales.eval(Exp::infix(op, Exp::null(), Exp::integer(1))), Value::Null);
    assert_eq!(sales.eval(Exp::infix(op, Exp::integer(1), Exp::null())), Value::Null);
}

#[rstest]
#[case("=", f64::NAN, f64::NAN)]
#[case(">", f64::NAN, 1.0)]
#[case("<", 1.0, f64::NAN)]
#[case("<>", f64::NAN, 1.0)]
fn test_nan_operand_gives_null(#[case] op: &str, #[case] left: f64, #[case] right: f64) {
    let sales = Sales::new();
    let exp = Exp::infix(op, Exp::double(left), Exp::double(right));
    assert_eq!(sales.eval(exp), Value::Null);
}

#[test]
fn test_string_comparison() {
    let sales = Sales::new();
    let exp = Exp::infix(">", Exp::string("b"), Exp::string("a"));
    assert_eq!(sales.eval(exp), Value::Boolean(true));
    let exp = Exp::infix("=", Exp::string("a"), Exp::string("A"));
    assert_eq!(sales.eval(exp), Value::Boolean(false));
}

#[test]
fn test_member_compares_by_cell_value() {
    let sales = Sales::new();
    let exp = Exp::infix(">", sales.m("[Store].[USA].[CA]"), Exp::integer(5));
    assert_eq!(sales.eval(exp), Value::Boolean(true));
}

#[test]
fn test_is_compares_identity() {
    let sales = Sales::new();
    let exp = Exp::infix("IS", sales.m("[Store].[USA].[CA]"), sales.m("[Store].[USA].[CA]"));
    assert_eq!(sales.eval(exp), Value::Boolean(true));

    let exp = Exp::infix("IS", sales.m("[Store].[USA].[CA]"), sales.m("[Store].[USA].[OR]"));
    assert_eq!(sales.eval(exp), Value::Boolean(false));
}

#[test]
fn test_is_null_member() {
    let sales = Sales::new();
    let root_parent = Exp::property("Parent", sales.m("[Store].[All Stores]"));
    assert_eq!(
        sales.eval(Exp::infix("IS", root_parent, Exp::null())),
        Value::Boolean(true)
    );
}
