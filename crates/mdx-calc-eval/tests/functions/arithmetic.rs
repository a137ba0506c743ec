//! Arithmetic Operator Tests
//!
//! Tests for: +, -, *, /, unary -, ||

use crate::common::Sales;
use mdx_calc_ast::Exp;
use mdx_calc_types::{Type, Value, nullable};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("+", 7.0)]
#[case("-", 3.0)]
#[case("*", 10.0)]
#[case("/", 2.5)]
fn test_binary_operators(#[case] op: &str, #[case] expected: f64) {
    let sales = Sales::new();
    let exp = Exp::infix(op, Exp::double(5.0), Exp::integer(2));
    assert_eq!(sales.eval(exp), Value::Double(expected));
}

#[test]
fn test_multiply_by_null_is_null_sentinel() {
    let sales = Sales::new();
    let calc = sales.compile(Exp::infix("*", Exp::double(2.0), Exp::null()));
    assert_eq!(calc.get_type(), Type::Double);
    let result = calc.evaluate_double(&mut sales.evaluator()).unwrap();
    assert!(nullable::is_null(result));
    assert_eq!(sales.eval(Exp::infix("*", Exp::double(2.0), Exp::null())), Value::Null);
}

#[test]
fn test_nan_operand_gives_null() {
    let sales = Sales::new();
    let exp = Exp::infix("+", Exp::double(f64::NAN), Exp::double(1.0));
    assert_eq!(sales.eval(exp), Value::Null);
}

#[test]
fn test_division_by_zero_follows_ieee() {
    let sales = Sales::new();
    let exp = Exp::infix("/", Exp::double(1.0), Exp::integer(0));
    assert_eq!(sales.eval(exp), Value::Double(f64::INFINITY));
}

#[test]
fn test_negation() {
    let sales = Sales::new();
    assert_eq!(sales.eval(Exp::prefix("-", Exp::integer(4))), Value::Double(-4.0));
    assert_eq!(sales.eval(Exp::prefix("-", Exp::null())), Value::Null);
}

#[test]
fn test_members_contribute_their_cell_values() {
    let sales = Sales::new();
    let exp = Exp::infix(
        "+",
        sales.m("[Store].[USA].[CA]"),
        sales.m("[Store].[USA].[OR]"),
    );
    assert_eq!(sales.eval(exp), Value::Double(15.0));
}

#[test]
fn test_empty_cell_propagates_null() {
    let sales = Sales::new();
    let exp = Exp::infix("*", sales.m("[Store].[USA].[WA]"), Exp::integer(3));
    assert_eq!(sales.eval(exp), Value::Null);
}

#[test]
fn test_string_concatenation() {
    let sales = Sales::new();
    let exp = Exp::infix("||", Exp::string("Unit"), Exp::string(" Sales"));
    assert_eq!(sales.eval(exp), Value::String("Unit Sales".into()));

    let exp = Exp::infix("||", Exp::string("a"), Exp::null());
    assert_eq!(sales.eval(exp), Value::String("a".into()));
}
