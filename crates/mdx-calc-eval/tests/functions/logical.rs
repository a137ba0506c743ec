//! Logical Operator Tests
//!
//! Tests for: AND, OR, XOR, NOT, IIf, IsEmpty, CoalesceEmpty

use crate::common::{Sales, failing, falsy, truthy};
use mdx_calc_ast::Exp;
use mdx_calc_types::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn boolean(value: Option<bool>) -> Exp {
    match value {
        Some(true) => truthy(),
        Some(false) => falsy(),
        None => Exp::null(),
    }
}

fn expected(value: Option<bool>) -> Value {
    Value::from_boolean(value)
}

#[rstest]
#[case(Some(true), Some(true), Some(true))]
#[case(Some(true), Some(false), Some(false))]
#[case(Some(true), None, None)]
#[case(Some(false), None, Some(false))]
#[case(None, Some(false), Some(false))]
#[case(None, Some(true), None)]
#[case(None, None, None)]
fn test_and_truth_table(
    #[case] left: Option<bool>,
    #[case] right: Option<bool>,
    #[case] result: Option<bool>,
) {
    let sales = Sales::new();
    let exp = Exp::infix("AND", boolean(left), boolean(right));
    assert_eq!(sales.eval(exp), expected(result));
}

#[rstest]
#[case(Some(true), None, Some(true))]
#[case(None, Some(true), Some(true))]
#[case(Some(false), Some(false), Some(false))]
#[case(Some(false), None, None)]
#[case(None, None, None)]
fn test_or_truth_table(
    #[case] left: Option<bool>,
    #[case] right: Option<bool>,
    #[case] result: Option<bool>,
) {
    let sales = Sales::new();
    let exp = Exp::infix("OR", boolean(left), boolean(right));
    assert_eq!(sales.eval(exp), expected(result));
}

#[rstest]
#[case(Some(true), Some(false), Some(true))]
#[case(Some(true), Some(true), Some(false))]
#[case(Some(true), None, None)]
fn test_xor_truth_table(
    #[case] left: Option<bool>,
    #[case] right: Option<bool>,
    #[case] result: Option<bool>,
) {
    let sales = Sales::new();
    let exp = Exp::infix("XOR", boolean(left), boolean(right));
    assert_eq!(sales.eval(exp), expected(result));
}

#[test]
fn test_not() {
    let sales = Sales::new();
    assert_eq!(sales.eval(Exp::prefix("NOT", truthy())), Value::Boolean(false));
    assert_eq!(sales.eval(Exp::prefix("NOT", Exp::null())), Value::Null);
}

#[test]
fn test_short_circuit() {
    let sales = Sales::new();
    assert!(sales.try_eval(failing()).is_err());
    assert_eq!(
        sales.eval(Exp::infix("AND", falsy(), failing())),
        Value::Boolean(false)
    );
    assert_eq!(
        sales.eval(Exp::infix("OR", truthy(), failing())),
        Value::Boolean(true)
    );
}

#[test]
fn test_numbers_are_booleans() {
    let sales = Sales::new();
    let exp = Exp::infix("AND", Exp::integer(2), Exp::double(0.0));
    assert_eq!(sales.eval(exp), Value::Boolean(false));
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_iif_numeric() {
    let sales = Sales::new();
    let exp = Exp::function("IIf", vec![truthy(), Exp::integer(1), Exp::integer(2)]);
    assert_eq!(sales.eval(exp), Value::Double(1.0));
}

#[test]
fn test_iif_null_condition_takes_else_branch() {
    let sales = Sales::new();
    let exp = Exp::function("IIf", vec![Exp::null(), Exp::integer(1), Exp::integer(2)]);
    assert_eq!(sales.eval(exp), Value::Double(2.0));
}

#[test]
fn test_iif_string() {
    let sales = Sales::new();
    let exp = Exp::function("IIf", vec![falsy(), Exp::string("yes"), Exp::string("no")]);
    assert_eq!(sales.eval(exp), Value::String("no".into()));
}

#[test]
fn test_iif_member() {
    let sales = Sales::new();
    let exp = Exp::function(
        "IIf",
        vec![
            truthy(),
            sales.m("[Store].[USA].[CA]"),
            sales.m("[Store].[USA].[OR]"),
        ],
    );
    assert_eq!(
        sales.eval(exp),
        Value::Member(sales.member("[Store].[USA].[CA]"))
    );
}

#[test]
fn test_iif_evaluates_one_branch() {
    let sales = Sales::new();
    let nested = Exp::function("IIf", vec![failing(), Exp::integer(2), Exp::integer(3)]);
    let exp = Exp::function("IIf", vec![truthy(), Exp::integer(1), nested]);
    assert_eq!(sales.eval(exp), Value::Double(1.0));
}

#[rstest]
#[case("[Store].[USA].[WA]", true)]
#[case("[Store].[USA].[CA]", false)]
fn test_is_empty_member(#[case] member: &str, #[case] empty: bool) {
    let sales = Sales::new();
    let exp = Exp::function("IsEmpty", vec![sales.m(member)]);
    assert_eq!(sales.eval(exp), Value::Boolean(empty));
}

#[test]
fn test_is_empty_null() {
    let sales = Sales::new();
    let exp = Exp::function("IsEmpty", vec![Exp::null()]);
    assert_eq!(sales.eval(exp), Value::Boolean(true));
}

#[test]
fn test_coalesce_empty() {
    let sales = Sales::new();
    let exp = Exp::function(
        "CoalesceEmpty",
        vec![
            sales.m("[Store].[USA].[WA]"),
            sales.m("[Store].[USA].[OR]"),
            Exp::integer(0),
        ],
    );
    assert_eq!(sales.eval(exp), Value::Double(5.0));

    let exp = Exp::function("CoalesceEmpty", vec![Exp::null(), Exp::string("fallback")]);
    assert_eq!(sales.eval(exp), Value::String("fallback".into()));
}
