//! Conversion Function Tests
//!
//! Tests for: StrToMember, CDate, Now

use crate::common::Sales;
use chrono::NaiveDate;
use mdx_calc_ast::Exp;
use mdx_calc_eval::EvalError;
use mdx_calc_types::{Type, Value};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn str_to_member(name: Exp) -> Exp {
    Exp::function("StrToMember", vec![name])
}

#[rstest]
#[case("[Store].[USA].[CA]")]
#[case("[Store].[All Stores].[USA].[CA]")]
#[case("Store.USA.CA")]
#[case("[store].[usa].[ca]")]
fn test_str_to_member(#[case] name: &str) {
    let sales = Sales::new();
    assert_eq!(
        sales.eval(str_to_member(Exp::string(name))),
        Value::Member(sales.member("[Store].[USA].[CA]"))
    );
}

#[rstest]
#[case(Exp::string(""))]
#[case(Exp::string("   "))]
#[case(Exp::null())]
fn test_str_to_member_empty(#[case] name: Exp) {
    let sales = Sales::new();
    assert_eq!(
        sales.try_eval(str_to_member(name)),
        Err(EvalError::empty_expression("StrToMember"))
    );
}

#[rstest]
#[case("[Store].[USA")]
#[case("[Store].")]
#[case("[Store][USA]")]
fn test_str_to_member_malformed(#[case] name: &str) {
    let sales = Sales::new();
    assert!(matches!(
        sales.try_eval(str_to_member(Exp::string(name))),
        Err(EvalError::MalformedName { .. })
    ));
}

#[test]
fn test_str_to_member_not_found() {
    let sales = Sales::new();
    assert_eq!(
        sales.try_eval(str_to_member(Exp::string("[Store].[Mexico]"))),
        Err(EvalError::member_not_found("[Store].[Mexico]"))
    );
}

#[test]
fn test_str_to_member_in_value_context() {
    let sales = Sales::new();
    let exp = Exp::infix(
        "+",
        str_to_member(Exp::string("[Store].[Canada].[BC]")),
        Exp::integer(1),
    );
    assert_eq!(sales.eval(exp), Value::Double(8.0));
}

#[test]
fn test_cdate() {
    let sales = Sales::new();
    let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let exp = Exp::function("CDate", vec![Exp::string("2024-03-15")]);
    assert_eq!(sales.eval(exp), Value::DateTime(expected));
}

#[test]
fn test_cdate_invalid() {
    let sales = Sales::new();
    let exp = Exp::function("CDate", vec![Exp::string("the ides of March")]);
    assert!(matches!(
        sales.try_eval(exp),
        Err(EvalError::InvalidOperand { .. })
    ));
}

#[test]
fn test_now_is_a_date_time() {
    let sales = Sales::new();
    let calc = sales.compile(Exp::function("Now", vec![]));
    assert_eq!(calc.get_type(), Type::DateTime);
    assert_eq!(sales.eval(Exp::function("Now", vec![])).get_type(), Type::DateTime);
}
