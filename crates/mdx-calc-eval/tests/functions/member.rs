//! Member and Metadata Accessor Tests
//!
//! Tests for: Parent, CurrentMember, DefaultMember, Level, Hierarchy,
//! Dimension, Name, Caption, UniqueName, Properties

use crate::common::Sales;
use mdx_calc_ast::Exp;
use mdx_calc_eval::EvalError;
use mdx_calc_model::MdxConfig;
use mdx_calc_types::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

#[test]
fn test_parent() {
    let sales = Sales::new();
    let exp = Exp::property("Parent", sales.m("[Store].[USA].[CA]"));
    assert_eq!(sales.eval(exp), Value::Member(sales.member("[Store].[USA]")));
}

#[test]
fn test_parent_of_root_is_null() {
    let sales = Sales::new();
    let exp = Exp::property("Parent", sales.m("[Store].[All Stores]"));
    assert_eq!(sales.eval(exp), Value::Null);

    let name = Exp::property("Name", Exp::property("Parent", sales.m("[Store].[All Stores]")));
    assert_eq!(sales.eval(name), Value::Null);
}

#[test]
fn test_current_member_defaults() {
    let sales = Sales::new();
    let exp = Exp::property("CurrentMember", sales.hierarchy("Store"));
    assert_eq!(sales.eval(exp), Value::Member(sales.member("[Store].[All Stores]")));

    let exp = Exp::property("CurrentMember", sales.hierarchy("Measures"));
    assert_eq!(
        sales.eval(exp),
        Value::Member(sales.member("[Measures].[Unit Sales]"))
    );
}

#[test]
fn test_current_member_follows_context() {
    let sales = Sales::new();
    let calc = sales.compile(Exp::property("CurrentMember", sales.hierarchy("Store")));
    let mut evaluator = sales.evaluator();
    evaluator.set_context(sales.member("[Store].[USA].[OR]"));
    assert_eq!(
        calc.evaluate(&mut evaluator).unwrap(),
        Value::Member(sales.member("[Store].[USA].[OR]"))
    );
}

#[test]
fn test_default_member() {
    let sales = Sales::new();
    let exp = Exp::property("DefaultMember", sales.hierarchy("Gender"));
    assert_eq!(sales.eval(exp), Value::Member(sales.member("[Gender].[All Gender]")));
}

#[test]
fn test_structure_of_member() {
    let sales = Sales::new();
    let ca = || sales.m("[Store].[USA].[CA]");

    let level = Exp::property("Name", Exp::property("Level", ca()));
    assert_eq!(sales.eval(level), string("State"));

    let hierarchy = Exp::property("UniqueName", Exp::property("Hierarchy", ca()));
    assert_eq!(sales.eval(hierarchy), string("[Store]"));

    let dimension = Exp::property("Name", Exp::property("Dimension", ca()));
    assert_eq!(sales.eval(dimension), string("Store"));
}

#[test]
fn test_dimension_of_level_and_hierarchy() {
    let sales = Sales::new();
    let of_level = Exp::property("Dimension", sales.level("Store", "State"));
    let of_hierarchy = Exp::property("Dimension", sales.hierarchy("Store"));
    assert_eq!(sales.eval(of_level), sales.eval(of_hierarchy));
}

#[rstest]
#[case("Name", "CA")]
#[case("Caption", "California")]
#[case("UniqueName", "[Store].[All Stores].[USA].[CA]")]
fn test_member_names(#[case] accessor: &str, #[case] expected: &str) {
    let sales = Sales::new();
    let exp = Exp::property(accessor, sales.m("[Store].[USA].[CA]"));
    assert_eq!(sales.eval(exp), string(expected));
}

#[rstest]
#[case("Name", "State")]
#[case("UniqueName", "[Store].[State]")]
fn test_level_names(#[case] accessor: &str, #[case] expected: &str) {
    let sales = Sales::new();
    let exp = Exp::property(accessor, sales.level("Store", "State"));
    assert_eq!(sales.eval(exp), string(expected));
}

// ============================================================================
// Properties
// ============================================================================

fn property(sales: &Sales, member: &str, name: &str) -> Exp {
    Exp::method("Properties", sales.m(member), vec![Exp::string(name)])
}

#[rstest]
#[case("Population", Value::Integer(39))]
#[case("POPULATION", Value::Integer(39))]
#[case("LEVEL_NUMBER", Value::Integer(2))]
#[case("caption", Value::String("California".into()))]
#[case("PARENT_UNIQUE_NAME", Value::String("[Store].[All Stores].[USA]".into()))]
fn test_properties(#[case] name: &str, #[case] expected: Value) {
    let sales = Sales::new();
    assert_eq!(sales.eval(property(&sales, "[Store].[USA].[CA]", name)), expected);
}

#[test]
fn test_declared_property_without_value_is_null() {
    let sales = Sales::new();
    assert_eq!(
        sales.eval(property(&sales, "[Store].[USA].[OR]", "Population")),
        Value::Null
    );
}

#[test]
fn test_unknown_property_fails() {
    let sales = Sales::new();
    let result = sales.try_eval(property(&sales, "[Store].[USA].[CA]", "Altitude"));
    assert_eq!(
        result,
        Err(EvalError::invalid_property(
            "Altitude",
            "[Store].[All Stores].[USA].[CA]"
        ))
    );
}

#[test]
fn test_properties_honour_case_sensitivity() {
    let sales = Sales::new();
    let calc = sales.compile(property(&sales, "[Store].[USA].[CA]", "population"));

    let mut insensitive = sales.evaluator();
    assert_eq!(calc.evaluate(&mut insensitive).unwrap(), Value::Integer(39));

    let mut sensitive = sales.evaluator_with(MdxConfig::default().with_case_sensitive(true));
    assert!(matches!(
        calc.evaluate(&mut sensitive),
        Err(EvalError::InvalidProperty { .. })
    ));
}
