//! Set Function Tests
//!
//! Tests for: {}, (), Children, Members, AllMembers, Subset, Head, Tail,
//! Extract, Hierarchize, Unorder, Order, Distinct, CrossJoin, *, Union, Filter

use crate::common::{Sales, names};
use mdx_calc_ast::Exp;
use mdx_calc_eval::{CompileError, EvalError, ExpCompiler, ResultStyle, Validator};
use mdx_calc_types::{Type, Value};
use pretty_assertions::assert_eq;
use rstest::rstest;

const USA_STATES: &[&str] = &["[Store].[USA].[CA]", "[Store].[USA].[OR]", "[Store].[USA].[WA]"];

fn states(sales: &Sales) -> Exp {
    Exp::property("Members", sales.level("Store", "State"))
}

fn genders(sales: &Sales) -> Exp {
    sales.set(&["[Gender].[F]", "[Gender].[M]"])
}

fn symbol(keyword: &str) -> Exp {
    Exp::symbol(keyword)
}

// ============================================================================
// Constructors
// ============================================================================

#[test]
fn test_braces_concatenate() {
    let sales = Sales::new();
    let exp = Exp::braces(vec![
        sales.m("[Store].[USA].[CA]"),
        sales.set(&["[Store].[USA].[OR]", "[Store].[USA].[CA]"]),
    ]);
    assert_eq!(sales.eval_set(exp), vec!["CA", "OR", "CA"]);
}

#[test]
fn test_braces_reject_mixed_arity() {
    let sales = Sales::new();
    let pair = Exp::parentheses(vec![sales.m("[Store].[USA].[CA]"), sales.m("[Gender].[F]")]);
    let exp = Exp::braces(vec![sales.m("[Store].[USA].[OR]"), pair]);
    assert!(matches!(
        ExpCompiler::standard().compile(&exp),
        Err(CompileError::InvalidArgument { .. })
    ));
}

#[test]
fn test_tuple_constructor() {
    let sales = Sales::new();
    let pair = Exp::parentheses(vec![sales.m("[Store].[USA].[CA]"), sales.m("[Gender].[F]")]);
    assert_eq!(Validator::standard().validate(pair.clone()).unwrap().get_type(), Type::Tuple(2));
    assert_eq!(sales.eval_set(Exp::braces(vec![pair.clone()])), vec!["CA/F"]);

    // A tuple in value context addresses a cell
    assert_eq!(
        sales.eval(Exp::infix("+", pair, Exp::integer(0))),
        Value::Double(6.0)
    );
}

#[test]
fn test_parenthesized_scalar_passes_through() {
    let sales = Sales::new();
    let exp = Exp::infix(
        "*",
        Exp::parentheses(vec![Exp::infix("+", Exp::integer(1), Exp::integer(2))]),
        Exp::integer(3),
    );
    assert_eq!(sales.eval(exp), Value::Double(9.0));
}

// ============================================================================
// Member Sets
// ============================================================================

#[test]
fn test_children() {
    let sales = Sales::new();
    let exp = Exp::property("Children", sales.m("[Store].[USA]"));
    assert_eq!(sales.eval_set(exp), vec!["CA", "OR", "WA"]);
}

#[test]
fn test_children_non_empty() {
    let sales = Sales::new();
    let exp = Exp::property("Children", sales.m("[Store].[USA]"));
    let mut evaluator = sales.evaluator();
    evaluator.set_non_empty(true);
    assert_eq!(sales.eval_set_in(exp, &mut evaluator), vec!["CA", "OR"]);
}

#[test]
fn test_level_members() {
    let sales = Sales::new();
    assert_eq!(sales.eval_set(states(&sales)), vec!["CA", "OR", "WA", "BC"]);
}

#[rstest]
#[case("Members")]
#[case("AllMembers")]
fn test_hierarchy_members_pre_order(#[case] function: &str) {
    let sales = Sales::new();
    let exp = Exp::property(function, sales.hierarchy("Store"));
    assert_eq!(
        sales.eval_set(exp),
        vec!["All Stores", "USA", "CA", "OR", "WA", "Canada", "BC"]
    );
}

#[test]
fn test_member_sets_are_native_eligible() {
    let sales = Sales::new();
    let calc = sales.compile(states(&sales));
    let list = calc.as_list().unwrap();
    assert!(list.is_native_eligible());
    assert_eq!(list.style(), ResultStyle::List);
}

// ============================================================================
// Slicing
// ============================================================================

fn subset(set: Exp, args: &[i32]) -> Exp {
    let mut all = vec![set];
    all.extend(args.iter().map(|&a| Exp::integer(a)));
    Exp::function("Subset", all)
}

#[rstest]
#[case(&[1, 2], vec!["OR", "WA"])]
#[case(&[2], vec!["WA", "BC"])]
#[case(&[3, 10], vec!["BC"])]
#[case(&[4], vec![])]
#[case(&[10, 2], vec![])]
#[case(&[-1, 2], vec![])]
#[case(&[1, 0], vec![])]
fn test_subset(#[case] args: &[i32], #[case] expected: Vec<&str>) {
    let sales = Sales::new();
    assert_eq!(sales.eval_set(subset(states(&sales), args)), expected);
}

#[test]
fn test_subset_beyond_end_keeps_arity() {
    let sales = Sales::new();
    let exp = subset(Exp::function("CrossJoin", vec![states(&sales), genders(&sales)]), &[100]);
    let list = sales.compile(exp).evaluate_list(&mut sales.evaluator()).unwrap();
    assert!(list.is_empty());
    assert_eq!(list.arity(), 2);
}

#[test]
fn test_subset_of_whole_list_is_the_list() {
    let sales = Sales::new();
    let mut evaluator = sales.evaluator();
    let whole = sales.compile(states(&sales)).evaluate_list(&mut evaluator).unwrap();
    let sliced = sales
        .compile(subset(states(&sales), &[0, 4]))
        .evaluate_list(&mut evaluator)
        .unwrap();
    assert_eq!(sliced, whole);
}

#[test]
fn test_subset_ignores_non_empty() {
    let sales = Sales::new();
    let mut evaluator = sales.evaluator();
    evaluator.set_non_empty(true);
    let exp = subset(Exp::property("Children", sales.m("[Store].[USA]")), &[0]);
    assert_eq!(sales.eval_set_in(exp, &mut evaluator), vec!["CA", "OR", "WA"]);
    assert!(evaluator.non_empty());
}

#[test]
fn test_head_and_tail() {
    let sales = Sales::new();
    let head = Exp::function("Head", vec![states(&sales)]);
    assert_eq!(sales.eval_set(head), vec!["CA"]);

    let head = Exp::function("Head", vec![states(&sales), Exp::integer(2)]);
    assert_eq!(sales.eval_set(head), vec!["CA", "OR"]);

    let tail = Exp::function("Tail", vec![states(&sales), Exp::integer(2)]);
    assert_eq!(sales.eval_set(tail), vec!["WA", "BC"]);

    let tail = Exp::function("Tail", vec![states(&sales), Exp::integer(9)]);
    assert_eq!(sales.eval_set(tail), vec!["CA", "OR", "WA", "BC"]);
}

#[rstest]
#[case(4, vec!["CA", "OR", "WA", "BC"])]
#[case(5, vec!["CA", "OR", "WA", "BC"])]
#[case(0, vec![])]
#[case(-1, vec![])]
fn test_tail_bounds(#[case] count: i32, #[case] expected: Vec<&str>) {
    let sales = Sales::new();
    let tail = Exp::function("Tail", vec![states(&sales), Exp::integer(count)]);
    assert_eq!(sales.eval_set(tail), expected);
}

// ============================================================================
// Projection and Ordering
// ============================================================================

fn store_by_gender(sales: &Sales) -> Exp {
    Exp::function(
        "CrossJoin",
        vec![sales.set(&["[Store].[USA].[CA]", "[Store].[USA].[OR]"]), genders(sales)],
    )
}

#[test]
fn test_extract() {
    let sales = Sales::new();
    let exp = Exp::function("Extract", vec![store_by_gender(&sales), sales.hierarchy("Gender")]);
    assert_eq!(sales.eval_set(exp), vec!["F", "M"]);

    let exp = Exp::function(
        "Extract",
        vec![store_by_gender(&sales), sales.hierarchy("Gender"), sales.hierarchy("Store")],
    );
    assert_eq!(sales.eval_set(exp), vec!["F/CA", "M/CA", "F/OR", "M/OR"]);
}

#[test]
fn test_extract_is_idempotent() {
    let sales = Sales::new();
    let once = Exp::function("Extract", vec![store_by_gender(&sales), sales.hierarchy("Store")]);
    let twice = Exp::function("Extract", vec![once.clone(), sales.hierarchy("Store")]);
    assert_eq!(sales.eval_set(once), sales.eval_set(twice));
}

#[test]
fn test_extract_unknown_hierarchy() {
    let sales = Sales::new();
    let exp = Exp::function("Extract", vec![states(&sales), sales.hierarchy("Gender")]);
    assert!(matches!(
        sales.try_eval(exp),
        Err(EvalError::InvalidOperand { .. })
    ));
}

fn scrambled(sales: &Sales) -> Exp {
    sales.set(&[
        "[Store].[USA].[CA]",
        "[Store].[USA]",
        "[Store].[Canada].[BC]",
        "[Store].[Canada]",
        "[Store].[USA].[OR]",
    ])
}

#[test]
fn test_hierarchize() {
    let sales = Sales::new();
    let exp = Exp::function("Hierarchize", vec![scrambled(&sales)]);
    assert_eq!(sales.eval_set(exp), vec!["USA", "CA", "OR", "Canada", "BC"]);
}

#[test]
fn test_hierarchize_post() {
    let sales = Sales::new();
    let exp = Exp::function("Hierarchize", vec![scrambled(&sales), symbol("POST")]);
    assert_eq!(sales.eval_set(exp), vec!["CA", "OR", "USA", "BC", "Canada"]);
}

#[test]
fn test_hierarchize_rejects_unknown_flag() {
    let sales = Sales::new();
    let exp = Exp::function("Hierarchize", vec![scrambled(&sales), symbol("SIDEWAYS")]);
    assert!(matches!(
        ExpCompiler::standard().compile(&exp),
        Err(CompileError::UnresolvedFunction { .. } | CompileError::InvalidArgument { .. })
    ));
}

fn order(sales: &Sales, set: Exp, flag: &str) -> Exp {
    Exp::function(
        "Order",
        vec![set, sales.m("[Measures].[Unit Sales]"), symbol(flag)],
    )
}

#[rstest]
#[case("BASC", vec!["OR", "BC", "Canada", "CA", "USA"])]
#[case("BDESC", vec!["USA", "CA", "BC", "Canada", "OR"])]
#[case("ASC", vec!["Canada", "BC", "USA", "OR", "CA"])]
#[case("DESC", vec!["USA", "CA", "OR", "Canada", "BC"])]
fn test_order(#[case] flag: &str, #[case] expected: Vec<&str>) {
    let sales = Sales::new();
    assert_eq!(sales.eval_set(order(&sales, scrambled(&sales), flag)), expected);
}

#[test]
fn test_order_defaults_to_asc() {
    let sales = Sales::new();
    let exp = Exp::function(
        "Order",
        vec![sales.set(USA_STATES), sales.m("[Measures].[Unit Sales]")],
    );
    // WA is empty and sorts first
    assert_eq!(sales.eval_set(exp), vec!["WA", "OR", "CA"]);
}

#[test]
fn test_order_by_string_key() {
    let sales = Sales::new();
    let key = Exp::property("Name", Exp::property("CurrentMember", sales.hierarchy("Store")));
    let exp = Exp::function("Order", vec![states(&sales), key, symbol("BDESC")]);
    assert_eq!(sales.eval_set(exp), vec!["WA", "OR", "CA", "BC"]);
}

#[rstest]
#[case("ASC")]
#[case("DESC")]
fn test_order_with_equal_keys_keeps_hierarchy(#[case] flag: &str) {
    let sales = Sales::new();
    let set = sales.set(&["[Store].[USA].[CA]", "[Store].[Canada]", "[Store].[USA]"]);
    let exp = Exp::function("Order", vec![set, Exp::integer(1), symbol(flag)]);
    assert_eq!(sales.eval_set(exp), vec!["USA", "CA", "Canada"]);
}

#[test]
fn test_unorder_and_distinct() {
    let sales = Sales::new();
    let set = sales.set(&["[Store].[USA].[OR]", "[Store].[USA].[CA]", "[Store].[USA].[OR]"]);

    let calc = sales.compile(Exp::function("Unorder", vec![set.clone()]));
    let list = calc.evaluate_list(&mut sales.evaluator()).unwrap();
    assert!(!list.is_ordered());
    assert_eq!(names(&list), vec!["OR", "CA", "OR"]);

    let exp = Exp::function("Distinct", vec![set]);
    assert_eq!(sales.eval_set(exp), vec!["OR", "CA"]);
}

// ============================================================================
// Combination
// ============================================================================

#[test]
fn test_crossjoin_is_left_major() {
    let sales = Sales::new();
    assert_eq!(
        sales.eval_set(store_by_gender(&sales)),
        vec!["CA/F", "CA/M", "OR/F", "OR/M"]
    );
}

#[test]
fn test_crossjoin_non_empty() {
    let sales = Sales::new();
    let mut evaluator = sales.evaluator();
    evaluator.set_non_empty(true);
    assert_eq!(
        sales.eval_set_in(store_by_gender(&sales), &mut evaluator),
        vec!["CA/F", "CA/M", "OR/F"]
    );
}

#[test]
fn test_star_on_sets_is_crossjoin() {
    let sales = Sales::new();
    let exp = Exp::infix("*", sales.set(&["[Store].[USA].[CA]"]), genders(&sales));
    let calc = sales.compile(exp.clone());
    assert_eq!(calc.get_type(), Type::Set(2));
    assert_eq!(sales.eval_set(exp), vec!["CA/F", "CA/M"]);
}

#[test]
fn test_star_on_members_is_multiplication() {
    let sales = Sales::new();
    let exp = Exp::infix("*", sales.m("[Store].[USA].[CA]"), sales.m("[Store].[USA].[OR]"));
    assert_eq!(sales.eval(exp), Value::Double(50.0));
}

#[test]
fn test_union() {
    let sales = Sales::new();
    let left = sales.set(&["[Store].[USA].[CA]", "[Store].[USA].[OR]"]);
    let right = sales.set(&["[Store].[USA].[OR]", "[Store].[Canada].[BC]"]);

    let exp = Exp::function("Union", vec![left.clone(), right.clone()]);
    assert_eq!(sales.eval_set(exp), vec!["CA", "OR", "BC"]);

    let exp = Exp::function("Union", vec![left, right, symbol("ALL")]);
    assert_eq!(sales.eval_set(exp), vec!["CA", "OR", "OR", "BC"]);
}

#[test]
fn test_union_rejects_mixed_arity() {
    let sales = Sales::new();
    let exp = Exp::function("Union", vec![states(&sales), store_by_gender(&sales)]);
    assert!(matches!(
        ExpCompiler::standard().compile(&exp),
        Err(CompileError::InvalidArgument { .. })
    ));
}

#[test]
fn test_filter() {
    let sales = Sales::new();
    let condition = Exp::infix(">", sales.m("[Measures].[Unit Sales]"), Exp::integer(6));
    let exp = Exp::function("Filter", vec![states(&sales), condition]);
    assert_eq!(sales.eval_set(exp), vec!["CA", "BC"]);
}

#[test]
fn test_filter_restores_context() {
    let sales = Sales::new();
    let condition = Exp::prefix("NOT", Exp::function("IsEmpty", vec![sales.m("[Measures].[Store Cost]")]));
    let calc = sales.compile(Exp::function("Filter", vec![states(&sales), condition]));
    let mut evaluator = sales.evaluator();
    let list = calc.evaluate_list(&mut evaluator).unwrap();
    assert_eq!(names(&list), vec!["CA", "OR", "BC"]);
    assert_eq!(evaluator.savepoint_depth(), 0);
    assert_eq!(
        evaluator.context_member(&sales.hierarchy_ref("Store")),
        Some(sales.member("[Store].[All Stores]"))
    );
}
