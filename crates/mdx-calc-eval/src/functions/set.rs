//! Set builders and transformers
//!
//! Implements: `{}`, `()`, Children, Members, AllMembers, Subset, Head, Tail,
//! Extract, Hierarchize, Unorder, Order, Distinct, CrossJoin, `*`, Union,
//! Filter, NativizeSet
//!
//! Member and crossjoin builders honour the evaluator's `non_empty` flag and
//! are native-eligible.

use crate::calc::{Calc, ListCalc, ResultStyle, TypedCalc};
use crate::compiler::{ExpCompiler, required_arg};
use crate::error::{CompileError, CompileResult, EvalError, EvalResult};
use crate::evaluator::Evaluator;
use crate::registry::{FunctionDefinition, FunctionMetaData, FunctionTableBuilder};
use crate::sorter::{self, SortFlag};
use mdx_calc_ast::{ResolvedFunCall, Syntax};
use mdx_calc_types::{HierarchyRef, MemberRef, ParamType, Tuple, TupleList, Type};

pub(crate) fn register(builder: &mut FunctionTableBuilder) {
    builder
        .define(braces())
        .define(tuple_constructor())
        .define(parenthesized_scalar())
        .define(parenthesized_set())
        .define(children())
        .define(level_members("Members"))
        .define(hierarchy_members("Members"))
        .define(level_members("AllMembers"))
        .define(hierarchy_members("AllMembers"))
        .define(subset())
        .define(head())
        .define(tail())
        .define(extract())
        .define(hierarchize())
        .define(unorder())
        .define(order())
        .define(distinct())
        .define(crossjoin(FunctionMetaData::function("CrossJoin", Type::Set(2))))
        .define(crossjoin(FunctionMetaData::infix("*", Type::Set(2))))
        .define(union())
        .define(filter())
        .define(nativize_set());
}

// ============================================================================
// Helpers
// ============================================================================

/// Set type with the arity of the first argument
fn set_of_first(arg_types: &[Type]) -> Type {
    Type::Set(arg_types.first().and_then(Type::arity).unwrap_or(1))
}

/// Set type whose arity is the sum of the argument arities
fn set_of_sum(arg_types: &[Type]) -> Type {
    Type::Set(arg_types.iter().filter_map(Type::arity).sum())
}

/// Compile every argument as a list, requiring a common arity
fn compile_lists(call: &ResolvedFunCall, compiler: &ExpCompiler) -> CompileResult<(usize, Vec<Calc>)> {
    let mut arity = None;
    let mut children = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        let found = compiler.arity_of(arg)?;
        match arity {
            Some(expected) if expected != found => {
                return Err(CompileError::invalid_argument(
                    &call.name,
                    format!("all sets must have arity {}, found {} in {}", expected, found, arg),
                ));
            }
            _ => arity = Some(found),
        }
        children.push(compiler.compile_list(arg, false)?);
    }
    Ok((arity.unwrap_or(1), children))
}

/// Evaluate a list child with `non_empty` cleared
fn evaluate_unfiltered(calc: &Calc, evaluator: &mut Evaluator) -> EvalResult<TupleList> {
    let mut scope = evaluator.scoped();
    scope.set_non_empty(false);
    calc.evaluate_list(&mut scope)
}

fn list_node(
    call: &ResolvedFunCall,
    compiler: &ExpCompiler,
    style: ResultStyle,
    eval: impl Fn(&[Calc], &mut Evaluator) -> EvalResult<TupleList> + Send + Sync + 'static,
) -> CompileResult<ListCalc> {
    let set = required_arg(call, 0)?;
    let arity = compiler.arity_of(set)?;
    let list = compiler.compile_list(set, false)?;
    Ok(ListCalc::new(call.name.clone(), arity, style, vec![list], eval))
}

// ============================================================================
// Constructors
// ============================================================================

/// `{a, b, ...}`: concatenation of the element sets
fn braces() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::new("{}", Syntax::Braces, Type::Set(1))
            .repeating(ParamType::AnySet, true)
            .describe("Set of the given members, tuples and sets"),
        |call, compiler| {
            let (arity, children) = compile_lists(call, compiler)?;
            Ok(Calc::List(ListCalc::new(
                "{}",
                arity,
                ResultStyle::MutableList,
                children,
                move |c, ev| {
                    let mut result = TupleList::mutable(arity);
                    for child in c {
                        result.extend_from(&child.evaluate_list(ev)?)?;
                    }
                    Ok(result)
                },
            )))
        },
    )
    .with_result_type(set_of_first)
}

/// `(m1, m2, ...)`: a tuple of the given members and tuples
fn tuple_constructor() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::new("()", Syntax::Parentheses, Type::Tuple(1))
            .param(ParamType::AnyTuple)
            .repeating(ParamType::AnyTuple, true)
            .describe("Tuple of the given members"),
        |call, compiler| {
            let children = call
                .args
                .iter()
                .map(|arg| compiler.compile_tuple(arg))
                .collect::<CompileResult<Vec<_>>>()?;
            let arity = children.iter().filter_map(|c| c.get_type().arity()).sum();
            Ok(Calc::Tuple(TypedCalc::new(
                "()",
                Type::Tuple(arity),
                children,
                |c, ev| {
                    let mut members: Vec<MemberRef> = Vec::new();
                    for child in c {
                        match child.evaluate_tuple(ev)? {
                            Some(tuple) => members.extend(tuple.iter().cloned()),
                            None => return Ok(None),
                        }
                    }
                    Ok(Some(Tuple::new(members)))
                },
            )))
        },
    )
    .with_result_type(|arg_types| Type::Tuple(arg_types.iter().filter_map(Type::arity).sum()))
}

/// `(expr)` around a scalar: the expression itself
fn parenthesized_scalar() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::new("()", Syntax::Parentheses, Type::Unknown)
            .param(ParamType::Scalar)
            .describe("Parenthesized expression"),
        |call, compiler| compiler.compile(required_arg(call, 0)?),
    )
    .with_result_type(|arg_types| arg_types.first().copied().unwrap_or_default())
}

/// `(set)`: the set itself
fn parenthesized_set() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::new("()", Syntax::Parentheses, Type::Set(1))
            .param(ParamType::AnySet)
            .describe("Parenthesized set"),
        |call, compiler| compiler.compile_list(required_arg(call, 0)?, false),
    )
    .with_result_type(set_of_first)
}

// ============================================================================
// Member sets
// ============================================================================

fn children() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("Children", Type::Set(1))
            .param(ParamType::Exact(Type::Member))
            .describe("Children of a member"),
        |call, compiler| {
            let member = compiler.compile_member(required_arg(call, 0)?)?;
            let node = ListCalc::new("Children", 1, ResultStyle::List, vec![member], |c, ev| {
                let children = match c[0].evaluate_member(ev)? {
                    Some(member) => TupleList::from_members(member.children()),
                    None => TupleList::empty(1),
                };
                ev.filter_non_empty(children)
            });
            Ok(Calc::List(node.native_eligible()))
        },
    )
}

fn level_members(name: &'static str) -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property(name, Type::Set(1))
            .param(ParamType::Exact(Type::Level))
            .describe("Members of a level"),
        move |call, compiler| {
            let level = compiler.compile_level(required_arg(call, 0)?)?;
            let node = ListCalc::new(name, 1, ResultStyle::List, vec![level], |c, ev| {
                let members = TupleList::from_members(c[0].evaluate_level(ev)?.members());
                ev.filter_non_empty(members)
            });
            Ok(Calc::List(node.native_eligible()))
        },
    )
}

fn hierarchy_members(name: &'static str) -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property(name, Type::Set(1))
            .param(ParamType::Exact(Type::Hierarchy))
            .describe("Members of a hierarchy, each followed by its descendants"),
        move |call, compiler| {
            let hierarchy = compiler.compile_hierarchy(required_arg(call, 0)?)?;
            let node = ListCalc::new(name, 1, ResultStyle::List, vec![hierarchy], |c, ev| {
                let mut members = Vec::new();
                pre_order(c[0].evaluate_hierarchy(ev)?.root_members(), &mut members);
                ev.filter_non_empty(TupleList::from_members(members))
            });
            Ok(Calc::List(node.native_eligible()))
        },
    )
}

fn pre_order(members: Vec<MemberRef>, out: &mut Vec<MemberRef>) {
    for member in members {
        let children = member.children();
        out.push(member);
        pre_order(children, out);
    }
}

// ============================================================================
// Slicing
// ============================================================================

/// Slice `[start, start + count)` of a list, clamped to its size
///
/// The input is returned as is when the slice covers it entirely.
pub fn slice(list: TupleList, start: i64, count: Option<i64>) -> TupleList {
    let size = list.len() as i64;
    let end = match count {
        Some(count) => size.min(start.saturating_add(count)),
        None => size,
    };
    if start >= end || start < 0 {
        return TupleList::empty(list.arity());
    }
    if start == 0 && end == size {
        return list;
    }
    list.subrange(start as usize, end as usize)
}

fn integer_arg(c: &[Calc], index: usize, ev: &mut Evaluator) -> EvalResult<Option<i64>> {
    match c.get(index) {
        Some(calc) => Ok(Some(i64::from(calc.evaluate_integer(ev)?))),
        None => Ok(None),
    }
}

fn compile_count_args(call: &ResolvedFunCall, compiler: &ExpCompiler) -> CompileResult<Vec<Calc>> {
    call.args
        .iter()
        .skip(1)
        .map(|arg| compiler.compile_integer(arg))
        .collect()
}

fn subset() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Subset", Type::Set(1))
            .param(ParamType::AnySet)
            .named("start", ParamType::Numeric)
            .optional(ParamType::Numeric)
            .describe("Tuples from a zero-based start position"),
        |call, compiler| {
            let node = list_node(call, compiler, ResultStyle::List, |c, ev| {
                let list = evaluate_unfiltered(&c[0], ev)?;
                let start = integer_arg(c, 1, ev)?.unwrap_or(0);
                let count = integer_arg(c, 2, ev)?;
                Ok(slice(list, start, count))
            })?;
            Ok(Calc::List(node.with_children(compile_count_args(call, compiler)?)))
        },
    )
    .with_result_type(set_of_first)
}

fn head() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Head", Type::Set(1))
            .param(ParamType::AnySet)
            .optional(ParamType::Numeric)
            .describe("First tuples of a set"),
        |call, compiler| {
            let node = list_node(call, compiler, ResultStyle::List, |c, ev| {
                let list = evaluate_unfiltered(&c[0], ev)?;
                let count = integer_arg(c, 1, ev)?.unwrap_or(1);
                Ok(slice(list, 0, Some(count)))
            })?;
            Ok(Calc::List(node.with_children(compile_count_args(call, compiler)?)))
        },
    )
    .with_result_type(set_of_first)
}

fn tail() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Tail", Type::Set(1))
            .param(ParamType::AnySet)
            .optional(ParamType::Numeric)
            .describe("Last tuples of a set"),
        |call, compiler| {
            let node = list_node(call, compiler, ResultStyle::List, |c, ev| {
                let list = evaluate_unfiltered(&c[0], ev)?;
                let count = integer_arg(c, 1, ev)?.unwrap_or(1);
                let size = list.len() as i64;
                Ok(slice(list, (size - count.max(0)).max(0), None))
            })?;
            Ok(Calc::List(node.with_children(compile_count_args(call, compiler)?)))
        },
    )
    .with_result_type(set_of_first)
}

// ============================================================================
// Projection and ordering
// ============================================================================

/// Positions in `tuple` of the members of each hierarchy, in request order
fn extract_positions(tuple: &Tuple, hierarchies: &[HierarchyRef]) -> EvalResult<Vec<usize>> {
    let mut positions: Vec<usize> = Vec::with_capacity(hierarchies.len());
    for hierarchy in hierarchies {
        let position = tuple
            .iter()
            .position(|m| m.hierarchy() == *hierarchy)
            .ok_or_else(|| {
                EvalError::invalid_operand(
                    "Extract",
                    format!("hierarchy {} is not used in the set", hierarchy),
                )
            })?;
        if positions.contains(&position) {
            return Err(EvalError::invalid_operand(
                "Extract",
                format!("hierarchy {} is extracted more than once", hierarchy),
            ));
        }
        positions.push(position);
    }
    Ok(positions)
}

fn extract() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Extract", Type::Set(1))
            .param(ParamType::AnySet)
            .repeating(ParamType::Exact(Type::Hierarchy), false)
            .describe("Projects a set onto some of its hierarchies, removing duplicates"),
        |call, compiler| {
            let set = required_arg(call, 0)?;
            let mut children = vec![compiler.compile_list(set, false)?];
            for arg in call.args.iter().skip(1) {
                children.push(compiler.compile_hierarchy(arg)?);
            }
            let arity = children.len() - 1;
            Ok(Calc::List(ListCalc::new(
                "Extract",
                arity,
                ResultStyle::MutableList,
                children,
                move |c, ev| {
                    let list = c[0].evaluate_list(ev)?;
                    let hierarchies = c[1..]
                        .iter()
                        .map(|h| h.evaluate_hierarchy(ev))
                        .collect::<EvalResult<Vec<_>>>()?;
                    let Some(first) = list.get(0) else {
                        return Ok(TupleList::mutable(arity));
                    };
                    let positions = extract_positions(first, &hierarchies)?;
                    Ok(list.project(&positions))
                },
            )))
        },
    )
    .with_result_type(|arg_types| Type::Set(arg_types.len().saturating_sub(1)))
}

fn hierarchize() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Hierarchize", Type::Set(1))
            .param(ParamType::AnySet)
            .flags(&["PRE", "POST"])
            .describe("Orders a set so that members follow their ancestors (or precede them with POST)"),
        |call, compiler| {
            let post = compiler.symbol_arg(call, 1, &["PRE", "POST"])? == Some("POST");
            let node = list_node(call, compiler, ResultStyle::MutableList, move |c, ev| {
                sorter::hierarchize(&c[0].evaluate_list(ev)?, post)
            })?;
            Ok(Calc::List(node))
        },
    )
    .with_result_type(set_of_first)
}

fn unorder() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Unorder", Type::Set(1))
            .param(ParamType::AnySet)
            .describe("Same tuples, with no guarantee on their order"),
        |call, compiler| {
            let node = list_node(call, compiler, ResultStyle::List, |c, ev| {
                Ok(c[0].evaluate_list(ev)?.unordered())
            })?;
            Ok(Calc::List(node))
        },
    )
    .with_result_type(set_of_first)
}

fn order() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Order", Type::Set(1))
            .param(ParamType::AnySet)
            .named("key", ParamType::Scalar)
            .flags(SortFlag::KEYWORDS)
            .describe("Sorts a set by a key expression"),
        |call, compiler| {
            let flag = compiler
                .symbol_arg(call, 2, SortFlag::KEYWORDS)?
                .and_then(SortFlag::from_keyword)
                .unwrap_or(SortFlag::Asc);
            let key = compiler.compile_scalar(required_arg(call, 1)?)?;
            let node = list_node(call, compiler, ResultStyle::MutableList, move |c, ev| {
                let list = c[0].evaluate_list(ev)?;
                let key = &c[1];
                sorter::order(&list, flag, |tuple| {
                    let mut scope = ev.scoped();
                    scope.set_context_tuple(tuple);
                    key.evaluate(&mut scope)
                })
            })?;
            Ok(Calc::List(node.with_children(vec![key])))
        },
    )
    .with_result_type(set_of_first)
}

fn distinct() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Distinct", Type::Set(1))
            .param(ParamType::AnySet)
            .describe("Removes duplicate tuples, keeping first occurrences"),
        |call, compiler| {
            let node = list_node(call, compiler, ResultStyle::MutableList, |c, ev| {
                Ok(c[0].evaluate_list(ev)?.distinct())
            })?;
            Ok(Calc::List(node))
        },
    )
    .with_result_type(set_of_first)
}

// ============================================================================
// Combination
// ============================================================================

/// Cartesian product, left-major
fn cross(left: &TupleList, right: &TupleList) -> EvalResult<TupleList> {
    let mut result = TupleList::mutable(left.arity() + right.arity());
    for l in left.iter() {
        for r in right.iter() {
            result.push(l.concat(r))?;
        }
    }
    Ok(result)
}

fn crossjoin(metadata: FunctionMetaData) -> FunctionDefinition {
    let name = metadata.name.clone();
    FunctionDefinition::new(
        metadata
            .param(ParamType::AnySet)
            .param(ParamType::AnySet)
            .describe("Cartesian product of two sets"),
        move |call, compiler| {
            let mut children = Vec::with_capacity(2);
            let mut arity = 0;
            for arg in &call.args {
                arity += compiler.arity_of(arg)?;
                children.push(compiler.compile_list(arg, false)?);
            }
            let function = name.clone();
            let node = ListCalc::new(
                name.clone(),
                arity,
                ResultStyle::MutableList,
                children,
                move |c, ev| {
                    let left = c[0].evaluate_list(ev)?;
                    let right = c[1].evaluate_list(ev)?;
                    ev.check_result_limit(&function, left.len().saturating_mul(right.len()))?;
                    let product = cross(&left, &right)?;
                    ev.filter_non_empty(product)
                },
            );
            Ok(Calc::List(node.native_eligible()))
        },
    )
    .with_result_type(set_of_sum)
}

fn union() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Union", Type::Set(1))
            .param(ParamType::AnySet)
            .param(ParamType::AnySet)
            .flags(&["ALL"])
            .describe("Tuples of both sets; duplicates are removed unless ALL is given"),
        |call, compiler| {
            let all = compiler.symbol_arg(call, 2, &["ALL"])?.is_some();
            let sets = ResolvedFunCall::new(call.name.clone(), call.syntax, call.args.iter().take(2).cloned().collect());
            let (arity, children) = compile_lists(&sets, compiler)?;
            Ok(Calc::List(ListCalc::new(
                "Union",
                arity,
                ResultStyle::MutableList,
                children,
                move |c, ev| {
                    let mut result = c[0].evaluate_list(ev)?.to_mutable();
                    result.extend_from(&c[1].evaluate_list(ev)?)?;
                    Ok(if all { result } else { result.distinct() })
                },
            )))
        },
    )
    .with_result_type(set_of_first)
}

fn filter() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Filter", Type::Set(1))
            .param(ParamType::AnySet)
            .named("condition", ParamType::Exact(Type::Boolean))
            .describe("Tuples for which a condition is true"),
        |call, compiler| {
            let condition = compiler.compile_boolean(required_arg(call, 1)?)?;
            let node = list_node(call, compiler, ResultStyle::MutableList, |c, ev| {
                let list = c[0].evaluate_list(ev)?;
                let mut result = TupleList::mutable(list.arity());
                for tuple in list.iter() {
                    let mut scope = ev.scoped();
                    scope.set_context_tuple(tuple);
                    if c[1].evaluate_boolean(&mut scope)? == Some(true) {
                        result.push(tuple.clone())?;
                    }
                }
                Ok(result)
            })?;
            Ok(Calc::List(node.with_children(vec![condition]).native_eligible()))
        },
    )
    .with_result_type(set_of_first)
}

fn nativize_set() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("NativizeSet", Type::Set(1))
            .param(ParamType::AnySet)
            .describe("Evaluates a set with native evaluation enabled"),
        |call, compiler| {
            let node = list_node(call, compiler, ResultStyle::List, |c, ev| {
                let mut scope = ev.scoped();
                scope.set_native_enabled(true);
                c[0].evaluate_list(&mut scope)
            })?;
            Ok(Calc::List(node))
        },
    )
    .with_result_type(set_of_first)
}
