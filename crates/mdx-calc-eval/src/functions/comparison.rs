//! Comparison operators
//!
//! Implements: `=`, `<>`, `<`, `>`, `<=`, `>=` on numbers and strings, `IS` on members
//!
//! Numbers compare under the total order of `nullable::compare`; a null operand
//! makes the result null. Strings compare lexicographically.

use crate::calc::{Calc, TypedCalc};
use crate::compiler::required_arg;
use crate::registry::{FunctionDefinition, FunctionMetaData, FunctionTableBuilder};
use mdx_calc_types::{ParamType, Type, nullable};
use std::cmp::Ordering;

type Predicate = fn(Ordering) -> bool;

const OPERATORS: &[(&str, Predicate)] = &[
    ("=", |o| o == Ordering::Equal),
    ("<>", |o| o != Ordering::Equal),
    ("<", |o| o == Ordering::Less),
    (">", |o| o == Ordering::Greater),
    ("<=", |o| o != Ordering::Greater),
    (">=", |o| o != Ordering::Less),
];

pub(crate) fn register(builder: &mut FunctionTableBuilder) {
    for &(name, predicate) in OPERATORS {
        builder.define(numeric(name, predicate));
    }
    for &(name, predicate) in OPERATORS {
        builder.define(string(name, predicate));
    }
    builder.define(is());
}

fn numeric(name: &'static str, predicate: Predicate) -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::infix(name, Type::Boolean)
            .param(ParamType::Numeric)
            .param(ParamType::Numeric)
            .describe("Compares two numbers"),
        move |call, compiler| {
            let left = compiler.compile_double(required_arg(call, 0)?)?;
            let right = compiler.compile_double(required_arg(call, 1)?)?;
            Ok(Calc::Boolean(TypedCalc::new(
                name,
                Type::Boolean,
                vec![left, right],
                move |c, ev| {
                    let left = c[0].evaluate_double(ev)?;
                    let right = c[1].evaluate_double(ev)?;
                    if nullable::is_null_or_nan(left) || nullable::is_null_or_nan(right) {
                        return Ok(None);
                    }
                    Ok(Some(predicate(nullable::compare(left, right))))
                },
            )))
        },
    )
}

fn string(name: &'static str, predicate: Predicate) -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::infix(name, Type::Boolean)
            .param(ParamType::Exact(Type::String))
            .param(ParamType::Exact(Type::String))
            .describe("Compares two strings"),
        move |call, compiler| {
            let left = compiler.compile_string(required_arg(call, 0)?)?;
            let right = compiler.compile_string(required_arg(call, 1)?)?;
            Ok(Calc::Boolean(TypedCalc::new(
                name,
                Type::Boolean,
                vec![left, right],
                move |c, ev| {
                    let left = c[0].evaluate_string(ev)?;
                    let right = c[1].evaluate_string(ev)?;
                    Ok(match (left, right) {
                        (Some(l), Some(r)) => Some(predicate(l.cmp(&r))),
                        _ => None,
                    })
                },
            )))
        },
    )
}

/// Member identity; two null members are the same member
fn is() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::infix("IS", Type::Boolean)
            .param(ParamType::Exact(Type::Member))
            .param(ParamType::Exact(Type::Member))
            .describe("Checks whether two members are the same member"),
        |call, compiler| {
            let left = compiler.compile_member(required_arg(call, 0)?)?;
            let right = compiler.compile_member(required_arg(call, 1)?)?;
            Ok(Calc::Boolean(TypedCalc::new(
                "IS",
                Type::Boolean,
                vec![left, right],
                |c, ev| {
                    let left = c[0].evaluate_member(ev)?;
                    let right = c[1].evaluate_member(ev)?;
                    Ok(Some(left == right))
                },
            )))
        },
    )
}
