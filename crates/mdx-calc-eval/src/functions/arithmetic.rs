//! Arithmetic operators
//!
//! Implements: `+`, `-`, `*`, `/`, unary `-`, `||`
//!
//! Numeric operators work on raw doubles. A null or NaN operand makes the
//! result null; division by zero follows IEEE.

use crate::calc::{Calc, TypedCalc};
use crate::compiler::required_arg;
use crate::registry::{FunctionDefinition, FunctionMetaData, FunctionTableBuilder};
use mdx_calc_types::{ParamType, Type, nullable};

pub(crate) fn register(builder: &mut FunctionTableBuilder) {
    builder
        .define(binary("+", "Adds two numbers", |a, b| a + b))
        .define(binary("-", "Subtracts the second number from the first", |a, b| a - b))
        .define(binary("*", "Multiplies two numbers", |a, b| a * b))
        .define(binary("/", "Divides the first number by the second", |a, b| a / b))
        .define(negate())
        .define(concat());
}

fn binary(name: &'static str, description: &str, op: fn(f64, f64) -> f64) -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::infix(name, Type::Double)
            .param(ParamType::Numeric)
            .param(ParamType::Numeric)
            .describe(description),
        move |call, compiler| {
            let left = compiler.compile_double(required_arg(call, 0)?)?;
            let right = compiler.compile_double(required_arg(call, 1)?)?;
            Ok(Calc::Double(TypedCalc::new(
                name,
                Type::Double,
                vec![left, right],
                move |c, ev| {
                    let left = c[0].evaluate_double(ev)?;
                    let right = c[1].evaluate_double(ev)?;
                    Ok(nullable::arithmetic(left, right, op))
                },
            )))
        },
    )
}

fn negate() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::prefix("-", Type::Double)
            .param(ParamType::Numeric)
            .describe("Negates a number"),
        |call, compiler| {
            let operand = compiler.compile_double(required_arg(call, 0)?)?;
            Ok(Calc::Double(TypedCalc::new(
                "-",
                Type::Double,
                vec![operand],
                |c, ev| {
                    let value = c[0].evaluate_double(ev)?;
                    Ok(if nullable::is_null(value) { value } else { -value })
                },
            )))
        },
    )
}

/// String concatenation; a null operand concatenates as the empty string
fn concat() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::infix("||", Type::String)
            .param(ParamType::Exact(Type::String))
            .param(ParamType::Exact(Type::String))
            .describe("Concatenates two strings"),
        |call, compiler| {
            let left = compiler.compile_string(required_arg(call, 0)?)?;
            let right = compiler.compile_string(required_arg(call, 1)?)?;
            Ok(Calc::String(TypedCalc::new(
                "||",
                Type::String,
                vec![left, right],
                |c, ev| {
                    let left = c[0].evaluate_string(ev)?;
                    let right = c[1].evaluate_string(ev)?;
                    Ok(match (left, right) {
                        (None, None) => None,
                        (left, right) => {
                            Some(left.unwrap_or_default() + right.as_deref().unwrap_or(""))
                        }
                    })
                },
            )))
        },
    )
}
