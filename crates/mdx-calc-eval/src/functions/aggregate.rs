//! Aggregate functions
//!
//! Implements: Count, Sum, Avg, Min, Max
//!
//! The set argument is evaluated with `non_empty` cleared. Each tuple's value
//! is evaluated with the tuple as context; empty values are skipped and an
//! aggregate over only empty values is empty.

use crate::calc::{Calc, TypedCalc};
use crate::coercion::value_to_double;
use crate::compiler::required_arg;
use crate::error::EvalResult;
use crate::evaluator::Evaluator;
use crate::registry::{FunctionDefinition, FunctionMetaData, FunctionTableBuilder};
use mdx_calc_types::{ParamType, TupleList, Type, nullable};
use std::cmp::Ordering;

const COUNT_FLAGS: &[&str] = &["EXCLUDEEMPTY", "INCLUDEEMPTY"];

pub(crate) fn register(builder: &mut FunctionTableBuilder) {
    builder
        .define(count(
            FunctionMetaData::function("Count", Type::Integer)
                .param(ParamType::AnySet)
                .flags(COUNT_FLAGS),
        ))
        .define(count(
            FunctionMetaData::property("Count", Type::Integer).param(ParamType::AnySet),
        ))
        .define(numeric("Sum", "Sum of the values over a set", sum))
        .define(numeric("Avg", "Average of the non-empty values over a set", avg))
        .define(numeric("Min", "Smallest value over a set", |values| {
            extreme(values, Ordering::Less)
        }))
        .define(numeric("Max", "Largest value over a set", |values| {
            extreme(values, Ordering::Greater)
        }));
}

fn evaluate_set(calc: &Calc, evaluator: &mut Evaluator) -> EvalResult<TupleList> {
    let mut scope = evaluator.scoped();
    scope.set_non_empty(false);
    calc.evaluate_list(&mut scope)
}

fn count(metadata: FunctionMetaData) -> FunctionDefinition {
    let metadata = metadata.describe("Number of tuples in a set");
    FunctionDefinition::new(metadata, |call, compiler| {
        let exclude_empty = compiler.symbol_arg(call, 1, COUNT_FLAGS)? == Some("EXCLUDEEMPTY");
        let set = compiler.compile_list(required_arg(call, 0)?, false)?;
        Ok(Calc::Integer(TypedCalc::new(
            "Count",
            Type::Integer,
            vec![set],
            move |c, ev| {
                let list = evaluate_set(&c[0], ev)?;
                let count = if exclude_empty {
                    let mut count = 0usize;
                    for tuple in list.iter() {
                        if !ev.is_empty_tuple(tuple) {
                            count += 1;
                        }
                    }
                    count
                } else {
                    list.len()
                };
                Ok(i32::try_from(count).unwrap_or(i32::MAX))
            },
        )))
    })
}

fn numeric(name: &'static str, description: &str, aggregate: fn(&[f64]) -> f64) -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function(name, Type::Double)
            .param(ParamType::AnySet)
            .optional(ParamType::Numeric)
            .describe(description),
        move |call, compiler| {
            let mut children = vec![compiler.compile_list(required_arg(call, 0)?, false)?];
            if let Some(value) = call.arg(1) {
                children.push(compiler.compile_double(value)?);
            }
            Ok(Calc::Double(TypedCalc::new(
                name,
                Type::Double,
                children,
                move |c, ev| {
                    let values = tuple_values(name, c, ev)?;
                    if values.is_empty() {
                        return Ok(nullable::DOUBLE_NULL);
                    }
                    Ok(aggregate(&values))
                },
            )))
        },
    )
}

/// Non-empty values of each tuple of `c[0]`, evaluated by `c[1]` or as the cell value
fn tuple_values(name: &str, c: &[Calc], ev: &mut Evaluator) -> EvalResult<Vec<f64>> {
    let list = evaluate_set(&c[0], ev)?;
    let mut values = Vec::with_capacity(list.len());
    for tuple in list.iter() {
        let mut scope = ev.scoped();
        scope.set_context_tuple(tuple);
        let value = match c.get(1) {
            Some(calc) => calc.evaluate_double(&mut scope)?,
            None => value_to_double(&scope.cell_value(), name)?,
        };
        if !nullable::is_null(value) {
            values.push(value);
        }
    }
    Ok(values)
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn avg(values: &[f64]) -> f64 {
    sum(values) / values.len() as f64
}

fn extreme(values: &[f64], wanted: Ordering) -> f64 {
    values
        .iter()
        .copied()
        .reduce(|best, v| if nullable::compare(v, best) == wanted { v } else { best })
        .unwrap_or(nullable::DOUBLE_NULL)
}
