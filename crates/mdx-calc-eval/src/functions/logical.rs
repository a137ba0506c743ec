//! Logical operators and conditionals
//!
//! Implements: AND, OR, XOR, NOT, IIf, IsEmpty, CoalesceEmpty
//!
//! Booleans are three-valued (`None` is null):
//!
//! | A     | B     | A AND B | A OR B |
//! |-------|-------|---------|--------|
//! | true  | null  | null    | true   |
//! | false | null  | false   | null   |
//! | null  | null  | null    | null   |
//!
//! `AND` and `OR` do not evaluate their right operand once the left one
//! decides the result.

use crate::calc::{Calc, TypedCalc};
use crate::compiler::{ExpCompiler, required_arg};
use crate::error::CompileResult;
use crate::registry::{FunctionDefinition, FunctionMetaData, FunctionTableBuilder};
use mdx_calc_ast::{Exp, ResolvedFunCall};
use mdx_calc_types::{ParamType, Type, nullable};

pub(crate) fn register(builder: &mut FunctionTableBuilder) {
    builder
        .define(and())
        .define(or())
        .define(xor())
        .define(not())
        .define(iif_member())
        .define(iif_numeric())
        .define(iif_string())
        .define(is_empty())
        .define(coalesce_numeric())
        .define(coalesce_string());
}

fn boolean_operands(call: &ResolvedFunCall, compiler: &ExpCompiler) -> CompileResult<Vec<Calc>> {
    Ok(vec![
        compiler.compile_boolean(required_arg(call, 0)?)?,
        compiler.compile_boolean(required_arg(call, 1)?)?,
    ])
}

fn boolean_infix(name: &str) -> FunctionMetaData {
    FunctionMetaData::infix(name, Type::Boolean)
        .param(ParamType::Exact(Type::Boolean))
        .param(ParamType::Exact(Type::Boolean))
}

fn and() -> FunctionDefinition {
    FunctionDefinition::new(
        boolean_infix("AND").describe("Logical conjunction"),
        |call, compiler| {
            Ok(Calc::Boolean(TypedCalc::new(
                "AND",
                Type::Boolean,
                boolean_operands(call, compiler)?,
                |c, ev| {
                    let left = c[0].evaluate_boolean(ev)?;
                    if left == Some(false) {
                        return Ok(Some(false));
                    }
                    let right = c[1].evaluate_boolean(ev)?;
                    Ok(match (left, right) {
                        (_, Some(false)) => Some(false),
                        (Some(true), Some(true)) => Some(true),
                        _ => None,
                    })
                },
            )))
        },
    )
}

fn or() -> FunctionDefinition {
    FunctionDefinition::new(
        boolean_infix("OR").describe("Logical disjunction"),
        |call, compiler| {
            Ok(Calc::Boolean(TypedCalc::new(
                "OR",
                Type::Boolean,
                boolean_operands(call, compiler)?,
                |c, ev| {
                    let left = c[0].evaluate_boolean(ev)?;
                    if left == Some(true) {
                        return Ok(Some(true));
                    }
                    let right = c[1].evaluate_boolean(ev)?;
                    Ok(match (left, right) {
                        (_, Some(true)) => Some(true),
                        (Some(false), Some(false)) => Some(false),
                        _ => None,
                    })
                },
            )))
        },
    )
}

fn xor() -> FunctionDefinition {
    FunctionDefinition::new(
        boolean_infix("XOR").describe("Logical exclusive or"),
        |call, compiler| {
            Ok(Calc::Boolean(TypedCalc::new(
                "XOR",
                Type::Boolean,
                boolean_operands(call, compiler)?,
                |c, ev| {
                    let left = c[0].evaluate_boolean(ev)?;
                    let right = c[1].evaluate_boolean(ev)?;
                    Ok(match (left, right) {
                        (Some(l), Some(r)) => Some(l != r),
                        _ => None,
                    })
                },
            )))
        },
    )
}

fn not() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::prefix("NOT", Type::Boolean)
            .param(ParamType::Exact(Type::Boolean))
            .describe("Logical negation"),
        |call, compiler| {
            let operand = compiler.compile_boolean(required_arg(call, 0)?)?;
            Ok(Calc::Boolean(TypedCalc::new(
                "NOT",
                Type::Boolean,
                vec![operand],
                |c, ev| Ok(c[0].evaluate_boolean(ev)?.map(|b| !b)),
            )))
        },
    )
}

// ============================================================================
// Conditionals
// ============================================================================

fn iif(branch: ParamType, return_type: Type) -> FunctionMetaData {
    FunctionMetaData::function("IIf", return_type)
        .named("condition", ParamType::Exact(Type::Boolean))
        .named("then", branch)
        .named("else", branch)
        .describe("Returns one of two values depending on a condition; null selects the second")
}

fn iif_operands(
    call: &ResolvedFunCall,
    compiler: &ExpCompiler,
    compile_branch: fn(&ExpCompiler, &Exp) -> CompileResult<Calc>,
) -> CompileResult<Vec<Calc>> {
    Ok(vec![
        compiler.compile_boolean(required_arg(call, 0)?)?,
        compile_branch(compiler, required_arg(call, 1)?)?,
        compile_branch(compiler, required_arg(call, 2)?)?,
    ])
}

fn iif_member() -> FunctionDefinition {
    FunctionDefinition::new(
        iif(ParamType::Exact(Type::Member), Type::Member),
        |call, compiler| {
            let children = iif_operands(call, compiler, ExpCompiler::compile_member)?;
            Ok(Calc::Member(TypedCalc::new("IIf", Type::Member, children, |c, ev| {
                if c[0].evaluate_boolean(ev)? == Some(true) {
                    c[1].evaluate_member(ev)
                } else {
                    c[2].evaluate_member(ev)
                }
            })))
        },
    )
}

fn iif_numeric() -> FunctionDefinition {
    FunctionDefinition::new(iif(ParamType::Numeric, Type::Double), |call, compiler| {
        let children = iif_operands(call, compiler, ExpCompiler::compile_double)?;
        Ok(Calc::Double(TypedCalc::new("IIf", Type::Double, children, |c, ev| {
            if c[0].evaluate_boolean(ev)? == Some(true) {
                c[1].evaluate_double(ev)
            } else {
                c[2].evaluate_double(ev)
            }
        })))
    })
}

fn iif_string() -> FunctionDefinition {
    FunctionDefinition::new(
        iif(ParamType::Exact(Type::String), Type::String),
        |call, compiler| {
            let children = iif_operands(call, compiler, ExpCompiler::compile_string)?;
            Ok(Calc::String(TypedCalc::new("IIf", Type::String, children, |c, ev| {
                if c[0].evaluate_boolean(ev)? == Some(true) {
                    c[1].evaluate_string(ev)
                } else {
                    c[2].evaluate_string(ev)
                }
            })))
        },
    )
}

fn is_empty() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("IsEmpty", Type::Boolean)
            .param(ParamType::Scalar)
            .describe("Checks whether a value is empty"),
        |call, compiler| {
            let value = compiler.compile_scalar(required_arg(call, 0)?)?;
            Ok(Calc::Boolean(TypedCalc::new(
                "IsEmpty",
                Type::Boolean,
                vec![value],
                |c, ev| Ok(Some(c[0].evaluate(ev)?.is_null())),
            )))
        },
    )
}

fn compile_all(
    call: &ResolvedFunCall,
    compile: impl Fn(&Exp) -> CompileResult<Calc>,
) -> CompileResult<Vec<Calc>> {
    call.args.iter().map(compile).collect()
}

fn coalesce_numeric() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("CoalesceEmpty", Type::Double)
            .param(ParamType::Numeric)
            .repeating(ParamType::Numeric, false)
            .describe("Returns the first non-empty number"),
        |call, compiler| {
            let children = compile_all(call, |e| compiler.compile_double(e))?;
            Ok(Calc::Double(TypedCalc::new(
                "CoalesceEmpty",
                Type::Double,
                children,
                |c, ev| {
                    for child in c {
                        let value = child.evaluate_double(ev)?;
                        if !nullable::is_null(value) {
                            return Ok(value);
                        }
                    }
                    Ok(nullable::DOUBLE_NULL)
                },
            )))
        },
    )
}

fn coalesce_string() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("CoalesceEmpty", Type::String)
            .param(ParamType::Exact(Type::String))
            .repeating(ParamType::Exact(Type::String), false)
            .describe("Returns the first non-empty string"),
        |call, compiler| {
            let children = compile_all(call, |e| compiler.compile_string(e))?;
            Ok(Calc::String(TypedCalc::new(
                "CoalesceEmpty",
                Type::String,
                children,
                |c, ev| {
                    for child in c {
                        if let Some(value) = child.evaluate_string(ev)? {
                            return Ok(Some(value));
                        }
                    }
                    Ok(None)
                },
            )))
        },
    )
}
