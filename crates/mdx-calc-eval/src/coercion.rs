//! Coercion nodes
//!
//! The compiler wraps a child node in one of these when the child's natural
//! type differs from the type a function asks for. Conversions follow
//! [`TypeCoercer::can_convert`]; anything else is a compile error.
//!
//! The `value_to_*` helpers perform the runtime category check behind
//! conversions from `Unknown`.

use crate::calc::{Calc, ListCalc, ResultStyle, TypedCalc};
use crate::error::{CompileError, CompileResult, EvalError, EvalResult};
use chrono::NaiveDateTime;
use mdx_calc_types::nullable::{self, DOUBLE_NULL, INTEGER_NULL};
use mdx_calc_types::{LevelRef, MemberRef, Tuple, TupleList, Type, TypeCoercer, Value};

fn incompatible(calc: &Calc, to: Type) -> CompileError {
    CompileError::incompatible_type(calc.get_type(), to, calc.name())
}

fn check(calc: &Calc, to: Type) -> CompileResult<()> {
    if TypeCoercer::new().can_convert(calc.get_type(), to) {
        Ok(())
    } else {
        Err(incompatible(calc, to))
    }
}

fn found(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => other.get_type().to_string(),
    }
}

// ============================================================================
// Runtime category checks
// ============================================================================

pub fn value_to_double(value: &Value, function: &str) -> EvalResult<f64> {
    match value {
        Value::Null => Ok(DOUBLE_NULL),
        Value::Double(d) => Ok(*d),
        Value::Integer(i) => Ok(f64::from(*i)),
        other => Err(EvalError::type_mismatch(function, "Double", found(other))),
    }
}

pub fn value_to_integer(value: &Value, function: &str) -> EvalResult<i32> {
    match value {
        Value::Null => Ok(INTEGER_NULL),
        Value::Integer(i) => Ok(*i),
        Value::Double(d) => Ok(nullable::double_to_integer(*d)),
        other => Err(EvalError::type_mismatch(function, "Integer", found(other))),
    }
}

pub fn value_to_boolean(value: &Value, function: &str) -> EvalResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Boolean(b) => Ok(Some(*b)),
        Value::Double(d) => Ok(nullable::double_to_boolean(*d)),
        Value::Integer(i) => Ok(Some(*i != 0)),
        other => Err(EvalError::type_mismatch(function, "Boolean", found(other))),
    }
}

pub fn value_to_string(value: &Value, function: &str) -> EvalResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(EvalError::type_mismatch(function, "String", found(other))),
    }
}

pub fn value_to_date_time(value: &Value, function: &str) -> EvalResult<Option<NaiveDateTime>> {
    match value {
        Value::Null => Ok(None),
        Value::DateTime(dt) => Ok(Some(*dt)),
        other => Err(EvalError::type_mismatch(function, "DateTime", found(other))),
    }
}

pub fn value_to_member(value: &Value, function: &str) -> EvalResult<Option<MemberRef>> {
    match value {
        Value::Null => Ok(None),
        Value::Member(m) => Ok(Some(m.clone())),
        other => Err(EvalError::type_mismatch(function, "Member", found(other))),
    }
}

pub fn value_to_level(value: &Value, function: &str) -> EvalResult<LevelRef> {
    match value {
        Value::Level(l) => Ok(l.clone()),
        other => Err(EvalError::type_mismatch(function, "Level", found(other))),
    }
}

pub fn value_to_tuple(value: &Value, function: &str) -> EvalResult<Option<Tuple>> {
    match value {
        Value::Null => Ok(None),
        Value::Tuple(t) => Ok(Some(t.clone())),
        Value::Member(m) => Ok(Some(Tuple::from_member(m.clone()))),
        other => Err(EvalError::type_mismatch(function, "Tuple", found(other))),
    }
}

pub fn value_to_list(value: &Value, function: &str) -> EvalResult<TupleList> {
    match value {
        Value::List(l) => Ok(l.clone()),
        other => Err(EvalError::type_mismatch(function, "Set", found(other))),
    }
}

// ============================================================================
// Scalar coercions
// ============================================================================

/// Coerce to a double node
pub fn to_double(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::Double)?;
    let node = match calc {
        Calc::Double(_) => return Ok(calc),
        Calc::Integer(_) => TypedCalc::new("IntegerToDouble", Type::Double, vec![calc], |c, ev| {
            Ok(nullable::integer_to_double(c[0].evaluate_integer(ev)?))
        }),
        Calc::Member(_) | Calc::Tuple(_) => {
            TypedCalc::new("MemberValue", Type::Double, vec![calc], |c, ev| {
                let Some(tuple) = c[0].evaluate_tuple(ev)? else {
                    return Ok(DOUBLE_NULL);
                };
                let mut scope = ev.scoped();
                scope.set_context_tuple(&tuple);
                value_to_double(&scope.cell_value(), "MemberValue")
            })
        }
        Calc::Value(_) => TypedCalc::new("UnknownToDouble", Type::Double, vec![calc], |c, ev| {
            value_to_double(&c[0].evaluate(ev)?, "UnknownToDouble")
        }),
        other => return Err(incompatible(&other, Type::Double)),
    };
    Ok(Calc::Double(node))
}

/// Coerce to an integer node; doubles are truncated
pub fn to_integer(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::Integer)?;
    let calc = match calc {
        Calc::Integer(_) => return Ok(calc),
        Calc::Member(_) | Calc::Tuple(_) => to_double(calc)?,
        other => other,
    };
    let node = match calc {
        Calc::Double(_) => TypedCalc::new("DoubleToInteger", Type::Integer, vec![calc], |c, ev| {
            Ok(nullable::double_to_integer(c[0].evaluate_double(ev)?))
        }),
        Calc::Value(_) => TypedCalc::new("UnknownToInteger", Type::Integer, vec![calc], |c, ev| {
            value_to_integer(&c[0].evaluate(ev)?, "UnknownToInteger")
        }),
        other => return Err(incompatible(&other, Type::Integer)),
    };
    Ok(Calc::Integer(node))
}

/// Coerce to a boolean node; null and NaN become the null boolean
pub fn to_boolean(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::Boolean)?;
    let node = match calc {
        Calc::Boolean(_) => return Ok(calc),
        Calc::Double(_) => TypedCalc::new("DoubleToBoolean", Type::Boolean, vec![calc], |c, ev| {
            Ok(nullable::double_to_boolean(c[0].evaluate_double(ev)?))
        }),
        Calc::Integer(_) => {
            TypedCalc::new("IntegerToBoolean", Type::Boolean, vec![calc], |c, ev| {
                let value = c[0].evaluate_integer(ev)?;
                Ok(nullable::to_option_integer(value).map(|i| i != 0))
            })
        }
        Calc::Value(_) => TypedCalc::new("UnknownToBoolean", Type::Boolean, vec![calc], |c, ev| {
            value_to_boolean(&c[0].evaluate(ev)?, "UnknownToBoolean")
        }),
        other => return Err(incompatible(&other, Type::Boolean)),
    };
    Ok(Calc::Boolean(node))
}

pub fn to_string(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::String)?;
    match calc {
        Calc::String(_) => Ok(calc),
        Calc::Value(_) => Ok(Calc::String(TypedCalc::new(
            "UnknownToString",
            Type::String,
            vec![calc],
            |c, ev| value_to_string(&c[0].evaluate(ev)?, "UnknownToString"),
        ))),
        other => Err(incompatible(&other, Type::String)),
    }
}

pub fn to_date_time(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::DateTime)?;
    match calc {
        Calc::DateTime(_) => Ok(calc),
        Calc::Value(_) => Ok(Calc::DateTime(TypedCalc::new(
            "UnknownToDateTime",
            Type::DateTime,
            vec![calc],
            |c, ev| value_to_date_time(&c[0].evaluate(ev)?, "UnknownToDateTime"),
        ))),
        other => Err(incompatible(&other, Type::DateTime)),
    }
}

/// Coerce to a node producing a scalar value
///
/// Members and tuples become the value of the cell they address.
pub fn to_scalar(calc: Calc) -> CompileResult<Calc> {
    match calc {
        Calc::Member(_) | Calc::Tuple(_) => Ok(Calc::Value(TypedCalc::new(
            "MemberValue",
            Type::Unknown,
            vec![calc],
            |c, ev| {
                let Some(tuple) = c[0].evaluate_tuple(ev)? else {
                    return Ok(Value::Null);
                };
                let mut scope = ev.scoped();
                scope.set_context_tuple(&tuple);
                Ok(scope.cell_value())
            },
        ))),
        Calc::Double(_)
        | Calc::Integer(_)
        | Calc::Boolean(_)
        | Calc::String(_)
        | Calc::DateTime(_)
        | Calc::Value(_) => Ok(calc),
        other => Err(incompatible(&other, Type::Unknown)),
    }
}

// ============================================================================
// Metadata coercions
// ============================================================================

pub fn to_member(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::Member)?;
    match calc {
        Calc::Member(_) => Ok(calc),
        Calc::Value(_) => Ok(Calc::Member(TypedCalc::new(
            "UnknownToMember",
            Type::Member,
            vec![calc],
            |c, ev| value_to_member(&c[0].evaluate(ev)?, "UnknownToMember"),
        ))),
        other => Err(incompatible(&other, Type::Member)),
    }
}

pub fn to_level(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::Level)?;
    match calc {
        Calc::Level(_) => Ok(calc),
        Calc::Value(_) => Ok(Calc::Level(TypedCalc::new(
            "UnknownToLevel",
            Type::Level,
            vec![calc],
            |c, ev| value_to_level(&c[0].evaluate(ev)?, "UnknownToLevel"),
        ))),
        other => Err(incompatible(&other, Type::Level)),
    }
}

fn null_member(function: &str) -> EvalError {
    EvalError::invalid_operand(function, "null member")
}

pub fn to_hierarchy(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::Hierarchy)?;
    let node = match calc {
        Calc::Hierarchy(_) => return Ok(calc),
        Calc::Member(_) => TypedCalc::new("MemberHierarchy", Type::Hierarchy, vec![calc], |c, ev| {
            c[0].evaluate_member(ev)?
                .map(|m| m.hierarchy())
                .ok_or_else(|| null_member("MemberHierarchy"))
        }),
        Calc::Level(_) => TypedCalc::new("LevelHierarchy", Type::Hierarchy, vec![calc], |c, ev| {
            Ok(c[0].evaluate_level(ev)?.hierarchy())
        }),
        other => return Err(incompatible(&other, Type::Hierarchy)),
    };
    Ok(Calc::Hierarchy(node))
}

pub fn to_dimension(calc: Calc) -> CompileResult<Calc> {
    check(&calc, Type::Dimension)?;
    let node = match calc {
        Calc::Dimension(_) => return Ok(calc),
        Calc::Member(_) => TypedCalc::new("MemberDimension", Type::Dimension, vec![calc], |c, ev| {
            c[0].evaluate_member(ev)?
                .map(|m| m.dimension())
                .ok_or_else(|| null_member("MemberDimension"))
        }),
        Calc::Level(_) => TypedCalc::new("LevelDimension", Type::Dimension, vec![calc], |c, ev| {
            Ok(c[0].evaluate_level(ev)?.dimension())
        }),
        Calc::Hierarchy(_) => {
            TypedCalc::new("HierarchyDimension", Type::Dimension, vec![calc], |c, ev| {
                Ok(c[0].evaluate_hierarchy(ev)?.dimension())
            })
        }
        other => return Err(incompatible(&other, Type::Dimension)),
    };
    Ok(Calc::Dimension(node))
}

// ============================================================================
// Tuple and set coercions
// ============================================================================

pub fn to_tuple(calc: Calc) -> CompileResult<Calc> {
    let target = match calc.get_type() {
        Type::Tuple(n) => Type::Tuple(n),
        _ => Type::Tuple(1),
    };
    check(&calc, target)?;
    match calc {
        Calc::Tuple(_) => Ok(calc),
        Calc::Member(_) => Ok(Calc::Tuple(TypedCalc::new(
            "MemberToTuple",
            Type::Tuple(1),
            vec![calc],
            |c, ev| Ok(c[0].evaluate_member(ev)?.map(Tuple::from_member)),
        ))),
        Calc::Value(_) => Ok(Calc::Tuple(TypedCalc::new(
            "UnknownToTuple",
            Type::Tuple(1),
            vec![calc],
            |c, ev| value_to_tuple(&c[0].evaluate(ev)?, "UnknownToTuple"),
        ))),
        other => Err(incompatible(&other, target)),
    }
}

/// Coerce to a list node
///
/// When `mutable` is set and the child may hand out a shared or immutable
/// list, a copy node is inserted; the decision is made here, once.
pub fn to_list(calc: Calc, mutable: bool) -> CompileResult<Calc> {
    let arity = match calc.get_type().arity() {
        Some(arity) => arity,
        None => return Err(incompatible(&calc, Type::Set(1))),
    };

    let list = match calc {
        Calc::List(list) if !mutable || list.style() == ResultStyle::MutableList => {
            return Ok(Calc::List(list));
        }
        Calc::List(_) => ListCalc::new("CopyList", arity, ResultStyle::MutableList, vec![calc], |c, ev| {
            Ok(c[0].evaluate_list(ev)?.to_mutable())
        }),
        Calc::Iterable(_) => {
            ListCalc::new("Materialize", arity, ResultStyle::MutableList, vec![calc], |c, ev| {
                Ok(c[0].evaluate_iterable(ev)?.materialize()?)
            })
        }
        Calc::Member(_) | Calc::Tuple(_) => {
            ListCalc::new("TupleToSet", arity, ResultStyle::MutableList, vec![calc], move |c, ev| {
                let mut list = TupleList::mutable(arity);
                if let Some(tuple) = c[0].evaluate_tuple(ev)? {
                    list.push(tuple)?;
                }
                Ok(list)
            })
        }
        other => return Err(incompatible(&other, Type::Set(arity))),
    };
    Ok(Calc::List(list))
}

/// Coerce to a lazy sequence node
pub fn to_iterable(calc: Calc) -> CompileResult<Calc> {
    let calc = match calc {
        Calc::Iterable(_) => return Ok(calc),
        Calc::Member(_) | Calc::Tuple(_) => to_list(calc, false)?,
        other => other,
    };
    let result_type = calc.get_type();
    match calc {
        Calc::List(_) => {
            Ok(Calc::Iterable(TypedCalc::new(
                "ListIterable",
                result_type,
                vec![calc],
                |c, ev| Ok(c[0].evaluate_list(ev)?.iterable()),
            )))
        }
        other => Err(incompatible(&other, Type::Set(1))),
    }
}

/// Coerce to the given type
pub fn convert(calc: Calc, target: Type) -> CompileResult<Calc> {
    match target {
        Type::Double => to_double(calc),
        Type::Integer => to_integer(calc),
        Type::Boolean => to_boolean(calc),
        Type::String => to_string(calc),
        Type::DateTime => to_date_time(calc),
        Type::Member => to_member(calc),
        Type::Level => to_level(calc),
        Type::Hierarchy => to_hierarchy(calc),
        Type::Dimension => to_dimension(calc),
        Type::Tuple(_) => to_tuple(calc),
        Type::Set(_) => to_list(calc, false),
        Type::Unknown => to_scalar(calc),
        Type::Symbol => {
            check(&calc, Type::Symbol)?;
            Ok(calc)
        }
    }
}
