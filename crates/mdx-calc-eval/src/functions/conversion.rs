//! Conversion functions
//!
//! Implements: StrToMember, CDate, Now

use crate::calc::{Calc, TypedCalc};
use crate::compiler::required_arg;
use crate::error::{EvalError, EvalResult};
use crate::evaluator::Evaluator;
use crate::registry::{FunctionDefinition, FunctionMetaData, FunctionTableBuilder};
use chrono::{Local, NaiveDate, NaiveDateTime};
use mdx_calc_types::{MemberRef, NameError, ParamType, Type, split_unique_name};

/// Date-time layouts accepted by `CDate`, tried in order
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts accepted by `CDate`; the time is midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

pub(crate) fn register(builder: &mut FunctionTableBuilder) {
    builder
        .define(str_to_member())
        .define(cdate())
        .define(now());
}

fn str_to_member() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("StrToMember", Type::Member)
            .named("name", ParamType::Exact(Type::String))
            .describe("Looks up a member by its unique name"),
        |call, compiler| {
            let name = compiler.compile_string(required_arg(call, 0)?)?;
            Ok(Calc::Member(TypedCalc::new(
                "StrToMember",
                Type::Member,
                vec![name],
                |c, ev| {
                    let name = c[0].evaluate_string(ev)?;
                    lookup_member(name.as_deref(), ev).map(Some)
                },
            )))
        },
    )
}

/// Resolve a compound member name against the evaluator's cube
pub fn lookup_member(name: Option<&str>, evaluator: &Evaluator) -> EvalResult<MemberRef> {
    let name = name.unwrap_or_default();
    let segments = split_unique_name(name).map_err(|e| match e {
        NameError::Empty => EvalError::empty_expression("StrToMember"),
        NameError::Malformed { .. } => EvalError::malformed_name("StrToMember", e.to_string()),
    })?;
    evaluator
        .cube()
        .lookup_member(&segments, evaluator.case_sensitive())
        .ok_or_else(|| EvalError::member_not_found(name))
}

fn cdate() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("CDate", Type::DateTime)
            .param(ParamType::Exact(Type::String))
            .describe("Parses a date or date-time string"),
        |call, compiler| {
            let text = compiler.compile_string(required_arg(call, 0)?)?;
            Ok(Calc::DateTime(TypedCalc::new(
                "CDate",
                Type::DateTime,
                vec![text],
                |c, ev| match c[0].evaluate_string(ev)? {
                    Some(text) => parse_date_time(&text).map(Some),
                    None => Ok(None),
                },
            )))
        },
    )
}

/// Parse the layouts accepted by `CDate`
pub fn parse_date_time(text: &str) -> EvalResult<NaiveDateTime> {
    let text = text.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            EvalError::invalid_operand("CDate", format!("'{}' is not a valid date", text))
        })
}

fn now() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::function("Now", Type::DateTime).describe("Current local date and time"),
        |_, _| {
            Ok(Calc::DateTime(TypedCalc::new(
                "Now",
                Type::DateTime,
                vec![],
                |_, _| Ok(Some(Local::now().naive_local())),
            )))
        },
    )
}
