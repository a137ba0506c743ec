//! Member and metadata accessors
//!
//! Implements: Dimension, Hierarchy, Level, Parent, CurrentMember,
//! DefaultMember, Name, Caption, UniqueName, Properties

use crate::calc::{Calc, TypedCalc};
use crate::compiler::required_arg;
use crate::error::{EvalError, EvalResult};
use crate::registry::{FunctionDefinition, FunctionMetaData, FunctionTableBuilder};
use mdx_calc_types::{DimensionRef, HierarchyRef, LevelRef, MemberRef, ParamType, Type, Value};

pub(crate) fn register(builder: &mut FunctionTableBuilder) {
    builder
        .define(hierarchy_dimension())
        .define(member_dimension())
        .define(level_dimension())
        .define(member_hierarchy())
        .define(level_hierarchy())
        .define(member_level())
        .define(parent())
        .define(current_member())
        .define(default_member());

    for (name, accessor) in NAME_ACCESSORS {
        builder
            .define(member_name(name, accessor.member))
            .define(level_name(name, accessor.level))
            .define(hierarchy_name(name, accessor.hierarchy))
            .define(dimension_name(name, accessor.dimension));
    }

    builder.define(properties());
}

fn null_member(function: &str) -> EvalError {
    EvalError::invalid_operand(function, "null member")
}

fn require(member: Option<MemberRef>, function: &str) -> EvalResult<MemberRef> {
    member.ok_or_else(|| null_member(function))
}

// ============================================================================
// Structural navigation
// ============================================================================

fn hierarchy_dimension() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("Dimension", Type::Dimension)
            .param(ParamType::Exact(Type::Hierarchy))
            .describe("Dimension of a hierarchy"),
        |call, compiler| {
            let hierarchy = compiler.compile_hierarchy(required_arg(call, 0)?)?;
            Ok(Calc::Dimension(TypedCalc::new(
                "Dimension",
                Type::Dimension,
                vec![hierarchy],
                |c, ev| Ok(c[0].evaluate_hierarchy(ev)?.dimension()),
            )))
        },
    )
}

fn member_dimension() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("Dimension", Type::Dimension)
            .param(ParamType::Exact(Type::Member))
            .describe("Dimension of a member"),
        |call, compiler| {
            let member = compiler.compile_member(required_arg(call, 0)?)?;
            Ok(Calc::Dimension(TypedCalc::new(
                "Dimension",
                Type::Dimension,
                vec![member],
                |c, ev| Ok(require(c[0].evaluate_member(ev)?, "Dimension")?.dimension()),
            )))
        },
    )
}

fn level_dimension() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("Dimension", Type::Dimension)
            .param(ParamType::Exact(Type::Level))
            .describe("Dimension of a level"),
        |call, compiler| {
            let level = compiler.compile_level(required_arg(call, 0)?)?;
            Ok(Calc::Dimension(TypedCalc::new(
                "Dimension",
                Type::Dimension,
                vec![level],
                |c, ev| Ok(c[0].evaluate_level(ev)?.dimension()),
            )))
        },
    )
}

fn member_hierarchy() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("Hierarchy", Type::Hierarchy)
            .param(ParamType::Exact(Type::Member))
            .describe("Hierarchy of a member"),
        |call, compiler| {
            let member = compiler.compile_member(required_arg(call, 0)?)?;
            Ok(Calc::Hierarchy(TypedCalc::new(
                "Hierarchy",
                Type::Hierarchy,
                vec![member],
                |c, ev| Ok(require(c[0].evaluate_member(ev)?, "Hierarchy")?.hierarchy()),
            )))
        },
    )
}

fn level_hierarchy() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("Hierarchy", Type::Hierarchy)
            .param(ParamType::Exact(Type::Level))
            .describe("Hierarchy of a level"),
        |call, compiler| {
            let level = compiler.compile_level(required_arg(call, 0)?)?;
            Ok(Calc::Hierarchy(TypedCalc::new(
                "Hierarchy",
                Type::Hierarchy,
                vec![level],
                |c, ev| Ok(c[0].evaluate_level(ev)?.hierarchy()),
            )))
        },
    )
}

fn member_level() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("Level", Type::Level)
            .param(ParamType::Exact(Type::Member))
            .describe("Level of a member"),
        |call, compiler| {
            let member = compiler.compile_member(required_arg(call, 0)?)?;
            Ok(Calc::Level(TypedCalc::new(
                "Level",
                Type::Level,
                vec![member],
                |c, ev| Ok(require(c[0].evaluate_member(ev)?, "Level")?.level()),
            )))
        },
    )
}

/// Parent of a member; the parent of a root member is the null member
fn parent() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("Parent", Type::Member)
            .param(ParamType::Exact(Type::Member))
            .describe("Parent of a member"),
        |call, compiler| {
            let member = compiler.compile_member(required_arg(call, 0)?)?;
            Ok(Calc::Member(TypedCalc::new(
                "Parent",
                Type::Member,
                vec![member],
                |c, ev| Ok(c[0].evaluate_member(ev)?.and_then(|m| m.parent())),
            )))
        },
    )
}

fn current_member() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("CurrentMember", Type::Member)
            .param(ParamType::Exact(Type::Hierarchy))
            .describe("Member of a hierarchy in the current context"),
        |call, compiler| {
            let hierarchy = compiler.compile_hierarchy(required_arg(call, 0)?)?;
            Ok(Calc::Member(TypedCalc::new(
                "CurrentMember",
                Type::Member,
                vec![hierarchy],
                |c, ev| {
                    let hierarchy = c[0].evaluate_hierarchy(ev)?;
                    Ok(ev
                        .context_member(&hierarchy)
                        .or_else(|| hierarchy.default_member()))
                },
            )))
        },
    )
}

fn default_member() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::property("DefaultMember", Type::Member)
            .param(ParamType::Exact(Type::Hierarchy))
            .describe("Default member of a hierarchy"),
        |call, compiler| {
            let hierarchy = compiler.compile_hierarchy(required_arg(call, 0)?)?;
            Ok(Calc::Member(TypedCalc::new(
                "DefaultMember",
                Type::Member,
                vec![hierarchy],
                |c, ev| Ok(c[0].evaluate_hierarchy(ev)?.default_member()),
            )))
        },
    )
}

// ============================================================================
// Names
// ============================================================================

struct NameAccessor {
    member: fn(&MemberRef) -> String,
    level: fn(&LevelRef) -> String,
    hierarchy: fn(&HierarchyRef) -> String,
    dimension: fn(&DimensionRef) -> String,
}

const NAME_ACCESSORS: [(&str, NameAccessor); 3] = [
    (
        "Name",
        NameAccessor {
            member: |m| m.name().to_string(),
            level: |l| l.name().to_string(),
            hierarchy: |h| h.name().to_string(),
            dimension: |d| d.name().to_string(),
        },
    ),
    (
        "Caption",
        NameAccessor {
            member: |m| m.caption().to_string(),
            level: |l| l.caption().to_string(),
            hierarchy: |h| h.caption().to_string(),
            dimension: |d| d.caption().to_string(),
        },
    ),
    (
        "UniqueName",
        NameAccessor {
            member: |m| m.unique_name().to_string(),
            level: |l| l.unique_name().to_string(),
            hierarchy: |h| h.unique_name().to_string(),
            dimension: |d| d.unique_name().to_string(),
        },
    ),
];

fn name_metadata(name: &str, target: Type) -> FunctionMetaData {
    FunctionMetaData::property(name, Type::String)
        .param(ParamType::Exact(target))
        .describe(format!("{} of a {}", name, target.name().to_lowercase()))
}

/// Name of a member; the null member has a null name
fn member_name(name: &'static str, get: fn(&MemberRef) -> String) -> FunctionDefinition {
    FunctionDefinition::new(name_metadata(name, Type::Member), move |call, compiler| {
        let member = compiler.compile_member(required_arg(call, 0)?)?;
        Ok(Calc::String(TypedCalc::new(
            name,
            Type::String,
            vec![member],
            move |c, ev| Ok(c[0].evaluate_member(ev)?.as_ref().map(get)),
        )))
    })
}

fn level_name(
    name: &'static str,
    get: fn(&LevelRef) -> String,
) -> FunctionDefinition {
    FunctionDefinition::new(name_metadata(name, Type::Level), move |call, compiler| {
        let level = compiler.compile_level(required_arg(call, 0)?)?;
        Ok(Calc::String(TypedCalc::new(
            name,
            Type::String,
            vec![level],
            move |c, ev| Ok(Some(get(&c[0].evaluate_level(ev)?))),
        )))
    })
}

fn hierarchy_name(
    name: &'static str,
    get: fn(&HierarchyRef) -> String,
) -> FunctionDefinition {
    FunctionDefinition::new(name_metadata(name, Type::Hierarchy), move |call, compiler| {
        let hierarchy = compiler.compile_hierarchy(required_arg(call, 0)?)?;
        Ok(Calc::String(TypedCalc::new(
            name,
            Type::String,
            vec![hierarchy],
            move |c, ev| Ok(Some(get(&c[0].evaluate_hierarchy(ev)?))),
        )))
    })
}

fn dimension_name(
    name: &'static str,
    get: fn(&DimensionRef) -> String,
) -> FunctionDefinition {
    FunctionDefinition::new(name_metadata(name, Type::Dimension), move |call, compiler| {
        let dimension = compiler.compile_dimension(required_arg(call, 0)?)?;
        Ok(Calc::String(TypedCalc::new(
            name,
            Type::String,
            vec![dimension],
            move |c, ev| Ok(Some(get(&c[0].evaluate_dimension(ev)?))),
        )))
    })
}

// ============================================================================
// Properties
// ============================================================================

/// `member.Properties("name")`
///
/// Intrinsic properties are answered by every member. A property declared on
/// the member's level but without a value on this member is null; any other
/// name is an error.
fn properties() -> FunctionDefinition {
    FunctionDefinition::new(
        FunctionMetaData::method("Properties", Type::Unknown)
            .param(ParamType::Exact(Type::Member))
            .named("name", ParamType::Exact(Type::String))
            .describe("Value of a member property"),
        |call, compiler| {
            let member = compiler.compile_member(required_arg(call, 0)?)?;
            let name = compiler.compile_string(required_arg(call, 1)?)?;
            Ok(Calc::Value(TypedCalc::new(
                "Properties",
                Type::Unknown,
                vec![member, name],
                |c, ev| {
                    let Some(member) = c[0].evaluate_member(ev)? else {
                        return Ok(Value::Null);
                    };
                    let name = c[1].evaluate_string(ev)?.unwrap_or_default();
                    property_value(&member, &name, ev.case_sensitive())
                },
            )))
        },
    )
}

fn property_value(member: &MemberRef, name: &str, case_sensitive: bool) -> EvalResult<Value> {
    if let Some(value) = member.intrinsic_property(name, case_sensitive) {
        return Ok(value);
    }
    if let Some(value) = member.property_value(name, case_sensitive) {
        return Ok(value);
    }
    if member.level().is_valid_property(name, case_sensitive) {
        Ok(Value::Null)
    } else {
        Err(EvalError::invalid_property(name, member.unique_name()))
    }
}
