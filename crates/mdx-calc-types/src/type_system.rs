//! MDX Type System
//!
//! This module defines the expression types produced by type inference and the
//! parameter categories used by function signatures:
//! - `Type` enum tagging the value category of every expression node
//! - `ParamType` describing what a declared parameter accepts
//! - Type display utilities used in diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value category of an expression
///
/// Produced once per expression node by type inference and consumed by the
/// resolver and the compiler. Numeric expressions are either `Integer` or `Double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "arity")]
pub enum Type {
    // === Scalar Types ===
    /// 32-bit integer (null encoded as a sentinel)
    Integer,
    /// Double (null encoded as a reserved NaN pattern)
    Double,
    /// String (nullable)
    String,
    /// Three-valued boolean
    Boolean,
    /// Date and time without time zone
    DateTime,

    // === Metadata Types ===
    /// Member of a hierarchy
    Member,
    /// Level of a hierarchy
    Level,
    /// Hierarchy of a dimension
    Hierarchy,
    /// Dimension
    Dimension,

    // === Tuple Types ===
    /// Tuple with the given number of members
    Tuple(usize),
    /// Set of tuples with the given arity
    Set(usize),

    // === Special Types ===
    /// Flag keyword such as `POST` or `BDESC`
    Symbol,
    /// Type not known until evaluation (e.g. the null literal, property values)
    Unknown,
}

impl Type {
    /// Check if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Double)
    }

    /// Check if this is a scalar (non-metadata, non-set) type
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Double | Self::String | Self::Boolean | Self::DateTime
        )
    }

    /// Check if this is a metadata type
    pub fn is_metadata(&self) -> bool {
        matches!(
            self,
            Self::Member | Self::Level | Self::Hierarchy | Self::Dimension
        )
    }

    /// Check if this is a set type
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// Check if this is the unknown type
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Arity of the tuples this type denotes, if it denotes tuples at all
    ///
    /// A member counts as a 1-tuple.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Member => Some(1),
            Self::Tuple(n) | Self::Set(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the simple name of this type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Double => "Double",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Member => "Member",
            Self::Level => "Level",
            Self::Hierarchy => "Hierarchy",
            Self::Dimension => "Dimension",
            Self::Tuple(_) => "Tuple",
            Self::Set(_) => "Set",
            Self::Symbol => "Symbol",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tuple(n) => write!(f, "Tuple<{}>", n),
            Self::Set(n) => write!(f, "Set<{}>", n),
            _ => f.write_str(self.name()),
        }
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Declared parameter category of a function signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Exactly this type, or a type that widens to it
    Exact(Type),
    /// Any numeric value: numbers, null, members and tuples in value context
    Numeric,
    /// Any tuple, including a single member
    AnyTuple,
    /// Any set, including a single member or tuple
    AnySet,
    /// Any scalar value
    Scalar,
    /// One of the listed flag keywords
    Symbol(&'static [&'static str]),
}

impl ParamType {
    /// Shorthand for `ParamType::Exact`
    pub const fn exact(ty: Type) -> Self {
        Self::Exact(ty)
    }

    /// The type an argument of this category is compiled to when the
    /// actual type does not decide it
    pub fn canonical_type(&self) -> Type {
        match self {
            Self::Exact(ty) => *ty,
            Self::Numeric => Type::Double,
            Self::AnyTuple => Type::Tuple(1),
            Self::AnySet => Type::Set(1),
            Self::Scalar => Type::Unknown,
            Self::Symbol(_) => Type::Symbol,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(ty) => write!(f, "{}", ty),
            Self::Numeric => f.write_str("Numeric"),
            Self::AnyTuple => f.write_str("Tuple"),
            Self::AnySet => f.write_str("Set"),
            Self::Scalar => f.write_str("Scalar"),
            Self::Symbol(keywords) => write!(f, "Symbol[{}]", keywords.join("|")),
        }
    }
}
