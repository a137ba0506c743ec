//! MDX runtime values
//!
//! `Value` is the boundary representation of an evaluation result. Numeric
//! sentinels never appear inside a `Value`: a null double becomes `Value::Null`.

use crate::nullable;
use crate::{DimensionRef, HierarchyRef, LevelRef, MemberRef, Tuple, TupleList, Type};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // === Scalars ===
    /// Null (empty cell, null literal, missing value)
    Null,
    /// Double (never the null sentinel)
    Double(f64),
    /// Integer (never the null sentinel)
    Integer(i32),
    /// Boolean
    Boolean(bool),
    /// String
    String(String),
    /// Date and time
    DateTime(NaiveDateTime),

    // === Metadata ===
    Member(MemberRef),
    Level(LevelRef),
    Hierarchy(HierarchyRef),
    Dimension(DimensionRef),

    // === Tuples ===
    Tuple(Tuple),
    List(TupleList),

    /// Flag keyword
    Symbol(String),
}

impl Value {
    /// Wrap a double, mapping the null sentinel to `Value::Null`
    pub fn from_double(value: f64) -> Self {
        match nullable::to_option(value) {
            Some(d) => Self::Double(d),
            None => Self::Null,
        }
    }

    /// Wrap an integer, mapping the null sentinel to `Value::Null`
    pub fn from_integer(value: i32) -> Self {
        match nullable::to_option_integer(value) {
            Some(i) => Self::Integer(i),
            None => Self::Null,
        }
    }

    /// Wrap a three-valued boolean
    pub fn from_boolean(value: Option<bool>) -> Self {
        value.map_or(Self::Null, Self::Boolean)
    }

    /// Wrap an optional value, mapping `None` to `Value::Null`
    pub fn from_option<T>(value: Option<T>, wrap: impl FnOnce(T) -> Value) -> Self {
        value.map_or(Self::Null, wrap)
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type of this value
    pub fn get_type(&self) -> Type {
        match self {
            Self::Null => Type::Unknown,
            Self::Double(_) => Type::Double,
            Self::Integer(_) => Type::Integer,
            Self::Boolean(_) => Type::Boolean,
            Self::String(_) => Type::String,
            Self::DateTime(_) => Type::DateTime,
            Self::Member(_) => Type::Member,
            Self::Level(_) => Type::Level,
            Self::Hierarchy(_) => Type::Hierarchy,
            Self::Dimension(_) => Type::Dimension,
            Self::Tuple(t) => Type::Tuple(t.arity()),
            Self::List(l) => Type::Set(l.arity()),
            Self::Symbol(_) => Type::Symbol,
        }
    }

    /// Numeric view of this value as a raw double (null becomes the sentinel)
    ///
    /// Returns `None` if the value is not numeric.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Null => Some(nullable::DOUBLE_NULL),
            Self::Double(d) => Some(*d),
            Self::Integer(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as member
    pub fn as_member(&self) -> Option<&MemberRef> {
        match self {
            Self::Member(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get as tuple list
    pub fn as_list(&self) -> Option<&TupleList> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Double(d) => write!(f, "{}", d),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::String(s) => write!(f, "{}", s),
            Self::DateTime(dt) => write!(f, "{}", dt),
            Self::Member(m) => write!(f, "{}", m),
            Self::Level(l) => write!(f, "{}", l),
            Self::Hierarchy(h) => write!(f, "{}", h),
            Self::Dimension(d) => write!(f, "{}", d),
            Self::Tuple(t) => write!(f, "{}", t),
            Self::List(l) => write!(f, "{}", l),
            Self::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// Rank of a value's category in the sort order
fn category_rank(value: &Value) -> u8 {
    match value {
        Value::Null | Value::Double(_) | Value::Integer(_) => 0,
        Value::Boolean(_) => 1,
        Value::String(_) => 2,
        Value::DateTime(_) => 3,
        _ => 4,
    }
}

/// Total order over sort keys
///
/// Numbers (and null, which ranks as the null double) follow
/// [`nullable::compare`]; booleans, strings and date-times follow numbers in that
/// order, each compared naturally. Metadata values compare by unique name.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    if let (Some(a), Some(b)) = (left.as_double(), right.as_double()) {
        return nullable::compare(a, b);
    }

    let (left_rank, right_rank) = (category_rank(left), category_rank(right));
    if left_rank != right_rank {
        return left_rank.cmp(&right_rank);
    }

    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
        _ => left.to_string().cmp(&right.to_string()),
    }
}
