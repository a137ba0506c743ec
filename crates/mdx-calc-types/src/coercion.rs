//! MDX Type Coercion Rules
//!
//! This module implements the implicit conversion rules between expression types:
//! - Widening rules used when matching arguments against signatures
//! - Parameter category acceptance
//! - The wider set of conversions the compiler may insert explicitly

use crate::{ParamType, Type};

/// Type coercion rules
///
/// Overload resolution only ever uses widening conversions. The compiler may
/// additionally narrow (Double -> Integer) when a function asks for an integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercer;

impl TypeCoercer {
    /// Create a new type coercer
    pub fn new() -> Self {
        Self
    }

    /// Check if `from` widens implicitly to `to`
    ///
    /// The following implicit conversions are allowed:
    /// - Integer -> Double
    /// - Integer/Double -> Boolean (zero is false)
    /// - Unknown -> any scalar, Member, Level or Tuple (checked at runtime)
    /// - Member -> Tuple(1), Member -> Set(1), Tuple(n) -> Set(n)
    /// - Member/Tuple -> Double (value of the cell at that coordinate)
    /// - Member/Level -> Hierarchy, Member/Level/Hierarchy -> Dimension
    pub fn can_widen(&self, from: Type, to: Type) -> bool {
        if from == to {
            return true;
        }

        match (from, to) {
            // Numeric promotion
            (Type::Integer, Type::Double) => true,
            (Type::Integer | Type::Double, Type::Boolean) => true,

            // Unknown values are checked when evaluated
            (
                Type::Unknown,
                Type::Integer
                | Type::Double
                | Type::String
                | Type::Boolean
                | Type::DateTime
                | Type::Member
                | Type::Level
                | Type::Tuple(_),
            ) => true,

            // Tuple promotions
            (Type::Member, Type::Tuple(1)) => true,
            (Type::Member, Type::Set(1)) => true,
            (Type::Tuple(n), Type::Set(m)) => n == m,

            // Value context
            (Type::Member | Type::Tuple(_), Type::Double) => true,

            // Metadata projections
            (Type::Member | Type::Level, Type::Hierarchy) => true,
            (Type::Member | Type::Level | Type::Hierarchy, Type::Dimension) => true,

            _ => false,
        }
    }

    /// Check if a parameter of category `param` accepts an argument of type `actual`
    pub fn accepts(&self, param: &ParamType, actual: Type) -> bool {
        match param {
            ParamType::Exact(ty) => self.can_widen(actual, *ty),
            ParamType::Numeric => matches!(
                actual,
                Type::Integer | Type::Double | Type::Unknown | Type::Member | Type::Tuple(_)
            ),
            ParamType::AnyTuple => matches!(actual, Type::Member | Type::Tuple(_) | Type::Unknown),
            ParamType::AnySet => matches!(actual, Type::Set(_) | Type::Member | Type::Tuple(_)),
            ParamType::Scalar => {
                actual.is_scalar()
                    || matches!(actual, Type::Unknown | Type::Member | Type::Tuple(_))
            }
            ParamType::Symbol(_) => actual == Type::Symbol,
        }
    }

    /// Check if the compiler can convert `from` to `to`
    ///
    /// All widening conversions plus Double -> Integer (truncating).
    pub fn can_convert(&self, from: Type, to: Type) -> bool {
        if self.can_widen(from, to) {
            return true;
        }

        match (from, to) {
            (Type::Double, Type::Integer) => true,
            (Type::Member | Type::Tuple(_), Type::Integer) => true,
            _ => false,
        }
    }
}
