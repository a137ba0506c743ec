//! MDX literals

use mdx_calc_types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value in an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// The `NULL` literal; its type is not known until it is used
    Null,
    /// Numeric literal
    Double(f64),
    /// Integer literal
    Integer(i32),
    /// String literal
    String(String),
    /// Flag keyword such as `POST` or `BDESC`
    Symbol(String),
}

impl Literal {
    /// Type of this literal
    pub fn get_type(&self) -> Type {
        match self {
            Self::Null => Type::Unknown,
            Self::Double(_) => Type::Double,
            Self::Integer(_) => Type::Integer,
            Self::String(_) => Type::String,
            Self::Symbol(_) => Type::Symbol,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Double(d) => write!(f, "{}", d),
            Self::Integer(i) => write!(f, "{}", i),
            Self::String(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            Self::Symbol(s) => write!(f, "{}", s),
        }
    }
}
