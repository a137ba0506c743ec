//! MDX calc type system
//!
//! This crate defines the value model shared by the compiler and the evaluator:
//! - Expression types and declared parameter categories
//! - Implicit conversion rules used by overload resolution
//! - The null-sentinel numeric domain and its total order
//! - Runtime values and the OLAP metadata handles they carry
//! - Tuples and tuple collections

pub mod coercion;
pub mod nullable;
pub mod olap;
pub mod tuple;
pub mod type_system;
pub mod value;

pub use coercion::TypeCoercer;
pub use olap::{
    Dimension, DimensionRef, Hierarchy, HierarchyRef, Level, LevelRef, Member, MemberRef,
    NameError, split_unique_name,
};
pub use tuple::{Tuple, TupleIterable, TupleList, TupleListError};
pub use type_system::{ParamType, Type};
pub use value::{Value, compare_values};
