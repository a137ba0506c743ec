//! Built-in function tests
//!
//! These tests compile and evaluate calls against the shared Sales cube:
//! - Null propagation and three-valued logic
//! - Overload selection by argument type
//! - Set construction, slicing, ordering and combination
//! - Aggregates and the `non_empty` flag

#[path = "../common/mod.rs"]
mod common;

mod aggregate;
mod arithmetic;
mod comparison;
mod conversion;
mod logical;
mod member;
mod set;
