//! Built-in MDX functions
//!
//! Functions are organized by category:
//! - Arithmetic operators (`+`, `-`, `*`, `/`, unary `-`, `||`)
//! - Comparison operators (`=`, `<>`, `<`, `>`, `<=`, `>=`, `IS`)
//! - Logical operators and conditionals (`AND`, `OR`, `XOR`, `NOT`, `IIf`, `IsEmpty`, `CoalesceEmpty`)
//! - Member and metadata accessors (`Parent`, `CurrentMember`, `Name`, `Properties`, ...)
//! - Conversions (`StrToMember`, `CDate`, `Now`)
//! - Set builders and transformers (`{}`, `Children`, `Subset`, `Order`, `CrossJoin`, ...)
//! - Aggregates (`Count`, `Sum`, `Avg`, `Min`, `Max`)
//!
//! Registration order matters: the resolver picks the first overload that
//! accepts the argument types, so numeric `*` is registered before the set
//! crossjoin form.

pub mod aggregate;
pub mod arithmetic;
pub mod comparison;
pub mod conversion;
pub mod logical;
pub mod member;
pub mod set;

use crate::registry::FunctionTableBuilder;

/// Register every built-in function
pub(crate) fn register_standard(builder: &mut FunctionTableBuilder) {
    arithmetic::register(builder);
    comparison::register(builder);
    logical::register(builder);
    member::register(builder);
    conversion::register(builder);
    set::register(builder);
    aggregate::register(builder);
}
