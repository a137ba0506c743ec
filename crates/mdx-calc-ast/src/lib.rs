//! MDX call-tree definitions
//!
//! This crate defines the expression tree handed over by the MDX parser and
//! validator: literals, metadata references and function calls, each of which
//! carries an inferred type once validated.

mod expression;
mod literal;
mod syntax;

pub use expression::*;
pub use literal::*;
pub use syntax::*;
