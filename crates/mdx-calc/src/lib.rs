//! MDX expression engine for OLAP cubes
//!
//! This crate ties the workspace together:
//! - Validating and compiling resolved MDX call trees into calculation trees
//! - Evaluating them against a [`Cube`] with a scoped dimensional context
//! - A single error type covering both stages
//!
//! # Example
//!
//! ```ignore
//! use mdx_calc::{Exp, execute};
//!
//! let exp = Exp::function("Count", vec![Exp::property("Children", usa)]);
//! let value = execute(cube, exp)?;
//! ```

pub mod error;

// Re-export all public APIs from internal crates
pub use mdx_calc_ast as ast;
pub use mdx_calc_eval as eval;
pub use mdx_calc_model as model;
pub use mdx_calc_types as types;

// Convenience re-exports
pub use error::{MdxCalcError, Result};
pub use mdx_calc_ast::{Exp, Literal, ResolvedFunCall, Syntax};
pub use mdx_calc_eval::{Calc, Evaluator, ExpCompiler, Validator};
pub use mdx_calc_model::{Cube, MdxConfig, MemoryCube};
pub use mdx_calc_types::{Tuple, TupleList, Type, Value};

use log::debug;
use std::sync::Arc;

/// Validate and compile an expression with the built-in functions
pub fn prepare(exp: Exp) -> Result<Calc> {
    let exp = Validator::standard().validate(exp)?;
    let calc = ExpCompiler::standard().compile(&exp)?;
    debug!("prepared plan:\n{}", calc.explain());
    Ok(calc)
}

/// Prepare an expression and evaluate it once with a fresh evaluator
pub fn execute(cube: Arc<dyn Cube>, exp: Exp) -> Result<Value> {
    let calc = prepare(exp)?;
    let mut evaluator = Evaluator::new(cube);
    Ok(evaluator.execute(&calc)?)
}
