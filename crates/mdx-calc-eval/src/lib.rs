//! MDX Expression Compiler and Evaluator
//!
//! This crate turns resolved MDX call trees into executable calculation trees
//! and evaluates them against a scoped dimensional context:
//!
//! - **Function Table**: overloads per (syntax, name), resolved first-match in
//!   registration order
//! - **Validator**: bottom-up type inference over a call tree
//! - **Compiler**: lowers calls to [`Calc`] nodes, inserting coercions where a
//!   child's natural type differs from the one a function asks for
//! - **Evaluator**: current member per hierarchy, savepoints, the `non_empty`
//!   and `native_enabled` flags, native and profiling hooks
//! - **Sorter**: hierarchize and order over tuple lists
//!
//! # Example
//!
//! ```ignore
//! use mdx_calc_eval::{Evaluator, ExpCompiler, Validator};
//!
//! let exp = Validator::standard().validate(exp)?;
//! let calc = ExpCompiler::standard().compile(&exp)?;
//! let mut evaluator = Evaluator::builder(cube).build();
//! let value = evaluator.execute(&calc)?;
//! ```
//!
//! # Null Handling
//!
//! Numeric nodes pass raw `f64`/`i32` values carrying the null sentinels from
//! `mdx_calc_types::nullable`. Booleans are three-valued:
//!
//! - `AND`: false dominates (null and false = false)
//! - `OR`: true dominates (null or true = true)
//! - Comparisons with a null operand return null

pub mod calc;
pub mod coercion;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod native;
pub mod profile;
pub mod registry;
pub mod sorter;
pub mod validate;

pub use calc::{Calc, CalcFn, ListCalc, ResultStyle, TypedCalc};
pub use compiler::ExpCompiler;
pub use error::{CompileError, CompileResult, EvalError, EvalResult};
pub use evaluator::{Evaluator, EvaluatorBuilder, SavepointId, ScopedEvaluator};
pub use native::{NativeError, NativeSetEvaluator};
pub use profile::{LogProfileHandler, ProfileHandler, QueryTiming, TimingEntry};
pub use registry::{
    FunctionDefinition, FunctionMetaData, FunctionParameter, FunctionResolver, FunctionTable,
    FunctionTableBuilder,
};
pub use sorter::SortFlag;
pub use validate::Validator;
