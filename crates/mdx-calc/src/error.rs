//! Unified error type

use mdx_calc_eval::{CompileError, EvalError};
use thiserror::Error;

/// Result type for the convenience entry points
pub type Result<T> = std::result::Result<T, MdxCalcError>;

/// Any failure between an expression and its value
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MdxCalcError {
    /// Resolution, type inference or compilation failed
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Evaluation failed
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl MdxCalcError {
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile(_))
    }

    pub fn is_eval(&self) -> bool {
        matches!(self, Self::Eval(_))
    }
}
