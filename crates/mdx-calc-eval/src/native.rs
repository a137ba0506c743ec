//! Native set evaluation seam
//!
//! A native evaluator (typically SQL-backed) may compute a set-valued node
//! directly instead of interpreting it. It is consulted only for nodes marked
//! native-eligible, and only while the evaluator's `native_enabled` flag is set.

use crate::calc::ListCalc;
use crate::evaluator::Evaluator;
use mdx_calc_types::TupleList;

/// Native evaluation error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NativeError {
    #[error("Native evaluation failed: {0}")]
    Failed(String),

    #[error("Native backend unavailable: {0}")]
    Unavailable(String),
}

/// Computes sets outside the interpreter
pub trait NativeSetEvaluator: Send + Sync {
    /// Evaluate `calc` in the evaluator's current context
    ///
    /// Returns `Ok(None)` to decline, in which case the node is interpreted.
    fn evaluate_set(
        &self,
        calc: &ListCalc,
        evaluator: &Evaluator,
    ) -> Result<Option<TupleList>, NativeError>;
}
