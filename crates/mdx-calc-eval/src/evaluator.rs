//! Evaluation context
//!
//! An [`Evaluator`] is created per execution. It holds the current member of
//! every hierarchy, a stack of savepoints and two mode flags:
//! - `non_empty`: member and set builders drop tuples whose cell is empty
//! - `native_enabled`: native-eligible set nodes may be computed natively
//!
//! Nodes that change the context temporarily do so through [`Evaluator::scoped`],
//! whose guard restores the savepoint on every exit path.

use crate::calc::Calc;
use crate::error::{EvalError, EvalResult};
use crate::native::NativeSetEvaluator;
use crate::profile::{ProfileHandler, QueryTiming};
use indexmap::IndexMap;
use log::{trace, warn};
use mdx_calc_model::{Cube, MdxConfig, config};
use mdx_calc_types::{HierarchyRef, MemberRef, Tuple, TupleList, Value};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifier returned by [`Evaluator::savepoint`]
pub type SavepointId = usize;

#[derive(Clone)]
struct Snapshot {
    context: IndexMap<String, MemberRef>,
    non_empty: bool,
    native_enabled: bool,
}

/// Per-execution evaluation state
pub struct Evaluator {
    cube: Arc<dyn Cube>,
    config: MdxConfig,
    /// Current member keyed by hierarchy unique name
    context: IndexMap<String, MemberRef>,
    savepoints: Vec<Snapshot>,
    non_empty: bool,
    native_enabled: bool,
    native: Option<Arc<dyn NativeSetEvaluator>>,
    profiler: Option<Arc<dyn ProfileHandler>>,
    timing: QueryTiming,
}

impl Evaluator {
    /// Create an evaluator with the global configuration and no hooks
    pub fn new(cube: Arc<dyn Cube>) -> Self {
        Self::builder(cube).build()
    }

    pub fn builder(cube: Arc<dyn Cube>) -> EvaluatorBuilder {
        EvaluatorBuilder {
            cube,
            config: None,
            native: None,
            profiler: None,
        }
    }

    pub fn cube(&self) -> &Arc<dyn Cube> {
        &self.cube
    }

    /// Configuration snapshot taken when this evaluator was built
    pub fn config(&self) -> &MdxConfig {
        &self.config
    }

    pub fn case_sensitive(&self) -> bool {
        self.config.case_sensitive
    }

    // === Context ===

    /// Make `member` the current member of its hierarchy; returns the previous one
    pub fn set_context(&mut self, member: MemberRef) -> Option<MemberRef> {
        let key = member.hierarchy().unique_name().to_string();
        self.context.insert(key, member)
    }

    /// Make every member of `tuple` current
    pub fn set_context_tuple(&mut self, tuple: &Tuple) {
        for member in tuple.iter() {
            self.set_context(member.clone());
        }
    }

    /// Current member of a hierarchy
    pub fn context_member(&self, hierarchy: &HierarchyRef) -> Option<MemberRef> {
        self.context.get(hierarchy.unique_name()).cloned()
    }

    /// Current members, one per hierarchy
    pub fn context_members(&self) -> Vec<MemberRef> {
        self.context.values().cloned().collect()
    }

    /// Value of the cell at the current context
    pub fn cell_value(&self) -> Value {
        self.cube.cell_value(&self.context_members())
    }

    /// Check whether the cell addressed by `tuple` (in the current context) is empty
    pub fn is_empty_tuple(&mut self, tuple: &Tuple) -> bool {
        let mut scope = self.scoped();
        scope.set_context_tuple(tuple);
        scope.cell_value().is_null()
    }

    /// Drop tuples with empty cells when `non_empty` is set
    pub fn filter_non_empty(&mut self, list: TupleList) -> EvalResult<TupleList> {
        if !self.non_empty {
            return Ok(list);
        }
        let mut result = TupleList::mutable(list.arity());
        for tuple in list.iter() {
            if !self.is_empty_tuple(tuple) {
                result.push(tuple.clone())?;
            }
        }
        Ok(result)
    }

    // === Flags ===

    pub fn non_empty(&self) -> bool {
        self.non_empty
    }

    /// Set the `non_empty` flag; returns the previous value
    pub fn set_non_empty(&mut self, non_empty: bool) -> bool {
        std::mem::replace(&mut self.non_empty, non_empty)
    }

    pub fn native_enabled(&self) -> bool {
        self.native_enabled
    }

    /// Set the `native_enabled` flag; returns the previous value
    pub fn set_native_enabled(&mut self, native_enabled: bool) -> bool {
        std::mem::replace(&mut self.native_enabled, native_enabled)
    }

    pub fn native_evaluator(&self) -> Option<Arc<dyn NativeSetEvaluator>> {
        self.native.clone()
    }

    // === Savepoints ===

    /// Capture the context and flags
    pub fn savepoint(&mut self) -> SavepointId {
        self.savepoints.push(Snapshot {
            context: self.context.clone(),
            non_empty: self.non_empty,
            native_enabled: self.native_enabled,
        });
        let id = self.savepoints.len() - 1;
        trace!("savepoint {}", id);
        id
    }

    /// Reinstate the state captured by `id`, discarding it and every later savepoint
    pub fn restore(&mut self, id: SavepointId) {
        if id >= self.savepoints.len() {
            warn!(
                "restore of unknown savepoint {} (depth {})",
                id,
                self.savepoints.len()
            );
            return;
        }
        self.savepoints.truncate(id + 1);
        if let Some(snapshot) = self.savepoints.pop() {
            self.context = snapshot.context;
            self.non_empty = snapshot.non_empty;
            self.native_enabled = snapshot.native_enabled;
        }
        trace!("restored savepoint {}", id);
    }

    /// Number of outstanding savepoints
    pub fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }

    /// Take a savepoint that is restored when the guard is dropped
    pub fn scoped(&mut self) -> ScopedEvaluator<'_> {
        let savepoint = self.savepoint();
        ScopedEvaluator {
            evaluator: self,
            savepoint,
        }
    }

    // === Limits and timing ===

    /// Fail if `size` exceeds the configured result limit
    pub fn check_result_limit(&self, function: &str, size: usize) -> EvalResult<()> {
        if self.config.within_limit(size) {
            Ok(())
        } else {
            Err(EvalError::result_limit_exceeded(
                function,
                size,
                self.config.result_limit,
            ))
        }
    }

    pub fn timing(&self) -> &QueryTiming {
        &self.timing
    }

    pub fn timing_mut(&mut self) -> &mut QueryTiming {
        &mut self.timing
    }

    /// Evaluate a compiled tree and report it to the profile handler
    pub fn execute(&mut self, calc: &Calc) -> EvalResult<Value> {
        let start = Instant::now();
        let result = calc.evaluate(self);
        self.record_execution(start.elapsed());
        if let Some(profiler) = &self.profiler {
            profiler.explain(&calc.explain(), &self.timing);
        }
        result
    }

    fn record_execution(&mut self, elapsed: Duration) {
        self.timing.record("execute", elapsed);
    }
}

/// Builder for [`Evaluator`]
pub struct EvaluatorBuilder {
    cube: Arc<dyn Cube>,
    config: Option<MdxConfig>,
    native: Option<Arc<dyn NativeSetEvaluator>>,
    profiler: Option<Arc<dyn ProfileHandler>>,
}

impl EvaluatorBuilder {
    /// Use this configuration instead of the global one
    pub fn config(mut self, config: MdxConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn native(mut self, native: Arc<dyn NativeSetEvaluator>) -> Self {
        self.native = Some(native);
        self
    }

    pub fn profiler(mut self, profiler: Arc<dyn ProfileHandler>) -> Self {
        self.profiler = Some(profiler);
        self
    }

    /// Build with each hierarchy's default member as the initial context
    pub fn build(self) -> Evaluator {
        let config = self.config.unwrap_or_else(config::global);
        let mut context = IndexMap::new();
        for hierarchy in self.cube.hierarchies() {
            if let Some(member) = hierarchy.default_member() {
                context.insert(hierarchy.unique_name().to_string(), member);
            }
        }

        Evaluator {
            native_enabled: config.native_enabled,
            cube: self.cube,
            config,
            context,
            savepoints: Vec::new(),
            non_empty: false,
            native: self.native,
            profiler: self.profiler,
            timing: QueryTiming::new(),
        }
    }
}

/// Guard that restores a savepoint when dropped
pub struct ScopedEvaluator<'a> {
    evaluator: &'a mut Evaluator,
    savepoint: SavepointId,
}

impl Deref for ScopedEvaluator<'_> {
    type Target = Evaluator;

    fn deref(&self) -> &Evaluator {
        self.evaluator
    }
}

impl DerefMut for ScopedEvaluator<'_> {
    fn deref_mut(&mut self) -> &mut Evaluator {
        self.evaluator
    }
}

impl Drop for ScopedEvaluator<'_> {
    fn drop(&mut self) {
        self.evaluator.restore(self.savepoint);
    }
}
