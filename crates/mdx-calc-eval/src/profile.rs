//! Profiling hook
//!
//! After [`Evaluator::execute`](crate::Evaluator::execute) completes, an
//! installed [`ProfileHandler`] receives the rendered plan and the timings
//! collected during the execution.

use indexmap::IndexMap;
use log::info;
use std::fmt;
use std::time::Duration;

/// Accumulated timing for one label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingEntry {
    pub count: usize,
    pub total: Duration,
}

/// Timings collected during one execution, in first-recorded order
#[derive(Debug, Clone, Default)]
pub struct QueryTiming {
    entries: IndexMap<String, TimingEntry>,
}

impl QueryTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one measurement under `label`
    pub fn record(&mut self, label: &str, elapsed: Duration) {
        let entry = self.entries.entry(label.to_string()).or_default();
        entry.count += 1;
        entry.total += elapsed;
    }

    pub fn get(&self, label: &str) -> Option<TimingEntry> {
        self.entries.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TimingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for QueryTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, entry) in &self.entries {
            writeln!(
                f,
                "{} invoked {} times for total of {}ms",
                label,
                entry.count,
                entry.total.as_millis()
            )?;
        }
        Ok(())
    }
}

/// Receives the plan and timing of each execution
pub trait ProfileHandler: Send + Sync {
    fn explain(&self, plan: &str, timing: &QueryTiming);
}

/// Writes plans and timings to the `log` facade at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProfileHandler;

impl ProfileHandler for LogProfileHandler {
    fn explain(&self, plan: &str, timing: &QueryTiming) {
        info!("plan:\n{}timing:\n{}", plan, timing);
    }
}
