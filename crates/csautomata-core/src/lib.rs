//! Core engine for the column-balance cellular automaton.
//!
//! A run seeds a toroidal binary grid with exactly half of its cells set, then
//! repeatedly applies one of the [`RuleVariant`] transition rules and scores
//! each new grid with a [`MetricVariant`]. A batch collects one score series per
//! run. Nothing in this crate sleeps, logs, or performs I/O; front ends drive it
//! one [`BatchSession::advance`] at a time.
//!
//! ```
//! use csautomata_core::{EngineConfig, MetricVariant, RuleVariant, run_batch};
//!
//! let config = EngineConfig {
//!     side_length: 16,
//!     max_iterations: 5,
//!     total_runs: 2,
//!     rule: Some(RuleVariant::SymmetricMajority),
//!     metric: Some(MetricVariant::Penalized),
//!     rng_seed: Some(7),
//!     ..EngineConfig::default()
//! };
//! let batch = run_batch(config).expect("valid config");
//! assert_eq!(batch.runs.len(), 2);
//! assert!(batch.runs.iter().all(|run| run.series.len() == 5));
//! ```

use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod grid;
mod metric;
mod rules;
mod run;

pub use grid::{Grid, NeighborhoodSample, seed};
pub use metric::{MetricVariant, balance_score, column_contribution, column_proportions};
pub use rules::RuleVariant;
pub use run::{
    BatchResult, BatchSession, NullObserver, RunController, RunObserver, RunPhase, RunResult,
    RunState, StepReport, run_batch,
};

/// Errors raised when configuring or driving the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A configuration value is outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A rule or metric variant was never selected.
    #[error("engine not configured: {0}")]
    NotConfigured(&'static str),
}

/// Raised when a variant name cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseVariantError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseVariantError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
            expected,
        }
    }
}

/// Iterations completed within a single run.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Iteration(pub u32);

impl Iteration {
    /// Returns the next sequential iteration.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Resets the counter back to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Static configuration for a batch of runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Edge length of the square grid.
    pub side_length: usize,
    /// Advisory delay between steps in milliseconds; the engine ignores it.
    pub step_interval_ms: u64,
    /// Number of steps in every run.
    pub max_iterations: u32,
    /// Number of runs collected into one batch.
    pub total_runs: u32,
    /// Transition rule applied each step.
    pub rule: Option<RuleVariant>,
    /// Balance metric recorded after each step.
    pub metric: Option<MetricVariant>,
    /// Optional RNG seed for reproducible batches.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            side_length: 80,
            step_interval_ms: 1_000,
            max_iterations: 100,
            total_runs: 1,
            rule: Some(RuleVariant::CompetitiveMajority),
            metric: Some(MetricVariant::Plain),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Validates the configuration, returning the selected rule and metric.
    pub fn validate(&self) -> Result<(RuleVariant, MetricVariant), EngineError> {
        if self.side_length == 0 {
            return Err(EngineError::InvalidConfig("side_length must be positive"));
        }
        if self.side_length.checked_mul(self.side_length).is_none() {
            return Err(EngineError::InvalidConfig("side_length is too large"));
        }
        if self.max_iterations == 0 {
            return Err(EngineError::InvalidConfig(
                "max_iterations must be positive",
            ));
        }
        if self.total_runs == 0 {
            return Err(EngineError::InvalidConfig("total_runs must be positive"));
        }
        let rule = self
            .rule
            .ok_or(EngineError::NotConfigured("no rule variant selected"))?;
        let metric = self
            .metric
            .ok_or(EngineError::NotConfigured("no metric variant selected"))?;
        Ok((rule, metric))
    }

    /// Advisory pause a scheduler should insert between steps.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    /// Returns the configured RNG, generating a seed from entropy if absent.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}
