//! Run and batch orchestration.
//!
//! A [`RunController`] owns the validated configuration and the seeding RNG; a
//! [`RunState`] is the caller-held state of one run. [`BatchSession`] strings
//! runs together for front ends that step on a timer.

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid::{Grid, seed};
use crate::metric::MetricVariant;
use crate::rules::RuleVariant;
use crate::{EngineConfig, EngineError, Iteration};

/// Upper bound on capacity reserved up front from configured counts.
const RESERVE_LIMIT: u32 = 1024;

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum RunPhase {
    /// Freshly seeded; no step taken yet.
    #[default]
    Seeded,
    /// At least one step taken and more remain.
    Stepping,
    /// `max_iterations` steps taken.
    Completed,
    /// Halted by the caller before completion.
    Stopped,
}

impl RunPhase {
    /// Whether [`RunController::advance`] will still step the grid.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Seeded | Self::Stepping)
    }
}

/// Score series recorded for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RunResult {
    pub run_index: u32,
    pub series: Vec<f64>,
    pub completed: bool,
}

impl RunResult {
    /// Score after the last completed iteration.
    #[must_use]
    pub fn final_score(&self) -> Option<f64> {
        self.series.last().copied()
    }
}

/// Completed runs of a batch, in run order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BatchResult {
    pub runs: Vec<RunResult>,
}

impl BatchResult {
    /// Number of completed runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Last score of each run.
    #[must_use]
    pub fn final_scores(&self) -> Vec<f64> {
        self.runs.iter().filter_map(RunResult::final_score).collect()
    }

    /// Mean score per iteration across every run long enough to reach it.
    #[must_use]
    pub fn mean_series(&self) -> Vec<f64> {
        let longest = self.runs.iter().map(|run| run.series.len()).max().unwrap_or(0);
        let mut sums = vec![0.0; longest];
        let mut counts = vec![0usize; longest];
        for run in &self.runs {
            for (idx, &score) in run.series.iter().enumerate() {
                sums[idx] += score;
                counts[idx] += 1;
            }
        }
        sums.into_iter()
            .zip(counts)
            .map(|(sum, count)| sum / count as f64)
            .collect()
    }
}

/// Caller-held state of one run.
#[derive(Debug, Clone)]
pub struct RunState {
    run_index: u32,
    grid: Grid,
    iteration: Iteration,
    max_iterations: u32,
    series: Vec<f64>,
    phase: RunPhase,
}

impl RunState {
    fn new(run_index: u32, grid: Grid, max_iterations: u32) -> Self {
        Self {
            run_index,
            grid,
            iteration: Iteration::zero(),
            max_iterations,
            series: Vec::with_capacity(max_iterations.min(RESERVE_LIMIT) as usize),
            phase: RunPhase::Seeded,
        }
    }

    #[must_use]
    pub const fn run_index(&self) -> u32 {
        self.run_index
    }

    /// Current grid snapshot for renderers.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub const fn iteration(&self) -> Iteration {
        self.iteration
    }

    #[must_use]
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Scores recorded so far, one per completed iteration.
    #[must_use]
    pub fn series(&self) -> &[f64] {
        &self.series
    }

    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.phase, RunPhase::Completed)
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self.phase, RunPhase::Stopped)
    }

    /// Halt the run at the current iteration boundary, keeping its partial series.
    ///
    /// Has no effect on a completed run.
    pub fn stop(&mut self) {
        if self.phase.is_active() {
            self.phase = RunPhase::Stopped;
        }
    }

    /// Copy of the recorded series, marked complete or partial.
    #[must_use]
    pub fn result(&self) -> RunResult {
        RunResult {
            run_index: self.run_index,
            series: self.series.clone(),
            completed: self.is_completed(),
        }
    }

    #[must_use]
    pub fn into_result(self) -> RunResult {
        let completed = self.is_completed();
        RunResult {
            run_index: self.run_index,
            series: self.series,
            completed,
        }
    }
}

/// Drives runs with a validated rule, metric, and seeding RNG.
pub struct RunController {
    config: EngineConfig,
    rule: RuleVariant,
    metric: MetricVariant,
    rng: SmallRng,
}

impl fmt::Debug for RunController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunController")
            .field("config", &self.config)
            .field("rule", &self.rule)
            .field("metric", &self.metric)
            .finish()
    }
}

impl RunController {
    /// Validate `config` and prepare to seed runs.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let (rule, metric) = config.validate()?;
        let rng = config.seeded_rng();
        Ok(Self {
            config,
            rule,
            metric,
            rng,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn rule(&self) -> RuleVariant {
        self.rule
    }

    #[must_use]
    pub const fn metric(&self) -> MetricVariant {
        self.metric
    }

    /// Seed a fresh run.
    pub fn start_run(&mut self, run_index: u32) -> Result<RunState, EngineError> {
        let grid = seed(self.config.side_length, &mut self.rng)?;
        Ok(RunState::new(run_index, grid, self.config.max_iterations))
    }

    /// Perform one iteration: step, score, record.
    ///
    /// Returns `None` without touching the grid once the run is completed or
    /// stopped.
    pub fn advance(&self, state: &mut RunState) -> Option<f64> {
        if !state.phase.is_active() {
            return None;
        }
        if state.iteration.0 >= state.max_iterations {
            state.phase = RunPhase::Completed;
            return None;
        }

        state.grid = self.rule.step(&state.grid);
        state.iteration = state.iteration.next();
        let score = self.metric.score(&state.grid);
        state.series.push(score);
        state.phase = if state.iteration.0 >= state.max_iterations {
            RunPhase::Completed
        } else {
            RunPhase::Stepping
        };
        Some(score)
    }

    /// Reseed `state` in place, discarding its partial series.
    pub fn restart(&mut self, state: &mut RunState) -> Result<(), EngineError> {
        *state = self.start_run(state.run_index)?;
        Ok(())
    }

    /// Run a single seeded run to completion.
    pub fn run_to_completion(&mut self, run_index: u32) -> Result<RunResult, EngineError> {
        let mut state = self.start_run(run_index)?;
        while self.advance(&mut state).is_some() {}
        Ok(state.into_result())
    }
}

/// Progress emitted after each iteration of a batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StepReport {
    pub run_index: u32,
    pub iteration: Iteration,
    pub score: f64,
    pub run_completed: bool,
    pub batch_completed: bool,
}

/// Hook invoked by [`BatchSession`] after each step and each completed run.
pub trait RunObserver: Send {
    fn on_step(&mut self, report: &StepReport, grid: &Grid);

    fn on_run_complete(&mut self, _result: &RunResult) {}
}

/// No-op observer.
#[derive(Debug, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn on_step(&mut self, _report: &StepReport, _grid: &Grid) {}
}

/// Step-at-a-time driver for a batch of independent runs.
pub struct BatchSession {
    controller: RunController,
    current: RunState,
    result: BatchResult,
    observer: Box<dyn RunObserver>,
}

impl fmt::Debug for BatchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSession")
            .field("controller", &self.controller)
            .field("run_index", &self.current.run_index)
            .field("iteration", &self.current.iteration)
            .field("phase", &self.current.phase)
            .field("completed_runs", &self.result.len())
            .finish()
    }
}

impl BatchSession {
    /// Validate `config` and seed the first run.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_observer(config, Box::new(NullObserver))
    }

    /// Validate `config`, seed the first run, and report progress to `observer`.
    pub fn with_observer(
        config: EngineConfig,
        observer: Box<dyn RunObserver>,
    ) -> Result<Self, EngineError> {
        let mut controller = RunController::new(config)?;
        let current = controller.start_run(0)?;
        let reserved = controller.config().total_runs.min(RESERVE_LIMIT) as usize;
        Ok(Self {
            controller,
            current,
            result: BatchResult {
                runs: Vec::with_capacity(reserved),
            },
            observer,
        })
    }

    /// Replace the observer.
    pub fn set_observer(&mut self, observer: Box<dyn RunObserver>) {
        self.observer = observer;
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.controller.config()
    }

    #[must_use]
    pub fn total_runs(&self) -> u32 {
        self.controller.config().total_runs
    }

    /// State of the run in progress (or the last run once finished).
    #[must_use]
    pub fn current(&self) -> &RunState {
        &self.current
    }

    /// Grid snapshot of the current run.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.current.grid()
    }

    /// Runs completed so far.
    #[must_use]
    pub fn result(&self) -> &BatchResult {
        &self.result
    }

    #[must_use]
    pub fn into_result(self) -> BatchResult {
        self.result
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.result.len() >= self.total_runs() as usize
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.current.is_stopped()
    }

    /// Perform one iteration of the current run.
    ///
    /// When the run reaches `max_iterations` it is recorded and the next run
    /// is seeded before returning. Returns `Ok(None)` once the batch is
    /// finished or while the current run is stopped.
    pub fn advance(&mut self) -> Result<Option<StepReport>, EngineError> {
        if self.is_finished() {
            return Ok(None);
        }
        let Some(score) = self.controller.advance(&mut self.current) else {
            return Ok(None);
        };

        let run_completed = self.current.is_completed();
        let batch_completed = run_completed && self.result.len() + 1 >= self.total_runs() as usize;
        let report = StepReport {
            run_index: self.current.run_index,
            iteration: self.current.iteration,
            score,
            run_completed,
            batch_completed,
        };
        self.observer.on_step(&report, &self.current.grid);

        if run_completed {
            let finished = self.current.result();
            self.observer.on_run_complete(&finished);
            self.result.runs.push(finished);
            if !batch_completed {
                let next_index = self.current.run_index + 1;
                self.current = self.controller.start_run(next_index)?;
            }
        }
        Ok(Some(report))
    }

    /// Stop the current run between iterations.
    ///
    /// The partial series stays readable through [`Self::current`]; the run is
    /// not counted and the batch does not move on until [`Self::restart`].
    pub fn stop(&mut self) {
        self.current.stop();
    }

    /// Reseed the current run and discard its partial series.
    ///
    /// Completed runs already in the batch result are kept. Does nothing once
    /// the batch is finished; use [`Self::reset`] to start over.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        if self.is_finished() {
            return Ok(());
        }
        self.controller.restart(&mut self.current)
    }

    /// Discard every run and start the batch again from run zero.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.result.runs.clear();
        self.current = self.controller.start_run(0)?;
        Ok(())
    }

    /// Step until the batch is finished or the current run is stopped.
    pub fn run_to_end(&mut self) -> Result<&BatchResult, EngineError> {
        while self.advance()?.is_some() {}
        Ok(&self.result)
    }
}

/// Run `config.total_runs` independent runs of `config.max_iterations` steps.
pub fn run_batch(config: EngineConfig) -> Result<BatchResult, EngineError> {
    let mut session = BatchSession::new(config)?;
    session.run_to_end()?;
    Ok(session.into_result())
}
