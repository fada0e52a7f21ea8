use std::thread;
use std::time::Duration;

use anyhow::Result;
use csautomata_core::{BatchSession, Grid, RunObserver, RunResult, StepReport};
use tracing::{debug, info};

/// Observer that reports progress through `tracing`.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl RunObserver for LoggingObserver {
    fn on_step(&mut self, report: &StepReport, grid: &Grid) {
        debug!(
            run = report.run_index,
            iteration = report.iteration.0,
            score = report.score,
            population = grid.population(),
            "iteration complete",
        );
    }

    fn on_run_complete(&mut self, result: &RunResult) {
        info!(
            run = result.run_index,
            iterations = result.series.len(),
            final_score = result.final_score().unwrap_or(f64::NAN),
            "run complete",
        );
    }
}

/// Step `session` until it finishes or stops, sleeping `pacing` between steps.
///
/// Returns the number of steps taken.
pub fn drive(session: &mut BatchSession, pacing: Duration) -> Result<u64> {
    let mut steps = 0u64;
    while let Some(report) = session.advance()? {
        steps += 1;
        if !report.batch_completed && !pacing.is_zero() {
            thread::sleep(pacing);
        }
    }
    Ok(steps)
}
