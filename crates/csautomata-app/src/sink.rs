use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csautomata_core::{BatchResult, EngineConfig, RunResult};
use serde::{Deserialize, Serialize};

/// JSON document handed to charting tools once a batch finishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchReport {
    pub config: EngineConfig,
    pub runs: Vec<RunResult>,
    /// Mean score per iteration across runs.
    pub mean_series: Vec<f64>,
    /// Last score of each run.
    pub final_scores: Vec<f64>,
}

impl BatchReport {
    #[must_use]
    pub fn new(config: EngineConfig, batch: BatchResult) -> Self {
        let mean_series = batch.mean_series();
        let final_scores = batch.final_scores();
        Self {
            config,
            runs: batch.runs,
            mean_series,
            final_scores,
        }
    }
}

/// Write `report` as pretty JSON to `output`, or stdout when `None`.
pub fn write_report(report: &BatchReport, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create report file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, report)
                .context("failed to serialize batch report")?;
            writer
                .flush()
                .with_context(|| format!("failed to write report file {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, report)
                .context("failed to serialize batch report")?;
            writeln!(stdout).context("failed to write report to stdout")?;
        }
    }
    Ok(())
}
