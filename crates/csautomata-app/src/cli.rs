use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use csautomata_core::{EngineConfig, MetricVariant, RuleVariant};

#[derive(Parser, Debug)]
#[command(
    name = "csautomata",
    version,
    about = "Run batches of the column-balance cellular automaton and emit score series as JSON"
)]
pub struct Cli {
    /// JSON file holding an engine configuration; flags below override its fields.
    #[arg(short, long, env = "CSAUTOMATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Grid edge length.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub size: Option<u32>,

    /// Delay between steps in milliseconds (0 runs flat out).
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Steps per run.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iterations: Option<u32>,

    /// Number of runs in the batch.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub runs: Option<u32>,

    /// Transition rule: a, b, c (or competitive-majority, symmetric-majority, corner-propagation).
    #[arg(long)]
    pub rule: Option<RuleVariant>,

    /// Balance metric: plain or penalized.
    #[arg(long)]
    pub metric: Option<MetricVariant>,

    /// RNG seed for reproducible batches.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the batch report here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Effective configuration: file (or defaults) with flag overrides applied.
    pub fn resolve_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => EngineConfig::default(),
        };
        if let Some(size) = self.size {
            config.side_length = size as usize;
        }
        if let Some(interval) = self.interval_ms {
            config.step_interval_ms = interval;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(runs) = self.runs {
            config.total_runs = runs;
        }
        if let Some(rule) = self.rule {
            config.rule = Some(rule);
        }
        if let Some(metric) = self.metric {
            config.metric = Some(metric);
        }
        if let Some(seed) = self.seed {
            config.rng_seed = Some(seed);
        }
        Ok(config)
    }
}

/// Read an [`EngineConfig`] from a JSON file; missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
