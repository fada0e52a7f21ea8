use anyhow::Result;
use clap::Parser;
use csautomata_app::{BatchReport, Cli, LoggingObserver, drive, write_report};
use csautomata_core::BatchSession;
use tracing::info;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(
        side_length = config.side_length,
        max_iterations = config.max_iterations,
        total_runs = config.total_runs,
        rule = ?config.rule,
        metric = ?config.metric,
        interval_ms = config.step_interval_ms,
        "Starting csautomata batch",
    );

    let mut session = BatchSession::with_observer(config.clone(), Box::new(LoggingObserver))?;
    let steps = drive(&mut session, config.step_interval())?;

    info!(steps, runs = session.result().len(), "Batch complete");

    let report = BatchReport::new(config, session.into_result());
    write_report(&report, cli.output.as_deref())?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
