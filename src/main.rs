//! evoclass - Main Entry Point
//!
//! Loads the labeled community dataset, runs the full evaluation grid, and
//! maps failures to process exit codes. Insufficient training data for the
//! requested fold structure exits with code 6; any other failure exits 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use evoclass::loader::DatasetLoader;
use evoclass::{EvalConfig, EvalError, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "evoclass", version, about = "Community evolution classification benchmark")]
struct Cli {
    /// Path to the labeled dataset (CSV with header)
    #[arg(long)]
    data: PathBuf,

    /// Directory receiving the report and chart artifacts
    #[arg(long, default_value = "results")]
    out_dir: PathBuf,

    /// Name of the event-label column
    #[arg(long, default_value = "event")]
    event_column: String,

    /// Name of the class column
    #[arg(long, default_value = "class")]
    class_column: String,

    /// Cross-validation folds
    #[arg(long, default_value_t = 10)]
    folds: usize,

    /// Random seed for folds, resampling, and wrapper search
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Majority-to-minority spread cap after oversampling
    #[arg(long, default_value_t = 1.0)]
    spread: f64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evoclass=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = EvalConfig::new(&cli.event_column, &cli.class_column)
        .with_folds(cli.folds)
        .with_seed(cli.seed)
        .with_spread(cli.spread)
        .with_out_dir(&cli.out_dir);

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ EvalError::InsufficientTrainingData { .. }) => {
            eprintln!("Exception: {e}");
            eprintln!("Insufficient training data. Exit Code: 6");
            ExitCode::from(6)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: EvalConfig) -> evoclass::Result<()> {
    let base = DatasetLoader::new().load_csv(&cli.data, &cli.class_column)?;
    let report_path = config.report_path();
    let summary = Pipeline::new(config).run(&base)?;
    println!(
        "Completed {} rows ({} skipped), {} evaluations. Report: {}",
        summary.rows_completed,
        summary.rows_skipped,
        summary.evaluations,
        report_path.display()
    );
    Ok(())
}
