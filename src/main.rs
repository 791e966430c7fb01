//! CLI entry point for the grade rollup tool.
//!
//! Provides subcommands for synchronizing the grade store with the
//! curriculum, reporting credit-weighted unit averages, and rolling up flat
//! grade record files.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use grade_rollup::config::Settings;
use grade_rollup::error::RollupError;
use grade_rollup::output::{Report, append_history, render_text, write_json};
use grade_rollup::pipeline::{sync_and_rollup, sync_store};
use grade_rollup::rollup::UnitResult;
use grade_rollup::rollup::records::rollup_records_file;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grade_rollup")]
#[command(about = "Credit-weighted teaching unit averages from a curriculum grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the grade store in line with the curriculum
    Sync {
        #[command(flatten)]
        settings: Settings,
    },
    /// Synchronize, then print the weighted average of every teaching unit
    Report {
        #[command(flatten)]
        settings: Settings,

        #[command(flatten)]
        outputs: OutputArgs,
    },
    /// Roll up a flat `period;unit;subject;credits;grade` record file
    Records {
        /// Record file to read
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        outputs: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Also write the report as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// CSV file to append results to
    #[arg(long)]
    history: Option<PathBuf>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/grade_rollup.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grade_rollup.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Run failed");
            let code = e
                .downcast_ref::<RollupError>()
                .map_or(1, RollupError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Sync { settings } => {
            let (_, outcome) = sync_store(
                &settings.curriculum_storage(),
                &settings.store_storage(),
                &settings.sync_config(),
            )?;
            log_sync_summary(&outcome.summary);
        }
        Commands::Report { settings, outputs } => {
            let (outcome, results) = sync_and_rollup(
                &settings.curriculum_storage(),
                &settings.store_storage(),
                &settings.sync_config(),
            )?;
            log_sync_summary(&outcome.summary);
            emit(&results, &outputs)?;
        }
        Commands::Records { file, outputs } => {
            let results = rollup_records_file(&file)?;
            emit(&results, &outputs)?;
        }
    }

    Ok(())
}

fn log_sync_summary(summary: &grade_rollup::sync::SyncSummary) {
    for change in &summary.changes {
        info!(
            sheet = %change.sheet,
            created = change.created,
            added = change.added_titles.len(),
            "Store sheet updated"
        );
    }
    for dup in &summary.duplicates {
        warn!(sheet = %dup.sheet, title = %dup.title, "Repeated subject title collapsed");
    }
    if summary.is_unchanged() {
        info!("Store already up to date");
    }
}

/// Prints the text report and writes the optional JSON and history outputs.
#[tracing::instrument(skip_all, fields(units = results.len()))]
fn emit(results: &[UnitResult], outputs: &OutputArgs) -> Result<()> {
    print!("{}", render_text(results));

    if let Some(path) = &outputs.json {
        write_json(path, &Report::from_results(results))?;
        info!(path = %path.display(), "JSON report written");
    }
    if let Some(path) = &outputs.history {
        append_history(path, results)?;
        info!(path = %path.display(), "History appended");
    }

    Ok(())
}
