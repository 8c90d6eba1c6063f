//! CLI entry point for the staff evaluation visuals tool.
//!
//! Loads an evaluation-scores CSV and writes four charts plus their summary
//! tables in a single run.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use eval_visuals::config::{
    ColumnAliases, DEFAULT_CSV_PATH, DEFAULT_FIGURES_DIR, DEFAULT_OUTPUTS_DIR, OutputLayout,
    Thresholds, absolute,
};
use eval_visuals::output::{print_json, print_pretty};
use eval_visuals::pipeline::{RunConfig, run};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "eval_visuals")]
#[command(about = "Staff evaluation score charts", long_about = None)]
struct Cli {
    /// Path to the evaluation-scores CSV (plain or .gz)
    #[arg(long, default_value = DEFAULT_CSV_PATH)]
    csv: PathBuf,

    /// Only keep rows whose school-year value matches exactly
    #[arg(long)]
    school_year: Option<String>,

    /// Observation timestamp column
    #[arg(long, default_value = "ObservationDateTime")]
    date_col: String,

    /// Numeric score column
    #[arg(long, default_value = "ObservationScore")]
    score_col: String,

    /// School-year column
    #[arg(long, default_value = "SchoolYear")]
    schoolyear_col: String,

    /// Observer name column
    #[arg(long, default_value = "ObserverLastFirstName")]
    observer_col: String,

    /// Observee name column
    #[arg(long, default_value = "ObserveeLastFirstName")]
    observee_col: String,

    /// Evaluation type column
    #[arg(long, default_value = "EvaluationType")]
    etype_col: String,

    /// Directory for chart images
    #[arg(long, default_value = DEFAULT_FIGURES_DIR)]
    figures_dir: PathBuf,

    /// Directory for summary tables
    #[arg(long, default_value = DEFAULT_OUTPUTS_DIR)]
    outputs_dir: PathBuf,

    /// Minimum observations for an evaluation group to be shown
    #[arg(long, default_value_t = Thresholds::default().min_group_n)]
    min_type_n: usize,

    /// Minimum observations for an observer to be shown
    #[arg(long, default_value_t = Thresholds::default().min_observer_n)]
    min_observer_n: usize,

    /// Also log the run report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let school_year = self.school_year.filter(|s| !s.is_empty());
        let layout = OutputLayout::new(self.figures_dir, self.outputs_dir, school_year.as_deref());

        RunConfig {
            csv_path: self.csv,
            school_year,
            aliases: ColumnAliases {
                date: self.date_col,
                score: self.score_col,
                school_year: self.schoolyear_col,
                observer: self.observer_col,
                observee: self.observee_col,
                eval_type: self.etype_col,
            },
            thresholds: Thresholds {
                min_group_n: self.min_type_n,
                min_observer_n: self.min_observer_n,
            },
            layout,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/eval_visuals.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("eval_visuals.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let config = cli.into_config();

    let report = run(&config)?;

    print_pretty(&report);
    if json {
        print_json(&report)?;
    }

    println!(
        "Saved figures in: {}",
        absolute(&config.layout.figures_dir).display()
    );
    println!(
        "Saved summaries in: {}",
        absolute(&config.layout.outputs_dir).display()
    );

    Ok(())
}
