use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info, Level};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use gtfs_validator_core::{ValidatorConfig, WriterSink};
use gtfs_validator_report::{write_markdown_report, Orchestrator};

#[derive(Debug, Parser)]
#[command(name = "feedcheck")]
#[command(about = "Validate a GTFS feed and print a markdown report")]
struct Args {
    /// GTFS feed: a .zip archive or an extracted directory
    #[arg(value_name = "FEED")]
    feed: PathBuf,

    /// Suppress progress and report output
    #[arg(long = "silent")]
    silent: bool,

    /// Log internal diagnostics to stderr
    #[arg(long = "verbose", conflicts_with = "silent")]
    verbose: bool,

    #[arg(long = "max-detail-lines", alias = "max_detail_lines", default_value_t = 128)]
    max_detail_lines: usize,

    /// Distance in meters beyond which a stop is reported as away from its shape
    #[arg(
        long = "stop-distance-threshold",
        alias = "stop_distance_threshold",
        default_value_t = 130.0
    )]
    stop_distance_threshold: f64,

    /// Stops closer than this many meters are reported as duplicates
    #[arg(
        long = "duplicate-stop-distance",
        alias = "duplicate_stop_distance",
        default_value_t = 2.0
    )]
    duplicate_stop_distance: f64,

    /// First day of the active calendar listing (YYYY-MM-DD or YYYYMMDD), default today
    #[arg(short = 'd', long = "date", alias = "date-for-validation")]
    date: Option<String>,

    #[arg(long = "calendar-days", alias = "calendar_days", default_value_t = 30)]
    calendar_days: u32,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> anyhow::Result<ValidatorConfig> {
        if self.max_detail_lines == 0 {
            bail!("--max-detail-lines must be at least 1");
        }
        let mut config = ValidatorConfig::default()
            .with_silent(self.silent)
            .with_max_detail_lines(self.max_detail_lines)
            .with_stop_distance_threshold_meters(self.stop_distance_threshold)
            .with_duplicate_stop_distance_meters(self.duplicate_stop_distance)
            .with_active_calendar_days(self.calendar_days);
        if let Some(value) = self.date.as_deref() {
            config = config.with_validation_date(parse_validation_date(value)?);
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args) {
    if args.silent {
        return;
    }
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.config()?;

    match args.output.as_deref() {
        Some(output) => {
            let sink = WriterSink::new(io::stderr(), io::sink());
            let report = Orchestrator::new(config, sink)
                .run(&args.feed)
                .with_context(|| format!("validate {}", args.feed.display()))?;
            write_markdown_report(output, &report)?;
            info!("report written to {}", output.display());
        }
        None => {
            Orchestrator::new(config, WriterSink::stdio())
                .run(&args.feed)
                .with_context(|| format!("validate {}", args.feed.display()))?;
        }
    }
    Ok(())
}

fn parse_validation_date(value: &str) -> anyhow::Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("--date cannot be empty");
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .with_context(|| format!("invalid --date {}", value))
}
