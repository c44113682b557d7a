//! CLI entry point for the AirDNA regional performance report.
//!
//! Provides subcommands for downloading a month's export from S3, analyzing a
//! local export into the quarterly report, and doing both in one run.

use airdna_report::analyzers::analyzer::{AnalysisOptions, analyze_performance};
use airdna_report::analyzers::periods::YearQuarter;
use airdna_report::analyzers::report::QuarterSummary;
use airdna_report::fetch::{fetch_export, locate_export_files};
use airdna_report::infra::{ReportConfig, S3ObjectStore, load_aws_config};
use airdna_report::output::write_report;
use airdna_report::parser::read_performance_file;
use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "airdna_report")]
#[command(about = "Regional occupancy, ADR and RevPAR report from AirDNA exports", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the P_YM export from S3 into the data directory
    Download,
    /// Build the report from a downloaded export
    Analyze(AnalyzeArgs),
    /// Download the export, then build the report
    Run(AnalyzeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Year-quarter to report on (e.g., "2024.Q2"); defaults to YQ from config
    #[arg(long)]
    yq: Option<String>,

    /// Monthly performance CSV; defaults to the 'monthly' file of the P_YM export
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Report file to write; defaults to OUTPUT_PATH or the data directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text encoding of the report (e.g., "cp949", "utf-8", "utf-8-sig")
    #[arg(short, long)]
    encoding: Option<String>,

    /// Emit every quarter of the window instead of only the prior-year quarter
    #[arg(long, default_value_t = false)]
    all_quarters: bool,
}

/// Installs the process-wide subscriber: colored stderr plus a JSON rolling log file.
///
/// The returned guard must stay alive for the file writer to flush.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/airdna_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("airdna_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

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
        .try_init()?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let _log_guard = init_tracing()?;

    let cli = Cli::parse();
    let config = ReportConfig::load(&cli.config)?;
    config.log_summary();

    let started = Instant::now();
    match cli.command {
        Commands::Download => {
            download(&config).await?;
        }
        Commands::Analyze(args) => {
            let yq = config.report_quarter(args.yq.as_deref())?;
            analyze(&config, &args, yq)?;
        }
        Commands::Run(args) => {
            let yq = config.report_quarter(args.yq.as_deref())?;
            download(&config).await?;
            analyze(&config, &args, yq)?;
        }
    }

    info!(elapsed = ?started.elapsed(), "Finished");
    Ok(())
}

/// Fetches the configured export month from S3.
#[tracing::instrument(skip(config), fields(bucket = %config.bucket_name))]
async fn download(config: &ReportConfig) -> Result<Vec<PathBuf>> {
    if config.bucket_name.is_empty() {
        bail!("BUCKET_NAME must be set to download exports");
    }

    let sdk_config = load_aws_config(config.credentials(), config.aws_region.as_deref()).await;
    let store = S3ObjectStore::new(&sdk_config, config.bucket_name.clone());

    let prefix = config.object_prefix()?;
    let dest = config.export_dir()?;
    info!(prefix = %prefix, dest = %dest.display(), "Starting export download");

    fetch_export(&store, &prefix, &dest).await
}

/// Reads the export, runs the pipeline and writes the report.
#[tracing::instrument(skip_all, fields(yq = %yq))]
fn analyze(config: &ReportConfig, args: &AnalyzeArgs, yq: YearQuarter) -> Result<PathBuf> {
    let yq = yq.to_string();

    let input = match &args.input {
        Some(path) => path.clone(),
        None => locate_export_files(&config.export_dir()?)?.monthly,
    };
    let records = read_performance_file(&input)?;

    let options = AnalysisOptions {
        regions: config.regions(),
        summary: if args.all_quarters || config.report_all_quarters {
            QuarterSummary::All
        } else {
            QuarterSummary::PriorYear
        },
    };
    let report = analyze_performance(&records, &yq, &options)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_path_for(&yq));
    let encoding = args.encoding.as_deref().unwrap_or(&config.encoding);
    write_report(&output, &report, encoding)?;

    info!(path = %output.display(), encoding, rows = report.rows.len(), "Report written");
    Ok(output)
}
