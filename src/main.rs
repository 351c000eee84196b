use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use ftp_sweep::crawler::MAX_DEPTH;
use ftp_sweep::hosts;
use ftp_sweep::scanner::{ScanConfig, Scanner, DEFAULT_CONCURRENCY};
use ftp_sweep::session::{AnonymousFtp, Credentials};
use ftp_sweep::types::{HostOutcome, RunSummary};

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// ftp-sweep — snapshot the top two levels of anonymous FTP servers, one file per host.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ftp-sweep",
    version,
    about = "Snapshot the top two directory levels of anonymous FTP servers, one file per host.",
    long_about = None
)]
struct Cli {
    /// Path to the host list (one IP or hostname per line).
    hosts_file: Option<PathBuf>,

    /// Directory that receives one output file per scanned host.
    #[arg(long = "live-dir", default_value = "./FTP")]
    live_dir: PathBuf,

    /// Directory of markers for hosts finished in earlier runs; never written.
    #[arg(long = "old-dir", default_value = "./FTP/old")]
    old_dir: PathBuf,

    /// Max hosts scanned at once.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Timeout in milliseconds for connect, login and each directory listing.
    #[arg(long = "timeout-ms", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Write the run summary as pretty JSON to this path (optional).
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Log every listing.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(hosts_file) = cli.hosts_file.as_deref() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    setup_logging(cli.verbose);

    let hosts = match hosts::load_hosts_from_path(hosts_file) {
        Ok(hosts) => hosts,
        Err(e) => {
            error!("{e}");
            return Ok(());
        }
    };

    info!(
        hosts = hosts.len(),
        concurrency = cli.concurrency,
        live_dir = %cli.live_dir.display(),
        old_dir = %cli.old_dir.display(),
        "starting sweep"
    );

    let config = ScanConfig {
        live_dir: cli.live_dir.clone(),
        old_dir: cli.old_dir.clone(),
        concurrency: cli.concurrency.max(1),
        credentials: Credentials::anonymous(),
        max_depth: MAX_DEPTH,
    };
    let connector = AnonymousFtp::new(Duration::from_millis(cli.timeout_ms));
    let summary = Scanner::new(connector, config).run(hosts).await;

    print_summary_table(&summary);
    if let Some(path) = cli.summary.as_deref() {
        if let Err(e) = write_summary_json(path, &summary) {
            error!("Failed to write JSON to {}: {e}", path.display());
        } else {
            info!("Wrote run summary to {}", path.display());
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("ftp_sweep=debug,warn")
        } else {
            EnvFilter::new("ftp_sweep=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary_table(summary: &RunSummary) {
    let host_w = summary
        .hosts
        .iter()
        .map(|r| r.host.len())
        .max()
        .unwrap_or(0)
        .max("host".len());
    let status_w = "incomplete".len();

    println!(
        "\nHosts: {} (scanned: {}, skipped: {}, incomplete: {}, failed: {}, peak in flight: {})",
        summary.total,
        summary.scanned,
        summary.skipped,
        summary.incomplete,
        summary.failed,
        summary.peak_in_flight
    );
    if summary.hosts.is_empty() {
        return;
    }
    println!("{:<host_w$}  {:<status_w$}  detail", "host", "status");
    println!("{:-<host_w$}  {:-<status_w$}  {:-<6}", "", "", "");
    for r in &summary.hosts {
        let (status, detail) = match &r.outcome {
            HostOutcome::Scanned { directories } => ("scanned", format!("{directories} dirs")),
            HostOutcome::Skipped => ("skipped", String::new()),
            HostOutcome::Incomplete { reason } => ("incomplete", reason.clone()),
            HostOutcome::Failed { reason } => ("failed", reason.clone()),
        };
        println!("{:<host_w$}  {:<status_w$}  {detail}", r.host, status);
    }
}

fn write_summary_json(path: &std::path::Path, summary: &RunSummary) -> anyhow::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}
