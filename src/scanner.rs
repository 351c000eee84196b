use crate::crawler::{self, CrawlStats, MAX_DEPTH, ROOT};
use crate::error::ScanError;
use crate::hosts;
use crate::resume::ResumeStore;
use crate::session::{Credentials, FtpConnector, FtpSession};
use crate::sink::OutputSink;
use crate::types::{HostOutcome, HostReport, RunSummary};
use ::time::{format_description::well_known, OffsetDateTime};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Default number of hosts scanned at once.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Settings shared by every task of a run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory receiving one output file per scanned host.
    pub live_dir: PathBuf,
    /// Read-only directory of "already processed" markers.
    pub old_dir: PathBuf,
    /// Maximum number of hosts in flight.
    pub concurrency: usize,
    pub credentials: Credentials,
    pub max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            live_dir: PathBuf::from("./FTP"),
            old_dir: PathBuf::from("./FTP/old"),
            concurrency: DEFAULT_CONCURRENCY,
            credentials: Credentials::anonymous(),
            max_depth: MAX_DEPTH,
        }
    }
}

/// Live counters, readable while a run is in progress.
#[derive(Clone, Debug, Default)]
pub struct ScanProgress {
    pub in_flight: Arc<AtomicU64>,
    pub peak_in_flight: Arc<AtomicU64>,
    pub done: Arc<AtomicU64>,
    pub scanned: Arc<AtomicU64>,
    pub skipped: Arc<AtomicU64>,
    pub incomplete: Arc<AtomicU64>,
    pub failed: Arc<AtomicU64>,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn end(&self, outcome: &HostOutcome) {
        let counter = match outcome {
            HostOutcome::Scanned { .. } => &self.scanned,
            HostOutcome::Skipped => &self.skipped,
            HostOutcome::Incomplete { .. } => &self.incomplete,
            HostOutcome::Failed { .. } => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.done.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bounded-concurrency sweep over a host list.
///
/// `run` starts `min(concurrency, hosts)` workers. Each worker takes the next host
/// from a shared queue, scans it to completion, and only then takes another, so at
/// most `concurrency` hosts are ever in flight. A host's failure stays in its report.
pub struct Scanner<C> {
    connector: Arc<C>,
    config: Arc<ScanConfig>,
    resume: ResumeStore,
    progress: ScanProgress,
}

impl<C> Clone for Scanner<C> {
    fn clone(&self) -> Self {
        Self {
            connector: self.connector.clone(),
            config: self.config.clone(),
            resume: self.resume.clone(),
            progress: self.progress.clone(),
        }
    }
}

impl<C: FtpConnector> Scanner<C> {
    pub fn new(connector: C, config: ScanConfig) -> Self {
        Self {
            connector: Arc::new(connector),
            resume: ResumeStore::new(config.old_dir.clone()),
            config: Arc::new(config),
            progress: ScanProgress::new(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }

    /// Scan every host and return once all of their tasks have ended.
    pub async fn run(&self, hosts: Vec<String>) -> RunSummary {
        let started_at = now_rfc3339();
        let total = hosts.len();

        if total > 0 {
            if let Err(e) = tokio::fs::create_dir_all(&self.config.live_dir).await {
                error!(
                    "cannot create output directory {}: {e}",
                    self.config.live_dir.display()
                );
            }
        }

        let queue: Arc<Mutex<VecDeque<(usize, String)>>> =
            Arc::new(Mutex::new(hosts.into_iter().enumerate().collect()));
        let workers = self.config.concurrency.max(1).min(total);
        let mut set = JoinSet::new();

        for _ in 0..workers {
            let scanner = self.clone();
            let queue = queue.clone();
            set.spawn(async move {
                let mut reports = Vec::new();
                while let Some((index, host)) = next_host(&queue) {
                    reports.push((index, scanner.scan_host(&host).await));
                }
                reports
            });
        }

        let mut reports = Vec::with_capacity(total);
        while let Some(res) = set.join_next().await {
            match res {
                Ok(batch) => reports.extend(batch),
                Err(e) => error!("scan worker aborted: {e}"),
            }
        }
        reports.sort_by_key(|(index, _)| *index);

        let mut summary = RunSummary::from_reports(reports.into_iter().map(|(_, r)| r).collect());
        summary.peak_in_flight = self.progress.peak_in_flight.load(Ordering::SeqCst);
        summary.started_at = started_at;
        summary.finished_at = now_rfc3339();
        summary
    }

    /// One host's whole task: resume check, then connect, crawl and write output.
    pub async fn scan_host(&self, host: &str) -> HostReport {
        let start = Instant::now();
        self.progress.begin();

        let outcome = match self.try_scan(host).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(host = %host, "scan failed: {e}");
                HostOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        self.progress.end(&outcome);
        HostReport {
            host: host.to_owned(),
            outcome,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn try_scan(&self, host: &str) -> Result<HostOutcome, ScanError> {
        hosts::validate_host(host)?;

        if self.resume.is_done(host).await? {
            info!("Skipping {host} - already processed");
            return Ok(HostOutcome::Skipped);
        }

        let mut sink = OutputSink::create(&self.config.live_dir, host).await?;
        match self.connect_and_crawl(host, &mut sink).await {
            Ok(stats) => {
                sink.finish().await?;
                info!(host = %host, directories = stats.directories, "scan complete");
                Ok(HostOutcome::Scanned {
                    directories: stats.directories,
                })
            }
            Err(e) => {
                warn!(host = %host, "scan not completed: {e}");
                if let Err(sink_err) = sink.fail().await {
                    error!(host = %host, "cannot mark output incomplete: {sink_err}");
                }
                Ok(HostOutcome::Incomplete {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn connect_and_crawl(
        &self,
        host: &str,
        sink: &mut OutputSink,
    ) -> Result<CrawlStats, ScanError> {
        let mut session = self
            .connector
            .connect(host, &self.config.credentials)
            .await?;
        info!("Connected to {host}");

        let result = crawler::crawl(&mut session, sink, ROOT, self.config.max_depth).await;
        session.close().await;
        Ok(result?)
    }
}

fn next_host(queue: &Mutex<VecDeque<(usize, String)>>) -> Option<(usize, String)> {
    queue
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .pop_front()
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
