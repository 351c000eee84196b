use serde::{Deserialize, Serialize};

/// How a single host's task ended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostOutcome {
    /// Crawl finished; the output file carries no trailer.
    Scanned { directories: usize },
    /// A marker for the host already exists in the old store; nothing was touched.
    Skipped,
    /// Connect or crawl failed after the output file was opened; the file ends with the marker.
    Incomplete { reason: String },
    /// The task ended before producing usable output (bad identifier, resume check, sink).
    Failed { reason: String },
}

/// One host's entry in the run summary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    pub host: String,
    #[serde(flatten)]
    pub outcome: HostOutcome,
    pub elapsed_ms: u64,
}

/// Aggregate counters and per-host reports for one run.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunSummary {
    pub total: u64,
    pub scanned: u64,
    pub skipped: u64,
    pub incomplete: u64,
    pub failed: u64,
    pub peak_in_flight: u64,
    pub started_at: String,
    pub finished_at: String,
    pub hosts: Vec<HostReport>,
}

impl RunSummary {
    /// Tally `hosts`, which are kept in the given order.
    pub fn from_reports(hosts: Vec<HostReport>) -> Self {
        let mut summary = RunSummary {
            total: hosts.len() as u64,
            ..Default::default()
        };
        for report in &hosts {
            match report.outcome {
                HostOutcome::Scanned { .. } => summary.scanned += 1,
                HostOutcome::Skipped => summary.skipped += 1,
                HostOutcome::Incomplete { .. } => summary.incomplete += 1,
                HostOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary.hosts = hosts;
        summary
    }
}
