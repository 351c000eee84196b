//! Error taxonomy for a sweep run.
//!
//! Only [`LoadError`] is fatal to a run. Everything else is contained inside
//! the task of the host that produced it and ends up in that host's report.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The host list could not be read.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read host list {}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The "old" marker store could not answer for a host for a reason other than absence.
#[derive(Error, Debug)]
#[error("cannot determine resume state for {host} ({}): {source}", .path.display())]
pub struct ResumeCheckError {
    pub host: String,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Opening an anonymous session failed.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("connection to {host} timed out after {}ms", .after.as_millis())]
    Timeout { host: String, after: Duration },

    #[error("cannot reach {host}: {reason}")]
    Unreachable { host: String, reason: String },

    #[error("{host} rejected anonymous login: {reason}")]
    LoginRejected { host: String, reason: String },
}

/// The per-host output file could not be created or written.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("cannot create output file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write output file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A directory traversal stopped before covering the tree.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("listing {path} failed: {reason}")]
    List { path: String, reason: String },

    #[error("listing {path} timed out after {}ms", .after.as_millis())]
    Timeout { path: String, after: Duration },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Anything that can end a single host's task early.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid host identifier {0:?}")]
    InvalidHost(String),

    #[error(transparent)]
    Resume(#[from] ResumeCheckError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
