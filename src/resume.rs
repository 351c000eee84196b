use crate::error::ResumeCheckError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read-only view over the directory of "already processed" markers.
///
/// A marker is any filesystem entry named after the host. Its content is never read
/// and this crate never writes the store; promotion into it happens elsewhere.
#[derive(Debug, Clone)]
pub struct ResumeStore {
    dir: PathBuf,
}

impl ResumeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn marker_path(&self, host: &str) -> PathBuf {
        self.dir.join(host)
    }

    /// `Ok(true)` when a marker exists, `Ok(false)` only when it is absent.
    ///
    /// Any other failure (permissions, a file where the store directory should be, ...)
    /// is returned as an error so the caller neither re-scans nor skips blindly.
    pub async fn is_done(&self, host: &str) -> Result<bool, ResumeCheckError> {
        let path = self.marker_path(host);
        match tokio::fs::symlink_metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ResumeCheckError {
                host: host.to_owned(),
                path,
                source,
            }),
        }
    }
}
