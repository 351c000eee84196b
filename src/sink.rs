use crate::error::SinkError;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Trailer appended when a scan did not run to completion.
pub const INCOMPLETE_MARKER: &str = "\n------NOT COMPLETED------\n";

/// Append-only output file for one host, living under the live directory.
///
/// `finish` and `fail` take the sink by value, so the file is released exactly once
/// whichever way the scan ends.
#[derive(Debug)]
pub struct OutputSink {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
}

impl OutputSink {
    /// Create (or truncate) `<dir>/<host>` and hold it open for appending.
    pub async fn create(dir: &Path, host: &str) -> Result<Self, SinkError> {
        let path = dir.join(host);
        let file = File::create(&path)
            .await
            .map_err(|source| SinkError::Create {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub async fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        self.write_raw(line.as_bytes()).await?;
        self.write_raw(b"\n").await?;
        self.lines += 1;
        Ok(())
    }

    /// Push buffered lines to disk so an interrupted run still leaves them behind.
    pub async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await.map_err(|source| SinkError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Successful end of a scan: no trailer, just release the file.
    pub async fn finish(mut self) -> Result<(), SinkError> {
        self.flush().await
    }

    /// Failed end of a scan: append [`INCOMPLETE_MARKER`], then release the file.
    pub async fn fail(mut self) -> Result<(), SinkError> {
        self.write_raw(INCOMPLETE_MARKER.as_bytes()).await?;
        self.flush().await
    }

    async fn write_raw(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.writer
            .write_all(bytes)
            .await
            .map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
