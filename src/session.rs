//! The FTP session seam.
//!
//! The scheduler and crawler only see [`FtpConnector`] and [`FtpSession`]; the wire
//! protocol lives in the `suppaftp` tokio client behind [`AnonymousFtp`].

use crate::error::{ConnectError, CrawlError};
use crate::hosts;
use crate::listing::{self, DirectoryEntry};
use async_trait::async_trait;
use std::time::Duration;
use suppaftp::tokio::AsyncFtpStream as TokioFtpStream;
use tokio::time;
use tracing::debug;

/// Login identity sent to every server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self {
            user: "anonymous".into(),
            password: "anonymous@".into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// An open, logged-in control connection.
#[async_trait]
pub trait FtpSession: Send {
    /// List `path`, returning files and directories in server order.
    async fn list(&mut self, path: &str) -> Result<Vec<DirectoryEntry>, CrawlError>;

    /// Say goodbye. Failures here are not interesting to the caller.
    async fn close(&mut self);
}

/// Opens sessions to hosts. One connector is shared by every worker.
#[async_trait]
pub trait FtpConnector: Send + Sync + 'static {
    type Session: FtpSession;

    async fn connect(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<Self::Session, ConnectError>;
}

/// Plain (unencrypted) FTP client with a per-operation timeout.
#[derive(Debug, Clone)]
pub struct AnonymousFtp {
    timeout: Duration,
}

impl AnonymousFtp {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn quit_quietly(&self, stream: &mut TokioFtpStream) {
        let _ = time::timeout(self.timeout, stream.quit()).await;
    }
}

pub struct AsyncFtpSession {
    host: String,
    stream: TokioFtpStream,
    timeout: Duration,
}

#[async_trait]
impl FtpConnector for AnonymousFtp {
    type Session = AsyncFtpSession;

    async fn connect(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<AsyncFtpSession, ConnectError> {
        let target = hosts::connect_target(host);
        let mut stream = match time::timeout(self.timeout, TokioFtpStream::connect(target.as_str())).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ConnectError::Unreachable {
                    host: host.to_owned(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ConnectError::Timeout {
                    host: host.to_owned(),
                    after: self.timeout,
                })
            }
        };

        let login = time::timeout(
            self.timeout,
            stream.login(&credentials.user, &credentials.password),
        )
        .await;
        match login {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.quit_quietly(&mut stream).await;
                return Err(ConnectError::LoginRejected {
                    host: host.to_owned(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                self.quit_quietly(&mut stream).await;
                return Err(ConnectError::Timeout {
                    host: host.to_owned(),
                    after: self.timeout,
                });
            }
        }

        Ok(AsyncFtpSession {
            host: host.to_owned(),
            stream,
            timeout: self.timeout,
        })
    }
}

#[async_trait]
impl FtpSession for AsyncFtpSession {
    async fn list(&mut self, path: &str) -> Result<Vec<DirectoryEntry>, CrawlError> {
        let lines = time::timeout(self.timeout, self.stream.list(Some(path)))
            .await
            .map_err(|_| CrawlError::Timeout {
                path: path.to_owned(),
                after: self.timeout,
            })?
            .map_err(|e| CrawlError::List {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        debug!(host = %self.host, path, raw_lines = lines.len(), "listed");
        Ok(listing::parse_listing(path, &lines))
    }

    async fn close(&mut self) {
        match time::timeout(self.timeout, self.stream.quit()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(host = %self.host, "QUIT failed: {e}"),
            Err(_) => debug!(host = %self.host, "QUIT timed out"),
        }
    }
}
