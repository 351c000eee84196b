//! In-memory FTP servers for driving the scanner without a network.
#![allow(dead_code)]

use async_trait::async_trait;
use ftp_sweep::error::{ConnectError, CrawlError};
use ftp_sweep::listing::DirectoryEntry;
use ftp_sweep::session::{Credentials, FtpConnector, FtpSession};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct MockServer {
    tree: HashMap<String, Vec<DirectoryEntry>>,
    fail_on: Option<String>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names prefixed with `file:` are files, everything else is a directory.
    pub fn dir(mut self, path: &str, names: &[&str]) -> Self {
        let entries = names
            .iter()
            .map(|n| match n.strip_prefix("file:") {
                Some(f) => DirectoryEntry::file(path, f),
                None => DirectoryEntry::dir(path, *n),
            })
            .collect();
        self.tree.insert(path.to_owned(), entries);
        self
    }

    pub fn fail_listing(mut self, path: &str) -> Self {
        self.fail_on = Some(path.to_owned());
        self
    }
}

#[derive(Debug, Default)]
struct Shared {
    connects: Mutex<Vec<String>>,
    listed: Mutex<Vec<(String, String)>>,
    open: AtomicUsize,
    peak_open: AtomicUsize,
}

/// Connector whose hosts are either unreachable or serve a fixed tree.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    servers: Arc<HashMap<String, MockServer>>,
    latency: Duration,
    shared: Arc<Shared>,
}

impl MockConnector {
    pub fn new(servers: Vec<(&str, MockServer)>) -> Self {
        Self {
            servers: Arc::new(
                servers
                    .into_iter()
                    .map(|(h, s)| (h.to_owned(), s))
                    .collect(),
            ),
            latency: Duration::ZERO,
            shared: Arc::default(),
        }
    }

    /// Delay applied to every connect and listing, to keep sessions overlapping.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn connects(&self) -> Vec<String> {
        self.shared.connects.lock().unwrap().clone()
    }

    pub fn listed(&self, host: &str) -> Vec<String> {
        self.shared
            .listed
            .lock()
            .unwrap()
            .iter()
            .filter(|(h, _)| h == host)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn open_sessions(&self) -> usize {
        self.shared.open.load(Ordering::SeqCst)
    }

    pub fn peak_open_sessions(&self) -> usize {
        self.shared.peak_open.load(Ordering::SeqCst)
    }
}

pub struct MockSession {
    host: String,
    server: MockServer,
    latency: Duration,
    shared: Arc<Shared>,
}

#[async_trait]
impl FtpConnector for MockConnector {
    type Session = MockSession;

    async fn connect(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<MockSession, ConnectError> {
        assert_eq!(credentials.user, "anonymous");
        self.shared.connects.lock().unwrap().push(host.to_owned());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let server = self
            .servers
            .get(host)
            .cloned()
            .ok_or_else(|| ConnectError::Unreachable {
                host: host.to_owned(),
                reason: "connection refused".into(),
            })?;
        let now = self.shared.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.peak_open.fetch_max(now, Ordering::SeqCst);
        Ok(MockSession {
            host: host.to_owned(),
            server,
            latency: self.latency,
            shared: self.shared.clone(),
        })
    }
}

#[async_trait]
impl FtpSession for MockSession {
    async fn list(&mut self, path: &str) -> Result<Vec<DirectoryEntry>, CrawlError> {
        self.shared
            .listed
            .lock()
            .unwrap()
            .push((self.host.clone(), path.to_owned()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.server.fail_on.as_deref() == Some(path) {
            return Err(CrawlError::List {
                path: path.to_owned(),
                reason: "421 service not available".into(),
            });
        }
        Ok(self.server.tree.get(path).cloned().unwrap_or_default())
    }

    async fn close(&mut self) {
        self.shared.open.fetch_sub(1, Ordering::SeqCst);
    }
}
