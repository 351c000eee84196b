use crate::error::CrawlError;
use crate::session::FtpSession;
use crate::sink::OutputSink;
use tracing::debug;

/// Where every crawl starts.
pub const ROOT: &str = "/";

/// Levels below the root that are listed: the root listing plus one level of subdirectories.
pub const MAX_DEPTH: usize = 1;

/// Totals for one host's crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub listings: usize,
    pub directories: usize,
}

/// One output line: two spaces per depth level, then the full directory path.
pub fn format_directory_line(parent: &str, name: &str, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let sep = if parent == ROOT { "" } else { "/" };
    format!("{indent}{parent}{sep}{name}")
}

/// Remote path of `name` inside `parent`, always `parent/name`.
///
/// Children of the root therefore read `//name`, and their entries are written as
/// `//name/child`.
pub fn join_path(parent: &str, name: &str) -> String {
    format!("{parent}/{name}")
}

/// Walk the remote tree from `root`, writing directories to `sink` as they are found.
///
/// Each path is listed exactly once. All directories of a listing are written before
/// any of them is descended into, and descent stops at `max_depth`. Files are dropped.
/// The first failed listing aborts the walk; lines already written stay in the sink.
pub async fn crawl<S>(
    session: &mut S,
    sink: &mut OutputSink,
    root: &str,
    max_depth: usize,
) -> Result<CrawlStats, CrawlError>
where
    S: FtpSession + ?Sized,
{
    let mut stats = CrawlStats::default();
    // Depth-first over listings: popping from the back visits children in listing order.
    let mut pending = vec![(root.to_owned(), 0usize)];

    while let Some((path, depth)) = pending.pop() {
        let dirs: Vec<String> = session
            .list(&path)
            .await?
            .into_iter()
            .filter(|entry| entry.is_dir)
            .map(|entry| entry.name)
            .collect();
        stats.listings += 1;
        debug!(path = %path, depth, dirs = dirs.len(), "listing");

        for name in &dirs {
            sink.write_line(&format_directory_line(&path, name, depth))
                .await?;
        }
        sink.flush().await?;
        stats.directories += dirs.len();

        if depth < max_depth {
            pending.extend(
                dirs.iter()
                    .rev()
                    .map(|name| (join_path(&path, name), depth + 1)),
            );
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::DirectoryEntry;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct TreeSession {
        tree: HashMap<String, Vec<DirectoryEntry>>,
        fail_on: Option<String>,
        listed: Vec<String>,
    }

    impl TreeSession {
        fn new() -> Self {
            Self {
                tree: HashMap::new(),
                fail_on: None,
                listed: Vec::new(),
            }
        }

        /// Entries prefixed with `file:` are files, everything else is a directory.
        fn with(mut self, path: &str, names: &[&str]) -> Self {
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
    }

    #[async_trait]
    impl FtpSession for TreeSession {
        async fn list(&mut self, path: &str) -> Result<Vec<DirectoryEntry>, CrawlError> {
            self.listed.push(path.to_owned());
            if self.fail_on.as_deref() == Some(path) {
                return Err(CrawlError::List {
                    path: path.to_owned(),
                    reason: "550 permission denied".into(),
                });
            }
            Ok(self.tree.get(path).cloned().unwrap_or_default())
        }

        async fn close(&mut self) {}
    }

    async fn run(session: &mut TreeSession) -> (Result<CrawlStats, CrawlError>, String) {
        let dir = tempdir().unwrap();
        let mut sink = OutputSink::create(dir.path(), "host").await.unwrap();
        let result = crawl(session, &mut sink, ROOT, MAX_DEPTH).await;
        sink.finish().await.unwrap();
        let text = std::fs::read_to_string(dir.path().join("host")).unwrap();
        (result, text)
    }

    #[test]
    fn line_format() {
        assert_eq!(format_directory_line("/", "pub", 0), "/pub");
        assert_eq!(format_directory_line("//pub", "linux", 1), "  //pub/linux");
        assert_eq!(join_path("/", "pub"), "//pub");
        assert_eq!(join_path("//pub", "linux"), "//pub/linux");
    }

    #[tokio::test]
    async fn siblings_before_children() {
        let mut session = TreeSession::new()
            .with("/", &["pub", "file:README", "incoming"])
            .with("//pub", &["linux", "bsd"])
            .with("//incoming", &["uploads"]);
        let (result, text) = run(&mut session).await;
        let stats = result.unwrap();
        assert_eq!(
            text,
            "/pub\n/incoming\n  //pub/linux\n  //pub/bsd\n  //incoming/uploads\n"
        );
        assert_eq!(stats, CrawlStats { listings: 3, directories: 5 });
        assert_eq!(session.listed, vec!["/", "//pub", "//incoming"]);
    }

    #[tokio::test]
    async fn never_descends_past_max_depth() {
        let mut session = TreeSession::new()
            .with("/", &["a"])
            .with("//a", &["b"])
            .with("//a/b", &["c"])
            .with("//a/b/c", &["d"]);
        let (result, text) = run(&mut session).await;
        result.unwrap();
        assert_eq!(text, "/a\n  //a/b\n");
        assert_eq!(session.listed, vec!["/", "//a"]);
    }

    #[tokio::test]
    async fn empty_root_is_not_an_error() {
        let mut session = TreeSession::new();
        let (result, text) = run(&mut session).await;
        assert_eq!(result.unwrap(), CrawlStats { listings: 1, directories: 0 });
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn failed_listing_aborts_and_keeps_earlier_lines() {
        let mut session = TreeSession::new()
            .with("/", &["a", "b"])
            .with("//b", &["x"]);
        session.fail_on = Some("//a".into());
        let (result, text) = run(&mut session).await;
        assert!(matches!(result, Err(CrawlError::List { .. })));
        assert_eq!(text, "/a\n/b\n");
        assert_eq!(session.listed, vec!["/", "//a"]);
    }
}
