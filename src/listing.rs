//! Directory entries as the crawler sees them.
//!
//! Classification of raw `LIST` lines (POSIX and DOS layouts) is left to
//! `suppaftp::list::File`; lines it cannot parse are ignored.

use std::str::FromStr;
use suppaftp::list::File;

/// One entry from a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub parent: String,
    pub is_dir: bool,
}

impl DirectoryEntry {
    pub fn new(parent: impl Into<String>, name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            is_dir,
        }
    }

    pub fn dir(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(parent, name, true)
    }

    pub fn file(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(parent, name, false)
    }
}

/// Parse every line of a listing of `parent`, keeping server order.
pub fn parse_listing<S: AsRef<str>>(parent: &str, lines: &[S]) -> Vec<DirectoryEntry> {
    lines
        .iter()
        .filter_map(|line| parse_line(parent, line.as_ref()))
        .collect()
}

/// Parse a single listing line. `None` for headers, `.`/`..` and unparseable lines.
pub fn parse_line(parent: &str, line: &str) -> Option<DirectoryEntry> {
    let file = File::from_str(line.trim_end_matches(['\r', '\n'])).ok()?;
    let name = file.name();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(DirectoryEntry::new(parent, name, file.is_directory()))
}
