use crate::error::{LoadError, ScanError};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Port used when a host line carries none.
pub const DEFAULT_FTP_PORT: u16 = 21;

/// Parse host-list content into the ordered list of hosts to sweep.
///
/// One host per line. Surrounding whitespace is trimmed and blank lines are
/// dropped. There is no comment syntax, and duplicates are kept in place.
pub fn parse_hosts_str(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Load a host list from a file path. Errors if the file cannot be read.
pub fn load_hosts_from_path(path: impl AsRef<Path>) -> Result<Vec<String>, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_hosts_str(&content))
}

/// Reject identifiers that cannot safely name a file in the output and marker stores.
pub fn validate_host(host: &str) -> Result<(), ScanError> {
    let bad = host.is_empty()
        || host == "."
        || host == ".."
        || host.contains(['/', '\\', '\0']);
    if bad {
        return Err(ScanError::InvalidHost(host.to_owned()));
    }
    Ok(())
}

/// Address string to dial for a host, filling in port 21 when none is given.
///
/// Accepts bare IPv4/IPv6 literals, `ip:port`, `[v6]:port`, `name` and `name:port`.
pub fn connect_target(host: &str) -> String {
    if let Ok(addr) = host.parse::<SocketAddr>() {
        return addr.to_string();
    }
    if let Ok(ip) = host.parse::<IpAddr>() {
        return SocketAddr::new(ip, DEFAULT_FTP_PORT).to_string();
    }
    match host.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => host.to_owned(),
        _ => format!("{host}:{DEFAULT_FTP_PORT}"),
    }
}
