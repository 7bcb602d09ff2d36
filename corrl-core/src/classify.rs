//! Classification of user-supplied resource strings.
//!
//! `classify(raw, context)` decides whether a `--schema`, `--data` or
//! `--service` value names a remote URL, a local file or a bare `host:port`
//! pair. Rules are checked in a fixed order:
//!
//! 1. in [`ClassifyContext::SocketAllowed`], `host:port` with exactly one
//!    colon and a numeric port is a socket address, so `httpd:8080` is never
//!    read as a URL with scheme `httpd`;
//! 2. anything starting with `http` is a URL (and must parse as one);
//! 3. an existing filesystem entry is a local file;
//! 4. everything else must parse as an absolute URL.
//!
//! The only side effect is the filesystem existence check.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ClassifyError;

/// Where a raw string is being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyContext {
    /// Schema and dataset payloads: a file or a URL.
    UrlOnly,
    /// Service addresses: a URL or a `host:port` pair.
    SocketAllowed,
}

/// A classified resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    RemoteUrl(Url),
    /// Always absolute.
    LocalFile(PathBuf),
    SocketAddress { host: String, port: u16 },
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::RemoteUrl(url) => write!(f, "url {url}"),
            Resource::LocalFile(path) => write!(f, "file {}", path.display()),
            Resource::SocketAddress { host, port } => write!(f, "socket {host}:{port}"),
        }
    }
}

/// Classify `raw` according to the rules in the module docs.
pub fn classify(raw: &str, context: ClassifyContext) -> Result<Resource, ClassifyError> {
    if context == ClassifyContext::SocketAllowed {
        if let Some((host, port)) = split_socket(raw) {
            return Ok(Resource::SocketAddress { host, port });
        }
    }

    if raw.starts_with("http") {
        return parse_url(raw);
    }

    let path = Path::new(raw);
    if path.exists() {
        let absolute = std::path::absolute(path).map_err(|err| invalid(raw, err.to_string()))?;
        return Ok(Resource::LocalFile(absolute));
    }

    parse_url(raw)
}

fn parse_url(raw: &str) -> Result<Resource, ClassifyError> {
    Url::parse(raw)
        .map(Resource::RemoteUrl)
        .map_err(|err| invalid(raw, err.to_string()))
}

/// `host:port` with exactly one colon, a non-empty host and a port that fits
/// in a `u16`.
fn split_socket(raw: &str) -> Option<(String, u16)> {
    let (host, port) = raw.split_once(':')?;
    if host.is_empty() || port.contains(':') {
        return None;
    }
    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let port = port.parse::<u16>().ok()?;
    Some((host.to_string(), port))
}

fn invalid(raw: &str, reason: String) -> ClassifyError {
    ClassifyError::Invalid {
        raw: raw.to_string(),
        reason,
    }
}
