//! Remote resource fetching.
//!
//! The resolution engine treats fetching as a black box: fetch bytes for a
//! URI into a target path, or read a URI as text. [`HttpFetcher`] implements
//! both over HTTP/HTTPS and local `file://` or bare-path URIs.
//!
//! Locator URIs may carry a `#sha256=<hex>` fragment; fetched bytes are
//! verified against it before the target file is persisted. Writes are
//! temp-file-then-rename so a partially written artifact is never observed
//! as complete.

use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::error::{CairnError, Result};

/// Fetches remote resources for the resolution engine.
pub trait Fetcher: Send + Sync {
    /// Fetch the resource at `uri` into `target`, returning bytes written.
    fn fetch(&self, uri: &str, target: &Path) -> Result<u64>;

    /// Read the resource at `uri` as text.
    fn read_text(&self, uri: &str) -> Result<String>;
}

/// A URI split into its resource part and optional checksum fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri<'a> {
    /// The URI without its fragment.
    pub resource: &'a str,
    /// Expected SHA-256 digest in lowercase hex, if the fragment carries one.
    pub sha256: Option<&'a str>,
}

/// Split a `#sha256=<hex>` fragment off a URI.
pub fn parse_uri(uri: &str) -> ParsedUri<'_> {
    match uri.split_once('#') {
        Some((resource, fragment)) => {
            let sha256 = fragment
                .split('&')
                .find_map(|pair| pair.strip_prefix("sha256="));
            ParsedUri { resource, sha256 }
        }
        None => ParsedUri {
            resource: uri,
            sha256: None,
        },
    }
}

/// Fetches resources over HTTP/HTTPS and from the local filesystem.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher with the default 30-second timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .user_agent("cairn")
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            timeout,
        }
    }

    /// The configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn read_bytes(&self, resource: &str) -> Result<Vec<u8>> {
        if let Some(path) = local_path(resource) {
            return std::fs::read(path).map_err(|e| CairnError::FetchFailure {
                uri: resource.to_string(),
                message: e.to_string(),
            });
        }
        let response =
            self.client
                .get(resource)
                .send()
                .map_err(|e| CairnError::FetchFailure {
                    uri: resource.to_string(),
                    message: e.to_string(),
                })?;
        if !response.status().is_success() {
            return Err(CairnError::FetchFailure {
                uri: resource.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }
        let bytes = response.bytes().map_err(|e| CairnError::FetchFailure {
            uri: resource.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, uri: &str, target: &Path) -> Result<u64> {
        let parsed = parse_uri(uri);
        let bytes = self.read_bytes(parsed.resource)?;

        if bytes.is_empty() {
            return Err(CairnError::FetchFailure {
                uri: uri.to_string(),
                message: "empty artifact".into(),
            });
        }
        if let Some(expected) = parsed.sha256 {
            let actual = hex::encode(Sha256::digest(&bytes));
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(CairnError::FetchFailure {
                    uri: uri.to_string(),
                    message: format!("checksum mismatch: expected {expected}, got {actual}"),
                });
            }
        }

        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        std::io::Write::write_all(&mut temp, &bytes)?;
        temp.persist(target).map_err(|e| CairnError::FetchFailure {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(uri, target = %target.display(), bytes = bytes.len(), "fetched");
        Ok(bytes.len() as u64)
    }

    fn read_text(&self, uri: &str) -> Result<String> {
        let parsed = parse_uri(uri);
        let bytes = self.read_bytes(parsed.resource)?;
        String::from_utf8(bytes).map_err(|e| CairnError::FetchFailure {
            uri: uri.to_string(),
            message: e.to_string(),
        })
    }
}

/// Treat `file://` URIs and bare paths as local files.
fn local_path(resource: &str) -> Option<&Path> {
    if let Some(stripped) = resource.strip_prefix("file://") {
        return Some(Path::new(stripped));
    }
    if resource.starts_with("http://") || resource.starts_with("https://") {
        return None;
    }
    Some(Path::new(resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn parse_uri_without_fragment() {
        let parsed = parse_uri("https://example.com/lib.jar");
        assert_eq!(parsed.resource, "https://example.com/lib.jar");
        assert!(parsed.sha256.is_none());
    }

    #[test]
    fn parse_uri_with_checksum_fragment() {
        let parsed = parse_uri("https://example.com/lib.jar#sha256=abc123");
        assert_eq!(parsed.resource, "https://example.com/lib.jar");
        assert_eq!(parsed.sha256, Some("abc123"));
    }

    #[test]
    fn parse_uri_with_multiple_fragment_pairs() {
        let parsed = parse_uri("https://example.com/lib.jar#size=42&sha256=abc123");
        assert_eq!(parsed.sha256, Some("abc123"));
    }

    #[test]
    fn default_timeout_is_30_seconds() {
        let fetcher = HttpFetcher::new();
        assert_eq!(fetcher.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn fetches_local_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.jar");
        std::fs::write(&source, b"artifact bytes").unwrap();
        let target = temp.path().join("external").join("lib.jar");

        let written = HttpFetcher::new()
            .fetch(source.to_str().unwrap(), &target)
            .unwrap();

        assert_eq!(written, 14);
        assert_eq!(std::fs::read(&target).unwrap(), b"artifact bytes");
    }

    #[test]
    fn fetches_file_uri() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.jar");
        std::fs::write(&source, b"bytes").unwrap();
        let target = temp.path().join("lib.jar");
        let uri = format!("file://{}", source.display());

        HttpFetcher::new().fetch(&uri, &target).unwrap();
        assert!(target.is_file());
    }

    #[test]
    fn rejects_empty_artifact() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("empty.jar");
        std::fs::write(&source, b"").unwrap();
        let target = temp.path().join("lib.jar");

        let result = HttpFetcher::new().fetch(source.to_str().unwrap(), &target);

        assert!(matches!(result, Err(CairnError::FetchFailure { .. })));
        assert!(!target.exists());
    }

    #[test]
    fn verifies_matching_checksum() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.jar");
        std::fs::write(&source, b"bytes").unwrap();
        let digest = hex::encode(Sha256::digest(b"bytes"));
        let uri = format!("{}#sha256={}", source.display(), digest);
        let target = temp.path().join("lib.jar");

        HttpFetcher::new().fetch(&uri, &target).unwrap();
        assert!(target.is_file());
    }

    #[test]
    fn rejects_checksum_mismatch_without_leaving_target() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.jar");
        std::fs::write(&source, b"bytes").unwrap();
        let uri = format!("{}#sha256={}", source.display(), "0".repeat(64));
        let target = temp.path().join("lib.jar");

        let result = HttpFetcher::new().fetch(&uri, &target);

        assert!(matches!(result, Err(CairnError::FetchFailure { .. })));
        assert!(!target.exists());
    }

    #[test]
    fn fetches_over_http() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/lib.jar");
            then.status(200).body("remote artifact");
        });
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("lib.jar");

        let written = HttpFetcher::new()
            .fetch(&server.url("/lib.jar"), &target)
            .unwrap();

        assert_eq!(written, 15);
        assert_eq!(std::fs::read(&target).unwrap(), b"remote artifact");
    }

    #[test]
    fn http_error_status_is_a_fetch_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/absent.jar");
            then.status(404);
        });
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("lib.jar");

        let result = HttpFetcher::new().fetch(&server.url("/absent.jar"), &target);

        assert!(matches!(result, Err(CairnError::FetchFailure { .. })));
    }

    #[test]
    fn reads_text_over_http() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/index.properties");
            then.status(200).body("lib=https://example.com/lib.jar\n");
        });

        let text = HttpFetcher::new()
            .read_text(&server.url("/index.properties"))
            .unwrap();

        assert!(text.contains("lib="));
    }
}
