//! Hosted-release probe locator.
//!
//! Handles module names of the shape `com.github.<owner>.<repo>[...]`: asks
//! the release-listing endpoint for the latest tag, then checks whether that
//! tag's assets contain `<module>@<tag>.jar`. Falls back through a fixed list
//! of well-known pre-release tags before giving up.
//!
//! This locator is `Dynamic`: "latest" may change between calls, so its
//! answers are never memoized across resolution iterations.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::locate::{ModuleLocator, Stability};

const FALLBACK_TAGS: [&str; 4] = ["early-access", "ea", "latest", "snapshot"];

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    #[serde(default)]
    browser_download_url: Option<String>,
}

/// Locates modules attached as release assets of a hosted repository.
pub struct GitHubReleasesLocator {
    fetcher: Arc<dyn Fetcher>,
    api_base: String,
    download_base: String,
}

impl GitHubReleasesLocator {
    /// Create a locator probing the public endpoints.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_endpoints(fetcher, "https://api.github.com", "https://github.com")
    }

    /// Create a locator with custom endpoints (used by tests).
    pub fn with_endpoints(
        fetcher: Arc<dyn Fetcher>,
        api_base: impl Into<String>,
        download_base: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            api_base: api_base.into(),
            download_base: download_base.into(),
        }
    }

    fn release(&self, owner: &str, repo: &str, probe: &str) -> Option<Release> {
        let uri = format!("{}/repos/{}/{}/releases/{}", self.api_base, owner, repo, probe);
        let text = match self.fetcher.read_text(&uri) {
            Ok(text) => text,
            Err(error) => {
                tracing::debug!(%uri, %error, "release probe missed");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(release) => Some(release),
            Err(error) => {
                tracing::debug!(%uri, %error, "unparseable release listing");
                None
            }
        }
    }

    fn asset_uri(&self, owner: &str, repo: &str, module: &str, release: &Release) -> Option<String> {
        let file = format!("{}@{}.jar", module, release.tag_name);
        let asset = release.assets.iter().find(|a| a.name == file)?;
        Some(asset.browser_download_url.clone().unwrap_or_else(|| {
            format!(
                "{}/{}/{}/releases/download/{}/{}",
                self.download_base, owner, repo, release.tag_name, file
            )
        }))
    }
}

impl ModuleLocator for GitHubReleasesLocator {
    fn name(&self) -> &str {
        "github-releases"
    }

    fn stability(&self) -> Stability {
        Stability::Dynamic
    }

    fn locate(&self, module: &str) -> Result<Option<String>> {
        if !module.starts_with("com.github.") {
            return Ok(None);
        }
        let segments: Vec<&str> = module.split('.').collect();
        if segments.len() < 4 {
            return Ok(None);
        }
        let (owner, repo) = (segments[2], segments[3]);

        if let Some(release) = self.release(owner, repo, "latest") {
            if let Some(uri) = self.asset_uri(owner, repo, module, &release) {
                return Ok(Some(uri));
            }
        }
        for tag in FALLBACK_TAGS {
            let probe = format!("tags/{tag}");
            if let Some(release) = self.release(owner, repo, &probe) {
                if let Some(uri) = self.asset_uri(owner, repo, module, &release) {
                    return Ok(Some(uri));
                }
            }
        }
        Ok(None)
    }
}
