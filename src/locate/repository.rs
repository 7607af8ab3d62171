//! Convention-based remote-artifact locator.
//!
//! Derives a canonical artifact coordinate from the module name: every
//! segment but the last forms the group path, the last segment is the
//! artifact, and the version comes from a configured per-module table.
//! Modules suffixed `.natives` resolve to a platform-variant artifact whose
//! classifier is computed once per process from the host OS and architecture.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::Result;
use crate::locate::{ModuleLocator, Stability};

const NATIVES_SUFFIX: &str = ".natives";

/// The OS/architecture classifier for native-artifact variants.
///
/// Computed once and treated as constant for the run.
pub fn natives_classifier() -> &'static str {
    static CLASSIFIER: OnceLock<String> = OnceLock::new();
    CLASSIFIER.get_or_init(|| {
        let os = match std::env::consts::OS {
            "macos" => "macos",
            "windows" => "windows",
            _ => "linux",
        };
        format!("natives-{}-{}", os, std::env::consts::ARCH)
    })
}

/// A locator formatting deterministic repository URLs from module names.
#[derive(Debug, Clone)]
pub struct RepositoryLocator {
    repository: String,
    versions: BTreeMap<String, String>,
}

impl RepositoryLocator {
    /// Create a locator for the given repository base URL and version table.
    pub fn new(repository: impl Into<String>, versions: BTreeMap<String, String>) -> Self {
        let mut repository = repository.into();
        while repository.ends_with('/') {
            repository.pop();
        }
        Self {
            repository,
            versions,
        }
    }

    fn version_for(&self, module: &str, base: &str) -> Option<&str> {
        self.versions
            .get(module)
            .or_else(|| self.versions.get(base))
            .map(String::as_str)
    }
}

impl ModuleLocator for RepositoryLocator {
    fn name(&self) -> &str {
        "repository"
    }

    fn stability(&self) -> Stability {
        // Versions are pinned by configuration, so the derived URL is
        // deterministic for the whole run.
        Stability::Stable
    }

    fn locate(&self, module: &str) -> Result<Option<String>> {
        let natives = module.ends_with(NATIVES_SUFFIX);
        let base = if natives {
            &module[..module.len() - NATIVES_SUFFIX.len()]
        } else {
            module
        };

        let segments: Vec<&str> = base.split('.').collect();
        if segments.len() < 2 {
            return Ok(None);
        }
        let Some(version) = self.version_for(module, base) else {
            return Ok(None);
        };

        let group = segments[..segments.len() - 1].join("/");
        let artifact = segments[segments.len() - 1];
        let file = if natives {
            format!("{artifact}-{version}-{}.jar", natives_classifier())
        } else {
            format!("{artifact}-{version}.jar")
        };
        Ok(Some(format!(
            "{}/{group}/{artifact}/{version}/{file}",
            self.repository
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(entries: &[(&str, &str)]) -> RepositoryLocator {
        RepositoryLocator::new(
            "https://repo.example.com/artifacts/",
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn formats_deterministic_url() {
        let locator = locator(&[("org.example.widget", "2.1.0")]);
        assert_eq!(
            locator.locate("org.example.widget").unwrap().as_deref(),
            Some("https://repo.example.com/artifacts/org/example/widget/2.1.0/widget-2.1.0.jar")
        );
    }

    #[test]
    fn unknown_version_is_a_miss() {
        let locator = locator(&[]);
        assert!(locator.locate("org.example.widget").unwrap().is_none());
    }

    #[test]
    fn single_segment_name_is_a_miss() {
        let locator = locator(&[("widget", "1.0")]);
        assert!(locator.locate("widget").unwrap().is_none());
    }

    #[test]
    fn natives_variant_appends_classifier() {
        let locator = locator(&[("org.example.widget", "2.1.0")]);
        let uri = locator
            .locate("org.example.widget.natives")
            .unwrap()
            .unwrap();
        assert!(uri.contains(&format!("widget-2.1.0-{}.jar", natives_classifier())));
    }

    #[test]
    fn classifier_is_constant_for_the_process() {
        assert_eq!(natives_classifier(), natives_classifier());
        assert!(natives_classifier().starts_with("natives-"));
    }

    #[test]
    fn is_stable() {
        assert_eq!(locator(&[]).stability(), Stability::Stable);
    }
}
