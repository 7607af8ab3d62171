//! Project configuration loading and validation.
//!
//! A project is configured by a `cairn.yml` file at its root:
//!
//! ```yaml
//! project: demo
//! modules_dir: modules
//! external_dir: .cairn/external
//! system_modules: [sys.base]
//! strict: true
//! locators:
//!   direct:
//!     org.example.lib: https://example.com/lib.jar
//!   repository:
//!     url: https://repo.example.com/artifacts
//!     versions:
//!       org.example.widget: 2.1.0
//!   github_releases: true
//!   index: https://example.com/modules.properties
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CairnError, Result};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "cairn.yml";

/// Repository-convention locator configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Base URL of the artifact repository.
    pub url: String,
    /// Pinned version per module name.
    #[serde(default)]
    pub versions: std::collections::BTreeMap<String, String>,
}

/// Locator chain configuration; order of strategies is fixed, presence is
/// caller-controlled.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LocatorConfig {
    /// Exact name→URI entries, tried first.
    #[serde(default)]
    pub direct: std::collections::BTreeMap<String, String>,
    /// Optional properties file (`name=uri` lines) merged into the direct
    /// table; inline entries win.
    #[serde(default)]
    pub direct_file: Option<PathBuf>,
    /// Convention-based repository mapping.
    #[serde(default)]
    pub repository: Option<RepositoryConfig>,
    /// Probe hosted releases for `com.github.*` modules.
    #[serde(default)]
    pub github_releases: bool,
    /// URL of a curated shared `name=uri` index, tried last.
    #[serde(default)]
    pub index: Option<String>,
}

/// The `cairn.yml` schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CairnConfig {
    /// Project name, used in build summaries.
    pub project: String,

    /// Directory of declared module sources.
    #[serde(default = "default_modules_dir")]
    pub modules_dir: PathBuf,

    /// Directory external module artifacts are fetched into.
    #[serde(default = "default_external_dir")]
    pub external_dir: PathBuf,

    /// Artifact file extension in the external directory.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Modules supplied by the host platform, never fetched.
    #[serde(default)]
    pub system_modules: Vec<String>,

    /// Directory of discoverable tool manifests.
    #[serde(default = "default_tools_dir")]
    pub tools_dir: PathBuf,

    /// Pass the assertions flag to discovered tools.
    #[serde(default)]
    pub assertions: bool,

    /// Abort a build sequence at the first failing tool.
    #[serde(default)]
    pub strict: bool,

    /// Kill subprocess tools after this many seconds.
    #[serde(default)]
    pub tool_timeout: Option<u64>,

    /// Locator chain configuration.
    #[serde(default)]
    pub locators: LocatorConfig,
}

fn default_modules_dir() -> PathBuf {
    PathBuf::from("modules")
}

fn default_external_dir() -> PathBuf {
    PathBuf::from(".cairn/external")
}

fn default_extension() -> String {
    "jar".to_string()
}

fn default_tools_dir() -> PathBuf {
    PathBuf::from(".cairn/tools")
}

impl Default for CairnConfig {
    fn default() -> Self {
        Self {
            project: "unnamed".to_string(),
            modules_dir: default_modules_dir(),
            external_dir: default_external_dir(),
            extension: default_extension(),
            system_modules: Vec::new(),
            tools_dir: default_tools_dir(),
            assertions: false,
            strict: false,
            tool_timeout: None,
            locators: LocatorConfig::default(),
        }
    }
}

impl CairnConfig {
    /// Parse and validate configuration text.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let config: CairnConfig =
            serde_yaml::from_str(text).map_err(|e| CairnError::ConfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `cairn.yml` from the project root.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.is_file() {
            return Err(CairnError::ConfigNotFound { path });
        }
        let text = std::fs::read_to_string(&path)?;
        Self::parse(&text, &path)
    }

    /// Load `cairn.yml`, falling back to defaults when absent.
    pub fn load_or_default(project_root: &Path) -> Result<Self> {
        match Self::load(project_root) {
            Ok(config) => Ok(config),
            Err(CairnError::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(error) => Err(error),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(CairnError::ConfigValidationError {
                message: "project name must not be empty".into(),
            });
        }
        if self.extension.trim().is_empty() || self.extension.contains('.') {
            return Err(CairnError::ConfigValidationError {
                message: format!("invalid artifact extension '{}'", self.extension),
            });
        }
        if let Some(repository) = &self.locators.repository {
            if repository.url.trim().is_empty() {
                return Err(CairnError::ConfigValidationError {
                    message: "locators.repository.url must not be empty".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_minimal_config() {
        let config = CairnConfig::parse("project: demo", Path::new("cairn.yml")).unwrap();
        assert_eq!(config.project, "demo");
        assert_eq!(config.modules_dir, PathBuf::from("modules"));
        assert_eq!(config.extension, "jar");
        assert!(!config.strict);
        assert!(config.locators.direct.is_empty());
    }

    #[test]
    fn parses_locator_config() {
        let config = CairnConfig::parse(
            r#"
project: demo
locators:
  direct:
    org.example.lib: https://example.com/lib.jar
  repository:
    url: https://repo.example.com/artifacts
    versions:
      org.example.widget: "2.1.0"
  github_releases: true
  index: https://example.com/modules.properties
"#,
            Path::new("cairn.yml"),
        )
        .unwrap();

        assert_eq!(config.locators.direct.len(), 1);
        assert!(config.locators.github_releases);
        assert!(config.locators.index.is_some());
        let repository = config.locators.repository.unwrap();
        assert_eq!(repository.versions.len(), 1);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = CairnConfig::parse("project: demo\nmystery: true", Path::new("cairn.yml"));
        assert!(matches!(result, Err(CairnError::ConfigParseError { .. })));
    }

    #[test]
    fn rejects_empty_project_name() {
        let result = CairnConfig::parse("project: \"  \"", Path::new("cairn.yml"));
        assert!(matches!(result, Err(CairnError::ConfigValidationError { .. })));
    }

    #[test]
    fn rejects_dotted_extension() {
        let result = CairnConfig::parse(
            "project: demo\nextension: .jar",
            Path::new("cairn.yml"),
        );
        assert!(matches!(result, Err(CairnError::ConfigValidationError { .. })));
    }

    #[test]
    fn load_reports_missing_config() {
        let temp = TempDir::new().unwrap();
        let result = CairnConfig::load(temp.path());
        assert!(matches!(result, Err(CairnError::ConfigNotFound { .. })));
    }

    #[test]
    fn load_or_default_falls_back() {
        let temp = TempDir::new().unwrap();
        let config = CairnConfig::load_or_default(temp.path()).unwrap();
        assert_eq!(config.project, "unnamed");
    }

    #[test]
    fn load_reads_project_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "project: loaded\nstrict: true\n").unwrap();
        let config = CairnConfig::load(temp.path()).unwrap();
        assert_eq!(config.project, "loaded");
        assert!(config.strict);
    }
}
