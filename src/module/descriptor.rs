//! Module descriptor parsing and validation.
//!
//! A descriptor is declared in a `module.yml` file:
//!
//! ```yaml
//! name: org.example.app
//! version: 1.2.0
//! requires:
//!   - org.example.lib
//!   - module: org.example.devtools
//!     kind: compile-only
//! ```
//!
//! Requirement edges tagged `optional`, `compile-only`, or `synthetic` do not
//! count towards the required-module set during classification.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{CairnError, Result};

/// Where a module came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Defined by the current project's own sources.
    Declared,
    /// Obtained from a remote source, stored in the external directory.
    External,
    /// Supplied by the host platform; always present, never fetched.
    System,
    /// Origin not known (e.g. an opaque artifact without a descriptor).
    Unknown,
}

/// How a requirement edge participates in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequireKind {
    /// A hard runtime dependency; contributes to the required set.
    #[default]
    Runtime,
    /// Needed only when present; never fetched on its own.
    Optional,
    /// Needed at compile time only.
    CompileOnly,
    /// Added by tooling, not by the module author.
    Synthetic,
}

/// A single declared dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requires {
    /// Name of the required module.
    pub module: String,
    /// Edge classification.
    pub kind: RequireKind,
}

impl Requires {
    /// A plain runtime requirement on the given module.
    pub fn runtime(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            kind: RequireKind::Runtime,
        }
    }
}

/// An immutable description of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Unique module name within a build.
    pub name: String,
    /// Declared version, if any.
    pub version: Option<String>,
    /// Declared dependency edges.
    pub requires: Vec<Requires>,
    /// Origin classification.
    pub origin: Origin,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRequire {
    Name(String),
    Detailed {
        module: String,
        #[serde(default)]
        kind: RequireKind,
    },
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    requires: Vec<RawRequire>,
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)*$")
            .expect("module name pattern is valid")
    })
}

/// Check whether a string is a well-formed module name.
pub fn is_valid_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

impl ModuleDescriptor {
    /// Create a descriptor without requirements (an "automatic" module).
    pub fn automatic(name: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            version: None,
            requires: Vec::new(),
            origin,
        }
    }

    /// Parse a descriptor from YAML text.
    ///
    /// `path` is used for error reporting only.
    pub fn parse(text: &str, origin: Origin, path: &Path) -> Result<Self> {
        let raw: RawDescriptor =
            serde_yaml::from_str(text).map_err(|e| CairnError::InvalidModule {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if !is_valid_name(&raw.name) {
            return Err(CairnError::InvalidModule {
                path: path.to_path_buf(),
                message: format!("invalid module name '{}'", raw.name),
            });
        }

        let mut requires = Vec::with_capacity(raw.requires.len());
        for entry in raw.requires {
            let (module, kind) = match entry {
                RawRequire::Name(module) => (module, RequireKind::Runtime),
                RawRequire::Detailed { module, kind } => (module, kind),
            };
            if !is_valid_name(&module) {
                return Err(CairnError::InvalidModule {
                    path: path.to_path_buf(),
                    message: format!("invalid required module name '{}'", module),
                });
            }
            requires.push(Requires { module, kind });
        }

        Ok(Self {
            name: raw.name,
            version: raw.version,
            requires,
            origin,
        })
    }

    /// Read and parse a descriptor from a `module.yml` file.
    pub fn load(path: &Path, origin: Origin) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, origin, path)
    }

    /// Names of hard runtime requirements, in declaration order.
    pub fn runtime_requires(&self) -> impl Iterator<Item = &str> {
        self.requires
            .iter()
            .filter(|r| r.kind == RequireKind::Runtime)
            .map(|r| r.module.as_str())
    }
}
