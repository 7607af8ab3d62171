//! Exact name-to-URI table locator.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::locate::{parse_properties, ModuleLocator, Stability};

/// A locator backed by an exact `name → URI` table.
///
/// Entries come from inline configuration and, optionally, from a
/// properties-style `name=uri` file. URIs may carry `#sha256=` fragments.
#[derive(Debug, Clone, Default)]
pub struct DirectLocator {
    entries: BTreeMap<String, String>,
}

impl DirectLocator {
    /// Create a locator over the given table.
    pub fn of(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Parse a locator from properties-style `name=uri` text.
    pub fn from_properties(text: &str) -> Self {
        Self::of(parse_properties(text))
    }

    /// Load a locator from a properties file on disk.
    pub fn from_properties_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_properties(&text))
    }

    /// Return a new locator with one more entry.
    pub fn with(&self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(name.into(), uri.into());
        Self { entries }
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ModuleLocator for DirectLocator {
    fn name(&self) -> &str {
        "direct"
    }

    fn stability(&self) -> Stability {
        Stability::Stable
    }

    fn locate(&self, module: &str) -> Result<Option<String>> {
        Ok(self.entries.get(module).cloned())
    }
}
