//! Composable, queryable collections of tools.
//!
//! Mirrors the module-finder composition pattern: direct (fixed list),
//! discovered (see [`crate::tool::discovery`]), and composite (ordered
//! union, first match by name).

use std::sync::Arc;

use crate::tool::provider::Tool;

/// A read-only queryable view over zero or more tools.
pub trait ToolFinder: Send + Sync {
    /// Human-readable origin label, shown by the `tools` listing.
    fn label(&self) -> &str;

    /// Find a tool by name.
    fn find(&self, name: &str) -> Option<Tool>;

    /// All tools visible through this finder.
    fn find_all(&self) -> Vec<Tool>;
}

/// A finder over a fixed, caller-supplied list of tools.
#[derive(Clone)]
pub struct DirectToolFinder {
    label: String,
    tools: Vec<Tool>,
}

impl DirectToolFinder {
    /// Create a finder over the given tools.
    pub fn new(label: impl Into<String>, tools: Vec<Tool>) -> Self {
        Self {
            label: label.into(),
            tools,
        }
    }
}

impl ToolFinder for DirectToolFinder {
    fn label(&self) -> &str {
        &self.label
    }

    fn find(&self, name: &str) -> Option<Tool> {
        self.tools.iter().find(|tool| tool.name() == name).cloned()
    }

    fn find_all(&self) -> Vec<Tool> {
        self.tools.clone()
    }
}

/// An ordered union of finders.
///
/// `find` scans finders in registration order and returns the first match;
/// `find_all` concatenates, so duplicate names may coexist in the listing
/// while lookup stays deterministic.
#[derive(Clone, Default)]
pub struct CompositeToolFinder {
    finders: Vec<Arc<dyn ToolFinder>>,
}

impl CompositeToolFinder {
    /// Compose the given finders in order.
    pub fn of(finders: Vec<Arc<dyn ToolFinder>>) -> Self {
        Self { finders }
    }

    /// Return a new composite with one more finder appended.
    pub fn with(&self, finder: Arc<dyn ToolFinder>) -> Self {
        let mut finders = self.finders.clone();
        finders.push(finder);
        Self { finders }
    }

    /// The constituent finders, in registration order.
    pub fn finders(&self) -> &[Arc<dyn ToolFinder>] {
        &self.finders
    }
}

impl ToolFinder for CompositeToolFinder {
    fn label(&self) -> &str {
        "composite"
    }

    fn find(&self, name: &str) -> Option<Tool> {
        self.finders.iter().find_map(|finder| finder.find(name))
    }

    fn find_all(&self) -> Vec<Tool> {
        self.finders
            .iter()
            .flat_map(|finder| finder.find_all())
            .collect()
    }
}
