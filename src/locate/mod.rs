//! Module locators: pluggable strategies mapping a module name to a remote
//! source location.
//!
//! A locator is a named, pure lookup tagged with a [`Stability`]: `Stable`
//! answers never change for a given name and may be memoized across
//! resolution iterations, `Dynamic` answers may change between calls (e.g.
//! "latest release") and must be re-queried every time.
//!
//! [`LocatorChain`] composes locators in caller-controlled order; the first
//! non-empty result wins.

pub mod direct;
pub mod index;
pub mod releases;
pub mod repository;

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::error::Result;

pub use direct::DirectLocator;
pub use index::SharedIndexLocator;
pub use releases::GitHubReleasesLocator;
pub use repository::RepositoryLocator;

/// Whether a locator's answer for a given name may change between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// The same module name always yields the same location.
    Stable,
    /// The location may change across resolution runs.
    Dynamic,
}

/// A strategy mapping a module name to a remote source location.
pub trait ModuleLocator: Send + Sync {
    /// Short name used in trace output.
    fn name(&self) -> &str;

    /// Cache-validity classification of this locator's answers.
    fn stability(&self) -> Stability;

    /// Locate the module, returning a URI string on a hit.
    ///
    /// An `Err` means this locator's own lookup failed (e.g. a network
    /// error); the chain treats that as a miss and continues.
    fn locate(&self, module: &str) -> Result<Option<String>>;
}

/// An ordered list of locators; first match wins.
pub struct LocatorChain {
    locators: Vec<Box<dyn ModuleLocator>>,
    memo: Mutex<HashMap<String, Option<String>>>,
}

impl LocatorChain {
    /// Compose the given locators in order. Order is significant.
    pub fn of(locators: Vec<Box<dyn ModuleLocator>>) -> Self {
        Self {
            locators,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Number of locators in the chain.
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// True when the chain has no locators.
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Try each locator in order, returning the first present result.
    ///
    /// Results are memoized across calls only where stability allows it: a
    /// hit is cached when the answering locator and every locator tried
    /// before it are `Stable`; a miss is cached only when the whole chain is
    /// `Stable`.
    pub fn locate(&self, module: &str) -> Result<Option<String>> {
        if let Some(answer) = self.memo.lock().expect("locator memo lock").get(module) {
            tracing::debug!(module, "locator chain answered from memo");
            return Ok(answer.clone());
        }

        let mut prefix_stable = true;
        for locator in &self.locators {
            match locator.locate(module) {
                Ok(Some(uri)) => {
                    tracing::debug!(module, locator = locator.name(), %uri, "module located");
                    if prefix_stable && locator.stability() == Stability::Stable {
                        self.memo
                            .lock()
                            .expect("locator memo lock")
                            .insert(module.to_string(), Some(uri.clone()));
                    }
                    return Ok(Some(uri));
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        module,
                        locator = locator.name(),
                        %error,
                        "locator lookup failed, trying next"
                    );
                    prefix_stable = false;
                    continue;
                }
            }
            prefix_stable &= locator.stability() == Stability::Stable;
        }

        if prefix_stable {
            self.memo
                .lock()
                .expect("locator memo lock")
                .insert(module.to_string(), None);
        }
        Ok(None)
    }
}

/// Parse `name=uri` properties-style lines into a sorted map.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, uri)) = line.split_once('=') {
            map.insert(name.trim().to_string(), uri.trim().to_string());
        }
    }
    map
}
