//! The dependency resolution loop.
//!
//! Repeatedly classifies the missing-module set, fetches every missing
//! module through the locator chain, and re-classifies, until the set is
//! empty or detected as non-shrinking. The loop is sequential by nature
//! (each iteration depends on the previous one's outcome) but the fetch step
//! within one iteration fans out over scoped worker threads.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{CairnError, Result};
use crate::fetch::Fetcher;
use crate::locate::LocatorChain;
use crate::module::{classify, ExternalModuleFinder, ModuleFinder};

/// States of the resolution loop.
#[derive(Debug)]
enum ResolutionState {
    Classifying,
    Fetching(BTreeSet<String>),
    Converged,
    Failed(CairnError),
}

/// Outcome of a successful resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Number of fetch iterations performed. Zero when nothing was missing.
    pub iterations: usize,
    /// Every module name fetched during the run.
    pub resolved: BTreeSet<String>,
}

/// Resolves missing modules into the external module directory.
pub struct Resolver {
    chain: LocatorChain,
    fetcher: Arc<dyn Fetcher>,
    external: ExternalModuleFinder,
}

impl Resolver {
    /// Create a resolver fetching through `chain` into `external`.
    pub fn new(chain: LocatorChain, fetcher: Arc<dyn Fetcher>, external: ExternalModuleFinder) -> Self {
        Self {
            chain,
            fetcher,
            external,
        }
    }

    /// The external finder this resolver deposits into.
    pub fn external(&self) -> &ExternalModuleFinder {
        &self.external
    }

    /// Resolve a single module by name.
    ///
    /// A module whose artifact is already indexed locally is a no-op. A name
    /// no locator can answer is fatal.
    pub fn resolve_module(&self, name: &str) -> Result<()> {
        if self.external.find(name).is_some() {
            tracing::debug!(module = name, "already resolved");
            return Ok(());
        }
        let Some(uri) = self.chain.locate(name)? else {
            return Err(CairnError::UnlocatableModule {
                module: name.to_string(),
            });
        };
        let target = self.external.artifact_path(name);
        let bytes = self.fetcher.fetch(&uri, &target)?;
        tracing::info!(module = name, bytes, "resolved");
        Ok(())
    }

    /// Run the resolution loop until convergence or failure.
    ///
    /// Every successful fetch-and-reclassify cycle must strictly shrink the
    /// missing set; a name seen missing twice aborts the loop.
    pub fn resolve_missing(
        &self,
        declared: &dyn ModuleFinder,
        system: &dyn ModuleFinder,
    ) -> Result<ResolutionReport> {
        let mut state = ResolutionState::Classifying;
        let mut seen_missing: BTreeSet<String> = BTreeSet::new();
        let mut resolved: BTreeSet<String> = BTreeSet::new();
        let mut iterations = 0;

        loop {
            state = match state {
                ResolutionState::Classifying => {
                    let classification = classify(
                        &[declared, &self.external],
                        &[declared],
                        system,
                        &self.external,
                    );
                    if classification.is_converged() {
                        ResolutionState::Converged
                    } else {
                        let stuck: Vec<&str> = seen_missing
                            .intersection(&classification.missing)
                            .map(String::as_str)
                            .collect();
                        if stuck.is_empty() {
                            seen_missing.extend(classification.missing.iter().cloned());
                            ResolutionState::Fetching(classification.missing)
                        } else {
                            ResolutionState::Failed(CairnError::NonConvergentResolution {
                                modules: stuck.join(", "),
                            })
                        }
                    }
                }
                ResolutionState::Fetching(missing) => {
                    iterations += 1;
                    tracing::debug!(iteration = iterations, count = missing.len(), "fetching missing modules");
                    match self.fetch_all(&missing) {
                        Ok(()) => {
                            resolved.extend(missing);
                            ResolutionState::Classifying
                        }
                        Err(error) => ResolutionState::Failed(error),
                    }
                }
                ResolutionState::Converged => {
                    tracing::debug!(iterations, resolved = resolved.len(), "resolution converged");
                    return Ok(ResolutionReport {
                        iterations,
                        resolved,
                    });
                }
                ResolutionState::Failed(error) => {
                    tracing::error!(%error, "resolution failed");
                    return Err(error);
                }
            };
        }
    }

    /// Fetch one iteration's batch of missing modules concurrently.
    fn fetch_all(&self, missing: &BTreeSet<String>) -> Result<()> {
        let results: Vec<Result<()>> = std::thread::scope(|scope| {
            let handles: Vec<_> = missing
                .iter()
                .map(|name| scope.spawn(move || self.resolve_module(name)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("fetch worker panicked"))
                .collect()
        });
        results.into_iter().collect()
    }
}
