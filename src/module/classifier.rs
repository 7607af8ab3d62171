//! Module-set classification.
//!
//! Computes the `required` and `missing` name sets for one resolution
//! iteration. Pure set arithmetic over finders: no side effects, safe to call
//! repeatedly.

use std::collections::BTreeSet;

use crate::module::finder::ModuleFinder;

/// The outcome of one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Every hard runtime dependency name declared by the required-producing
    /// finders.
    pub required: BTreeSet<String>,
    /// Required names not resolvable via declared, system, or external
    /// finders. Always a subset of `required`.
    pub missing: BTreeSet<String>,
}

impl Classification {
    /// True when nothing is missing (the terminal condition).
    pub fn is_converged(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Classify the module sets for one iteration.
///
/// `required_finders` produce the modules whose dependency edges make up the
/// required set (the project's declared modules plus whatever already sits in
/// the external directory, since external artifacts declare further
/// dependencies of their own). `declared_finders`, `system`, and `external`
/// determine which required names are already resolvable.
pub fn classify(
    required_finders: &[&dyn ModuleFinder],
    declared_finders: &[&dyn ModuleFinder],
    system: &dyn ModuleFinder,
    external: &dyn ModuleFinder,
) -> Classification {
    let mut required = BTreeSet::new();
    for finder in required_finders {
        for module in finder.find_all() {
            for name in module.runtime_requires() {
                required.insert(name.to_string());
            }
        }
    }

    let mut resolvable = BTreeSet::new();
    for finder in declared_finders {
        for module in finder.find_all() {
            resolvable.insert(module.name);
        }
    }
    for module in system.find_all() {
        resolvable.insert(module.name);
    }
    for module in external.find_all() {
        resolvable.insert(module.name);
    }

    let missing = required
        .iter()
        .filter(|name| !resolvable.contains(*name))
        .cloned()
        .collect();

    Classification { required, missing }
}
