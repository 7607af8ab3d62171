//! Read-only queryable views over module collections.
//!
//! Finders are composable: a [`CompositeModuleFinder`] aggregates other
//! finders without ever mutating them.

use std::sync::Arc;

use crate::module::descriptor::{ModuleDescriptor, Origin};

/// A read-only view over zero or more modules.
pub trait ModuleFinder: Send + Sync {
    /// Find a module by name.
    fn find(&self, name: &str) -> Option<ModuleDescriptor>;

    /// All modules visible through this finder.
    fn find_all(&self) -> Vec<ModuleDescriptor>;
}

/// A finder over a fixed list of modules.
#[derive(Debug, Clone, Default)]
pub struct DirectModuleFinder {
    modules: Vec<ModuleDescriptor>,
}

impl DirectModuleFinder {
    /// Create a finder over the given modules.
    pub fn of(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }

    /// Create a finder over bare names (modules without requirements).
    pub fn of_names<I, S>(names: I, origin: Origin) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(
            names
                .into_iter()
                .map(|name| ModuleDescriptor::automatic(name, origin))
                .collect(),
        )
    }

    /// Return a new finder with one more module appended.
    pub fn with(&self, module: ModuleDescriptor) -> Self {
        let mut modules = self.modules.clone();
        modules.push(module);
        Self { modules }
    }
}

impl ModuleFinder for DirectModuleFinder {
    fn find(&self, name: &str) -> Option<ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name).cloned()
    }

    fn find_all(&self) -> Vec<ModuleDescriptor> {
        self.modules.clone()
    }
}

/// An ordered union of finders; `find` answers from the first match.
#[derive(Clone, Default)]
pub struct CompositeModuleFinder {
    finders: Vec<Arc<dyn ModuleFinder>>,
}

impl CompositeModuleFinder {
    /// Compose the given finders in order.
    pub fn of(finders: Vec<Arc<dyn ModuleFinder>>) -> Self {
        Self { finders }
    }

    /// Return a new composite with one more finder appended.
    pub fn with(&self, finder: Arc<dyn ModuleFinder>) -> Self {
        let mut finders = self.finders.clone();
        finders.push(finder);
        Self { finders }
    }
}

impl ModuleFinder for CompositeModuleFinder {
    fn find(&self, name: &str) -> Option<ModuleDescriptor> {
        self.finders.iter().find_map(|f| f.find(name))
    }

    fn find_all(&self) -> Vec<ModuleDescriptor> {
        self.finders.iter().flat_map(|f| f.find_all()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::descriptor::Requires;

    fn module(name: &str, requires: &[&str]) -> ModuleDescriptor {
        ModuleDescriptor {
            name: name.into(),
            version: None,
            requires: requires.iter().map(|r| Requires::runtime(*r)).collect(),
            origin: Origin::Declared,
        }
    }

    #[test]
    fn direct_finder_finds_by_name() {
        let finder = DirectModuleFinder::of(vec![module("a", &[]), module("b", &["a"])]);
        assert_eq!(finder.find("a").unwrap().name, "a");
        assert!(finder.find("c").is_none());
        assert_eq!(finder.find_all().len(), 2);
    }

    #[test]
    fn direct_finder_with_returns_new_value() {
        let finder = DirectModuleFinder::of(vec![module("a", &[])]);
        let extended = finder.with(module("b", &[]));
        assert_eq!(finder.find_all().len(), 1);
        assert_eq!(extended.find_all().len(), 2);
    }

    #[test]
    fn of_names_builds_automatic_modules() {
        let finder = DirectModuleFinder::of_names(["sys.base", "sys.logging"], Origin::System);
        let found = finder.find("sys.base").unwrap();
        assert_eq!(found.origin, Origin::System);
        assert!(found.requires.is_empty());
    }

    #[test]
    fn composite_answers_from_first_match() {
        let first = DirectModuleFinder::of(vec![ModuleDescriptor {
            version: Some("1".into()),
            ..module("dup", &[])
        }]);
        let second = DirectModuleFinder::of(vec![ModuleDescriptor {
            version: Some("2".into()),
            ..module("dup", &[])
        }]);
        let composite =
            CompositeModuleFinder::of(vec![Arc::new(first), Arc::new(second)]);
        assert_eq!(composite.find("dup").unwrap().version.as_deref(), Some("1"));
    }

    #[test]
    fn composite_find_all_concatenates() {
        let first = DirectModuleFinder::of(vec![module("a", &[])]);
        let second = DirectModuleFinder::of(vec![module("a", &[]), module("b", &[])]);
        let composite =
            CompositeModuleFinder::of(vec![Arc::new(first), Arc::new(second)]);
        // Duplicates are allowed in find_all; find stays deterministic.
        assert_eq!(composite.find_all().len(), 3);
    }

    #[test]
    fn composite_does_not_mutate_sources() {
        let base = DirectModuleFinder::of(vec![module("a", &[])]);
        let composite = CompositeModuleFinder::default().with(Arc::new(base.clone()));
        let _ = composite.with(Arc::new(DirectModuleFinder::of(vec![module("b", &[])])));
        assert_eq!(base.find_all().len(), 1);
        assert_eq!(composite.find_all().len(), 1);
    }
}
