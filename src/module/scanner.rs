//! Project source scanner.
//!
//! Discovers the project's declared modules: every direct subdirectory of the
//! modules directory carrying a `module.yml` descriptor.

use std::path::Path;

use crate::error::{CairnError, Result};
use crate::module::descriptor::{ModuleDescriptor, Origin};
use crate::module::finder::DirectModuleFinder;

/// Scan a modules directory into a declared-module finder.
///
/// A missing directory yields an empty finder; an unparseable descriptor is
/// an error.
pub fn scan_declared(modules_dir: &Path) -> Result<DirectModuleFinder> {
    if !modules_dir.is_dir() {
        return Ok(DirectModuleFinder::default());
    }

    let mut modules = Vec::new();
    for entry in std::fs::read_dir(modules_dir)? {
        let entry = entry?;
        let descriptor = entry.path().join("module.yml");
        if !descriptor.is_file() {
            continue;
        }
        let module = ModuleDescriptor::load(&descriptor, Origin::Declared)?;
        let dir_name = entry.file_name();
        if dir_name.to_str() != Some(module.name.as_str()) {
            return Err(CairnError::InvalidModule {
                path: descriptor,
                message: format!(
                    "module '{}' must live in a directory of the same name",
                    module.name
                ),
            });
        }
        modules.push(module);
    }
    modules.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(count = modules.len(), "scanned declared modules");
    Ok(DirectModuleFinder::of(modules))
}
