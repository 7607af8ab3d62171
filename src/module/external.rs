//! Finder over the external module directory.
//!
//! The external directory is the durable record of what has been resolved:
//! one `<name>.<extension>` artifact per module. Artifacts that are Cairn
//! bundles contribute their declared dependencies to transitive expansion;
//! anything else is indexed as an automatic module. Zero-byte artifacts are
//! never valid modules.

use std::path::{Path, PathBuf};

use crate::module::bundle;
use crate::module::descriptor::{is_valid_name, ModuleDescriptor, Origin};
use crate::module::finder::ModuleFinder;

/// A finder over `<directory>/<name>.<extension>` artifacts.
#[derive(Debug, Clone)]
pub struct ExternalModuleFinder {
    directory: PathBuf,
    extension: String,
}

impl ExternalModuleFinder {
    /// Create a finder for the given directory and artifact extension.
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
        }
    }

    /// The directory this finder scans.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The artifact file name for a module name.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", name, self.extension))
    }

    fn index(&self, name: &str, artifact: &Path) -> Option<ModuleDescriptor> {
        let metadata = std::fs::metadata(artifact).ok()?;
        if metadata.len() == 0 {
            tracing::warn!(module = name, "ignoring zero-byte artifact");
            return None;
        }
        match bundle::read_descriptor_text(artifact) {
            Ok(Some(text)) => {
                match ModuleDescriptor::parse(&text, Origin::External, artifact) {
                    Ok(module) if module.name == name => Some(module),
                    Ok(module) => {
                        tracing::warn!(
                            module = name,
                            declared = %module.name,
                            "artifact declares a different module name, treating as automatic"
                        );
                        Some(ModuleDescriptor::automatic(name, Origin::External))
                    }
                    Err(error) => {
                        tracing::warn!(
                            module = name,
                            %error,
                            "unparseable bundle descriptor, treating as automatic"
                        );
                        Some(ModuleDescriptor::automatic(name, Origin::External))
                    }
                }
            }
            Ok(None) => Some(ModuleDescriptor::automatic(name, Origin::External)),
            Err(_) => None,
        }
    }
}

impl ModuleFinder for ExternalModuleFinder {
    fn find(&self, name: &str) -> Option<ModuleDescriptor> {
        let artifact = self.artifact_path(name);
        if !artifact.is_file() {
            return None;
        }
        self.index(name, &artifact)
    }

    fn find_all(&self) -> Vec<ModuleDescriptor> {
        let Ok(entries) = std::fs::read_dir(&self.directory) else {
            return Vec::new();
        };
        let mut modules = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let matches_extension = path
                .extension()
                .is_some_and(|ext| ext == self.extension.as_str());
            if !matches_extension {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_name(stem) {
                continue;
            }
            if let Some(module) = self.index(stem, &path) {
                modules.push(module);
            }
        }
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        modules
    }
}
