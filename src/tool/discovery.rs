//! Plugin tool discovery from a tools directory.
//!
//! Every direct subdirectory carrying a `tool.yml` manifest contributes one
//! subprocess-backed tool rooted at that directory:
//!
//! ```yaml
//! name: compiler
//! program: ./bin/compile
//! args: ["--color", "never"]
//! env:
//!   COMPILE_MODE: release
//! ```
//!
//! Each discovered tool runs in its own process with its directory as the
//! working directory, so two roots may carry identically named tools without
//! colliding; finder order decides which one `find` resolves to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CairnError, Result};
use crate::tool::finder::ToolFinder;
use crate::tool::program::ProgramTool;
use crate::tool::provider::Tool;

/// Environment variable set on discovered tools when assertions are enabled.
pub const ASSERTIONS_ENV: &str = "CAIRN_ASSERTIONS";

#[derive(Debug, Deserialize)]
struct Manifest {
    name: String,
    program: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
}

/// A finder over tools discovered from a directory of tool manifests.
pub struct DiscoveredToolFinder {
    label: String,
    tools: Vec<Tool>,
}

impl DiscoveredToolFinder {
    /// Scan a tools directory. A missing directory yields an empty finder;
    /// an unparseable manifest is an error.
    ///
    /// `assertions` is passed through to every discovered tool via
    /// [`ASSERTIONS_ENV`] for debug builds.
    pub fn scan(directory: &Path, assertions: bool) -> Result<Self> {
        let label = format!("tools in {}", directory.display());
        let mut tools = Vec::new();

        if directory.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(directory)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_dir())
                .collect();
            entries.sort();

            for dir in entries {
                let manifest_path = dir.join("tool.yml");
                if !manifest_path.is_file() {
                    continue;
                }
                let text = std::fs::read_to_string(&manifest_path)?;
                let manifest: Manifest =
                    serde_yaml::from_str(&text).map_err(|e| CairnError::ConfigParseError {
                        path: manifest_path.clone(),
                        message: e.to_string(),
                    })?;

                let mut command = vec![manifest.program];
                command.extend(manifest.args);
                let mut program = ProgramTool::new(&manifest.name, command).with_working_dir(&dir);
                for (key, value) in manifest.env {
                    program = program.with_env(key, value);
                }
                if assertions {
                    program = program.with_env(ASSERTIONS_ENV, "1");
                }
                tracing::debug!(tool = %manifest.name, dir = %dir.display(), "discovered tool");
                tools.push(Tool::of_program(program));
            }
        }

        Ok(Self { label, tools })
    }
}

impl ToolFinder for DiscoveredToolFinder {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::provider::ToolKind;
    use std::fs;
    use tempfile::TempDir;

    fn write_tool(root: &Path, dir: &str, manifest: &str) {
        let tool_dir = root.join(dir);
        fs::create_dir_all(&tool_dir).unwrap();
        fs::write(tool_dir.join("tool.yml"), manifest).unwrap();
    }

    #[test]
    fn missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let finder = DiscoveredToolFinder::scan(&temp.path().join("absent"), false).unwrap();
        assert!(finder.find_all().is_empty());
    }

    #[test]
    fn discovers_manifest_tools() {
        let temp = TempDir::new().unwrap();
        write_tool(
            temp.path(),
            "greeter",
            "name: greeter\nprogram: echo\nargs: [hello]\n",
        );
        write_tool(temp.path(), "lister", "name: lister\nprogram: ls\n");
        fs::create_dir_all(temp.path().join("not-a-tool")).unwrap();

        let finder = DiscoveredToolFinder::scan(temp.path(), false).unwrap();

        assert_eq!(finder.find_all().len(), 2);
        let greeter = finder.find("greeter").unwrap();
        match greeter.kind() {
            ToolKind::Program(program) => {
                assert_eq!(program.command(), ["echo", "hello"]);
            }
            _ => panic!("discovered tools are programs"),
        }
    }

    #[test]
    fn assertions_flag_reaches_the_tool_environment() {
        let temp = TempDir::new().unwrap();
        write_tool(
            temp.path(),
            "probe",
            "name: probe\nprogram: sh\nargs: [\"-c\", \"echo assertions=$CAIRN_ASSERTIONS\"]\n",
        );

        let finder = DiscoveredToolFinder::scan(temp.path(), true).unwrap();
        let tool = finder.find("probe").unwrap();
        let ToolKind::Program(program) = tool.kind() else {
            panic!("discovered tools are programs");
        };
        let output = program.run(&[], None).unwrap();
        assert!(output.stdout.contains("assertions=1"));
    }

    #[test]
    fn unparseable_manifest_is_an_error() {
        let temp = TempDir::new().unwrap();
        write_tool(temp.path(), "broken", ": not yaml");

        let result = DiscoveredToolFinder::scan(temp.path(), false);
        assert!(matches!(result, Err(CairnError::ConfigParseError { .. })));
    }

    #[test]
    fn label_names_the_directory() {
        let temp = TempDir::new().unwrap();
        let finder = DiscoveredToolFinder::scan(temp.path(), false).unwrap();
        assert!(finder.label().contains("tools in"));
    }
}
