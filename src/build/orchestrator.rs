//! The build orchestrator.
//!
//! Wires configuration into the two engines and sequences a build:
//! dependency resolution first, then the built-in `build` tool (an operator
//! sequencing `compile` and `test` through the runner). The logbook is
//! written even when a fatal error aborts the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::build::operators::SequenceOperator;
use crate::build::steps;
use crate::config::CairnConfig;
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::locate::{
    DirectLocator, GitHubReleasesLocator, LocatorChain, ModuleLocator, RepositoryLocator,
    SharedIndexLocator,
};
use crate::module::{scanner, DirectModuleFinder, ExternalModuleFinder, ModuleFinder, Origin};
use crate::resolve::{ResolutionReport, Resolver};
use crate::tool::{
    CompositeToolFinder, DirectToolFinder, DiscoveredToolFinder, Logbook, Tool, ToolCall,
    ToolRunner,
};

/// Directory for build outputs below the project root.
const OUT_DIR: &str = ".cairn";

/// Sequences Resolution → Compile → Test for one project.
pub struct Orchestrator {
    project_root: PathBuf,
    config: CairnConfig,
}

impl Orchestrator {
    /// Create an orchestrator for a project root and its configuration.
    pub fn new(project_root: impl Into<PathBuf>, config: CairnConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &CairnConfig {
        &self.config
    }

    /// Where the logbook is written at the end of a run.
    pub fn logbook_path(&self) -> PathBuf {
        self.project_root.join(OUT_DIR).join("logbook.md")
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// The external-module finder for this project.
    pub fn external_finder(&self) -> ExternalModuleFinder {
        ExternalModuleFinder::new(self.absolute(&self.config.external_dir), &self.config.extension)
    }

    /// The host-supplied system modules, enumerated once per run.
    pub fn system_finder(&self) -> DirectModuleFinder {
        DirectModuleFinder::of_names(self.config.system_modules.iter().cloned(), Origin::System)
    }

    /// Scan the project's declared modules.
    pub fn scan_declared(&self) -> Result<DirectModuleFinder> {
        scanner::scan_declared(&self.absolute(&self.config.modules_dir))
    }

    /// Assemble the locator chain in configured order: direct table,
    /// repository convention, hosted releases, shared index.
    pub fn locator_chain(&self, fetcher: Arc<dyn Fetcher>) -> Result<LocatorChain> {
        let mut locators: Vec<Box<dyn ModuleLocator>> = Vec::new();

        let mut direct = match &self.config.locators.direct_file {
            Some(file) => DirectLocator::from_properties_file(&self.absolute(file))?,
            None => DirectLocator::default(),
        };
        for (name, uri) in &self.config.locators.direct {
            direct = direct.with(name, uri);
        }
        if !direct.is_empty() {
            locators.push(Box::new(direct));
        }

        if let Some(repository) = &self.config.locators.repository {
            locators.push(Box::new(RepositoryLocator::new(
                &repository.url,
                repository.versions.clone(),
            )));
        }
        if self.config.locators.github_releases {
            locators.push(Box::new(GitHubReleasesLocator::new(Arc::clone(&fetcher))));
        }
        if let Some(index) = &self.config.locators.index {
            locators.push(Box::new(SharedIndexLocator::new(index, fetcher)));
        }

        Ok(LocatorChain::of(locators))
    }

    /// Run the dependency resolution loop for this project.
    pub fn resolve(&self) -> Result<ResolutionReport> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new());
        let resolver = Resolver::new(
            self.locator_chain(Arc::clone(&fetcher))?,
            fetcher,
            self.external_finder(),
        );
        let declared = self.scan_declared()?;
        resolver.resolve_missing(&declared, &self.system_finder())
    }

    /// The composed tool finder: built-in build sequences first, then tools
    /// discovered from the project's tools directory.
    pub fn tool_finder(&self) -> Result<CompositeToolFinder> {
        let declared = self.scan_declared()?.find_all();
        let modules_dir = self.absolute(&self.config.modules_dir);
        let classes_dir = self.project_root.join(OUT_DIR).join("classes");
        let dist_dir = self.project_root.join(OUT_DIR).join("dist");
        let strict = self.config.strict;

        let mut compile_calls = Vec::new();
        let mut test_calls = Vec::new();
        for module in &declared {
            compile_calls.push(steps::compile_call(module, &modules_dir, &classes_dir));
            compile_calls.push(steps::archive_call(
                module,
                &classes_dir,
                &dist_dir,
                &self.config.extension,
            ));
            test_calls.push(steps::test_call(module));
        }

        let builtin = DirectToolFinder::new(
            "built-in sequences",
            vec![
                Tool::of_operator(Arc::new(SequenceOperator::new(
                    "build",
                    vec![ToolCall::of("compile"), ToolCall::of("test")],
                    strict,
                ))),
                Tool::of_operator(Arc::new(SequenceOperator::new(
                    "compile",
                    compile_calls,
                    strict,
                ))),
                // Test runs are independent per module.
                Tool::of_operator(Arc::new(SequenceOperator::parallel(
                    "test", test_calls, strict,
                ))),
            ],
        );
        let discovered = DiscoveredToolFinder::scan(
            &self.absolute(&self.config.tools_dir),
            self.config.assertions,
        )?;

        Ok(CompositeToolFinder::of(vec![
            Arc::new(builtin),
            Arc::new(discovered),
        ]))
    }

    /// A runner over the given finder, honoring the configured timeout.
    pub fn runner(&self, finder: CompositeToolFinder, logbook: Arc<Logbook>) -> ToolRunner {
        let runner = ToolRunner::new(Arc::new(finder), logbook);
        match self.config.tool_timeout {
            Some(seconds) => runner.with_subprocess_timeout(Duration::from_secs(seconds)),
            None => runner,
        }
    }

    /// Run the full build: Resolve → Compile → Test.
    ///
    /// Returns the worst tool exit code observed (0 when everything
    /// succeeded). The logbook is written in every case, including fatal
    /// engine errors.
    pub fn build(&self) -> Result<i32> {
        let logbook = Arc::new(Logbook::new());
        let outcome = self.build_with(&logbook);
        if let Err(error) = logbook.write(&self.logbook_path()) {
            tracing::warn!(%error, "failed to write logbook");
        }
        outcome
    }

    fn build_with(&self, logbook: &Arc<Logbook>) -> Result<i32> {
        let report = self.resolve()?;
        tracing::info!(
            project = %self.config.project,
            iterations = report.iterations,
            resolved = report.resolved.len(),
            "dependencies resolved"
        );

        let runner = self.runner(self.tool_finder()?, Arc::clone(logbook));
        runner.run(&ToolCall::of("build"))?;
        Ok(logbook.worst_code())
    }
}
