//! Command dispatch.
//!
//! Maps parsed CLI commands onto the orchestrator and the execution engine.
//! The process exit code is the worst tool result code observed, or 1 on a
//! fatal engine error.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::CommandFactory;
use console::style;

use crate::build::Orchestrator;
use crate::cli::args::{BuildArgs, Cli, Commands, CompletionsArgs, ResolveArgs, RunArgs, ToolsArgs};
use crate::config::CairnConfig;
use crate::error::Result;
use crate::tool::{Logbook, ToolCall, ToolFinder};

/// Dispatches parsed commands for one project root.
pub struct CommandDispatcher {
    project_root: PathBuf,
    quiet: bool,
}

impl CommandDispatcher {
    /// Create a dispatcher rooted at the given project directory.
    pub fn new(project_root: PathBuf, quiet: bool) -> Self {
        Self {
            project_root,
            quiet,
        }
    }

    /// Dispatch a parsed command, returning the process exit code.
    pub fn dispatch(&self, cli: &Cli) -> Result<i32> {
        match &cli.command {
            Some(Commands::Build(args)) => self.build(args),
            None => self.build(&BuildArgs::default()),
            Some(Commands::Resolve(args)) => self.resolve(args),
            Some(Commands::Run(args)) => self.run_tool(args),
            Some(Commands::Tools(args)) => self.list_tools(args),
            Some(Commands::Completions(args)) => self.completions(args),
        }
    }

    fn say(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }

    fn build(&self, args: &BuildArgs) -> Result<i32> {
        let mut config = CairnConfig::load(&self.project_root)?;
        config.strict |= args.strict;
        let orchestrator = Orchestrator::new(&self.project_root, config);

        let code = orchestrator.build()?;
        if code == 0 {
            self.say(&format!("{}", style("Build succeeded").green().bold()));
        } else {
            self.say(&format!(
                "{} (worst exit code {code})",
                style("Build failed").red().bold()
            ));
        }
        self.say(&format!(
            "Logbook written to {}",
            orchestrator.logbook_path().display()
        ));
        Ok(code)
    }

    fn resolve(&self, _args: &ResolveArgs) -> Result<i32> {
        let config = CairnConfig::load(&self.project_root)?;
        let orchestrator = Orchestrator::new(&self.project_root, config);

        let report = orchestrator.resolve()?;
        if report.resolved.is_empty() {
            self.say("Nothing to resolve");
        } else {
            self.say(&format!(
                "Resolved {} module(s) in {} iteration(s): {}",
                report.resolved.len(),
                report.iterations,
                report.resolved.iter().cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        Ok(0)
    }

    fn run_tool(&self, args: &RunArgs) -> Result<i32> {
        let config = CairnConfig::load_or_default(&self.project_root)?;
        let orchestrator = Orchestrator::new(&self.project_root, config);

        let logbook = Arc::new(Logbook::new());
        let runner = orchestrator.runner(orchestrator.tool_finder()?, Arc::clone(&logbook));
        let call = ToolCall::of(&args.tool).with_args(args.args.iter().cloned());

        let result = runner.run(&call);
        if let Err(error) = logbook.write(&orchestrator.logbook_path()) {
            tracing::warn!(%error, "failed to write logbook");
        }
        let result = result?;
        if !result.output.is_empty() {
            print!("{}", result.output);
        }
        if !result.errors.is_empty() {
            eprint!("{}", result.errors);
        }
        let _ = std::io::stdout().flush();
        Ok(result.code)
    }

    fn list_tools(&self, _args: &ToolsArgs) -> Result<i32> {
        let config = CairnConfig::load_or_default(&self.project_root)?;
        let orchestrator = Orchestrator::new(&self.project_root, config);

        let composite = orchestrator.tool_finder()?;
        for finder in composite.finders() {
            println!("{}", style(finder.label()).bold());
            let mut tools = finder.find_all();
            tools.sort_by(|a, b| a.name().cmp(b.name()));
            if tools.is_empty() {
                println!("  (none)");
            }
            for tool in tools {
                println!("  {}", tool.name());
            }
        }
        Ok(0)
    }

    fn completions(&self, args: &CompletionsArgs) -> Result<i32> {
        let mut command = Cli::command();
        clap_complete::generate(args.shell, &mut command, "cairn", &mut std::io::stdout());
        Ok(0)
    }
}
