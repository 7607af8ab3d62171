//! Tool traits and the discovered [`Tool`] value.
//!
//! A tool is either a *provider* (runs synchronously, returns an exit code)
//! or an *operator* (a provider that is additionally handed a live reference
//! to the runner, so it can issue further tool calls before returning its own
//! status). Subprocess-backed tools are a third kind produced by discovery.

use std::io::Write;
use std::sync::Arc;

use crate::error::Result;
use crate::tool::program::ProgramTool;
use crate::tool::runner::ToolRunner;

/// A synchronously invokable tool.
///
/// Implementations write to the supplied sinks and return an exit code; a
/// returned error is reported as a crash, uniformly with a panic. In-process
/// invocations run to completion; there is no cancellation primitive.
pub trait ToolProvider: Send + Sync {
    /// The tool's name.
    fn name(&self) -> &str;

    /// Run with the given arguments, writing to the supplied sinks.
    fn run(&self, out: &mut dyn Write, err: &mut dyn Write, args: &[String]) -> Result<i32>;
}

/// A tool that composes other tools through the runner handle it is given.
///
/// The runner is passed explicitly, never retrieved from global state;
/// nested calls are ordinary logbook entries of their own.
pub trait ToolOperator: Send + Sync {
    /// The tool's name.
    fn name(&self) -> &str;

    /// Run with a live handle to the runner executing this call.
    fn run(
        &self,
        runner: &ToolRunner,
        out: &mut dyn Write,
        err: &mut dyn Write,
        args: &[String],
    ) -> Result<i32>;
}

/// How a discovered tool is invoked.
#[derive(Clone)]
pub enum ToolKind {
    /// In-process provider.
    Provider(Arc<dyn ToolProvider>),
    /// In-process operator holding a runner handle during its run.
    Operator(Arc<dyn ToolOperator>),
    /// Subprocess-backed program.
    Program(ProgramTool),
}

/// A named, invokable unit as produced by a finder.
#[derive(Clone)]
pub struct Tool {
    name: String,
    kind: ToolKind,
}

impl Tool {
    /// Wrap a provider; the tool takes the provider's name.
    pub fn of_provider(provider: Arc<dyn ToolProvider>) -> Self {
        Self {
            name: provider.name().to_string(),
            kind: ToolKind::Provider(provider),
        }
    }

    /// Wrap an operator; the tool takes the operator's name.
    pub fn of_operator(operator: Arc<dyn ToolOperator>) -> Self {
        Self {
            name: operator.name().to_string(),
            kind: ToolKind::Operator(operator),
        }
    }

    /// Wrap a subprocess program.
    pub fn of_program(program: ProgramTool) -> Self {
        Self {
            name: program.name().to_string(),
            kind: ToolKind::Program(program),
        }
    }

    /// The tool's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How this tool is invoked.
    pub fn kind(&self) -> &ToolKind {
        &self.kind
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            ToolKind::Provider(_) => "provider",
            ToolKind::Operator(_) => "operator",
            ToolKind::Program(_) => "program",
        };
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}
