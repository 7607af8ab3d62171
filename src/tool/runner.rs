//! The tool execution engine.
//!
//! Resolves a [`ToolCall`]'s name through the active finder and executes the
//! tool — in-process for providers and operators, as a subprocess for
//! programs — capturing output, exit status, and timing into a
//! [`ToolResult`] appended to the logbook.
//!
//! The engine never fails a call because the tool reported a non-zero exit
//! code; whether that aborts anything is the caller's decision. An invocation
//! that panics or returns an error is wrapped into a result carrying
//! [`CRASH_CODE`] so crashes are reported uniformly with ordinary failures.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{CairnError, Result};
use crate::tool::call::ToolCall;
use crate::tool::finder::ToolFinder;
use crate::tool::logbook::Logbook;
use crate::tool::provider::{Tool, ToolKind};
use crate::tool::result::{ToolResult, CRASH_CODE};

/// Executes tool calls against a finder, recording results in a logbook.
pub struct ToolRunner {
    finder: Arc<dyn ToolFinder>,
    logbook: Arc<Logbook>,
    subprocess_timeout: Option<Duration>,
}

impl ToolRunner {
    /// Create a runner over the given finder and logbook.
    pub fn new(finder: Arc<dyn ToolFinder>, logbook: Arc<Logbook>) -> Self {
        Self {
            finder,
            logbook,
            subprocess_timeout: None,
        }
    }

    /// Return a runner that kills subprocess tools after `timeout`.
    pub fn with_subprocess_timeout(mut self, timeout: Duration) -> Self {
        self.subprocess_timeout = Some(timeout);
        self
    }

    /// The active finder.
    pub fn finder(&self) -> &Arc<dyn ToolFinder> {
        &self.finder
    }

    /// The logbook results accumulate into.
    pub fn logbook(&self) -> &Logbook {
        &self.logbook
    }

    /// Run one tool call.
    ///
    /// Fails fast with [`CairnError::ToolNotFound`] when no finder knows the
    /// name; every other outcome, including crashes, is a `ToolResult`.
    pub fn run(&self, call: &ToolCall) -> Result<ToolResult> {
        let Some(tool) = self.finder.find(call.name()) else {
            return Err(CairnError::ToolNotFound {
                tool: call.name().to_string(),
            });
        };

        tracing::debug!(tool = call.name(), args = call.arguments().len(), "running tool");
        let start = Instant::now();
        let (code, output, errors) = self.invoke(&tool, call);
        let duration = start.elapsed();

        let result = ToolResult {
            name: call.name().to_string(),
            arguments: call.arguments().to_vec(),
            worker: format!("{:?}", std::thread::current().id()),
            duration,
            code,
            output,
            errors,
        };
        self.logbook.append(result.clone());
        tracing::debug!(tool = %result.name, code = result.code, ?duration, "tool finished");
        Ok(result)
    }

    /// Run a batch of independent calls.
    ///
    /// Sequential batches preserve call order and result order exactly.
    /// Parallel batches dispatch each call to a scoped worker; the returned
    /// vector still matches input order, but no ordering is guaranteed for
    /// interleaved output or logbook appends.
    pub fn run_all(&self, calls: &[ToolCall], parallel: bool) -> Result<Vec<ToolResult>> {
        if !parallel {
            return calls.iter().map(|call| self.run(call)).collect();
        }
        let results: Vec<Result<ToolResult>> = std::thread::scope(|scope| {
            let handles: Vec<_> = calls
                .iter()
                .map(|call| scope.spawn(move || self.run(call)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("tool worker panicked"))
                .collect()
        });
        results.into_iter().collect()
    }

    /// Invoke the tool with fresh sinks; every exit path resets state by
    /// construction since nothing outlives this call frame.
    fn invoke(&self, tool: &Tool, call: &ToolCall) -> (i32, String, String) {
        match tool.kind() {
            ToolKind::Provider(provider) => {
                let provider = Arc::clone(provider);
                let mut out: Vec<u8> = Vec::new();
                let mut err: Vec<u8> = Vec::new();
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    provider.run(&mut out, &mut err, call.arguments())
                }));
                let code = settle(outcome, &mut err);
                (code, into_text(out), into_text(err))
            }
            ToolKind::Operator(operator) => {
                let operator = Arc::clone(operator);
                let span = tracing::debug_span!("operator", tool = call.name());
                let _guard = span.enter();
                let mut out: Vec<u8> = Vec::new();
                let mut err: Vec<u8> = Vec::new();
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    operator.run(self, &mut out, &mut err, call.arguments())
                }));
                let code = settle(outcome, &mut err);
                (code, into_text(out), into_text(err))
            }
            ToolKind::Program(program) => {
                match program.run(call.arguments(), self.subprocess_timeout) {
                    Ok(output) => (output.code, output.stdout, output.stderr),
                    Err(error) => (CRASH_CODE, String::new(), error.to_string()),
                }
            }
        }
    }
}

/// Collapse an invocation outcome into an exit code, writing crash detail
/// into the error sink.
fn settle(
    outcome: std::thread::Result<Result<i32>>,
    err: &mut Vec<u8>,
) -> i32 {
    match outcome {
        Ok(Ok(code)) => code,
        Ok(Err(error)) => {
            let _ = std::io::Write::write_all(err, format!("{error}\n").as_bytes());
            CRASH_CODE
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "tool panicked".to_string());
            let _ = std::io::Write::write_all(err, format!("{message}\n").as_bytes());
            CRASH_CODE
        }
    }
}

fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}
