//! Immutable tool execution results.

use std::time::Duration;

/// Sentinel exit code recorded when an invocation crashed (panicked,
/// returned an error, or was killed on timeout) instead of reporting a
/// status of its own.
pub const CRASH_CODE: i32 = 101;

/// The outcome of one executed [`crate::tool::ToolCall`].
///
/// Created exactly once per execution and never edited; re-running the same
/// call produces a distinct result with independently captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Name of the tool that ran.
    pub name: String,
    /// Arguments the tool ran with.
    pub arguments: Vec<String>,
    /// Identifier of the worker thread that executed the call.
    pub worker: String,
    /// Wall-clock execution time.
    pub duration: Duration,
    /// Exit code: 0 is success, non-zero a tool-reported failure,
    /// [`CRASH_CODE`] a crash.
    pub code: i32,
    /// Captured standard output.
    pub output: String,
    /// Captured standard error.
    pub errors: String,
}

impl ToolResult {
    /// True when the tool reported success.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(code: i32) -> ToolResult {
        ToolResult {
            name: "tool".into(),
            arguments: vec!["arg".into()],
            worker: "ThreadId(1)".into(),
            duration: Duration::from_millis(5),
            code,
            output: String::new(),
            errors: String::new(),
        }
    }

    #[test]
    fn zero_code_is_success() {
        assert!(result(0).is_success());
        assert!(!result(1).is_success());
        assert!(!result(CRASH_CODE).is_success());
    }

    #[test]
    fn results_are_independent_values() {
        let first = result(0);
        let mut second = first.clone();
        second.output.push_str("more");
        assert!(first.output.is_empty());
    }
}
