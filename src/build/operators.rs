//! Built-in operator tools driving build sequences.
//!
//! A [`SequenceOperator`] is a named tool that replays a fixed list of tool
//! calls through the runner handle it is given — the built-in `compile`,
//! `test`, and `build` tools are all sequences. Whether a failing call aborts
//! the rest of the sequence is the sequence's decision (strict mode), never
//! the engine's.

use std::io::Write;

use crate::error::Result;
use crate::tool::{ToolCall, ToolOperator, ToolRunner};

/// An operator replaying a fixed sequence of tool calls.
pub struct SequenceOperator {
    name: String,
    calls: Vec<ToolCall>,
    strict: bool,
    parallel: bool,
}

impl SequenceOperator {
    /// Create a sequential sequence.
    pub fn new(name: impl Into<String>, calls: Vec<ToolCall>, strict: bool) -> Self {
        Self {
            name: name.into(),
            calls,
            strict,
            parallel: false,
        }
    }

    /// Create a sequence whose independent calls run on the worker pool.
    pub fn parallel(name: impl Into<String>, calls: Vec<ToolCall>, strict: bool) -> Self {
        Self {
            name: name.into(),
            calls,
            strict,
            parallel: true,
        }
    }

    /// The calls this sequence replays.
    pub fn calls(&self) -> &[ToolCall] {
        &self.calls
    }
}

impl ToolOperator for SequenceOperator {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(
        &self,
        runner: &ToolRunner,
        out: &mut dyn Write,
        _err: &mut dyn Write,
        _args: &[String],
    ) -> Result<i32> {
        let mut worst = 0;
        if self.parallel {
            let results = runner.run_all(&self.calls, true)?;
            for result in results {
                writeln!(out, "{} finished with code {}", result.name, result.code)?;
                if !result.is_success() && worst == 0 {
                    worst = result.code;
                }
            }
            return Ok(worst);
        }

        for call in &self.calls {
            let result = runner.run(call)?;
            writeln!(out, "{} finished with code {}", result.name, result.code)?;
            if !result.is_success() {
                if self.strict {
                    return Ok(result.code);
                }
                if worst == 0 {
                    worst = result.code;
                }
            }
        }
        Ok(worst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::provider::test_support::{EchoProvider, FailingProvider};
    use crate::tool::{DirectToolFinder, Logbook, Tool};
    use std::sync::Arc;

    fn runner(sequence: SequenceOperator) -> ToolRunner {
        let finder = DirectToolFinder::new(
            "test tools",
            vec![
                Tool::of_operator(Arc::new(sequence)),
                Tool::of_provider(Arc::new(EchoProvider)),
                Tool::of_provider(Arc::new(FailingProvider(3))),
            ],
        );
        ToolRunner::new(Arc::new(finder), Arc::new(Logbook::new()))
    }

    #[test]
    fn replays_calls_in_order() {
        let sequence = SequenceOperator::new(
            "seq",
            vec![
                ToolCall::of("echo").with_arg("a"),
                ToolCall::of("echo").with_arg("b"),
            ],
            false,
        );
        let runner = runner(sequence);

        let result = runner.run(&ToolCall::of("seq")).unwrap();

        assert_eq!(result.code, 0);
        // The sequence itself plus its two nested calls.
        assert_eq!(runner.logbook().len(), 3);
    }

    #[test]
    fn lenient_sequence_continues_past_failures() {
        let sequence = SequenceOperator::new(
            "seq",
            vec![
                ToolCall::of("failing"),
                ToolCall::of("echo").with_arg("after"),
            ],
            false,
        );
        let runner = runner(sequence);

        let result = runner.run(&ToolCall::of("seq")).unwrap();

        assert_eq!(result.code, 3);
        assert_eq!(runner.logbook().len(), 3);
        assert!(result.output.contains("echo finished with code 0"));
    }

    #[test]
    fn strict_sequence_aborts_at_first_failure() {
        let sequence = SequenceOperator::new(
            "seq",
            vec![
                ToolCall::of("failing"),
                ToolCall::of("echo").with_arg("never-runs"),
            ],
            true,
        );
        let runner = runner(sequence);

        let result = runner.run(&ToolCall::of("seq")).unwrap();

        assert_eq!(result.code, 3);
        // Only the sequence and the failing call were logged.
        assert_eq!(runner.logbook().len(), 2);
    }

    #[test]
    fn parallel_sequence_collects_all_results() {
        let sequence = SequenceOperator::parallel(
            "seq",
            vec![
                ToolCall::of("echo").with_arg("1"),
                ToolCall::of("echo").with_arg("2"),
                ToolCall::of("echo").with_arg("3"),
            ],
            false,
        );
        let runner = runner(sequence);

        let result = runner.run(&ToolCall::of("seq")).unwrap();

        assert_eq!(result.code, 0);
        assert_eq!(runner.logbook().len(), 4);
    }

    #[test]
    fn unknown_tool_in_sequence_is_fatal() {
        let sequence = SequenceOperator::new("seq", vec![ToolCall::of("ghost")], false);
        let runner = runner(sequence);

        let result = runner.run(&ToolCall::of("seq")).unwrap();
        // The missing tool surfaces as a crash of the sequence itself.
        assert_eq!(result.code, crate::tool::CRASH_CODE);
        assert!(result.errors.contains("ghost"));
    }
}
