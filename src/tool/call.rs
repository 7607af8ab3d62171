//! Immutable tool call values.

use std::fmt;

/// A request to run a named tool with an ordered argument list.
///
/// Calls never mutate after construction; the `with_*` builders return new
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    name: String,
    arguments: Vec<String>,
}

impl ToolCall {
    /// Create a call with no arguments.
    pub fn of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// The tool name to resolve.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered argument list.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Return a new call with one more argument appended.
    pub fn with_arg(&self, argument: impl Into<String>) -> Self {
        let mut arguments = self.arguments.clone();
        arguments.push(argument.into());
        Self {
            name: self.name.clone(),
            arguments,
        }
    }

    /// Return a new call with the given arguments appended.
    pub fn with_args<I, S>(&self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut arguments = self.arguments.clone();
        arguments.extend(args.into_iter().map(Into::into));
        Self {
            name: self.name.clone(),
            arguments,
        }
    }
}

impl fmt::Display for ToolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for argument in &self.arguments {
            write!(f, " {}", argument)?;
        }
        Ok(())
    }
}
