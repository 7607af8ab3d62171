//! Tool composition and execution.
//!
//! Tools are named, invokable units discovered through composable finders
//! and executed by the [`runner::ToolRunner`], which captures output, exit
//! status, and timing into immutable [`result::ToolResult`] values appended
//! to the append-only [`logbook::Logbook`].

pub mod call;
pub mod discovery;
pub mod finder;
pub mod logbook;
pub mod program;
pub mod provider;
pub mod result;
pub mod runner;

pub use call::ToolCall;
pub use discovery::DiscoveredToolFinder;
pub use finder::{CompositeToolFinder, DirectToolFinder, ToolFinder};
pub use logbook::Logbook;
pub use program::ProgramTool;
pub use provider::{Tool, ToolKind, ToolOperator, ToolProvider};
pub use result::{ToolResult, CRASH_CODE};
pub use runner::ToolRunner;
