//! Command-line interface: argument definitions and command dispatch.

pub mod args;
pub mod dispatcher;

pub use args::{Cli, Commands};
pub use dispatcher::CommandDispatcher;
