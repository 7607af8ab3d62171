//! Error types for Cairn operations.
//!
//! This module defines [`CairnError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `CairnError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `CairnError::Other`) for unexpected errors
//! - Tool-reported failures (non-zero exit) and tool crashes are *not*
//!   errors: they are captured in `ToolResult` values and policy is decided
//!   by the caller, never by the execution engine

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Cairn operations.
#[derive(Debug, Error)]
pub enum CairnError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A module descriptor could not be parsed or is structurally invalid.
    #[error("Invalid module descriptor at {path}: {message}")]
    InvalidModule { path: PathBuf, message: String },

    /// No locator in the chain produced a location for a required module.
    #[error("Module not locatable: {module}")]
    UnlocatableModule { module: String },

    /// The missing-module set failed to shrink across a resolution iteration.
    #[error("Resolution is not converging, still missing: {modules}")]
    NonConvergentResolution { modules: String },

    /// Fetching a remote resource failed.
    #[error("Failed to fetch {uri}: {message}")]
    FetchFailure { uri: String, message: String },

    /// No finder produced a tool for the requested name.
    #[error("Tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Cairn operations.
pub type Result<T> = std::result::Result<T, CairnError>;
