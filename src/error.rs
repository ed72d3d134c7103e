//! Error types for verdiff
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, bad config, missing scratch repo)
//! - 4: Operation failed (command failure, decode error, conflict)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the verdiff CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for verdiff operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Operation failures (exit code 4)
    /// An external command exited non-zero. `output` is the captured
    /// standard output, kept because callers may still need to decode it
    /// after a failed replay step.
    #[error("command failed (exit code {code}): {command}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
        stderr: String,
    },

    /// The commit-log decoder hit a block missing required fields. This is
    /// a decoder/tool mismatch and is never retried.
    #[error("malformed log output: {0}")]
    MalformedLog(String),

    /// A porcelain status code outside the fixed resolution table turned up
    /// during a forced range apply.
    #[error("unresolvable conflict '{xy}' on {path}")]
    UnresolvableConflict { xy: String, path: String },

    /// Reserved for a future deadline/cancellation wrapper around shell
    /// invocations. Never constructed today.
    #[error("operation cancelled")]
    Cancelled,

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_) | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            Error::CommandFailed { .. }
            | Error::MalformedLog(_)
            | Error::UnresolvableConflict { .. }
            | Error::Cancelled
            | Error::LockFailed(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, where an error carries more
    /// than its message.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::CommandFailed {
                command,
                code,
                output,
                stderr,
            } => Some(serde_json::json!({
                "command": command,
                "code": code,
                "stdout": output,
                "stderr": stderr,
            })),
            Error::UnresolvableConflict { xy, path } => Some(serde_json::json!({
                "xy": xy,
                "path": path,
            })),
            _ => None,
        }
    }
}

/// Result type alias for verdiff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
