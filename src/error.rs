//! Custom error types for the console.
//!
//! This module defines `ConsoleError`, the single error type used across the crate.
//! Built with `thiserror`, it groups the failures the console can run into:
//!
//! - **`InvalidInput`**: operator-typed setpoint text that is not a finite number. This is
//!   recovered locally by the submit handler: the field keeps its text and no command is sent.
//! - **`BackendCommunication`**: a command, export or shutdown call into the backend failed.
//!   It is reported (tracing + status log) and never fatal; the operator retries by acting again.
//! - **`Config`** / **`Configuration`**: figment parse failures and semantic validation errors.
//! - **`Io`**, **`Csv`**, **`Serialization`**: wrapped lower-level failures from exports and the
//!   settings file.
//!
//! "No samples yet" is deliberately not an error: the store and the chart renderer express it
//! as `None`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::console::LifecycleState;

/// Convenience alias for results using the console error type.
pub type AppResult<T> = std::result::Result<T, ConsoleError>;

/// Which editable setpoint a piece of text was typed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointKind {
    /// Voltage setpoint.
    Voltage,
    /// Current setpoint.
    Current,
}

impl std::fmt::Display for SetpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Voltage => f.write_str("voltage"),
            Self::Current => f.write_str("current"),
        }
    }
}

/// The backend call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOperation {
    /// `send_command`.
    Command,
    /// Sample export.
    Export,
    /// `at_exit`.
    Shutdown,
}

impl std::fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command => f.write_str("command"),
            Self::Export => f.write_str("export"),
            Self::Shutdown => f.write_str("shutdown"),
        }
    }
}

/// Errors raised by the console and its backends.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Setpoint text that does not parse as a finite number.
    #[error("Invalid {field} setpoint {text:?}: not a number")]
    InvalidInput {
        /// Field the text was typed into.
        field: SetpointKind,
        /// The rejected text.
        text: String,
    },

    /// A backend call failed.
    #[error("Backend {operation} failed: {message}")]
    BackendCommunication {
        /// The call that failed.
        operation: BackendOperation,
        /// Backend-supplied reason.
        message: String,
    },

    /// Configuration could not be extracted.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Configuration failed validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export failure.
    #[cfg(feature = "storage_csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Settings (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A sample older than the latest one in the store.
    #[error("Sample at {incoming:?} precedes latest sample at {latest:?}")]
    OutOfOrderSample {
        /// Time of the newest stored sample.
        latest: Duration,
        /// Time of the rejected sample.
        incoming: Duration,
    },

    /// Operation attempted outside the connected state.
    #[error("Console is {0:?}; operation requires a connected console")]
    InvalidState(LifecycleState),

    /// The platform has no config directory.
    #[error("No settings directory available for {0}")]
    NoSettingsDir(PathBuf),

    /// A cargo feature needed for the operation is off.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),

    /// Shutdown completed with the listed failures.
    #[error("Shutdown failed with errors")]
    ShutdownFailed(Vec<ConsoleError>),
}

impl From<figment::Error> for ConsoleError {
    fn from(value: figment::Error) -> Self {
        ConsoleError::Config(Box::new(value))
    }
}

impl ConsoleError {
    /// Wraps any backend-side failure for the given operation.
    pub fn backend(operation: BackendOperation, err: impl std::fmt::Display) -> Self {
        ConsoleError::BackendCommunication {
            operation,
            message: err.to_string(),
        }
    }

    /// Attributes a failure to a backend operation, keeping errors that already are.
    pub fn during(self, operation: BackendOperation) -> Self {
        match self {
            err @ ConsoleError::BackendCommunication { .. } => err,
            other => ConsoleError::backend(operation, other),
        }
    }

    /// Whether the console keeps running normally after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ConsoleError::Config(_)
                | ConsoleError::Configuration(_)
                | ConsoleError::FeatureNotEnabled(_)
                | ConsoleError::ShutdownFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_names_the_field() {
        let err = ConsoleError::InvalidInput {
            field: SetpointKind::Current,
            text: "abc".into(),
        };
        assert_eq!(err.to_string(), "Invalid current setpoint \"abc\": not a number");
        assert!(err.is_recoverable());
    }

    #[test]
    fn backend_helper_keeps_operation_and_message() {
        let err = ConsoleError::backend(BackendOperation::Export, "disk full");
        match err {
            ConsoleError::BackendCommunication { operation, message } => {
                assert_eq!(operation, BackendOperation::Export);
                assert_eq!(message, "disk full");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn during_wraps_once() {
        let io = ConsoleError::Io(std::io::Error::other("read-only file system"));
        let wrapped = io.during(BackendOperation::Export);
        assert_eq!(
            wrapped.to_string(),
            "Backend export failed: I/O error: read-only file system"
        );
        let again = wrapped.during(BackendOperation::Shutdown);
        assert!(again.to_string().starts_with("Backend export failed"));
    }

    #[test]
    fn shutdown_failure_is_not_recoverable() {
        let err = ConsoleError::ShutdownFailed(vec![ConsoleError::backend(
            BackendOperation::Shutdown,
            "session already closed",
        )]);
        assert!(!err.is_recoverable());
    }
}
