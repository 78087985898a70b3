//! Error types for the stash boundary
//!
//! Every failure that can happen while servicing a native call is one of the
//! variants below. The FFI layer converts them into the error form of a call
//! result; nothing here is ever allowed to unwind across the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handle::Handle;

/// Main error type for stash operations
#[derive(Error, Debug)]
pub enum Error {
    /// Lookup or release of a handle that is unknown or already released
    #[error("not found: handle {handle}")]
    NotFound { handle: Handle },

    /// A buffer view or argument violates a documented precondition
    #[error("invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    /// The native operation itself could not produce a result
    #[error("operation failed: {message}")]
    OperationFailure {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Panics caught at the boundary and allocation failures
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Stable numeric codes for each error category
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No error
    Ok = 0,
    /// See [`Error::NotFound`]
    NotFound = 1,
    /// See [`Error::InvalidInput`]
    InvalidInput = 2,
    /// See [`Error::OperationFailure`]
    OperationFailure = 3,
    /// See [`Error::Internal`]
    Internal = 4,
}

impl Error {
    /// Build an [`Error::InvalidInput`]
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build an [`Error::OperationFailure`] without an underlying cause
    pub fn operation(message: impl Into<String>) -> Self {
        Error::OperationFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Build an [`Error::Internal`]
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Numeric category of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NotFound { .. } => ErrorCode::NotFound,
            Error::InvalidInput { .. } => ErrorCode::InvalidInput,
            Error::OperationFailure { .. } => ErrorCode::OperationFailure,
            Error::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Whether this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::OperationFailure {
            message: format!("{:#}", err),
            source: Some(err),
        }
    }
}

impl ErrorCode {
    /// Get a human-readable description of the category
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::Ok => "Success",
            ErrorCode::NotFound => "Handle not found",
            ErrorCode::InvalidInput => "Invalid input",
            ErrorCode::OperationFailure => "Operation failed",
            ErrorCode::Internal => "Internal error",
        }
    }
}
