//! Error types for the update client
//!
//! This module defines all error types used throughout the crate.

use crate::proto::ResponseCode;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the update client
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing caller arguments, reported before any network
    /// activity
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// The server answered a command (or the greeting) with a non-success
    /// code; the two client-local sentinel codes land here as well
    #[error("server rejected command with code {code}")]
    Command {
        /// Response code carried for caller inspection
        code: ResponseCode,
    },

    /// A command was issued on a session that is already closed
    #[error("session is closed")]
    InvalidState,

    /// Socket or stream I/O fault
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// TLS handshake or configuration fault
    #[error("TLS error: {0}")]
    Tls(String),

    /// A single I/O operation exceeded its configured timeout
    #[error("timed out waiting for {operation}")]
    Timeout {
        /// The operation that expired
        operation: String,
    },

    /// Generic transaction failure wrapping anything not already recognized
    #[error("update transaction failed: {0}")]
    Other(String),
}

impl Error {
    /// Create an input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a command error from a response code
    pub fn command(code: ResponseCode) -> Self {
        Self::Command { code }
    }

    /// Create a TLS error
    pub fn tls(msg: impl Into<String>) -> Self {
        Self::Tls(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// The protocol response code behind this error, if it is a command
    /// failure
    pub fn response_code(&self) -> Option<ResponseCode> {
        match self {
            Self::Command { code } => Some(*code),
            _ => None,
        }
    }

    /// Whether this is a command-level failure (the server or the response
    /// parser produced a code) as opposed to a transport or local fault
    pub fn is_command_error(&self) -> bool {
        matches!(self, Self::Command { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_preserves_code() {
        let err = Error::command(ResponseCode::InvalidIpAddress);
        assert_eq!(err.response_code(), Some(ResponseCode::InvalidIpAddress));
        assert!(err.is_command_error());
    }

    #[test]
    fn test_transport_error_carries_no_code() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert_eq!(err.response_code(), None);
        assert!(!err.is_command_error());
    }

    #[test]
    fn test_anyhow_wraps_into_other() {
        let err: Error = anyhow::anyhow!("boom").into();
        assert!(matches!(err, Error::Other(_)));
    }
}
