//! Error types for the SMSGuard client.
//!
//! # Design
//! `ApiError` is the uniform failure of a remote call. Its variants keep the
//! origin apart (the service rejected the call, the call timed out, the
//! network failed, the body could not be understood) while `message()`,
//! `code()` and `status()` give every variant the same flat shape.
//!
//! `Error` wraps `ApiError` next to the failures that happen before any
//! network activity: bad configuration and invalid arguments.

use thiserror::Error;

/// Message used when the service reports failure without an error object.
pub const DEFAULT_ERROR_MESSAGE: &str = "API request failed";

/// Code used when the service reports failure without an error code.
pub const DEFAULT_ERROR_CODE: &str = "unknown_error";

/// Failure of a request that reached the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with `success: false`.
    #[error("{message} (code: {code}, status: {status})")]
    Service {
        message: String,
        code: String,
        status: u16,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timeout")]
    Timeout,

    /// DNS, connection, or TLS failure before a response was received.
    #[error("network error: {message}")]
    Network { message: String },

    /// The service answered, but the body was not the expected JSON shape.
    #[error("malformed response (status: {status}): {message}")]
    MalformedResponse { message: String, status: u16 },
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::Service { message, .. } => message,
            ApiError::Timeout => "Request timeout",
            ApiError::Network { message } => message,
            ApiError::MalformedResponse { message, .. } => message,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ApiError::Service { code, .. } => code,
            ApiError::Timeout => "timeout",
            ApiError::Network { .. } => "network_error",
            ApiError::MalformedResponse { .. } => "malformed_response",
        }
    }

    /// HTTP status of the failure. 408 for timeouts, 0 when no response
    /// was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Service { status, .. } => *status,
            ApiError::Timeout => 408,
            ApiError::Network { .. } => 0,
            ApiError::MalformedResponse { status, .. } => *status,
        }
    }
}

/// Errors returned by `Client` operations and constructors.
#[derive(Debug, Error)]
pub enum Error {
    /// The client could not be configured (missing key, bad URL, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// An argument was rejected locally; no request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// The uniform API error, if this failure came from a remote call.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
