//! Error types for restsync.
//!
//! Only configuration errors and payloads that cannot be query-encoded
//! leave [`Syncer::sync`](crate::Syncer::sync) as an `Err`. Transport and decode failures travel through the
//! [`Outcome`](crate::Outcome) handed to the caller's callbacks.

use derive_more::{Display, Error, From};

/// Main error type for restsync operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// No URL in the options and none resolvable from the model.
    #[display("A \"url\" property or function must be specified")]
    #[from(skip)]
    MissingUrl,

    /// A CRUD tag outside create/read/update/patch/delete.
    #[display("unknown CRUD method: {_0}")]
    #[from(skip)]
    UnknownMethod(#[error(not(source))] String),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Request could not be turned into a wire request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Payload that cannot be expressed as, or parsed from, a query string.
    #[display("query string error: {_0}")]
    #[from]
    QueryString(serde_qs::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for errors raised before any I/O happens.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingUrl | Self::UnknownMethod(_))
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
