//! Unified error handling for influxdb3-core
//!
//! The management API reports failures purely through HTTP status codes, so
//! every error carries the status it was derived from and a small set of
//! helper methods classifies it.
//!
//! # Example
//!
//! ```rust
//! use influxdb3_core::{CoreError, ResourceKind};
//!
//! let err = CoreError::NotFound {
//!     kind: ResourceKind::Token,
//!     id: "4a5e3c2b-0000-4000-8000-000000000000".to_string(),
//! };
//! assert!(err.is_not_found());
//! assert_eq!(
//!     err.to_string(),
//!     "error getting token: 4a5e3c2b-0000-4000-8000-000000000000 not found"
//! );
//! ```

use std::fmt;
use thiserror::Error;

/// The kind of management resource an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Database,
    Token,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Database => write!(f, "database"),
            ResourceKind::Token => write!(f, "token"),
        }
    }
}

/// Core error type for management API operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// The server answered with a status the operation does not accept
    #[error("unexpected status code: {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// POST /databases rejected the request body (HTTP 400)
    #[error("bad request, check your input")]
    BadRequest { body: String },

    /// The named or identified resource does not exist
    #[error("error getting {kind}: {id} not found")]
    NotFound { kind: ResourceKind, id: String },

    /// A delete call failed; wraps the underlying cause
    #[error("error deleting {kind}: {source}")]
    DeleteFailed {
        kind: ResourceKind,
        #[source]
        source: Box<CoreError>,
    },

    /// Response body could not be decoded
    #[error("error unmarshalling JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request body could not be encoded
    #[error("error marshalling JSON: {0}")]
    Encode(#[source] serde_json::Error),

    /// The configured host is not a valid URL
    #[error("parsing host URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport level failure (connect, timeout, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// HTTP status code behind this error, if there is one
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::UnexpectedStatus { status, .. } => Some(*status),
            CoreError::BadRequest { .. } => Some(400),
            CoreError::NotFound { .. } => Some(404),
            CoreError::DeleteFailed { source, .. } => source.status(),
            CoreError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body captured with a status error
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            CoreError::UnexpectedStatus { body, .. } | CoreError::BadRequest { body } => {
                Some(body.as_str())
            }
            CoreError::DeleteFailed { source, .. } => source.body(),
            _ => None,
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Request(e) => e.is_timeout(),
            CoreError::DeleteFailed { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable
    ///
    /// 501 Not Implemented is a server error that will never succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Request(e) => e.is_connect() || e.is_timeout(),
            CoreError::DeleteFailed { source, .. } => source.is_retryable(),
            _ => {
                self.is_rate_limited() || (self.is_server_error() && self.status() != Some(501))
            }
        }
    }
}
