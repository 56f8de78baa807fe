//! Error types for the DDNS hook
//!
//! This module defines all error types used throughout the crate.
//!
//! The variants fall into four groups, each with its own handling policy:
//!
//! - [`Error::Validation`]: bad request parameters, reported as 400
//! - [`Error::ProviderSetup`]: token rejected or zone not found, fatal to the request (500)
//! - [`Error::RecordOperation`]: a single (hostname, type) pair failed; recorded, never escalated
//! - [`Error::Cancelled`]: the request was cancelled or hit its deadline (500)
//!
//! The remaining variants are raised by provider implementations and end up
//! wrapped in one of the groups above.

use crate::record::RecordType;
use thiserror::Error;

/// Result type alias for DDNS hook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS hook
#[derive(Error, Debug)]
pub enum Error {
    /// One or more request parameters are missing or malformed.
    ///
    /// Display joins every message with a newline.
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    /// Provider client construction or zone lookup failed
    #[error("{source}")]
    ProviderSetup {
        /// The provider error
        #[source]
        source: Box<Error>,
    },

    /// Resolving, creating or updating one record failed
    #[error("{record_type} record for {hostname}: {source}")]
    RecordOperation {
        /// Fully-qualified hostname
        hostname: String,
        /// Record type that was being reconciled
        record_type: RecordType,
        /// The provider error
        #[source]
        source: Box<Error>,
    },

    /// The request was cancelled or exceeded its deadline
    #[error("{0}")]
    Cancelled(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error from the collected messages
    pub fn validation(messages: Vec<String>) -> Self {
        Self::Validation(messages)
    }

    /// Wrap a provider error raised while building the client or resolving the zone
    pub fn provider_setup(source: Error) -> Self {
        Self::ProviderSetup {
            source: Box::new(source),
        }
    }

    /// Wrap a provider error raised while reconciling one record
    pub fn record_operation(
        hostname: impl Into<String>,
        record_type: RecordType,
        source: Error,
    ) -> Self {
        Self::RecordOperation {
            hostname: hostname.into(),
            record_type,
            source: Box::new(source),
        }
    }

    /// Create a cancellation error carrying the reason
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled(reason.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// HTTP status code reported to the caller when this error ends a request
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Whether this error came from request cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
