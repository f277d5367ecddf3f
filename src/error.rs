//! Error types for the Mastodon client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Transport and JSON failures never escape raw: the request engine wraps
//! them into one of these variants first.

use thiserror::Error;

/// The main error type for the Mastodon client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Caller Errors
    // ============================================================================
    /// The operation is not available under the configured version check mode
    #[error("Version check failed (Need version {required})")]
    Version { required: String },

    /// A version string could not be parsed
    #[error("Invalid version string '{input}': {message}")]
    VersionParse { input: String, message: String },

    /// Bad caller input
    #[error("Illegal argument: {message}")]
    IllegalArgument { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    /// The server could not be reached or the connection failed mid-way
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    // ============================================================================
    // API Errors
    // ============================================================================
    /// The server answered but the response could not be handled
    #[error("Mastodon API returned error: {status} {reason}: {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    /// The server answered 404
    #[error("Mastodon API returned not found: {status} {reason}: {message}")]
    NotFound {
        status: u16,
        reason: String,
        message: String,
    },

    /// The server answered 401, usually an invalid or revoked token
    #[error("Mastodon API returned unauthorized: {status} {reason}: {message}")]
    Unauthorized {
        status: u16,
        reason: String,
        message: String,
    },

    // ============================================================================
    // Rate Limiting
    // ============================================================================
    #[error("Rate limit error: {message}")]
    RateLimit { message: String },

    // ============================================================================
    // Streaming
    // ============================================================================
    #[error("Malformed event: {message}")]
    MalformedEvent { message: String },

    // ============================================================================
    // Decoded Record Access
    // ============================================================================
    #[error("Attribute not found: {field}")]
    FieldNotFound { field: String },

    #[error("Attribute-style access is read only: {field}")]
    ReadOnly { field: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a version error naming the required version
    pub fn version(required: impl Into<String>) -> Self {
        Self::Version {
            required: required.into(),
        }
    }

    /// Create an illegal argument error
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::IllegalArgument {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a network error without an underlying transport cause
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a transport failure
    pub fn transport(context: &str, source: reqwest::Error) -> Self {
        Self::Network {
            message: format!("{context}: {source}"),
            source: Some(source),
        }
    }

    /// Create a generic API error
    pub fn api(status: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status into the matching API error
    pub fn from_status(status: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = message.into();
        match status {
            404 => Self::NotFound {
                status,
                reason,
                message,
            },
            401 => Self::Unauthorized {
                status,
                reason,
                message,
            },
            _ => Self::Api {
                status,
                reason,
                message,
            },
        }
    }

    /// Create a rate limit error
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Create a malformed event error
    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }

    /// Whether this error came from the API family (generic, 404 or 401)
    pub fn is_api(&self) -> bool {
        matches!(
            self,
            Error::Api { .. } | Error::NotFound { .. } | Error::Unauthorized { .. }
        )
    }

    /// HTTP status carried by API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. }
            | Error::NotFound { status, .. }
            | Error::Unauthorized { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for the Mastodon client
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::version("2.1.0");
        assert_eq!(err.to_string(), "Version check failed (Need version 2.1.0)");

        let err = Error::illegal_argument("bad visibility");
        assert_eq!(err.to_string(), "Illegal argument: bad visibility");

        let err = Error::api(500, "Internal Server Error", "boom");
        assert_eq!(
            err.to_string(),
            "Mastodon API returned error: 500 Internal Server Error: boom"
        );
    }

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            Error::from_status(404, "Not Found", "gone"),
            Error::NotFound { status: 404, .. }
        ));
        assert!(matches!(
            Error::from_status(401, "Unauthorized", "bad token"),
            Error::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            Error::from_status(422, "Unprocessable Entity", "nope"),
            Error::Api { status: 422, .. }
        ));
    }

    #[test]
    fn test_is_api_family() {
        assert!(Error::from_status(404, "", "").is_api());
        assert!(Error::from_status(401, "", "").is_api());
        assert!(Error::from_status(503, "", "").is_api());
        assert!(!Error::rate_limit("hit").is_api());
        assert!(!Error::network("down").is_api());
        assert_eq!(Error::from_status(404, "", "").status(), Some(404));
        assert_eq!(Error::rate_limit("hit").status(), None);
    }
}
