//! Error types for TMDB access.

use reelview_core::FetchError;
use thiserror::Error;

/// Errors that can occur while talking to the TMDB API.
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Request could not be sent or its body could not be read.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// Response body did not match the expected schema.
    #[error("Parse error for {path}: {reason}")]
    Parse {
        /// Endpoint path the body came from
        path: String,
        /// The reason for the parse error
        reason: String,
    },

    /// API key is invalid or was revoked (HTTP 401).
    #[error("TMDB API key is invalid: {message}")]
    Unauthorized {
        /// Status message reported by TMDB
        message: String,
    },

    /// Requested title or endpoint does not exist (HTTP 404).
    #[error("TMDB resource not found: {path}")]
    NotFound {
        /// Endpoint path that was requested
        path: String,
    },

    /// Request budget exhausted (HTTP 429).
    #[error("TMDB rate limit exceeded, try again later")]
    RateLimited,

    /// Any other non-success status.
    #[error("TMDB returned status {status} for {path}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Endpoint path that was requested
        path: String,
    },

    /// Media type outside `movie` and `tv`.
    #[error("Invalid media type: {media_type}")]
    InvalidMediaType {
        /// The media type as received
        media_type: String,
    },

    /// No API key was configured.
    #[error("No TMDB API key configured, set REELVIEW_API_KEY")]
    MissingApiKey,

    /// Base URL or endpoint could not be turned into a request URL.
    #[error("Invalid URL: {reason}")]
    InvalidUrl {
        /// The reason the URL is invalid
        reason: String,
    },
}

impl From<TmdbError> for FetchError {
    fn from(error: TmdbError) -> Self {
        match error {
            TmdbError::Network { reason } => FetchError::Network { reason },
            TmdbError::Parse { path, reason } => FetchError::Parse {
                reason: format!("{path}: {reason}"),
            },
            TmdbError::Unauthorized { message } => FetchError::Rejected {
                status: 401,
                reason: message,
            },
            TmdbError::NotFound { path } => FetchError::NotFound { what: path },
            TmdbError::RateLimited => FetchError::Unavailable {
                reason: "rate limit exceeded".to_string(),
            },
            TmdbError::Status { status, path } => FetchError::Rejected {
                status,
                reason: path,
            },
            error @ TmdbError::InvalidMediaType { .. } => FetchError::Parse {
                reason: error.to_string(),
            },
            error @ (TmdbError::MissingApiKey | TmdbError::InvalidUrl { .. }) => {
                FetchError::Unavailable {
                    reason: error.to_string(),
                }
            }
        }
    }
}
