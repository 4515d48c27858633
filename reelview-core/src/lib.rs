//! Reelview Core - Screen state and controllers for browsing movies and TV
//!
//! This crate provides the building blocks a Reelview front end observes:
//! the media domain model, the `Resource` result wrapper, repository ports,
//! immutable screen states with their reducers, and the actor-style
//! controllers that fold fetch results into those states.

pub mod config;
pub mod controller;
pub mod domain;
pub mod repository;
pub mod resource;
pub mod state;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ConfigError, ReelviewConfig};
pub use controller::{ControllerError, ControllerHandle};
pub use domain::{Cast, Genre, ListKind, Media, MediaId, MediaPage, MediaType};
pub use repository::{DetailsRepository, MediaRepository};
pub use resource::{FetchError, Resource, ResourceStream};

/// Core errors that can bubble up from any Reelview subsystem.
///
/// High-level error types representing failures in core functionality.
#[derive(Debug, thiserror::Error)]
pub enum ReelviewError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelviewError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            ReelviewError::Fetch(e) => match e {
                FetchError::Network { .. } => {
                    "Could not reach the movie database, check your connection".to_string()
                }
                FetchError::Rejected { status: 401, .. } => {
                    "The API key was rejected, set REELVIEW_API_KEY".to_string()
                }
                FetchError::NotFound { what } => format!("Nothing found for {what}"),
                FetchError::Unavailable { reason } => format!("Service unavailable: {reason}"),
                _ => "Failed to load data".to_string(),
            },
            ReelviewError::Controller(_) => "Screen controller stopped unexpectedly".to_string(),
            ReelviewError::Configuration(e) => format!("Configuration error: {e}"),
            ReelviewError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ReelviewError::Configuration(_)
                | ReelviewError::Fetch(FetchError::NotFound { .. })
                | ReelviewError::Fetch(FetchError::Rejected { status: 401, .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, ReelviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors() {
        let not_found = ReelviewError::from(FetchError::NotFound {
            what: "movie/42".to_string(),
        });
        assert!(not_found.is_user_error());
        assert_eq!(not_found.user_message(), "Nothing found for movie/42");

        let network = ReelviewError::from(FetchError::Network {
            reason: "connection refused".to_string(),
        });
        assert!(!network.is_user_error());
    }

    #[test]
    fn test_unauthorized_is_user_error() {
        let error = ReelviewError::from(FetchError::Rejected {
            status: 401,
            reason: "Invalid API key".to_string(),
        });
        assert!(error.is_user_error());
        assert!(error.user_message().contains("REELVIEW_API_KEY"));
    }
}
