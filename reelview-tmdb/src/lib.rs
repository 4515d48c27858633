//! Reelview TMDB - Data access for the movie database
#![warn(missing_docs)]
//!
//! Talks to the TMDB v3 API, maps its DTOs onto the Reelview domain model and
//! serves both repository ports through an LRU response cache.

pub mod cache;
pub mod client;
pub mod dto;
pub mod errors;
pub mod repository;
pub mod source;

// Re-export main types
pub use cache::{CacheStatistics, ResponseCache};
pub use client::TmdbClient;
pub use errors::TmdbError;
pub use repository::CachedRepository;
pub use source::{MediaSource, MockSource};

/// Convenience type alias for Results with TmdbError.
pub type Result<T> = std::result::Result<T, TmdbError>;
