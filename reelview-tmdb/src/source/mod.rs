//! Remote sources of movie and show data.

use async_trait::async_trait;
use reelview_core::domain::{Cast, Genre, ListKind, Media, MediaId, MediaPage, MediaType};

use crate::errors::TmdbError;

pub mod mock;

pub use mock::MockSource;

/// One method per TMDB endpoint, already mapped onto domain types.
///
/// Implemented by `TmdbClient` for the live API and by `MockSource` for
/// tests and offline runs.
#[async_trait]
pub trait MediaSource: Send + Sync + std::fmt::Debug {
    /// Page of a category or trending listing.
    ///
    /// # Errors
    /// - `TmdbError::Network` - Request failed
    /// - `TmdbError::NotFound` - Category not offered for the media type
    async fn media_list(&self, kind: ListKind, page: u32) -> Result<MediaPage, TmdbError>;

    /// Page of multi search results, people excluded.
    ///
    /// # Errors
    /// - `TmdbError::Network` - Request failed
    async fn search(&self, query: &str, page: u32) -> Result<MediaPage, TmdbError>;

    /// Full details of a title.
    ///
    /// # Errors
    /// - `TmdbError::NotFound` - No title with this id
    async fn details(&self, id: MediaId, media_type: MediaType) -> Result<Media, TmdbError>;

    /// Page of titles similar to `id`.
    ///
    /// # Errors
    /// - `TmdbError::NotFound` - No title with this id
    async fn similar(
        &self,
        id: MediaId,
        media_type: MediaType,
        page: u32,
    ) -> Result<MediaPage, TmdbError>;

    /// YouTube keys of the title's videos.
    ///
    /// # Errors
    /// - `TmdbError::NotFound` - No title with this id
    async fn videos(&self, id: MediaId, media_type: MediaType) -> Result<Vec<String>, TmdbError>;

    /// Billed cast of the title.
    ///
    /// # Errors
    /// - `TmdbError::NotFound` - No title with this id
    async fn cast(&self, id: MediaId, media_type: MediaType) -> Result<Vec<Cast>, TmdbError>;

    /// Genre list of a media type.
    ///
    /// # Errors
    /// - `TmdbError::Network` - Request failed
    async fn genres(&self, media_type: MediaType) -> Result<Vec<Genre>, TmdbError>;
}
