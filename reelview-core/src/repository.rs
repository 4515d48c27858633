//! Repository ports the controllers fetch through.
//!
//! Implementations combine a remote source with an optional local cache and
//! expose every fetch as a `ResourceStream`. With `refresh == false` a cached
//! value may be served; `refresh == true` always goes to the remote source.

use async_trait::async_trait;

use crate::domain::{Cast, Genre, ListKind, Media, MediaId, MediaPage, MediaType};
use crate::resource::ResourceStream;

/// Listings, search and genres.
#[async_trait]
pub trait MediaRepository: Send + Sync + std::fmt::Debug {
    /// One page of a category or trending listing.
    fn media_list(&self, kind: ListKind, page: u32, refresh: bool) -> ResourceStream<MediaPage>;

    /// One page of a multi search across movies and shows.
    fn search(&self, query: &str, page: u32, refresh: bool) -> ResourceStream<MediaPage>;

    /// Genre list for a media type.
    fn genres(&self, media_type: MediaType, refresh: bool) -> ResourceStream<Vec<Genre>>;

    /// Looks up a title previously seen in a listing without touching the network.
    async fn item(&self, id: MediaId, media_type: MediaType, category: &str) -> Option<Media>;
}

/// Per-title fetches backing the details screen.
pub trait DetailsRepository: Send + Sync + std::fmt::Debug {
    /// Full details, including runtime, status and tagline.
    fn details(&self, id: MediaId, media_type: MediaType, refresh: bool) -> ResourceStream<Media>;

    /// Titles similar to the given one.
    fn similar(
        &self,
        id: MediaId,
        media_type: MediaType,
        page: u32,
        refresh: bool,
    ) -> ResourceStream<Vec<Media>>;

    /// Keys of the title's trailers and clips.
    fn videos(&self, id: MediaId, media_type: MediaType, refresh: bool)
    -> ResourceStream<Vec<String>>;

    /// Cast members in billing order.
    fn cast(&self, id: MediaId, media_type: MediaType, refresh: bool) -> ResourceStream<Vec<Cast>>;
}
