//! Repository ports backed by a `MediaSource` and per-kind response caches.
//!
//! A non-refresh fetch with a cache hit is answered without touching the
//! source. Every other fetch goes to the source and stores its success,
//! so a refresh also overwrites what was cached. Titles seen in any page
//! are indexed for the local `item` lookup.

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use reelview_core::config::CacheConfig;
use reelview_core::domain::{Cast, Genre, ListKind, Media, MediaId, MediaPage, MediaType};
use reelview_core::repository::{DetailsRepository, MediaRepository};
use reelview_core::resource::{FetchError, ResourceStream, cached_stream, resource_stream};

use crate::cache::{CacheStatistics, ResponseCache};
use crate::errors::TmdbError;
use crate::source::MediaSource;

/// Titles indexed per cached page entry.
const ITEMS_PER_PAGE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PageKey {
    List(ListKind, u32),
    Search(String, u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    media_type: MediaType,
    id: MediaId,
    category: String,
}

type TitleKey = (MediaType, MediaId);

#[derive(Debug)]
struct Inner<S> {
    source: S,
    pages: ResponseCache<PageKey, MediaPage>,
    details: ResponseCache<TitleKey, Media>,
    similar: ResponseCache<(MediaType, MediaId, u32), Vec<Media>>,
    videos: ResponseCache<TitleKey, Vec<String>>,
    cast: ResponseCache<TitleKey, Vec<Cast>>,
    genres: ResponseCache<MediaType, Vec<Genre>>,
    items: ResponseCache<ItemKey, Media>,
}

impl<S> Inner<S> {
    fn index(&self, titles: &[Media]) {
        for media in titles {
            let key = ItemKey {
                media_type: media.media_type,
                id: media.id,
                category: media.category.clone(),
            };
            self.items.put(key, media.clone());
        }
    }
}

/// Caching repository over any `MediaSource`.
///
/// Cheap to clone; clones share the caches.
#[derive(Debug)]
pub struct CachedRepository<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for CachedRepository<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: MediaSource + 'static> CachedRepository<S> {
    /// Creates the repository with `config.max_entries` entries per cache.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let capacity = config.max_entries;
        Self {
            inner: Arc::new(Inner {
                source,
                pages: ResponseCache::new(capacity),
                details: ResponseCache::new(capacity),
                similar: ResponseCache::new(capacity),
                videos: ResponseCache::new(capacity),
                cast: ResponseCache::new(capacity),
                genres: ResponseCache::new(capacity),
                items: ResponseCache::new(capacity.saturating_mul(ITEMS_PER_PAGE)),
            }),
        }
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Combined counters of every response cache, the item index excluded.
    pub fn statistics(&self) -> CacheStatistics {
        let inner = &self.inner;
        [
            inner.pages.statistics(),
            inner.details.statistics(),
            inner.similar.statistics(),
            inner.videos.statistics(),
            inner.cast.statistics(),
            inner.genres.statistics(),
        ]
        .into_iter()
        .fold(CacheStatistics::default(), CacheStatistics::merge)
    }

    /// Serves `key` from the cache selected by `select` unless `refresh` is
    /// set; otherwise runs `fetch` and caches its success.
    fn cached<K, V, F, Fut>(
        &self,
        select: fn(&Inner<S>) -> &ResponseCache<K, V>,
        key: K,
        refresh: bool,
        fetch: F,
    ) -> ResourceStream<V>
    where
        K: Hash + Eq + Debug + Send + 'static,
        V: Clone + Send + 'static,
        F: FnOnce(Arc<Inner<S>>) -> Fut,
        Fut: Future<Output = Result<V, TmdbError>> + Send + 'static,
    {
        if !refresh {
            if let Some(value) = select(&self.inner).get(&key) {
                tracing::debug!(?key, "Cache hit");
                return cached_stream(value);
            }
        }

        let inner = Arc::clone(&self.inner);
        let request = fetch(Arc::clone(&inner));
        resource_stream(async move {
            let value = request.await.map_err(FetchError::from)?;
            tracing::debug!(?key, refresh, "Cached fresh response");
            select(&inner).put(key, value.clone());
            Ok(value)
        })
    }
}

#[async_trait]
impl<S: MediaSource + 'static> MediaRepository for CachedRepository<S> {
    fn media_list(&self, kind: ListKind, page: u32, refresh: bool) -> ResourceStream<MediaPage> {
        self.cached(
            |inner| &inner.pages,
            PageKey::List(kind, page),
            refresh,
            move |inner| async move {
                let result = inner.source.media_list(kind, page).await?;
                inner.index(&result.results);
                Ok::<_, TmdbError>(result)
            },
        )
    }

    fn search(&self, query: &str, page: u32, refresh: bool) -> ResourceStream<MediaPage> {
        let query = query.trim().to_string();
        self.cached(
            |inner| &inner.pages,
            PageKey::Search(query.to_lowercase(), page),
            refresh,
            move |inner| async move {
                let result = inner.source.search(&query, page).await?;
                inner.index(&result.results);
                Ok::<_, TmdbError>(result)
            },
        )
    }

    fn genres(&self, media_type: MediaType, refresh: bool) -> ResourceStream<Vec<Genre>> {
        self.cached(
            |inner| &inner.genres,
            media_type,
            refresh,
            move |inner| async move { inner.source.genres(media_type).await },
        )
    }

    async fn item(&self, id: MediaId, media_type: MediaType, category: &str) -> Option<Media> {
        let key = ItemKey {
            media_type,
            id,
            category: category.to_string(),
        };
        let found = self.inner.items.get(&key).or_else(|| {
            self.inner
                .items
                .find(|key, _| key.id == id && key.media_type == media_type)
        });
        if found.is_none() {
            tracing::debug!(id, %media_type, category, "Title not in any loaded listing");
        }
        found
    }
}

impl<S: MediaSource + 'static> DetailsRepository for CachedRepository<S> {
    fn details(&self, id: MediaId, media_type: MediaType, refresh: bool) -> ResourceStream<Media> {
        self.cached(
            |inner| &inner.details,
            (media_type, id),
            refresh,
            move |inner| async move { inner.source.details(id, media_type).await },
        )
    }

    fn similar(
        &self,
        id: MediaId,
        media_type: MediaType,
        page: u32,
        refresh: bool,
    ) -> ResourceStream<Vec<Media>> {
        self.cached(
            |inner| &inner.similar,
            (media_type, id, page),
            refresh,
            move |inner| async move {
                let result = inner.source.similar(id, media_type, page).await?;
                inner.index(&result.results);
                Ok::<_, TmdbError>(result.results)
            },
        )
    }

    fn videos(
        &self,
        id: MediaId,
        media_type: MediaType,
        refresh: bool,
    ) -> ResourceStream<Vec<String>> {
        self.cached(
            |inner| &inner.videos,
            (media_type, id),
            refresh,
            move |inner| async move { inner.source.videos(id, media_type).await },
        )
    }

    fn cast(&self, id: MediaId, media_type: MediaType, refresh: bool) -> ResourceStream<Vec<Cast>> {
        self.cached(
            |inner| &inner.cast,
            (media_type, id),
            refresh,
            move |inner| async move { inner.source.cast(id, media_type).await },
        )
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use reelview_core::domain::Category;
    use reelview_core::resource::Resource;

    use super::*;
    use crate::source::MockSource;

    fn repository() -> CachedRepository<MockSource> {
        CachedRepository::new(MockSource::new(), &CacheConfig::default())
    }

    fn popular() -> ListKind {
        ListKind::category(MediaType::Movie, Category::Popular)
    }

    async fn outcome<T>(stream: ResourceStream<T>) -> Resource<T> {
        let emissions: Vec<_> = stream.collect().await;
        assert_eq!(emissions.len(), 3);
        emissions
            .into_iter()
            .nth(1)
            .unwrap()
    }

    #[tokio::test]
    async fn test_second_load_is_served_from_cache() {
        let repository = repository();

        let first = outcome(repository.media_list(popular(), 1, false)).await;
        let second = outcome(repository.media_list(popular(), 1, false)).await;

        assert_eq!(first, second);
        assert_eq!(repository.source().calls("list"), 1);
        assert_eq!(repository.statistics().hit_count, 1);
    }

    #[tokio::test]
    async fn test_refresh_always_hits_the_source() {
        let repository = repository();

        outcome(repository.details(603, MediaType::Movie, false)).await;
        outcome(repository.details(603, MediaType::Movie, true)).await;
        outcome(repository.details(603, MediaType::Movie, true)).await;

        assert_eq!(repository.source().calls("details"), 3);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let repository = repository();
        repository.source().fail("videos");

        let failed = outcome(repository.videos(603, MediaType::Movie, false)).await;
        assert!(matches!(
            failed,
            Resource::Error(FetchError::Rejected { status: 503, .. })
        ));

        repository.source().recover("videos");
        let videos = outcome(repository.videos(603, MediaType::Movie, false)).await;
        assert_eq!(
            videos,
            Resource::Success(vec!["trailer-603".to_string(), "teaser-603".to_string()])
        );
        assert_eq!(repository.source().calls("videos"), 2);
    }

    #[tokio::test]
    async fn test_listed_titles_resolve_locally() {
        let repository = repository();
        assert_eq!(repository.item(603, MediaType::Movie, "popular").await, None);

        outcome(repository.media_list(popular(), 1, false)).await;

        let item = repository
            .item(603, MediaType::Movie, "popular")
            .await
            .unwrap();
        assert_eq!(item.category, "popular");
        assert_eq!(item.runtime, None);

        let other_listing = repository.item(603, MediaType::Movie, "search").await;
        assert_eq!(other_listing.map(|m| m.id), Some(603));
        assert_eq!(repository.item(603, MediaType::Tv, "popular").await, None);
    }

    #[tokio::test]
    async fn test_search_key_ignores_case_and_padding() {
        let repository = repository();

        outcome(repository.search("Matrix", 1, false)).await;
        let again = outcome(repository.search("  matrix ", 1, false)).await;

        assert_eq!(repository.source().calls("search"), 1);
        match again {
            Resource::Success(page) => assert_eq!(page.results[0].title, "The Matrix"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_similar_returns_page_results() {
        let repository = repository();
        let similar = outcome(repository.similar(1396, MediaType::Tv, 1, false)).await;

        assert_eq!(
            similar.map(|list| list.iter().map(|m| m.id).collect::<Vec<_>>()),
            Resource::Success(vec![1399])
        );
    }
}
