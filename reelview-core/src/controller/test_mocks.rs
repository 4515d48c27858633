//! In-memory repository used by controller tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Cast, Genre, ListKind, Media, MediaId, MediaPage, MediaType};
use crate::repository::{DetailsRepository, MediaRepository};
use crate::resource::{FetchError, ResourceStream, resource_stream};

/// Recorded repository call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { kind: ListKind, page: u32, refresh: bool },
    Search { query: String, page: u32, refresh: bool },
    Genres { media_type: MediaType },
    Details { id: MediaId, refresh: bool },
    Similar { id: MediaId, refresh: bool },
    Videos { id: MediaId, refresh: bool },
    Cast { id: MediaId, refresh: bool },
}

#[derive(Debug)]
struct Responses {
    items: HashMap<MediaId, Media>,
    details: Result<Media, FetchError>,
    similar: Result<Vec<Media>, FetchError>,
    videos: Result<Vec<String>, FetchError>,
    cast: Result<Vec<Cast>, FetchError>,
    total_pages: u32,
    /// Listing fetches still to fail before pages are served
    list_failures: u32,
    delays: HashMap<&'static str, Duration>,
}

#[derive(Debug)]
struct Inner {
    responses: Mutex<Responses>,
    calls: Mutex<Vec<Call>>,
}

/// Fake repository with canned responses and per-fetch delays.
#[derive(Debug, Clone)]
pub struct FakeRepository {
    inner: Arc<Inner>,
}

pub fn titles(ids: std::ops::Range<u64>, media_type: MediaType) -> Vec<Media> {
    ids.map(|id| Media::new(id, format!("Title {id}"), media_type))
        .collect()
}

impl FakeRepository {
    pub fn new() -> Self {
        let mut details = Media::new(603, "The Matrix", MediaType::Movie);
        details.runtime = Some(136);
        details.tagline = Some("Welcome to the Real World.".to_string());

        Self {
            inner: Arc::new(Inner {
                responses: Mutex::new(Responses {
                    items: HashMap::new(),
                    details: Ok(details),
                    similar: Ok(titles(1000..1015, MediaType::Movie)),
                    videos: Ok(vec!["vKQi3bBA1y8".to_string(), "m8e-FF8MsqU".to_string()]),
                    cast: Ok(Vec::new()),
                    total_pages: 3,
                    list_failures: 0,
                    delays: HashMap::new(),
                }),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_item(self, media: Media) -> Self {
        self.inner.responses.lock().items.insert(media.id, media);
        self
    }

    pub fn with_similar(self, similar: Result<Vec<Media>, FetchError>) -> Self {
        self.inner.responses.lock().similar = similar;
        self
    }

    pub fn with_videos(self, videos: Result<Vec<String>, FetchError>) -> Self {
        self.inner.responses.lock().videos = videos;
        self
    }

    pub fn with_details(self, details: Result<Media, FetchError>) -> Self {
        self.inner.responses.lock().details = details;
        self
    }

    pub fn with_total_pages(self, total_pages: u32) -> Self {
        self.inner.responses.lock().total_pages = total_pages;
        self
    }

    /// Fails the next `count` listing fetches.
    pub fn with_list_failures(self, count: u32) -> Self {
        self.inner.responses.lock().list_failures = count;
        self
    }

    /// Delays the named fetch (`details`, `similar`, `videos`, `cast`, `search`, `list`).
    pub fn with_delay(self, fetch: &'static str, delay: Duration) -> Self {
        self.inner.responses.lock().delays.insert(fetch, delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().clone()
    }

    fn fetch<T, F>(&self, name: &'static str, call: Call, respond: F) -> ResourceStream<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Responses) -> Result<T, FetchError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        resource_stream(async move {
            let delay = inner.responses.lock().delays.get(name).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            inner.calls.lock().push(call);
            let mut responses = inner.responses.lock();
            respond(&mut responses)
        })
    }
}

fn generated_page(kind_label: &str, page: u32, total_pages: u32, media_type: MediaType) -> MediaPage {
    let start = u64::from(page) * 100;
    let mut results = titles(start..start + 20, media_type);
    for media in &mut results {
        media.category = kind_label.to_string();
    }
    MediaPage {
        page,
        results,
        total_pages,
        total_results: total_pages * 20,
    }
}

#[async_trait]
impl MediaRepository for FakeRepository {
    fn media_list(&self, kind: ListKind, page: u32, refresh: bool) -> ResourceStream<MediaPage> {
        let call = Call::List {
            kind,
            page,
            refresh,
        };
        self.fetch("list", call, move |responses| {
            if responses.list_failures > 0 {
                responses.list_failures -= 1;
                return Err(FetchError::Network {
                    reason: "connection reset".to_string(),
                });
            }
            Ok(generated_page(
                kind.label(),
                page,
                responses.total_pages,
                kind.media_type().unwrap_or(MediaType::Movie),
            ))
        })
    }

    fn search(&self, query: &str, page: u32, refresh: bool) -> ResourceStream<MediaPage> {
        let call = Call::Search {
            query: query.to_string(),
            page,
            refresh,
        };
        self.fetch("search", call, move |responses| {
            Ok(generated_page("search", page, responses.total_pages, MediaType::Tv))
        })
    }

    fn genres(&self, media_type: MediaType, _refresh: bool) -> ResourceStream<Vec<Genre>> {
        self.fetch("genres", Call::Genres { media_type }, move |_| {
            let name = match media_type {
                MediaType::Movie => "Action",
                MediaType::Tv => "Action & Adventure",
            };
            Ok(vec![Genre {
                id: 28,
                name: name.to_string(),
            }])
        })
    }

    async fn item(&self, id: MediaId, _media_type: MediaType, _category: &str) -> Option<Media> {
        self.inner.responses.lock().items.get(&id).cloned()
    }
}

impl DetailsRepository for FakeRepository {
    fn details(&self, id: MediaId, _media_type: MediaType, refresh: bool) -> ResourceStream<Media> {
        self.fetch("details", Call::Details { id, refresh }, |responses| {
            responses.details.clone()
        })
    }

    fn similar(
        &self,
        id: MediaId,
        _media_type: MediaType,
        _page: u32,
        refresh: bool,
    ) -> ResourceStream<Vec<Media>> {
        self.fetch("similar", Call::Similar { id, refresh }, |responses| {
            responses.similar.clone()
        })
    }

    fn videos(
        &self,
        id: MediaId,
        _media_type: MediaType,
        refresh: bool,
    ) -> ResourceStream<Vec<String>> {
        self.fetch("videos", Call::Videos { id, refresh }, |responses| {
            responses.videos.clone()
        })
    }

    fn cast(&self, id: MediaId, _media_type: MediaType, refresh: bool) -> ResourceStream<Vec<Cast>> {
        self.fetch("cast", Call::Cast { id, refresh }, |responses| {
            responses.cast.clone()
        })
    }
}
