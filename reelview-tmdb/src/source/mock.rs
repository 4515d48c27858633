//! Canned source for tests and offline runs.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reelview_core::domain::{Cast, Genre, ListKind, Media, MediaId, MediaPage, MediaType};

use super::MediaSource;
use crate::errors::TmdbError;

/// Source serving a small fixed catalogue and counting calls per endpoint.
#[derive(Debug)]
pub struct MockSource {
    catalogue: Vec<Media>,
    page_size: usize,
    latency: Option<Duration>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

fn title(
    id: MediaId,
    name: &str,
    media_type: MediaType,
    release_date: &str,
    genre_ids: &[u64],
    runtime: u32,
) -> Media {
    let mut media = Media::new(id, name, media_type);
    media.overview = format!("Overview of {name}.");
    media.release_date = Some(release_date.to_string());
    media.genre_ids = genre_ids.to_vec();
    media.poster_path = Some(format!("/poster-{id}.jpg"));
    media.vote_average = 8.0;
    media.popularity = id as f64 / 10.0;
    media.original_language = "en".to_string();
    media.runtime = Some(runtime);
    media.status = Some("Released".to_string());
    media
}

impl MockSource {
    /// Creates the source with four movies and two shows, 20 per page.
    pub fn new() -> Self {
        let catalogue = vec![
            title(603, "The Matrix", MediaType::Movie, "1999-03-31", &[28, 878], 136),
            title(550, "Fight Club", MediaType::Movie, "1999-10-15", &[18], 139),
            title(27205, "Inception", MediaType::Movie, "2010-07-15", &[28, 878], 148),
            title(157336, "Interstellar", MediaType::Movie, "2014-11-05", &[18, 878], 169),
            title(1396, "Breaking Bad", MediaType::Tv, "2008-01-20", &[18, 80], 47),
            title(1399, "Game of Thrones", MediaType::Tv, "2011-04-17", &[10765, 18], 60),
        ];

        Self {
            catalogue,
            page_size: 20,
            latency: None,
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Splits listings into pages of `page_size` titles.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Delays every response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes an endpoint (`list`, `search`, `details`, `similar`, `videos`,
    /// `cast`, `genres`) answer with HTTP 503 until `recover` is called.
    pub fn fail(&self, endpoint: &'static str) {
        self.failing.lock().insert(endpoint);
    }

    /// Undoes `fail`.
    pub fn recover(&self, endpoint: &'static str) {
        self.failing.lock().remove(endpoint);
    }

    /// Number of calls an endpoint has received.
    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or(0)
    }

    /// Calls across all endpoints.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    async fn enter(&self, endpoint: &'static str, path: String) -> Result<(), TmdbError> {
        *self.calls.lock().entry(endpoint).or_default() += 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.lock().contains(endpoint) {
            return Err(TmdbError::Status { status: 503, path });
        }
        Ok(())
    }

    fn find(&self, id: MediaId, media_type: MediaType) -> Result<&Media, TmdbError> {
        self.catalogue
            .iter()
            .find(|media| media.id == id && media.media_type == media_type)
            .ok_or_else(|| TmdbError::NotFound {
                path: format!("{media_type}/{id}"),
            })
    }

    /// Page `page` of the matching titles, stripped to listing fields.
    fn paginate<'a>(
        &self,
        matching: impl Iterator<Item = &'a Media>,
        page: u32,
        category: &str,
    ) -> MediaPage {
        let all: Vec<&Media> = matching.collect();
        let total_results = all.len() as u32;
        let total_pages = all.len().div_ceil(self.page_size).max(1) as u32;
        let start = (page.max(1) as usize - 1) * self.page_size;

        let results = all
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .map(|media| Media {
                category: category.to_string(),
                runtime: None,
                status: None,
                tagline: None,
                ..media.clone()
            })
            .collect::<Vec<_>>();

        MediaPage {
            page,
            total_pages,
            total_results,
            results,
        }
    }
}

#[async_trait]
impl MediaSource for MockSource {
    async fn media_list(&self, kind: ListKind, page: u32) -> Result<MediaPage, TmdbError> {
        self.enter("list", kind.path()).await?;
        let media_type = kind.media_type();
        let matching = self
            .catalogue
            .iter()
            .filter(|media| media_type.is_none_or(|t| media.media_type == t));
        Ok(self.paginate(matching, page, kind.label()))
    }

    async fn search(&self, query: &str, page: u32) -> Result<MediaPage, TmdbError> {
        self.enter("search", "search/multi".to_string()).await?;
        let needle = query.to_lowercase();
        let matching = self
            .catalogue
            .iter()
            .filter(|media| media.title.to_lowercase().contains(&needle));
        Ok(self.paginate(matching, page, "search"))
    }

    async fn details(&self, id: MediaId, media_type: MediaType) -> Result<Media, TmdbError> {
        self.enter("details", format!("{media_type}/{id}")).await?;
        let mut media = self.find(id, media_type)?.clone();
        media.tagline = Some(format!("The one and only {}.", media.title));
        Ok(media)
    }

    async fn similar(
        &self,
        id: MediaId,
        media_type: MediaType,
        page: u32,
    ) -> Result<MediaPage, TmdbError> {
        self.enter("similar", format!("{media_type}/{id}/similar"))
            .await?;
        self.find(id, media_type)?;
        let matching = self
            .catalogue
            .iter()
            .filter(|media| media.media_type == media_type && media.id != id);
        Ok(self.paginate(matching, page, "similar"))
    }

    async fn videos(&self, id: MediaId, media_type: MediaType) -> Result<Vec<String>, TmdbError> {
        self.enter("videos", format!("{media_type}/{id}/videos"))
            .await?;
        self.find(id, media_type)?;
        Ok(vec![format!("trailer-{id}"), format!("teaser-{id}")])
    }

    async fn cast(&self, id: MediaId, media_type: MediaType) -> Result<Vec<Cast>, TmdbError> {
        self.enter("cast", format!("{media_type}/{id}/credits"))
            .await?;
        self.find(id, media_type)?;
        Ok((0..3)
            .map(|order| Cast {
                id: id * 10 + u64::from(order),
                name: format!("Actor {order}"),
                original_name: format!("Actor {order}"),
                character: format!("Role {order}"),
                credit_id: format!("credit-{id}-{order}"),
                cast_id: Some(u64::from(order)),
                order,
                gender: 0,
                known_for_department: "Acting".to_string(),
                popularity: 1.0,
                profile_path: None,
                adult: false,
            })
            .collect())
    }

    async fn genres(&self, media_type: MediaType) -> Result<Vec<Genre>, TmdbError> {
        self.enter("genres", format!("genre/{media_type}/list"))
            .await?;
        let genres: &[(u64, &str)] = match media_type {
            MediaType::Movie => &[(28, "Action"), (18, "Drama"), (878, "Science Fiction")],
            MediaType::Tv => &[(18, "Drama"), (80, "Crime"), (10765, "Sci-Fi & Fantasy")],
        };
        Ok(genres
            .iter()
            .map(|(id, name)| Genre {
                id: *id,
                name: name.to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use reelview_core::domain::{Category, TimeWindow, TrendingScope};

    use super::*;

    #[tokio::test]
    async fn test_listing_pages_by_type() {
        let source = MockSource::new().with_page_size(3);
        let kind = ListKind::category(MediaType::Movie, Category::Popular);

        let first = source.media_list(kind, 1).await.unwrap();
        let second = source.media_list(kind, 2).await.unwrap();

        assert_eq!(first.total_pages, 2);
        assert_eq!(first.results.len(), 3);
        assert_eq!(second.results.len(), 1);
        assert!(first.results.iter().all(|m| m.runtime.is_none()));
        assert_eq!(first.results[0].category, "popular");
        assert_eq!(source.calls("list"), 2);
    }

    #[tokio::test]
    async fn test_trending_all_mixes_types() {
        let source = MockSource::new();
        let page = source
            .media_list(ListKind::trending(TrendingScope::All, TimeWindow::Day), 1)
            .await
            .unwrap();
        assert_eq!(page.results.len(), 6);
    }

    #[tokio::test]
    async fn test_failing_endpoint_recovers() {
        let source = MockSource::new();
        source.fail("details");

        let error = source.details(603, MediaType::Movie).await.unwrap_err();
        assert!(matches!(error, TmdbError::Status { status: 503, .. }));

        source.recover("details");
        let media = source.details(603, MediaType::Movie).await.unwrap();
        assert_eq!(media.runtime, Some(136));
        assert_eq!(source.calls("details"), 2);
    }

    #[tokio::test]
    async fn test_unknown_title_is_not_found() {
        let source = MockSource::new();
        let error = source.similar(603, MediaType::Tv, 1).await.unwrap_err();
        assert!(matches!(error, TmdbError::NotFound { .. }));
    }
}
