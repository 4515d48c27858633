//! Wire formats of the TMDB v3 API and their mapping onto domain types.
//!
//! TMDB uses different field names for movies and shows (`title` vs `name`,
//! `release_date` vs `first_air_date`) and omits most fields freely, so every
//! DTO field is optional and the mapping applies the fallbacks.

use chrono::NaiveDate;
use reelview_core::domain::{Cast, Genre, Media, MediaPage, MediaType};
use serde::Deserialize;

/// Paged listing: category, trending, search and similar endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaListDto {
    #[serde(default)]
    pub(crate) page: u32,
    #[serde(default)]
    pub(crate) results: Vec<MediaDto>,
    #[serde(default)]
    pub(crate) total_pages: u32,
    #[serde(default)]
    pub(crate) total_results: u32,
}

impl MediaListDto {
    /// Maps every usable entry, tagging each with `category`.
    ///
    /// `fallback` is the media type of single-type listings. Entries with any
    /// other `media_type` (`person` in multi search) are dropped.
    pub fn into_page(self, fallback: Option<MediaType>, category: &str) -> MediaPage {
        let received = self.results.len();
        let results: Vec<Media> = self
            .results
            .into_iter()
            .filter_map(|dto| dto.into_media(fallback, category))
            .collect();

        if results.len() != received {
            tracing::debug!(
                received,
                kept = results.len(),
                category,
                "Dropped entries that are not movies or shows"
            );
        }

        MediaPage {
            page: self.page,
            results,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

/// A movie or show as any endpoint returns it; details add the tail fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaDto {
    pub(crate) id: u64,
    pub(crate) title: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) original_title: Option<String>,
    pub(crate) original_name: Option<String>,
    pub(crate) overview: Option<String>,
    pub(crate) media_type: Option<String>,
    pub(crate) popularity: Option<f64>,
    pub(crate) poster_path: Option<String>,
    pub(crate) backdrop_path: Option<String>,
    pub(crate) release_date: Option<String>,
    pub(crate) first_air_date: Option<String>,
    pub(crate) vote_average: Option<f64>,
    pub(crate) vote_count: Option<u64>,
    #[serde(default)]
    pub(crate) genre_ids: Vec<u64>,
    /// Details carry genre objects instead of ids
    #[serde(default)]
    pub(crate) genres: Vec<Genre>,
    pub(crate) original_language: Option<String>,
    pub(crate) adult: Option<bool>,
    pub(crate) runtime: Option<u32>,
    #[serde(default)]
    pub(crate) episode_run_time: Vec<u32>,
    pub(crate) status: Option<String>,
    pub(crate) tagline: Option<String>,
}

impl MediaDto {
    /// Maps onto `Media`, or `None` when the entry is neither a movie nor a show.
    pub fn into_media(self, fallback: Option<MediaType>, category: &str) -> Option<Media> {
        let media_type = match self.media_type.as_deref() {
            Some(value) => value.parse::<MediaType>().ok()?,
            None => fallback?,
        };

        let title = non_empty(self.title)
            .or_else(|| non_empty(self.name.clone()))
            .or_else(|| non_empty(self.original_title.clone()))
            .or_else(|| non_empty(self.original_name.clone()))
            .unwrap_or_default();
        let original_title = non_empty(self.original_title)
            .or_else(|| non_empty(self.original_name))
            .unwrap_or_else(|| title.clone());

        let release_date = valid_date(self.release_date).or_else(|| valid_date(self.first_air_date));

        let genre_ids = if self.genre_ids.is_empty() {
            self.genres.iter().map(|genre| genre.id).collect()
        } else {
            self.genre_ids
        };

        let runtime = self
            .runtime
            .filter(|minutes| *minutes > 0)
            .or_else(|| self.episode_run_time.first().copied());

        Some(Media {
            id: self.id,
            title,
            original_title,
            overview: self.overview.unwrap_or_default(),
            media_type,
            category: category.to_string(),
            popularity: self.popularity.unwrap_or_default(),
            poster_path: non_empty(self.poster_path),
            backdrop_path: non_empty(self.backdrop_path),
            release_date,
            vote_average: self.vote_average.unwrap_or_default(),
            vote_count: self.vote_count.unwrap_or_default(),
            genre_ids,
            original_language: self.original_language.unwrap_or_default(),
            adult: self.adult.unwrap_or_default(),
            runtime,
            status: non_empty(self.status),
            tagline: non_empty(self.tagline),
        })
    }
}

/// `{type}/{id}/videos`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListDto {
    #[serde(default)]
    pub(crate) results: Vec<VideoDto>,
}

/// One trailer, teaser or clip.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoDto {
    #[serde(default)]
    pub(crate) key: String,
    #[serde(default)]
    pub(crate) site: String,
    #[serde(default, rename = "type")]
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) name: String,
}

impl VideoListDto {
    /// Keys of the videos hosted on YouTube, in API order.
    pub fn youtube_keys(self) -> Vec<String> {
        self.results
            .into_iter()
            .filter(|video| video.site.eq_ignore_ascii_case("youtube") && !video.key.is_empty())
            .inspect(|video| tracing::trace!(name = %video.name, kind = %video.kind, "Video"))
            .map(|video| video.key)
            .collect()
    }
}

/// `{type}/{id}/credits`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditsDto {
    #[serde(default)]
    pub(crate) cast: Vec<CastDto>,
}

/// Cast entry of a credits response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastDto {
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) name: String,
    pub(crate) original_name: Option<String>,
    #[serde(default)]
    pub(crate) character: String,
    #[serde(default)]
    pub(crate) credit_id: String,
    pub(crate) cast_id: Option<u64>,
    #[serde(default)]
    pub(crate) order: u32,
    #[serde(default)]
    pub(crate) gender: u8,
    #[serde(default)]
    pub(crate) known_for_department: String,
    #[serde(default)]
    pub(crate) popularity: f64,
    pub(crate) profile_path: Option<String>,
    #[serde(default)]
    pub(crate) adult: bool,
}

impl CreditsDto {
    /// Cast members sorted by billing order.
    pub fn into_cast(self) -> Vec<Cast> {
        let mut cast: Vec<Cast> = self
            .cast
            .into_iter()
            .map(|dto| Cast {
                id: dto.id,
                original_name: dto.original_name.unwrap_or_else(|| dto.name.clone()),
                name: dto.name,
                character: dto.character,
                credit_id: dto.credit_id,
                cast_id: dto.cast_id,
                order: dto.order,
                gender: dto.gender,
                known_for_department: dto.known_for_department,
                popularity: dto.popularity,
                profile_path: non_empty(dto.profile_path),
                adult: dto.adult,
            })
            .collect();
        cast.sort_by_key(|member| member.order);
        cast
    }
}

/// `genre/{type}/list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreListDto {
    #[serde(default)]
    pub(crate) genres: Vec<Genre>,
}

/// Error body TMDB sends with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusDto {
    #[serde(default)]
    pub(crate) status_code: u32,
    #[serde(default)]
    pub(crate) status_message: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// TMDB sends `""` for unknown dates.
fn valid_date(value: Option<String>) -> Option<String> {
    value.filter(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_list(json: &str) -> MediaListDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_show_fields_fall_back() {
        let list = parse_list(
            r#"{
                "page": 1,
                "results": [{
                    "id": 1399,
                    "name": "Game of Thrones",
                    "original_name": "Game of Thrones",
                    "first_air_date": "2011-04-17",
                    "genre_ids": [10765, 18],
                    "poster_path": "/1XS1oqL89opfnbLl8WnZY1O1uJx.jpg",
                    "vote_average": 8.4
                }],
                "total_pages": 7,
                "total_results": 140
            }"#,
        );

        let page = list.into_page(Some(MediaType::Tv), "top_rated");
        let show = &page.results[0];
        assert_eq!(show.title, "Game of Thrones");
        assert_eq!(show.media_type, MediaType::Tv);
        assert_eq!(show.category, "top_rated");
        assert_eq!(show.release_year(), Some(2011));
        assert_eq!(show.genre_ids, vec![10765, 18]);
        assert_eq!(page.total_pages, 7);
    }

    #[test]
    fn test_multi_search_drops_people() {
        let list = parse_list(
            r#"{
                "page": 1,
                "results": [
                    {"id": 603, "title": "The Matrix", "media_type": "movie"},
                    {"id": 6384, "name": "Keanu Reeves", "media_type": "person"},
                    {"id": 1396, "name": "Breaking Bad", "media_type": "tv"}
                ],
                "total_pages": 1,
                "total_results": 3
            }"#,
        );

        let page = list.into_page(None, "search");
        let ids: Vec<_> = page.results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![603, 1396]);
        assert_eq!(page.results[1].media_type, MediaType::Tv);
    }

    #[test]
    fn test_mixed_listing_without_type_is_dropped() {
        let list = parse_list(r#"{"results": [{"id": 1, "title": "Untyped"}]}"#);
        assert!(list.into_page(None, "trending").results.is_empty());
    }

    #[test]
    fn test_empty_dates_and_paths_become_none() {
        let dto: MediaDto = serde_json::from_str(
            r#"{"id": 7, "title": "Unreleased", "release_date": "", "poster_path": ""}"#,
        )
        .unwrap();
        let media = dto.into_media(Some(MediaType::Movie), "upcoming").unwrap();

        assert_eq!(media.release_date, None);
        assert_eq!(media.poster_path, None);
        assert_eq!(media.original_title, "Unreleased");
    }

    #[test]
    fn test_details_runtime_and_genres() {
        let movie: MediaDto = serde_json::from_str(
            r#"{
                "id": 603,
                "title": "The Matrix",
                "runtime": 136,
                "status": "Released",
                "tagline": "Welcome to the Real World.",
                "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]
            }"#,
        )
        .unwrap();
        let movie = movie.into_media(Some(MediaType::Movie), "").unwrap();
        assert_eq!(movie.runtime, Some(136));
        assert_eq!(movie.genre_ids, vec![28, 878]);
        assert_eq!(movie.status.as_deref(), Some("Released"));

        let show: MediaDto = serde_json::from_str(
            r#"{"id": 1396, "name": "Breaking Bad", "episode_run_time": [45, 47]}"#,
        )
        .unwrap();
        let show = show.into_media(Some(MediaType::Tv), "").unwrap();
        assert_eq!(show.runtime, Some(45));
    }

    #[test]
    fn test_youtube_keys_only() {
        let videos: VideoListDto = serde_json::from_str(
            r#"{"id": 603, "results": [
                {"key": "vKQi3bBA1y8", "site": "YouTube", "type": "Trailer", "name": "Official Trailer"},
                {"key": "1234", "site": "Vimeo", "type": "Clip", "name": "Clip"},
                {"key": "m8e-FF8MsqU", "site": "YouTube", "type": "Teaser", "name": "Teaser"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(videos.youtube_keys(), vec!["vKQi3bBA1y8", "m8e-FF8MsqU"]);
    }

    #[test]
    fn test_cast_sorted_by_order() {
        let credits: CreditsDto = serde_json::from_str(
            r#"{"id": 603, "cast": [
                {"id": 2975, "name": "Laurence Fishburne", "character": "Morpheus", "order": 1, "credit_id": "52fe425bc3a36847f80181c1"},
                {"id": 6384, "name": "Keanu Reeves", "character": "Neo", "order": 0, "cast_id": 34, "profile_path": "/4D0PpNI0kmP58hgrwGC3wCjxhnm.jpg"}
            ]}"#,
        )
        .unwrap();

        let cast = credits.into_cast();
        assert_eq!(cast[0].name, "Keanu Reeves");
        assert_eq!(cast[0].original_name, "Keanu Reeves");
        assert_eq!(cast[0].cast_id, Some(34));
        assert_eq!(cast[1].character, "Morpheus");
        assert_eq!(cast[1].profile_path, None);
    }
}
