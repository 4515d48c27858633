//! HTTP client for the TMDB v3 API.

use std::time::Duration;

use async_trait::async_trait;
use reelview_core::config::ApiConfig;
use reelview_core::domain::{Cast, Genre, ListKind, Media, MediaId, MediaPage, MediaType};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::dto::{CreditsDto, GenreListDto, MediaDto, MediaListDto, StatusDto, VideoListDto};
use crate::errors::TmdbError;
use crate::source::MediaSource;

/// TMDB API client.
///
/// Every request is a `GET` below the configured base URL carrying the
/// `api_key` query parameter.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl TmdbClient {
    /// Creates a client from the API section of the configuration.
    ///
    /// # Errors
    /// - `TmdbError::MissingApiKey` - No key configured
    /// - `TmdbError::InvalidUrl` - Base URL does not parse
    /// - `TmdbError::Network` - HTTP client could not be built
    pub fn new(config: &ApiConfig) -> Result<Self, TmdbError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(TmdbError::MissingApiKey)?;

        Self::build(
            &config.base_url,
            api_key,
            config.request_timeout,
            &config.user_agent,
        )
    }

    fn build(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, TmdbError> {
        // `Url::join` replaces the last segment unless the base ends in '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| TmdbError::InvalidUrl {
            reason: format!("{normalized}: {e}"),
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TmdbError::Network {
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full request URL for an endpoint path, without query parameters.
    ///
    /// # Errors
    /// - `TmdbError::InvalidUrl` - Path cannot be joined onto the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, TmdbError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TmdbError::InvalidUrl {
                reason: format!("{path}: {e}"),
            })
    }

    /// Performs a GET request and decodes the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let url = self.endpoint(path)?;
        tracing::debug!(path, ?params, "TMDB request");

        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| TmdbError::Network {
                reason: format!("Request to {path} failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<StatusDto>().await.unwrap_or_default();
            tracing::debug!(
                path,
                status = status.as_u16(),
                code = body.status_code,
                message = %body.status_message,
                "TMDB request rejected"
            );
            return Err(status_error(status, path, body.status_message));
        }

        let bytes = response.bytes().await.map_err(|e| TmdbError::Network {
            reason: format!("Reading response from {path} failed: {e}"),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| TmdbError::Parse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Maps a non-success status onto the error taxonomy.
fn status_error(status: StatusCode, path: &str, message: String) -> TmdbError {
    match status {
        StatusCode::UNAUTHORIZED => TmdbError::Unauthorized {
            message: if message.is_empty() {
                "API key rejected".to_string()
            } else {
                message
            },
        },
        StatusCode::NOT_FOUND => TmdbError::NotFound {
            path: path.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => TmdbError::RateLimited,
        other => TmdbError::Status {
            status: other.as_u16(),
            path: path.to_string(),
        },
    }
}

fn page_param(page: u32) -> (&'static str, String) {
    ("page", page.max(1).to_string())
}

#[async_trait]
impl MediaSource for TmdbClient {
    async fn media_list(&self, kind: ListKind, page: u32) -> Result<MediaPage, TmdbError> {
        let list: MediaListDto = self.get(&kind.path(), &[page_param(page)]).await?;
        Ok(list.into_page(kind.media_type(), kind.label()))
    }

    async fn search(&self, query: &str, page: u32) -> Result<MediaPage, TmdbError> {
        let list: MediaListDto = self
            .get(
                "search/multi",
                &[("query", query.to_string()), page_param(page)],
            )
            .await?;
        Ok(list.into_page(None, "search"))
    }

    async fn details(&self, id: MediaId, media_type: MediaType) -> Result<Media, TmdbError> {
        let path = format!("{media_type}/{id}");
        let dto: MediaDto = self.get(&path, &[]).await?;
        dto.into_media(Some(media_type), "")
            .ok_or_else(|| TmdbError::InvalidMediaType {
                media_type: media_type.to_string(),
            })
    }

    async fn similar(
        &self,
        id: MediaId,
        media_type: MediaType,
        page: u32,
    ) -> Result<MediaPage, TmdbError> {
        let path = format!("{media_type}/{id}/similar");
        let list: MediaListDto = self.get(&path, &[page_param(page)]).await?;
        Ok(list.into_page(Some(media_type), "similar"))
    }

    async fn videos(&self, id: MediaId, media_type: MediaType) -> Result<Vec<String>, TmdbError> {
        let path = format!("{media_type}/{id}/videos");
        let videos: VideoListDto = self.get(&path, &[]).await?;
        Ok(videos.youtube_keys())
    }

    async fn cast(&self, id: MediaId, media_type: MediaType) -> Result<Vec<Cast>, TmdbError> {
        let path = format!("{media_type}/{id}/credits");
        let credits: CreditsDto = self.get(&path, &[]).await?;
        Ok(credits.into_cast())
    }

    async fn genres(&self, media_type: MediaType) -> Result<Vec<Genre>, TmdbError> {
        let path = format!("genre/{media_type}/list");
        let list: GenreListDto = self.get(&path, &[]).await?;
        Ok(list.genres)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            api_key: Some("secret".to_string()),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_missing_or_blank_key_is_rejected() {
        let mut api = config("https://api.themoviedb.org/3/");
        api.api_key = None;
        assert!(matches!(
            TmdbClient::new(&api),
            Err(TmdbError::MissingApiKey)
        ));

        api.api_key = Some("   ".to_string());
        assert!(matches!(
            TmdbClient::new(&api),
            Err(TmdbError::MissingApiKey)
        ));
    }

    #[test]
    fn test_endpoints_keep_the_version_segment() {
        let client = TmdbClient::new(&config("https://api.themoviedb.org/3")).unwrap();

        assert_eq!(
            client.endpoint("movie/popular").unwrap().as_str(),
            "https://api.themoviedb.org/3/movie/popular"
        );
        assert_eq!(
            client.endpoint("/trending/all/day").unwrap().as_str(),
            "https://api.themoviedb.org/3/trending/all/day"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = TmdbClient::new(&config("not a url"));
        assert!(matches!(result, Err(TmdbError::InvalidUrl { .. })));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "movie/popular", String::new()),
            TmdbError::Unauthorized { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "movie/0", String::new()),
            TmdbError::NotFound { path } if path == "movie/0"
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "search/multi", String::new()),
            TmdbError::RateLimited
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "tv/1396", String::new()),
            TmdbError::Status { status: 502, .. }
        ));
    }

    #[test]
    fn test_page_param_is_at_least_one() {
        assert_eq!(page_param(0), ("page", "1".to_string()));
        assert_eq!(page_param(3), ("page", "3".to_string()));
    }
}
