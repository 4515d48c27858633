//! Fixture TMDB server for Reelview integration tests
//!
//! Serves canned v3 responses below `/3/` on an ephemeral local port and
//! records every request it receives.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use parking_lot::Mutex;
use reelview_core::config::{ApiConfig, CacheConfig, ControllerConfig, ReelviewConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Key the fixture server accepts.
pub const FIXTURE_API_KEY: &str = "fixture-key";

/// Movie id that always answers 429.
pub const RATE_LIMITED_ID: u64 = 429;

/// One request as the server saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Path relative to the API root, without the leading `/3/`
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
struct FixtureState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Running fixture server, stopped on drop.
#[derive(Debug)]
pub struct FixtureServer {
    address: SocketAddr,
    state: FixtureState,
    task: JoinHandle<()>,
}

impl FixtureServer {
    /// Binds to `127.0.0.1:0` and starts serving.
    ///
    /// # Panics
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = FixtureState::default();
        let app = Router::new()
            .fallback(handle_request)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture listener");
        let address = listener.local_addr().expect("fixture address");

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Fixture server stopped: {e}");
            }
        });

        Self {
            address,
            state,
            task,
        }
    }

    /// API root as the client should be configured with it.
    pub fn base_url(&self) -> String {
        format!("http://{}/3", self.address)
    }

    /// API section pointing at this server with the accepted key.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url(),
            api_key: Some(FIXTURE_API_KEY.to_string()),
            ..ReelviewConfig::for_testing().api
        }
    }

    /// Full configuration pointing at this server.
    pub fn config(&self) -> ReelviewConfig {
        ReelviewConfig {
            api: self.api_config(),
            cache: CacheConfig::default(),
            controller: ControllerConfig {
                search_debounce: std::time::Duration::ZERO,
                ..ControllerConfig::default()
            },
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Requests received for one path.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_request(
    State(state): State<FixtureState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let path = uri.path().trim_start_matches("/3/").to_string();
    state.requests.lock().push(RecordedRequest {
        path: path.clone(),
        query: query.clone(),
    });

    if query.get("api_key").map(String::as_str) != Some(FIXTURE_API_KEY) {
        return status(
            StatusCode::UNAUTHORIZED,
            7,
            "Invalid API key: You must be granted a valid key.",
        );
    }

    let page: u32 = query
        .get("page")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);

    let body = match path.as_str() {
        "movie/popular" => popular_movies(page),
        "trending/all/day" => trending(),
        "search/multi" => search(query.get("query").map(String::as_str).unwrap_or_default()),
        "movie/603" => matrix_details(),
        "tv/1396" => breaking_bad_details(),
        "movie/603/similar" => listing(1, 1, vec![movie(550, "Fight Club", "1999-10-15")]),
        "movie/603/videos" => matrix_videos(),
        "movie/603/credits" => matrix_credits(),
        "genre/movie/list" => genres(&[(28, "Action"), (18, "Drama"), (878, "Science Fiction")]),
        "genre/tv/list" => genres(&[(18, "Drama"), (80, "Crime")]),
        other if other.starts_with(&format!("movie/{RATE_LIMITED_ID}")) => {
            return status(
                StatusCode::TOO_MANY_REQUESTS,
                25,
                "Your request count is over the allowed limit.",
            );
        }
        _ => {
            return status(
                StatusCode::NOT_FOUND,
                34,
                "The resource you requested could not be found.",
            );
        }
    };
    Json(body).into_response()
}

fn status(code: StatusCode, status_code: u32, message: &str) -> Response {
    let body = json!({
        "success": false,
        "status_code": status_code,
        "status_message": message,
    });
    (code, Json(body)).into_response()
}

fn listing(page: u32, total_pages: u32, results: Vec<Value>) -> Value {
    let total_results = results.len();
    json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": total_results,
    })
}

/// Category listings omit `media_type`.
fn movie(id: u64, title: &str, release_date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "original_title": title,
        "overview": format!("Overview of {title}."),
        "poster_path": format!("/poster-{id}.jpg"),
        "backdrop_path": null,
        "release_date": release_date,
        "vote_average": 8.4,
        "vote_count": 1000,
        "popularity": 50.5,
        "genre_ids": [28, 878],
        "original_language": "en",
        "adult": false,
    })
}

fn popular_movies(page: u32) -> Value {
    match page {
        1 => listing(
            1,
            2,
            vec![
                movie(603, "The Matrix", "1999-03-31"),
                movie(550, "Fight Club", "1999-10-15"),
            ],
        ),
        2 => listing(2, 2, vec![movie(27205, "Inception", "2010-07-15")]),
        _ => listing(page, 2, Vec::new()),
    }
}

fn trending() -> Value {
    let mut matrix = movie(603, "The Matrix", "1999-03-31");
    matrix["media_type"] = json!("movie");
    listing(
        1,
        1,
        vec![
            matrix,
            json!({
                "id": 1396,
                "name": "Breaking Bad",
                "original_name": "Breaking Bad",
                "media_type": "tv",
                "first_air_date": "2008-01-20",
                "genre_ids": [18, 80],
                "vote_average": 8.9,
            }),
            json!({
                "id": 6384,
                "name": "Keanu Reeves",
                "media_type": "person",
                "known_for_department": "Acting",
            }),
        ],
    )
}

fn search(query: &str) -> Value {
    if !query.to_lowercase().contains("matrix") {
        return listing(1, 1, Vec::new());
    }
    let mut matrix = movie(603, "The Matrix", "1999-03-31");
    matrix["media_type"] = json!("movie");
    listing(
        1,
        1,
        vec![
            matrix,
            json!({ "id": 1, "name": "The Matrix Fan", "media_type": "person" }),
        ],
    )
}

fn matrix_details() -> Value {
    json!({
        "id": 603,
        "title": "The Matrix",
        "original_title": "The Matrix",
        "overview": "A hacker learns the truth about reality.",
        "release_date": "1999-03-31",
        "runtime": 136,
        "status": "Released",
        "tagline": "Welcome to the Real World.",
        "genres": [{ "id": 28, "name": "Action" }, { "id": 878, "name": "Science Fiction" }],
        "vote_average": 8.2,
        "vote_count": 25000,
        "poster_path": "/poster-603.jpg",
    })
}

fn breaking_bad_details() -> Value {
    json!({
        "id": 1396,
        "name": "Breaking Bad",
        "first_air_date": "2008-01-20",
        "episode_run_time": [47, 58],
        "status": "Ended",
        "genres": [{ "id": 18, "name": "Drama" }],
    })
}

fn matrix_videos() -> Value {
    json!({
        "id": 603,
        "results": [
            { "key": "vKQi3bBA1y8", "site": "YouTube", "type": "Trailer", "name": "Trailer" },
            { "key": "12345678", "site": "Vimeo", "type": "Clip", "name": "Clip" },
            { "key": "m8e-FF8MsqU", "site": "YouTube", "type": "Teaser", "name": "Teaser" },
        ],
    })
}

fn matrix_credits() -> Value {
    json!({
        "id": 603,
        "cast": [
            { "id": 2975, "name": "Laurence Fishburne", "character": "Morpheus", "order": 1, "credit_id": "b" },
            { "id": 6384, "name": "Keanu Reeves", "character": "Neo", "order": 0, "credit_id": "a" },
            { "id": 530, "name": "Carrie-Anne Moss", "character": "Trinity", "order": 2, "credit_id": "c" },
        ],
    })
}

fn genres(list: &[(u64, &str)]) -> Value {
    let genres: Vec<Value> = list
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    json!({ "genres": genres })
}
