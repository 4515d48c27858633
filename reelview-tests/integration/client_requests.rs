//! Integration tests for the TMDB client
//!
//! Verifies request paths and query parameters as the server sees them,
//! mapping of real-shaped payloads and the status error taxonomy.

use reelview_core::config::ApiConfig;
use reelview_core::domain::{Category, ListKind, MediaType, TimeWindow, TrendingScope};
use reelview_tests::{FIXTURE_API_KEY, FixtureServer, RATE_LIMITED_ID};
use reelview_tmdb::{MediaSource, TmdbClient, TmdbError};
use tokio_test::{assert_err, assert_ok};

fn client(server: &FixtureServer) -> TmdbClient {
    TmdbClient::new(&server.api_config()).unwrap()
}

#[tokio::test]
async fn test_fixture_rejects_requests_without_key() {
    let server = FixtureServer::start().await;

    let response = reqwest::get(format!("{}/movie/popular", server.base_url()))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_request_carries_key_and_page() {
    let server = FixtureServer::start().await;
    let kind = ListKind::category(MediaType::Movie, Category::Popular);

    let page = client(&server).media_list(kind, 2).await.unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.results[0].id, 27205);
    assert_eq!(page.results[0].media_type, MediaType::Movie);
    assert_eq!(page.results[0].category, "popular");

    let requests = server.requests_to("movie/popular");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query["api_key"], FIXTURE_API_KEY);
    assert_eq!(requests[0].query["page"], "2");
}

#[tokio::test]
async fn test_trending_keeps_movies_and_shows_only() {
    let server = FixtureServer::start().await;
    let kind = ListKind::trending(TrendingScope::All, TimeWindow::Day);

    let page = client(&server).media_list(kind, 1).await.unwrap();

    let titles: Vec<(&str, MediaType)> = page
        .results
        .iter()
        .map(|media| (media.title.as_str(), media.media_type))
        .collect();
    assert_eq!(
        titles,
        vec![
            ("The Matrix", MediaType::Movie),
            ("Breaking Bad", MediaType::Tv)
        ]
    );

    let show = &page.results[1];
    assert_eq!(show.release_date.as_deref(), Some("2008-01-20"));
    assert_eq!(show.category, "trending");
}

#[tokio::test]
async fn test_search_sends_query_and_drops_people() {
    let server = FixtureServer::start().await;

    let page = client(&server).search("matrix", 1).await.unwrap();

    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, 603);
    assert_eq!(page.results[0].category, "search");

    let requests = server.requests_to("search/multi");
    assert_eq!(requests[0].query["query"], "matrix");
    assert_eq!(requests[0].query["page"], "1");
}

#[tokio::test]
async fn test_details_map_genre_objects_and_runtime() {
    let server = FixtureServer::start().await;
    let client = client(&server);

    let movie = client.details(603, MediaType::Movie).await.unwrap();
    assert_eq!(movie.genre_ids, vec![28, 878]);
    assert_eq!(movie.runtime, Some(136));
    assert_eq!(movie.tagline.as_deref(), Some("Welcome to the Real World."));
    assert_eq!(movie.status.as_deref(), Some("Released"));

    let show = client.details(1396, MediaType::Tv).await.unwrap();
    assert_eq!(show.title, "Breaking Bad");
    assert_eq!(show.media_type, MediaType::Tv);
    assert_eq!(show.runtime, Some(47));
    assert!(show.tagline.is_none());
}

#[tokio::test]
async fn test_videos_keep_youtube_keys_in_order() {
    let server = FixtureServer::start().await;

    let keys = assert_ok!(client(&server).videos(603, MediaType::Movie).await);

    assert_eq!(keys, vec!["vKQi3bBA1y8", "m8e-FF8MsqU"]);
}

#[tokio::test]
async fn test_cast_is_sorted_by_billing() {
    let server = FixtureServer::start().await;

    let cast = client(&server).cast(603, MediaType::Movie).await.unwrap();

    let names: Vec<&str> = cast.iter().map(|member| member.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Keanu Reeves", "Laurence Fishburne", "Carrie-Anne Moss"]
    );
    assert_eq!(cast[0].character, "Neo");
    assert_eq!(cast[0].original_name, "Keanu Reeves");
}

#[tokio::test]
async fn test_similar_and_genres() {
    let server = FixtureServer::start().await;
    let client = client(&server);

    let similar = client.similar(603, MediaType::Movie, 1).await.unwrap();
    assert_eq!(similar.results[0].title, "Fight Club");
    assert_eq!(similar.results[0].category, "similar");

    let genres = client.genres(MediaType::Tv).await.unwrap();
    let names: Vec<&str> = genres.iter().map(|genre| genre.name.as_str()).collect();
    assert_eq!(names, vec!["Drama", "Crime"]);
    assert_eq!(server.requests_to("genre/tv/list").len(), 1);
}

#[tokio::test]
async fn test_rejected_key_is_unauthorized() {
    let server = FixtureServer::start().await;
    let config = ApiConfig {
        api_key: Some("wrong-key".to_string()),
        ..server.api_config()
    };
    let client = TmdbClient::new(&config).unwrap();

    let error = client.genres(MediaType::Movie).await.unwrap_err();

    match error {
        TmdbError::Unauthorized { message } => assert!(message.contains("Invalid API key")),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let server = FixtureServer::start().await;
    let client = client(&server);

    let missing = assert_err!(client.details(1, MediaType::Movie).await);
    assert!(matches!(missing, TmdbError::NotFound { path } if path == "movie/1"));

    let limited = assert_err!(client.details(RATE_LIMITED_ID, MediaType::Movie).await);
    assert!(matches!(limited, TmdbError::RateLimited));

    assert_ok!(client.details(603, MediaType::Movie).await);
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:1/3".to_string(),
        api_key: Some(FIXTURE_API_KEY.to_string()),
        ..ApiConfig::default()
    };
    let client = TmdbClient::new(&config).unwrap();

    let error = client.genres(MediaType::Movie).await.unwrap_err();

    assert!(matches!(error, TmdbError::Network { .. }));
}
