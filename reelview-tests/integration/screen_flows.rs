//! End-to-end screen flows
//!
//! Controllers over the cached repository over the HTTP client, checked
//! against what the fixture server received.

use std::sync::Arc;

use reelview_core::config::{ApiConfig, CacheConfig};
use reelview_core::controller::details::{DetailsEvent, spawn_details_controller};
use reelview_core::controller::lists::{ListsEvent, spawn_lists_controller};
use reelview_core::controller::search::{SearchEvent, spawn_search_controller};
use reelview_core::domain::{Category, ListKind, MediaType, readable_runtime};
use reelview_core::{DetailsRepository, MediaRepository};
use reelview_tests::FixtureServer;
use reelview_tmdb::{CachedRepository, TmdbClient};

fn repository(api: &ApiConfig) -> Arc<CachedRepository<TmdbClient>> {
    let client = TmdbClient::new(api).unwrap();
    Arc::new(CachedRepository::new(client, &CacheConfig::default()))
}

fn popular() -> ListKind {
    ListKind::category(MediaType::Movie, Category::Popular)
}

#[tokio::test]
async fn test_listing_paginates_until_exhausted() {
    let server = FixtureServer::start().await;
    let config = server.config();
    let handle = spawn_lists_controller(repository(&config.api), &config.controller);

    handle.send(ListsEvent::Load(popular())).await.unwrap();
    handle.settle().await.unwrap();
    handle.send(ListsEvent::Paginate(popular())).await.unwrap();
    handle.settle().await.unwrap();
    handle.send(ListsEvent::Paginate(popular())).await.unwrap();
    let state = handle.settle().await.unwrap();

    let ids: Vec<u64> = state.items(popular()).iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![603, 550, 27205]);
    assert!(!state.is_loading);

    let pages: Vec<String> = server
        .requests_to("movie/popular")
        .into_iter()
        .map(|request| request.query["page"].clone())
        .collect();
    assert_eq!(pages, vec!["1", "2"]);
}

#[tokio::test]
async fn test_cached_listing_is_only_refetched_on_refresh() {
    let server = FixtureServer::start().await;
    let config = server.config();
    let handle = spawn_lists_controller(repository(&config.api), &config.controller);

    handle.send(ListsEvent::Load(popular())).await.unwrap();
    handle.settle().await.unwrap();
    handle.send(ListsEvent::Load(popular())).await.unwrap();
    handle.settle().await.unwrap();
    assert_eq!(server.requests_to("movie/popular").len(), 1);

    handle.send(ListsEvent::Refresh(popular())).await.unwrap();
    let state = handle.settle().await.unwrap();
    assert_eq!(server.requests_to("movie/popular").len(), 2);
    assert_eq!(state.items(popular()).len(), 2);
}

#[tokio::test]
async fn test_rejected_key_lands_in_the_listing_error_slot() {
    let server = FixtureServer::start().await;
    let config = server.config();
    let api = ApiConfig {
        api_key: Some("wrong-key".to_string()),
        ..config.api.clone()
    };
    let handle = spawn_lists_controller(repository(&api), &config.controller);

    handle.send(ListsEvent::Load(popular())).await.unwrap();
    handle
        .send(ListsEvent::LoadGenres { refresh: false })
        .await
        .unwrap();
    let state = handle.settle().await.unwrap();

    assert!(state.items(popular()).is_empty());
    assert!(state.errors[&popular()].contains("401"));
    assert!(state.genre_error.is_some());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_details_of_a_listed_title() {
    let server = FixtureServer::start().await;
    let config = server.config();
    let repository = repository(&config.api);
    let media: Arc<dyn MediaRepository> = repository.clone();
    let details: Arc<dyn DetailsRepository> = repository.clone();

    let lists = spawn_lists_controller(media.clone(), &config.controller);
    lists.send(ListsEvent::Load(popular())).await.unwrap();
    lists
        .send(ListsEvent::LoadGenres { refresh: false })
        .await
        .unwrap();
    let listed = lists.settle().await.unwrap();

    let handle = spawn_details_controller(media, details, &config.controller);
    handle
        .send(DetailsEvent::SetDataAndLoad {
            id: 603,
            media_type: MediaType::Movie,
            category: "popular".to_string(),
            movie_genres: listed.movie_genres.clone(),
            tv_genres: listed.tv_genres.clone(),
        })
        .await
        .unwrap();
    let state = handle.settle().await.unwrap();

    let movie = state.media.as_ref().unwrap();
    assert_eq!(movie.category, "popular");
    assert_eq!(movie.runtime, Some(136));
    assert_eq!(movie.tagline.as_deref(), Some("Welcome to the Real World."));
    assert_eq!(state.readable_time, readable_runtime(136));
    assert_eq!(state.genre_names(), vec!["Action", "Science Fiction"]);
    assert_eq!(state.similar_list.len(), 1);
    assert_eq!(state.small_similar_list.len(), 1);
    assert_eq!(state.videos_list, vec!["vKQi3bBA1y8", "m8e-FF8MsqU"]);
    assert_eq!(state.cast_list[0].name, "Keanu Reeves");
    assert!(state.errors.is_empty());
    assert!(!state.is_loading);

    handle.send(DetailsEvent::NavigateToWatchVideo).await.unwrap();
    let state = handle.settle().await.unwrap();
    assert!(state.videos_list.contains(&state.video_id));
}

#[tokio::test]
async fn test_missing_title_fills_every_error_slot() {
    let server = FixtureServer::start().await;
    let config = server.config();
    let repository = repository(&config.api);
    let handle = spawn_details_controller(repository.clone(), repository, &config.controller);

    handle
        .send(DetailsEvent::load(1, MediaType::Movie, ""))
        .await
        .unwrap();
    let state = handle.settle().await.unwrap();

    assert!(state.media.is_none());
    assert!(state.errors.details.is_some());
    assert!(state.errors.similar.is_some());
    assert!(state.errors.videos.is_some());
    assert!(state.errors.cast.is_some());
    assert!(state.similar_list.is_empty());
}

#[tokio::test]
async fn test_search_flow_against_server() {
    let server = FixtureServer::start().await;
    let config = server.config();
    let repository = repository(&config.api);
    let handle = spawn_search_controller(repository.clone(), &config.controller);

    handle
        .send(SearchEvent::QueryChanged("Matrix".to_string()))
        .await
        .unwrap();
    let state = handle.settle().await.unwrap();

    assert_eq!(state.query, "Matrix");
    assert_eq!(state.results.len(), 1);
    assert_eq!(state.results.items[0].title, "The Matrix");
    assert!(!state.results.has_more());

    handle.send(SearchEvent::Paginate).await.unwrap();
    handle.settle().await.unwrap();
    assert_eq!(server.requests_to("search/multi").len(), 1);

    let indexed = repository.item(603, MediaType::Movie, "search").await;
    assert_eq!(indexed.map(|media| media.title), Some("The Matrix".to_string()));
}
