//! Search screen controller with a debounced query.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;

use super::{Controller, ControllerHandle, FetchScope, spawn_controller};
use crate::config::ControllerConfig;
use crate::repository::MediaRepository;
use crate::resource::Resource;
use crate::state::{PageRequest, SearchState, SearchUpdate, reduce_search};

/// UI events of the search screen.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// Text field changed; results reset and a search follows after the debounce.
    QueryChanged(String),
    /// Scrolled to the end of the results.
    Paginate,
    /// Pull-to-refresh on the current query.
    Refresh,
}

pub type SearchHandle = ControllerHandle<SearchEvent, SearchState>;

#[derive(Debug)]
pub struct SearchController {
    repository: Arc<dyn MediaRepository>,
    debounce: Duration,
    /// Debounced search not yet started, or still running
    pending: Option<AbortHandle>,
}

impl SearchController {
    pub fn new(repository: Arc<dyn MediaRepository>, debounce: Duration) -> Self {
        Self {
            repository,
            debounce,
            pending: None,
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    fn fetch(
        &self,
        query: &str,
        request: PageRequest,
        refresh: bool,
        delay: Duration,
        scope: &mut FetchScope<SearchUpdate>,
    ) -> AbortHandle {
        tracing::debug!(query, page = request.page, refresh, "Searching");

        let stream = self.repository.search(query, request.page, refresh);
        let tag = query.to_string();
        let map = move |resource| SearchUpdate {
            query: tag.clone(),
            request,
            resource,
        };

        if delay.is_zero() {
            scope.forward(stream, map)
        } else {
            scope.forward_after(delay, stream, map)
        }
    }
}

impl Controller for SearchController {
    const NAME: &'static str = "search";
    type Event = SearchEvent;
    type Update = SearchUpdate;
    type State = SearchState;

    fn handle_event(
        &mut self,
        state: &SearchState,
        event: SearchEvent,
        scope: &mut FetchScope<SearchUpdate>,
    ) -> SearchState {
        match event {
            SearchEvent::QueryChanged(query) => {
                self.cancel_pending();
                let mut next = SearchState {
                    query,
                    ..SearchState::default()
                };
                if !next.has_query() {
                    return next;
                }

                let request = next.results.cursor.refresh();
                let task = self.fetch(&next.query, request, false, self.debounce, scope);
                self.pending = Some(task);
                next
            }

            SearchEvent::Paginate => {
                if !state.has_query() || !state.results.has_more() {
                    return state.clone();
                }
                // Continuation pages wait until page 1 of the query has landed
                if state.results.total_pages.is_none() {
                    tracing::debug!(query = %state.query, "First page pending, not paginating");
                    return state.clone();
                }
                let mut next = state.clone();
                let request = next.results.cursor.advance();
                self.fetch(&next.query, request, false, Duration::ZERO, scope);
                next
            }

            SearchEvent::Refresh => {
                if !state.has_query() {
                    return state.clone();
                }
                self.cancel_pending();
                let mut next = SearchState {
                    is_refreshing: true,
                    ..state.clone()
                };
                let request = next.results.cursor.refresh();
                let task = self.fetch(&next.query, request, true, Duration::ZERO, scope);
                self.pending = Some(task);
                next
            }
        }
    }

    fn handle_update(
        &mut self,
        state: &SearchState,
        update: SearchUpdate,
        _scope: &mut FetchScope<SearchUpdate>,
    ) -> SearchState {
        if let Resource::Error(error) = &update.resource {
            tracing::warn!(query = %update.query, page = update.request.page, %error, "Search failed");
        }
        reduce_search(state, update)
    }
}

/// Spawns a search controller with an empty query.
pub fn spawn_search_controller(
    repository: Arc<dyn MediaRepository>,
    config: &ControllerConfig,
) -> SearchHandle {
    spawn_controller(
        SearchController::new(repository, config.search_debounce),
        SearchState::default(),
        config.command_buffer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_mocks::{Call, FakeRepository};

    fn spawn(repository: &FakeRepository, debounce: Duration) -> SearchHandle {
        let config = ControllerConfig {
            search_debounce: debounce,
            ..ControllerConfig::default()
        };
        spawn_search_controller(Arc::new(repository.clone()), &config)
    }

    fn searches(repository: &FakeRepository) -> Vec<(String, u32, bool)> {
        repository
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search {
                    query,
                    page,
                    refresh,
                } => Some((query, page, refresh)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_issues_one_search_after_debounce() {
        let repository = FakeRepository::new();
        let handle = spawn(&repository, Duration::from_millis(500));

        for query in ["b", "br", "bre", "breaking"] {
            handle
                .send(SearchEvent::QueryChanged(query.to_string()))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let state = handle.settle().await.unwrap();

        assert_eq!(searches(&repository), vec![("breaking".to_string(), 1, false)]);
        assert_eq!(state.query, "breaking");
        assert_eq!(state.results.len(), 20);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_blank_query_clears_results_without_fetching() {
        let repository = FakeRepository::new();
        let handle = spawn(&repository, Duration::ZERO);

        handle
            .send(SearchEvent::QueryChanged("dune".to_string()))
            .await
            .unwrap();
        let loaded = handle.settle().await.unwrap();
        assert_eq!(loaded.results.len(), 20);

        handle
            .send(SearchEvent::QueryChanged("   ".to_string()))
            .await
            .unwrap();
        let state = handle.settle().await.unwrap();

        assert!(state.results.is_empty());
        assert_eq!(searches(&repository).len(), 1);
    }

    #[tokio::test]
    async fn test_paginate_appends_until_last_page() {
        let repository = FakeRepository::new().with_total_pages(2);
        let handle = spawn(&repository, Duration::ZERO);

        handle
            .send(SearchEvent::QueryChanged("lost".to_string()))
            .await
            .unwrap();
        handle.settle().await.unwrap();

        handle.send(SearchEvent::Paginate).await.unwrap();
        let state = handle.settle().await.unwrap();
        assert_eq!(state.results.len(), 40);
        assert!(!state.results.has_more());

        handle.send(SearchEvent::Paginate).await.unwrap();
        let state = handle.settle().await.unwrap();
        assert_eq!(state.results.len(), 40);
        assert_eq!(
            searches(&repository),
            vec![("lost".to_string(), 1, false), ("lost".to_string(), 2, false)]
        );
    }

    #[tokio::test]
    async fn test_paginate_without_query_is_ignored() {
        let repository = FakeRepository::new();
        let handle = spawn(&repository, Duration::ZERO);

        handle.send(SearchEvent::Paginate).await.unwrap();
        let state = handle.settle().await.unwrap();

        assert_eq!(state, SearchState::default());
        assert!(repository.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paginate_during_debounce_waits_for_first_page() {
        let repository = FakeRepository::new();
        let handle = spawn(&repository, Duration::from_millis(500));

        handle
            .send(SearchEvent::QueryChanged("lost".to_string()))
            .await
            .unwrap();
        handle.send(SearchEvent::Paginate).await.unwrap();
        let state = handle.settle().await.unwrap();

        assert_eq!(searches(&repository), vec![("lost".to_string(), 1, false)]);
        assert_eq!(state.results.len(), 20);
        assert_eq!(state.results.cursor.next_page(), 2);

        handle.send(SearchEvent::Paginate).await.unwrap();
        let state = handle.settle().await.unwrap();

        assert_eq!(state.results.len(), 40);
        assert_eq!(state.results.items[20].id, 200);
        assert_eq!(
            searches(&repository),
            vec![("lost".to_string(), 1, false), ("lost".to_string(), 2, false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_replaces_results_and_clears_flag() {
        let repository = FakeRepository::new().with_delay("search", Duration::from_millis(100));
        let handle = spawn(&repository, Duration::ZERO);

        handle
            .send(SearchEvent::QueryChanged("lost".to_string()))
            .await
            .unwrap();
        handle.settle().await.unwrap();
        handle.send(SearchEvent::Paginate).await.unwrap();
        handle.settle().await.unwrap();

        handle.send(SearchEvent::Refresh).await.unwrap();
        let refreshing = handle.wait_for(|state| state.is_refreshing).await.unwrap();
        assert!(refreshing.is_loading);

        let state = handle.settle().await.unwrap();
        assert!(!state.is_refreshing);
        assert_eq!(state.results.len(), 20);
        assert_eq!(state.results.cursor.next_page(), 2);
        assert_eq!(
            searches(&repository).last(),
            Some(&("lost".to_string(), 1, true))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_query_cancels_running_search() {
        let repository = FakeRepository::new().with_delay("search", Duration::from_millis(800));
        let handle = spawn(&repository, Duration::ZERO);

        handle
            .send(SearchEvent::QueryChanged("alien".to_string()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle
            .send(SearchEvent::QueryChanged("aliens".to_string()))
            .await
            .unwrap();
        let state = handle.settle().await.unwrap();

        assert_eq!(state.query, "aliens");
        assert_eq!(state.results.len(), 20);
        assert_eq!(searches(&repository), vec![("aliens".to_string(), 1, false)]);
    }
}
