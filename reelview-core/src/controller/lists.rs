//! Main screen controller: several paged listings and the genre lists.

use std::sync::Arc;

use super::{Controller, ControllerHandle, FetchScope, spawn_controller};
use crate::config::ControllerConfig;
use crate::domain::{ListKind, MediaType};
use crate::repository::MediaRepository;
use crate::resource::Resource;
use crate::state::{ListsState, ListsUpdate, PageRequest, reduce_lists};

#[derive(Debug, Clone, PartialEq)]
pub enum ListsEvent {
    /// First page of a listing, served from cache when possible.
    Load(ListKind),
    /// First page of a listing, always from the network.
    Refresh(ListKind),
    /// Next page of an already loaded listing.
    Paginate(ListKind),
    /// Movie and TV genre lists.
    LoadGenres { refresh: bool },
}

pub type ListsHandle = ControllerHandle<ListsEvent, ListsState>;

#[derive(Debug)]
pub struct ListsController {
    repository: Arc<dyn MediaRepository>,
}

impl ListsController {
    pub fn new(repository: Arc<dyn MediaRepository>) -> Self {
        Self { repository }
    }

    fn fetch_page(
        &self,
        kind: ListKind,
        request: PageRequest,
        refresh: bool,
        scope: &mut FetchScope<ListsUpdate>,
    ) {
        tracing::debug!(%kind, page = request.page, refresh, "Loading listing");
        scope.forward(
            self.repository.media_list(kind, request.page, refresh),
            move |resource| ListsUpdate::Page {
                kind,
                request,
                resource,
            },
        );
    }

    /// Resets the listing's cursor and requests page 1.
    fn first_page(
        &self,
        state: &ListsState,
        kind: ListKind,
        refresh: bool,
        scope: &mut FetchScope<ListsUpdate>,
    ) -> ListsState {
        let mut next = state.clone();
        let request = next.lists.entry(kind).or_default().cursor.refresh();
        self.fetch_page(kind, request, refresh, scope);
        next
    }
}

impl Controller for ListsController {
    const NAME: &'static str = "lists";
    type Event = ListsEvent;
    type Update = ListsUpdate;
    type State = ListsState;

    fn handle_event(
        &mut self,
        state: &ListsState,
        event: ListsEvent,
        scope: &mut FetchScope<ListsUpdate>,
    ) -> ListsState {
        match event {
            ListsEvent::Load(kind) => self.first_page(state, kind, false, scope),
            ListsEvent::Refresh(kind) => self.first_page(state, kind, true, scope),

            ListsEvent::Paginate(kind) => {
                // A listing whose first page never arrived starts over at page 1
                let Some(list) = state
                    .lists
                    .get(&kind)
                    .filter(|list| list.total_pages.is_some())
                else {
                    return self.first_page(state, kind, false, scope);
                };
                if !list.has_more() {
                    tracing::debug!(%kind, "Listing exhausted");
                    return state.clone();
                }

                let mut next = state.clone();
                let request = next.lists.entry(kind).or_default().cursor.advance();
                self.fetch_page(kind, request, false, scope);
                next
            }

            ListsEvent::LoadGenres { refresh } => {
                for media_type in [MediaType::Movie, MediaType::Tv] {
                    scope.forward(
                        self.repository.genres(media_type, refresh),
                        move |resource| ListsUpdate::Genres {
                            media_type,
                            resource,
                        },
                    );
                }
                state.clone()
            }
        }
    }

    fn handle_update(
        &mut self,
        state: &ListsState,
        update: ListsUpdate,
        _scope: &mut FetchScope<ListsUpdate>,
    ) -> ListsState {
        match &update {
            ListsUpdate::Page {
                kind,
                resource: Resource::Error(error),
                ..
            } => tracing::warn!(%kind, %error, "Listing fetch failed"),
            ListsUpdate::Genres {
                media_type,
                resource: Resource::Error(error),
            } => tracing::warn!(%media_type, %error, "Genre fetch failed"),
            _ => {}
        }
        reduce_lists(state, update)
    }
}

/// Spawns a lists controller with no listings loaded.
pub fn spawn_lists_controller(
    repository: Arc<dyn MediaRepository>,
    config: &ControllerConfig,
) -> ListsHandle {
    spawn_controller(
        ListsController::new(repository),
        ListsState::default(),
        config.command_buffer,
    )
}
