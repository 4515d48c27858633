//! Details screen controller.
//!
//! Resolves the title from the local listings first, then runs the details,
//! similar, videos and cast fetches side by side. Each fetch's emissions are
//! folded as they arrive, independent of the others' completion order.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use tokio::task::AbortHandle;

use super::{Controller, ControllerHandle, FetchScope, spawn_controller};
use crate::config::ControllerConfig;
use crate::domain::{Genre, Media, MediaId, MediaType};
use crate::repository::{DetailsRepository, MediaRepository};
use crate::state::{DetailsState, DetailsUpdate, reduce_details};

/// UI events of the details screen.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsEvent {
    /// Show a title: store the genre lists, then load everything.
    SetDataAndLoad {
        id: MediaId,
        media_type: MediaType,
        category: String,
        movie_genres: Vec<Genre>,
        tv_genres: Vec<Genre>,
    },
    /// Reload the current title bypassing caches.
    Refresh,
    /// Pick one of the title's videos for playback.
    NavigateToWatchVideo,
}

impl DetailsEvent {
    /// `SetDataAndLoad` without genre lists.
    pub fn load(id: MediaId, media_type: MediaType, category: impl Into<String>) -> Self {
        DetailsEvent::SetDataAndLoad {
            id,
            media_type,
            category: category.into(),
            movie_genres: Vec::new(),
            tv_genres: Vec::new(),
        }
    }
}

/// Internal messages delivered by the controller's fetch tasks, tagged with
/// the load that started them.
#[derive(Debug)]
pub enum DetailsMessage {
    ItemResolved {
        load: u64,
        media: Option<Media>,
        refresh: bool,
    },
    Fetched {
        load: u64,
        update: DetailsUpdate,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Target {
    id: MediaId,
    media_type: MediaType,
    category: String,
}

impl From<&Media> for Target {
    fn from(media: &Media) -> Self {
        Self {
            id: media.id,
            media_type: media.media_type,
            category: media.category.clone(),
        }
    }
}

pub type DetailsHandle = ControllerHandle<DetailsEvent, DetailsState>;

#[derive(Debug)]
pub struct DetailsController {
    media: Arc<dyn MediaRepository>,
    details: Arc<dyn DetailsRepository>,
    /// Last title requested through `SetDataAndLoad`
    requested: Option<Target>,
    /// Incremented per load; messages of older loads are dropped
    load: u64,
    /// Tasks of the current load, aborted when a new load supersedes it
    in_flight: Vec<AbortHandle>,
}

impl DetailsController {
    pub fn new(media: Arc<dyn MediaRepository>, details: Arc<dyn DetailsRepository>) -> Self {
        Self {
            media,
            details,
            requested: None,
            load: 0,
            in_flight: Vec::new(),
        }
    }

    fn abort_in_flight(&mut self) {
        for task in self.in_flight.drain(..) {
            task.abort();
        }
    }

    /// Looks the title up locally; the fetches start once it resolves.
    fn start_load(
        &mut self,
        target: Target,
        refresh: bool,
        scope: &mut FetchScope<DetailsMessage>,
    ) {
        tracing::debug!(
            id = target.id,
            media_type = %target.media_type,
            refresh,
            "Loading details"
        );

        self.abort_in_flight();
        self.load += 1;
        let load = self.load;
        let media = Arc::clone(&self.media);
        let task = scope.resolve(async move {
            let item = media
                .item(target.id, target.media_type, &target.category)
                .await;
            DetailsMessage::ItemResolved {
                load,
                media: item,
                refresh,
            }
        });
        self.in_flight.push(task);
    }

    fn start_fetches(
        &mut self,
        target: &Target,
        refresh: bool,
        scope: &mut FetchScope<DetailsMessage>,
    ) {
        let Target { id, media_type, .. } = *target;
        let load = self.load;

        let tasks = [
            scope.forward(self.details.details(id, media_type, refresh), move |resource| {
                DetailsMessage::Fetched {
                    load,
                    update: DetailsUpdate::Details(resource),
                }
            }),
            scope.forward(
                self.details.similar(id, media_type, 1, refresh),
                move |resource| DetailsMessage::Fetched {
                    load,
                    update: DetailsUpdate::Similar(resource),
                },
            ),
            scope.forward(self.details.videos(id, media_type, refresh), move |resource| {
                DetailsMessage::Fetched {
                    load,
                    update: DetailsUpdate::Videos(resource),
                }
            }),
            scope.forward(self.details.cast(id, media_type, refresh), move |resource| {
                DetailsMessage::Fetched {
                    load,
                    update: DetailsUpdate::Cast(resource),
                }
            }),
        ];
        self.in_flight.extend(tasks);
    }
}

impl Controller for DetailsController {
    const NAME: &'static str = "details";
    type Event = DetailsEvent;
    type Update = DetailsMessage;
    type State = DetailsState;

    fn handle_event(
        &mut self,
        state: &DetailsState,
        event: DetailsEvent,
        scope: &mut FetchScope<DetailsMessage>,
    ) -> DetailsState {
        match event {
            DetailsEvent::SetDataAndLoad {
                id,
                media_type,
                category,
                movie_genres,
                tv_genres,
            } => {
                let target = Target {
                    id,
                    media_type,
                    category,
                };
                self.requested = Some(target.clone());
                self.start_load(target, false, scope);

                DetailsState {
                    movie_genres,
                    tv_genres,
                    ..DetailsState::default()
                }
            }

            DetailsEvent::Refresh => {
                let target = state
                    .media
                    .as_ref()
                    .map(Target::from)
                    .or_else(|| self.requested.clone());
                let Some(target) = target else {
                    tracing::debug!("Refresh ignored, no title loaded");
                    return state.clone();
                };
                self.start_load(target, true, scope);

                DetailsState {
                    is_loading: true,
                    ..state.clone()
                }
            }

            DetailsEvent::NavigateToWatchVideo => {
                match state.videos_list.choose(&mut rand::rng()) {
                    Some(video_id) => DetailsState {
                        video_id: video_id.clone(),
                        ..state.clone()
                    },
                    None => {
                        tracing::debug!("No videos to watch");
                        state.clone()
                    }
                }
            }
        }
    }

    fn handle_update(
        &mut self,
        state: &DetailsState,
        update: DetailsMessage,
        scope: &mut FetchScope<DetailsMessage>,
    ) -> DetailsState {
        match update {
            DetailsMessage::ItemResolved { load, .. } | DetailsMessage::Fetched { load, .. }
                if load != self.load =>
            {
                tracing::trace!(load, current = self.load, "Dropped message of a superseded load");
                state.clone()
            }

            DetailsMessage::ItemResolved { media, refresh, .. } => {
                let next = reduce_details(state, DetailsUpdate::Item(media));
                let target = next
                    .media
                    .as_ref()
                    .map(Target::from)
                    .or_else(|| self.requested.clone());
                if let Some(target) = target {
                    self.start_fetches(&target, refresh, scope);
                }
                next
            }

            DetailsMessage::Fetched { update, .. } => {
                if let Some(error) = update.error() {
                    tracing::warn!(fetch = ?update.fetch(), %error, "Details fetch failed");
                }
                reduce_details(state, update)
            }
        }
    }
}

/// Spawns a details controller with an empty initial state.
pub fn spawn_details_controller(
    media: Arc<dyn MediaRepository>,
    details: Arc<dyn DetailsRepository>,
    config: &ControllerConfig,
) -> DetailsHandle {
    spawn_controller(
        DetailsController::new(media, details),
        DetailsState::default(),
        config.command_buffer,
    )
}
