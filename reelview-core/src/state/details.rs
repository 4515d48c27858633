//! Details screen state and its reducer.

use serde::Serialize;

use crate::domain::{
    Cast, Genre, Media, MediaType, SMALL_SIMILAR_LIST_SIZE, genre_names, readable_runtime,
};
use crate::resource::{FetchError, Resource};

/// Everything the details screen renders.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DetailsState {
    pub is_loading: bool,
    pub media: Option<Media>,
    /// Video picked for playback, empty until one is chosen
    pub video_id: String,
    pub readable_time: String,
    pub similar_list: Vec<Media>,
    pub small_similar_list: Vec<Media>,
    pub videos_list: Vec<String>,
    pub cast_list: Vec<Cast>,
    pub movie_genres: Vec<Genre>,
    pub tv_genres: Vec<Genre>,
    pub errors: DetailsErrors,
}

impl DetailsState {
    /// Genre names of the current title, resolved against the matching list.
    pub fn genre_names(&self) -> Vec<String> {
        let Some(media) = &self.media else {
            return Vec::new();
        };
        let genres = match media.media_type {
            MediaType::Movie => &self.movie_genres,
            MediaType::Tv => &self.tv_genres,
        };
        genre_names(&media.genre_ids, genres)
    }
}

/// The independent fetches of the details screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailsFetch {
    Details,
    Similar,
    Videos,
    Cast,
}

/// Last failure of each fetch, cleared by its next success.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DetailsErrors {
    pub details: Option<String>,
    pub similar: Option<String>,
    pub videos: Option<String>,
    pub cast: Option<String>,
}

impl DetailsErrors {
    pub fn get(&self, fetch: DetailsFetch) -> Option<&str> {
        match fetch {
            DetailsFetch::Details => self.details.as_deref(),
            DetailsFetch::Similar => self.similar.as_deref(),
            DetailsFetch::Videos => self.videos.as_deref(),
            DetailsFetch::Cast => self.cast.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single result to fold into `DetailsState`.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsUpdate {
    /// Local lookup of the title finished; `None` keeps the current media.
    Item(Option<Media>),
    Details(Resource<Media>),
    Similar(Resource<Vec<Media>>),
    Videos(Resource<Vec<String>>),
    Cast(Resource<Vec<Cast>>),
}

impl DetailsUpdate {
    /// Fetch this update belongs to, `None` for the item lookup.
    pub fn fetch(&self) -> Option<DetailsFetch> {
        match self {
            DetailsUpdate::Item(_) => None,
            DetailsUpdate::Details(_) => Some(DetailsFetch::Details),
            DetailsUpdate::Similar(_) => Some(DetailsFetch::Similar),
            DetailsUpdate::Videos(_) => Some(DetailsFetch::Videos),
            DetailsUpdate::Cast(_) => Some(DetailsFetch::Cast),
        }
    }

    /// Failure carried by the update, if it is an `Error` emission.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            DetailsUpdate::Details(Resource::Error(error))
            | DetailsUpdate::Similar(Resource::Error(error))
            | DetailsUpdate::Videos(Resource::Error(error))
            | DetailsUpdate::Cast(Resource::Error(error)) => Some(error),
            _ => None,
        }
    }

    /// Loading flag carried by the update, if it is a `Loading` emission.
    pub fn loading(&self) -> Option<bool> {
        match self {
            DetailsUpdate::Details(Resource::Loading(flag))
            | DetailsUpdate::Similar(Resource::Loading(flag))
            | DetailsUpdate::Videos(Resource::Loading(flag))
            | DetailsUpdate::Cast(Resource::Loading(flag)) => Some(*flag),
            _ => None,
        }
    }
}

/// Derives the next state from `state` and one update.
///
/// `Loading` from any fetch overwrites the shared flag. An `Error` only
/// touches that fetch's error slot.
pub fn reduce_details(state: &DetailsState, update: DetailsUpdate) -> DetailsState {
    let mut next = state.clone();

    match update {
        DetailsUpdate::Item(Some(media)) => next.media = Some(media),
        DetailsUpdate::Item(None) => {}

        DetailsUpdate::Details(resource) => match resource {
            Resource::Loading(flag) => next.is_loading = flag,
            Resource::Success(details) => {
                next.readable_time = readable_runtime(details.runtime.unwrap_or(0));
                next.media = Some(match &state.media {
                    Some(media) => media.with_details(&details),
                    None => details,
                });
                next.errors.details = None;
            }
            Resource::Error(error) => next.errors.details = Some(error.to_string()),
        },

        DetailsUpdate::Similar(resource) => match resource {
            Resource::Loading(flag) => next.is_loading = flag,
            Resource::Success(similar) => {
                next.small_similar_list = similar
                    .iter()
                    .take(SMALL_SIMILAR_LIST_SIZE)
                    .cloned()
                    .collect();
                next.similar_list = similar;
                next.errors.similar = None;
            }
            Resource::Error(error) => next.errors.similar = Some(error.to_string()),
        },

        DetailsUpdate::Videos(resource) => match resource {
            Resource::Loading(flag) => next.is_loading = flag,
            Resource::Success(videos) => {
                next.videos_list = videos;
                next.errors.videos = None;
            }
            Resource::Error(error) => next.errors.videos = Some(error.to_string()),
        },

        DetailsUpdate::Cast(resource) => match resource {
            Resource::Loading(flag) => next.is_loading = flag,
            Resource::Success(cast) => {
                next.cast_list = cast;
                next.errors.cast = None;
            }
            Resource::Error(error) => next.errors.cast = Some(error.to_string()),
        },
    }

    next
}
