//! Main screen state: several listings at once plus the genre lists.

use std::collections::BTreeMap;

use crate::domain::{Genre, ListKind, Media, MediaPage, MediaType};
use crate::resource::Resource;
use crate::state::paging::{PageRequest, PagedList};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListsState {
    pub is_loading: bool,
    pub lists: BTreeMap<ListKind, PagedList>,
    pub movie_genres: Vec<Genre>,
    pub tv_genres: Vec<Genre>,
    pub errors: BTreeMap<ListKind, String>,
    pub genre_error: Option<String>,
}

impl ListsState {
    /// Titles loaded so far for a listing.
    pub fn items(&self, kind: ListKind) -> &[Media] {
        self.lists
            .get(&kind)
            .map(|list| list.items.as_slice())
            .unwrap_or_default()
    }

    pub fn genres(&self, media_type: MediaType) -> &[Genre] {
        match media_type {
            MediaType::Movie => &self.movie_genres,
            MediaType::Tv => &self.tv_genres,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListsUpdate {
    Page {
        kind: ListKind,
        request: PageRequest,
        resource: Resource<MediaPage>,
    },
    Genres {
        media_type: MediaType,
        resource: Resource<Vec<Genre>>,
    },
}

pub fn reduce_lists(state: &ListsState, update: ListsUpdate) -> ListsState {
    let mut next = state.clone();

    match update {
        ListsUpdate::Page {
            kind,
            request,
            resource,
        } => match resource {
            Resource::Loading(flag) => next.is_loading = flag,
            Resource::Success(page) => {
                next.lists.entry(kind).or_default().apply_page(request, page);
                next.errors.remove(&kind);
            }
            Resource::Error(error) => {
                next.errors.insert(kind, error.to_string());
            }
        },

        ListsUpdate::Genres {
            media_type,
            resource,
        } => match resource {
            Resource::Loading(flag) => next.is_loading = flag,
            Resource::Success(genres) => {
                match media_type {
                    MediaType::Movie => next.movie_genres = genres,
                    MediaType::Tv => next.tv_genres = genres,
                }
                next.genre_error = None;
            }
            Resource::Error(error) => next.genre_error = Some(error.to_string()),
        },
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, TimeWindow, TrendingScope};
    use crate::resource::FetchError;

    fn popular() -> ListKind {
        ListKind::category(MediaType::Movie, Category::Popular)
    }

    fn trending() -> ListKind {
        ListKind::trending(TrendingScope::All, TimeWindow::Day)
    }

    fn page(ids: &[u64]) -> MediaPage {
        MediaPage {
            page: 1,
            results: ids
                .iter()
                .map(|id| Media::new(*id, format!("Movie {id}"), MediaType::Movie))
                .collect(),
            total_pages: 10,
            total_results: 200,
        }
    }

    #[test]
    fn test_pages_land_in_their_own_list() {
        let request = PageRequest {
            page: 1,
            is_refresh: true,
        };
        let state = reduce_lists(
            &ListsState::default(),
            ListsUpdate::Page {
                kind: popular(),
                request,
                resource: Resource::Success(page(&[1, 2, 3])),
            },
        );
        let state = reduce_lists(
            &state,
            ListsUpdate::Page {
                kind: trending(),
                request,
                resource: Resource::Success(page(&[9])),
            },
        );

        assert_eq!(state.items(popular()).len(), 3);
        assert_eq!(state.items(trending())[0].id, 9);
        assert!(state.items(ListKind::category(MediaType::Tv, Category::TopRated)).is_empty());
    }

    #[test]
    fn test_error_only_marks_its_listing() {
        let request = PageRequest {
            page: 1,
            is_refresh: true,
        };
        let loaded = reduce_lists(
            &ListsState::default(),
            ListsUpdate::Page {
                kind: popular(),
                request,
                resource: Resource::Success(page(&[1])),
            },
        );
        let failed = reduce_lists(
            &loaded,
            ListsUpdate::Page {
                kind: trending(),
                request,
                resource: Resource::Error(FetchError::Unavailable {
                    reason: "rate limited".to_string(),
                }),
            },
        );

        assert_eq!(failed.lists, loaded.lists);
        assert!(failed.errors.contains_key(&trending()));
        assert!(!failed.errors.contains_key(&popular()));
    }

    #[test]
    fn test_genres_by_media_type() {
        let state = reduce_lists(
            &ListsState::default(),
            ListsUpdate::Genres {
                media_type: MediaType::Tv,
                resource: Resource::Success(vec![Genre {
                    id: 16,
                    name: "Animation".to_string(),
                }]),
            },
        );
        assert_eq!(state.genres(MediaType::Tv).len(), 1);
        assert!(state.genres(MediaType::Movie).is_empty());
    }
}
