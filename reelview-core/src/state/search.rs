//! Search screen state and its reducer.

use crate::domain::MediaPage;
use crate::resource::Resource;
use crate::state::paging::{PageRequest, PagedList};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub query: String,
    pub is_loading: bool,
    /// Set by an explicit refresh until its fetch settles
    pub is_refreshing: bool,
    pub results: PagedList,
    pub error: Option<String>,
}

impl SearchState {
    /// Whether a query worth sending to the API is set.
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// One emission of a search fetch, tagged with the query that issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchUpdate {
    pub query: String,
    pub request: PageRequest,
    pub resource: Resource<MediaPage>,
}

/// Derives the next state; updates for a query other than the current one are dropped.
pub fn reduce_search(state: &SearchState, update: SearchUpdate) -> SearchState {
    if update.query != state.query {
        return state.clone();
    }

    let mut next = state.clone();
    match update.resource {
        Resource::Loading(flag) => {
            next.is_loading = flag;
            if !flag {
                next.is_refreshing = false;
            }
        }
        Resource::Success(page) => {
            next.results.apply_page(update.request, page);
            next.error = None;
        }
        Resource::Error(error) => next.error = Some(error.to_string()),
    }
    next
}
