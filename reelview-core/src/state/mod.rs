//! Immutable screen states and the pure reducers that derive them.
//!
//! Every reducer takes the previous snapshot and exactly one update and
//! returns a new snapshot; snapshots are never mutated after publication.

pub mod details;
pub mod lists;
pub mod paging;
pub mod search;

pub use details::{DetailsErrors, DetailsFetch, DetailsState, DetailsUpdate, reduce_details};
pub use lists::{ListsState, ListsUpdate, reduce_lists};
pub use paging::{PageCursor, PageRequest, PagedList};
pub use search::{SearchState, SearchUpdate, reduce_search};
