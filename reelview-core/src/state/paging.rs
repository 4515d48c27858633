//! Page cursor shared by the search and listing screens.

use crate::domain::{Media, MediaPage};

/// Page to fetch and whether its results replace or extend the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub is_refresh: bool,
}

/// Tracks the next page to request.
///
/// The cursor moves when a request is issued, not when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    next_page: u32,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self { next_page: 1 }
    }
}

impl PageCursor {
    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    /// Restarts from page 1.
    pub fn refresh(&mut self) -> PageRequest {
        self.next_page = 2;
        PageRequest {
            page: 1,
            is_refresh: true,
        }
    }

    /// Continues with the next page.
    pub fn advance(&mut self) -> PageRequest {
        let page = self.next_page;
        self.next_page += 1;
        PageRequest {
            page,
            is_refresh: false,
        }
    }
}

/// Accumulated results of a paginated listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PagedList {
    pub items: Vec<Media>,
    pub cursor: PageCursor,
    /// Known once the first page has arrived
    pub total_pages: Option<u32>,
}

impl PagedList {
    /// Folds a received page in: a refresh replaces, a continuation appends.
    ///
    /// Pages are appended in arrival order.
    pub fn apply_page(&mut self, request: PageRequest, page: MediaPage) {
        if request.is_refresh {
            self.items = page.results;
        } else {
            self.items.extend(page.results);
        }
        self.total_pages = Some(page.total_pages);
    }

    /// False once the cursor has passed the last known page.
    pub fn has_more(&self) -> bool {
        self.total_pages
            .is_none_or(|total| self.cursor.next_page() <= total)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaType;

    fn page(number: u32, ids: std::ops::Range<u64>, total_pages: u32) -> MediaPage {
        MediaPage {
            page: number,
            results: ids
                .map(|id| Media::new(id, format!("Title {id}"), MediaType::Movie))
                .collect(),
            total_pages,
            total_results: total_pages * 20,
        }
    }

    #[test]
    fn test_cursor_refresh_and_advance() {
        let mut cursor = PageCursor::default();
        assert_eq!(cursor.next_page(), 1);

        assert_eq!(
            cursor.advance(),
            PageRequest {
                page: 1,
                is_refresh: false
            }
        );
        assert_eq!(cursor.advance().page, 2);
        assert_eq!(cursor.next_page(), 3);

        let request = cursor.refresh();
        assert_eq!(request.page, 1);
        assert!(request.is_refresh);
        assert_eq!(cursor.next_page(), 2);
    }

    #[test]
    fn test_refresh_replaces_and_advance_appends() {
        let mut list = PagedList::default();

        let first = list.cursor.refresh();
        list.apply_page(first, page(1, 0..20, 3));
        assert_eq!(list.len(), 20);

        let second = list.cursor.advance();
        list.apply_page(second, page(2, 20..40, 3));
        assert_eq!(list.len(), 40);
        assert_eq!(list.items[20].id, 20);

        let again = list.cursor.refresh();
        list.apply_page(again, page(1, 100..105, 3));
        assert_eq!(list.len(), 5);
        assert_eq!(list.items[0].id, 100);
    }

    #[test]
    fn test_has_more_stops_at_total() {
        let mut list = PagedList::default();
        assert!(list.has_more());

        let first = list.cursor.refresh();
        list.apply_page(first, page(1, 0..3, 1));
        assert!(!list.has_more());
    }
}
