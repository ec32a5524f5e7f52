//! Derived table views.
//!
//! Dashboard tables re-derive their visible rows from the full in-memory
//! list on every render: a case-insensitive substring filter over one or two
//! fields, a single-key comparator in either direction, and fixed page-size
//! slicing. Nothing here is cached; the source list stays untouched.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction for a single-key comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Pagination request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Current page number (0-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl PageRequest {
    /// Create a new page request
    ///
    /// # Examples
    ///
    /// ```
    /// use core_state::views::PageRequest;
    ///
    /// let request = PageRequest::new(0, 20);
    /// assert_eq!(request.page, 0);
    /// assert_eq!(request.page_size, 20);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Index of the first row on this page
    pub fn offset(&self) -> usize {
        (self.page as usize) * (self.page_size as usize)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 10,
        }
    }
}

/// One page of a derived view, with pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on the current page
    pub items: Vec<T>,
    /// Total rows after filtering, across all pages
    pub total: u64,
    /// Current page number
    pub page: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Number of rows per page
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Assemble a page from pre-sliced rows.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let total_pages = if request.page_size == 0 {
            0
        } else {
            ((total + u64::from(request.page_size) - 1) / u64::from(request.page_size)) as u32
        };

        Self {
            items,
            total,
            page: request.page,
            total_pages,
            page_size: request.page_size,
        }
    }

    /// Check if there are more pages after the current one
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// Check if there are pages before the current one
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Map the rows to a different type
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }
}

/// Query parameters for a derived table view.
#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    /// Substring filter; empty or `None` matches every row
    pub filter: Option<String>,
    /// Sort direction for the view's single sort key
    pub sort: Option<SortDirection>,
    /// Page to slice out
    pub page: PageRequest,
}

/// Case-insensitive substring match.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Re-derive a table view from the full in-memory list.
///
/// * `matches` decides whether a row matches the filter needle (typically
///   [`contains_ci`] over one or two fields)
/// * `compare` is the view's single-key ascending comparator; the direction
///   in the query flips it
///
/// The source slice is never mutated; rows are cloned into the page.
///
/// # Examples
///
/// ```
/// use core_state::views::{contains_ci, derive_view, PageRequest, SortDirection, TableQuery};
///
/// let names = vec!["Vinyl".to_string(), "Prints".to_string(), "Tapes".to_string()];
/// let query = TableQuery {
///     filter: None,
///     sort: Some(SortDirection::Ascending),
///     page: PageRequest::new(0, 2),
/// };
///
/// let page = derive_view(&names, &query, |row, needle| contains_ci(row, needle), |a, b| a.cmp(b));
/// assert_eq!(page.items, vec!["Prints".to_string(), "Tapes".to_string()]);
/// assert_eq!(page.total, 3);
/// ```
pub fn derive_view<T: Clone>(
    items: &[T],
    query: &TableQuery,
    matches: impl Fn(&T, &str) -> bool,
    compare: impl Fn(&T, &T) -> Ordering,
) -> Page<T> {
    let mut rows: Vec<T> = match query.filter.as_deref() {
        Some(needle) if !needle.is_empty() => items
            .iter()
            .filter(|row| matches(row, needle))
            .cloned()
            .collect(),
        _ => items.to_vec(),
    };

    if let Some(direction) = query.sort {
        rows.sort_by(|a, b| match direction {
            SortDirection::Ascending => compare(a, b),
            SortDirection::Descending => compare(b, a),
        });
    }

    let total = rows.len() as u64;
    let start = query.page.offset().min(rows.len());
    let end = (start + query.page.page_size as usize).min(rows.len());
    let items = rows[start..end].to_vec();

    Page::new(items, total, query.page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        artist: String,
        price: u32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "Night Signals".to_string(),
                artist: "Mara Voss".to_string(),
                price: 18,
            },
            Row {
                name: "Harbor Lights".to_string(),
                artist: "Nico Brandt".to_string(),
                price: 12,
            },
            Row {
                name: "Signal Fade".to_string(),
                artist: "Mara Voss".to_string(),
                price: 25,
            },
        ]
    }

    fn query(filter: Option<&str>, sort: Option<SortDirection>, page: u32, size: u32) -> TableQuery {
        TableQuery {
            filter: filter.map(|s| s.to_string()),
            sort,
            page: PageRequest::new(page, size),
        }
    }

    fn matches(row: &Row, needle: &str) -> bool {
        // Two-field match: name or artist
        contains_ci(&row.name, needle) || contains_ci(&row.artist, needle)
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Night Signals", "signal"));
        assert!(contains_ci("Night Signals", "NIGHT"));
        assert!(!contains_ci("Night Signals", "harbor"));
    }

    #[test]
    fn test_filter_over_two_fields() {
        let page = derive_view(&rows(), &query(Some("mara"), None, 0, 10), matches, |a, b| {
            a.name.cmp(&b.name)
        });

        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|r| r.artist == "Mara Voss"));
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let page = derive_view(&rows(), &query(Some(""), None, 0, 10), matches, |a, b| {
            a.name.cmp(&b.name)
        });
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_sort_descending_by_key() {
        let page = derive_view(
            &rows(),
            &query(None, Some(SortDirection::Descending), 0, 10),
            matches,
            |a, b| a.price.cmp(&b.price),
        );

        let prices: Vec<u32> = page.items.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![25, 18, 12]);
    }

    #[test]
    fn test_unsorted_preserves_source_order() {
        let page = derive_view(&rows(), &query(None, None, 0, 10), matches, |a, b| {
            a.price.cmp(&b.price)
        });
        assert_eq!(page.items[0].name, "Night Signals");
    }

    #[test]
    fn test_fixed_page_size_slicing() {
        let page = derive_view(
            &rows(),
            &query(None, Some(SortDirection::Ascending), 0, 2),
            matches,
            |a, b| a.name.cmp(&b.name),
        );

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let page = derive_view(
            &rows(),
            &query(None, Some(SortDirection::Ascending), 1, 2),
            matches,
            |a, b| a.name.cmp(&b.name),
        );

        assert_eq!(page.items.len(), 1);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_out_of_range_page_is_empty_with_totals() {
        let page = derive_view(&rows(), &query(None, None, 7, 2), matches, |a, b| {
            a.name.cmp(&b.name)
        });

        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_source_list_untouched() {
        let source = rows();
        let _ = derive_view(
            &source,
            &query(Some("signal"), Some(SortDirection::Descending), 0, 1),
            matches,
            |a, b| a.price.cmp(&b.price),
        );
        assert_eq!(source, rows());
    }

    #[test]
    fn test_page_map() {
        let page = derive_view(&rows(), &query(None, None, 0, 10), matches, |a, b| {
            a.name.cmp(&b.name)
        });
        let names = page.map(|r| r.name);
        assert_eq!(names.items.len(), 3);
        assert_eq!(names.total, 3);
    }

    #[test]
    fn test_zero_page_size() {
        let page = derive_view(&rows(), &query(None, None, 0, 0), matches, |a, b| {
            a.name.cmp(&b.name)
        });
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
