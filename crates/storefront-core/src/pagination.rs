//! Pagination window.

use serde::{Deserialize, Serialize};

/// Number of page links shown around the current page.
pub const WINDOW_SIZE: i64 = 5;

/// Page numbers to show for `page_number` out of `pages_count` pages.
///
/// The window holds up to [`WINDOW_SIZE`] consecutive pages centered on
/// `page_number`, shifted to stay within `1..=pages_count`. A page number
/// outside that range is clamped to it first.
///
/// ```
/// use storefront_core::pagination::pages_range;
///
/// assert_eq!(pages_range(1, 3), vec![1, 2, 3]);
/// assert_eq!(pages_range(10, 10), vec![6, 7, 8, 9, 10]);
/// assert!(pages_range(1, 0).is_empty());
/// ```
pub fn pages_range(page_number: i64, pages_count: i64) -> Vec<i64> {
    if pages_count <= 0 {
        return Vec::new();
    }

    let page_number = page_number.clamp(1, pages_count);
    let half = WINDOW_SIZE / 2;
    let start = (page_number - half).max(1);
    let end = start.saturating_add(WINDOW_SIZE - 1).min(pages_count);
    let start = (end - (WINDOW_SIZE - 1)).max(1);

    (start..=end).collect()
}

/// Number of pages needed for `total_count` items.
pub fn pages_count(total_count: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total_count <= 0 {
        return 0;
    }
    total_count / page_size + i64::from(total_count % page_size != 0)
}

/// Current position in a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub page_number: i64,
    pub page_size: i64,
    pub total_count: i64,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 1,
            total_count: 0,
        }
    }
}

impl PaginationState {
    pub fn new(page_number: i64, page_size: i64, total_count: i64) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.max(1),
            total_count: total_count.max(0),
        }
    }

    pub fn pages_count(&self) -> i64 {
        pages_count(self.total_count, self.page_size)
    }

    /// Page links to render.
    pub fn window(&self) -> Vec<i64> {
        pages_range(self.page_number, self.pages_count())
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.pages_count()
    }

    pub fn has_prev(&self) -> bool {
        self.page_number > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_window_at_start() {
        assert_eq!(pages_range(1, 3), vec![1, 2, 3]);
        assert_eq!(pages_range(2, 10), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_window_at_end() {
        assert_eq!(pages_range(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(pages_range(9, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_window_in_middle() {
        assert_eq!(pages_range(5, 10), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_window_empty() {
        assert!(pages_range(1, 0).is_empty());
        assert!(pages_range(3, 0).is_empty());
    }

    #[test]
    fn test_single_page() {
        assert_eq!(pages_range(1, 1), vec![1]);
    }

    #[test]
    fn test_pagination_state() {
        let state = PaginationState::new(2, 12, 30);
        assert_eq!(state.pages_count(), 3);
        assert_eq!(state.window(), vec![1, 2, 3]);
        assert!(state.has_next());
        assert!(state.has_prev());

        let empty = PaginationState::default();
        assert_eq!(empty.pages_count(), 0);
        assert!(empty.window().is_empty());
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        assert_eq!(pages_range(i64::MAX, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(pages_range(i64::MIN, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(pages_range(40, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(pages_range(i64::MAX, i64::MAX).len(), 5);
        assert_eq!(pages_range(i64::MAX - 1, i64::MAX).last(), Some(&i64::MAX));
    }

    #[test]
    fn test_pages_count_large_totals() {
        assert_eq!(pages_count(i64::MAX, 1), i64::MAX);
        assert_eq!(pages_count(i64::MAX, 2), i64::MAX / 2 + 1);
        assert_eq!(pages_count(25, 12), 3);
        assert_eq!(pages_count(24, 12), 2);
    }

    #[test]
    fn test_state_window_with_huge_page() {
        let state = PaginationState::new(i64::MAX, 20, 100);
        assert_eq!(state.window(), vec![1, 2, 3, 4, 5]);
        assert!(!state.has_next());
    }

    proptest! {
        #[test]
        fn prop_window_is_bounded_and_contiguous(pages in 1i64..500, page_seed in 0i64..500) {
            let page = page_seed % pages + 1;
            let window = pages_range(page, pages);

            prop_assert_eq!(window.len() as i64, pages.min(WINDOW_SIZE));
            prop_assert!(window.contains(&page));
            prop_assert!(window.iter().all(|p| (1..=pages).contains(p)));
            prop_assert!(window.windows(2).all(|w| w[1] == w[0] + 1));
        }

        #[test]
        fn prop_window_never_overflows(pages in 1i64..=i64::MAX, page in any::<i64>()) {
            let window = pages_range(page, pages);

            prop_assert_eq!(window.len() as i64, pages.min(WINDOW_SIZE));
            prop_assert!(window.iter().all(|p| (1..=pages).contains(p)));
            prop_assert!(window.contains(&page.clamp(1, pages)));
        }
    }
}
