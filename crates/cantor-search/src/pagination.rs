//! One page of an ordered result list, with navigation.

use serde::Serialize;

/// Default width of the page-number navigation window.
pub const DEFAULT_NAVIGATE_PAGES: usize = 5;

/// A page of records plus everything a pager needs to render around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination<T> {
    pub records: Vec<T>,

    /// 1-based page number.
    pub page_num: usize,

    /// Number of records actually on this page.
    pub page_size: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<usize>,
    pub next_page: Option<usize>,

    /// Width of the navigation window.
    pub navigate_pages: usize,
    pub navi_first_page: usize,
    pub navi_last_page: usize,

    /// Page numbers shown in the navigation window, ascending.
    pub navigate_nos: Vec<usize>,
}

impl<T> Pagination<T> {
    /// Page `page_num` of a list of `total_records` records split into pages
    /// of `page_size`, using the default navigation width.
    #[must_use]
    pub fn of(records: Vec<T>, total_records: usize, page_num: usize, page_size: usize) -> Self {
        Self::with_navigation(
            records,
            total_records,
            page_num,
            page_size,
            DEFAULT_NAVIGATE_PAGES,
        )
    }

    /// Like [`of`](Self::of) with an explicit navigation width.
    ///
    /// An empty `records` is always page 1 of 1 with no records and a page
    /// size of 0.
    #[must_use]
    pub fn with_navigation(
        records: Vec<T>,
        total_records: usize,
        page_num: usize,
        page_size: usize,
        navigate_pages: usize,
    ) -> Self {
        let navigate_pages = navigate_pages.max(1);
        let requested_size = page_size.max(1);

        let (page_num, page_size, total_pages, total_records) = if records.is_empty() {
            (1, 0, 1, 0)
        } else {
            let total_pages = total_records.div_ceil(requested_size).max(1);
            (page_num.clamp(1, total_pages), records.len(), total_pages, total_records)
        };

        let has_prev_page = page_num > 1;
        let has_next_page = page_num < total_pages;
        let (navi_first_page, navi_last_page) =
            navigation_window(page_num, total_pages, navigate_pages);

        Self {
            records,
            page_num,
            page_size,
            total_pages,
            total_records,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page_num - 1),
            next_page: has_next_page.then(|| page_num + 1),
            navigate_pages,
            navi_first_page,
            navi_last_page,
            navigate_nos: (navi_first_page..=navi_last_page).collect(),
        }
    }

    /// Convert the records, keeping the page layout.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Pagination<U> {
        Pagination {
            records: self.records.into_iter().map(f).collect(),
            page_num: self.page_num,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_records: self.total_records,
            has_prev_page: self.has_prev_page,
            has_next_page: self.has_next_page,
            prev_page: self.prev_page,
            next_page: self.next_page,
            navigate_pages: self.navigate_pages,
            navi_first_page: self.navi_first_page,
            navi_last_page: self.navi_last_page,
            navigate_nos: self.navigate_nos,
        }
    }
}

/// First and last page of a window of `width` pages centered on `page`,
/// shifted to stay within `1..=total`.
fn navigation_window(page: usize, total: usize, width: usize) -> (usize, usize) {
    if total <= width {
        return (1, total);
    }
    let mut first = page.saturating_sub(width / 2).max(1);
    let mut last = first + width - 1;
    if last > total {
        last = total;
        first = total - width + 1;
    }
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: usize, page_num: usize, page_size: usize) -> Pagination<usize> {
        let start = (page_num - 1) * page_size;
        let end = (start + page_size).min(total);
        let records = (start..end).collect();
        Pagination::of(records, total, page_num, page_size)
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let first = page(23, 1, 5);
        assert_eq!(first.total_pages, 5);
        assert!(!first.has_prev_page);
        assert!(first.has_next_page);
        assert_eq!(first.prev_page, None);
        assert_eq!(first.next_page, Some(2));

        let last = page(23, 5, 5);
        assert!(last.has_prev_page);
        assert!(!last.has_next_page);
        assert_eq!(last.page_size, 3);
        assert_eq!(last.records, vec![20, 21, 22]);
    }

    #[test]
    fn test_empty_records_normalize_to_single_page() {
        let empty: Pagination<usize> = Pagination::of(Vec::new(), 23, 9, 5);
        assert_eq!(empty.page_num, 1);
        assert_eq!(empty.total_pages, 1);
        assert_eq!(empty.total_records, 0);
        assert_eq!(empty.page_size, 0);
        assert!(!empty.has_prev_page);
        assert!(!empty.has_next_page);
        assert_eq!(empty.navigate_nos, vec![1]);
    }

    #[test]
    fn test_window_covers_all_pages_when_few() {
        let p = page(12, 2, 5);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.navigate_nos, vec![1, 2, 3]);
    }

    #[test]
    fn test_window_centers_and_clamps() {
        assert_eq!(page(100, 1, 10).navigate_nos, vec![1, 2, 3, 4, 5]);
        assert_eq!(page(100, 5, 10).navigate_nos, vec![3, 4, 5, 6, 7]);
        assert_eq!(page(100, 9, 10).navigate_nos, vec![6, 7, 8, 9, 10]);
        assert_eq!(page(100, 10, 10).navigate_nos, vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_custom_navigation_width() {
        let p = Pagination::with_navigation(vec![0], 100, 50, 1, 3);
        assert_eq!(p.navigate_pages, 3);
        assert_eq!((p.navi_first_page, p.navi_last_page), (49, 51));
    }

    #[test]
    fn test_map_keeps_layout() {
        let p = page(23, 2, 5).map(|n| n * 10);
        assert_eq!(p.records, vec![50, 60, 70, 80, 90]);
        assert_eq!(p.page_num, 2);
        assert_eq!(p.total_pages, 5);
    }
}
