use crate::pagination::sort::SortOrder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Parameters of a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub size: u64,
    /// Overrides the table's default sort when set.
    pub sort: Option<SortOrder>,
    /// Logs the statement before it is executed.
    pub debug: bool,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
            debug: false,
        }
    }
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            ..Default::default()
        }
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("Page cannot be less than 1: received {0}")]
    PageOutOfRange(u64),

    #[error("Limit cannot be less than 1: limit {limit} offset {offset}")]
    LimitOutOfRange { limit: u64, offset: u64 },

    #[error("Page window overflows: page {page} size {size}")]
    Overflow { page: u64, size: u64 },
}

/// The `LIMIT`/`OFFSET` window of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub start: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn new(page: u64, size: u64) -> Result<Self, PageError> {
        if page < 1 {
            return Err(PageError::PageOutOfRange(page));
        }

        let start = (page - 1)
            .checked_mul(size)
            .ok_or(PageError::Overflow { page, size })?;
        let limit = size;

        if limit < 1 {
            return Err(PageError::LimitOutOfRange {
                limit,
                offset: start,
            });
        }

        Ok(PageWindow { page, start, limit })
    }

    /// Total number of pages for `total` matching rows.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    /// Computes the page metadata once `returned` rows of `total` came back.
    ///
    /// An empty result (`total == 0`) has zero pages; page 1 of it is
    /// reported as both first and last.
    pub fn summarize(&self, total: u64, returned: u64) -> (u64, Pages) {
        let total_pages = self.total_pages(total);
        let remaining = total.saturating_sub(self.start).saturating_sub(returned);

        let pages = Pages {
            current: self.page,
            first: self.page == 1,
            last: self.page == total_pages || (total_pages == 0 && self.page == 1),
            total: total_pages,
            remaining: total_pages.saturating_sub(self.page),
        };

        (remaining, pages)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pages {
    pub current: u64,
    pub first: bool,
    pub last: bool,
    pub total: u64,
    pub remaining: u64,
}

/// One page of reshaped records plus the counts needed to page further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub start: u64,
    pub limit: u64,
    /// Rows matching the filter, independent of the window.
    pub total: u64,
    /// Rows after this page.
    pub remaining: u64,
    pub pages: Pages,
    pub data: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn from_window(window: &PageWindow, total: u64, data: Vec<T>) -> Self {
        let (remaining, pages) = window.summarize(total, data.len() as u64);
        PageResult {
            start: window.start,
            limit: window.limit,
            total,
            remaining,
            pages,
            data,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResult<U> {
        PageResult {
            start: self.start,
            limit: self.limit,
            total: self.total,
            remaining: self.remaining,
            pages: self.pages,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        for page in 1..=5 {
            for size in 1..=4 {
                let w = PageWindow::new(page, size).unwrap();
                assert_eq!(w.start, (page - 1) * size);
                assert_eq!(w.limit, size);
            }
        }
    }

    #[test]
    fn test_invalid_window() {
        assert_eq!(PageWindow::new(0, 10), Err(PageError::PageOutOfRange(0)));
        assert_eq!(
            PageWindow::new(3, 0),
            Err(PageError::LimitOutOfRange {
                limit: 0,
                offset: 0
            })
        );
        assert!(matches!(
            PageWindow::new(u64::MAX, 2),
            Err(PageError::Overflow { .. })
        ));
    }

    #[test]
    fn test_size_error_reports_limit_and_offset() {
        let err = PageWindow::new(2, 0).unwrap_err();
        assert_eq!(err.to_string(), "Limit cannot be less than 1: limit 0 offset 0");
    }

    #[test]
    fn test_empty_result_is_first_and_last() {
        let w = PageWindow::new(1, 25).unwrap();
        let (remaining, pages) = w.summarize(0, 0);
        assert_eq!(remaining, 0);
        assert_eq!(pages.total, 0);
        assert!(pages.first);
        assert!(pages.last);
        assert_eq!(pages.remaining, 0);
    }

    #[test]
    fn test_summary_single_row() {
        let w = PageWindow::new(1, 25).unwrap();
        let (remaining, pages) = w.summarize(1, 1);
        assert_eq!(remaining, 0);
        assert_eq!(pages.total, 1);
        assert!(pages.first && pages.last);
    }

    #[test]
    fn test_summary_many_rows() {
        // 7 rows, 3 per page
        let first = PageWindow::new(1, 3).unwrap();
        let (remaining, pages) = first.summarize(7, 3);
        assert_eq!(remaining, 4);
        assert_eq!(pages.total, 3);
        assert_eq!(pages.remaining, 2);
        assert!(!pages.last);

        let last = PageWindow::new(3, 3).unwrap();
        let (remaining, pages) = last.summarize(7, 1);
        assert_eq!(remaining, 0);
        assert!(pages.last);
        assert!(!pages.first);
        assert_eq!(pages.remaining, 0);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let w = PageWindow::new(2, 2).unwrap();
        let result = PageResult::from_window(&w, 3, vec![5]);
        let mapped = result.clone().map(|v| v * 2);
        assert_eq!(mapped.data, vec![10]);
        assert_eq!(mapped.pages, result.pages);
        assert_eq!(mapped.remaining, 0);
    }
}
