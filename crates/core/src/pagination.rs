//! Fixed-size page arithmetic for list views.
//!
//! Requested page numbers are clamped: anything unparsable or below 1 is
//! page 1, anything past the end is the last page. An empty result set still
//! has exactly one (empty) page.

use serde::Serialize;

/// Number of records per list page.
pub const PAGE_SIZE: i64 = 10;

/// Keyword accepted in place of a number to request the final page.
pub const LAST_PAGE_KEYWORD: &str = "last";

/// A page request as it arrived in the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(i64),
    Last,
}

impl PageRequest {
    /// Parse the raw `?page=` value. Missing or unparsable input is page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(LAST_PAGE_KEYWORD) => PageRequest::Last,
            Some(value) => PageRequest::Number(value.parse().unwrap_or(1)),
            None => PageRequest::Number(1),
        }
    }
}

/// The resolved page, ready to drive `LIMIT`/`OFFSET` and to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub page_size: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Page {
    /// Resolve `request` against a total record `count`.
    pub fn resolve(request: PageRequest, count: i64, page_size: i64) -> Self {
        let page_size = page_size.max(1);
        let count = count.max(0);
        let num_pages = ((count + page_size - 1) / page_size).max(1);
        let number = match request {
            PageRequest::Last => num_pages,
            PageRequest::Number(n) => n.clamp(1, num_pages),
        };
        Self {
            number,
            num_pages,
            count,
            page_size,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}
