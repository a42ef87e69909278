//! Offset pagination shared by every listing query
//!
//! Pages are 1-based and have a fixed size per listing. There is no total
//! count: callers request the next page until it comes back empty. Results may
//! shift between calls if rows are inserted in between.

use serde::Serialize;

/// Events returned per page
pub const EVENTS_PAGE_SIZE: i64 = 10;

/// Venues returned per page
pub const VENUES_PAGE_SIZE: i64 = 10;

/// Tickets returned per page
pub const TICKETS_PAGE_SIZE: i64 = 50;

/// A 1-based page number, always >= 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Page(i32);

impl Page {
    pub const FIRST: Page = Page(1);

    /// Clamps zero and negative page numbers to the first page
    pub fn new(number: i32) -> Self {
        Page(number.max(1))
    }

    pub fn number(&self) -> i32 {
        self.0
    }

    /// Rows to skip for a page of `size` rows
    pub fn offset(&self, size: i64) -> i64 {
        (i64::from(self.0) - 1) * size
    }

    /// `(limit, offset)` pair for a page of `size` rows
    pub fn bounds(&self, size: i64) -> (i64, i64) {
        (size, self.offset(size))
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::FIRST
    }
}
