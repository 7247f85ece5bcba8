//! Page number and page size state shared by the list views.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::api::QueryParams;

/// Allowed page sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PageLimit {
    Small,
    Medium,
    #[default]
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid page size {0} (expected 25, 50 or 100)")]
pub struct InvalidLimit(pub u32);

impl PageLimit {
    pub const ALL: [PageLimit; 3] = [PageLimit::Small, PageLimit::Medium, PageLimit::Large];

    pub fn get(&self) -> u32 {
        match self {
            PageLimit::Small => 25,
            PageLimit::Medium => 50,
            PageLimit::Large => 100,
        }
    }
}

impl TryFrom<u32> for PageLimit {
    type Error = InvalidLimit;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageLimit::ALL
            .into_iter()
            .find(|limit| limit.get() == value)
            .ok_or(InvalidLimit(value))
    }
}

impl FromStr for PageLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("page size must be a number, got {s:?}"))?;
        PageLimit::try_from(value).map_err(|e| e.to_string())
    }
}

impl fmt::Display for PageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Current page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: PageLimit,
}

impl PageRequest {
    pub fn new(limit: PageLimit) -> Self {
        Self { page: 1, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> PageLimit {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(PageLimit::default())
    }
}

/// Owns a [`PageRequest`] and the "has more" flag derived from the last page.
#[derive(Debug, Clone)]
pub struct PaginationController {
    request: PageRequest,
    has_more: bool,
}

impl PaginationController {
    pub fn new(limit: PageLimit) -> Self {
        Self {
            request: PageRequest::new(limit),
            // Nothing fetched yet; Next stays disabled while the first page loads.
            has_more: true,
        }
    }

    pub fn request(&self) -> PageRequest {
        self.request
    }

    pub fn page(&self) -> u32 {
        self.request.page
    }

    pub fn limit(&self) -> PageLimit {
        self.request.limit
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn can_go_previous(&self, busy: bool) -> bool {
        self.request.page > 1 && !busy
    }

    pub fn can_go_next(&self, busy: bool) -> bool {
        self.has_more && !busy
    }

    /// Step back one page. No-op on page 1 or while a fetch is in flight.
    pub fn go_to_previous_page(&mut self, busy: bool) -> bool {
        if !self.can_go_previous(busy) {
            return false;
        }
        self.request.page -= 1;
        true
    }

    /// Step forward one page. No-op when the last page came back short or
    /// while a fetch is in flight.
    pub fn go_to_next_page(&mut self, busy: bool) -> bool {
        if !self.can_go_next(busy) {
            return false;
        }
        self.request.page += 1;
        true
    }

    /// Change the page size. Always returns to page 1.
    pub fn set_limit(&mut self, limit: PageLimit) {
        self.request = PageRequest::new(limit);
    }

    pub fn reset_page(&mut self) {
        self.request.page = 1;
    }

    /// Record how many records the last successful fetch returned.
    ///
    /// A full page means there may be another one; a short page means there
    /// is not. A final page that is exactly full still reports `true`.
    pub fn record_result(&mut self, returned: usize) {
        self.has_more = returned == self.request.limit.get() as usize;
    }

    /// `page` and `limit` query parameters, appended to `params`.
    pub fn append_params(&self, params: QueryParams) -> QueryParams {
        params
            .insert("page", self.request.page)
            .insert("limit", self.request.limit.get())
    }
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(PageLimit::default())
    }
}
