//! Paging for the order search endpoint.

use serde::{Deserialize, Serialize};

/// Orders per page when the caller does not say.
const DEFAULT_PAGE_SIZE: u64 = 20;
/// Largest page the backend serves.
const MAX_PAGE_SIZE: u64 = 100;

/// Which slice of a result set to fetch. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Builds a request the backend will accept: page 0 becomes page 1
    /// and the size is held to `1..=100`.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(first_page()),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Same size, one page further.
    pub fn next(&self) -> Self {
        Self::new(self.page.saturating_add(1), self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(first_page(), DEFAULT_PAGE_SIZE)
    }
}

/// One page of results as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    /// Size of the whole result set, not of this page.
    pub total_items: u64,
}

impl<T> PageResponse<T> {
    /// Page count; an empty result set still has one (empty) page.
    pub fn total_pages(&self) -> u64 {
        match self.page_size {
            0 => 1,
            size => self.total_items.div_ceil(size).max(1),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// The request that fetches the page after this one.
    pub fn next_request(&self) -> Option<PageRequest> {
        self.has_next()
            .then(|| PageRequest::new(self.page, self.page_size).next())
    }
}

fn first_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
