// Repository ports
// Traits the application layer depends on; adapters live in infrastructure

pub mod department_repository;
pub mod team_repository;
pub mod user_repository;

use serde::Serialize;
use thiserror::Error;

pub use department_repository::DepartmentRepository;
pub use team_repository::{TeamQuery, TeamRepository, Visibility};
pub use user_repository::{UserQuery, UserRepository};

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound on a single page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised by repository adapters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("{0} not found")]
    NotFound(String),

    /// The stored revision no longer matches the one the write was based on
    #[error("{0} was modified concurrently")]
    StaleWrite(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// 1-based page selection, clamped to sane bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Builds a page request; page is at least 1 and limit within 1..=100
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Slices an already-filtered, already-ordered collection
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect();
        Page::new(items, total, *self)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            limit: request.limit(),
        }
    }

    /// Number of pages, never less than one
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit)).max(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn page_request_clamps() {
        let request = PageRequest::new(Some(0), Some(1000));
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), MAX_PAGE_SIZE);

        assert_eq!(PageRequest::new(None, Some(0)).limit(), 1);
    }

    #[test]
    fn slice_returns_requested_window() {
        let page = PageRequest::new(Some(2), Some(3)).slice((1..=8).collect::<Vec<_>>());

        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 8);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = PageRequest::default().slice(Vec::<u8>::new());
        assert_eq!(page.total_pages(), 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = PageRequest::new(Some(5), Some(10)).slice(vec![1, 2, 3]);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }
}
