//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::choices::{BookStatus, Genre, Language, Marketplace, ReadingType};
use super::DomainError;
use crate::models::book::Book;

/// Books shown per page in the reader library.
pub const LIBRARY_PAGE_SIZE: u64 = 12;

/// Books shown per page in the staff listing.
pub const ADMIN_PAGE_SIZE: u64 = 50;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySort {
    /// Newest first
    #[default]
    CreatedAt,
    /// Most rewarding first
    StarsCost,
}

impl LibrarySort {
    /// Unknown values fall back to the default ordering.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("stars_cost") | Some("-stars_cost") => LibrarySort::StarsCost,
            _ => LibrarySort::CreatedAt,
        }
    }
}

/// Filter criteria for the reader-facing library (live books only)
#[derive(Debug, Default, Clone)]
pub struct LibraryFilter {
    pub reading_type: Option<ReadingType>,
    pub marketplace: Option<Marketplace>,
    pub language: Option<Language>,
    pub genre: Option<Genre>,
    pub sort: LibrarySort,
    /// 1-based
    pub page: u64,
    /// Browsing user: hides their own books and the books of anyone who
    /// already took one of theirs
    pub viewer: Option<i32>,
}

/// Filter criteria for the staff book listing
#[derive(Debug, Default, Clone)]
pub struct AdminBookFilter {
    pub status: Option<BookStatus>,
    pub genre: Option<Genre>,
    pub language: Option<Language>,
    pub marketplace: Option<Marketplace>,
    /// Matches title or author
    pub search: Option<String>,
    /// 1-based
    pub page: u64,
}

/// Paginated result with total count
#[derive(Debug, serde::Serialize)]
pub struct PaginatedBooks {
    pub books: Vec<Book>,
    pub total: u64,
    pub page: u64,
    pub num_pages: u64,
}

/// Read-side repository for Book listings
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Live books matching the library filter
    async fn find_live(&self, filter: LibraryFilter) -> Result<PaginatedBooks, DomainError>;

    /// All books matching the staff filter, newest first
    async fn find_for_staff(&self, filter: AdminBookFilter) -> Result<PaginatedBooks, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;
}
