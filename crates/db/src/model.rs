use libris_kernel::{BookId, UserId};
use serde::{Deserialize, Serialize};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    /// Title of the book
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub introduction: String,
    /// Shelf location inside the library
    #[serde(default)]
    pub location: String,
    /// Copies currently available for loan
    #[serde(default)]
    pub count: u32,
}

/// A book suggested to a reader by the recommendation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_id: UserId,
    pub book_id: BookId,
    pub book_name: String,
    pub author: String,
}

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Row window covered by this page. `None` for page 0 or size 0.
    pub fn window(&self) -> Option<Window> {
        if self.page == 0 || self.size == 0 {
            return None;
        }
        let offset = u64::from(self.page - 1) * u64::from(self.size);
        Some(Window {
            offset: usize::try_from(offset).unwrap_or(usize::MAX),
            limit: self.size as usize,
        })
    }
}

/// Offset/limit slice of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

/// A page of results plus the metadata a pager needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let size = u64::from(request.size.max(1));
        Self {
            items,
            page: request.page,
            page_size: request.size,
            total,
            pages: total.div_ceil(size),
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.pages
    }
}
