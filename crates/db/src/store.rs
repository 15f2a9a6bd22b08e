use async_trait::async_trait;
use libris_kernel::{BookId, UserId};
use thiserror::Error;

use crate::filter::BookFilter;
use crate::model::{Book, Recommendation, Window};

/// Failures reported by a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The operation would violate a store constraint.
    #[error("constraint violated: {0}")]
    Constraint(String),
}

/// Persistent collection of book records.
///
/// Results are returned in store order (ascending id for the in-memory
/// store). Implementations make a single attempt per call.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Number of books matching `filter`.
    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError>;

    /// Books matching `filter`, restricted to `window` when given.
    async fn select(
        &self,
        filter: &BookFilter,
        window: Option<Window>,
    ) -> Result<Vec<Book>, StoreError>;

    /// One window of the books matching `filter` together with the total
    /// number of matches, both taken from the same snapshot.
    async fn select_page(
        &self,
        filter: &BookFilter,
        window: Window,
    ) -> Result<(Vec<Book>, u64), StoreError>;

    /// Adds `book`; `false` when its id is already taken.
    async fn insert(&self, book: Book) -> Result<bool, StoreError>;

    /// Replaces the record with `book.id`; `false` when there is none.
    async fn update(&self, book: Book) -> Result<bool, StoreError>;

    /// Removes the record; `false` when there is none.
    async fn delete(&self, id: BookId) -> Result<bool, StoreError>;
}

/// Read-only view of the recommendations produced for each reader.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Recommendation>, StoreError>;
}
