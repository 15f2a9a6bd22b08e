use std::sync::Arc;

use libris_db::{Book, BookFilter, BookStore, Page, PageRequest};
use libris_kernel::BookId;

use super::models::MultiConditions;
use crate::error::ServiceError;

/// Catalog queries and maintenance over a [`BookStore`].
///
/// Every read is a [`BookFilter`] handed to the store's single select
/// primitive; the public methods only decide which fields to constrain.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
    page_size: u32,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>, page_size: u32) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn find(&self, filter: &BookFilter) -> Result<Vec<Book>, ServiceError> {
        let books = self.store.select(filter, None).await?;
        tracing::debug!(?filter, matched = books.len(), "catalog query");
        Ok(books)
    }

    async fn find_page(&self, filter: &BookFilter, page: u32) -> Result<Page<Book>, ServiceError> {
        let request = PageRequest::new(page, self.page_size);
        let window = request
            .window()
            .ok_or_else(|| ServiceError::business(format!("page must be at least 1, got {page}")))?;

        let (items, total) = self.store.select_page(filter, window).await?;
        tracing::debug!(?filter, page, total, "catalog page query");
        Ok(Page::new(items, request, total))
    }

    /// Every book in store order.
    pub async fn list_all(&self) -> Result<Vec<Book>, ServiceError> {
        self.find(&BookFilter::new()).await
    }

    /// Books whose title or author contains `condition`.
    pub async fn list_by_free_text(
        &self,
        condition: Option<&str>,
    ) -> Result<Vec<Book>, ServiceError> {
        self.find(&BookFilter::new().keyword(condition)).await
    }

    pub async fn list_by_name_and_author(
        &self,
        name: &str,
        author: &str,
    ) -> Result<Vec<Book>, ServiceError> {
        self.find(&BookFilter::new().name(Some(name)).author(Some(author)))
            .await
    }

    pub async fn query_by_multi_conditions(
        &self,
        conditions: &MultiConditions,
    ) -> Result<Vec<Book>, ServiceError> {
        self.find(&multi_condition_filter(conditions)).await
    }

    /// One page of the whole catalog; pages start at 1.
    pub async fn list_all_paged(&self, page: u32) -> Result<Page<Book>, ServiceError> {
        self.find_page(&BookFilter::new(), page).await
    }

    /// Adds `book`; `false` when its id is already taken.
    pub async fn insert(&self, book: Book) -> Result<bool, ServiceError> {
        validate(&book)?;
        let id = book.id;
        let inserted = self.store.insert(book).await?;
        if inserted {
            tracing::info!(book_id = %id, "book added");
        } else {
            tracing::info!(book_id = %id, "book id already taken");
        }
        Ok(inserted)
    }

    /// Replaces the record with `book.id`; `false` when there is none.
    pub async fn update_by_id(&self, book: Book) -> Result<bool, ServiceError> {
        validate(&book)?;
        let id = book.id;
        let updated = self.store.update(book).await?;
        tracing::info!(book_id = %id, updated, "book update");
        Ok(updated)
    }

    pub async fn delete_by_id(&self, id: BookId) -> Result<bool, ServiceError> {
        let deleted = self.store.delete(id).await?;
        tracing::info!(book_id = %id, deleted, "book delete");
        Ok(deleted)
    }
}

fn multi_condition_filter(conditions: &MultiConditions) -> BookFilter {
    BookFilter::new()
        .publisher(conditions.publisher.as_deref())
        .introduction(conditions.introduction.as_deref())
        .author(conditions.author.as_deref())
        .location(conditions.location.as_deref())
}

fn validate(book: &Book) -> Result<(), ServiceError> {
    if book.name.trim().is_empty() {
        return Err(ServiceError::business("book name must not be blank"));
    }
    if book.author.trim().is_empty() {
        return Err(ServiceError::business("book author must not be blank"));
    }
    Ok(())
}
