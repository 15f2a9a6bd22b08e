use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{ensure, Context};
use async_trait::async_trait;
use libris_kernel::{BookId, UserId};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::filter::BookFilter;
use crate::model::{Book, Recommendation, Window};
use crate::store::{BookStore, RecommendationStore, StoreError};

/// Initial content for a [`MemoryStore`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

impl Seed {
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("seed is not valid JSON")
    }
}

/// In-process store keeping books ordered by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: RwLock<BTreeMap<BookId, Book>>,
    recommendations: RwLock<Vec<Recommendation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a seed, rejecting duplicate book ids.
    pub fn from_seed(seed: Seed) -> anyhow::Result<Self> {
        let mut books = BTreeMap::new();
        for book in seed.books {
            let id = book.id;
            ensure!(
                books.insert(id, book).is_none(),
                "duplicate book id {} in seed",
                id
            );
        }

        Ok(Self {
            books: RwLock::new(books),
            recommendations: RwLock::new(seed.recommendations),
        })
    }

    /// Append a recommendation entry for a reader.
    pub async fn recommend(&self, entry: Recommendation) {
        self.recommendations.write().await.push(entry);
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn count(&self, filter: &BookFilter) -> Result<u64, StoreError> {
        let books = self.books.read().await;
        Ok(books.values().filter(|b| filter.matches(b)).count() as u64)
    }

    async fn select(
        &self,
        filter: &BookFilter,
        window: Option<Window>,
    ) -> Result<Vec<Book>, StoreError> {
        let books = self.books.read().await;
        let matching = books.values().filter(|b| filter.matches(b)).cloned();

        Ok(match window {
            Some(w) => matching.skip(w.offset).take(w.limit).collect(),
            None => matching.collect(),
        })
    }

    async fn select_page(
        &self,
        filter: &BookFilter,
        window: Window,
    ) -> Result<(Vec<Book>, u64), StoreError> {
        let books = self.books.read().await;
        let mut total = 0u64;
        let mut items = Vec::new();
        for book in books.values().filter(|b| filter.matches(b)) {
            let position = total as usize;
            if position >= window.offset && items.len() < window.limit {
                items.push(book.clone());
            }
            total += 1;
        }
        Ok((items, total))
    }

    async fn insert(&self, book: Book) -> Result<bool, StoreError> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.id) {
            return Ok(false);
        }
        books.insert(book.id, book);
        Ok(true)
    }

    async fn update(&self, book: Book) -> Result<bool, StoreError> {
        let mut books = self.books.write().await;
        match books.get_mut(&book.id) {
            Some(existing) => {
                *existing = book;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: BookId) -> Result<bool, StoreError> {
        Ok(self.books.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl RecommendationStore for MemoryStore {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Recommendation>, StoreError> {
        let entries = self.recommendations.read().await;
        Ok(entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}
