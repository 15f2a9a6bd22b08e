//! Data access for the Libris catalog.
//!
//! The catalog is read through a single filter primitive ([`BookStore::select`])
//! plus a matching [`BookStore::count`]; every query shape the application
//! exposes is a [`BookFilter`] with some fields left unconstrained.

use std::sync::Arc;

use anyhow::{bail, Context};
use libris_kernel::settings::DatabaseSettings;

pub mod filter;
pub mod memory;
pub mod model;
pub mod store;

pub use filter::BookFilter;
pub use memory::{MemoryStore, Seed};
pub use model::{Book, Page, PageRequest, Recommendation, Window};
pub use store::{BookStore, RecommendationStore, StoreError};

const MEMORY_SCHEME: &str = "memory://";

/// Handles to the stores backing the application.
#[derive(Clone)]
pub struct Database {
    pub books: Arc<dyn BookStore>,
    pub recommendations: Arc<dyn RecommendationStore>,
}

impl Database {
    /// Wrap a single store that serves both books and recommendations.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: BookStore + RecommendationStore + 'static,
    {
        Self {
            books: store.clone(),
            recommendations: store,
        }
    }
}

/// Build the stores described by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    if !settings.endpoint.starts_with(MEMORY_SCHEME) {
        bail!(
            "unsupported database endpoint '{}'; only {} is available",
            settings.endpoint,
            MEMORY_SCHEME
        );
    }

    let store = match &settings.seed_path {
        Some(path) => {
            let seed = Seed::from_file(path)
                .await
                .with_context(|| format!("failed to load seed file {}", path.display()))?;
            tracing::info!(
                target: "libris-db",
                books = seed.books.len(),
                recommendations = seed.recommendations.len(),
                path = %path.display(),
                "seeding in-memory store"
            );
            MemoryStore::from_seed(seed).context("seed file is inconsistent")?
        }
        None => MemoryStore::new(),
    };

    tracing::info!(target: "libris-db", endpoint = %settings.endpoint, "store ready");
    Ok(Database::from_store(Arc::new(store)))
}
