use std::sync::Arc;

use libris_db::{Recommendation, RecommendationStore};
use libris_kernel::UserId;

use crate::error::ServiceError;

/// Read access to the recommendations prepared for each reader.
#[derive(Clone)]
pub struct RecommendService {
    store: Arc<dyn RecommendationStore>,
}

impl RecommendService {
    pub fn new(store: Arc<dyn RecommendationStore>) -> Self {
        Self { store }
    }

    /// Recommendations for `user_id`; empty when none were produced.
    pub async fn list_by_user_id(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Recommendation>, ServiceError> {
        let entries = self.store.list_by_user(user_id).await?;
        tracing::debug!(%user_id, count = entries.len(), "recommendations loaded");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libris_db::MemoryStore;
    use libris_kernel::BookId;

    #[tokio::test]
    async fn unknown_user_has_no_recommendations() {
        let store = MemoryStore::new();
        store
            .recommend(Recommendation {
                user_id: UserId(1),
                book_id: BookId(2),
                book_name: "Foundation".to_string(),
                author: "Asimov".to_string(),
            })
            .await;
        let service = RecommendService::new(Arc::new(store));

        assert_eq!(service.list_by_user_id(UserId(1)).await.unwrap().len(), 1);
        assert!(service.list_by_user_id(UserId(8)).await.unwrap().is_empty());
    }
}
