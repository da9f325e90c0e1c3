//! Blocking service.

use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::blocking,
    repositories::{BlockingRepository, UserRepository},
};
use sea_orm::Set;

/// Blocking service for business logic.
///
/// Blocking hides content in both directions but leaves follow relations
/// untouched; unblocking restores visibility without any re-follow step.
#[derive(Clone)]
pub struct BlockingService {
    blocking_repo: BlockingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl BlockingService {
    /// Create a new blocking service.
    #[must_use]
    pub fn new(blocking_repo: BlockingRepository, user_repo: UserRepository) -> Self {
        Self {
            blocking_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Block a user.
    pub async fn block(&self, blocker_id: &str, blockee_id: &str) -> AppResult<blocking::Model> {
        // Can't block yourself
        if blocker_id == blockee_id {
            return Err(AppError::InvalidOperation(
                "Cannot block yourself".to_string(),
            ));
        }

        // Check if already blocking
        if self.blocking_repo.is_blocking(blocker_id, blockee_id).await? {
            return Err(AppError::AlreadyExists("Already blocking".to_string()));
        }

        // Both users must exist
        let blocker = self.user_repo.get_by_id(blocker_id).await?;
        let blockee = self.user_repo.get_by_id(blockee_id).await?;

        let model = blocking::ActiveModel {
            id: Set(self.id_gen.generate()),
            blocker_id: Set(blocker.id),
            blockee_id: Set(blockee.id),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.blocking_repo.create(model).await
    }

    /// Unblock a user.
    pub async fn unblock(&self, blocker_id: &str, blockee_id: &str) -> AppResult<()> {
        let removed = self
            .blocking_repo
            .delete_by_pair(blocker_id, blockee_id)
            .await?;

        if removed == 0 {
            return Err(AppError::NotFound("Not blocking".to_string()));
        }

        Ok(())
    }

    /// Check if a user blocks another.
    pub async fn is_blocking(&self, blocker_id: &str, blockee_id: &str) -> AppResult<bool> {
        self.blocking_repo.is_blocking(blocker_id, blockee_id).await
    }

    /// List the blocks a user has placed.
    pub async fn get_blocking(
        &self,
        blocker_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<blocking::Model>> {
        self.blocking_repo
            .find_blocking(blocker_id, limit, offset)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }
    }

    #[tokio::test]
    async fn test_block_yourself_returns_error() {
        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = BlockingService::new(BlockingRepository::new(db1), UserRepository::new(db2));
        let result = service.block("user1", "user1").await;

        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_block_already_blocking_returns_error() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = BlockingService::new(BlockingRepository::new(db1), UserRepository::new(db2));
        let result = service.block("user1", "user2").await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_unblock_not_blocking_returns_error() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = BlockingService::new(BlockingRepository::new(db1), UserRepository::new(db2));
        let result = service.unblock("user1", "user2").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_is_blocking_passes_through() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = BlockingService::new(BlockingRepository::new(db1), UserRepository::new(db2));

        assert!(!service.is_blocking("user1", "user2").await.unwrap());
    }
}
