//! Blocking repository.

use std::sync::Arc;

use crate::entities::{Blocking, blocking};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Blocking repository for database operations.
#[derive(Clone)]
pub struct BlockingRepository {
    db: Arc<DatabaseConnection>,
}

impl BlockingRepository {
    /// Create a new blocking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether `blocker_id` blocks `blockee_id`.
    pub async fn is_blocking(&self, blocker_id: &str, blockee_id: &str) -> AppResult<bool> {
        let count = Blocking::find()
            .filter(blocking::Column::BlockerId.eq(blocker_id))
            .filter(blocking::Column::BlockeeId.eq(blockee_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a block relationship.
    pub async fn create(&self, model: blocking::ActiveModel) -> AppResult<blocking::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a block relationship by pair, returning the number of rows
    /// removed.
    pub async fn delete_by_pair(&self, blocker_id: &str, blockee_id: &str) -> AppResult<u64> {
        let result = Blocking::delete_many()
            .filter(blocking::Column::BlockerId.eq(blocker_id))
            .filter(blocking::Column::BlockeeId.eq(blockee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// List the blocks a user has placed (paginated, newest first).
    pub async fn find_blocking(
        &self,
        blocker_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<blocking::Model>> {
        Blocking::find()
            .filter(blocking::Column::BlockerId.eq(blocker_id))
            .order_by_desc(blocking::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Collect the IDs of every user blocked by `blocker_id`.
    pub async fn blocked_ids(&self, blocker_id: &str) -> AppResult<Vec<String>> {
        let rows = Blocking::find()
            .filter(blocking::Column::BlockerId.eq(blocker_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|row| row.blockee_id).collect())
    }

    /// Collect the IDs of every user who blocks `blockee_id`.
    pub async fn blocker_ids_of(&self, blockee_id: &str) -> AppResult<Vec<String>> {
        let rows = Blocking::find()
            .filter(blocking::Column::BlockeeId.eq(blockee_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|row| row.blocker_id).collect())
    }
}
