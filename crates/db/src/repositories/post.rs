//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, model: post::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Find posts by a single author (paginated, newest first).
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find posts visible to a viewer, skipping the excluded authors
    /// (paginated, newest first).
    ///
    /// The filter predicate is shared with [`count_visible`] so page contents
    /// and totals agree.
    ///
    /// [`count_visible`]: Self::count_visible
    pub async fn find_visible(
        &self,
        excluded_authors: &[String],
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(Self::visibility_condition(excluded_authors))
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts visible to a viewer, skipping the excluded authors.
    pub async fn count_visible(&self, excluded_authors: &[String]) -> AppResult<u64> {
        Post::find()
            .filter(Self::visibility_condition(excluded_authors))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn visibility_condition(excluded_authors: &[String]) -> Condition {
        let mut condition = Condition::all();
        if !excluded_authors.is_empty() {
            condition = condition.add(post::Column::AuthorId.is_not_in(excluded_authors.to_vec()));
        }
        condition
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            text: "Test post".to_string(),
            media: serde_json::json!([]),
            created_at: Utc::now().into(),
            updated_at: Some(Utc::now().into()),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_returns_post() {
        let post = create_test_post("post1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_id("post1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().author_id, "user1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_visible_returns_posts() {
        let post1 = create_test_post("post2", "user2");
        let post2 = create_test_post("post1", "user3");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post1, post2]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let excluded = vec!["user9".to_string()];
        let results = repo.find_visible(&excluded, 20, 0).await.unwrap();

        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_count_visible_returns_total() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(7))
                }]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let count = repo.count_visible(&[]).await.unwrap();

        assert_eq!(count, 7);
    }

    #[test]
    fn test_visibility_condition_empty_exclusion_has_no_filter() {
        let condition = PostRepository::visibility_condition(&[]);
        assert!(condition.is_empty());
    }

    #[test]
    fn test_visibility_condition_with_exclusion_has_filter() {
        let condition = PostRepository::visibility_condition(&["user1".to_string()]);
        assert!(!condition.is_empty());
    }
}
