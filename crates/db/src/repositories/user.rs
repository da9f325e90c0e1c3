//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by access token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::UsernameLower.eq(username.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search users by username substring (case-insensitive).
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let pattern = format!("%{}%", query.to_lowercase().replace('%', "\\%"));
        User::find()
            .filter(user::Column::UsernameLower.like(pattern))
            .order_by_asc(user::Column::UsernameLower)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List users (paginated, newest first), optionally filtered by active
    /// status.
    pub async fn list(
        &self,
        active: Option<bool>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        let mut query = User::find().order_by_desc(user::Column::Id);

        if let Some(active) = active {
            query = query.filter(user::Column::IsActive.eq(active));
        }

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users, optionally filtered by active status.
    pub async fn count(&self, active: Option<bool>) -> AppResult<u64> {
        let mut query = User::find();

        if let Some(active) = active {
            query = query.filter(user::Column::IsActive.eq(active));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the denormalized followers count.
    pub async fn increment_followers_count(&self, id: &str) -> AppResult<()> {
        self.adjust_count(id, user::Column::FollowersCount, 1).await
    }

    /// Decrement the denormalized followers count.
    pub async fn decrement_followers_count(&self, id: &str) -> AppResult<()> {
        self.adjust_count(id, user::Column::FollowersCount, -1)
            .await
    }

    /// Increment the denormalized following count.
    pub async fn increment_following_count(&self, id: &str) -> AppResult<()> {
        self.adjust_count(id, user::Column::FollowingCount, 1).await
    }

    /// Decrement the denormalized following count.
    pub async fn decrement_following_count(&self, id: &str) -> AppResult<()> {
        self.adjust_count(id, user::Column::FollowingCount, -1)
            .await
    }

    /// Increment the denormalized posts count.
    pub async fn increment_posts_count(&self, id: &str) -> AppResult<()> {
        self.adjust_count(id, user::Column::PostsCount, 1).await
    }

    /// Decrement the denormalized posts count.
    pub async fn decrement_posts_count(&self, id: &str) -> AppResult<()> {
        self.adjust_count(id, user::Column::PostsCount, -1).await
    }

    async fn adjust_count(&self, id: &str, column: user::Column, delta: i32) -> AppResult<()> {
        User::update_many()
            .filter(user::Column::Id.eq(id))
            .col_expr(column, Expr::col(column).add(delta))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
