//! User service.

use chrono::Utc;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use sea_orm::Set;
use validator::Validate;

/// Profile fields a user may change.
#[derive(Debug, Clone, Default, Validate, serde::Deserialize)]
pub struct UpdateProfile {
    /// Display name.
    #[validate(length(max = 128))]
    pub name: Option<String>,
    /// Bio text.
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    /// Avatar URL.
    #[validate(length(max = 512))]
    pub avatar_url: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new user account.
    pub async fn create_user(&self, username: &str, name: Option<&str>) -> AppResult<user::Model> {
        Self::validate_username(username)?;

        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Username already taken: {username}"
            )));
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            username_lower: Set(username.to_lowercase()),
            token: Set(Some(self.id_gen.generate_token())),
            name: Set(name.map(ToOwned::to_owned)),
            bio: Set(None),
            avatar_url: Set(None),
            role: Set(Role::User),
            is_active: Set(true),
            banned_reason: Set(None),
            banned_until: Set(None),
            followers_count: Set(0),
            following_count: Set(0),
            posts_count: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Update a user's profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: UpdateProfile,
    ) -> AppResult<user::Model> {
        update.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        if let Some(name) = update.name {
            active.name = Set(Some(name));
        }
        if let Some(bio) = update.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(avatar_url) = update.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Authenticate a user by access token.
    ///
    /// Banned accounts cannot authenticate while the ban is in effect.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.is_banned(Utc::now()) {
            return Err(AppError::Forbidden("Account is banned".to_string()));
        }

        Ok(user)
    }

    /// List user accounts, optionally filtered by active status.
    pub async fn list_users(
        &self,
        active: Option<bool>,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        let users = self.user_repo.list(active, limit, offset).await?;
        let total = self.user_repo.count(active).await?;
        Ok((users, total))
    }

    /// Search users by username substring.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.user_repo.search(query, limit.clamp(1, 100)).await
    }

    fn validate_username(username: &str) -> AppResult<()> {
        if username.is_empty() || username.len() > 32 {
            return Err(AppError::Validation(
                "Username must be 1-32 characters".to_string(),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits and underscores".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            token: Some("token".to_string()),
            name: None,
            bio: None,
            avatar_url: None,
            role: Role::User,
            is_active: true,
            banned_reason: None,
            banned_until: None,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            created_at: Utc::now().into(),
            updated_at: Some(Utc::now().into()),
        }
    }

    #[test]
    fn test_validate_username_rejects_bad_input() {
        assert!(UserService::validate_username("").is_err());
        assert!(UserService::validate_username("has space").is_err());
        assert!(UserService::validate_username(&"a".repeat(33)).is_err());
        assert!(UserService::validate_username("alice_42").is_ok());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_username() {
        let existing = create_test_user("user1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.create_user("alice", None).await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.authenticate_by_token("bad_token").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_banned_user() {
        let mut banned = create_test_user("user1", "alice");
        banned.is_active = false;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[banned]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.authenticate_by_token("token").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_search_empty_query_returns_nothing() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = UserService::new(UserRepository::new(db));
        let results = service.search("   ", 20).await.unwrap();

        assert!(results.is_empty());
    }

    #[test]
    fn test_update_profile_validation() {
        let update = UpdateProfile {
            bio: Some("x".repeat(501)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
