//! Following service.

use crate::services::notification::{NotificationEvent, NotificationService};
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::following,
    repositories::{FollowingRepository, UserRepository},
};
use sea_orm::Set;

/// Following service for business logic.
///
/// The follow relation is mirrored: one row serves both the follower's
/// "following" view and the followee's "followers" view, so the two sides
/// can never disagree.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub fn new(
        following_repo: FollowingRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            following_repo,
            user_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<following::Model> {
        // Can't follow yourself
        if follower_id == followee_id {
            return Err(AppError::InvalidOperation(
                "Cannot follow yourself".to_string(),
            ));
        }

        // Check if already following
        if self
            .following_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            return Err(AppError::AlreadyExists("Already following".to_string()));
        }

        // Both users must exist
        let follower = self.user_repo.get_by_id(follower_id).await?;
        let followee = self.user_repo.get_by_id(followee_id).await?;

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower.id.clone()),
            followee_id: Set(followee.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let following = self.following_repo.create(model).await?;

        // Update counts
        self.user_repo
            .increment_following_count(&follower.id)
            .await?;
        self.user_repo
            .increment_followers_count(&followee.id)
            .await?;

        // Notify the followee; the follow itself stands even if this fails
        let event = NotificationEvent::Follow {
            actor_id: follower.id.clone(),
        };
        if let Err(e) = self.notification_service.notify(&followee.id, &event).await {
            tracing::warn!(error = %e, followee_id = %followee.id, "Failed to create follow notification");
        }

        Ok(following)
    }

    /// Unfollow a user.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        let removed = self
            .following_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;

        if removed == 0 {
            return Err(AppError::NotFound("Not following".to_string()));
        }

        // Update counts
        self.user_repo
            .decrement_following_count(follower_id)
            .await?;
        self.user_repo
            .decrement_followers_count(followee_id)
            .await?;

        Ok(())
    }

    /// Check if a user is following another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// Get followers of a user.
    pub async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.following_repo
            .find_followers(user_id, limit, offset)
            .await
    }

    /// Get users that a user is following.
    pub async fn get_following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.following_repo
            .find_following(user_id, limit, offset)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ripple_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn empty_notification_service() -> NotificationService {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        NotificationService::new(NotificationRepository::new(db))
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            UserRepository::new(db2),
            empty_notification_service(),
        );
        let result = service.follow("user1", "user1").await;

        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_follow_already_following_returns_error() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            UserRepository::new(db2),
            empty_notification_service(),
        );
        let result = service.follow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_user_returns_error() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(0)]])
                .into_connection(),
        );
        let db2 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ripple_db::entities::user::Model>::new()])
                .into_connection(),
        );

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            UserRepository::new(db2),
            empty_notification_service(),
        );
        let result = service.follow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_unfollow_not_following_returns_error() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            UserRepository::new(db2),
            empty_notification_service(),
        );
        let result = service.unfollow("user1", "user2").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_is_following_passes_through() {
        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowingRepository::new(db1),
            UserRepository::new(db2),
            empty_notification_service(),
        );

        assert!(service.is_following("user1", "user2").await.unwrap());
    }
}
