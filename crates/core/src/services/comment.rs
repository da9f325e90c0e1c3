//! Comment service.

use chrono::Utc;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::Set;

use crate::services::notification::{NotificationEvent, NotificationService};

/// Maximum comment text length in characters.
const MAX_TEXT_LENGTH: usize = 500;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a post and notify the post's author.
    pub async fn create_comment(
        &self,
        author_id: &str,
        post_id: &str,
        text: &str,
    ) -> AppResult<comment::Model> {
        if text.is_empty() || text.chars().count() > MAX_TEXT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment text must be 1-{MAX_TEXT_LENGTH} characters"
            )));
        }

        let post = self.post_repo.get_by_id(post_id).await?;
        let author = self.user_repo.get_by_id(author_id).await?;
        if author.is_banned(Utc::now()) {
            return Err(AppError::Forbidden(
                "Banned users cannot comment".to_string(),
            ));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            post_id: Set(post.id.clone()),
            text: Set(text.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let created = self.comment_repo.create(model).await?;

        // No self-notification for commenting on your own post
        if post.author_id != author.id {
            let event = NotificationEvent::Comment {
                actor_id: author.id.clone(),
                post_id: post.id.clone(),
            };
            if let Err(e) = self
                .notification_service
                .notify(&post.author_id, &event)
                .await
            {
                tracing::warn!(error = %e, post_id = %post.id, "Failed to create comment notification");
            }
        }

        Ok(created)
    }

    /// List comments on a post (oldest first).
    pub async fn get_comments(
        &self,
        post_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.find_by_post(post_id, limit, offset).await
    }

    /// Count comments on a post.
    pub async fn count_comments(&self, post_id: &str) -> AppResult<u64> {
        self.comment_repo.count_by_post(post_id).await
    }

    /// Delete a comment.
    ///
    /// The comment's author may delete it; admins may delete any comment.
    pub async fn delete_comment(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.author_id != user_id {
            let user = self.user_repo.get_by_id(user_id).await?;
            if !user.is_admin() {
                return Err(AppError::Forbidden(
                    "Only the author or an admin can delete a comment".to_string(),
                ));
            }
        }

        self.comment_repo.delete(comment).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ripple_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn empty_conn() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_comment(id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            post_id: "post1".to_string(),
            text: "Nice".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn build_service(
        comment_db: Arc<sea_orm::DatabaseConnection>,
        post_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> CommentService {
        CommentService::new(
            CommentRepository::new(comment_db),
            PostRepository::new(post_db),
            UserRepository::new(user_db),
            NotificationService::new(NotificationRepository::new(empty_conn())),
        )
    }

    #[tokio::test]
    async fn test_create_comment_empty_text_rejected() {
        let service = build_service(empty_conn(), empty_conn(), empty_conn());
        let result = service.create_comment("user1", "post1", "").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_comment_unknown_post() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ripple_db::entities::post::Model>::new()])
                .into_connection(),
        );

        let service = build_service(empty_conn(), post_db, empty_conn());
        let result = service.create_comment("user1", "missing", "hi").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_comment_non_author_forbidden() {
        let comment = create_test_comment("c1", "user1");
        let requester = ripple_db::entities::user::Model {
            id: "user2".to_string(),
            username: "user2".to_string(),
            username_lower: "user2".to_string(),
            token: None,
            name: None,
            bio: None,
            avatar_url: None,
            role: ripple_db::entities::user::Role::User,
            is_active: true,
            banned_reason: None,
            banned_until: None,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            created_at: Utc::now().into(),
            updated_at: Some(Utc::now().into()),
        };

        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[requester]])
                .into_connection(),
        );

        let service = build_service(comment_db, empty_conn(), user_db);
        let result = service.delete_comment("user2", "c1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
