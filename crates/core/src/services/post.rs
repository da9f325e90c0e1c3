//! Post service.

use chrono::Utc;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::post::{self, MediaItem},
    entities::post_like,
    repositories::{
        CommentRepository, FollowingRepository, NotificationRepository, PostLikeRepository,
        PostRepository, UserRepository,
    },
};
use sea_orm::Set;

use crate::services::notification::{NotificationEvent, NotificationService};

/// Maximum post text length in characters.
const MAX_TEXT_LENGTH: usize = 500;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    following_repo: FollowingRepository,
    comment_repo: CommentRepository,
    post_like_repo: PostLikeRepository,
    notification_repo: NotificationRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        following_repo: FollowingRepository,
        comment_repo: CommentRepository,
        post_like_repo: PostLikeRepository,
        notification_repo: NotificationRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            following_repo,
            comment_repo,
            post_like_repo,
            notification_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post and notify the author's followers.
    pub async fn create_post(
        &self,
        author_id: &str,
        text: &str,
        media: Vec<MediaItem>,
    ) -> AppResult<post::Model> {
        Self::validate_content(text, &media)?;

        let author = self.user_repo.get_by_id(author_id).await?;
        if author.is_banned(Utc::now()) {
            return Err(AppError::Forbidden("Banned users cannot post".to_string()));
        }

        let now = Utc::now();
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            text: Set(text.to_string()),
            media: Set(serde_json::to_value(&media)
                .map_err(|e| AppError::Internal(e.to_string()))?),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;
        self.user_repo.increment_posts_count(&author.id).await?;

        // Fan the post out to followers; the post stands even if this fails
        match self.following_repo.follower_ids(&author.id).await {
            Ok(follower_ids) => {
                if let Err(e) = self
                    .notification_service
                    .fan_out_post(&author.id, &post.id, &follower_ids)
                    .await
                {
                    tracing::warn!(error = %e, post_id = %post.id, "Failed to fan out post notifications");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, post_id = %post.id, "Failed to load followers for fan-out");
            }
        }

        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get_post(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(post_id).await
    }

    /// List posts by a single author.
    pub async fn get_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        self.user_repo.get_by_id(author_id).await?;
        self.post_repo.find_by_author(author_id, limit, offset).await
    }

    /// Update a post's text. Only the author may edit.
    pub async fn update_post(
        &self,
        user_id: &str,
        post_id: &str,
        text: &str,
    ) -> AppResult<post::Model> {
        if text.is_empty() || text.chars().count() > MAX_TEXT_LENGTH {
            return Err(AppError::Validation(format!(
                "Post text must be 1-{MAX_TEXT_LENGTH} characters"
            )));
        }

        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can edit a post".to_string(),
            ));
        }

        let mut active: post::ActiveModel = post.into();
        active.text = Set(text.to_string());
        active.updated_at = Set(Some(Utc::now().into()));

        self.post_repo.update(active).await
    }

    /// Delete a post along with its comments, likes and notifications.
    ///
    /// The author may delete their own post; admins may delete any post.
    pub async fn delete_post(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != user_id {
            let user = self.user_repo.get_by_id(user_id).await?;
            if !user.is_admin() {
                return Err(AppError::Forbidden(
                    "Only the author or an admin can delete a post".to_string(),
                ));
            }
        }

        self.comment_repo.delete_by_post(post_id).await?;
        self.post_like_repo.delete_by_post(post_id).await?;
        self.notification_repo.delete_by_post(post_id).await?;

        let author_id = post.author_id.clone();
        self.post_repo.delete(post).await?;
        self.user_repo.decrement_posts_count(&author_id).await?;

        Ok(())
    }

    /// Like a post.
    pub async fn like(&self, user_id: &str, post_id: &str) -> AppResult<post_like::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if self.post_like_repo.exists(user_id, post_id).await? {
            return Err(AppError::AlreadyExists("Already liked".to_string()));
        }

        let model = post_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let like = self.post_like_repo.create(model).await?;

        // No self-notification for liking your own post
        if post.author_id != user_id {
            let event = NotificationEvent::Like {
                actor_id: user_id.to_string(),
                post_id: post_id.to_string(),
            };
            if let Err(e) = self
                .notification_service
                .notify(&post.author_id, &event)
                .await
            {
                tracing::warn!(error = %e, post_id = %post_id, "Failed to create like notification");
            }
        }

        Ok(like)
    }

    /// Remove a like from a post.
    pub async fn unlike(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        let removed = self.post_like_repo.delete_by_pair(user_id, post_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound("Not liked".to_string()));
        }
        Ok(())
    }

    /// Count likes on a post.
    pub async fn like_count(&self, post_id: &str) -> AppResult<u64> {
        self.post_like_repo.count_for_post(post_id).await
    }

    /// Share a post, notifying its author.
    pub async fn share(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;

        // No self-notification for sharing your own post
        if post.author_id != user_id {
            let event = NotificationEvent::Share {
                actor_id: user_id.to_string(),
                post_id: post_id.to_string(),
            };
            if let Err(e) = self
                .notification_service
                .notify(&post.author_id, &event)
                .await
            {
                tracing::warn!(error = %e, post_id = %post_id, "Failed to create share notification");
            }
        }

        Ok(())
    }

    fn validate_content(text: &str, media: &[MediaItem]) -> AppResult<()> {
        if text.is_empty() && media.is_empty() {
            return Err(AppError::InvalidArgument(
                "A post needs text or media".to_string(),
            ));
        }
        if text.chars().count() > MAX_TEXT_LENGTH {
            return Err(AppError::Validation(format!(
                "Post text must be at most {MAX_TEXT_LENGTH} characters"
            )));
        }
        Ok(())
    }
}
