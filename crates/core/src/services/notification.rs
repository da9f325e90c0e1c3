//! Notification service.

use std::collections::BTreeSet;

use chrono::Utc;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// A domain event that produces a notification.
///
/// Each variant carries exactly the references its notification type needs,
/// so a notification can never be created with a mismatched payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// Someone started following the recipient.
    Follow {
        /// The new follower.
        actor_id: String,
    },
    /// Someone liked the recipient's post.
    Like {
        /// The user who liked.
        actor_id: String,
        /// The liked post.
        post_id: String,
    },
    /// Someone commented on the recipient's post.
    Comment {
        /// The commenter.
        actor_id: String,
        /// The commented post.
        post_id: String,
    },
    /// Someone the recipient follows published a post.
    Post {
        /// The author.
        actor_id: String,
        /// The new post.
        post_id: String,
    },
    /// Someone shared the recipient's post.
    Share {
        /// The user who shared.
        actor_id: String,
        /// The shared post.
        post_id: String,
    },
    /// One of the recipient's reports changed status.
    ReportStatus {
        /// The resolving admin; `None` when the system dismissed the report.
        actor_id: Option<String>,
        /// The report that changed.
        report_id: String,
    },
}

impl NotificationEvent {
    /// The stored notification type for this event.
    #[must_use]
    pub const fn notification_type(&self) -> NotificationType {
        match self {
            Self::Follow { .. } => NotificationType::Follow,
            Self::Like { .. } => NotificationType::Like,
            Self::Comment { .. } => NotificationType::Comment,
            Self::Post { .. } => NotificationType::Post,
            Self::Share { .. } => NotificationType::Share,
            Self::ReportStatus { .. } => NotificationType::ReportStatus,
        }
    }

    /// The acting user, if the event has one.
    #[must_use]
    pub fn actor_id(&self) -> Option<&str> {
        match self {
            Self::Follow { actor_id }
            | Self::Like { actor_id, .. }
            | Self::Comment { actor_id, .. }
            | Self::Post { actor_id, .. }
            | Self::Share { actor_id, .. } => Some(actor_id),
            Self::ReportStatus { actor_id, .. } => actor_id.as_deref(),
        }
    }

    /// The related post, if the event has one.
    #[must_use]
    pub fn post_id(&self) -> Option<&str> {
        match self {
            Self::Like { post_id, .. }
            | Self::Comment { post_id, .. }
            | Self::Post { post_id, .. }
            | Self::Share { post_id, .. } => Some(post_id),
            Self::Follow { .. } | Self::ReportStatus { .. } => None,
        }
    }

    /// The related report, if the event has one.
    #[must_use]
    pub fn report_id(&self) -> Option<&str> {
        match self {
            Self::ReportStatus { report_id, .. } => Some(report_id),
            _ => None,
        }
    }
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a notification for a recipient.
    pub async fn notify(
        &self,
        recipient_id: &str,
        event: &NotificationEvent,
    ) -> AppResult<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            notification_type: Set(event.notification_type()),
            actor_id: Set(event.actor_id().map(ToOwned::to_owned)),
            post_id: Set(event.post_id().map(ToOwned::to_owned)),
            report_id: Set(event.report_id().map(ToOwned::to_owned)),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        self.notification_repo.create(model).await
    }

    /// Fan a new post out to its author's followers.
    ///
    /// Recipients are deduplicated and the author never notifies themself, so
    /// each follower receives exactly one notification per post. A failure
    /// for one recipient does not stop delivery to the rest; the number of
    /// notifications actually created is returned.
    pub async fn fan_out_post(
        &self,
        author_id: &str,
        post_id: &str,
        follower_ids: &[String],
    ) -> AppResult<u64> {
        let recipients: BTreeSet<&str> = follower_ids
            .iter()
            .map(String::as_str)
            .filter(|id| *id != author_id)
            .collect();

        let event = NotificationEvent::Post {
            actor_id: author_id.to_string(),
            post_id: post_id.to_string(),
        };

        let mut delivered = 0;
        for recipient_id in recipients {
            if let Err(e) = self.notify(recipient_id, &event).await {
                tracing::warn!(
                    error = %e,
                    recipient_id = %recipient_id,
                    post_id = %post_id,
                    "Failed to deliver post notification"
                );
            } else {
                delivered += 1;
            }
        }

        Ok(delivered)
    }

    /// Mark a notification as read.
    ///
    /// Only the recipient may mark a notification; marking an already-read
    /// notification is a no-op.
    pub async fn mark_read(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> AppResult<notification::Model> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Notification not found: {notification_id}"))
            })?;

        if notification.recipient_id != user_id {
            return Err(AppError::Forbidden(
                "Cannot mark another user's notification".to_string(),
            ));
        }

        if notification.is_read {
            return Ok(notification);
        }

        self.notification_repo.mark_as_read(notification).await
    }

    /// Mark every unread notification of a user as read, returning how many
    /// were updated.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count unread notifications for a user.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// List notifications for a user (newest first).
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        let limit = limit.clamp(1, 100);
        self.notification_repo
            .find_by_recipient(user_id, limit, until_id, unread_only)
            .await
    }
}
