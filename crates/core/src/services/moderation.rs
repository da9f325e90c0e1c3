//! Moderation service.
//!
//! Covers the abuse report lifecycle (submit, resolve, dismiss, automatic
//! expiry) and account bans. Bans are independent of reports: resolving a
//! report never bans anyone, and banning a user never touches their reports.

use chrono::{DateTime, Duration, Utc};
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::report::{self, ReportReason, ReportStatus},
    entities::user,
    repositories::{PostRepository, ReportRepository, UserRepository},
};
use sea_orm::Set;

use crate::services::notification::{NotificationEvent, NotificationService};

/// Maximum report description length in characters.
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// What a report points at. Exactly one target per report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportTarget {
    /// A reported user.
    User(String),
    /// A reported post.
    Post(String),
}

impl ReportTarget {
    /// Build a target from the two optional references of a request,
    /// rejecting zero or two targets.
    pub fn from_refs(user_id: Option<&str>, post_id: Option<&str>) -> AppResult<Self> {
        match (user_id, post_id) {
            (Some(user_id), None) => Ok(Self::User(user_id.to_string())),
            (None, Some(post_id)) => Ok(Self::Post(post_id.to_string())),
            (Some(_), Some(_)) => Err(AppError::InvalidArgument(
                "A report cannot target both a user and a post".to_string(),
            )),
            (None, None) => Err(AppError::InvalidArgument(
                "A report needs a target".to_string(),
            )),
        }
    }
}

/// Moderation service for business logic.
#[derive(Clone)]
pub struct ModerationService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
    post_repo: PostRepository,
    notification_service: NotificationService,
    staleness: Duration,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    ///
    /// `staleness_days` is how long a report may sit pending before the
    /// sweep dismisses it.
    #[must_use]
    pub fn new(
        report_repo: ReportRepository,
        user_repo: UserRepository,
        post_repo: PostRepository,
        notification_service: NotificationService,
        staleness_days: i64,
    ) -> Self {
        Self {
            report_repo,
            user_repo,
            post_repo,
            notification_service,
            staleness: Duration::days(staleness_days),
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit an abuse report.
    pub async fn create_report(
        &self,
        reporter_id: &str,
        target: ReportTarget,
        reason: ReportReason,
        description: &str,
    ) -> AppResult<report::Model> {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(AppError::Validation(format!(
                "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }

        let reporter = self.user_repo.get_by_id(reporter_id).await?;

        // The target must exist at submission time
        let (reported_user_id, reported_post_id) = match &target {
            ReportTarget::User(user_id) => {
                let user = self.user_repo.get_by_id(user_id).await?;
                (Some(user.id), None)
            }
            ReportTarget::Post(post_id) => {
                let post = self.post_repo.get_by_id(post_id).await?;
                (None, Some(post.id))
            }
        };

        let model = report::ActiveModel {
            id: Set(self.id_gen.generate()),
            reporter_id: Set(reporter.id),
            reported_user_id: Set(reported_user_id),
            reported_post_id: Set(reported_post_id),
            reason: Set(reason),
            description: Set(description.to_string()),
            status: Set(ReportStatus::Pending),
            resolver_id: Set(None),
            resolved_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        self.report_repo.create(model).await
    }

    /// Get a report by ID.
    pub async fn get_report(&self, report_id: &str) -> AppResult<report::Model> {
        self.report_repo.get_by_id(report_id).await
    }

    /// List reports, optionally filtered by status.
    pub async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<report::Model>, u64)> {
        let reports = self
            .report_repo
            .find_by_status(status.clone(), limit, offset)
            .await?;
        let total = self.report_repo.count_by_status(status).await?;
        Ok((reports, total))
    }

    /// Resolve or dismiss a pending report.
    ///
    /// Only admins may resolve. The status update is conditional on the
    /// report still being pending, so concurrent resolutions cannot both
    /// win; the loser gets an invalid-state error.
    pub async fn resolve_report(
        &self,
        admin_id: &str,
        report_id: &str,
        outcome: ReportStatus,
    ) -> AppResult<report::Model> {
        if outcome == ReportStatus::Pending {
            return Err(AppError::InvalidArgument(
                "Outcome must be resolved or dismissed".to_string(),
            ));
        }

        let admin = self.user_repo.get_by_id(admin_id).await?;
        if !admin.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can resolve reports".to_string(),
            ));
        }

        let mut report = self.report_repo.get_by_id(report_id).await?;
        if report.status != ReportStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Report is not pending: {report_id}"
            )));
        }

        let resolved_at = Utc::now();
        let affected = self
            .report_repo
            .resolve_if_pending(report_id, outcome.clone(), Some(&admin.id), resolved_at)
            .await?;
        if affected == 0 {
            // Someone else resolved it between the read and the update
            return Err(AppError::InvalidState(format!(
                "Report is not pending: {report_id}"
            )));
        }

        report.status = outcome;
        report.resolver_id = Some(admin.id.clone());
        report.resolved_at = Some(resolved_at.into());

        self.notify_reporter(&report, Some(&admin.id)).await;

        Ok(report)
    }

    /// Dismiss pending reports older than the staleness window.
    ///
    /// Each report is dismissed with the same conditional update as a manual
    /// resolution, so a report an admin handles mid-sweep is skipped rather
    /// than overwritten. Returns the number of reports dismissed.
    pub async fn sweep_expired_reports(&self) -> AppResult<u64> {
        self.sweep_expired_reports_at(Utc::now()).await
    }

    /// Sweep with an explicit clock, for deterministic tests.
    pub async fn sweep_expired_reports_at(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let cutoff = now - self.staleness;
        let stale = self.report_repo.find_stale_pending(cutoff).await?;

        let mut dismissed = 0;
        for mut report in stale {
            match self
                .report_repo
                .resolve_if_pending(&report.id, ReportStatus::Dismissed, None, now)
                .await
            {
                Ok(0) => {
                    tracing::debug!(report_id = %report.id, "Report resolved before sweep reached it");
                }
                Ok(_) => {
                    dismissed += 1;
                    report.status = ReportStatus::Dismissed;
                    report.resolver_id = None;
                    report.resolved_at = Some(now.into());
                    self.notify_reporter(&report, None).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, report_id = %report.id, "Failed to dismiss stale report");
                }
            }
        }

        if dismissed > 0 {
            tracing::info!(count = dismissed, "Dismissed stale reports");
        }

        Ok(dismissed)
    }

    /// Ban a user.
    ///
    /// `duration_days` of `None` means a permanent ban. Admins cannot be
    /// banned.
    pub async fn ban_user(
        &self,
        admin_id: &str,
        target_id: &str,
        reason: &str,
        duration_days: Option<i64>,
    ) -> AppResult<user::Model> {
        let admin = self.user_repo.get_by_id(admin_id).await?;
        if !admin.is_admin() {
            return Err(AppError::Forbidden("Only admins can ban users".to_string()));
        }

        let target = self.user_repo.get_by_id(target_id).await?;
        if target.is_admin() {
            return Err(AppError::InvalidOperation(
                "Cannot ban an admin".to_string(),
            ));
        }

        let banned_until = duration_days.map(|days| (Utc::now() + Duration::days(days)).into());

        let mut active: user::ActiveModel = target.into();
        active.is_active = Set(false);
        active.banned_reason = Set(Some(reason.to_string()));
        active.banned_until = Set(banned_until);
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Lift a user's ban.
    pub async fn unban_user(&self, admin_id: &str, target_id: &str) -> AppResult<user::Model> {
        let admin = self.user_repo.get_by_id(admin_id).await?;
        if !admin.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can unban users".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(target_id).await?;

        let mut active: user::ActiveModel = target.into();
        active.is_active = Set(true);
        active.banned_reason = Set(None);
        active.banned_until = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Tell the reporter their report changed status. Non-fatal.
    async fn notify_reporter(&self, report: &report::Model, actor_id: Option<&str>) {
        let event = NotificationEvent::ReportStatus {
            actor_id: actor_id.map(ToOwned::to_owned),
            report_id: report.id.clone(),
        };
        if let Err(e) = self
            .notification_service
            .notify(&report.reporter_id, &event)
            .await
        {
            tracing::warn!(error = %e, report_id = %report.id, "Failed to create report status notification");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ripple_db::entities::user::Role;
    use ripple_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn empty_conn() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_user(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user_{id}"),
            username_lower: format!("user_{id}"),
            token: None,
            name: None,
            bio: None,
            avatar_url: None,
            role,
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

    fn create_test_report(id: &str, status: ReportStatus, created_at: DateTime<Utc>) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: "reporter1".to_string(),
            reported_user_id: Some("user2".to_string()),
            reported_post_id: None,
            reason: ReportReason::Spam,
            description: String::new(),
            status,
            resolver_id: None,
            resolved_at: None,
            created_at: created_at.into(),
        }
    }

    fn build_service(
        report_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> ModerationService {
        ModerationService::new(
            ReportRepository::new(report_db),
            UserRepository::new(user_db),
            PostRepository::new(empty_conn()),
            NotificationService::new(NotificationRepository::new(empty_conn())),
            7,
        )
    }

    #[test]
    fn test_report_target_requires_exactly_one() {
        assert!(matches!(
            ReportTarget::from_refs(None, None),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            ReportTarget::from_refs(Some("user1"), Some("post1")),
            Err(AppError::InvalidArgument(_))
        ));
        assert_eq!(
            ReportTarget::from_refs(Some("user1"), None).unwrap(),
            ReportTarget::User("user1".to_string())
        );
        assert_eq!(
            ReportTarget::from_refs(None, Some("post1")).unwrap(),
            ReportTarget::Post("post1".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_report_requires_admin() {
        let regular = create_test_user("user1", Role::User);

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[regular]])
                .into_connection(),
        );

        let service = build_service(empty_conn(), user_db);
        let result = service
            .resolve_report("user1", "report1", ReportStatus::Resolved)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_resolve_report_rejects_pending_outcome() {
        let service = build_service(empty_conn(), empty_conn());
        let result = service
            .resolve_report("admin1", "report1", ReportStatus::Pending)
            .await;

        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_resolve_report_not_pending_is_invalid_state() {
        let admin = create_test_user("admin1", Role::Admin);
        let resolved = create_test_report("report1", ReportStatus::Resolved, Utc::now());

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );
        let report_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[resolved]])
                .into_connection(),
        );

        let service = build_service(report_db, user_db);
        let result = service
            .resolve_report("admin1", "report1", ReportStatus::Dismissed)
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_resolve_report_lost_race_is_invalid_state() {
        let admin = create_test_user("admin1", Role::Admin);
        let pending = create_test_report("report1", ReportStatus::Pending, Utc::now());

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .into_connection(),
        );
        // The conditional update affects zero rows: someone else won
        let report_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = build_service(report_db, user_db);
        let result = service
            .resolve_report("admin1", "report1", ReportStatus::Resolved)
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_sweep_dismisses_stale_reports() {
        let now = Utc::now();
        let stale1 = create_test_report("report1", ReportStatus::Pending, now - Duration::days(10));
        let stale2 = create_test_report("report2", ReportStatus::Pending, now - Duration::days(8));

        let report_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stale1, stale2]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = build_service(report_db, empty_conn());
        let dismissed = service.sweep_expired_reports_at(now).await.unwrap();

        assert_eq!(dismissed, 2);
    }

    #[tokio::test]
    async fn test_sweep_skips_concurrently_resolved_reports() {
        let now = Utc::now();
        let stale = create_test_report("report1", ReportStatus::Pending, now - Duration::days(10));

        let report_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stale]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = build_service(report_db, empty_conn());
        let dismissed = service.sweep_expired_reports_at(now).await.unwrap();

        assert_eq!(dismissed, 0);
    }

    #[tokio::test]
    async fn test_sweep_with_no_stale_reports() {
        let report_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let service = build_service(report_db, empty_conn());
        let dismissed = service.sweep_expired_reports().await.unwrap();

        assert_eq!(dismissed, 0);
    }

    #[tokio::test]
    async fn test_ban_admin_target_rejected() {
        let admin = create_test_user("admin1", Role::Admin);
        let other_admin = create_test_user("admin2", Role::Admin);

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin], [other_admin]])
                .into_connection(),
        );

        let service = build_service(empty_conn(), user_db);
        let result = service.ban_user("admin1", "admin2", "spam", Some(7)).await;

        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_ban_requires_admin() {
        let regular = create_test_user("user1", Role::User);

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[regular]])
                .into_connection(),
        );

        let service = build_service(empty_conn(), user_db);
        let result = service.ban_user("user1", "user2", "spam", None).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
