//! Report repository.

use std::sync::Arc;

use crate::entities::{
    Report,
    report::{self, ReportStatus},
};
use chrono::{DateTime, Utc};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<report::Model>> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report not found: {id}")))
    }

    /// List reports (paginated, newest first), optionally filtered by status.
    pub async fn find_by_status(
        &self,
        status: Option<ReportStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        let mut query = Report::find().order_by_desc(report::Column::Id);

        if let Some(status) = status {
            query = query.filter(report::Column::Status.eq(status));
        }

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports, optionally filtered by status.
    pub async fn count_by_status(&self, status: Option<ReportStatus>) -> AppResult<u64> {
        let mut query = Report::find();

        if let Some(status) = status {
            query = query.filter(report::Column::Status.eq(status));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find pending reports created strictly before `cutoff` (oldest first).
    pub async fn find_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .filter(report::Column::CreatedAt.lt(cutoff))
            .order_by_asc(report::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move a report out of `pending` with a conditional update, returning
    /// the number of rows affected.
    ///
    /// The filter includes the current status, so a concurrent resolve loses
    /// the race with zero rows affected rather than overwriting the winner.
    pub async fn resolve_if_pending(
        &self,
        id: &str,
        status: ReportStatus,
        resolver_id: Option<&str>,
        resolved_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = Report::update_many()
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .col_expr(report::Column::Status, Expr::value(status))
            .col_expr(
                report::Column::ResolverId,
                Expr::value(resolver_id.map(ToOwned::to_owned)),
            )
            .col_expr(report::Column::ResolvedAt, Expr::value(resolved_at))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::report::ReportReason;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_report(id: &str, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: "user1".to_string(),
            reported_user_id: Some("user2".to_string()),
            reported_post_id: None,
            reason: ReportReason::Spam,
            description: String::new(),
            status,
            resolver_id: None,
            resolved_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_stale_pending_returns_reports() {
        let stale = create_test_report("report1", ReportStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stale]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let results = repo.find_stale_pending(Utc::now()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn test_resolve_if_pending_reports_rows_affected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let affected = repo
            .resolve_if_pending("report1", ReportStatus::Resolved, Some("admin1"), Utc::now())
            .await
            .unwrap();

        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn test_resolve_if_pending_lost_race_reports_zero() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let affected = repo
            .resolve_if_pending("report1", ReportStatus::Dismissed, None, Utc::now())
            .await
            .unwrap();

        assert_eq!(affected, 0);
    }
}
