//! Abuse report endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_core::moderation::ReportTarget;
use ripple_db::entities::report::{Model as ReportModel, ReportReason, ReportStatus};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub user_id: Option<String>,
    pub post_id: Option<String>,
    pub reason: ReportReason,
    #[serde(default)]
    pub description: String,
}

/// Report response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub reporter_id: String,
    pub reported_user_id: Option<String>,
    pub reported_post_id: Option<String>,
    pub reason: ReportReason,
    pub description: String,
    pub status: ReportStatus,
    pub resolver_id: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
}

impl From<ReportModel> for ReportResponse {
    fn from(r: ReportModel) -> Self {
        Self {
            id: r.id,
            reporter_id: r.reporter_id,
            reported_user_id: r.reported_user_id,
            reported_post_id: r.reported_post_id,
            reason: r.reason,
            description: r.description,
            status: r.status,
            resolver_id: r.resolver_id,
            resolved_at: r.resolved_at.map(|t| t.to_rfc3339()),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Submit an abuse report.
async fn create_report(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let target = ReportTarget::from_refs(req.user_id.as_deref(), req.post_id.as_deref())?;
    let report = state
        .moderation_service
        .create_report(&user.id, target, req.reason, &req.description)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/create", post(create_report))
}
