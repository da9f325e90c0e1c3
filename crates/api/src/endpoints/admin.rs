//! Admin endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_db::entities::report::ReportStatus;
use ripple_db::entities::user::Model as UserModel;
use serde::{Deserialize, Serialize};

use crate::endpoints::reports::ReportResponse;
use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// List reports request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsRequest {
    pub status: Option<ReportStatus>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Show report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowReportRequest {
    pub report_id: String,
}

/// Resolve report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReportRequest {
    pub report_id: String,
    /// `resolved` or `dismissed`.
    pub outcome: ReportStatus,
}

/// Ban user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanUserRequest {
    pub user_id: String,
    pub reason: String,
    /// Ban length in days; omit for a permanent ban.
    pub duration_days: Option<i64>,
}

/// Unban user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbanUserRequest {
    pub user_id: String,
}

/// List users request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersRequest {
    /// Filter on active status; omit for all users.
    pub active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    30
}

/// Paginated user listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<AdminUserResponse>,
    pub total: u64,
}

/// Paginated report listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListResponse {
    pub reports: Vec<ReportResponse>,
    pub total: u64,
}

/// Admin view of a user account.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub banned_reason: Option<String>,
    pub banned_until: Option<String>,
    pub created_at: String,
}

impl From<UserModel> for AdminUserResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role: match u.role {
                ripple_db::entities::user::Role::Admin => "admin".to_string(),
                ripple_db::entities::user::Role::User => "user".to_string(),
            },
            is_active: u.is_active,
            banned_reason: u.banned_reason,
            banned_until: u.banned_until.map(|t| t.to_rfc3339()),
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// List reports, optionally filtered by status.
async fn list_reports(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ListReportsRequest>,
) -> AppResult<ApiResponse<ReportListResponse>> {
    let limit = req.limit.min(100);
    let (reports, total) = state
        .moderation_service
        .list_reports(req.status, limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(ReportListResponse {
        reports: reports.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Show a single report.
async fn show_report(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ShowReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state.moderation_service.get_report(&req.report_id).await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Resolve or dismiss a pending report.
async fn resolve_report(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ResolveReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state
        .moderation_service
        .resolve_report(&admin.id, &req.report_id, req.outcome)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Ban a user.
async fn ban_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<BanUserRequest>,
) -> AppResult<ApiResponse<AdminUserResponse>> {
    let user = state
        .moderation_service
        .ban_user(&admin.id, &req.user_id, &req.reason, req.duration_days)
        .await?;
    Ok(ApiResponse::ok(user.into()))
}

/// List user accounts.
async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ListUsersRequest>,
) -> AppResult<ApiResponse<UserListResponse>> {
    let limit = req.limit.min(100);
    let (users, total) = state
        .user_service
        .list_users(req.active, limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Lift a user's ban.
async fn unban_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UnbanUserRequest>,
) -> AppResult<ApiResponse<AdminUserResponse>> {
    let user = state
        .moderation_service
        .unban_user(&admin.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/list", post(list_reports))
        .route("/reports/show", post(show_report))
        .route("/reports/resolve", post(resolve_report))
        .route("/users/list", post(list_users))
        .route("/users/ban", post(ban_user))
        .route("/users/unban", post(unban_user))
}
