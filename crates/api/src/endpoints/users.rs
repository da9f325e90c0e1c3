//! User endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_core::user::UpdateProfile;
use ripple_db::entities::user::Model as UserModel;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub name: Option<String>,
}

/// Show user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUserRequest {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// Search users request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchUsersRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    30
}

/// Public user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub followers_count: i32,
    pub following_count: i32,
    pub posts_count: i32,
    pub created_at: String,
}

impl From<UserModel> for UserResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            followers_count: u.followers_count,
            following_count: u.following_count,
            posts_count: u.posts_count,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// User response including the access token, returned once at creation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: Option<String>,
}

/// Create a user account.
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<ApiResponse<CreatedUserResponse>> {
    let user = state
        .user_service
        .create_user(&req.username, req.name.as_deref())
        .await?;
    let token = user.token.clone();
    Ok(ApiResponse::ok(CreatedUserResponse {
        user: user.into(),
        token,
    }))
}

/// Show a user's profile.
async fn show_user(
    State(state): State<AppState>,
    Json(req): Json<ShowUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = match (req.user_id.as_deref(), req.username.as_deref()) {
        (Some(user_id), _) => state.user_service.get_user(user_id).await?,
        (None, Some(username)) => state.user_service.get_by_username(username).await?,
        (None, None) => {
            return Err(ripple_common::AppError::InvalidArgument(
                "userId or username is required".to_string(),
            ));
        }
    };
    Ok(ApiResponse::ok(user.into()))
}

/// Update the authenticated user's profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfile>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.update_profile(&user.id, req).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Search users by username.
async fn search_users(
    State(state): State<AppState>,
    Json(req): Json<SearchUsersRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.search(&req.query, req.limit).await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_user))
        .route("/show", post(show_user))
        .route("/update", post(update_profile))
        .route("/search", post(search_users))
}
