//! Following endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_db::entities::following::Model as FollowingModel;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Follow user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUserRequest {
    pub user_id: String,
}

/// Unfollow user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfollowUserRequest {
    pub user_id: String,
}

/// Follower listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFollowRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    30
}

/// Following relationship response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingResponse {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: String,
}

impl From<FollowingModel> for FollowingResponse {
    fn from(f: FollowingModel) -> Self {
        Self {
            id: f.id,
            follower_id: f.follower_id,
            followee_id: f.followee_id,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// Follow a user.
async fn follow_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowUserRequest>,
) -> AppResult<ApiResponse<FollowingResponse>> {
    let following = state
        .following_service
        .follow(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(following.into()))
}

/// Unfollow a user.
async fn unfollow_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UnfollowUserRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .following_service
        .unfollow(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// List a user's followers.
async fn list_followers(
    State(state): State<AppState>,
    Json(req): Json<ListFollowRequest>,
) -> AppResult<ApiResponse<Vec<FollowingResponse>>> {
    let limit = req.limit.min(100);
    let followers = state
        .following_service
        .get_followers(&req.user_id, limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(
        followers.into_iter().map(Into::into).collect(),
    ))
}

/// List the users a user is following.
async fn list_following(
    State(state): State<AppState>,
    Json(req): Json<ListFollowRequest>,
) -> AppResult<ApiResponse<Vec<FollowingResponse>>> {
    let limit = req.limit.min(100);
    let following = state
        .following_service
        .get_following(&req.user_id, limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(
        following.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(follow_user))
        .route("/delete", post(unfollow_user))
        .route("/followers", post(list_followers))
        .route("/following", post(list_following))
}
