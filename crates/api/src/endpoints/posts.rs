//! Post endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_db::entities::post::{MediaItem, Model as PostModel};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

/// Show post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPostRequest {
    pub post_id: String,
}

/// Update post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub post_id: String,
    pub text: String,
}

/// Delete post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostRequest {
    pub post_id: String,
}

/// Like / unlike / share request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostActionRequest {
    pub post_id: String,
}

/// Posts by author request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsByAuthorRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    30
}

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub text: String,
    pub media: Vec<MediaItem>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<PostModel> for PostResponse {
    fn from(p: PostModel) -> Self {
        let media = p.media_items();
        Self {
            id: p.id,
            author_id: p.author_id,
            text: p.text,
            media,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Post with engagement counts, returned by `/show`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub likes_count: u64,
    pub comments_count: u64,
}

/// Create a post.
async fn create_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state
        .post_service
        .create_post(&user.id, &req.text, req.media)
        .await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Show a post with its like and comment counts.
async fn show_post(
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let post = state.post_service.get_post(&req.post_id).await?;
    let likes_count = state.post_service.like_count(&req.post_id).await?;
    let comments_count = state.comment_service.count_comments(&req.post_id).await?;
    Ok(ApiResponse::ok(PostDetailResponse {
        post: post.into(),
        likes_count,
        comments_count,
    }))
}

/// Update a post.
async fn update_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state
        .post_service
        .update_post(&user.id, &req.post_id, &req.text)
        .await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post.
async fn delete_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeletePostRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete_post(&user.id, &req.post_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Like a post.
async fn like_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.like(&user.id, &req.post_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Remove a like.
async fn unlike_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.unlike(&user.id, &req.post_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Share a post.
async fn share_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostActionRequest>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.share(&user.id, &req.post_id).await?;
    Ok(ApiResponse::ok(()))
}

/// List posts by an author.
async fn posts_by_author(
    State(state): State<AppState>,
    Json(req): Json<PostsByAuthorRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = req.limit.min(100);
    let posts = state
        .post_service
        .get_by_author(&req.user_id, limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_post))
        .route("/show", post(show_post))
        .route("/update", post(update_post))
        .route("/delete", post(delete_post))
        .route("/like", post(like_post))
        .route("/unlike", post(unlike_post))
        .route("/share", post(share_post))
        .route("/by-author", post(posts_by_author))
}
