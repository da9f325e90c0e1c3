//! Feed endpoints.

use axum::{Json, Router, extract::State, routing::post};
use ripple_common::AppResult;
use ripple_core::feed::FeedPage;
use serde::{Deserialize, Serialize};

use crate::endpoints::posts::PostResponse;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    20
}

/// One page of the home feed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub posts: Vec<PostResponse>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
}

impl From<FeedPage> for FeedResponse {
    fn from(page: FeedPage) -> Self {
        Self {
            posts: page.posts.into_iter().map(Into::into).collect(),
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_posts: page.total_posts,
        }
    }
}

/// Fetch the authenticated user's home feed.
async fn home_feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedRequest>,
) -> AppResult<ApiResponse<FeedResponse>> {
    let page = state
        .feed_service
        .visible_posts(&user.id, req.page, req.page_size)
        .await?;
    Ok(ApiResponse::ok(page.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/home", post(home_feed))
}
