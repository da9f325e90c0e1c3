//! API endpoints.

use axum::Router;

use crate::middleware::AppState;

pub mod admin;
pub mod blocking;
pub mod comments;
pub mod feed;
pub mod following;
pub mod notifications;
pub mod posts;
pub mod reports;
pub mod users;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/following", following::router())
        .nest("/blocking", blocking::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/notifications", notifications::router())
        .nest("/feed", feed::router())
        .nest("/reports", reports::router())
        .nest("/admin", admin::router())
}
