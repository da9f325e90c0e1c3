//! HTTP API layer for ripple.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: social graph, posts, feed, notifications, moderation
//! - **Extractors**: authentication and admin checks
//! - **Middleware**: token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
