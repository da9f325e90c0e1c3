//! Ripple server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use ripple_api::{middleware::AppState, router as api_router};
use ripple_common::Config;
use ripple_core::{
    BlockingService, CommentService, FeedService, FollowingService, ModerationService,
    NotificationService, PostService, UserService,
};
use ripple_db::repositories::{
    BlockingRepository, CommentRepository, FollowingRepository, NotificationRepository,
    PostLikeRepository, PostRepository, ReportRepository, UserRepository,
};
use ripple_scheduler::{SchedulerConfig, SweepExecutor, run_scheduler};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Adapter running the moderation report sweep on the scheduler.
struct SweepRunner {
    moderation_service: ModerationService,
}

#[async_trait::async_trait]
impl SweepExecutor for SweepRunner {
    async fn sweep_expired_reports(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        self.moderation_service
            .sweep_expired_reports()
            .await
            .map_err(Into::into)
    }
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting ripple server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = ripple_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    ripple_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let following_repo = FollowingRepository::new(Arc::clone(&db));
    let blocking_repo = BlockingRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let post_like_repo = PostLikeRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));

    // Initialize services
    let notification_service = NotificationService::new(notification_repo.clone());
    let user_service = UserService::new(user_repo.clone());
    let following_service = FollowingService::new(
        following_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let blocking_service = BlockingService::new(blocking_repo.clone(), user_repo.clone());
    let post_service = PostService::new(
        post_repo.clone(),
        user_repo.clone(),
        following_repo,
        comment_repo.clone(),
        post_like_repo,
        notification_repo,
        notification_service.clone(),
    );
    let comment_service = CommentService::new(
        comment_repo,
        post_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let feed_service = FeedService::new(post_repo.clone(), blocking_repo);
    let moderation_service = ModerationService::new(
        report_repo,
        user_repo,
        post_repo,
        notification_service.clone(),
        config.moderation.report_staleness_days,
    );

    // Start the report sweep scheduler
    let scheduler = run_scheduler(
        SchedulerConfig {
            sweep_interval: config.moderation.sweep_interval(),
        },
        Arc::new(SweepRunner {
            moderation_service: moderation_service.clone(),
        }),
    );
    info!("Report sweep scheduler started");

    // Create app state
    let state = AppState {
        user_service,
        following_service,
        blocking_service,
        post_service,
        comment_service,
        notification_service,
        feed_service,
        moderation_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            ripple_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    info!("Server shutdown complete");
    Ok(())
}
