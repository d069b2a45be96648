use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fileguard_events::{
    BroadcasterConfig, DispatcherConfig, EventBroadcaster, FcmPushSender, LogPushSender,
    NotificationDispatcher, PgDirectory, PushSender,
};
use fileguard_processing::HttpProcessingClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fileguard_api::config::ServerConfig;
use fileguard_api::router::build_app_router;
use fileguard_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fileguard_api=debug,fileguard_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = fileguard_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    fileguard_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    fileguard_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    // --- Event broadcaster ---
    let broadcaster = EventBroadcaster::new(BroadcasterConfig {
        write_timeout: Duration::from_millis(config.subscriber_write_timeout_ms),
        buffer: config.subscriber_buffer,
    });

    // --- Notification dispatcher ---
    let push: Arc<dyn PushSender> = match &config.fcm {
        Some(fcm) => Arc::new(
            FcmPushSender::new(&fcm.project_id, fcm.access_token.clone())
                .expect("Failed to build FCM client"),
        ),
        None => {
            tracing::warn!("FCM_PROJECT_ID / FCM_ACCESS_TOKEN not set, push delivery disabled");
            Arc::new(LogPushSender)
        }
    };
    let directory = Arc::new(PgDirectory::new(pool.clone()));
    let dispatcher = Arc::new(NotificationDispatcher::start(
        DispatcherConfig {
            workers: config.notify_workers,
            queue_capacity: config.notify_queue_capacity,
            shutdown_timeout: config.shutdown_timeout(),
        },
        directory.clone(),
        directory,
        push,
    ));

    // --- Processing worker client ---
    let processing = Arc::new(
        HttpProcessingClient::new(
            &config.worker_url,
            Duration::from_secs(config.worker_timeout_secs),
        )
        .expect("Failed to build worker HTTP client"),
    );
    tracing::info!(worker_url = %config.worker_url, "Processing worker client ready");

    // --- App state ---
    let state = AppState::new(
        pool,
        config.clone(),
        Arc::clone(&broadcaster),
        Arc::clone(&dispatcher),
        processing,
    );

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Live progress streams are closed as soon as the signal arrives.
    let stream_closer = Arc::clone(&broadcaster);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            stream_closer.shutdown();
        })
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    dispatcher.shutdown().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
