//! Platen Server
//!
//! HTML to PDF conversion microservice: single and batch conversion against
//! one shared headless Chrome instance.

use std::net::SocketAddr;

use axum::Router;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platen_server::config::Config;
use platen_server::renderer::{ChromeEngineFactory, RendererHandle};
use platen_server::routes;
use platen_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platen_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Platen Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Limits: max batch size {}, max HTML size {} bytes",
        config.limits.max_batch_size,
        config.limits.max_html_size
    );

    let renderer = RendererHandle::new(Box::new(ChromeEngineFactory::new(
        config.renderer.clone(),
    )));
    let app_state = AppState::new(config.clone(), renderer);

    // Warm the browser up front so the first request doesn't pay the launch
    // cost; a failure here is not fatal, acquire() retries on first use.
    match app_state.converter().warm_up().await {
        Ok(()) => tracing::info!("Browser initialized"),
        Err(e) => tracing::warn!("Browser warm-up failed: {}. Will retry on first request", e),
    }

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::convert::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state.clone());

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], config.server.port)));
    tracing::info!("Platen Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind server address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    app_state.shutdown().await;
    tracing::info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
