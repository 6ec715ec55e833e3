pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use selflow_brain::CentralBrain;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(brain: Arc<CentralBrain>) -> Router {
    let app_state = state::AppState::new(brain);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status
        .route("/api/health", get(routes::status::get_health))
        .route("/api/insights", get(routes::status::get_insights))
        .route("/api/status", get(routes::status::get_status))
        // Conversation
        .route("/api/chat", post(routes::chat::chat))
        .route("/api/chat/agent", post(routes::chat::chat_with_agent))
        .route("/api/chat/stream", post(routes::chat::chat_stream))
        // Commands
        .route("/api/commands", post(routes::commands::process_command))
        .route(
            "/api/commands/translate",
            post(routes::commands::translate_command),
        )
        // Specialized agents
        .route(
            "/api/tasks/orchestrate",
            post(routes::agents::orchestrate_task),
        )
        .route("/api/training/labels", post(routes::agents::generate_labels))
        .route("/api/embryos/validate", post(routes::agents::validate_embryo))
        .route(
            "/api/embryos/birth-readiness",
            post(routes::agents::birth_readiness),
        )
        .route(
            "/api/system-state",
            post(routes::agents::update_system_state),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Serve the API on `0.0.0.0:{port}` until Ctrl-C, then stop the brain.
pub async fn serve(brain: Arc<CentralBrain>, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(brain, listener).await
}

/// Serve the API on a pre-bound listener.
///
/// Accepting a bound listener lets the caller read the actual port first
/// (useful when `port = 0` and the OS picks a free port).
pub async fn serve_on(
    brain: Arc<CentralBrain>,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(Arc::clone(&brain));

    tracing::info!("SelFlow API listening on http://localhost:{actual_port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    brain.stop().await;
    tracing::info!("SelFlow API shut down");
    Ok(())
}
