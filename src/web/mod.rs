//! The single-page HTTP front end.

pub mod errors;
pub mod handlers;
pub mod page;
pub mod state;

pub use self::state::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    // Only uploads are capped. A small compressed PDF can expand into far more
    // text than `max_upload_bytes`, and the extract routes must accept all of it.
    let upload_limit = DefaultBodyLimit::max(app_state.max_upload_bytes);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/sample", get(handlers::sample_handler))
        .route(
            "/upload",
            post(handlers::upload_handler).layer(upload_limit),
        )
        .route(
            "/api/text",
            post(handlers::api_text_handler).layer(upload_limit),
        )
        .route(
            "/extract",
            post(handlers::extract_handler).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/extract",
            post(handlers::api_extract_handler).layer(DefaultBodyLimit::disable()),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    let router = create_router(app_state);
    info!(addr = ?listener.local_addr().ok(), "Invoice extractor listening");
    axum::serve(listener, router).await
}
