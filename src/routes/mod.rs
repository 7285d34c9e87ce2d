//! API Routes
//!
//! - `POST /upload` - Image upload
//! - `GET /download/{key}` - Image download
//! - `GET /health` - Liveness check

pub mod files;
pub mod health;

use axum::Router;
use tower_http::trace::TraceLayer;
use crate::middleware::apply_cors;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
///
/// CORS wraps everything, so it applies before routing to every request.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let router = Router::new()
        .merge(files::router(state))
        .merge(health::router())
        .layer(TraceLayer::new_for_http());

    apply_cors(router)
}
