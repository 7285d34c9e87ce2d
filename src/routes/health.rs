use axum::{Router, routing::get, Json};
use crate::models::HealthResponse;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_check))
}

// Liveness only; object storage is not probed per request.
async fn health_check() -> Json<HealthResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    Json(response)
}
