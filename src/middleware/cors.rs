// Permissive CORS: any origin, method and header.
// Layered over the full router so it runs before route matching,
// including for preflight requests and unknown paths.

use tower_http::cors::{CorsLayer, Any};
use axum::Router;

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn apply_cors(router: Router) -> Router {
    router.layer(cors_layer())
}
