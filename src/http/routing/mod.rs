pub use super::routes::todos;

use axum::{routing::get, Router};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

use super::types::ApiError;

pub fn app(router: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(router)
        .fallback(|| async { ApiError::not_found("Not Found") })
        .layer(cors())
}

/// Any origin may call the API with the verbs it serves.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::PUT, Method::PATCH, Method::POST, Method::DELETE])
        .allow_headers(Any)
}
