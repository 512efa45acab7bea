pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod entitlement;
pub mod error;
pub mod handlers;
pub mod license;
pub mod models;
pub mod openai;
pub mod payments;
pub mod usage;
pub mod util;

use axum::Router;
use axum::http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::AppState;

/// Build the full application router with CORS and request tracing.
///
/// CORS is deliberately permissive: these APIs are called from static
/// frontends on arbitrary origins.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-license-key"),
        ]);

    handlers::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
