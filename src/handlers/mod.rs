mod auth;
mod checkout;
mod generate;
mod license;

pub use auth::*;
pub use checkout::*;
pub use generate::*;
pub use license::*;

use axum::http::Uri;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::db::AppState;
use crate::error::AppError;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate", post(generate))
        // legacy checkout aliases kept for frontends generated against
        // older route tables
        .route("/api/checkout", post(create_checkout))
        .route("/api/create-checkout-session", post(create_checkout))
        .route("/create-checkout-session", post(create_checkout))
        .route("/api/checkout/success", get(checkout_success))
        .route("/checkout-success", get(checkout_success))
        .route("/api/license/verify", post(verify_license))
        .route("/api/auth/send-link", post(send_link))
        .route("/api/auth/verify-link", post(verify_link))
        .route("/api/auth/me", get(me))
        .fallback(not_found)
}
