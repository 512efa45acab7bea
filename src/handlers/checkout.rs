use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::license;
use crate::models::Plan;
use crate::payments::StripeClient;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub id: String,
    pub url: String,
}

fn stripe_client(state: &AppState) -> Result<StripeClient> {
    let secret = state
        .config
        .stripe_secret_key
        .as_deref()
        .ok_or_else(|| AppError::Internal("STRIPE_SECRET_KEY not configured".into()))?;
    Ok(StripeClient::new(secret, &state.config.stripe_api_url))
}

pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let plan: Plan = request
        .plan
        .as_deref()
        .and_then(|p| p.parse().ok())
        .filter(Plan::is_paid)
        .ok_or_else(|| {
            AppError::BadRequest("Invalid plan. Must be 'monthly' or 'yearly'".into())
        })?;

    let price_id = match plan {
        Plan::Monthly => state.config.stripe_price_monthly.as_deref(),
        Plan::Yearly => state.config.stripe_price_yearly.as_deref(),
        Plan::Free => None,
    }
    .ok_or_else(|| {
        AppError::Internal(format!(
            "STRIPE_PRICE_ID_{} not configured",
            plan.to_string().to_uppercase()
        ))
    })?;

    let base_url = &state.config.base_url;
    let success_url = format!("{}/success.html?session_id={{CHECKOUT_SESSION_ID}}", base_url);
    let cancel_url = format!("{}/cancel.html", base_url);

    let client = stripe_client(&state)?;
    let session = client
        .create_checkout_session(price_id, &success_url, &cancel_url)
        .await?;

    let url = session
        .url
        .ok_or_else(|| AppError::Upstream("Stripe session missing checkout url".into()))?;

    Ok(Json(CheckoutResponse {
        id: session.id,
        url,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub status: &'static str,
    pub license: String,
    pub plan: Plan,
}

/// Called by the success page after the payment provider redirects back.
/// Verifies the session with the provider, mints a license, and links it to
/// the buyer's profile when the provider reports an email.
pub async fn checkout_success(
    State(state): State<AppState>,
    Query(query): Query<SuccessQuery>,
) -> Result<Json<SuccessResponse>> {
    let session_id = query
        .session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing session_id".into()))?;

    let client = stripe_client(&state)?;
    let session = client.retrieve_session(&session_id).await?;

    if !session.is_complete() {
        return Err(AppError::BadRequest("Payment not completed".into()));
    }

    // Yearly iff the subscription's price matches the configured yearly
    // price; anything else (including a missing expansion) is monthly.
    let plan = match (
        session.subscription_price_id(),
        state.config.stripe_price_yearly.as_deref(),
    ) {
        (Some(price), Some(yearly)) if price == yearly => Plan::Yearly,
        _ => Plan::Monthly,
    };

    let slug = &state.config.product.slug;
    let license_key = license::create_license(&state.db, slug, plan)?;

    if let Some(email) = session.customer_email() {
        auth::update_user_plan(&state.db, slug, email, plan, &license_key)?;
    }

    Ok(Json(SuccessResponse {
        status: "ok",
        license: license_key,
        plan,
    }))
}
