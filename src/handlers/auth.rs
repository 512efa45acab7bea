use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::auth::{self, Redeemed};
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::util::extract_bearer_token;

#[derive(Debug, Deserialize)]
pub struct SendLinkRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendLinkResponse {
    pub status: &'static str,
    pub message: &'static str,
    /// Only present in dev mode; production delivers the link by email and
    /// never echoes the token to the caller who requested it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

pub async fn send_link(
    State(state): State<AppState>,
    Json(request): Json<SendLinkRequest>,
) -> Result<Json<SendLinkResponse>> {
    let email = request
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing email".into()))?;

    let magic = auth::issue_magic_link(
        &state.db,
        &state.config.product.slug,
        &email,
        &state.config.base_url,
    )?;

    state
        .email
        .send_magic_link(&email, &magic.link, &state.config.product.name)
        .await?;

    Ok(Json(SendLinkResponse {
        status: "ok",
        message: "Magic link sent",
        link: state.config.dev_mode.then_some(magic.link),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyLinkRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyLinkResponse {
    pub status: &'static str,
    #[serde(rename = "sessionToken")]
    pub session_token: String,
    pub user: UserProfile,
}

pub async fn verify_link(
    State(state): State<AppState>,
    Json(request): Json<VerifyLinkRequest>,
) -> Result<Json<VerifyLinkResponse>> {
    let token = request
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing token".into()))?;

    match auth::redeem_magic_link(&state.db, &state.config.product.slug, &token)? {
        Redeemed::Granted(grant) => Ok(Json(VerifyLinkResponse {
            status: "ok",
            session_token: grant.session_token,
            user: grant.user,
        })),
        Redeemed::Denied(message) => Err(AppError::Unauthorized(message.into())),
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub status: &'static str,
    pub user: UserProfile,
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<MeResponse>> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))?;

    let user = auth::verify_session(&state.db, &state.config.product.slug, token)?
        .ok_or_else(|| AppError::Unauthorized("Invalid session".into()))?;

    Ok(Json(MeResponse { status: "ok", user }))
}
