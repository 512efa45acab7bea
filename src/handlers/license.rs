use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::license;
use crate::models::LicenseCheck;

#[derive(Debug, Deserialize)]
pub struct VerifyLicenseRequest {
    #[serde(default)]
    pub license_key: Option<String>,
}

/// Note: verification counts as a use; `used` is incremented on success.
pub async fn verify_license(
    State(state): State<AppState>,
    Json(request): Json<VerifyLicenseRequest>,
) -> Result<Json<LicenseCheck>> {
    let key = request
        .license_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing license_key".into()))?;

    let check = license::check_license(&state.db, &state.config.product.slug, &key);
    Ok(Json(check))
}
