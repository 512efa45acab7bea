use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::AppState;
use crate::entitlement::{self, Credentials, Entitlement};
use crate::error::{AppError, Result};
use crate::openai::{ChatMessage, OpenAiClient};
use crate::util::{extract_bearer_token, extract_request_info, fingerprint};

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub output: String,
}

fn language_name(code: &str) -> &'static str {
    match code {
        "en" => "English",
        "zh" => "Chinese",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "pt" => "Portuguese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ar" => "Arabic",
        "hi" => "Hindi",
        _ => "English",
    }
}

pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Result<Response> {
    let input = request
        .input
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing input field".into()))?;

    let api_key = state
        .config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| AppError::Internal("OPENAI_API_KEY not configured".into()))?;

    let session_token = extract_bearer_token(&headers);
    let license_key = headers.get("x-license-key").and_then(|v| v.to_str().ok());
    let (ip, user_agent) = extract_request_info(&headers);
    let caller = fingerprint(&ip, &user_agent);

    let slug = &state.config.product.slug;
    let plan = match entitlement::resolve(
        &state.db,
        slug,
        Credentials {
            session_token,
            license_key,
            fingerprint: &caller,
        },
    ) {
        Entitlement::Proceed { plan } => plan,
        Entitlement::Reject { count } => {
            // Soft reject: HTTP 200 so the frontend treats this as an
            // actionable outcome, not a fault.
            tracing::info!(fingerprint = %caller, count, "free limit reached");
            return Ok(Json(json!({
                "error": "free_limit_reached",
                "message": "Free limit reached. Please upgrade to continue.",
                "upgrade_url": state.config.product.upgrade_url,
            }))
            .into_response());
        }
    };
    tracing::debug!(plan = %plan, "generation entitled");

    let target = language_name(request.target_language.as_deref().unwrap_or("en"));
    let system_prompt = format!(
        "{}\n\nIMPORTANT: Generate the content entirely in {}, with proper grammar and the tone and conventions expected in {}-speaking regions.",
        state.config.product.system_prompt, target, target
    );

    let messages = [ChatMessage::system(system_prompt), ChatMessage::user(input)];

    let client = OpenAiClient::new(api_key, &state.config.openai_api_url);
    let output = client.chat(&state.config.product.model, &messages).await?;

    Ok(Json(GenerateResponse { output }).into_response())
}
