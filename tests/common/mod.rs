//! Shared helpers for integration tests: temp-file-backed app state, request
//! plumbing, and mock upstream providers bound to ephemeral ports.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Path;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use gatecheck::config::{Config, ProductConfig};
use gatecheck::db::{self, AppState};
use gatecheck::email::EmailService;

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        // replaced with a tempfile path by test_state_with
        database_path: String::new(),
        base_url: "http://localhost:3000".to_string(),
        dev_mode: true,
        product: ProductConfig {
            name: "AI Cover Letter Generator".to_string(),
            slug: "cover-letter".to_string(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: "You are a helpful writing assistant.".to_string(),
            upgrade_url: "/#pricing".to_string(),
        },
        openai_api_key: Some("sk-test".to_string()),
        // unreachable by default; tests that exercise generation point this
        // at a mock server
        openai_api_url: "http://127.0.0.1:9".to_string(),
        stripe_secret_key: Some("sk_test_123".to_string()),
        stripe_api_url: "http://127.0.0.1:9".to_string(),
        stripe_price_monthly: Some("price_monthly_test".to_string()),
        stripe_price_yearly: Some("price_yearly_test".to_string()),
        resend_api_key: None,
        email_from: "login@test.local".to_string(),
    }
}

/// App state plus the tempdir keeping its database alive.
pub struct TestContext {
    pub state: AppState,
    _tmp: TempDir,
}

pub fn test_state_with(mut config: Config) -> TestContext {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("gatecheck.db");
    config.database_path = path.to_str().unwrap().to_string();
    let db = db::open_pool(&config.database_path).unwrap();
    let email = EmailService::new(None, "login@test.local".to_string());

    TestContext {
        state: AppState {
            db,
            config: Arc::new(config),
            email,
        },
        _tmp: tmp,
    }
}

pub fn test_state() -> TestContext {
    test_state_with(test_config())
}

/// Drop the kv table so every subsequent store operation errors. Used to pin
/// the fail-open / fail-closed policies.
pub fn break_store(state: &AppState) {
    state.db.get().unwrap().execute_batch("DROP TABLE kv").unwrap();
}

pub async fn send_request(
    state: &AppState,
    method: &str,
    path: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let app = gatecheck::app(state.clone());

    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn post_json(state: &AppState, path: &str, body: Value) -> (StatusCode, Value) {
    send_request(state, "POST", path, Some(body), &[]).await
}

pub async fn get_path(state: &AppState, path: &str) -> (StatusCode, Value) {
    send_request(state, "GET", path, None, &[]).await
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Mock chat-completions provider that always answers with `reply`.
pub async fn spawn_mock_openai(reply: &str) -> String {
    let reply = reply.to_string();
    let app = Router::new().route(
        "/chat/completions",
        post(move || {
            let reply = reply.clone();
            async move {
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": reply}}]
                }))
            }
        }),
    );
    serve(app).await
}

/// Mock Stripe API. Session creation always succeeds; retrieval reports the
/// given price id and customer email, completed or not per `complete`.
pub async fn spawn_mock_stripe(
    price_id: &str,
    customer_email: Option<&str>,
    complete: bool,
) -> String {
    let price = price_id.to_string();
    let email = customer_email.map(str::to_string);

    let app = Router::new()
        .route(
            "/checkout/sessions",
            post(|| async {
                Json(json!({
                    "id": "cs_test_123",
                    "url": "https://checkout.stripe.com/c/pay/cs_test_123",
                    "status": "open",
                    "payment_status": "unpaid"
                }))
            }),
        )
        .route(
            "/checkout/sessions/{id}",
            get(move |Path(id): Path<String>| {
                let price = price.clone();
                let email = email.clone();
                async move {
                    let mut session = json!({
                        "id": id,
                        "payment_status": if complete { "paid" } else { "unpaid" },
                        "status": if complete { "complete" } else { "open" },
                        "subscription": {
                            "items": {"data": [{"price": {"id": price}}]}
                        }
                    });
                    if let Some(email) = email {
                        session["customer_details"] = json!({ "email": email });
                    }
                    Json(session)
                }
            }),
        );
    serve(app).await
}
