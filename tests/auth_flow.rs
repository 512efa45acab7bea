//! Magic-link and session lifecycle, end to end over HTTP.

mod common;
use common::*;

use chrono::Utc;
use gatecheck::auth;
use gatecheck::db::kv;
use gatecheck::models::Plan;
use serde_json::json;

const SLUG: &str = "cover-letter";

fn token_from_link(link: &str) -> String {
    link.split("token=").nth(1).unwrap().to_string()
}

#[tokio::test]
async fn magic_link_flow_creates_session_and_free_profile() {
    let ctx = test_state();

    let (status, body) =
        post_json(&ctx.state, "/api/auth/send-link", json!({"email": "a@x.com"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    let link = body["link"].as_str().expect("dev mode returns the link");
    assert!(link.contains("token="));

    let token = token_from_link(link);
    let (status, body) =
        post_json(&ctx.state, "/api/auth/verify-link", json!({"token": token})).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert!(body["sessionToken"].as_str().is_some());
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["plan"], "free");
}

#[tokio::test]
async fn magic_link_token_is_single_use() {
    let ctx = test_state();
    let (_, body) =
        post_json(&ctx.state, "/api/auth/send-link", json!({"email": "a@x.com"})).await;
    let token = token_from_link(body["link"].as_str().unwrap());

    let (status, _) =
        post_json(&ctx.state, "/api/auth/verify-link", json!({"token": &token})).await;
    assert_eq!(status, 200);

    // replay is rejected
    let (status, body) =
        post_json(&ctx.state, "/api/auth/verify-link", json!({"token": &token})).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn stale_magic_link_token_is_expired_and_removed() {
    let ctx = test_state();
    let conn = ctx.state.db.get().unwrap();
    let key = format!("{}:auth:stale-token", SLUG);
    kv::put(
        &conn,
        &key,
        &json!({"email": "a@x.com", "expiresAt": Utc::now().timestamp_millis() - 1000})
            .to_string(),
    )
    .unwrap();

    let (status, body) = post_json(
        &ctx.state,
        "/api/auth/verify-link",
        json!({"token": "stale-token"}),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Token expired");

    // the expired token is deleted, closing the reuse window
    assert!(kv::get(&conn, &key).unwrap().is_none());
}

#[tokio::test]
async fn expired_session_is_invalid() {
    let ctx = test_state();
    let conn = ctx.state.db.get().unwrap();
    kv::put(
        &conn,
        &format!("{}:session:old-session", SLUG),
        &json!({"email": "a@x.com", "expiresAt": Utc::now().timestamp_millis() - 1000})
            .to_string(),
    )
    .unwrap();

    let user = auth::verify_session(&ctx.state.db, SLUG, "old-session").unwrap();
    assert!(user.is_none());

    let (status, _) = send_request(
        &ctx.state,
        "GET",
        "/api/auth/me",
        None,
        &[("Authorization", "Bearer old-session")],
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn plan_change_is_visible_mid_session() {
    let ctx = test_state();
    let (_, body) =
        post_json(&ctx.state, "/api/auth/send-link", json!({"email": "a@x.com"})).await;
    let token = token_from_link(body["link"].as_str().unwrap());
    let (_, body) = post_json(&ctx.state, "/api/auth/verify-link", json!({"token": token})).await;
    let session = body["sessionToken"].as_str().unwrap().to_string();

    // upgrade lands after the session was minted
    auth::update_user_plan(&ctx.state.db, SLUG, "a@x.com", Plan::Yearly, "yc_test").unwrap();

    let (status, body) = send_request(
        &ctx.state,
        "GET",
        "/api/auth/me",
        None,
        &[("Authorization", &format!("Bearer {}", session))],
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["plan"], "yearly");
    assert_eq!(body["user"]["licenseKey"], "yc_test");
}

#[tokio::test]
async fn mixed_case_checkout_email_matches_a_later_login() {
    let ctx = test_state();

    // the payment provider reports the buyer's email with its own casing,
    // before any login has happened
    auth::update_user_plan(&ctx.state.db, SLUG, "Buyer@X.com", Plan::Yearly, "yc_case").unwrap();

    let (_, body) = post_json(
        &ctx.state,
        "/api/auth/send-link",
        json!({"email": "Buyer@X.com"}),
    )
    .await;
    let token = token_from_link(body["link"].as_str().unwrap());
    let (status, body) =
        post_json(&ctx.state, "/api/auth/verify-link", json!({"token": token})).await;
    assert_eq!(status, 200);

    // both paths land on the same profile: the purchased plan is visible
    assert_eq!(body["user"]["email"], "buyer@x.com");
    assert_eq!(body["user"]["plan"], "yearly");
    assert_eq!(body["user"]["licenseKey"], "yc_case");
}

#[tokio::test]
async fn me_requires_a_valid_session() {
    let ctx = test_state();

    let (status, _) = get_path(&ctx.state, "/api/auth/me").await;
    assert_eq!(status, 401);

    let (status, body) = send_request(
        &ctx.state,
        "GET",
        "/api/auth/me",
        None,
        &[("Authorization", "Bearer no-such-session")],
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid session");
}

#[tokio::test]
async fn send_link_requires_email() {
    let ctx = test_state();
    let (status, body) = post_json(&ctx.state, "/api/auth/send-link", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing email");
}

#[tokio::test]
async fn link_is_not_echoed_outside_dev_mode() {
    let mut config = test_config();
    config.dev_mode = false;
    let ctx = test_state_with(config);

    let (status, body) =
        post_json(&ctx.state, "/api/auth/send-link", json!({"email": "a@x.com"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert!(body.get("link").is_none());
}
