//! Magic-link and session authentication.
//!
//! Two-phase: a short-lived single-use magic-link token is exchanged for a
//! 7-day reusable session token. The per-email user profile is created
//! lazily at first redemption (or first checkout, whichever comes first).

use chrono::Utc;
use uuid::Uuid;

use crate::db::{DbPool, kv};
use crate::error::Result;
use crate::models::{
    AuthToken, MAGIC_LINK_TTL_SECS, Plan, SESSION_TTL_SECS, Session, UserProfile,
};

fn auth_key(slug: &str, token: &str) -> String {
    format!("{}:auth:{}", slug, token)
}

fn session_key(slug: &str, token: &str) -> String {
    format!("{}:session:{}", slug, token)
}

fn user_key(slug: &str, email: &str) -> String {
    format!("{}:user:{}", slug, email)
}

/// Emails key the user profile, so every entry point must agree on their
/// spelling. The checkout path gets emails from the payment provider and
/// login gets them from the user; normalizing here keeps the two from
/// stranding a plan under a differently-cased key.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct MagicLink {
    pub token: String,
    pub link: String,
}

/// A freshly minted session plus the live profile it belongs to.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub session_token: String,
    pub user: UserProfile,
}

/// Outcome of a magic-link redemption. Denials carry the user-facing
/// message; they are expected flow, not errors.
#[derive(Debug)]
pub enum Redeemed {
    Granted(SessionGrant),
    Denied(&'static str),
}

/// Create a magic-link token and return the URL embedding it.
///
/// Delivery is the caller's concern; the record self-expires after 15
/// minutes even if never consumed.
pub fn issue_magic_link(db: &DbPool, slug: &str, email: &str, base_url: &str) -> Result<MagicLink> {
    let token = Uuid::new_v4().to_string();
    let record = AuthToken {
        email: normalize_email(email),
        expires_at: Utc::now().timestamp_millis() + MAGIC_LINK_TTL_SECS * 1000,
    };

    let conn = db.get()?;
    kv::put_json_with_ttl(&conn, &auth_key(slug, &token), &record, MAGIC_LINK_TTL_SECS)?;

    let link = format!("{}/?token={}", base_url, token);
    Ok(MagicLink { token, link })
}

/// Exchange a magic-link token for a session.
///
/// The token is single-use: deleted on success, and also deleted when
/// presented past its window so an expired token cannot linger until TTL
/// cleanup.
pub fn redeem_magic_link(db: &DbPool, slug: &str, token: &str) -> Result<Redeemed> {
    let conn = db.get()?;
    let key = auth_key(slug, token);

    let Some(record) = kv::get_json::<AuthToken>(&conn, &key)? else {
        return Ok(Redeemed::Denied("Invalid or expired token"));
    };

    if Utc::now().timestamp_millis() > record.expires_at {
        kv::delete(&conn, &key)?;
        return Ok(Redeemed::Denied("Token expired"));
    }

    kv::delete(&conn, &key)?;

    let session_token = Uuid::new_v4().to_string();
    let session = Session {
        email: record.email.clone(),
        expires_at: Utc::now().timestamp_millis() + SESSION_TTL_SECS * 1000,
    };
    kv::put_json_with_ttl(
        &conn,
        &session_key(slug, &session_token),
        &session,
        SESSION_TTL_SECS,
    )?;

    let ukey = user_key(slug, &record.email);
    let user = match kv::get_json::<UserProfile>(&conn, &ukey)? {
        Some(user) => user,
        None => {
            let user = UserProfile::new(&record.email);
            kv::put_json(&conn, &ukey, &user)?;
            user
        }
    };

    tracing::info!(email = %record.email, "magic link redeemed, session created");
    Ok(Redeemed::Granted(SessionGrant {
        session_token,
        user,
    }))
}

/// Verify a session token, returning the live user profile.
///
/// The profile is re-fetched on every check so a plan change lands on the
/// next request without re-login. Expired sessions read as invalid and are
/// left for TTL cleanup.
pub fn verify_session(db: &DbPool, slug: &str, session_token: &str) -> Result<Option<UserProfile>> {
    let conn = db.get()?;

    let Some(session) = kv::get_json::<Session>(&conn, &session_key(slug, session_token))? else {
        return Ok(None);
    };

    if Utc::now().timestamp_millis() > session.expires_at {
        return Ok(None);
    }

    let user = kv::get_json::<UserProfile>(&conn, &user_key(slug, &session.email))?
        .unwrap_or_else(|| UserProfile::new(&session.email));

    Ok(Some(user))
}

/// Upsert the user profile with a new plan and license key.
///
/// Creates the profile when payment completes before any login has
/// occurred.
pub fn update_user_plan(
    db: &DbPool,
    slug: &str,
    email: &str,
    plan: Plan,
    license_key: &str,
) -> Result<UserProfile> {
    let email = normalize_email(email);
    let conn = db.get()?;
    let key = user_key(slug, &email);

    let mut user =
        kv::get_json::<UserProfile>(&conn, &key)?.unwrap_or_else(|| UserProfile::new(&email));
    user.plan = plan;
    user.license_key = Some(license_key.to_string());

    kv::put_json(&conn, &key, &user)?;

    tracing::info!(email = %email, plan = %plan, "user plan updated");
    Ok(user)
}
