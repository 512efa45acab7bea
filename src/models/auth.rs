use serde::{Deserialize, Serialize};

/// Single-use magic-link token record. `expires_at` is epoch milliseconds;
/// the backing key also carries a matching TTL so an unconsumed token
/// self-expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub email: String,
    pub expires_at: i64,
}

/// Reusable bearer session record. Same shape as `AuthToken` but a distinct
/// type: sessions are verified repeatedly and never deleted on use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub expires_at: i64,
}

pub const MAGIC_LINK_TTL_SECS: i64 = 15 * 60;
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;
