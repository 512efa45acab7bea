use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Plan;

/// Per-email user profile, created lazily on first login or first checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
}

impl UserProfile {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            plan: Plan::Free,
            created_at: Utc::now(),
            license_key: None,
        }
    }
}
