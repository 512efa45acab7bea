use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A paid-plan credential stored in the key-value store.
///
/// Serialized camelCase for wire compatibility with records minted by earlier
/// deployments. `plan` is kept as a raw string: a record can exist with an
/// unrecognized plan, and validation must report `invalid_plan` rather than
/// fail to deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub plan: String,
    pub created_at: DateTime<Utc>,
    /// Quota cap; -1 means unlimited.
    pub max: i64,
    /// Successful validations so far. Monotonically increasing.
    #[serde(default)]
    pub used: i64,
}

impl License {
    pub fn new(plan: &str) -> Self {
        Self {
            plan: plan.to_string(),
            created_at: Utc::now(),
            max: -1,
            used: 0,
        }
    }
}

/// Outcome of a license validation.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl LicenseCheck {
    pub fn valid(license: License) -> Self {
        Self {
            valid: true,
            license: Some(license),
            reason: None,
        }
    }

    pub fn invalid(reason: &'static str) -> Self {
        Self {
            valid: false,
            license: None,
            reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn license_round_trips_camel_case() {
        let license = License::new("monthly");
        let json = serde_json::to_value(&license).unwrap();
        assert_eq!(json["plan"], "monthly");
        assert_eq!(json["max"], -1);
        assert_eq!(json["used"], 0);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn used_defaults_to_zero_for_old_records() {
        let raw = r#"{"plan":"yearly","createdAt":"2024-03-01T00:00:00Z","max":-1}"#;
        let license: License = serde_json::from_str(raw).unwrap();
        assert_eq!(license.used, 0);
    }
}
