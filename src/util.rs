//! Shared utility functions for the Gatecheck application.

use axum::http::HeaderMap;
use chrono::Utc;
use sha2::{Digest, Sha256};

/// Derive a stable pseudo-identity for an anonymous caller.
///
/// One-way digest of network address + user agent, truncated to 16 hex
/// characters. Enough entropy for quota bucketing; this is an anti-abuse
/// heuristic, not an auth mechanism.
pub fn fingerprint(ip: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", ip, user_agent).as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

/// Extract client IP address and user-agent from request headers.
///
/// Tries `x-forwarded-for` first (for proxied requests), then `x-real-ip`.
/// Missing values substitute `"unknown"` rather than failing.
pub fn extract_request_info(headers: &HeaderMap) -> (String, String) {
    let ip = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    (ip, user_agent)
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Current UTC date as `YYYY-MM-DD`, used for daily quota buckets.
pub fn date_string() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = fingerprint("1.2.3.4", "Mozilla/5.0");
        let b = fingerprint("1.2.3.4", "Mozilla/5.0");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_differs_per_input() {
        assert_ne!(
            fingerprint("1.2.3.4", "Mozilla/5.0"),
            fingerprint("1.2.3.5", "Mozilla/5.0")
        );
        assert_ne!(
            fingerprint("1.2.3.4", "Mozilla/5.0"),
            fingerprint("1.2.3.4", "curl/8.0")
        );
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("Authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), Some("abc123"));

        headers.insert("Authorization", "Bearer ".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("Authorization", "Basic abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn request_info_falls_back_to_unknown() {
        let headers = HeaderMap::new();
        let (ip, ua) = extract_request_info(&headers);
        assert_eq!(ip, "unknown");
        assert_eq!(ua, "unknown");
    }
}
