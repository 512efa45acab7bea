//! Per-request entitlement resolution.
//!
//! Precedence is fixed: paid session, then license key, then the anonymous
//! free quota. The first success wins. A verified session on the free plan
//! does not short-circuit to rejection; it falls through to the same
//! anonymous quota as a logged-out caller (an explicit simplification, not
//! an oversight).

use crate::auth;
use crate::db::DbPool;
use crate::license;
use crate::models::Plan;
use crate::usage;

/// Credentials extracted from an inbound generation request. Any subset may
/// be present; the fingerprint always is.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub session_token: Option<&'a str>,
    pub license_key: Option<&'a str>,
    pub fingerprint: &'a str,
}

/// Terminal outcome for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entitlement {
    Proceed { plan: Plan },
    /// Free quota exhausted. Surfaced to HTTP as a 200 soft-reject, not an
    /// error status, so the frontend can distinguish "upgrade" from
    /// "broken".
    Reject { count: u32 },
}

pub fn resolve(db: &DbPool, slug: &str, creds: Credentials<'_>) -> Entitlement {
    // A. Paid session.
    if let Some(token) = creds.session_token {
        match auth::verify_session(db, slug, token) {
            Ok(Some(user)) if user.plan.is_paid() => {
                return Entitlement::Proceed { plan: user.plan };
            }
            Ok(_) => {}
            // Treated as "no session": the paid path degrades to the free
            // quota instead of taking the whole endpoint down.
            Err(e) => {
                tracing::warn!(error = %e, "session verification failed, falling through");
            }
        }
    }

    // B. License key. check_license is fail-closed internally and counts
    // the use on success.
    if let Some(key) = creds.license_key {
        let check = license::check_license(db, slug, key);
        if check.valid
            && let Some(plan) = check
                .license
                .as_ref()
                .and_then(|l| l.plan.parse::<Plan>().ok())
        {
            return Entitlement::Proceed { plan };
        }
    }

    // C. Anonymous free quota (fail-open internally).
    let free = usage::check_free_usage(db, slug, creds.fingerprint);
    if free.allowed {
        Entitlement::Proceed { plan: Plan::Free }
    } else {
        Entitlement::Reject { count: free.count }
    }
}
