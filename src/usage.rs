//! Free-tier metering: at most `FREE_DAILY_LIMIT` generations per
//! fingerprint per UTC day.
//!
//! The counter key embeds the date, so quotas reset implicitly at the day
//! boundary; a 24 h TTL cleans up stale counters. Increments are blind
//! read-modify-write: concurrent requests from one fingerprint can both
//! observe count 2 and both write 3, under-enforcing the cap by at most the
//! number of racers. Accepted; the store offers no conditional writes worth
//! paying for here.

use crate::db::{DbPool, kv};
use crate::error::Result;
use crate::models::{FREE_DAILY_LIMIT, FREE_USAGE_TTL_SECS, FreeUsage, FreeUsageCounter};
use crate::util::date_string;

fn usage_key(slug: &str, fingerprint: &str, date: &str) -> String {
    format!("{}:free:{}:{}", slug, fingerprint, date)
}

/// Check the caller's quota for today and consume one unit if allowed.
///
/// Fail-open: on a store error the request is allowed. This meter mitigates
/// abuse on a free tier; availability wins over strict enforcement. The
/// license check makes the opposite call.
pub fn check_free_usage(db: &DbPool, slug: &str, fingerprint: &str) -> FreeUsage {
    check_free_usage_on(db, slug, fingerprint, &date_string())
}

/// Same as [`check_free_usage`] but against an explicit date bucket.
pub fn check_free_usage_on(db: &DbPool, slug: &str, fingerprint: &str, date: &str) -> FreeUsage {
    match try_check(db, slug, fingerprint, date) {
        Ok(usage) => usage,
        Err(e) => {
            tracing::warn!(error = %e, "free-usage check failed, allowing");
            FreeUsage {
                allowed: true,
                count: 0,
            }
        }
    }
}

fn try_check(db: &DbPool, slug: &str, fingerprint: &str, date: &str) -> Result<FreeUsage> {
    let conn = db.get()?;
    let key = usage_key(slug, fingerprint, date);

    let mut counter = kv::get_json::<FreeUsageCounter>(&conn, &key)?.unwrap_or_default();

    if counter.count >= FREE_DAILY_LIMIT {
        return Ok(FreeUsage {
            allowed: false,
            count: counter.count,
        });
    }

    counter.count += 1;
    kv::put_json_with_ttl(&conn, &key, &counter, FREE_USAGE_TTL_SECS)?;

    Ok(FreeUsage {
        allowed: true,
        count: counter.count,
    })
}
