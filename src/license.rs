//! License validation and minting.
//!
//! Licenses live under `{slug}:license:{key}`; keys minted before
//! multi-tenancy live under the global `license:{key}` shape. Lookup prefers
//! the namespaced shape, and successful validations write back to whichever
//! shape the record was found under so legacy records are preserved in place
//! rather than silently migrated.

use std::str::FromStr;

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{DbPool, kv};
use crate::error::Result;
use crate::models::{License, LicenseCheck, Plan};

/// Which key shape a license record was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseKeyShape {
    Namespaced,
    Legacy,
}

impl LicenseKeyShape {
    pub fn storage_key(&self, slug: &str, license_key: &str) -> String {
        match self {
            LicenseKeyShape::Namespaced => format!("{}:license:{}", slug, license_key),
            LicenseKeyShape::Legacy => format!("license:{}", license_key),
        }
    }
}

/// Two-step key resolution: namespaced shape first, legacy second.
fn resolve_key_shape(
    conn: &Connection,
    slug: &str,
    license_key: &str,
) -> Result<Option<(LicenseKeyShape, License)>> {
    for shape in [LicenseKeyShape::Namespaced, LicenseKeyShape::Legacy] {
        let key = shape.storage_key(slug, license_key);
        if let Some(license) = kv::get_json::<License>(conn, &key)? {
            return Ok(Some((shape, license)));
        }
    }
    Ok(None)
}

/// Validate a license key and count the use.
///
/// Fail-closed: a store error denies (`reason = "error"`). Unlike the
/// free-usage meter this guards billing, so errors must not let traffic
/// through.
pub fn check_license(db: &DbPool, slug: &str, license_key: &str) -> LicenseCheck {
    match try_check_license(db, slug, license_key) {
        Ok(check) => check,
        Err(e) => {
            tracing::error!(error = %e, "license check failed, denying");
            LicenseCheck::invalid("error")
        }
    }
}

fn try_check_license(db: &DbPool, slug: &str, license_key: &str) -> Result<LicenseCheck> {
    let conn = db.get()?;

    let Some((_, mut license)) = resolve_key_shape(&conn, slug, license_key)? else {
        return Ok(LicenseCheck::invalid("not_found"));
    };

    if !Plan::from_str(&license.plan).is_ok_and(|p| p.is_paid()) {
        return Ok(LicenseCheck::invalid("invalid_plan"));
    }

    license.used += 1;

    // Re-resolve the shape at write time: a concurrent writer may have
    // migrated the record between our read and this write. The remaining
    // race is tolerated; counters here are approximate by design.
    let shape = if kv::get(&conn, &LicenseKeyShape::Namespaced.storage_key(slug, license_key))?
        .is_some()
    {
        LicenseKeyShape::Namespaced
    } else {
        LicenseKeyShape::Legacy
    };
    kv::put_json(&conn, &shape.storage_key(slug, license_key), &license)?;

    Ok(LicenseCheck::valid(license))
}

/// Mint a new license. New licenses always use the namespaced key shape.
pub fn create_license(db: &DbPool, slug: &str, plan: Plan) -> Result<String> {
    let license_key = format!("yc_{}", Uuid::new_v4());
    let license = License::new(&plan.to_string());

    let conn = db.get()?;
    kv::put_json(
        &conn,
        &LicenseKeyShape::Namespaced.storage_key(slug, &license_key),
        &license,
    )?;

    tracing::info!(plan = %plan, "license created");
    Ok(license_key)
}
