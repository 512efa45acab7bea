//! Thin key-value layer over the `kv` table.
//!
//! Expiry is lazy: a read past `expires_at` reports the key as absent and
//! deletes the row opportunistically. Writes are blind overwrites; the
//! entitlement layer above accepts lost-update races on counters rather than
//! paying for conditional writes.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let row: Option<(String, Option<i64>)> = conn
        .query_row(
            "SELECT value, expires_at FROM kv WHERE key = ?1",
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((_, Some(expires_at))) if Utc::now().timestamp() >= expires_at => {
            delete(conn, key)?;
            Ok(None)
        }
        Some((value, _)) => Ok(Some(value)),
        None => Ok(None),
    }
}

pub fn put(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value, expires_at) VALUES (?1, ?2, NULL)",
        params![key, value],
    )?;
    Ok(())
}

pub fn put_with_ttl(conn: &Connection, key: &str, value: &str, ttl_secs: i64) -> Result<()> {
    let expires_at = Utc::now().timestamp() + ttl_secs;
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)",
        params![key, value, expires_at],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
    Ok(())
}

/// Read and deserialize a record. A present-but-malformed value is store
/// corruption, not a missing record.
pub fn get_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    match get(conn, key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw).map_err(|e| {
                tracing::error!(key = %key, error = %e, "corrupt record in kv store");
                AppError::Internal("Corrupt record".to_string())
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn put_json<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("serialize record: {}", e)))?;
    put(conn, key, &raw)
}

pub fn put_json_with_ttl<T: Serialize>(
    conn: &Connection,
    key: &str,
    value: &T,
    ttl_secs: i64,
) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("serialize record: {}", e)))?;
    put_with_ttl(conn, key, &raw, ttl_secs)
}
