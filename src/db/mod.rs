pub mod kv;

use std::sync::Arc;

use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::email::EmailService;
use crate::error::Result;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub email: EmailService,
}

pub fn open_pool(path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
    });
    let pool = r2d2::Pool::new(manager)?;
    init_db(&pool)?;
    Ok(pool)
}

/// Create the key-value table. All persisted state lives here: entity
/// identity is encoded in the key, TTL in `expires_at` (epoch seconds,
/// NULL = no expiry).
pub fn init_db(pool: &DbPool) -> Result<()> {
    let conn = pool.get()?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            expires_at INTEGER
        );",
    )?;
    Ok(())
}
