use serde::{Deserialize, Serialize};

/// Daily free-tier counter. The key embeds the date, so a fresh counter
/// appears at every day boundary; the record itself only holds the count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreeUsageCounter {
    pub count: u32,
}

/// Outcome of a free-usage check.
#[derive(Debug, Clone, Copy)]
pub struct FreeUsage {
    pub allowed: bool,
    pub count: u32,
}

pub const FREE_DAILY_LIMIT: u32 = 3;
pub const FREE_USAGE_TTL_SECS: i64 = 24 * 60 * 60;
