use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A per-client trust reference (`BaseValue`). Reports are
/// compared against the most recently created `enabled = true` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BaseRow {
    #[cfg_attr(feature = "db", sqlx(default))]
    pub id: i64,
    pub clientid: i64,
    pub createtime: DateTime<Utc>,
    pub name: String,
    pub enabled: bool,
    pub verified: bool,
    pub trusted: bool,
    pub pcr: String,
    pub bios: String,
    pub ima: String,
}

/// Lightweight summary row used by `find_base_values_by_client_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BaseSummary {
    pub id: i64,
    pub createtime: DateTime<Utc>,
    pub name: String,
    pub enabled: bool,
    pub verified: bool,
    pub trusted: bool,
}
