use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered attesting platform (`Client`).
///
/// `id` is authoritative in the database; `ik_cert` uniqueness across live
/// (non-deleted) clients is the registration key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ClientRow {
    pub id: i64,
    pub regtime: DateTime<Utc>,
    pub deleted: bool,
    /// Opaque JSON-shaped descriptor, searchable by containment.
    pub info: serde_json::Value,
    /// PEM-encoded identity-key certificate.
    pub ikcert: String,
}

/// Summary row returned by `TrustManager::get_all_nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: i64,
    pub reg_time: DateTime<Utc>,
    pub online: bool,
    pub trusted: bool,
}
