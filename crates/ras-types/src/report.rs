use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated attestation artifact (`Report`). Created only
/// after every `ReportValidator` check succeeds; persisted asynchronously
/// by the store pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReportRow {
    #[cfg_attr(feature = "db", sqlx(default))]
    pub id: i64,
    pub clientid: i64,
    pub createtime: DateTime<Utc>,
    pub validated: bool,
    pub trusted: bool,
    pub quoted: String,
    pub signature: String,
    pub pcrlog: String,
    pub bioslog: String,
    pub imalog: String,
}

impl ReportRow {
    pub fn pending(client_id: i64, created_at: DateTime<Utc>) -> Self {
        ReportRow {
            id: 0,
            clientid: client_id,
            createtime: created_at,
            validated: false,
            trusted: false,
            quoted: String::new(),
            signature: String::new(),
            pcrlog: String::new(),
            bioslog: String::new(),
            imalog: String::new(),
        }
    }
}

/// Lightweight summary row used by `find_reports_by_client_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReportSummary {
    pub id: i64,
    pub clientid: i64,
    pub createtime: DateTime<Utc>,
    pub validated: bool,
    pub trusted: bool,
}
