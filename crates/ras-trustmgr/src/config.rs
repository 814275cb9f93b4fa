//! Typed settings for [`crate::TrustManager::create`]. Config *loading* (env,
//! file, CLI) is an out-of-scope external boundary; this stays a plain
//! struct with `from_env`/`with_defaults` constructors rather than a parser
//! — a typed settings struct read from the environment, validated once at
//! construction.

use std::env;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/ras";
const DEFAULT_HB_DURATION_SECS: u64 = 30;
const DEFAULT_TRUST_DURATION_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct RasConfig {
    pub database_url: String,
    pub store_workers: usize,
    pub hb_duration: Duration,
    pub trust_duration: Duration,
}

impl RasConfig {
    /// Reads `RAS_DATABASE_URL`, `RAS_STORE_WORKERS`, `RAS_HB_DURATION_SECS`,
    /// and `RAS_TRUST_DURATION_SECS`, falling back to defaults for anything
    /// unset or unparseable.
    pub fn from_env() -> Self {
        RasConfig {
            database_url: env::var("RAS_DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            store_workers: env_parsed("RAS_STORE_WORKERS").unwrap_or(ras_store::DEFAULT_WORKERS),
            hb_duration: Duration::from_secs(
                env_parsed("RAS_HB_DURATION_SECS").unwrap_or(DEFAULT_HB_DURATION_SECS),
            ),
            trust_duration: Duration::from_secs(
                env_parsed("RAS_TRUST_DURATION_SECS").unwrap_or(DEFAULT_TRUST_DURATION_SECS),
            ),
        }
    }

    /// Fixed settings for tests, pointed at `database_url`.
    pub fn with_defaults(database_url: impl Into<String>) -> Self {
        RasConfig {
            database_url: database_url.into(),
            store_workers: ras_store::DEFAULT_WORKERS,
            hb_duration: Duration::from_secs(DEFAULT_HB_DURATION_SECS),
            trust_duration: Duration::from_secs(DEFAULT_TRUST_DURATION_SECS),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
