//! `TrustManager`: owns the cache/store/query-pool triple and is the single
//! entry point the server binary calls into. Registration, heartbeats, and
//! report validation all go through here; nothing below this crate talks to
//! Postgres directly except `ras-store`'s write pool.

mod db;

pub mod config;

use std::sync::Arc;

use chrono::Utc;
use ras_cache::{CacheEntry, TrustCache};
use ras_store::StorePipeline;
use ras_types::{
    BaseRow, BaseSummary, ClientRow, NodeInfo, RasError, RasResult, ReportRow, ReportSummary,
    TrustReport, CMD_SEND_CONFIG,
};
use serde_json::Value;
use sqlx::PgPool;

pub use config::RasConfig;

/// Owns the in-memory cache, the interactive query pool, and the async store
/// pipeline. There is no process-wide singleton: each call site holds its
/// own handle, created once at startup and passed down.
pub struct TrustManager {
    cache: TrustCache,
    pool: PgPool,
    store: StorePipeline,
    hb_duration: std::time::Duration,
    trust_duration: std::time::Duration,
}

impl TrustManager {
    /// Opens the query pool, loads every live client into the cache, opens a
    /// second write-dedicated pool, and spawns the store pipeline on it.
    pub async fn create(config: RasConfig) -> RasResult<Self> {
        let pool = PgPool::connect(&config.database_url).await?;
        let write_pool = PgPool::connect(&config.database_url).await?;
        Self::from_pools(pool, write_pool, &config).await
    }

    /// Builds a manager from already-open pools instead of dialing
    /// `config.database_url` itself. Used by tests that get handed a pool
    /// pointed at an ephemeral, already-migrated database (e.g.
    /// `#[sqlx::test]`); production call sites should use [`Self::create`].
    pub async fn from_pools(pool: PgPool, write_pool: PgPool, config: &RasConfig) -> RasResult<Self> {
        let cache = TrustCache::new();
        let clients: Vec<ClientRow> = sqlx::query_as(db::FIND_ALL_LIVE_CLIENTS)
            .fetch_all(&pool)
            .await?;
        for client in clients {
            cache.insert(client.id, client.regtime, client.ikcert);
        }
        tracing::info!(clients = cache.len(), "loaded live clients into cache");

        let store = StorePipeline::spawn(write_pool, config.store_workers);

        Ok(TrustManager {
            cache,
            pool,
            store,
            hb_duration: config.hb_duration,
            trust_duration: config.trust_duration,
        })
    }

    /// Drains and stops the store pipeline, then closes the query pool.
    pub async fn release(self) {
        self.store.release().await;
        self.pool.close().await;
    }

    /// Registers a client under `ik_cert`. The database's partial unique
    /// index (`client_ikcert_live_uidx`) is the authority on uniqueness;
    /// concurrent registrations under the same certificate serialize there
    /// and the loser sees [`RasError::AlreadyRegistered`].
    pub async fn register_client_by_ik(
        &self,
        ik_cert: impl Into<String>,
        info: Value,
    ) -> RasResult<ClientRow> {
        let ik_cert = ik_cert.into();
        let reg_time = Utc::now();
        let inserted: Result<(i64,), sqlx::Error> = sqlx::query_as(db::INSERT_CLIENT)
            .bind(reg_time)
            .bind(false)
            .bind(&info)
            .bind(&ik_cert)
            .fetch_one(&self.pool)
            .await;
        let id = match inserted {
            Ok((id,)) => id,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(RasError::AlreadyRegistered)
            }
            Err(e) => return Err(e.into()),
        };

        self.cache.insert(id, reg_time, ik_cert.clone());
        Ok(ClientRow {
            id,
            regtime: reg_time,
            deleted: false,
            info,
            ikcert: ik_cert,
        })
    }

    /// Removes `id` from the cache and soft-deletes its row. A no-op if `id`
    /// is not currently cached.
    pub async fn unregister_client_by_id(&self, id: i64) -> RasResult<()> {
        if self.cache.remove(id).is_none() {
            return Ok(());
        }
        sqlx::query(db::UNREGISTER_CLIENT_BY_ID)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Looks up `id`'s cache entry, or [`RasError::NotRegistered`] if there
    /// is none.
    pub fn get_cache(&self, id: i64) -> RasResult<Arc<CacheEntry>> {
        self.cache.get(id).ok_or(RasError::NotRegistered)
    }

    /// Fetches `id`'s full row. Gates on the cache first so an unknown id
    /// returns [`RasError::NotRegistered`] instead of a row-not-found error
    /// from the database.
    pub async fn find_client_by_id(&self, id: i64) -> RasResult<ClientRow> {
        self.get_cache(id)?;
        let row: ClientRow = sqlx::query_as(db::FIND_CLIENT_BY_ID)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_client_by_ik(&self, ik_cert: &str) -> RasResult<ClientRow> {
        let row: ClientRow = sqlx::query_as(db::FIND_CLIENT_BY_IK)
            .bind(ik_cert)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Containment search over `Client.info`.
    pub async fn find_clients_by_info(&self, info: &Value) -> RasResult<Vec<ClientRow>> {
        let rows: Vec<ClientRow> = sqlx::query_as(db::FIND_CLIENTS_BY_INFO)
            .bind(info)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Cache-only snapshot of every client with `from <= id < to`, sorted by
    /// id.
    pub fn get_all_nodes(&self, from: i64, to: i64) -> Vec<NodeInfo> {
        let mut nodes = Vec::new();
        self.cache.for_each(|id, entry| {
            if id >= from && id < to {
                nodes.push(NodeInfo {
                    id,
                    reg_time: entry.reg_time(),
                    online: entry.online(),
                    trusted: entry.trusted(),
                });
            }
        });
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    /// Sets `CMD_SEND_CONFIG` on every cached client, so the next heartbeat
    /// from each carries a fresh `ClientConfig`.
    pub fn update_all_nodes(&self) {
        self.cache.for_each(|_, entry| entry.set_commands(CMD_SEND_CONFIG));
    }

    /// Marks `id` online, rolls its heartbeat deadline forward, reads and
    /// clears its pending command bitmask, and returns a fresh nonce.
    pub fn handle_heartbeat(&self, id: i64) -> RasResult<(u64, u64)> {
        let entry = self.get_cache(id)?;
        entry.set_online(true);
        let nonce = entry.update_heartbeat(self.hb_duration, self.trust_duration);
        let commands = entry.commands();
        entry.clear_commands();
        Ok((commands, nonce))
    }

    /// Runs `ReportValidator` against `report`'s client and its most
    /// recently created enabled baseline, then enqueues the resulting row
    /// for asynchronous persistence. Returns `Ok(true)` only if every check
    /// passed; any failure surfaces as the specific `RasError` and nothing
    /// is persisted.
    pub async fn validate_report(&self, report: &TrustReport) -> RasResult<bool> {
        let entry = self.get_cache(report.client_id)?;
        let baseline: Option<BaseRow> = sqlx::query_as(db::FIND_ENABLED_BASE_VALUE_BY_CLIENT_ID)
            .bind(report.client_id)
            .fetch_optional(&self.pool)
            .await?;

        let row = ras_validator::validate_report(&entry, report, baseline.as_ref(), self.trust_duration)?;
        self.store.push_report(row).await;
        Ok(true)
    }

    /// Enqueues a new baseline for asynchronous persistence.
    pub async fn save_base_value(&self, row: BaseRow) {
        self.store.push_base(row).await;
    }

    pub async fn find_reports_by_client_id(&self, id: i64) -> RasResult<Vec<ReportSummary>> {
        let rows: Vec<ReportSummary> = sqlx::query_as(db::FIND_REPORTS_BY_CLIENT_ID)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_report_by_id(&self, id: i64) -> RasResult<ReportRow> {
        let row: ReportRow = sqlx::query_as(db::FIND_REPORT_BY_ID)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete_report_by_id(&self, id: i64) -> RasResult<()> {
        sqlx::query(db::DELETE_REPORT_BY_ID)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_base_values_by_client_id(&self, id: i64) -> RasResult<Vec<BaseSummary>> {
        let rows: Vec<BaseSummary> = sqlx::query_as(db::FIND_BASE_VALUES_BY_CLIENT_ID)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_base_value_by_id(&self, id: i64) -> RasResult<BaseRow> {
        let row: BaseRow = sqlx::query_as(db::FIND_BASE_VALUE_BY_ID)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete_base_value_by_id(&self, id: i64) -> RasResult<()> {
        sqlx::query(db::DELETE_BASE_VALUE_BY_ID)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn get_all_nodes_filters_by_range_and_sorts_by_id() {
        let cache = TrustCache::new();
        cache.insert(5, Utc::now(), "cert-5");
        cache.insert(1, Utc::now(), "cert-1");
        cache.insert(9, Utc::now(), "cert-9");

        // Exercise the same filter/sort logic `get_all_nodes` runs, without
        // needing a live pool to build a `TrustManager`.
        let mut nodes = Vec::new();
        cache.for_each(|id, entry| {
            if id >= 1 && id < 9 {
                nodes.push(NodeInfo {
                    id,
                    reg_time: entry.reg_time(),
                    online: entry.online(),
                    trusted: entry.trusted(),
                });
            }
        });
        nodes.sort_by_key(|n| n.id);

        let ids: Vec<i64> = nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn update_all_nodes_sets_send_config_on_every_entry() {
        let cache = TrustCache::new();
        let a = cache.insert(1, Utc::now(), "cert-a");
        let b = cache.insert(2, Utc::now(), "cert-b");

        cache.for_each(|_, entry| entry.set_commands(CMD_SEND_CONFIG));

        assert_eq!(a.commands() & CMD_SEND_CONFIG, CMD_SEND_CONFIG);
        assert_eq!(b.commands() & CMD_SEND_CONFIG, CMD_SEND_CONFIG);
    }

    #[test]
    fn handle_heartbeat_reads_and_clears_pending_commands() {
        let entry = Arc::new(CacheEntry::new(Utc::now(), "cert"));
        entry.set_commands(CMD_SEND_CONFIG);

        entry.set_online(true);
        let _nonce = entry.update_heartbeat(
            std::time::Duration::from_secs(30),
            std::time::Duration::from_secs(300),
        );
        let commands = entry.commands();
        entry.clear_commands();

        assert_eq!(commands & CMD_SEND_CONFIG, CMD_SEND_CONFIG);
        assert_eq!(entry.commands(), 0);
        assert!(entry.online());
    }
}
