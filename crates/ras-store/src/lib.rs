//! `StorePipeline`: `W` fixed worker tasks, each owning a dedicated channel,
//! dispatched round-robin over a single atomic counter, so `ReportRow`/
//! `BaseRow` inserts never block the validation hot path.

use std::sync::atomic::{AtomicU64, Ordering};

use ras_types::{BaseRow, RasResult, ReportRow};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default worker count.
pub const DEFAULT_WORKERS: usize = 20;

const SQL_INSERT_REPORT: &str = "INSERT INTO report(clientid, createtime, validated, trusted, quoted, signature, pcrlog, bioslog, imalog) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";
const SQL_INSERT_BASE: &str = "INSERT INTO base(clientid, createtime, enabled, verified, trusted, name, pcr, bios, ima) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

enum StoreItem {
    Report(ReportRow),
    Base(BaseRow),
}

/// Picks the worker index for the `n`th dispatched item, `workers` wide.
/// Pulled out of [`StorePipeline::dispatch`] so the round-robin arithmetic
/// is testable without a live database connection.
pub fn pick_worker(counter: u64, workers: usize) -> usize {
    (counter as usize) % workers
}

/// Fixed worker pool absorbing `ReportRow`/`BaseRow` writes off the hot path.
///
/// Each worker owns a capacity-1 channel, so `push_*` awaits only until a
/// worker receives the item, never until the insert completes.
pub struct StorePipeline {
    senders: Vec<mpsc::Sender<StoreItem>>,
    index: AtomicU64,
    workers: Vec<JoinHandle<()>>,
}

impl StorePipeline {
    /// Spawns `workers` tasks, each holding its own handle onto `pool` — a
    /// write-dedicated connection pool, separate from the interactive query
    /// pool `TrustManager` uses, so slow writes never stall reads.
    pub fn spawn(pool: PgPool, workers: usize) -> Self {
        assert!(workers > 0, "store pipeline needs at least one worker");
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let (tx, rx) = mpsc::channel(1);
            handles.push(tokio::spawn(run_worker(worker_id, pool.clone(), rx)));
            senders.push(tx);
        }
        StorePipeline {
            senders,
            index: AtomicU64::new(0),
            workers: handles,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.senders.len()
    }

    /// Enqueues a validated report for asynchronous persistence.
    pub async fn push_report(&self, row: ReportRow) {
        self.dispatch(StoreItem::Report(row)).await;
    }

    /// Enqueues a base value for asynchronous persistence.
    pub async fn push_base(&self, row: BaseRow) {
        self.dispatch(StoreItem::Base(row)).await;
    }

    async fn dispatch(&self, item: StoreItem) {
        let n = self.index.fetch_add(1, Ordering::Relaxed);
        let i = pick_worker(n, self.senders.len());
        if self.senders[i].send(item).await.is_err() {
            tracing::error!(worker = i, "store pipeline worker is gone, dropping write");
        }
    }

    /// Closes every channel and waits for workers to drain and exit; the
    /// write pool closes itself once every worker's clone is dropped.
    pub async fn release(self) {
        drop(self.senders);
        for handle in self.workers {
            let _ = handle.await;
        }
    }
}

async fn run_worker(worker_id: usize, pool: PgPool, mut rx: mpsc::Receiver<StoreItem>) {
    while let Some(item) = rx.recv().await {
        let result = match item {
            StoreItem::Report(row) => insert_report(&pool, &row).await,
            StoreItem::Base(row) => insert_base(&pool, &row).await,
        };
        if let Err(err) = result {
            tracing::error!(worker_id, error = %err, "store pipeline insert failed");
        }
    }
}

async fn insert_report(pool: &PgPool, row: &ReportRow) -> RasResult<()> {
    sqlx::query(SQL_INSERT_REPORT)
        .bind(row.clientid)
        .bind(row.createtime)
        .bind(row.validated)
        .bind(row.trusted)
        .bind(&row.quoted)
        .bind(&row.signature)
        .bind(&row.pcrlog)
        .bind(&row.bioslog)
        .bind(&row.imalog)
        .execute(pool)
        .await?;
    Ok(())
}

async fn insert_base(pool: &PgPool, row: &BaseRow) -> RasResult<()> {
    sqlx::query(SQL_INSERT_BASE)
        .bind(row.clientid)
        .bind(row.createtime)
        .bind(row.enabled)
        .bind(row.verified)
        .bind(row.trusted)
        .bind(&row.name)
        .bind(&row.pcr)
        .bind(&row.bios)
        .bind(&row.ima)
        .execute(pool)
        .await?;
    Ok(())
}
