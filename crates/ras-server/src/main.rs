//! RAS core entry point: builds a `TrustManager` from the environment and
//! blocks until shutdown. Wiring it to an RPC transport is out of scope —
//! this binary exists to demonstrate that the contract in `ras-trustmgr`
//! starts up and tears down cleanly.

use ras_trustmgr::{RasConfig, TrustManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = RasConfig::from_env();
    tracing::info!(
        store_workers = config.store_workers,
        hb_duration_secs = config.hb_duration.as_secs(),
        trust_duration_secs = config.trust_duration.as_secs(),
        "starting remote attestation service"
    );

    let manager = TrustManager::create(config).await?;
    tracing::info!("trust manager ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, draining store pipeline");
    manager.release().await;
    Ok(())
}
