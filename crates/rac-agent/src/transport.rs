//! RPC client boundary stub. Wiring this to a real transport (gRPC, HTTP,
//! whatever the deployment picks) is out of scope — concrete backends
//! implement [`Transport`]; tests substitute an in-memory mock.

use ras_types::{HeartbeatReply, RegisterClientReply, TrustReport};
use serde_json::Value;

pub trait Transport {
    fn register_client(&mut self, ik_cert: &[u8], info: Value) -> anyhow::Result<RegisterClientReply>;
    fn send_heartbeat(&mut self, client_id: i64) -> anyhow::Result<HeartbeatReply>;
    fn send_report(&mut self, report: &TrustReport) -> anyhow::Result<()>;
}
