//! Agent binary: heartbeats on a fixed interval and dispatches whatever
//! commands RAS asks for. Registration and the RPC client itself are out
//! of scope; this wires the command-dispatch contract against placeholder
//! [`Transport`]/[`ReportSource`] implementations so a deployment only has
//! to replace those two seams.

use std::time::Duration;

use rac_agent::{do_next_action, AgentState, ReportSource, Transport};
use ras_types::{HeartbeatReply, RegisterClientReply, TrustReport};

struct UnwiredTransport;

impl Transport for UnwiredTransport {
    fn register_client(
        &mut self,
        _ik_cert: &[u8],
        _info: serde_json::Value,
    ) -> anyhow::Result<RegisterClientReply> {
        anyhow::bail!("no RPC client wired in; replace UnwiredTransport with a real one")
    }

    fn send_heartbeat(&mut self, _client_id: i64) -> anyhow::Result<HeartbeatReply> {
        anyhow::bail!("no RPC client wired in; replace UnwiredTransport with a real one")
    }

    fn send_report(&mut self, _report: &TrustReport) -> anyhow::Result<()> {
        anyhow::bail!("no RPC client wired in; replace UnwiredTransport with a real one")
    }
}

struct UnwiredReportSource;

impl ReportSource for UnwiredReportSource {
    fn build_report(&self, _client_id: i64, _nonce: u64) -> anyhow::Result<TrustReport> {
        anyhow::bail!("no TPM backend wired in; replace UnwiredReportSource with a real one")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut transport = UnwiredTransport;
    let report_source = UnwiredReportSource;
    // A real deployment reads `client_id` back from wherever registration
    // persisted it.
    let mut state = AgentState::new(0, Duration::from_secs(30), Duration::from_secs(300));

    loop {
        match transport.send_heartbeat(state.client_id) {
            Ok(reply) => {
                tracing::info!(next_action = reply.next_action, "heartbeat acknowledged");
                if let Err(err) = do_next_action(&mut transport, &report_source, &mut state, &reply) {
                    tracing::warn!(error = %err, "command dispatch failed");
                }
            }
            Err(err) => tracing::error!(error = %err, "heartbeat failed"),
        }
        tokio::time::sleep(state.hb_duration).await;
    }
}
