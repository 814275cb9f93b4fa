//! Agent-side control loop: heartbeat, then dispatch on the pending-command
//! bitmask the reply carries.
//!
//! Each command bit is checked independently, so adding a new command
//! later doesn't disturb the existing handlers.

pub mod report;
pub mod transport;

use std::time::Duration;

use ras_types::{HeartbeatReply, CMD_GET_REPORT, CMD_SEND_CONFIG};

pub use report::ReportSource;
pub use transport::Transport;

/// Mutable agent-local settings, updated in place when RAS pushes a new
/// `ClientConfig`.
#[derive(Debug, Clone, Copy)]
pub struct AgentState {
    pub client_id: i64,
    pub hb_duration: Duration,
    pub trust_duration: Duration,
}

impl AgentState {
    pub fn new(client_id: i64, hb_duration: Duration, trust_duration: Duration) -> Self {
        AgentState {
            client_id,
            hb_duration,
            trust_duration,
        }
    }
}

pub fn do_next_action<T: Transport, R: ReportSource>(
    transport: &mut T,
    report_source: &R,
    state: &mut AgentState,
    reply: &HeartbeatReply,
) -> anyhow::Result<()> {
    if reply.next_action & CMD_SEND_CONFIG == CMD_SEND_CONFIG {
        set_new_conf(state, reply);
    }
    if reply.next_action & CMD_GET_REPORT == CMD_GET_REPORT {
        send_trust_report(transport, report_source, state, reply)?;
    }
    Ok(())
}

fn set_new_conf(state: &mut AgentState, reply: &HeartbeatReply) {
    let Some(cfg) = reply.action_parameters.client_config else {
        tracing::warn!("SEND_CONFIG command without a client_config payload");
        return;
    };
    tracing::info!(
        hb_duration_secs = cfg.hb_duration_seconds,
        trust_duration_secs = cfg.trust_duration_seconds,
        "received updated configuration from RAS"
    );
    state.hb_duration = Duration::from_secs(cfg.hb_duration_seconds);
    state.trust_duration = Duration::from_secs(cfg.trust_duration_seconds);
}

fn send_trust_report<T: Transport, R: ReportSource>(
    transport: &mut T,
    report_source: &R,
    state: &AgentState,
    reply: &HeartbeatReply,
) -> anyhow::Result<()> {
    let nonce = reply
        .action_parameters
        .nonce
        .ok_or_else(|| anyhow::anyhow!("GET_REPORT command without a nonce"))?;
    let report = report_source.build_report(state.client_id, nonce)?;
    transport.send_report(&report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ras_types::{ActionParameters, ClientConfig, RegisterClientReply, TrustReport};

    struct RecordingTransport {
        sent_reports: Vec<TrustReport>,
    }

    impl Transport for RecordingTransport {
        fn register_client(
            &mut self,
            _ik_cert: &[u8],
            _info: serde_json::Value,
        ) -> anyhow::Result<RegisterClientReply> {
            unreachable!("not exercised by these tests")
        }

        fn send_heartbeat(&mut self, _client_id: i64) -> anyhow::Result<HeartbeatReply> {
            unreachable!("not exercised by these tests")
        }

        fn send_report(&mut self, report: &TrustReport) -> anyhow::Result<()> {
            self.sent_reports.push(report.clone());
            Ok(())
        }
    }

    struct StubReportSource;

    impl ReportSource for StubReportSource {
        fn build_report(&self, client_id: i64, nonce: u64) -> anyhow::Result<TrustReport> {
            Ok(TrustReport {
                client_id,
                nonce,
                quoted: vec![],
                signature: vec![],
                manifests: vec![],
            })
        }
    }

    fn reply(next_action: u64, params: ActionParameters) -> HeartbeatReply {
        HeartbeatReply {
            next_action,
            action_parameters: params,
        }
    }

    #[test]
    fn send_config_bit_updates_durations_without_sending_a_report() {
        let mut transport = RecordingTransport { sent_reports: Vec::new() };
        let report_source = StubReportSource;
        let mut state = AgentState::new(1, Duration::from_secs(30), Duration::from_secs(300));

        let reply = reply(
            CMD_SEND_CONFIG,
            ActionParameters {
                client_config: Some(ClientConfig {
                    hb_duration_seconds: 60,
                    trust_duration_seconds: 600,
                }),
                nonce: None,
            },
        );

        do_next_action(&mut transport, &report_source, &mut state, &reply).unwrap();

        assert_eq!(state.hb_duration, Duration::from_secs(60));
        assert_eq!(state.trust_duration, Duration::from_secs(600));
        assert!(transport.sent_reports.is_empty());
    }

    #[test]
    fn get_report_bit_builds_and_sends_a_report_using_the_replys_nonce() {
        let mut transport = RecordingTransport { sent_reports: Vec::new() };
        let report_source = StubReportSource;
        let mut state = AgentState::new(7, Duration::from_secs(30), Duration::from_secs(300));

        let reply = reply(
            CMD_GET_REPORT,
            ActionParameters {
                client_config: None,
                nonce: Some(42),
            },
        );

        do_next_action(&mut transport, &report_source, &mut state, &reply).unwrap();

        assert_eq!(transport.sent_reports.len(), 1);
        assert_eq!(transport.sent_reports[0].client_id, 7);
        assert_eq!(transport.sent_reports[0].nonce, 42);
    }

    #[test]
    fn both_bits_set_runs_both_handlers() {
        let mut transport = RecordingTransport { sent_reports: Vec::new() };
        let report_source = StubReportSource;
        let mut state = AgentState::new(3, Duration::from_secs(30), Duration::from_secs(300));

        let reply = reply(
            CMD_SEND_CONFIG | CMD_GET_REPORT,
            ActionParameters {
                client_config: Some(ClientConfig {
                    hb_duration_seconds: 15,
                    trust_duration_seconds: 150,
                }),
                nonce: Some(9),
            },
        );

        do_next_action(&mut transport, &report_source, &mut state, &reply).unwrap();

        assert_eq!(state.hb_duration, Duration::from_secs(15));
        assert_eq!(transport.sent_reports.len(), 1);
    }

    #[test]
    fn get_report_without_a_nonce_fails_instead_of_sending_a_bad_report() {
        let mut transport = RecordingTransport { sent_reports: Vec::new() };
        let report_source = StubReportSource;
        let mut state = AgentState::new(1, Duration::from_secs(30), Duration::from_secs(300));

        let reply = reply(
            CMD_GET_REPORT,
            ActionParameters {
                client_config: None,
                nonce: None,
            },
        );

        assert!(do_next_action(&mut transport, &report_source, &mut state, &reply).is_err());
        assert!(transport.sent_reports.is_empty());
    }
}
