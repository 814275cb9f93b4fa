use serde::{Deserialize, Serialize};

/// A single named artifact attached to a trust report. `key` is one of
/// `"pcr"`, `"bios"`, `"ima"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub key: String,
    pub value: Vec<u8>,
}

pub const MANIFEST_PCR: &str = "pcr";
pub const MANIFEST_BIOS: &str = "bios";
pub const MANIFEST_IMA: &str = "ima";

/// A submitted trust report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustReport {
    pub client_id: i64,
    pub nonce: u64,
    pub quoted: Vec<u8>,
    pub signature: Vec<u8>,
    pub manifests: Vec<Manifest>,
}

impl TrustReport {
    pub fn manifest(&self, key: &str) -> &[u8] {
        self.manifests
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.value.as_slice())
            .unwrap_or(&[])
    }
}

/// Heartbeat RPC reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatReply {
    pub next_action: u64,
    pub action_parameters: ActionParameters,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionParameters {
    pub client_config: Option<ClientConfig>,
    pub nonce: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub hb_duration_seconds: u64,
    pub trust_duration_seconds: u64,
}

/// Registration RPC reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterClientReply {
    pub client_id: i64,
    pub client_config: ClientConfig,
}

/// IK certificate issuance RPC request/reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueIkCertRequest {
    pub ek_cert: Vec<u8>,
    pub ik_pub: Vec<u8>,
    pub ik_name: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueIkCertReply {
    pub ic_encrypted: Vec<u8>,
    pub enc_seed: Vec<u8>,
}
