//! Shared data model, wire types, and error taxonomy for the RAS core.

pub mod base;
pub mod client;
pub mod commands;
pub mod error;
pub mod report;
pub mod wire;

pub use base::{BaseRow, BaseSummary};
pub use client::{ClientRow, NodeInfo};
pub use commands::{CMD_GET_REPORT, CMD_SEND_CONFIG};
pub use error::{RasError, RasResult};
pub use report::{ReportRow, ReportSummary};
pub use wire::{
    ActionParameters, ClientConfig, HeartbeatReply, IssueIkCertReply, IssueIkCertRequest,
    Manifest, RegisterClientReply, TrustReport, MANIFEST_BIOS, MANIFEST_IMA, MANIFEST_PCR,
};
