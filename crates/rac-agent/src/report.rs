//! Local TPM quoting boundary for outgoing trust reports. Producing a real
//! quote needs hardware this crate deliberately does not touch;
//! [`ReportSource`] is the seam a concrete TPM backend plugs into (the
//! agent-side analogue of `ras-tpm-hal`'s traits).

use ras_types::TrustReport;

pub trait ReportSource {
    /// Builds a `TrustReport` for `client_id` quoting over `nonce`, signed
    /// by the local IK.
    fn build_report(&self, client_id: i64, nonce: u64) -> anyhow::Result<TrustReport>;
}
