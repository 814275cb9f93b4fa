//! The TPM 2.0 attestation structure (`TPMS_ATTEST`) carries far more than a
//! PCR digest — reset/clock counters, firmware version, the signing key's
//! qualified name — but `ReportValidator` only ever reads two fields out of
//! it: the selected PCR indices and the digest computed over them. Rather
//! than pull in a full TPM2 marshaling crate for a
//! two-field read, this module defines the minimal wire shape the rest of
//! this workspace actually produces and consumes, recorded as a deliberate
//! simplification in `DESIGN.md`.
//!
//! Layout (all integers big-endian):
//! `b"QUOT" ‖ u16(count) ‖ count * u32(pcr index) ‖ 32-byte SHA-256 digest`.

use ras_types::RasError;

const MAGIC: &[u8; 4] = b"QUOT";
pub const DIGEST_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuote {
    pub pcr_selection: Vec<u32>,
    pub pcr_digest: [u8; DIGEST_LEN],
}

/// Builds the wire bytes for a quote. Exposed for tests and for agent-side
/// code that needs to produce the bytes a TPM quote operation would sign.
pub fn encode_quoted(pcr_selection: &[u32], pcr_digest: &[u8; DIGEST_LEN]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 2 + pcr_selection.len() * 4 + DIGEST_LEN);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(pcr_selection.len() as u16).to_be_bytes());
    for pcr in pcr_selection {
        out.extend_from_slice(&pcr.to_be_bytes());
    }
    out.extend_from_slice(pcr_digest);
    out
}

/// Parses `quoted` as the attestation structure described above.
pub fn parse_quoted(quoted: &[u8]) -> Result<ParsedQuote, RasError> {
    if quoted.len() < 4 + 2 || &quoted[0..4] != MAGIC {
        return Err(RasError::ParameterWrong);
    }
    let count = u16::from_be_bytes([quoted[4], quoted[5]]) as usize;
    let selection_end = 6 + count * 4;
    let total_len = selection_end + DIGEST_LEN;
    if quoted.len() != total_len {
        return Err(RasError::ParameterWrong);
    }

    let mut pcr_selection = Vec::with_capacity(count);
    for chunk in quoted[6..selection_end].chunks_exact(4) {
        pcr_selection.push(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    let mut pcr_digest = [0u8; DIGEST_LEN];
    pcr_digest.copy_from_slice(&quoted[selection_end..total_len]);

    Ok(ParsedQuote {
        pcr_selection,
        pcr_digest,
    })
}
