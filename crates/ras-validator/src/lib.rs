//! `ReportValidator`: nonce freshness, quote signature, PCR digest
//! recomputation, and BIOS/IMA replay against recorded baselines.
//!
//! The four checks run in the stated order with a short-circuit rule: the
//! first failure aborts and nothing is persisted.

pub mod eventlog;
pub mod pcrlog;
pub mod quote;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ras_cache::CacheEntry;
use ras_types::{BaseRow, RasError, ReportRow, TrustReport, MANIFEST_BIOS, MANIFEST_IMA, MANIFEST_PCR};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha2::{Digest, Sha256};

/// Validates `report` against `entry`'s cached nonce and IK certificate, and
/// against `baseline` (the client's most recently created `enabled=true`
/// `BaseValue`, or `None` if the client has none.
///
/// On success the cache's trust expiration is refreshed and a populated,
/// ready-to-persist [`ReportRow`] is returned. On any failure, the specific
/// [`RasError`] variant is returned and the row must not be persisted.
pub fn validate_report(
    entry: &Arc<CacheEntry>,
    report: &TrustReport,
    baseline: Option<&BaseRow>,
    trust_duration: Duration,
) -> Result<ReportRow, RasError> {
    // 1. nonce freshness — consumed at most once (ras-cache::CacheEntry).
    if !entry.compare_nonce(report.nonce) {
        return Err(RasError::NonceMismatch);
    }

    let mut row = ReportRow::pending(report.client_id, Utc::now());

    // 2. quote signature
    check_quote(entry, report, &mut row)?;

    // 3. PCR digest
    check_pcr_log(report, &mut row)?;

    // 4. BIOS/IMA replay
    check_bios_and_ima(report, baseline, &mut row)?;

    row.validated = true;
    row.trusted = true;
    entry.set_trusted(true);
    entry.update_trust_report(trust_duration);
    Ok(row)
}

fn check_quote(entry: &Arc<CacheEntry>, report: &TrustReport, row: &mut ReportRow) -> Result<(), RasError> {
    if report.quoted.is_empty() || report.signature.is_empty() {
        return Err(RasError::ParameterWrong);
    }
    let ik_pub = entry.ik_public_key()?;
    let verifying_key = VerifyingKey::<Sha256>::new(ik_pub);
    let signature =
        Signature::try_from(report.signature.as_slice()).map_err(|_| RasError::BadSignature)?;
    verifying_key
        .verify(&report.quoted, &signature)
        .map_err(|_| RasError::BadSignature)?;

    row.signature = hex::encode(&report.signature);
    row.quoted = hex::encode(&report.quoted);
    Ok(())
}

fn check_pcr_log(report: &TrustReport, row: &mut ReportRow) -> Result<(), RasError> {
    let pcr_log_bytes = report.manifest(MANIFEST_PCR);
    let pcr_log = String::from_utf8_lossy(pcr_log_bytes);
    let parsed_log = pcrlog::parse(&pcr_log);
    if parsed_log.dropped > 0 {
        tracing::warn!(dropped = parsed_log.dropped, "pcr log had malformed lines");
    }

    let parsed_quote = quote::parse_quoted(&report.quoted)?;

    let mut concatenated = Vec::new();
    for pcr in &parsed_quote.pcr_selection {
        let hex_value = parsed_log.values.get(pcr).ok_or(RasError::PcrMismatch)?;
        let bytes = hex::decode(hex_value).map_err(|_| RasError::PcrMismatch)?;
        concatenated.extend_from_slice(&bytes);
    }

    let digest = Sha256::digest(&concatenated);
    if digest.as_slice() != parsed_quote.pcr_digest {
        return Err(RasError::PcrMismatch);
    }

    row.pcrlog = pcr_log.into_owned();
    Ok(())
}

fn check_bios_and_ima(
    report: &TrustReport,
    baseline: Option<&BaseRow>,
    row: &mut ReportRow,
) -> Result<(), RasError> {
    let bios_log = String::from_utf8_lossy(report.manifest(MANIFEST_BIOS)).into_owned();
    let ima_log = String::from_utf8_lossy(report.manifest(MANIFEST_IMA)).into_owned();

    let (after_bios, bios_dropped) = eventlog::replay(eventlog::zero_banks(), &bios_log);
    if bios_dropped > 0 {
        tracing::warn!(dropped = bios_dropped, "bios log had malformed lines");
    }
    if let Some(base) = baseline {
        if base.enabled && eventlog::composite_digest(&after_bios) != base.bios {
            return Err(RasError::BiosMismatch);
        }
    }

    let (after_ima, ima_dropped) = eventlog::replay(after_bios, &ima_log);
    if ima_dropped > 0 {
        tracing::warn!(dropped = ima_dropped, "ima log had malformed lines");
    }
    if let Some(base) = baseline {
        if base.enabled && eventlog::composite_digest(&after_ima) != base.ima {
            return Err(RasError::ImaMismatch);
        }
    }

    row.bioslog = bios_log;
    row.imalog = ima_log;
    Ok(())
}
