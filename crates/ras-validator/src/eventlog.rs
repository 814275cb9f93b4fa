//! BIOS/IMA event log replay.
//!
//! 24 PCR banks start at zero. Each event line extends its named bank:
//! `PCR_i ← SHA256(PCR_i ‖ event_digest)`. The real TCG BIOS log is a binary
//! TLV format and IMA's is a binary measurement list; both are out of scope
//! to decode here — TPM hardware access and log formats are an external
//! collaborator's contract. This module replays the already
//! text-converted form: lines of `<pcr-index> <hex-digest>`, one event per
//! line, malformed lines silently skipped exactly like [`crate::pcrlog`].

use sha2::{Digest, Sha256};

pub const PCR_BANK_COUNT: usize = 24;
pub type PcrBanks = [[u8; 32]; PCR_BANK_COUNT];

pub fn zero_banks() -> PcrBanks {
    [[0u8; 32]; PCR_BANK_COUNT]
}

/// Folds every well-formed event line of `log` into `banks`, returning the
/// updated banks and a count of malformed lines skipped.
pub fn replay(mut banks: PcrBanks, log: &str) -> (PcrBanks, usize) {
    let mut dropped = 0usize;
    for line in log.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() != 2 {
            if !line.trim().is_empty() {
                dropped += 1;
            }
            continue;
        }
        let (index, digest_hex) = (words[0], words[1]);
        let parsed_index = match index.parse::<usize>() {
            Ok(i) if i < PCR_BANK_COUNT => i,
            _ => {
                dropped += 1;
                continue;
            }
        };
        let digest = match hex::decode(digest_hex) {
            Ok(d) => d,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        let mut hasher = Sha256::new();
        hasher.update(banks[parsed_index]);
        hasher.update(&digest);
        banks[parsed_index].copy_from_slice(&hasher.finalize());
    }
    (banks, dropped)
}

/// `SHA-256` over the concatenation of all 24 banks, in order — the
/// composite digest compared against a `BaseValue`'s `bios`/`ima` column.
pub fn composite_digest(banks: &PcrBanks) -> String {
    let mut hasher = Sha256::new();
    for bank in banks {
        hasher.update(bank);
    }
    hex::encode(hasher.finalize())
}
