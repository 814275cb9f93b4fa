use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use ras_types::{RasError, CMD_GET_REPORT};
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use subtle::ConstantTimeEq;

/// Per-client runtime state (`CacheEntry`), not persisted.
///
/// All mutable fields share a single lock: commands, expirations, and the
/// nonce are updated together often enough (every heartbeat) that splitting
/// them into per-field locks would only add overhead without reducing
/// cross-client contention, which is the property that matters — per-entry
/// locking, not per-field.
pub struct CacheEntry {
    inner: Mutex<Inner>,
}

struct Inner {
    reg_time: DateTime<Utc>,
    ik_cert_pem: String,
    ik_public_key: Option<RsaPublicKey>,
    online: bool,
    trusted: bool,
    commands: u64,
    hb_expiration: Instant,
    trust_expiration: Instant,
    nonce: Option<u64>,
}

impl CacheEntry {
    pub fn new(reg_time: DateTime<Utc>, ik_cert_pem: impl Into<String>) -> Self {
        let ik_cert_pem = ik_cert_pem.into();
        let ik_public_key = parse_ik_public_key(&ik_cert_pem);
        let now = Instant::now();
        CacheEntry {
            inner: Mutex::new(Inner {
                reg_time,
                ik_cert_pem,
                ik_public_key,
                online: false,
                trusted: false,
                commands: 0,
                hb_expiration: now,
                trust_expiration: now,
                nonce: None,
            }),
        }
    }

    /// Builds a cache entry around an already-parsed IK public key, skipping
    /// the PEM parse in [`CacheEntry::new`]. Useful where the certificate was
    /// already decoded upstream (e.g. registration's uniqueness check) and in
    /// tests that construct a key without a full certificate chain.
    pub fn with_public_key(
        reg_time: DateTime<Utc>,
        ik_cert_pem: impl Into<String>,
        ik_public_key: RsaPublicKey,
    ) -> Self {
        let now = Instant::now();
        CacheEntry {
            inner: Mutex::new(Inner {
                reg_time,
                ik_cert_pem: ik_cert_pem.into(),
                ik_public_key: Some(ik_public_key),
                online: false,
                trusted: false,
                commands: 0,
                hb_expiration: now,
                trust_expiration: now,
                nonce: None,
            }),
        }
    }

    pub fn reg_time(&self) -> DateTime<Utc> {
        self.inner.lock().reg_time
    }

    pub fn ik_cert_pem(&self) -> String {
        self.inner.lock().ik_cert_pem.clone()
    }

    /// Returns the parsed RSA public key of the IK certificate, or
    /// `IKCertNull` if the cached certificate failed to parse.
    pub fn ik_public_key(&self) -> Result<RsaPublicKey, RasError> {
        self.inner
            .lock()
            .ik_public_key
            .clone()
            .ok_or(RasError::IKCertNull)
    }

    pub fn online(&self) -> bool {
        self.inner.lock().online
    }

    pub fn set_online(&self, online: bool) {
        self.inner.lock().online = online;
    }

    pub fn trusted(&self) -> bool {
        self.inner.lock().trusted
    }

    pub fn set_trusted(&self, trusted: bool) {
        self.inner.lock().trusted = trusted;
    }

    pub fn set_commands(&self, mask: u64) {
        self.inner.lock().commands |= mask;
    }

    pub fn clear_commands(&self) {
        self.inner.lock().commands = 0;
    }

    pub fn commands(&self) -> u64 {
        self.inner.lock().commands
    }

    /// Sets `hb_expiration = now + hb_duration`. If the trust expiration has
    /// already passed, sets the `GET_REPORT` command bit so the next
    /// heartbeat forces a fresh report. Refreshes the nonce.
    ///
    /// `trust_duration` is accepted to mirror the manager's call site
    /// (`handle_heartbeat` always has both durations on hand) but only
    /// `update_trust_report` ever advances `trust_expiration`.
    pub fn update_heartbeat(&self, hb_duration: Duration, _trust_duration: Duration) -> u64 {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        inner.hb_expiration = now + hb_duration;
        if now >= inner.trust_expiration {
            inner.commands |= CMD_GET_REPORT;
        }
        drop(inner);
        self.create_nonce()
    }

    pub fn update_trust_report(&self, trust_duration: Duration) {
        self.inner.lock().trust_expiration = Instant::now() + trust_duration;
    }

    pub fn is_heartbeat_expired(&self) -> bool {
        Instant::now() >= self.inner.lock().hb_expiration
    }

    pub fn is_report_valid(&self) -> bool {
        Instant::now() < self.inner.lock().trust_expiration
    }

    /// Draws 8 random bytes, interprets them as a big-endian `u64`, stores
    /// and returns it.
    pub fn create_nonce(&self) -> u64 {
        let bytes = ras_crypto::get_random_bytes(8).unwrap_or_else(|_| vec![0u8; 8]);
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes);
        let nonce = u64::from_be_bytes(buf);
        self.inner.lock().nonce = Some(nonce);
        nonce
    }

    pub fn nonce(&self) -> Option<u64> {
        self.inner.lock().nonce
    }

    /// Constant-time comparison against the stored nonce. Consumes the
    /// stored nonce on a match, so a replay of the same value fails.
    pub fn compare_nonce(&self, candidate: u64) -> bool {
        let mut inner = self.inner.lock();
        match inner.nonce {
            Some(stored) => {
                let matches: bool = stored.to_be_bytes().ct_eq(&candidate.to_be_bytes()).into();
                if matches {
                    inner.nonce = None;
                }
                matches
            }
            None => false,
        }
    }
}

fn parse_ik_public_key(pem: &str) -> Option<RsaPublicKey> {
    let (_, cert) = x509_parser::pem::parse_x509_pem(pem.as_bytes()).ok()?;
    let cert = cert.parse_x509().ok()?;
    let spki_der = cert.public_key().raw;
    RsaPublicKey::from_public_key_der(spki_der).ok()
}
