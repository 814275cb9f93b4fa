//! TCG counter-mode KDF (`KDFa`), TPM 2.0 Part 1 §11.4.10.2.
//!
//! Bit-accurate with the TPM firmware implementation: the counter is a
//! 32-bit big-endian value starting at 1, the label is followed by a zero
//! octet only when non-empty, and truncation clears the *upper* bits of the
//! most-significant output octet rather than shifting them out.

use hmac::{Hmac, Mac};
use ras_types::RasError;
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

const MAX_BUF_LEN: usize = i16::MAX as usize;

/// `kdfa(hash, key, label, contextU, contextV, bits)` — only SHA-256 is
/// wired up, matching every call site in the credential-activation
/// protocol. The output is always key material, so it comes back wrapped
/// in `Zeroizing`.
pub fn kdfa(
    key: &[u8],
    label: &str,
    context_u: &[u8],
    context_v: &[u8],
    bits: u32,
) -> Result<Zeroizing<Vec<u8>>, RasError> {
    let buf_len = ((bits as usize) + 7) / 8;
    if buf_len > MAX_BUF_LEN {
        return Err(RasError::Unsupported);
    }

    let mut buf = Zeroizing::new(Vec::with_capacity(buf_len + 32));
    let mut counter: u32 = 1;
    while buf.len() < buf_len {
        let mut mac = HmacSha256::new_from_slice(key).map_err(|_| RasError::Unsupported)?;
        mac.update(&counter.to_be_bytes());
        if !label.is_empty() {
            mac.update(label.as_bytes());
            mac.update(&[0u8]);
        }
        mac.update(context_u);
        mac.update(context_v);
        mac.update(&bits.to_be_bytes());
        buf.extend_from_slice(&mac.finalize().into_bytes());
        counter += 1;
    }
    buf.truncate(buf_len);

    let mask = (bits % 8) as u8;
    if mask > 0 {
        buf[0] &= (1u8 << mask) - 1;
    }
    Ok(buf)
}
