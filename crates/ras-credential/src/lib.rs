//! `MakeCredential` — TCG TPM 2.0 Part 1 §24 / Part 3 §12.6, as run during
//! IK-certificate issuance.
//!
//! Given the EK public key, a credential secret, and the target IK's Name,
//! produces a blob that only a TPM holding the EK's private key can unwrap,
//! without the credential provider learning which TPM received it.

use hmac::{Hmac, Mac};
use ras_crypto::{asymmetric_encrypt, kdfa, symmetric_encrypt, AsymAlg, AsymMode, SymAlg, SymMode, IDENTITY_LABEL};
use ras_types::RasError;
use rsa::RsaPublicKey;
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Maximum credential size: the digest size of SHA-256.
pub const MAX_CREDENTIAL_LEN: usize = 32;
const SEED_LEN: usize = 32;

/// The wire output of `make_credential`: `(blob, enc_seed)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialBlob {
    /// `u16(len) ‖ HMAC-SHA256(hmac_key, encIdentity‖Name) ‖ encIdentity`.
    pub blob: Vec<u8>,
    /// `RSA-OAEP(EK_pub, seed, label="IDENTITY\0")`.
    pub enc_seed: Vec<u8>,
}

pub fn make_credential(
    ek_pub: &RsaPublicKey,
    credential: &[u8],
    name: &[u8],
) -> Result<CredentialBlob, RasError> {
    if credential.is_empty() || name.is_empty() || credential.len() > MAX_CREDENTIAL_LEN {
        return Err(RasError::Unsupported);
    }

    // step 1: size(uint16) + content
    let mut plaintext = Vec::with_capacity(2 + credential.len());
    plaintext.extend_from_slice(&(credential.len() as u16).to_be_bytes());
    plaintext.extend_from_slice(credential);

    // step 2-3: seed + encrypted seed
    let seed = Zeroizing::new(ras_crypto::get_random_bytes(SEED_LEN)?);
    let enc_seed = asymmetric_encrypt(
        AsymAlg::Rsa,
        AsymMode::Oaep,
        ek_pub,
        &seed,
        Some(IDENTITY_LABEL),
    )?;

    // step 4: symmetric key, CFB-encrypt the credential value with IV=0
    let sym_key = kdfa(&seed, "STORAGE", name, &[], 256)?;
    let enc_identity = symmetric_encrypt(SymAlg::Aes, SymMode::Cfb, &sym_key, None, &plaintext)?;

    // step 5-6: integrity HMAC over encIdentity || Name
    let hmac_key = kdfa(&seed, "INTEGRITY", &[], &[], 256)?;
    let mut mac = HmacSha256::new_from_slice(&hmac_key).map_err(|_| RasError::Unsupported)?;
    mac.update(&enc_identity);
    mac.update(name);
    let integrity = mac.finalize().into_bytes();

    // step 7: assemble wire blob
    let mut blob = Vec::with_capacity(2 + integrity.len() + enc_identity.len());
    blob.extend_from_slice(&(integrity.len() as u16).to_be_bytes());
    blob.extend_from_slice(&integrity);
    blob.extend_from_slice(&enc_identity);

    Ok(CredentialBlob { blob, enc_seed })
}
