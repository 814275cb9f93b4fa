//! Asymmetric encrypt/decrypt dispatch. RSA only; EC endorsement keys are
//! out of scope.

use rand::rngs::OsRng;
use ras_types::RasError;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsymAlg {
    Rsa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsymMode {
    Oaep,
    Pkcs1v15,
}

/// The OAEP label `MakeCredential` uses for the seed-wrapping step: the
/// ASCII bytes `"IDENTITY"` followed by a zero byte.
pub const IDENTITY_LABEL: &[u8] = b"IDENTITY\0";

pub fn asymmetric_encrypt(
    alg: AsymAlg,
    mode: AsymMode,
    pub_key: &RsaPublicKey,
    plaintext: &[u8],
    label: Option<&[u8]>,
) -> Result<Vec<u8>, RasError> {
    let AsymAlg::Rsa = alg;
    match mode {
        AsymMode::Oaep => {
            let padding = match label {
                Some(l) => Oaep::new_with_label::<Sha256, _>(l),
                None => Oaep::new::<Sha256>(),
            };
            pub_key
                .encrypt(&mut OsRng, padding, plaintext)
                .map_err(|_| RasError::Unsupported)
        }
        AsymMode::Pkcs1v15 => pub_key
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
            .map_err(|_| RasError::Unsupported),
    }
}

pub fn asymmetric_decrypt(
    alg: AsymAlg,
    mode: AsymMode,
    priv_key: &RsaPrivateKey,
    ciphertext: &[u8],
    label: Option<&[u8]>,
) -> Result<Vec<u8>, RasError> {
    let AsymAlg::Rsa = alg;
    match mode {
        AsymMode::Oaep => {
            let padding = match label {
                Some(l) => Oaep::new_with_label::<Sha256, _>(l),
                None => Oaep::new::<Sha256>(),
            };
            priv_key
                .decrypt(padding, ciphertext)
                .map_err(|_| RasError::Unsupported)
        }
        AsymMode::Pkcs1v15 => priv_key
            .decrypt(Pkcs1v15Encrypt, ciphertext)
            .map_err(|_| RasError::Unsupported),
    }
}
