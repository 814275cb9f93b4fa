//! The TPM hardware access boundary.
//!
//! This crate specifies only what a concrete TPM HAL must supply to the
//! rest of the RAS core: an EK public key and certificate, and an IK's
//! public area and Name. `ras-credential` and `ras-trustmgr` never depend
//! on this crate directly — they operate on the bytes these traits
//! produce, received over whatever RPC transport wires them up. The
//! `tss-backend` feature keeps one real implementation around as a
//! demonstration of the contract; it is not production HAL code.

use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum TpmHalError {
    #[error("no TPM device detected")]
    NoDevice,
    #[error("TPM operation failed: {0}")]
    Operation(String),
    #[error("endorsement key is not an RSA key; only RSA endorsement keys are supported")]
    NotRsa,
}

/// Supplies the endorsement key material a credential provider needs to
/// run `MakeCredential`.
pub trait EndorsementKeySource {
    /// DER-encoded RSA SubjectPublicKeyInfo of the EK.
    fn ek_public_key_der(&self) -> Result<Zeroizing<Vec<u8>>, TpmHalError>;
    /// The EK certificate, as issued by the TPM/platform manufacturer.
    fn ek_certificate(&self) -> Result<Vec<u8>, TpmHalError>;
}

/// Supplies the identity-key material named in an IK certificate issuance
/// request.
pub trait IdentityKeySource {
    /// Marshaled TPM public area of the IK.
    fn ik_public_area(&self) -> Result<Vec<u8>, TpmHalError>;
    /// The TPM object Name: `u16(alg) ‖ H_alg(public_area)`.
    fn ik_name(&self) -> Result<Vec<u8>, TpmHalError>;
}

#[cfg(feature = "tss-backend")]
pub mod tss_backend;
