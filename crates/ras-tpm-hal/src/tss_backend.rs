//! One real [`EndorsementKeySource`]/[`IdentityKeySource`] implementation:
//! detect a TPM device, open a `tss-esapi` context, read a persistent
//! object's public area, and decode it to DER. Illustrative of the HAL
//! contract only — see the module-level docs in `lib.rs`.

use std::str::FromStr;

use tss_esapi::abstraction::public::DecodedKey;
use tss_esapi::handles::TpmHandle;
use tss_esapi::tcti_ldr::TctiNameConf;
use tss_esapi::Context as TpmContext;
use zeroize::Zeroizing;

use crate::{EndorsementKeySource, IdentityKeySource, TpmHalError};

const DEFAULT_TPM_DEVICE: &str = "/dev/tpm0";

pub fn detect_platform(device: &str) -> bool {
    std::path::Path::new(device).exists()
}

/// Reads the EK and a persisted IK from real TPM handles via `tss-esapi`.
pub struct TssTpmSource {
    device: String,
    ek_handle: u32,
    ik_handle: u32,
}

impl TssTpmSource {
    pub fn new(ek_handle: u32, ik_handle: u32) -> Self {
        TssTpmSource {
            device: DEFAULT_TPM_DEVICE.to_string(),
            ek_handle,
            ik_handle,
        }
    }

    fn read_public_der(&self, handle: u32) -> Result<Vec<u8>, TpmHalError> {
        let tcti = TctiNameConf::from_str(&format!("device:{}", self.device))
            .map_err(|e| TpmHalError::Operation(e.to_string()))?;
        let mut ctx = TpmContext::new(tcti).map_err(|e| TpmHalError::Operation(e.to_string()))?;

        let tpm_handle: TpmHandle = handle
            .try_into()
            .map_err(|_| TpmHalError::Operation("invalid persistent handle".into()))?;

        let obj = ctx
            .execute_with_nullauth_session(|ctx| ctx.tr_from_tpm_public(tpm_handle))
            .map_err(|e| TpmHalError::Operation(e.to_string()))?;

        let (public, _, _) = ctx
            .read_public(obj.into())
            .map_err(|e| TpmHalError::Operation(e.to_string()))?;

        let decoded: DecodedKey = public
            .try_into()
            .map_err(|_| TpmHalError::Operation("failed to decode public area".into()))?;

        let DecodedKey::RsaPublicKey(rsa_pk) = decoded else {
            return Err(TpmHalError::NotRsa);
        };

        let spki = picky_asn1_x509::SubjectPublicKeyInfo::new_rsa_key(
            rsa_pk.modulus,
            rsa_pk.public_exponent,
        );
        picky_asn1_der::to_vec(&spki)
            .map_err(|e| TpmHalError::Operation(format!("DER encode failed: {e}")))
    }
}

impl EndorsementKeySource for TssTpmSource {
    fn ek_public_key_der(&self) -> Result<Zeroizing<Vec<u8>>, TpmHalError> {
        self.read_public_der(self.ek_handle).map(Zeroizing::new)
    }

    fn ek_certificate(&self) -> Result<Vec<u8>, TpmHalError> {
        // NV-index readout of the manufacturer-issued EK certificate is a
        // separate TPM2_NV_Read flow; out of scope for this boundary demo.
        Err(TpmHalError::Operation(
            "EK certificate readout is not implemented by this reference backend".into(),
        ))
    }
}

impl IdentityKeySource for TssTpmSource {
    fn ik_public_area(&self) -> Result<Vec<u8>, TpmHalError> {
        self.read_public_der(self.ik_handle)
    }

    fn ik_name(&self) -> Result<Vec<u8>, TpmHalError> {
        Err(TpmHalError::Operation(
            "Name computation requires the raw TPMT_PUBLIC marshal, not the decoded form"
                .into(),
        ))
    }
}
