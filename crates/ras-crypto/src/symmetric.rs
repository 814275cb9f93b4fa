//! Symmetric encrypt/decrypt dispatch.
//!
//! `alg` is always AES; `mode` selects CBC/CFB/OFB/CTR. An absent `iv` is
//! treated as a block of zeros — required by the credential-activation
//! protocol, which fixes `IV = 0` for the CFB step of `MakeCredential`.

use aes::cipher::{
    generic_array::GenericArray, AsyncStreamCipher, BlockDecrypt, BlockEncrypt, KeyInit,
    KeyIvInit, StreamCipher,
};
use aes::{Aes128, Aes192, Aes256};
use ras_types::RasError;

use crate::pkcs7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymAlg {
    Aes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymMode {
    Cbc,
    Cfb,
    Ofb,
    Ctr,
}

const BLOCK_SIZE: usize = 16;

fn zero_iv() -> [u8; BLOCK_SIZE] {
    [0u8; BLOCK_SIZE]
}

fn resolve_iv(iv: Option<&[u8]>) -> Result<[u8; BLOCK_SIZE], RasError> {
    match iv {
        None => Ok(zero_iv()),
        Some(v) if v.len() == BLOCK_SIZE => {
            let mut out = [0u8; BLOCK_SIZE];
            out.copy_from_slice(v);
            Ok(out)
        }
        Some(_) => Err(RasError::Unsupported),
    }
}

macro_rules! cbc_chain {
    ($key:expr, $iv:expr, $data:expr, $cipher:ty, $encrypt:expr) => {{
        let cipher = <$cipher>::new_from_slice($key).map_err(|_| RasError::Unsupported)?;
        let mut prev = GenericArray::clone_from_slice(&$iv);
        let mut out = Vec::with_capacity($data.len());
        for chunk in $data.chunks(BLOCK_SIZE) {
            let mut block = GenericArray::clone_from_slice(chunk);
            if $encrypt {
                for (b, p) in block.iter_mut().zip(prev.iter()) {
                    *b ^= p;
                }
                cipher.encrypt_block(&mut block);
                prev = block;
            } else {
                let ct = block;
                cipher.decrypt_block(&mut block);
                for (b, p) in block.iter_mut().zip(prev.iter()) {
                    *b ^= p;
                }
                prev = ct;
            }
            out.extend_from_slice(&block);
        }
        out
    }};
}

fn cbc_encrypt_blocks(key: &[u8], iv: [u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>, RasError> {
    match key.len() {
        16 => Ok(cbc_chain!(key, iv, data, Aes128, true)),
        24 => Ok(cbc_chain!(key, iv, data, Aes192, true)),
        32 => Ok(cbc_chain!(key, iv, data, Aes256, true)),
        _ => Err(RasError::Unsupported),
    }
}

fn cbc_decrypt_blocks(key: &[u8], iv: [u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>, RasError> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(RasError::Unsupported);
    }
    match key.len() {
        16 => Ok(cbc_chain!(key, iv, data, Aes128, false)),
        24 => Ok(cbc_chain!(key, iv, data, Aes192, false)),
        32 => Ok(cbc_chain!(key, iv, data, Aes256, false)),
        _ => Err(RasError::Unsupported),
    }
}

macro_rules! stream_apply {
    ($cipher_ty:ty, $key:expr, $iv:expr, $data:expr) => {{
        let mut cipher =
            <$cipher_ty>::new_from_slices($key, &$iv).map_err(|_| RasError::Unsupported)?;
        let mut buf = $data.to_vec();
        cipher.apply_keystream(&mut buf);
        buf
    }};
}

// CFB is an asynchronous stream cipher (`AsyncStreamCipher::encrypt`/`decrypt`,
// consuming `self`), not a `StreamCipher` with `apply_keystream` — it needs its
// own macro, separate from `stream_apply!`.
macro_rules! cfb_apply_async {
    ($cipher_ty:ty, $key:expr, $iv:expr, $data:expr, $method:ident) => {{
        let cipher = <$cipher_ty>::new_from_slices($key, &$iv).map_err(|_| RasError::Unsupported)?;
        let mut buf = $data.to_vec();
        cipher.$method(&mut buf);
        buf
    }};
}

fn cfb_apply(key: &[u8], iv: [u8; BLOCK_SIZE], data: &[u8], encrypt: bool) -> Result<Vec<u8>, RasError> {
    match (key.len(), encrypt) {
        (16, true) => Ok(cfb_apply_async!(cfb_mode::Encryptor<Aes128>, key, iv, data, encrypt)),
        (16, false) => Ok(cfb_apply_async!(cfb_mode::Decryptor<Aes128>, key, iv, data, decrypt)),
        (24, true) => Ok(cfb_apply_async!(cfb_mode::Encryptor<Aes192>, key, iv, data, encrypt)),
        (24, false) => Ok(cfb_apply_async!(cfb_mode::Decryptor<Aes192>, key, iv, data, decrypt)),
        (32, true) => Ok(cfb_apply_async!(cfb_mode::Encryptor<Aes256>, key, iv, data, encrypt)),
        (32, false) => Ok(cfb_apply_async!(cfb_mode::Decryptor<Aes256>, key, iv, data, decrypt)),
        _ => Err(RasError::Unsupported),
    }
}

fn ofb_apply(key: &[u8], iv: [u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>, RasError> {
    match key.len() {
        16 => Ok(stream_apply!(ofb::Ofb<Aes128>, key, iv, data)),
        24 => Ok(stream_apply!(ofb::Ofb<Aes192>, key, iv, data)),
        32 => Ok(stream_apply!(ofb::Ofb<Aes256>, key, iv, data)),
        _ => Err(RasError::Unsupported),
    }
}

fn ctr_apply(key: &[u8], iv: [u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>, RasError> {
    match key.len() {
        16 => Ok(stream_apply!(ctr::Ctr128BE<Aes128>, key, iv, data)),
        24 => Ok(stream_apply!(ctr::Ctr128BE<Aes192>, key, iv, data)),
        32 => Ok(stream_apply!(ctr::Ctr128BE<Aes256>, key, iv, data)),
        _ => Err(RasError::Unsupported),
    }
}

/// Encrypt `plaintext` with `(alg, mode)`; CBC pads with PKCS#7, the stream
/// modes are length-preserving.
pub fn symmetric_encrypt(
    alg: SymAlg,
    mode: SymMode,
    key: &[u8],
    iv: Option<&[u8]>,
    plaintext: &[u8],
) -> Result<Vec<u8>, RasError> {
    let SymAlg::Aes = alg;
    let iv = resolve_iv(iv)?;
    match mode {
        SymMode::Cbc => {
            let padded = pkcs7::pad(plaintext, BLOCK_SIZE);
            cbc_encrypt_blocks(key, iv, &padded)
        }
        SymMode::Cfb => cfb_apply(key, iv, plaintext, true),
        SymMode::Ofb => ofb_apply(key, iv, plaintext),
        SymMode::Ctr => ctr_apply(key, iv, plaintext),
    }
}

/// Decrypt `ciphertext` with `(alg, mode)`, inverse of [`symmetric_encrypt`].
pub fn symmetric_decrypt(
    alg: SymAlg,
    mode: SymMode,
    key: &[u8],
    iv: Option<&[u8]>,
    ciphertext: &[u8],
) -> Result<Vec<u8>, RasError> {
    let SymAlg::Aes = alg;
    let iv = resolve_iv(iv)?;
    match mode {
        SymMode::Cbc => {
            let padded = cbc_decrypt_blocks(key, iv, ciphertext)?;
            pkcs7::unpad(&padded)
        }
        SymMode::Cfb => cfb_apply(key, iv, ciphertext, false),
        SymMode::Ofb => ofb_apply(key, iv, ciphertext),
        SymMode::Ctr => ctr_apply(key, iv, ciphertext),
    }
}
