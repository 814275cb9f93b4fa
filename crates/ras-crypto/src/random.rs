//! Cryptographically secure random byte generation.

use rand::RngCore;
use ras_types::RasError;

pub fn get_random_bytes(size: usize) -> Result<Vec<u8>, RasError> {
    let mut buf = vec![0u8; size];
    rand::rngs::OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|_| RasError::Unsupported)?;
    Ok(buf)
}
