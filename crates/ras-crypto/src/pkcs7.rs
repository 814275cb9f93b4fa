//! PKCS#7 padding, exposed standalone for callers that need it without a
//! full block-cipher round trip.

use ras_types::RasError;

pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - (data.len() % block_size);
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.extend(std::iter::repeat(pad_len as u8).take(pad_len));
    out
}

pub fn unpad(data: &[u8]) -> Result<Vec<u8>, RasError> {
    let n = data.len();
    if n == 0 {
        return Err(RasError::Unsupported);
    }
    let pad_len = data[n - 1] as usize;
    if pad_len == 0 || pad_len > n {
        return Err(RasError::Unsupported);
    }
    Ok(data[..n - pad_len].to_vec())
}
