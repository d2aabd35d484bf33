// PKCS#7 padding and validation.
//
// The pad value is the number of pad bytes added, from 1 up to the block
// size. Aligned input gets a whole extra block, so padding is never empty
// and can always be stripped unambiguously.
use crate::{Error, Result};

pub fn pad(bytes: &[u8], block_size: usize) -> Result<Vec<u8>> {
    if block_size == 0 || block_size > u8::MAX as usize {
        return Err(Error::InvalidLength {
            len: bytes.len(),
            block_size,
        });
    }
    let n_pad = block_size - (bytes.len() % block_size);
    let mut out = Vec::with_capacity(bytes.len() + n_pad);
    out.extend_from_slice(bytes);
    out.resize(bytes.len() + n_pad, n_pad as u8);
    Ok(out)
}

/// Check the padding on the final block of `bytes`, returning the pad length.
///
/// `bytes` must be a non-empty multiple of `block_size`. Only the final byte
/// and the run it declares are examined.
pub fn validate(bytes: &[u8], block_size: usize) -> Result<usize> {
    if block_size == 0 || bytes.is_empty() || bytes.len() % block_size != 0 {
        return Err(Error::InvalidLength {
            len: bytes.len(),
            block_size,
        });
    }
    let n_pad = bytes[bytes.len() - 1] as usize;
    if n_pad == 0 || n_pad > block_size {
        return Err(Error::InvalidPadding);
    }
    if bytes[(bytes.len() - n_pad)..]
        .iter()
        .all(|&b| b as usize == n_pad)
    {
        Ok(n_pad)
    } else {
        Err(Error::InvalidPadding)
    }
}

pub fn is_valid(bytes: &[u8], block_size: usize) -> bool {
    validate(bytes, block_size).is_ok()
}

pub fn unpad(bytes: &mut Vec<u8>, block_size: usize) -> Result<()> {
    let n_pad = validate(bytes, block_size)?;
    bytes.truncate(bytes.len() - n_pad);
    Ok(())
}
