use crate::{Error, Result};

pub fn xor_bytes(buf_a: &[u8], buf_b: &[u8]) -> Result<Vec<u8>> {
    if buf_a.len() != buf_b.len() {
        return Err(Error::LengthMismatch {
            left: buf_a.len(),
            right: buf_b.len(),
        });
    }
    Ok(buf_a.iter().zip(buf_b.iter()).map(|(a, b)| a ^ b).collect())
}

/// XOR `src` into `dst`, stopping at the end of the shorter of the two.
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= s);
}
