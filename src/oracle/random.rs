// Random key material and the ECB/CBC coin-flip oracle used to score mode
// detection.
use rand::{Rng, RngCore};
use tracing::trace;

use crate::mode::{cbc_encrypt, ecb_encrypt, Mode};
use crate::{padding, Aes128Cipher, Result, AES_BLOCK_SIZE};

pub fn random_bytes<R: RngCore + ?Sized, const N: usize>(rng: &mut R) -> [u8; N] {
    let mut bytes = [0u8; N];
    rng.fill_bytes(&mut bytes);
    bytes
}

pub fn random_vec<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// Encrypts under a fresh random key each call, choosing ECB or CBC with
/// equal probability. Input is wrapped in 5-10 random bytes on each side.
///
/// The mode actually used is returned alongside the ciphertext so a detector
/// can be scored against it.
pub struct ModeOracle<R> {
    rng: R,
}

impl<R: Rng> ModeOracle<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn encrypt(&mut self, input: &[u8]) -> Result<(Vec<u8>, Mode)> {
        let key: [u8; AES_BLOCK_SIZE] = random_bytes(&mut self.rng);
        let cipher = Aes128Cipher::new(&key);

        let n_before = self.rng.gen_range(5..=10);
        let n_after = self.rng.gen_range(5..=10);
        let plaintext = [
            random_vec(&mut self.rng, n_before),
            input.to_vec(),
            random_vec(&mut self.rng, n_after),
        ]
        .concat();
        let padded = padding::pad(&plaintext, AES_BLOCK_SIZE)?;

        if self.rng.gen_bool(0.5) {
            trace!(n_before, n_after, "encrypting with ECB");
            Ok((ecb_encrypt(&cipher, &padded)?, Mode::Ecb))
        } else {
            trace!(n_before, n_after, "encrypting with CBC");
            let iv: [u8; AES_BLOCK_SIZE] = random_bytes(&mut self.rng);
            Ok((cbc_encrypt(&cipher, &iv, &padded)?, Mode::Cbc))
        }
    }
}
