// CBC padding oracle attack.
//
// CBC decryption of a block is P_i = D(C_i) ⊕ C_{i-1}. Send C_i on its own
// with a forged IV block X in place of C_{i-1}, and the oracle decrypts
//
//                     P' = D(C_i) ⊕ X.
//
// D(C_i) is the "intermediate" block. Working from the last byte back, pick
// X so the bytes already solved decrypt to the target pad value n, and try
// all 256 values for the byte before them until the oracle accepts the
// padding. Then P'[j] = n, so D(C_i)[j] = X[j] ⊕ n. Once the whole
// intermediate block is known, the real plaintext is
//
//                 P_i[j] = D(C_i)[j] ⊕ C_{i-1}[j].
//
// For the last byte of a block the oracle may also accept padding that is
// longer than one byte, e.g. \x02\x02 when the second-to-last byte of P' is
// already \x02. To rule that out, a hit on the last byte is re-checked with the
// second-to-last byte of X changed: a genuine \x01 stays valid, a longer
// padding breaks.
use tracing::{debug, instrument};

use super::find_candidate;
use crate::oracle::PaddingOracle;
use crate::xor::xor_bytes;
use crate::{AttackConfig, Error, Result};

pub struct PaddingOracleAttack<'a, O: ?Sized> {
    oracle: &'a O,
    config: AttackConfig,
}

impl<'a, O: PaddingOracle + Sync + ?Sized> PaddingOracleAttack<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self {
            oracle,
            config: AttackConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AttackConfig) -> Self {
        self.config = config;
        self
    }

    /// Recover the padded plaintext of `ciphertext`, which was encrypted
    /// with `iv`.
    #[instrument(skip_all, fields(len = ciphertext.len()))]
    pub fn recover(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let block_size = self.oracle.block_size();
        if block_size == 0 || iv.len() != block_size || ciphertext.len() % block_size != 0 {
            return Err(Error::InvalidLength {
                len: ciphertext.len(),
                block_size,
            });
        }
        let blocks: Vec<&[u8]> = std::iter::once(iv)
            .chain(ciphertext.chunks_exact(block_size))
            .collect();

        let mut recovered: Vec<Vec<u8>> = Vec::with_capacity(blocks.len() - 1);
        for block_idx in (1..blocks.len()).rev() {
            let plaintext = self.recover_block(blocks[block_idx - 1], blocks[block_idx], block_idx - 1)?;
            debug!(block = block_idx - 1, "recovered block");
            recovered.push(plaintext);
        }
        recovered.reverse();
        Ok(recovered.concat())
    }

    fn recover_block(&self, previous: &[u8], target: &[u8], block_idx: usize) -> Result<Vec<u8>> {
        let block_size = target.len();
        let mut intermediate = vec![0u8; block_size];

        for byte_idx in (0..block_size).rev() {
            let pad = (block_size - byte_idx) as u8;
            let mut forced_iv = previous.to_vec();
            for j in (byte_idx + 1)..block_size {
                forced_iv[j] = intermediate[j] ^ pad;
            }

            let found = find_candidate(self.config.parallel, |candidate| {
                let mut iv = forced_iv.clone();
                iv[byte_idx] = candidate;
                if !self.oracle.padding_valid(&iv, target)? {
                    return Ok(false);
                }
                if byte_idx == block_size - 1 && block_size > 1 {
                    iv[block_size - 2] ^= 0x01;
                    return self.oracle.padding_valid(&iv, target);
                }
                Ok(true)
            })?
            .ok_or(Error::OracleExhausted {
                block: block_idx,
                byte: byte_idx,
            })?;

            intermediate[byte_idx] = found ^ pad;
        }

        xor_bytes(&intermediate, previous)
    }
}

/// Recover the padded plaintext of a CBC ciphertext using only a padding
/// oracle.
pub fn cbc_padding_oracle_attack<O: PaddingOracle + Sync + ?Sized>(
    ciphertext: &[u8],
    iv: &[u8],
    oracle: &O,
) -> Result<Vec<u8>> {
    PaddingOracleAttack::new(oracle).recover(iv, ciphertext)
}
