// Cipher block chaining.
//
//     C_i = E(P_i ⊕ C_{i-1}),    P_i = D(C_i) ⊕ C_{i-1},    C_{-1} = IV
//
// Decrypting block i needs only C_i and C_{i-1}, which is what lets an
// attacker steer a single plaintext block by rewriting the block before it.
use super::{check_lengths, BlockMode, Direction};
use crate::xor::xor_in_place;
use crate::{BlockCipher, Error, Result};

#[derive(Debug, Clone)]
pub struct Cbc<C> {
    cipher: C,
    direction: Direction,
    // The previous ciphertext block, or the IV before the first block.
    chain: Vec<u8>,
}

impl<C: BlockCipher> Cbc<C> {
    pub fn encrypter(cipher: C, iv: &[u8]) -> Result<Self> {
        Self::new(cipher, iv, Direction::Encrypt)
    }

    pub fn decrypter(cipher: C, iv: &[u8]) -> Result<Self> {
        Self::new(cipher, iv, Direction::Decrypt)
    }

    fn new(cipher: C, iv: &[u8], direction: Direction) -> Result<Self> {
        if iv.len() != cipher.block_size() {
            return Err(Error::InvalidLength {
                len: iv.len(),
                block_size: cipher.block_size(),
            });
        }
        Ok(Self {
            cipher,
            direction,
            chain: iv.to_vec(),
        })
    }
}

impl<C: BlockCipher> BlockMode for Cbc<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn crypt_blocks(&mut self, dst: &mut [u8], src: &[u8]) -> Result<()> {
        let block_size = self.block_size();
        check_lengths(dst, src, block_size, true)?;
        for (out, block) in dst
            .chunks_exact_mut(block_size)
            .zip(src.chunks_exact(block_size))
        {
            out.copy_from_slice(block);
            match self.direction {
                Direction::Encrypt => {
                    xor_in_place(out, &self.chain);
                    self.cipher.encrypt_block(out);
                    self.chain.copy_from_slice(out);
                }
                Direction::Decrypt => {
                    self.cipher.decrypt_block(out);
                    xor_in_place(out, &self.chain);
                    self.chain.copy_from_slice(block);
                }
            }
        }
        Ok(())
    }
}
