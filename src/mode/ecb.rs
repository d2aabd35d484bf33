use super::{check_lengths, BlockMode, Direction};
use crate::{BlockCipher, Result};

/// Electronic codebook: each block goes through the cipher on its own, so
/// equal plaintext blocks give equal ciphertext blocks.
#[derive(Debug, Clone)]
pub struct Ecb<C> {
    cipher: C,
    direction: Direction,
}

impl<C: BlockCipher> Ecb<C> {
    pub fn encrypter(cipher: C) -> Self {
        Self {
            cipher,
            direction: Direction::Encrypt,
        }
    }

    pub fn decrypter(cipher: C) -> Self {
        Self {
            cipher,
            direction: Direction::Decrypt,
        }
    }
}

impl<C: BlockCipher> BlockMode for Ecb<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn crypt_blocks(&mut self, dst: &mut [u8], src: &[u8]) -> Result<()> {
        let block_size = self.block_size();
        check_lengths(dst, src, block_size, true)?;
        dst.copy_from_slice(src);
        for block in dst.chunks_exact_mut(block_size) {
            match self.direction {
                Direction::Encrypt => self.cipher.encrypt_block(block),
                Direction::Decrypt => self.cipher.decrypt_block(block),
            }
        }
        Ok(())
    }
}
