// The block cipher primitive the modes are built over.
//
// The modes never look inside the cipher: they only ask it to encrypt or
// decrypt one block in place. `Aes128Cipher` adapts the `aes` crate to that
// interface; anything else with a fixed block size can be dropped in.
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};

pub const AES_BLOCK_SIZE: usize = 16;

pub trait BlockCipher {
    fn block_size(&self) -> usize;

    /// Encrypt exactly one block in place.
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypt exactly one block in place.
    fn decrypt_block(&self, block: &mut [u8]);
}

impl<T: BlockCipher + ?Sized> BlockCipher for &T {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        (**self).decrypt_block(block)
    }
}

#[derive(Clone)]
pub struct Aes128Cipher {
    inner: aes::Aes128,
}

impl Aes128Cipher {
    pub fn new(key: &[u8; AES_BLOCK_SIZE]) -> Self {
        Self {
            inner: aes::Aes128::new(GenericArray::from_slice(key)),
        }
    }
}

impl BlockCipher for Aes128Cipher {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), AES_BLOCK_SIZE);
        self.inner.encrypt_block(GenericArray::from_mut_slice(block));
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), AES_BLOCK_SIZE);
        self.inner.decrypt_block(GenericArray::from_mut_slice(block));
    }
}

impl std::fmt::Debug for Aes128Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("Aes128Cipher").finish_non_exhaustive()
    }
}
