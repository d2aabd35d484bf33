// Block cipher modes of operation.
//
// Every mode implements `BlockMode`: it owns whatever chaining state it needs
// (previous ciphertext block for CBC, counter and keystream position for
// CTR) and transforms `src` into `dst`. ECB and CBC only accept whole blocks;
// CTR is a stream cipher and takes any length.
mod cbc;
mod ctr;
mod ecb;

pub use cbc::Cbc;
pub use ctr::{Ctr, NONCE_LEN};
pub use ecb::Ecb;

use crate::{BlockCipher, Error, Result};

/// What repeated ciphertext blocks can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ecb,
    /// Any chained or stream mode; from the outside CBC and CTR look alike.
    Cbc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

pub trait BlockMode {
    fn block_size(&self) -> usize;

    /// Transform `src` into `dst`, continuing from the current chaining state.
    fn crypt_blocks(&mut self, dst: &mut [u8], src: &[u8]) -> Result<()>;

    fn crypt(&mut self, src: &[u8]) -> Result<Vec<u8>> {
        let mut dst = vec![0u8; src.len()];
        self.crypt_blocks(&mut dst, src)?;
        Ok(dst)
    }
}

pub fn ecb_encrypt<C: BlockCipher>(cipher: C, plaintext: &[u8]) -> Result<Vec<u8>> {
    Ecb::encrypter(cipher).crypt(plaintext)
}

pub fn ecb_decrypt<C: BlockCipher>(cipher: C, ciphertext: &[u8]) -> Result<Vec<u8>> {
    Ecb::decrypter(cipher).crypt(ciphertext)
}

pub fn cbc_encrypt<C: BlockCipher>(cipher: C, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    Cbc::encrypter(cipher, iv)?.crypt(plaintext)
}

pub fn cbc_decrypt<C: BlockCipher>(cipher: C, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    Cbc::decrypter(cipher, iv)?.crypt(ciphertext)
}

/// CTR is its own inverse, so this both encrypts and decrypts.
pub fn ctr<C: BlockCipher>(cipher: C, nonce: &[u8; NONCE_LEN], message: &[u8]) -> Result<Vec<u8>> {
    Ctr::new(cipher, *nonce)?.crypt(message)
}

fn check_lengths(dst: &[u8], src: &[u8], block_size: usize, aligned: bool) -> Result<()> {
    if dst.len() != src.len() {
        return Err(Error::LengthMismatch {
            left: dst.len(),
            right: src.len(),
        });
    }
    if aligned && src.len() % block_size != 0 {
        return Err(Error::InvalidLength {
            len: src.len(),
            block_size,
        });
    }
    Ok(())
}
