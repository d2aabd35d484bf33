// Counter mode.
//
//         nonce|counter0                nonce|counter1
//              ↓                             ↓
//     key → < E >                   key → < E >
//              ↓                             ↓                 ...
// plaintext →  ⊕               plaintext  →  ⊕
//              ↓                             ↓
//          ciphertext                    ciphertext
//
// The counter block is the 8-byte nonce followed by a 64-bit little-endian
// block counter starting at zero. Each keystream block depends only on
// (key, nonce, counter), so any offset can be reached without touching the
// bytes before it.
use super::{check_lengths, BlockMode};
use crate::{BlockCipher, Error, Result};

pub const NONCE_LEN: usize = 8;
const COUNTER_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct Ctr<C> {
    cipher: C,
    nonce: [u8; NONCE_LEN],
    // Counter of the next keystream block to generate.
    counter: u64,
    keystream: Vec<u8>,
    // Bytes of `keystream` already consumed.
    used: usize,
}

impl<C: BlockCipher> Ctr<C> {
    pub fn new(cipher: C, nonce: [u8; NONCE_LEN]) -> Result<Self> {
        Self::with_counter(cipher, nonce, 0)
    }

    pub fn with_counter(cipher: C, nonce: [u8; NONCE_LEN], counter: u64) -> Result<Self> {
        let block_size = cipher.block_size();
        if block_size != NONCE_LEN + COUNTER_LEN {
            return Err(Error::InvalidLength {
                len: block_size,
                block_size: NONCE_LEN + COUNTER_LEN,
            });
        }
        Ok(Self {
            cipher,
            nonce,
            counter,
            keystream: vec![0u8; block_size],
            used: block_size,
        })
    }

    /// Counter of the next keystream block that will be generated.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Move the keystream to `offset` bytes from the start of the message.
    pub fn seek(&mut self, offset: u64) {
        let block_size = self.keystream.len() as u64;
        self.counter = offset / block_size;
        self.used = self.keystream.len();
        let into_block = (offset % block_size) as usize;
        if into_block > 0 {
            self.refill();
            self.used = into_block;
        }
    }

    /// Overwrite the plaintext under `ciphertext` at `offset` with
    /// `new_text`, re-encrypting only the edited bytes.
    ///
    /// The ciphertext grows if the edit runs past its end, but an edit may
    /// not start beyond it.
    pub fn edit(&mut self, ciphertext: &mut Vec<u8>, offset: usize, new_text: &[u8]) -> Result<()> {
        if offset > ciphertext.len() {
            return Err(Error::OutOfRange {
                offset,
                len: ciphertext.len(),
            });
        }
        let end = offset + new_text.len();
        if end > ciphertext.len() {
            ciphertext.resize(end, 0);
        }
        self.seek(offset as u64);
        self.crypt_blocks(&mut ciphertext[offset..end], new_text)
    }

    fn refill(&mut self) {
        self.keystream[..NONCE_LEN].copy_from_slice(&self.nonce);
        self.keystream[NONCE_LEN..].copy_from_slice(&self.counter.to_le_bytes());
        self.cipher.encrypt_block(&mut self.keystream);
        self.counter = self.counter.wrapping_add(1);
        self.used = 0;
    }
}

impl<C: BlockCipher> BlockMode for Ctr<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn crypt_blocks(&mut self, dst: &mut [u8], src: &[u8]) -> Result<()> {
        check_lengths(dst, src, self.block_size(), false)?;
        for (out, byte) in dst.iter_mut().zip(src) {
            if self.used == self.keystream.len() {
                self.refill();
            }
            *out = byte ^ self.keystream[self.used];
            self.used += 1;
        }
        Ok(())
    }
}
