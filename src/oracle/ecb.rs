use super::EncryptionOracle;
use crate::mode::{BlockMode, Ecb};
use crate::{padding, BlockCipher, Result};

/// ECB under a fixed hidden key:
///
/// ```text
/// ECB(prefix | input | secret)
/// ```
///
/// The prefix is empty unless set with `with_prefix`.
pub struct EcbOracle<C> {
    cipher: C,
    prefix: Vec<u8>,
    secret: Vec<u8>,
}

impl<C: BlockCipher> EcbOracle<C> {
    pub fn new(cipher: C, secret: Vec<u8>) -> Self {
        Self {
            cipher,
            prefix: Vec::new(),
            secret,
        }
    }

    pub fn with_prefix(mut self, prefix: Vec<u8>) -> Self {
        self.prefix = prefix;
        self
    }

    #[cfg(test)]
    pub(crate) fn prefix_len(&self) -> usize {
        self.prefix.len()
    }
}

impl<C: BlockCipher> EncryptionOracle for EcbOracle<C> {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        let plaintext = [self.prefix.as_slice(), input, self.secret.as_slice()].concat();
        let padded = padding::pad(&plaintext, self.cipher.block_size())?;
        Ecb::encrypter(&self.cipher).crypt(&padded)
    }
}
