use crate::mode::{ctr, Ctr, NONCE_LEN};
use crate::{BlockCipher, Result};

/// Holds a CTR ciphertext under a hidden key and nonce, and lets callers
/// rewrite the plaintext at any offset ("random access" editing).
pub struct CtrEditOracle<C> {
    cipher: C,
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl<C: BlockCipher> CtrEditOracle<C> {
    pub fn new(cipher: C, nonce: [u8; NONCE_LEN], plaintext: &[u8]) -> Result<Self> {
        let ciphertext = ctr(&cipher, &nonce, plaintext)?;
        Ok(Self {
            cipher,
            nonce,
            ciphertext,
        })
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Return a copy of the ciphertext with the plaintext at `offset`
    /// replaced by `new_text`.
    pub fn edit(&self, offset: usize, new_text: &[u8]) -> Result<Vec<u8>> {
        let mut edited = self.ciphertext.clone();
        Ctr::new(&self.cipher, self.nonce)?.edit(&mut edited, offset, new_text)?;
        Ok(edited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Aes128Cipher;

    #[test]
    fn edit_leaves_stored_ciphertext_untouched() {
        let cipher = Aes128Cipher::new(b"YELLOW SUBMARINE");
        let oracle = CtrEditOracle::new(&cipher, [1u8; 8], b"the quick brown fox").unwrap();
        let original = oracle.ciphertext().to_vec();

        let edited = oracle.edit(4, b"QUICK").unwrap();

        assert_eq!(oracle.ciphertext(), original);
        assert_eq!(edited[..4], original[..4]);
        assert_eq!(edited[9..], original[9..]);
        assert_eq!(
            ctr(&cipher, &[1u8; 8], &edited).unwrap(),
            b"the QUICK brown fox"
        );
    }
}
