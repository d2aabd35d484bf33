use super::{EncryptionOracle, PaddingOracle};
use crate::mode::{cbc_decrypt, cbc_encrypt};
use crate::{padding, BlockCipher, Error, Result};

/// Decrypts CBC ciphertext under a hidden key and says only whether the
/// result was validly padded.
pub struct CbcPaddingOracle<C> {
    cipher: C,
}

impl<C: BlockCipher> CbcPaddingOracle<C> {
    pub fn new(cipher: C) -> Self {
        Self { cipher }
    }

    /// Pad and encrypt `plaintext`, as the server side would before handing
    /// the ciphertext and IV to a client.
    pub fn encrypt(&self, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let padded = padding::pad(plaintext, self.cipher.block_size())?;
        cbc_encrypt(&self.cipher, iv, &padded)
    }
}

impl<C: BlockCipher> PaddingOracle for CbcPaddingOracle<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn padding_valid(&self, iv: &[u8], ciphertext: &[u8]) -> Result<bool> {
        let plaintext = cbc_decrypt(&self.cipher, iv, ciphertext)?;
        Ok(padding::is_valid(&plaintext, self.block_size()))
    }
}

/// Wraps user data in a query string and CBC encrypts it. The `;` and `=`
/// metacharacters are stripped from user data, so an `admin=true` field
/// cannot be typed in directly.
pub struct CbcQueryOracle<C> {
    cipher: C,
    iv: Vec<u8>,
}

impl<C: BlockCipher> CbcQueryOracle<C> {
    const QUERY_PREFIX: &'static [u8] = b"comment1=cooking%20MCs;userdata=";
    const QUERY_SUFFIX: &'static [u8] = b";comment2=%20like%20a%20pound%20of%20bacon";

    pub fn new(cipher: C, iv: Vec<u8>) -> Self {
        Self { cipher, iv }
    }

    pub fn decrypt_and_check_admin(&self, ciphertext: &[u8]) -> Result<bool> {
        let mut plaintext = cbc_decrypt(&self.cipher, &self.iv, ciphertext)?;
        padding::unpad(&mut plaintext, self.cipher.block_size())?;
        Ok(plaintext
            .split(|x| *x == b';')
            .any(|field| field == b"admin=true"))
    }
}

impl<C: BlockCipher> EncryptionOracle for CbcQueryOracle<C> {
    fn encrypt(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let sanitised: Vec<u8> = msg
            .iter()
            .copied()
            .filter(|el| ![b';', b'='].contains(el))
            .collect();
        let plaintext = [Self::QUERY_PREFIX, sanitised.as_slice(), Self::QUERY_SUFFIX].concat();
        let padded = padding::pad(&plaintext, self.cipher.block_size())?;
        cbc_encrypt(&self.cipher, &self.iv, &padded)
    }
}

/// What the receiver of an `IvKeyOracle` ciphertext reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decrypted {
    Ascii,
    /// High-ASCII plaintext is rejected, and the error echoes it.
    NonAscii(Vec<u8>),
}

/// CBC with the key reused as the IV.
pub struct IvKeyOracle<C> {
    cipher: C,
    key: Vec<u8>,
}

impl<C: BlockCipher> IvKeyOracle<C> {
    /// `key` is the key `cipher` was built from. It doubles as the IV, so it
    /// must be one block long.
    pub fn new(cipher: C, key: &[u8]) -> Result<Self> {
        if key.len() != cipher.block_size() {
            return Err(Error::InvalidLength {
                len: key.len(),
                block_size: cipher.block_size(),
            });
        }
        Ok(Self {
            cipher,
            key: key.to_vec(),
        })
    }

    pub fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    /// Decrypt without checking padding, then check the plaintext is ASCII.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Decrypted> {
        let plaintext = cbc_decrypt(&self.cipher, &self.key, ciphertext)?;
        if plaintext.is_ascii() {
            Ok(Decrypted::Ascii)
        } else {
            Ok(Decrypted::NonAscii(plaintext))
        }
    }
}

impl<C: BlockCipher> EncryptionOracle for IvKeyOracle<C> {
    fn encrypt(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let padded = padding::pad(msg, self.cipher.block_size())?;
        cbc_encrypt(&self.cipher, &self.key, &padded)
    }
}
