// Oracles: the narrow view an attacker gets of a hidden encryption setup.
//
// The structs in this module are the harness side. They own the key and any
// fixed prefix/suffix, and only expose what a real application would leak:
// ciphertext for chosen input, a padding verdict, an edit function. Attacks
// are written against the traits so they never see the configuration.
mod cbc;
mod ctr;
mod ecb;
mod random;

pub use cbc::{CbcPaddingOracle, CbcQueryOracle, Decrypted, IvKeyOracle};
pub use ctr::CtrEditOracle;
pub use ecb::EcbOracle;
pub use random::{random_bytes, random_vec, ModeOracle};

use crate::Result;

/// Encrypts attacker input together with whatever the oracle hides.
pub trait EncryptionOracle {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>>;
}

/// Decrypts CBC ciphertext and reports only whether the padding was valid.
pub trait PaddingOracle {
    fn block_size(&self) -> usize;

    fn padding_valid(&self, iv: &[u8], ciphertext: &[u8]) -> Result<bool>;
}

impl<O: EncryptionOracle + ?Sized> EncryptionOracle for &O {
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        (**self).encrypt(input)
    }
}

impl<O: PaddingOracle + ?Sized> PaddingOracle for &O {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn padding_valid(&self, iv: &[u8], ciphertext: &[u8]) -> Result<bool> {
        (**self).padding_valid(iv, ciphertext)
    }
}

/// An encryption oracle backed by a closure, e.g. one that makes a request
/// to a remote service.
pub struct FnOracle<F>(F);

pub fn from_fn<F>(f: F) -> FnOracle<F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>>,
{
    FnOracle(f)
}

impl<F> EncryptionOracle for FnOracle<F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>>,
{
    fn encrypt(&self, input: &[u8]) -> Result<Vec<u8>> {
        (self.0)(input)
    }
}
