// Random-access CTR editing leaks the keystream.
//
// The edit function encrypts new plaintext with the same keystream it used
// for the original. Overwriting the whole message with zeros hands back the
// keystream itself, and XOR-ing it with the stored ciphertext gives the
// plaintext.
use tracing::instrument;

use crate::oracle::CtrEditOracle;
use crate::xor::xor_bytes;
use crate::{BlockCipher, Result};

#[instrument(skip_all)]
pub fn recover_ctr_plaintext<C: BlockCipher>(oracle: &CtrEditOracle<C>) -> Result<Vec<u8>> {
    let ciphertext = oracle.ciphertext();
    let keystream = oracle.edit(0, &vec![0u8; ciphertext.len()])?;
    xor_bytes(ciphertext, &keystream)
}
