// Byte-at-a-time ECB decryption, with or without an unknown fixed prefix.
//
// The oracle encrypts prefix | input | secret under one key. Pick the input
// length so the next unknown secret byte lands in the last slot of a block
// whose other bytes are all known. Encrypting the known bytes followed by
// each of the 256 candidates gives a table of every possible ciphertext for
// that block, and the real block is looked up in it. Appending the byte to
// the known bytes moves the window on by one.
//
// With a prefix, some filler first tops up the prefix's last block so the
// blocks we craft start on a boundary, and every block index is shifted past
// the prefix.
use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use super::{map_candidates, ModeDetector};
use crate::mode::Mode;
use crate::oracle::EncryptionOracle;
use crate::{AttackConfig, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleSizes {
    pub block_size: usize,
    /// Length of everything the oracle adds to the input (prefix + secret).
    pub fixed_len: usize,
}

/// Grow the input one byte at a time until the output grows. The jump is
/// the block size, and the input length that caused it fills the fixed
/// content up to a block boundary.
pub fn detect_sizes<O: EncryptionOracle + ?Sized>(
    oracle: &O,
    config: &AttackConfig,
) -> Result<OracleSizes> {
    let initial_len = oracle.encrypt(&[])?.len();
    for n in 1..=config.max_block_size {
        let len = oracle.encrypt(&vec![config.filler; n])?.len();
        if len > initial_len {
            let fixed_len = initial_len
                .checked_sub(n)
                .ok_or(Error::BlockSizeNotFound(config.max_block_size))?;
            return Ok(OracleSizes {
                block_size: len - initial_len,
                fixed_len,
            });
        }
    }
    Err(Error::BlockSizeNotFound(config.max_block_size))
}

/// Find the length of the unknown prefix the oracle puts before our input.
///
/// Send `2 * block_size + k` copies of a byte for growing `k`. The first `k`
/// that produces two consecutive equal ciphertext blocks is the number of
/// bytes needed to finish the prefix's last block, and the position of
/// those blocks gives the rest. The search is run with two different fillers
/// and only blocks that change with the filler count, so prefix or secret
/// bytes that happen to match the filler cannot fake an alignment.
pub fn find_prefix_len<O: EncryptionOracle + ?Sized>(
    oracle: &O,
    block_size: usize,
    config: &AttackConfig,
) -> Result<usize> {
    if block_size == 0 {
        return Err(Error::InvalidLength { len: 0, block_size });
    }
    for input_len in (2 * block_size)..(3 * block_size) {
        let c_a = oracle.encrypt(&vec![config.filler; input_len])?;
        let c_b = oracle.encrypt(&vec![config.alt_filler; input_len])?;
        let block = |c: &[u8], i: usize| c[(i * block_size)..((i + 1) * block_size)].to_vec();

        let n_blocks = c_a.len().min(c_b.len()) / block_size;
        let aligned_block = (1..n_blocks).find(|&i| {
            block(&c_a, i - 1) == block(&c_a, i)
                && block(&c_b, i - 1) == block(&c_b, i)
                && block(&c_a, i) != block(&c_b, i)
        });
        if let Some(i) = aligned_block {
            // Blocks i - 1 and i hold the last 2 * block_size input bytes.
            return Ok((i + 1) * block_size - input_len);
        }
    }
    Err(Error::PrefixNotFound)
}

/// Maps each candidate ciphertext block to the plaintext byte that made it.
#[derive(Debug, Default)]
pub struct LookupTable {
    entries: HashMap<Vec<u8>, u8>,
}

impl LookupTable {
    /// Build a table, or `None` if two candidates share a ciphertext block.
    pub fn from_entries<I>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Vec<u8>, u8)>,
    {
        let mut table = Self::default();
        for (block, byte) in entries {
            if table.entries.insert(block, byte).is_some() {
                return None;
            }
        }
        Some(table)
    }

    pub fn get(&self, block: &[u8]) -> Option<u8> {
        self.entries.get(block).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Where the secret sits relative to our input.
#[derive(Debug, Clone, Copy)]
struct Layout {
    block_size: usize,
    secret_len: usize,
    // Filler bytes needed to finish the prefix's final block.
    align: usize,
    // Offset of the first block made entirely of our input.
    start: usize,
}

pub struct EcbByteRecovery<'a, O: ?Sized> {
    oracle: &'a O,
    config: AttackConfig,
}

impl<'a, O: EncryptionOracle + Sync + ?Sized> EcbByteRecovery<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self {
            oracle,
            config: AttackConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AttackConfig) -> Self {
        self.config = config;
        self
    }

    #[instrument(skip_all)]
    pub fn recover(&self) -> Result<Vec<u8>> {
        let layout = self.layout()?;

        let mut recovered: Vec<u8> = Vec::with_capacity(layout.secret_len);
        while recovered.len() < layout.secret_len {
            let byte = self.recover_byte(&layout, &recovered)?;
            trace!(position = recovered.len(), byte, "recovered byte");
            recovered.push(byte);
        }
        Ok(recovered)
    }

    fn layout(&self) -> Result<Layout> {
        let OracleSizes {
            block_size,
            fixed_len,
        } = detect_sizes(self.oracle, &self.config)?;
        debug!(block_size, fixed_len, "detected oracle sizes");

        // Output growing a byte at a time means a stream cipher.
        if block_size < 2 {
            return Err(Error::NotEcb);
        }
        if ModeDetector::new(block_size).detect(self.oracle, self.config.filler)? != Mode::Ecb {
            return Err(Error::NotEcb);
        }

        let prefix_len = find_prefix_len(self.oracle, block_size, &self.config)?;
        let secret_len = fixed_len
            .checked_sub(prefix_len)
            .ok_or(Error::PrefixNotFound)?;
        debug!(prefix_len, secret_len, "located secret");

        let align = (block_size - prefix_len % block_size) % block_size;
        Ok(Layout {
            block_size,
            secret_len,
            align,
            start: prefix_len + align,
        })
    }

    fn recover_byte(&self, layout: &Layout, known: &[u8]) -> Result<u8> {
        let position = known.len();
        let block_size = layout.block_size;
        let filler = self.config.filler;

        // The block_size - 1 plaintext bytes just before the target byte.
        // Before the secret has block_size - 1 known bytes, filler stands in.
        let window: Vec<u8> = std::iter::repeat(filler)
            .take(block_size - 1)
            .chain(known.iter().copied())
            .skip(position)
            .collect();
        let table = self.build_table(layout, &window, position)?;

        // Shorten the input so the target byte ends up last in its block.
        let n_filler = layout.align + block_size - 1 - position % block_size;
        let ciphertext = self.oracle.encrypt(&vec![filler; n_filler])?;
        let offset = layout.start + (position / block_size) * block_size;
        let block = ciphertext
            .get(offset..(offset + block_size))
            .ok_or(Error::AmbiguousByte { position })?;
        table.get(block).ok_or(Error::AmbiguousByte { position })
    }

    fn build_table(&self, layout: &Layout, window: &[u8], position: usize) -> Result<LookupTable> {
        let block_size = layout.block_size;
        let entries = map_candidates(self.config.parallel, |candidate| {
            let mut input = Vec::with_capacity(layout.align + block_size);
            input.resize(layout.align, self.config.filler);
            input.extend_from_slice(window);
            input.push(candidate);
            let ciphertext = self.oracle.encrypt(&input)?;
            let block = ciphertext
                .get(layout.start..(layout.start + block_size))
                .ok_or(Error::AmbiguousByte { position })?;
            Ok((block.to_vec(), candidate))
        })?;
        LookupTable::from_entries(entries).ok_or(Error::AmbiguousByte { position })
    }
}

/// Recover the secret an ECB oracle appends to its input.
pub fn byte_at_a_time_ecb_decrypt<O: EncryptionOracle + Sync + ?Sized>(
    oracle: &O,
) -> Result<Vec<u8>> {
    EcbByteRecovery::new(oracle).recover()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use base64::{self, Engine};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rstest::rstest;

    use crate::mode::{cbc_encrypt, ctr, ecb_encrypt};
    use crate::oracle::{from_fn, random_bytes, random_vec, EcbOracle};
    use crate::{padding, Aes128Cipher};

    const UNKNOWN_STRING: &str = "Um9sbGluJyBpbiBteSA1LjAKV2l0aCBteSByYWctdG9wIGRvd24gc28gbXkg\
aGFpciBjYW4gYmxvdwpUaGUgZ2lybGllcyBvbiBzdGFuZGJ5IHdhdmluZyBq\
dXN0IHRvIHNheSBoaQpEaWQgeW91IHN0b3A/IE5vLCBJIGp1c3QgZHJvdmUg\
YnkK";

    fn unknown_bytes() -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .decode(UNKNOWN_STRING)
            .unwrap()
    }

    fn make_oracle(seed: u64, prefix_len: usize, secret: Vec<u8>) -> EcbOracle<Aes128Cipher> {
        let mut rng = StdRng::seed_from_u64(seed);
        let key: [u8; 16] = random_bytes(&mut rng);
        EcbOracle::new(Aes128Cipher::new(&key), secret).with_prefix(random_vec(&mut rng, prefix_len))
    }

    #[test]
    fn detect_sizes_finds_block_size_and_secret_length() {
        let oracle = make_oracle(101, 0, unknown_bytes());

        let sizes = detect_sizes(&oracle, &AttackConfig::default()).unwrap();

        assert_eq!(
            sizes,
            OracleSizes {
                block_size: 16,
                fixed_len: 138
            }
        );
    }

    #[test]
    fn detect_sizes_counts_prefix_in_fixed_length() {
        let oracle = make_oracle(101, 7, b"YELLOW SUBMARINE".to_vec());

        let sizes = detect_sizes(&oracle, &AttackConfig::default()).unwrap();

        assert_eq!(sizes.fixed_len, 23);
    }

    #[test]
    fn find_prefix_len_matches_oracle_prefix() {
        for prefix_len in 0..=40 {
            let oracle = make_oracle(prefix_len as u64, prefix_len, unknown_bytes());

            let found = find_prefix_len(&oracle, 16, &AttackConfig::default()).unwrap();

            assert_eq!(found, oracle.prefix_len());
        }
    }

    #[rstest]
    #[case(b"AAAAAAA".to_vec(), b"AAAAsecret".to_vec())]
    #[case(b"xxxxxxxxxxxxxxxAAAAAAAAAAAAAAAA".to_vec(), b"BBBBBBBBsecret".to_vec())]
    #[case(vec![0; 32], b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_vec())]
    fn find_prefix_len_ignores_bytes_matching_filler(
        #[case] prefix: Vec<u8>,
        #[case] secret: Vec<u8>,
    ) {
        let oracle =
            EcbOracle::new(Aes128Cipher::new(b"YELLOW SUBMARINE"), secret).with_prefix(prefix.clone());

        let found = find_prefix_len(&oracle, 16, &AttackConfig::default()).unwrap();

        assert_eq!(found, prefix.len());
    }

    #[test]
    fn byte_at_a_time_ecb_decrypt_decrypts_message_with_oracle() {
        let secret = unknown_bytes();
        let oracle = make_oracle(101, 0, secret.clone());

        let recovered = byte_at_a_time_ecb_decrypt(&oracle).unwrap();

        assert_eq!(
            String::from_utf8_lossy(&recovered),
            String::from_utf8_lossy(&secret)
        );
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(16)]
    #[case(29)]
    fn recovers_secret_behind_random_prefix(#[case] prefix_len: usize) {
        let secret = unknown_bytes();
        let oracle = make_oracle(202, prefix_len, secret.clone());

        let recovered = EcbByteRecovery::new(&oracle).recover().unwrap();

        assert_eq!(recovered, secret);
    }

    #[test]
    fn recovers_secret_sequentially_with_custom_fillers() {
        let secret = b"short secret, \x00\xff binary too".to_vec();
        let oracle = make_oracle(303, 11, secret.clone());
        let config = AttackConfig::default()
            .with_fillers(0x00, 0xff)
            .with_parallel(false);

        let recovered = EcbByteRecovery::new(&oracle)
            .with_config(config)
            .recover()
            .unwrap();

        assert_eq!(recovered, secret);
    }

    #[test]
    fn recovers_nothing_from_empty_secret() {
        let oracle = make_oracle(404, 5, Vec::new());

        assert_eq!(byte_at_a_time_ecb_decrypt(&oracle), Ok(Vec::new()));
    }

    #[test]
    fn rejects_cbc_oracle() {
        let cipher = Aes128Cipher::new(b"YELLOW SUBMARINE");
        let oracle = from_fn(|input: &[u8]| {
            let padded = padding::pad(&[input, b"secret"].concat(), 16)?;
            cbc_encrypt(&cipher, &[0u8; 16], &padded)
        });

        assert_eq!(byte_at_a_time_ecb_decrypt(&oracle), Err(Error::NotEcb));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn rejects_ctr_oracle(#[case] parallel: bool) {
        let cipher = Aes128Cipher::new(b"YELLOW SUBMARINE");
        let oracle = from_fn(|input: &[u8]| {
            ctr(&cipher, &[0u8; 8], &[input, b"secret text here!"].concat())
        });
        let config = AttackConfig::default().with_parallel(parallel);

        assert_eq!(
            EcbByteRecovery::new(&oracle).with_config(config).recover(),
            Err(Error::NotEcb)
        );
    }

    #[test]
    fn detect_sizes_gives_up_past_max_block_size() {
        let oracle = from_fn(|_: &[u8]| Ok(vec![0u8; 16]));
        let config = AttackConfig::default().with_max_block_size(8);

        assert_eq!(
            detect_sizes(&oracle, &config),
            Err(Error::BlockSizeNotFound(8))
        );
    }

    #[test]
    fn find_prefix_len_fails_when_oracle_ignores_input() {
        let oracle = from_fn(|_: &[u8]| Ok(vec![0u8; 64]));

        assert_eq!(
            find_prefix_len(&oracle, 16, &AttackConfig::default()),
            Err(Error::PrefixNotFound)
        );
    }

    #[test]
    fn find_prefix_len_rejects_zero_block_size() {
        let oracle = from_fn(|input: &[u8]| Ok(input.to_vec()));

        assert!(matches!(
            find_prefix_len(&oracle, 0, &AttackConfig::default()),
            Err(Error::InvalidLength { block_size: 0, .. })
        ));
    }

    #[test]
    fn reports_ambiguous_byte_when_key_changes_between_queries() {
        let rng = Mutex::new(StdRng::seed_from_u64(505));
        let oracle = from_fn(|input: &[u8]| {
            let key: [u8; 16] = rng.lock().unwrap().gen();
            let padded = padding::pad(&[input, b"secret"].concat(), 16)?;
            ecb_encrypt(Aes128Cipher::new(&key), &padded)
        });

        assert_eq!(
            byte_at_a_time_ecb_decrypt(&oracle),
            Err(Error::AmbiguousByte { position: 0 })
        );
    }

    #[test]
    fn lookup_table_rejects_duplicate_blocks() {
        let entries = vec![(vec![1, 2], 0u8), (vec![1, 2], 1u8)];

        assert!(LookupTable::from_entries(entries).is_none());
    }

    #[test]
    fn lookup_table_finds_exact_block() {
        let table = LookupTable::from_entries(vec![(vec![1, 2], 7u8), (vec![2, 1], 9u8)]).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&[2, 1]), Some(9));
        assert_eq!(table.get(&[1]), None);
    }
}
