// CBC bit-flipping.
//
// When decrypting CBC, P_i = D(C_i) ⊕ C_{i-1}. XOR-ing a delta into
// C_{i-1} XORs the same delta into P_i, at the cost of turning P_{i-1} into
// garbage. If we know P_i, we can make it decrypt to anything we like:
//
//     C'_{i-1} = C_{i-1} ⊕ P_i ⊕ F    gives    P'_i = F.
//
// This gets characters past an encrypter that strips them from its input.
use tracing::{debug, instrument};

use crate::oracle::{Decrypted, EncryptionOracle, IvKeyOracle};
use crate::xor::{xor_bytes, xor_in_place};
use crate::{AttackConfig, BlockCipher, Error, Result};

/// XOR `delta` into block `block_idx` of `ciphertext`, starting `offset`
/// bytes into the block. After CBC decryption the same delta shows up in
/// plaintext block `block_idx + 1`.
pub fn flip(
    ciphertext: &mut [u8],
    block_size: usize,
    block_idx: usize,
    offset: usize,
    delta: &[u8],
) -> Result<()> {
    if offset + delta.len() > block_size {
        return Err(Error::InvalidLength {
            len: offset + delta.len(),
            block_size,
        });
    }
    let start = block_idx * block_size + offset;
    let end = start + delta.len();
    if end > ciphertext.len() {
        return Err(Error::OutOfRange {
            offset: end,
            len: ciphertext.len(),
        });
    }
    xor_in_place(&mut ciphertext[start..end], delta);
    Ok(())
}

/// Find the byte offset at which our input starts in a CBC oracle's
/// plaintext.
///
/// Changing one input byte changes every ciphertext block from the one that
/// holds it. Moving that byte along until the first changed block moves on
/// tells us how many bytes the block boundary is away.
pub fn find_input_offset<O: EncryptionOracle + ?Sized>(
    oracle: &O,
    block_size: usize,
    config: &AttackConfig,
) -> Result<usize> {
    if block_size == 0 {
        return Err(Error::InvalidLength { len: 0, block_size });
    }
    let first_changed_block = |n: usize| -> Result<usize> {
        let a = vec![config.filler; n + 1];
        let mut b = a.clone();
        b[n] = config.alt_filler;
        let (c_a, c_b) = (oracle.encrypt(&a)?, oracle.encrypt(&b)?);
        c_a.chunks(block_size)
            .zip(c_b.chunks(block_size))
            .position(|(x, y)| x != y)
            .ok_or(Error::PrefixNotFound)
    };

    let initial_block = first_changed_block(0)?;
    for n in 1..=block_size {
        if first_changed_block(n)? > initial_block {
            return Ok((initial_block + 1) * block_size - n);
        }
    }
    Err(Error::PrefixNotFound)
}

/// Get a ciphertext from `oracle` that decrypts with `target` at the start
/// of a block, even if the oracle would strip some of its bytes.
///
/// Our input fills two whole blocks with filler: the first is sacrificed,
/// the second is rewritten to `target` through it.
#[instrument(skip_all)]
pub fn inject<O: EncryptionOracle + ?Sized>(
    oracle: &O,
    block_size: usize,
    target: &[u8],
    config: &AttackConfig,
) -> Result<Vec<u8>> {
    if target.len() > block_size {
        return Err(Error::InvalidLength {
            len: target.len(),
            block_size,
        });
    }
    let offset = find_input_offset(oracle, block_size, config)?;
    let align = (block_size - offset % block_size) % block_size;
    debug!(offset, align, "found input offset");

    let mut ciphertext = oracle.encrypt(&vec![config.filler; align + 2 * block_size])?;
    let delta: Vec<u8> = target.iter().map(|t| t ^ config.filler).collect();
    flip(&mut ciphertext, block_size, (offset + align) / block_size, 0, &delta)?;
    Ok(ciphertext)
}

pub fn forge_admin<O: EncryptionOracle + ?Sized>(oracle: &O, block_size: usize) -> Result<Vec<u8>> {
    inject(oracle, block_size, b";admin=true;", &AttackConfig::default())
}

/// Recover the key of a CBC oracle that uses its key as the IV.
///
/// Submit C_0 | 0 | C_0. Block 0 decrypts to D(C_0) ⊕ IV and block 2 to
/// D(C_0) ⊕ 0, so XOR-ing them leaves IV, which is the key. The receiver
/// hands the plaintext back because it is not valid ASCII.
#[instrument(skip_all)]
pub fn recover_key_from_iv_key<C: BlockCipher>(
    oracle: &IvKeyOracle<C>,
    config: &AttackConfig,
) -> Result<Vec<u8>> {
    let block_size = oracle.block_size();
    let ciphertext = oracle.encrypt(&vec![config.filler; 3 * block_size])?;
    let first_block = &ciphertext[..block_size];
    let modified = [first_block, vec![0u8; block_size].as_slice(), first_block].concat();

    match oracle.decrypt(&modified)? {
        Decrypted::NonAscii(plaintext) => {
            xor_bytes(&plaintext[..block_size], &plaintext[(2 * block_size)..])
        }
        Decrypted::Ascii => Err(Error::KeyRecovery(
            "decrypted message was ASCII compliant".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use crate::mode::{cbc_decrypt, cbc_encrypt};
    use crate::oracle::{from_fn, random_bytes, CbcQueryOracle};
    use crate::{padding, Aes128Cipher};

    #[test]
    fn flip_changes_next_plaintext_block_by_delta() {
        let cipher = Aes128Cipher::new(b"YELLOW SUBMARINE");
        let iv = [0u8; 16];
        let plaintext = b"A".repeat(48);
        let mut ciphertext = cbc_encrypt(&cipher, &iv, &plaintext).unwrap();

        flip(&mut ciphertext, 16, 0, 4, &[0x01, 0x02, 0x03]).unwrap();

        let decrypted = cbc_decrypt(&cipher, &iv, &ciphertext).unwrap();
        assert_ne!(decrypted[..16], plaintext[..16]);
        assert_eq!(&decrypted[16..36], b"AAAA@CBAAAAAAAAAAAAA");
        assert_eq!(decrypted[32..], plaintext[32..]);
    }

    #[rstest]
    #[case(12, &[0u8; 5])]
    #[case(0, &[0u8; 17])]
    fn flip_rejects_delta_crossing_block(#[case] offset: usize, #[case] delta: &[u8]) {
        let mut ciphertext = vec![0u8; 32];

        assert!(matches!(
            flip(&mut ciphertext, 16, 0, offset, delta),
            Err(Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn flip_rejects_block_past_end() {
        let mut ciphertext = vec![0u8; 32];

        assert_eq!(
            flip(&mut ciphertext, 16, 2, 0, &[1]),
            Err(Error::OutOfRange { offset: 33, len: 32 })
        );
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    #[case(16)]
    #[case(32)]
    #[case(45)]
    fn find_input_offset_finds_prefix_length(#[case] prefix_len: usize) {
        let cipher = Aes128Cipher::new(b"YELLOW SUBMARINE");
        let prefix = vec![b'p'; prefix_len];
        let oracle = from_fn(|input: &[u8]| {
            let padded = padding::pad(&[prefix.as_slice(), input, b";tail"].concat(), 16)?;
            cbc_encrypt(&cipher, &[0u8; 16], &padded)
        });

        let offset = find_input_offset(&oracle, 16, &AttackConfig::default()).unwrap();

        assert_eq!(offset, prefix_len);
    }

    #[test]
    fn forges_valid_admin_ciphertext() {
        let mut rng = StdRng::seed_from_u64(101);
        let key: [u8; 16] = random_bytes(&mut rng);
        let iv: [u8; 16] = random_bytes(&mut rng);
        let oracle = CbcQueryOracle::new(Aes128Cipher::new(&key), iv.to_vec());

        let admin_forgery = forge_admin(&oracle, 16).unwrap();

        assert_eq!(oracle.decrypt_and_check_admin(&admin_forgery), Ok(true));
    }

    #[test]
    fn injects_target_after_unaligned_prefix() {
        let cipher = Aes128Cipher::new(b"YELLOW SUBMARINE");
        let iv = [3u8; 16];
        let oracle = from_fn(|input: &[u8]| {
            let cleaned: Vec<u8> = input.iter().copied().filter(|&b| b != b'!').collect();
            let padded = padding::pad(&[b"user=".as_slice(), cleaned.as_slice()].concat(), 16)?;
            cbc_encrypt(&cipher, &iv, &padded)
        });

        let ciphertext = inject(&oracle, 16, b"!!!", &AttackConfig::default()).unwrap();

        let plaintext = cbc_decrypt(&cipher, &iv, &ciphertext).unwrap();
        assert_eq!(&plaintext[32..48], b"!!!AAAAAAAAAAAAA");
    }

    #[test]
    fn inject_rejects_target_longer_than_a_block() {
        let oracle = from_fn(|input: &[u8]| Ok(input.to_vec()));

        assert!(matches!(
            inject(&oracle, 4, b"too long", &AttackConfig::default()),
            Err(Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn recover_key_from_iv_key_breaks_oracles_key() {
        let mut rng = StdRng::seed_from_u64(101);
        let key: [u8; 16] = random_bytes(&mut rng);
        let oracle = IvKeyOracle::new(Aes128Cipher::new(&key), &key).unwrap();

        let broken_key = recover_key_from_iv_key(&oracle, &AttackConfig::default()).unwrap();

        assert_eq!(broken_key, key);
    }

    // Leaves blocks unchanged, so an ASCII key keeps the forged plaintext
    // ASCII and the receiver leaks nothing.
    struct Identity;

    impl BlockCipher for Identity {
        fn block_size(&self) -> usize {
            16
        }

        fn encrypt_block(&self, _: &mut [u8]) {}

        fn decrypt_block(&self, _: &mut [u8]) {}
    }

    #[test]
    fn recover_key_from_iv_key_fails_when_nothing_leaks() {
        let oracle = IvKeyOracle::new(Identity, b"YELLOW SUBMARINE").unwrap();

        assert!(matches!(
            recover_key_from_iv_key(&oracle, &AttackConfig::default()),
            Err(Error::KeyRecovery(_))
        ));
    }

    #[test]
    fn find_input_offset_fails_when_oracle_ignores_input() {
        let oracle = from_fn(|_: &[u8]| Ok(vec![0u8; 32]));

        assert_eq!(
            find_input_offset(&oracle, 16, &AttackConfig::default()),
            Err(Error::PrefixNotFound)
        );
    }

    #[test]
    fn inject_rejects_zero_block_size() {
        let oracle = from_fn(|input: &[u8]| Ok(input.to_vec()));

        assert!(matches!(
            inject(&oracle, 0, b"", &AttackConfig::default()),
            Err(Error::InvalidLength { block_size: 0, .. })
        ));
    }
}
