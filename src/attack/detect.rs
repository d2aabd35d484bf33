// Detect ECB by its repeated blocks.
//
// ECB maps equal plaintext blocks to equal ciphertext blocks. Feed an oracle
// enough copies of one byte that at least two whole blocks of it are
// encrypted, and ECB output will repeat where CBC or CTR output will not.
use std::ops::RangeInclusive;

use tracing::debug;

use crate::mode::Mode;
use crate::oracle::EncryptionOracle;
use crate::Result;

/// Count the pairs of equal `block_size` blocks in `bytes`. A trailing
/// partial block is ignored.
pub fn count_repeated_blocks(bytes: &[u8], block_size: usize) -> usize {
    if block_size == 0 {
        return 0;
    }
    let blocks: Vec<&[u8]> = bytes.chunks_exact(block_size).collect();
    blocks
        .iter()
        .enumerate()
        .map(|(i, a)| blocks[(i + 1)..].iter().filter(|b| a == *b).count())
        .sum()
}

#[derive(Debug, Clone)]
pub struct ModeDetector {
    block_size: usize,
    // Candidate offsets of the first block boundary in the ciphertext.
    offsets: RangeInclusive<usize>,
}

impl ModeDetector {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            offsets: 0..=0,
        }
    }

    /// Also try reading blocks from each of `offsets` bytes into the
    /// ciphertext, for output framed by bytes of unknown length.
    pub fn with_offsets(mut self, offsets: RangeInclusive<usize>) -> Self {
        self.offsets = offsets;
        self
    }

    /// Chosen plaintext with enough repetition to survive a misaligned
    /// prefix of up to a block and still fill three whole blocks.
    pub fn probe(&self, filler: u8) -> Vec<u8> {
        vec![filler; 4 * self.block_size]
    }

    /// The highest repeated-block count over all candidate offsets.
    pub fn repeats(&self, ciphertext: &[u8]) -> usize {
        self.offsets
            .clone()
            .filter(|&offset| offset < ciphertext.len())
            .map(|offset| count_repeated_blocks(&ciphertext[offset..], self.block_size))
            .max()
            .unwrap_or(0)
    }

    pub fn is_ecb(&self, ciphertext: &[u8]) -> bool {
        self.repeats(ciphertext) > 0
    }

    /// ECB if any blocks repeat, otherwise CBC (the chained alternative).
    pub fn guess(&self, ciphertext: &[u8]) -> Mode {
        if self.is_ecb(ciphertext) {
            Mode::Ecb
        } else {
            Mode::Cbc
        }
    }

    pub fn detect<O: EncryptionOracle + ?Sized>(&self, oracle: &O, filler: u8) -> Result<Mode> {
        let ciphertext = oracle.encrypt(&self.probe(filler))?;
        let mode = self.guess(&ciphertext);
        debug!(?mode, repeats = self.repeats(&ciphertext), "guessed mode");
        Ok(mode)
    }
}
