/// Tuning knobs shared by the oracle attacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackConfig {
    /// Byte used for attacker-controlled padding and probes.
    pub filler: u8,
    /// A second probe byte, distinct from `filler`. Running an alignment
    /// search with both rules out blocks that only match by accident.
    pub alt_filler: u8,
    /// Largest block size tried when probing an oracle.
    pub max_block_size: usize,
    /// Search the 256 candidates for each byte on the rayon thread pool.
    pub parallel: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            filler: b'A',
            alt_filler: b'B',
            max_block_size: 64,
            parallel: true,
        }
    }
}

impl AttackConfig {
    pub fn with_fillers(mut self, filler: u8, alt_filler: u8) -> Self {
        self.filler = filler;
        self.alt_filler = alt_filler;
        self
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
