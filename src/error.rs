use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid length {len}: expected a multiple of {block_size}")]
    InvalidLength { len: usize, block_size: usize },

    #[error("buffer lengths differ: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("offset {offset} is past the end of a {len} byte buffer")]
    OutOfRange { offset: usize, len: usize },

    #[error("invalid pkcs7 padding")]
    InvalidPadding,

    #[error("no unique lookup table entry for secret byte {position}")]
    AmbiguousByte { position: usize },

    #[error("no candidate gave valid padding for byte {byte} of block {block}")]
    OracleExhausted { block: usize, byte: usize },

    #[error("no block size found up to {0} bytes")]
    BlockSizeNotFound(usize),

    #[error("could not align attacker input to a block boundary")]
    PrefixNotFound,

    #[error("oracle output shows no repeated blocks; not ECB")]
    NotEcb,

    #[error("key recovery failed: {0}")]
    KeyRecovery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
