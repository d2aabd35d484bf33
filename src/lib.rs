pub mod attack;
mod cipher;
mod config;
mod error;
pub mod mode;
pub mod oracle;
pub mod padding;
mod xor;

pub use attack::{
    byte_at_a_time_ecb_decrypt, cbc_padding_oracle_attack, count_repeated_blocks, detect_sizes,
    find_input_offset, find_prefix_len, flip, forge_admin, inject, recover_ctr_plaintext,
    recover_key_from_iv_key, EcbByteRecovery, LookupTable, ModeDetector, OracleSizes,
    PaddingOracleAttack,
};
pub use cipher::{Aes128Cipher, BlockCipher, AES_BLOCK_SIZE};
pub use config::AttackConfig;
pub use error::{Error, Result};
pub use mode::{
    cbc_decrypt, cbc_encrypt, ctr, ecb_decrypt, ecb_encrypt, BlockMode, Cbc, Ctr, Direction, Ecb,
    Mode, NONCE_LEN,
};
pub use oracle::{
    from_fn, random_bytes, random_vec, CbcPaddingOracle, CbcQueryOracle, CtrEditOracle,
    Decrypted, EcbOracle, EncryptionOracle, FnOracle, IvKeyOracle, ModeOracle, PaddingOracle,
};
pub use xor::{xor_bytes, xor_in_place};
