// Attacks that recover secrets from oracles rather than from the cipher.
mod bitflip;
mod ctr_edit;
mod detect;
mod ecb_byte;
mod padding_oracle;

pub use bitflip::{find_input_offset, flip, forge_admin, inject, recover_key_from_iv_key};
pub use ctr_edit::recover_ctr_plaintext;
pub use detect::{count_repeated_blocks, ModeDetector};
pub use ecb_byte::{
    byte_at_a_time_ecb_decrypt, detect_sizes, find_prefix_len, EcbByteRecovery, LookupTable,
    OracleSizes,
};
pub use padding_oracle::{cbc_padding_oracle_attack, PaddingOracleAttack};

use rayon::prelude::*;

use crate::Result;

/// Run `f` for every byte value, in parallel if asked, keeping input order.
fn map_candidates<T, F>(parallel: bool, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(u8) -> Result<T> + Sync + Send,
{
    if parallel {
        (0..=255u8).into_par_iter().map(f).collect()
    } else {
        (0..=255u8).map(f).collect()
    }
}

/// Find a byte value accepted by `check`. With `parallel` set, whichever
/// accepted value is seen first wins, so `check` should accept at most one.
fn find_candidate<F>(parallel: bool, check: F) -> Result<Option<u8>>
where
    F: Fn(u8) -> Result<bool> + Sync + Send,
{
    if parallel {
        (0..=255u8)
            .into_par_iter()
            .find_map_any(|candidate| match check(candidate) {
                Ok(true) => Some(Ok(candidate)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            })
            .transpose()
    } else {
        for candidate in 0..=255u8 {
            if check(candidate)? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}
