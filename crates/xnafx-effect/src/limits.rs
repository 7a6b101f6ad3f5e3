//! Hard limits applied to counts read from untrusted effect binaries.
//!
//! Every declared count is also checked against the bytes left in the buffer before anything is
//! allocated for it, so a short blob cannot request a huge `Vec`.

use crate::cursor::BinaryCursor;
use crate::error::EffectError;

pub const DEFAULT_MAX_OBJECTS: u32 = 65_536;
pub const DEFAULT_MAX_VALUE_DEPTH: u32 = 16;

/// Validates that `count` records of at least `record_size` bytes could fit in what `cursor` has
/// left, returning the count as a `usize` capacity.
pub(crate) fn check_count(
    cursor: &BinaryCursor<'_>,
    context: &'static str,
    count: u32,
    record_size: usize,
) -> Result<usize, EffectError> {
    let count_usize = count as usize;
    let max_fit = cursor.remaining() / record_size.max(1);
    if count_usize > max_fit {
        return Err(EffectError::CountTooLarge {
            context,
            count,
            max: u32::try_from(max_fit).unwrap_or(u32::MAX),
        });
    }
    Ok(count_usize)
}
