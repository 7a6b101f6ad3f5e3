use tracing::debug;

use crate::cursor::BinaryCursor;
use crate::error::EffectError;

/// Optional preamble magic emitted by older XNA content pipelines.
pub const LEGACY_MAGIC: u32 = 0xBCF0_0BCF;
/// Effect binary magic (`fx_2_0`).
pub const EFFECT_MAGIC: u32 = 0xFEFF_0901;

/// Leading counts of the metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectHeader {
    pub parameter_count: u32,
    pub technique_count: u32,
    pub object_count: u32,
}

/// The two cursors every later stage works from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderLayout<'a> {
    /// Origin of every pool offset in the blob.
    pub base: BinaryCursor<'a>,
    /// Positioned just after the header counts, at the first parameter record.
    pub table: BinaryCursor<'a>,
    pub header: EffectHeader,
}

pub(crate) fn parse_header(bytes: &[u8]) -> Result<HeaderLayout<'_>, EffectError> {
    let mut cursor = BinaryCursor::new(bytes);
    let mut magic = cursor.read::<u32>()?;
    if magic == LEGACY_MAGIC {
        let len = cursor.read::<u32>()?;
        let skip = len
            .checked_sub(8)
            .ok_or(EffectError::InvalidLegacyLength { len })?;
        debug!(len, "skipping legacy effect preamble");
        cursor.skip(skip as usize)?;
        magic = cursor.read::<u32>()?;
    }
    if magic != EFFECT_MAGIC {
        return Err(EffectError::BadMagic {
            found: magic,
            expected: EFFECT_MAGIC,
        });
    }

    let table_offset = cursor.read::<u32>()?;
    // Pool offsets count from the end of the table-offset field.
    let base = cursor.slice(0)?;
    let mut table = base.slice(table_offset as usize)?;
    let parameter_count = table.read::<u32>()?;
    let technique_count = table.read::<u32>()?;
    let _reserved = table.read::<u32>()?;
    let object_count = table.read::<u32>()?;

    let header = EffectHeader {
        parameter_count,
        technique_count,
        object_count,
    };
    debug!(table_offset, ?header, "parsed effect header");
    Ok(HeaderLayout {
        base,
        table,
        header,
    })
}
