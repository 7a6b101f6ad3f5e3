//! XNA `.xnb` asset envelope, as far as needed to reach an embedded effect binary.
//!
//! Layout: a 10-byte header (`XNB`, platform, version, flags, file size), an optional
//! decompressed size for compressed files, then the content stream: the type-reader list, the
//! shared-resource count and the primary asset. For effects the asset is an `i32` length followed
//! by the raw effect binary.
//!
//! LZX decoding of compressed files is delegated to a caller-supplied [`Decompressor`].

#![forbid(unsafe_code)]

mod compression;
mod error;
mod header;
mod reader;

/// Helpers for building XNB envelopes in tests.
///
/// Only available for this crate's own tests or with the `test-utils` feature.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::borrow::Cow;

use tracing::debug;

pub use crate::compression::{decompress_payload, Decompressor};
pub use crate::error::{DecompressError, XnbError};
pub use crate::header::{Platform, XnbHeader, COMPRESSED_HEADER_LEN, HEADER_LEN};

use crate::reader::ContentReader;

/// Type reader used by XNA for compiled effects.
pub const EFFECT_READER: &str = "Microsoft.Xna.Framework.Content.EffectReader";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReader {
    pub name: String,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XnbEffectAsset {
    pub header: XnbHeader,
    pub readers: Vec<TypeReader>,
    pub shared_resources: u32,
    /// `None` when the primary asset is null (type reader index 0).
    pub effect: Option<Vec<u8>>,
}

/// The content stream of `bytes`, decompressed if needed.
pub fn content_stream<'a>(
    bytes: &'a [u8],
    header: &XnbHeader,
    decompressor: Option<&mut dyn Decompressor>,
) -> Result<Cow<'a, [u8]>, XnbError> {
    let start = header.header_len();
    let Some(decompressed_size) = header.decompressed_size else {
        let body = bytes.get(start..).ok_or(XnbError::OutOfBounds {
            offset: start,
            len: 0,
            size: bytes.len(),
        })?;
        return Ok(Cow::Borrowed(body));
    };

    let decompressor = decompressor.ok_or(XnbError::CompressionUnsupported)?;
    let compressed_len = (header.file_size as usize)
        .checked_sub(COMPRESSED_HEADER_LEN)
        .ok_or(XnbError::InvalidLength {
            what: "compressed file",
            value: i64::from(header.file_size),
        })?;
    let compressed = bytes
        .get(start..start + compressed_len)
        .ok_or(XnbError::OutOfBounds {
            offset: start,
            len: compressed_len,
            size: bytes.len(),
        })?;
    debug!(compressed_len, decompressed_size, "decompressing xnb payload");
    decompress_payload(compressed, decompressed_size as usize, decompressor).map(Cow::Owned)
}

/// Parses an XNB file whose primary asset is an effect and returns the raw effect binary.
pub fn read_effect_asset(
    bytes: &[u8],
    decompressor: Option<&mut dyn Decompressor>,
) -> Result<XnbEffectAsset, XnbError> {
    let header = XnbHeader::parse(bytes)?;
    debug!(?header, "parsed xnb header");
    let content = content_stream(bytes, &header, decompressor)?;
    let mut r = ContentReader::new(&content);

    let reader_count = r.read_7bit_int()?;
    let mut readers = Vec::new();
    for _ in 0..reader_count {
        let name = r.read_string()?;
        let version = r.read_i32()?;
        readers.push(TypeReader { name, version });
    }
    let shared_resources = r.read_7bit_int()?;

    let reader_index = r.read_7bit_int()?;
    let effect = if reader_index == 0 {
        None
    } else {
        let count = readers.len();
        let reader = readers
            .get(reader_index as usize - 1)
            .ok_or(XnbError::InvalidTypeReader {
                index: reader_index,
                count,
            })?;
        if !reader.name.starts_with(EFFECT_READER) {
            debug!(reader = %reader.name, "primary asset reader is not the effect reader");
        }
        let len = r.read_i32()?;
        let len = usize::try_from(len).map_err(|_| XnbError::InvalidLength {
            what: "effect",
            value: i64::from(len),
        })?;
        Some(r.read_bytes(len)?.to_vec())
    };

    Ok(XnbEffectAsset {
        header,
        readers,
        shared_resources,
        effect,
    })
}
