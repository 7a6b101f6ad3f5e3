//! Block framing of compressed XNB payloads.
//!
//! The compressed payload is a sequence of LZX blocks, each prefixed by a big-endian 16-bit
//! compressed size. A leading `0xFF` byte marks a block whose decompressed frame size is given
//! explicitly (otherwise it is 32 KiB). The LZX codec itself is supplied by the caller.

use tracing::trace;

use crate::error::{DecompressError, XnbError};

const DEFAULT_FRAME_SIZE: usize = 0x8000;

/// An LZX decoder fed one block at a time.
///
/// Implementations keep their window state across calls, as LZX blocks reference earlier output.
pub trait Decompressor {
    /// Decodes `block` and appends up to `frame_size` bytes to `out`.
    fn decompress_block(
        &mut self,
        block: &[u8],
        frame_size: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), DecompressError>;
}

/// Walks the block framing of `input`, expecting exactly `decompressed_size` bytes of output.
pub fn decompress_payload(
    input: &[u8],
    decompressed_size: usize,
    decompressor: &mut dyn Decompressor,
) -> Result<Vec<u8>, XnbError> {
    let byte = |pos: usize| -> Result<usize, XnbError> {
        input
            .get(pos)
            .map(|&b| usize::from(b))
            .ok_or(XnbError::OutOfBounds {
                offset: pos,
                len: 1,
                size: input.len(),
            })
    };

    let mut out = Vec::with_capacity(decompressed_size.min(input.len().saturating_mul(16)));
    let mut pos = 0usize;
    while pos < input.len() {
        let (frame_size, block_size, header_len) = if byte(pos)? == 0xFF {
            let frame_size = (byte(pos + 1)? << 8) | byte(pos + 2)?;
            let block_size = (byte(pos + 3)? << 8) | byte(pos + 4)?;
            (frame_size, block_size, 5)
        } else {
            let block_size = (byte(pos)? << 8) | byte(pos + 1)?;
            (DEFAULT_FRAME_SIZE, block_size, 2)
        };
        if block_size == 0 || frame_size == 0 {
            break;
        }
        let start = pos + header_len;
        let block = input
            .get(start..start + block_size)
            .ok_or(XnbError::OutOfBounds {
                offset: start,
                len: block_size,
                size: input.len(),
            })?;
        trace!(offset = pos, block_size, frame_size, "lzx block");
        decompressor
            .decompress_block(block, frame_size, &mut out)
            .map_err(|source| XnbError::Decompress {
                offset: pos,
                source,
            })?;
        pos = start + block_size;
    }

    if out.len() != decompressed_size {
        return Err(XnbError::DecompressedSizeMismatch {
            expected: decompressed_size,
            actual: out.len(),
        });
    }
    Ok(out)
}
