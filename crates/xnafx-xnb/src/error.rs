use thiserror::Error;

/// Error returned by a [`crate::Decompressor`] implementation.
pub type DecompressError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum XnbError {
    #[error("not an XNB file (magic {found:?})")]
    BadMagic { found: [u8; 3] },
    #[error("unknown XNB target platform {0:?}")]
    UnknownPlatform(char),
    #[error("unsupported XNB version {0} (expected 4 or 5)")]
    UnsupportedVersion(u8),
    #[error("read of {len} bytes at offset {offset} exceeds buffer of {size} bytes")]
    OutOfBounds { offset: usize, len: usize, size: usize },
    #[error("malformed 7-bit encoded integer at offset {offset}")]
    InvalidVarInt { offset: usize },
    #[error("{what} has invalid length {value}")]
    InvalidLength { what: &'static str, value: i64 },
    #[error("type reader name at offset {offset} is not valid UTF-8")]
    InvalidString { offset: usize },
    #[error("XNB payload is compressed and no decompressor was supplied")]
    CompressionUnsupported,
    #[error("decompression produced {actual} bytes, header declares {expected}")]
    DecompressedSizeMismatch { expected: usize, actual: usize },
    #[error("decompressing block at offset {offset}")]
    Decompress {
        offset: usize,
        #[source]
        source: DecompressError,
    },
    #[error("type reader index {index} is outside the {count} declared readers")]
    InvalidTypeReader { index: u32, count: usize },
}
