use thiserror::Error;
use xnafx_shader::ShaderError;

use crate::symbol::{SymbolClass, SymbolType};

/// Fault categories of a failed decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Bad magic or otherwise unrecognized container.
    ContainerFormat,
    /// A class/type code or index outside its permitted range.
    Decode,
    /// A read or slice past the end of the buffer.
    Bounds,
    /// A shader symbol or preshader binding names no effect parameter.
    Lookup,
    /// An object record targets an object kind the finalizer cannot populate.
    UnsupportedObject,
    /// Input that needs a translation step this crate does not provide.
    NotImplemented,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("bad effect magic 0x{found:08x}, expected 0x{expected:08x}")]
    BadMagic { found: u32, expected: u32 },
    #[error("read of {len} bytes at offset {offset} exceeds buffer of {size} bytes")]
    OutOfBounds { offset: usize, len: usize, size: usize },
    #[error("{context} declares {count} entries, more than the limit of {max}")]
    CountTooLarge {
        context: &'static str,
        count: u32,
        max: u32,
    },
    #[error("effect declares {count} objects, more than the limit of {max}")]
    TooManyObjects { count: u32, max: u32 },
    #[error("{context}: symbol class {class} is outside {min:?}..={max:?}")]
    InvalidSymbolClass {
        context: &'static str,
        class: u32,
        min: SymbolClass,
        max: SymbolClass,
    },
    #[error("{context}: symbol type {ty} is outside {min:?}..={max:?}")]
    InvalidSymbolType {
        context: &'static str,
        ty: u32,
        min: SymbolType,
        max: SymbolType,
    },
    #[error("legacy preamble declares length {len}, shorter than its own 8-byte header")]
    InvalidLegacyLength { len: u32 },
    #[error("{context}: {rows}x{columns} exceeds the 4-wide register layout")]
    InvalidDimensions {
        context: &'static str,
        rows: u32,
        columns: u32,
    },
    #[error("object index {index} is outside the object table of {count} entries")]
    ObjectIndexOutOfRange { index: u32, count: usize },
    #[error("object {index} ({ty:?}) was already populated")]
    ObjectAlreadyPopulated { index: u32, ty: SymbolType },
    #[error("{what} index {index} is outside 0..{len}")]
    IndexOutOfRange {
        what: &'static str,
        index: u32,
        len: usize,
    },
    #[error("{context}: expected a {expected} payload")]
    PayloadMismatch {
        context: &'static str,
        expected: &'static str,
    },
    #[error("value nesting exceeds the depth limit of {max}")]
    ValueTooDeep { max: u32 },
    #[error("no effect parameter named {name:?}")]
    ParameterNotFound { name: String },
    #[error("object {index} has unsupported type {ty:?}")]
    UnsupportedObject { index: u32, ty: Option<SymbolType> },
    #[error("{count} objects are still untyped after finalization (first: {first})")]
    UntypedObjects { count: usize, first: u32 },
    #[error("shader object {index}: {source}")]
    Shader {
        index: u32,
        #[source]
        source: ShaderError,
    },
}

impl EffectError {
    pub fn kind(&self) -> FaultKind {
        match self {
            EffectError::BadMagic { .. } | EffectError::InvalidLegacyLength { .. } => {
                FaultKind::ContainerFormat
            }
            EffectError::OutOfBounds { .. } | EffectError::CountTooLarge { .. } => {
                FaultKind::Bounds
            }
            EffectError::ParameterNotFound { .. } => FaultKind::Lookup,
            EffectError::UnsupportedObject { .. } => FaultKind::UnsupportedObject,
            EffectError::Shader {
                source: ShaderError::NotImplemented(_),
                ..
            } => FaultKind::NotImplemented,
            EffectError::TooManyObjects { .. }
            | EffectError::InvalidSymbolClass { .. }
            | EffectError::InvalidSymbolType { .. }
            | EffectError::InvalidDimensions { .. }
            | EffectError::ObjectIndexOutOfRange { .. }
            | EffectError::ObjectAlreadyPopulated { .. }
            | EffectError::IndexOutOfRange { .. }
            | EffectError::PayloadMismatch { .. }
            | EffectError::ValueTooDeep { .. }
            | EffectError::UntypedObjects { .. }
            | EffectError::Shader { .. } => FaultKind::Decode,
        }
    }
}
