use thiserror::Error;

use crate::fourcc::FourCC;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("shader bytecode is empty")]
    Empty,
    #[error("shader bytecode length {len} is not a multiple of 4")]
    InvalidByteLength { len: usize },
    #[error("shader bytecode length {len} exceeds maximum {max} bytes")]
    BytecodeTooLarge { len: usize, max: usize },
    #[error("unsupported shader version token 0x{token:08x}")]
    InvalidVersionToken { token: u32 },
    #[error("comment at token {at_token} needs {needed} tokens, only {remaining} remaining")]
    TruncatedComment {
        at_token: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("read of {len} bytes at offset {offset} is outside {block} block of {size} bytes")]
    OutOfBounds {
        block: FourCC,
        offset: usize,
        len: usize,
        size: usize,
    },
    #[error("invalid {block} block: {reason}")]
    InvalidBlock { block: FourCC, reason: String },
    #[error("preshader contains more than one {0} block")]
    DuplicateBlock(FourCC),
    #[error("preshader is missing its {0} block")]
    MissingBlock(FourCC),
    #[error("unknown preshader opcode 0x{0:04x}")]
    UnknownPreshaderOpcode(u16),
    #[error("unknown preshader operand type {0}")]
    UnknownOperandType(u32),
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl ShaderError {
    pub(crate) fn invalid_block(block: FourCC, reason: impl Into<String>) -> Self {
        ShaderError::InvalidBlock {
            block,
            reason: reason.into(),
        }
    }
}
