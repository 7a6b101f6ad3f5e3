//! Direct3D 9 shader bytecode helpers for compiled effect objects.
//!
//! Effect binaries embed SM1-SM3 token streams for their vertex and pixel shaders, and
//! standalone preshader programs for passes that only compute constants. This crate extracts
//! what an effect decoder needs from them without translating or executing any instruction:
//!
//! - the shader version and the leading comment blocks,
//! - the `CTAB` constant table (the shader-local symbol table and register bindings),
//! - preshader programs (`PRES` with `CLIT`/`FXLC`/`PRSI`/`CTAB` blocks).
//!
//! All inputs are treated as **untrusted**: every offset and count is bounds-checked and
//! malformed data is reported as a [`ShaderError`], never a panic.

#![forbid(unsafe_code)]

mod bytes;
mod ctab;
mod error;
mod fourcc;
mod preshader;
mod shader;
mod token;

/// Helpers for building synthetic shader bytecode in tests.
///
/// Only available for this crate's own tests or with the `test-utils` feature.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::ctab::{
    parse_ctab_chunk, ConstantMember, ConstantTable, ConstantType, RegisterSet, ShaderSymbol,
};
pub use crate::error::ShaderError;
pub use crate::fourcc::FourCC;
pub use crate::preshader::{
    OperandType, Preshader, PreshaderInstruction, PreshaderOpcode, PreshaderOperand,
};
pub use crate::shader::{ShaderBytecode, ShaderModel, ShaderStage};

/// Upper bound on accepted shader/preshader bytecode length.
///
/// Real SM3 shaders are a few KiB; the bound keeps hostile object records from driving large
/// token allocations.
pub const MAX_SHADER_BYTECODE_BYTES: usize = 1024 * 1024;
