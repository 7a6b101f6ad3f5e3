//! Decoder for compiled Direct3D 9 effect binaries (`fx_2_0`), as embedded in XNA `.xnb` assets.
//!
//! An effect binary is one flat buffer of offset-indirected pools. Decoding runs in two passes:
//!
//! 1. the parameter and technique lists are walked and every value's self-describing type
//!    descriptor is resolved; object references tag entries of the object table with a kind,
//! 2. the object lists that follow fill in each tagged entry: strings, texture/sampler names,
//!    compiled shaders (bound to parameters through their constant tables) and standalone
//!    preshaders.
//!
//! Input is treated as **untrusted**. Any out-of-range code, index or read aborts the decode with
//! an [`EffectError`]; see [`EffectError::kind`] for the fault categories.

#![forbid(unsafe_code)]

mod cursor;
mod decoder;
mod effect;
mod error;
mod finalize;
mod header;
mod limits;
mod lists;
mod lookup;
mod model;
mod object;
mod options;
mod states;
mod symbol;
mod value;

/// Helpers for synthesizing effect binaries in tests.
///
/// Only available for this crate's own tests or with the `test-utils` feature.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::cursor::{BinaryCursor, Primitive};
pub use crate::effect::Effect;
pub use crate::error::{EffectError, FaultKind};
pub use crate::header::{EffectHeader, EFFECT_MAGIC, LEGACY_MAGIC};
pub use crate::limits::{DEFAULT_MAX_OBJECTS, DEFAULT_MAX_VALUE_DEPTH};
pub use crate::lookup::find_parameter;
pub use crate::model::{
    EffectAnnotation, EffectParameter, EffectPass, EffectPayload, EffectState, EffectTechnique,
    EffectValue, NumericValues, SamplerState,
};
pub use crate::object::{
    CompiledShader, EffectObject, EffectShader, ObjectData, ObjectState, SamplerRegister,
    ShaderPayload, StandalonePreshader,
};
pub use crate::options::{DecodeOptions, UntypedObjectPolicy};
pub use crate::states::{RenderStateType, SamplerStateType};
pub use crate::symbol::{StructMember, SymbolClass, SymbolType, SymbolTypeInfo};

pub use xnafx_shader as shader;
