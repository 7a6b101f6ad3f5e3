//! Decoded effect tree: values, parameters, techniques and passes.

use crate::states::{RenderStateType, SamplerStateType};
use crate::symbol::SymbolTypeInfo;

/// Flat numeric payload, typed by element kind.
///
/// Every logical row occupies a full 4-wide register, so lanes past the declared column count
/// are present and zero.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericValues {
    Bool(Vec<bool>),
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl NumericValues {
    pub fn len(&self) -> usize {
        match self {
            NumericValues::Bool(v) => v.len(),
            NumericValues::Int(v) => v.len(),
            NumericValues::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectPayload {
    /// Scalar, vector, matrix and (flattened) struct values.
    Numeric(NumericValues),
    /// Object-class values other than samplers: indices into the object table.
    Objects(Vec<u32>),
    /// Sampler-class values.
    SamplerStates(Vec<SamplerState>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectValue {
    pub name: String,
    pub semantic: String,
    pub ty: SymbolTypeInfo,
    pub payload: EffectPayload,
}

impl EffectValue {
    pub fn as_floats(&self) -> Option<&[f32]> {
        match &self.payload {
            EffectPayload::Numeric(NumericValues::Float(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i32]> {
        match &self.payload {
            EffectPayload::Numeric(NumericValues::Int(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_bools(&self) -> Option<&[bool]> {
        match &self.payload {
            EffectPayload::Numeric(NumericValues::Bool(v)) => Some(v),
            _ => None,
        }
    }

    pub fn object_indices(&self) -> Option<&[u32]> {
        match &self.payload {
            EffectPayload::Objects(v) => Some(v),
            _ => None,
        }
    }

    pub fn sampler_states(&self) -> Option<&[SamplerState]> {
        match &self.payload {
            EffectPayload::SamplerStates(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerState {
    pub ty: SamplerStateType,
    pub value: EffectValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectAnnotation {
    pub value: EffectValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectParameter {
    pub value: EffectValue,
    pub flags: u32,
    pub annotations: Vec<EffectAnnotation>,
}

impl EffectParameter {
    pub fn name(&self) -> &str {
        &self.value.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectState {
    pub ty: RenderStateType,
    pub value: EffectValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectPass {
    pub name: String,
    pub annotations: Vec<EffectAnnotation>,
    pub states: Vec<EffectState>,
}

impl EffectPass {
    pub fn state(&self, ty: RenderStateType) -> Option<&EffectState> {
        self.states.iter().find(|state| state.ty == ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectTechnique {
    pub name: String,
    pub annotations: Vec<EffectAnnotation>,
    pub passes: Vec<EffectPass>,
}

impl EffectTechnique {
    pub fn pass(&self, name: &str) -> Option<&EffectPass> {
        self.passes.iter().find(|pass| pass.name == name)
    }
}
