//! The effect object table: strings, texture/sampler names and shader payloads addressed by index.

use tracing::trace;
use xnafx_shader::{Preshader, ShaderBytecode};

use crate::error::EffectError;
use crate::model::SamplerState;
use crate::symbol::SymbolType;

/// Lifecycle stage of an object-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// No value referenced the entry.
    Untyped,
    /// A value referenced the entry and assigned its kind.
    Typed,
    /// The finalization pass filled in the payload.
    Populated,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectObject {
    pub ty: Option<SymbolType>,
    pub data: Option<ObjectData>,
}

impl EffectObject {
    pub fn state(&self) -> ObjectState {
        match (self.ty, &self.data) {
            (_, Some(_)) => ObjectState::Populated,
            (Some(_), None) => ObjectState::Typed,
            (None, None) => ObjectState::Untyped,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match &self.data {
            Some(ObjectData::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&str> {
        match &self.data {
            Some(ObjectData::Mapping(name)) => Some(name),
            _ => None,
        }
    }

    pub fn as_shader(&self) -> Option<&EffectShader> {
        match &self.data {
            Some(ObjectData::Shader(shader)) => Some(shader),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    String(String),
    /// Name of the texture or sampler a texture/sampler object maps to.
    Mapping(String),
    Shader(EffectShader),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectShader {
    /// Owning technique, for shaders bound through a pass state.
    pub technique: Option<u32>,
    /// Owning pass within [`EffectShader::technique`].
    pub pass: Option<u32>,
    pub payload: ShaderPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShaderPayload {
    Compiled(CompiledShader),
    Preshader(StandalonePreshader),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledShader {
    pub bytecode: Vec<u8>,
    /// `None` when shader parsing was disabled.
    pub shader: Option<ShaderBytecode>,
    /// Global parameter index of each constant-table symbol, in symbol order.
    pub parameters: Vec<usize>,
    pub samplers: Vec<SamplerRegister>,
    /// Global parameter index of each embedded preshader symbol.
    pub preshader_parameters: Vec<usize>,
}

/// A shader-local sampler bound to its global parameter's sampler states.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerRegister {
    pub name: String,
    pub register: u16,
    pub parameter: usize,
    pub states: Vec<SamplerState>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandalonePreshader {
    /// Parameter named by the payload header.
    pub parameter: usize,
    pub bytecode: Vec<u8>,
    /// `None` when shader parsing was disabled.
    pub preshader: Option<Preshader>,
    pub parameters: Vec<usize>,
}

/// Fixed-size table, allocated once from the header's object count.
#[derive(Debug)]
pub(crate) struct ObjectTable {
    objects: Vec<EffectObject>,
}

impl ObjectTable {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            objects: vec![EffectObject::default(); count],
        }
    }

    fn entry_mut(&mut self, index: u32) -> Result<&mut EffectObject, EffectError> {
        let count = self.objects.len();
        self.objects
            .get_mut(index as usize)
            .ok_or(EffectError::ObjectIndexOutOfRange { index, count })
    }

    pub(crate) fn ty(&self, index: u32) -> Result<Option<SymbolType>, EffectError> {
        self.objects
            .get(index as usize)
            .map(|object| object.ty)
            .ok_or(EffectError::ObjectIndexOutOfRange {
                index,
                count: self.objects.len(),
            })
    }

    /// Assigns the kind of an entry. A later tag overwrites an earlier one: sampler states
    /// retag the texture object they reference with the sampler's type.
    pub(crate) fn tag(&mut self, index: u32, ty: SymbolType) -> Result<(), EffectError> {
        let entry = self.entry_mut(index)?;
        if let Some(previous) = entry.ty.filter(|&previous| previous != ty) {
            trace!(index, ?previous, ?ty, "retagging effect object");
        }
        entry.ty = Some(ty);
        Ok(())
    }

    pub(crate) fn populate(&mut self, index: u32, data: ObjectData) -> Result<(), EffectError> {
        let entry = self.entry_mut(index)?;
        if entry.data.is_some() {
            return Err(EffectError::ObjectAlreadyPopulated {
                index,
                ty: entry.ty.unwrap_or(SymbolType::Void),
            });
        }
        entry.data = Some(data);
        Ok(())
    }

    pub(crate) fn into_vec(self) -> Vec<EffectObject> {
        self.objects
    }
}
