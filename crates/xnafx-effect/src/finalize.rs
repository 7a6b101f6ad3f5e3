//! Second pass: fills in the payload of every object tagged while resolving values.
//!
//! The object records follow the technique list: a small-object list of
//! `{index, length, payload}` records, then a large-object list whose records locate their
//! object through a technique/pass/state (or parameter/sampler-state) path.

use tracing::{debug, trace};
use xnafx_shader::{Preshader, ShaderBytecode};

use crate::cursor::BinaryCursor;
use crate::error::EffectError;
use crate::limits::check_count;
use crate::lookup::find_parameter;
use crate::model::{EffectParameter, EffectTechnique, EffectValue, SamplerState};
use crate::object::{
    CompiledShader, EffectShader, ObjectData, ObjectTable, SamplerRegister, ShaderPayload,
    StandalonePreshader,
};
use crate::options::DecodeOptions;
use crate::symbol::SymbolType;

const SMALL_RECORD_BYTES: usize = 8;
const LARGE_RECORD_BYTES: usize = 24;
/// Large-object technique index meaning "path starts at a parameter".
const PARAMETER_PATH: u32 = u32::MAX;
/// Large-object kind flag of a standalone preshader.
const PRESHADER_FLAG: u32 = 2;

/// Bytes a payload of `len` bytes occupies in the object list.
///
/// `(len + 3) - ((len - 1) mod 4)` with wrapping `len - 1`: a multiple of four for any
/// `len >= 1`, and zero for an empty payload.
pub(crate) fn padded_len(len: u32) -> u64 {
    let len = u64::from(len);
    (len + 3) - (len.wrapping_sub(1) % 4)
}

fn take_payload<'a>(records: &mut BinaryCursor<'a>, len: u32) -> Result<&'a [u8], EffectError> {
    let payload = records.peek_bytes(0, len as usize)?;
    let padded = usize::try_from(padded_len(len)).map_err(|_| EffectError::OutOfBounds {
        offset: records.position(),
        len: len as usize,
        size: records.position() + records.remaining(),
    })?;
    records.skip(padded)?;
    Ok(payload)
}

fn first_object(value: &EffectValue, context: &'static str) -> Result<u32, EffectError> {
    value
        .object_indices()
        .and_then(|indices| indices.first().copied())
        .ok_or(EffectError::PayloadMismatch {
            context,
            expected: "object index",
        })
}

fn get<'t, T>(items: &'t [T], what: &'static str, index: u32) -> Result<&'t T, EffectError> {
    items
        .get(index as usize)
        .ok_or(EffectError::IndexOutOfRange {
            what,
            index,
            len: items.len(),
        })
}

pub(crate) struct Finalizer<'e> {
    pub parameters: &'e [EffectParameter],
    pub techniques: &'e [EffectTechnique],
    pub objects: &'e mut ObjectTable,
    pub options: &'e DecodeOptions,
}

impl Finalizer<'_> {
    /// Reads both object lists from `records`, positioned just after the technique list.
    pub(crate) fn run(&mut self, records: &mut BinaryCursor<'_>) -> Result<(), EffectError> {
        let small_count = records.read::<u32>()?;
        let large_count = records.read::<u32>()?;
        debug!(small_count, large_count, "finalizing effect objects");

        let small_count = check_count(records, "small objects", small_count, SMALL_RECORD_BYTES)?;
        for _ in 0..small_count {
            self.read_small_object(records)?;
        }
        let large_count = check_count(records, "large objects", large_count, LARGE_RECORD_BYTES)?;
        for _ in 0..large_count {
            self.read_large_object(records)?;
        }
        Ok(())
    }

    pub(crate) fn read_small_object(
        &mut self,
        records: &mut BinaryCursor<'_>,
    ) -> Result<(), EffectError> {
        let index = records.read::<u32>()?;
        let len = records.read::<u32>()?;
        let payload = take_payload(records, len)?;
        let ty = self.objects.ty(index)?;
        trace!(index, len, ?ty, "small object");

        let data = match ty {
            Some(SymbolType::String) => {
                ObjectData::String(BinaryCursor::new(payload).read_fixed_string(0, payload.len())?)
            }
            Some(ty) if ty.is_texture() || ty.is_sampler() => {
                ObjectData::Mapping(BinaryCursor::new(payload).read_fixed_string(0, payload.len())?)
            }
            Some(ty) if ty.is_shader() => ObjectData::Shader(EffectShader {
                technique: None,
                pass: None,
                payload: ShaderPayload::Compiled(self.compiled_shader(index, payload)?),
            }),
            _ => return Err(EffectError::UnsupportedObject { index, ty }),
        };
        self.objects.populate(index, data)
    }

    fn read_large_object(&mut self, records: &mut BinaryCursor<'_>) -> Result<(), EffectError> {
        let technique = records.read::<u32>()?;
        let path_index = records.read::<u32>()?;
        let _reserved = records.read::<u32>()?;
        let state = records.read::<u32>()?;
        let flag = records.read::<u32>()?;
        let len = records.read::<u32>()?;
        let payload = take_payload(records, len)?;

        let index = if technique == PARAMETER_PATH {
            let parameter = get(self.parameters, "parameter", path_index)?;
            let states = parameter
                .value
                .sampler_states()
                .ok_or(EffectError::PayloadMismatch {
                    context: "large object parameter",
                    expected: "sampler states",
                })?;
            first_object(&get(states, "sampler state", state)?.value, "large object sampler state")?
        } else {
            let pass = get(
                &get(self.techniques, "technique", technique)?.passes,
                "pass",
                path_index,
            )?;
            first_object(&get(&pass.states, "state", state)?.value, "large object pass state")?
        };
        let ty = self.objects.ty(index)?;
        trace!(index, technique, path_index, state, flag, len, ?ty, "large object");

        let (owner_technique, owner_pass) = if technique == PARAMETER_PATH {
            (None, None)
        } else {
            (Some(technique), Some(path_index))
        };
        let data = match ty {
            Some(ty) if ty.is_shader() => {
                let payload = if flag == PRESHADER_FLAG {
                    ShaderPayload::Preshader(self.standalone_preshader(index, payload)?)
                } else {
                    ShaderPayload::Compiled(self.compiled_shader(index, payload)?)
                };
                ObjectData::Shader(EffectShader {
                    technique: owner_technique,
                    pass: owner_pass,
                    payload,
                })
            }
            Some(ty) if ty.is_texture() || ty.is_sampler() => {
                ObjectData::Mapping(BinaryCursor::new(payload).read_fixed_string(0, payload.len())?)
            }
            None | Some(SymbolType::Void) => {
                trace!(index, "skipping large object without a kind");
                return Ok(());
            }
            Some(_) => return Err(EffectError::UnsupportedObject { index, ty }),
        };
        self.objects.populate(index, data)
    }

    fn compiled_shader(&self, index: u32, bytecode: &[u8]) -> Result<CompiledShader, EffectError> {
        if !self.options.parse_shaders {
            return Ok(CompiledShader {
                bytecode: bytecode.to_vec(),
                shader: None,
                parameters: Vec::new(),
                samplers: Vec::new(),
                preshader_parameters: Vec::new(),
            });
        }

        let shader = ShaderBytecode::parse(bytecode)
            .map_err(|source| EffectError::Shader { index, source })?;
        let parameters = shader
            .symbols()
            .iter()
            .map(|symbol| find_parameter(self.parameters, &symbol.name))
            .collect::<Result<Vec<_>, _>>()?;
        let samplers = shader
            .samplers()
            .map(|symbol| {
                let parameter = find_parameter(self.parameters, &symbol.name)?;
                Ok(SamplerRegister {
                    name: symbol.name.clone(),
                    register: symbol.register_index,
                    parameter,
                    states: self.sampler_states_of(parameter)?.to_vec(),
                })
            })
            .collect::<Result<Vec<_>, EffectError>>()?;
        let preshader_parameters = match &shader.preshader {
            Some(preshader) => self.bind_symbols(preshader)?,
            None => Vec::new(),
        };
        trace!(
            index,
            stage = ?shader.stage,
            symbols = parameters.len(),
            samplers = samplers.len(),
            "parsed shader object"
        );

        Ok(CompiledShader {
            bytecode: bytecode.to_vec(),
            shader: Some(shader),
            parameters,
            samplers,
            preshader_parameters,
        })
    }

    /// Payload: a length-prefixed parameter name, then the preshader token stream.
    fn standalone_preshader(
        &self,
        index: u32,
        payload: &[u8],
    ) -> Result<StandalonePreshader, EffectError> {
        let header = BinaryCursor::new(payload);
        let name = header.read_length_prefixed_string(0)?;
        let start = (header.peek::<u32>(0)? as usize).saturating_add(4);
        let bytecode = payload.get(start..).ok_or(EffectError::OutOfBounds {
            offset: start,
            len: 0,
            size: payload.len(),
        })?;
        let parameter = find_parameter(self.parameters, &name)?;

        let (preshader, parameters) = if self.options.parse_shaders {
            let preshader = Preshader::parse(bytecode)
                .map_err(|source| EffectError::Shader { index, source })?;
            let parameters = self.bind_symbols(&preshader)?;
            (Some(preshader), parameters)
        } else {
            (None, Vec::new())
        };
        trace!(index, %name, parameter, "parsed standalone preshader");

        Ok(StandalonePreshader {
            parameter,
            bytecode: bytecode.to_vec(),
            preshader,
            parameters,
        })
    }

    fn bind_symbols(&self, preshader: &Preshader) -> Result<Vec<usize>, EffectError> {
        preshader
            .symbols
            .iter()
            .map(|symbol| find_parameter(self.parameters, &symbol.name))
            .collect()
    }

    fn sampler_states_of(&self, parameter: usize) -> Result<&[SamplerState], EffectError> {
        self.parameters
            .get(parameter)
            .and_then(|parameter| parameter.value.sampler_states())
            .ok_or(EffectError::PayloadMismatch {
                context: "sampler register",
                expected: "sampler states",
            })
    }
}
