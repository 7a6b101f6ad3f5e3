//! Type-descriptor and value decoding.
//!
//! A value is a `(type_offset, value_offset)` pair into the base pool. The type descriptor starts
//! with `{type, class, name, semantic, elements}`; what follows depends on the class.

use tracing::trace;

use crate::cursor::BinaryCursor;
use crate::decoder::Decoder;
use crate::error::EffectError;
use crate::limits::check_count;
use crate::model::{EffectPayload, EffectValue, NumericValues, SamplerState};
use crate::states::SamplerStateType;
use crate::symbol::{StructMember, SymbolClass, SymbolType, SymbolTypeInfo};

const STRUCT_MEMBER_BYTES: usize = 28;
const SAMPLER_STATE_BYTES: usize = 16;
/// Leftover high bits on sampler state codes.
const SAMPLER_STATE_MASK: u32 = !0xA0;
/// Register lanes per row.
const LANES: u32 = 4;

fn symbol_class(
    raw: u32,
    context: &'static str,
    min: SymbolClass,
    max: SymbolClass,
) -> Result<SymbolClass, EffectError> {
    SymbolClass::from_raw(raw)
        .filter(|class| (min..=max).contains(class))
        .ok_or(EffectError::InvalidSymbolClass {
            context,
            class: raw,
            min,
            max,
        })
}

fn symbol_type(
    raw: u32,
    context: &'static str,
    min: SymbolType,
    max: SymbolType,
) -> Result<SymbolType, EffectError> {
    SymbolType::from_raw(raw)
        .filter(|ty| (min..=max).contains(ty))
        .ok_or(EffectError::InvalidSymbolType {
            context,
            ty: raw,
            min,
            max,
        })
}

/// `4 * rows * max(elements, 1)`: the scalar footprint of a numeric type.
fn register_footprint(
    context: &'static str,
    rows: u32,
    columns: u32,
    elements: u32,
) -> Result<u32, EffectError> {
    if columns > LANES {
        return Err(EffectError::InvalidDimensions {
            context,
            rows,
            columns,
        });
    }
    LANES
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(elements.max(1)))
        .ok_or(EffectError::InvalidDimensions {
            context,
            rows,
            columns,
        })
}

impl<'a> Decoder<'a, '_> {
    /// Decodes the value described at `type_offset` with its data at `value_offset`.
    pub(crate) fn resolve_value(
        &mut self,
        type_offset: u32,
        value_offset: u32,
    ) -> Result<EffectValue, EffectError> {
        self.resolve_value_at_depth(type_offset, value_offset, 0)
    }

    fn resolve_value_at_depth(
        &mut self,
        type_offset: u32,
        value_offset: u32,
        depth: u32,
    ) -> Result<EffectValue, EffectError> {
        if depth > self.options.max_value_depth {
            return Err(EffectError::ValueTooDeep {
                max: self.options.max_value_depth,
            });
        }

        let mut ty_cursor = self.at(type_offset)?;
        let raw_type = ty_cursor.read::<u32>()?;
        let raw_class = ty_cursor.read::<u32>()?;
        let name_offset = ty_cursor.read::<u32>()?;
        let semantic_offset = ty_cursor.read::<u32>()?;
        let elements = ty_cursor.read::<u32>()?;

        let class = symbol_class(raw_class, "value", SymbolClass::Scalar, SymbolClass::Struct)?;
        let name = self.string_at(name_offset)?;
        let semantic = self.string_at(semantic_offset)?;
        trace!(%name, ?class, raw_type, elements, depth, "resolving value");

        let (ty, payload) = match class {
            SymbolClass::Scalar
            | SymbolClass::Vector
            | SymbolClass::MatrixRows
            | SymbolClass::MatrixColumns => {
                let ty =
                    symbol_type(raw_type, "numeric value", SymbolType::Bool, SymbolType::Float)?;
                let columns = ty_cursor.read::<u32>()?;
                let rows = ty_cursor.read::<u32>()?;
                let values = self.read_numeric(ty, rows, columns, elements, value_offset)?;
                let info = SymbolTypeInfo {
                    class,
                    ty,
                    rows,
                    columns,
                    elements,
                    members: Vec::new(),
                };
                (info, EffectPayload::Numeric(values))
            }
            SymbolClass::Object => {
                let ty = symbol_type(
                    raw_type,
                    "object value",
                    SymbolType::String,
                    SymbolType::VertexShader,
                )?;
                let payload = if ty.is_sampler() {
                    EffectPayload::SamplerStates(self.read_sampler_states(ty, value_offset, depth)?)
                } else {
                    EffectPayload::Objects(self.read_object_indices(ty, elements, value_offset)?)
                };
                let info = SymbolTypeInfo {
                    class,
                    ty,
                    rows: 0,
                    columns: 0,
                    elements,
                    members: Vec::new(),
                };
                (info, payload)
            }
            SymbolClass::Struct => {
                let ty = SymbolType::from_raw(raw_type).ok_or(EffectError::InvalidSymbolType {
                    context: "struct value",
                    ty: raw_type,
                    min: SymbolType::Void,
                    max: SymbolType::Unsupported,
                })?;
                self.read_struct(ty, elements, ty_cursor)?
            }
            // Excluded by the range check above.
            SymbolClass::Total => {
                return Err(EffectError::InvalidSymbolClass {
                    context: "value",
                    class: raw_class,
                    min: SymbolClass::Scalar,
                    max: SymbolClass::Struct,
                })
            }
        };

        Ok(EffectValue {
            name,
            semantic,
            ty,
            payload,
        })
    }

    /// Reads `columns` lanes of each 4-wide row group; the remaining lanes stay zero.
    fn read_numeric(
        &self,
        ty: SymbolType,
        rows: u32,
        columns: u32,
        elements: u32,
        value_offset: u32,
    ) -> Result<NumericValues, EffectError> {
        let total = register_footprint("numeric value", rows, columns, elements)?;
        let total = check_count(&self.base, "numeric value", total, 1)?;
        let groups = total / LANES as usize;
        let columns = columns as usize;
        let src = self.at(value_offset)?;

        macro_rules! gather {
            ($variant:ident, $zero:expr, |$cursor:ident, $at:ident| $read:expr) => {{
                let mut out = vec![$zero; total];
                for group in 0..groups {
                    for lane in 0..columns {
                        let $at = (columns * group + lane) * 4;
                        let $cursor = &src;
                        out[group * LANES as usize + lane] = $read;
                    }
                }
                NumericValues::$variant(out)
            }};
        }

        Ok(match ty {
            SymbolType::Bool => gather!(Bool, false, |c, at| c.peek::<u32>(at)? != 0),
            SymbolType::Int => gather!(Int, 0, |c, at| c.peek::<i32>(at)?),
            _ => gather!(Float, 0.0, |c, at| c.peek::<f32>(at)?),
        })
    }

    fn read_object_indices(
        &mut self,
        ty: SymbolType,
        elements: u32,
        value_offset: u32,
    ) -> Result<Vec<u32>, EffectError> {
        let mut src = self.at(value_offset)?;
        let count = check_count(&src, "object indices", elements.max(1), 4)?;
        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            let index = src.read::<u32>()?;
            self.objects.tag(index, ty)?;
            indices.push(index);
        }
        Ok(indices)
    }

    fn read_sampler_states(
        &mut self,
        sampler: SymbolType,
        value_offset: u32,
        depth: u32,
    ) -> Result<Vec<SamplerState>, EffectError> {
        let mut src = self.at(value_offset)?;
        let count = src.read::<u32>()?;
        let count = check_count(&src, "sampler states", count, SAMPLER_STATE_BYTES)?;
        let mut states = Vec::with_capacity(count);
        for _ in 0..count {
            let ty = SamplerStateType::from_raw(src.read::<u32>()? & SAMPLER_STATE_MASK);
            src.skip(4)?;
            let type_offset = src.read::<u32>()?;
            let value_offset = src.read::<u32>()?;
            let value = self.resolve_value_at_depth(type_offset, value_offset, depth + 1)?;
            if ty == SamplerStateType::Texture {
                let index = value
                    .object_indices()
                    .and_then(|indices| indices.first().copied())
                    .ok_or(EffectError::PayloadMismatch {
                        context: "sampler texture state",
                        expected: "object index",
                    })?;
                self.objects.tag(index, sampler)?;
            }
            states.push(SamplerState { ty, value });
        }
        Ok(states)
    }

    /// Struct member values are packed in the type pool right after the member descriptors.
    ///
    /// Members are copied densely: each member repetition contributes `columns` floats and the
    /// result is zero-padded to `stride * max(elements, 1)`.
    fn read_struct(
        &self,
        ty: SymbolType,
        elements: u32,
        mut ty_cursor: BinaryCursor<'a>,
    ) -> Result<(SymbolTypeInfo, EffectPayload), EffectError> {
        let member_count = ty_cursor.read::<u32>()?;
        let member_count =
            check_count(&ty_cursor, "struct members", member_count, STRUCT_MEMBER_BYTES)?;
        let mut members = Vec::with_capacity(member_count);
        let mut stride = 0u32;
        for _ in 0..member_count {
            let raw_type = ty_cursor.read::<u32>()?;
            let raw_class = ty_cursor.read::<u32>()?;
            let name_offset = ty_cursor.read::<u32>()?;
            let _semantic_offset = ty_cursor.read::<u32>()?;
            let elements = ty_cursor.read::<u32>()?;
            let columns = ty_cursor.read::<u32>()?;
            let rows = ty_cursor.read::<u32>()?;

            let class = symbol_class(
                raw_class,
                "struct member",
                SymbolClass::Scalar,
                SymbolClass::MatrixColumns,
            )?;
            let ty = symbol_type(raw_type, "struct member", SymbolType::Bool, SymbolType::Float)?;
            let footprint = register_footprint("struct member", rows, columns, elements)?;
            stride = stride
                .checked_add(footprint)
                .ok_or(EffectError::InvalidDimensions {
                    context: "struct",
                    rows,
                    columns,
                })?;
            members.push(StructMember {
                name: self.string_at(name_offset)?,
                info: SymbolTypeInfo {
                    class,
                    ty,
                    rows,
                    columns,
                    elements,
                    members: Vec::new(),
                },
            });
        }

        let total = stride
            .checked_mul(elements.max(1))
            .ok_or(EffectError::InvalidDimensions {
                context: "struct",
                rows: 1,
                columns: stride,
            })?;
        let total = check_count(&self.base, "struct value", total, 1)?;
        let mut values = vec![0.0f32; total];
        let mut dst = 0usize;
        for _ in 0..elements.max(1) {
            for member in &members {
                for _ in 0..member.info.repetitions() {
                    for _ in 0..member.info.columns {
                        let slot = values.get_mut(dst).ok_or(EffectError::InvalidDimensions {
                            context: "struct member",
                            rows: member.info.rows,
                            columns: member.info.columns,
                        })?;
                        *slot = f32::from_bits(ty_cursor.read::<u32>()?);
                        dst += 1;
                    }
                }
            }
        }

        let info = SymbolTypeInfo {
            class: SymbolClass::Struct,
            ty,
            rows: 1,
            columns: stride,
            elements,
            members,
        };
        Ok((info, EffectPayload::Numeric(NumericValues::Float(values))))
    }
}
