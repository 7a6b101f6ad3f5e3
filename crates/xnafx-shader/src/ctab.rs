//! Legacy Direct3D constant tables (`CTAB`).
//!
//! A `CTAB` comment block describes the shader-local symbols of an SM1-SM3 shader (or of a
//! preshader): each symbol's name, the register file it lives in and its register range. All
//! offsets inside the block are relative to the first byte after the `CTAB` identifier.

use crate::bytes::ByteReader;
use crate::error::ShaderError;
use crate::fourcc::FourCC;

const CTAB_HEADER_LEN: usize = 28;
const CONSTANT_INFO_LEN: usize = 20;
const MEMBER_INFO_LEN: usize = 8;
const MAX_TYPE_DEPTH: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterSet {
    Bool,
    Int4,
    Float4,
    Sampler,
}

impl RegisterSet {
    pub fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0 => Self::Bool,
            1 => Self::Int4,
            2 => Self::Float4,
            3 => Self::Sampler,
            _ => return None,
        })
    }

    pub fn raw(self) -> u16 {
        match self {
            Self::Bool => 0,
            Self::Int4 => 1,
            Self::Float4 => 2,
            Self::Sampler => 3,
        }
    }
}

/// `D3DXSHADER_TYPEINFO`, with class/type kept as raw codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantType {
    pub class: u16,
    pub ty: u16,
    pub rows: u16,
    pub columns: u16,
    pub elements: u16,
    pub members: Vec<ConstantMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantMember {
    pub name: String,
    pub ty: ConstantType,
}

/// A shader-local symbol bound to a range of constant registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSymbol {
    pub name: String,
    pub register_set: RegisterSet,
    pub register_index: u16,
    pub register_count: u16,
    pub ty: Option<ConstantType>,
    /// Offset of the default value inside the `CTAB` block, 0 if none.
    pub default_value_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantTable {
    pub creator: Option<String>,
    pub version: u32,
    pub flags: u32,
    pub target: Option<String>,
    pub constants: Vec<ShaderSymbol>,
}

/// Parses the payload of a `CTAB` block (the bytes following the identifier).
pub fn parse_ctab_chunk(bytes: &[u8]) -> Result<ConstantTable, ShaderError> {
    let r = ByteReader::new(FourCC::CTAB, bytes);
    if bytes.len() < CTAB_HEADER_LEN {
        return Err(ShaderError::invalid_block(
            FourCC::CTAB,
            format!(
                "need {CTAB_HEADER_LEN} bytes for header, got {}",
                bytes.len()
            ),
        ));
    }

    let mut hr = r.fork(0)?;
    let _size = hr.read_u32_le()?;
    let creator_offset = hr.read_u32_le()?;
    let version = hr.read_u32_le()?;
    let constant_count = hr.read_u32_le()?;
    let constant_info_offset = hr.read_u32_le()? as usize;
    let flags = hr.read_u32_le()?;
    let target_offset = hr.read_u32_le()?;

    let creator = (creator_offset != 0)
        .then(|| r.read_cstring_at(creator_offset as usize))
        .transpose()?;
    let target = (target_offset != 0)
        .then(|| r.read_cstring_at(target_offset as usize))
        .transpose()?;

    // Validate the table extent before allocating from the declared count.
    let table_len = (constant_count as usize)
        .checked_mul(CONSTANT_INFO_LEN)
        .and_then(|len| len.checked_add(constant_info_offset))
        .filter(|&end| end <= bytes.len());
    if table_len.is_none() {
        return Err(ShaderError::invalid_block(
            FourCC::CTAB,
            format!(
                "{constant_count} constants at offset {constant_info_offset} exceed block of {} bytes",
                bytes.len()
            ),
        ));
    }

    let mut constants = Vec::with_capacity(constant_count as usize);
    for i in 0..constant_count as usize {
        let mut cr = r.fork(constant_info_offset + i * CONSTANT_INFO_LEN)?;
        let name_offset = cr.read_u32_le()?;
        let register_set_raw = cr.read_u16_le()?;
        let register_index = cr.read_u16_le()?;
        let register_count = cr.read_u16_le()?;
        let _reserved = cr.read_u16_le()?;
        let type_offset = cr.read_u32_le()?;
        let default_value_offset = cr.read_u32_le()?;

        let name = r.read_cstring_at(name_offset as usize)?;
        let register_set = RegisterSet::from_raw(register_set_raw).ok_or_else(|| {
            ShaderError::invalid_block(
                FourCC::CTAB,
                format!("constant {name:?} has unknown register set {register_set_raw}"),
            )
        })?;
        let ty = (type_offset != 0)
            .then(|| parse_type(&r, type_offset as usize, 0))
            .transpose()?;

        constants.push(ShaderSymbol {
            name,
            register_set,
            register_index,
            register_count,
            ty,
            default_value_offset,
        });
    }

    Ok(ConstantTable {
        creator,
        version,
        flags,
        target,
        constants,
    })
}

fn parse_type(r: &ByteReader<'_>, offset: usize, depth: u32) -> Result<ConstantType, ShaderError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ShaderError::invalid_block(
            FourCC::CTAB,
            "type recursion too deep",
        ));
    }

    let mut tr = r.fork(offset)?;
    let class = tr.read_u16_le()?;
    let ty = tr.read_u16_le()?;
    let rows = tr.read_u16_le()?;
    let columns = tr.read_u16_le()?;
    let elements = tr.read_u16_le()?;
    let member_count = tr.read_u16_le()?;
    let member_offset = tr.read_u32_le()? as usize;

    let mut members = Vec::new();
    if member_count > 0 {
        let mut mr = r.fork(member_offset)?;
        if mr.remaining() < member_count as usize * MEMBER_INFO_LEN {
            return Err(ShaderError::invalid_block(
                FourCC::CTAB,
                "struct member table out of bounds",
            ));
        }
        members.reserve(member_count as usize);
        for _ in 0..member_count {
            let name_offset = mr.read_u32_le()?;
            let type_offset = mr.read_u32_le()?;
            members.push(ConstantMember {
                name: r.read_cstring_at(name_offset as usize)?,
                ty: parse_type(r, type_offset as usize, depth + 1)?,
            });
        }
    }

    Ok(ConstantType {
        class,
        ty,
        rows,
        columns,
        elements,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_ctab, CtabEntry};

    fn push_u32(out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&v.to_le_bytes());
    }

    /// Appends `text` NUL-terminated and returns its offset within the block.
    fn append_cstring(block: &mut Vec<u8>, text: &str) -> u32 {
        let offset = block.len() as u32;
        block.extend_from_slice(text.as_bytes());
        block.push(0);
        offset
    }

    const COMPILER: &str = "Microsoft (R) HLSL Shader Compiler 9.26.952.2844";

    #[test]
    fn parses_sampler_with_creator_and_target() {
        let mut block = build_ctab(&[CtabEntry::sampler("DiffuseSampler", 2)]);
        let creator = append_cstring(&mut block, COMPILER);
        let target = append_cstring(&mut block, "ps_2_0");
        block[4..8].copy_from_slice(&creator.to_le_bytes());
        block[24..28].copy_from_slice(&target.to_le_bytes());

        let ctab = parse_ctab_chunk(&block).unwrap();
        assert_eq!(ctab.creator.as_deref(), Some(COMPILER));
        assert_eq!(ctab.target.as_deref(), Some("ps_2_0"));
        assert_eq!(ctab.version, 0xFFFF_0200);
        assert_eq!(ctab.constants.len(), 1);
        let sampler = &ctab.constants[0];
        assert_eq!(sampler.name, "DiffuseSampler");
        assert_eq!(sampler.register_set, RegisterSet::Sampler);
        assert_eq!(sampler.register_index, 2);
        assert_eq!(sampler.register_count, 1);
        let ty = sampler.ty.as_ref().expect("type info");
        assert_eq!((ty.class, ty.ty), (4, 12));
    }

    #[test]
    fn parses_struct_type_info() {
        let bytes = build_ctab(&[CtabEntry::float4("Light", 4, 2).with_struct(&[
            ("Position", 3),
            ("Range", 1),
        ])]);
        let ctab = parse_ctab_chunk(&bytes).unwrap();
        let ty = ctab.constants[0].ty.as_ref().expect("type info");
        assert_eq!(ty.class, 5);
        assert_eq!(ty.members.len(), 2);
        assert_eq!(ty.members[0].name, "Position");
        assert_eq!(ty.members[0].ty.columns, 3);
        assert_eq!(ty.members[1].name, "Range");
        assert_eq!(ty.members[1].ty.columns, 1);
    }

    #[test]
    fn rejects_constant_table_past_block_end() {
        let mut chunk = Vec::new();
        push_u32(&mut chunk, 28);
        push_u32(&mut chunk, 0);
        push_u32(&mut chunk, 0);
        push_u32(&mut chunk, 1000); // constant count
        push_u32(&mut chunk, 28);
        push_u32(&mut chunk, 0);
        push_u32(&mut chunk, 0);
        let err = parse_ctab_chunk(&chunk).unwrap_err();
        assert!(
            matches!(err, ShaderError::InvalidBlock { block, .. } if block == FourCC::CTAB),
            "{err:?}"
        );
    }

    #[test]
    fn rejects_unknown_register_set() {
        let mut bytes = build_ctab(&[CtabEntry::float4("C0", 0, 1)]);
        // Register set lives 4 bytes into the first constant info entry.
        bytes[28 + 4] = 9;
        let err = parse_ctab_chunk(&bytes).unwrap_err();
        assert!(matches!(err, ShaderError::InvalidBlock { .. }), "{err:?}");
    }
}
