use tracing::trace;

use crate::ctab::{parse_ctab_chunk, ConstantTable, RegisterSet, ShaderSymbol};
use crate::error::ShaderError;
use crate::fourcc::FourCC;
use crate::preshader::Preshader;
use crate::token::{bytes_to_tokens, TokenReader};
use crate::bytes::tokens_to_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderModel {
    pub major: u8,
    pub minor: u8,
}

/// A compiled SM1-SM3 shader as embedded in an effect object.
///
/// Only the version token and the leading comment blocks are interpreted; the instruction
/// tokens that follow are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderBytecode {
    pub stage: ShaderStage,
    pub model: ShaderModel,
    pub constant_table: Option<ConstantTable>,
    pub preshader: Option<Preshader>,
    /// Tokens following the leading comment blocks, up to and including `end`.
    pub instructions: Vec<u32>,
}

impl ShaderBytecode {
    pub fn parse(bytes: &[u8]) -> Result<Self, ShaderError> {
        let tokens = bytes_to_tokens(bytes)?;
        let mut r = TokenReader::new(&tokens);

        let version_token = r.read().ok_or(ShaderError::Empty)?;
        let stage = match version_token >> 16 {
            0xFFFE => ShaderStage::Vertex,
            0xFFFF => ShaderStage::Pixel,
            _ => {
                return Err(ShaderError::InvalidVersionToken {
                    token: version_token,
                })
            }
        };
        let model = ShaderModel {
            major: ((version_token >> 8) & 0xFF) as u8,
            minor: (version_token & 0xFF) as u8,
        };

        let mut constant_table = None;
        let mut preshader = None;
        while let Some(comment) = r.read_comment(false)? {
            match comment.fourcc() {
                Some(FourCC::CTAB) => {
                    if constant_table.is_some() {
                        return Err(ShaderError::DuplicateBlock(FourCC::CTAB));
                    }
                    let body = tokens_to_bytes(comment.body());
                    constant_table = Some(parse_ctab_chunk(&body)?);
                }
                Some(FourCC::PRES) => {
                    if preshader.is_some() {
                        return Err(ShaderError::DuplicateBlock(FourCC::PRES));
                    }
                    preshader = Some(Preshader::parse_tokens(comment.body())?);
                }
                other => trace!(
                    at_token = comment.at_token,
                    len = comment.tokens.len(),
                    fourcc = ?other,
                    "skipping shader comment"
                ),
            }
        }

        Ok(Self {
            stage,
            model,
            constant_table,
            preshader,
            instructions: r.rest().to_vec(),
        })
    }

    /// Shader-local symbols from the constant table, in declaration order.
    pub fn symbols(&self) -> &[ShaderSymbol] {
        self.constant_table
            .as_ref()
            .map(|t| t.constants.as_slice())
            .unwrap_or(&[])
    }

    pub fn samplers(&self) -> impl Iterator<Item = &ShaderSymbol> {
        self.symbols()
            .iter()
            .filter(|s| s.register_set == RegisterSet::Sampler)
    }

    /// Disassembly of the instruction stream is not supported.
    pub fn disassemble(&self) -> Result<String, ShaderError> {
        Err(ShaderError::NotImplemented("shader disassembly"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_ctab, build_shader, CtabEntry, PreshaderBuilder};

    #[test]
    fn parses_version_and_constant_table() {
        let ctab = build_ctab(&[
            CtabEntry::float4("WorldViewProj", 0, 4),
            CtabEntry::sampler("DiffuseSampler", 0),
        ]);
        let bytes = build_shader(
            ShaderStage::Pixel,
            2,
            0,
            &[(FourCC::CTAB, ctab.as_slice())],
            &[0x0200_0001, 0x800F_0800, 0xA0E4_0000],
        );

        let shader = ShaderBytecode::parse(&bytes).unwrap();
        assert_eq!(shader.stage, ShaderStage::Pixel);
        assert_eq!(shader.model, ShaderModel { major: 2, minor: 0 });
        let names: Vec<_> = shader.symbols().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["WorldViewProj", "DiffuseSampler"]);
        let samplers: Vec<_> = shader.samplers().map(|s| s.name.as_str()).collect();
        assert_eq!(samplers, ["DiffuseSampler"]);
        assert_eq!(shader.instructions.first(), Some(&0x0200_0001));
        assert_eq!(shader.instructions.last(), Some(&0x0000_FFFF));
        assert!(shader.preshader.is_none());
    }

    #[test]
    fn unknown_comments_are_skipped() {
        let bytes = build_shader(
            ShaderStage::Vertex,
            3,
            0,
            &[(FourCC(*b"DBUG"), &[1, 2, 3, 4][..])],
            &[],
        );
        let shader = ShaderBytecode::parse(&bytes).unwrap();
        assert_eq!(shader.stage, ShaderStage::Vertex);
        assert!(shader.symbols().is_empty());
    }

    #[test]
    fn embedded_preshader_is_parsed() {
        let mut pre = PreshaderBuilder::new();
        pre.symbol(CtabEntry::float4("Scale", 0, 1));
        pre.literal(2.0);
        let pres = pre.bytes();
        let ctab = build_ctab(&[CtabEntry::float4("Scale", 0, 1)]);
        let bytes = build_shader(
            ShaderStage::Vertex,
            2,
            0,
            &[
                (FourCC::CTAB, ctab.as_slice()),
                (FourCC::PRES, pres.as_slice()),
            ],
            &[],
        );
        let shader = ShaderBytecode::parse(&bytes).unwrap();
        let preshader = shader.preshader.expect("embedded preshader");
        assert_eq!(preshader.literals, vec![2.0]);
        assert_eq!(preshader.symbols[0].name, "Scale");
    }

    #[test]
    fn rejects_bad_version_token() {
        let bytes = 0x0001_0200u32.to_le_bytes();
        assert_eq!(
            ShaderBytecode::parse(&bytes),
            Err(ShaderError::InvalidVersionToken { token: 0x0001_0200 })
        );
    }

    #[test]
    fn disassembly_reports_not_implemented() {
        let bytes = build_shader(ShaderStage::Pixel, 2, 0, &[], &[]);
        let shader = ShaderBytecode::parse(&bytes).unwrap();
        assert_eq!(
            shader.disassemble(),
            Err(ShaderError::NotImplemented("shader disassembly"))
        );
    }
}
