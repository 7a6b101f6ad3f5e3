//! Preshader programs (`PRES`).
//!
//! A preshader is a small constant-folding program evaluated on the CPU before a shader runs.
//! Its token stream starts with an `FX` version token followed by comment blocks:
//!
//! - `CLIT`: literal pool (`f64` values),
//! - `FXLC`: instructions,
//! - `PRSI`: optional output register remapping,
//! - `CTAB`: the symbols the program reads.

use tracing::trace;

use crate::bytes::tokens_to_bytes;
use crate::ctab::{parse_ctab_chunk, ShaderSymbol};
use crate::error::ShaderError;
use crate::fourcc::FourCC;
use crate::shader::ShaderModel;
use crate::token::{bytes_to_tokens, is_comment, is_end, TokenReader};

const PRESHADER_VERSION_TAG: u32 = 0x4658;
const PRSI_HEADER_TOKENS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreshaderOpcode {
    Mov,
    Neg,
    Rcp,
    Frc,
    Exp,
    Log,
    Rsq,
    Sin,
    Cos,
    Asin,
    Acos,
    Atan,
    Min,
    Max,
    Lt,
    Ge,
    Add,
    Mul,
    Atan2,
    Div,
    Cmp,
    Movc,
    Dot,
    Noise,
    MinScalar,
    MaxScalar,
    LtScalar,
    GeScalar,
    AddScalar,
    MulScalar,
    Atan2Scalar,
    DivScalar,
    DotScalar,
    NoiseScalar,
}

impl PreshaderOpcode {
    pub fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0x1000 => Self::Mov,
            0x1010 => Self::Neg,
            0x1030 => Self::Rcp,
            0x1040 => Self::Frc,
            0x1050 => Self::Exp,
            0x1060 => Self::Log,
            0x1070 => Self::Rsq,
            0x1080 => Self::Sin,
            0x1090 => Self::Cos,
            0x10A0 => Self::Asin,
            0x10B0 => Self::Acos,
            0x10C0 => Self::Atan,
            0x2000 => Self::Min,
            0x2010 => Self::Max,
            0x2020 => Self::Lt,
            0x2030 => Self::Ge,
            0x2040 => Self::Add,
            0x2050 => Self::Mul,
            0x2060 => Self::Atan2,
            0x2080 => Self::Div,
            0x3000 => Self::Cmp,
            0x3010 => Self::Movc,
            0x5000 => Self::Dot,
            0x5020 => Self::Noise,
            0xA000 => Self::MinScalar,
            0xA010 => Self::MaxScalar,
            0xA020 => Self::LtScalar,
            0xA030 => Self::GeScalar,
            0xA040 => Self::AddScalar,
            0xA050 => Self::MulScalar,
            0xA060 => Self::Atan2Scalar,
            0xA080 => Self::DivScalar,
            0xD000 => Self::DotScalar,
            0xD020 => Self::NoiseScalar,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    Literal,
    Input,
    Output,
    Temp,
}

impl OperandType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            1 => Self::Literal,
            2 => Self::Input,
            4 => Self::Output,
            7 => Self::Temp,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreshaderOperand {
    pub ty: OperandType,
    /// Scalar index into the operand's register file (literal pool index for literals).
    pub index: u32,
    /// Relative-addressing registers as raw `(type, index)` pairs.
    pub array_registers: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreshaderInstruction {
    pub opcode: PreshaderOpcode,
    pub element_count: u32,
    /// Source operands followed by the destination operand.
    pub operands: Vec<PreshaderOperand>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preshader {
    pub version: ShaderModel,
    pub literals: Vec<f64>,
    /// Number of temp registers the program writes or reads.
    pub temp_count: u32,
    pub symbols: Vec<ShaderSymbol>,
    pub instructions: Vec<PreshaderInstruction>,
}

#[derive(Default)]
struct Blocks<'a> {
    ctab: Option<&'a [u32]>,
    clit: Option<&'a [u32]>,
    fxlc: Option<&'a [u32]>,
    prsi: Option<&'a [u32]>,
}

impl Preshader {
    /// Parses a standalone preshader.
    ///
    /// The stream may start directly with the `FX` version token or be wrapped in a `PRES`
    /// comment.
    pub fn parse(bytes: &[u8]) -> Result<Self, ShaderError> {
        let tokens = bytes_to_tokens(bytes)?;
        let body = match tokens.as_slice() {
            [comment, id, rest @ ..]
                if is_comment(*comment) && FourCC::from_token(*id) == FourCC::PRES =>
            {
                rest
            }
            all => all,
        };
        Self::parse_tokens(body)
    }

    pub(crate) fn parse_tokens(tokens: &[u32]) -> Result<Self, ShaderError> {
        let mut r = TokenReader::new(tokens);
        let version_token = r.read().ok_or(ShaderError::Empty)?;
        if version_token >> 16 != PRESHADER_VERSION_TAG {
            return Err(ShaderError::InvalidVersionToken {
                token: version_token,
            });
        }
        let version = ShaderModel {
            major: ((version_token >> 8) & 0xFF) as u8,
            minor: (version_token & 0xFF) as u8,
        };

        let mut blocks = Blocks::default();
        while let Some(token) = r.peek() {
            if is_end(token) {
                break;
            }
            if !is_comment(token) {
                return Err(ShaderError::invalid_block(
                    FourCC::PRES,
                    format!("unexpected token 0x{token:08x} at {}", r.pos),
                ));
            }
            let Some(comment) = r.read_comment(true)? else {
                break;
            };
            let fourcc = comment
                .fourcc()
                .ok_or_else(|| ShaderError::invalid_block(FourCC::PRES, "empty block"))?;
            let slot = match fourcc {
                FourCC::CTAB => &mut blocks.ctab,
                FourCC::CLIT => &mut blocks.clit,
                FourCC::FXLC => &mut blocks.fxlc,
                FourCC::PRSI => &mut blocks.prsi,
                other => {
                    return Err(ShaderError::invalid_block(
                        FourCC::PRES,
                        format!("unknown block {other}"),
                    ))
                }
            };
            if slot.replace(comment.body()).is_some() {
                return Err(ShaderError::DuplicateBlock(fourcc));
            }
        }

        let ctab = blocks.ctab.ok_or(ShaderError::MissingBlock(FourCC::CTAB))?;
        let clit = blocks.clit.ok_or(ShaderError::MissingBlock(FourCC::CLIT))?;
        let fxlc = blocks.fxlc.ok_or(ShaderError::MissingBlock(FourCC::FXLC))?;

        let literals = parse_literals(clit)?;
        let output_map = blocks.prsi.map(parse_output_map).transpose()?;
        let symbols = parse_ctab_chunk(&tokens_to_bytes(ctab))?.constants;

        let mut temp_count = 0;
        let instructions = parse_instructions(
            fxlc,
            literals.len(),
            output_map.as_deref(),
            &mut temp_count,
        )?;

        trace!(
            literals = literals.len(),
            symbols = symbols.len(),
            instructions = instructions.len(),
            temp_count,
            "parsed preshader"
        );

        Ok(Self {
            version,
            literals,
            temp_count,
            symbols,
            instructions,
        })
    }

    /// Running preshader programs is not supported.
    pub fn evaluate(&self, _inputs: &[f32]) -> Result<Vec<f32>, ShaderError> {
        Err(ShaderError::NotImplemented("preshader execution"))
    }
}

fn parse_literals(clit: &[u32]) -> Result<Vec<f64>, ShaderError> {
    let (&count, rest) = clit
        .split_first()
        .ok_or_else(|| ShaderError::invalid_block(FourCC::CLIT, "missing literal count"))?;
    let count = count as usize;
    if count > rest.len() / 2 {
        return Err(ShaderError::invalid_block(
            FourCC::CLIT,
            format!("{count} literals declared, room for {}", rest.len() / 2),
        ));
    }
    Ok(rest[..count * 2]
        .chunks_exact(2)
        .map(|pair| f64::from_bits(u64::from(pair[0]) | (u64::from(pair[1]) << 32)))
        .collect())
}

fn parse_output_map(prsi: &[u32]) -> Result<Vec<(u32, u32)>, ShaderError> {
    if prsi.len() < PRSI_HEADER_TOKENS {
        return Err(ShaderError::invalid_block(
            FourCC::PRSI,
            format!("need {PRSI_HEADER_TOKENS} header tokens, got {}", prsi.len()),
        ));
    }
    let count = prsi[7] as usize;
    let pairs = &prsi[PRSI_HEADER_TOKENS..];
    if count > pairs.len() / 2 {
        return Err(ShaderError::invalid_block(
            FourCC::PRSI,
            format!("{count} output mappings declared, room for {}", pairs.len() / 2),
        ));
    }
    Ok(pairs[..count * 2]
        .chunks_exact(2)
        .map(|p| (p[0], p[1]))
        .collect())
}

fn parse_instructions(
    fxlc: &[u32],
    literal_count: usize,
    output_map: Option<&[(u32, u32)]>,
    temp_count: &mut u32,
) -> Result<Vec<PreshaderInstruction>, ShaderError> {
    let truncated = || ShaderError::invalid_block(FourCC::FXLC, "instruction stream truncated");

    let mut r = TokenReader::new(fxlc);
    let count = r
        .read()
        .ok_or_else(|| ShaderError::invalid_block(FourCC::FXLC, "missing instruction count"))?
        as usize;
    // Every instruction takes at least two tokens.
    if count > r.remaining() / 2 {
        return Err(truncated());
    }

    let mut instructions = Vec::with_capacity(count);
    for _ in 0..count {
        let opcode_token = r.read().ok_or_else(truncated)?;
        let opcode_raw = (opcode_token >> 16) as u16;
        let opcode = PreshaderOpcode::from_raw(opcode_raw)
            .ok_or(ShaderError::UnknownPreshaderOpcode(opcode_raw))?;
        let element_count = opcode_token & 0xFF;
        let operand_count = r.read().ok_or_else(truncated)? as usize;
        if operand_count > r.remaining() / 3 {
            return Err(truncated());
        }

        let mut operands = Vec::with_capacity(operand_count);
        for _ in 0..operand_count {
            let header = r.read_many(3).ok_or_else(truncated)?;
            let (array_count, raw_type, mut index) = (header[0] as usize, header[1], header[2]);
            let ty = OperandType::from_raw(raw_type)
                .ok_or(ShaderError::UnknownOperandType(raw_type))?;
            let array_tokens = array_count.checked_mul(2).ok_or_else(truncated)?;
            let arrays = r.read_many(array_tokens).ok_or_else(truncated)?;
            let array_registers = arrays.chunks_exact(2).map(|p| (p[0], p[1])).collect();

            match ty {
                OperandType::Literal => {
                    let end = (index as usize).saturating_add(element_count as usize);
                    if end > literal_count {
                        return Err(ShaderError::invalid_block(
                            FourCC::FXLC,
                            format!(
                                "literal operand {index}+{element_count} exceeds pool of {literal_count}"
                            ),
                        ));
                    }
                }
                OperandType::Output => {
                    if let Some(map) = output_map.filter(|m| !m.is_empty()) {
                        let (_, target) = map.get((index / 4) as usize).ok_or_else(|| {
                            ShaderError::invalid_block(
                                FourCC::PRSI,
                                format!("output register {index} has no mapping"),
                            )
                        })?;
                        index = target
                            .checked_mul(4)
                            .and_then(|base| base.checked_add(index % 4))
                            .ok_or_else(|| {
                                ShaderError::invalid_block(
                                    FourCC::PRSI,
                                    format!("output register {index} maps past register {target}"),
                                )
                            })?;
                    }
                }
                OperandType::Temp => {
                    *temp_count = (*temp_count).max(index.saturating_add(1));
                }
                OperandType::Input => {}
            }

            operands.push(PreshaderOperand {
                ty,
                index,
                array_registers,
            });
        }

        instructions.push(PreshaderInstruction {
            opcode,
            element_count,
            operands,
        });
    }

    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CtabEntry, PreshaderBuilder};
    use pretty_assertions::assert_eq;

    fn sample() -> PreshaderBuilder {
        let mut b = PreshaderBuilder::new();
        b.symbol(CtabEntry::float4("Time", 0, 1));
        b.literal(0.5);
        b.literal(4.0);
        // mul r0.x, c0.x, lit[0]
        b.instruction(0x2050, 1, &[(2, 0), (1, 0), (7, 0)]);
        // add o[1].x, r0.x, lit[1]
        b.instruction(0x2040, 1, &[(7, 0), (1, 1), (4, 1)]);
        b
    }

    #[test]
    fn parses_literals_symbols_and_temps() {
        let pre = Preshader::parse(&sample().bytes()).unwrap();
        assert_eq!(pre.version, ShaderModel { major: 2, minor: 1 });
        assert_eq!(pre.literals, vec![0.5, 4.0]);
        assert_eq!(pre.temp_count, 1);
        assert_eq!(pre.symbols.len(), 1);
        assert_eq!(pre.symbols[0].name, "Time");
        assert_eq!(pre.instructions.len(), 2);
        assert_eq!(pre.instructions[0].opcode, PreshaderOpcode::Mul);
        assert_eq!(pre.instructions[1].operands[2].ty, OperandType::Output);
        assert_eq!(pre.instructions[1].operands[2].index, 1);
    }

    #[test]
    fn output_registers_are_remapped() {
        let mut b = sample();
        b.output_map(&[(0, 5)]);
        let pre = Preshader::parse(&b.bytes()).unwrap();
        // o[1] is component 1 of preshader register 0, which maps to shader register 5.
        assert_eq!(pre.instructions[1].operands[2].index, 21);
    }

    #[test]
    fn rejects_output_mapping_past_register_space() {
        let mut b = sample();
        b.output_map(&[(0, 0x4000_0000)]);
        let err = Preshader::parse(&b.bytes()).unwrap_err();
        assert!(matches!(err, ShaderError::InvalidBlock { block, .. } if block == FourCC::PRSI));
    }

    #[test]
    fn accepts_pres_comment_wrapper() {
        let inner = sample().tokens();
        let comment = 0xFFFE | (((inner.len() + 1) as u32) << 16);
        let mut tokens = vec![comment, FourCC::PRES.to_token()];
        tokens.extend_from_slice(&inner);
        let bytes = crate::bytes::tokens_to_bytes(&tokens);
        assert_eq!(Preshader::parse(&bytes).unwrap().literals.len(), 2);
    }

    #[test]
    fn rejects_out_of_range_literal() {
        let mut b = PreshaderBuilder::new();
        b.symbol(CtabEntry::float4("Time", 0, 1));
        b.literal(1.0);
        b.instruction(0x1000, 1, &[(1, 3), (4, 0)]);
        let err = Preshader::parse(&b.bytes()).unwrap_err();
        assert!(matches!(err, ShaderError::InvalidBlock { block, .. } if block == FourCC::FXLC));
    }

    #[test]
    fn rejects_unknown_opcode() {
        let mut b = PreshaderBuilder::new();
        b.symbol(CtabEntry::float4("Time", 0, 1));
        b.instruction(0x7777, 1, &[(2, 0), (4, 0)]);
        assert_eq!(
            Preshader::parse(&b.bytes()),
            Err(ShaderError::UnknownPreshaderOpcode(0x7777))
        );
    }

    #[test]
    fn missing_blocks_are_reported() {
        let mut tokens = sample().tokens();
        // Drop everything but the version token and END: no blocks at all.
        tokens.truncate(1);
        tokens.push(0x0000_FFFF);
        let bytes = crate::bytes::tokens_to_bytes(&tokens);
        assert_eq!(
            Preshader::parse(&bytes),
            Err(ShaderError::MissingBlock(FourCC::CTAB))
        );
    }

    #[test]
    fn evaluation_is_not_implemented() {
        let pre = Preshader::parse(&sample().bytes()).unwrap();
        assert_eq!(
            pre.evaluate(&[1.0]),
            Err(ShaderError::NotImplemented("preshader execution"))
        );
    }
}
