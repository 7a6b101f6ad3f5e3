use crate::bytes::tokens_to_bytes;
use crate::ctab::RegisterSet;
use crate::fourcc::FourCC;
use crate::shader::ShaderStage;

/// One constant of a synthetic `CTAB` block.
#[derive(Debug, Clone)]
pub struct CtabEntry {
    pub name: String,
    pub register_set: RegisterSet,
    pub register_index: u16,
    pub register_count: u16,
    /// Struct members as `(name, columns)`; empty for non-struct constants.
    pub members: Vec<(String, u16)>,
}

impl CtabEntry {
    pub fn new(name: &str, register_set: RegisterSet, register_index: u16, register_count: u16) -> Self {
        Self {
            name: name.to_owned(),
            register_set,
            register_index,
            register_count,
            members: Vec::new(),
        }
    }

    pub fn float4(name: &str, register_index: u16, register_count: u16) -> Self {
        Self::new(name, RegisterSet::Float4, register_index, register_count)
    }

    pub fn sampler(name: &str, register_index: u16) -> Self {
        Self::new(name, RegisterSet::Sampler, register_index, 1)
    }

    pub fn with_struct(mut self, members: &[(&str, u16)]) -> Self {
        self.members = members
            .iter()
            .map(|(name, columns)| ((*name).to_owned(), *columns))
            .collect();
        self
    }
}

struct Tail {
    base: usize,
    bytes: Vec<u8>,
}

impl Tail {
    fn offset(&self) -> u32 {
        u32::try_from(self.base + self.bytes.len()).expect("CTAB offset does not fit in u32")
    }

    fn cstring(&mut self, s: &str) -> u32 {
        let offset = self.offset();
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        offset
    }

    fn type_info(&mut self, class: u16, ty: u16, columns: u16, members: &[(u32, u32)]) -> u32 {
        let member_offset = if members.is_empty() {
            0
        } else {
            let offset = self.offset();
            for (name, ty) in members {
                self.bytes.extend_from_slice(&name.to_le_bytes());
                self.bytes.extend_from_slice(&ty.to_le_bytes());
            }
            offset
        };
        let offset = self.offset();
        let member_count = members.len() as u16;
        for v in [class, ty, 1, columns, 0, member_count] {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        self.bytes.extend_from_slice(&member_offset.to_le_bytes());
        offset
    }
}

/// Builds the payload of a `CTAB` block (without the identifier), padded to a whole token.
///
/// Every constant gets a type info: samplers are `sampler2D` objects, structs use the given
/// members, everything else is a 4-wide vector of the register set's element type.
pub fn build_ctab(entries: &[CtabEntry]) -> Vec<u8> {
    const HEADER_LEN: usize = 28;
    const ENTRY_LEN: usize = 20;

    let mut tail = Tail {
        base: HEADER_LEN + ENTRY_LEN * entries.len(),
        bytes: Vec::new(),
    };

    let mut out = Vec::new();
    let constant_count = u32::try_from(entries.len()).expect("too many CTAB entries");
    for v in [HEADER_LEN as u32, 0, 0xFFFF_0200, constant_count, HEADER_LEN as u32, 0, 0] {
        out.extend_from_slice(&v.to_le_bytes());
    }

    for entry in entries {
        let name_offset = tail.cstring(&entry.name);
        let type_offset = if !entry.members.is_empty() {
            let members: Vec<(u32, u32)> = entry
                .members
                .iter()
                .map(|(name, columns)| {
                    let name = tail.cstring(name);
                    let class = if *columns == 1 { 0 } else { 1 };
                    (name, tail.type_info(class, 3, *columns, &[]))
                })
                .collect();
            tail.type_info(5, 0, 0, &members)
        } else {
            match entry.register_set {
                RegisterSet::Sampler => tail.type_info(4, 12, 1, &[]),
                RegisterSet::Bool => tail.type_info(1, 1, 4, &[]),
                RegisterSet::Int4 => tail.type_info(1, 2, 4, &[]),
                RegisterSet::Float4 => tail.type_info(1, 3, 4, &[]),
            }
        };

        out.extend_from_slice(&name_offset.to_le_bytes());
        out.extend_from_slice(&entry.register_set.raw().to_le_bytes());
        out.extend_from_slice(&entry.register_index.to_le_bytes());
        out.extend_from_slice(&entry.register_count.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&type_offset.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
    }

    out.extend_from_slice(&tail.bytes);
    pad_to_token(&mut out);
    out
}

fn pad_to_token(bytes: &mut Vec<u8>) {
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
}

fn bytes_to_padded_tokens(bytes: &[u8]) -> Vec<u32> {
    let mut padded = bytes.to_vec();
    pad_to_token(&mut padded);
    padded
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn push_comment(out: &mut Vec<u32>, fourcc: FourCC, body: &[u32]) {
    let len = u32::try_from(body.len() + 1).expect("comment too long");
    out.push(0xFFFE | (len << 16));
    out.push(fourcc.to_token());
    out.extend_from_slice(body);
}

/// Builds an SM1-SM3 token stream: version, comment blocks, `instructions`, then `end`.
pub fn build_shader(
    stage: ShaderStage,
    major: u8,
    minor: u8,
    comments: &[(FourCC, &[u8])],
    instructions: &[u32],
) -> Vec<u8> {
    let stage_bits = match stage {
        ShaderStage::Vertex => 0xFFFE_0000,
        ShaderStage::Pixel => 0xFFFF_0000,
    };
    let mut tokens = vec![stage_bits | (u32::from(major) << 8) | u32::from(minor)];
    for (fourcc, payload) in comments {
        push_comment(&mut tokens, *fourcc, &bytes_to_padded_tokens(payload));
    }
    tokens.extend_from_slice(instructions);
    tokens.push(0x0000_FFFF);
    tokens_to_bytes(&tokens)
}

/// Builds `fx_2_1` preshader programs.
#[derive(Debug, Clone, Default)]
pub struct PreshaderBuilder {
    symbols: Vec<CtabEntry>,
    literals: Vec<f64>,
    instruction_count: u32,
    fxlc: Vec<u32>,
    output_map: Option<Vec<(u32, u32)>>,
}

impl PreshaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol(&mut self, entry: CtabEntry) -> &mut Self {
        self.symbols.push(entry);
        self
    }

    pub fn literal(&mut self, value: f64) -> &mut Self {
        self.literals.push(value);
        self
    }

    /// Appends an instruction; operands are raw `(type, index)` pairs, destination last.
    pub fn instruction(&mut self, opcode: u16, elements: u32, operands: &[(u32, u32)]) -> &mut Self {
        self.instruction_count += 1;
        self.fxlc.push((u32::from(opcode) << 16) | (elements & 0xFF));
        self.fxlc.push(operands.len() as u32);
        for (ty, index) in operands {
            self.fxlc.extend_from_slice(&[0, *ty, *index]);
        }
        self
    }

    pub fn output_map(&mut self, pairs: &[(u32, u32)]) -> &mut Self {
        self.output_map = Some(pairs.to_vec());
        self
    }

    /// Version token, blocks and the terminating `end` token.
    pub fn tokens(&self) -> Vec<u32> {
        let mut out = vec![0x4658_0201];

        let mut clit = vec![self.literals.len() as u32];
        for lit in &self.literals {
            let bits = lit.to_bits();
            clit.push(bits as u32);
            clit.push((bits >> 32) as u32);
        }
        push_comment(&mut out, FourCC::CLIT, &clit);

        let mut fxlc = vec![self.instruction_count];
        fxlc.extend_from_slice(&self.fxlc);
        push_comment(&mut out, FourCC::FXLC, &fxlc);

        if let Some(map) = &self.output_map {
            let mut prsi = vec![0, 0, 0, 0, map.len() as u32, 0, 0, map.len() as u32];
            for (from, to) in map {
                prsi.push(*from);
                prsi.push(*to);
            }
            push_comment(&mut out, FourCC::PRSI, &prsi);
        }

        push_comment(&mut out, FourCC::CTAB, &bytes_to_padded_tokens(&build_ctab(&self.symbols)));

        out.push(0x0000_FFFF);
        out
    }

    pub fn bytes(&self) -> Vec<u8> {
        tokens_to_bytes(&self.tokens())
    }
}
