use crate::error::ShaderError;
use crate::fourcc::FourCC;
use crate::MAX_SHADER_BYTECODE_BYTES;

const OPCODE_COMMENT: u32 = 0xFFFE;
const OPCODE_END: u32 = 0xFFFF;

const COMMENT_LEN_SHIFT: u32 = 16;
const COMMENT_LEN_MASK: u32 = 0x7FFF;

pub(crate) fn bytes_to_tokens(bytes: &[u8]) -> Result<Vec<u32>, ShaderError> {
    if bytes.is_empty() {
        return Err(ShaderError::Empty);
    }
    if bytes.len() > MAX_SHADER_BYTECODE_BYTES {
        return Err(ShaderError::BytecodeTooLarge {
            len: bytes.len(),
            max: MAX_SHADER_BYTECODE_BYTES,
        });
    }
    if bytes.len() % 4 != 0 {
        return Err(ShaderError::InvalidByteLength { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

pub(crate) fn is_comment(token: u32) -> bool {
    token & 0xFFFF == OPCODE_COMMENT
}

pub(crate) fn is_end(token: u32) -> bool {
    token & 0xFFFF == OPCODE_END
}

/// A comment block: the tokens following a `0xFFFE` comment opcode.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Comment<'a> {
    pub(crate) at_token: usize,
    pub(crate) tokens: &'a [u32],
}

impl<'a> Comment<'a> {
    /// The block identifier stored in the first comment token, if any.
    pub(crate) fn fourcc(&self) -> Option<FourCC> {
        self.tokens.first().map(|&t| FourCC::from_token(t))
    }

    /// Comment tokens after the identifier.
    pub(crate) fn body(&self) -> &'a [u32] {
        self.tokens.get(1..).unwrap_or(&[])
    }
}

pub(crate) struct TokenReader<'a> {
    tokens: &'a [u32],
    pub(crate) pos: usize,
}

impl<'a> TokenReader<'a> {
    pub(crate) fn new(tokens: &'a [u32]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    pub(crate) fn peek(&self) -> Option<u32> {
        self.tokens.get(self.pos).copied()
    }

    pub(crate) fn read(&mut self) -> Option<u32> {
        let t = self.peek()?;
        self.pos += 1;
        Some(t)
    }

    pub(crate) fn read_many(&mut self, count: usize) -> Option<&'a [u32]> {
        if self.remaining() < count {
            return None;
        }
        let out = &self.tokens[self.pos..self.pos + count];
        self.pos += count;
        Some(out)
    }

    pub(crate) fn rest(&self) -> &'a [u32] {
        &self.tokens[self.pos..]
    }

    /// Consumes a comment block if the next token is a comment opcode.
    ///
    /// `wide_length` selects the 16-bit length field used inside preshader streams instead of
    /// the 15-bit field of shader token streams.
    pub(crate) fn read_comment(
        &mut self,
        wide_length: bool,
    ) -> Result<Option<Comment<'a>>, ShaderError> {
        let Some(token) = self.peek() else {
            return Ok(None);
        };
        if !is_comment(token) {
            return Ok(None);
        }
        let at_token = self.pos;
        self.pos += 1;
        let mask = if wide_length { 0xFFFF } else { COMMENT_LEN_MASK };
        let len = ((token >> COMMENT_LEN_SHIFT) & mask) as usize;
        let remaining = self.remaining();
        let tokens = self.read_many(len).ok_or(ShaderError::TruncatedComment {
            at_token,
            needed: len,
            remaining,
        })?;
        Ok(Some(Comment { at_token, tokens }))
    }
}
