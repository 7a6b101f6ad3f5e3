//! Bounds-checked little-endian reads over a single comment block.

use crate::error::ShaderError;
use crate::fourcc::FourCC;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteReader<'a> {
    block: FourCC,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(block: FourCC, bytes: &'a [u8]) -> Self {
        Self {
            block,
            bytes,
            pos: 0,
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Returns a reader positioned at `offset` from the start of the block.
    pub(crate) fn fork(&self, offset: usize) -> Result<Self, ShaderError> {
        if offset > self.bytes.len() {
            return Err(self.out_of_bounds(offset, 0));
        }
        Ok(Self {
            block: self.block,
            bytes: self.bytes,
            pos: offset,
        })
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ShaderError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| self.out_of_bounds(self.pos, len))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn read_u16_le(&mut self) -> Result<u16, ShaderError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u32_le(&mut self) -> Result<u32, ShaderError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a NUL-terminated string at `offset` from the start of the block.
    pub(crate) fn read_cstring_at(&self, offset: usize) -> Result<String, ShaderError> {
        let tail = self
            .bytes
            .get(offset..)
            .ok_or_else(|| self.out_of_bounds(offset, 1))?;
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| self.out_of_bounds(offset, tail.len() + 1))?;
        Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
    }

    fn out_of_bounds(&self, offset: usize, len: usize) -> ShaderError {
        ShaderError::OutOfBounds {
            block: self.block,
            offset,
            len,
            size: self.bytes.len(),
        }
    }
}

/// Flattens little-endian tokens back into bytes.
pub(crate) fn tokens_to_bytes(tokens: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.len() * 4);
    for t in tokens {
        out.extend_from_slice(&t.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cstring_requires_terminator() {
        let r = ByteReader::new(FourCC::CTAB, b"abc");
        assert!(matches!(
            r.read_cstring_at(0),
            Err(ShaderError::OutOfBounds { .. })
        ));
        let r = ByteReader::new(FourCC::CTAB, b"ab\0cd\0");
        assert_eq!(r.read_cstring_at(3).unwrap(), "cd");
    }

    #[test]
    fn fork_past_end_is_rejected() {
        let r = ByteReader::new(FourCC::CTAB, &[0u8; 4]);
        assert!(r.fork(4).is_ok());
        assert!(r.fork(5).is_err());
        let mut f = r.fork(2).unwrap();
        assert_eq!(f.remaining(), 2);
        assert!(f.read_u32_le().is_err());
    }
}
