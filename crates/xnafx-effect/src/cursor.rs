//! Position-bearing reader over an immutable effect blob.
//!
//! A [`BinaryCursor`] is a `(buffer, position)` pair. It is `Copy`: slicing and peeking produce
//! new cursor values, so no read can disturb another cursor's progress.

use crate::error::EffectError;

/// Little-endian primitive readable by [`BinaryCursor::read`].
pub trait Primitive: bytemuck::Pod {
    fn from_le(self) -> Self;
}

macro_rules! impl_primitive_int {
    ($($ty:ty),*) => {
        $(impl Primitive for $ty {
            #[inline]
            fn from_le(self) -> Self {
                <$ty>::from_le(self)
            }
        })*
    };
}

impl_primitive_int!(u8, i8, u16, i16, u32, i32, u64, i64);

impl Primitive for f32 {
    #[inline]
    fn from_le(self) -> Self {
        f32::from_bits(u32::from_le(self.to_bits()))
    }
}

impl Primitive for f64 {
    #[inline]
    fn from_le(self) -> Self {
        f64::from_bits(u64::from_le(self.to_bits()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BinaryCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Bytes from the current position to the end of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        self.bytes.get(self.pos..).unwrap_or(&[])
    }

    fn range(&self, offset: usize, len: usize) -> Result<&'a [u8], EffectError> {
        let start = self.pos.checked_add(offset);
        let end = start.and_then(|start| start.checked_add(len));
        match (start, end) {
            (Some(start), Some(end)) if end <= self.bytes.len() => Ok(&self.bytes[start..end]),
            _ => Err(EffectError::OutOfBounds {
                offset: self.pos.saturating_add(offset),
                len,
                size: self.bytes.len(),
            }),
        }
    }

    /// Reads a `T` at the current position and advances past it.
    pub fn read<T: Primitive>(&mut self) -> Result<T, EffectError> {
        let value = self.peek::<T>(0)?;
        self.pos += core::mem::size_of::<T>();
        Ok(value)
    }

    /// Reads a `T` at `position + offset` without moving.
    pub fn peek<T: Primitive>(&self, offset: usize) -> Result<T, EffectError> {
        let bytes = self.range(offset, core::mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned::<T>(bytes).from_le())
    }

    pub fn skip(&mut self, n: usize) -> Result<(), EffectError> {
        self.range(n, 0)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], EffectError> {
        let bytes = self.range(0, n)?;
        self.pos += n;
        Ok(bytes)
    }

    pub fn peek_bytes(&self, offset: usize, n: usize) -> Result<&'a [u8], EffectError> {
        self.range(offset, n)
    }

    /// Reads a `u32` length at `position + offset`, then that many bytes as text.
    ///
    /// Effect strings carry their NUL terminator inside the length; trailing NULs are trimmed.
    pub fn read_length_prefixed_string(&self, offset: usize) -> Result<String, EffectError> {
        let len = self.peek::<u32>(offset)? as usize;
        let body_offset = offset.checked_add(4).ok_or(EffectError::OutOfBounds {
            offset,
            len: 4,
            size: self.bytes.len(),
        })?;
        self.read_fixed_string(body_offset, len)
    }

    pub fn read_fixed_string(&self, offset: usize, len: usize) -> Result<String, EffectError> {
        let bytes = self.range(offset, len)?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Independent cursor at `position + offset` over the same buffer.
    ///
    /// The new cursor's origin is the slice point; positions equal to the buffer end are valid.
    pub fn slice(&self, offset: usize) -> Result<BinaryCursor<'a>, EffectError> {
        self.range(offset, 0)?;
        Ok(BinaryCursor {
            bytes: &self.bytes[self.pos + offset..],
            pos: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> Vec<u8> {
        (0u8..64).collect()
    }

    #[test]
    fn reads_are_little_endian_and_advance() {
        let bytes = blob();
        let mut cursor = BinaryCursor::new(&bytes);
        assert_eq!(cursor.read::<u32>().unwrap(), 0x0302_0100);
        assert_eq!(cursor.read::<u16>().unwrap(), 0x0504);
        assert_eq!(cursor.position(), 6);
        assert_eq!(cursor.peek::<u8>(2).unwrap(), 8);
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn float_reads_decode_ieee_bits() {
        let bytes = 1.5f32.to_le_bytes();
        let mut cursor = BinaryCursor::new(&bytes);
        assert_eq!(cursor.read::<f32>().unwrap(), 1.5);
    }

    #[test]
    fn slicing_is_referentially_transparent() {
        let bytes = blob();
        let root = BinaryCursor::new(&bytes);
        for a in 0..=bytes.len() {
            for b in 0..=(bytes.len() - a) {
                let nested = root.slice(a).unwrap().slice(b).unwrap();
                let direct = root.slice(a + b).unwrap();
                assert_eq!(nested.rest(), direct.rest(), "a={a} b={b}");
            }
        }
    }

    #[test]
    fn slices_do_not_share_position() {
        let bytes = blob();
        let mut parent = BinaryCursor::new(&bytes);
        let mut child = parent.slice(8).unwrap();
        child.skip(4).unwrap();
        assert_eq!(parent.position(), 0);
        parent.skip(1).unwrap();
        assert_eq!(child.read::<u8>().unwrap(), 12);
    }

    #[test]
    fn out_of_bounds_reads_fail() {
        let bytes = [1u8, 2, 3];
        let mut cursor = BinaryCursor::new(&bytes);
        assert_eq!(
            cursor.read::<u32>(),
            Err(EffectError::OutOfBounds {
                offset: 0,
                len: 4,
                size: 3
            })
        );
        assert!(cursor.skip(4).is_err());
        assert!(cursor.slice(4).is_err());
        assert!(cursor.peek::<u8>(usize::MAX).is_err());
        assert!(cursor.slice(3).unwrap().rest().is_empty());
    }

    #[test]
    fn strings_trim_terminators() {
        let mut bytes = 6u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"World\0\0\0");
        let cursor = BinaryCursor::new(&bytes);
        assert_eq!(cursor.read_length_prefixed_string(0).unwrap(), "World");
        assert_eq!(cursor.read_fixed_string(4, 3).unwrap(), "Wor");
        assert_eq!(cursor.read_fixed_string(4, 0).unwrap(), "");
        assert!(cursor.read_fixed_string(4, 9).is_err());
    }
}
