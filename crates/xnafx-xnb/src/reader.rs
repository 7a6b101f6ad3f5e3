//! Little-endian reader with .NET `BinaryReader` string and 7-bit integer encodings.

use crate::error::XnbError;

#[derive(Debug, Clone)]
pub(crate) struct ContentReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ContentReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], XnbError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(XnbError::OutOfBounds {
                offset: self.pos,
                len,
                size: self.bytes.len(),
            })?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], XnbError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, XnbError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, XnbError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, XnbError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// `BinaryReader.Read7BitEncodedInt`: at most five bytes, low groups first.
    pub(crate) fn read_7bit_int(&mut self) -> Result<u32, XnbError> {
        let start = self.pos;
        let mut value = 0u32;
        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            if shift == 28 && byte > 0x0F {
                return Err(XnbError::InvalidVarInt { offset: start });
            }
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(XnbError::InvalidVarInt { offset: start })
    }

    /// `BinaryReader.ReadString`: 7-bit byte length, then UTF-8.
    pub(crate) fn read_string(&mut self) -> Result<String, XnbError> {
        let len = self.read_7bit_int()? as usize;
        let offset = self.pos;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| XnbError::InvalidString { offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_bit_integers() {
        let cases: [(&[u8], u32); 5] = [
            (&[0x00], 0),
            (&[0x7F], 127),
            (&[0x80, 0x01], 128),
            (&[0xAC, 0x02], 300),
            (&[0xFF, 0xFF, 0xFF, 0xFF, 0x0F], u32::MAX),
        ];
        for (bytes, expected) in cases {
            assert_eq!(ContentReader::new(bytes).read_7bit_int().unwrap(), expected);
        }
    }

    #[test]
    fn overlong_seven_bit_integer_is_rejected() {
        let mut reader = ContentReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert!(matches!(
            reader.read_7bit_int(),
            Err(XnbError::InvalidVarInt { offset: 0 })
        ));
        let mut reader = ContentReader::new(&[0x80, 0x80]);
        assert!(matches!(
            reader.read_7bit_int(),
            Err(XnbError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut reader = ContentReader::new(b"\x03abcd");
        assert_eq!(reader.read_string().unwrap(), "abc");
        assert_eq!(reader.position(), 4);
        assert!(ContentReader::new(b"\x05ab").read_string().is_err());
    }
}
