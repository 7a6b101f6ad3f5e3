use core::fmt;

/// A four-character code identifying a comment block (`CTAB`, `PRES`, `CLIT`, ...).
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const CTAB: FourCC = FourCC(*b"CTAB");
    pub const PRES: FourCC = FourCC(*b"PRES");
    pub const CLIT: FourCC = FourCC(*b"CLIT");
    pub const FXLC: FourCC = FourCC(*b"FXLC");
    pub const PRSI: FourCC = FourCC(*b"PRSI");

    /// Interprets a little-endian token as a four-character code.
    pub fn from_token(token: u32) -> Self {
        FourCC(token.to_le_bytes())
    }

    pub fn to_token(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}
