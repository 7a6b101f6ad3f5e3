//! Symbol class/type codes and the decoded type descriptor.

/// Shape category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolClass {
    Scalar = 0,
    Vector = 1,
    MatrixRows = 2,
    MatrixColumns = 3,
    Object = 4,
    Struct = 5,
    /// Housekeeping sentinel; never valid in a type descriptor.
    Total = 6,
}

impl SymbolClass {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => SymbolClass::Scalar,
            1 => SymbolClass::Vector,
            2 => SymbolClass::MatrixRows,
            3 => SymbolClass::MatrixColumns,
            4 => SymbolClass::Object,
            5 => SymbolClass::Struct,
            6 => SymbolClass::Total,
            _ => return None,
        })
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    pub fn is_numeric(self) -> bool {
        self <= SymbolClass::MatrixColumns
    }
}

/// Element kind of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolType {
    Void = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Texture = 5,
    Texture1D = 6,
    Texture2D = 7,
    Texture3D = 8,
    TextureCube = 9,
    Sampler = 10,
    Sampler1D = 11,
    Sampler2D = 12,
    Sampler3D = 13,
    SamplerCube = 14,
    PixelShader = 15,
    VertexShader = 16,
    PixelFragment = 17,
    VertexFragment = 18,
    Unsupported = 19,
}

impl SymbolType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        use SymbolType::*;
        Some(match raw {
            0 => Void,
            1 => Bool,
            2 => Int,
            3 => Float,
            4 => String,
            5 => Texture,
            6 => Texture1D,
            7 => Texture2D,
            8 => Texture3D,
            9 => TextureCube,
            10 => Sampler,
            11 => Sampler1D,
            12 => Sampler2D,
            13 => Sampler3D,
            14 => SamplerCube,
            15 => PixelShader,
            16 => VertexShader,
            17 => PixelFragment,
            18 => VertexFragment,
            19 => Unsupported,
            _ => return None,
        })
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    pub fn is_numeric(self) -> bool {
        (SymbolType::Bool..=SymbolType::Float).contains(&self)
    }

    pub fn is_texture(self) -> bool {
        (SymbolType::Texture..=SymbolType::TextureCube).contains(&self)
    }

    pub fn is_sampler(self) -> bool {
        (SymbolType::Sampler..=SymbolType::SamplerCube).contains(&self)
    }

    pub fn is_shader(self) -> bool {
        matches!(self, SymbolType::PixelShader | SymbolType::VertexShader)
    }
}

/// Decoded type descriptor of an effect value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTypeInfo {
    pub class: SymbolClass,
    pub ty: SymbolType,
    pub rows: u32,
    pub columns: u32,
    /// Array length; 0 means "not an array".
    pub elements: u32,
    /// Only populated for [`SymbolClass::Struct`].
    pub members: Vec<StructMember>,
}

impl SymbolTypeInfo {
    /// Number of array repetitions, treating a non-array as one.
    pub fn repetitions(&self) -> u32 {
        self.elements.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    pub name: String,
    /// Always a numeric class and a numeric type; members carry no nested members.
    pub info: SymbolTypeInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for raw in 0..=6 {
            assert_eq!(SymbolClass::from_raw(raw).map(SymbolClass::raw), Some(raw));
        }
        for raw in 0..=19 {
            assert_eq!(SymbolType::from_raw(raw).map(SymbolType::raw), Some(raw));
        }
        assert_eq!(SymbolClass::from_raw(7), None);
        assert_eq!(SymbolType::from_raw(20), None);
    }

    #[test]
    fn type_families() {
        assert!(SymbolType::Float.is_numeric());
        assert!(!SymbolType::String.is_numeric());
        assert!(SymbolType::TextureCube.is_texture());
        assert!(SymbolType::Sampler2D.is_sampler());
        assert!(!SymbolType::Texture.is_sampler());
        assert!(SymbolType::VertexShader.is_shader());
        assert!(SymbolClass::MatrixColumns.is_numeric());
        assert!(!SymbolClass::Object.is_numeric());
    }
}
