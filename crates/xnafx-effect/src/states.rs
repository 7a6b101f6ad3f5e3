//! Render-state and sampler-state codes as they appear in effect binaries.
//!
//! Render-state codes are NOT the native `D3DRENDERSTATETYPE` values: the effect compiler renumbers
//! them from zero with all `WRAPn` states adjacent, and reserves 146/147 for the shader
//! pseudo-states. Unrecognized codes are kept as `Unknown`.

macro_rules! state_codes {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $code:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
            Unknown(u32),
        }

        impl $name {
            pub fn from_raw(raw: u32) -> Self {
                match raw {
                    $($code => $name::$variant,)*
                    other => $name::Unknown(other),
                }
            }

            pub fn raw(self) -> u32 {
                match self {
                    $($name::$variant => $code,)*
                    $name::Unknown(other) => other,
                }
            }
        }
    };
}

state_codes! {
    /// Pass state type.
    pub enum RenderStateType {
        ZEnable = 0,
        FillMode = 1,
        ShadeMode = 2,
        ZWriteEnable = 3,
        AlphaTestEnable = 4,
        LastPixel = 5,
        SrcBlend = 6,
        DestBlend = 7,
        CullMode = 8,
        ZFunc = 9,
        AlphaRef = 10,
        AlphaFunc = 11,
        DitherEnable = 12,
        AlphaBlendEnable = 13,
        FogEnable = 14,
        SpecularEnable = 15,
        FogColor = 16,
        FogTableMode = 17,
        FogStart = 18,
        FogEnd = 19,
        FogDensity = 20,
        RangeFogEnable = 21,
        StencilEnable = 22,
        StencilFail = 23,
        StencilZFail = 24,
        StencilPass = 25,
        StencilFunc = 26,
        StencilRef = 27,
        StencilMask = 28,
        StencilWriteMask = 29,
        TextureFactor = 30,
        Wrap0 = 31,
        Wrap1 = 32,
        Wrap2 = 33,
        Wrap3 = 34,
        Wrap4 = 35,
        Wrap5 = 36,
        Wrap6 = 37,
        Wrap7 = 38,
        Wrap8 = 39,
        Wrap9 = 40,
        Wrap10 = 41,
        Wrap11 = 42,
        Wrap12 = 43,
        Wrap13 = 44,
        Wrap14 = 45,
        Wrap15 = 46,
        Clipping = 47,
        Lighting = 48,
        Ambient = 49,
        FogVertexMode = 50,
        ColorVertex = 51,
        LocalViewer = 52,
        NormalizeNormals = 53,
        DiffuseMaterialSource = 54,
        SpecularMaterialSource = 55,
        AmbientMaterialSource = 56,
        EmissiveMaterialSource = 57,
        VertexBlend = 58,
        ClipPlaneEnable = 59,
        PointSize = 60,
        PointSizeMin = 61,
        PointSpriteEnable = 62,
        PointScaleEnable = 63,
        PointScaleA = 64,
        PointScaleB = 65,
        PointScaleC = 66,
        MultisampleAntialias = 67,
        MultisampleMask = 68,
        PatchEdgeStyle = 69,
        DebugMonitorToken = 70,
        PointSizeMax = 71,
        IndexedVertexBlendEnable = 72,
        ColorWriteEnable = 73,
        TweenFactor = 74,
        BlendOp = 75,
        PositionDegree = 76,
        NormalDegree = 77,
        ScissorTestEnable = 78,
        SlopeScaleDepthBias = 79,
        AntialiasedLineEnable = 80,
        MinTessellationLevel = 81,
        MaxTessellationLevel = 82,
        AdaptiveTessX = 83,
        AdaptiveTessY = 84,
        AdaptiveTessZ = 85,
        AdaptiveTessW = 86,
        EnableAdaptiveTessellation = 87,
        TwoSidedStencilMode = 88,
        CcwStencilFail = 89,
        CcwStencilZFail = 90,
        CcwStencilPass = 91,
        CcwStencilFunc = 92,
        ColorWriteEnable1 = 93,
        ColorWriteEnable2 = 94,
        ColorWriteEnable3 = 95,
        BlendFactor = 96,
        SrgbWriteEnable = 97,
        DepthBias = 98,
        SeparateAlphaBlendEnable = 99,
        SrcBlendAlpha = 100,
        DestBlendAlpha = 101,
        BlendOpAlpha = 102,
        VertexShader = 146,
        PixelShader = 147,
    }
}

state_codes! {
    /// Sampler state type, after the `!0xA0` mask is applied.
    pub enum SamplerStateType {
        Unknown0 = 0,
        Unknown1 = 1,
        Unknown2 = 2,
        Unknown3 = 3,
        Texture = 4,
        AddressU = 5,
        AddressV = 6,
        AddressW = 7,
        BorderColor = 8,
        MagFilter = 9,
        MinFilter = 10,
        MipFilter = 11,
        MipMapLodBias = 12,
        MaxMipLevel = 13,
        MaxAnisotropy = 14,
        SrgbTexture = 15,
        ElementIndex = 16,
        DMapOffset = 17,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_state_codes_are_renumbered() {
        assert_eq!(RenderStateType::from_raw(0), RenderStateType::ZEnable);
        assert_eq!(RenderStateType::from_raw(31), RenderStateType::Wrap0);
        assert_eq!(RenderStateType::from_raw(46), RenderStateType::Wrap15);
        assert_eq!(RenderStateType::from_raw(102), RenderStateType::BlendOpAlpha);
        assert_eq!(RenderStateType::from_raw(103), RenderStateType::Unknown(103));
        assert_eq!(RenderStateType::from_raw(146), RenderStateType::VertexShader);
        assert_eq!(RenderStateType::from_raw(147), RenderStateType::PixelShader);
        assert_eq!(RenderStateType::PixelShader.raw(), 147);
        assert_eq!(RenderStateType::Unknown(500).raw(), 500);
    }

    #[test]
    fn render_state_codes_are_contiguous() {
        for raw in 0..=102 {
            let state = RenderStateType::from_raw(raw);
            assert!(!matches!(state, RenderStateType::Unknown(_)), "{raw}");
            assert_eq!(state.raw(), raw);
        }
    }

    #[test]
    fn sampler_state_codes() {
        assert_eq!(SamplerStateType::from_raw(4), SamplerStateType::Texture);
        assert_eq!(SamplerStateType::from_raw(17), SamplerStateType::DMapOffset);
        assert_eq!(SamplerStateType::from_raw(18), SamplerStateType::Unknown(18));
        assert_eq!(SamplerStateType::MinFilter.raw(), 10);
    }
}
