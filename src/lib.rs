//! Decode DirectX 9 effects from XNA `.xnb` assets.
//!
//! The work is split across the workspace crates, re-exported here:
//!
//! - [`xnb`] unwraps the asset envelope down to the raw effect binary,
//! - [`effect`] decodes the effect binary into parameters, techniques and objects,
//! - [`shader`] parses the shader bytecode and preshaders embedded in effect objects.

#![forbid(unsafe_code)]

use thiserror::Error;
use tracing::debug;

pub use xnafx_effect as effect;
pub use xnafx_shader as shader;
pub use xnafx_xnb as xnb;

use xnafx_effect::{DecodeOptions, Effect, EffectError};
use xnafx_xnb::{Decompressor, XnbError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading xnb envelope")]
    Xnb(#[from] XnbError),
    #[error("decoding effect")]
    Effect(#[from] EffectError),
    #[error("xnb file holds a null asset")]
    MissingEffect,
}

/// Decodes the effect embedded in an `.xnb` file.
pub fn load_xnb_effect(
    bytes: &[u8],
    options: &DecodeOptions,
    decompressor: Option<&mut dyn Decompressor>,
) -> Result<Effect, LoadError> {
    let asset = xnafx_xnb::read_effect_asset(bytes, decompressor)?;
    let blob = asset.effect.ok_or(LoadError::MissingEffect)?;
    debug!(len = blob.len(), platform = ?asset.header.platform, "extracted effect binary");
    Ok(Effect::parse_with_options(&blob, options)?)
}

/// True when `bytes` starts with the `XNB` envelope magic.
pub fn is_xnb(bytes: &[u8]) -> bool {
    bytes.starts_with(b"XNB")
}
