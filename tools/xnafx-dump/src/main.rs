use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xnafx::effect::{DecodeOptions, Effect, UntypedObjectPolicy, DEFAULT_MAX_OBJECTS};

mod render;

#[derive(Parser, Debug)]
#[command(
    name = "xnafx-dump",
    about = "Decode a DirectX 9 effect from an XNA .xnb asset (or a raw effect binary) and print its parameters, techniques and objects."
)]
struct Args {
    /// Input file (.xnb, or a raw effect binary; auto-detected)
    input: PathBuf,

    /// Treat the input as a raw effect binary even if it starts with `XNB`
    #[arg(long, action = clap::ArgAction::SetTrue)]
    raw: bool,

    /// Keep shader objects as raw bytes instead of parsing their constant tables
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_shaders: bool,

    /// Fail if any object is left untyped after decoding
    #[arg(long, action = clap::ArgAction::SetTrue)]
    strict_objects: bool,

    /// Reject effects declaring more objects than this
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_OBJECTS)]
    max_objects: u32,

    /// Write the extracted effect binary to this path
    #[arg(long, value_name = "PATH")]
    extract: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn decode_options(&self) -> DecodeOptions {
        let untyped = if self.strict_objects {
            UntypedObjectPolicy::Reject
        } else {
            UntypedObjectPolicy::Warn
        };
        DecodeOptions::default()
            .with_max_objects(self.max_objects)
            .with_parse_shaders(!self.no_shaders)
            .with_untyped_objects(untyped)
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// The effect binary inside `bytes`: unwrapped from its XNB envelope unless `raw`.
fn effect_blob(bytes: Vec<u8>, raw: bool) -> Result<Vec<u8>> {
    if raw || !xnafx::is_xnb(&bytes) {
        return Ok(bytes);
    }
    // LZX decoding is not bundled; compressed assets fail with `CompressionUnsupported`.
    let asset = xnafx::xnb::read_effect_asset(&bytes, None).context("reading XNB envelope")?;
    info!(
        platform = ?asset.header.platform,
        version = asset.header.version,
        readers = asset.readers.len(),
        "unwrapped XNB asset"
    );
    asset
        .effect
        .ok_or(xnafx::LoadError::MissingEffect)
        .context("XNB asset has no effect")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let bytes =
        fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let blob = effect_blob(bytes, args.raw)
        .with_context(|| format!("extracting effect from {}", args.input.display()))?;

    if let Some(path) = &args.extract {
        fs::write(path, &blob).with_context(|| format!("writing {}", path.display()))?;
    }

    let effect = Effect::parse_with_options(&blob, &args.decode_options())
        .with_context(|| format!("decoding effect from {}", args.input.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    render::write_effect(&mut out, &effect).context("writing summary")?;
    out.flush().context("writing summary")?;
    Ok(())
}
