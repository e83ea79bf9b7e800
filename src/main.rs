use anyhow::{Context, Result};
use arspaint_core::{io, EditorConfig, EditorSession, Filter};
use clap::Parser;
use std::path::PathBuf;

/// Headless canvas: import images as layers, filter, flatten and save.
#[derive(Parser, Debug)]
#[command(name = "arspaint-core", version)]
struct Args {
    /// JSON editor config; unspecified keys use defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Canvas width, overriding the config.
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height, overriding the config.
    #[arg(long)]
    height: Option<u32>,

    /// Image to place on its own layer, fitted and centered. Repeatable.
    #[arg(short, long, value_name = "IMAGE")]
    import: Vec<PathBuf>,

    /// Convert the active layer to grayscale.
    #[arg(long)]
    grayscale: bool,

    /// Invert the active layer's colors.
    #[arg(long)]
    invert: bool,

    /// Where to write the flattened canvas; format follows the extension.
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EditorConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    let mut session = EditorSession::new(config).context("Failed to create canvas")?;

    for path in &args.import {
        let image = io::open_image(path).with_context(|| format!("Failed to import {}", path.display()))?;
        let name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        session
            .import_image(&image, name)
            .with_context(|| format!("Failed to place {}", path.display()))?;
    }

    if args.grayscale {
        session.apply_filter(Filter::Grayscale);
    }
    if args.invert {
        session.apply_filter(Filter::Invert);
    }

    session
        .export(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    log::info!("Wrote {}", args.output.display());
    Ok(())
}
