//! Renders a scene JSON file to a PNG icon.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use liquid_icon_renderer::{BackendPreference, EngineConfig, IconRenderer, Scene};

#[derive(Debug, Parser)]
#[command(name = "liquid-icon", version, about = "Render a liquid glass icon scene to PNG")]
struct Args {
    /// Scene description (JSON).
    scene: PathBuf,

    /// Output PNG path.
    #[arg(short, long)]
    output: PathBuf,

    /// Edge length in pixels. Defaults to the configured export size.
    #[arg(short, long)]
    size: Option<u32>,

    /// Glass backend: auto, cpu, or gpu.
    #[arg(short, long)]
    backend: Option<BackendPreference>,

    /// Engine configuration (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    let size = args.size.unwrap_or(config.export_size);

    let scene = Scene::from_json(&fs::read_to_string(&args.scene)?)?;
    let base_dir = args.scene.parent().map(PathBuf::from).unwrap_or_default();

    let mut renderer = IconRenderer::new(config);
    for source in scene.layers().iter().filter_map(|l| l.bitmap.as_deref()) {
        if renderer.images().contains(source) {
            continue;
        }
        match fs::read(base_dir.join(source)) {
            Ok(bytes) => renderer.images_mut().insert_bytes(source, bytes),
            Err(e) => tracing::warn!(source, error = %e, "could not read bitmap"),
        }
    }

    let png = renderer.export_frame(&scene, size)?;
    fs::write(&args.output, &png)?;
    info!(
        output = %args.output.display(),
        size,
        backend = %renderer.backend_kind(),
        "icon written"
    );
    Ok(())
}
