use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "avatar-gif", version)]
struct Cli {
    /// Optional JSON config file (`assets_dir`, `positions`, `codec`, `pipeline`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the source GIFs.
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Position tables JSON (defaults to `<assets>/positions.json`).
    #[arg(long, global = true)]
    positions: Option<PathBuf>,

    /// Codec backend: `native` or `ffmpeg`.
    #[arg(long, global = true)]
    codec: Option<String>,

    /// Override the compositing worker ceiling.
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite an avatar onto a source GIF and write the result.
    Render(RenderArgs),
    /// Dump the composited frames as PNG files without encoding.
    Preview(PreviewArgs),
    /// Print source metadata and its position table as JSON.
    Inspect(InspectArgs),
    /// List known source names.
    Sources,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Avatar image (PNG, JPEG, ...).
    #[arg(long)]
    avatar: PathBuf,

    /// Source GIF name, e.g. `2.gif`.
    #[arg(long)]
    source: String,

    /// Milliseconds between output frames.
    #[arg(long, default_value_t = 100.0)]
    delay: f64,

    /// Clockwise rotation in degrees, 0..=360.
    #[arg(long, default_value_t = 0.0)]
    rotate: f64,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Avatar image (PNG, JPEG, ...).
    #[arg(long)]
    avatar: PathBuf,

    /// Source GIF name.
    #[arg(long)]
    source: String,

    /// Clockwise rotation in degrees, 0..=360.
    #[arg(long, default_value_t = 0.0)]
    rotate: f64,

    /// Directory receiving `frame_NNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Source GIF name.
    #[arg(long)]
    source: String,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AppConfig {
    assets_dir: Option<PathBuf>,
    positions: Option<PathBuf>,
    codec: avatar_gif::CodecChoice,
    pipeline: avatar_gif::PipelineOpts,
}

impl AppConfig {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config '{}'", path.display()))
    }

    fn apply_flags(&mut self, cli: &Cli) -> anyhow::Result<()> {
        if let Some(dir) = &cli.assets {
            self.assets_dir = Some(dir.clone());
        }
        if let Some(p) = &cli.positions {
            self.positions = Some(p.clone());
        }
        if let Some(codec) = &cli.codec {
            self.codec = match codec.as_str() {
                "native" => avatar_gif::CodecChoice::Native,
                "ffmpeg" => avatar_gif::CodecChoice::Ffmpeg,
                other => anyhow::bail!("unknown codec '{other}' (expected 'native' or 'ffmpeg')"),
            };
        }
        if let Some(workers) = cli.workers {
            self.pipeline.workers = workers;
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.apply_flags(&cli)?;

    match cli.cmd {
        Command::Render(args) => cmd_render(&config, args),
        Command::Preview(args) => cmd_preview(&config, args),
        Command::Inspect(args) => cmd_inspect(&config, args),
        Command::Sources => cmd_sources(&config),
    }
}

fn build_pipeline(config: &AppConfig) -> anyhow::Result<avatar_gif::AvatarGifPipeline> {
    let assets_dir = config
        .assets_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("assets"));
    let positions_path = config
        .positions
        .clone()
        .unwrap_or_else(|| assets_dir.join("positions.json"));

    let tables = avatar_gif::PositionTables::from_json_file(&positions_path)?;
    let store = avatar_gif::DirSourceStore::new(&assets_dir);
    let codec = avatar_gif::resolve_codec_backend(config.codec)?;
    tracing::info!(
        assets = %assets_dir.display(),
        sources = tables.len(),
        codec = codec.name(),
        "pipeline configured"
    );

    Ok(avatar_gif::AvatarGifPipeline::new(
        Arc::new(tables),
        Arc::new(store),
        codec,
        config.pipeline.clone(),
    )?)
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_render(config: &AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let avatar = std::fs::read(&args.avatar)
        .with_context(|| format!("read avatar '{}'", args.avatar.display()))?;
    let request =
        avatar_gif::AvatarRequest::from_avatar_bytes(&avatar, args.delay, args.source, args.rotate);

    let gif = pipeline.run(&request)?;

    create_parent_dir(&args.out)?;
    std::fs::write(&args.out, &gif)
        .with_context(|| format!("write gif '{}'", args.out.display()))?;
    eprintln!("wrote {} ({} bytes)", args.out.display(), gif.len());
    Ok(())
}

fn cmd_preview(config: &AppConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let avatar = std::fs::read(&args.avatar)
        .with_context(|| format!("read avatar '{}'", args.avatar.display()))?;
    let rotation = avatar_gif::Rotation::from_degrees(args.rotate)?;

    let frames = pipeline.preview(&args.source, &avatar, rotation)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for (idx, frame) in frames.iter().enumerate() {
        let path = args.out_dir.join(format!("frame_{idx:03}.png"));
        frame
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
    }
    eprintln!("wrote {} frames to {}", frames.len(), args.out_dir.display());
    Ok(())
}

fn cmd_inspect(config: &AppConfig, args: InspectArgs) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let summary = pipeline.inspect_source(&args.source)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serialize source summary")?
    );
    Ok(())
}

fn cmd_sources(config: &AppConfig) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    for name in pipeline.tables().names() {
        println!("{name}");
    }
    Ok(())
}
