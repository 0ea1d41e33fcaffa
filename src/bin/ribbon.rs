use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand};
use ribbon::{
    Direction, DisplayWidth, ExportEvents, ExportOutcome, ExportPipeline,
    ExportState, FsSaveAction, HttpRenderService, ImageSource, Notice, ParameterModel, Params,
    RenderEngine, ScrollDuration, Session, config::RibbonConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ribbon", version, about = "Preview and export LED ribbon board scrolls")]
struct Cli {
    /// Config file (TOML). Defaults to the per-user config when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the board viewport at one instant as a PNG.
    Frame(FrameArgs),
    /// Render a local preview MP4 of the scrolling board (requires `ffmpeg` on PATH).
    Preview(PreviewArgs),
    /// Send the image to the render service and save the returned video.
    Export(ExportArgs),
    /// Write or print the configuration.
    Config(ConfigArgs),
}

#[derive(Args, Debug, Default)]
struct Knobs {
    /// Seconds per full traversal (clamped to 5..=120).
    #[arg(long)]
    duration: Option<u32>,

    /// Scroll direction: left or right.
    #[arg(long)]
    direction: Option<Direction>,

    /// Board width: 4416, 10104, 20208 (or lower, upper, full-wrap).
    #[arg(long)]
    width: Option<DisplayWidth>,
}

impl Knobs {
    fn resolve(&self, cfg: &RibbonConfig) -> Params {
        let base = cfg.preview.params();
        Params {
            duration: self
                .duration
                .map(ScrollDuration::clamped)
                .unwrap_or(base.duration),
            direction: self.direction.unwrap_or(base.direction),
            width: self.width.unwrap_or(base.width),
        }
    }
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,

    /// Seconds into the loop.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    knobs: Knobs,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Length of the preview in seconds. Defaults to one full loop.
    #[arg(long)]
    seconds: Option<f64>,

    /// Frame rate of the preview.
    #[arg(long)]
    fps: Option<u32>,

    #[command(flatten)]
    knobs: Knobs,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,

    /// Board width: 4416, 10104, 20208 (or lower, upper, full-wrap).
    #[arg(long)]
    width: Option<DisplayWidth>,

    /// Directory the returned video is saved into.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Render service endpoint.
    #[arg(long)]
    service_url: Option<String>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Write the default configuration instead of printing the effective one.
    #[arg(long)]
    init: bool,

    /// Where to write with `--init`. Defaults to the per-user config path.
    #[arg(long)]
    path: Option<PathBuf>,
}

/// Prints notices for the operator and logs state transitions.
struct CliEvents;

impl ExportEvents for CliEvents {
    fn state_changed(&self, state: ExportState) {
        tracing::debug!(?state, "export state");
    }

    fn notice(&self, notice: &Notice) {
        eprintln!("{notice}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Config(args) = &cli.cmd {
        return cmd_config(args, cli.config.as_deref());
    }

    let cfg = ribbon::config::load(cli.config.as_deref())?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args, &cfg).await,
        Command::Preview(args) => cmd_preview(args, &cfg).await,
        Command::Export(args) => cmd_export(args, &cfg).await,
        Command::Config(_) => Ok(()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RIBBON_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_engine(image: &Path, params: Params) -> anyhow::Result<RenderEngine> {
    let model = ParameterModel::new(params);
    let source = ImageSource::new();
    source.ingest(image).await?;
    let engine = RenderEngine::new(&model, &source);
    if engine.strip().is_none() {
        bail!("'{}' could not be decoded as an image", image.display());
    }
    if let Some(strip) = engine.strip()
        && !strip.covers(engine.viewport_width())
    {
        tracing::warn!(
            copy_width = strip.copy_width(),
            board_width = engine.viewport_width(),
            "image is narrower than the board; part of the loop will show empty space"
        );
    }
    Ok(engine)
}

async fn cmd_frame(args: FrameArgs, cfg: &RibbonConfig) -> anyhow::Result<()> {
    if !args.at.is_finite() || args.at < 0.0 {
        bail!("--at must be a non-negative number of seconds");
    }
    let params = args.knobs.resolve(cfg);
    let engine = load_engine(&args.image, params).await?;
    let frame = engine.render_at(Duration::from_secs_f64(args.at));

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_preview(args: PreviewArgs, cfg: &RibbonConfig) -> anyhow::Result<()> {
    let params = args.knobs.resolve(cfg);
    let fps = ribbon::Fps::new(args.fps.unwrap_or(cfg.preview.fps), 1)?;
    let seconds = args
        .seconds
        .unwrap_or_else(|| f64::from(params.duration.secs()));
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("--seconds must be positive");
    }

    let mut engine = load_engine(&args.image, params).await?;
    let frames = fps.secs_to_frames_floor(seconds).max(1);
    ribbon::encode::preview::render_preview_mp4(&mut engine, fps, frames, &args.out)?;

    eprintln!(
        "wrote {} ({frames} frames, {})",
        args.out.display(),
        params.width.label()
    );
    Ok(())
}

async fn cmd_export(args: ExportArgs, cfg: &RibbonConfig) -> anyhow::Result<()> {
    let url = args.service_url.unwrap_or_else(|| cfg.service.url.clone());
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| cfg.export.output_dir.clone());

    let service = HttpRenderService::new(url, cfg.service.timeout())?;
    let pipeline = ExportPipeline::new(
        service,
        FsSaveAction::new(out_dir),
        CliEvents,
        cfg.export.settings(),
    );

    let mut params = cfg.preview.params();
    if let Some(width) = args.width {
        params.width = width;
    }
    let session = Session::new(params, pipeline);
    session.source().ingest(&args.image).await?;

    match session.export().await {
        ExportOutcome::Saved(_) => Ok(()),
        ExportOutcome::MissingInput => bail!("no image loaded"),
        ExportOutcome::Rejected { status } => bail!("render service returned status {status}"),
        ExportOutcome::Failed => bail!("export failed"),
        ExportOutcome::Ignored => bail!("an export is already pending"),
    }
}

fn cmd_config(args: &ConfigArgs, explicit: Option<&Path>) -> anyhow::Result<()> {
    if args.init {
        let path = args
            .path
            .clone()
            .or_else(|| explicit.map(Path::to_path_buf))
            .or_else(ribbon::config::default_config_path)
            .context("no config directory available; pass --path")?;
        ribbon::config::save_to_path(&RibbonConfig::default(), &path)?;
        eprintln!("wrote {}", path.display());
        return Ok(());
    }

    let cfg = ribbon::config::load(explicit)?;
    let text = toml::to_string_pretty(&cfg).context("encode config")?;
    print!("{text}");
    Ok(())
}
