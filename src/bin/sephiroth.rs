use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sephiroth::{
    Corpus, FrameIndex, Pipeline, QualityProfile, RunConfig, RunOptions,
    source::{HttpFetcher, HttpSummary, OfflineSummary, SummaryProvider},
};

#[derive(Parser, Debug)]
#[command(name = "sephiroth", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a full video (requires `ffmpeg` and `espeak` on PATH).
    Render(RenderArgs),
    /// Render a single corrupted frame as a PNG. No external commands are run.
    Frame(FrameArgs),
    /// Print the overlay corpus for a keyword, one line per entry.
    Corpus(CorpusArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file merged over the profile defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Quality profile (`lofi` or `standard`).
    #[arg(long)]
    profile: Option<QualityProfile>,

    /// Font file for overlays (defaults to a system monospace face).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Never touch the network; use builtin keywords and the static corpus.
    #[arg(long)]
    offline: bool,
}

impl ConfigArgs {
    fn resolve(&self) -> anyhow::Result<RunConfig> {
        let mut cfg = RunConfig::resolve(self.profile, self.config.as_deref())?;
        if self.offline {
            cfg.network.enabled = false;
        }
        if let Some(font) = &self.font {
            cfg.font_path = Some(font.clone());
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Run seed (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Use this keyword instead of picking one.
    #[arg(long)]
    keyword: Option<String>,

    /// Duration in seconds instead of a random draw.
    #[arg(long)]
    duration: Option<u32>,

    /// Directory receiving the video.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Render worker threads (defaults to all cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Render frames on the calling thread only.
    #[arg(long)]
    sequential: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Frame index (0-based).
    #[arg(long)]
    index: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Keyword the corpus is built around.
    #[arg(long, default_value = "signal")]
    keyword: String,

    /// Run seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Args, Debug)]
struct CorpusArgs {
    /// Keyword the corpus is built around.
    #[arg(long)]
    keyword: String,

    /// Skip the summary request.
    #[arg(long)]
    offline: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Corpus(args) => cmd_corpus(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = args.config.resolve()?;
    if args.threads.is_some() {
        cfg.render.threads = args.threads;
    }
    if args.sequential {
        cfg.render.parallel = false;
    }

    let pipeline = Pipeline::new(cfg)?;
    let report = pipeline.run(&RunOptions {
        seed: args.seed,
        keyword: args.keyword,
        duration_secs: args.duration,
        out_dir: args.out_dir,
        scratch_parent: None,
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} ({} frames, {} jumpscares, ~{:.1}s)",
            report.output.display(),
            report.stats.frames,
            report.stats.jumpscares,
            report.planned_duration_secs
        );
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut cfg = args.config.resolve()?;
    // Previews never hit the network.
    cfg.network.enabled = false;

    let pipeline = Pipeline::new(cfg)?;
    let rendered = pipeline.preview_frame(args.seed, &args.keyword, FrameIndex(args.index))?;
    let frame = &rendered.frame;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
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

    eprintln!(
        "wrote {} (jumpscare: {}, shift: {:?})",
        args.out.display(),
        rendered.jumpscare,
        rendered.corruption.shift
    );
    Ok(())
}

fn cmd_corpus(args: CorpusArgs) -> anyhow::Result<()> {
    let provider: Box<dyn SummaryProvider> = if args.offline {
        Box::new(OfflineSummary)
    } else {
        let cfg = RunConfig::default();
        Box::new(HttpSummary::new(HttpFetcher::new()?, &cfg.network))
    };
    let corpus = Corpus::fetch_and_build(&args.keyword, provider.as_ref());
    for line in corpus.lines() {
        println!("{line}");
    }
    Ok(())
}
