use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::audio::{AudioSynthesizer, AudioTrack, CommandAudioSynth};
use crate::config::{RenderThreading, RunConfig};
use crate::corpus::Corpus;
use crate::encode::{
    FfmpegMuxer, FrameSink, MuxRequest, Muxer, PngSequenceSink, SinkConfig, output_file_name,
};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{SignalError, SignalResult};
use crate::foundation::math::{SeedStream, stream_rng};
use crate::process::{CommandRunner, SystemRunner};
use crate::render::{CompositorWorker, FontFace, FrameCompositor, RenderedFrame, TextureBank};
use crate::session::context::RunContext;
use crate::session::stage::{Stage, StageTracker};
use crate::source::{
    HttpFetcher, HttpLexicon, HttpSummary, LexiconProvider, OfflineLexicon, OfflineSummary,
    SummaryProvider, keyword_candidates, select_keyword,
};

/// Per-invocation choices layered on top of [`RunConfig`].
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Run seed; `None` draws one from entropy.
    pub seed: Option<u64>,
    /// Fixed keyword instead of a lexicon pick.
    pub keyword: Option<String>,
    /// Fixed duration instead of a draw from the configured range.
    pub duration_secs: Option<u32>,
    /// Directory receiving the output artifact.
    pub out_dir: PathBuf,
    /// Parent of the scratch directory; `None` uses the system temp directory.
    pub scratch_parent: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: None,
            keyword: None,
            duration_secs: None,
            out_dir: PathBuf::from("."),
            scratch_parent: None,
        }
    }
}

/// Frame loop counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Frames replaced by the flash override.
    pub jumpscares: u64,
    /// Frames that received a tracking shift.
    pub shifted: u64,
}

/// Summary of a successful run.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RunReport {
    /// Seed every random stream was derived from.
    pub run_seed: u64,
    /// Selected keyword.
    pub keyword: String,
    /// Number of corpus lines available to overlays.
    pub corpus_lines: usize,
    /// Target duration in seconds.
    pub duration_secs: u32,
    /// Frame loop counters.
    pub stats: FrameStats,
    /// Produced artifact.
    pub output: PathBuf,
    /// Expected artifact duration, `min(video, audio)`.
    pub planned_duration_secs: f64,
    /// Scratch directory used (already removed).
    pub scratch_dir: PathBuf,
    /// Stages visited, in order.
    pub stages: Vec<Stage>,
}

/// The whole keyword-to-artifact pipeline with replaceable collaborators.
pub struct Pipeline {
    config: RunConfig,
    lexicon: Box<dyn LexiconProvider>,
    summary: Box<dyn SummaryProvider>,
    audio: Box<dyn AudioSynthesizer>,
    muxer: Box<dyn Muxer>,
    font: Option<FontFace>,
}

impl Pipeline {
    /// Validate `config` and wire the system collaborators: HTTP sources (unless the network is
    /// disabled), `espeak`/`ffmpeg` through a [`SystemRunner`], and the configured or system font.
    pub fn new(config: RunConfig) -> SignalResult<Self> {
        config.validate()?;
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner::new(config.commands.policy()));

        let (lexicon, summary): (Box<dyn LexiconProvider>, Box<dyn SummaryProvider>) =
            if config.network.enabled {
                let fetcher = HttpFetcher::new()?;
                (
                    Box::new(HttpLexicon::new(fetcher.clone(), &config.network)),
                    Box::new(HttpSummary::new(fetcher, &config.network)),
                )
            } else {
                (Box::new(OfflineLexicon), Box::new(OfflineSummary))
            };

        let audio = Box::new(CommandAudioSynth::new(
            Arc::clone(&runner),
            config.commands.espeak.clone(),
            config.commands.ffmpeg.clone(),
            config.audio.clone(),
        ));
        let muxer = Box::new(FfmpegMuxer::new(
            runner,
            config.commands.ffmpeg.clone(),
            config.encode.clone(),
        ));
        let font = FontFace::resolve(config.font_path.as_deref())?;

        Ok(Self {
            config,
            lexicon,
            summary,
            audio,
            muxer,
            font,
        })
    }

    /// Replace the keyword source.
    pub fn with_lexicon(mut self, lexicon: impl LexiconProvider + 'static) -> Self {
        self.lexicon = Box::new(lexicon);
        self
    }

    /// Replace the corpus enrichment source.
    pub fn with_summary(mut self, summary: impl SummaryProvider + 'static) -> Self {
        self.summary = Box::new(summary);
        self
    }

    /// Replace the audio synthesizer.
    pub fn with_audio(mut self, audio: impl AudioSynthesizer + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    /// Replace the muxer.
    pub fn with_muxer(mut self, muxer: impl Muxer + 'static) -> Self {
        self.muxer = Box::new(muxer);
        self
    }

    /// Override the overlay font; `None` disables text.
    pub fn with_font(mut self, font: Option<FontFace>) -> Self {
        self.font = font;
        self
    }

    /// Resolved configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute one run. On failure the error names the stage that was running, and the scratch
    /// directory is removed either way.
    #[tracing::instrument(skip(self, opts))]
    pub fn run(&self, opts: &RunOptions) -> SignalResult<RunReport> {
        let mut tracker = StageTracker::default();
        match self.run_stages(&mut tracker, opts) {
            Ok(report) => Ok(report),
            Err(e) => {
                let stage = tracker.pending();
                tracker.fail();
                Err(e.at_stage(stage))
            }
        }
    }

    fn run_stages(&self, tracker: &mut StageTracker, opts: &RunOptions) -> SignalResult<RunReport> {
        let cfg = &self.config;
        let run_seed = opts.seed.unwrap_or_else(rand::random);

        let keyword = match &opts.keyword {
            Some(k) => k.clone(),
            None => {
                let candidates = keyword_candidates(self.lexicon.as_ref());
                select_keyword(&candidates, &mut stream_rng(run_seed, SeedStream::Keyword))
            }
        };
        let duration_secs = match opts.duration_secs {
            Some(0) => return Err(SignalError::validation("duration must be > 0")),
            Some(d) => d,
            None => cfg.duration.pick(&mut stream_rng(run_seed, SeedStream::Duration)),
        };
        tracing::info!(%keyword, duration_secs, run_seed, "run parameters");
        tracker.advance(Stage::KeywordSelected)?;

        let corpus = Corpus::fetch_and_build(&keyword, self.summary.as_ref());
        tracker.advance(Stage::CorpusBuilt)?;

        let bank = self.texture_bank(run_seed)?;
        tracker.advance(Stage::TextureBankBuilt)?;

        let ctx = match &opts.scratch_parent {
            Some(parent) => RunContext::create_in(parent)?,
            None => RunContext::create()?,
        };
        let scratch_dir = ctx.root().to_path_buf();
        tracker.advance(Stage::FramesGenerating)?;

        let compositor = FrameCompositor::new(cfg, &corpus, &bank, self.font.as_ref());
        let range = FrameRange::for_run(duration_secs, cfg.fps);
        let message = cfg.audio.message_for(&keyword);

        let (stats, audio) = std::thread::scope(|s| -> SignalResult<(FrameStats, AudioTrack)> {
            let audio_dir = ctx.audio_dir();
            let audio = s.spawn(|| self.audio.synthesize(&message, duration_secs, audio_dir));

            let mut sink = PngSequenceSink::new(ctx.frames_dir());
            let stats = render_frames(
                &compositor,
                range,
                run_seed,
                cfg.fps,
                &cfg.render,
                &mut sink,
            )?;
            tracker.advance(Stage::FramesComplete)?;

            let audio = audio
                .join()
                .map_err(|_| SignalError::render("audio thread panicked"))??;
            Ok((stats, audio))
        })?;
        tracker.advance(Stage::AudioReady)?;

        let output = opts.out_dir.join(output_file_name(
            &cfg.encode.output_prefix,
            &keyword,
            &cfg.encode.container,
        ));
        let muxed = self.muxer.mux(&MuxRequest {
            frames_dir: ctx.frames_dir(),
            frame_count: stats.frames,
            fps: cfg.fps,
            audio: &audio,
            out_path: &output,
        })?;
        tracker.advance(Stage::Muxed)?;

        ctx.close()?;
        tracker.advance(Stage::ScratchCleaned)?;
        tracker.advance(Stage::Done)?;

        tracing::info!(
            output = %muxed.path.display(),
            frames = stats.frames,
            jumpscares = stats.jumpscares,
            "run complete"
        );
        Ok(RunReport {
            run_seed,
            keyword,
            corpus_lines: corpus.len(),
            duration_secs,
            stats,
            output: muxed.path,
            planned_duration_secs: muxed.planned_duration_secs,
            scratch_dir,
            stages: tracker.history().to_vec(),
        })
    }

    /// Render one corrupted frame of the run identified by `run_seed` and `keyword`, without
    /// touching scratch storage or external commands.
    pub fn preview_frame(
        &self,
        run_seed: u64,
        keyword: &str,
        index: FrameIndex,
    ) -> SignalResult<RenderedFrame> {
        let corpus = Corpus::fetch_and_build(keyword, self.summary.as_ref());
        let bank = self.texture_bank(run_seed)?;
        let compositor = FrameCompositor::new(&self.config, &corpus, &bank, self.font.as_ref());
        let mut worker = compositor.worker()?;
        compositor.render(&mut worker, run_seed, index)
    }

    fn texture_bank(&self, run_seed: u64) -> SignalResult<TextureBank> {
        TextureBank::generate(
            &self.config.textures,
            self.config.canvas,
            &mut stream_rng(run_seed, SeedStream::Textures),
        )
    }
}

/// Render `range` and push every frame to `sink` in index order.
///
/// Frames are rendered in chunks of `threading.chunk_size`, on a dedicated pool when
/// `threading.parallel` is set. Output is identical either way.
pub fn render_frames(
    compositor: &FrameCompositor<'_>,
    range: FrameRange,
    run_seed: u64,
    fps: u32,
    threading: &RenderThreading,
    sink: &mut dyn FrameSink,
) -> SignalResult<FrameStats> {
    let canvas = compositor.canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
    })?;

    let mut mode = if threading.parallel {
        LoopMode::Parallel(build_thread_pool(threading.threads)?)
    } else {
        LoopMode::Sequential(Box::new(compositor.worker()?))
    };
    let mut stats = FrameStats::default();

    for chunk in range.chunks(threading.chunk_size as u64) {
        let frames = match &mut mode {
            LoopMode::Parallel(pool) => render_chunk_parallel(compositor, chunk, run_seed, pool)?,
            LoopMode::Sequential(worker) => (chunk.start.0..chunk.end.0)
                .map(|i| compositor.render(worker, run_seed, FrameIndex(i)))
                .collect::<SignalResult<Vec<_>>>()?,
        };
        for rendered in frames {
            stats.frames += 1;
            stats.jumpscares += u64::from(rendered.jumpscare);
            stats.shifted += u64::from(rendered.corruption.shift.is_some());
            sink.push_frame(rendered.frame.index, &rendered.frame)?;
        }
        tracing::debug!(end = chunk.end.0, total = range.end.0, "chunk written");
    }

    sink.end()?;
    Ok(stats)
}

enum LoopMode {
    Parallel(rayon::ThreadPool),
    Sequential(Box<CompositorWorker>),
}

fn render_chunk_parallel(
    compositor: &FrameCompositor<'_>,
    chunk: FrameRange,
    run_seed: u64,
    pool: &rayon::ThreadPool,
) -> SignalResult<Vec<RenderedFrame>> {
    pool.install(|| {
        (chunk.start.0..chunk.end.0)
            .into_par_iter()
            .map_init(
                || compositor.worker(),
                |worker, i| match worker {
                    Ok(w) => compositor.render(w, run_seed, FrameIndex(i)),
                    Err(e) => Err(SignalError::render(format!(
                        "failed to initialize render worker: {e}"
                    ))),
                },
            )
            .collect::<SignalResult<Vec<_>>>()
    })
}

fn build_thread_pool(threads: Option<usize>) -> SignalResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(SignalError::validation(
            "render threads must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SignalError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
