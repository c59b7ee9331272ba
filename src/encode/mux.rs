use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::AudioTrack;
use crate::config::EncodeSettings;
use crate::encode::png_seq::FRAME_PATTERN;
use crate::foundation::error::{SignalError, SignalResult};
use crate::process::{CommandRunner, ExternalCommand};

/// Inputs of one mux call.
#[derive(Clone, Copy, Debug)]
pub struct MuxRequest<'a> {
    /// Directory holding `frame_00000.png`, `frame_00001.png`, ...
    pub frames_dir: &'a Path,
    /// Number of frames in the sequence.
    pub frame_count: u64,
    /// Playback rate of the sequence.
    pub fps: u32,
    /// Mixed audio track.
    pub audio: &'a AudioTrack,
    /// Container file to produce.
    pub out_path: &'a Path,
}

impl MuxRequest<'_> {
    /// Video stream length in seconds.
    pub fn video_secs(&self) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        self.frame_count as f64 / f64::from(self.fps)
    }

    /// Length of the muxed artifact under the shortest-stream policy.
    pub fn planned_duration_secs(&self) -> f64 {
        planned_duration_secs(self.frame_count, self.fps, self.audio.duration_secs)
    }
}

/// Result of a successful mux.
#[derive(Clone, Debug, PartialEq)]
pub struct MuxOutput {
    /// Produced container file.
    pub path: PathBuf,
    /// Expected duration, `min(video, audio)`.
    pub planned_duration_secs: f64,
}

/// Combines a numbered frame sequence and one audio track into a container file.
pub trait Muxer: Send + Sync {
    /// Produce `req.out_path`. Blocks until the artifact is complete.
    fn mux(&self, req: &MuxRequest<'_>) -> SignalResult<MuxOutput>;
}

/// Muxer driving the system `ffmpeg`.
pub struct FfmpegMuxer {
    runner: Arc<dyn CommandRunner>,
    program: String,
    encode: EncodeSettings,
}

impl FfmpegMuxer {
    /// Muxer running `program` (usually `ffmpeg`) through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>, encode: EncodeSettings) -> Self {
        Self {
            runner,
            program: program.into(),
            encode,
        }
    }

    /// The exact command [`Muxer::mux`] runs for `req`.
    pub fn command(&self, req: &MuxRequest<'_>) -> ExternalCommand {
        let e = &self.encode;
        ExternalCommand::new(self.program.clone())
            .args(["-y", "-framerate"])
            .arg(req.fps.to_string())
            .arg("-i")
            .arg(req.frames_dir.join(FRAME_PATTERN))
            .arg("-i")
            .arg(req.audio.path.as_os_str())
            .args(["-c:v", e.video_codec.as_str(), "-preset", e.preset.as_str(), "-crf"])
            .arg(e.crf.to_string())
            .args([
                "-pix_fmt",
                e.pix_fmt.as_str(),
                "-c:a",
                e.audio_codec.as_str(),
                "-b:a",
                e.audio_bitrate.as_str(),
                "-shortest",
            ])
            .arg(req.out_path.as_os_str())
    }
}

impl Muxer for FfmpegMuxer {
    #[tracing::instrument(skip(self, req), fields(out = %req.out_path.display(), frames = req.frame_count))]
    fn mux(&self, req: &MuxRequest<'_>) -> SignalResult<MuxOutput> {
        if req.frame_count == 0 {
            return Err(SignalError::validation("cannot mux an empty frame sequence"));
        }
        if let Some(parent) = req.out_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                SignalError::resource(format!(
                    "failed to create output directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
        self.runner.run(&self.command(req))?;
        Ok(MuxOutput {
            path: req.out_path.to_path_buf(),
            planned_duration_secs: req.planned_duration_secs(),
        })
    }
}

/// `min(frame_count / fps, audio_secs)`, never negative.
pub fn planned_duration_secs(frame_count: u64, fps: u32, audio_secs: f64) -> f64 {
    if fps == 0 {
        return 0.0;
    }
    let video = frame_count as f64 / f64::from(fps);
    video.min(audio_secs.max(0.0))
}

/// Artifact file name `<prefix><keyword>.<container>`.
///
/// Keyword characters outside `[A-Za-z0-9_-]` become `_`; an empty keyword becomes `untitled`.
pub fn output_file_name(prefix: &str, keyword: &str, container: &str) -> String {
    let mut safe: String = keyword
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.is_empty() {
        safe.push_str("untitled");
    }
    format!("{prefix}{safe}.{container}")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;
