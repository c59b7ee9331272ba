use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig, check_order};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{SignalError, SignalResult};
use crate::render::Frame;

/// ffmpeg `image2` input pattern matching [`frame_file_name`].
pub const FRAME_PATTERN: &str = "frame_%05d.png";

/// File name of frame `idx`: zero-padded to five digits, wider when needed.
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("frame_{:05}.png", idx.0)
}

/// Writes each frame as a numbered PNG in one directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl PngSequenceSink {
    /// Sink writing into `dir`, which is created on `begin` if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames written since `begin`.
    pub fn frames_written(&self) -> u64 {
        self.written
    }

    /// Path of frame `idx` inside the output directory.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(frame_file_name(idx))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> SignalResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SignalError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            SignalError::resource(format!(
                "failed to create frame directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> SignalResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SignalError::render("png sink not started"))?;
        cfg.check_frame(frame)?;
        check_order(self.last_idx, idx)?;
        self.last_idx = Some(idx);

        let path = self.frame_path(idx);
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))
        .map_err(|e| SignalError::resource(format!("{e:#}")))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> SignalResult<()> {
        if self.cfg.take().is_none() {
            return Err(SignalError::render("png sink not started"));
        }
        tracing::debug!(frames = self.written, dir = %self.dir.display(), "frame sequence complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png_seq.rs"]
mod tests;
