use crate::foundation::core::FrameIndex;
use crate::foundation::error::{SignalError, SignalResult};
use crate::render::Frame;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback rate the frames are meant for.
    pub fps: u32,
}

impl SinkConfig {
    pub(crate) fn check_frame(&self, frame: &Frame) -> SignalResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(SignalError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != (self.width as usize) * (self.height as usize) * 4 {
            return Err(SignalError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Consumer of finished frames in playback order.
///
/// Ordering contract: `push_frame` is called with strictly increasing [`FrameIndex`] values.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> SignalResult<()>;
    /// Persist one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> SignalResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> SignalResult<()>;
}

pub(crate) fn check_order(last: Option<FrameIndex>, idx: FrameIndex) -> SignalResult<()> {
    if let Some(last) = last
        && idx.0 <= last.0
    {
        return Err(SignalError::render(format!(
            "sink received out-of-order frame index {} after {}",
            idx.0, last.0
        )));
    }
    Ok(())
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Frame>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SignalResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> SignalResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SignalError::render("in-memory sink not started"))?;
        cfg.check_frame(frame)?;
        check_order(self.frames.last().map(|f| f.index), idx)?;
        let mut frame = frame.clone();
        frame.index = idx;
        self.frames.push(frame);
        Ok(())
    }

    fn end(&mut self) -> SignalResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
