use crate::foundation::error::{SignalError, SignalResult};

pub use kurbo::{Affine, Point, Rect};

/// Absolute 0-based frame index in playback order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in playback order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> SignalResult<Self> {
        if start.0 > end.0 {
            return Err(SignalError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Range covering a whole run: `[0, duration_secs * fps)`.
    pub fn for_run(duration_secs: u32, fps: u32) -> Self {
        Self {
            start: FrameIndex(0),
            end: FrameIndex(u64::from(duration_secs) * u64::from(fps)),
        }
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Split into consecutive sub-ranges of at most `chunk` frames.
    pub fn chunks(self, chunk: u64) -> impl Iterator<Item = FrameRange> {
        let chunk = chunk.max(1);
        let end = self.end.0;
        let mut next = self.start.0;
        std::iter::from_fn(move || {
            if next >= end {
                return None;
            }
            let start = next;
            next = (start + chunk).min(end);
            Some(FrameRange {
                start: FrameIndex(start),
                end: FrameIndex(next),
            })
        })
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas. Both dimensions must be non-zero and fit the rasterizer's `u16`.
    pub fn new(width: u32, height: u32) -> SignalResult<Self> {
        if width == 0 || height == 0 {
            return Err(SignalError::validation("canvas width/height must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(SignalError::validation(format!(
                "canvas {width}x{height} exceeds the {max}x{max} raster limit",
                max = u16::MAX
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels.
    pub fn area(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Full-canvas rectangle in pixel space.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Dimensions as `u16`, as required by `vello_cpu`.
    pub(crate) fn as_u16(self) -> SignalResult<(u16, u16)> {
        let w = u16::try_from(self.width)
            .map_err(|_| SignalError::render("canvas width exceeds u16"))?;
        let h = u16::try_from(self.height)
            .map_err(|_| SignalError::render("canvas height exceeds u16"))?;
        Ok((w, h))
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::gray(255);
    /// Opaque black.
    pub const BLACK: Self = Self::gray(0);

    /// Opaque color from RGB components.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque gray level.
    pub const fn gray(v: u8) -> Self {
        Self::opaque(v, v, v)
    }

    /// Channels as an `[r, g, b, a]` array.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub(crate) fn to_peniko(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
