use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{SignalError, SignalResult};

/// One rendered frame as tightly packed, row-major RGBA8 pixels.
///
/// Frames are always opaque, so straight and premultiplied alpha coincide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Position in playback order.
    pub index: FrameIndex,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl Frame {
    /// Frame filled with one color.
    pub fn filled(index: FrameIndex, canvas: Canvas, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(canvas.area() * 4);
        for _ in 0..canvas.area() {
            data.extend_from_slice(&rgba);
        }
        Self {
            index,
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// Wrap existing pixel bytes, checking the length.
    pub fn from_rgba(index: FrameIndex, width: u32, height: u32, data: Vec<u8>) -> SignalResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(SignalError::render(format!(
                "frame byte length mismatch: expected {expected}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            index,
            width,
            height,
            data,
        })
    }

    pub(crate) fn from_pixmap(index: FrameIndex, pixmap: &vello_cpu::Pixmap) -> Self {
        Self {
            index,
            width: u32::from(pixmap.width()),
            height: u32::from(pixmap.height()),
            data: pixmap.data_as_u8_slice().to_vec(),
        }
    }

    /// Canvas this frame covers.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    /// Panics when `(x, y)` lies outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Mutable iterator over rows, each `width * 4` bytes.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        let stride = (self.width as usize) * 4;
        self.data.chunks_exact_mut(stride.max(4))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
