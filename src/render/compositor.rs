use rand::Rng;

use crate::config::RunConfig;
use crate::corpus::Corpus;
use crate::foundation::core::{Affine, Canvas, FrameIndex, Rect, Rgba8, affine_to_cpu, rect_to_cpu};
use crate::foundation::error::SignalResult;
use crate::foundation::math::frame_rng;
use crate::render::corruption::{CorruptionReport, corrupt};
use crate::render::frame::Frame;
use crate::render::text::{FontFace, TextLayout, TextLayoutEngine, draw_layout};
use crate::render::texture::{Texture, TextureBank};

/// Raw frame before corruption.
#[derive(Clone, Debug)]
pub struct ComposedFrame {
    /// Composited pixels.
    pub frame: Frame,
    /// `true` when the flash override replaced the layered content.
    pub jumpscare: bool,
    /// Texture pastes dropped because the texture did not fit the canvas.
    pub skipped_pastes: u32,
}

/// Final, corrupted frame.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    /// Corrupted pixels.
    pub frame: Frame,
    /// `true` when the flash override fired.
    pub jumpscare: bool,
    /// Corruption applied on top of the composited frame.
    pub corruption: CorruptionReport,
}

/// Builds frames from the run's corpus, texture bank, and configuration.
///
/// The compositor itself is immutable and shared by all workers; per-thread raster and text
/// state lives in a [`CompositorWorker`].
pub struct FrameCompositor<'a> {
    config: &'a RunConfig,
    corpus: &'a Corpus,
    bank: &'a TextureBank,
    font: Option<&'a FontFace>,
}

/// Per-thread render context, readback surface, and pre-shaped text.
pub struct CompositorWorker {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    text: Option<TextPainter>,
}

struct TextPainter {
    font: vello_cpu::peniko::FontData,
    lines: Vec<TextLayout>,
    warning: TextLayout,
}

impl<'a> FrameCompositor<'a> {
    /// Compositor for one run. `font == None` disables text overlays.
    pub fn new(
        config: &'a RunConfig,
        corpus: &'a Corpus,
        bank: &'a TextureBank,
        font: Option<&'a FontFace>,
    ) -> Self {
        Self {
            config,
            corpus,
            bank,
            font,
        }
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.config.canvas
    }

    /// Fresh per-thread state. Corpus lines are shaped once here.
    pub fn worker(&self) -> SignalResult<CompositorWorker> {
        let (w, h) = self.config.canvas.as_u16()?;
        let text = match self.font {
            None => None,
            Some(face) => {
                let size = self.config.layers.text_size_px;
                let mut engine = TextLayoutEngine::new(face)?;
                let lines = self
                    .corpus
                    .lines()
                    .iter()
                    .map(|l| engine.layout_line(l, size))
                    .collect::<SignalResult<Vec<_>>>()?;
                let warning = engine.layout_line(&self.config.jumpscare.text, size)?;
                Some(TextPainter {
                    font: face.font_data(),
                    lines,
                    warning,
                })
            }
        };
        Ok(CompositorWorker {
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            text,
        })
    }

    /// Composite frame `index` without corruption.
    pub fn compose(
        &self,
        worker: &mut CompositorWorker,
        index: FrameIndex,
        rng: &mut impl Rng,
    ) -> SignalResult<ComposedFrame> {
        let canvas = self.config.canvas;
        let layers = &self.config.layers;
        let ctx = &mut worker.ctx;
        ctx.reset();

        // Black level.
        let base = rng.gen_range(0..=layers.base_max);
        fill_canvas(ctx, canvas, Rgba8::gray(base));

        let mut skipped_pastes = 0;
        let pastes = rng.gen_range(layers.paste_min..=layers.paste_max);
        for _ in 0..pastes {
            let texture = self.bank.choose(rng);
            if !self.paste(ctx, texture, rng) {
                skipped_pastes += 1;
            }
        }

        let overlays = rng.gen_range(layers.text_min..=layers.text_max);
        for _ in 0..overlays {
            let line = self.corpus.choose_index(rng);
            let x = rng.gen_range(0..=canvas.width.saturating_sub(layers.text_box_w));
            let y = rng.gen_range(0..=canvas.height.saturating_sub(layers.text_box_h));
            let gray = rng.gen_range(layers.text_min_brightness..=u8::MAX);
            if let Some(text) = &worker.text {
                draw_layout(
                    ctx,
                    &text.font,
                    &text.lines[line],
                    f64::from(x),
                    f64::from(y),
                    Rgba8::gray(gray),
                );
            }
        }

        let jumpscare = rng.gen_bool(self.config.jumpscare.probability);
        if jumpscare {
            ctx.reset();
            fill_canvas(ctx, canvas, self.config.jumpscare.flash);
            if let Some(text) = &worker.text {
                let (x, y) = jumpscare_text_origin(canvas);
                draw_layout(
                    ctx,
                    &text.font,
                    &text.warning,
                    x,
                    y,
                    self.config.jumpscare.text_color,
                );
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut worker.pixmap);
        Ok(ComposedFrame {
            frame: Frame::from_pixmap(index, &worker.pixmap),
            jumpscare,
            skipped_pastes,
        })
    }

    /// Composite and corrupt frame `index` using its own seeded random stream.
    ///
    /// The result depends only on `(run_seed, index)` and the compositor inputs, so frames can be
    /// rendered in any order on any thread.
    pub fn render(
        &self,
        worker: &mut CompositorWorker,
        run_seed: u64,
        index: FrameIndex,
    ) -> SignalResult<RenderedFrame> {
        let mut rng = frame_rng(run_seed, index);
        let ComposedFrame {
            mut frame,
            jumpscare,
            ..
        } = self.compose(worker, index, &mut rng)?;
        let corruption = corrupt(&mut frame, &self.config.corruption, &mut rng);
        Ok(RenderedFrame {
            frame,
            jumpscare,
            corruption,
        })
    }

    /// Draw one texture, optionally resized, fully inside the canvas. Returns `false` when the
    /// texture does not fit and nothing was drawn.
    fn paste(&self, ctx: &mut vello_cpu::RenderContext, texture: &Texture, rng: &mut impl Rng) -> bool {
        let canvas = self.config.canvas;
        let layers = &self.config.layers;
        let (w, h) = if layers.resize_pastes {
            (
                rng.gen_range(layers.min_paste_px.min(canvas.width)..=canvas.width),
                rng.gen_range(layers.min_paste_px.min(canvas.height)..=canvas.height),
            )
        } else {
            (texture.width(), texture.height())
        };
        let Some(x) = paste_offset(canvas.width, w, rng) else {
            return false;
        };
        let Some(y) = paste_offset(canvas.height, h, rng) else {
            return false;
        };

        let sx = f64::from(w) / f64::from(texture.width());
        let sy = f64::from(h) / f64::from(texture.height());
        let tr = Affine::translate((f64::from(x), f64::from(y))) * Affine::scale_non_uniform(sx, sy);
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(texture.paint());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(texture.width()),
            f64::from(texture.height()),
        ));
        true
    }
}

/// Offset along one axis keeping `[offset, offset + size)` inside `[0, canvas)`.
///
/// Returns `None` when `size > canvas`; such a paste must be skipped.
pub fn paste_offset(canvas: u32, size: u32, rng: &mut impl Rng) -> Option<u32> {
    let room = canvas.checked_sub(size)?;
    Some(rng.gen_range(0..=room))
}

/// Top-left corner of the jumpscare warning text.
pub fn jumpscare_text_origin(canvas: Canvas) -> (f64, f64) {
    (f64::from(canvas.width / 3), f64::from(canvas.height / 2))
}

/// Area the jumpscare warning may touch; everything outside it is the flash color.
///
/// One pixel of slack on the top and left covers antialiasing, and two text sizes of height
/// cover ascent and descent.
pub fn jumpscare_text_region(canvas: Canvas, text_size_px: f32) -> Rect {
    let (x, y) = jumpscare_text_origin(canvas);
    let bottom = y + (2.0 * f64::from(text_size_px)).ceil() + 1.0;
    Rect::new(
        (x - 1.0).max(0.0),
        (y - 1.0).max(0.0),
        f64::from(canvas.width),
        bottom.min(f64::from(canvas.height)),
    )
}

fn fill_canvas(ctx: &mut vello_cpu::RenderContext, canvas: Canvas, color: Rgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color.to_peniko());
    ctx.fill_rect(&rect_to_cpu(canvas.rect()));
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
