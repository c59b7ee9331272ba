use std::sync::Arc;

use rand::Rng;

use crate::config::TextureSettings;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SignalError, SignalResult};

/// One pre-rendered, opaque line texture.
#[derive(Clone)]
pub struct Texture {
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Texture {
    /// Build a texture from straight RGBA8 bytes. Alpha is forced to 255.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> SignalResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| SignalError::render("texture width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| SignalError::render("texture height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(SignalError::render("texture must be non-empty"));
        }
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return Err(SignalError::render("texture byte length mismatch"));
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], 255]))
            .collect();
        Ok(Self {
            pixmap: Arc::new(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, false)),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Pixel bytes, row-major RGBA8.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

/// Read-only pool of textures shared by every frame render.
#[derive(Clone, Debug)]
pub struct TextureBank {
    textures: Vec<Texture>,
}

impl TextureBank {
    /// Render `settings.pool_size` canvas-sized textures.
    ///
    /// Each texture is a flat low-brightness fill crossed by a random number of gray strokes
    /// whose endpoints lie inside the canvas.
    #[tracing::instrument(skip(settings, rng), fields(pool = settings.pool_size))]
    pub fn generate(
        settings: &TextureSettings,
        canvas: Canvas,
        rng: &mut impl Rng,
    ) -> SignalResult<Self> {
        if settings.pool_size == 0 {
            return Err(SignalError::validation("texture pool_size must be > 0"));
        }
        let (w, h) = canvas.as_u16()?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let rect = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        let mut textures = Vec::with_capacity(settings.pool_size);

        for _ in 0..settings.pool_size {
            ctx.reset();
            let base = rng.gen_range(0..=settings.base_max);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(base, base, base, 255));
            ctx.fill_rect(&rect);

            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(settings.line_width));
            let lines = rng.gen_range(settings.lines_min..=settings.lines_max);
            for _ in 0..lines {
                let mut path = vello_cpu::kurbo::BezPath::new();
                path.move_to(random_point(rng, w, h));
                path.line_to(random_point(rng, w, h));
                let v = rng.gen_range(settings.line_min_brightness..=u8::MAX);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(v, v, v, 255));
                ctx.stroke_path(&path);
            }

            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            textures.push(Texture {
                pixmap: Arc::new(pixmap),
            });
        }

        tracing::debug!(count = textures.len(), width = w, height = h, "texture bank ready");
        Ok(Self { textures })
    }

    /// Bank made of caller-provided textures, in order.
    ///
    /// Sizes are not checked against any canvas; the compositor skips pastes that would not fit.
    pub fn from_textures(textures: Vec<Texture>) -> SignalResult<Self> {
        if textures.is_empty() {
            return Err(SignalError::validation("texture bank must not be empty"));
        }
        Ok(Self { textures })
    }

    /// Number of textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Always `false` for a constructed bank.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture at `i`.
    pub fn get(&self, i: usize) -> Option<&Texture> {
        self.textures.get(i)
    }

    /// Pick one texture uniformly.
    pub fn choose(&self, rng: &mut impl Rng) -> &Texture {
        &self.textures[rng.gen_range(0..self.textures.len())]
    }

    /// Textures in order.
    pub fn iter(&self) -> impl Iterator<Item = &Texture> {
        self.textures.iter()
    }
}

fn random_point(rng: &mut impl Rng, w: u16, h: u16) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(
        f64::from(rng.gen_range(0..w)),
        f64::from(rng.gen_range(0..h)),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/texture.rs"]
mod tests;
