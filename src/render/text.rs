use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Affine, Rgba8, affine_to_cpu};
use crate::foundation::error::{SignalError, SignalResult};

/// Shaped single-line text ready for rasterization.
pub type TextLayout = parley::Layout<()>;

/// Raw font file used for every overlay in a run.
///
/// The bytes live in one shared blob; clones and per-worker font handles reuse it.
#[derive(Clone)]
pub struct FontFace {
    blob: vello_cpu::peniko::Blob<u8>,
    index: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes_len", &self.blob.data().len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontFace {
    /// Wrap font bytes (TTF, OTF, or a face of a TTC).
    pub fn from_bytes(bytes: Vec<u8>, index: u32) -> Self {
        Self {
            blob: vello_cpu::peniko::Blob::from(bytes),
            index,
        }
    }

    /// Read a font file.
    pub fn from_file(path: &Path) -> SignalResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font '{}'", path.display()))?;
        Ok(Self::from_bytes(bytes, 0))
    }

    /// First monospace face in the system font database, else the first sans-serif face, else
    /// any face at all.
    pub fn from_system() -> Option<Self> {
        use usvg::fontdb::{Family, Query};

        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let generic = [Family::Monospace, Family::SansSerif]
            .into_iter()
            .find_map(|family| {
                db.query(&Query {
                    families: &[family],
                    ..Default::default()
                })
            });
        let id = generic
            .or_else(|| db.faces().find(|f| f.monospaced).map(|f| f.id))
            .or_else(|| db.faces().next().map(|f| f.id))?;

        db.with_face_data(id, |data, index| Self::from_bytes(data.to_vec(), index))
    }

    /// Resolve the overlay font: an explicit path must load; otherwise system fonts are searched
    /// and `None` means text is skipped.
    pub fn resolve(path: Option<&Path>) -> SignalResult<Option<Self>> {
        match path {
            Some(p) => Self::from_file(p).map(Some),
            None => {
                let face = Self::from_system();
                if face.is_none() {
                    tracing::warn!("no system font found, text overlays are disabled");
                }
                Ok(face)
            }
        }
    }

    pub(crate) fn font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(self.blob.clone(), self.index)
    }
}

/// Stateful helper for shaping text with one registered font.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `face` with a fresh Parley context.
    pub fn new(face: &FontFace) -> SignalResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(face.blob.clone(), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| SignalError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SignalError::render("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Family name of the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` on one unbroken line.
    pub fn layout_line(&mut self, text: &str, size_px: f32) -> SignalResult<TextLayout> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SignalError::validation("text size_px must be finite and > 0"));
        }
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: TextLayout = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Fill the glyphs of `layout` with its top-left corner at `(x, y)`.
///
/// Glyphs are placed at their line baseline, so ink starts below `y`, never above it.
pub(crate) fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &TextLayout,
    x: f64,
    y: f64,
    color: Rgba8,
) {
    ctx.set_transform(affine_to_cpu(Affine::translate((x, y))));
    ctx.set_paint(color.to_peniko());
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
