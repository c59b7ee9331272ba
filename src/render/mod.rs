//! Texture generation, frame compositing, text, and corruption.

pub(crate) mod compositor;
pub(crate) mod corruption;
pub(crate) mod frame;
pub(crate) mod text;
pub(crate) mod texture;

pub use compositor::{
    ComposedFrame, CompositorWorker, FrameCompositor, RenderedFrame, jumpscare_text_origin,
    jumpscare_text_region, paste_offset,
};
pub use corruption::{CorruptionReport, apply_noise, corrupt, shift_rows};
pub use frame::Frame;
pub use text::{FontFace, TextLayout, TextLayoutEngine};
pub use texture::{Texture, TextureBank};
