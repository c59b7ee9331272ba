//! Run configuration, resolved once at run start and immutable afterwards.
//!
//! Resolution order: [`QualityProfile`] defaults, then an optional JSON file merged on top, then
//! caller overrides (the CLI), then [`RunConfig::validate`].

mod profile;
mod run;

pub use profile::QualityProfile;
pub use run::{
    AudioSettings, CommandSettings, CorruptionParams, DurationRange, EncodeSettings,
    JumpscareSettings, LayerSettings, NetworkSettings, RenderThreading, RunConfig,
    TextureSettings,
};
