//! Sephiroth synthesizes short procedural "analog horror" videos.
//!
//! A run picks a keyword, builds a corpus of on-screen lines around it, pre-renders a pool of
//! line textures, then composites and corrupts every frame before muxing the frame sequence with
//! a synthesized speech and noise bed:
//!
//! - Resolve a [`RunConfig`] from a [`QualityProfile`] and optional JSON overlay
//! - Build a [`Pipeline`] (swap collaborators for tests or offline use)
//! - [`Pipeline::run`] to produce an artifact, or [`Pipeline::preview_frame`] for a single frame
#![forbid(unsafe_code)]

mod foundation;

pub mod audio;
pub mod config;
pub mod corpus;
pub mod encode;
pub mod process;
pub mod render;
pub mod session;
pub mod source;

pub use crate::foundation::core::{Affine, Canvas, FrameIndex, FrameRange, Point, Rect, Rgba8};
pub use crate::foundation::error::{SignalError, SignalResult};
pub use crate::foundation::math::frame_rng;

pub use crate::audio::{AudioSynthesizer, AudioTrack, CommandAudioSynth};
pub use crate::config::{QualityProfile, RunConfig};
pub use crate::corpus::Corpus;
pub use crate::encode::{FrameSink, InMemorySink, Muxer, PngSequenceSink, SinkConfig};
pub use crate::process::{CommandError, CommandRunner, SystemRunner};
pub use crate::render::{FontFace, Frame, FrameCompositor, TextureBank};
pub use crate::session::{Pipeline, RunContext, RunOptions, RunReport, Stage};
pub use crate::source::FetchOutcome;
