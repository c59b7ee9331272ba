//! Run lifecycle: scratch storage, stage machine, and the pipeline driver.

pub(crate) mod context;
pub(crate) mod pipeline;
pub(crate) mod stage;

pub use context::{RunContext, SCRATCH_PREFIX};
pub use pipeline::{FrameStats, Pipeline, RunOptions, RunReport, render_frames};
pub use stage::{Stage, StageTracker};
