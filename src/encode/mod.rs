//! Frame persistence and final muxing.

pub(crate) mod mux;
pub(crate) mod png_seq;
pub(crate) mod sink;

pub use mux::{FfmpegMuxer, MuxOutput, MuxRequest, Muxer, output_file_name, planned_duration_secs};
pub use png_seq::{FRAME_PATTERN, PngSequenceSink, frame_file_name};
pub use sink::{FrameSink, InMemorySink, SinkConfig};
