use std::path::{Path, PathBuf};

use crate::foundation::error::{SignalError, SignalResult};

/// Prefix of every scratch directory.
pub const SCRATCH_PREFIX: &str = "SEPHIROTH_LOFI_";

/// Run-exclusive scratch directory with `frames/` and `audio/` sub-directories.
///
/// The directory is removed when the context is dropped, on every exit path. [`RunContext::close`]
/// removes it explicitly and reports deletion errors.
#[derive(Debug)]
pub struct RunContext {
    dir: tempfile::TempDir,
    frames: PathBuf,
    audio: PathBuf,
}

impl RunContext {
    /// Create a scratch directory under the system temp directory.
    pub fn create() -> SignalResult<Self> {
        Self::from_builder(tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir())
    }

    /// Create a scratch directory under `parent`.
    pub fn create_in(parent: &Path) -> SignalResult<Self> {
        Self::from_builder(
            tempfile::Builder::new()
                .prefix(SCRATCH_PREFIX)
                .tempdir_in(parent),
        )
    }

    fn from_builder(dir: std::io::Result<tempfile::TempDir>) -> SignalResult<Self> {
        let dir = dir.map_err(|e| {
            SignalError::resource(format!("failed to create scratch directory: {e}"))
        })?;
        let frames = dir.path().join("frames");
        let audio = dir.path().join("audio");
        for sub in [&frames, &audio] {
            std::fs::create_dir(sub).map_err(|e| {
                SignalError::resource(format!("failed to create '{}': {e}", sub.display()))
            })?;
        }
        tracing::debug!(dir = %dir.path().display(), "scratch directory created");
        Ok(Self { dir, frames, audio })
    }

    /// Scratch root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Frame sequence directory.
    pub fn frames_dir(&self) -> &Path {
        &self.frames
    }

    /// Audio work directory.
    pub fn audio_dir(&self) -> &Path {
        &self.audio
    }

    /// Remove the scratch directory now.
    pub fn close(self) -> SignalResult<()> {
        let root = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| {
            SignalError::resource(format!(
                "failed to remove scratch directory '{}': {e}",
                root.display()
            ))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/context.rs"]
mod tests;
