use crate::process::CommandError;
use crate::session::stage::Stage;

/// Convenience result type used across the crate.
pub type SignalResult<T> = Result<T, SignalError>;

/// Top-level error taxonomy.
///
/// Unavailable network data is not represented here: fetches resolve to
/// [`FetchOutcome::Unavailable`](crate::FetchOutcome) and fall back locally.
#[derive(thiserror::Error, Debug)]
pub enum SignalError {
    /// Invalid configuration or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rasterization or encoding failure inside this process.
    #[error("render error: {0}")]
    Render(String),

    /// Scratch storage could not be created, written, or removed.
    #[error("resource error: {0}")]
    Resource(String),

    /// An external command (speech, noise, mix, mux) failed.
    #[error(transparent)]
    ExternalProcess(#[from] CommandError),

    /// A pipeline stage failed; carries the stage that was running.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        /// Stage that was active when the failure happened.
        stage: Stage,
        /// Underlying failure.
        #[source]
        source: Box<SignalError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SignalError {
    /// Build a [`SignalError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SignalError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SignalError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Wrap `self` with the stage that was running.
    ///
    /// Already-staged errors keep their original stage.
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage reported by this error, if it was raised inside the pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The failed external command, if any (looks through stage wrappers).
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            Self::ExternalProcess(e) => Some(e),
            Self::Stage { source, .. } => source.command_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
