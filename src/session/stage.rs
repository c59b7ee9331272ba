use std::fmt;

/// Linear pipeline state machine.
///
/// `Idle -> KeywordSelected -> CorpusBuilt -> TextureBankBuilt -> FramesGenerating ->
/// FramesComplete -> AudioReady -> Muxed -> ScratchCleaned -> Done`, with `Failed` reachable from
/// any stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Stage {
    Idle,
    KeywordSelected,
    CorpusBuilt,
    TextureBankBuilt,
    FramesGenerating,
    FramesComplete,
    AudioReady,
    Muxed,
    ScratchCleaned,
    Done,
    Failed,
}

impl Stage {
    /// Successor in the happy path. `Done` and `Failed` are terminal.
    pub fn next(self) -> Option<Stage> {
        use Stage::*;
        match self {
            Idle => Some(KeywordSelected),
            KeywordSelected => Some(CorpusBuilt),
            CorpusBuilt => Some(TextureBankBuilt),
            TextureBankBuilt => Some(FramesGenerating),
            FramesGenerating => Some(FramesComplete),
            FramesComplete => Some(AudioReady),
            AudioReady => Some(Muxed),
            Muxed => Some(ScratchCleaned),
            ScratchCleaned => Some(Done),
            Done | Failed => None,
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition_to(self, to: Stage) -> bool {
        match to {
            Stage::Failed => !matches!(self, Stage::Done | Stage::Failed),
            _ => self.next() == Some(to),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::KeywordSelected => "selecting keyword",
            Stage::CorpusBuilt => "building corpus",
            Stage::TextureBankBuilt => "building texture bank",
            Stage::FramesGenerating => "generating frames",
            Stage::FramesComplete => "finishing frames",
            Stage::AudioReady => "synthesizing audio",
            Stage::Muxed => "muxing",
            Stage::ScratchCleaned => "cleaning scratch",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Tracks the current stage and rejects out-of-order transitions.
#[derive(Debug)]
pub struct StageTracker {
    current: Stage,
    history: Vec<Stage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            current: Stage::Idle,
            history: vec![Stage::Idle],
        }
    }
}

impl StageTracker {
    /// Current stage.
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Every stage visited, in order, starting with `Idle`.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Stage being worked on: `FramesGenerating` while frames render, otherwise the successor of
    /// the last completed stage.
    pub fn pending(&self) -> Stage {
        match self.current {
            Stage::FramesGenerating => Stage::FramesGenerating,
            s => s.next().unwrap_or(s),
        }
    }

    /// Move to `to`, logging the transition.
    pub fn advance(&mut self, to: Stage) -> crate::SignalResult<()> {
        if !self.current.can_transition_to(to) {
            return Err(crate::SignalError::validation(format!(
                "illegal pipeline transition {:?} -> {:?}",
                self.current, to
            )));
        }
        tracing::info!(from = ?self.current, to = ?to, "pipeline stage");
        self.current = to;
        self.history.push(to);
        Ok(())
    }

    /// Enter `Failed` from whatever stage is current.
    pub fn fail(&mut self) {
        if self.current.can_transition_to(Stage::Failed) {
            tracing::error!(from = ?self.current, "pipeline failed");
            self.current = Stage::Failed;
            self.history.push(Stage::Failed);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/stage.rs"]
mod tests;
