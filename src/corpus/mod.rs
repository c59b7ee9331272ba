//! Display strings for text overlays.

use rand::Rng;

use crate::source::{FetchOutcome, SummaryProvider};

/// One static warning line. `Keyed` lines embed the keyword verbatim at `{keyword}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningPhrase {
    /// Fixed text.
    Fixed(&'static str),
    /// Template containing `{keyword}`.
    Keyed(&'static str),
}

impl WarningPhrase {
    /// Render this phrase for `keyword`.
    pub fn render(self, keyword: &str) -> String {
        match self {
            WarningPhrase::Fixed(s) => s.to_string(),
            WarningPhrase::Keyed(t) => t.replace("{keyword}", keyword),
        }
    }
}

/// Static warning lines present in every corpus, in display order.
pub const WARNING_PHRASES: &[WarningPhrase] = &[
    WarningPhrase::Fixed("EMERGENCY BROADCAST SYSTEM"),
    WarningPhrase::Fixed("THIS IS NOT A TEST"),
    WarningPhrase::Keyed("ENTITY CLASS: {keyword}"),
    WarningPhrase::Keyed("ENTITY DETECTED: {keyword}"),
    WarningPhrase::Fixed("SIGNAL CONTAMINATION"),
    WarningPhrase::Fixed("DO NOT RESPOND"),
    WarningPhrase::Fixed("OBSERVATION ACTIVE"),
    WarningPhrase::Fixed("THEY CAN SEE YOU"),
];

/// Ordered, non-empty set of display strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corpus {
    lines: Vec<String>,
}

impl Corpus {
    /// Build the corpus for `keyword`.
    ///
    /// A successful summary is placed first; the static warning lines always follow. Never fails.
    pub fn build(keyword: &str, summary: FetchOutcome<String>) -> Self {
        let mut lines = Vec::with_capacity(WARNING_PHRASES.len() + 1);
        match summary {
            FetchOutcome::Success(text) => lines.push(text),
            FetchOutcome::Unavailable(reason) => {
                tracing::warn!(%keyword, %reason, "summary unavailable, using static corpus");
            }
        }
        lines.extend(WARNING_PHRASES.iter().map(|p| p.render(keyword)));
        Self { lines }
    }

    /// Fetch the summary through `provider` and build the corpus.
    pub fn fetch_and_build(keyword: &str, provider: &dyn SummaryProvider) -> Self {
        Self::build(keyword, provider.fetch_summary(keyword))
    }

    /// All lines in display order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines (always at least `WARNING_PHRASES.len()`).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of a uniformly chosen line.
    pub fn choose_index(&self, rng: &mut impl Rng) -> usize {
        rng.gen_range(0..self.lines.len())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/corpus/corpus.rs"]
mod tests;
