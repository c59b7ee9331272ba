use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom as _;

use crate::config::NetworkSettings;
use crate::source::fetch::{FetchOutcome, HttpFetcher};

/// Keywords used when no word list can be fetched.
pub const FALLBACK_KEYWORDS: &[&str] = &["entity", "signal", "void", "collapse"];

/// Supplies candidate keywords.
pub trait LexiconProvider: Send + Sync {
    /// Fetch an ordered candidate list.
    fn fetch_words(&self) -> FetchOutcome<Vec<String>>;
}

/// Word list served as plain text, one word per line.
#[derive(Clone, Debug)]
pub struct HttpLexicon {
    fetcher: HttpFetcher,
    url: String,
    timeout: Duration,
    limit: usize,
}

impl HttpLexicon {
    /// Lexicon backed by `settings.word_list_url`.
    pub fn new(fetcher: HttpFetcher, settings: &NetworkSettings) -> Self {
        Self {
            fetcher,
            url: settings.word_list_url.clone(),
            timeout: Duration::from_secs(settings.lexicon_timeout_secs),
            limit: settings.word_limit,
        }
    }
}

impl LexiconProvider for HttpLexicon {
    fn fetch_words(&self) -> FetchOutcome<Vec<String>> {
        let limit = self.limit;
        self.fetcher
            .get_text(&self.url, self.timeout)
            .and_then(|resp| {
                if !(200..300).contains(&resp.status) {
                    return FetchOutcome::Unavailable(format!(
                        "word list returned HTTP {}",
                        resp.status
                    ));
                }
                parse_word_list(&resp.body, limit)
            })
    }
}

/// Lexicon that never touches the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineLexicon;

impl LexiconProvider for OfflineLexicon {
    fn fetch_words(&self) -> FetchOutcome<Vec<String>> {
        FetchOutcome::Unavailable("network disabled".to_string())
    }
}

pub(crate) fn parse_word_list(body: &str, limit: usize) -> FetchOutcome<Vec<String>> {
    let words: Vec<String> = body
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        return FetchOutcome::Unavailable("word list is empty".to_string());
    }
    FetchOutcome::Success(words)
}

/// Candidate keywords from `provider`, or [`FALLBACK_KEYWORDS`] when it is unavailable.
pub fn keyword_candidates(provider: &dyn LexiconProvider) -> Vec<String> {
    match provider.fetch_words() {
        FetchOutcome::Success(words) => {
            tracing::debug!(count = words.len(), "fetched word list");
            words
        }
        FetchOutcome::Unavailable(reason) => {
            tracing::warn!(%reason, "word list unavailable, using builtin keywords");
            FALLBACK_KEYWORDS.iter().map(|w| w.to_string()).collect()
        }
    }
}

/// Pick one keyword uniformly. An empty candidate list picks from the fallback table.
pub fn select_keyword(candidates: &[String], rng: &mut impl Rng) -> String {
    match candidates.choose(rng) {
        Some(w) => w.clone(),
        None => FALLBACK_KEYWORDS
            .choose(rng)
            .map(|w| w.to_string())
            .unwrap_or_else(|| "signal".to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/lexicon.rs"]
mod tests;
