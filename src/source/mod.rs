//! Network-backed inputs: the keyword list and the encyclopedia summary.
//!
//! Both are fail-open. A failed or timed-out request becomes [`FetchOutcome::Unavailable`] and
//! callers fall back to builtin data; nothing here aborts a run.

mod fetch;
mod lexicon;
mod summary;

pub use fetch::{FetchOutcome, HttpFetcher, HttpText};
pub use lexicon::{
    FALLBACK_KEYWORDS, HttpLexicon, LexiconProvider, OfflineLexicon, keyword_candidates,
    select_keyword,
};
pub use summary::{HttpSummary, OfflineSummary, SummaryProvider};
