use std::time::Duration;

use crate::config::NetworkSettings;
use crate::source::fetch::{FetchOutcome, HttpFetcher};

/// Supplies a short reference text for a keyword.
pub trait SummaryProvider: Send + Sync {
    /// Fetch the summary for `keyword`.
    fn fetch_summary(&self, keyword: &str) -> FetchOutcome<String>;
}

/// REST summary endpoint returning `{ "extract": "..." }`.
#[derive(Clone, Debug)]
pub struct HttpSummary {
    fetcher: HttpFetcher,
    url_base: String,
    timeout: Duration,
}

impl HttpSummary {
    /// Summary source backed by `settings.summary_url_base`.
    pub fn new(fetcher: HttpFetcher, settings: &NetworkSettings) -> Self {
        Self {
            fetcher,
            url_base: settings.summary_url_base.clone(),
            timeout: Duration::from_secs(settings.summary_timeout_secs),
        }
    }
}

#[derive(serde::Deserialize)]
struct SummaryBody {
    #[serde(default)]
    extract: String,
}

impl SummaryProvider for HttpSummary {
    fn fetch_summary(&self, keyword: &str) -> FetchOutcome<String> {
        let url = match summary_url(&self.url_base, keyword) {
            Ok(url) => url,
            Err(reason) => return FetchOutcome::Unavailable(reason),
        };
        self.fetcher.get_text(url.as_str(), self.timeout).and_then(|resp| {
            if resp.status != 200 {
                return FetchOutcome::Unavailable(format!("summary returned HTTP {}", resp.status));
            }
            parse_summary(&resp.body)
        })
    }
}

/// Summary source that never touches the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineSummary;

impl SummaryProvider for OfflineSummary {
    fn fetch_summary(&self, _keyword: &str) -> FetchOutcome<String> {
        FetchOutcome::Unavailable("network disabled".to_string())
    }
}

/// Append `keyword` to `base` as one percent-encoded path segment.
pub(crate) fn summary_url(base: &str, keyword: &str) -> Result<reqwest::Url, String> {
    let mut url =
        reqwest::Url::parse(base).map_err(|e| format!("invalid summary url '{base}': {e}"))?;
    url.path_segments_mut()
        .map_err(|()| format!("summary url '{base}' cannot take a path"))?
        .pop_if_empty()
        .push(keyword);
    Ok(url)
}

pub(crate) fn parse_summary(body: &str) -> FetchOutcome<String> {
    let parsed: SummaryBody = match serde_json::from_str(body) {
        Ok(b) => b,
        Err(e) => return FetchOutcome::Unavailable(format!("summary is not valid json: {e}")),
    };
    // Overlays are single lines.
    let text = parsed.extract.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return FetchOutcome::Unavailable("summary has no extract".to_string());
    }
    FetchOutcome::Success(text)
}

#[cfg(test)]
#[path = "../../tests/unit/source/summary.rs"]
mod tests;
