use std::time::Duration;

use crate::foundation::error::{SignalError, SignalResult};

/// Result of a best-effort data fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// Data was retrieved.
    Success(T),
    /// Data could not be retrieved; carries a human-readable reason.
    Unavailable(String),
}

impl<T> FetchOutcome<T> {
    /// Chain a fallible step on the success value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> FetchOutcome<U>) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(v) => f(v),
            FetchOutcome::Unavailable(r) => FetchOutcome::Unavailable(r),
        }
    }

    /// Return `true` for [`FetchOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// Status and body of a completed HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpText {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

/// Blocking HTTP client with per-request deadlines.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build the client.
    pub fn new() -> SignalResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("sephiroth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SignalError::resource(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` within `timeout`. Transport errors and timeouts become `Unavailable`; any HTTP
    /// status is a `Success` so callers can apply their own status policy.
    pub fn get_text(&self, url: &str, timeout: Duration) -> FetchOutcome<HttpText> {
        let resp = match self.client.get(url).timeout(timeout).send() {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return FetchOutcome::Unavailable(format!("request to {url} timed out"));
            }
            Err(e) => return FetchOutcome::Unavailable(format!("request to {url} failed: {e}")),
        };
        let status = resp.status().as_u16();
        match resp.text() {
            Ok(body) => FetchOutcome::Success(HttpText { status, body }),
            Err(e) => FetchOutcome::Unavailable(format!("reading body of {url} failed: {e}")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/fetch.rs"]
mod tests;
