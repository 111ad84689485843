//! HTTP client for the advisory endpoint.

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::models::{Suggestion, SuggestionFeed};

/// Default host of the advice document.
pub const DEFAULT_BASE_URL: &str = "https://liyilin66.github.io/assignment/";

/// Path of the advice document relative to the base URL.
pub const ADVICE_PATH: &str = "data.json";

/// Advisory fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status. `message` is the response body, or `"unknown"`.
    #[error("Error: {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Error: unknown (empty response body)")]
    EmptyBody,

    #[error("Malformed advice document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fetches the suggestion list with a single GET.
#[derive(Debug, Clone)]
pub struct AdvisoryClient {
    base_url: String,
    client: Client,
}

impl AdvisoryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Use a preconfigured reqwest client (timeouts, proxies).
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url, client }
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, ADVICE_PATH)
    }

    /// Returns the suggestions exactly as delivered, without per-field checks.
    pub async fn fetch_suggestions(&self) -> Result<Vec<Suggestion>, FetchError> {
        let url = self.url();
        tracing::debug!("Fetching study suggestions from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                "unknown".to_string()
            } else {
                body
            };
            return Err(FetchError::Status { status, message });
        }

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        let feed: SuggestionFeed = serde_json::from_str(&body)?;
        Ok(feed.suggestions)
    }
}
