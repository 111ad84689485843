//! Remote study advice.
//!
//! The advisory endpoint serves a static JSON document (contract A):
//!
//! ```text
//! GET <base_url>data.json
//! { "suggestions": [ { "title": string, "description": string }, ... ] }
//! ```
//!
//! Nothing fetched here is persisted; the coordinator keeps the last good
//! list in memory.

mod client;

pub use client::{AdvisoryClient, FetchError, ADVICE_PATH, DEFAULT_BASE_URL};

use async_trait::async_trait;

use crate::models::Suggestion;

/// Source of study suggestions.
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Suggestion>, FetchError>;
}

#[async_trait]
impl AdvisorySource for AdvisoryClient {
    async fn fetch(&self) -> Result<Vec<Suggestion>, FetchError> {
        self.fetch_suggestions().await
    }
}
