use serde::{Deserialize, Serialize};

/// A study tip from the remote advisory endpoint.
///
/// Wire shape (one element of the `suggestions` array):
///
/// ```json
/// { "title": "Pomodoro", "description": "Work in 25 minute blocks." }
/// ```
///
/// Fields are taken as delivered; a missing field decodes as empty text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Top-level body served at `data.json`:
/// `{ "suggestions": [ { "title": ..., "description": ... }, ... ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionFeed {
    pub suggestions: Vec<Suggestion>,
}
