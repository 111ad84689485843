//! Domain models for the study manager.
//!
//! # Core Concepts
//!
//! ## Persisted Entities
//!
//! - [`Task`]: A to-do item filed under one Eisenhower [`Category`], with a
//!   completion flag and an optional free-form deadline.
//! - [`Subject`]: A graded subject shown on the review screen, with a
//!   [`ScoreTier`] derived from its score.
//!
//! ## Ephemeral Entities
//!
//! - [`Suggestion`]: A study tip fetched from the remote advisory endpoint.
//!   Held in memory for the current screen visit only.
//!
//! Inputs ([`NewTask`], [`NewSubject`]) are validated on construction, so
//! anything that reaches the database has already passed [`ValidationError`]
//! checks.

mod subject;
mod suggestion;
mod task;

pub use subject::*;
pub use suggestion::*;
pub use task::*;

use thiserror::Error;

/// Input rejected before it reaches a store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("subject name must not be empty")]
    EmptySubject,

    #[error("score is not a number: {0:?}")]
    InvalidScore(String),
}
