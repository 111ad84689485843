use serde::{Deserialize, Serialize};

use super::ValidationError;

pub type SubjectId = i64;

/// A graded subject on the review screen.
///
/// Scores are not range-checked: values above 100 or below 0 are stored as
/// given. The [`ScoreTier`] is informative only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub subject: String,
    pub score: f64,
}

impl Subject {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::for_score(self.score)
    }
}

/// Feedback band for a subject score.
///
/// - `Excellent`: 90 and above
/// - `Good`: 80 up to (not including) 90
/// - `NeedsImprovement`: everything else
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreTier {
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 80.0 {
            Self::Good
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::NeedsImprovement => "needs_improvement",
        }
    }

    /// Advice shown next to the subject.
    pub fn feedback(&self) -> &'static str {
        match self {
            Self::Excellent => {
                "Excellent performance! You've mastered this subject. Keep up the fantastic work!"
            }
            Self::Good => {
                "Good job overall! Your understanding is solid, but consider refining problem solving skills."
            }
            Self::NeedsImprovement => "Needs improvement. Review core concepts and practice more.",
        }
    }
}

/// Input for recording a subject score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubject {
    pub subject: String,
    pub score: f64,
}

impl NewSubject {
    pub fn new(subject: &str, score: f64) -> Result<Self, ValidationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        if !score.is_finite() {
            return Err(ValidationError::InvalidScore(score.to_string()));
        }

        Ok(Self {
            subject: subject.to_string(),
            score,
        })
    }

    /// Builds an input from a free-text score as typed into a form field.
    pub fn parse(subject: &str, score: &str) -> Result<Self, ValidationError> {
        let value = score
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidScore(score.to_string()))?;
        Self::new(subject, value)
    }
}
