use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Store-assigned task identifier. Never reused after a delete.
pub type TaskId = i64;

/// A to-do item on the Eisenhower matrix.
///
/// Tasks are created with `is_completed = false` and afterwards only change
/// through a completion toggle or a full replacement of their text fields.
/// The `id` and `category` are fixed for the lifetime of the row.
///
/// `version` is bumped by the store on every update. An update carrying a
/// stale version is rejected, so two screens toggling the same task from the
/// same snapshot cannot silently overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub category: Option<Category>,
    pub title: String,
    /// Free-form text, usually an ISO date. Empty means no deadline.
    pub deadline: String,
    pub description: String,
    pub is_completed: bool,
    pub version: i64,
}

impl Task {
    /// The same task with its completion flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            is_completed: !self.is_completed,
            ..self.clone()
        }
    }

    /// Parsed deadline, or `None` when empty or not a calendar date.
    pub fn deadline_date(&self) -> Option<NaiveDate> {
        parse_deadline(&self.deadline)
    }

    /// Sort key that places tasks without a usable deadline last.
    pub fn deadline_key(&self) -> NaiveDate {
        self.deadline_date().unwrap_or(NaiveDate::MAX)
    }
}

/// The four Eisenhower quadrants.
///
/// - `UrgentImportant`: do it now
/// - `UrgentNotImportant`: schedule or hand off
/// - `ImportantNotUrgent`: plan for it
/// - `StudyReview`: study and revision work
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    UrgentImportant,
    UrgentNotImportant,
    ImportantNotUrgent,
    StudyReview,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Self::UrgentImportant,
        Self::UrgentNotImportant,
        Self::ImportantNotUrgent,
        Self::StudyReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrgentImportant => "urgent_important",
            Self::UrgentNotImportant => "urgent_not_important",
            Self::ImportantNotUrgent => "important_not_urgent",
            Self::StudyReview => "study_review",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "urgent_important" => Some(Self::UrgentImportant),
            "urgent_not_important" => Some(Self::UrgentNotImportant),
            "important_not_urgent" => Some(Self::ImportantNotUrgent),
            "study_review" => Some(Self::StudyReview),
            _ => None,
        }
    }

    /// Human-readable quadrant name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UrgentImportant => "Urgent & Important",
            Self::UrgentNotImportant => "Urgent but Not Important",
            Self::ImportantNotUrgent => "Important Not Urgent",
            Self::StudyReview => "Study & Review",
        }
    }

    /// Splits a legacy `"<label>: <title>"` string into its category and the
    /// bare title. Titles without a known marker come back unchanged.
    pub fn split_title(title: &str) -> (Option<Self>, &str) {
        for category in Self::ALL {
            let rest = title
                .strip_prefix(category.label())
                .and_then(|rest| rest.strip_prefix(':'));
            if let Some(rest) = rest {
                return (Some(category), rest.trim_start());
            }
        }
        (None, title)
    }
}

/// Input for creating a task. Construct through [`NewTask::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub category: Option<Category>,
    pub title: String,
    pub deadline: String,
    pub description: String,
}

impl NewTask {
    /// Validates the title and normalizes a legacy category marker.
    ///
    /// An explicit `category` wins over one embedded in the title, but the
    /// marker is stripped either way so it is never stored twice.
    pub fn new(
        category: Option<Category>,
        title: &str,
        deadline: &str,
        description: &str,
    ) -> Result<Self, ValidationError> {
        let (marked, bare) = Category::split_title(title.trim());
        let title = bare.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        Ok(Self {
            category: category.or(marked),
            title: title.to_string(),
            deadline: deadline.trim().to_string(),
            description: description.to_string(),
        })
    }
}

/// Parses a deadline as a calendar date. Failures are swallowed.
pub fn parse_deadline(deadline: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(deadline.trim(), "%Y-%m-%d").ok()
}

/// Stable sort by deadline; empty or unparseable deadlines go last and keep
/// their relative order.
pub fn sort_by_deadline(tasks: &mut [Task]) {
    tasks.sort_by_key(Task::deadline_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, deadline: &str) -> Task {
        Task {
            id,
            category: None,
            title: format!("task {id}"),
            deadline: deadline.to_string(),
            description: String::new(),
            is_completed: false,
            version: 0,
        }
    }

    #[test]
    fn category_round_trips_through_storage_name() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_str()), Some(category));
        }
        assert_eq!(Category::from_str("someday"), None);
    }

    #[test]
    fn split_title_strips_known_marker() {
        assert_eq!(
            Category::split_title("Urgent & Important: Essay"),
            (Some(Category::UrgentImportant), "Essay")
        );
        assert_eq!(
            Category::split_title("Urgent but Not Important: Email"),
            (Some(Category::UrgentNotImportant), "Email")
        );
        assert_eq!(
            Category::split_title("Study & Review:Chapter 3"),
            (Some(Category::StudyReview), "Chapter 3")
        );
    }

    #[test]
    fn split_title_leaves_plain_titles_alone() {
        assert_eq!(Category::split_title("Buy milk"), (None, "Buy milk"));
        // Label without the colon is not a marker.
        assert_eq!(
            Category::split_title("Important Not Urgent things"),
            (None, "Important Not Urgent things")
        );
    }

    #[test]
    fn new_task_rejects_blank_titles() {
        assert_eq!(
            NewTask::new(None, "   ", "", ""),
            Err(ValidationError::EmptyTitle)
        );
        assert_eq!(
            NewTask::new(None, "Urgent & Important: ", "", ""),
            Err(ValidationError::EmptyTitle)
        );
    }

    #[test]
    fn new_task_never_double_prefixes() {
        let input = NewTask::new(
            Some(Category::ImportantNotUrgent),
            "Important Not Urgent: Read paper",
            " 2025-03-01 ",
            "",
        )
        .unwrap();
        assert_eq!(input.category, Some(Category::ImportantNotUrgent));
        assert_eq!(input.title, "Read paper");
        assert_eq!(input.deadline, "2025-03-01");
    }

    #[test]
    fn explicit_category_wins_over_marker() {
        let input =
            NewTask::new(Some(Category::StudyReview), "Urgent & Important: Quiz", "", "").unwrap();
        assert_eq!(input.category, Some(Category::StudyReview));
        assert_eq!(input.title, "Quiz");
    }

    #[test]
    fn deadline_sort_puts_missing_dates_last() {
        let mut tasks = vec![task(1, "2025-01-01"), task(2, ""), task(3, "2024-06-15")];
        sort_by_deadline(&mut tasks);
        let deadlines: Vec<_> = tasks.iter().map(|t| t.deadline.as_str()).collect();
        assert_eq!(deadlines, vec!["2024-06-15", "2025-01-01", ""]);
    }

    #[test]
    fn unparseable_deadlines_sort_with_empty_ones_in_order() {
        let mut tasks = vec![task(1, "next week"), task(2, "2024-01-01"), task(3, "")];
        sort_by_deadline(&mut tasks);
        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn toggled_flips_only_completion() {
        let original = task(7, "2024-01-01");
        let flipped = original.toggled();
        assert!(flipped.is_completed);
        assert_eq!(flipped.id, original.id);
        assert_eq!(flipped.version, original.version);
        assert_eq!(flipped.toggled(), original);
    }
}
