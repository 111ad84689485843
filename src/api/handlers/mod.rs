use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::coordinator::{AppError, Coordinator};
use crate::db::StoreError;
use crate::models::*;

type AppState = State<Arc<Coordinator>>;
type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Maps coordinator failures to HTTP responses.
///
/// Validation, not-found and conflict messages are returned as-is. Storage
/// and worker failures are logged and replaced by a generic message so
/// database details do not leak to clients.
fn app_error(e: AppError) -> (StatusCode, String) {
    match e {
        AppError::Validation(err) => {
            tracing::warn!("Validation error: {}", err);
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        AppError::Storage(err @ StoreError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        AppError::Storage(err @ StoreError::Conflict { .. }) => {
            tracing::warn!("Write conflict: {}", err);
            (StatusCode::CONFLICT, err.to_string())
        }
        AppError::Network(err) => {
            tracing::error!("Upstream error: {}", err);
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
        other => {
            tracing::error!("Internal error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

fn task_not_found(id: TaskId) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("task {id} not found"))
}

// ============================================================
// Request / Response types
// ============================================================

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskOrder {
    /// Ascending id.
    Storage,
    /// Earliest deadline first, undated last.
    Deadline,
}

/// Query parameters for listing tasks.
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub category: Option<Category>,
    pub sort: Option<TaskOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    /// Quadrant. A legacy `"<label>: "` marker on the title is honoured too.
    pub category: Option<Category>,
    pub title: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub description: String,
}

/// Full replacement of a task's text fields.
///
/// `version` must match the stored row, otherwise the update is rejected
/// with 409.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceTaskInput {
    pub title: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub description: String,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubjectInput {
    pub subject: String,
    pub score: f64,
}

/// A subject with its feedback tier, as shown on the review screen.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectView {
    #[serde(flatten)]
    pub subject: Subject,
    pub tier: ScoreTier,
    pub feedback: &'static str,
}

impl From<Subject> for SubjectView {
    fn from(subject: Subject) -> Self {
        let tier = subject.tier();
        Self {
            subject,
            tier,
            feedback: tier.feedback(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub success: bool,
    pub suggestions: Vec<Suggestion>,
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Tasks
// ============================================================

pub async fn list_tasks(
    State(app): AppState,
    Query(query): Query<ListTasksQuery>,
) -> Json<Vec<Task>> {
    let snapshot = app.tasks();
    let by_deadline = query.sort == Some(TaskOrder::Deadline);

    let tasks = match (query.category, by_deadline) {
        (Some(category), true) => snapshot.quadrant(category),
        (Some(category), false) => snapshot.in_category(category),
        (None, true) => snapshot.by_deadline(),
        (None, false) => snapshot.all().to_vec(),
    };

    Json(tasks)
}

pub async fn get_task(State(app): AppState, Path(id): Path<TaskId>) -> ApiResult<Json<Task>> {
    app.task(id).map(Json).ok_or_else(|| task_not_found(id))
}

pub async fn create_task(
    State(app): AppState,
    Json(input): Json<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let created = match input.category {
        Some(category) => {
            app.add_task_in(category, &input.title, &input.deadline, &input.description)
                .await
        }
        None => {
            app.add_task(&input.title, &input.deadline, &input.description)
                .await
        }
    };

    created
        .map(|task| (StatusCode::CREATED, Json(task)))
        .map_err(app_error)
}

pub async fn replace_task(
    State(app): AppState,
    Path(id): Path<TaskId>,
    Json(input): Json<ReplaceTaskInput>,
) -> ApiResult<Json<Task>> {
    let current = app.task(id).ok_or_else(|| task_not_found(id))?;
    let next = Task {
        title: input.title,
        deadline: input.deadline,
        description: input.description,
        version: input.version,
        ..current
    };

    app.replace_task(&next).await.map(Json).map_err(app_error)
}

pub async fn toggle_task(State(app): AppState, Path(id): Path<TaskId>) -> ApiResult<Json<Task>> {
    let current = app.task(id).ok_or_else(|| task_not_found(id))?;
    app.toggle_task(&current).await.map(Json).map_err(app_error)
}

/// Deleting a task that does not exist is a no-op.
pub async fn delete_task(State(app): AppState, Path(id): Path<TaskId>) -> ApiResult<StatusCode> {
    if let Some(task) = app.task(id) {
        app.delete_task(&task).await.map_err(app_error)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Subjects
// ============================================================

pub async fn list_subjects(State(app): AppState) -> Json<Vec<SubjectView>> {
    Json(app.subjects().into_iter().map(SubjectView::from).collect())
}

pub async fn create_subject(
    State(app): AppState,
    Json(input): Json<CreateSubjectInput>,
) -> ApiResult<(StatusCode, Json<SubjectView>)> {
    app.add_subject(&input.subject, input.score)
        .await
        .map(|s| (StatusCode::CREATED, Json(SubjectView::from(s))))
        .map_err(app_error)
}

pub async fn delete_subject(
    State(app): AppState,
    Path(id): Path<SubjectId>,
) -> ApiResult<StatusCode> {
    if let Some(subject) = app.subject(id) {
        app.delete_subject(&subject).await.map_err(app_error)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Advice
// ============================================================

/// Fetches advice once. A failed fetch still answers 200 with
/// `success: false` and whatever list was held before.
pub async fn load_advice(State(app): AppState) -> Json<AdviceResponse> {
    let success = app.load_advisories(|_| {}).await;
    Json(AdviceResponse {
        success,
        suggestions: app.advisories().await,
    })
}
