//! Application state coordinator.
//!
//! Sits between a front end and the stores. Every intent (add, toggle,
//! delete) is written to the database and followed by a full re-read of the
//! affected table; the re-read list is published as the new snapshot. There
//! is no incremental diffing and no caching between calls.
//!
//! Snapshots are published through `tokio::sync::watch`, so screens observe
//! read-only copies and never hold a mutable handle to coordinator state.

mod snapshot;

pub use snapshot::TaskSnapshot;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};

use crate::advisory::{AdvisorySource, FetchError};
use crate::db::{Database, StoreError, StoreResult};
use crate::models::*;

/// Anything a coordinator intent can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Network(#[from] FetchError),

    #[error("background worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub struct Coordinator {
    shared: Arc<Shared>,
    advisor: Arc<dyn AdvisorySource>,
    suggestions: RwLock<Vec<Suggestion>>,
}

/// State a detached write task needs to finish on its own.
struct Shared {
    db: Database,
    tasks: watch::Sender<TaskSnapshot>,
    subjects: watch::Sender<Vec<Subject>>,
    // Held across write + re-read + publish so snapshots go out in order.
    writes: Mutex<()>,
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Tasks,
    Subjects,
}

impl Table {
    fn as_str(self) -> &'static str {
        match self {
            Table::Tasks => "tasks",
            Table::Subjects => "subjects",
        }
    }
}

impl Coordinator {
    /// Creates a coordinator with empty snapshots. Call [`refresh`] to load.
    ///
    /// [`refresh`]: Coordinator::refresh
    pub fn new(db: Database, advisor: Arc<dyn AdvisorySource>) -> Self {
        let (tasks, _) = watch::channel(TaskSnapshot::default());
        let (subjects, _) = watch::channel(Vec::new());
        Self {
            shared: Arc::new(Shared {
                db,
                tasks,
                subjects,
                writes: Mutex::new(()),
            }),
            advisor,
            suggestions: RwLock::new(Vec::new()),
        }
    }

    // ============================================================
    // Snapshots
    // ============================================================

    pub fn tasks(&self) -> TaskSnapshot {
        self.shared.tasks.borrow().clone()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.shared.tasks.borrow().get(id).cloned()
    }

    pub fn subjects(&self) -> Vec<Subject> {
        self.shared.subjects.borrow().clone()
    }

    pub fn subject(&self, id: SubjectId) -> Option<Subject> {
        self.shared
            .subjects
            .borrow()
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<TaskSnapshot> {
        self.shared.tasks.subscribe()
    }

    pub fn subscribe_subjects(&self) -> watch::Receiver<Vec<Subject>> {
        self.shared.subjects.subscribe()
    }

    /// Suggestions from the last successful [`load_advisories`].
    ///
    /// [`load_advisories`]: Coordinator::load_advisories
    pub async fn advisories(&self) -> Vec<Suggestion> {
        self.suggestions.read().await.clone()
    }

    /// Re-reads both stores and publishes fresh snapshots.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let _guard = self.shared.writes.lock().await;
        self.shared.reload(Table::Tasks).await?;
        self.shared.reload(Table::Subjects).await?;
        Ok(())
    }

    // ============================================================
    // Task intents
    // ============================================================

    /// Adds an uncategorised task, unless `title` carries a quadrant marker.
    pub async fn add_task(
        &self,
        title: &str,
        deadline: &str,
        description: &str,
    ) -> Result<Task, AppError> {
        let input = NewTask::new(None, title, deadline, description)?;
        self.insert_task(input).await
    }

    /// Adds a task to one quadrant.
    pub async fn add_task_in(
        &self,
        category: Category,
        title: &str,
        deadline: &str,
        description: &str,
    ) -> Result<Task, AppError> {
        let input = NewTask::new(Some(category), title, deadline, description)?;
        self.insert_task(input).await
    }

    async fn insert_task(&self, input: NewTask) -> Result<Task, AppError> {
        let task = self
            .commit(Table::Tasks, move |db| db.insert_task(input))
            .await?;
        tracing::info!(task_id = task.id, "Added task {:?}", task.title);
        Ok(task)
    }

    /// Flips the completion flag of `task` as last seen by the caller.
    ///
    /// Fails with [`StoreError::Conflict`] if the row changed since that
    /// snapshot; the snapshot is republished either way.
    pub async fn toggle_task(&self, task: &Task) -> Result<Task, AppError> {
        self.write_task(task.toggled()).await
    }

    /// Replaces title, deadline and description. Category and id are kept.
    pub async fn replace_task(&self, task: &Task) -> Result<Task, AppError> {
        if task.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        self.write_task(task.clone()).await
    }

    async fn write_task(&self, next: Task) -> Result<Task, AppError> {
        let task = self
            .commit(Table::Tasks, move |db| db.update_task(&next))
            .await?;
        tracing::debug!(
            task_id = task.id,
            version = task.version,
            completed = task.is_completed,
            "Updated task"
        );
        Ok(task)
    }

    /// Deletes by id. A task that is already gone is not an error.
    pub async fn delete_task(&self, task: &Task) -> Result<bool, AppError> {
        let id = task.id;
        let removed = self
            .commit(Table::Tasks, move |db| db.delete_task(id))
            .await?;
        if removed {
            tracing::info!(task_id = id, "Deleted task");
        }
        Ok(removed)
    }

    // ============================================================
    // Subject intents
    // ============================================================

    pub async fn add_subject(&self, name: &str, score: f64) -> Result<Subject, AppError> {
        let input = NewSubject::new(name, score)?;
        self.insert_subject(input).await
    }

    /// Adds a subject from form text; a non-numeric score is rejected.
    pub async fn add_subject_text(&self, name: &str, score: &str) -> Result<Subject, AppError> {
        let input = NewSubject::parse(name, score)?;
        self.insert_subject(input).await
    }

    async fn insert_subject(&self, input: NewSubject) -> Result<Subject, AppError> {
        let subject = self
            .commit(Table::Subjects, move |db| db.insert_subject(input))
            .await?;
        tracing::info!(subject_id = subject.id, "Added subject {:?}", subject.subject);
        Ok(subject)
    }

    pub async fn delete_subject(&self, subject: &Subject) -> Result<bool, AppError> {
        let id = subject.id;
        self.commit(Table::Subjects, move |db| db.delete_subject(id))
            .await
    }

    // ============================================================
    // Advisories
    // ============================================================

    /// Fetches suggestions once and reports the outcome to `on_result`.
    ///
    /// On failure the previously held list is left untouched.
    pub async fn load_advisories<F>(&self, on_result: F) -> bool
    where
        F: FnOnce(bool) + Send,
    {
        let ok = match self.advisor.fetch().await {
            Ok(suggestions) => {
                tracing::info!("Loaded {} study suggestions", suggestions.len());
                *self.suggestions.write().await = suggestions;
                true
            }
            Err(e) => {
                tracing::error!("Failed to load study suggestions: {}", e);
                false
            }
        };
        on_result(ok);
        ok
    }

    // ============================================================
    // Internals
    // ============================================================

    /// Writes with `op`, then re-reads and republishes `table`.
    ///
    /// The three steps run on their own task under the write lock. Dropping
    /// the caller (a closed screen, a disconnected HTTP client) only drops
    /// the result; the snapshot still catches up with the store.
    async fn commit<T, F>(&self, table: Table, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let _guard = shared.writes.lock().await;
            let written = shared.blocking(op).await;
            let reloaded = shared.reload(table).await;
            settle(table, written, reloaded)
        })
        .await?
    }
}

impl Shared {
    async fn reload(&self, table: Table) -> Result<(), AppError> {
        match table {
            Table::Tasks => {
                let tasks = self.blocking(|db| db.list_tasks()).await?;
                self.tasks.send_replace(TaskSnapshot::new(tasks));
            }
            Table::Subjects => {
                let subjects = self.blocking(|db| db.list_subjects()).await?;
                self.subjects.send_replace(subjects);
            }
        }
        Ok(())
    }

    /// Runs a store call on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        Ok(tokio::task::spawn_blocking(move || op(&db)).await??)
    }
}

/// Picks the error a caller sees after write + re-read.
///
/// A failed write is reported as itself even when the re-read also failed.
fn settle<T>(
    table: Table,
    written: Result<T, AppError>,
    reloaded: Result<(), AppError>,
) -> Result<T, AppError> {
    match (written, reloaded) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => {
            tracing::error!("Change stored but re-reading {} failed: {}", table.as_str(), e);
            Err(e)
        }
        (Err(e), reloaded) => {
            if let Err(reload_err) = reloaded {
                tracing::warn!("Re-reading {} failed: {}", table.as_str(), reload_err);
            }
            Err(e)
        }
    }
}
