mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::models::*;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by the task and subject stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("task {id} was changed by another writer (expected version {expected})")]
    Conflict { id: TaskId, expected: i64 },
}

/// Durable storage for tasks and subject scores.
///
/// A single SQLite connection behind a mutex; every public method takes the
/// lock once, so each operation is atomic with respect to the others.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::debug!("Opened database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        schema::run_migrations(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Task store
    // ============================================================

    /// All tasks in storage order (ascending id).
    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, category, title, deadline, description, is_completed, version
             FROM tasks ORDER BY id",
        )?;

        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.lock();
        Ok(select_task(&conn, id)?)
    }

    pub fn insert_task(&self, input: NewTask) -> StoreResult<Task> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO tasks (category, title, deadline, description, is_completed, version)
             VALUES (?, ?, ?, ?, 0, 0)",
            (
                input.category.map(|c| c.as_str()),
                &input.title,
                &input.deadline,
                &input.description,
            ),
        )?;
        let id = conn.last_insert_rowid();

        Ok(Task {
            id,
            category: input.category,
            title: input.title,
            deadline: input.deadline,
            description: input.description,
            is_completed: false,
            version: 0,
        })
    }

    /// Replaces the text fields and completion flag of an existing task.
    ///
    /// The write only lands if the stored version still equals
    /// `task.version`; the returned row carries the bumped version. The
    /// category column is never rewritten.
    pub fn update_task(&self, task: &Task) -> StoreResult<Task> {
        let conn = self.lock();
        let rows = conn.execute(
            "UPDATE tasks
             SET title = ?, deadline = ?, description = ?, is_completed = ?, version = version + 1
             WHERE id = ? AND version = ?",
            (
                &task.title,
                &task.deadline,
                &task.description,
                task.is_completed,
                task.id,
                task.version,
            ),
        )?;

        if rows == 0 {
            return Err(match select_task(&conn, task.id)? {
                Some(_) => StoreError::Conflict {
                    id: task.id,
                    expected: task.version,
                },
                None => StoreError::NotFound {
                    entity: "task",
                    id: task.id,
                },
            });
        }

        select_task(&conn, task.id)?.ok_or(StoreError::NotFound {
            entity: "task",
            id: task.id,
        })
    }

    /// Removes a task. Returns `false` when no such task existed.
    pub fn delete_task(&self, id: TaskId) -> StoreResult<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Subject store
    // ============================================================

    pub fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, subject, score FROM subjects ORDER BY id")?;

        let subjects = stmt
            .query_map([], |row| {
                Ok(Subject {
                    id: row.get(0)?,
                    subject: row.get(1)?,
                    score: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(subjects)
    }

    pub fn insert_subject(&self, input: NewSubject) -> StoreResult<Subject> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO subjects (subject, score) VALUES (?, ?)",
            (&input.subject, input.score),
        )?;

        Ok(Subject {
            id: conn.last_insert_rowid(),
            subject: input.subject,
            score: input.score,
        })
    }

    /// Removes a subject. Returns `false` when no such subject existed.
    pub fn delete_subject(&self, id: SubjectId) -> StoreResult<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM subjects WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `<data dir>/study-manager.db` for the current platform.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "study-manager")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("study-manager.db"))
}

fn select_task(conn: &Connection, id: TaskId) -> rusqlite::Result<Option<Task>> {
    conn.query_row(
        "SELECT id, category, title, deadline, description, is_completed, version
         FROM tasks WHERE id = ?",
        [id],
        task_from_row,
    )
    .optional()
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        category: row
            .get::<_, Option<String>>(1)?
            .as_deref()
            .and_then(Category::from_str),
        title: row.get(2)?,
        deadline: row.get(3)?,
        description: row.get(4)?,
        is_completed: row.get(5)?,
        version: row.get(6)?,
    })
}
