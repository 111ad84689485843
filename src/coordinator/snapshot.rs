use std::collections::HashMap;

use crate::models::{sort_by_deadline, Category, Task, TaskId};

/// Read-only view of the task table as of the last re-read.
///
/// Keeps storage order and an id index, so lookups never depend on titles.
#[derive(Debug, Clone, Default)]
pub struct TaskSnapshot {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
}

impl TaskSnapshot {
    pub fn new(tasks: Vec<Task>) -> Self {
        let index = tasks
            .iter()
            .enumerate()
            .map(|(pos, task)| (task.id, pos))
            .collect();
        Self { tasks, index }
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.index.get(&id).map(|&pos| &self.tasks[pos])
    }

    /// Tasks filed under `category`, in storage order.
    pub fn in_category(&self, category: Category) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.category == Some(category))
            .cloned()
            .collect()
    }

    /// All tasks, earliest deadline first; undated tasks last.
    pub fn by_deadline(&self) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        sort_by_deadline(&mut tasks);
        tasks
    }

    /// One quadrant, earliest deadline first.
    pub fn quadrant(&self, category: Category) -> Vec<Task> {
        let mut tasks = self.in_category(category);
        sort_by_deadline(&mut tasks);
        tasks
    }
}
