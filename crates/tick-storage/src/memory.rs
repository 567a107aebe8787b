use std::collections::BTreeMap;
use std::sync::Mutex;

use tick_core::{Task, TaskDraft, TaskPatch};

use crate::traits::TaskStore;

/// In-memory store for tests. Not durable, but id assignment and merge
/// semantics match the sqlite backend.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<i64, Task>,
    // Monotonic; deleting a row never frees its id for reuse.
    next_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryStore {
    fn insert_task(&self, draft: &TaskDraft, created_at_unix: i64) -> anyhow::Result<Task> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let task = Task {
            id: inner.next_id,
            content: draft.content.clone(),
            priority: draft.priority,
            category: draft.category.clone(),
            is_done: false,
            created_at_unix,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    fn get_task(&self, id: i64) -> anyhow::Result<Option<Task>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tasks.get(&id).cloned())
    }

    fn list_tasks(&self, is_done: Option<bool>) -> anyhow::Result<Vec<Task>> {
        let inner = self.inner.lock().unwrap();
        // BTreeMap iterates in key order, which is insertion order here.
        Ok(inner
            .tasks
            .values()
            .filter(|t| is_done.map_or(true, |d| t.is_done == d))
            .cloned()
            .collect())
    }

    fn apply_patch(&self, id: i64, patch: &TaskPatch) -> anyhow::Result<Option<Task>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(task) = inner.tasks.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(task);
        Ok(Some(task.clone()))
    }

    fn delete_task(&self, id: i64) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.tasks.remove(&id).is_some())
    }
}
