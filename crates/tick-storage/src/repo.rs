use tick_core::{now_unix, Task, TaskDraft, TaskPatch};

use crate::traits::TaskStore;

/// Validate the draft, stamp the creation time, and write one row.
/// A `ValidationError` here means nothing reached the store.
pub fn create_task(store: &dyn TaskStore, draft: &TaskDraft) -> anyhow::Result<Task> {
    draft.validate()?;
    store.insert_task(draft, now_unix())
}

pub fn get_task(store: &dyn TaskStore, id: i64) -> anyhow::Result<Option<Task>> {
    store.get_task(id)
}

pub fn list_tasks(store: &dyn TaskStore, is_done: Option<bool>) -> anyhow::Result<Vec<Task>> {
    store.list_tasks(is_done)
}

/// Apply only the fields the patch explicitly sets. An empty patch is a
/// no-op that returns the task as stored; whether "nothing to update" is a
/// user error is the presentation layer's call, not ours.
pub fn update_task(
    store: &dyn TaskStore,
    id: i64,
    patch: &TaskPatch,
) -> anyhow::Result<Option<Task>> {
    patch.validate()?;
    if patch.is_empty() {
        return store.get_task(id);
    }
    store.apply_patch(id, patch)
}

/// True on the first delete of an existing id, false ever after.
pub fn delete_task(store: &dyn TaskStore, id: i64) -> anyhow::Result<bool> {
    store.delete_task(id)
}
