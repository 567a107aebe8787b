use tick_core::{Task, TaskDraft, TaskPatch};

/// Raw persistence seam. Implementations own row identity and durability;
/// validation and timestamping happen above this trait in `repo`.
pub trait TaskStore: Send + Sync {
    /// Insert a new row and assign its id. Ids are never reused, even
    /// after deletes.
    fn insert_task(&self, draft: &TaskDraft, created_at_unix: i64) -> anyhow::Result<Task>;

    /// Point lookup. A miss is `None`, not an error.
    fn get_task(&self, id: i64) -> anyhow::Result<Option<Task>>;

    /// All tasks in id order, optionally filtered by completion flag.
    fn list_tasks(&self, is_done: Option<bool>) -> anyhow::Result<Vec<Task>>;

    /// Merge the set fields of `patch` into the stored row and persist the
    /// result in one atomic step. Returns the merged task, or `None` if the
    /// id does not exist.
    fn apply_patch(&self, id: i64, patch: &TaskPatch) -> anyhow::Result<Option<Task>>;

    /// Returns true iff a row existed and was removed.
    fn delete_task(&self, id: i64) -> anyhow::Result<bool>;
}
