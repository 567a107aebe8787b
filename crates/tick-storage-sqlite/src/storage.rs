use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use tick_core::{Task, TaskDraft, TaskPatch};
use tick_storage::TaskStore;

/// Environment override for the database location. When set and non-empty
/// its value is used verbatim as the file path.
pub const DB_PATH_ENV: &str = "TICK_DB";

const DEFAULT_DB_PATH: &str = "~/.tick/tasks.db";

/// Resolve the database path from the current environment. Re-reads the
/// environment on every call; nothing caches the result.
pub fn resolve_db_path() -> PathBuf {
    match std::env::var(DB_PATH_ENV) {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(shellexpand::tilde(DEFAULT_DB_PATH).into_owned()),
    }
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path` and apply the
    /// schema. Failure to create the parent directory or open the file is
    /// fatal and propagates to the caller.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db dir {}", parent.display()))?;
        }
        debug!(path = %db_path.display(), "opening task db");
        let conn = Connection::open(db_path)
            .with_context(|| format!("open sqlite db {}", db_path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;
        Ok(store)
    }

    /// Open at the environment-resolved location.
    pub fn open_default() -> Result<Self> {
        Self::open(&resolve_db_path())
    }

    /// Create the tasks table and indexes if absent. Safe to call any
    /// number of times.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let init_sql = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(init_sql).context("apply task schema")?;
        debug!("task schema ready");
        Ok(())
    }

    fn row_to_task(r: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: r.get(0)?,
            content: r.get(1)?,
            priority: r.get(2)?,
            category: r.get(3)?,
            is_done: r.get(4)?,
            created_at_unix: r.get(5)?,
        })
    }
}

const TASK_COLUMNS: &str = "id, content, priority, category, is_done, created_at";

impl TaskStore for SqliteStore {
    fn insert_task(&self, draft: &TaskDraft, created_at_unix: i64) -> Result<Task> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tasks(content, priority, category, is_done, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![draft.content, draft.priority, draft.category, created_at_unix],
        )?;
        Ok(Task {
            id: conn.last_insert_rowid(),
            content: draft.content.clone(),
            priority: draft.priority,
            category: draft.category.clone(),
            is_done: false,
            created_at_unix,
        })
    }

    fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.conn.lock().unwrap();
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id=?1"),
                params![id],
                Self::row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    fn list_tasks(&self, is_done: Option<bool>) -> Result<Vec<Task>> {
        let conn = self.conn.lock().unwrap();
        let mut tasks = vec![];
        match is_done {
            Some(done) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE is_done=?1 ORDER BY id ASC"
                ))?;
                let rows = stmt.query_map(params![done], Self::row_to_task)?;
                for row in rows {
                    tasks.push(row?);
                }
            }
            None => {
                let mut stmt = conn
                    .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"))?;
                let rows = stmt.query_map([], Self::row_to_task)?;
                for row in rows {
                    tasks.push(row?);
                }
            }
        }
        Ok(tasks)
    }

    fn apply_patch(&self, id: i64, patch: &TaskPatch) -> Result<Option<Task>> {
        let conn = self.conn.lock().unwrap();
        // Read-merge-write under one transaction so the refresh the caller
        // sees is exactly what was committed.
        let tx = conn.unchecked_transaction()?;
        let task = tx
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id=?1"),
                params![id],
                Self::row_to_task,
            )
            .optional()?;
        let Some(mut task) = task else {
            return Ok(None);
        };
        patch.apply_to(&mut task);
        tx.execute(
            "UPDATE tasks SET content=?1, priority=?2, category=?3, is_done=?4 WHERE id=?5",
            params![task.content, task.priority, task.category, task.is_done, task.id],
        )?;
        tx.commit()?;
        Ok(Some(task))
    }

    fn delete_task(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM tasks WHERE id=?1", params![id])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("tasks.db")).unwrap();
        (dir, store)
    }

    fn insert(store: &SqliteStore, content: &str) -> Task {
        store.insert_task(&TaskDraft::new(content), 1_700_000_000).unwrap()
    }

    #[test]
    fn open_creates_missing_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("deep").join("nested").join("tasks.db");
        let _ = SqliteStore::open(&db_path).unwrap();
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn schema_init_is_idempotent() {
        let (dir, store) = open_temp();
        store.init_schema().unwrap();
        store.init_schema().unwrap();
        // A second open over the same file re-applies the schema too.
        let _ = SqliteStore::open(&dir.path().join("tasks.db")).unwrap();
    }

    #[test]
    fn insert_get_round_trip() {
        let (_dir, store) = open_temp();
        let draft = TaskDraft::new("Buy milk").with_priority(2).with_category("groceries");
        let created = store.insert_task(&draft, 1_700_000_000).unwrap();
        assert!(created.id > 0);
        assert_eq!(store.get_task(created.id).unwrap(), Some(created));
    }

    #[test]
    fn tasks_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("tasks.db");
        let id = {
            let store = SqliteStore::open(&db_path).unwrap();
            store.insert_task(&TaskDraft::new("durable"), 42).unwrap().id
        };
        let store = SqliteStore::open(&db_path).unwrap();
        let task = store.get_task(id).unwrap().unwrap();
        assert_eq!(task.content, "durable");
        assert_eq!(task.created_at_unix, 42);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let (_dir, store) = open_temp();
        let a = insert(&store, "a");
        assert!(store.delete_task(a.id).unwrap());
        let b = insert(&store, "b");
        assert!(b.id > a.id);
    }

    #[test]
    fn patch_merges_and_persists_only_set_fields() {
        let (_dir, store) = open_temp();
        let task = insert(&store, "A");

        let patch = TaskPatch {
            priority: Some(3),
            is_done: Some(true),
            ..Default::default()
        };
        let merged = store.apply_patch(task.id, &patch).unwrap().unwrap();
        assert_eq!(merged.priority, 3);
        assert!(merged.is_done);
        assert_eq!(merged.content, "A");
        assert_eq!(merged.category, "general");

        // The returned task matches the committed row.
        assert_eq!(store.get_task(task.id).unwrap(), Some(merged));
    }

    #[test]
    fn patch_on_missing_id_is_none() {
        let (_dir, store) = open_temp();
        let patch = TaskPatch {
            content: Some("ghost".to_string()),
            ..Default::default()
        };
        assert_eq!(store.apply_patch(99, &patch).unwrap(), None);
    }

    #[test]
    fn list_filters_by_done_flag() {
        let (_dir, store) = open_temp();
        let a = insert(&store, "a");
        let b = insert(&store, "b");
        let c = insert(&store, "c");
        let done = TaskPatch {
            is_done: Some(true),
            ..Default::default()
        };
        store.apply_patch(b.id, &done).unwrap();

        let all: Vec<i64> = store.list_tasks(None).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(all, vec![a.id, b.id, c.id]);
        let done: Vec<i64> = store.list_tasks(Some(true)).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(done, vec![b.id]);
        let pending: Vec<i64> =
            store.list_tasks(Some(false)).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![a.id, c.id]);
    }

    #[test]
    fn delete_true_then_false() {
        let (_dir, store) = open_temp();
        let task = insert(&store, "bye");
        assert!(store.delete_task(task.id).unwrap());
        assert_eq!(store.get_task(task.id).unwrap(), None);
        assert!(!store.delete_task(task.id).unwrap());
    }

    #[test]
    fn db_path_env_override_is_verbatim() {
        let dir = tempdir().unwrap();
        let override_path = dir.path().join("elsewhere").join("tick.db");

        std::env::set_var(DB_PATH_ENV, &override_path);
        assert_eq!(resolve_db_path(), override_path);

        // Opening at the resolved path creates its parent directory.
        let _ = SqliteStore::open(&resolve_db_path()).unwrap();
        assert!(override_path.parent().unwrap().exists());

        std::env::remove_var(DB_PATH_ENV);
        assert!(resolve_db_path().ends_with(".tick/tasks.db"));
    }
}
