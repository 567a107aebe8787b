use serde::{Deserialize, Serialize};

use crate::validate::{check_content, check_priority, ValidationError};

pub const DEFAULT_PRIORITY: i64 = 1;
pub const DEFAULT_CATEGORY: &str = "general";

/// The persisted task row. `id` and `created_at_unix` are assigned at
/// creation and never change afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub content: String,
    pub priority: i64,
    pub category: String,
    pub is_done: bool,
    pub created_at_unix: i64,
}

/// Create request: the caller-supplied fields only. Id, completion flag,
/// and timestamp are engine-assigned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskDraft {
    pub content: String,
    pub priority: i64,
    pub category: String,
}

impl TaskDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            priority: DEFAULT_PRIORITY,
            category: DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_content(&self.content)?;
        check_priority(self.priority)?;
        Ok(())
    }
}

/// Update request. `None` means "leave the stored value alone"; `Some`
/// means the caller explicitly set the field. An all-`None` patch is a
/// valid no-op at the repository level.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub content: Option<String>,
    pub priority: Option<i64>,
    pub category: Option<String>,
    pub is_done: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.is_done.is_none()
    }

    /// Re-check every field the patch touches. Untouched fields were
    /// validated when they were written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(content) = &self.content {
            check_content(content)?;
        }
        if let Some(priority) = self.priority {
            check_priority(priority)?;
        }
        Ok(())
    }

    /// Merge the set fields into `task`. Identity and creation time are
    /// not reachable through a patch.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(content) = &self.content {
            task.content = content.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(is_done) = self.is_done {
            task.is_done = is_done;
        }
    }
}
