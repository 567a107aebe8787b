use thiserror::Error;

pub const CONTENT_MAX_CHARS: usize = 255;
pub const PRIORITY_MIN: i64 = 1;
pub const PRIORITY_MAX: i64 = 3;

/// Field-level rejection, raised before anything touches storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task content cannot be empty")]
    EmptyContent,
    #[error("task content is {0} characters, max is {CONTENT_MAX_CHARS}")]
    ContentTooLong(usize),
    #[error("priority must be between {PRIORITY_MIN} and {PRIORITY_MAX} (got {0})")]
    PriorityOutOfRange(i64),
}

/// Length is counted in characters, not bytes, so multi-byte content is
/// limited the same way regardless of encoding.
pub fn check_content(content: &str) -> Result<(), ValidationError> {
    let len = content.chars().count();
    if len == 0 {
        return Err(ValidationError::EmptyContent);
    }
    if len > CONTENT_MAX_CHARS {
        return Err(ValidationError::ContentTooLong(len));
    }
    Ok(())
}

pub fn check_priority(priority: i64) -> Result<(), ValidationError> {
    if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&priority) {
        return Err(ValidationError::PriorityOutOfRange(priority));
    }
    Ok(())
}
