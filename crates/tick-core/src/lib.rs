pub mod task;
pub mod validate;

pub use task::*;
pub use validate::*;

/// Unix seconds. Timestamps stay as plain i64 in the core; the CLI
/// formats them for humans.
pub fn now_unix() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let dur = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    dur.as_secs() as i64
}
