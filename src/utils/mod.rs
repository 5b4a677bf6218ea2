// ABOUTME: Small shared helpers: retries, debouncing, file system and locking.
// ABOUTME: None of these know about states or the controller.

pub mod debounce;
pub mod fs;
pub mod lock;
pub mod retry;

pub use debounce::Debounce;
pub use lock::{LockError, LockInfo, WorkDirLock};
pub use retry::{RetryOptions, retry_task};
