//! Lock acquisition that tolerates poisoning.

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// Worker-task panics are contained at the task boundary, so a poisoned
/// lock can only come from a panic in engine code itself; recovering
/// keeps the timer thread alive either way.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
