//! Lock acquisition that tolerates poisoning.

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// A poisoned lock here only means a chip behavior panicked mid-write;
/// the vertex conflict rules tolerate partial writes, and the engine
/// marks the affected nets conflicted, so continuing is safe.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
