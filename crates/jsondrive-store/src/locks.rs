use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lock held for the duration of a mutating operation on one collection.
pub(crate) type CollectionLock = Arc<Mutex<()>>;

/// Registry of per-collection locks.
///
/// Locks are created lazily on first access and never removed, so every
/// caller naming the same collection receives the same `Mutex`. The registry
/// mutex is only held for the lookup-or-insert, never while a collection lock
/// is being waited on.
#[derive(Default)]
pub(crate) struct CollectionLocks {
    locks: Mutex<HashMap<String, CollectionLock>>,
}

impl CollectionLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the lock for `collection`, inserting a fresh one if absent.
    pub(crate) fn get_or_create(&self, collection: &str) -> CollectionLock {
        let mut map = lock_ignoring_poison(&self.locks);
        if let Some(lock) = map.get(collection) {
            return Arc::clone(lock);
        }
        let lock = CollectionLock::default();
        map.insert(collection.to_string(), Arc::clone(&lock));
        lock
    }

    /// Number of collections that have a lock allocated.
    pub(crate) fn len(&self) -> usize {
        lock_ignoring_poison(&self.locks).len()
    }
}

/// Acquire a mutex whose guarded data carries no invariant a panicking holder
/// could have broken.
pub(crate) fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
