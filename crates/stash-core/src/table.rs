//! Process-wide handle table
//!
//! Maps opaque [`Handle`]s to native resources that outlive a single call.
//! Handles come from a monotonically increasing counter and are never reused
//! within the lifetime of the process, so a stale handle can only ever fail
//! with `NotFound`; it can never alias a newer resource.
//!
//! The map is guarded by a single `RwLock`. The lock is never held while a
//! native operation runs: `lookup` hands out an `Arc` to the resource, and
//! `release` unlinks the entry before closing it. A resource that is
//! released while another call is still using it is dropped once that call
//! returns its `Arc`.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::handle::Handle;

/// A native resource that can be registered in a [`HandleTable`]
pub trait Resource: Any + Send + Sync {
    /// Short name used in logs and type mismatch errors
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called exactly once, when the handle is released
    fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

struct Entry {
    any: Arc<dyn Any + Send + Sync>,
    resource: Arc<dyn Resource>,
}

/// Counters describing the table, serialised for `stash_stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStats {
    /// Handles currently registered
    pub live: usize,
    /// Handles ever handed out
    pub registered: u64,
    /// Handles successfully released
    pub released: u64,
}

/// Thread-safe registry of handle-bearing resources
pub struct HandleTable {
    entries: RwLock<HashMap<Handle, Entry>>,
    next: AtomicU64,
    released: AtomicU64,
}

static GLOBAL: OnceLock<HandleTable> = OnceLock::new();

/// The process-wide table used by every exported operation
pub fn global() -> &'static HandleTable {
    GLOBAL.get_or_init(HandleTable::new)
}

impl HandleTable {
    /// Create an empty table; the first handle issued is 1
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next: AtomicU64::new(1),
            released: AtomicU64::new(0),
        }
    }

    /// Take ownership of `resource` and return a fresh, never-zero handle.
    ///
    /// The resource is fully visible to `lookup` by the time this returns.
    pub fn register<T: Resource>(&self, resource: T) -> Handle {
        let resource = Arc::new(resource);
        let kind = resource.kind();
        let entry = Entry {
            any: resource.clone(),
            resource,
        };

        let handle = Handle::from_raw(self.next.fetch_add(1, Ordering::Relaxed));
        debug_assert!(!handle.is_none(), "handle space exhausted");

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, entry);

        debug!(%handle, kind, "registered resource");
        handle
    }

    /// Borrow the resource behind `handle`.
    ///
    /// Fails with `NotFound` for zero, unknown or released handles and with
    /// `InvalidInput` if the handle refers to a different kind of resource.
    pub fn lookup<T: Resource>(&self, handle: Handle) -> Result<Arc<T>> {
        let (any, kind) = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&handle) {
                Some(entry) => (entry.any.clone(), entry.resource.kind()),
                None => {
                    warn!(%handle, "lookup of unknown handle");
                    return Err(Error::NotFound { handle });
                }
            }
        };

        any.downcast::<T>().map_err(|_| {
            Error::invalid_input(
                "handle",
                format!(
                    "handle {} refers to a {}, not a {}",
                    handle,
                    kind,
                    std::any::type_name::<T>()
                ),
            )
        })
    }

    /// Remove `handle` and close its resource.
    ///
    /// A second release of the same handle fails with `NotFound`. If the
    /// resource's `close` hook fails the handle is still gone and the
    /// failure is reported as `OperationFailure`.
    pub fn release(&self, handle: Handle) -> Result<()> {
        let entry = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);

        let Some(entry) = entry else {
            warn!(%handle, "release of unknown handle");
            return Err(Error::NotFound { handle });
        };

        self.released.fetch_add(1, Ordering::Relaxed);
        let kind = entry.resource.kind();
        debug!(%handle, kind, "released resource");

        entry.resource.close().map_err(|err| Error::OperationFailure {
            message: format!("closing {} behind handle {}: {:#}", kind, handle, err),
            source: Some(err),
        })
    }

    /// Whether `handle` is currently registered
    pub fn contains(&self, handle: Handle) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&handle)
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no handles are live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the table counters
    pub fn stats(&self) -> TableStats {
        TableStats {
            live: self.len(),
            registered: self.next.load(Ordering::Relaxed) - 1,
            released: self.released.load(Ordering::Relaxed),
        }
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    impl Resource for Counter {
        fn kind(&self) -> &'static str {
            "counter"
        }
    }

    struct Other;

    impl Resource for Other {}

    struct Closable {
        closed: Arc<AtomicBool>,
        fail: bool,
    }

    impl Resource for Closable {
        fn close(&self) -> anyhow::Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("flush failed");
            }
            Ok(())
        }
    }

    #[test]
    fn test_register_lookup_release_scenario() {
        let table = HandleTable::new();
        let a = table.register(Counter(5));
        assert!(!a.is_none());

        assert_eq!(*table.lookup::<Counter>(a).unwrap(), Counter(5));
        assert!(table.release(a).is_ok());

        assert!(table.lookup::<Counter>(a).unwrap_err().is_not_found());
        assert!(table.release(a).unwrap_err().is_not_found());
    }

    #[test]
    fn test_zero_handle_is_never_found() {
        let table = HandleTable::new();
        table.register(Counter(1));

        assert!(table.lookup::<Counter>(Handle::NONE).unwrap_err().is_not_found());
        assert!(table.release(Handle::NONE).unwrap_err().is_not_found());
    }

    #[test]
    fn test_handles_are_not_reused() {
        let table = HandleTable::new();
        let first = table.register(Counter(1));
        table.release(first).unwrap();
        let second = table.register(Counter(2));

        assert_ne!(first, second);
        assert!(table.lookup::<Counter>(first).unwrap_err().is_not_found());
        assert_eq!(*table.lookup::<Counter>(second).unwrap(), Counter(2));
    }

    #[test]
    fn test_kind_mismatch_is_invalid_input() {
        let table = HandleTable::new();
        let h = table.register(Counter(1));

        let err = table.lookup::<Other>(h).err().unwrap();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(err.to_string().contains("counter"));
        // still registered after a mismatched lookup
        assert!(table.contains(h));
    }

    #[test]
    fn test_close_hook_runs_once_and_errors_are_reported() {
        let table = HandleTable::new();
        let closed = Arc::new(AtomicBool::new(false));
        let h = table.register(Closable {
            closed: closed.clone(),
            fail: true,
        });

        let err = table.release(h).unwrap_err();
        assert!(matches!(err, Error::OperationFailure { .. }));
        assert!(err.to_string().contains("flush failed"));
        assert!(closed.load(Ordering::SeqCst));
        assert!(!table.contains(h));
        assert!(table.release(h).unwrap_err().is_not_found());
    }

    #[test]
    fn test_borrowed_resource_survives_release() {
        let table = HandleTable::new();
        let h = table.register(Counter(9));
        let borrowed = table.lookup::<Counter>(h).unwrap();

        table.release(h).unwrap();
        assert_eq!(*borrowed, Counter(9));
        assert!(table.lookup::<Counter>(h).is_err());
    }

    #[test]
    fn test_stats() {
        let table = HandleTable::new();
        assert!(table.is_empty());
        let a = table.register(Counter(1));
        table.register(Counter(2));
        table.release(a).unwrap();
        let _ = table.release(a);

        let stats = table.stats();
        assert_eq!(stats.live, 1);
        assert_eq!(stats.registered, 2);
        assert_eq!(stats.released, 1);
    }

    #[test]
    fn test_failed_operation_registers_nothing() {
        use crate::buffer::BufferView;

        // validate first, register last
        fn open(table: &HandleTable, bytes: &[u8]) -> Result<Handle> {
            let value = BufferView::new("count", bytes).require_at_most(4)?.len() as u32;
            Ok(table.register(Counter(value)))
        }

        let table = HandleTable::new();
        let kept = open(&table, b"abc").unwrap();
        let before = table.stats();

        let err = open(&table, b"too long").unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));

        let after = table.stats();
        assert_eq!(after.live, before.live);
        assert_eq!(after.registered, before.registered);
        assert!(table.contains(kept));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_concurrent_register_yields_distinct_handles() {
        let table = Arc::new(HandleTable::new());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let table = table.clone();
                thread::spawn(move || {
                    (0..500)
                        .map(|i| table.register(Counter(t * 1000 + i)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for t in threads {
            for h in t.join().unwrap() {
                assert!(!h.is_none());
                assert!(seen.insert(h), "handle {} issued twice", h);
            }
        }
        assert_eq!(table.len(), 8 * 500);
    }

    #[test]
    fn test_concurrent_release_of_same_handle_succeeds_once() {
        let table = Arc::new(HandleTable::new());
        for _ in 0..50 {
            let h = table.register(Counter(0));
            let threads: Vec<_> = (0..4)
                .map(|_| {
                    let table = table.clone();
                    thread::spawn(move || table.release(h).is_ok())
                })
                .collect();
            let successes = threads
                .into_iter()
                .map(|t| t.join().unwrap())
                .filter(|ok| *ok)
                .count();
            assert_eq!(successes, 1);
        }
        assert!(table.is_empty());
    }
}
