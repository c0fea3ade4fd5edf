//! Synchronization primitives behind the lazy object model.
//!
//! Every entity of the metadata graph owns an [`EntityLock`] and a number of [`LazySlot`]s. A slot
//! starts *uninitialized*, moves to *initialized* on its first [`LazySlot::get`] (or an explicit
//! [`LazySlot::set`]) and only returns to *uninitialized* through [`LazySlot::reset`].
//!
//! How racing first accesses are handled depends on the [`InitPolicy`] chosen when the graph is
//! built:
//!
//! - [`InitPolicy::PerEntityLock`] - the compute hook runs while the entity write lock is held,
//!   after re-checking the slot. Exactly one computation happens per slot, and every caller
//!   observes the published value.
//! - [`InitPolicy::NoLocking`] - the compute hook runs without any entity-level synchronization.
//!   Concurrent first accesses may compute more than once; the first value published wins and is
//!   the one every caller gets back. Meant for single-threaded hosts.
//!
//! The slot's own storage is always guarded by a short-lived `parking_lot::RwLock`, so even the
//! `NoLocking` policy never exposes torn values.

use parking_lot::{RwLock, RwLockWriteGuard};
use strum::{Display, EnumIter};

/// Initialization policy for lazy slots, selected once per graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum InitPolicy {
    /// Lazy slots are not serialized; intended for single-threaded use
    NoLocking,
    /// Each entity owns a read/write lock serializing the initialization of its slots
    #[default]
    PerEntityLock,
}

/// The per-entity lock shared by all lazy slots of one entity.
#[derive(Debug, Default)]
pub struct EntityLock {
    policy: InitPolicy,
    lock: RwLock<()>,
}

impl EntityLock {
    /// Create a new lock operating under `policy`
    #[must_use]
    pub fn new(policy: InitPolicy) -> Self {
        EntityLock {
            policy,
            lock: RwLock::new(()),
        }
    }

    /// The policy this lock was created with
    #[must_use]
    pub fn policy(&self) -> InitPolicy {
        self.policy
    }

    /// Acquire the entity write lock, if the policy asks for one
    fn acquire(&self) -> Option<RwLockWriteGuard<'_, ()>> {
        match self.policy {
            InitPolicy::NoLocking => None,
            InitPolicy::PerEntityLock => Some(self.lock.write()),
        }
    }
}

/// A deferred-computation cell.
///
/// Values are handed out by clone, so large payloads are stored behind an `Arc`.
///
/// # Examples
///
/// ```rust
/// use cilgraph::utils::{EntityLock, InitPolicy, LazySlot};
///
/// let lock = EntityLock::new(InitPolicy::PerEntityLock);
/// let slot: LazySlot<u32> = LazySlot::new();
///
/// assert_eq!(slot.get(&lock, || 42), 42);
/// assert_eq!(slot.get(&lock, || 7), 42);
///
/// slot.reset(&lock);
/// assert_eq!(slot.get(&lock, || 7), 7);
/// ```
#[derive(Debug)]
pub struct LazySlot<T> {
    value: RwLock<Option<T>>,
}

impl<T> Default for LazySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LazySlot<T> {
    /// Create an uninitialized slot
    #[must_use]
    pub fn new() -> Self {
        LazySlot {
            value: RwLock::new(None),
        }
    }

    /// Create a slot that is already initialized with `value`
    #[must_use]
    pub fn with_value(value: T) -> Self {
        LazySlot {
            value: RwLock::new(Some(value)),
        }
    }
}

impl<T: Clone> LazySlot<T> {
    /// Returns the cached value, computing and publishing it with `compute` on first access.
    ///
    /// ## Arguments
    /// * `lock`    - The lock of the entity owning this slot
    /// * `compute` - The compute hook, invoked at most once per initialization under
    ///   [`InitPolicy::PerEntityLock`]. It must not access another slot of the same entity.
    pub fn get<F>(&self, lock: &EntityLock, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.peek() {
            return value;
        }

        match lock.acquire() {
            Some(_guard) => {
                if let Some(value) = self.peek() {
                    return value;
                }

                let value = compute();
                *self.value.write() = Some(value.clone());
                value
            }
            None => self.publish_first(compute()),
        }
    }

    /// Like [`LazySlot::get`], but never takes the entity lock.
    ///
    /// Used for back-references: their compute hooks are idempotent, and they must stay readable
    /// while a list of another entity is being populated under that entity's lock.
    pub fn get_relaxed<F>(&self, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.peek() {
            return value;
        }
        self.publish_first(compute())
    }

    /// Publish `value` without taking the entity lock, see [`LazySlot::get_relaxed`]
    pub fn set_relaxed(&self, value: T) {
        *self.value.write() = Some(value);
    }

    fn publish_first(&self, computed: T) -> T {
        let mut stored = self.value.write();
        match stored.as_ref() {
            Some(published) => published.clone(),
            None => {
                *stored = Some(computed.clone());
                computed
            }
        }
    }

    /// Publish `value`, marking the slot initialized
    pub fn set(&self, lock: &EntityLock, value: T) {
        let _guard = lock.acquire();
        *self.value.write() = Some(value);
    }

    /// Return the slot to the uninitialized state, so the next [`LazySlot::get`] recomputes
    pub fn reset(&self, lock: &EntityLock) {
        let _guard = lock.acquire();
        *self.value.write() = None;
    }

    /// The published value, if any, without triggering a computation
    pub fn peek(&self) -> Option<T> {
        self.value.read().clone()
    }

    /// Returns `true` once a value has been published
    pub fn is_initialized(&self) -> bool {
        self.value.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    };
    use std::thread;
    use strum::IntoEnumIterator;

    #[test]
    fn computes_once_until_reset() {
        for policy in InitPolicy::iter() {
            let lock = EntityLock::new(policy);
            let slot = LazySlot::new();
            let calls = AtomicUsize::new(0);

            let compute = || {
                calls.fetch_add(1, Ordering::SeqCst);
                String::from("value")
            };

            assert!(!slot.is_initialized());
            assert_eq!(slot.get(&lock, compute), "value");
            assert_eq!(slot.get(&lock, compute), "value");
            assert_eq!(calls.load(Ordering::SeqCst), 1);

            slot.reset(&lock);
            assert!(!slot.is_initialized());
            assert_eq!(slot.get(&lock, compute), "value");
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }
    }

    #[test]
    fn set_marks_initialized() {
        let lock = EntityLock::new(InitPolicy::PerEntityLock);
        let slot = LazySlot::new();

        slot.set(&lock, 5u8);
        assert!(slot.is_initialized());
        assert_eq!(slot.get(&lock, || panic!("must not compute")), 5);
    }

    #[test]
    fn with_value_is_initialized() {
        let lock = EntityLock::new(InitPolicy::NoLocking);
        let slot = LazySlot::with_value(Some(3u16));

        assert_eq!(slot.peek(), Some(Some(3)));
        assert_eq!(slot.get(&lock, || None), Some(3));
    }

    #[test]
    fn concurrent_first_access_computes_once() {
        const THREADS: usize = 16;

        let lock = Arc::new(EntityLock::new(InitPolicy::PerEntityLock));
        let slot = Arc::new(LazySlot::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let lock = lock.clone();
                let slot = slot.clone();
                let calls = calls.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    slot.get(&lock, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::yield_now();
                        Arc::new(i)
                    })
                })
            })
            .collect();

        let results: Vec<Arc<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    }

    #[test]
    fn no_locking_first_publication_wins() {
        let lock = EntityLock::new(InitPolicy::NoLocking);
        let slot = LazySlot::new();

        let value = slot.get(&lock, || {
            // A racing caller publishes while this computation is still running
            slot.set(&lock, 1u32);
            2u32
        });

        assert_eq!(value, 1);
        assert_eq!(slot.peek(), Some(1));
    }

    #[test]
    fn relaxed_access_ignores_entity_lock() {
        let lock = EntityLock::new(InitPolicy::PerEntityLock);
        let slot = LazySlot::new();

        // Holding the entity lock must not block relaxed readers and writers
        let _held = lock.acquire();
        assert_eq!(slot.get_relaxed(|| 9u32), 9);
        assert_eq!(slot.get_relaxed(|| 1u32), 9);

        slot.set_relaxed(4);
        assert_eq!(slot.peek(), Some(4));
    }

    #[test]
    fn policy_display() {
        assert_eq!(InitPolicy::NoLocking.to_string(), "NoLocking");
        assert_eq!(InitPolicy::default(), InitPolicy::PerEntityLock);
    }
}
