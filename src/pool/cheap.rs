// src/pool/cheap.rs
//! Two-tier lock-free pool of [`BufferManager<T>`] for a single concrete
//! "cheaply copied" type `T`, feeding [`crate::port::cheap::CheapCopyPort`].
//!
//! Grounded on the teacher's `FastBufferPool`/`FastPooledBuffer` (thread-local
//! cache → global lock-free queue → fresh allocation) and on
//! `tThreadLocalBufferPools`/`tGlobalBufferPools` from the original: rather
//! than one byte-bucketed pool shared across all cheaply-copied types, each
//! concrete `T` gets its own monomorphized pool (see the Rust-native
//! resolution recorded in `SPEC_FULL.md` §3 and `DESIGN.md`).
//!
//! # Acquisition cascade
//!
//! 1. **Thread-local cache** — no synchronization.
//! 2. **Global lock-free queue** (`crossbeam::queue::SegQueue`) — atomic ops only.
//! 3. **Fresh allocation** — fallback.
//!
//! Buffers acquired from the thread-local cache are tagged as thread-local
//! origin; buffers acquired from the global queue or freshly allocated are
//! global origin. This distinction drives which reference-counting discipline
//! [`crate::port::cheap::CheapCopyPort`] uses when unlocking them (see
//! `BufferOrigin`).

use super::config::PoolCapacity;
use super::stats::CheapPoolStats;
use crate::buffer::BufferManager;
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct LockFreeQueue<T> {
    items: crossbeam::queue::SegQueue<T>,
    size: AtomicUsize,
}

impl<T> LockFreeQueue<T> {
    fn new() -> Self {
        Self {
            items: crossbeam::queue::SegQueue::new(),
            size: AtomicUsize::new(0),
        }
    }

    #[inline]
    fn push(&self, item: T) {
        self.items.push(item);
        self.size.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn pop(&self) -> Option<T> {
        self.items.pop().inspect(|_| {
            self.size.fetch_sub(1, Ordering::Relaxed);
        })
    }

    #[inline]
    fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }
}

struct CheapPoolStatsInner {
    allocated: AtomicUsize,
    acquired: AtomicUsize,
    returned: AtomicUsize,
    cache_hits: AtomicUsize,
}

impl CheapPoolStatsInner {
    fn new() -> Self {
        Self {
            allocated: AtomicUsize::new(0),
            acquired: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
        }
    }
}

/// Where a [`BufferManager`] handed out by [`CheapPool`] came from.
///
/// Mirrors `GetThreadLocalOrigin()`: global-origin buffers use the atomic
/// reference-counting discipline; thread-local-origin buffers use the
/// cheaper thread-local discipline, valid only on the acquiring thread.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BufferOrigin {
    /// Acquired from (or destined for) the global lock-free queue.
    Global,
    /// Acquired from (or destined for) the calling thread's local cache.
    ThreadLocal,
}

const THREAD_CACHE_CAPACITY: usize = 16;

/// A two-tier pool of reusable [`BufferManager<T>`] instances.
pub struct CheapPool<T> {
    global: Arc<LockFreeQueue<Box<BufferManager<T>>>>,
    capacity: PoolCapacity,
    stats: Arc<CheapPoolStatsInner>,
    make: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> Clone for CheapPool<T> {
    fn clone(&self) -> Self {
        Self {
            global: Arc::clone(&self.global),
            capacity: self.capacity,
            stats: Arc::clone(&self.stats),
            make: Arc::clone(&self.make),
        }
    }
}

impl<T: Default + 'static> CheapPool<T> {
    /// Creates a pool using `T::default()` to seed fresh buffers.
    pub fn new(capacity: PoolCapacity) -> Self {
        Self::with_constructor(capacity, T::default)
    }
}

impl<T: 'static> CheapPool<T> {
    /// Creates a pool using `make` to construct fresh values when the
    /// cascade bottoms out.
    pub fn with_constructor(capacity: PoolCapacity, make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let make: Arc<dyn Fn() -> T + Send + Sync> = Arc::new(make);
        let global = Arc::new(LockFreeQueue::new());
        for _ in 0..capacity.min_pool_size {
            global.push(Box::new(BufferManager::new((make.as_ref())())));
        }
        Self {
            global,
            capacity,
            stats: Arc::new(CheapPoolStatsInner::new()),
            make,
        }
    }

    /// Acquires an unused buffer via the thread-local → global → fresh-alloc
    /// cascade, tagged with its [`BufferOrigin`].
    pub fn get_unused_buffer(&self) -> (Box<BufferManager<T>>, BufferOrigin) {
        self.stats.acquired.fetch_add(1, Ordering::Relaxed);

        if let Some(buf) = self.cache_pop() {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return (buf, BufferOrigin::ThreadLocal);
        }

        if let Some(buf) = self.global.pop() {
            return (buf, BufferOrigin::Global);
        }

        self.stats.allocated.fetch_add(1, Ordering::Relaxed);
        (Box::new(BufferManager::new((self.make.as_ref())())), BufferOrigin::Global)
    }

    /// Returns a buffer to the thread-local cache if there is room, else to
    /// the global pool if under capacity, else it is dropped.
    pub fn recycle(&self, buf: Box<BufferManager<T>>) {
        self.stats.returned.fetch_add(1, Ordering::Relaxed);
        let spill = self.cache_push(buf);
        if let Some(buf) = spill {
            if self.global.len() < self.capacity.max_pool_size {
                self.global.push(buf);
            }
        }
    }

    /// Number of buffers idle in the global tier (excludes thread-local caches).
    pub fn available(&self) -> usize {
        self.global.len()
    }

    /// Snapshot of pool statistics.
    pub fn stats(&self) -> CheapPoolStats {
        CheapPoolStats {
            available: self.global.len(),
            allocated: self.stats.allocated.load(Ordering::Relaxed),
            acquired: self.stats.acquired.load(Ordering::Relaxed),
            returned: self.stats.returned.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
        }
    }
}

// `thread_local!` statics can't be generic over `T`, so the per-thread cache
// is keyed by `TypeId` in a single thread-local map instead of one static per
// instantiation of `CheapPool<T>`.
use std::any::{Any, TypeId};
use std::collections::HashMap;

thread_local! {
    static TYPED_CACHES: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

impl<T: 'static> CheapPool<T> {
    fn cache_pop(&self) -> Option<Box<BufferManager<T>>> {
        TYPED_CACHES.with(|caches| {
            let mut caches = caches.borrow_mut();
            let entry = caches
                .entry(TypeId::of::<T>())
                .or_insert_with(|| Box::new(RefCell::new(Vec::<Box<BufferManager<T>>>::new())));
            let cell = entry
                .downcast_mut::<RefCell<Vec<Box<BufferManager<T>>>>>()
                .expect("thread-local cache type mismatch");
            cell.borrow_mut().pop()
        })
    }

    /// Pushes into the thread-local cache; returns `Some` (the buffer) if the
    /// cache was full and the caller must fall back to the global pool.
    fn cache_push(&self, buf: Box<BufferManager<T>>) -> Option<Box<BufferManager<T>>> {
        TYPED_CACHES.with(|caches| {
            let mut caches = caches.borrow_mut();
            let entry = caches
                .entry(TypeId::of::<T>())
                .or_insert_with(|| Box::new(RefCell::new(Vec::<Box<BufferManager<T>>>::new())));
            let cell = entry
                .downcast_mut::<RefCell<Vec<Box<BufferManager<T>>>>>()
                .expect("thread-local cache type mismatch");
            let mut vec = cell.borrow_mut();
            if vec.len() < THREAD_CACHE_CAPACITY {
                vec.push(buf);
                None
            } else {
                Some(buf)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_recycle_roundtrip() {
        let pool: CheapPool<i32> = CheapPool::new(PoolCapacity {
            max_pool_size: 8,
            min_pool_size: 2,
        });
        let (buf, origin) = pool.get_unused_buffer();
        assert!(matches!(origin, BufferOrigin::Global));
        pool.recycle(buf);
        assert_eq!(pool.stats().returned, 1);
    }

    #[test]
    fn thread_local_tier_hit() {
        let pool: CheapPool<u64> = CheapPool::new(PoolCapacity {
            max_pool_size: 8,
            min_pool_size: 0,
        });
        let (buf, _) = pool.get_unused_buffer();
        pool.recycle(buf);
        let (_, origin) = pool.get_unused_buffer();
        assert!(matches!(origin, BufferOrigin::ThreadLocal));
        assert_eq!(pool.stats().cache_hits, 1);
    }
}
