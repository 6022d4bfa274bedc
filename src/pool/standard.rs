// src/pool/standard.rs
//! Mutex-guarded pool of reusable values of a statically known type `T`.
//!
//! Grounded on the teacher's `BufferPool`/`PooledBuffer` (a `Vec<Buffer>`
//! behind a single `Mutex`), generalized from raw byte buffers to an
//! arbitrary `T`. This backs [`crate::port::standard::StandardPort`] — ports
//! whose value type is too large or non-`Copy` for the lock-free
//! [`crate::pool::cheap::CheapPool`] fast path, where a plain mutex is an
//! acceptable cost.

use super::config::PoolCapacity;
use super::stats::PoolStats;
use std::sync::{Arc, Mutex};

pub(crate) struct PoolInner<T> {
    pub(crate) values: Vec<T>,
    pub(crate) capacity: PoolCapacity,
    pub(crate) total_allocated: usize,
    pub(crate) total_acquired: usize,
    pub(crate) total_returned: usize,
}

/// Standard thread-safe pool of `T` values, guarded by a `Mutex`.
///
/// # Performance characteristics
///
/// - Acquire: O(1) amortized
/// - Return: O(1) amortized
/// - Mutex contention under high concurrency
///
/// For lock-free operation on small, cheaply-constructed types, see
/// [`crate::pool::cheap::CheapPool`].
pub struct StandardPool<T> {
    pub(crate) inner: Arc<Mutex<PoolInner<T>>>,
    make: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> Clone for StandardPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            make: Arc::clone(&self.make),
        }
    }
}

impl<T: Default + 'static> StandardPool<T> {
    /// Creates a pool using `T::default()` to seed fresh values.
    pub fn new(capacity: PoolCapacity) -> Self {
        Self::with_constructor(capacity, T::default)
    }
}

impl<T> StandardPool<T> {
    /// Creates a pool using `make` to construct fresh values.
    ///
    /// Pre-warms the pool with `capacity.min_pool_size` values.
    pub fn with_constructor(capacity: PoolCapacity, make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let make: Arc<dyn Fn() -> T + Send + Sync> = Arc::new(make);
        let mut values = Vec::with_capacity(capacity.min_pool_size);
        for _ in 0..capacity.min_pool_size {
            values.push((make.as_ref())());
        }
        let total_allocated = values.len();

        Self {
            inner: Arc::new(Mutex::new(PoolInner {
                values,
                capacity,
                total_allocated,
                total_acquired: 0,
                total_returned: 0,
            })),
            make,
        }
    }

    /// Acquires a value from the pool, allocating a fresh one if empty.
    ///
    /// Automatically returned to the pool when the [`StandardPooledValue`] drops.
    pub fn acquire(&self) -> StandardPooledValue<T> {
        let mut inner = self.inner.lock().unwrap();
        inner.total_acquired += 1;

        let make = &self.make;
        let value = inner.values.pop().unwrap_or_else(|| {
            inner.total_allocated += 1;
            (make.as_ref())()
        });

        StandardPooledValue {
            value: Some(value),
            pool: Arc::clone(&self.inner),
        }
    }

    /// Returns the number of values currently idle in the pool.
    pub fn available(&self) -> usize {
        self.inner.lock().unwrap().values.len()
    }

    /// Returns pool statistics.
    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.lock().unwrap();
        PoolStats {
            available: inner.values.len(),
            total_allocated: inner.total_allocated,
            total_acquired: inner.total_acquired,
            total_returned: inner.total_returned,
            max_pool_size: inner.capacity.max_pool_size,
        }
    }

    /// Shrinks the pool to its configured minimum size.
    pub fn shrink(&self) {
        let mut inner = self.inner.lock().unwrap();
        let min_size = inner.capacity.min_pool_size;
        inner.values.truncate(min_size);
        inner.values.shrink_to_fit();
    }

    /// Drops all idle values, resetting the pool to empty.
    pub fn clear(&self) {
        self.inner.lock().unwrap().values.clear();
    }

    /// Returns `value` directly to the pool, bypassing the [`StandardPooledValue`]
    /// guard. Used by callers (such as [`crate::port::core::Port`]) that
    /// already manage the value's lifetime themselves (e.g. behind a
    /// reference-counted [`crate::buffer::BufferManager`]).
    pub fn recycle(&self, value: T) {
        let mut inner = self.inner.lock().unwrap();
        inner.total_returned += 1;
        if inner.values.len() < inner.capacity.max_pool_size {
            inner.values.push(value);
        }
    }

    /// Allocates fresh values until the pool holds at least `target_size` idle
    /// values, capped at `capacity.max_pool_size`.
    pub fn grow(&self, target_size: usize) {
        let mut inner = self.inner.lock().unwrap();
        let target = target_size.min(inner.capacity.max_pool_size);
        while inner.values.len() < target {
            inner.values.push((self.make.as_ref())());
            inner.total_allocated += 1;
        }
    }
}

/// A value borrowed from a [`StandardPool`].
///
/// Automatically returned to the pool when dropped, unless [`leak`](Self::leak)
/// is called first.
pub struct StandardPooledValue<T> {
    value: Option<T>,
    pool: Arc<Mutex<PoolInner<T>>>,
}

impl<T> StandardPooledValue<T> {
    /// Detaches the value from the pool; it will not be returned on drop.
    pub fn leak(mut self) -> T {
        self.value.take().unwrap()
    }
}

impl<T> std::ops::Deref for StandardPooledValue<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value.as_ref().unwrap()
    }
}

impl<T> std::ops::DerefMut for StandardPooledValue<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.value.as_mut().unwrap()
    }
}

impl<T> Drop for StandardPooledValue<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            let mut inner = self.pool.lock().unwrap();
            inner.total_returned += 1;

            if inner.values.len() < inner.capacity.max_pool_size {
                inner.values.push(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(max: usize, min: usize) -> PoolCapacity {
        PoolCapacity {
            max_pool_size: max,
            min_pool_size: min,
        }
    }

    #[test]
    fn test_pool_basic() {
        let pool: StandardPool<Vec<u8>> = StandardPool::new(capacity(10, 2));
        assert_eq!(pool.available(), 2);

        let _v = pool.acquire();
        let stats = pool.stats();
        assert_eq!(stats.total_acquired, 1);
    }

    #[test]
    fn test_leak() {
        let pool: StandardPool<String> = StandardPool::new(capacity(10, 2));
        let pooled = pool.acquire();
        let _owned = pooled.leak();

        let stats = pool.stats();
        assert_eq!(stats.total_acquired, 1);
    }

    #[test]
    fn test_normal_return() {
        let pool: StandardPool<u64> = StandardPool::new(capacity(10, 2));
        let initial_available = pool.available();

        {
            let _v = pool.acquire();
        }

        assert_eq!(pool.available(), initial_available);
    }

    #[test]
    fn test_grow() {
        let pool: StandardPool<u32> = StandardPool::new(capacity(10, 0));
        pool.grow(5);
        assert_eq!(pool.available(), 5);
        pool.grow(20);
        assert_eq!(pool.available(), 10);
    }
}
