// src/pool/byteclass.rs
//! Size-classed byte-buffer pools backing the type-erased
//! [`crate::port::generic::GenericPort`] facade.
//!
//! Grounded on `tThreadSpecificBufferPools<SHARED>` / `tGlobalBufferPools`:
//! the original indexes an array of pools by `buffer_size / STEP` because its
//! ports are runtime type-erased and cannot have a monomorphized pool per
//! type. Statically-typed ports in this crate use
//! [`crate::pool::cheap::CheapPool`] / [`crate::pool::standard::StandardPool`]
//! instead (see `DESIGN.md`); this module exists only for `GenericPort`,
//! which stores values as raw bytes and genuinely needs size-bucketed reuse.

use super::config::PoolConfig;
use super::standard::StandardPool;
use crate::buffer::Buffer;

/// Step size between adjacent byte-size pool buckets.
pub const STEP: usize = 8;

/// Largest byte size served by the bucketed cheap pools; anything above this
/// is allocated fresh rather than pooled.
pub const MAX_CHEAP_SIZE: usize = 256;

fn bucket_index(size: usize) -> usize {
    size.saturating_sub(1) / STEP
}

fn bucket_capacity(size: usize) -> usize {
    (bucket_index(size) + 1) * STEP
}

/// A registry of [`StandardPool<Buffer>`] instances bucketed by buffer size,
/// shared by every [`crate::port::generic::GenericPort`] in the process.
///
/// Requesting a buffer of `size` bytes rounds up to the next multiple of
/// [`STEP`] and draws from that bucket's pool; sizes above [`MAX_CHEAP_SIZE`]
/// bypass pooling entirely.
pub struct ByteClassPools {
    buckets: Vec<StandardPool<Buffer>>,
    config: PoolConfig,
}

impl ByteClassPools {
    /// Creates a registry with `config.max_pool_size`/`min_pool_size` applied
    /// uniformly to every bucket. Buckets are allocated lazily via
    /// [`Self::get_unused_buffer`], matching the original's `AddMissingPools`
    /// only in effect, not in eagerness.
    pub fn new(config: PoolConfig) -> Self {
        let bucket_count = MAX_CHEAP_SIZE / STEP;
        let capacity = super::config::PoolCapacity {
            max_pool_size: config.max_pool_size,
            min_pool_size: config.min_pool_size,
        };
        Self {
            buckets: (0..bucket_count)
                .map(|_| StandardPool::with_constructor(capacity, || Buffer::new(0)))
                .collect(),
            config,
        }
    }

    /// Returns an unused buffer with capacity for at least `size` bytes.
    ///
    /// For `size <= MAX_CHEAP_SIZE` this draws from the matching bucket pool
    /// and grows it to the bucket's fixed capacity if needed; larger requests
    /// allocate a fresh, unpooled `Buffer`.
    pub fn get_unused_buffer(&self, size: usize) -> PooledBytes {
        if size > MAX_CHEAP_SIZE {
            return PooledBytes::Owned(Buffer::new(size));
        }
        let idx = bucket_index(size);
        let bucket_size = bucket_capacity(size);
        let mut pooled = self.buckets[idx].acquire();
        let current_capacity = pooled.capacity();
        if current_capacity < bucket_size {
            pooled.reserve(bucket_size - current_capacity);
        }
        PooledBytes::Pooled(pooled)
    }

    /// Configuration applied to every bucket (shared across sizes).
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

/// A buffer handed out by [`ByteClassPools`], either pooled or freshly owned.
pub enum PooledBytes {
    Pooled(super::standard::StandardPooledValue<Buffer>),
    Owned(Buffer),
}

impl std::ops::Deref for PooledBytes {
    type Target = Buffer;
    fn deref(&self) -> &Buffer {
        match self {
            PooledBytes::Pooled(p) => p,
            PooledBytes::Owned(b) => b,
        }
    }
}

impl std::ops::DerefMut for PooledBytes {
    fn deref_mut(&mut self) -> &mut Buffer {
        match self {
            PooledBytes::Pooled(p) => p,
            PooledBytes::Owned(b) => b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_rounds_up_to_step() {
        assert_eq!(bucket_capacity(1), STEP);
        assert_eq!(bucket_capacity(8), STEP);
        assert_eq!(bucket_capacity(9), STEP * 2);
    }

    #[test]
    fn small_requests_are_pooled() {
        let pools = ByteClassPools::new(PoolConfig::default());
        let buf = pools.get_unused_buffer(32);
        assert!(matches!(buf, PooledBytes::Pooled(_)));
    }

    #[test]
    fn oversized_requests_bypass_pool() {
        let pools = ByteClassPools::new(PoolConfig::default());
        let buf = pools.get_unused_buffer(MAX_CHEAP_SIZE + 1);
        assert!(matches!(buf, PooledBytes::Owned(_)));
    }
}
