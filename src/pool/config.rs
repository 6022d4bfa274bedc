// src/pool/config.rs
//! Configuration for buffer and port-value pools.

/// Configuration for the byte-level [`crate::pool::byteclass::ByteClassPools`]
/// used by the type-erased [`crate::port::generic::GenericPort`] facade.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Size of each buffer in the pool (bytes)
    pub buffer_size: usize,
    /// Maximum number of buffers to keep in pool
    pub max_pool_size: usize,
    /// Number of buffers to pre-allocate at startup
    pub min_pool_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            max_pool_size: 100,
            min_pool_size: 10,
        }
    }
}

impl PoolConfig {
    /// Configuration for embedded systems (low memory).
    pub fn small() -> Self {
        Self {
            buffer_size: 64,
            max_pool_size: 20,
            min_pool_size: 5,
        }
    }

    /// Configuration for high-throughput servers.
    pub fn large() -> Self {
        Self {
            buffer_size: 1024,
            max_pool_size: 1000,
            min_pool_size: 50,
        }
    }
}

/// Configuration for the per-type [`crate::pool::cheap::CheapPool`] and
/// [`crate::pool::standard::StandardPool`] pools, which hold values of a
/// statically known type `T` rather than raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct PoolCapacity {
    /// Maximum number of buffers to keep in the global pool.
    pub max_pool_size: usize,
    /// Number of buffers to pre-allocate at startup.
    pub min_pool_size: usize,
}

impl Default for PoolCapacity {
    fn default() -> Self {
        Self {
            max_pool_size: 100,
            min_pool_size: 4,
        }
    }
}
