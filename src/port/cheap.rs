// src/port/cheap.rs
//! `CheapCopyPort<T>` — the lock-free-pooled realization of [`Port<T>`].
//!
//! Grounded on `optimized/tCheapCopyPort.h`. Per the module doc in
//! [`crate::port::core`], this crate gives cheap-copy and standard ports one
//! shared implementation; `CheapCopyPort<T>` is the name spec.md uses for a
//! [`Port<T>`] constructed via [`Port::new_cheap`].

use crate::pool::config::PoolCapacity;
use crate::port::core::{Port, PortCreationInfo};
use std::sync::Arc;

/// A port backed by [`crate::pool::cheap::CheapPool`].
pub type CheapCopyPort<T> = Port<T>;

/// Creates a [`CheapCopyPort<T>`] with the given pool capacity.
pub fn new_cheap_copy_port<T: Clone + Send + Sync + 'static>(
    info: PortCreationInfo<T>,
    capacity: PoolCapacity,
) -> Arc<CheapCopyPort<T>> {
    Port::new_cheap(info, capacity)
}
