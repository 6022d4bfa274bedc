// src/port/standard.rs
//! `StandardPort<T>` — the mutex-pooled realization of [`Port<T>`].
//!
//! Grounded on `standard/tStandardPort.h`. Shares [`Port<T>`]'s
//! implementation with [`crate::port::cheap::CheapCopyPort`] (see
//! [`crate::port::core`]'s module docs); `StandardPort<T>` is the name
//! spec.md uses for a [`Port<T>`] constructed via [`Port::new_standard`].

use crate::pool::config::PoolCapacity;
use crate::port::core::{Port, PortCreationInfo};
use std::sync::Arc;

/// A port backed by [`crate::pool::standard::StandardPool`].
pub type StandardPort<T> = Port<T>;

/// Creates a [`StandardPort<T>`] with the given pool capacity.
pub fn new_standard_port<T: Clone + Send + Sync + 'static>(
    info: PortCreationInfo<T>,
    capacity: PoolCapacity,
) -> Arc<StandardPort<T>> {
    Port::new_standard(info, capacity)
}
