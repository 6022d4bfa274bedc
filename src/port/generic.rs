// src/port/generic.rs
//! The type-erased "generic port" facade (spec.md §4.8).
//!
//! Grounded on `tGenericPort`/`tPortDataPointer`: a runtime-typed wrapper
//! used at framework boundaries (plugins, browsers, scripting) where the
//! concrete value type isn't known at compile time in the caller's context.
//! Unlike [`crate::port::core::Port<T>`], which is monomorphized per value
//! type and lock-free/atomically reference-counted, `GenericPort` stores its
//! current value as raw bytes behind a mutex drawn from
//! [`crate::pool::byteclass::ByteClassPools`] — the one place in this crate
//! where true runtime type erasure is unavoidable (see `DESIGN.md`'s
//! resolution of the corresponding spec Open Question).
//!
//! Exposes the same operations as the typed ports, in type-erased form
//! (spec.md §6 "Generic port: same operations in type-erased form"):
//! `get`/`publish_bytes` (`Get`/`Publish`), `get_pointer` (`GetPointer`),
//! `get_unused_buffer` (`GetUnusedBuffer`), `set_bounds` (`SetBounds`), and
//! `set_pull_request_handler`.

use crate::buffer::Buffer;
use crate::error::{PortError, Result};
use crate::numeric::{self, Number};
use crate::pool::byteclass::{ByteClassPools, PooledBytes};
use crate::port::core::next_timestamp;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct Slot {
    bytes: PooledBytes,
    timestamp: u64,
}

/// An owning snapshot returned by [`GenericPort::get_pointer`]: a copy of the
/// value bytes current at the time of the call, plus its timestamp.
///
/// The generic facade's current slot is mutex-guarded rather than lock-free
/// (see module docs), so there is no separate buffer lifetime to extend by
/// holding this handle — it is a plain owned snapshot, not a refcounted lock.
pub struct GenericLocked {
    bytes: Vec<u8>,
    timestamp: u64,
}

impl GenericLocked {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// A port whose value type is erased to a byte buffer, round-tripping
/// numeric values through the canonical [`Number`] wire container or
/// carrying arbitrary opaque byte blobs.
pub struct GenericPort {
    name: String,
    pools: Arc<ByteClassPools>,
    current: Mutex<Slot>,
    ready: AtomicBool,
    /// `SetBounds(min, max)` (spec.md §4.8): numeric publishes are clamped
    /// into this range when set. Unlike `BoundedPort`, the generic facade
    /// takes no out-of-bounds action/default — clamping is the only policy,
    /// matching the two-argument `SetBounds(min, max)` signature in §4.8.
    bounds: Mutex<Option<(f64, f64)>>,
    pull_request_handler: Mutex<Option<Box<dyn Fn() -> Option<Vec<u8>> + Send + Sync>>>,
}

impl GenericPort {
    pub fn new(name: impl Into<String>, pools: Arc<ByteClassPools>) -> Self {
        let initial = pools.get_unused_buffer(crate::pool::byteclass::STEP);
        Self {
            name: name.into(),
            pools,
            current: Mutex::new(Slot { bytes: initial, timestamp: 0 }),
            ready: AtomicBool::new(false),
            bounds: Mutex::new(None),
            pull_request_handler: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Type-erased `SetBounds(min, max)`: numeric values published afterward
    /// are clamped into `[min, max]`.
    pub fn set_bounds(&self, min: f64, max: f64) {
        *self.bounds.lock().unwrap() = Some((min, max));
    }

    /// Type-erased `SetPullRequestHandler`: installs a handler invoked by
    /// [`Self::pull`] in place of returning the current value unchanged.
    pub fn set_pull_request_handler(&self, handler: impl Fn() -> Option<Vec<u8>> + Send + Sync + 'static) {
        *self.pull_request_handler.lock().unwrap() = Some(Box::new(handler));
    }

    fn apply_bounds(&self, value: Number) -> Number {
        let Some((min, max)) = *self.bounds.lock().unwrap() else {
            return value;
        };
        let v = value.as_f64();
        if v >= min && v <= max {
            return value;
        }
        let clamped = v.clamp(min, max);
        match value {
            Number::Int64(_) => Number::Int64(clamped as i64),
            Number::Int32(_) => Number::Int32(clamped as i32),
            Number::Int16(_) => Number::Int16(clamped as i16),
            Number::Float64(_) => Number::Float64(clamped),
            Number::Float32(_) => Number::Float32(clamped as f32),
        }
    }

    /// Publishes `value` (with optional unit tag) encoded through the
    /// canonical numeric wire format, after applying any bounds installed via
    /// [`Self::set_bounds`].
    pub fn publish_number(&self, value: Number, unit: Option<u8>) -> Result<()> {
        if !self.is_ready() {
            return Err(PortError::PortNotReady);
        }
        let value = self.apply_bounds(value);
        let mut buf = self.pools.get_unused_buffer(16);
        buf.set_len(0)?;
        buf.set_pos(0)?;
        numeric::encode(&mut buf, value, unit)?;
        buf.set_pos(0)?;
        *self.current.lock().unwrap() = Slot { bytes: buf, timestamp: next_timestamp() };
        Ok(())
    }

    /// Decodes the current value as a [`Number`], if it was last published
    /// through [`Self::publish_number`].
    pub fn get_number(&self) -> Result<(Number, Option<u8>)> {
        let mut guard = self.current.lock().unwrap();
        guard.bytes.set_pos(0)?;
        numeric::decode(&mut guard.bytes)
    }

    /// Publishes an arbitrary byte blob, bypassing the numeric codec
    /// entirely (used for opaque/structured port types the facade doesn't
    /// interpret).
    pub fn publish_bytes(&self, bytes: &[u8]) -> Result<()> {
        if !self.is_ready() {
            return Err(PortError::PortNotReady);
        }
        let mut buf = self.pools.get_unused_buffer(bytes.len());
        buf.set_len(0)?;
        buf.set_pos(0)?;
        buf.put_bytes(bytes)?;
        buf.set_pos(0)?;
        *self.current.lock().unwrap() = Slot { bytes: buf, timestamp: next_timestamp() };
        Ok(())
    }

    /// Returns a copy of the current raw value bytes.
    pub fn get_bytes(&self) -> Vec<u8> {
        self.current.lock().unwrap().bytes.as_slice().to_vec()
    }

    /// Type-erased `Get(into_buffer, &timestamp)`: copies the current raw
    /// bytes into `into_buffer` and returns the value's timestamp.
    pub fn get(&self, into_buffer: &mut Buffer) -> Result<u64> {
        let guard = self.current.lock().unwrap();
        into_buffer.set_len(0)?;
        into_buffer.set_pos(0)?;
        into_buffer.put_bytes(guard.bytes.as_slice())?;
        into_buffer.set_pos(0)?;
        Ok(guard.timestamp)
    }

    /// Type-erased `GetUnusedBuffer`: hands the caller a fresh buffer drawn
    /// from the same size-classed pool this port publishes through, for
    /// filling out-of-band before a [`Self::publish_bytes`] call.
    pub fn get_unused_buffer(&self, size: usize) -> PooledBytes {
        self.pools.get_unused_buffer(size)
    }

    /// Type-erased `GetPointer(strategy)`: an owning snapshot of the current
    /// value and its timestamp. `strategy` mirrors the typed ports' fetch
    /// strategy parameter for call-site symmetry; the generic facade's slot
    /// is always mutex-guarded (see module docs), so it has no effect here.
    pub fn get_pointer(&self, _strategy: i32) -> GenericLocked {
        let guard = self.current.lock().unwrap();
        GenericLocked {
            bytes: guard.bytes.as_slice().to_vec(),
            timestamp: guard.timestamp,
        }
    }

    /// Type-erased pull (spec.md §4.6): invokes the installed pull-request
    /// handler if any, otherwise returns the current value unchanged.
    pub fn pull(&self) -> (Vec<u8>, u64) {
        let handled = self
            .pull_request_handler
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|handler| handler());
        let guard = self.current.lock().unwrap();
        match handled {
            Some(bytes) => (bytes, guard.timestamp),
            None => (guard.bytes.as_slice().to_vec(), guard.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::config::PoolConfig;

    fn port() -> GenericPort {
        let pools = Arc::new(ByteClassPools::new(PoolConfig::default()));
        let port = GenericPort::new("generic", pools);
        port.mark_ready();
        port
    }

    #[test]
    fn numeric_roundtrip() {
        let port = port();
        port.publish_number(Number::Int32(42), None).unwrap();
        let (value, unit) = port.get_number().unwrap();
        assert_eq!(value, Number::Int32(42));
        assert_eq!(unit, None);
    }

    #[test]
    fn byte_blob_roundtrip() {
        let port = port();
        port.publish_bytes(b"hello").unwrap();
        assert_eq!(port.get_bytes(), b"hello");
    }

    #[test]
    fn publish_rejected_before_ready() {
        let pools = Arc::new(ByteClassPools::new(PoolConfig::default()));
        let port = GenericPort::new("generic", pools);
        assert!(port.publish_number(Number::Int32(1), None).is_err());
    }

    #[test]
    fn set_bounds_clamps_numeric_publish() {
        let port = port();
        port.set_bounds(0.0, 10.0);
        port.publish_number(Number::Int32(99), None).unwrap();
        let (value, _) = port.get_number().unwrap();
        assert_eq!(value, Number::Int32(10));
    }

    #[test]
    fn pull_without_handler_returns_current_value() {
        let port = port();
        port.publish_bytes(b"abc").unwrap();
        let (bytes, _) = port.pull();
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn pull_with_handler_overrides_current_value() {
        let port = port();
        port.publish_bytes(b"stale").unwrap();
        port.set_pull_request_handler(|| Some(b"fresh".to_vec()));
        let (bytes, _) = port.pull();
        assert_eq!(bytes, b"fresh");
    }

    #[test]
    fn get_pointer_reports_advancing_timestamp() {
        let port = port();
        port.publish_bytes(b"a").unwrap();
        let first = port.get_pointer(0);
        port.publish_bytes(b"b").unwrap();
        let second = port.get_pointer(0);
        assert!(second.timestamp() > first.timestamp());
        assert_eq!(second.as_slice(), b"b");
    }

    #[test]
    fn get_copies_into_caller_buffer() {
        let port = port();
        port.publish_bytes(b"xyz").unwrap();
        let mut into = Buffer::new(16);
        let timestamp = port.get(&mut into).unwrap();
        assert!(timestamp > 0);
        assert_eq!(into.as_slice(), b"xyz");
    }
}
