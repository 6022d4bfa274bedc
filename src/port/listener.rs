// src/port/listener.rs
//! Change-listener hooks invoked synchronously on the publishing thread.

use crate::port::core::Locked;

/// Context handed to a [`PortListener`] on each change notification.
///
/// Holds an owning lock on the published buffer (via the manual
/// reference-counting discipline in [`crate::buffer::manager::BufferManager`],
/// not an `Arc`); a listener that stores `handle` somewhere that outlives the
/// callback extends the buffer's lifetime past the publish call (§5
/// "Listeners ... a listener may extend the lock lifetime by taking an
/// owning handle").
pub struct ChangeContext<T: Send + Sync + 'static> {
    /// Port name, for diagnostics.
    pub port_name: String,
    /// Timestamp recorded at publish time.
    pub timestamp: u64,
    /// Owning handle on the published buffer.
    pub handle: Locked<T>,
}

impl<T: Send + Sync + 'static> ChangeContext<T> {
    /// Borrows the published value.
    pub fn value(&self) -> &T {
        &self.handle
    }
}

/// Clones the owning handle too (see [`Locked::clone`]), so a listener can
/// retain an independent `ChangeContext` past the notification callback.
impl<T: Send + Sync + 'static> Clone for ChangeContext<T> {
    fn clone(&self) -> Self {
        Self {
            port_name: self.port_name.clone(),
            timestamp: self.timestamp,
            handle: self.handle.clone(),
        }
    }
}

/// Receives synchronous notifications when a port's value changes.
///
/// Grounded on the teacher's trait-based callback hooks (e.g. pool stats
/// observers); invoked on the publishing thread inside `Port::publish`,
/// holding the lock for the callback's duration.
pub trait PortListener<T: Send + Sync + 'static>: Send + Sync {
    /// Called after a successful publish that requested notification.
    fn on_port_change(&self, ctx: &ChangeContext<T>);
}

/// A listener built from a plain closure, for ad hoc registration.
pub struct FnListener<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&ChangeContext<T>) + Send + Sync,
{
    f: F,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T, F> FnListener<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&ChangeContext<T>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, F> PortListener<T> for FnListener<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&ChangeContext<T>) + Send + Sync,
{
    fn on_port_change(&self, ctx: &ChangeContext<T>) {
        (self.f)(ctx)
    }
}
