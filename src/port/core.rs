// src/port/core.rs
//! The unified port type: current-value slot, buffer pool, listeners, input
//! queue, and the publish/receive/strategy-propagation protocol.
//!
//! Grounded on `optimized/tCheapCopyPort.h` (`Assign`, `NotifyListeners`,
//! `PullValueRaw`) and `common/tPublishOperation.h` (`Execute`/`Receive`
//! control flow). Per spec.md §9 ("An implementation may collapse both [the
//! thread-local and global publishing paths] into the global path at the
//! cost of measurable throughput ... an acceptable simplification"), this
//! crate uses one atomic reference-counting discipline
//! ([`crate::buffer::manager::BufferManager`]'s standard variant) for every
//! port, selecting only which *pool* (lock-free [`CheapPool`] or
//! mutex-guarded [`StandardPool`]) supplies buffers. This is recorded in
//! `DESIGN.md`.

use crate::buffer::manager::BufferManager;
use crate::buffer::tagged::{AtomicTaggedPtr, TaggedPtr};
use crate::error::{PortError, Result};
use crate::pool::cheap::CheapPool;
use crate::pool::config::PoolCapacity;
use crate::pool::standard::StandardPool;
use crate::port::listener::{ChangeContext, PortListener};
use crate::port::queue::InputQueue;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Dense per-process port identifier, for diagnostics and graph bookkeeping.
pub type PortId = u64;

static NEXT_PORT_ID: AtomicU64 = AtomicU64::new(1);
static GLOBAL_TICK: AtomicU64 = AtomicU64::new(1);

fn next_port_id() -> PortId {
    NEXT_PORT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Monotonic logical timestamp source (spec.md §3: "a timestamp ... monotonic
/// ticks"). Not wall-clock time — ticks are comparable only for ordering.
pub(crate) fn next_timestamp() -> u64 {
    GLOBAL_TICK.fetch_add(1, Ordering::Relaxed)
}

/// Distinguishes a normal publish from the one-shot initial push performed
/// when a new connection is established (spec.md §4.2/§4.7).
///
/// `Initial` publishes bypass input queues and are subject to the additional
/// fan-in ≤ 1 rule in [`Port::wants_push`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeConstant {
    Normal,
    Initial,
}

/// Static per-port flags set at creation and not changed afterward.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortFlags {
    /// Port wants to push data to its outgoing connections when it has strategy ≥ 1.
    pub push_strategy: bool,
    /// Port is willing to serve as a source even while itself not pushing
    /// (the "reverse pusher" exception in §4.7 step 3).
    pub reverse_push: bool,
    /// Suppresses the one-shot initial push when a new connection forms.
    pub no_initial_pushing: bool,
    /// Republish the default value when notified of a connection loss.
    pub default_on_disconnect: bool,
    /// True for source/output-like ports (affects the pull-strategy default,
    /// §4.7 step 1: unset push-strategy means -1 for outputs, 0 for inputs).
    pub output: bool,
}

/// Creation-time configuration for a new [`Port`] (spec.md §3 "Lifecycle").
pub struct PortCreationInfo<T> {
    pub name: String,
    pub flags: PortFlags,
    pub default_value: T,
    /// `Some(capacity)` installs an input queue; `dequeue_all` selects its kind.
    pub queue_size: Option<usize>,
    pub dequeue_all: bool,
}

impl<T: Default> PortCreationInfo<T> {
    pub fn new(name: impl Into<String>, flags: PortFlags) -> Self {
        Self {
            name: name.into(),
            flags,
            default_value: T::default(),
            queue_size: None,
            dequeue_all: false,
        }
    }
}

enum PortPool<T> {
    Cheap(CheapPool<T>),
    Standard(StandardPool<BufferManager<T>>),
}

impl<T: Send + Sync + 'static> PortPool<T> {
    fn get_unused(&self) -> Box<BufferManager<T>> {
        match self {
            PortPool::Cheap(p) => p.get_unused_buffer().0,
            PortPool::Standard(p) => Box::new(p.acquire().leak()),
        }
    }

    fn recycle(&self, buf: Box<BufferManager<T>>) {
        match self {
            PortPool::Cheap(p) => p.recycle(buf),
            PortPool::Standard(p) => p.recycle(*buf),
        }
    }
}

/// An outgoing connection from one [`Port<T>`] to another, optionally
/// applying a conversion function (spec.md §3 "Connections ... a conversion
/// edge stores a compiled type-conversion operation").
///
/// Cross-type conversion edges (source type ≠ destination type) are out of
/// scope for this core realization — see `DESIGN.md`; `conversion` here
/// covers same-type value transforms (e.g. unit rescaling) on an edge.
struct Edge<T: Clone + Send + Sync + 'static> {
    target: Arc<Port<T>>,
    conversion: Option<Arc<dyn Fn(&T) -> T + Send + Sync>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for Edge<T> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
            conversion: self.conversion.clone(),
        }
    }
}

/// An owning lock on a published buffer.
///
/// Acquired via [`Port::get_pointer`] or handed to a [`PortListener`] inside
/// a [`ChangeContext`]; releases its lock (and returns the buffer to its pool
/// if it was the last one) on drop. Grounded on the universal unlocker
/// pattern in `tCheapCopyPort.h` (`tPortBufferUnlocker`).
pub struct Locked<T: Send + Sync + 'static> {
    ptr: *mut BufferManager<T>,
    tag: i32,
    pool: Arc<PortPool<T>>,
}

// SAFETY: the only non-atomic field reachable through `ptr` is `data`/`timestamp`,
// both read-only once locked; the manager's own counters are atomic.
unsafe impl<T: Send + Sync + 'static> Send for Locked<T> {}
unsafe impl<T: Send + Sync + 'static> Sync for Locked<T> {}

impl<T: Send + Sync + 'static> Locked<T> {
    pub fn timestamp(&self) -> u64 {
        unsafe { (*self.ptr).timestamp.load(Ordering::Acquire) as u64 }
    }
}

/// Duplicates the lock, incrementing the buffer's reference count so the
/// clone keeps it alive independently (spec.md §5: "a listener may extend
/// the lock lifetime by taking an owning handle").
impl<T: Send + Sync + 'static> Clone for Locked<T> {
    fn clone(&self) -> Self {
        unsafe {
            (*self.ptr).add_locks_checked(1, self.tag);
        }
        Self {
            ptr: self.ptr,
            tag: self.tag,
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<T: Send + Sync + 'static> std::ops::Deref for Locked<T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &(*self.ptr).data }
    }
}

impl<T: Send + Sync + 'static> Drop for Locked<T> {
    fn drop(&mut self) {
        unsafe {
            if (*self.ptr).release_locks_checked(1, self.tag) {
                let boxed = Box::from_raw(self.ptr);
                self.pool.recycle(boxed);
            }
        }
    }
}

/// A typed data port: current-value slot, buffer pool, listeners, optional
/// input queue, and outgoing/incoming connection bookkeeping.
///
/// `Port<T>` realizes both the "cheap-copy" and "standard" port back-ends
/// from spec.md §4.2/§4.3 — which discipline applies is purely a matter of
/// which constructor was used ([`Port::new_cheap`] vs [`Port::new_standard`]),
/// since both now share one reference-counting discipline (see module docs).
pub struct Port<T: Clone + Send + Sync + 'static> {
    id: PortId,
    name: String,
    flags: PortFlags,
    strategy: AtomicI32,
    hijacked: AtomicBool,
    ready: AtomicBool,
    changed: AtomicBool,
    current: AtomicTaggedPtr<T>,
    pool: Arc<PortPool<T>>,
    default_value: T,
    queue_capacity: Option<i32>,
    listeners: Mutex<Vec<Arc<dyn PortListener<T>>>>,
    queue: Option<Mutex<InputQueue<T>>>,
    outgoing: Mutex<Vec<Edge<T>>>,
    incoming: Mutex<Vec<Weak<Port<T>>>>,
    pull_request_handler: Mutex<Option<Box<dyn Fn() -> Option<T> + Send + Sync>>>,
}

impl<T: Clone + Send + Sync + 'static> Port<T> {
    /// Creates a port backed by [`CheapPool`] — the lock-free, small-value
    /// fast path (spec.md §4.2).
    pub fn new_cheap(info: PortCreationInfo<T>, capacity: PoolCapacity) -> Arc<Self> {
        let seed = info.default_value.clone();
        let pool = PortPool::Cheap(CheapPool::with_constructor(capacity, move || seed.clone()));
        Self::build(info, pool)
    }

    /// Creates a port backed by [`StandardPool`] — heap-allocated, mutex-guarded
    /// (spec.md §4.3).
    pub fn new_standard(info: PortCreationInfo<T>, capacity: PoolCapacity) -> Arc<Self> {
        let seed = info.default_value.clone();
        let pool = PortPool::Standard(StandardPool::with_constructor(capacity, move || {
            BufferManager::new(seed.clone())
        }));
        Self::build(info, pool)
    }

    fn build(info: PortCreationInfo<T>, pool: PortPool<T>) -> Arc<Self> {
        let PortCreationInfo {
            name,
            flags,
            default_value,
            queue_size,
            dequeue_all,
        } = info;

        let queue_capacity = queue_size.map(|c| (c as i32).min(i16::MAX as i32));
        let queue = queue_size.map(|cap| {
            Mutex::new(if dequeue_all {
                InputQueue::dequeue_all(cap)
            } else {
                InputQueue::fifo(cap)
            })
        });

        let port = Arc::new(Self {
            id: next_port_id(),
            name,
            flags,
            strategy: AtomicI32::new(-1),
            hijacked: AtomicBool::new(false),
            ready: AtomicBool::new(false),
            changed: AtomicBool::new(false),
            current: AtomicTaggedPtr::null(),
            pool: Arc::new(pool),
            default_value: default_value.clone(),
            queue_capacity,
            listeners: Mutex::new(Vec::new()),
            queue,
            outgoing: Mutex::new(Vec::new()),
            incoming: Mutex::new(Vec::new()),
            pull_request_handler: Mutex::new(None),
        });

        port.install_initial_value(default_value);
        Port::propagate_strategy(&port, None);
        port
    }

    fn install_initial_value(&self, value: T) {
        let mut buf = self.pool.get_unused();
        buf.data = value;
        buf.timestamp = std::sync::atomic::AtomicUsize::new(next_timestamp() as usize);
        let tag = buf.init_reference_counter(1);
        let ptr = Box::into_raw(buf);
        let old = self.current.swap(TaggedPtr::new(ptr, tag));
        debug_assert!(old.pointer().is_none(), "port initialized twice");
    }

    pub fn id(&self) -> PortId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> PortFlags {
        self.flags
    }

    pub fn strategy(&self) -> i32 {
        self.strategy.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Marks the port ready. Called once by the surrounding framework after
    /// construction and structural setup (bounds, connections) are done.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_hijacked(&self) -> bool {
        self.hijacked.load(Ordering::Acquire)
    }

    pub fn set_hijacked(&self, hijacked: bool) {
        self.hijacked.store(hijacked, Ordering::Release);
    }

    pub fn has_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    pub fn reset_changed(&self) {
        self.changed.store(false, Ordering::Release);
    }

    pub fn add_listener(&self, listener: Arc<dyn PortListener<T>>) {
        self.listeners.lock().unwrap().push(listener);
    }

    pub fn set_pull_request_handler(&self, handler: impl Fn() -> Option<T> + Send + Sync + 'static) {
        *self.pull_request_handler.lock().unwrap() = Some(Box::new(handler));
    }

    /// Fan-in: number of ports publishing directly into this one.
    pub fn incoming_count(&self) -> usize {
        self.incoming.lock().unwrap().len()
    }

    // ------------------------------------------------------------------
    // Publish / receive
    // ------------------------------------------------------------------

    /// Publishes `value` from user code. Rejects if the port is not ready
    /// (spec.md §7.1) or silently drops if hijacked (§7.2).
    pub fn publish(&self, value: T, change: ChangeConstant) -> Result<()> {
        if !self.is_ready() {
            return Err(PortError::PortNotReady);
        }
        if self.is_hijacked() {
            return Ok(());
        }
        self.assign_and_forward(value, change, true);
        Ok(())
    }

    /// Publish path used by tooling: notifies this port's own listeners and
    /// bypasses the readiness check (spec.md §6 "Browser publish").
    pub fn browser_publish(&self, value: T) -> Result<()> {
        self.assign_and_forward(value, ChangeConstant::Normal, true);
        Ok(())
    }

    /// Called by an upstream port's forwarding step. Does not re-check
    /// readiness/hijacked (those only gate the originating publish).
    fn receive(&self, value: T, change: ChangeConstant) {
        self.assign_and_forward(value, change, true);
    }

    fn assign_and_forward(&self, value: T, change: ChangeConstant, notify: bool) {
        let queued_value = value.clone();
        let timestamp = self.assign(value);

        if notify {
            self.changed.store(true, Ordering::Release);
            self.notify_listeners(timestamp);
        }

        if let Some(queue) = &self.queue {
            if change != ChangeConstant::Initial {
                queue.lock().unwrap().enqueue(queued_value, timestamp);
            }
        }

        self.forward(change);
    }

    fn assign(&self, value: T) -> u64 {
        let mut buf = self.pool.get_unused();
        buf.data = value;
        let timestamp = next_timestamp();
        buf.timestamp = std::sync::atomic::AtomicUsize::new(timestamp as usize);
        let tag = buf.init_reference_counter(1);
        let ptr = Box::into_raw(buf);
        let old = self.current.swap(TaggedPtr::new(ptr, tag));
        self.release(old);
        timestamp
    }

    fn release(&self, tagged: TaggedPtr<T>) {
        if let Some(ptr) = tagged.pointer() {
            unsafe {
                if (*ptr).release_locks(1) {
                    let boxed = Box::from_raw(ptr);
                    self.pool.recycle(boxed);
                }
            }
        }
    }

    fn notify_listeners(&self, timestamp: u64) {
        let listeners = self.listeners.lock().unwrap();
        if listeners.is_empty() {
            return;
        }
        if let Some(handle) = self.lock_current() {
            let ctx = ChangeContext {
                port_name: self.name.clone(),
                timestamp,
                handle,
            };
            for listener in listeners.iter() {
                listener.on_port_change(&ctx);
            }
        }
    }

    /// Outgoing fan-out: for each edge whose target wants the push, converts
    /// (if a conversion is installed) and recursively `receive`s.
    fn forward(&self, change: ChangeConstant) {
        let edges: Vec<Edge<T>> = self.outgoing.lock().unwrap().clone();
        for edge in edges {
            if edge.target.wants_push(change) {
                let (value, _) = self.get();
                let value = match &edge.conversion {
                    Some(convert) => convert(&value),
                    None => value,
                };
                edge.target.receive(value, change);
            }
        }
    }

    /// True when the port's strategy is ≥ 1; for `CHANGED_INITIAL`, also
    /// requires fan-in ≤ 1 to prevent initial-push storms on fan-in
    /// (spec.md §4.2 `WantsPush<CHANGE>`).
    pub fn wants_push(&self, change: ChangeConstant) -> bool {
        if self.strategy() < 1 {
            return false;
        }
        if change == ChangeConstant::Initial {
            return self.incoming_count() <= 1;
        }
        true
    }

    // ------------------------------------------------------------------
    // Get
    // ------------------------------------------------------------------

    /// Wait-free value snapshot (spec.md §4.2 "Get fast path"): load, copy,
    /// re-load; retry if the slot changed during the copy.
    ///
    /// The copy races with a concurrent publisher overwriting the same
    /// recycled allocation; the re-load comparison catches every race except
    /// the one where the tagged pointer is recycled back to bit-identical
    /// value within the retry window (see the pointer-tag width note in
    /// spec.md §9, which accepts this as the ABA-defense boundary).
    pub fn get(&self) -> (T, u64) {
        loop {
            let before = self.current.raw();
            let tp = TaggedPtr::<T>::from_storage(before);
            let Some(ptr) = tp.pointer() else {
                return (self.default_value.clone(), 0);
            };
            let (value, ts) = unsafe { ((*ptr).data.clone(), (*ptr).timestamp.load(Ordering::Acquire)) };
            if self.current.raw() == before {
                return (value, ts as u64);
            }
        }
    }

    /// Returns an owning [`Locked`] handle on the current buffer, retrying
    /// while the optimistic `try_lock` loses a race against a concurrent
    /// recycle (spec.md §4.2 `LockCurrentValueForPublishing`).
    pub fn get_pointer(&self) -> Option<Locked<T>> {
        self.lock_current()
    }

    /// Retries `try_lock` against whatever buffer is current, since a losing
    /// race means the slot is mid-recycle and a fresh value will appear
    /// shortly. Bails out after a bounded number of attempts rather than
    /// spinning forever under pathological contention.
    fn lock_current(&self) -> Option<Locked<T>> {
        for _ in 0..64 {
            let tp = self.current.load();
            let ptr = tp.pointer()?;
            let tag = tp.tag();
            if unsafe { (*ptr).try_lock(1, tag) } {
                return Some(Locked {
                    ptr,
                    tag,
                    pool: Arc::clone(&self.pool),
                });
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Connections / strategy propagation
    // ------------------------------------------------------------------

    /// Connects `source` to `target` and performs initial-push / strategy
    /// propagation per spec.md §4.7.
    pub fn connect(source: &Arc<Port<T>>, target: &Arc<Port<T>>) {
        Self::connect_with_conversion(source, target, None)
    }

    pub fn connect_with_conversion(
        source: &Arc<Port<T>>,
        target: &Arc<Port<T>>,
        conversion: Option<Arc<dyn Fn(&T) -> T + Send + Sync>>,
    ) {
        source.outgoing.lock().unwrap().push(Edge {
            target: Arc::clone(target),
            conversion,
        });
        target.incoming.lock().unwrap().push(Arc::downgrade(source));

        let wants_initial = target.wants_push(ChangeConstant::Initial)
            && !source.flags.no_initial_pushing
            && !target.flags.no_initial_pushing;

        Port::propagate_strategy(source, wants_initial.then(|| Arc::clone(target)));
    }

    pub fn disconnect(source: &Arc<Port<T>>, target: &Arc<Port<T>>) {
        source.outgoing.lock().unwrap().retain(|e| !Arc::ptr_eq(&e.target, target));
        target.incoming.lock().unwrap().retain(|w| {
            w.upgrade().map(|s| !Arc::ptr_eq(&s, source)).unwrap_or(false)
        });
        Port::propagate_strategy(source, None);
        if target.flags.default_on_disconnect {
            let _ = target.browser_publish(target.default_value.clone());
        }
    }

    fn strategy_requirement(&self) -> i32 {
        if !self.flags.push_strategy {
            if self.flags.output { -1 } else { 0 }
        } else if let Some(cap) = self.queue_capacity {
            cap
        } else {
            1
        }
    }

    fn all_ready_incoming_are_reverse_pushers(&self) -> bool {
        self.incoming
            .lock()
            .unwrap()
            .iter()
            .filter_map(|w| w.upgrade())
            .filter(|p| p.is_ready())
            .all(|p| p.flags.reverse_push)
    }

    /// Strategy-propagation algorithm (spec.md §4.7), grounded directly on
    /// `tAbstractDataPort::PropagateStrategy`. Runs under the caller's
    /// structure-mutex discipline (see `connection::PortGraph`).
    pub fn propagate_strategy(port: &Arc<Port<T>>, push_wanter: Option<Arc<Port<T>>>) {
        let requirement = port.strategy_requirement();
        let max_outgoing = port
            .outgoing
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.target.strategy())
            .max()
            .unwrap_or(-1);
        let mut new_strategy = requirement.max(max_outgoing);
        if port.is_hijacked() {
            new_strategy = -1;
        }

        let old_strategy = port.strategy.swap(new_strategy, Ordering::AcqRel);

        if let Some(wanter) = &push_wanter {
            let can_serve_as_source = new_strategy >= 1
                || port.incoming.lock().unwrap().is_empty()
                || port.all_ready_incoming_are_reverse_pushers();

            if can_serve_as_source {
                let (value, _) = port.get();
                wanter.receive(value, ChangeConstant::Initial);
            } else {
                let upstream: Vec<Arc<Port<T>>> =
                    port.incoming.lock().unwrap().iter().filter_map(|w| w.upgrade()).collect();
                for src in upstream {
                    Port::propagate_strategy(&src, Some(Arc::clone(wanter)));
                }
            }
        }

        if old_strategy != new_strategy {
            tracing::debug!(
                port = %port.name,
                old_strategy,
                new_strategy,
                "port strategy changed"
            );
            let upstream: Vec<Arc<Port<T>>> =
                port.incoming.lock().unwrap().iter().filter_map(|w| w.upgrade()).collect();
            for src in upstream {
                Port::propagate_strategy(&src, None);
            }
        }
    }

    // ------------------------------------------------------------------
    // Pull support (see `crate::pull`)
    // ------------------------------------------------------------------

    pub(crate) fn first_incoming(&self) -> Option<Arc<Port<T>>> {
        self.incoming.lock().unwrap().iter().find_map(|w| w.upgrade())
    }

    pub(crate) fn invoke_pull_handler(&self) -> Option<T> {
        let handler = self.pull_request_handler.lock().unwrap();
        handler.as_ref().and_then(|h| h())
    }

    pub(crate) fn assign_pub(&self, value: T) -> u64 {
        self.assign(value)
    }

    // ------------------------------------------------------------------
    // Input queue
    // ------------------------------------------------------------------

    pub fn dequeue_single(&self) -> Result<Option<T>> {
        let queue = self.queue.as_ref().ok_or(PortError::NoInputQueue)?;
        let mut queue = queue.lock().unwrap();
        if queue.is_dequeue_all() {
            return Err(PortError::WrongQueueMode);
        }
        Ok(queue.dequeue_single().map(|e| e.value))
    }

    pub fn dequeue_all(&self) -> Result<Vec<T>> {
        let queue = self.queue.as_ref().ok_or(PortError::NoInputQueue)?;
        let mut queue = queue.lock().unwrap();
        if !queue.is_dequeue_all() {
            return Err(PortError::WrongQueueMode);
        }
        Ok(queue.drain_all().into_iter().map(|e| e.value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(push: bool) -> PortFlags {
        PortFlags {
            push_strategy: push,
            ..Default::default()
        }
    }

    fn info(name: &str, push: bool, default: i32) -> PortCreationInfo<i32> {
        PortCreationInfo {
            name: name.to_string(),
            flags: flags(push),
            default_value: default,
            queue_size: None,
            dequeue_all: false,
        }
    }

    #[test]
    fn basic_push_chain() {
        let o = Port::new_cheap(info("O", false, 0), PoolCapacity::default());
        let x = Port::new_cheap(info("X", false, 0), PoolCapacity::default());
        let i = Port::new_cheap(info("I", true, 0), PoolCapacity::default());
        o.mark_ready();
        x.mark_ready();
        i.mark_ready();

        Port::connect(&o, &x);
        Port::connect(&x, &i);

        o.publish(42, ChangeConstant::Normal).unwrap();
        assert_eq!(i.get().0, 42);
        assert!(i.has_changed());
        i.reset_changed();
        o.publish(42, ChangeConstant::Normal).unwrap();
        assert!(i.has_changed(), "no deduplication: identical value still signals change");
    }

    #[test]
    fn publish_rejected_when_not_ready() {
        let o = Port::new_cheap(info("O", false, 0), PoolCapacity::default());
        assert_eq!(o.publish(1, ChangeConstant::Normal), Err(PortError::PortNotReady));
    }

    #[test]
    fn hijacked_publish_is_silently_dropped() {
        let o = Port::new_cheap(info("O", false, 7), PoolCapacity::default());
        o.mark_ready();
        o.set_hijacked(true);
        o.publish(99, ChangeConstant::Normal).unwrap();
        assert_eq!(o.get().0, 7);
    }

    #[test]
    fn fifo_queue_dequeue() {
        let mut i = PortCreationInfo::<i32>::new("I", flags(true));
        i.queue_size = Some(3);
        let port = Port::new_standard(i, PoolCapacity::default());
        port.mark_ready();
        for v in 1..=4 {
            port.assign_and_forward(v, ChangeConstant::Normal, false);
        }
        let mut drained = Vec::new();
        while let Ok(Some(v)) = port.dequeue_single() {
            drained.push(v);
        }
        assert_eq!(drained, vec![2, 3, 4]);
    }
}
