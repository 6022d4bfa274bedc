// src/buffer/manager.rs
//! Reference-counted port buffer manager.
//!
//! Grounded on `tReferenceCountingBufferManager`: a single 32-bit atomic word
//! packs a reference counter (upper 16 bits) and a reuse counter (lower 16
//! bits). The three low bits of the reuse counter double as the ABA-defeating
//! tag carried alongside the pointer in [`crate::buffer::tagged::TaggedPtr`].
//!
//! # Two counting disciplines
//!
//! A buffer can be locked either through the standard atomic discipline
//! (`add_locks`/`release_locks`, safe from any thread) or through the
//! thread-local discipline (`add_thread_local_locks`/`release_thread_local_locks`,
//! only valid on the buffer's owning thread, amortizing atomic RMW cost for
//! the common single-writer case). Cross-thread releases against a
//! thread-local-owned buffer go through [`BufferManager::release_locks_from_other_thread`]
//! and queue up in `foreign_release_count` until the owning thread drains them
//! with [`BufferManager::process_lock_releases_from_other_threads`].

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

/// Mask for the low bits of the reuse counter used as the pointer tag.
pub const TAG_MASK: i32 = 0x7;
/// Mask for the reuse counter field.
pub const REUSE_COUNTER_MASK: i32 = 0xFFFF;

/// Reference-counted, reusable holder for a single port value of type `T`.
///
/// One `BufferManager<T>` backs one buffer slot recycled by a
/// [`crate::pool::cheap::CheapPool`] or [`crate::pool::standard::StandardPool`].
/// The manager never deallocates `data` itself — pools own that decision
/// through the deleter passed to `release_locks`.
pub struct BufferManager<T> {
    /// The managed value. `None` only momentarily during pool hand-off.
    pub data: T,
    /// Timestamp attached to the most recent publish of this buffer (monotonic ticks).
    pub timestamp: AtomicUsize,
    /// Upper 16 bits: reference counter. Lower 16 bits: reuse counter.
    reference_and_reuse_counter: AtomicI32,
    /// Thread-local reference counter, valid only on the owning thread.
    /// Not atomic: the owning thread is the sole writer.
    thread_local_reference_counter: std::cell::Cell<i32>,
    /// Releases issued by other threads against a thread-local-owned buffer,
    /// queued here until the owner drains them.
    foreign_release_count: AtomicI32,
}

// SAFETY: `thread_local_reference_counter` is only ever touched by the owning
// thread (guarded by convention, mirroring the C++ original's single-writer
// assumption); all cross-thread traffic goes through the atomic fields.
unsafe impl<T: Send> Sync for BufferManager<T> {}

impl<T> BufferManager<T> {
    /// Wraps `data` in a fresh manager with a zeroed reference/reuse counter.
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: AtomicUsize::new(0),
            reference_and_reuse_counter: AtomicI32::new(0),
            thread_local_reference_counter: std::cell::Cell::new(0),
            foreign_release_count: AtomicI32::new(0),
        }
    }

    /// Adds `locks_to_add` to the reference counter.
    ///
    /// Returns the pointer tag in effect *before* the add, for use in a
    /// [`crate::buffer::tagged::TaggedPtr`] constructed concurrently with this call.
    #[inline]
    pub fn add_locks(&self, locks_to_add: i32) -> i32 {
        self.reference_and_reuse_counter
            .fetch_add(locks_to_add << 16, Ordering::AcqRel)
            & TAG_MASK
    }

    /// Adds locks, asserting the reference counter's tag matches `check_tag`.
    ///
    /// # Panics
    /// Panics if the stored tag has changed — this indicates a buffer was
    /// recycled and reused while still referenced, a reference-counting bug.
    #[inline]
    pub fn add_locks_checked(&self, locks_to_add: i32, check_tag: i32) {
        let old_value = self
            .reference_and_reuse_counter
            .fetch_add(locks_to_add << 16, Ordering::AcqRel);
        assert_eq!(old_value & TAG_MASK, check_tag, "corrupted tag detected");
    }

    /// Current pointer tag derived from the reuse counter.
    #[inline]
    pub fn pointer_tag(&self) -> i32 {
        self.reference_and_reuse_counter.load(Ordering::Acquire) & TAG_MASK
    }

    /// Reinitializes the reference counter for the next use of this buffer,
    /// bumping the reuse counter (the ABA generation) and setting the initial
    /// lock count.
    ///
    /// Returns the pointer tag to use for the tagged pointer that will be
    /// published alongside this buffer.
    #[inline]
    pub fn init_reference_counter(&self, initial_locks: i32) -> i32 {
        let current = self.reference_and_reuse_counter.load(Ordering::Acquire);
        let new_use_count = (current + 1) & REUSE_COUNTER_MASK;
        self.reference_and_reuse_counter
            .store((initial_locks << 16) | new_use_count, Ordering::Release);
        new_use_count & TAG_MASK
    }

    /// Releases `locks_to_release` locks, invoking `on_zero` and returning
    /// `true` if the reference count reaches zero (buffer is now unused and
    /// should be returned to its pool).
    ///
    /// # Panics
    /// Panics if the reference counter would go negative.
    #[inline]
    pub fn release_locks(&self, locks_to_release: i32) -> bool {
        let old_value = self
            .reference_and_reuse_counter
            .fetch_sub(locks_to_release << 16, Ordering::AcqRel);
        let old_counter = old_value >> 16;
        assert!(
            old_counter - locks_to_release >= 0,
            "negative reference counter detected"
        );
        old_counter - locks_to_release == 0
    }

    /// Like [`Self::release_locks`], additionally asserting the tag is unchanged.
    #[inline]
    pub fn release_locks_checked(&self, locks_to_release: i32, check_tag: i32) -> bool {
        let old_value = self
            .reference_and_reuse_counter
            .fetch_sub(locks_to_release << 16, Ordering::AcqRel);
        assert_eq!(old_value & TAG_MASK, check_tag, "corrupted tag detected");
        let old_counter = old_value >> 16;
        assert!(
            old_counter - locks_to_release >= 0,
            "negative reference counter detected"
        );
        old_counter - locks_to_release == 0
    }

    /// Attempts to lock the buffer for reading: succeeds only if the
    /// reference counter is currently positive and `pointer_tag` matches the
    /// live generation, defeating ABA races against concurrent recycling.
    #[inline]
    pub fn try_lock(&self, locks_to_add: i32, pointer_tag: i32) -> bool {
        let mut current = self.reference_and_reuse_counter.load(Ordering::Acquire);
        loop {
            if (current >> 16) <= 0 || (current & TAG_MASK) != pointer_tag {
                return false;
            }
            let new_value = current + (locks_to_add << 16);
            match self.reference_and_reuse_counter.compare_exchange_weak(
                current,
                new_value,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Thread-local reference counter (owning thread only).
    #[inline]
    pub fn thread_local_reference_counter(&self) -> i32 {
        self.thread_local_reference_counter.get()
    }

    /// Adds locks under the thread-local discipline. Callable only from the
    /// owning thread.
    #[inline]
    pub fn add_thread_local_locks(&self, locks_to_add: i32) {
        self.thread_local_reference_counter
            .set(self.thread_local_reference_counter.get() + locks_to_add);
    }

    /// Releases locks under the thread-local discipline, first folding in any
    /// releases queued by other threads via
    /// [`Self::release_locks_from_other_thread`]. Returns `true` if the
    /// combined counter reaches zero.
    #[inline]
    pub fn release_thread_local_locks(&self, locks_to_release: i32) -> bool {
        self.process_lock_releases_from_other_threads();
        let remaining = self.thread_local_reference_counter.get() - locks_to_release;
        assert!(remaining >= 0, "negative thread-local reference counter");
        self.thread_local_reference_counter.set(remaining);
        remaining == 0
    }

    /// Queues a release issued by a thread other than the buffer's owner.
    /// The owning thread must later call
    /// [`Self::process_lock_releases_from_other_threads`] to apply it.
    #[inline]
    pub fn release_locks_from_other_thread(&self, locks_to_release: i32) {
        self.foreign_release_count
            .fetch_add(locks_to_release, Ordering::AcqRel);
    }

    /// Drains releases queued by foreign threads into the thread-local
    /// counter. Callable only from the owning thread.
    #[inline]
    pub fn process_lock_releases_from_other_threads(&self) {
        let pending = self.foreign_release_count.swap(0, Ordering::AcqRel);
        if pending != 0 {
            let remaining = self.thread_local_reference_counter.get() - pending;
            assert!(remaining >= 0, "negative thread-local reference counter");
            self.thread_local_reference_counter.set(remaining);
        }
    }

    /// Bumps the reuse counter without touching the reference counter,
    /// returning the new tag. Used by the thread-local publishing path where
    /// the owning thread re-publishes a buffer it still exclusively holds.
    #[inline]
    pub fn increment_reuse_counter(&self) -> i32 {
        let current = self.reference_and_reuse_counter.load(Ordering::Acquire);
        let new_use_count = (current + 1) & REUSE_COUNTER_MASK;
        let new_value = (current & !REUSE_COUNTER_MASK) | new_use_count;
        self.reference_and_reuse_counter
            .store(new_value, Ordering::Release);
        new_use_count & TAG_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_tag_roundtrip() {
        let bm = BufferManager::new(42u32);
        let tag = bm.init_reference_counter(1000);
        assert_eq!(bm.pointer_tag(), tag);
    }

    #[test]
    fn add_and_release_to_zero() {
        let bm = BufferManager::new(7i64);
        bm.init_reference_counter(1);
        assert!(!bm.release_locks(0));
        bm.add_locks(2);
        assert!(!bm.release_locks(1));
        assert!(bm.release_locks(2));
    }

    #[test]
    #[should_panic(expected = "negative reference counter")]
    fn release_below_zero_panics() {
        let bm = BufferManager::new(1u8);
        bm.init_reference_counter(0);
        bm.release_locks(1);
    }

    #[test]
    fn try_lock_respects_tag_and_zero_count() {
        let bm = BufferManager::new(1u8);
        let tag = bm.init_reference_counter(1);
        assert!(bm.try_lock(1, tag));
        bm.release_locks(2);
        assert!(!bm.try_lock(1, tag));
    }

    #[test]
    fn thread_local_discipline() {
        let bm = BufferManager::new(());
        bm.add_thread_local_locks(3);
        assert_eq!(bm.thread_local_reference_counter(), 3);
        bm.release_locks_from_other_thread(1);
        assert!(!bm.release_thread_local_locks(2));
        assert_eq!(bm.thread_local_reference_counter(), 0);
    }
}
