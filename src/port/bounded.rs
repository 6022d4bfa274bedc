// src/port/bounded.rs
//! Numeric bounds enforcement, applied by [`BoundedPort`] as a wrapper
//! around the core [`crate::port::core::Port`], per spec.md §4.4.
//!
//! Grounded on `api/tBoundedPort.h`: `SetBounds` only takes effect before the
//! port is first initialized; `BrowserPublishRaw`/the non-standard-assign hook
//! reject, clamp, or substitute out-of-range values depending on
//! [`OutOfBoundsAction`].

use crate::error::{PortError, Result};
use crate::pool::config::PoolCapacity;
use crate::port::core::{ChangeConstant, Port, PortCreationInfo};
use std::sync::atomic::{AtomicBool, Ordering};

/// What to do with a publish whose value falls outside `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutOfBoundsAction {
    /// Reject the publish entirely; the port's visible value is unchanged.
    Discard,
    /// Replace the value with `clamp(value, min, max)`.
    AdjustToRange,
    /// Replace the value with the configured default.
    ApplyDefault,
}

/// `{min, max, out_of_bounds_action, default}` from spec.md §4.4.
#[derive(Clone, Debug)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
    pub action: OutOfBoundsAction,
    pub default: T,
}

impl<T: PartialOrd + Clone> Bounds<T> {
    pub fn new(min: T, max: T, action: OutOfBoundsAction, default: T) -> Self {
        Self { min, max, action, default }
    }

    fn in_range(&self, value: &T) -> bool {
        *value >= self.min && *value <= self.max
    }

    fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min.clone()
        } else if value > self.max {
            self.max.clone()
        } else {
            value
        }
    }

    /// Applies the bounds policy to `value`. Returns `Ok(adjusted)` unless the
    /// action is `Discard` and the value is out of range, in which case
    /// `Err(PortError::OutOfBounds)`.
    pub fn apply(&self, value: T) -> Result<T> {
        if self.in_range(&value) {
            return Ok(value);
        }
        match self.action {
            OutOfBoundsAction::Discard => Err(PortError::OutOfBounds),
            OutOfBoundsAction::AdjustToRange => Ok(self.clamp(value)),
            OutOfBoundsAction::ApplyDefault => Ok(self.default.clone()),
        }
    }
}

/// A port that enforces numeric bounds on every publish.
///
/// Wraps a [`Port<T>`] rather than inheriting from it (spec.md §9: prefer a
/// plain wrapper/tagged-variant to a dynamic-dispatch inheritance tree), so
/// `Port<T>` itself stays free of a `PartialOrd` bound for ports that never
/// need bounds.
pub struct BoundedPort<T: PartialOrd + Clone + Send + Sync + 'static> {
    inner: std::sync::Arc<Port<T>>,
    bounds: Bounds<T>,
    bounds_locked: AtomicBool,
}

impl<T: PartialOrd + Clone + Send + Sync + 'static> BoundedPort<T> {
    pub fn new(info: PortCreationInfo<T>, bounds: Bounds<T>) -> Self {
        Self {
            inner: Port::new_cheap(info, PoolCapacity::default()),
            bounds,
            bounds_locked: AtomicBool::new(false),
        }
    }

    /// The underlying port, for operations bounds checking doesn't touch
    /// (`Get`, `AddListener`, connection wiring).
    pub fn inner(&self) -> &std::sync::Arc<Port<T>> {
        &self.inner
    }

    pub fn bounds(&self) -> &Bounds<T> {
        &self.bounds
    }

    /// Changes the bounds. Per §4.4, this only takes effect before the port
    /// has been marked ready; afterward it logs a warning and no-ops.
    pub fn set_bounds(&mut self, bounds: Bounds<T>) {
        if self.bounds_locked.load(Ordering::Acquire) {
            tracing::warn!(
                port = %self.inner.name(),
                "SetBounds called after initialization; ignoring"
            );
            return;
        }
        self.bounds = bounds;
        let current = self.inner.get().0;
        if !self.bounds.in_range(&current) {
            let republished = self
                .bounds
                .apply(current)
                .unwrap_or_else(|_| self.bounds.default.clone());
            let _ = self.inner.browser_publish(republished);
        }
    }

    /// Publishes `value`, applying the bounds policy first.
    pub fn publish(&self, value: T) -> Result<()> {
        let adjusted = self.bounds.apply(value)?;
        self.inner.publish(adjusted, ChangeConstant::Normal)
    }

    pub fn mark_ready(&self) {
        self.bounds_locked.store(true, Ordering::Release);
        self.inner.mark_ready();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::core::PortFlags;

    #[test]
    fn adjust_clamps_into_range() {
        let bounds = Bounds::new(0i32, 10, OutOfBoundsAction::AdjustToRange, 5);
        assert_eq!(bounds.apply(15).unwrap(), 10);
        assert_eq!(bounds.apply(-3).unwrap(), 0);
        assert_eq!(bounds.apply(5).unwrap(), 5);
    }

    #[test]
    fn discard_rejects_out_of_range() {
        let bounds = Bounds::new(0i32, 10, OutOfBoundsAction::Discard, 5);
        assert!(bounds.apply(15).is_err());
        assert_eq!(bounds.apply(5).unwrap(), 5);
    }

    #[test]
    fn apply_default_substitutes() {
        let bounds = Bounds::new(0i32, 10, OutOfBoundsAction::ApplyDefault, 7);
        assert_eq!(bounds.apply(99).unwrap(), 7);
    }

    #[test]
    fn set_bounds_after_mark_ready_is_ignored() {
        let mut port = BoundedPort::new(
            PortCreationInfo::new("p", PortFlags::default()),
            Bounds::new(0i32, 10, OutOfBoundsAction::AdjustToRange, 0),
        );
        port.mark_ready();
        port.set_bounds(Bounds::new(0i32, 1000, OutOfBoundsAction::AdjustToRange, 0));
        assert_eq!(port.bounds().max, 10, "bounds_locked should reject changes once mark_ready has run");
    }

    #[test]
    fn set_bounds_before_mark_ready_applies() {
        let mut port = BoundedPort::new(
            PortCreationInfo::new("p", PortFlags::default()),
            Bounds::new(0i32, 10, OutOfBoundsAction::AdjustToRange, 0),
        );
        port.set_bounds(Bounds::new(0i32, 1000, OutOfBoundsAction::AdjustToRange, 0));
        assert_eq!(port.bounds().max, 1000);
    }
}
