// src/pull.rs
//! On-demand pull propagation (spec.md §4.6).
//!
//! Grounded on `common/tPullOperation.h`: a pull walks backward along
//! incoming connections until it finds a port with either a local pull
//! request handler or no further source, assigns the retrieved value into
//! every port along the path it traversed, and returns it.

use crate::port::core::Port;
use std::sync::Arc;

/// Pulls a fresh value into `port`, walking its incoming connections if it
/// has no local pull request handler (or `ignoring_local_handler` is set).
///
/// - If `port` is hijacked, pulling is equivalent to [`Port::get`] (spec.md
///   §4.6: "a hijacked port answers pulls from its own current value").
/// - If a local handler is installed (and not ignored) and it produces a
///   value, that value is assigned into `port` and returned.
/// - Otherwise, the pull recurses into the first incoming source. If that
///   source's value changed during the recursive pull (compared against
///   `port`'s own current slot), the fresh value is assigned into `port`.
/// - With no handler and no incoming connections, returns `port`'s unchanged
///   current value (spec.md §8 "Pull without handler returns the hijacked
///   port's / sourceless port's current value unchanged").
pub fn pull<T: Clone + Send + Sync + 'static>(port: &Arc<Port<T>>, ignoring_local_handler: bool) -> (T, u64) {
    if port.is_hijacked() {
        return port.get();
    }

    if !ignoring_local_handler {
        if let Some(value) = port.invoke_pull_handler() {
            let timestamp = port.assign_pub(value.clone());
            return (value, timestamp);
        }
    }

    let Some(source) = port.first_incoming() else {
        return port.get();
    };

    let (value, _) = pull(&source, false);
    let timestamp = port.assign_pub(value.clone());
    (value, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::config::PoolCapacity;
    use crate::port::core::{PortCreationInfo, PortFlags};

    fn port(name: &str, default: i32) -> Arc<Port<i32>> {
        Port::new_cheap(
            PortCreationInfo {
                name: name.to_string(),
                flags: PortFlags::default(),
                default_value: default,
                queue_size: None,
                dequeue_all: false,
            },
            PoolCapacity::default(),
        )
    }

    #[test]
    fn pull_with_no_source_returns_current_value() {
        let p = port("P", 7);
        p.mark_ready();
        let (value, _) = pull(&p, false);
        assert_eq!(value, 7);
    }

    #[test]
    fn pull_with_local_handler_assigns_returned_value() {
        let p = port("P", 0);
        p.mark_ready();
        p.set_pull_request_handler(|| Some(99));
        let (value, _) = pull(&p, false);
        assert_eq!(value, 99);
        assert_eq!(p.get().0, 99);
    }

    #[test]
    fn pull_walks_single_incoming_source() {
        let source = port("source", 5);
        let sink = port("sink", 0);
        source.mark_ready();
        sink.mark_ready();
        Port::connect(&source, &sink);
        source.publish(42, crate::port::core::ChangeConstant::Normal).unwrap();
        let (value, _) = pull(&sink, false);
        assert_eq!(value, 42);
    }

    #[test]
    fn pull_on_hijacked_port_returns_current_value_unchanged() {
        let p = port("P", 3);
        p.mark_ready();
        p.set_hijacked(true);
        let (value, _) = pull(&p, false);
        assert_eq!(value, 3);
    }
}
