// src/connection.rs
//! Connection bookkeeping and the global structure mutex.
//!
//! Grounded on `tRuntimeEnvironment`'s structure mutex: every mutation of the
//! connection graph (connect, disconnect, strategy propagation) runs with a
//! single process-wide lock held, so concurrent structural changes never
//! interleave (spec.md §5 "Connection/strategy mutations run under a single
//! global structure mutex"). Per-port value publishing is unaffected — it
//! stays lock-free/mutex-per-port as described in [`crate::port::core`].

use crate::port::core::Port;
use std::sync::{Arc, Mutex};

/// Global structure mutex: held for the duration of any call that mutates
/// the connection graph (connect/disconnect and the strategy propagation
/// that follows).
static STRUCTURE_MUTEX: Mutex<()> = Mutex::new(());

/// Connects `source` to `target`, running the connect + initial-push +
/// strategy-propagation sequence under the structure mutex.
pub fn connect<T: Clone + Send + Sync + 'static>(source: &Arc<Port<T>>, target: &Arc<Port<T>>) {
    let _guard = STRUCTURE_MUTEX.lock().unwrap();
    Port::connect(source, target);
}

/// Connects `source` to `target` with a value conversion applied on the edge.
pub fn connect_with_conversion<T: Clone + Send + Sync + 'static>(
    source: &Arc<Port<T>>,
    target: &Arc<Port<T>>,
    conversion: Arc<dyn Fn(&T) -> T + Send + Sync>,
) {
    let _guard = STRUCTURE_MUTEX.lock().unwrap();
    Port::connect_with_conversion(source, target, Some(conversion));
}

/// Disconnects `source` from `target`, running strategy propagation (and the
/// default-on-disconnect republish, if configured) under the structure mutex.
pub fn disconnect<T: Clone + Send + Sync + 'static>(source: &Arc<Port<T>>, target: &Arc<Port<T>>) {
    let _guard = STRUCTURE_MUTEX.lock().unwrap();
    Port::disconnect(source, target);
}

/// A small named collection of ports sharing a lifetime, for callers that
/// want to manage a related group (e.g. a component's inputs and outputs) as
/// a unit. Connections are tracked independently on each [`Port`]; this is
/// bookkeeping convenience, not a separate graph data structure.
pub struct PortGroup<T: Clone + Send + Sync + 'static> {
    ports: Vec<Arc<Port<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Default for PortGroup<T> {
    fn default() -> Self {
        Self { ports: Vec::new() }
    }
}

impl<T: Clone + Send + Sync + 'static> PortGroup<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, port: Arc<Port<T>>) {
        self.ports.push(port);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Port<T>>> {
        self.ports.iter()
    }

    pub fn find(&self, name: &str) -> Option<&Arc<Port<T>>> {
        self.ports.iter().find(|p| p.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::config::PoolCapacity;
    use crate::port::core::{PortCreationInfo, PortFlags};

    fn port(name: &str, push: bool) -> Arc<Port<i32>> {
        Port::new_cheap(
            PortCreationInfo {
                name: name.to_string(),
                flags: PortFlags {
                    push_strategy: push,
                    ..Default::default()
                },
                default_value: 0,
                queue_size: None,
                dequeue_all: false,
            },
            PoolCapacity::default(),
        )
    }

    #[test]
    fn connect_propagates_push_upstream() {
        let o = port("O", false);
        let i = port("I", true);
        o.mark_ready();
        i.mark_ready();
        connect(&o, &i);
        assert!(o.strategy() >= 1, "O must adopt I's push requirement");
    }

    #[test]
    fn disconnect_removes_edge_and_recomputes_strategy() {
        let o = port("O", false);
        let i = port("I", true);
        o.mark_ready();
        i.mark_ready();
        connect(&o, &i);
        disconnect(&o, &i);
        assert_eq!(i.incoming_count(), 0);
        assert!(o.strategy() < 1, "O's push requirement should drop once disconnected");
    }

    #[test]
    fn port_group_finds_by_name() {
        let mut group = PortGroup::new();
        group.add(port("a", false));
        group.add(port("b", false));
        assert!(group.find("b").is_some());
        assert!(group.find("c").is_none());
    }
}
