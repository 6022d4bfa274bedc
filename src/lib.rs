// src/lib.rs
//! # dataport
//!
//! A lock-free real-time data-port publish/subscribe core: a current-value
//! slot per port backed by reference-counted, ABA-safe buffer pools, with
//! push/pull strategy propagation, bounded input queues, change listeners,
//! value bounds enforcement, and a type-erased facade for runtime-typed
//! callers.
//!
//! Features:
//! - Lock-free current-value publishing via ABA-safe tagged pointers
//! - Two-tier (thread-local + global) buffer pools for cheaply copied types,
//!   and a mutex-guarded pool for standard types
//! - Push/pull strategy propagation across the connection graph, mutated
//!   under a single global structure mutex
//! - Bounded input queues (FIFO or dequeue-all) with overflow policies
//! - Value bounds enforcement (adjust/discard/apply-default) via [`port::BoundedPort`]
//! - A type-erased [`port::GenericPort`] facade for runtime-typed boundaries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::missing_safety_doc)]

pub mod buffer;
pub mod connection;
pub mod error;
pub mod numeric;
pub mod pool;
pub mod port;
pub mod pull;

pub use buffer::Buffer;
pub use connection::{connect, connect_with_conversion, disconnect, PortGroup};
pub use error::{PortError, Result};
pub use numeric::Number;
pub use port::{
    BoundedPort, Bounds, ChangeConstant, ChangeContext, FnListener, GenericLocked, GenericPort,
    OutOfBoundsAction, Port, PortCreationInfo, PortFlags, PortId, PortListener,
};
pub use pull::pull;

/// Commonly used imports.
pub mod prelude {
    pub use crate::buffer::Buffer;
    pub use crate::connection::{connect, connect_with_conversion, disconnect, PortGroup};
    pub use crate::error::{PortError, Result};
    pub use crate::numeric::Number;
    pub use crate::port::{
        BoundedPort, Bounds, ChangeConstant, ChangeContext, FnListener, GenericPort,
        OutOfBoundsAction, Port, PortCreationInfo, PortFlags, PortId, PortListener,
    };
    pub use crate::pull::pull;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::pool::config::PoolCapacity;

    fn flags(push: bool) -> PortFlags {
        PortFlags {
            push_strategy: push,
            ..Default::default()
        }
    }

    #[test]
    fn publish_and_get_roundtrip() {
        let port = Port::new_cheap(
            PortCreationInfo::new("x", flags(false)),
            PoolCapacity::default(),
        );
        port.mark_ready();
        port.publish(7, ChangeConstant::Normal).unwrap();
        assert_eq!(port.get().0, 7);
    }

    #[test]
    fn connect_then_publish_forwards_downstream() {
        let source = Port::new_cheap(
            PortCreationInfo::new("source", flags(false)),
            PoolCapacity::default(),
        );
        let sink = Port::new_cheap(
            PortCreationInfo::new("sink", flags(true)),
            PoolCapacity::default(),
        );
        source.mark_ready();
        sink.mark_ready();
        connect(&source, &sink);
        source.publish(5, ChangeConstant::Normal).unwrap();
        assert_eq!(sink.get().0, 5);
    }

    #[test]
    fn numeric_wire_format_roundtrips() {
        let mut buf = Buffer::new(16);
        crate::numeric::encode(&mut buf, Number::Int32(123), None).unwrap();
        buf.set_pos(0).unwrap();
        let (value, unit) = crate::numeric::decode(&mut buf).unwrap();
        assert_eq!(value, Number::Int32(123));
        assert_eq!(unit, None);
    }
}
