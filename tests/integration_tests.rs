// tests/integration_tests.rs
//! End-to-end scenarios spanning the buffer, pool, port, connection, pull and
//! numeric-wire-format modules together.

use dataport::pool::config::PoolCapacity;
use dataport::prelude::*;

fn flags(push: bool) -> PortFlags {
    PortFlags {
        push_strategy: push,
        ..Default::default()
    }
}

fn port(name: &str, push: bool, default: i32) -> std::sync::Arc<Port<i32>> {
    let mut info = PortCreationInfo::new(name, flags(push));
    info.default_value = default;
    Port::new_cheap(info, PoolCapacity::default())
}

/// A push chain O -> X -> I, where only I requires pushing, propagates the
/// push requirement all the way back to O and delivers published values
/// end-to-end without any pull.
#[test]
fn basic_push_chain_delivers_end_to_end() {
    let o = port("O", false, 0);
    let x = port("X", false, 0);
    let i = port("I", true, 0);
    o.mark_ready();
    x.mark_ready();
    i.mark_ready();

    connect(&o, &x);
    connect(&x, &i);

    assert!(o.strategy() >= 1, "push requirement should propagate upstream through X to O");

    o.publish(42, ChangeConstant::Normal).unwrap();
    assert_eq!(i.get().0, 42);
    assert!(i.has_changed());
}

/// Connecting a push-requiring target to an already-populated source pushes
/// the source's current value immediately, without waiting for the next publish.
#[test]
fn connecting_push_target_delivers_initial_value() {
    let source = port("source", false, 0);
    source.mark_ready();
    source.publish(11, ChangeConstant::Normal).unwrap();

    let target = port("target", true, 0);
    target.mark_ready();

    connect(&source, &target);
    assert_eq!(target.get().0, 11, "newly connected push target should receive the current value");
}

/// A bounded port configured to clamp out-of-range values delivers the
/// clamped value, not the raw published one.
#[test]
fn bounded_port_adjusts_out_of_range_value() {
    let bounded = BoundedPort::new(
        {
            let mut info = PortCreationInfo::new("bounded", flags(false));
            info.default_value = 0;
            info
        },
        Bounds::new(0, 100, OutOfBoundsAction::AdjustToRange, 0),
    );
    bounded.mark_ready();
    bounded.publish(500).unwrap();
    assert_eq!(bounded.inner().get().0, 100);
}

/// A dequeue-all input queue keeps only the most recent batch when more
/// values are enqueued than its capacity.
#[test]
fn dequeue_all_queue_drops_oldest_on_overflow() {
    let mut info = PortCreationInfo::new("queued", flags(false));
    info.default_value = 0;
    info.queue_size = Some(2);
    info.dequeue_all = true;
    let queued = Port::new_standard(info, PoolCapacity::default());
    queued.mark_ready();

    queued.publish(1, ChangeConstant::Normal).unwrap();
    queued.publish(2, ChangeConstant::Normal).unwrap();
    queued.publish(3, ChangeConstant::Normal).unwrap();

    let drained = queued.dequeue_all().unwrap();
    assert_eq!(drained, vec![2, 3]);
}

/// Pulling a port with no local handler and no incoming connection returns
/// its current value unchanged.
#[test]
fn pull_without_handler_or_source_returns_current_value() {
    let p = port("isolated", false, 9);
    p.mark_ready();
    let (value, _) = dataport::pull(&p, false);
    assert_eq!(value, 9);
}

/// A change listener observes the value and timestamp through the lock
/// handle for as long as it holds it, independent of subsequent publishes.
#[test]
fn change_listener_observes_published_value() {
    use std::sync::{Arc, Mutex};

    let observed = Arc::new(Mutex::new(Vec::new()));
    let p = port("listened", false, 0);
    p.mark_ready();

    let sink = Arc::clone(&observed);
    p.add_listener(Arc::new(FnListener::new(move |ctx: &ChangeContext<i32>| {
        sink.lock().unwrap().push(*ctx.value());
    })));

    p.publish(1, ChangeConstant::Normal).unwrap();
    p.publish(2, ChangeConstant::Normal).unwrap();

    assert_eq!(*observed.lock().unwrap(), vec![1, 2]);
}

/// Disconnecting a port configured with `default_on_disconnect` republishes
/// its default value.
#[test]
fn disconnect_with_default_on_disconnect_republishes_default() {
    let source = port("source2", false, 0);
    source.mark_ready();
    source.publish(77, ChangeConstant::Normal).unwrap();

    let mut info = PortCreationInfo::new("target2", flags(true));
    info.default_value = -1;
    info.flags.default_on_disconnect = true;
    let target = Port::new_cheap(info, PoolCapacity::default());
    target.mark_ready();

    connect(&source, &target);
    assert_eq!(target.get().0, 77);

    disconnect(&source, &target);
    assert_eq!(target.get().0, -1);
}

/// The numeric wire format round-trips through a `GenericPort` the same way
/// it does for a raw `Buffer`.
#[test]
fn generic_port_numeric_roundtrip() {
    use dataport::pool::byteclass::ByteClassPools;
    use std::sync::Arc;

    let pools = Arc::new(ByteClassPools::new(dataport::pool::config::PoolConfig::default()));
    let generic = GenericPort::new("generic", pools);
    generic.mark_ready();

    generic.publish_number(Number::Float64(2.5), Some(3)).unwrap();
    let (value, unit) = generic.get_number().unwrap();
    assert_eq!(value, Number::Float64(2.5));
    assert_eq!(unit, Some(3));
}

/// A push-requiring port with more than one incoming connection does not
/// receive the one-shot initial push on a newly formed connection
/// (`CHANGED_INITIAL`'s fan-in ≤ 1 guard, spec.md §4.2 `WantsPush<CHANGE>`).
#[test]
fn fan_in_greater_than_one_suppresses_initial_push() {
    let a = port("a", false, 0);
    let b = port("b", false, 0);
    let sink = port("sink", true, -1);
    a.mark_ready();
    b.mark_ready();
    sink.mark_ready();

    a.publish(1, ChangeConstant::Normal).unwrap();
    connect(&a, &sink);
    assert_eq!(sink.get().0, 1, "single incoming connection still gets the initial push");

    b.publish(2, ChangeConstant::Normal).unwrap();
    connect(&b, &sink);
    assert_eq!(
        sink.get().0,
        1,
        "second incoming connection must not trigger an initial push once fan-in > 1"
    );
    assert!(!sink.wants_push(ChangeConstant::Initial));
}

/// A change listener that retains the owning [`ChangeContext`] handle keeps
/// the published buffer alive (and readable) past the publish call and
/// across further publishes, only releasing it back to the pool when the
/// handle itself is dropped (spec.md §5: "a listener may extend the lock
/// lifetime by taking an owning handle").
#[test]
fn listener_retaining_handle_extends_buffer_lifetime() {
    use std::sync::{Arc, Mutex};

    let held: Arc<Mutex<Vec<ChangeContext<i32>>>> = Arc::new(Mutex::new(Vec::new()));
    let p = port("held", false, 0);
    p.mark_ready();

    let sink = Arc::clone(&held);
    p.add_listener(Arc::new(FnListener::new(move |ctx: &ChangeContext<i32>| {
        sink.lock().unwrap().push(ctx.clone());
    })));

    p.publish(1, ChangeConstant::Normal).unwrap();
    p.publish(2, ChangeConstant::Normal).unwrap();
    p.publish(3, ChangeConstant::Normal).unwrap();

    let captured = held.lock().unwrap();
    assert_eq!(captured.len(), 3);
    assert_eq!(*captured[0].value(), 1, "oldest handle still reads its own buffer's value");
    assert_eq!(*captured[1].value(), 2);
    assert_eq!(*captured[2].value(), 3);
}
