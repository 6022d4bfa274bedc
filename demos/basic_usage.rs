// demos/basic_usage.rs
//! Basic usage example of the data-port module.

use dataport::pool::config::PoolCapacity;
use dataport::prelude::*;

fn flags(push: bool) -> PortFlags {
    PortFlags {
        push_strategy: push,
        ..Default::default()
    }
}

fn main() -> Result<()> {
    println!("=== Basic Port Publish/Get ===\n");

    let temperature = Port::new_cheap(
        PortCreationInfo::new("temperature", flags(false)),
        PoolCapacity::default(),
    );
    temperature.mark_ready();
    temperature.publish(21, ChangeConstant::Normal)?;
    println!("temperature = {}", temperature.get().0);

    println!("\n=== Push Chain (sensor -> filter -> display) ===\n");

    let sensor = Port::new_cheap(PortCreationInfo::new("sensor", flags(false)), PoolCapacity::default());
    let filter = Port::new_cheap(PortCreationInfo::new("filter", flags(false)), PoolCapacity::default());
    let display = Port::new_cheap(PortCreationInfo::new("display", flags(true)), PoolCapacity::default());
    sensor.mark_ready();
    filter.mark_ready();
    display.mark_ready();

    connect(&sensor, &filter);
    connect(&filter, &display);

    sensor.publish(72, ChangeConstant::Normal)?;
    println!("display received: {}", display.get().0);

    println!("\n=== Bounded Port ===\n");

    let setpoint = BoundedPort::new(
        PortCreationInfo::new("setpoint", flags(false)),
        Bounds::new(0, 100, OutOfBoundsAction::AdjustToRange, 50),
    );
    setpoint.mark_ready();
    setpoint.publish(150)?;
    println!("setpoint clamped to: {}", setpoint.inner().get().0);

    println!("\n=== Pull Without a Source ===\n");

    let isolated = Port::new_cheap(PortCreationInfo::new("isolated", flags(false)), PoolCapacity::default());
    isolated.mark_ready();
    let (value, timestamp) = pull(&isolated, false);
    println!("pulled {} at tick {}", value, timestamp);

    Ok(())
}
