// benches/port_bench.rs
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dataport::pool::config::PoolCapacity;
use dataport::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

fn flags(push: bool) -> PortFlags {
    PortFlags {
        push_strategy: push,
        ..Default::default()
    }
}

fn cheap_port(push: bool) -> Arc<Port<i32>> {
    Port::new_cheap(PortCreationInfo::new("bench", flags(push)), PoolCapacity::default())
}

fn standard_port(push: bool) -> Arc<Port<i32>> {
    Port::new_standard(PortCreationInfo::new("bench", flags(push)), PoolCapacity::default())
}

fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("port_publish");

    group.bench_function("cheap_unconnected", |b| {
        let port = cheap_port(false);
        port.mark_ready();
        b.iter(|| {
            port.publish(black_box(42), ChangeConstant::Normal).unwrap();
        });
    });

    group.bench_function("standard_unconnected", |b| {
        let port = standard_port(false);
        port.mark_ready();
        b.iter(|| {
            port.publish(black_box(42), ChangeConstant::Normal).unwrap();
        });
    });

    group.finish();
}

fn bench_push_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("port_push_chain");

    for hops in [1usize, 4, 16].iter() {
        group.bench_with_input(BenchmarkId::new("publish_through_chain", hops), hops, |b, &hops| {
            let ports: Vec<_> = (0..=hops)
                .map(|i| cheap_port(i == hops))
                .collect();
            for p in &ports {
                p.mark_ready();
            }
            for window in ports.windows(2) {
                connect(&window[0], &window[1]);
            }
            let head = ports.first().unwrap();
            let tail = ports.last().unwrap();

            b.iter(|| {
                head.publish(black_box(7), ChangeConstant::Normal).unwrap();
                black_box(tail.get().0);
            });
        });
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("port_get");

    group.bench_function("get_stable_value", |b| {
        let port = cheap_port(false);
        port.mark_ready();
        port.publish(1, ChangeConstant::Normal).unwrap();
        b.iter(|| black_box(port.get().0));
    });

    group.finish();
}

fn bench_pull(c: &mut Criterion) {
    let mut group = c.benchmark_group("port_pull");

    group.bench_function("pull_single_source", |b| {
        let source = cheap_port(false);
        let sink = cheap_port(false);
        source.mark_ready();
        sink.mark_ready();
        Port::connect(&source, &sink);
        source.publish(5, ChangeConstant::Normal).unwrap();

        b.iter(|| {
            black_box(dataport::pull(&sink, false));
        });
    });

    group.finish();
}

fn bench_numeric_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("numeric_codec");

    group.bench_function("encode_decode_int32", |b| {
        b.iter(|| {
            let mut buf = Buffer::new(16);
            dataport::numeric::encode(&mut buf, Number::Int32(black_box(123456)), None).unwrap();
            buf.set_pos(0).unwrap();
            black_box(dataport::numeric::decode(&mut buf).unwrap());
        });
    });

    group.bench_function("encode_decode_immediate", |b| {
        b.iter(|| {
            let mut buf = Buffer::new(16);
            dataport::numeric::encode(&mut buf, Number::Int64(black_box(3)), None).unwrap();
            buf.set_pos(0).unwrap();
            black_box(dataport::numeric::decode(&mut buf).unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_publish,
    bench_push_chain,
    bench_get,
    bench_pull,
    bench_numeric_codec
);
criterion_main!(benches);
