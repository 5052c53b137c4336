//! Criterion-based whirl benchmark
//!
//! Run: cargo bench --bench bench_rings

use criterion::{ criterion_group, criterion_main, Criterion, Throughput };
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use whirl::{ BlockingRing, OverwritingRing, RecycleRing };

const RING_CAPACITY: usize = 4096;
const TOTAL_EVENTS: u64 = 1_000_000;

/// Blocking ring: producer and consumer threads moving a fixed event count
fn blocking_round_trip(events: u64) -> u64 {
    let ring = Arc::new(BlockingRing::<u64>::with_thresholds(RING_CAPACITY, 64, 64).unwrap());

    let ring_cons = ring.clone();
    let consumer = thread::spawn(move || {
        for _ in 0..events {
            black_box(ring_cons.pop().unwrap());
        }
    });

    for i in 0..events {
        ring.push(i).unwrap();
    }

    consumer.join().unwrap();
    events
}

/// Overwriting ring: free-running producer, draining consumer
fn overwriting_round_trip(events: u64) -> u64 {
    let ring = Arc::new(OverwritingRing::<u64>::new(RING_CAPACITY).unwrap());

    let ring_cons = ring.clone();
    let consumer = thread::spawn(move || {
        let mut received = 0u64;
        while let Ok(v) = ring_cons.pop() {
            black_box(v);
            received += 1;
        }
        received
    });

    for i in 1..=events {
        ring.push(i).unwrap();
    }
    ring.terminate();

    consumer.join().unwrap()
}

/// Recycle ring: slot-swap round trip with reused cells on both sides
fn recycle_round_trip(events: u64) -> u64 {
    let ring = Arc::new(RecycleRing::<Vec<u8>>::new(RING_CAPACITY).unwrap());

    let ring_cons = ring.clone();
    let consumer = thread::spawn(move || {
        let mut cell = Vec::with_capacity(64);
        let mut received = 0u64;
        loop {
            match ring_cons.pop_swap(cell) {
                Ok(taken) => {
                    black_box(taken.len());
                    cell = taken;
                    received += 1;
                }
                Err(_) => {
                    return received;
                }
            }
        }
    });

    let mut cell = vec![0u8; 64];
    for _ in 0..events {
        cell = ring.push_swap(cell).unwrap();
        if cell.capacity() == 0 {
            cell.reserve(64);
        }
    }
    ring.terminate();

    consumer.join().unwrap()
}

fn benchmark_ring_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("SPSC ring variants");
    group.throughput(Throughput::Elements(TOTAL_EVENTS));
    group.sample_size(20);

    group.bench_function("blocking (u64)", |b| {
        b.iter(|| blocking_round_trip(TOTAL_EVENTS))
    });

    group.bench_function("overwriting (u64)", |b| {
        b.iter(|| overwriting_round_trip(TOTAL_EVENTS))
    });

    group.bench_function("recycle (Vec<u8>)", |b| {
        b.iter(|| recycle_round_trip(TOTAL_EVENTS))
    });

    group.finish();
}

criterion_group!(benches, benchmark_ring_variants);
criterion_main!(benches);
