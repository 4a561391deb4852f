use criterion::{BatchSize, Criterion, Throughput};
use libmqtt::mqtt::codec::{decode_remaining_length, encode_remaining_length};
use libmqtt::mqtt::packet::{build_connect, build_publish, build_subscribe};
use libmqtt::mqtt::parser;
use libmqtt::mqtt::{MAX_PAYLOAD_LEN, QoS};
use rand::Rng;
use std::hint::black_box;

pub fn bench_remaining_length(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let mut group = c.benchmark_group("remaining_length");
    group.bench_function("encode_decode", |b| {
        b.iter_batched(
            || rng.gen_range(0..=268_435_455u32),
            |value| {
                let encoded = encode_remaining_length(black_box(value)).unwrap();
                decode_remaining_length(&encoded).unwrap()
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_build_connect(c: &mut Criterion) {
    c.bench_function("build_connect", |b| {
        b.iter(|| build_connect(black_box("libmqtt-bench")).unwrap())
    });
}

pub fn bench_build_subscribe(c: &mut Criterion) {
    c.bench_function("build_subscribe", |b| {
        b.iter(|| {
            build_subscribe(
                black_box(42),
                black_box("sensors/+/temperature"),
                QoS::AtMostOnce,
            )
            .unwrap()
        })
    });
}

pub fn bench_decode_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_publish");
    for size in [16usize, 256, MAX_PAYLOAD_LEN] {
        let payload = vec![0x5Au8; size];
        let frame =
            build_publish("libmqtt/bench", &payload, QoS::AtLeastOnce, false, false, 1).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("{size}"), |b| {
            b.iter(|| parser::decode(black_box(&frame)).unwrap())
        });
    }
    group.finish();
}
