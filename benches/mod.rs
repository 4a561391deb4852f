use criterion::{criterion_group, criterion_main};

mod mqtt;

criterion_group!(
    benches,
    mqtt::codec::bench_remaining_length,
    mqtt::codec::bench_build_connect,
    mqtt::codec::bench_build_subscribe,
    mqtt::codec::bench_decode_publish,
    mqtt::session::bench_on_received
);
criterion_main!(benches);
