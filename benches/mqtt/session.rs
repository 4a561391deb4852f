use criterion::{Criterion, Throughput};
use libmqtt::mqtt::packet::build_publish;
use libmqtt::mqtt::{Config, QoS, Response, Session};
use libmqtt::network::{Error, Open, Transport};
use std::hint::black_box;

struct NullTransport;

impl Transport for NullTransport {
    fn open(&mut self, _host: &str, _port: u16) -> Result<Open, Error> {
        Ok(Open::Established)
    }

    fn send(&mut self, _bytes: &[u8]) -> Result<(), Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

pub fn bench_on_received(c: &mut Criterion) {
    let config = Config::new("10.0.0.1", 1883, "libmqtt-bench").unwrap();
    let mut received = 0usize;
    let mut session = Session::new(config, NullTransport, |r: &Response| received += r.len());
    session.connect().unwrap();
    session.on_received(&[0x20, 0x02, 0x00, 0x00]);

    let payload = [0xA5u8; 128];
    let frame =
        build_publish("libmqtt/bench", &payload, QoS::AtMostOnce, false, false, 0).unwrap();
    // a burst of frames split at an awkward boundary
    let stream: Vec<u8> = frame.iter().copied().cycle().take(frame.len() * 8).collect();
    let (head, tail) = stream.split_at(stream.len() / 3);

    let mut group = c.benchmark_group("session");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("on_received", |b| {
        b.iter(|| {
            session.on_received(black_box(head));
            session.on_received(black_box(tail));
        })
    });
    group.finish();
}
