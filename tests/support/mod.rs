#![allow(dead_code)]

use std::collections::VecDeque;

use libmqtt::mqtt::{Config, Handler, Response, Session, Status};
use libmqtt::network::{Error, Open, Transport};

/// In-memory transport that records every packet handed to it.
#[derive(Debug)]
pub struct MockTransport {
    pub open_result: Result<Open, Error>,
    pub fail_send: Option<Error>,
    pub opened: Option<(String, u16)>,
    pub opens: usize,
    pub sent: Vec<Vec<u8>>,
    pub inbound: VecDeque<Vec<u8>>,
    pub closes: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            open_result: Ok(Open::Established),
            fail_send: None,
            opened: None,
            opens: 0,
            sent: Vec::new(),
            inbound: VecDeque::new(),
            closes: 0,
        }
    }

    pub fn pending() -> Self {
        Self {
            open_result: Ok(Open::Pending),
            ..Self::new()
        }
    }

    pub fn sent_bytes(&self) -> usize {
        self.sent.iter().map(Vec::len).sum()
    }
}

impl Transport for MockTransport {
    fn open(&mut self, host: &str, port: u16) -> Result<Open, Error> {
        self.opened = Some((host.to_string(), port));
        self.opens += 1;
        self.open_result
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if let Some(err) = self.fail_send {
            return Err(err);
        }
        self.sent.push(bytes.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let Some(chunk) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.inbound.push_front(chunk[n..].to_vec());
        }
        Ok(n)
    }

    fn close(&mut self) -> Result<(), Error> {
        self.closes += 1;
        Ok(())
    }
}

/// Handler keeping a copy of every event.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Response>,
}

impl Recorder {
    pub fn statuses(&self) -> Vec<Status> {
        self.events.iter().map(|r| r.status).collect()
    }
}

impl Handler for Recorder {
    fn on_event(&mut self, response: &Response) {
        self.events.push(response.clone());
    }
}

pub type TestSession = Session<MockTransport, Recorder>;

pub const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

pub fn config() -> Config {
    Config::new("10.0.0.1", 1883, "dev1").unwrap()
}

pub fn session() -> TestSession {
    Session::new(config(), MockTransport::new(), Recorder::default())
}

/// A session that has completed the handshake, with the recorder cleared.
pub fn connected() -> TestSession {
    let mut session = session();
    session.connect().unwrap();
    session.on_received(&CONNACK_ACCEPTED);
    assert!(session.is_connected());
    session.handler_mut().events.clear();
    session.transport_mut().sent.clear();
    session
}
