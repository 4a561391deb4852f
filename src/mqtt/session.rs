//! Connection lifecycle and event dispatch.
//!
//! A [`Session`] owns the transport, the application handler and all mutable
//! protocol state. The transport driver calls the `on_*` methods from its
//! callbacks; the application calls [`Session::connect`],
//! [`Session::subscribe`] and friends. Both sides run on one thread and are
//! never re-entered, so no locking is involved.

use heapless::Vec;

use super::config::Config;
use super::error::Error;
use super::packet::{self, ConnectReturnCode, PacketType, QoS};
use super::parser::{self, Incoming};
use super::response::{Response, Status};
use super::MAX_PACKET_LEN;
use crate::network::{self, Open, Transport};

/// Capacity of the inbound reassembly buffer.
pub const RX_BUFFER_LEN: usize = MAX_PACKET_LEN;

/// Bytes pulled from the transport per [`Session::poll`].
const POLL_CHUNK_LEN: usize = 256;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No MQTT session; the initial state.
    Disconnected,
    /// CONNECT sent, waiting for the server's CONNACK.
    AwaitingConnAck,
    /// CONNACK accepted.
    Connected,
}

/// Receives every event the session produces.
///
/// Closures taking `&Response` implement this trait.
pub trait Handler {
    /// Handle one event. The response must not be retained past the call.
    fn on_event(&mut self, response: &Response);
}

impl<F> Handler for F
where
    F: FnMut(&Response),
{
    fn on_event(&mut self, response: &Response) {
        self(response)
    }
}

/// An MQTT 3.1.1 client session.
///
/// # Examples
///
/// ```rust
/// use libmqtt::mqtt::{Config, Response, Session, State, Status};
/// use libmqtt::network::{Error, Open, Transport};
///
/// #[derive(Default)]
/// struct Loopback {
///     sent: usize,
/// }
///
/// impl Transport for Loopback {
///     fn open(&mut self, _host: &str, _port: u16) -> Result<Open, Error> {
///         Ok(Open::Established)
///     }
///     fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
///         self.sent += bytes.len();
///         Ok(())
///     }
///     fn close(&mut self) -> Result<(), Error> {
///         Ok(())
///     }
/// }
///
/// let config = Config::new("10.0.0.1", 1883, "dev1").unwrap();
/// let mut last = None;
/// let handler = |r: &Response| last = Some(r.status);
/// let mut session = Session::new(config, Loopback::default(), handler);
///
/// session.connect().unwrap();
/// assert_eq!(session.state(), State::AwaitingConnAck);
///
/// session.on_received(&[0x20, 0x02, 0x00, 0x00]);
/// assert!(session.is_connected());
/// drop(session);
/// assert_eq!(last, Some(Status::ConnAck));
/// ```
pub struct Session<T: Transport, H: Handler> {
    config: Config,
    transport: T,
    handler: H,
    state: State,
    opening: bool,
    last_packet_id: u16,
    rx: Vec<u8, RX_BUFFER_LEN>,
    discard: usize,
    connack_elapsed_ms: u32,
}

impl<T: Transport, H: Handler> core::fmt::Debug for Session<T, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("opening", &self.opening)
            .field("last_packet_id", &self.last_packet_id)
            .field("buffered", &self.rx.len())
            .finish()
    }
}

impl<T: Transport, H: Handler> Session<T, H> {
    /// Create a disconnected session. Nothing is sent until [`connect`](Self::connect).
    pub fn new(config: Config, transport: T, handler: H) -> Self {
        Self {
            config,
            transport,
            handler,
            state: State::Disconnected,
            opening: false,
            last_packet_id: 0,
            rx: Vec::new(),
            discard: 0,
            connack_elapsed_ms: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the server has accepted the connection.
    pub fn is_connected(&self) -> bool {
        self.state == State::Connected
    }

    /// The session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Borrow the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutably borrow the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Open the transport and start the MQTT handshake.
    ///
    /// With a transport that reports [`Open::Established`] the CONNECT packet
    /// is sent before this returns; otherwise it is sent from
    /// [`on_connected`](Self::on_connected).
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidState`] - the session is not disconnected, or an
    ///   earlier open is still pending
    /// * [`Error::Transport`] - the transport refused to open or send
    pub fn connect(&mut self) -> Result<(), Error> {
        if self.state != State::Disconnected || self.opening {
            return Err(Error::InvalidState);
        }

        info!("opening {}:{}", self.config.host.as_str(), self.config.port);
        match self.transport.open(&self.config.host, self.config.port)? {
            Open::Established => self.send_connect(),
            Open::Pending => {
                self.opening = true;
                Ok(())
            }
        }
    }

    /// Subscribe to a single topic filter.
    ///
    /// Returns the packet identifier carried by the SUBSCRIBE; the matching
    /// SUBACK is reported as [`Status::SubAck`] or [`Status::SubNack`].
    ///
    /// # Errors
    ///
    /// * [`Error::NotConnected`] - the session is not connected; nothing is sent
    /// * [`Error::EmptyTopic`] / [`Error::StringTooLong`] / [`Error::PacketOverflow`]
    /// * [`Error::Transport`] - the send failed
    pub fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<u16, Error> {
        if self.state != State::Connected {
            debug!("subscribe dropped in state {:?}", self.state);
            return Err(Error::NotConnected);
        }

        let packet_id = self.next_packet_id();
        let packet = packet::build_subscribe(packet_id, topic, qos)?;
        self.send(&packet)?;
        debug!("SUBSCRIBE id {} sent", packet_id);
        Ok(packet_id)
    }

    /// Reserved: outgoing PUBLISH is not implemented by this core.
    ///
    /// # Errors
    ///
    /// Always [`Error::Unsupported`]. The wire format is available through
    /// [`build_publish`](super::packet::build_publish).
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        let _ = (topic, payload);
        Err(Error::Unsupported)
    }

    /// Send DISCONNECT if connected, then close the transport.
    ///
    /// No event is delivered for a locally requested disconnect.
    pub fn disconnect(&mut self) -> Result<(), Error> {
        let sent = if self.state == State::Connected {
            packet::build_disconnect().and_then(|packet| self.send(&packet))
        } else {
            Ok(())
        };
        let closed = self.transport.close();
        self.transition(State::Disconnected);
        sent?;
        closed.map_err(Error::from)
    }

    /// Transport callback: the link is up.
    ///
    /// Sends CONNECT and moves to [`State::AwaitingConnAck`]. A send failure
    /// is reported through the handler. Ignored unless [`connect`](Self::connect)
    /// left an open pending.
    pub fn on_connected(&mut self) {
        if self.state != State::Disconnected || !self.opening {
            warn!("unrequested link up in state {:?}, ignored", self.state);
            return;
        }
        self.opening = false;
        if let Err(err) = self.send_connect() {
            warn!("CONNECT failed: {:?}", err);
            let status = match err {
                Error::Transport(e) => Status::from(e),
                _ => Status::ConnectFailed,
            };
            self.transition(State::Disconnected);
            self.deliver(&Response::new(status));
        }
    }

    /// Transport callback: the link went down.
    pub fn on_disconnected(&mut self) {
        info!("link down");
        self.transition(State::Disconnected);
        self.deliver(&Response::new(Status::Disconnected));
    }

    /// Transport callback: a previously handed-over packet left the device.
    pub fn on_sent(&mut self) {
        trace!("send complete");
    }

    /// Transport callback: the link failed.
    pub fn on_error(&mut self, err: network::Error) {
        warn!("transport error: {:?}", err);
        self.transition(State::Disconnected);
        self.deliver(&Response::new(Status::from(err)));
    }

    /// Transport callback: bytes arrived.
    ///
    /// Bytes are buffered until complete packets are available; every complete
    /// packet is dispatched as exactly one event. A packet declaring more than
    /// [`RX_BUFFER_LEN`] bytes produces one [`Status::BufferOverflow`] and its
    /// bytes are skipped as they arrive.
    ///
    /// Framing cannot resume after an over-long remaining-length field, so one
    /// [`Status::Malformed`] is delivered and every byte buffered so far is
    /// dropped, including packets that followed it in the same chunk. Bytes
    /// buffered behind a packet that ends the session (server DISCONNECT or a
    /// refused CONNACK) are dropped without events.
    pub fn on_received(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            if self.discard > 0 {
                let skip = self.discard.min(bytes.len());
                self.discard -= skip;
                bytes = &bytes[skip..];
                continue;
            }

            let room = self.rx.capacity() - self.rx.len();
            let take = room.min(bytes.len());
            // Cannot fail: `take` fits the free capacity.
            let _ = self.rx.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];

            self.drain_frames();
        }
    }

    /// Decode and dispatch exactly one complete frame.
    ///
    /// Decode failures are delivered as [`Status::Malformed`] or
    /// [`Status::BufferOverflow`], never as a stale event.
    pub fn dispatch(&mut self, frame: &[u8]) {
        let (response, next) = respond(self.state, frame);
        self.apply(response, next);
    }

    /// Advance the CONNACK timer by `elapsed_ms`.
    ///
    /// When the configured timeout passes without a CONNACK the transport is
    /// closed and [`Status::ConnectTimeout`] is delivered.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.state != State::AwaitingConnAck {
            return;
        }
        self.connack_elapsed_ms = self.connack_elapsed_ms.saturating_add(elapsed_ms);
        if self.connack_elapsed_ms < self.config.connack_timeout_ms {
            return;
        }

        warn!("no CONNACK after {} ms", self.connack_elapsed_ms);
        self.close_transport();
        self.transition(State::Disconnected);
        self.deliver(&Response::new(Status::ConnectTimeout));
    }

    /// Pull available bytes from the transport and dispatch them.
    ///
    /// For transports that implement [`Transport::receive`]. Returns the number
    /// of bytes read; zero means nothing was available.
    pub fn poll(&mut self) -> Result<usize, Error> {
        let mut chunk = [0u8; POLL_CHUNK_LEN];
        let n = self.transport.receive(&mut chunk)?;
        if n > 0 {
            self.on_received(&chunk[..n]);
        }
        Ok(n)
    }

    fn send_connect(&mut self) -> Result<(), Error> {
        let packet = packet::build_connect(&self.config.client_id)?;
        self.send(&packet)?;
        self.transition(State::AwaitingConnAck);
        Ok(())
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), Error> {
        trace!("sending {} bytes", packet.len());
        self.transport.send(packet).map_err(Error::from)
    }

    /// Pre-increment the packet identifier, skipping zero on wrap.
    ///
    /// Identifiers still awaiting acknowledgment are not tracked.
    fn next_packet_id(&mut self) -> u16 {
        self.last_packet_id = self.last_packet_id.wrapping_add(1);
        if self.last_packet_id == 0 {
            self.last_packet_id = 1;
        }
        self.last_packet_id
    }

    fn drain_frames(&mut self) {
        loop {
            match parser::frame_len(&self.rx) {
                Ok(None) => return,
                Ok(Some(len)) if len > RX_BUFFER_LEN => {
                    warn!("inbound packet of {} bytes exceeds buffer", len);
                    self.discard = len - self.rx.len();
                    self.rx.clear();
                    self.deliver(&Response::new(Status::BufferOverflow));
                    return;
                }
                Ok(Some(len)) if len > self.rx.len() => return,
                Ok(Some(len)) => {
                    let (response, next) = respond(self.state, &self.rx[..len]);
                    self.rx.copy_within(len.., 0);
                    self.rx.truncate(self.rx.len() - len);
                    self.apply(response, next);
                }
                Err(err) => {
                    warn!("dropping {} buffered bytes: {:?}", self.rx.len(), err);
                    self.rx.clear();
                    self.deliver(&Response::new(Status::Malformed));
                    return;
                }
            }
        }
    }

    fn apply(&mut self, response: Response, next: Option<State>) {
        if let Status::ConnNack(_code) = response.status {
            warn!("CONNECT refused: {:?}", _code);
            self.close_transport();
        }
        if let Some(next) = next {
            self.transition(next);
        }
        self.deliver(&response);
    }

    fn close_transport(&mut self) {
        if let Err(_err) = self.transport.close() {
            warn!("transport close failed: {:?}", _err);
        }
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            debug!("state {:?} -> {:?}", self.state, next);
        }
        if next == State::Disconnected {
            self.rx.clear();
            self.discard = 0;
            self.opening = false;
        }
        self.state = next;
        self.connack_elapsed_ms = 0;
    }

    fn deliver(&mut self, response: &Response) {
        debug!("event {:?}", response.status);
        self.handler.on_event(response);
    }
}

/// Decode `frame` in `state` into the event to deliver and the state to move to.
fn respond(state: State, frame: &[u8]) -> (Response, Option<State>) {
    let incoming = match parser::decode(frame) {
        Ok(incoming) => incoming,
        Err(Error::TopicOverflow | Error::PayloadOverflow) => {
            return (Response::new(Status::BufferOverflow), None);
        }
        Err(_err) => {
            debug!("malformed packet: {:?}", _err);
            return (Response::new(Status::Malformed), None);
        }
    };

    match incoming {
        Incoming::ConnAck { return_code, .. } if state == State::AwaitingConnAck => {
            if return_code == ConnectReturnCode::Accepted {
                (Response::new(Status::ConnAck), Some(State::Connected))
            } else {
                (
                    Response::new(Status::ConnNack(return_code)),
                    Some(State::Disconnected),
                )
            }
        }
        Incoming::ConnAck { .. } => (Response::new(Status::Unhandled(PacketType::ConnAck)), None),
        Incoming::Publish(publish) => (Response::from_publish(&publish), None),
        Incoming::SubAck(None) => (Response::new(Status::SubNack), None),
        Incoming::SubAck(Some(ack)) => {
            let status = match ack.granted() {
                Some(granted) => Status::SubAck {
                    packet_id: ack.packet_id,
                    granted,
                },
                None => Status::SubNack,
            };
            let mut response = Response::new(status);
            response.packet_id = Some(ack.packet_id);
            (response, None)
        }
        Incoming::Disconnect => (
            Response::new(Status::Disconnected),
            Some(State::Disconnected),
        ),
        Incoming::Unhandled(packet_type) => (Response::new(Status::Unhandled(packet_type)), None),
    }
}
