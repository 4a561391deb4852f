//! MQTT 3.1.1 codec and client session for constrained devices.
//!
//! The module is split along the path a packet takes:
//!
//! - [`codec`]: remaining-length integers, length-prefixed strings and the
//!   bit-packed header bytes
//! - [`packet`]: packet identifiers and the outbound builders
//! - [`parser`]: inbound frame decoding
//! - [`response`]: the event values handed to the application
//! - [`session`]: the connection state machine tying it all to a
//!   [`Transport`](crate::network::Transport)
//!
//! # Protocol coverage
//!
//! Outbound: CONNECT (clean session, no will or credentials), SUBSCRIBE and
//! DISCONNECT from the session; PUBLISH and PUBACK encoders are available as
//! plain builders. Inbound: CONNACK, PUBLISH (any QoS framing), SUBACK and
//! DISCONNECT. Other packet types are reported as
//! [`Status::Unhandled`]. QoS 1/2 acknowledgment, retransmission and
//! persistent sessions are out of scope.
//!
//! # Buffers
//!
//! Topics are capped at [`MAX_TOPIC_LEN`] bytes and payloads at
//! [`MAX_PAYLOAD_LEN`] bytes. Inbound packets declaring more are rejected
//! before any copy with [`Status::BufferOverflow`].

pub mod codec;
pub mod config;
pub mod error;
pub mod packet;
pub mod parser;
pub mod response;
pub mod session;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::Error;
pub use packet::{ConnectReturnCode, Packet, PacketType, QoS};
pub use response::{Response, Status};
pub use session::{Handler, Session, State};

/// Capacity of [`Response::topic`].
pub const MAX_TOPIC_LEN: usize = 100;

/// Capacity of [`Response::payload`].
pub const MAX_PAYLOAD_LEN: usize = 2048;

/// Longest client identifier MQTT 3.1.1 servers must accept.
pub const MAX_CLIENT_ID_LEN: usize = 23;

/// Keep-alive interval announced in CONNECT, in seconds.
pub const KEEP_ALIVE_SECS: u16 = 60;

/// Capacity of one encoded packet: fixed header, a maximal topic and
/// packet identifier, and a maximal payload.
pub const MAX_PACKET_LEN: usize = 1 + 4 + 2 + MAX_TOPIC_LEN + 2 + MAX_PAYLOAD_LEN;
