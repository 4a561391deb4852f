//! # libmqtt - MQTT 3.1.1 core for IoT devices
//!
//! A small MQTT 3.1.1 client core for devices with a few kilobytes of RAM. It
//! turns application intents ("connect", "subscribe") into wire packets and
//! turns inbound bytes from a transport into typed events delivered to an
//! application handler. It does not own sockets: a [`network::Transport`]
//! implementation does, and calls back into the session.
//!
//! ## Features
//!
//! - Remaining-length codec, CONNECT/SUBSCRIBE/PUBLISH/PUBACK/DISCONNECT builders
//! - CONNACK/PUBLISH/SUBACK/DISCONNECT parsing with bounds-checked copies
//! - Connection state machine with a CONNACK timeout
//! - Fixed-size `heapless` buffers, no allocator required
//!
//! ## Usage
//!
//! ```rust,no_run
//! use libmqtt::mqtt::{Config, QoS, Response, Session, Status};
//! use libmqtt::network::StreamTransport;
//! # use libmqtt::network::{Close, Connect, Connection, Read, Write};
//! # struct Socket;
//! # impl Connection for Socket {}
//! # impl Read for Socket {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Socket {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for Socket {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Tcp;
//! # impl Connect for Tcp {
//! #     type Connection = Socket;
//! #     type Error = ();
//! #     fn connect(&mut self, _remote: &str) -> Result<Socket, ()> { Ok(Socket) }
//! # }
//!
//! let config = Config::new("192.168.1.10", 1883, "sensor01").unwrap();
//! let mut session = Session::new(config, StreamTransport::new(Tcp), |event: &Response| {
//!     if event.status == Status::ReceivedPublish {
//!         // event.topic(), event.payload()
//!     }
//! });
//!
//! session.connect().unwrap();
//! while !session.is_connected() {
//!     session.poll().unwrap();
//!     session.tick(10);
//! }
//! session.subscribe("sensors/+/temperature", QoS::AtMostOnce).unwrap();
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Log through `defmt` and implement `defmt::Format` for public types
//! - `log`: Log through the `log` facade

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

/// Transport traits and adapters.
///
/// Contains the blocking stream traits, the [`Transport`](network::Transport)
/// trait driven by the session and the transport error codes.
pub mod network;

/// MQTT 3.1.1 codec, parser and session.
pub mod mqtt;
