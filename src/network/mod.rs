//! Transport abstraction for the MQTT session.
//!
//! Two families of traits live here:
//!
//! - The blocking stream traits ([`Read`], [`Write`], [`Close`], [`Connection`],
//!   [`Connect`]) that a socket, UART bridge or modem driver implements.
//! - The [`Transport`] trait the [`Session`](crate::mqtt::Session) drives. It is
//!   shaped after event-driven network stacks: `open` may complete later, in
//!   which case the stack calls back into the session.
//!
//! [`StreamTransport`] bridges the two, so any blocking [`Connect`] can be used
//! as a [`Transport`].

#![deny(unsafe_code)]

/// Common error types for transport operations
pub mod error;

mod stream;

pub use error::Error;
pub use stream::StreamTransport;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Transport, Write};
}

/// Byte-oriented input half of a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte-oriented output half of a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Orderly shutdown of a connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `remote`, given as `host:port`
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

/// Outcome of [`Transport::open`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Open {
    /// The link is up; the session proceeds with the MQTT handshake at once.
    Established,
    /// The link is being set up; the driver calls
    /// [`Session::on_connected`](crate::mqtt::Session::on_connected) or
    /// [`Session::on_error`](crate::mqtt::Session::on_error) when it settles.
    Pending,
}

/// The byte transport consumed by the MQTT session.
///
/// Implementations own the socket. They are never called concurrently for one
/// session: every method runs inside an application call or a transport
/// callback, which the driver serialises.
pub trait Transport {
    /// Start connecting to `host:port`.
    fn open(&mut self, host: &str, port: u16) -> Result<Open, Error>;

    /// Hand a complete packet to the link. The bytes are not retained past
    /// the call.
    fn send(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Pull whatever bytes are available into `buf`.
    ///
    /// Callback-driven stacks deliver data through
    /// [`Session::on_received`](crate::mqtt::Session::on_received) instead and
    /// can keep the default, which reports no data.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let _ = buf;
        Ok(0)
    }

    /// Tear the link down.
    fn close(&mut self) -> Result<(), Error>;
}
