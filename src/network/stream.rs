use core::fmt::Write as _;

use heapless::String;

use super::{Close, Connect, Error, Open, Read, Transport, Write};

/// Longest `host:port` string the adapter formats.
const MAX_REMOTE_LEN: usize = 72;

/// A [`Transport`] over any blocking [`Connect`] implementation.
///
/// `open` connects synchronously and reports [`Open::Established`]. A
/// connection still held from an earlier `open` is closed first. `receive` is
/// a single non-blocking-friendly `read`, so the session can be driven with
/// [`Session::poll`](crate::mqtt::Session::poll).
pub struct StreamTransport<N: Connect> {
    connector: N,
    connection: Option<N::Connection>,
}

impl<N: Connect> StreamTransport<N> {
    /// Wrap a connector. No connection is opened until [`Transport::open`].
    pub fn new(connector: N) -> Self {
        Self {
            connector,
            connection: None,
        }
    }

    /// Whether a connection is currently held.
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Borrow the live connection, if any.
    pub fn connection(&self) -> Option<&N::Connection> {
        self.connection.as_ref()
    }

    /// Mutably borrow the live connection, if any.
    pub fn connection_mut(&mut self) -> Option<&mut N::Connection> {
        self.connection.as_mut()
    }
}

impl<N: Connect> core::fmt::Debug for StreamTransport<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("open", &self.is_open())
            .finish()
    }
}

impl<N: Connect> Transport for StreamTransport<N> {
    fn open(&mut self, host: &str, port: u16) -> Result<Open, Error> {
        // a stale link is shut down before it is replaced
        self.close()?;

        let mut remote: String<MAX_REMOTE_LEN> = String::new();
        write!(remote, "{}:{}", host, port).map_err(|_| Error::InvalidAddress)?;

        let connection = self
            .connector
            .connect(&remote)
            .map_err(|_| Error::ConnectFailed)?;
        self.connection = Some(connection);
        Ok(Open::Established)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let connection = self.connection.as_mut().ok_or(Error::NotOpen)?;

        let mut written = 0;
        while written < bytes.len() {
            match connection.write(&bytes[written..]) {
                Ok(0) => return Err(Error::ConnectionClosed),
                Ok(n) => written += n,
                Err(_) => return Err(Error::WriteError),
            }
        }
        connection.flush().map_err(|_| Error::WriteError)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let connection = self.connection.as_mut().ok_or(Error::NotOpen)?;
        connection.read(buf).map_err(|_| Error::ReadError)
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.connection.take() {
            Some(connection) => connection.close().map_err(|_| Error::Aborted),
            None => Ok(()),
        }
    }
}
