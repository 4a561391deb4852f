//! Common error types for transport operations

/// A transport-level failure.
///
/// These are the failure codes a transport reports either synchronously
/// (returned from [`Transport`](super::Transport) methods) or asynchronously
/// through [`Session::on_error`](crate::mqtt::Session::on_error). They are kept
/// small and `Copy` so they can cross callback boundaries on `no_std` targets.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    NotOpen,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// The connection attempt failed.
    ConnectFailed,
    /// The connection was aborted locally.
    Aborted,
    /// The connection was reset by the peer.
    Reset,
    /// The connection was closed.
    ConnectionClosed,
    /// A timeout occurred.
    Timeout,
    /// An invalid address was provided.
    InvalidAddress,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::NotOpen => "connection not open",
            Error::WriteError => "write failed",
            Error::ReadError => "read failed",
            Error::ConnectFailed => "connection attempt failed",
            Error::Aborted => "connection aborted",
            Error::Reset => "connection reset by peer",
            Error::ConnectionClosed => "connection closed",
            Error::Timeout => "operation timed out",
            Error::InvalidAddress => "invalid address",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::Aborted => defmt::write!(f, "Aborted"),
            Error::Reset => defmt::write!(f, "Reset"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
        }
    }
}
