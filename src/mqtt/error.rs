//! Protocol-level error type.

use crate::network;

/// Errors raised while encoding, decoding or driving an MQTT session.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A remaining-length field still had its continuation bit set after
    /// four bytes.
    MalformedLength,
    /// A remaining length above 268,435,455 was requested.
    LengthOverflow,
    /// The input ended before the declared packet did.
    Incomplete,
    /// The control field carried type 0 or 15.
    InvalidPacketType(u8),
    /// A QoS value of 3 was found on the wire or requested by the caller.
    InvalidQoS(u8),
    /// A topic name was not valid UTF-8.
    InvalidUtf8,
    /// A PUBLISH with a remaining length of zero.
    EmptyPublish,
    /// A declared topic length exceeds the response topic capacity.
    TopicOverflow,
    /// A declared payload length exceeds the response payload capacity.
    PayloadOverflow,
    /// The packet would not fit the outbound buffer.
    PacketOverflow,
    /// A length-prefixed string longer than 65,535 bytes.
    StringTooLong,
    /// A client identifier longer than 23 bytes.
    ClientIdTooLong,
    /// A topic name or filter was empty.
    EmptyTopic,
    /// Packet identifier 0 was supplied where a non-zero one is required.
    InvalidPacketId,
    /// A configuration value was rejected.
    InvalidConfig,
    /// The operation requires a CONNACK-accepted session.
    NotConnected,
    /// The operation is not valid in the current session state.
    InvalidState,
    /// The operation is reserved and not implemented by this core.
    Unsupported,
    /// The transport failed.
    Transport(network::Error),
}

impl From<network::Error> for Error {
    fn from(err: network::Error) -> Self {
        Error::Transport(err)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MalformedLength => write!(f, "malformed remaining length"),
            Error::LengthOverflow => write!(f, "remaining length exceeds 268435455"),
            Error::Incomplete => write!(f, "incomplete packet"),
            Error::InvalidPacketType(t) => write!(f, "invalid packet type: {}", t),
            Error::InvalidQoS(q) => write!(f, "invalid QoS level: {}", q),
            Error::InvalidUtf8 => write!(f, "invalid UTF-8 string"),
            Error::EmptyPublish => write!(f, "PUBLISH with empty body"),
            Error::TopicOverflow => write!(f, "topic exceeds buffer capacity"),
            Error::PayloadOverflow => write!(f, "payload exceeds buffer capacity"),
            Error::PacketOverflow => write!(f, "packet exceeds outbound buffer"),
            Error::StringTooLong => write!(f, "string longer than 65535 bytes"),
            Error::ClientIdTooLong => write!(f, "client identifier longer than 23 bytes"),
            Error::EmptyTopic => write!(f, "empty topic"),
            Error::InvalidPacketId => write!(f, "packet identifier must be non-zero"),
            Error::InvalidConfig => write!(f, "invalid configuration"),
            Error::NotConnected => write!(f, "not connected"),
            Error::InvalidState => write!(f, "operation not valid in current state"),
            Error::Unsupported => write!(f, "operation not supported"),
            Error::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::MalformedLength => defmt::write!(f, "MalformedLength"),
            Error::LengthOverflow => defmt::write!(f, "LengthOverflow"),
            Error::Incomplete => defmt::write!(f, "Incomplete"),
            Error::InvalidPacketType(t) => defmt::write!(f, "InvalidPacketType({})", t),
            Error::InvalidQoS(q) => defmt::write!(f, "InvalidQoS({})", q),
            Error::InvalidUtf8 => defmt::write!(f, "InvalidUtf8"),
            Error::EmptyPublish => defmt::write!(f, "EmptyPublish"),
            Error::TopicOverflow => defmt::write!(f, "TopicOverflow"),
            Error::PayloadOverflow => defmt::write!(f, "PayloadOverflow"),
            Error::PacketOverflow => defmt::write!(f, "PacketOverflow"),
            Error::StringTooLong => defmt::write!(f, "StringTooLong"),
            Error::ClientIdTooLong => defmt::write!(f, "ClientIdTooLong"),
            Error::EmptyTopic => defmt::write!(f, "EmptyTopic"),
            Error::InvalidPacketId => defmt::write!(f, "InvalidPacketId"),
            Error::InvalidConfig => defmt::write!(f, "InvalidConfig"),
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::InvalidState => defmt::write!(f, "InvalidState"),
            Error::Unsupported => defmt::write!(f, "Unsupported"),
            Error::Transport(e) => defmt::write!(f, "Transport({})", e),
        }
    }
}
