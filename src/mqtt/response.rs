//! Events delivered to the application handler.

use heapless::{String, Vec};

use super::packet::{ConnectReturnCode, PacketType, QoS};
use super::parser::Publish;
use super::{MAX_PAYLOAD_LEN, MAX_TOPIC_LEN};
use crate::network;

/// Outcome carried by a [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// The server accepted the connection; the session is connected.
    ConnAck,
    /// The server refused the connection with the given code.
    ConnNack(ConnectReturnCode),
    /// The server granted a subscription.
    SubAck {
        /// Identifier of the acknowledged SUBSCRIBE.
        packet_id: u16,
        /// QoS granted by the server.
        granted: QoS,
    },
    /// The server refused a subscription, or sent an empty SUBACK.
    SubNack,
    /// Reserved for outgoing QoS 1 flows.
    PubAck,
    /// Reserved for outgoing QoS 1 flows.
    PubNack,
    /// An application message arrived; see the topic and payload.
    ReceivedPublish,
    /// The connection ended (server DISCONNECT or transport close).
    Disconnected,
    /// The transport could not establish a connection.
    ConnectFailed,
    /// The transport aborted the connection.
    Aborted,
    /// The peer reset the connection.
    Reset,
    /// The transport reported the connection closed.
    Closed,
    /// The transport timed out.
    TimedOut,
    /// No CONNACK arrived within the configured timeout.
    ConnectTimeout,
    /// An inbound topic or payload exceeded the response capacity.
    BufferOverflow,
    /// An inbound packet could not be decoded, or was an empty PUBLISH.
    Malformed,
    /// A valid packet this core takes no action on.
    Unhandled(PacketType),
}

impl From<network::Error> for Status {
    fn from(err: network::Error) -> Self {
        match err {
            network::Error::ConnectFailed | network::Error::InvalidAddress => Status::ConnectFailed,
            network::Error::Aborted
            | network::Error::NotOpen
            | network::Error::ReadError
            | network::Error::WriteError => Status::Aborted,
            network::Error::Reset => Status::Reset,
            network::Error::ConnectionClosed => Status::Closed,
            network::Error::Timeout => Status::TimedOut,
        }
    }
}

/// One event for the application.
///
/// A fresh value is built for every event; the handler receives it by
/// reference for the duration of the call only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// What happened.
    pub status: Status,
    /// Topic of a received PUBLISH; empty otherwise.
    pub topic: String<MAX_TOPIC_LEN>,
    /// Payload of a received PUBLISH; empty otherwise.
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
    /// QoS of a received PUBLISH.
    pub qos: QoS,
    /// Retain flag of a received PUBLISH.
    pub retain: bool,
    /// Packet identifier of a received PUBLISH (QoS > 0) or SUBACK.
    pub packet_id: Option<u16>,
}

impl Response {
    /// A response with no topic or payload.
    pub fn new(status: Status) -> Self {
        Self {
            status,
            topic: String::new(),
            payload: Vec::new(),
            qos: QoS::AtMostOnce,
            retain: false,
            packet_id: None,
        }
    }

    /// Copy a decoded PUBLISH into an owned response.
    ///
    /// Falls back to a [`Status::BufferOverflow`] response if either part does
    /// not fit; the parser has normally rejected such packets already.
    pub fn from_publish(publish: &Publish<'_>) -> Self {
        let (Ok(topic), Ok(payload)) = (
            String::try_from(publish.topic),
            Vec::from_slice(publish.payload),
        ) else {
            return Self::new(Status::BufferOverflow);
        };
        Self {
            status: Status::ReceivedPublish,
            topic,
            payload,
            qos: publish.qos,
            retain: publish.retain,
            packet_id: publish.packet_id,
        }
    }

    /// The topic as a string slice.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
