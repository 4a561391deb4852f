//! Packet identifiers and the outbound packet builder.
//!
//! Every builder returns an owned [`Packet`]: the bytes stay valid for as long
//! as the caller holds them, independent of later builds.

use heapless::Vec;

use super::codec::{self, ConnectFlags, ControlField};
use super::error::Error;
use super::{KEEP_ALIVE_SECS, MAX_CLIENT_ID_LEN, MAX_PACKET_LEN};

/// MQTT protocol name as carried in CONNECT.
pub const PROTOCOL_NAME: &str = "MQTT";
/// MQTT protocol level for version 3.1.1.
pub const PROTOCOL_LEVEL: u8 = 4;

/// Fixed-header flags mandated for SUBSCRIBE.
const SUBSCRIBE_FLAGS: u8 = 0b0010;

/// An encoded outbound packet.
pub type Packet = Vec<u8, MAX_PACKET_LEN>;

/// MQTT control packet types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketType {
    /// Client request to connect to server
    Connect = 1,
    /// Connect acknowledgment
    ConnAck = 2,
    /// Publish message
    Publish = 3,
    /// Publish acknowledgment
    PubAck = 4,
    /// Publish received (assured delivery part 1)
    PubRec = 5,
    /// Publish release (assured delivery part 2)
    PubRel = 6,
    /// Publish complete (assured delivery part 3)
    PubComp = 7,
    /// Client subscribe request
    Subscribe = 8,
    /// Subscribe acknowledgment
    SubAck = 9,
    /// Client unsubscribe request
    Unsubscribe = 10,
    /// Unsubscribe acknowledgment
    UnsubAck = 11,
    /// Ping request
    PingReq = 12,
    /// Ping response
    PingResp = 13,
    /// Disconnect notification
    Disconnect = 14,
}

impl TryFrom<u8> for PacketType {
    type Error = Error;

    /// Convert a type nibble (already shifted down) into a packet type.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => PacketType::Connect,
            2 => PacketType::ConnAck,
            3 => PacketType::Publish,
            4 => PacketType::PubAck,
            5 => PacketType::PubRec,
            6 => PacketType::PubRel,
            7 => PacketType::PubComp,
            8 => PacketType::Subscribe,
            9 => PacketType::SubAck,
            10 => PacketType::Unsubscribe,
            11 => PacketType::UnsubAck,
            12 => PacketType::PingReq,
            13 => PacketType::PingResp,
            14 => PacketType::Disconnect,
            other => return Err(Error::InvalidPacketType(other)),
        })
    }
}

/// Quality of Service levels for MQTT messages.
///
/// Only the framing differences are handled by this crate; acknowledgment
/// and retransmission flows for QoS 1 and 2 are left to the application.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    /// At most once delivery.
    #[default]
    AtMostOnce = 0,
    /// At least once delivery.
    AtLeastOnce = 1,
    /// Exactly once delivery.
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(Error::InvalidQoS(other)),
        }
    }
}

/// CONNACK return codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectReturnCode {
    /// Connection accepted
    Accepted,
    /// The server does not support the requested protocol level
    UnacceptableProtocolVersion,
    /// The client identifier is not allowed by the server
    IdentifierRejected,
    /// The MQTT service is unavailable
    ServerUnavailable,
    /// Malformed user name or password
    BadUserNameOrPassword,
    /// The client is not authorized to connect
    NotAuthorized,
    /// A code outside the 3.1.1 table, kept verbatim
    Reserved(u8),
}

impl From<u8> for ConnectReturnCode {
    fn from(code: u8) -> Self {
        match code {
            0 => ConnectReturnCode::Accepted,
            1 => ConnectReturnCode::UnacceptableProtocolVersion,
            2 => ConnectReturnCode::IdentifierRejected,
            3 => ConnectReturnCode::ServerUnavailable,
            4 => ConnectReturnCode::BadUserNameOrPassword,
            5 => ConnectReturnCode::NotAuthorized,
            other => ConnectReturnCode::Reserved(other),
        }
    }
}

impl From<ConnectReturnCode> for u8 {
    fn from(code: ConnectReturnCode) -> Self {
        match code {
            ConnectReturnCode::Accepted => 0,
            ConnectReturnCode::UnacceptableProtocolVersion => 1,
            ConnectReturnCode::IdentifierRejected => 2,
            ConnectReturnCode::ServerUnavailable => 3,
            ConnectReturnCode::BadUserNameOrPassword => 4,
            ConnectReturnCode::NotAuthorized => 5,
            ConnectReturnCode::Reserved(other) => other,
        }
    }
}

/// Write the fixed header for a packet whose variable header and payload
/// together take `remaining` bytes.
fn start(control: ControlField, remaining: usize) -> Result<Packet, Error> {
    let remaining = u32::try_from(remaining).map_err(|_| Error::LengthOverflow)?;
    if remaining > codec::MAX_REMAINING_LENGTH {
        return Err(Error::LengthOverflow);
    }
    let total = 1 + codec::remaining_length_len(remaining) + remaining as usize;
    if total > MAX_PACKET_LEN {
        return Err(Error::PacketOverflow);
    }

    let mut packet = Packet::new();
    push(&mut packet, control.to_byte())?;
    codec::encode_remaining_length_into(remaining, &mut packet)?;
    Ok(packet)
}

fn push(packet: &mut Packet, byte: u8) -> Result<(), Error> {
    packet.push(byte).map_err(|_| Error::PacketOverflow)
}

fn extend(packet: &mut Packet, bytes: &[u8]) -> Result<(), Error> {
    packet
        .extend_from_slice(bytes)
        .map_err(|_| Error::PacketOverflow)
}

/// Build a CONNECT packet for `client_id`.
///
/// The session is always clean and carries no will or credentials; the
/// keep-alive is [`KEEP_ALIVE_SECS`].
///
/// # Errors
///
/// * [`Error::ClientIdTooLong`] - `client_id` is longer than 23 bytes
pub fn build_connect(client_id: &str) -> Result<Packet, Error> {
    if client_id.len() > MAX_CLIENT_ID_LEN {
        return Err(Error::ClientIdTooLong);
    }

    // protocol name + level + flags + keep-alive
    let variable_header_len = codec::string_len(PROTOCOL_NAME)? + 1 + 1 + 2;
    let payload_len = codec::string_len(client_id)?;

    let mut packet = start(
        ControlField::new(PacketType::Connect, 0),
        variable_header_len + payload_len,
    )?;

    codec::write_string(&mut packet, PROTOCOL_NAME)?;
    push(&mut packet, PROTOCOL_LEVEL)?;
    push(
        &mut packet,
        ConnectFlags::new().with_clean_session(true).bits(),
    )?;
    extend(&mut packet, &KEEP_ALIVE_SECS.to_be_bytes())?;

    codec::write_string(&mut packet, client_id)?;
    Ok(packet)
}

/// Build a SUBSCRIBE packet for a single topic filter.
///
/// # Errors
///
/// * [`Error::InvalidPacketId`] - `packet_id` is zero
/// * [`Error::EmptyTopic`] - `topic` is empty
/// * [`Error::StringTooLong`] / [`Error::PacketOverflow`] - `topic` does not fit
pub fn build_subscribe(packet_id: u16, topic: &str, qos: QoS) -> Result<Packet, Error> {
    if packet_id == 0 {
        return Err(Error::InvalidPacketId);
    }
    if topic.is_empty() {
        return Err(Error::EmptyTopic);
    }

    let payload_len = codec::string_len(topic)? + 1;
    let mut packet = start(
        ControlField::new(PacketType::Subscribe, SUBSCRIBE_FLAGS),
        2 + payload_len,
    )?;

    extend(&mut packet, &packet_id.to_be_bytes())?;
    codec::write_string(&mut packet, topic)?;
    push(&mut packet, (qos as u8) & 0x03)?;
    Ok(packet)
}

/// Build a PUBLISH packet.
///
/// The flags nibble is `dup | qos | retain`. At QoS 0 the packet identifier is
/// not written and `dup` is forced to zero, as MQTT 3.1.1 requires; at QoS 1
/// and 2 the identifier follows the topic and must be non-zero.
///
/// # Errors
///
/// * [`Error::EmptyTopic`] - `topic` is empty
/// * [`Error::InvalidPacketId`] - QoS > 0 with `packet_id` zero
/// * [`Error::PacketOverflow`] - topic and payload do not fit
pub fn build_publish(
    topic: &str,
    payload: &[u8],
    qos: QoS,
    retain: bool,
    dup: bool,
    packet_id: u16,
) -> Result<Packet, Error> {
    if topic.is_empty() {
        return Err(Error::EmptyTopic);
    }
    let with_id = qos != QoS::AtMostOnce;
    if with_id && packet_id == 0 {
        return Err(Error::InvalidPacketId);
    }

    let variable_header_len = codec::string_len(topic)? + if with_id { 2 } else { 0 };
    let control = ControlField::new(PacketType::Publish, 0)
        .with_dup(dup && with_id)
        .with_qos(qos)
        .with_retain(retain);

    let mut packet = start(control, variable_header_len + payload.len())?;
    codec::write_string(&mut packet, topic)?;
    if with_id {
        extend(&mut packet, &packet_id.to_be_bytes())?;
    }
    extend(&mut packet, payload)?;
    Ok(packet)
}

/// Build a PUBACK acknowledging `packet_id`.
pub fn build_puback(packet_id: u16) -> Result<Packet, Error> {
    if packet_id == 0 {
        return Err(Error::InvalidPacketId);
    }
    let mut packet = start(ControlField::new(PacketType::PubAck, 0), 2)?;
    extend(&mut packet, &packet_id.to_be_bytes())?;
    Ok(packet)
}

/// Build a client DISCONNECT.
pub fn build_disconnect() -> Result<Packet, Error> {
    start(ControlField::new(PacketType::Disconnect, 0), 0)
}
