//! Inbound packet decoding.
//!
//! [`decode`] turns one complete frame into a typed [`Incoming`] that borrows
//! the frame. Declared sizes are checked against the response capacities
//! before anything is copied out.

use super::codec::{self, ControlField};
use super::error::Error;
use super::packet::{ConnectReturnCode, PacketType, QoS};
use super::{MAX_PAYLOAD_LEN, MAX_TOPIC_LEN};

/// SUBACK return code signalling a refused subscription.
pub const SUBACK_FAILURE: u8 = 0x80;

/// A decoded inbound packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incoming<'a> {
    /// Connection acknowledgment.
    ConnAck {
        /// Whether the server resumed a stored session.
        session_present: bool,
        /// The server's verdict.
        return_code: ConnectReturnCode,
    },
    /// Application message from the server.
    Publish(Publish<'a>),
    /// Subscription acknowledgment; `None` when the packet had no body.
    SubAck(Option<SubAck>),
    /// Server-initiated disconnect.
    Disconnect,
    /// A valid packet type this core does not act on.
    Unhandled(PacketType),
}

/// The fields of an inbound PUBLISH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publish<'a> {
    /// Duplicate delivery flag.
    pub dup: bool,
    /// Delivery QoS.
    pub qos: QoS,
    /// Retain flag.
    pub retain: bool,
    /// Topic name.
    pub topic: &'a str,
    /// Packet identifier, present for QoS 1 and 2.
    pub packet_id: Option<u16>,
    /// Application payload, excluding the packet identifier.
    pub payload: &'a [u8],
}

/// The body of a SUBACK for a single-filter SUBSCRIBE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubAck {
    /// Identifier of the acknowledged SUBSCRIBE.
    pub packet_id: u16,
    /// Granted QoS, or [`SUBACK_FAILURE`].
    pub return_code: u8,
}

impl SubAck {
    /// The granted QoS, or `None` if the server refused the subscription.
    pub fn granted(&self) -> Option<QoS> {
        QoS::try_from(self.return_code).ok()
    }
}

/// Total length of the frame at the start of `buf`.
///
/// Returns `Ok(None)` while the fixed header itself is still incomplete.
///
/// # Errors
///
/// [`Error::MalformedLength`] if the remaining-length field is over-long.
pub fn frame_len(buf: &[u8]) -> Result<Option<usize>, Error> {
    if buf.is_empty() {
        return Ok(None);
    }
    match codec::decode_remaining_length(&buf[1..]) {
        Ok((remaining, consumed)) => Ok(Some(1 + consumed + remaining as usize)),
        Err(Error::Incomplete) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Decode one complete frame.
///
/// # Errors
///
/// * [`Error::Incomplete`] - the frame is shorter than its declared length
/// * [`Error::MalformedLength`] - the remaining-length field is over-long
/// * [`Error::InvalidPacketType`] - type nibble 0 or 15
/// * [`Error::EmptyPublish`] - PUBLISH with no body
/// * [`Error::InvalidQoS`] - PUBLISH with both QoS bits set
/// * [`Error::InvalidUtf8`] - topic is not UTF-8
/// * [`Error::TopicOverflow`] / [`Error::PayloadOverflow`] - declared sizes
///   exceed [`MAX_TOPIC_LEN`] / [`MAX_PAYLOAD_LEN`]
pub fn decode(frame: &[u8]) -> Result<Incoming<'_>, Error> {
    let (&first, rest) = frame.split_first().ok_or(Error::Incomplete)?;
    let control = ControlField::from_byte(first);
    let packet_type = control.packet_type()?;

    let (remaining, consumed) = codec::decode_remaining_length(rest)?;
    let mut offset = consumed;
    let body = codec::read_bytes(rest, &mut offset, remaining as usize)?;

    match packet_type {
        PacketType::ConnAck => decode_connack(body),
        PacketType::Publish => decode_publish(control, body).map(Incoming::Publish),
        PacketType::SubAck => decode_suback(body),
        PacketType::Disconnect => Ok(Incoming::Disconnect),
        other => Ok(Incoming::Unhandled(other)),
    }
}

fn decode_connack(body: &[u8]) -> Result<Incoming<'_>, Error> {
    // acknowledge flags, return code
    let [flags, code, ..] = body else {
        return Err(Error::Incomplete);
    };
    Ok(Incoming::ConnAck {
        session_present: flags & 0x01 != 0,
        return_code: ConnectReturnCode::from(*code),
    })
}

fn decode_publish(control: ControlField, body: &[u8]) -> Result<Publish<'_>, Error> {
    if body.is_empty() {
        return Err(Error::EmptyPublish);
    }
    let qos = control.qos()?;

    let mut offset = 0;
    let topic_len = codec::read_u16(body, &mut offset)? as usize;
    if topic_len > MAX_TOPIC_LEN {
        return Err(Error::TopicOverflow);
    }
    let topic = codec::read_bytes(body, &mut offset, topic_len)?;
    let topic = core::str::from_utf8(topic).map_err(|_| Error::InvalidUtf8)?;

    let packet_id = match qos {
        QoS::AtMostOnce => None,
        QoS::AtLeastOnce | QoS::ExactlyOnce => Some(codec::read_u16(body, &mut offset)?),
    };

    let payload = &body[offset..];
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(Error::PayloadOverflow);
    }

    Ok(Publish {
        dup: control.dup(),
        qos,
        retain: control.retain(),
        topic,
        packet_id,
        payload,
    })
}

fn decode_suback(body: &[u8]) -> Result<Incoming<'_>, Error> {
    if body.is_empty() {
        return Ok(Incoming::SubAck(None));
    }
    let mut offset = 0;
    let packet_id = codec::read_u16(body, &mut offset)?;
    let return_code = *body.get(offset).ok_or(Error::Incomplete)?;
    Ok(Incoming::SubAck(Some(SubAck {
        packet_id,
        return_code,
    })))
}
