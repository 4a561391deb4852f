//! Wire primitives shared by the builder and the parser.
//!
//! Bit-packed header bytes are plain `u8` newtypes with explicit masks, so the
//! on-wire layout does not depend on how a compiler would lay out bit-fields.

use heapless::Vec;

use super::error::Error;
use super::packet::{PacketType, QoS};

/// Largest value the remaining-length field can carry.
pub const MAX_REMAINING_LENGTH: u32 = 268_435_455;

/// Maximum number of bytes in an encoded remaining length.
pub const MAX_REMAINING_LENGTH_BYTES: usize = 4;

const CONTINUATION: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;

/// Number of bytes `value` occupies once encoded.
pub const fn remaining_length_len(value: u32) -> usize {
    if value < 128 {
        1
    } else if value < 16_384 {
        2
    } else if value < 2_097_152 {
        3
    } else {
        4
    }
}

/// Encode an MQTT remaining length, least-significant group first.
///
/// # Errors
///
/// [`Error::LengthOverflow`] if `value` exceeds [`MAX_REMAINING_LENGTH`].
pub fn encode_remaining_length(value: u32) -> Result<Vec<u8, MAX_REMAINING_LENGTH_BYTES>, Error> {
    let mut out = Vec::new();
    encode_remaining_length_into(value, &mut out)?;
    Ok(out)
}

/// Append an encoded remaining length to `out`.
pub fn encode_remaining_length_into<const N: usize>(
    value: u32,
    out: &mut Vec<u8, N>,
) -> Result<(), Error> {
    if value > MAX_REMAINING_LENGTH {
        return Err(Error::LengthOverflow);
    }

    let mut rest = value;
    loop {
        let mut byte = (rest & VALUE_MASK as u32) as u8;
        rest >>= 7;
        if rest > 0 {
            byte |= CONTINUATION;
        }
        out.push(byte).map_err(|_| Error::PacketOverflow)?;
        if rest == 0 {
            return Ok(());
        }
    }
}

/// Decode a remaining length from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
///
/// * [`Error::Incomplete`] - `bytes` ended while the continuation bit was set
/// * [`Error::MalformedLength`] - the continuation bit was still set on the
///   fourth byte
pub fn decode_remaining_length(bytes: &[u8]) -> Result<(u32, usize), Error> {
    let mut value: u32 = 0;

    for (i, &byte) in bytes.iter().take(MAX_REMAINING_LENGTH_BYTES).enumerate() {
        value |= u32::from(byte & VALUE_MASK) << (7 * i);
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }

    if bytes.len() >= MAX_REMAINING_LENGTH_BYTES {
        Err(Error::MalformedLength)
    } else {
        Err(Error::Incomplete)
    }
}

/// Encoded size of a length-prefixed string.
pub fn string_len(s: &str) -> Result<usize, Error> {
    if s.len() > u16::MAX as usize {
        return Err(Error::StringTooLong);
    }
    Ok(2 + s.len())
}

/// Append a 16-bit big-endian length followed by the raw bytes of `s`.
pub fn write_string<const N: usize>(out: &mut Vec<u8, N>, s: &str) -> Result<(), Error> {
    string_len(s)?;
    out.extend_from_slice(&(s.len() as u16).to_be_bytes())
        .map_err(|_| Error::PacketOverflow)?;
    out.extend_from_slice(s.as_bytes())
        .map_err(|_| Error::PacketOverflow)
}

/// Read a big-endian `u16` at `offset`, advancing it.
pub fn read_u16(bytes: &[u8], offset: &mut usize) -> Result<u16, Error> {
    let raw = read_bytes(bytes, offset, 2)?;
    Ok(u16::from_be_bytes([raw[0], raw[1]]))
}

/// Borrow `len` bytes at `offset`, advancing it.
pub fn read_bytes<'a>(bytes: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8], Error> {
    let end = offset.checked_add(len).ok_or(Error::Incomplete)?;
    let slice = bytes.get(*offset..end).ok_or(Error::Incomplete)?;
    *offset = end;
    Ok(slice)
}

/// Read a length-prefixed UTF-8 string at `offset`, advancing it.
pub fn read_string<'a>(bytes: &'a [u8], offset: &mut usize) -> Result<&'a str, Error> {
    let len = read_u16(bytes, offset)? as usize;
    let raw = read_bytes(bytes, offset, len)?;
    core::str::from_utf8(raw).map_err(|_| Error::InvalidUtf8)
}

/// First byte of every packet: type (high nibble) | dup | qos (2 bits) | retain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlField(u8);

impl ControlField {
    const TYPE_SHIFT: u8 = 4;
    const FLAGS_MASK: u8 = 0x0F;
    const DUP: u8 = 0x08;
    const QOS_MASK: u8 = 0x06;
    const QOS_SHIFT: u8 = 1;
    const RETAIN: u8 = 0x01;

    /// Control field for `packet_type` with the given flags nibble.
    pub const fn new(packet_type: PacketType, flags: u8) -> Self {
        Self(((packet_type as u8) << Self::TYPE_SHIFT) | (flags & Self::FLAGS_MASK))
    }

    /// Wrap a raw byte read from the wire.
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// The raw byte.
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// The message type nibble, unvalidated.
    pub const fn raw_type(self) -> u8 {
        self.0 >> Self::TYPE_SHIFT
    }

    /// The message type.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPacketType`] for the reserved values 0 and 15.
    pub fn packet_type(self) -> Result<PacketType, Error> {
        PacketType::try_from(self.raw_type())
    }

    /// The flags nibble.
    pub const fn flags(self) -> u8 {
        self.0 & Self::FLAGS_MASK
    }

    /// Duplicate delivery flag.
    pub const fn dup(self) -> bool {
        self.0 & Self::DUP != 0
    }

    /// The raw two QoS bits.
    pub const fn qos_bits(self) -> u8 {
        (self.0 & Self::QOS_MASK) >> Self::QOS_SHIFT
    }

    /// The QoS level.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidQoS`] when both QoS bits are set.
    pub fn qos(self) -> Result<QoS, Error> {
        QoS::try_from(self.qos_bits())
    }

    /// Retain flag.
    pub const fn retain(self) -> bool {
        self.0 & Self::RETAIN != 0
    }

    /// Copy with the dup flag set or cleared.
    pub const fn with_dup(self, dup: bool) -> Self {
        if dup {
            Self(self.0 | Self::DUP)
        } else {
            Self(self.0 & !Self::DUP)
        }
    }

    /// Copy with the QoS bits replaced.
    pub const fn with_qos(self, qos: QoS) -> Self {
        Self((self.0 & !Self::QOS_MASK) | ((qos as u8) << Self::QOS_SHIFT))
    }

    /// Copy with the retain flag set or cleared.
    pub const fn with_retain(self, retain: bool) -> Self {
        if retain {
            Self(self.0 | Self::RETAIN)
        } else {
            Self(self.0 & !Self::RETAIN)
        }
    }
}

/// CONNECT flags byte.
///
/// Bit 7 user name, 6 password, 5 will retain, 4-3 will QoS, 2 will flag,
/// 1 clean session, 0 reserved (always zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectFlags(u8);

impl ConnectFlags {
    const USER_NAME: u8 = 0x80;
    const PASSWORD: u8 = 0x40;
    const WILL_RETAIN: u8 = 0x20;
    const WILL_QOS_MASK: u8 = 0x18;
    const WILL_QOS_SHIFT: u8 = 3;
    const WILL: u8 = 0x04;
    const CLEAN_SESSION: u8 = 0x02;
    const RESERVED: u8 = 0x01;

    /// All flags cleared.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Wrap a raw byte. The reserved bit is preserved so callers can detect it.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// The raw byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Copy with clean-session set or cleared.
    pub const fn with_clean_session(self, clean: bool) -> Self {
        if clean {
            Self(self.0 | Self::CLEAN_SESSION)
        } else {
            Self(self.0 & !Self::CLEAN_SESSION)
        }
    }

    /// Clean-session flag.
    pub const fn clean_session(self) -> bool {
        self.0 & Self::CLEAN_SESSION != 0
    }

    /// Will flag.
    pub const fn will(self) -> bool {
        self.0 & Self::WILL != 0
    }

    /// Will QoS bits.
    pub const fn will_qos(self) -> u8 {
        (self.0 & Self::WILL_QOS_MASK) >> Self::WILL_QOS_SHIFT
    }

    /// Will retain flag.
    pub const fn will_retain(self) -> bool {
        self.0 & Self::WILL_RETAIN != 0
    }

    /// Password flag.
    pub const fn password(self) -> bool {
        self.0 & Self::PASSWORD != 0
    }

    /// User name flag.
    pub const fn user_name(self) -> bool {
        self.0 & Self::USER_NAME != 0
    }

    /// Whether the reserved bit is set (a protocol violation).
    pub const fn reserved(self) -> bool {
        self.0 & Self::RESERVED != 0
    }
}
