use super::codec::*;
use super::packet::*;
use super::parser::{self, Incoming};
use super::*;

const BOUNDARIES: [(u32, usize); 8] = [
    (0, 1),
    (1, 1),
    (127, 1),
    (128, 2),
    (16_383, 2),
    (16_384, 3),
    (2_097_151, 3),
    (268_435_455, 4),
];

#[test]
fn test_remaining_length_boundaries() {
    for (value, width) in BOUNDARIES {
        let encoded = encode_remaining_length(value).unwrap();
        assert_eq!(encoded.len(), width, "width of {}", value);
        assert_eq!(remaining_length_len(value), width);
        assert_eq!(decode_remaining_length(&encoded), Ok((value, width)));
    }
}

#[test]
fn test_remaining_length_known_encodings() {
    assert_eq!(&encode_remaining_length(0).unwrap()[..], &[0x00]);
    assert_eq!(&encode_remaining_length(127).unwrap()[..], &[0x7F]);
    assert_eq!(&encode_remaining_length(128).unwrap()[..], &[0x80, 0x01]);
    assert_eq!(&encode_remaining_length(321).unwrap()[..], &[0xC1, 0x02]);
    assert_eq!(
        &encode_remaining_length(268_435_455).unwrap()[..],
        &[0xFF, 0xFF, 0xFF, 0x7F]
    );
}

#[test]
fn test_remaining_length_overflow() {
    assert_eq!(
        encode_remaining_length(268_435_456),
        Err(Error::LengthOverflow)
    );
    assert_eq!(
        decode_remaining_length(&[0x80, 0x80, 0x80, 0x80, 0x01]),
        Err(Error::MalformedLength)
    );
}

#[test]
fn test_remaining_length_incomplete() {
    assert_eq!(decode_remaining_length(&[]), Err(Error::Incomplete));
    assert_eq!(decode_remaining_length(&[0x80, 0x80]), Err(Error::Incomplete));
}

#[test]
fn test_remaining_length_stops_at_terminator() {
    // trailing bytes belong to the variable header
    assert_eq!(decode_remaining_length(&[0x05, 0xFF, 0xFF]), Ok((5, 1)));
}

#[test]
fn test_write_string_uses_16_bit_length() {
    let mut out: heapless::Vec<u8, 512> = heapless::Vec::new();
    let long = "x".repeat(300);
    write_string(&mut out, &long).unwrap();
    assert_eq!(&out[..2], &[0x01, 0x2C]);
    assert_eq!(out.len(), 302);

    let mut offset = 0;
    assert_eq!(read_string(&out, &mut offset), Ok(long.as_str()));
    assert_eq!(offset, 302);
}

#[test]
fn test_string_too_long() {
    let huge = "a".repeat(65_536);
    assert_eq!(string_len(&huge), Err(Error::StringTooLong));
    assert_eq!(string_len(&huge[..65_535]), Ok(65_537));
}

#[test]
fn test_control_field_bits() {
    let field = ControlField::from_byte(0x3B);
    assert_eq!(field.packet_type(), Ok(PacketType::Publish));
    assert!(field.dup());
    assert_eq!(field.qos(), Ok(QoS::AtLeastOnce));
    assert!(field.retain());

    let built = ControlField::new(PacketType::Publish, 0)
        .with_dup(true)
        .with_qos(QoS::AtLeastOnce)
        .with_retain(true);
    assert_eq!(built.to_byte(), 0x3B);
    assert_eq!(built.with_retain(false).to_byte(), 0x3A);
}

#[test]
fn test_control_field_rejects_reserved_types() {
    assert_eq!(
        ControlField::from_byte(0x00).packet_type(),
        Err(Error::InvalidPacketType(0))
    );
    assert_eq!(
        ControlField::from_byte(0xF0).packet_type(),
        Err(Error::InvalidPacketType(15))
    );
    assert_eq!(ControlField::from_byte(0x36).qos(), Err(Error::InvalidQoS(3)));
}

#[test]
fn test_connect_flags() {
    let flags = ConnectFlags::new().with_clean_session(true);
    assert_eq!(flags.bits(), 0x02);
    assert!(flags.clean_session());
    assert!(!flags.will());
    assert_eq!(flags.will_qos(), 0);
    assert!(!flags.will_retain());
    assert!(!flags.password());
    assert!(!flags.user_name());
    assert!(!flags.reserved());

    let all = ConnectFlags::from_bits(0xFF);
    assert!(all.user_name() && all.password() && all.will_retain() && all.will());
    assert_eq!(all.will_qos(), 3);
    assert!(all.reserved());
}

#[test]
fn test_build_connect() {
    let packet = build_connect("dev1").unwrap();

    let field = ControlField::from_byte(packet[0]);
    assert_eq!(field.packet_type(), Ok(PacketType::Connect));
    assert_eq!(field.flags(), 0);

    let (remaining, consumed) = decode_remaining_length(&packet[1..]).unwrap();
    let body = &packet[1 + consumed..];
    // variable header (10) + payload (2 + 4)
    assert_eq!(remaining, 16);
    assert_eq!(body.len(), remaining as usize);

    let mut offset = 0;
    assert_eq!(read_string(body, &mut offset), Ok("MQTT"));
    assert_eq!(body[offset], 4);
    let flags = ConnectFlags::from_bits(body[offset + 1]);
    assert!(flags.clean_session());
    assert_eq!(flags.bits() & !0x02, 0);
    assert_eq!(&body[offset + 2..offset + 4], &[0x00, 0x3C]);
    offset += 4;
    assert_eq!(read_string(body, &mut offset), Ok("dev1"));
    assert_eq!(offset, body.len());
}

#[test]
fn test_build_connect_exact_bytes() {
    let packet = build_connect("dev1").unwrap();
    assert_eq!(
        &packet[..],
        &[
            0x10, 0x10, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x02, 0x00, 0x3C, 0x00, 0x04,
            b'd', b'e', b'v', b'1'
        ]
    );
}

#[test]
fn test_build_connect_rejects_long_client_id() {
    assert_eq!(
        build_connect("a-client-id-that-is-too-long"),
        Err(Error::ClientIdTooLong)
    );
    assert!(build_connect("exactly-23-bytes-long-x").is_ok());
}

#[test]
fn test_build_subscribe() {
    let packet = build_subscribe(7, "a/b", QoS::ExactlyOnce).unwrap();
    assert_eq!(
        &packet[..],
        &[0x82, 0x08, 0x00, 0x07, 0x00, 0x03, b'a', b'/', b'b', 0x02]
    );
}

#[test]
fn test_build_subscribe_validation() {
    assert_eq!(
        build_subscribe(0, "a", QoS::AtMostOnce),
        Err(Error::InvalidPacketId)
    );
    assert_eq!(
        build_subscribe(1, "", QoS::AtMostOnce),
        Err(Error::EmptyTopic)
    );
    let huge = "t".repeat(MAX_PACKET_LEN);
    assert_eq!(
        build_subscribe(1, &huge, QoS::AtMostOnce),
        Err(Error::PacketOverflow)
    );
}

#[test]
fn test_build_publish_qos0() {
    let packet = build_publish("a/b", b"hi", QoS::AtMostOnce, false, true, 9).unwrap();
    // dup is cleared and no packet id is written at QoS 0
    assert_eq!(
        &packet[..],
        &[0x30, 0x07, 0x00, 0x03, b'a', b'/', b'b', b'h', b'i']
    );
}

#[test]
fn test_build_publish_qos1_retained() {
    let packet = build_publish("a/b", b"hi", QoS::AtLeastOnce, true, true, 0x0102).unwrap();
    assert_eq!(
        &packet[..],
        &[0x3B, 0x09, 0x00, 0x03, b'a', b'/', b'b', 0x01, 0x02, b'h', b'i']
    );
    assert_eq!(
        build_publish("a/b", b"hi", QoS::AtLeastOnce, false, false, 0),
        Err(Error::InvalidPacketId)
    );
}

#[test]
fn test_build_puback_and_disconnect() {
    assert_eq!(&build_puback(0x1234).unwrap()[..], &[0x40, 0x02, 0x12, 0x34]);
    assert_eq!(build_puback(0), Err(Error::InvalidPacketId));
    assert_eq!(&build_disconnect().unwrap()[..], &[0xE0, 0x00]);
}

#[test]
fn test_build_publish_large_payload_uses_two_length_bytes() {
    let payload = [0xAAu8; 200];
    let packet = build_publish("t", &payload, QoS::AtMostOnce, false, false, 0).unwrap();
    // 3 + 200 = 203 -> 0xCB 0x01
    assert_eq!(&packet[1..3], &[0xCB, 0x01]);
    assert_eq!(packet.len(), 1 + 2 + 203);
}

#[test]
fn test_decode_connack() {
    assert_eq!(
        parser::decode(&[0x20, 0x02, 0x01, 0x00]),
        Ok(Incoming::ConnAck {
            session_present: true,
            return_code: ConnectReturnCode::Accepted,
        })
    );
    assert_eq!(
        parser::decode(&[0x20, 0x02, 0x00, 0x05]),
        Ok(Incoming::ConnAck {
            session_present: false,
            return_code: ConnectReturnCode::NotAuthorized,
        })
    );
    assert_eq!(
        parser::decode(&[0x20, 0x02, 0x00, 0x09]),
        Ok(Incoming::ConnAck {
            session_present: false,
            return_code: ConnectReturnCode::Reserved(9),
        })
    );
    assert_eq!(parser::decode(&[0x20, 0x01, 0x00]), Err(Error::Incomplete));
}

#[test]
fn test_decode_publish_qos0_and_qos1() {
    let qos0 = [0x30, 0x07, 0x00, 0x03, b'a', b'/', b'b', b'h', b'i'];
    let qos1 = [0x32, 0x09, 0x00, 0x03, b'a', b'/', b'b', 0x00, 0x2A, b'h', b'i'];

    let Ok(Incoming::Publish(p0)) = parser::decode(&qos0) else {
        panic!("expected publish");
    };
    let Ok(Incoming::Publish(p1)) = parser::decode(&qos1) else {
        panic!("expected publish");
    };

    assert_eq!(p0.topic, "a/b");
    assert_eq!(p0.payload, b"hi");
    assert_eq!(p0.packet_id, None);
    assert_eq!(p1.topic, p0.topic);
    assert_eq!(p1.payload, p0.payload);
    assert_eq!(p1.packet_id, Some(42));
    assert_eq!(p1.qos, QoS::AtLeastOnce);
}

#[test]
fn test_decode_publish_errors() {
    assert_eq!(parser::decode(&[0x30, 0x00]), Err(Error::EmptyPublish));
    assert_eq!(
        parser::decode(&[0x36, 0x03, 0x00, 0x01, b'a']),
        Err(Error::InvalidQoS(3))
    );
    assert_eq!(
        parser::decode(&[0x30, 0x04, 0x00, 0x02, 0xFF, 0xFE]),
        Err(Error::InvalidUtf8)
    );
    // declared topic length runs past the body
    assert_eq!(
        parser::decode(&[0x30, 0x03, 0x00, 0x09, b'a']),
        Err(Error::Incomplete)
    );
    // qos 1 without room for the packet id
    assert_eq!(
        parser::decode(&[0x32, 0x04, 0x00, 0x02, b'a', b'b']),
        Err(Error::Incomplete)
    );
}

#[test]
fn test_decode_publish_rejects_oversized_topic_before_copy() {
    // declares a 200-byte topic but carries none of it
    assert_eq!(
        parser::decode(&[0x30, 0x02, 0x00, 0xC8]),
        Err(Error::TopicOverflow)
    );
}

#[test]
fn test_decode_publish_rejects_oversized_payload() {
    let mut frame: std::vec::Vec<u8> = std::vec::Vec::new();
    let body_len = 3 + MAX_PAYLOAD_LEN + 1;
    frame.push(0x30);
    frame.extend_from_slice(&encode_remaining_length(body_len as u32).unwrap());
    frame.extend_from_slice(&[0x00, 0x01, b't']);
    frame.resize(frame.len() + MAX_PAYLOAD_LEN + 1, 0x55);
    assert_eq!(parser::decode(&frame), Err(Error::PayloadOverflow));
}

#[test]
fn test_decode_suback() {
    let Ok(Incoming::SubAck(Some(ack))) = parser::decode(&[0x90, 0x03, 0x00, 0x05, 0x01]) else {
        panic!("expected suback");
    };
    assert_eq!(ack.packet_id, 5);
    assert_eq!(ack.granted(), Some(QoS::AtLeastOnce));

    let Ok(Incoming::SubAck(Some(refused))) = parser::decode(&[0x90, 0x03, 0x00, 0x05, 0x80])
    else {
        panic!("expected suback");
    };
    assert_eq!(refused.granted(), None);

    assert_eq!(parser::decode(&[0x90, 0x00]), Ok(Incoming::SubAck(None)));
}

#[test]
fn test_decode_other_types() {
    assert_eq!(parser::decode(&[0xE0, 0x00]), Ok(Incoming::Disconnect));
    assert_eq!(
        parser::decode(&[0xD0, 0x00]),
        Ok(Incoming::Unhandled(PacketType::PingResp))
    );
    assert_eq!(
        parser::decode(&[0x40, 0x02, 0x00, 0x01]),
        Ok(Incoming::Unhandled(PacketType::PubAck))
    );
    assert_eq!(
        parser::decode(&[0x00, 0x00]),
        Err(Error::InvalidPacketType(0))
    );
    assert_eq!(parser::decode(&[]), Err(Error::Incomplete));
}

#[test]
fn test_frame_len() {
    assert_eq!(parser::frame_len(&[]), Ok(None));
    assert_eq!(parser::frame_len(&[0x30]), Ok(None));
    assert_eq!(parser::frame_len(&[0x30, 0x80]), Ok(None));
    assert_eq!(parser::frame_len(&[0x30, 0x05, 0x00]), Ok(Some(7)));
    assert_eq!(parser::frame_len(&[0x30, 0x80, 0x01]), Ok(Some(131)));
    assert_eq!(
        parser::frame_len(&[0x30, 0xFF, 0xFF, 0xFF, 0xFF]),
        Err(Error::MalformedLength)
    );
}

#[test]
fn test_config_new() {
    let config = Config::new("broker.local", 1883, "dev1").unwrap();
    assert_eq!(config.host.as_str(), "broker.local");
    assert_eq!(config.port, 1883);
    assert_eq!(config.connack_timeout_ms, config::DEFAULT_CONNACK_TIMEOUT_MS);
    assert_eq!(config.with_connack_timeout(500).connack_timeout_ms, 500);

    assert_eq!(Config::new("", 1883, "dev1"), Err(Error::InvalidConfig));
    assert_eq!(Config::new("h", 0, "dev1"), Err(Error::InvalidConfig));
    assert_eq!(
        Config::new("h", 1883, "a-client-id-that-is-too-long"),
        Err(Error::ClientIdTooLong)
    );
}

#[test]
fn test_config_from_json() {
    let config = Config::from_json(
        r#"{"host":"10.0.0.1","port":8883,"client_id":"dev2","connack_timeout_ms":2500}"#,
    )
    .unwrap();
    assert_eq!(config.host.as_str(), "10.0.0.1");
    assert_eq!(config.port, 8883);
    assert_eq!(config.client_id.as_str(), "dev2");
    assert_eq!(config.connack_timeout_ms, 2500);

    assert_eq!(
        Config::from_json(r#"{"host":"10.0.0.1","port":0,"client_id":"dev2"}"#),
        Err(Error::InvalidConfig)
    );
    assert_eq!(
        Config::from_json(r#"{"host":"10.0.0.1"}"#),
        Err(Error::InvalidConfig)
    );
}

#[test]
fn test_response_from_publish() {
    let publish = parser::Publish {
        dup: false,
        qos: QoS::AtLeastOnce,
        retain: true,
        topic: "a/b",
        packet_id: Some(3),
        payload: b"hi",
    };
    let response = Response::from_publish(&publish);
    assert_eq!(response.status, Status::ReceivedPublish);
    assert_eq!(response.topic(), "a/b");
    assert_eq!(response.payload(), b"hi");
    assert!(response.retain);
    assert_eq!(response.packet_id, Some(3));

    let long_topic = "t".repeat(MAX_TOPIC_LEN + 1);
    let oversized = parser::Publish {
        topic: &long_topic,
        ..publish
    };
    assert_eq!(
        Response::from_publish(&oversized).status,
        Status::BufferOverflow
    );
}

#[test]
fn test_transport_error_status() {
    use crate::network::Error as NetError;

    assert_eq!(Status::from(NetError::InvalidAddress), Status::ConnectFailed);
    assert_eq!(Status::from(NetError::WriteError), Status::Aborted);
    assert_eq!(Status::from(NetError::ConnectionClosed), Status::Closed);
    assert_eq!(
        Error::from(NetError::Timeout),
        Error::Transport(NetError::Timeout)
    );
}
