use rt_proto::prelude::*;

fn encode_frame(msg_type: u8, sequence: u32, payload: &[u8]) -> Vec<u8> {
    let header = Header { msg_type, length: payload.len() as u32, sequence };
    let mut buf = [0u8; HEADER_SIZE];
    header.encode(&mut buf).unwrap();
    let mut out = buf.to_vec();
    out.extend_from_slice(payload);
    out
}

/// `spec.md` §8 scenario 1: "Connect and assign" — the client sends a bare
/// `Connect` and the server replies with `ConnectAck(1)`.
#[test]
fn connect_and_assign_matches_literal_scenario_bytes() {
    let connect = encode_frame(0x01, 0, &[]);
    assert_eq!(connect, vec![0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let header = Header::decode(&connect).unwrap();
    assert_eq!(header, Header { msg_type: 0x01, length: 0, sequence: 0 });
    let msg = ReliableMessage::decode(header.msg_type, &connect[HEADER_SIZE..]).unwrap();
    assert_eq!(msg, ReliableMessage::Connect);

    let ack = ReliableMessage::ConnectAck(1);
    let ack_payload = ack.encode_payload();
    let ack_frame = encode_frame(ack.message_type(), 0, &ack_payload);
    assert_eq!(ack_frame, vec![0x02, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01]);
}

#[test]
fn truncated_frame_is_rejected_without_panicking() {
    let bytes = [0x01, 0x00, 0x00];
    assert_eq!(Header::decode(&bytes), Err(ProtoError::TruncatedHeader));
}

#[test]
fn lobby_handshake_end_to_end() {
    let mut mgr = LobbyManager::new();
    let id = mgr.create(1, "lobby".into(), 4).unwrap();
    mgr.join(2, id).unwrap();
    mgr.set_ready(1).unwrap();
    mgr.set_ready(2).unwrap();
    assert_eq!(mgr.get(id).unwrap().status(), LobbyStatus::Ready);
}

#[test]
fn connection_state_machine_reaches_in_game() {
    let mut conn = Connection::new(1);
    conn.mark_connected();
    conn.mark_in_lobby();
    conn.mark_ready();
    conn.mark_in_game();
    assert_eq!(conn.state(), ConnectionState::InGame);
}
