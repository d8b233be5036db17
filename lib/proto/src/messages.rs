//! Message kinds and fixed encodings for both channels (`spec.md` §4.1).
//!
//! Reliable-channel byte layouts are not pinned down by the distilled spec
//! beyond scenario 1's literal handshake bytes (`01 00 00 00 00 00 00 00`
//! for `Connect`, replied to with `02 00 00 01 00 00 00 00 01` for
//! `ConnectAck(1)`); this module fixes the remaining reliable-channel
//! layouts consistently with that example. Datagram-channel layouts are
//! bit-exact per §4.1 and cross-checked against
//! `original_source/Server/include/UdpMessageType.hpp`.

use crate::error::ProtoError;
use crate::frame::{read_f32, write_f32};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

pub type ClientId = u8;
pub type LobbyId = u32;
pub type NetId = u32;

/// `spec.md` §3.2 `network_entity.entity_type_tag`, matching
/// `original_source`'s `EntityType` enum.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum EntityKind {
    Player = 0x01,
    Enemy = 0x02,
    Projectile = 0x03,
    AlliedProjectile = 0x04,
}

impl EntityKind {
    pub fn from_byte(b: u8) -> Result<EntityKind, ProtoError> {
        Ok(match b {
            0x01 => EntityKind::Player,
            0x02 => EntityKind::Enemy,
            0x03 => EntityKind::Projectile,
            0x04 => EntityKind::AlliedProjectile,
            other => return Err(ProtoError::InvalidPayloadSize(other)),
        })
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ConnectNakReason {
    GameFull = 0x01,
    LobbyFull = 0x02,
    InvalidLobby = 0x03,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ServerErrorCode {
    ProtocolViolation = 0x01,
    UnexpectedMessage = 0x02,
    ServerError = 0x03,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct PlayerInfo {
    pub client_id: ClientId,
    pub username: String,
    pub ready: bool,
}

impl PlayerInfo {
    fn write(&self, out: &mut Vec<u8>) {
        out.push(self.client_id);
        let bytes = self.username.as_bytes();
        let len = bytes.len().min(255) as u8;
        out.push(len);
        out.extend_from_slice(&bytes[..len as usize]);
        out.push(self.ready as u8);
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> Result<PlayerInfo, ProtoError> {
        let client_id = cursor.read_u8().map_err(|_| ProtoError::InvalidPayloadSize(0))?;
        let len = cursor.read_u8().map_err(|_| ProtoError::InvalidPayloadSize(0))? as usize;
        let mut buf = vec![0u8; len];
        cursor.read_exact(&mut buf).map_err(|_| ProtoError::InvalidPayloadSize(0))?;
        let username = String::from_utf8_lossy(&buf).into_owned();
        let ready = cursor.read_u8().map_err(|_| ProtoError::InvalidPayloadSize(0))? != 0;
        Ok(PlayerInfo { client_id, username, ready })
    }
}

/// Reliable-channel (control plane) messages.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum ReliableMessage {
    Connect,
    ConnectAck(ClientId),
    ConnectNak(ConnectNakReason),
    CreateLobby { max_players: u8, name: String },
    CreateLobbyAck(LobbyId),
    JoinLobby(LobbyId),
    JoinLobbyAck { lobby: LobbyId, your_player_id: ClientId, players: Vec<PlayerInfo> },
    LeaveLobby,
    LeaveLobbyAck,
    PlayerJoined(PlayerInfo),
    PlayerLeft(ClientId),
    Ready,
    GameStart { udp_port: u16, server_id: u32 },
    Error(ServerErrorCode),
}

mod reliable_type {
    pub const CONNECT: u8 = 0x01;
    pub const CONNECT_ACK: u8 = 0x02;
    pub const CONNECT_NAK: u8 = 0x03;
    pub const CREATE_LOBBY: u8 = 0x04;
    pub const CREATE_LOBBY_ACK: u8 = 0x05;
    pub const JOIN_LOBBY: u8 = 0x06;
    pub const JOIN_LOBBY_ACK: u8 = 0x07;
    pub const LEAVE_LOBBY: u8 = 0x08;
    pub const LEAVE_LOBBY_ACK: u8 = 0x09;
    pub const PLAYER_JOINED: u8 = 0x0a;
    pub const PLAYER_LEFT: u8 = 0x0b;
    pub const READY: u8 = 0x0c;
    pub const GAME_START: u8 = 0x0d;
    pub const ERROR: u8 = 0x0e;
}

impl ReliableMessage {
    pub fn message_type(&self) -> u8 {
        use reliable_type::*;
        match self {
            ReliableMessage::Connect => CONNECT,
            ReliableMessage::ConnectAck(_) => CONNECT_ACK,
            ReliableMessage::ConnectNak(_) => CONNECT_NAK,
            ReliableMessage::CreateLobby { .. } => CREATE_LOBBY,
            ReliableMessage::CreateLobbyAck(_) => CREATE_LOBBY_ACK,
            ReliableMessage::JoinLobby(_) => JOIN_LOBBY,
            ReliableMessage::JoinLobbyAck { .. } => JOIN_LOBBY_ACK,
            ReliableMessage::LeaveLobby => LEAVE_LOBBY,
            ReliableMessage::LeaveLobbyAck => LEAVE_LOBBY_ACK,
            ReliableMessage::PlayerJoined(_) => PLAYER_JOINED,
            ReliableMessage::PlayerLeft(_) => PLAYER_LEFT,
            ReliableMessage::Ready => READY,
            ReliableMessage::GameStart { .. } => GAME_START,
            ReliableMessage::Error(_) => ERROR,
        }
    }

    /// Encode the payload only (the 8-byte header is written by the
    /// transport layer, which also owns sequencing).
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            ReliableMessage::Connect
            | ReliableMessage::LeaveLobby
            | ReliableMessage::LeaveLobbyAck
            | ReliableMessage::Ready => {}
            ReliableMessage::ConnectAck(id) => out.push(*id),
            ReliableMessage::ConnectNak(reason) => out.push(*reason as u8),
            ReliableMessage::CreateLobby { max_players, name } => {
                out.push(*max_players);
                let bytes = name.as_bytes();
                let len = bytes.len().min(255) as u8;
                out.push(len);
                out.extend_from_slice(&bytes[..len as usize]);
            }
            ReliableMessage::CreateLobbyAck(id) => out.write_u32::<BigEndian>(*id).unwrap(),
            ReliableMessage::JoinLobby(id) => out.write_u32::<BigEndian>(*id).unwrap(),
            ReliableMessage::JoinLobbyAck { lobby, your_player_id, players } => {
                out.write_u32::<BigEndian>(*lobby).unwrap();
                out.push(*your_player_id);
                out.push(players.len().min(255) as u8);
                for p in players.iter().take(255) {
                    p.write(&mut out);
                }
            }
            ReliableMessage::PlayerJoined(info) => info.write(&mut out),
            ReliableMessage::PlayerLeft(id) => out.push(*id),
            ReliableMessage::GameStart { udp_port, server_id } => {
                out.write_u16::<BigEndian>(*udp_port).unwrap();
                out.write_u32::<BigEndian>(*server_id).unwrap();
            }
            ReliableMessage::Error(code) => out.push(*code as u8),
        }
        out
    }

    pub fn decode(msg_type: u8, payload: &[u8]) -> Result<ReliableMessage, ProtoError> {
        use reliable_type::*;
        let mut cursor = Cursor::new(payload);

        let msg = match msg_type {
            CONNECT => {
                require_len(payload, 0, msg_type)?;
                ReliableMessage::Connect
            }
            CONNECT_ACK => {
                require_len(payload, 1, msg_type)?;
                ReliableMessage::ConnectAck(payload[0])
            }
            CONNECT_NAK => {
                require_len(payload, 1, msg_type)?;
                let reason = match payload[0] {
                    0x01 => ConnectNakReason::GameFull,
                    0x02 => ConnectNakReason::LobbyFull,
                    0x03 => ConnectNakReason::InvalidLobby,
                    _ => return Err(ProtoError::InvalidPayloadSize(msg_type)),
                };
                ReliableMessage::ConnectNak(reason)
            }
            CREATE_LOBBY => {
                if payload.len() < 2 {
                    return Err(ProtoError::InvalidPayloadSize(msg_type));
                }
                let max_players = payload[0];
                let name_len = payload[1] as usize;
                if payload.len() != 2 + name_len {
                    return Err(ProtoError::InvalidPayloadSize(msg_type));
                }
                let name = String::from_utf8_lossy(&payload[2..2 + name_len]).into_owned();
                ReliableMessage::CreateLobby { max_players, name }
            }
            CREATE_LOBBY_ACK => {
                require_len(payload, 4, msg_type)?;
                ReliableMessage::CreateLobbyAck(cursor.read_u32::<BigEndian>().unwrap())
            }
            JOIN_LOBBY => {
                require_len(payload, 4, msg_type)?;
                ReliableMessage::JoinLobby(cursor.read_u32::<BigEndian>().unwrap())
            }
            JOIN_LOBBY_ACK => {
                if payload.len() < 6 {
                    return Err(ProtoError::InvalidPayloadSize(msg_type));
                }
                let lobby = cursor.read_u32::<BigEndian>().unwrap();
                let your_player_id = cursor.read_u8().unwrap();
                let count = cursor.read_u8().unwrap();
                let mut players = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    players.push(PlayerInfo::read(&mut cursor)?);
                }
                ReliableMessage::JoinLobbyAck { lobby, your_player_id, players }
            }
            LEAVE_LOBBY => {
                require_len(payload, 0, msg_type)?;
                ReliableMessage::LeaveLobby
            }
            LEAVE_LOBBY_ACK => {
                require_len(payload, 0, msg_type)?;
                ReliableMessage::LeaveLobbyAck
            }
            PLAYER_JOINED => ReliableMessage::PlayerJoined(PlayerInfo::read(&mut cursor)?),
            PLAYER_LEFT => {
                require_len(payload, 1, msg_type)?;
                ReliableMessage::PlayerLeft(payload[0])
            }
            READY => {
                require_len(payload, 0, msg_type)?;
                ReliableMessage::Ready
            }
            GAME_START => {
                require_len(payload, 6, msg_type)?;
                let udp_port = cursor.read_u16::<BigEndian>().unwrap();
                let server_id = cursor.read_u32::<BigEndian>().unwrap();
                ReliableMessage::GameStart { udp_port, server_id }
            }
            ERROR => {
                require_len(payload, 1, msg_type)?;
                let code = match payload[0] {
                    0x01 => ServerErrorCode::ProtocolViolation,
                    0x02 => ServerErrorCode::UnexpectedMessage,
                    0x03 => ServerErrorCode::ServerError,
                    _ => return Err(ProtoError::InvalidPayloadSize(msg_type)),
                };
                ReliableMessage::Error(code)
            }
            other => return Err(ProtoError::UnknownMessageType(other)),
        };

        Ok(msg)
    }
}

fn require_len(payload: &[u8], expected: usize, msg_type: u8) -> Result<(), ProtoError> {
    if payload.len() != expected {
        Err(ProtoError::InvalidPayloadSize(msg_type))
    } else {
        Ok(())
    }
}

/// A single 17-byte entity record shared by `EntityCreate` and `GameState`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRecord {
    pub net_id: NetId,
    pub kind: EntityKind,
    pub hp: u32,
    pub x: f32,
    pub y: f32,
}

pub const ENTITY_RECORD_SIZE: usize = 17;

impl EntityRecord {
    fn write(&self, out: &mut Vec<u8>) {
        out.write_u32::<BigEndian>(self.net_id).unwrap();
        out.push(self.kind as u8);
        out.write_u32::<BigEndian>(self.hp).unwrap();
        write_f32(out, self.x).unwrap();
        write_f32(out, self.y).unwrap();
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> Result<EntityRecord, ProtoError> {
        let net_id = cursor.read_u32::<BigEndian>().unwrap();
        let kind = EntityKind::from_byte(cursor.read_u8().unwrap())?;
        let hp = cursor.read_u32::<BigEndian>().unwrap();
        let x = read_f32(cursor).unwrap();
        let y = read_f32(cursor).unwrap();
        Ok(EntityRecord { net_id, kind, hp, x, y })
    }
}

/// A single 16-byte update record (no type tag — the entity already exists
/// on the client).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityUpdateRecord {
    pub net_id: NetId,
    pub hp: u32,
    pub x: f32,
    pub y: f32,
}

pub const ENTITY_UPDATE_RECORD_SIZE: usize = 16;

impl EntityUpdateRecord {
    fn write(&self, out: &mut Vec<u8>) {
        out.write_u32::<BigEndian>(self.net_id).unwrap();
        out.write_u32::<BigEndian>(self.hp).unwrap();
        write_f32(out, self.x).unwrap();
        write_f32(out, self.y).unwrap();
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> Result<EntityUpdateRecord, ProtoError> {
        let net_id = cursor.read_u32::<BigEndian>().unwrap();
        let hp = cursor.read_u32::<BigEndian>().unwrap();
        let x = read_f32(cursor).unwrap();
        let y = read_f32(cursor).unwrap();
        Ok(EntityUpdateRecord { net_id, hp, x, y })
    }
}

/// Bit layout of `PlayerInput`'s direction mask (`spec.md` §4.1): bit 0 up,
/// bit 1 down, bit 2 left, bit 3 right, bit 4 fire.
pub const DIR_UP: u8 = 0b0000_0001;
pub const DIR_DOWN: u8 = 0b0000_0010;
pub const DIR_LEFT: u8 = 0b0000_0100;
pub const DIR_RIGHT: u8 = 0b0000_1000;
pub const DIR_FIRE: u8 = 0b0001_0000;

/// Datagram-channel (data plane) messages.
#[derive(Debug, Clone, PartialEq)]
pub enum DatagramMessage {
    ClientPing { timestamp: u32 },
    PlayerAssignment { net_id: NetId },
    EntityCreate(EntityRecord),
    EntityUpdate(Vec<EntityUpdateRecord>),
    EntityDestroy(Vec<NetId>),
    GameState(Vec<EntityRecord>),
    PlayerInput { event_type: u8, direction_mask: u8 },
}

mod datagram_type {
    pub const CLIENT_PING: u8 = 0x00;
    pub const PLAYER_ASSIGNMENT: u8 = 0x01;
    pub const ENTITY_CREATE: u8 = 0x10;
    pub const ENTITY_UPDATE: u8 = 0x11;
    pub const ENTITY_DESTROY: u8 = 0x12;
    pub const GAME_STATE: u8 = 0x13;
    pub const PLAYER_INPUT: u8 = 0x20;
}

impl DatagramMessage {
    pub fn message_type(&self) -> u8 {
        use datagram_type::*;
        match self {
            DatagramMessage::ClientPing { .. } => CLIENT_PING,
            DatagramMessage::PlayerAssignment { .. } => PLAYER_ASSIGNMENT,
            DatagramMessage::EntityCreate(_) => ENTITY_CREATE,
            DatagramMessage::EntityUpdate(_) => ENTITY_UPDATE,
            DatagramMessage::EntityDestroy(_) => ENTITY_DESTROY,
            DatagramMessage::GameState(_) => GAME_STATE,
            DatagramMessage::PlayerInput { .. } => PLAYER_INPUT,
        }
    }

    pub fn encode_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            DatagramMessage::ClientPing { timestamp } => out.write_u32::<BigEndian>(*timestamp).unwrap(),
            DatagramMessage::PlayerAssignment { net_id } => out.write_u32::<BigEndian>(*net_id).unwrap(),
            DatagramMessage::EntityCreate(record) => record.write(&mut out),
            DatagramMessage::EntityUpdate(records) => records.iter().for_each(|r| r.write(&mut out)),
            DatagramMessage::EntityDestroy(ids) => {
                ids.iter().for_each(|id| out.write_u32::<BigEndian>(*id).unwrap())
            }
            DatagramMessage::GameState(records) => {
                out.write_u32::<BigEndian>(records.len() as u32).unwrap();
                records.iter().for_each(|r| r.write(&mut out));
            }
            DatagramMessage::PlayerInput { event_type, direction_mask } => {
                out.push(*event_type);
                out.push(*direction_mask);
            }
        }
        out
    }

    /// Validate then decode, applying the exact per-type length rules of
    /// `spec.md` §4.1.
    pub fn decode(msg_type: u8, payload: &[u8]) -> Result<DatagramMessage, ProtoError> {
        use datagram_type::*;
        let len = payload.len();
        let mut cursor = Cursor::new(payload);

        let msg = match msg_type {
            CLIENT_PING => {
                require_len(payload, 4, msg_type)?;
                DatagramMessage::ClientPing { timestamp: cursor.read_u32::<BigEndian>().unwrap() }
            }
            PLAYER_ASSIGNMENT => {
                require_len(payload, 4, msg_type)?;
                DatagramMessage::PlayerAssignment { net_id: cursor.read_u32::<BigEndian>().unwrap() }
            }
            ENTITY_CREATE => {
                require_len(payload, ENTITY_RECORD_SIZE, msg_type)?;
                DatagramMessage::EntityCreate(EntityRecord::read(&mut cursor)?)
            }
            ENTITY_UPDATE => {
                if len == 0 || len % ENTITY_UPDATE_RECORD_SIZE != 0 {
                    return Err(ProtoError::InvalidPayloadSize(msg_type));
                }
                let mut records = Vec::with_capacity(len / ENTITY_UPDATE_RECORD_SIZE);
                for _ in 0..(len / ENTITY_UPDATE_RECORD_SIZE) {
                    records.push(EntityUpdateRecord::read(&mut cursor)?);
                }
                DatagramMessage::EntityUpdate(records)
            }
            ENTITY_DESTROY => {
                if len == 0 || len % 4 != 0 {
                    return Err(ProtoError::InvalidPayloadSize(msg_type));
                }
                let mut ids = Vec::with_capacity(len / 4);
                for _ in 0..(len / 4) {
                    ids.push(cursor.read_u32::<BigEndian>().unwrap());
                }
                DatagramMessage::EntityDestroy(ids)
            }
            GAME_STATE => {
                if len < 4 || (len - 4) % ENTITY_RECORD_SIZE != 0 {
                    return Err(ProtoError::InvalidPayloadSize(msg_type));
                }
                let count = cursor.read_u32::<BigEndian>().unwrap() as usize;
                if count != (len - 4) / ENTITY_RECORD_SIZE {
                    return Err(ProtoError::InvalidPayloadSize(msg_type));
                }
                let mut records = Vec::with_capacity(count);
                for _ in 0..count {
                    records.push(EntityRecord::read(&mut cursor)?);
                }
                DatagramMessage::GameState(records)
            }
            PLAYER_INPUT => {
                require_len(payload, 2, msg_type)?;
                DatagramMessage::PlayerInput { event_type: payload[0], direction_mask: payload[1] }
            }
            other => return Err(ProtoError::UnknownMessageType(other)),
        };

        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip_reliable(msg: ReliableMessage) {
        let payload = msg.encode_payload();
        let decoded = ReliableMessage::decode(msg.message_type(), &payload).unwrap();
        assert_eq!(decoded, msg);
    }

    fn roundtrip_datagram(msg: DatagramMessage) {
        let payload = msg.encode_payload();
        let decoded = DatagramMessage::decode(msg.message_type(), &payload).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn reliable_roundtrips() {
        roundtrip_reliable(ReliableMessage::Connect);
        roundtrip_reliable(ReliableMessage::ConnectAck(1));
        roundtrip_reliable(ReliableMessage::ConnectNak(ConnectNakReason::GameFull));
        roundtrip_reliable(ReliableMessage::CreateLobby { max_players: 4, name: "squad".into() });
        roundtrip_reliable(ReliableMessage::JoinLobbyAck {
            lobby: 7,
            your_player_id: 2,
            players: vec![PlayerInfo { client_id: 1, username: "a".into(), ready: true }],
        });
        roundtrip_reliable(ReliableMessage::GameStart { udp_port: 4242, server_id: 99 });
        roundtrip_reliable(ReliableMessage::Error(ServerErrorCode::ServerError));
    }

    #[test]
    fn datagram_roundtrips() {
        roundtrip_datagram(DatagramMessage::ClientPing { timestamp: 123 });
        roundtrip_datagram(DatagramMessage::PlayerAssignment { net_id: 77 });
        roundtrip_datagram(DatagramMessage::EntityCreate(EntityRecord {
            net_id: 1,
            kind: EntityKind::Player,
            hp: 100,
            x: 1.5,
            y: -2.25,
        }));
        roundtrip_datagram(DatagramMessage::EntityUpdate(vec![EntityUpdateRecord {
            net_id: 1,
            hp: 90,
            x: 2.0,
            y: 2.0,
        }]));
        roundtrip_datagram(DatagramMessage::EntityDestroy(vec![1, 2, 3]));
        roundtrip_datagram(DatagramMessage::GameState(vec![]));
        roundtrip_datagram(DatagramMessage::PlayerInput { event_type: 1, direction_mask: DIR_RIGHT });
    }

    #[test]
    fn connect_handshake_matches_literal_scenario_bytes() {
        // spec.md §8 scenario 1.
        assert_eq!(ReliableMessage::Connect.encode_payload(), Vec::<u8>::new());
        assert_eq!(ReliableMessage::Connect.message_type(), 0x01);

        let ack = ReliableMessage::ConnectAck(1);
        assert_eq!(ack.message_type(), 0x02);
        assert_eq!(ack.encode_payload(), vec![0x01]);
    }

    #[test]
    fn rejects_zero_length_player_input() {
        assert_eq!(
            DatagramMessage::decode(datagram_type::PLAYER_INPUT, &[]),
            Err(ProtoError::InvalidPayloadSize(datagram_type::PLAYER_INPUT))
        );
    }

    #[test]
    fn rejects_entity_update_not_multiple_of_16() {
        let payload = vec![0u8; 20];
        assert_eq!(
            DatagramMessage::decode(datagram_type::ENTITY_UPDATE, &payload),
            Err(ProtoError::InvalidPayloadSize(datagram_type::ENTITY_UPDATE))
        );
    }

    #[test]
    fn rejects_game_state_count_mismatch() {
        let mut payload = Vec::new();
        payload.write_u32::<BigEndian>(2).unwrap();
        payload.extend_from_slice(&[0u8; ENTITY_RECORD_SIZE]);
        assert_eq!(
            DatagramMessage::decode(datagram_type::GAME_STATE, &payload),
            Err(ProtoError::InvalidPayloadSize(datagram_type::GAME_STATE))
        );
    }
}
