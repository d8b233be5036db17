//! Dual-transport wire protocol for the R-Type server core: the shared
//! 8-byte frame header, the reliable- and datagram-channel message sets,
//! the per-client connection state machine, the lobby manager and the
//! mio-driven transport loop that moves bytes between sockets and the
//! simulation thread.

pub mod buffer;
pub mod conn;
pub mod error;
pub mod frame;
pub mod lobby;
pub mod messages;
pub mod transport;

pub mod prelude {
    pub use crate::conn::{Connection, ConnectionError, ConnectionState};
    pub use crate::error::ProtoError;
    pub use crate::frame::{Header, HEADER_SIZE};
    pub use crate::lobby::{Lobby, LobbyError, LobbyManager, LobbyStatus};
    pub use crate::messages::{ClientId, DatagramMessage, LobbyId, NetId, ReliableMessage};
    pub use crate::transport::{InboundEvent, InputQueue, Transport};
}
