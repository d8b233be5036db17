//! Lobby manager (`spec.md` §4.4): named rooms bounded in capacity, holding
//! players until every one of them is `Ready`.
//!
//! New module — there is no lobby concept in the teacher, so this is
//! grounded on `flux::session`'s naming for client bookkeeping and on
//! `original_source/app/include/lobby_browser_menu.hpp` for the naming rule
//! (§4.4a: arbitrary non-empty UTF-8 up to 32 bytes, duplicates allowed
//! since a lobby is addressed by its `LobbyId`, never by name).

use hashbrown::HashMap;

use crate::messages::{ClientId, LobbyId};

pub const MAX_LOBBY_NAME_BYTES: usize = 32;
pub const MIN_LOBBY_CAPACITY: u8 = 2;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum LobbyStatus {
    Waiting,
    Ready,
    InGame,
}

#[derive(Debug, Clone)]
pub struct LobbyMember {
    pub client_id: ClientId,
    pub ready: bool,
}

pub struct Lobby {
    pub id: LobbyId,
    pub name: String,
    pub max_players: u8,
    members: Vec<LobbyMember>,
    status: LobbyStatus,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum LobbyError {
    InvalidName,
    CapacityOutOfRange,
    LobbyFull,
    UnknownLobby,
    AlreadyInLobby,
    NotInLobby,
}

impl Lobby {
    fn new(id: LobbyId, name: String, max_players: u8) -> Self {
        Lobby { id, name, max_players, members: Vec::new(), status: LobbyStatus::Waiting }
    }

    pub fn status(&self) -> LobbyStatus {
        self.status
    }

    pub fn members(&self) -> &[LobbyMember] {
        &self.members
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players as usize
    }

    fn recompute_status(&mut self) {
        if self.status == LobbyStatus::InGame {
            return;
        }
        self.status = if !self.members.is_empty() && self.members.iter().all(|m| m.ready) {
            LobbyStatus::Ready
        } else {
            LobbyStatus::Waiting
        };
    }

    fn set_ready(&mut self, client_id: ClientId) -> Result<(), LobbyError> {
        let member = self.members.iter_mut().find(|m| m.client_id == client_id).ok_or(LobbyError::NotInLobby)?;
        member.ready = true;
        self.recompute_status();
        Ok(())
    }

    pub fn start_game(&mut self) {
        self.status = LobbyStatus::InGame;
    }
}

/// Owns every live lobby plus the reverse index from client to lobby,
/// enforcing the one-lobby-per-client invariant.
#[derive(Default)]
pub struct LobbyManager {
    lobbies: HashMap<LobbyId, Lobby>,
    member_of: HashMap<ClientId, LobbyId>,
    next_id: LobbyId,
}

impl LobbyManager {
    pub fn new() -> Self {
        LobbyManager { lobbies: HashMap::new(), member_of: HashMap::new(), next_id: 1 }
    }

    fn validate_name(name: &str) -> Result<(), LobbyError> {
        if name.is_empty() || name.as_bytes().len() > MAX_LOBBY_NAME_BYTES {
            return Err(LobbyError::InvalidName);
        }
        Ok(())
    }

    pub fn create(&mut self, owner: ClientId, name: String, max_players: u8) -> Result<LobbyId, LobbyError> {
        Self::validate_name(&name)?;
        if max_players < MIN_LOBBY_CAPACITY {
            return Err(LobbyError::CapacityOutOfRange);
        }
        if self.member_of.contains_key(&owner) {
            return Err(LobbyError::AlreadyInLobby);
        }

        let id = self.next_id;
        self.next_id += 1;
        let mut lobby = Lobby::new(id, name, max_players);
        lobby.members.push(LobbyMember { client_id: owner, ready: false });
        self.lobbies.insert(id, lobby);
        self.member_of.insert(owner, id);
        Ok(id)
    }

    pub fn join(&mut self, client_id: ClientId, lobby_id: LobbyId) -> Result<&Lobby, LobbyError> {
        if self.member_of.contains_key(&client_id) {
            return Err(LobbyError::AlreadyInLobby);
        }
        let lobby = self.lobbies.get_mut(&lobby_id).ok_or(LobbyError::UnknownLobby)?;
        if lobby.is_full() {
            return Err(LobbyError::LobbyFull);
        }
        lobby.members.push(LobbyMember { client_id, ready: false });
        lobby.recompute_status();
        self.member_of.insert(client_id, lobby_id);
        Ok(self.lobbies.get(&lobby_id).expect("just inserted"))
    }

    pub fn leave(&mut self, client_id: ClientId) -> Result<LobbyId, LobbyError> {
        let lobby_id = self.member_of.remove(&client_id).ok_or(LobbyError::NotInLobby)?;
        if let Some(lobby) = self.lobbies.get_mut(&lobby_id) {
            lobby.members.retain(|m| m.client_id != client_id);
            if lobby.members.is_empty() {
                self.lobbies.remove(&lobby_id);
            } else {
                lobby.recompute_status();
            }
        }
        Ok(lobby_id)
    }

    pub fn set_ready(&mut self, client_id: ClientId) -> Result<&Lobby, LobbyError> {
        let lobby_id = *self.member_of.get(&client_id).ok_or(LobbyError::NotInLobby)?;
        let lobby = self.lobbies.get_mut(&lobby_id).ok_or(LobbyError::UnknownLobby)?;
        lobby.set_ready(client_id)?;
        Ok(lobby)
    }

    pub fn lobby_of(&self, client_id: ClientId) -> Option<&Lobby> {
        self.member_of.get(&client_id).and_then(|id| self.lobbies.get(id))
    }

    pub fn get(&self, lobby_id: LobbyId) -> Option<&Lobby> {
        self.lobbies.get(&lobby_id)
    }

    /// `Ready -> InGame`, called by the server loop once it actually begins
    /// simulating this lobby's game.
    pub fn start_game(&mut self, lobby_id: LobbyId) -> Result<(), LobbyError> {
        let lobby = self.lobbies.get_mut(&lobby_id).ok_or(LobbyError::UnknownLobby)?;
        lobby.start_game();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_join_then_ready_transitions_to_ready() {
        let mut mgr = LobbyManager::new();
        let id = mgr.create(1, "squad".into(), 2).unwrap();
        mgr.join(2, id).unwrap();
        assert_eq!(mgr.get(id).unwrap().status(), LobbyStatus::Waiting);

        mgr.set_ready(1).unwrap();
        assert_eq!(mgr.get(id).unwrap().status(), LobbyStatus::Waiting);
        mgr.set_ready(2).unwrap();
        assert_eq!(mgr.get(id).unwrap().status(), LobbyStatus::Ready);
    }

    #[test]
    fn join_rejects_full_lobby() {
        let mut mgr = LobbyManager::new();
        let id = mgr.create(1, "squad".into(), 2).unwrap();
        mgr.join(2, id).unwrap();
        assert_eq!(mgr.join(3, id), Err(LobbyError::LobbyFull));
    }

    #[test]
    fn duplicate_names_are_allowed() {
        let mut mgr = LobbyManager::new();
        let a = mgr.create(1, "squad".into(), 2).unwrap();
        let b = mgr.create(2, "squad".into(), 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn client_cannot_join_two_lobbies() {
        let mut mgr = LobbyManager::new();
        let id = mgr.create(1, "a".into(), 4).unwrap();
        assert_eq!(mgr.create(1, "b".into(), 4).err(), Some(LobbyError::AlreadyInLobby));
        assert_eq!(mgr.join(1, id).err(), Some(LobbyError::AlreadyInLobby));
    }

    #[test]
    fn leaving_empties_and_removes_lobby() {
        let mut mgr = LobbyManager::new();
        let id = mgr.create(1, "a".into(), 4).unwrap();
        mgr.leave(1).unwrap();
        assert!(mgr.get(id).is_none());
    }

    #[test]
    fn start_game_transitions_ready_lobby_to_in_game() {
        let mut mgr = LobbyManager::new();
        let id = mgr.create(1, "squad".into(), 2).unwrap();
        mgr.join(2, id).unwrap();
        mgr.set_ready(1).unwrap();
        mgr.set_ready(2).unwrap();
        assert_eq!(mgr.get(id).unwrap().status(), LobbyStatus::Ready);

        mgr.start_game(id).unwrap();
        assert_eq!(mgr.get(id).unwrap().status(), LobbyStatus::InGame);
    }

    #[test]
    fn rejects_oversized_name() {
        let mut mgr = LobbyManager::new();
        let name = "x".repeat(MAX_LOBBY_NAME_BYTES + 1);
        assert_eq!(mgr.create(1, name, 2).err(), Some(LobbyError::InvalidName));
    }
}
