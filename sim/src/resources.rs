//! Registry resources (`spec.md` §3.2 ownership rule: "inter-entity
//! relations are expressed by NetId or EntityId values used as lookup
//! keys", not by components holding references to each other).

use hashbrown::HashMap;

use rt_ecs::entity::EntityId;
use rt_proto::messages::{ClientId, NetId};

/// `ClientId -> EntityId` for the client's player avatar, upholding I5 (at
/// most one `controllable` entity per `ClientId`) by construction: the
/// bridge only ever inserts one entry per client.
#[derive(Default, Clone)]
pub struct PlayerIndex {
    by_client: HashMap<ClientId, EntityId>,
}

impl PlayerIndex {
    pub fn insert(&mut self, client_id: ClientId, entity: EntityId) {
        self.by_client.insert(client_id, entity);
    }

    pub fn remove(&mut self, client_id: ClientId) -> Option<EntityId> {
        self.by_client.remove(&client_id)
    }

    pub fn get(&self, client_id: ClientId) -> Option<EntityId> {
        self.by_client.get(&client_id).copied()
    }
}

/// `NetId -> EntityId`, used by the bridge to translate acknowledgments
/// and by collision/score systems that need to go the other direction
/// (`EntityId -> NetId`) via the `network_entity` component instead.
#[derive(Default, Clone)]
pub struct NetIdIndex {
    by_net_id: HashMap<NetId, EntityId>,
}

impl NetIdIndex {
    pub fn insert(&mut self, net_id: NetId, entity: EntityId) {
        self.by_net_id.insert(net_id, entity);
    }

    pub fn remove(&mut self, net_id: NetId) {
        self.by_net_id.remove(&net_id);
    }

    pub fn get(&self, net_id: NetId) -> Option<EntityId> {
        self.by_net_id.get(&net_id).copied()
    }
}

/// World bounds, read by collision/cleanup/boss-bounce systems. A resource
/// rather than a constructor parameter on every system so `rt-server` can
/// build the schedule once from `ServerConfig` without threading the
/// values through each system's constructor by hand.
#[derive(Debug, Clone, Copy)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
    pub off_screen_margin: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        WorldBounds { width: 1920.0, height: 1080.0, off_screen_margin: 50.0 }
    }
}
