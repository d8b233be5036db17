//! Component definitions (`spec.md` §3.2). Each is a small plain-data
//! record stored in a `rt_ecs::component::ComponentStore`; none holds a
//! reference to another entity; cross-entity relations go through
//! `NetId`/`EntityId` values looked up in the registry, per §3.2's
//! ownership rule.

use rt_proto::messages::{ClientId, EntityKind, NetId};

use crate::movement_pattern::MovementPattern;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

/// Latest input state received for a player, as decoded from the
/// datagram channel's direction mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Input {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl Input {
    pub fn from_mask(mask: u8) -> Input {
        Input {
            up: mask & rt_proto::messages::DIR_UP != 0,
            down: mask & rt_proto::messages::DIR_DOWN != 0,
            left: mask & rt_proto::messages::DIR_LEFT != 0,
            right: mask & rt_proto::messages::DIR_RIGHT != 0,
            fire: mask & rt_proto::messages::DIR_FIRE != 0,
        }
    }

    /// The silent, all-false input substituted during `spec.md` §4.3's
    /// UDP-silence grace window.
    pub fn silent() -> Input {
        Input::default()
    }
}

/// Marks a player entity as directly steerable; `last_vy` is read by the
/// boss bounce and by AI patterns that mirror the player's vertical sense.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controllable {
    pub speed: f32,
    pub last_vy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current_hp: i32,
    pub max_hp: i32,
    pub pending_damage: i32,
}

impl Health {
    pub fn new(max_hp: i32) -> Health {
        Health { current_hp: max_hp, max_hp, pending_damage: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub fire_rate: f32,
    pub last_shot_time: f32,
    pub friendly: bool,
    pub projectile_count: u32,
    pub spread_angle: f32,
    pub movement_pattern: MovementPattern,
    pub damage: i32,
    pub speed: f32,
    pub lifetime: f32,
    pub piercing: bool,
    pub max_hits: u32,
    pub is_burst: bool,
    pub burst_count: u32,
    pub current_burst: u32,
    pub burst_interval: f32,
    pub last_burst_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub damage: i32,
    pub speed: f32,
    pub friendly: bool,
    pub age: f32,
    pub lifetime: f32,
    pub piercing: bool,
    pub max_hits: u32,
    pub hits: u32,
    /// EntityId of the owner, used for collision tie-breaks when crediting
    /// a kill. `None` once the owner has despawned.
    pub owner: Option<rt_ecs::entity::EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Plain,
    Zigzag,
    Boss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pattern_timer: f32,
    pub score_value: u32,
    /// Explicit boss vertical velocity (`spec.md` §4.6a), flipped at world
    /// margins independent of whatever `movement_pattern` contributes.
    pub vertical_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiInput {
    pub auto_fire: bool,
    pub fire_timer: f32,
    pub fire_interval: f32,
    pub movement_pattern: MovementPattern,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Hitbox {
    pub fn aabb(&self, pos: Position) -> Aabb {
        Aabb {
            min_x: pos.x + self.offset_x,
            min_y: pos.y + self.offset_y,
            max_x: pos.x + self.offset_x + self.width,
            max_y: pos.y + self.offset_y + self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x && self.max_x > other.min_x && self.min_y < other.max_y && self.max_y > other.min_y
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Score {
    pub current_score: u32,
    pub enemies_killed: u32,
    pub survival_time: f32,
    pub last_time_point_awarded: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkEntity {
    pub net_id: NetId,
    pub owner_client_id: Option<ClientId>,
    pub synced: bool,
    pub entity_type_tag: EntityKind,
}
