//! Bus message types systems use to communicate intra-tick, without
//! reaching into each other's component stores directly (`spec.md` §4.5's
//! systems "operate on a declared set of component stores").

use rt_ecs::entity::EntityId;
use rt_proto::messages::ClientId;

/// Published by the AI-input system (schedule step 2) for any entity whose
/// fire timer crossed its interval this tick; consumed by weapon firing
/// (step 4) as the `ai_input.fire` half of the fire-intent contract in
/// §4.6 ("from `input.fire` or `ai_input.fire`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiFireIntent(pub EntityId);

/// A validated `PlayerInput` datagram, queued by the network bridge and
/// consumed by the input-application system (step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerInputEvent {
    pub client_id: ClientId,
    pub event_type: u8,
    pub direction_mask: u8,
}

/// Published by collision (step 7) for the health system (step 8) to
/// consume; staging damage as an event rather than a direct write keeps
/// collision from needing mutable access to `Health` while it is still
/// iterating the hitbox stores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target: EntityId,
    pub amount: i32,
    /// The entity whose projectile most recently landed this hit, used for
    /// the kill-credit tie-break in §4.6.
    pub source: Option<EntityId>,
}

