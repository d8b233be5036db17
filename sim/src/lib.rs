//! `rt-sim` — ECS components, the fixed-timestep system schedule and the
//! delta snapshot engine (`spec.md` §3-§4, §6).

pub mod bridge;
pub mod components;
pub mod config;
pub mod events;
pub mod gameloop;
pub mod movement_pattern;
pub mod netid;
pub mod resources;
pub mod snapshot;
pub mod systems;

pub mod prelude {
    pub use crate::bridge::Bridge;
    pub use crate::components::*;
    pub use crate::config::ServerConfig;
    pub use crate::gameloop::GameLoop;
    pub use crate::netid::NetIdAllocator;
    pub use crate::resources::{NetIdIndex, PlayerIndex, WorldBounds};
    pub use crate::snapshot::{Delta, EntitySnapshot, SnapshotRing, WorldSnapshot};
}
