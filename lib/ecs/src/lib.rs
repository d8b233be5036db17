//! `rt-ecs` — the entity-component-system registry and fixed-step world
//! scheduler underpinning the simulation.
//!
//! Grounded on `neutronium::{entity, component, registry, world}`, but
//! traded the teacher's archetype/shard storage (bitflag component ids,
//! nightly-only `Unsize`/`type_name` intrinsics) for the plain sparse-array
//! model `spec.md` §4.5 and §3.3 (I1-I7) actually call for: one densely
//! packed `Vec<Option<T>>` per component type, indexed directly by
//! `EntityId`. `original_source/ecs/include/sparse_array.hpp` is the same
//! shape, confirming the distilled spec's storage contract.

pub mod component;
pub mod entity;
pub mod messagebus;
pub mod registry;
pub mod system;
pub mod world;

pub mod prelude {
    pub use crate::component::Component;
    pub use crate::entity::EntityId;
    pub use crate::messagebus::{Bus, Message};
    pub use crate::registry::Registry;
    pub use crate::system::System;
    pub use crate::world::World;
}
