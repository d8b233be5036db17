//! Schedule step 12 (`spec.md` §4.8 "Snapshot build"): iterate the
//! `network_entity` store and emit one `EntitySnapshot` per present
//! entity, folding in position, velocity, health and score.

use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{Health, NetworkEntity, Position, Score, Velocity};
use crate::snapshot::{EntitySnapshot, SnapshotRing, WorldSnapshot};

/// Writes into the `SnapshotRing` resource (installed by whoever builds the
/// `World`) rather than owning history itself, so the network bridge can
/// read the ring back out through the same `Registry` the systems share.
pub struct SnapshotBuildSystem {
    tick: u32,
    timestamp_ms_per_tick: u64,
}

impl SnapshotBuildSystem {
    pub fn new(timestamp_ms_per_tick: u64) -> Self {
        SnapshotBuildSystem { tick: 0, timestamp_ms_per_tick }
    }
}

impl System for SnapshotBuildSystem {
    fn name(&self) -> &'static str {
        "snapshot_build"
    }

    fn run(&mut self, registry: &mut Registry, _messages: &mut Bus, _dt: f32) {
        let records: Vec<EntitySnapshot> = registry
            .store::<NetworkEntity>()
            .map(|s| {
                s.iter()
                    .filter_map(|(entity, net)| {
                        let pos = registry.get::<Position>(entity)?;
                        let vel = registry.get::<Velocity>(entity).copied().unwrap_or(Velocity { vx: 0.0, vy: 0.0 });
                        let hp = registry.get::<Health>(entity).map(|h| h.current_hp.max(0) as u32).unwrap_or(0);
                        let score = registry.get::<Score>(entity).map(|s| s.current_score).unwrap_or(0);
                        Some(EntitySnapshot {
                            net_id: net.net_id,
                            kind: net.entity_type_tag,
                            x: pos.x,
                            y: pos.y,
                            vx: vel.vx,
                            vy: vel.vy,
                            hp,
                            score,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.tick += 1;
        let timestamp = self.tick as u64 * self.timestamp_ms_per_tick;
        if let Some(ring) = registry.resource_mut::<SnapshotRing>() {
            ring.push(WorldSnapshot { tick: self.tick, timestamp, records });
        }
    }
}
