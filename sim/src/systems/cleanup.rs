//! Schedule step 11 (`spec.md` §4.6 "Cleanup"): silently prune enemies
//! that have drifted past the left margin — distinct from
//! `projectile_lifetime`, which owns projectile expiry on all four edges.

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{Enemy, Position};
use crate::resources::WorldBounds;

pub struct CleanupSystem;

impl System for CleanupSystem {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn run(&mut self, registry: &mut Registry, _messages: &mut Bus, _dt: f32) {
        let bounds = registry.resource::<WorldBounds>().copied().unwrap_or_default();

        let enemies: Vec<(EntityId, Position)> = registry
            .store::<Enemy>()
            .map(|s| s.iter().filter_map(|(e, _)| registry.get::<Position>(e).map(|pos| (e, *pos))).collect())
            .unwrap_or_default();

        for (entity, pos) in enemies {
            if pos.x < -bounds.off_screen_margin {
                registry.kill_entity(entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{EnemyKind, Score};

    fn bounds() -> WorldBounds {
        WorldBounds { width: 1920.0, height: 1080.0, off_screen_margin: 50.0 }
    }

    fn enemy() -> Enemy {
        Enemy { kind: EnemyKind::Plain, pattern_timer: 0.0, score_value: 5, vertical_speed: 0.0 }
    }

    #[test]
    fn prunes_enemy_past_left_margin() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        registry.insert_resource(bounds());

        let e = registry.spawn_entity();
        registry.insert(e, Position { x: -51.0, y: 0.0 });
        registry.insert(e, enemy());

        let mut system = CleanupSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert!(!registry.is_alive(e));
    }

    #[test]
    fn does_not_prune_enemy_past_right_margin() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        registry.insert_resource(bounds());

        let e = registry.spawn_entity();
        registry.insert(e, Position { x: 2100.0, y: 0.0 });
        registry.insert(e, enemy());

        let mut system = CleanupSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert!(registry.is_alive(e));
    }

    #[test]
    fn keeps_enemy_within_bounds() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        registry.insert_resource(bounds());

        let e = registry.spawn_entity();
        registry.insert(e, Position { x: 900.0, y: 500.0 });
        registry.insert(e, enemy());

        let mut system = CleanupSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert!(registry.is_alive(e));
    }

    #[test]
    fn does_not_touch_non_enemy_entities() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        registry.insert_resource(bounds());

        let player = registry.spawn_entity();
        registry.insert(player, Position { x: 5000.0, y: 0.0 });
        registry.insert(player, Score::default());

        let mut system = CleanupSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert!(registry.is_alive(player));
    }
}
