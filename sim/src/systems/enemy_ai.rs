//! Schedule step 9 (`spec.md` §4.6a): boss vertical bounce. Owns the
//! velocity of `boss`-kind enemies outright — step 2 (`ai_input`) skips
//! them deliberately so there is exactly one writer.
//!
//! Grounded on `original_source/app/include/boss_manager.hpp`'s bounce at
//! the top/bottom of the play field.

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{AiInput, Enemy, EnemyKind, Position, Velocity};
use crate::movement_pattern::advance_and_apply;
use crate::resources::WorldBounds;

pub struct EnemyAiSystem;

impl System for EnemyAiSystem {
    fn name(&self) -> &'static str {
        "enemy_ai"
    }

    fn run(&mut self, registry: &mut Registry, _messages: &mut Bus, dt: f32) {
        let bounds = registry.resource::<WorldBounds>().copied().unwrap_or_default();

        let bosses: Vec<EntityId> = registry
            .store::<Enemy>()
            .map(|s| s.iter().filter(|(_, e)| e.kind == EnemyKind::Boss).map(|(e, _)| e).collect())
            .unwrap_or_default();

        for entity in bosses {
            let Some(position) = registry.get::<Position>(entity).copied() else { continue };
            let Some(mut enemy) = registry.get::<Enemy>(entity).copied() else { continue };

            if position.y <= 0.0 && enemy.vertical_speed < 0.0 {
                enemy.vertical_speed = -enemy.vertical_speed;
            } else if position.y >= bounds.height && enemy.vertical_speed > 0.0 {
                enemy.vertical_speed = -enemy.vertical_speed;
            }

            let mut vx = 0.0;
            if let Some(ai) = registry.get::<AiInput>(entity) {
                if ai.movement_pattern.base_speed() > 0.0 {
                    let (pattern_vx, _) = advance_and_apply(&ai.movement_pattern, &mut enemy.pattern_timer, dt);
                    vx = pattern_vx;
                }
            }

            if let Some(stored) = registry.get_mut::<Enemy>(entity) {
                *stored = enemy;
            }
            if let Some(velocity) = registry.get_mut::<Velocity>(entity) {
                velocity.vx = vx;
                velocity.vy = enemy.vertical_speed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement_pattern::MovementPattern;

    fn boss(vertical_speed: f32) -> Enemy {
        Enemy { kind: EnemyKind::Boss, pattern_timer: 0.0, score_value: 50, vertical_speed }
    }

    #[test]
    fn bounces_off_bottom_margin() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        registry.insert_resource(WorldBounds { width: 1920.0, height: 1080.0, off_screen_margin: 50.0 });

        let e = registry.spawn_entity();
        registry.insert(e, Position { x: 100.0, y: 1080.0 });
        registry.insert(e, boss(20.0));
        registry.insert(e, Velocity { vx: 0.0, vy: 0.0 });

        let mut system = EnemyAiSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Enemy>(e).unwrap().vertical_speed, -20.0);
        assert_eq!(registry.get::<Velocity>(e).unwrap().vy, -20.0);
    }

    #[test]
    fn zero_base_speed_pattern_contributes_nothing_horizontal() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        registry.insert_resource(WorldBounds::default());

        let e = registry.spawn_entity();
        registry.insert(e, Position { x: 100.0, y: 500.0 });
        registry.insert(e, boss(10.0));
        registry.insert(e, Velocity { vx: 5.0, vy: 0.0 });
        registry.insert(
            e,
            AiInput { auto_fire: false, fire_timer: 0.0, fire_interval: 1.0, movement_pattern: MovementPattern::Straight { speed: 0.0 } },
        );

        let mut system = EnemyAiSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Velocity>(e).unwrap().vx, 0.0);
    }

    #[test]
    fn positive_base_speed_pattern_contributes_horizontal() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        registry.insert_resource(WorldBounds::default());

        let e = registry.spawn_entity();
        registry.insert(e, Position { x: 100.0, y: 500.0 });
        registry.insert(e, boss(10.0));
        registry.insert(e, Velocity { vx: 0.0, vy: 0.0 });
        registry.insert(
            e,
            AiInput { auto_fire: false, fire_timer: 0.0, fire_interval: 1.0, movement_pattern: MovementPattern::Straight { speed: 30.0 } },
        );

        let mut system = EnemyAiSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Velocity>(e).unwrap().vx, -30.0);
    }
}
