//! Schedule step 2 (`spec.md` §4.5): advance AI fire timers and compute AI
//! velocities via movement patterns. Boss enemies are excluded from the
//! pattern-velocity write here — their velocity is fully owned by the
//! enemy/boss AI system at step 9 (§4.6a).

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{AiInput, Enemy, EnemyKind, Velocity};
use crate::events::AiFireIntent;
use crate::movement_pattern::advance_and_apply;

pub struct AiInputSystem;

impl System for AiInputSystem {
    fn name(&self) -> &'static str {
        "ai_input"
    }

    fn run(&mut self, registry: &mut Registry, messages: &mut Bus, dt: f32) {
        let entities: Vec<EntityId> = registry.store::<AiInput>().map(|s| s.iter().map(|(e, _)| e).collect()).unwrap_or_default();

        for entity in entities {
            let Some(ai) = registry.get::<AiInput>(entity).copied() else { continue };

            let mut fire_timer = ai.fire_timer + dt;
            let mut fired = false;
            if ai.auto_fire && fire_timer >= ai.fire_interval {
                fire_timer -= ai.fire_interval;
                fired = true;
            }
            if let Some(ai_mut) = registry.get_mut::<AiInput>(entity) {
                ai_mut.fire_timer = fire_timer;
            }
            if fired {
                messages.publish(AiFireIntent(entity));
            }

            let is_boss = registry.get::<Enemy>(entity).map(|e| e.kind == EnemyKind::Boss).unwrap_or(false);
            if is_boss {
                continue;
            }

            let Some(enemy) = registry.get_mut::<Enemy>(entity) else { continue };
            let (vx, vy) = advance_and_apply(&ai.movement_pattern, &mut enemy.pattern_timer, dt);
            if let Some(velocity) = registry.get_mut::<Velocity>(entity) {
                velocity.vx = vx;
                velocity.vy = vy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement_pattern::MovementPattern;

    #[test]
    fn non_boss_velocity_follows_pattern() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        registry.insert(
            e,
            AiInput {
                auto_fire: false,
                fire_timer: 0.0,
                fire_interval: 1.0,
                movement_pattern: MovementPattern::Straight { speed: 50.0 },
            },
        );
        registry.insert(e, Enemy { kind: EnemyKind::Plain, pattern_timer: 0.0, score_value: 5, vertical_speed: 0.0 });
        registry.insert(e, Velocity { vx: 0.0, vy: 0.0 });

        let mut system = AiInputSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Velocity>(e).unwrap().vx, -50.0);
    }

    #[test]
    fn boss_velocity_is_untouched() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        registry.insert(
            e,
            AiInput {
                auto_fire: false,
                fire_timer: 0.0,
                fire_interval: 1.0,
                movement_pattern: MovementPattern::Straight { speed: 50.0 },
            },
        );
        registry.insert(e, Enemy { kind: EnemyKind::Boss, pattern_timer: 0.0, score_value: 50, vertical_speed: 30.0 });
        registry.insert(e, Velocity { vx: 7.0, vy: 7.0 });

        let mut system = AiInputSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Velocity>(e).unwrap(), &Velocity { vx: 7.0, vy: 7.0 });
    }

    #[test]
    fn fire_timer_publishes_intent_once_interval_elapsed() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        registry.insert(
            e,
            AiInput {
                auto_fire: true,
                fire_timer: 0.95,
                fire_interval: 1.0,
                movement_pattern: MovementPattern::Straight { speed: 0.0 },
            },
        );

        let mut system = AiInputSystem;
        system.run(&mut registry, &mut bus, 0.1);

        assert_eq!(bus.read::<AiFireIntent>(), &[AiFireIntent(e)]);
    }
}
