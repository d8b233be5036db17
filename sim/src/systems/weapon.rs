//! Schedule step 4 (`spec.md` §4.6 "Weapon firing"). Grounded on
//! `original_source/ecs/src/systems/*.cpp`'s weapon-firing pass for the
//! burst state machine; ported to persistent-field gating instead of a
//! per-frame scripted countdown.

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{AiInput, Input, Position, Projectile, Velocity, Weapon};
use crate::events::AiFireIntent;

pub struct WeaponSystem {
    game_time: f32,
}

impl WeaponSystem {
    pub fn new() -> Self {
        WeaponSystem { game_time: 0.0 }
    }
}

impl Default for WeaponSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn fire_intent(registry: &Registry, entity: EntityId, ai_fire_intents: &[EntityId]) -> bool {
    if let Some(input) = registry.get::<Input>(entity) {
        return input.fire;
    }
    if registry.has::<AiInput>(entity) {
        return ai_fire_intents.contains(&entity);
    }
    false
}

/// Spawn `weapon.projectile_count` projectiles centered on `facing`,
/// fanned across `spread_angle` degrees.
fn spawn_volley(registry: &mut Registry, owner: EntityId, weapon: &Weapon, origin: Position) {
    let facing = if weapon.friendly { 1.0 } else { -1.0 };
    let count = weapon.projectile_count.max(1);

    for i in 0..count {
        let angle_deg = if count == 1 {
            0.0
        } else {
            let half = weapon.spread_angle / 2.0;
            -half + (i as f32) * (weapon.spread_angle / (count - 1) as f32)
        };
        let angle_rad = angle_deg.to_radians();
        let (sin, cos) = angle_rad.sin_cos();
        let dx = facing * cos;
        let dy = facing * sin;

        let projectile = registry.spawn_entity();
        registry.insert(projectile, origin);
        registry.insert(projectile, Velocity { vx: dx * weapon.speed, vy: dy * weapon.speed });
        registry.insert(
            projectile,
            Projectile {
                damage: weapon.damage,
                speed: weapon.speed,
                friendly: weapon.friendly,
                age: 0.0,
                lifetime: weapon.lifetime,
                piercing: weapon.piercing,
                max_hits: weapon.max_hits,
                hits: 0,
                owner: Some(owner),
            },
        );
    }
}

impl System for WeaponSystem {
    fn name(&self) -> &'static str {
        "weapon"
    }

    fn run(&mut self, registry: &mut Registry, messages: &mut Bus, dt: f32) {
        self.game_time += dt;
        let now = self.game_time;

        let ai_fire_intents: Vec<EntityId> = messages.read::<AiFireIntent>().iter().map(|e| e.0).collect();

        let entities: Vec<EntityId> = registry.store::<Weapon>().map(|s| s.iter().map(|(e, _)| e).collect()).unwrap_or_default();

        for entity in entities {
            let Some(origin) = registry.get::<Position>(entity).copied() else { continue };
            let Some(mut weapon) = registry.get::<Weapon>(entity).copied() else { continue };
            let intent = fire_intent(registry, entity, &ai_fire_intents);
            let gate_period = 1.0 / weapon.fire_rate;

            if weapon.is_burst {
                if weapon.current_burst > 0 {
                    if now - weapon.last_burst_time >= weapon.burst_interval {
                        spawn_volley(registry, entity, &weapon, origin);
                        weapon.last_burst_time = now;
                        weapon.current_burst += 1;
                        if weapon.current_burst >= weapon.burst_count {
                            weapon.current_burst = 0;
                        }
                    }
                } else if intent && now - weapon.last_shot_time >= gate_period {
                    spawn_volley(registry, entity, &weapon, origin);
                    weapon.last_shot_time = now;
                    weapon.last_burst_time = now;
                    weapon.current_burst = if weapon.burst_count <= 1 { 0 } else { 1 };
                }
            } else if intent && now - weapon.last_shot_time >= gate_period {
                spawn_volley(registry, entity, &weapon, origin);
                weapon.last_shot_time = now;
            }

            if let Some(stored) = registry.get_mut::<Weapon>(entity) {
                *stored = weapon;
            }
        }
    }
}
