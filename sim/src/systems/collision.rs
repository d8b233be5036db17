//! Schedule step 7 (`spec.md` §4.6 "Collision"). AABB collision of every
//! projectile against every non-projectile entity holding a `hitbox`, plus
//! player AABBs against enemy AABBs. Grounded on
//! `original_source/ecs/src/systems/collision_system.cpp`.

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{Aabb, Controllable, Enemy, Health, Hitbox, Position, Projectile, Score};
use crate::events::DamageEvent;

const PLAYER_ENEMY_CONTACT_DAMAGE: i32 = 10;
pub const ENEMY_KILL_REWARD: u32 = 5;
pub const BOSS_KILL_REWARD: u32 = 50;

pub struct CollisionSystem;

fn award_kill(registry: &mut Registry, credited_player: Option<EntityId>, reward: u32) {
    let Some(player) = credited_player else { return };
    if let Some(score) = registry.get_mut::<Score>(player) {
        score.current_score += reward;
        score.enemies_killed += 1;
    }
}

/// Tie-break fallback from `spec.md` §9: iterate players in `ClientId`
/// order (here, entity spawn order stands in for it since players are
/// addressed by `EntityId` once in the registry) and credit the first
/// living one.
fn fallback_credit(registry: &Registry, players: &[EntityId]) -> Option<EntityId> {
    players.iter().find(|&&p| registry.is_alive(p)).copied()
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn run(&mut self, registry: &mut Registry, messages: &mut Bus, _dt: f32) {
        let projectiles: Vec<(EntityId, Projectile, Position)> = registry
            .store::<Projectile>()
            .map(|s| {
                s.iter()
                    .filter_map(|(e, p)| registry.get::<Position>(e).map(|pos| (e, *p, *pos)))
                    .collect()
            })
            .unwrap_or_default();

        let targets: Vec<(EntityId, Hitbox, Position)> = registry
            .store::<Hitbox>()
            .map(|s| {
                s.iter()
                    .filter(|(e, _)| !registry.has::<Projectile>(*e))
                    .filter_map(|(e, h)| registry.get::<Position>(e).map(|pos| (e, *h, *pos)))
                    .collect()
            })
            .unwrap_or_default();

        let players: Vec<EntityId> = registry.store::<Controllable>().map(|s| s.iter().map(|(e, _)| e).collect()).unwrap_or_default();

        let mut to_destroy: Vec<EntityId> = Vec::new();

        for (proj_entity, projectile, proj_pos) in &projectiles {
            if to_destroy.contains(proj_entity) {
                continue;
            }
            for (target_entity, hitbox, target_pos) in &targets {
                if target_entity == proj_entity {
                    continue;
                }
                if projectile.friendly == registry.has::<Controllable>(*target_entity) {
                    // friendly fire is not modeled: a friendly projectile
                    // only damages non-player targets and vice versa.
                    continue;
                }

                let proj_box = Aabb {
                    min_x: proj_pos.x - 2.0,
                    min_y: proj_pos.y - 2.0,
                    max_x: proj_pos.x + 2.0,
                    max_y: proj_pos.y + 2.0,
                };
                if !proj_box.intersects(&hitbox.aabb(*target_pos)) {
                    continue;
                }

                if registry.has::<Health>(*target_entity) {
                    messages.publish(DamageEvent { target: *target_entity, amount: projectile.damage, source: projectile.owner });
                } else {
                    to_destroy.push(*target_entity);
                    let credited = projectile.owner.filter(|o| registry.is_alive(*o)).or_else(|| fallback_credit(registry, &players));
                    let reward =
                        if registry.get::<Enemy>(*target_entity).map(|e| e.kind == crate::components::EnemyKind::Boss).unwrap_or(false) {
                            BOSS_KILL_REWARD
                        } else {
                            ENEMY_KILL_REWARD
                        };
                    award_kill(registry, credited, reward);
                }

                let hits = projectile.hits + 1;
                if !projectile.piercing || hits >= projectile.max_hits {
                    to_destroy.push(*proj_entity);
                }
                if let Some(stored) = registry.get_mut::<Projectile>(*proj_entity) {
                    stored.hits = hits;
                }
            }
        }

        // Player/enemy direct contact.
        let enemies: Vec<(EntityId, Hitbox, Position)> = targets
            .iter()
            .filter(|(e, _, _)| registry.has::<Enemy>(*e))
            .cloned()
            .collect();
        let player_boxes: Vec<(EntityId, Hitbox, Position)> =
            targets.iter().filter(|(e, _, _)| registry.has::<Controllable>(*e)).cloned().collect();

        for (player_entity, player_hitbox, player_pos) in &player_boxes {
            for (enemy_entity, enemy_hitbox, enemy_pos) in &enemies {
                if !player_hitbox.aabb(*player_pos).intersects(&enemy_hitbox.aabb(*enemy_pos)) {
                    continue;
                }
                let player_has_health = registry.has::<Health>(*player_entity);
                let enemy_has_health = registry.has::<Health>(*enemy_entity);

                if player_has_health && enemy_has_health {
                    messages.publish(DamageEvent { target: *player_entity, amount: PLAYER_ENEMY_CONTACT_DAMAGE, source: Some(*enemy_entity) });
                    messages.publish(DamageEvent { target: *enemy_entity, amount: PLAYER_ENEMY_CONTACT_DAMAGE, source: Some(*player_entity) });
                } else {
                    to_destroy.push(*player_entity);
                    to_destroy.push(*enemy_entity);
                }
            }
        }

        for entity in to_destroy {
            if registry.is_alive(entity) {
                registry.kill_entity(entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Enemy, EnemyKind, Velocity};

    fn basic_hitbox() -> Hitbox {
        Hitbox { width: 10.0, height: 10.0, offset_x: 0.0, offset_y: 0.0 }
    }

    #[test]
    fn friendly_projectile_destroys_healthless_enemy_and_awards_shooter() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();

        let player = registry.spawn_entity();
        registry.insert(player, Score::default());
        registry.insert(player, Controllable { speed: 0.0, last_vy: 0.0 });
        registry.insert(player, Position { x: -100.0, y: 0.0 });
        registry.insert(player, basic_hitbox());

        let enemy = registry.spawn_entity();
        registry.insert(enemy, Enemy { kind: EnemyKind::Plain, pattern_timer: 0.0, score_value: 5, vertical_speed: 0.0 });
        registry.insert(enemy, Position { x: 0.0, y: 0.0 });
        registry.insert(enemy, basic_hitbox());

        let projectile = registry.spawn_entity();
        registry.insert(projectile, Position { x: 0.0, y: 0.0 });
        registry.insert(projectile, Velocity { vx: 0.0, vy: 0.0 });
        registry.insert(
            projectile,
            Projectile { damage: 10, speed: 0.0, friendly: true, age: 0.0, lifetime: 1.0, piercing: false, max_hits: 1, hits: 0, owner: Some(player) },
        );

        let mut system = CollisionSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert!(!registry.is_alive(enemy));
        assert!(!registry.is_alive(projectile));
        assert_eq!(registry.get::<Score>(player).unwrap().current_score, ENEMY_KILL_REWARD);
    }

    #[test]
    fn projectile_vs_health_target_stages_damage_event() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();

        let enemy = registry.spawn_entity();
        registry.insert(enemy, Enemy { kind: EnemyKind::Plain, pattern_timer: 0.0, score_value: 5, vertical_speed: 0.0 });
        registry.insert(enemy, Position { x: 0.0, y: 0.0 });
        registry.insert(enemy, basic_hitbox());
        registry.insert(enemy, Health::new(20));

        let projectile = registry.spawn_entity();
        registry.insert(projectile, Position { x: 0.0, y: 0.0 });
        registry.insert(projectile, Velocity { vx: 0.0, vy: 0.0 });
        registry.insert(
            projectile,
            Projectile { damage: 10, speed: 0.0, friendly: true, age: 0.0, lifetime: 1.0, piercing: false, max_hits: 1, hits: 0, owner: None },
        );

        let mut system = CollisionSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(bus.read::<DamageEvent>(), &[DamageEvent { target: enemy, amount: 10, source: None }]);
        assert!(!registry.is_alive(projectile));
        assert!(registry.is_alive(enemy));
    }
}
