//! Schedule step 8 (`spec.md` §4.6 "Health"): apply staged damage, clamp,
//! destroy entities at zero hp and award the enemy-kill credit (I3).

use hashbrown::HashMap;

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{Enemy, EnemyKind, Health, Score};
use crate::events::DamageEvent;
use crate::systems::collision::{BOSS_KILL_REWARD, ENEMY_KILL_REWARD};

pub struct HealthSystem;

impl System for HealthSystem {
    fn name(&self) -> &'static str {
        "health"
    }

    fn run(&mut self, registry: &mut Registry, messages: &mut Bus, _dt: f32) {
        let mut most_recent_source: HashMap<EntityId, Option<EntityId>> = HashMap::new();
        for event in messages.read::<DamageEvent>() {
            if let Some(health) = registry.get_mut::<Health>(event.target) {
                health.pending_damage += event.amount;
            }
            most_recent_source.insert(event.target, event.source);
        }

        let entities: Vec<EntityId> = registry.store::<Health>().map(|s| s.iter().map(|(e, _)| e).collect()).unwrap_or_default();
        let all_players: Vec<EntityId> = registry.store::<Score>().map(|s| s.iter().map(|(e, _)| e).collect()).unwrap_or_default();

        for entity in entities {
            let Some(health) = registry.get_mut::<Health>(entity) else { continue };
            health.current_hp = (health.current_hp - health.pending_damage).clamp(0, health.max_hp);
            health.pending_damage = 0;
            let dead = health.current_hp == 0;

            if dead {
                if registry.has::<Enemy>(entity) {
                    let is_boss = registry.get::<Enemy>(entity).map(|e| e.kind == EnemyKind::Boss).unwrap_or(false);
                    let reward = if is_boss { BOSS_KILL_REWARD } else { ENEMY_KILL_REWARD };
                    let source = most_recent_source.get(&entity).copied().flatten();
                    let credited = source.filter(|s| registry.is_alive(*s)).or_else(|| all_players.iter().find(|&&p| registry.is_alive(p)).copied());
                    if let Some(player) = credited {
                        if let Some(score) = registry.get_mut::<Score>(player) {
                            score.current_score += reward;
                            score.enemies_killed += 1;
                        }
                    }
                }
                registry.kill_entity(entity);
            }
        }
    }
}
