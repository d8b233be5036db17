//! Schedule steps 1-12 of `spec.md` §4.5, one module per step.

pub mod ai_input;
pub mod cleanup;
pub mod collision;
pub mod control;
pub mod enemy_ai;
pub mod health;
pub mod input_apply;
pub mod movement;
pub mod projectile_lifetime;
pub mod score;
pub mod snapshot_build;
pub mod weapon;

use rt_ecs::world::World;

use crate::config::ServerConfig;

/// Register every system in schedule order. Mirrors the teacher's
/// `game::core::register_systems`, generalized from a fixed plugin list to
/// this crate's fixed 12-step schedule.
pub fn register_all(world: &mut World, config: &ServerConfig) {
    world.register_system(input_apply::InputApplySystem);
    world.register_system(ai_input::AiInputSystem);
    world.register_system(control::ControlSystem);
    world.register_system(weapon::WeaponSystem::new());
    world.register_system(movement::MovementSystem);
    world.register_system(projectile_lifetime::ProjectileLifetimeSystem);
    world.register_system(collision::CollisionSystem);
    world.register_system(health::HealthSystem);
    world.register_system(enemy_ai::EnemyAiSystem);
    world.register_system(score::ScoreSystem);
    world.register_system(cleanup::CleanupSystem);
    world.register_system(snapshot_build::SnapshotBuildSystem::new((config.tick_duration().as_secs_f64() * 1000.0) as u64));
}
