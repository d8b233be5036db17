//! Schedule step 6 (`spec.md` §4.6 "Projectile lifetime"): age projectiles
//! and destroy the ones that expired or left the playfield. Hit-budget
//! destruction is owned by the collision system (step 7), which runs next
//! and has the hit information; this system only knows about age and
//! position.

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{Position, Projectile};
use crate::resources::WorldBounds;

pub struct ProjectileLifetimeSystem;

impl System for ProjectileLifetimeSystem {
    fn name(&self) -> &'static str {
        "projectile_lifetime"
    }

    fn run(&mut self, registry: &mut Registry, _messages: &mut Bus, dt: f32) {
        let bounds = registry.resource::<WorldBounds>().copied().unwrap_or_default();

        let entities: Vec<EntityId> = registry.store::<Projectile>().map(|s| s.iter().map(|(e, _)| e).collect()).unwrap_or_default();

        let mut to_destroy = Vec::new();
        for entity in entities {
            let Some(projectile) = registry.get_mut::<Projectile>(entity) else { continue };
            projectile.age += dt;
            let expired = projectile.age >= projectile.lifetime;

            let off_screen = registry
                .get::<Position>(entity)
                .map(|pos| {
                    pos.x < -bounds.off_screen_margin
                        || pos.x > bounds.width + bounds.off_screen_margin
                        || pos.y < -bounds.off_screen_margin
                        || pos.y > bounds.height + bounds.off_screen_margin
                })
                .unwrap_or(false);

            if expired || off_screen {
                to_destroy.push(entity);
            }
        }

        for entity in to_destroy {
            registry.kill_entity(entity);
        }
    }
}
