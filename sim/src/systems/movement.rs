//! Schedule step 5 (`spec.md` §4.5): `position += velocity * dt`.

use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{Position, Velocity};

pub struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn run(&mut self, registry: &mut Registry, _messages: &mut Bus, dt: f32) {
        let entities: Vec<_> =
            registry.store::<Velocity>().map(|s| s.iter().map(|(e, v)| (e, *v)).collect()).unwrap_or_default();

        for (entity, velocity) in entities {
            if let Some(position) = registry.get_mut::<Position>(entity) {
                position.x += velocity.vx * dt;
                position.y += velocity.vy * dt;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `spec.md` §8 scenario 2.
    #[test]
    fn rightward_velocity_advances_x_only() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        registry.insert(e, Position { x: 0.0, y: 0.0 });
        registry.insert(e, Velocity { vx: 500.0, vy: 0.0 });

        let mut system = MovementSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        let pos = registry.get::<Position>(e).unwrap();
        assert!((pos.x - 8.333).abs() < 0.01);
        assert_eq!(pos.y, 0.0);
    }
}
