//! Schedule step 3 (`spec.md` §4.5): player `input` + `controllable` ->
//! `velocity`. Diagonal input is not normalized — matching the common
//! shoot-'em-up convention the source follows of full speed on each axis.

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::{Controllable, Input, Velocity};

pub struct ControlSystem;

impl System for ControlSystem {
    fn name(&self) -> &'static str {
        "control"
    }

    fn run(&mut self, registry: &mut Registry, _messages: &mut Bus, _dt: f32) {
        let entities: Vec<EntityId> =
            registry.store::<Controllable>().map(|s| s.iter().map(|(e, _)| e).collect()).unwrap_or_default();

        for entity in entities {
            let Some(input) = registry.get::<Input>(entity).copied() else { continue };
            let Some(controllable) = registry.get::<Controllable>(entity).copied() else { continue };

            let mut vx = 0.0;
            let mut vy = 0.0;
            if input.up {
                vy -= controllable.speed;
            }
            if input.down {
                vy += controllable.speed;
            }
            if input.left {
                vx -= controllable.speed;
            }
            if input.right {
                vx += controllable.speed;
            }

            if let Some(velocity) = registry.get_mut::<Velocity>(entity) {
                velocity.vx = vx;
                velocity.vy = vy;
            }
            if let Some(controllable_mut) = registry.get_mut::<Controllable>(entity) {
                controllable_mut.last_vy = vy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_input_produces_positive_x_velocity() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        registry.insert(e, Input { right: true, ..Input::default() });
        registry.insert(e, Controllable { speed: 500.0, last_vy: 0.0 });
        registry.insert(e, Velocity { vx: 0.0, vy: 0.0 });

        let mut system = ControlSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Velocity>(e).unwrap(), &Velocity { vx: 500.0, vy: 0.0 });
        assert_eq!(registry.get::<Controllable>(e).unwrap().last_vy, 0.0);
    }

    #[test]
    fn no_input_produces_zero_velocity() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        registry.insert(e, Input::default());
        registry.insert(e, Controllable { speed: 500.0, last_vy: 9.0 });
        registry.insert(e, Velocity { vx: 3.0, vy: 3.0 });

        let mut system = ControlSystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Velocity>(e).unwrap(), &Velocity { vx: 0.0, vy: 0.0 });
    }
}
