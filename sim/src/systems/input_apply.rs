//! Schedule step 1 (`spec.md` §4.5): apply queued `PlayerInput` masks to
//! player `input` components. Grounded on `original_source/ecs/src/systems`'s
//! input-gathering pass, which runs first in its schedule too.

use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::Input;
use crate::events::PlayerInputEvent;
use crate::resources::PlayerIndex;

pub struct InputApplySystem;

impl System for InputApplySystem {
    fn name(&self) -> &'static str {
        "input_apply"
    }

    fn run(&mut self, registry: &mut Registry, messages: &mut Bus, _dt: f32) {
        let events: Vec<PlayerInputEvent> = messages.read::<PlayerInputEvent>().to_vec();
        if events.is_empty() {
            return;
        }

        let Some(index) = registry.resource::<PlayerIndex>().cloned() else { return };

        // P9 (input idempotence): applying the same mask twice overwrites
        // the same component with the same value, so repeats are harmless.
        for event in events {
            if let Some(entity) = index.get(event.client_id) {
                registry.insert(entity, Input::from_mask(event.direction_mask));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_proto::messages::DIR_RIGHT;

    #[test]
    fn applies_mask_to_indexed_player_entity() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();

        let mut index = PlayerIndex::default();
        index.insert(1, e);
        registry.insert_resource(index);

        bus.publish(PlayerInputEvent { client_id: 1, event_type: 0, direction_mask: DIR_RIGHT });

        let mut system = InputApplySystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Input>(e), Some(&Input { right: true, ..Input::default() }));
    }

    #[test]
    fn repeated_identical_mask_is_idempotent() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        let mut index = PlayerIndex::default();
        index.insert(1, e);
        registry.insert_resource(index);

        bus.publish(PlayerInputEvent { client_id: 1, event_type: 0, direction_mask: DIR_RIGHT });
        bus.publish(PlayerInputEvent { client_id: 1, event_type: 0, direction_mask: DIR_RIGHT });

        let mut system = InputApplySystem;
        system.run(&mut registry, &mut bus, 1.0 / 60.0);

        assert_eq!(registry.get::<Input>(e), Some(&Input { right: true, ..Input::default() }));
    }
}
