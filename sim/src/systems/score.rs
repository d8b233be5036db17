//! Schedule step 10 (`spec.md` §4.6 "Scoring"): one point per full second
//! of survival, credited per-player.

use rt_ecs::entity::EntityId;
use rt_ecs::messagebus::Bus;
use rt_ecs::registry::Registry;
use rt_ecs::system::System;

use crate::components::Score;

pub struct ScoreSystem;

impl System for ScoreSystem {
    fn name(&self) -> &'static str {
        "score"
    }

    fn run(&mut self, registry: &mut Registry, _messages: &mut Bus, dt: f32) {
        let entities: Vec<EntityId> = registry.store::<Score>().map(|s| s.iter().map(|(e, _)| e).collect()).unwrap_or_default();

        for entity in entities {
            let Some(score) = registry.get_mut::<Score>(entity) else { continue };
            score.survival_time += dt;
            let points_due = score.survival_time.floor() - score.last_time_point_awarded.floor();
            if points_due > 0.0 {
                score.current_score += points_due as u32;
                score.last_time_point_awarded = score.survival_time.floor();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awards_one_point_per_crossed_second() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        registry.insert(e, Score::default());

        let mut system = ScoreSystem;
        let dt = 1.0 / 60.0;
        for _ in 0..61 {
            system.run(&mut registry, &mut bus, dt);
        }

        let score = registry.get::<Score>(e).unwrap();
        assert_eq!(score.current_score, 1);
    }

    #[test]
    fn sub_second_progress_awards_nothing() {
        let mut registry = Registry::new();
        let mut bus = Bus::new();
        let e = registry.spawn_entity();
        registry.insert(e, Score::default());

        let mut system = ScoreSystem;
        system.run(&mut registry, &mut bus, 0.5);

        assert_eq!(registry.get::<Score>(e).unwrap().current_score, 0);
    }
}
