//! The fixed-timestep accumulator (`spec.md` §4.7). `rt_ecs::World::tick`
//! runs one step of the system schedule; this type is the layer above it
//! that decides *how many* steps to run for a given slice of real time,
//! clamping catch-up so a stalled host cannot run an unbounded number of
//! ticks in one iteration.

use std::time::Duration;

use rt_ecs::world::World;

/// `Δ = 1/60 s` by convention, but driven by the configured tick rate so a
/// non-default `tick_rate` in `ServerConfig` is honored.
pub struct GameLoop {
    step: Duration,
    max_catchup_ticks: u32,
    accumulator: Duration,
}

impl GameLoop {
    pub fn new(step: Duration, max_catchup_ticks: u32) -> Self {
        GameLoop { step, max_catchup_ticks, accumulator: Duration::ZERO }
    }

    pub fn step_duration(&self) -> Duration {
        self.step
    }

    /// Advance the loop by `real_dt` of wall-clock time. `drain_input` runs
    /// once per simulation tick, before that tick's system schedule, and is
    /// where the caller should pop queued network input onto player
    /// entities. Returns the number of simulation ticks actually run.
    pub fn advance(&mut self, real_dt: Duration, world: &mut World, mut drain_input: impl FnMut(&mut World)) -> u32 {
        let cap = self.step * self.max_catchup_ticks;
        let clamped = real_dt.min(cap);
        self.accumulator += clamped;

        let mut ticks_run = 0;
        while self.accumulator >= self.step && ticks_run < self.max_catchup_ticks {
            drain_input(world);
            world.tick(self.step.as_secs_f32());
            self.accumulator -= self.step;
            ticks_run += 1;
        }

        ticks_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_one_tick_per_full_step_of_real_time() {
        let mut world = World::default();
        world.build();
        let mut loop_ = GameLoop::new(Duration::from_millis(16), 5);

        let ran = loop_.advance(Duration::from_millis(16), &mut world, |_| {});

        assert_eq!(ran, 1);
        assert_eq!(world.current_tick(), 1);
    }

    #[test]
    fn leftover_time_accumulates_across_calls() {
        let mut world = World::default();
        world.build();
        let mut loop_ = GameLoop::new(Duration::from_millis(10), 5);

        loop_.advance(Duration::from_millis(6), &mut world, |_| {});
        assert_eq!(world.current_tick(), 0);

        loop_.advance(Duration::from_millis(6), &mut world, |_| {});
        assert_eq!(world.current_tick(), 1);
    }

    #[test]
    fn frame_spike_is_clamped_to_the_catchup_budget() {
        let mut world = World::default();
        world.build();
        let mut loop_ = GameLoop::new(Duration::from_millis(10), 3);

        let ran = loop_.advance(Duration::from_secs(10), &mut world, |_| {});

        assert_eq!(ran, 3);
        assert_eq!(world.current_tick(), 3);
    }

    #[test]
    fn drain_input_runs_once_per_tick() {
        let mut world = World::default();
        world.build();
        let mut loop_ = GameLoop::new(Duration::from_millis(10), 5);
        let mut drains = 0;

        loop_.advance(Duration::from_millis(25), &mut world, |_| drains += 1);

        assert_eq!(drains, 2);
        assert_eq!(world.current_tick(), 2);
    }
}
