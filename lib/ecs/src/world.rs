use crate::messagebus::Bus;
use crate::registry::Registry;
use crate::system::System;
use rt_common::logging::{self, Logger};

/// Owns the registry, the message bus and the ordered system schedule.
/// Mirrors the teacher's `neutronium::World`, minus the fixed-timestep
/// sleep loop and the deferred-transaction machinery: the accumulator /
/// catch-up-cap loop described in `spec.md` §4.7 needs to interleave input
/// queue draining between ticks, so it is implemented one layer up, in
/// `rt-sim`'s `GameLoop`, which calls [`World::tick`] once per simulation
/// step.
pub struct World {
    registry: Registry,
    systems: Vec<Box<dyn System>>,
    messages: Bus,
    current_tick: u32,
    game_time: f32,
    finalized: bool,
    log: Logger,
}

impl Default for World {
    fn default() -> Self {
        World::new(logging::discard())
    }
}

impl World {
    pub fn new(log: Logger) -> Self {
        World {
            registry: Registry::new(),
            systems: Vec::new(),
            messages: Bus::new(),
            current_tick: 0,
            game_time: 0.0,
            finalized: false,
            log: log.new(logging::o!("subsystem" => "world")),
        }
    }

    /// Register a system; systems run in registration order every tick.
    pub fn register_system<S: System>(&mut self, system: S) {
        if self.finalized {
            panic!("cannot register systems on a finalized world");
        }
        logging::debug!(self.log, "registering system"; "system" => system.name());
        self.systems.push(Box::new(system));
    }

    /// Run each system's `init` hook and lock the schedule. No further
    /// systems may be registered afterwards.
    pub fn build(&mut self) {
        logging::info!(self.log, "building world"; "systems" => self.systems.len());
        for system in self.systems.iter_mut() {
            system.init(&mut self.registry);
        }
        self.finalized = true;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn current_tick(&self) -> u32 {
        self.current_tick
    }

    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    pub fn messages(&self) -> &Bus {
        &self.messages
    }

    /// Mutable access to the bus, for callers that need to publish events
    /// ahead of a tick (e.g. the network bridge queuing player input).
    pub fn messages_mut(&mut self) -> &mut Bus {
        &mut self.messages
    }

    /// Run the system schedule once: increments `current_tick`, advances
    /// `game_time` by `dt`, runs every registered system in order, then
    /// clears the message bus. This is `spec.md` §4.5's "system schedule
    /// per tick", steps 1-12 being whichever systems were registered.
    pub fn tick(&mut self, dt: f32) {
        if !self.finalized {
            panic!("world must be built before ticking");
        }

        self.current_tick = self.current_tick.wrapping_add(1);
        self.game_time += dt;

        logging::trace!(self.log, "tick started"; "tick" => self.current_tick, "dt" => dt);

        for system in self.systems.iter_mut() {
            system.run(&mut self.registry, &mut self.messages, dt);
        }

        self.messages.clear();

        logging::trace!(self.log, "tick finished"; "tick" => self.current_tick);
    }
}
