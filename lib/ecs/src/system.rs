use crate::messagebus::Bus;
use crate::registry::Registry;

/// A system is a function over the registry and a delta-time, operating on
/// whichever component stores it chooses to fetch (`spec.md` §4.5).
/// Systems are registered in an ordered list and invoked in registration
/// order every tick — there is no declarative read/write-set machinery (the
/// teacher's `RunSystem::Data` associated type) because the single-threaded
/// schedule never needs to run two systems concurrently.
pub trait System: 'static {
    /// Human-readable name used in log lines (`spec.md` §4.2a).
    fn name(&self) -> &'static str;

    /// Called once, after every system has been registered, before the
    /// first tick runs.
    fn init(&mut self, _registry: &mut Registry) {}

    /// Advance this system's state by `dt` seconds.
    fn run(&mut self, registry: &mut Registry, messages: &mut Bus, dt: f32);
}
