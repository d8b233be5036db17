use hashbrown::HashMap;
use std::any::{Any, TypeId};
use std::fmt::Debug;

/// Marker for a message bus topic, matching the teacher's `Message` trait
/// minus the bitflag topic-id machinery (which required unstable nightly
/// intrinsics to generate). Topics are keyed by `TypeId` instead.
pub trait Message: 'static + Clone + Debug {}

impl<T: 'static + Clone + Debug> Message for T {}

/// A directly indexable registry of per-topic message queues, used for
/// intra-tick communication between systems (e.g. an enemy-death event
/// produced by collision and consumed by scoring/bridge systems).
///
/// Messages published in tick `N` are visible to every system from the
/// point of publication through the end of tick `N`; `World::run_once`
/// clears the bus after the schedule finishes.
#[derive(Default)]
pub struct Bus {
    topics: HashMap<TypeId, Box<dyn Any>>,
}

impl Bus {
    pub fn new() -> Self {
        Bus::default()
    }

    fn queue<T: Message>(&mut self) -> &mut Vec<T> {
        self.topics
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Vec::<T>::new()))
            .downcast_mut::<Vec<T>>()
            .expect("message topic type mismatch")
    }

    /// Publish a message on its topic.
    pub fn publish<T: Message>(&mut self, message: T) {
        self.queue::<T>().push(message);
    }

    /// Read every message published on `T`'s topic so far this tick.
    pub fn read<T: Message>(&self) -> &[T] {
        self.topics
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref::<Vec<T>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drop every queued message on every topic.
    pub fn clear(&mut self) {
        self.topics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Eq, PartialEq)]
    struct EnemyKilled(u32);

    #[derive(Debug, Clone, Eq, PartialEq)]
    struct PlayerDied(u32);

    #[test]
    fn publish_and_read_round_trip() {
        let mut bus = Bus::new();
        bus.publish(EnemyKilled(1));
        bus.publish(EnemyKilled(2));
        bus.publish(PlayerDied(7));

        assert_eq!(bus.read::<EnemyKilled>(), &[EnemyKilled(1), EnemyKilled(2)]);
        assert_eq!(bus.read::<PlayerDied>(), &[PlayerDied(7)]);
    }

    #[test]
    fn clear_drops_every_topic() {
        let mut bus = Bus::new();
        bus.publish(EnemyKilled(1));
        bus.clear();
        assert!(bus.read::<EnemyKilled>().is_empty());
    }
}
