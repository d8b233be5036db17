use crate::component::{AnyStore, Component, ComponentStore};
use crate::entity::{EntityAllocator, EntityId};
use hashbrown::{HashMap, HashSet};
use std::any::{Any, TypeId};

/// Owns every component store and the entity allocator. Exclusive to the
/// simulation thread (`spec.md` §5) — never accessed from the I/O context.
///
/// Unlike the teacher's archetype/shard registry, component stores here are
/// mutated in place rather than through a deferred transaction log: the
/// simpler sparse-array model means there is no shard to reshuffle, and the
/// single-threaded system schedule (`spec.md` §4.5) never needs to observe a
/// consistent mid-tick snapshot of another system's writes.
#[derive(Default)]
pub struct Registry {
    allocator: EntityAllocator,
    alive: HashSet<EntityId>,
    stores: HashMap<TypeId, Box<dyn AnyStore>>,
    resources: HashMap<TypeId, Box<dyn Any>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Allocate a new entity id and mark it alive. Does not attach any
    /// components — callers insert those afterwards.
    pub fn spawn_entity(&mut self) -> EntityId {
        let id = self.allocator.spawn();
        self.alive.insert(id);
        id
    }

    /// Destroy an entity: clears its slot in every registered component
    /// store and removes it from the alive set. The id is never reused.
    pub fn kill_entity(&mut self, entity: EntityId) {
        for store in self.stores.values_mut() {
            store.clear_slot(entity);
        }
        self.alive.remove(&entity);
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    pub fn alive_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().copied()
    }

    pub fn entity_count(&self) -> usize {
        self.alive.len()
    }

    fn store_entry<T: Component>(&mut self) -> &mut Box<dyn AnyStore> {
        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()))
    }

    /// Immutable access to the store for `T`. Returns `None` if no
    /// component of this type has ever been inserted.
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<ComponentStore<T>>())
    }

    /// Mutable access to the store for `T`, creating it on first use.
    pub fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        self.store_entry::<T>()
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .expect("component store type mismatch")
    }

    /// Attach a component to an entity, creating the backing store on first
    /// use.
    pub fn insert<T: Component>(&mut self, entity: EntityId, component: T) {
        self.store_mut::<T>().insert(entity, component);
    }

    /// Remove a single component type from an entity.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        self.store_mut::<T>().remove(entity)
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.store::<T>().is_some_and(|s| s.contains(entity))
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.store::<T>().and_then(|s| s.get(entity))
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.store_mut::<T>().get_mut(entity)
    }

    /// Register a resource instance (a singleton shared across systems),
    /// matching the teacher's `World::register_resource`.
    pub fn insert_resource<T: 'static>(&mut self, resource: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(resource));
    }

    pub fn resource<T: 'static>(&self) -> Option<&T> {
        self.resources.get(&TypeId::of::<T>()).and_then(|r| r.downcast_ref::<T>())
    }

    pub fn resource_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources.get_mut(&TypeId::of::<T>()).and_then(|r| r.downcast_mut::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position {
        x: f32,
        y: f32,
    }
    struct Health {
        hp: i32,
    }

    #[test]
    fn spawn_insert_and_kill() {
        let mut registry = Registry::new();
        let e = registry.spawn_entity();
        registry.insert(e, Position { x: 1.0, y: 2.0 });
        registry.insert(e, Health { hp: 10 });

        assert!(registry.has::<Position>(e));
        assert!(registry.has::<Health>(e));

        registry.kill_entity(e);

        assert!(!registry.is_alive(e));
        assert!(!registry.has::<Position>(e));
        assert!(!registry.has::<Health>(e));
    }

    #[test]
    fn kill_does_not_shift_other_entities() {
        let mut registry = Registry::new();
        let a = registry.spawn_entity();
        let b = registry.spawn_entity();
        registry.insert(a, Position { x: 0.0, y: 0.0 });
        registry.insert(b, Position { x: 5.0, y: 5.0 });

        registry.kill_entity(a);

        assert!(registry.get::<Position>(a).is_none());
        assert_eq!(registry.get::<Position>(b).unwrap().x, 5.0);
    }

    #[test]
    fn resources_round_trip() {
        let mut registry = Registry::new();
        registry.insert_resource(42i32);
        assert_eq!(*registry.resource::<i32>().unwrap(), 42);
        *registry.resource_mut::<i32>().unwrap() += 1;
        assert_eq!(*registry.resource::<i32>().unwrap(), 43);
    }
}
