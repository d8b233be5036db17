//! Delta snapshot engine (`spec.md` §4.8). New module — the teacher has no
//! equivalent concept, so this is grounded on `neutronium::messagebus::Bus`
//! for the "batch records, hand them to the send path" shape, generalized
//! from topic batching to tick-indexed snapshot batching.

use std::collections::VecDeque;

use rt_proto::messages::{EntityKind, EntityRecord, EntityUpdateRecord, NetId};

/// `spec.md` §4.8 reads velocity off each entity as part of the internal
/// snapshot even though the wire `EntityRecord`/`EntityUpdateRecord` carry
/// no velocity field (see `rt_proto::messages`) — it exists here for
/// client-side extrapolation inputs a future transport could add, not for
/// delta comparison (deltas are position/hp/score only, per the ring
/// below).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshot {
    pub net_id: NetId,
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub hp: u32,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u32,
    pub timestamp: u64,
    pub records: Vec<EntitySnapshot>,
}

impl WorldSnapshot {
    fn find(&self, net_id: NetId) -> Option<&EntitySnapshot> {
        self.records.iter().find(|r| r.net_id == net_id)
    }
}

/// The bounded FIFO history ring from §4.8, upholding I6 (strictly
/// ascending ticks) and P4 (length never exceeds `max_history`).
pub struct SnapshotRing {
    max_history: usize,
    history: VecDeque<WorldSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    /// No snapshot in the ring matched the client's acked tick; the full
    /// current state must be sent instead.
    FullState(Vec<EntityRecord>),
    Partial { created: Vec<EntityRecord>, updated: Vec<EntityUpdateRecord>, destroyed: Vec<NetId> },
}

impl SnapshotRing {
    pub fn new(max_history: usize) -> Self {
        SnapshotRing { max_history, history: VecDeque::with_capacity(max_history) }
    }

    /// Push a new snapshot. Panics if `tick` does not strictly exceed the
    /// most recent entry's tick — I6 is an invariant of the simulation
    /// loop's call discipline, not something this type can recover from.
    pub fn push(&mut self, snapshot: WorldSnapshot) {
        if let Some(last) = self.history.back() {
            assert!(snapshot.tick > last.tick, "snapshot ticks must be strictly ascending");
        }
        if self.history.len() == self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn latest(&self) -> Option<&WorldSnapshot> {
        self.history.back()
    }

    fn find_by_tick(&self, tick: u32) -> Option<&WorldSnapshot> {
        self.history.iter().find(|s| s.tick == tick)
    }

    /// Compute the delta a client with `last_acked_tick` should receive,
    /// against the most recent snapshot in the ring.
    pub fn delta_since(&self, last_acked_tick: Option<u32>, pos_threshold: f32) -> Delta {
        let current = match self.latest() {
            Some(s) => s,
            None => return Delta::FullState(Vec::new()),
        };

        let baseline = last_acked_tick.and_then(|tick| self.find_by_tick(tick));

        let Some(baseline) = baseline else {
            return Delta::FullState(current.records.iter().map(to_entity_record).collect());
        };

        let mut created = Vec::new();
        let mut updated = Vec::new();

        for record in &current.records {
            match baseline.find(record.net_id) {
                None => created.push(to_entity_record(record)),
                Some(old) => {
                    let dx = record.x - old.x;
                    let dy = record.y - old.y;
                    let pos_delta = (dx * dx + dy * dy).sqrt();
                    if record.hp != old.hp || record.score != old.score || pos_delta > pos_threshold {
                        updated.push(EntityUpdateRecord { net_id: record.net_id, hp: record.hp, x: record.x, y: record.y });
                    }
                }
            }
        }

        let destroyed: Vec<NetId> = baseline
            .records
            .iter()
            .filter(|old| current.find(old.net_id).is_none())
            .map(|old| old.net_id)
            .collect();

        Delta::Partial { created, updated, destroyed }
    }
}

fn to_entity_record(snapshot: &EntitySnapshot) -> EntityRecord {
    EntityRecord { net_id: snapshot.net_id, kind: snapshot.kind, hp: snapshot.hp, x: snapshot.x, y: snapshot.y }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tick: u32, records: Vec<EntitySnapshot>) -> WorldSnapshot {
        WorldSnapshot { tick, timestamp: 0, records }
    }

    fn rec(net_id: NetId, x: f32, y: f32, hp: u32) -> EntitySnapshot {
        EntitySnapshot { net_id, kind: EntityKind::Player, x, y, vx: 0.0, vy: 0.0, hp, score: 0 }
    }

    #[test]
    fn ring_evicts_oldest_beyond_capacity() {
        let mut ring = SnapshotRing::new(2);
        ring.push(snap(1, vec![]));
        ring.push(snap(2, vec![]));
        ring.push(snap(3, vec![]));
        assert_eq!(ring.len(), 2);
        assert!(ring.find_by_tick(1).is_none());
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn ring_rejects_non_ascending_tick() {
        let mut ring = SnapshotRing::new(4);
        ring.push(snap(5, vec![]));
        ring.push(snap(5, vec![]));
    }

    #[test]
    fn unmatched_baseline_yields_full_state() {
        let mut ring = SnapshotRing::new(128);
        ring.push(snap(1, vec![rec(1, 0.0, 0.0, 10)]));
        match ring.delta_since(Some(999), 5.0) {
            Delta::FullState(records) => assert_eq!(records.len(), 1),
            Delta::Partial { .. } => panic!("expected full state"),
        }
    }

    /// `spec.md` §8 scenario 5.
    #[test]
    fn small_position_delta_and_new_entity() {
        let mut ring = SnapshotRing::new(128);
        ring.push(snap(1, vec![rec(100, 10.0, 10.0, 50)]));
        ring.push(snap(2, vec![rec(100, 12.0, 10.0, 50), rec(200, 0.0, 0.0, 30)]));

        match ring.delta_since(Some(1), 5.0) {
            Delta::Partial { created, updated, destroyed } => {
                assert_eq!(created.len(), 1);
                assert_eq!(created[0].net_id, 200);
                assert!(updated.is_empty());
                assert!(destroyed.is_empty());
            }
            Delta::FullState(_) => panic!("expected partial delta"),
        }
    }

    /// Boundary behavior: a position delta of exactly `POS_THRESHOLD` must
    /// not be emitted (strict `>`).
    #[test]
    fn exact_threshold_delta_is_not_emitted() {
        let mut ring = SnapshotRing::new(128);
        ring.push(snap(1, vec![rec(1, 0.0, 0.0, 10)]));
        ring.push(snap(2, vec![rec(1, 5.0, 0.0, 10)]));

        match ring.delta_since(Some(1), 5.0) {
            Delta::Partial { updated, .. } => assert!(updated.is_empty()),
            Delta::FullState(_) => panic!("expected partial delta"),
        }
    }

    #[test]
    fn destroyed_entities_are_reported() {
        let mut ring = SnapshotRing::new(128);
        ring.push(snap(1, vec![rec(1, 0.0, 0.0, 10)]));
        ring.push(snap(2, vec![]));

        match ring.delta_since(Some(1), 5.0) {
            Delta::Partial { destroyed, .. } => assert_eq!(destroyed, vec![1]),
            Delta::FullState(_) => panic!("expected partial delta"),
        }
    }
}
