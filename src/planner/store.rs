//! Canonical entity collections.
//!
//! The store is the single source of truth for beacons, antennas and barriers.
//! Each collection is an `Arc<Vec<_>>` snapshot: a write builds a fresh vector
//! and swaps the `Arc`, so anyone still holding the previous snapshot (the
//! renderer, an observer) keeps seeing a complete, unmodified collection.
//!
//! After every successful beacon write the store pushes the full beacon
//! snapshot to each subscribed [`BeaconObserver`]. Failed writes leave the
//! collections untouched and notify nobody.

use std::sync::Arc;
use std::sync::mpsc;

use super::error::PlannerError;
use super::geometry::Point;
use super::types::{Antenna, Barrier, Beacon, Entity, EntityKind, Positioned, Snapshot};

/// Receives the complete beacon collection after every beacon mutation.
pub trait BeaconObserver {
    fn beacons_changed(&mut self, beacons: &Snapshot<Beacon>);
}

/// Observer that forwards snapshots over a channel.
///
/// The UI drains the receiving end once per frame, the same way it drains
/// other refresh messages.
pub struct ChannelObserver {
    tx: mpsc::Sender<Snapshot<Beacon>>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::Sender<Snapshot<Beacon>>) -> Self {
        Self { tx }
    }
}

impl BeaconObserver for ChannelObserver {
    fn beacons_changed(&mut self, beacons: &Snapshot<Beacon>) {
        if self.tx.send(Arc::clone(beacons)).is_err() {
            log::warn!("Beacon change receiver dropped; notification discarded");
        }
    }
}

/// Maps an entity type onto its slot in the store.
pub trait Stored: Entity {
    fn slot(store: &EntityStore) -> &Snapshot<Self>;

    fn slot_mut(store: &mut EntityStore) -> &mut Snapshot<Self>;
}

impl Stored for Beacon {
    fn slot(store: &EntityStore) -> &Snapshot<Self> {
        &store.beacons
    }

    fn slot_mut(store: &mut EntityStore) -> &mut Snapshot<Self> {
        &mut store.beacons
    }
}

impl Stored for Antenna {
    fn slot(store: &EntityStore) -> &Snapshot<Self> {
        &store.antennas
    }

    fn slot_mut(store: &mut EntityStore) -> &mut Snapshot<Self> {
        &mut store.antennas
    }
}

impl Stored for Barrier {
    fn slot(store: &EntityStore) -> &Snapshot<Self> {
        &store.barriers
    }

    fn slot_mut(store: &mut EntityStore) -> &mut Snapshot<Self> {
        &mut store.barriers
    }
}

/// Owner of the three entity collections.
#[derive(Default)]
pub struct EntityStore {
    beacons: Snapshot<Beacon>,
    antennas: Snapshot<Antenna>,
    barriers: Snapshot<Barrier>,
    /// Next manual id per kind: beacon, antenna, barrier. Never rewound.
    next_ids: [u64; 3],
    observers: Vec<Box<dyn BeaconObserver>>,
}

fn counter_index(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Beacon => 0,
        EntityKind::Antenna => 1,
        EntityKind::Barrier => 2,
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beacons(&self) -> &Snapshot<Beacon> {
        &self.beacons
    }

    pub fn antennas(&self) -> &Snapshot<Antenna> {
        &self.antennas
    }

    pub fn barriers(&self) -> &Snapshot<Barrier> {
        &self.barriers
    }

    /// Register an observer for beacon changes.
    pub fn subscribe_beacons(&mut self, observer: Box<dyn BeaconObserver>) {
        self.observers.push(observer);
    }

    /// Hand out a fresh id for a manually created entity of `kind`.
    ///
    /// Ids come from a counter that only moves forward, so an id is never
    /// reissued after its entity is deleted.
    pub fn next_id(&mut self, kind: EntityKind) -> String {
        let counter = &mut self.next_ids[counter_index(kind)];
        let id = format!("{}-{}", kind.id_prefix(), *counter);
        *counter += 1;
        id
    }

    /// Replace a whole collection (auto-placement, seeding).
    pub fn replace_all<E: Stored>(&mut self, entities: Vec<E>) {
        log::debug!("Replacing all {}s with {} new entries", E::KIND, entities.len());
        self.commit(Arc::new(entities));
    }

    /// Append one entity.
    pub fn insert<E: Stored>(&mut self, entity: E) {
        log::debug!("Inserting {} '{}'", E::KIND, entity.id());
        let mut next = Vec::with_capacity(E::slot(self).len() + 1);
        next.extend(E::slot(self).iter().cloned());
        next.push(entity);
        self.commit(Arc::new(next));
    }

    /// Move a point entity. Only its position changes.
    pub fn update_position<E: Stored + Positioned>(&mut self, id: &str, position: Point) -> Result<(), PlannerError> {
        let index = self.index_of::<E>(id)?;
        let mut next: Vec<E> = E::slot(self).to_vec();
        next[index].set_position(position);
        log::debug!("Moved {} '{}' to ({:.2}, {:.2})", E::KIND, id, position.x, position.y);
        self.commit(Arc::new(next));
        Ok(())
    }

    /// Move one vertex of a barrier.
    pub fn update_barrier_vertex(&mut self, id: &str, vertex: usize, position: Point) -> Result<(), PlannerError> {
        let index = self.index_of::<Barrier>(id)?;
        if vertex >= self.barriers[index].vertices.len() {
            return Err(PlannerError::InvalidVertex { id: id.to_string(), index: vertex });
        }
        let mut next = self.barriers.to_vec();
        next[index].vertices[vertex] = position;
        log::debug!("Moved vertex {} of barrier '{}'", vertex, id);
        self.commit(Arc::new(next));
        Ok(())
    }

    /// Delete one entity by id, returning it.
    pub fn remove<E: Stored>(&mut self, id: &str) -> Result<E, PlannerError> {
        let index = self.index_of::<E>(id)?;
        let mut next: Vec<E> = E::slot(self).to_vec();
        let removed = next.remove(index);
        log::debug!("Removed {} '{}'", E::KIND, id);
        self.commit(Arc::new(next));
        Ok(removed)
    }

    /// Empty one collection.
    pub fn clear<E: Stored>(&mut self) {
        log::debug!("Clearing {} {}s", E::slot(self).len(), E::KIND);
        self.commit(Arc::new(Vec::<E>::new()));
    }

    fn index_of<E: Stored>(&self, id: &str) -> Result<usize, PlannerError> {
        E::slot(self).iter().position(|e| e.id() == id).ok_or_else(|| PlannerError::UnknownEntity {
            kind: E::KIND,
            id: id.to_string(),
        })
    }

    fn commit<E: Stored>(&mut self, next: Snapshot<E>) {
        *E::slot_mut(self) = next;
        if E::KIND == EntityKind::Beacon {
            self.notify_beacons();
        }
    }

    fn notify_beacons(&mut self) {
        let snapshot = Arc::clone(&self.beacons);
        for observer in self.observers.iter_mut() {
            observer.beacons_changed(&snapshot);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every snapshot it is handed.
    #[derive(Clone, Default)]
    pub(crate) struct Recorder(pub Rc<RefCell<Vec<Snapshot<Beacon>>>>);

    impl BeaconObserver for Recorder {
        fn beacons_changed(&mut self, beacons: &Snapshot<Beacon>) {
            self.0.borrow_mut().push(Arc::clone(beacons));
        }
    }

    fn beacon(id: &str, x: f64, y: f64, rssi: Option<f64>) -> Beacon {
        Beacon {
            id: id.into(),
            position: Point::new(x, y),
            rssi,
        }
    }

    fn store_with_recorder() -> (EntityStore, Recorder) {
        let mut store = EntityStore::new();
        let recorder = Recorder::default();
        store.subscribe_beacons(Box::new(recorder.clone()));
        (store, recorder)
    }

    #[test]
    fn manual_ids_are_never_reused() {
        let mut store = EntityStore::new();
        let a = store.next_id(EntityKind::Beacon);
        store.insert(beacon(&a, 1.0, 1.0, None));
        store.remove::<Beacon>(&a).unwrap();
        let b = store.next_id(EntityKind::Beacon);
        assert_eq!(a, "beacon-0");
        assert_eq!(b, "beacon-1");
        assert_eq!(store.next_id(EntityKind::Antenna), "antenna-0");
        assert_eq!(store.next_id(EntityKind::Barrier), "barrier-0");
    }

    #[test]
    fn writes_do_not_alias_prior_snapshots() {
        let mut store = EntityStore::new();
        store.insert(beacon("beacon-0", 1.0, 1.0, None));
        let before = Arc::clone(store.beacons());
        store.insert(beacon("beacon-1", 2.0, 2.0, None));
        store.update_position::<Beacon>("beacon-0", Point::new(5.0, 5.0)).unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].position, Point::new(1.0, 1.0));
        assert_eq!(store.beacons().len(), 2);
    }

    #[test]
    fn every_beacon_mutation_notifies_with_full_snapshot() {
        let (mut store, recorder) = store_with_recorder();
        store.insert(beacon("beacon-0", 1.0, 1.0, None));
        store.insert(beacon("beacon-1", 2.0, 2.0, None));
        store.update_position::<Beacon>("beacon-1", Point::new(3.0, 3.0)).unwrap();
        store.remove::<Beacon>("beacon-0").unwrap();
        store.replace_all(vec![beacon("beacon-auto-0", 2.5, 2.5, Some(-70.0))]);
        store.clear::<Beacon>();

        let seen = recorder.0.borrow();
        let lens: Vec<usize> = seen.iter().map(|s| s.len()).collect();
        assert_eq!(lens, vec![1, 2, 2, 1, 1, 0]);
        assert_eq!(seen[2][1].position, Point::new(3.0, 3.0));
        assert_eq!(seen[4][0].id, "beacon-auto-0");
    }

    #[test]
    fn other_collections_do_not_notify() {
        let (mut store, recorder) = store_with_recorder();
        store.insert(Antenna::new("antenna-0".into(), Point::new(1.0, 1.0), 2.0, 0.0));
        store.insert(Barrier {
            id: "barrier-0".into(),
            vertices: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
        });
        store.clear::<Antenna>();
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn failed_writes_leave_store_untouched_and_silent() {
        let (mut store, recorder) = store_with_recorder();
        store.insert(beacon("beacon-0", 1.0, 1.0, None));
        let before = Arc::clone(store.beacons());

        let err = store.remove::<Beacon>("beacon-9").unwrap_err();
        assert_eq!(
            err,
            PlannerError::UnknownEntity {
                kind: EntityKind::Beacon,
                id: "beacon-9".into()
            }
        );
        assert!(store.update_position::<Beacon>("nope", Point::new(0.0, 0.0)).is_err());

        assert!(Arc::ptr_eq(&before, store.beacons()));
        assert_eq!(recorder.0.borrow().len(), 1);
    }

    #[test]
    fn drag_updates_only_position() {
        let mut store = EntityStore::new();
        store.insert(beacon("beacon-0", 1.0, 1.0, Some(-60.0)));
        store.insert(beacon("beacon-1", 4.0, 4.0, Some(-75.0)));
        store.update_position::<Beacon>("beacon-0", Point::new(10.0, 20.0)).unwrap();
        assert_eq!(store.beacons()[0], beacon("beacon-0", 10.0, 20.0, Some(-60.0)));
        assert_eq!(store.beacons()[1], beacon("beacon-1", 4.0, 4.0, Some(-75.0)));
    }

    #[test]
    fn barrier_vertex_update_validates_index() {
        let mut store = EntityStore::new();
        store.insert(Barrier {
            id: "barrier-0".into(),
            vertices: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
        });
        store.update_barrier_vertex("barrier-0", 1, Point::new(12.0, 1.0)).unwrap();
        assert_eq!(store.barriers()[0].vertices[1], Point::new(12.0, 1.0));
        assert_eq!(
            store.update_barrier_vertex("barrier-0", 3, Point::new(0.0, 0.0)),
            Err(PlannerError::InvalidVertex {
                id: "barrier-0".into(),
                index: 3
            })
        );
        assert!(store.update_barrier_vertex("barrier-7", 0, Point::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn channel_observer_forwards_snapshots() {
        let (tx, rx) = mpsc::channel();
        let mut store = EntityStore::new();
        store.subscribe_beacons(Box::new(ChannelObserver::new(tx)));
        store.insert(beacon("beacon-0", 1.0, 1.0, None));
        let received = rx.try_recv().unwrap();
        assert!(Arc::ptr_eq(&received, store.beacons()));
        assert!(rx.try_recv().is_err());
    }
}
