//! Single-active-mode interaction state machine.
//!
//! Exactly one [`Mode`] is active at any time. The controller turns pointer
//! gestures into entity store writes according to the active mode:
//!
//! | Mode | Gesture | Effect |
//! |---|---|---|
//! | PlaceBeacon | click | insert a beacon with the current RSSI |
//! | PlaceAntenna | click | insert an antenna with the current height/angle/range |
//! | DrawBarrier | clicks, then finish | collect vertices, insert the closed polygon |
//! | EditBeacons / EditAntennas | drag | move the dragged entity on release |
//! | DeleteBeacons / DeleteAntennas | hover, click | highlight, then remove |
//! | Idle | drag, scroll | nothing beyond barrier vertex drags; the view pans and zooms |
//!
//! Outside DrawBarrier a drag that starts on a barrier vertex moves that vertex.
//! Dropped points snap onto existing ones within the snap tolerance.

use super::geometry::{Extent, Point, distance2};
use super::hit_test::{Tolerances, find_nearest, nearest_barrier_vertex, snap_to_entities};
use super::store::{EntityStore, Stored};
use super::types::{Antenna, Barrier, Beacon, EntityKind, LayerVisibility, PlacementSettings};

/// The editing behavior pointer gestures are interpreted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Idle,
    PlaceBeacon,
    PlaceAntenna,
    DrawBarrier,
    EditBeacons,
    EditAntennas,
    DeleteBeacons,
    DeleteAntennas,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::Idle,
        Mode::PlaceBeacon,
        Mode::PlaceAntenna,
        Mode::DrawBarrier,
        Mode::EditBeacons,
        Mode::EditAntennas,
        Mode::DeleteBeacons,
        Mode::DeleteAntennas,
    ];

    pub fn is_delete(&self) -> bool {
        matches!(self, Mode::DeleteBeacons | Mode::DeleteAntennas)
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Mode::EditBeacons | Mode::EditAntennas)
    }

    /// Tool bar caption.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Idle => "Pan / zoom",
            Mode::PlaceBeacon => "Place beacons",
            Mode::PlaceAntenna => "Place antennas",
            Mode::DrawBarrier => "Draw barriers",
            Mode::EditBeacons => "Move beacons",
            Mode::EditAntennas => "Move antennas",
            Mode::DeleteBeacons => "Delete beacons",
            Mode::DeleteAntennas => "Delete antennas",
        }
    }
}

/// Everything a gesture needs besides the store, sampled once per frame.
#[derive(Debug, Clone, Copy)]
pub struct GestureEnv {
    pub extent: Extent,
    pub settings: PlacementSettings,
    pub visibility: LayerVisibility,
    pub tolerances: Tolerances,
}

/// What a gesture changed, for user-visible notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    Placed(EntityKind, String),
    Moved(EntityKind, String),
    Deleted(EntityKind, String),
    VertexAdded(usize),
    VertexRemoved(usize),
    VertexMoved { barrier_id: String, index: usize },
    DraftDiscarded,
}

impl std::fmt::Display for EditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let noun = |kind: &EntityKind| match kind {
            EntityKind::Beacon => "Beacon",
            EntityKind::Antenna => "Antenna",
            EntityKind::Barrier => "Barrier",
        };
        match self {
            EditEvent::Placed(kind, id) => write!(f, "{} added ({})", noun(kind), id),
            EditEvent::Moved(kind, id) => write!(f, "{} position updated ({})", noun(kind), id),
            EditEvent::Deleted(kind, id) => write!(f, "{} deleted ({})", noun(kind), id),
            EditEvent::VertexAdded(count) => write!(f, "Barrier vertex {} added", count),
            EditEvent::VertexRemoved(count) => write!(f, "Barrier vertex removed, {} left", count),
            EditEvent::VertexMoved { barrier_id, index } => write!(f, "Vertex {} of {} moved", index, barrier_id),
            EditEvent::DraftDiscarded => write!(f, "Barrier drawing discarded"),
        }
    }
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    Beacon(String),
    Antenna(String),
    BarrierVertex { barrier_id: String, index: usize },
}

/// A drag in progress. `current` is the unsnapped pointer position.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub target: DragTarget,
    pub current: Point,
}

/// Minimum vertex count for a closed barrier polygon.
pub const MIN_BARRIER_VERTICES: usize = 3;

/// Routes gestures to store writes for the active mode.
#[derive(Debug, Default)]
pub struct InteractionController {
    mode: Mode,
    hovered: Option<String>,
    draft: Vec<Point>,
    drag: Option<Drag>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_active(&self, mode: Mode) -> bool {
        self.mode == mode
    }

    /// Id of the entity highlighted for deletion.
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Vertices of the barrier being drawn.
    pub fn draft(&self) -> &[Point] {
        &self.draft
    }

    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    /// Switch to `mode`, leaving whatever was active.
    ///
    /// Selecting the active mode again, or `Idle`, goes back to `Idle`. Any
    /// mode change drops the hover highlight, the barrier draft and a drag in
    /// progress.
    ///
    /// # Returns
    ///
    /// The mode that is active afterwards.
    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        let next = if mode == self.mode { Mode::Idle } else { mode };
        if next != self.mode {
            log::debug!("Mode {:?} -> {:?}", self.mode, next);
            self.hovered = None;
            if !self.draft.is_empty() {
                log::debug!("Dropping barrier draft with {} vertices", self.draft.len());
                self.draft.clear();
            }
            self.drag = None;
            self.mode = next;
        }
        self.mode
    }

    /// Pointer moved without a button held.
    ///
    /// Recomputes the hover highlight in delete modes; clears it elsewhere.
    pub fn pointer_moved(&mut self, store: &EntityStore, env: &GestureEnv, pointer: Point) {
        self.hovered = match self.mode {
            Mode::DeleteBeacons => find_nearest(store, &env.visibility, EntityKind::Beacon, &pointer, env.tolerances.hover),
            Mode::DeleteAntennas => find_nearest(store, &env.visibility, EntityKind::Antenna, &pointer, env.tolerances.hover),
            _ => None,
        };
    }

    /// Pointer left the map.
    pub fn pointer_left(&mut self) {
        self.hovered = None;
    }

    /// Primary click at `pointer`.
    pub fn clicked(&mut self, store: &mut EntityStore, env: &GestureEnv, pointer: Point) -> Option<EditEvent> {
        match self.mode {
            Mode::Idle | Mode::EditBeacons | Mode::EditAntennas => None,
            Mode::PlaceBeacon => {
                let id = store.next_id(EntityKind::Beacon);
                store.insert(Beacon {
                    id: id.clone(),
                    position: env.extent.clamp(pointer),
                    rssi: Some(env.settings.rssi),
                });
                Some(EditEvent::Placed(EntityKind::Beacon, id))
            }
            Mode::PlaceAntenna => {
                let id = store.next_id(EntityKind::Antenna);
                store.insert(Antenna::new(
                    id.clone(),
                    env.extent.clamp(pointer),
                    env.settings.antenna_height,
                    env.settings.antenna_angle,
                ));
                Some(EditEvent::Placed(EntityKind::Antenna, id))
            }
            Mode::DrawBarrier => self.add_vertex(store, env, pointer),
            Mode::DeleteBeacons => self.delete_at::<Beacon>(store, env, pointer),
            Mode::DeleteAntennas => self.delete_at::<Antenna>(store, env, pointer),
        }
    }

    /// Double click: finishes the barrier being drawn. In every other mode it
    /// counts as a second click at `pointer`.
    pub fn double_clicked(&mut self, store: &mut EntityStore, env: &GestureEnv, pointer: Point) -> Option<EditEvent> {
        if self.mode == Mode::DrawBarrier {
            self.finish_barrier(store)
        } else {
            self.clicked(store, env, pointer)
        }
    }

    /// Secondary click: in `Idle`, deletes the barrier under the pointer.
    pub fn secondary_clicked(&mut self, store: &mut EntityStore, env: &GestureEnv, pointer: Point) -> Option<EditEvent> {
        if self.mode != Mode::Idle {
            return None;
        }
        let id = find_nearest(store, &env.visibility, EntityKind::Barrier, &pointer, env.tolerances.click)?;
        store.remove::<Barrier>(&id).ok()?;
        Some(EditEvent::Deleted(EntityKind::Barrier, id))
    }

    /// Close the draft into a barrier.
    ///
    /// With fewer than three vertices nothing happens and the draft is kept.
    pub fn finish_barrier(&mut self, store: &mut EntityStore) -> Option<EditEvent> {
        if self.mode != Mode::DrawBarrier || self.draft.len() < MIN_BARRIER_VERTICES {
            return None;
        }
        let id = store.next_id(EntityKind::Barrier);
        let vertices = std::mem::take(&mut self.draft);
        log::debug!("Closing barrier '{}' with {} vertices", id, vertices.len());
        store.insert(Barrier { id: id.clone(), vertices });
        Some(EditEvent::Placed(EntityKind::Barrier, id))
    }

    /// Drop the barrier draft.
    pub fn discard_draft(&mut self) -> Option<EditEvent> {
        if self.draft.is_empty() {
            return None;
        }
        self.draft.clear();
        Some(EditEvent::DraftDiscarded)
    }

    /// Remove the last draft vertex.
    pub fn undo_vertex(&mut self) -> Option<EditEvent> {
        self.draft.pop()?;
        Some(EditEvent::VertexRemoved(self.draft.len()))
    }

    /// Button pressed and pointer started moving.
    ///
    /// # Returns
    ///
    /// `true` if an entity or barrier vertex was grabbed. Otherwise the drag
    /// belongs to the view (pan).
    pub fn drag_started(&mut self, store: &EntityStore, env: &GestureEnv, pointer: Point) -> bool {
        self.drag = None;
        let target = match self.mode {
            Mode::DrawBarrier => None,
            Mode::EditBeacons => find_nearest(store, &env.visibility, EntityKind::Beacon, &pointer, env.tolerances.click).map(DragTarget::Beacon),
            Mode::EditAntennas => find_nearest(store, &env.visibility, EntityKind::Antenna, &pointer, env.tolerances.click).map(DragTarget::Antenna),
            _ => None,
        };
        let target = match target {
            Some(target) => Some(target),
            None if self.mode != Mode::DrawBarrier && env.visibility.barriers => {
                nearest_barrier_vertex(store.barriers(), &pointer, env.tolerances.click, None).map(|hit| DragTarget::BarrierVertex {
                    barrier_id: hit.barrier_id,
                    index: hit.index,
                })
            }
            None => None,
        };
        match target {
            Some(target) => {
                log::debug!("Drag started on {:?}", target);
                self.drag = Some(Drag { target, current: pointer });
                true
            }
            None => false,
        }
    }

    pub fn drag_moved(&mut self, pointer: Point) {
        if let Some(drag) = self.drag.as_mut() {
            drag.current = pointer;
        }
    }

    /// Button released: commit the drag.
    pub fn drag_ended(&mut self, store: &mut EntityStore, env: &GestureEnv, pointer: Point) -> Option<EditEvent> {
        let drag = self.drag.take()?;
        let dropped = env.extent.clamp(pointer);
        match drag.target {
            DragTarget::Beacon(id) => {
                let position = snap_to_entities(store.beacons(), dropped, env.tolerances.snap, &id);
                store.update_position::<Beacon>(&id, position).ok()?;
                Some(EditEvent::Moved(EntityKind::Beacon, id))
            }
            DragTarget::Antenna(id) => {
                let position = snap_to_entities(store.antennas(), dropped, env.tolerances.snap, &id);
                store.update_position::<Antenna>(&id, position).ok()?;
                Some(EditEvent::Moved(EntityKind::Antenna, id))
            }
            DragTarget::BarrierVertex { barrier_id, index } => {
                let position = nearest_barrier_vertex(store.barriers(), &dropped, env.tolerances.snap, Some((barrier_id.as_str(), index)))
                    .map_or(dropped, |hit| hit.position);
                store.update_barrier_vertex(&barrier_id, index, position).ok()?;
                Some(EditEvent::VertexMoved { barrier_id, index })
            }
        }
    }

    fn add_vertex(&mut self, store: &mut EntityStore, env: &GestureEnv, pointer: Point) -> Option<EditEvent> {
        let snap2 = env.tolerances.snap * env.tolerances.snap;
        if let Some(first) = self.draft.first() {
            if self.draft.len() >= MIN_BARRIER_VERTICES && distance2(first, &pointer) <= snap2 {
                return self.finish_barrier(store);
            }
        }
        let vertex = nearest_barrier_vertex(store.barriers(), &pointer, env.tolerances.snap, None).map_or_else(|| env.extent.clamp(pointer), |hit| hit.position);
        self.draft.push(vertex);
        Some(EditEvent::VertexAdded(self.draft.len()))
    }

    /// Remove the entity under the pointer.
    ///
    /// The highlight is refreshed at the click position first; the entity is
    /// removed only if it is also within the tighter click tolerance. The
    /// closest entity within click tolerance is always the highlighted one.
    fn delete_at<E: Stored>(&mut self, store: &mut EntityStore, env: &GestureEnv, pointer: Point) -> Option<EditEvent> {
        self.pointer_moved(store, env, pointer);
        let id = find_nearest(store, &env.visibility, E::KIND, &pointer, env.tolerances.click)?;
        store.remove::<E>(&id).ok()?;
        self.hovered = None;
        Some(EditEvent::Deleted(E::KIND, id))
    }
}
