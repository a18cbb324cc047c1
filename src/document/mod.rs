pub mod beam;
pub mod face;
pub mod slab;
pub mod wall;

pub use beam::BeamData;
pub use face::{FaceEntity, MaterialRef, Mixpaint};
pub use slab::{AuxFace, SlabData};
pub use wall::WallData;

use slotmap::SlotMap;

use crate::error::TopologyError;
use crate::geometry::{FaceProfile, PlanCurve};
use crate::reconcile::FaceMap;
use crate::topology::graph::JointGraph;
use crate::topology::joint::{self, JointData, JointKind, WallInfo};

slotmap::new_key_type! {
    /// Unique identifier for a wall in the document.
    pub struct WallId;
    /// Unique identifier for a beam in the document.
    pub struct BeamId;
    /// Unique identifier for a slab in the document.
    pub struct SlabId;
    /// Unique identifier for a boundary face entity.
    pub struct FaceId;
    /// Unique identifier for a wall joint.
    pub struct JointId;
}

/// A structural element that owns a face map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementId {
    Wall(WallId),
    Beam(BeamId),
    Slab(SlabId),
}

/// Derived per-layer state invalidated by structural edits.
///
/// Downstream recomputation (rooms, hole cutting) is out of scope; this
/// core only raises the flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerState {
    pub rooms_dirty: bool,
    pub holes_dirty: bool,
}

impl LayerState {
    pub fn mark_dirty(&mut self) {
        self.rooms_dirty = true;
        self.holes_dirty = true;
    }

    pub fn clear(&mut self) {
        self.rooms_dirty = false;
        self.holes_dirty = false;
    }
}

/// Central arena that owns every document entity.
///
/// Entities reference each other via typed IDs (generational indices);
/// persistence references them via stable `uid`s instead, since slot keys
/// are not stable across sessions.
#[derive(Debug, Default)]
pub struct Document {
    pub walls: SlotMap<WallId, WallData>,
    pub beams: SlotMap<BeamId, BeamData>,
    pub slabs: SlotMap<SlabId, SlabData>,
    pub faces: SlotMap<FaceId, FaceEntity>,
    pub joints: SlotMap<JointId, JointData>,
    pub graph: JointGraph,
    pub layer: LayerState,
    next_uid: u64,
}

impl Document {
    /// Creates a new, empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next stable entity uid.
    pub fn alloc_uid(&mut self) -> u64 {
        self.next_uid += 1;
        self.next_uid
    }

    /// Advances the uid counter past an externally loaded uid so future
    /// allocations never collide with persisted entities.
    pub fn ensure_uid_watermark(&mut self, uid: u64) {
        self.next_uid = self.next_uid.max(uid);
    }

    // --- Wall operations ---

    /// Inserts a wall and returns its ID.
    pub fn add_wall(&mut self, curve: PlanCurve, width: f64, base_z: f64, height: f64) -> WallId {
        let uid = self.alloc_uid();
        self.walls
            .insert(WallData::new(uid, curve, width, base_z, height))
    }

    /// Returns a reference to the wall data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn wall(&self, id: WallId) -> Result<&WallData, TopologyError> {
        self.walls
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wall".into()))
    }

    /// Returns a mutable reference to the wall data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn wall_mut(&mut self, id: WallId) -> Result<&mut WallData, TopologyError> {
        self.walls
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wall".into()))
    }

    /// Removes a wall: destroys every joint still referencing it, drops its
    /// graph entries, then removes its managed faces and the wall itself.
    pub fn remove_wall(&mut self, id: WallId) {
        self.graph.remove_wall(&mut self.joints, id);
        if let Some(wall) = self.walls.remove(id) {
            for (face, _) in wall.face_map.iter() {
                self.faces.remove(face);
            }
            self.layer.mark_dirty();
        }
    }

    /// Looks a wall up by its stable uid.
    #[must_use]
    pub fn find_wall_by_uid(&self, uid: u64) -> Option<WallId> {
        self.walls.iter().find(|(_, w)| w.uid == uid).map(|(k, _)| k)
    }

    // --- Beam / slab operations ---

    /// Inserts a beam and returns its ID.
    pub fn add_beam(&mut self, data: BeamData) -> BeamId {
        self.beams.insert(data)
    }

    /// Returns a reference to the beam data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn beam(&self, id: BeamId) -> Result<&BeamData, TopologyError> {
        self.beams
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("beam".into()))
    }

    /// Inserts a slab and returns its ID.
    pub fn add_slab(&mut self, data: SlabData) -> SlabId {
        self.slabs.insert(data)
    }

    /// Returns a reference to the slab data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn slab(&self, id: SlabId) -> Result<&SlabData, TopologyError> {
        self.slabs
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("slab".into()))
    }

    // --- Face entity operations (scene-graph child hooks) ---

    /// Creates a face entity under `master` and returns its ID.
    pub fn add_face(&mut self, master: ElementId, profile: FaceProfile) -> FaceId {
        let uid = self.alloc_uid();
        self.faces.insert(FaceEntity::new(uid, master, profile))
    }

    /// Removes a face entity from the document.
    pub fn remove_face(&mut self, id: FaceId) {
        self.faces.remove(id);
    }

    /// Returns a reference to the face entity, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn face(&self, id: FaceId) -> Result<&FaceEntity, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Returns a mutable reference to the face entity, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceEntity, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Looks a face up by its stable uid.
    #[must_use]
    pub fn find_face_by_uid(&self, uid: u64) -> Option<FaceId> {
        self.faces.iter().find(|(_, f)| f.uid == uid).map(|(k, _)| k)
    }

    // --- Face map access (copy-on-write discipline) ---

    /// The current face map snapshot of a structural element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the document.
    pub fn face_map(&self, element: ElementId) -> Result<&FaceMap, TopologyError> {
        match element {
            ElementId::Wall(id) => Ok(&self.wall(id)?.face_map),
            ElementId::Beam(id) => Ok(&self.beam(id)?.face_map),
            ElementId::Slab(id) => Ok(&self.slab(id)?.face_map),
        }
    }

    /// Replaces an element's face map wholesale, returning the previous
    /// snapshot.
    ///
    /// Structural changes never mutate the map in place; the whole snapshot
    /// is swapped so a field-changed signal can carry old and new maps.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the document.
    pub fn set_face_map(
        &mut self,
        element: ElementId,
        map: FaceMap,
    ) -> Result<FaceMap, TopologyError> {
        let slot = match element {
            ElementId::Wall(id) => &mut self.wall_mut(id)?.face_map,
            ElementId::Beam(id) => {
                &mut self
                    .beams
                    .get_mut(id)
                    .ok_or_else(|| TopologyError::EntityNotFound("beam".into()))?
                    .face_map
            }
            ElementId::Slab(id) => {
                &mut self
                    .slabs
                    .get_mut(id)
                    .ok_or_else(|| TopologyError::EntityNotFound("slab".into()))?
                    .face_map
            }
        };
        Ok(std::mem::replace(slot, map))
    }

    // --- Joint operations (delegating to the topology layer) ---

    /// Creates a joint with the given wall memberships and registers it with
    /// the topology graph.
    pub fn create_joint(&mut self, kind: JointKind, order: i32, infos: Vec<WallInfo>) -> JointId {
        let uid = self.alloc_uid();
        let id = self.joints.insert(JointData::new(uid, kind, order));
        joint::update_wall_infos(&mut self.graph, &mut self.joints, id, infos);
        id
    }

    /// Returns a reference to the joint data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn joint(&self, id: JointId) -> Result<&JointData, TopologyError> {
        self.joints
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("joint".into()))
    }

    /// Replaces a joint's wall-info list, keeping graph back-references in
    /// sync via the symmetric difference of old and new memberships.
    pub fn update_joint_walls(&mut self, id: JointId, infos: Vec<WallInfo>) {
        joint::update_wall_infos(&mut self.graph, &mut self.joints, id, infos);
    }

    /// Destroys a joint: unregisters it from every wall and removes it.
    pub fn destroy_joint(&mut self, id: JointId) {
        joint::destroy(&mut self.graph, &mut self.joints, id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;

    fn straight_wall(doc: &mut Document, x0: f64, x1: f64) -> WallId {
        doc.add_wall(
            PlanCurve::line(Point2::new(x0, 0.0), Point2::new(x1, 0.0)),
            0.2,
            0.0,
            3.0,
        )
    }

    #[test]
    fn uids_are_unique_and_stable() {
        let mut doc = Document::new();
        let a = straight_wall(&mut doc, 0.0, 1.0);
        let b = straight_wall(&mut doc, 1.0, 2.0);
        let ua = doc.wall(a).unwrap().uid;
        let ub = doc.wall(b).unwrap().uid;
        assert_ne!(ua, ub);
        assert_eq!(doc.find_wall_by_uid(ua), Some(a));
    }

    #[test]
    fn remove_wall_destroys_joints_and_faces() {
        let mut doc = Document::new();
        let a = straight_wall(&mut doc, 0.0, 2.0);
        let b = straight_wall(&mut doc, 2.0, 4.0);
        let j = doc.create_joint(
            JointKind::CORNER,
            0,
            vec![
                WallInfo::new(a, crate::topology::joint::WallEnd::To),
                WallInfo::new(b, crate::topology::joint::WallEnd::From),
            ],
        );
        assert!(doc.joint(j).is_ok());

        doc.remove_wall(a);
        assert!(doc.wall(a).is_err());
        // The joint referenced the removed wall, so it is destroyed too.
        assert!(doc.joint(j).is_err());
    }

    #[test]
    fn missing_entities_are_errors() {
        let mut doc = Document::new();
        let w = straight_wall(&mut doc, 0.0, 1.0);
        doc.remove_wall(w);
        assert!(doc.wall(w).is_err());
        assert!(doc.face_map(ElementId::Wall(w)).is_err());
    }
}
