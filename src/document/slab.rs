use crate::geometry::FaceProfile;
use crate::math::Point2;
use crate::reconcile::FaceMap;

/// An auxiliary face slot of a slab, computed upstream and reconciled
/// one-to-one (no splitting, no geometric matching).
#[derive(Debug, Clone)]
pub struct AuxFace {
    /// Logical slot key, e.g. `"aux/0"`.
    pub key: String,
    pub profile: FaceProfile,
}

/// A slab: a closed plan outline spanning `top_z - thickness .. top_z`.
#[derive(Debug, Clone)]
pub struct SlabData {
    /// Stable uid used by the persistence layer.
    pub uid: u64,
    pub outline: Vec<Point2>,
    pub top_z: f64,
    pub thickness: f64,
    /// Auxiliary face slots (edge trims, openings aprons) that bypass the
    /// split pipeline.
    pub aux: Vec<AuxFace>,
    pub face_map: FaceMap,
}

impl SlabData {
    /// Creates a slab with an empty face map and no aux slots.
    #[must_use]
    pub fn new(uid: u64, outline: Vec<Point2>, top_z: f64, thickness: f64) -> Self {
        Self {
            uid,
            outline,
            top_z,
            thickness,
            aux: Vec::new(),
            face_map: FaceMap::default(),
        }
    }

    /// Bottom elevation of the slab.
    #[must_use]
    pub fn bottom_z(&self) -> f64 {
        self.top_z - self.thickness
    }
}
