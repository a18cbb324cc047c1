use crate::geometry::PlanCurve;
use crate::reconcile::FaceMap;

/// A wall: a plan positioning curve thickened by `width`, spanning
/// `base_z .. base_z + height`.
///
/// The wall does not own its joints; joint membership lives in the
/// topology graph. The wall does own its face map.
#[derive(Debug, Clone)]
pub struct WallData {
    /// Stable uid used by the persistence layer.
    pub uid: u64,
    /// Positioning curve; its parameterization defines the From/To ends.
    pub curve: PlanCurve,
    pub width: f64,
    pub base_z: f64,
    pub height: f64,
    /// Persisted face identities, keyed by face entity ID.
    pub face_map: FaceMap,
}

impl WallData {
    /// Creates a wall with an empty face map.
    #[must_use]
    pub fn new(uid: u64, curve: PlanCurve, width: f64, base_z: f64, height: f64) -> Self {
        Self {
            uid,
            curve,
            width,
            base_z,
            height,
            face_map: FaceMap::default(),
        }
    }

    /// Top elevation of the wall.
    #[must_use]
    pub fn top_z(&self) -> f64 {
        self.base_z + self.height
    }
}
