use crate::geometry::PlanCurve;
use crate::reconcile::FaceMap;

/// A beam: a plan positioning curve with a rectangular cross section.
#[derive(Debug, Clone)]
pub struct BeamData {
    /// Stable uid used by the persistence layer.
    pub uid: u64,
    pub curve: PlanCurve,
    pub width: f64,
    /// Vertical extent of the cross section.
    pub depth: f64,
    /// Elevation of the beam underside.
    pub base_z: f64,
    /// `false` for beams without a profiled cross section; those carry no
    /// split-capable geometry and their managed faces are simply removed.
    pub profiled: bool,
    pub face_map: FaceMap,
}

impl BeamData {
    /// Creates a profiled beam with an empty face map.
    #[must_use]
    pub fn new(uid: u64, curve: PlanCurve, width: f64, depth: f64, base_z: f64) -> Self {
        Self {
            uid,
            curve,
            width,
            depth,
            base_z,
            profiled: true,
            face_map: FaceMap::default(),
        }
    }

    /// Top elevation of the beam.
    #[must_use]
    pub fn top_z(&self) -> f64 {
        self.base_z + self.depth
    }
}
