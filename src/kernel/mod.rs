pub mod planar;

use crate::geometry::{FaceProfile, PlanCurve, SurfacePatch};
use crate::math::{Point2, Point3};

pub use planar::PlanarKernel;

/// Boundary data extracted from a BRep face.
#[derive(Debug, Clone)]
pub struct FaceBaseInfo {
    pub outer: Vec<Point3>,
    pub inner: Vec<Vec<Point3>>,
    pub surface: SurfacePatch,
    pub same_sense: bool,
}

/// A parametric surface restricted to boundary loops, ready for splitting.
#[derive(Debug, Clone)]
pub struct TrimmedSurface {
    pub surface: SurfacePatch,
    /// `loops[0]` is the outer boundary; the rest are holes.
    pub loops: Vec<Vec<Point3>>,
    pub same_sense: bool,
}

/// A slot-specific split curve in plan space.
#[derive(Debug, Clone)]
pub struct SplitCurve {
    pub curve: PlanCurve,
}

impl SplitCurve {
    #[must_use]
    pub fn new(curve: PlanCurve) -> Self {
        Self { curve }
    }
}

/// The narrow seam to the geometry kernel.
///
/// The topology/reconciliation core never computes intersections or
/// boundary splits itself; everything geometric is consumed through this
/// trait so the kernel can be swapped without touching identity logic.
pub trait FaceKernel {
    /// Extracts `{outer, inner, surface, same_sense}` from a face.
    fn face_base_info(&self, face: &FaceProfile) -> FaceBaseInfo;

    /// Restricts a surface to boundary loops.
    fn create_trimmed_surface(
        &self,
        surface: &SurfacePatch,
        loops: &[Vec<Point3>],
        same_sense: bool,
    ) -> TrimmedSurface;

    /// Splits a trimmed surface along the given split curves.
    ///
    /// A degenerate boundary yields an empty list, never an error.
    fn split_brep_face(&self, trimmed: &TrimmedSurface, curves: &[SplitCurve])
        -> Vec<FaceProfile>;

    /// Geometric equality of `{surface, outer, inner, orientation}` under
    /// the kernel's tolerance.
    fn is_same_brep_face(&self, a: &FaceProfile, b: &FaceProfile) -> bool;

    /// All intersection points of two plan curves.
    fn intersect_curves(&self, a: &PlanCurve, b: &PlanCurve) -> Vec<Point2>;

    /// Extends a curve beyond both endpoints to undo joint trimming.
    fn extend_curve(&self, curve: &PlanCurve, amount: f64) -> PlanCurve;

    /// Canonical ordering key of a split piece along an axis curve
    /// (left-to-right / front-to-back sort for vertical slots).
    fn piece_order_along(&self, piece: &FaceProfile, axis: &PlanCurve) -> f64;
}
