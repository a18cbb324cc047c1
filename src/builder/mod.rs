pub mod beam;
pub mod mirror;
pub mod slab;
pub mod wall;

pub use beam::RebuildBeamFaces;
pub use mirror::{mirror_face_map, MirrorWall};
pub use slab::RebuildSlabFaces;
pub use wall::RebuildWallFaces;

use crate::document::{Document, FaceId};
use crate::geometry::PlanCurve;
use crate::kernel::{FaceKernel, SplitCurve};
use crate::math::{Point2, Vector2, TOLERANCE};

/// How a logical face slot splits and orders its pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Side slots (wall/beam left/right): station cuts, canonical order
    /// along the element axis.
    Vertical,
    /// Bottom/top slots: split along crossing curves, no canonical order.
    Horizontal,
    /// One-to-one faces bypassing the split pipeline.
    Aux,
}

/// Report of one element rebuild: the touched entity IDs downstream caches
/// invalidate against (mesh regeneration, hole cutting, room recompute).
#[derive(Debug, Default, Clone)]
pub struct RebuildReport {
    pub changed: Vec<FaceId>,
    pub created: Vec<FaceId>,
    pub removed: Vec<FaceId>,
}

/// Split-curve and sort-order provider, implemented once per element kind.
pub trait SlotRules {
    /// Slot-specific split curves for the element's current surroundings.
    fn split_curves(&self, doc: &Document, kernel: &dyn FaceKernel, slot: &str)
        -> Vec<SplitCurve>;

    /// Canonical ordering axis for vertical slots; `None` for slots with no
    /// canonical order.
    fn sort_axis(&self, doc: &Document, slot: &str) -> Option<PlanCurve>;
}

/// Transversal cut through a station point on an element axis:
/// perpendicular for straight axes, radial for arcs.
pub(crate) fn station_cut(axis: &PlanCurve, station: &Point2, reach: f64) -> Option<SplitCurve> {
    let dir = match axis {
        PlanCurve::Line { start, end } => {
            let d = end - start;
            let n = d.norm();
            if n < TOLERANCE {
                return None;
            }
            Vector2::new(-d.y / n, d.x / n)
        }
        PlanCurve::Arc { center, .. } => {
            let d = station - center;
            let n = d.norm();
            if n < TOLERANCE {
                return None;
            }
            d / n
        }
    };
    let reach = reach.max(1.0);
    Some(SplitCurve::new(PlanCurve::line(
        station - dir * reach,
        station + dir * reach,
    )))
}
