use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::document::{JointId, WallData, WallId};
use crate::kernel::FaceKernel;
use crate::math::Point2;
use crate::topology::graph::JointGraph;

/// Bitmask of joint type flags.
///
/// A joint may carry several flags at once (e.g. a crossing that is also
/// tangent-marked). The numeric bit value doubles as the primary sort key
/// for deterministic joint ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct JointKind(u32);

impl JointKind {
    pub const NONE: Self = Self(0);
    /// Ordinary corner between two wall ends.
    pub const CORNER: Self = Self(1);
    /// A wall end butting into another wall's span.
    pub const TEE: Self = Self(1 << 1);
    /// Crossing walls.
    pub const CROSS: Self = Self(1 << 2);
    /// Tangency drawing aid; never treated as a structural corner and
    /// carries no geometric point.
    pub const TANGENT: Self = Self(1 << 3);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn is_tangent(self) -> bool {
        self.intersects(Self::TANGENT)
    }
}

/// Which part of a wall a joint touches.
///
/// From/To are defined by the positioning curve's parameterization and are
/// NOT swapped automatically when a wall is mirrored; callers mirroring a
/// wall must re-derive joint membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallEnd {
    From,
    To,
    Between,
}

/// One wall's membership entry in a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallInfo {
    pub wall: WallId,
    pub end: WallEnd,
}

impl WallInfo {
    #[must_use]
    pub fn new(wall: WallId, end: WallEnd) -> Self {
        Self { wall, end }
    }
}

/// A topological node connecting two or more walls.
///
/// The wall-info list is private: it may only be replaced wholesale via
/// [`update_wall_infos`], which keeps the graph's back-references in sync.
/// In-place mutation would desynchronize them.
#[derive(Debug, Clone)]
pub struct JointData {
    /// Stable uid used by the persistence layer.
    pub uid: u64,
    pub kind: JointKind,
    /// Explicit tie-break rank among coincident joints.
    pub order: i32,
    wall_infos: Vec<WallInfo>,
    removed: bool,
}

impl JointData {
    #[must_use]
    pub(crate) fn new(uid: u64, kind: JointKind, order: i32) -> Self {
        Self {
            uid,
            kind,
            order,
            wall_infos: Vec::new(),
            removed: false,
        }
    }

    #[must_use]
    pub fn wall_infos(&self) -> &[WallInfo] {
        &self.wall_infos
    }

    /// How this joint touches the given wall, if at all.
    #[must_use]
    pub fn end_for(&self, wall: WallId) -> Option<WallEnd> {
        self.wall_infos
            .iter()
            .find(|info| info.wall == wall)
            .map(|info| info.end)
    }

    /// The first registered wall; its width is the final sort tie-break.
    #[must_use]
    pub fn first_wall(&self) -> Option<WallId> {
        self.wall_infos.first().map(|info| info.wall)
    }

    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Replaces a joint's wall-info list and walks the symmetric difference
/// against the previous list, registering with newly added walls and
/// unregistering from removed ones.
pub fn update_wall_infos(
    graph: &mut JointGraph,
    joints: &mut SlotMap<JointId, JointData>,
    id: JointId,
    new_infos: Vec<WallInfo>,
) {
    let Some(data) = joints.get_mut(id) else {
        return;
    };
    let old: Vec<WallId> = data.wall_infos.iter().map(|info| info.wall).collect();
    data.wall_infos = new_infos;
    let new: Vec<WallId> = data.wall_infos.iter().map(|info| info.wall).collect();

    for wall in &new {
        if !old.contains(wall) {
            graph.register(*wall, id);
        }
    }
    for wall in &old {
        if !new.contains(wall) {
            graph.unregister(*wall, id);
        }
    }
}

/// Destroys a joint: unregisters it from every wall it touches, marks it
/// removed and drops it from the arena.
pub fn destroy(
    graph: &mut JointGraph,
    joints: &mut SlotMap<JointId, JointData>,
    id: JointId,
) {
    let Some(data) = joints.get_mut(id) else {
        return;
    };
    data.removed = true;
    let walls: Vec<WallId> = data.wall_infos.iter().map(|info| info.wall).collect();
    for wall in walls {
        graph.unregister(wall, id);
    }
    joints.remove(id);
}

/// The geometric point of a joint.
///
/// `None` for joints with fewer than two walls or with the tangent flag.
/// Otherwise both walls' positioning curves are extended (they are trimmed
/// at their joints, so the untrimmed curves must be intersected) and the
/// intersection candidates are ordered by distance to each From/To wall's
/// actual curve endpoint; the first remaining candidate wins.
#[must_use]
pub fn joint_point(
    joints: &SlotMap<JointId, JointData>,
    walls: &SlotMap<WallId, WallData>,
    kernel: &dyn FaceKernel,
    id: JointId,
) -> Option<Point2> {
    let data = joints.get(id)?;
    if data.wall_infos.len() < 2 || data.kind.is_tangent() {
        return None;
    }

    let first = walls.get(data.wall_infos[0].wall)?;
    let second = walls.get(data.wall_infos[1].wall)?;

    let extension = (first.width + second.width).max(1.0);
    let extended_a = kernel.extend_curve(&first.curve, extension);
    let extended_b = kernel.extend_curve(&second.curve, extension);
    let mut candidates = kernel.intersect_curves(&extended_a, &extended_b);
    if candidates.is_empty() {
        return None;
    }

    let anchors: Vec<Point2> = data
        .wall_infos
        .iter()
        .filter_map(|info| {
            let wall = walls.get(info.wall)?;
            match info.end {
                WallEnd::From => Some(wall.curve.start_point()),
                WallEnd::To => Some(wall.curve.end_point()),
                WallEnd::Between => None,
            }
        })
        .collect();

    candidates.sort_by(|p, q| {
        for anchor in &anchors {
            let dp = (p - anchor).norm();
            let dq = (q - anchor).norm();
            let ord = dp.total_cmp(&dq);
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });

    candidates.into_iter().next()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::geometry::PlanCurve;
    use crate::kernel::PlanarKernel;

    fn wall(doc: &mut Document, a: Point2, b: Point2) -> WallId {
        doc.add_wall(PlanCurve::line(a, b), 0.2, 0.0, 3.0)
    }

    #[test]
    fn kind_bits_compose() {
        let k = JointKind::CORNER.union(JointKind::TANGENT);
        assert!(k.is_tangent());
        assert!(k.intersects(JointKind::CORNER));
        assert!(!k.intersects(JointKind::CROSS));
    }

    #[test]
    fn corner_point_recovers_trimmed_intersection() {
        let mut doc = Document::new();
        // Two walls whose curves stop just short of the corner at (2, 0).
        let a = wall(&mut doc, Point2::new(0.0, 0.0), Point2::new(1.9, 0.0));
        let b = wall(&mut doc, Point2::new(2.0, 0.1), Point2::new(2.0, 3.0));
        let j = doc.create_joint(
            JointKind::CORNER,
            0,
            vec![
                WallInfo::new(a, WallEnd::To),
                WallInfo::new(b, WallEnd::From),
            ],
        );

        let kernel = PlanarKernel::new();
        let p = joint_point(&doc.joints, &doc.walls, &kernel, j).unwrap();
        assert!((p.x - 2.0).abs() < 1e-9, "p={p:?}");
        assert!((p.y).abs() < 1e-9, "p={p:?}");
    }

    #[test]
    fn curved_wall_picks_candidate_near_endpoint() {
        let mut doc = Document::new();
        // A straight wall along the x axis and an arc wall crossing it twice
        // at x = ±1; the arc's From end sits near (1, 0).
        let a = wall(&mut doc, Point2::new(-3.0, 0.0), Point2::new(3.0, 0.0));
        let arc = doc.add_wall(
            PlanCurve::arc(Point2::new(0.0, 0.0), 1.0, -0.1, std::f64::consts::PI),
            0.2,
            0.0,
            3.0,
        );
        let j = doc.create_joint(
            JointKind::CROSS,
            0,
            vec![
                WallInfo::new(arc, WallEnd::From),
                WallInfo::new(a, WallEnd::Between),
            ],
        );

        let kernel = PlanarKernel::new();
        let p = joint_point(&doc.joints, &doc.walls, &kernel, j).unwrap();
        assert!(p.x > 0.0, "expected the candidate near the From end, got {p:?}");
    }

    #[test]
    fn tangent_joint_has_no_point() {
        let mut doc = Document::new();
        let a = wall(&mut doc, Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        let b = wall(&mut doc, Point2::new(2.0, 0.0), Point2::new(2.0, 2.0));
        let j = doc.create_joint(
            JointKind::TANGENT,
            0,
            vec![
                WallInfo::new(a, WallEnd::To),
                WallInfo::new(b, WallEnd::From),
            ],
        );
        let kernel = PlanarKernel::new();
        assert!(joint_point(&doc.joints, &doc.walls, &kernel, j).is_none());
    }

    #[test]
    fn single_wall_joint_has_no_point() {
        let mut doc = Document::new();
        let a = wall(&mut doc, Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        let j = doc.create_joint(JointKind::CORNER, 0, vec![WallInfo::new(a, WallEnd::To)]);
        let kernel = PlanarKernel::new();
        assert!(joint_point(&doc.joints, &doc.walls, &kernel, j).is_none());
    }

    #[test]
    fn update_wall_infos_moves_registration() {
        let mut doc = Document::new();
        let a = wall(&mut doc, Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        let b = wall(&mut doc, Point2::new(2.0, 0.0), Point2::new(2.0, 2.0));
        let c = wall(&mut doc, Point2::new(2.0, 0.0), Point2::new(4.0, 0.0));
        let j = doc.create_joint(
            JointKind::CORNER,
            0,
            vec![
                WallInfo::new(a, WallEnd::To),
                WallInfo::new(b, WallEnd::From),
            ],
        );

        doc.update_joint_walls(
            j,
            vec![
                WallInfo::new(a, WallEnd::To),
                WallInfo::new(c, WallEnd::From),
            ],
        );

        assert!(doc.graph.joints_of(a).contains(&j));
        assert!(!doc.graph.joints_of(b).contains(&j));
        assert!(doc.graph.joints_of(c).contains(&j));
    }

    #[test]
    fn destroy_unregisters_everywhere() {
        let mut doc = Document::new();
        let a = wall(&mut doc, Point2::new(0.0, 0.0), Point2::new(2.0, 0.0));
        let b = wall(&mut doc, Point2::new(2.0, 0.0), Point2::new(2.0, 2.0));
        let j = doc.create_joint(
            JointKind::CORNER,
            0,
            vec![
                WallInfo::new(a, WallEnd::To),
                WallInfo::new(b, WallEnd::From),
            ],
        );

        doc.destroy_joint(j);
        assert!(doc.graph.joints_of(a).is_empty());
        assert!(doc.graph.joints_of(b).is_empty());
        assert!(doc.joint(j).is_err());
    }
}
