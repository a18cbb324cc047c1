use std::collections::HashSet;

use tracing::debug;

use crate::builder::{station_cut, RebuildReport, SlotKind, SlotRules};
use crate::document::{Document, ElementId, WallId};
use crate::error::{Result, TopologyError};
use crate::geometry::{FaceProfile, PlanCurve};
use crate::kernel::{FaceKernel, SplitCurve};
use crate::reconcile::{CleanFreeFaces, ReconcileSlot, SlotSource};
use crate::topology::joint;

/// Rebuilds a wall's side faces from its current geometry, reconciling
/// against the persisted face map so identities and materials survive.
///
/// Side slots are split at mid-span joint stations: a wall butting into
/// this wall's span divides its side faces.
#[derive(Debug)]
pub struct RebuildWallFaces {
    wall: WallId,
}

impl RebuildWallFaces {
    #[must_use]
    pub fn new(wall: WallId) -> Self {
        Self { wall }
    }

    /// Executes the rebuild: link geometry reset, per-slot kernel split and
    /// reconcile, orphan sweep, layer dirty marks.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is missing or its geometry cannot
    /// produce link info.
    pub fn execute(&self, doc: &mut Document, kernel: &dyn FaceKernel) -> Result<RebuildReport> {
        let element = ElementId::Wall(self.wall);
        let wall = doc.wall(self.wall)?.clone();
        let mut report = RebuildReport::default();

        if wall.curve.is_degenerate() {
            // No split-capable geometry left: drop every managed face and
            // let downstream recomputation start clean.
            let claimed = HashSet::new();
            report.removed = CleanFreeFaces {
                element,
                claimed: &claimed,
            }
            .execute(doc)?;
            doc.layer.mark_dirty();
            return Ok(report);
        }

        // The wall's geometry changed, so its link cache is rebuilt here —
        // the one place that owns that decision.
        doc.graph.reset_path(self.wall, &wall)?;
        let link = doc
            .graph
            .link_info(self.wall)
            .cloned()
            .ok_or_else(|| TopologyError::EntityNotFound("wall link info".into()))?;

        let split_curves = self.split_curves(doc, kernel, "left");
        let mut claimed = HashSet::new();
        let mut map = doc.face_map(element)?.clone();

        for (key, path) in [("left", &link.left_path), ("right", &link.right_path)] {
            let profile = FaceProfile::extruded(path, wall.base_z, wall.top_z());
            let mut op = ReconcileSlot::new(
                element,
                key,
                SlotKind::Vertical,
                SlotSource::Boundary(profile),
            );
            op.split_curves = split_curves.clone();
            op.sort_axis = self.sort_axis(doc, key);

            let outcome = op.execute(doc, kernel, &map)?;
            report.changed.extend(outcome.changed.iter().copied());
            report.created.extend(outcome.created.iter().copied());
            claimed.extend(outcome.claimed.iter().copied());
            map = outcome.map;
            doc.set_face_map(element, map.clone())?;
        }

        report.removed = CleanFreeFaces {
            element,
            claimed: &claimed,
        }
        .execute(doc)?;
        doc.layer.mark_dirty();
        debug!(
            "wall face rebuild: {} changed, {} created, {} removed",
            report.changed.len(),
            report.created.len(),
            report.removed.len()
        );
        Ok(report)
    }
}

impl SlotRules for RebuildWallFaces {
    fn split_curves(
        &self,
        doc: &Document,
        kernel: &dyn FaceKernel,
        _slot: &str,
    ) -> Vec<SplitCurve> {
        let Ok(wall) = doc.wall(self.wall) else {
            return Vec::new();
        };
        let mut curves = Vec::new();
        for id in doc
            .graph
            .wall_between_joints(&doc.joints, &doc.walls, self.wall)
        {
            let Some(station) = joint::joint_point(&doc.joints, &doc.walls, kernel, id) else {
                continue;
            };
            if let Some(cut) = station_cut(&wall.curve, &station, wall.width) {
                curves.push(cut);
            }
        }
        curves
    }

    fn sort_axis(&self, doc: &Document, _slot: &str) -> Option<PlanCurve> {
        doc.wall(self.wall).ok().map(|wall| wall.curve.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kernel::PlanarKernel;
    use crate::math::Point2;
    use crate::topology::joint::{JointKind, WallEnd, WallInfo};

    fn host_wall(doc: &mut Document) -> WallId {
        doc.add_wall(
            PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(6.0, 0.0)),
            0.2,
            0.0,
            3.0,
        )
    }

    #[test]
    fn plain_wall_gets_two_side_faces() {
        let mut doc = Document::new();
        let w = host_wall(&mut doc);
        let report = RebuildWallFaces::new(w)
            .execute(&mut doc, &PlanarKernel::new())
            .unwrap();

        assert_eq!(report.created.len(), 2);
        let map = doc.face_map(ElementId::Wall(w)).unwrap();
        assert!(map.face_by_final_key("left").is_some());
        assert!(map.face_by_final_key("right").is_some());
        assert!(map.final_keys_unique());
        assert!(doc.layer.rooms_dirty);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut doc = Document::new();
        let w = host_wall(&mut doc);
        let kernel = PlanarKernel::new();
        RebuildWallFaces::new(w).execute(&mut doc, &kernel).unwrap();
        let before = doc.face_map(ElementId::Wall(w)).unwrap().clone();

        let report = RebuildWallFaces::new(w).execute(&mut doc, &kernel).unwrap();
        assert!(report.changed.is_empty());
        assert!(report.created.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(doc.face_map(ElementId::Wall(w)).unwrap(), &before);
    }

    #[test]
    fn mid_span_joint_splits_side_faces() {
        let mut doc = Document::new();
        let host = host_wall(&mut doc);
        // A wall butting into the host's span at x = 2.
        let butting = doc.add_wall(
            PlanCurve::line(Point2::new(2.0, 0.1), Point2::new(2.0, 4.0)),
            0.2,
            0.0,
            3.0,
        );
        doc.create_joint(
            JointKind::TEE,
            0,
            vec![
                WallInfo::new(butting, WallEnd::From),
                WallInfo::new(host, WallEnd::Between),
            ],
        );

        let report = RebuildWallFaces::new(host)
            .execute(&mut doc, &PlanarKernel::new())
            .unwrap();
        assert_eq!(report.created.len(), 4);

        let map = doc.face_map(ElementId::Wall(host)).unwrap();
        assert!(map.face_by_final_key("left").is_some());
        assert!(map.face_by_final_key("left/1").is_some());
        assert!(map.face_by_final_key("right").is_some());
        assert!(map.face_by_final_key("right/1").is_some());
    }

    #[test]
    fn editing_one_wall_leaves_other_walls_untouched() {
        let mut doc = Document::new();
        let a = host_wall(&mut doc);
        let b = doc.add_wall(
            PlanCurve::line(Point2::new(0.0, 5.0), Point2::new(6.0, 5.0)),
            0.2,
            0.0,
            3.0,
        );
        let kernel = PlanarKernel::new();
        RebuildWallFaces::new(a).execute(&mut doc, &kernel).unwrap();
        RebuildWallFaces::new(b).execute(&mut doc, &kernel).unwrap();
        let map_b = doc.face_map(ElementId::Wall(b)).unwrap().clone();

        // Edit wall a and rebuild it only.
        doc.wall_mut(a).unwrap().height = 4.0;
        let report = RebuildWallFaces::new(a).execute(&mut doc, &kernel).unwrap();
        assert_eq!(report.changed.len(), 2);
        assert_eq!(doc.face_map(ElementId::Wall(b)).unwrap(), &map_b);
    }

    #[test]
    fn degenerate_wall_sheds_managed_faces() {
        let mut doc = Document::new();
        let w = host_wall(&mut doc);
        let kernel = PlanarKernel::new();
        RebuildWallFaces::new(w).execute(&mut doc, &kernel).unwrap();
        assert_eq!(doc.face_map(ElementId::Wall(w)).unwrap().len(), 2);

        doc.wall_mut(w).unwrap().curve =
            PlanCurve::line(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        let report = RebuildWallFaces::new(w).execute(&mut doc, &kernel).unwrap();
        assert_eq!(report.removed.len(), 2);
        assert!(doc.face_map(ElementId::Wall(w)).unwrap().is_empty());
    }

    #[test]
    fn orphan_sweep_runs_once_per_rebuild() {
        let mut doc = Document::new();
        let host = host_wall(&mut doc);
        let butting = doc.add_wall(
            PlanCurve::line(Point2::new(2.0, 0.1), Point2::new(2.0, 4.0)),
            0.2,
            0.0,
            3.0,
        );
        let j = doc.create_joint(
            JointKind::TEE,
            0,
            vec![
                WallInfo::new(butting, WallEnd::From),
                WallInfo::new(host, WallEnd::Between),
            ],
        );
        let kernel = PlanarKernel::new();
        RebuildWallFaces::new(host).execute(&mut doc, &kernel).unwrap();
        assert_eq!(doc.face_map(ElementId::Wall(host)).unwrap().len(), 4);

        // Removing the mid-span joint merges the side faces back; the two
        // split remainders are swept exactly once.
        doc.destroy_joint(j);
        let report = RebuildWallFaces::new(host).execute(&mut doc, &kernel).unwrap();
        assert_eq!(report.removed.len(), 2);
        let map = doc.face_map(ElementId::Wall(host)).unwrap();
        assert_eq!(map.len(), 2);
        for id in &report.removed {
            assert!(doc.face(*id).is_err());
        }
    }
}
