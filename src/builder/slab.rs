use std::collections::HashSet;

use tracing::debug;

use crate::builder::{RebuildReport, SlotKind, SlotRules};
use crate::document::{Document, ElementId, SlabId};
use crate::error::Result;
use crate::geometry::{FaceProfile, PlanCurve};
use crate::kernel::{FaceKernel, SplitCurve};
use crate::math::polygon_2d::{point_in_polygon, signed_area_2d};
use crate::math::TOLERANCE;
use crate::reconcile::{CleanFreeFaces, ReconcileSlot, SlotSource};

/// Rebuilds a slab's top, bottom and aux faces.
///
/// Horizontal slots split along the centerlines of walls standing on the
/// slab; aux slots reconcile one-to-one without splitting or matching.
#[derive(Debug)]
pub struct RebuildSlabFaces {
    slab: SlabId,
}

impl RebuildSlabFaces {
    #[must_use]
    pub fn new(slab: SlabId) -> Self {
        Self { slab }
    }

    /// Executes the rebuild.
    ///
    /// # Errors
    ///
    /// Returns an error if the slab is missing.
    pub fn execute(&self, doc: &mut Document, kernel: &dyn FaceKernel) -> Result<RebuildReport> {
        let element = ElementId::Slab(self.slab);
        let slab = doc.slab(self.slab)?.clone();
        let mut report = RebuildReport::default();

        if slab.outline.len() < 3 || signed_area_2d(&slab.outline).abs() < TOLERANCE {
            let claimed = HashSet::new();
            report.removed = CleanFreeFaces {
                element,
                claimed: &claimed,
            }
            .execute(doc)?;
            doc.layer.mark_dirty();
            return Ok(report);
        }

        let mut slots = vec![
            (
                "top".to_owned(),
                SlotKind::Horizontal,
                FaceProfile::horizontal(&slab.outline, slab.top_z, true),
            ),
            (
                "bottom".to_owned(),
                SlotKind::Horizontal,
                FaceProfile::horizontal(&slab.outline, slab.bottom_z(), false),
            ),
        ];
        for aux in &slab.aux {
            slots.push((aux.key.clone(), SlotKind::Aux, aux.profile.clone()));
        }

        let mut claimed = HashSet::new();
        let mut map = doc.face_map(element)?.clone();

        for (key, kind, profile) in slots {
            let mut op =
                ReconcileSlot::new(element, key.clone(), kind, SlotSource::Boundary(profile));
            op.split_curves = self.split_curves(doc, kernel, &key);
            op.sort_axis = self.sort_axis(doc, &key);

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
            "slab face rebuild: {} changed, {} created, {} removed",
            report.changed.len(),
            report.created.len(),
            report.removed.len()
        );
        Ok(report)
    }
}

impl SlotRules for RebuildSlabFaces {
    fn split_curves(
        &self,
        doc: &Document,
        kernel: &dyn FaceKernel,
        slot: &str,
    ) -> Vec<SplitCurve> {
        if slot != "top" && slot != "bottom" {
            return Vec::new();
        }
        let Ok(slab) = doc.slab(self.slab) else {
            return Vec::new();
        };

        // Horizontal rule: split along the centerline of every wall that
        // touches the slab region.
        let outline_edges: Vec<PlanCurve> = slab
            .outline
            .iter()
            .zip(slab.outline.iter().cycle().skip(1))
            .map(|(a, b)| PlanCurve::line(*a, *b))
            .collect();

        doc.walls
            .iter()
            .filter(|(_, wall)| {
                let crosses_edge = outline_edges
                    .iter()
                    .any(|edge| !kernel.intersect_curves(&wall.curve, edge).is_empty());
                let midpoint = wall.curve.point_at(0.5);
                crosses_edge || point_in_polygon(&slab.outline, &midpoint)
            })
            .map(|(_, wall)| SplitCurve::new(wall.curve.clone()))
            .collect()
    }

    fn sort_axis(&self, _doc: &Document, _slot: &str) -> Option<PlanCurve> {
        None
    }
}
