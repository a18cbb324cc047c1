use std::collections::HashSet;

use tracing::debug;

use crate::builder::{station_cut, RebuildReport, SlotKind, SlotRules};
use crate::document::{BeamId, Document, ElementId};
use crate::error::Result;
use crate::geometry::profile::SAMPLE_DEVIATION;
use crate::geometry::{FaceProfile, PlanCurve};
use crate::kernel::{FaceKernel, SplitCurve};
use crate::math::Point2;
use crate::reconcile::{CleanFreeFaces, ReconcileSlot, SlotSource};

/// Rebuilds a beam's side and bottom faces.
///
/// Side slots split at stations where other profiled beams cross this
/// beam's axis; the bottom slot splits along the crossing beams' curves
/// themselves (the horizontal split-curve rule).
#[derive(Debug)]
pub struct RebuildBeamFaces {
    beam: BeamId,
}

impl RebuildBeamFaces {
    #[must_use]
    pub fn new(beam: BeamId) -> Self {
        Self { beam }
    }

    /// Executes the rebuild.
    ///
    /// A beam without a profiled cross section has no split-capable
    /// geometry; its managed faces are removed wholesale and downstream
    /// mixpaint/hole logic recomputes from scratch.
    ///
    /// # Errors
    ///
    /// Returns an error if the beam is missing or degenerate offsets fail.
    pub fn execute(&self, doc: &mut Document, kernel: &dyn FaceKernel) -> Result<RebuildReport> {
        let element = ElementId::Beam(self.beam);
        let beam = doc.beam(self.beam)?.clone();
        let mut report = RebuildReport::default();

        if !beam.profiled || beam.curve.is_degenerate() {
            let claimed = HashSet::new();
            report.removed = CleanFreeFaces {
                element,
                claimed: &claimed,
            }
            .execute(doc)?;
            doc.layer.mark_dirty();
            return Ok(report);
        }

        let half = beam.width / 2.0;
        let left = beam.curve.offset(half)?;
        let right = beam.curve.offset(-half)?;

        let mut claimed = HashSet::new();
        let mut map = doc.face_map(element)?.clone();

        let slots = [
            (
                "left",
                SlotKind::Vertical,
                FaceProfile::extruded(&left, beam.base_z, beam.top_z()),
            ),
            (
                "right",
                SlotKind::Vertical,
                FaceProfile::extruded(&right, beam.base_z, beam.top_z()),
            ),
            (
                "bottom",
                SlotKind::Horizontal,
                bottom_profile(&left, &right, beam.base_z),
            ),
        ];

        for (key, kind, profile) in slots {
            let mut op = ReconcileSlot::new(element, key, kind, SlotSource::Boundary(profile));
            op.split_curves = self.split_curves(doc, kernel, key);
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
            "beam face rebuild: {} changed, {} created, {} removed",
            report.changed.len(),
            report.created.len(),
            report.removed.len()
        );
        Ok(report)
    }

    /// Curves of other profiled beams crossing this beam's axis.
    fn crossing_curves(&self, doc: &Document, kernel: &dyn FaceKernel) -> Vec<(PlanCurve, Vec<Point2>)> {
        let Ok(beam) = doc.beam(self.beam) else {
            return Vec::new();
        };
        let mut crossings = Vec::new();
        for (id, other) in &doc.beams {
            if id == self.beam || !other.profiled {
                continue;
            }
            let stations = kernel.intersect_curves(&beam.curve, &other.curve);
            if !stations.is_empty() {
                crossings.push((other.curve.clone(), stations));
            }
        }
        crossings
    }
}

impl SlotRules for RebuildBeamFaces {
    fn split_curves(
        &self,
        doc: &Document,
        kernel: &dyn FaceKernel,
        slot: &str,
    ) -> Vec<SplitCurve> {
        let Ok(beam) = doc.beam(self.beam) else {
            return Vec::new();
        };
        let crossings = self.crossing_curves(doc, kernel);
        if slot == "bottom" {
            // Horizontal rule: split along the crossing curve itself.
            return crossings
                .into_iter()
                .map(|(curve, _)| SplitCurve::new(curve))
                .collect();
        }
        // Vertical rule: transversal station cuts.
        crossings
            .into_iter()
            .flat_map(|(_, stations)| stations)
            .filter_map(|station| station_cut(&beam.curve, &station, beam.width))
            .collect()
    }

    fn sort_axis(&self, doc: &Document, slot: &str) -> Option<PlanCurve> {
        if slot == "bottom" {
            return None;
        }
        doc.beam(self.beam).ok().map(|beam| beam.curve.clone())
    }
}

/// Closed plan outline of the beam footprint at the underside elevation.
fn bottom_profile(left: &PlanCurve, right: &PlanCurve, z: f64) -> FaceProfile {
    let mut outline = left.sample_points(SAMPLE_DEVIATION);
    let mut back = right.sample_points(SAMPLE_DEVIATION);
    back.reverse();
    outline.extend(back);
    FaceProfile::horizontal(&outline, z, false)
}
