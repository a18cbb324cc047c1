use slotmap::SlotMap;

use crate::document::{FaceEntity, FaceId};
use crate::geometry::FaceProfile;
use crate::reconcile::record::{FaceMap, FaceRecord};

/// Predecessor faces eligible for matching: entries of the same origin key,
/// minus faces a containing split/merge operation has already claimed.
#[must_use]
pub fn candidates_for<'a>(
    map: &'a FaceMap,
    origin_key: &str,
    ignore: &[FaceId],
) -> Vec<(FaceId, &'a FaceRecord)> {
    map.iter()
        .filter(|(id, record)| record.origin_key == origin_key && !ignore.contains(id))
        .collect()
}

/// Exact final-key match. Ties are impossible: final keys are unique
/// within one face map.
#[must_use]
pub fn match_by_final_key(
    candidates: &[(FaceId, &FaceRecord)],
    final_key: &str,
) -> Option<FaceId> {
    candidates
        .iter()
        .find(|(_, record)| record.final_key() == final_key)
        .map(|(id, _)| *id)
}

/// Content-agnostic geometric matcher for pieces whose recomputed keys
/// cannot be trusted (moved split boundaries, non-vertical slots).
///
/// Greedy: each piece, in order, claims the unclaimed candidate whose
/// stored boundary centroid is nearest to the piece centroid.
#[must_use]
pub fn match_by_adjacency(
    faces: &SlotMap<FaceId, FaceEntity>,
    pieces: &[FaceProfile],
    candidates: &[(FaceId, &FaceRecord)],
) -> Vec<Option<FaceId>> {
    let mut taken = vec![false; candidates.len()];
    pieces
        .iter()
        .map(|piece| {
            let target = piece.centroid();
            let mut best: Option<(usize, f64)> = None;
            for (i, (id, _)) in candidates.iter().enumerate() {
                if taken[i] {
                    continue;
                }
                let Some(entity) = faces.get(*id) else {
                    continue;
                };
                let dist = (entity.profile.centroid() - target).norm();
                let better = best.is_none_or(|(_, d)| dist < d);
                if better {
                    best = Some((i, dist));
                }
            }
            best.map(|(i, _)| {
                taken[i] = true;
                candidates[i].0
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::{Document, ElementId};
    use crate::geometry::PlanCurve;
    use crate::math::Point2;

    fn side_profile(x0: f64, x1: f64) -> FaceProfile {
        let curve = PlanCurve::line(Point2::new(x0, 0.0), Point2::new(x1, 0.0));
        FaceProfile::extruded(&curve, 0.0, 3.0)
    }

    fn fixture() -> (Document, ElementId, FaceId, FaceId) {
        let mut doc = Document::new();
        let wall = doc.add_wall(
            PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)),
            0.2,
            0.0,
            3.0,
        );
        let element = ElementId::Wall(wall);
        let near = doc.add_face(element, side_profile(0.0, 2.0));
        let far = doc.add_face(element, side_profile(2.0, 4.0));
        (doc, element, near, far)
    }

    #[test]
    fn candidates_respect_origin_key_and_ignore() {
        let (_, element, f1, f2) = fixture();
        let mut map = FaceMap::default();
        map.insert_claiming(f1, FaceRecord::new(element, "left"));
        map.insert_claiming(f2, FaceRecord::new(element, "right"));

        let left = candidates_for(&map, "left", &[]);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].0, f1);

        let ignored = candidates_for(&map, "left", &[f1]);
        assert!(ignored.is_empty());
    }

    #[test]
    fn adjacency_prefers_nearest_centroid() {
        let (doc, element, near, far) = fixture();
        let mut map = FaceMap::default();
        map.insert_claiming(near, FaceRecord::new(element, "left"));
        map.insert_claiming(far, FaceRecord::new(element, "left").with_extra("1"));
        let candidates = candidates_for(&map, "left", &[]);

        // Pieces arrive in far-to-near order; matching is by geometry, not order.
        let pieces = vec![side_profile(2.1, 4.0), side_profile(0.0, 1.9)];
        let assigned = match_by_adjacency(&doc.faces, &pieces, &candidates);
        assert_eq!(assigned, vec![Some(far), Some(near)]);
    }

    #[test]
    fn adjacency_leaves_surplus_pieces_unmatched() {
        let (doc, element, near, _) = fixture();
        let mut map = FaceMap::default();
        map.insert_claiming(near, FaceRecord::new(element, "left"));
        let candidates = candidates_for(&map, "left", &[]);

        let pieces = vec![side_profile(0.0, 1.9), side_profile(2.1, 4.0)];
        let assigned = match_by_adjacency(&doc.faces, &pieces, &candidates);
        assert_eq!(assigned[0], Some(near));
        assert_eq!(assigned[1], None);
    }
}
