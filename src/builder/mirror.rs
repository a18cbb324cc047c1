use std::collections::HashMap;

use crate::document::{Document, ElementId, WallId};
use crate::error::Result;
use crate::math::{Point2, Vector2};
use crate::reconcile::FaceMap;
use crate::topology::joint::{WallEnd, WallInfo};

/// Swaps axis-bound slot labels under mirroring.
///
/// Travel-relative labels (`left`/`right`) are preserved: mirroring
/// reverses the curve parameterization, which flips the travel direction
/// and thereby keeps the geometric left side on the left.
fn swap_axis_label(label: &str) -> &str {
    match label {
        "front" => "back",
        "back" => "front",
        other => other,
    }
}

/// Splits `"prefix/3"` into `("prefix", 3)`; `None` when the key carries
/// no numeral component.
fn split_indexed(key: &str) -> Option<(&str, u32)> {
    let (prefix, tail) = key.rsplit_once('/')?;
    tail.parse().ok().map(|index| (prefix, index))
}

/// Re-derives an element's face map for a mirrored element.
///
/// Origin keys get their axis-bound labels swapped and their split-group
/// numeral reversed as `new = max_for_prefix - old`, where the maximum is
/// scanned once per distinct prefix over all existing keys. Extra keys
/// (split order within a slot) are reversed the same way, so split-order
/// numerals stay a contiguous, reversed sequence rather than an arbitrary
/// permutation. Applying the transform twice restores the original keys.
#[must_use]
pub fn mirror_face_map(map: &FaceMap) -> FaceMap {
    let mut group_max: HashMap<String, u32> = HashMap::new();
    let mut extra_max: HashMap<String, u32> = HashMap::new();
    for (_, record) in map.iter() {
        if let Some((prefix, index)) = split_indexed(&record.origin_key) {
            let entry = group_max.entry(prefix.to_owned()).or_insert(0);
            *entry = (*entry).max(index);
        }
        let extra = record
            .extra_key
            .as_deref()
            .and_then(|e| e.parse::<u32>().ok())
            .unwrap_or(0);
        let entry = extra_max.entry(record.origin_key.clone()).or_insert(0);
        *entry = (*entry).max(extra);
    }

    let mut next = FaceMap::default();
    for (id, record) in map.iter() {
        let mut mirrored = record.clone();

        mirrored.origin_key = match split_indexed(&record.origin_key) {
            Some((prefix, index)) => {
                let max = group_max.get(prefix).copied().unwrap_or(index);
                let swapped: Vec<&str> = prefix.split('/').map(swap_axis_label).collect();
                format!("{}/{}", swapped.join("/"), max - index)
            }
            None => record
                .origin_key
                .split('/')
                .map(swap_axis_label)
                .collect::<Vec<_>>()
                .join("/"),
        };

        let old_extra = record
            .extra_key
            .as_deref()
            .and_then(|e| e.parse::<u32>().ok())
            .unwrap_or(0);
        let max = extra_max
            .get(&record.origin_key)
            .copied()
            .unwrap_or(old_extra);
        let new_extra = max - old_extra;
        mirrored.extra_key = if new_extra == 0 {
            None
        } else {
            Some(new_extra.to_string())
        };

        next.insert_claiming(id, mirrored);
    }
    next
}

/// Mirrors a wall across a plan axis.
///
/// The positioning curve is reflected and its parameterization reversed.
/// From/To are defined by that parameterization, so joint membership is
/// re-derived here explicitly rather than by the joints themselves; the
/// face map is re-keyed and the link cache rebuilt.
#[derive(Debug)]
pub struct MirrorWall {
    wall: WallId,
    origin: Point2,
    axis: Vector2,
}

impl MirrorWall {
    #[must_use]
    pub fn new(wall: WallId, origin: Point2, axis: Vector2) -> Self {
        Self { wall, origin, axis }
    }

    /// Executes the mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if the wall is missing or the axis is degenerate.
    pub fn execute(&self, doc: &mut Document) -> Result<()> {
        let wall = doc.wall(self.wall)?.clone();
        let mirrored = wall.curve.mirrored(&self.origin, &self.axis)?.reversed();
        doc.wall_mut(self.wall)?.curve = mirrored;

        doc.set_face_map(ElementId::Wall(self.wall), mirror_face_map(&wall.face_map))?;

        let updated = doc.wall(self.wall)?.clone();
        doc.graph.reset_path(self.wall, &updated)?;

        // The parameterization flip swaps which curve end each joint sits
        // on; Between memberships are unaffected.
        let attached: Vec<_> = doc.graph.joints_of(self.wall).to_vec();
        for id in attached {
            let Ok(data) = doc.joint(id) else {
                continue;
            };
            let infos: Vec<WallInfo> = data
                .wall_infos()
                .iter()
                .map(|info| {
                    if info.wall == self.wall {
                        let end = match info.end {
                            WallEnd::From => WallEnd::To,
                            WallEnd::To => WallEnd::From,
                            WallEnd::Between => WallEnd::Between,
                        };
                        WallInfo::new(info.wall, end)
                    } else {
                        *info
                    }
                })
                .collect();
            doc.update_joint_walls(id, infos);
        }

        doc.layer.mark_dirty();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{FaceProfile, PlanCurve};
    use crate::reconcile::FaceRecord;
    use crate::topology::joint::JointKind;

    fn keyed_map(doc: &mut Document, element: ElementId, keys: &[(&str, Option<&str>)]) -> FaceMap {
        let profile = FaceProfile::extruded(
            &PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
            0.0,
            1.0,
        );
        let mut map = FaceMap::default();
        for (origin, extra) in keys {
            let id = doc.add_face(element, profile.clone());
            let mut record = FaceRecord::new(element, *origin);
            if let Some(extra) = extra {
                record = record.with_extra(*extra);
            }
            map.insert_claiming(id, record);
        }
        map
    }

    fn fixture() -> (Document, ElementId) {
        let mut doc = Document::new();
        let wall = doc.add_wall(
            PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)),
            0.2,
            0.0,
            3.0,
        );
        (doc, ElementId::Wall(wall))
    }

    #[test]
    fn axis_labels_swap_and_indexes_reverse() {
        let (mut doc, element) = fixture();
        let map = keyed_map(
            &mut doc,
            element,
            &[("front/0", None), ("front/1", None), ("front/2", None)],
        );
        let mirrored = mirror_face_map(&map);

        let keys: Vec<String> = mirrored.iter().map(|(_, r)| r.final_key()).collect();
        assert!(keys.contains(&"back/0".to_owned()));
        assert!(keys.contains(&"back/1".to_owned()));
        assert!(keys.contains(&"back/2".to_owned()));

        // The numerals reverse: the old front/0 face now owns back/2.
        let old_first = map.face_by_final_key("front/0").unwrap();
        assert_eq!(mirrored.get(old_first).unwrap().final_key(), "back/2");
    }

    #[test]
    fn extra_keys_reverse_within_slot() {
        let (mut doc, element) = fixture();
        let map = keyed_map(
            &mut doc,
            element,
            &[("left", None), ("left", Some("1")), ("left", Some("2"))],
        );
        let mirrored = mirror_face_map(&map);

        let old_first = map.face_by_final_key("left").unwrap();
        let old_last = map.face_by_final_key("left/2").unwrap();
        assert_eq!(mirrored.get(old_first).unwrap().final_key(), "left/2");
        assert_eq!(mirrored.get(old_last).unwrap().final_key(), "left");
        assert!(mirrored.final_keys_unique());
    }

    #[test]
    fn mirror_twice_restores_keys() {
        let (mut doc, element) = fixture();
        let map = keyed_map(
            &mut doc,
            element,
            &[
                ("front/0", None),
                ("front/1", Some("1")),
                ("front/1", None),
                ("top", None),
            ],
        );
        let round_trip = mirror_face_map(&mirror_face_map(&map));
        assert_eq!(round_trip, map);
    }

    #[test]
    fn mirror_wall_flips_joint_ends_and_rekeys() {
        let mut doc = Document::new();
        let a = doc.add_wall(
            PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)),
            0.2,
            0.0,
            3.0,
        );
        let b = doc.add_wall(
            PlanCurve::line(Point2::new(4.0, 0.0), Point2::new(4.0, 4.0)),
            0.2,
            0.0,
            3.0,
        );
        let j = doc.create_joint(
            JointKind::CORNER,
            0,
            vec![
                WallInfo::new(a, WallEnd::To),
                WallInfo::new(b, WallEnd::From),
            ],
        );

        MirrorWall::new(a, Point2::new(0.0, 0.0), Vector2::new(0.0, 1.0))
            .execute(&mut doc)
            .unwrap();

        // The curve is reflected and reversed: From end now at (-4, 0).
        let curve = &doc.wall(a).unwrap().curve;
        assert!((curve.start_point().x + 4.0).abs() < 1e-9);
        assert!((curve.end_point().x).abs() < 1e-9);

        // The joint that sat on the To end now sits on the From end.
        assert_eq!(doc.joint(j).unwrap().end_for(a), Some(WallEnd::From));
        // The other wall's membership is untouched.
        assert_eq!(doc.joint(j).unwrap().end_for(b), Some(WallEnd::From));
    }
}
