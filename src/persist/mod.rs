use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::document::{Document, ElementId};
use crate::error::{PersistError, Result};
use crate::reconcile::{FaceMap, FaceRecord};
use crate::topology::joint::{JointData, JointKind, WallEnd, WallInfo};

/// One wall reference inside a persisted joint, by stable wall uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallRefDump {
    pub wall_uid: u64,
    pub end: WallEnd,
}

/// A persisted joint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointDump {
    pub uid: u64,
    pub kind: u32,
    pub order: i32,
    pub walls: Vec<WallRefDump>,
}

/// Persisted form of the joint topology graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDump {
    pub joints: Vec<JointDump>,
}

/// One persisted face-map entry, by stable face uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRecordDump {
    pub face_uid: u64,
    pub origin_key: String,
    pub is_aux: bool,
    pub extra_key: Option<String>,
}

/// Persisted form of one element's face map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceMapDump {
    pub entries: Vec<FaceRecordDump>,
}

/// Dumps the joint graph.
///
/// Lossy by design: a joint with no wall infos, or referencing a wall that
/// no longer resolves, is dropped with an error log rather than failing
/// the whole save.
#[must_use]
pub fn dump_graph(doc: &Document) -> GraphDump {
    let mut joints = Vec::new();
    for (_, data) in &doc.joints {
        match dump_joint(doc, data) {
            Some(dump) => joints.push(dump),
            None => continue,
        }
    }
    // Stable dump order regardless of arena slot layout.
    joints.sort_by_key(|j| j.uid);
    GraphDump { joints }
}

fn dump_joint(doc: &Document, data: &JointData) -> Option<JointDump> {
    if data.wall_infos().is_empty() {
        error!("joint {} has no wall infos; dropped from dump", data.uid);
        return None;
    }
    let mut walls = Vec::with_capacity(data.wall_infos().len());
    for info in data.wall_infos() {
        let Some(wall) = doc.walls.get(info.wall) else {
            error!(
                "joint {} references an unresolvable wall; dropped from dump",
                data.uid
            );
            return None;
        };
        walls.push(WallRefDump {
            wall_uid: wall.uid,
            end: info.end,
        });
    }
    Some(JointDump {
        uid: data.uid,
        kind: data.kind.bits(),
        order: data.order,
        walls,
    })
}

/// Loads a graph dump into a document whose walls are already present.
///
/// A joint whose wall reference fails to resolve is skipped with a log;
/// malformed persisted data never aborts the load.
pub fn load_graph(doc: &mut Document, dump: &GraphDump) {
    for jd in &dump.joints {
        let mut infos = Vec::with_capacity(jd.walls.len());
        let mut resolved = true;
        for wr in &jd.walls {
            match doc.find_wall_by_uid(wr.wall_uid) {
                Some(id) => infos.push(WallInfo::new(id, wr.end)),
                None => {
                    warn!(
                        "skipping joint {}: wall uid {} does not resolve",
                        jd.uid, wr.wall_uid
                    );
                    resolved = false;
                    break;
                }
            }
        }
        if !resolved {
            continue;
        }
        doc.ensure_uid_watermark(jd.uid);
        let id = doc
            .joints
            .insert(JointData::new(jd.uid, JointKind::from_bits(jd.kind), jd.order));
        crate::topology::joint::update_wall_infos(&mut doc.graph, &mut doc.joints, id, infos);
    }
}

/// Dumps one element's face map.
///
/// Entries referencing missing face entities, and entries violating the
/// unique-final-key invariant, are excluded with an error log.
///
/// # Errors
///
/// Returns an error if the element is not found in the document.
pub fn dump_face_map(doc: &Document, element: ElementId) -> Result<FaceMapDump> {
    let map = doc.face_map(element)?;
    let mut seen = std::collections::BTreeSet::new();
    let mut entries = Vec::with_capacity(map.len());

    for (id, record) in map.iter() {
        let Some(face) = doc.faces.get(id) else {
            error!(
                "face record {} references a missing entity; dropped from dump",
                record.final_key()
            );
            continue;
        };
        if !seen.insert(record.final_key()) {
            error!(
                "duplicate final key {} in face map; record dropped from dump",
                record.final_key()
            );
            continue;
        }
        entries.push(FaceRecordDump {
            face_uid: face.uid,
            origin_key: record.origin_key.clone(),
            is_aux: record.is_aux,
            extra_key: record.extra_key.clone(),
        });
    }

    entries.sort_by_key(|e| e.face_uid);
    Ok(FaceMapDump { entries })
}

/// Loads a face-map dump, resolving entries by face uid.
///
/// Unresolvable entries are skipped with a log.
///
/// # Errors
///
/// Returns an error if the element is not found in the document.
pub fn load_face_map(doc: &mut Document, element: ElementId, dump: &FaceMapDump) -> Result<()> {
    let mut map = FaceMap::default();
    for entry in &dump.entries {
        let Some(id) = doc.find_face_by_uid(entry.face_uid) else {
            warn!(
                "skipping face record {}: face uid {} does not resolve",
                entry.origin_key, entry.face_uid
            );
            continue;
        };
        let mut record = if entry.is_aux {
            FaceRecord::aux(element, entry.origin_key.clone())
        } else {
            FaceRecord::new(element, entry.origin_key.clone())
        };
        record.extra_key = entry.extra_key.clone();
        map.insert_claiming(id, record);
    }
    doc.set_face_map(element, map)?;
    Ok(())
}

/// Serializes a graph dump to JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn graph_to_json(dump: &GraphDump) -> Result<String> {
    Ok(serde_json::to_string_pretty(dump).map_err(PersistError::from)?)
}

/// Deserializes a graph dump from JSON.
///
/// # Errors
///
/// Returns an error on malformed JSON.
pub fn graph_from_json(json: &str) -> Result<GraphDump> {
    Ok(serde_json::from_str(json).map_err(PersistError::from)?)
}

/// Serializes a face-map dump to JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn face_map_to_json(dump: &FaceMapDump) -> Result<String> {
    Ok(serde_json::to_string_pretty(dump).map_err(PersistError::from)?)
}

/// Deserializes a face-map dump from JSON.
///
/// # Errors
///
/// Returns an error on malformed JSON.
pub fn face_map_from_json(json: &str) -> Result<FaceMapDump> {
    Ok(serde_json::from_str(json).map_err(PersistError::from)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::WallId;
    use crate::geometry::{FaceProfile, PlanCurve};
    use crate::math::Point2;

    fn wall(doc: &mut Document, y: f64) -> WallId {
        doc.add_wall(
            PlanCurve::line(Point2::new(0.0, y), Point2::new(4.0, y)),
            0.2,
            0.0,
            3.0,
        )
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn graph_round_trip_preserves_joints() {
        let mut doc = Document::new();
        let a = wall(&mut doc, 0.0);
        let b = wall(&mut doc, 1.0);
        doc.create_joint(
            JointKind::CORNER,
            3,
            vec![
                WallInfo::new(a, WallEnd::To),
                WallInfo::new(b, WallEnd::From),
            ],
        );

        let json = graph_to_json(&dump_graph(&doc)).unwrap();

        // Rebuild a fresh document with the same walls (same uids).
        let mut restored = Document::new();
        let a2 = wall(&mut restored, 0.0);
        let b2 = wall(&mut restored, 1.0);
        load_graph(&mut restored, &graph_from_json(&json).unwrap());

        assert_eq!(restored.joints.len(), 1);
        let (_, data) = restored.joints.iter().next().unwrap();
        assert_eq!(data.kind, JointKind::CORNER);
        assert_eq!(data.order, 3);
        assert_eq!(data.end_for(a2), Some(WallEnd::To));
        assert_eq!(data.end_for(b2), Some(WallEnd::From));
        assert!(restored.graph.joints_of(a2).len() == 1);
    }

    #[test]
    fn dump_drops_invalid_joints() {
        init_tracing();
        let mut doc = Document::new();
        let a = wall(&mut doc, 0.0);
        let b = wall(&mut doc, 1.0);
        doc.create_joint(
            JointKind::CORNER,
            0,
            vec![
                WallInfo::new(a, WallEnd::To),
                WallInfo::new(b, WallEnd::From),
            ],
        );
        doc.create_joint(JointKind::CORNER, 0, Vec::new());

        // Simulate a dangling wall reference by removing the wall behind
        // the document's back.
        doc.walls.remove(b);

        let dump = dump_graph(&doc);
        assert!(dump.joints.is_empty());
    }

    #[test]
    fn load_skips_unresolvable_wall_refs() {
        let mut doc = Document::new();
        let a = wall(&mut doc, 0.0);
        let dump = GraphDump {
            joints: vec![
                JointDump {
                    uid: 50,
                    kind: JointKind::CORNER.bits(),
                    order: 0,
                    walls: vec![WallRefDump {
                        wall_uid: doc.wall(a).unwrap().uid,
                        end: WallEnd::To,
                    }],
                },
                JointDump {
                    uid: 51,
                    kind: JointKind::CORNER.bits(),
                    order: 0,
                    walls: vec![WallRefDump {
                        wall_uid: 9999,
                        end: WallEnd::From,
                    }],
                },
            ],
        };

        load_graph(&mut doc, &dump);
        assert_eq!(doc.joints.len(), 1);
        // The watermark advanced past the loaded uid.
        assert!(doc.alloc_uid() > 50);
    }

    #[test]
    fn face_map_round_trip() {
        let mut doc = Document::new();
        let w = wall(&mut doc, 0.0);
        let element = ElementId::Wall(w);
        let profile = FaceProfile::extruded(
            &PlanCurve::line(Point2::new(0.0, 0.1), Point2::new(4.0, 0.1)),
            0.0,
            3.0,
        );
        let f1 = doc.add_face(element, profile.clone());
        let f2 = doc.add_face(element, profile);
        let mut map = FaceMap::default();
        map.insert_claiming(f1, FaceRecord::new(element, "left"));
        map.insert_claiming(f2, FaceRecord::aux(element, "left").with_extra("1"));
        doc.set_face_map(element, map.clone()).unwrap();

        let json = face_map_to_json(&dump_face_map(&doc, element).unwrap()).unwrap();

        doc.set_face_map(element, FaceMap::default()).unwrap();
        load_face_map(&mut doc, element, &face_map_from_json(&json).unwrap()).unwrap();

        let restored = doc.face_map(element).unwrap();
        assert_eq!(restored, &map);
    }

    #[test]
    fn face_map_dump_drops_dangling_entries() {
        let mut doc = Document::new();
        let w = wall(&mut doc, 0.0);
        let element = ElementId::Wall(w);
        let profile = FaceProfile::extruded(
            &PlanCurve::line(Point2::new(0.0, 0.1), Point2::new(4.0, 0.1)),
            0.0,
            3.0,
        );
        let f1 = doc.add_face(element, profile);
        let mut map = FaceMap::default();
        map.insert_claiming(f1, FaceRecord::new(element, "left"));
        doc.set_face_map(element, map).unwrap();

        // The entity disappears behind the map's back.
        doc.faces.remove(f1);
        let dump = dump_face_map(&doc, element).unwrap();
        assert!(dump.entries.is_empty());
    }
}
