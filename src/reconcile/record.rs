use std::collections::BTreeMap;

use crate::document::{ElementId, FaceId};

/// The persisted identity slot of one logical boundary face.
///
/// `origin_key` names the logical slot within the owning element (side plus
/// optional split-group index, e.g. `"left/0"`); `extra_key` disambiguates
/// further subdivision of the same slot. The derived final key is the
/// stable lookup key and is unique within one element's face map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceRecord {
    pub master: ElementId,
    pub origin_key: String,
    pub is_aux: bool,
    pub extra_key: Option<String>,
}

impl FaceRecord {
    /// Creates a non-aux record with no extra key.
    #[must_use]
    pub fn new(master: ElementId, origin_key: impl Into<String>) -> Self {
        Self {
            master,
            origin_key: origin_key.into(),
            is_aux: false,
            extra_key: None,
        }
    }

    /// Creates an aux record (one-to-one, never split or matched).
    #[must_use]
    pub fn aux(master: ElementId, origin_key: impl Into<String>) -> Self {
        Self {
            master,
            origin_key: origin_key.into(),
            is_aux: true,
            extra_key: None,
        }
    }

    /// Adds a subdivision suffix.
    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra_key = Some(extra.into());
        self
    }

    /// The stable lookup key: `origin_key`, plus `/extra_key` if present.
    #[must_use]
    pub fn final_key(&self) -> String {
        match &self.extra_key {
            Some(extra) => format!("{}/{}", self.origin_key, extra),
            None => self.origin_key.clone(),
        }
    }
}

/// A structural element's persisted face identities, keyed by face entity.
///
/// The map is a value type mutated copy-on-write: structural changes build
/// a new map and swap it wholesale (see `Document::set_face_map`), so a
/// change signal can carry old and new snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceMap {
    entries: BTreeMap<FaceId, FaceRecord>,
}

impl FaceMap {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: FaceId) -> Option<&FaceRecord> {
        self.entries.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: FaceId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FaceId, &FaceRecord)> {
        self.entries.iter().map(|(id, record)| (*id, record))
    }

    /// Looks the owning face entity up by final key.
    #[must_use]
    pub fn face_by_final_key(&self, key: &str) -> Option<FaceId> {
        self.entries
            .iter()
            .find(|(_, record)| record.final_key() == key)
            .map(|(id, _)| *id)
    }

    /// Inserts an entry, evicting any other entry that holds the same final
    /// key (final keys are unique per map; the evicted entry can only be an
    /// orphan that lost its key to a reassignment).
    ///
    /// Returns the evicted face, if any.
    pub fn insert_claiming(&mut self, id: FaceId, record: FaceRecord) -> Option<FaceId> {
        let key = record.final_key();
        let evicted = self
            .entries
            .iter()
            .find(|(other, existing)| **other != id && existing.final_key() == key)
            .map(|(other, _)| *other);
        if let Some(other) = evicted {
            self.entries.remove(&other);
        }
        self.entries.insert(id, record);
        evicted
    }

    /// Removes an entry.
    pub fn remove(&mut self, id: FaceId) -> Option<FaceRecord> {
        self.entries.remove(&id)
    }

    /// `true` if every final key is unique (the map invariant).
    #[must_use]
    pub fn final_keys_unique(&self) -> bool {
        let mut seen = std::collections::BTreeSet::new();
        self.entries
            .values()
            .all(|record| seen.insert(record.final_key()))
    }
}
