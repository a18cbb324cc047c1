use std::collections::HashSet;

use tracing::debug;

use crate::document::{Document, ElementId, FaceId};
use crate::error::Result;

/// Once-per-rebuild orphan sweep.
///
/// Every entity tracked in the element's face map before the rebuild that
/// no slot reconcile claimed is removed from the document exactly once and
/// dropped from the map. Running the sweep per slot would break multi-pass
/// rebuilds that touch the same slot more than once, so it is a separate
/// operation.
#[derive(Debug)]
pub struct CleanFreeFaces<'a> {
    pub element: ElementId,
    pub claimed: &'a HashSet<FaceId>,
}

impl CleanFreeFaces<'_> {
    /// Removes unclaimed faces, returning their IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found in the document.
    pub fn execute(&self, doc: &mut Document) -> Result<Vec<FaceId>> {
        let pre = doc.face_map(self.element)?.clone();
        let mut next = pre.clone();
        let mut removed = Vec::new();

        for (id, record) in pre.iter() {
            if self.claimed.contains(&id) {
                continue;
            }
            debug!("sweeping orphaned face {:?} ({})", id, record.final_key());
            doc.remove_face(id);
            next.remove(id);
            removed.push(id);
        }

        if !removed.is_empty() {
            doc.set_face_map(self.element, next)?;
        }
        Ok(removed)
    }
}
