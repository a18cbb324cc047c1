use tracing::debug;

use crate::builder::SlotKind;
use crate::document::{Document, ElementId, FaceId, MaterialRef, Mixpaint};
use crate::error::Result;
use crate::geometry::{FaceProfile, PlanCurve};
use crate::kernel::{FaceKernel, SplitCurve};
use crate::reconcile::matching;
use crate::reconcile::record::{FaceMap, FaceRecord};

/// Fresh geometry for one logical slot: either a not-yet-split boundary
/// face or pieces the kernel has already split.
#[derive(Debug, Clone)]
pub enum SlotSource {
    Boundary(FaceProfile),
    Pieces(Vec<FaceProfile>),
}

/// Material data to re-attach to whichever entity ends up owning a final
/// key, after geometry updates (so material identity survives even when
/// the owning entity changed).
#[derive(Debug, Clone, Default)]
pub struct MaterialOverride {
    pub material: Option<MaterialRef>,
    pub mixpaint: Option<Mixpaint>,
}

/// Reconciles one logical slot of a structural element against its
/// persisted face map, maximizing reuse of entity identities.
///
/// Unchanged geometry never touches an entity (idempotence); changed
/// geometry is written into the existing entity in place; unmatched pieces
/// create new entities. Predecessors not claimed by any piece stay in the
/// returned map as orphans for the once-per-rebuild sweep.
#[derive(Debug)]
pub struct ReconcileSlot {
    pub master: ElementId,
    pub origin_key: String,
    pub kind: SlotKind,
    pub source: SlotSource,
    /// Slot-specific split curves (vertical and horizontal slots follow
    /// different rules; both are provided by the builder).
    pub split_curves: Vec<SplitCurve>,
    /// Axis for the canonical left-to-right piece order of vertical slots.
    pub sort_axis: Option<PlanCurve>,
    /// Faces a containing split/merge operation already claimed elsewhere.
    pub ignore_match_faces: Vec<FaceId>,
    /// When a prior space-split context is active, recomputed keys are not
    /// trustworthy and the geometric matcher is used instead.
    pub space_split_active: bool,
    pub material_overrides: Vec<(String, MaterialOverride)>,
}

/// Result of a slot reconcile: the new face-map snapshot plus the touched
/// entity IDs for downstream cache invalidation.
#[derive(Debug, Default)]
pub struct SlotOutcome {
    pub map: FaceMap,
    /// Entities whose geometry was created or rewritten.
    pub changed: Vec<FaceId>,
    pub created: Vec<FaceId>,
    /// Every entity owning a piece of this slot after the call.
    pub claimed: Vec<FaceId>,
}

impl ReconcileSlot {
    /// Creates a slot reconcile with no split curves, no ignore set and no
    /// material overrides.
    #[must_use]
    pub fn new(
        master: ElementId,
        origin_key: impl Into<String>,
        kind: SlotKind,
        source: SlotSource,
    ) -> Self {
        Self {
            master,
            origin_key: origin_key.into(),
            kind,
            source,
            split_curves: Vec::new(),
            sort_axis: None,
            ignore_match_faces: Vec::new(),
            space_split_active: false,
            material_overrides: Vec::new(),
        }
    }

    /// Executes the reconcile against the given face-map snapshot.
    ///
    /// A degenerate boundary (zero split pieces) is a no-op returning the
    /// unchanged map: the slot currently has no face, which is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when a matched entity disappears from the document
    /// mid-operation.
    pub fn execute(
        &self,
        doc: &mut Document,
        kernel: &dyn FaceKernel,
        map: &FaceMap,
    ) -> Result<SlotOutcome> {
        let mut pieces = self.compute_pieces(kernel);
        pieces.retain(|piece| !piece.is_degenerate());
        if pieces.is_empty() {
            return Ok(SlotOutcome {
                map: map.clone(),
                ..SlotOutcome::default()
            });
        }

        // Canonical left-to-right/front-to-back order for vertical slots.
        if pieces.len() > 1 && self.kind == SlotKind::Vertical {
            if let Some(axis) = &self.sort_axis {
                pieces.sort_by(|a, b| {
                    kernel
                        .piece_order_along(a, axis)
                        .total_cmp(&kernel.piece_order_along(b, axis))
                });
            }
        }

        let candidates = matching::candidates_for(map, &self.origin_key, &self.ignore_match_faces);
        let final_keys: Vec<String> = (0..pieces.len())
            .map(|i| {
                if i == 0 {
                    self.origin_key.clone()
                } else {
                    format!("{}/{i}", self.origin_key)
                }
            })
            .collect();

        let assigned: Vec<Option<FaceId>> = if pieces.len() == 1 && candidates.len() == 1 {
            // Direct one-to-one reuse.
            vec![Some(candidates[0].0)]
        } else if pieces.len() == 1
            || self.kind == SlotKind::Aux
            || (self.kind == SlotKind::Vertical && !self.space_split_active)
        {
            final_keys
                .iter()
                .map(|key| matching::match_by_final_key(&candidates, key))
                .collect()
        } else {
            matching::match_by_adjacency(&doc.faces, &pieces, &candidates)
        };

        let mut next = map.clone();
        let mut outcome = SlotOutcome::default();

        for (i, piece) in pieces.iter().enumerate() {
            let mut record = if self.kind == SlotKind::Aux {
                FaceRecord::aux(self.master, self.origin_key.clone())
            } else {
                FaceRecord::new(self.master, self.origin_key.clone())
            };
            if i > 0 {
                record = record.with_extra(i.to_string());
            }

            let id = match assigned[i].filter(|id| doc.faces.contains_key(*id)) {
                Some(id) => {
                    let same = kernel.is_same_brep_face(&doc.face(id)?.profile, piece);
                    if !same {
                        doc.face_mut(id)?.profile = piece.clone();
                        outcome.changed.push(id);
                    }
                    id
                }
                None => {
                    let id = doc.add_face(self.master, piece.clone());
                    outcome.changed.push(id);
                    outcome.created.push(id);
                    id
                }
            };
            outcome.claimed.push(id);

            if let Some(evicted) = next.insert_claiming(id, record) {
                debug!(
                    "face record evicted after key reassignment: {:?} lost {:?}",
                    evicted, final_keys[i]
                );
            }
        }

        // Re-attach material identity to the slot's current owners, after
        // all geometry updates.
        for (key, material_override) in &self.material_overrides {
            if let Some(id) = next.face_by_final_key(key) {
                let face = doc.face_mut(id)?;
                if let Some(material) = &material_override.material {
                    face.material = Some(material.clone());
                }
                if let Some(mixpaint) = material_override.mixpaint {
                    face.mixpaint = Some(mixpaint);
                }
            }
        }

        outcome.map = next;
        Ok(outcome)
    }

    fn compute_pieces(&self, kernel: &dyn FaceKernel) -> Vec<FaceProfile> {
        match (&self.kind, &self.source) {
            // Aux faces bypass splitting entirely.
            (SlotKind::Aux, SlotSource::Boundary(profile)) => vec![profile.clone()],
            (_, SlotSource::Pieces(pieces)) => pieces.clone(),
            (_, SlotSource::Boundary(profile)) => {
                let info = kernel.face_base_info(profile);
                let mut loops = Vec::with_capacity(1 + info.inner.len());
                loops.push(info.outer);
                loops.extend(info.inner);
                let trimmed =
                    kernel.create_trimmed_surface(&info.surface, &loops, info.same_sense);
                kernel.split_brep_face(&trimmed, &self.split_curves)
            }
        }
    }
}
