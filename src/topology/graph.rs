use slotmap::{SecondaryMap, SlotMap};

use crate::document::{JointId, WallData, WallId};
use crate::error::Result;
use crate::topology::joint::{self, JointData, JointKind, WallEnd};
use crate::topology::link_info::WallLinkInfo;

/// Per-wall classification of joints into end slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WallJointSlots {
    pub from: Option<JointId>,
    pub to: Option<JointId>,
    pub between: Vec<JointId>,
}

/// Kind-mask filter for joint queries.
///
/// When `include` is set, only joints whose kind intersects the mask are
/// kept and the point-type filter is bypassed entirely (e.g. "all tangent
/// joints regardless of position"). `exclude` always applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct JointFilter {
    pub include: Option<JointKind>,
    pub exclude: JointKind,
}

impl JointFilter {
    /// Matches every joint.
    pub const ANY: Self = Self {
        include: None,
        exclude: JointKind::NONE,
    };

    #[must_use]
    pub fn including(kind: JointKind) -> Self {
        Self {
            include: Some(kind),
            exclude: JointKind::NONE,
        }
    }

    #[must_use]
    pub fn excluding(kind: JointKind) -> Self {
        Self {
            include: None,
            exclude: kind,
        }
    }
}

/// Per-document joint topology graph.
///
/// Maintains, for every wall, the insertion-ordered set of joints touching
/// it, plus two caches: a derived from/to/between classification guarded by
/// a generation counter (invalidated on any membership write, rebuilt on
/// first read), and per-wall link geometry rebuilt only explicitly.
#[derive(Debug, Default)]
pub struct JointGraph {
    wall_joints: SecondaryMap<WallId, Vec<JointId>>,
    generation: u64,
    slots_cache: Option<SlotsCache>,
    link_info: SecondaryMap<WallId, WallLinkInfo>,
}

#[derive(Debug)]
struct SlotsCache {
    generation: u64,
    slots: SecondaryMap<WallId, WallJointSlots>,
}

impl JointGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership generation; bumped on every write.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Registers a joint with a wall (no-op when already present).
    ///
    /// Replaces the wall's whole joint list rather than mutating it in
    /// place, preserving insertion order.
    pub fn register(&mut self, wall: WallId, joint: JointId) {
        let mut next = self.wall_joints.get(wall).cloned().unwrap_or_default();
        if next.contains(&joint) {
            return;
        }
        next.push(joint);
        self.wall_joints.insert(wall, next);
        self.touch();
    }

    /// Unregisters a joint from a wall (no-op when absent).
    pub fn unregister(&mut self, wall: WallId, joint: JointId) {
        let Some(current) = self.wall_joints.get(wall) else {
            return;
        };
        if !current.contains(&joint) {
            return;
        }
        let next: Vec<JointId> = current.iter().copied().filter(|j| *j != joint).collect();
        if next.is_empty() {
            self.wall_joints.remove(wall);
        } else {
            self.wall_joints.insert(wall, next);
        }
        self.touch();
    }

    /// The joints registered with a wall, in registration order.
    #[must_use]
    pub fn joints_of(&self, wall: WallId) -> &[JointId] {
        self.wall_joints.get(wall).map_or(&[], Vec::as_slice)
    }

    /// Removes a wall from the graph, destroying every joint that still
    /// references it, then dropping the wall's entries and link cache.
    pub fn remove_wall(&mut self, joints: &mut SlotMap<JointId, JointData>, wall: WallId) {
        let attached: Vec<JointId> = self.joints_of(wall).to_vec();
        for id in attached {
            joint::destroy(self, joints, id);
        }
        self.wall_joints.remove(wall);
        self.link_info.remove(wall);
        self.touch();
    }

    /// Joints touching `wall` at `end`, deterministically sorted.
    ///
    /// The `(kind asc, order asc, first-wall width asc)` tie-break is
    /// load-bearing: callers depend on a stable "primary" joint when
    /// several joints coincide at one point.
    #[must_use]
    pub fn wall_end_joints(
        &self,
        joints: &SlotMap<JointId, JointData>,
        walls: &SlotMap<WallId, WallData>,
        wall: WallId,
        end: WallEnd,
        filter: JointFilter,
    ) -> Vec<JointId> {
        let mut keyed: Vec<(u32, i32, f64, JointId)> = self
            .joints_of(wall)
            .iter()
            .filter_map(|id| {
                let data = joints.get(*id)?;
                if data.kind.intersects(filter.exclude) {
                    return None;
                }
                let keep = match filter.include {
                    Some(mask) => data.kind.intersects(mask),
                    None => data.end_for(wall) == Some(end),
                };
                if !keep {
                    return None;
                }
                let width = data
                    .first_wall()
                    .and_then(|w| walls.get(w))
                    .map_or(f64::MAX, |w| w.width);
                Some((data.kind.bits(), data.order, width, *id))
            })
            .collect();

        keyed.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.total_cmp(&b.2))
        });
        keyed.into_iter().map(|(_, _, _, id)| id).collect()
    }

    /// The primary joint at one wall end.
    ///
    /// Without an explicit filter, tangent joints are excluded first: they
    /// are drawing aids and must never be picked as the real corner joint.
    #[must_use]
    pub fn wall_end_joint(
        &self,
        joints: &SlotMap<JointId, JointData>,
        walls: &SlotMap<WallId, WallData>,
        wall: WallId,
        end: WallEnd,
        filter: Option<JointFilter>,
    ) -> Option<JointId> {
        let filter = filter.unwrap_or_else(|| JointFilter::excluding(JointKind::TANGENT));
        self.wall_end_joints(joints, walls, wall, end, filter)
            .into_iter()
            .next()
    }

    /// Joints touching the wall somewhere along its span.
    #[must_use]
    pub fn wall_between_joints(
        &self,
        joints: &SlotMap<JointId, JointData>,
        walls: &SlotMap<WallId, WallData>,
        wall: WallId,
    ) -> Vec<JointId> {
        self.wall_end_joints(joints, walls, wall, WallEnd::Between, JointFilter::ANY)
    }

    /// Derived per-wall slot classification.
    ///
    /// The first joint encountered for the from/to slot wins; encounter
    /// order is registration order.
    pub fn wall_slots(
        &mut self,
        joints: &SlotMap<JointId, JointData>,
        wall: WallId,
    ) -> WallJointSlots {
        self.ensure_slots(joints);
        self.slots_cache
            .as_ref()
            .and_then(|cache| cache.slots.get(wall))
            .cloned()
            .unwrap_or_default()
    }

    fn ensure_slots(&mut self, joints: &SlotMap<JointId, JointData>) {
        let fresh = self
            .slots_cache
            .as_ref()
            .is_some_and(|cache| cache.generation == self.generation);
        if fresh {
            return;
        }

        let mut slots: SecondaryMap<WallId, WallJointSlots> = SecondaryMap::new();
        for (wall, list) in &self.wall_joints {
            let mut entry = WallJointSlots::default();
            for id in list {
                let Some(data) = joints.get(*id) else {
                    continue;
                };
                match data.end_for(wall) {
                    Some(WallEnd::From) => {
                        if entry.from.is_none() {
                            entry.from = Some(*id);
                        }
                    }
                    Some(WallEnd::To) => {
                        if entry.to.is_none() {
                            entry.to = Some(*id);
                        }
                    }
                    Some(WallEnd::Between) => entry.between.push(*id),
                    None => {}
                }
            }
            slots.insert(wall, entry);
        }

        self.slots_cache = Some(SlotsCache {
            generation: self.generation,
            slots,
        });
    }

    /// Cached link geometry of a wall, if it has been computed.
    #[must_use]
    pub fn link_info(&self, wall: WallId) -> Option<&WallLinkInfo> {
        self.link_info.get(wall)
    }

    /// Recomputes a wall's link geometry from its current curve and width.
    ///
    /// Link info is NOT invalidated by membership writes; callers rebuild
    /// it whenever the wall's geometry changes (path reset, mirror).
    ///
    /// # Errors
    ///
    /// Returns an error for degenerate wall geometry.
    pub fn reset_path(&mut self, wall: WallId, data: &WallData) -> Result<()> {
        let info = WallLinkInfo::from_wall(data)?;
        self.link_info.insert(wall, info);
        Ok(())
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.slots_cache = None;
    }
}
