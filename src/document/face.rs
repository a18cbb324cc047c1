use crate::document::ElementId;
use crate::geometry::FaceProfile;

/// Reference to a material definition in the (out-of-scope) catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRef(pub String);

/// Per-face material layering data carried independently of geometry.
///
/// Points back to the host face it was painted from, by stable uid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mixpaint {
    pub host_uid: u64,
}

/// A boundary face entity in the scene graph.
///
/// Identity (the slot key, the entity ID) is managed by the reconciler;
/// geometry is rewritten in place on change so that the ID, material and
/// downstream scene references survive recomputation.
#[derive(Debug, Clone)]
pub struct FaceEntity {
    /// Stable uid used by the persistence layer.
    pub uid: u64,
    pub master: ElementId,
    pub profile: FaceProfile,
    pub material: Option<MaterialRef>,
    pub mixpaint: Option<Mixpaint>,
}

impl FaceEntity {
    /// Creates a face entity with no material overrides.
    #[must_use]
    pub fn new(uid: u64, master: ElementId, profile: FaceProfile) -> Self {
        Self {
            uid,
            master,
            profile,
            material: None,
            mixpaint: None,
        }
    }
}
