pub mod matching;
pub mod record;
pub mod reconciler;
pub mod sweep;

pub use record::{FaceMap, FaceRecord};
pub use reconciler::{MaterialOverride, ReconcileSlot, SlotOutcome, SlotSource};
pub use sweep::CleanFreeFaces;
