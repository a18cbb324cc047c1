pub mod graph;
pub mod joint;
pub mod link_info;

pub use graph::{JointFilter, JointGraph, WallJointSlots};
pub use joint::{JointData, JointKind, WallEnd, WallInfo};
pub use link_info::WallLinkInfo;
