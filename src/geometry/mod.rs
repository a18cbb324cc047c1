pub mod curve;
pub mod profile;

pub use curve::PlanCurve;
pub use profile::{FaceProfile, SurfacePatch};
