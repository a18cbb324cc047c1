use crate::document::WallData;
use crate::error::Result;
use crate::geometry::PlanCurve;
use crate::math::Point2;

/// Cached link geometry of a wall: the four plan corner points of its
/// thickened outline and the two side path curves.
///
/// Corner naming follows the positioning curve's parameterization:
/// `f`/`t` = From/To end, `l`/`r` = left/right of the direction of travel.
#[derive(Debug, Clone)]
pub struct WallLinkInfo {
    pub fl: Point2,
    pub fr: Point2,
    pub tl: Point2,
    pub tr: Point2,
    pub left_path: PlanCurve,
    pub right_path: PlanCurve,
}

impl WallLinkInfo {
    /// Derives link geometry from a wall's current curve and width.
    ///
    /// # Errors
    ///
    /// Returns an error when the wall curve is degenerate or the width
    /// exceeds an arc wall's diameter.
    pub fn from_wall(wall: &WallData) -> Result<Self> {
        let half = wall.width / 2.0;
        let left_path = wall.curve.offset(half)?;
        let right_path = wall.curve.offset(-half)?;
        Ok(Self {
            fl: left_path.start_point(),
            fr: right_path.start_point(),
            tl: left_path.end_point(),
            tr: right_path.end_point(),
            left_path,
            right_path,
        })
    }
}
