use std::f64::consts::PI;

use crate::error::GeometryError;
use crate::math::intersect_2d::{
    arc_arc_intersect_2d, segment_arc_intersect_2d, segment_segment_intersect_2d,
};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Positioning curve of a wall or beam in plan space.
///
/// Either a straight segment or a circular-arc segment. The curve is
/// parameterized from its `from` end (`t = 0`) to its `to` end (`t = 1`);
/// wall endpoint semantics (From/To) are defined by this parameterization.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanCurve {
    /// Straight segment from `start` to `end`.
    Line { start: Point2, end: Point2 },
    /// Circular arc: `sweep > 0` is counter-clockwise, `< 0` clockwise.
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

impl PlanCurve {
    /// Creates a straight curve between two points.
    #[must_use]
    pub fn line(start: Point2, end: Point2) -> Self {
        Self::Line { start, end }
    }

    /// Creates an arc curve.
    #[must_use]
    pub fn arc(center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self::Arc {
            center,
            radius,
            start_angle,
            sweep,
        }
    }

    /// The curve point at `t = 0` (the wall's From end).
    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.point_at(0.0)
    }

    /// The curve point at `t = 1` (the wall's To end).
    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.point_at(1.0)
    }

    /// Evaluates the curve at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        match self {
            Self::Line { start, end } => Point2::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
            ),
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let angle = start_angle + sweep * t;
                Point2::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            }
        }
    }

    /// Curve length.
    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::Line { start, end } => (end - start).norm(),
            Self::Arc { radius, sweep, .. } => radius * sweep.abs(),
        }
    }

    /// `true` if the curve is too short to carry geometry.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.length() < TOLERANCE
    }

    /// Unit tangent at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a degenerate curve.
    pub fn direction_at(&self, t: f64) -> Result<Vector2, GeometryError> {
        match self {
            Self::Line { start, end } => {
                let d = end - start;
                let n = d.norm();
                if n < TOLERANCE {
                    return Err(GeometryError::ZeroVector);
                }
                Ok(d / n)
            }
            Self::Arc {
                start_angle, sweep, ..
            } => {
                if sweep.abs() < TOLERANCE {
                    return Err(GeometryError::ZeroVector);
                }
                let angle = start_angle + sweep * t;
                // Tangent of a CCW arc is the angle rotated +90°.
                let tangent = Vector2::new(-angle.sin(), angle.cos());
                Ok(if *sweep >= 0.0 { tangent } else { -tangent })
            }
        }
    }

    /// Returns the curve extended by `amount` beyond both endpoints.
    ///
    /// Wall curves are trimmed at their joints; intersecting the extended
    /// curves recovers the untrimmed crossing point.
    #[must_use]
    pub fn extended(&self, amount: f64) -> Self {
        match self {
            Self::Line { start, end } => {
                let d = end - start;
                let n = d.norm();
                if n < TOLERANCE {
                    return self.clone();
                }
                let dir = d / n;
                Self::Line {
                    start: start - dir * amount,
                    end: end + dir * amount,
                }
            }
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                if *radius < TOLERANCE {
                    return self.clone();
                }
                let delta = amount / radius;
                let (mut start_angle, mut sweep) = if *sweep >= 0.0 {
                    (start_angle - delta, sweep + 2.0 * delta)
                } else {
                    (start_angle + delta, sweep - 2.0 * delta)
                };
                // An arc never extends past the full circle.
                if sweep.abs() > 2.0 * PI {
                    let excess = (sweep.abs() - 2.0 * PI) / 2.0;
                    if sweep > 0.0 {
                        start_angle += excess;
                        sweep = 2.0 * PI;
                    } else {
                        start_angle -= excess;
                        sweep = -2.0 * PI;
                    }
                }
                Self::Arc {
                    center: *center,
                    radius: *radius,
                    start_angle,
                    sweep,
                }
            }
        }
    }

    /// Offsets the curve laterally; positive distance is to the left of the
    /// direction of travel.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a degenerate line and
    /// [`GeometryError::OffsetExceedsRadius`] when an inward arc offset
    /// collapses the radius.
    pub fn offset(&self, distance: f64) -> Result<Self, GeometryError> {
        match self {
            Self::Line { start, end } => {
                let d = end - start;
                let n = d.norm();
                if n < TOLERANCE {
                    return Err(GeometryError::ZeroVector);
                }
                let normal = Vector2::new(-d.y / n, d.x / n);
                Ok(Self::Line {
                    start: start + normal * distance,
                    end: end + normal * distance,
                })
            }
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                // For a CCW arc the center lies to the left of travel, so a
                // left offset shrinks the radius; mirrored for CW.
                let new_radius = if *sweep >= 0.0 {
                    radius - distance
                } else {
                    radius + distance
                };
                if new_radius < TOLERANCE {
                    return Err(GeometryError::OffsetExceedsRadius {
                        distance,
                        radius: *radius,
                    });
                }
                Ok(Self::Arc {
                    center: *center,
                    radius: new_radius,
                    start_angle: *start_angle,
                    sweep: *sweep,
                })
            }
        }
    }

    /// Returns the curve with reversed parameterization (From/To swap).
    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Line { start, end } => Self::Line {
                start: *end,
                end: *start,
            },
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Self::Arc {
                center: *center,
                radius: *radius,
                start_angle: start_angle + sweep,
                sweep: -sweep,
            },
        }
    }

    /// Reflects the curve across the line through `origin` with direction `axis`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if `axis` has zero length.
    pub fn mirrored(&self, origin: &Point2, axis: &Vector2) -> Result<Self, GeometryError> {
        let n = axis.norm();
        if n < TOLERANCE {
            return Err(GeometryError::ZeroVector);
        }
        let dir = axis / n;
        let reflect = |p: &Point2| -> Point2 {
            let v = p - origin;
            let along = dir * v.dot(&dir);
            let across = v - along;
            origin + along - across
        };
        match self {
            Self::Line { start, end } => Ok(Self::Line {
                start: reflect(start),
                end: reflect(end),
            }),
            Self::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                // Reflection maps angle θ to 2α − θ and flips the sweep sign.
                let alpha = dir.y.atan2(dir.x);
                Ok(Self::Arc {
                    center: reflect(center),
                    radius: *radius,
                    start_angle: 2.0 * alpha - start_angle,
                    sweep: -sweep,
                })
            }
        }
    }

    /// All intersection points between this curve and `other`.
    ///
    /// Curved pairs may yield multiple candidates; callers disambiguate.
    #[must_use]
    pub fn intersections(&self, other: &Self) -> Vec<Point2> {
        match (self, other) {
            (Self::Line { start: a0, end: a1 }, Self::Line { start: b0, end: b1 }) => {
                segment_segment_intersect_2d(a0, a1, b0, b1)
                    .map(|(p, _, _)| p)
                    .into_iter()
                    .collect()
            }
            (
                Self::Line { start, end },
                Self::Arc {
                    center,
                    radius,
                    start_angle,
                    sweep,
                },
            )
            | (
                Self::Arc {
                    center,
                    radius,
                    start_angle,
                    sweep,
                },
                Self::Line { start, end },
            ) => segment_arc_intersect_2d(start, end, center, *radius, *start_angle, *sweep)
                .into_iter()
                .map(|(p, _, _)| p)
                .collect(),
            (
                Self::Arc {
                    center: c1,
                    radius: r1,
                    start_angle: s1,
                    sweep: w1,
                },
                Self::Arc {
                    center: c2,
                    radius: r2,
                    start_angle: s2,
                    sweep: w2,
                },
            ) => arc_arc_intersect_2d(c1, *r1, *s1, *w1, c2, *r2, *s2, *w2)
                .into_iter()
                .map(|(p, _, _)| p)
                .collect(),
        }
    }

    /// Discretizes the curve into a point sequence.
    ///
    /// `max_deviation` bounds the sagitta between an arc and its chord
    /// approximation. Lines always yield two points.
    #[must_use]
    pub fn sample_points(&self, max_deviation: f64) -> Vec<Point2> {
        match self {
            Self::Line { start, end } => vec![*start, *end],
            Self::Arc { radius, sweep, .. } => {
                let n_sub = arc_subdivision_count(*radius, sweep.abs(), max_deviation);
                let mut points = Vec::with_capacity(n_sub as usize + 1);
                for i in 0..=n_sub {
                    let t = f64::from(i) / f64::from(n_sub);
                    points.push(self.point_at(t));
                }
                points
            }
        }
    }
}

/// Number of chords needed to approximate an arc within `tolerance`.
fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // Sagitta formula: sagitta = r * (1 - cos(θ/2)).
    let max_angle = if tolerance >= radius {
        PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn line_endpoints() {
        let c = PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        assert!((c.start_point().x).abs() < TOLERANCE);
        assert!((c.end_point().x - 4.0).abs() < TOLERANCE);
        assert!((c.length() - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn extended_line_grows_both_ends() {
        let c = PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let e = c.extended(1.0);
        assert!((e.start_point().x + 1.0).abs() < TOLERANCE);
        assert!((e.end_point().x - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn extended_arc_grows_sweep() {
        let c = PlanCurve::arc(Point2::new(0.0, 0.0), 2.0, 0.0, PI / 2.0);
        let e = c.extended(1.0);
        if let PlanCurve::Arc {
            start_angle, sweep, ..
        } = e
        {
            assert!((start_angle + 0.5).abs() < TOLERANCE);
            assert!((sweep - (PI / 2.0 + 1.0)).abs() < TOLERANCE);
        } else {
            panic!("expected arc");
        }
    }

    #[test]
    fn offset_line_left() {
        let c = PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let o = c.offset(0.5).unwrap();
        assert!((o.start_point().y - 0.5).abs() < TOLERANCE);
        assert!((o.end_point().y - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn offset_ccw_arc_left_shrinks_radius() {
        let c = PlanCurve::arc(Point2::new(0.0, 0.0), 2.0, 0.0, PI);
        let o = c.offset(0.5).unwrap();
        if let PlanCurve::Arc { radius, .. } = o {
            assert!((radius - 1.5).abs() < TOLERANCE);
        } else {
            panic!("expected arc");
        }
    }

    #[test]
    fn offset_collapse_fails() {
        let c = PlanCurve::arc(Point2::new(0.0, 0.0), 1.0, 0.0, PI);
        assert!(c.offset(1.0).is_err());
    }

    #[test]
    fn reversed_arc_round_trip() {
        let c = PlanCurve::arc(Point2::new(1.0, 1.0), 2.0, 0.3, 1.2);
        let r = c.reversed();
        let s = c.start_point();
        let rs = r.end_point();
        assert!((s.x - rs.x).abs() < 1e-9);
        assert!((s.y - rs.y).abs() < 1e-9);
        let back = r.reversed();
        let p = c.point_at(0.25);
        let q = back.point_at(0.25);
        assert!((p.x - q.x).abs() < 1e-9);
        assert!((p.y - q.y).abs() < 1e-9);
    }

    #[test]
    fn mirrored_line_across_y_axis() {
        let c = PlanCurve::line(Point2::new(1.0, 0.0), Point2::new(3.0, 2.0));
        let m = c
            .mirrored(&Point2::new(0.0, 0.0), &Vector2::new(0.0, 1.0))
            .unwrap();
        assert!((m.start_point().x + 1.0).abs() < TOLERANCE);
        assert!((m.end_point().x + 3.0).abs() < TOLERANCE);
        assert!((m.end_point().y - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn mirrored_arc_preserves_points() {
        let c = PlanCurve::arc(Point2::new(2.0, 0.0), 1.0, 0.0, PI / 2.0);
        let axis_o = Point2::new(0.0, 0.0);
        let axis_d = Vector2::new(0.0, 1.0);
        let m = c.mirrored(&axis_o, &axis_d).unwrap();
        for i in 0..=4 {
            let t = f64::from(i) / 4.0;
            let p = c.point_at(t);
            let q = m.point_at(t);
            assert_relative_eq!(q.x, -p.x, epsilon = 1e-9);
            assert_relative_eq!(q.y, p.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn intersections_line_line() {
        let a = PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0));
        let b = PlanCurve::line(Point2::new(0.0, 2.0), Point2::new(2.0, 0.0));
        let hits = a.intersections(&b);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].x - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn intersections_line_arc_two_candidates() {
        let line = PlanCurve::line(Point2::new(-3.0, 0.0), Point2::new(3.0, 0.0));
        let arc = PlanCurve::arc(Point2::new(0.0, 0.0), 1.0, -PI, 2.0 * PI);
        let hits = line.intersections(&arc);
        assert_eq!(hits.len(), 2, "hits={hits:?}");
    }

    #[test]
    fn sample_points_line() {
        let c = PlanCurve::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        assert_eq!(c.sample_points(0.01).len(), 2);
    }

    #[test]
    fn sample_points_arc_subdivides() {
        let c = PlanCurve::arc(Point2::new(0.0, 0.0), 1.0, 0.0, PI);
        let pts = c.sample_points(0.001);
        assert!(pts.len() > 10, "expected fine sampling, got {}", pts.len());
        let first = pts.first().unwrap();
        let last = pts.last().unwrap();
        assert!((first.x - 1.0).abs() < 1e-9);
        assert!((last.x + 1.0).abs() < 1e-9);
    }
}
