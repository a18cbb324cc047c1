use crate::geometry::{FaceProfile, PlanCurve, SurfacePatch};
use crate::kernel::{FaceBaseInfo, FaceKernel, SplitCurve, TrimmedSurface};
use crate::math::{Point2, Point3, Vector2, TOLERANCE};

/// Geometric tolerance of the planar kernel's face comparison.
const KERNEL_TOLERANCE: f64 = 1e-6;

/// Minimum area for a split piece to survive.
const AREA_EPS: f64 = 1e-9;

/// Reference kernel for planar and vertical-cylindrical boundary faces.
///
/// Split curves are interpreted as vertical cutting planes through their
/// plan-space line (arc split curves are approximated by their chord).
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanarKernel;

impl PlanarKernel {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FaceKernel for PlanarKernel {
    fn face_base_info(&self, face: &FaceProfile) -> FaceBaseInfo {
        FaceBaseInfo {
            outer: face.outer.clone(),
            inner: face.inner.clone(),
            surface: face.surface.clone(),
            same_sense: face.same_sense,
        }
    }

    fn create_trimmed_surface(
        &self,
        surface: &SurfacePatch,
        loops: &[Vec<Point3>],
        same_sense: bool,
    ) -> TrimmedSurface {
        TrimmedSurface {
            surface: surface.clone(),
            loops: loops.to_vec(),
            same_sense,
        }
    }

    fn split_brep_face(
        &self,
        trimmed: &TrimmedSurface,
        curves: &[SplitCurve],
    ) -> Vec<FaceProfile> {
        let Some(outer) = trimmed.loops.first() else {
            return Vec::new();
        };
        if outer.len() < 3 || polygon_area_3d(outer) < AREA_EPS {
            return Vec::new();
        }

        let inner: Vec<Vec<Point3>> = trimmed.loops.iter().skip(1).cloned().collect();
        let mut pieces: Vec<(Vec<Point3>, Vec<Vec<Point3>>)> = vec![(outer.clone(), inner)];

        for sc in curves {
            let Some((origin, normal)) = split_plane(&sc.curve) else {
                continue;
            };
            let mut next = Vec::new();
            for (piece_outer, piece_inner) in pieces {
                for keep_positive in [false, true] {
                    let clipped = clip_loop(&piece_outer, &origin, &normal, keep_positive);
                    if clipped.len() < 3 || polygon_area_3d(&clipped) < AREA_EPS {
                        continue;
                    }
                    let kept_inner: Vec<Vec<Point3>> = piece_inner
                        .iter()
                        .map(|hole| clip_loop(hole, &origin, &normal, keep_positive))
                        .filter(|hole| hole.len() >= 3 && polygon_area_3d(hole) >= AREA_EPS)
                        .collect();
                    next.push((clipped, kept_inner));
                }
            }
            pieces = next;
        }

        pieces
            .into_iter()
            .map(|(piece_outer, piece_inner)| FaceProfile {
                surface: trimmed.surface.clone(),
                outer: piece_outer,
                inner: piece_inner,
                same_sense: trimmed.same_sense,
            })
            .collect()
    }

    fn is_same_brep_face(&self, a: &FaceProfile, b: &FaceProfile) -> bool {
        a.approx_eq(b, KERNEL_TOLERANCE)
    }

    fn intersect_curves(&self, a: &PlanCurve, b: &PlanCurve) -> Vec<Point2> {
        a.intersections(b)
    }

    fn extend_curve(&self, curve: &PlanCurve, amount: f64) -> PlanCurve {
        curve.extended(amount)
    }

    fn piece_order_along(&self, piece: &FaceProfile, axis: &PlanCurve) -> f64 {
        let c = piece.centroid();
        let plan = Point2::new(c.x, c.y);
        match axis {
            PlanCurve::Line { start, end } => {
                let d = end - start;
                let n = d.norm();
                if n < TOLERANCE {
                    return 0.0;
                }
                (plan - start).dot(&(d / n))
            }
            PlanCurve::Arc {
                center,
                start_angle,
                sweep,
                ..
            } => {
                if sweep.abs() < TOLERANCE {
                    return 0.0;
                }
                let angle = (plan.y - center.y).atan2(plan.x - center.x);
                let delta = if *sweep > 0.0 {
                    (angle - start_angle).rem_euclid(2.0 * std::f64::consts::PI)
                } else {
                    -((start_angle - angle).rem_euclid(2.0 * std::f64::consts::PI))
                };
                delta / sweep
            }
        }
    }
}

/// The vertical cutting plane of a split curve: plan origin + plan normal.
fn split_plane(curve: &PlanCurve) -> Option<(Point2, Vector2)> {
    let start = curve.start_point();
    let end = curve.end_point();
    let d = end - start;
    let n = d.norm();
    if n < TOLERANCE {
        return None;
    }
    Some((start, Vector2::new(-d.y / n, d.x / n)))
}

/// Signed plan-space distance of a point from the cutting plane.
fn signed_distance(p: &Point3, origin: &Point2, normal: &Vector2) -> f64 {
    (p.x - origin.x) * normal.x + (p.y - origin.y) * normal.y
}

/// Sutherland-Hodgman clip of a closed 3D loop against a vertical half-plane.
fn clip_loop(
    points: &[Point3],
    origin: &Point2,
    normal: &Vector2,
    keep_positive: bool,
) -> Vec<Point3> {
    let sign = if keep_positive { 1.0 } else { -1.0 };
    let mut out = Vec::with_capacity(points.len() + 2);
    let n = points.len();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        let da = sign * signed_distance(a, origin, normal);
        let db = sign * signed_distance(b, origin, normal);

        if da >= -TOLERANCE {
            out.push(*a);
        }
        if (da > TOLERANCE && db < -TOLERANCE) || (da < -TOLERANCE && db > TOLERANCE) {
            let t = da / (da - db);
            out.push(Point3::new(
                a.x + (b.x - a.x) * t,
                a.y + (b.y - a.y) * t,
                a.z + (b.z - a.z) * t,
            ));
        }
    }
    out
}

/// Area of a planar 3D polygon via Newell's formula.
fn polygon_area_3d(points: &[Point3]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut nx = 0.0;
    let mut ny = 0.0;
    let mut nz = 0.0;
    let n = points.len();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        nx += (a.y - b.y) * (a.z + b.z);
        ny += (a.z - b.z) * (a.x + b.x);
        nz += (a.x - b.x) * (a.y + b.y);
    }
    0.5 * (nx * nx + ny * ny + nz * nz).sqrt()
}
