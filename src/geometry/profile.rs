use crate::geometry::curve::PlanCurve;
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

/// Chord deviation used when discretizing curved boundaries.
pub const SAMPLE_DEVIATION: f64 = 1e-3;

/// The parametric surface a boundary face lies on.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfacePatch {
    /// A planar surface through `origin` with unit `normal`.
    Plane { origin: Point3, normal: Vector3 },
    /// A vertical cylindrical surface (arc wall side).
    Cylinder {
        origin: Point3,
        axis: Vector3,
        radius: f64,
    },
}

impl SurfacePatch {
    /// Tolerant equality on surface kind and parameters.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        match (self, other) {
            (
                Self::Plane { origin, normal },
                Self::Plane {
                    origin: o2,
                    normal: n2,
                },
            ) => {
                // Planes are equal when normals agree and the origins lie in
                // the same plane (origin offset along the normal is zero).
                (normal - n2).norm() < tol && (o2 - origin).dot(normal).abs() < tol
            }
            (
                Self::Cylinder {
                    origin,
                    axis,
                    radius,
                },
                Self::Cylinder {
                    origin: o2,
                    axis: a2,
                    radius: r2,
                },
            ) => {
                (radius - r2).abs() < tol
                    && (axis - a2).norm() < tol
                    && ((o2 - origin) - axis * (o2 - origin).dot(axis)).norm() < tol
            }
            _ => false,
        }
    }
}

/// Boundary-representation face proxy: a surface restricted by an outer
/// loop and optional inner loops (holes), discretized into point chains.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceProfile {
    pub surface: SurfacePatch,
    pub outer: Vec<Point3>,
    pub inner: Vec<Vec<Point3>>,
    pub same_sense: bool,
}

impl FaceProfile {
    /// Builds the vertical side face swept from a plan curve between two
    /// elevations (wall/beam side slot geometry).
    #[must_use]
    pub fn extruded(curve: &PlanCurve, z0: f64, z1: f64) -> Self {
        let plan = curve.sample_points(SAMPLE_DEVIATION);
        let mut outer = Vec::with_capacity(plan.len() * 2);
        for p in &plan {
            outer.push(Point3::new(p.x, p.y, z0));
        }
        for p in plan.iter().rev() {
            outer.push(Point3::new(p.x, p.y, z1));
        }

        let surface = match curve {
            PlanCurve::Line { start, end } => {
                let d = end - start;
                let n = d.norm();
                let normal = if n < TOLERANCE {
                    Vector3::new(0.0, 0.0, 1.0)
                } else {
                    Vector3::new(-d.y / n, d.x / n, 0.0)
                };
                SurfacePatch::Plane {
                    origin: Point3::new(start.x, start.y, z0),
                    normal,
                }
            }
            PlanCurve::Arc { center, radius, .. } => SurfacePatch::Cylinder {
                origin: Point3::new(center.x, center.y, z0),
                axis: Vector3::new(0.0, 0.0, 1.0),
                radius: *radius,
            },
        };

        Self {
            surface,
            outer,
            inner: Vec::new(),
            same_sense: true,
        }
    }

    /// Builds a horizontal face from a plan outline at elevation `z`.
    ///
    /// `up` selects the surface normal (slab top vs. bottom).
    #[must_use]
    pub fn horizontal(outline: &[Point2], z: f64, up: bool) -> Self {
        let outer = outline.iter().map(|p| Point3::new(p.x, p.y, z)).collect();
        let normal = if up {
            Vector3::new(0.0, 0.0, 1.0)
        } else {
            Vector3::new(0.0, 0.0, -1.0)
        };
        Self {
            surface: SurfacePatch::Plane {
                origin: Point3::new(0.0, 0.0, z),
                normal,
            },
            outer,
            inner: Vec::new(),
            same_sense: true,
        }
    }

    /// `true` when the boundary cannot enclose any area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.outer.len() < 3
    }

    /// Mean of the outer loop points.
    #[must_use]
    pub fn centroid(&self) -> Point3 {
        if self.outer.is_empty() {
            return Point3::origin();
        }
        let mut acc = Vector3::zeros();
        for p in &self.outer {
            acc += p.coords;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.outer.len() as f64;
        Point3::from(acc / n)
    }

    /// Tolerant geometric equality: surface, outer loop, inner loops and
    /// orientation flag all agree within `tol`.
    ///
    /// Loops are compared pointwise; recomputation with unchanged input
    /// geometry is deterministic, so index alignment is exact.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        if self.same_sense != other.same_sense {
            return false;
        }
        if !self.surface.approx_eq(&other.surface, tol) {
            return false;
        }
        if !loops_approx_eq(&self.outer, &other.outer, tol) {
            return false;
        }
        if self.inner.len() != other.inner.len() {
            return false;
        }
        self.inner
            .iter()
            .zip(&other.inner)
            .all(|(a, b)| loops_approx_eq(a, b, tol))
    }
}

fn loops_approx_eq(a: &[Point3], b: &[Point3], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| (q - p).norm() < tol)
}
