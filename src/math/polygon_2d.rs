use super::{Point2, TOLERANCE};

/// Computes the signed area of a plan polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Even-odd point-in-polygon test in plan space.
///
/// Points on the boundary count as inside (within tolerance).
#[must_use]
pub fn point_in_polygon(points: &[Point2], p: &Point2) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];

        // Boundary check: p within tolerance of segment a-b.
        let ab = b - a;
        let len_sq = ab.norm_squared();
        if len_sq > TOLERANCE * TOLERANCE {
            let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
            let foot = a + ab * t;
            if (p - foot).norm() < TOLERANCE * 100.0 {
                return true;
            }
        }

        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}
