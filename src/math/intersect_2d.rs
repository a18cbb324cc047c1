use std::f64::consts::PI;

use super::{Point2, TOLERANCE};

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        let pt = Point2::new(a0.x + da.x * t_clamped, a0.y + da.y * t_clamped);
        Some((pt, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of a line segment with a circular arc in 2D.
///
/// Returns a vector of `(point, t_seg, t_arc)` where `t_seg` is the parameter
/// on the segment `[0, 1]` and `t_arc` the parameter on the arc `[0, 1]`.
#[must_use]
pub fn segment_arc_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    center: &Point2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> Vec<(Point2, f64, f64)> {
    let mut results = Vec::new();
    if radius < TOLERANCE || sweep.abs() < TOLERANCE {
        return results;
    }

    let dx = a1.x - a0.x;
    let dy = a1.y - a0.y;
    let seg_len_sq = dx * dx + dy * dy;
    if seg_len_sq < TOLERANCE * TOLERANCE {
        return results;
    }

    // Substitute the parametric line into the circle equation:
    // (a0.x + t*dx - cx)² + (a0.y + t*dy - cy)² = r²
    let fx = a0.x - center.x;
    let fy = a0.y - center.y;
    let a = seg_len_sq;
    let b = 2.0 * (fx * dx + fy * dy);
    let c = fx * fx + fy * fy - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < -TOLERANCE {
        return results;
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();

    let eps = TOLERANCE;
    let t_roots = if disc_sqrt < TOLERANCE * 100.0 {
        // Tangent case: single root.
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    };

    for t_seg in t_roots {
        if t_seg < -eps || t_seg > 1.0 + eps {
            continue;
        }
        let t_seg = t_seg.clamp(0.0, 1.0);

        let px = a0.x + t_seg * dx;
        let py = a0.y + t_seg * dy;

        // Check if the point is within the arc's angular range.
        let angle = (py - center.y).atan2(px - center.x);
        if let Some(t_arc) = angle_to_arc_param(angle, start_angle, sweep) {
            results.push((Point2::new(px, py), t_seg, t_arc));
        }
    }

    results
}

/// Intersection of two circular arcs in 2D.
///
/// Returns a vector of `(point, t1, t2)` where `t1` and `t2` are arc
/// parameters in `[0, 1]`.
#[must_use]
pub fn arc_arc_intersect_2d(
    c1: &Point2,
    r1: f64,
    start1: f64,
    sweep1: f64,
    c2: &Point2,
    r2: f64,
    start2: f64,
    sweep2: f64,
) -> Vec<(Point2, f64, f64)> {
    let mut results = Vec::new();
    if r1 < TOLERANCE || r2 < TOLERANCE {
        return results;
    }

    let dx = c2.x - c1.x;
    let dy = c2.y - c1.y;
    let dist_sq = dx * dx + dy * dy;
    let dist = dist_sq.sqrt();

    if dist < TOLERANCE {
        // Concentric circles — no intersection points (or infinite if same radius).
        return results;
    }

    let sum = r1 + r2;
    let diff = (r1 - r2).abs();
    if dist > sum + TOLERANCE || dist < diff - TOLERANCE {
        return results;
    }

    // Distance from c1 along the line c1→c2 to the radical line.
    let a = (r1 * r1 - r2 * r2 + dist_sq) / (2.0 * dist);
    let h_sq = r1 * r1 - a * a;
    if h_sq < -TOLERANCE {
        return results;
    }
    let h = h_sq.max(0.0).sqrt();

    // Midpoint on the radical line.
    let mx = c1.x + a * dx / dist;
    let my = c1.y + a * dy / dist;

    // Perpendicular direction.
    let px = -dy / dist;
    let py = dx / dist;

    // Two candidate intersection points (or one if tangent).
    let candidates = if h < TOLERANCE {
        vec![(mx, my)]
    } else {
        vec![(mx + h * px, my + h * py), (mx - h * px, my - h * py)]
    };

    let eps = TOLERANCE;
    for (ix, iy) in candidates {
        let angle1 = (iy - c1.y).atan2(ix - c1.x);
        let angle2 = (iy - c2.y).atan2(ix - c2.x);

        let t1 = angle_to_arc_param(angle1, start1, sweep1);
        let t2 = angle_to_arc_param(angle2, start2, sweep2);

        if let (Some(t1), Some(t2)) = (t1, t2) {
            // Verify the point is close to both arcs.
            let d1 = ((ix - c1.x).powi(2) + (iy - c1.y).powi(2)).sqrt();
            let d2 = ((ix - c2.x).powi(2) + (iy - c2.y).powi(2)).sqrt();
            if (d1 - r1).abs() < eps && (d2 - r2).abs() < eps {
                results.push((Point2::new(ix, iy), t1, t2));
            }
        }
    }

    results
}

/// Converts an absolute angle to an arc parameter `t` in `[0, 1]`.
///
/// Returns `None` if the angle is not within the arc's angular range.
fn angle_to_arc_param(angle: f64, start_angle: f64, sweep: f64) -> Option<f64> {
    let eps = TOLERANCE * 100.0;

    // Compute the angular offset from start_angle to angle in the sweep direction.
    let mut delta = angle - start_angle;

    // Normalize delta to match the sweep direction.
    if sweep > 0.0 {
        while delta < -eps {
            delta += 2.0 * PI;
        }
        while delta > 2.0 * PI + eps {
            delta -= 2.0 * PI;
        }
    } else {
        while delta > eps {
            delta -= 2.0 * PI;
        }
        while delta < -2.0 * PI - eps {
            delta += 2.0 * PI;
        }
    }

    let t = delta / sweep;
    if t >= -eps && t <= 1.0 + eps {
        Some(t.clamp(0.0, 1.0))
    } else {
        None
    }
}
