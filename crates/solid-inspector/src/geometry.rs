//! Vector predicates used by the shell resolver.
//!
//! Every function that needs a direction returns `None` for zero-length or
//! non-finite input instead of producing NaN, so callers can surface
//! degenerate geometry as an error.

use std::f64::consts::TAU;

use nalgebra::{Point3, Vector3};

/// Lengths below this are treated as zero.
pub const LENGTH_EPSILON: f64 = 1e-12;

#[inline]
fn usable_norm(v: &Vector3<f64>) -> Option<f64> {
    let n = v.norm();
    (n.is_finite() && n > LENGTH_EPSILON).then_some(n)
}

/// Unit vector along `v`, or `None` for a zero-length vector.
pub fn normalized(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    usable_norm(v).map(|n| v / n)
}

/// Unsigned angle between two vectors in `[0, π]`.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> Option<f64> {
    let na = usable_norm(a)?;
    let nb = usable_norm(b)?;
    let cos = (a.dot(b) / (na * nb)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Angle from `reference` to `target` measured around an axis, in `[0, 2π)`.
///
/// When `target` leans away from `up` the short angle is wrapped to
/// `2π - angle`, which orders candidate faces around a shared edge.
pub fn wrapped_angle(
    reference: &Vector3<f64>,
    target: &Vector3<f64>,
    up: &Vector3<f64>,
) -> Option<f64> {
    let angle = angle_between(reference, target)?;
    if target.dot(up) < 0.0 {
        Some(TAU - angle)
    } else {
        Some(angle)
    }
}

/// Angle between `v` and the world Z axis. Small means nearly vertical.
pub fn z_alignment(v: &Vector3<f64>) -> Option<f64> {
    let angle = angle_between(v, &Vector3::z())?;
    // Direction along the edge does not matter.
    Some(angle.min(std::f64::consts::PI - angle))
}

/// Newell normal of a closed polygon. Not normalized; its length is twice
/// the polygon area.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut n = Vector3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n
}

/// Unit polygon normal, or `None` for a degenerate polygon.
pub fn polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }
    normalized(&newell_normal(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_between_basic() {
        let x = Vector3::x();
        let y = Vector3::y();
        assert_relative_eq!(angle_between(&x, &y).unwrap(), FRAC_PI_2);
        assert_relative_eq!(angle_between(&x, &-x).unwrap(), PI);
        assert_relative_eq!(angle_between(&x, &(x * 5.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_angle_between_rejects_zero_and_nan() {
        let x = Vector3::x();
        assert!(angle_between(&x, &Vector3::zeros()).is_none());
        assert!(angle_between(&Vector3::new(f64::NAN, 0.0, 0.0), &x).is_none());
    }

    #[test]
    fn test_wrapped_angle_uses_up_side() {
        let reference = Vector3::x();
        let up = Vector3::y();
        assert_relative_eq!(
            wrapped_angle(&reference, &Vector3::y(), &up).unwrap(),
            FRAC_PI_2
        );
        assert_relative_eq!(
            wrapped_angle(&reference, &-Vector3::y(), &up).unwrap(),
            3.0 * FRAC_PI_2
        );
    }

    #[test]
    fn test_z_alignment_ignores_direction() {
        assert_relative_eq!(z_alignment(&Vector3::z()).unwrap(), 0.0);
        assert_relative_eq!(z_alignment(&-Vector3::z()).unwrap(), 0.0);
        assert_relative_eq!(z_alignment(&Vector3::x()).unwrap(), FRAC_PI_2);
        assert!(z_alignment(&Vector3::zeros()).is_none());
    }

    #[test]
    fn test_polygon_normal_follows_winding() {
        let ccw = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        assert_relative_eq!(polygon_normal(&ccw).unwrap(), Vector3::z());
        assert_relative_eq!(newell_normal(&ccw).norm(), 8.0);

        let mut cw = ccw;
        cw.reverse();
        assert_relative_eq!(polygon_normal(&cw).unwrap(), -Vector3::z());
    }

    #[test]
    fn test_polygon_normal_degenerate() {
        let collinear = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(polygon_normal(&collinear).is_none());
    }
}
