//! Planar vector math over landmarks
//!
//! All helpers work on the x/y components only; z is ignored.

use crate::landmark::Landmark;

/// 2D vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two landmarks in the x/y plane
pub fn distance(p1: &Landmark, p2: &Landmark) -> f32 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx * dx + dy * dy).sqrt()
}

/// Vector pointing from `p1` to `p2`
pub fn vector(p1: &Landmark, p2: &Landmark) -> Vector2 {
    Vector2::new(p2.x - p1.x, p2.y - p1.y)
}

pub fn dot(v1: Vector2, v2: Vector2) -> f32 {
    v1.x * v2.x + v1.y * v2.y
}

pub fn magnitude(v: Vector2) -> f32 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Angle between two vectors in degrees.
///
/// The cosine is clamped to [-1, 1] before `acos` so rounding drift on
/// (anti)parallel vectors cannot produce NaN.
pub fn angle_between(v1: Vector2, v2: Vector2) -> f32 {
    let cos_theta = dot(v1, v2) / (magnitude(v1) * magnitude(v2));
    cos_theta.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_distance_ignores_z() {
        let a = Landmark::new(0.0, 0.0, 5.0);
        let b = Landmark::new(3.0, 4.0, -2.0);
        assert!(approx(distance(&a, &b), 5.0));
        assert!(approx(distance(&b, &a), 5.0));
    }

    #[test]
    fn test_distance_nan_propagates() {
        let a = Landmark::new(f32::NAN, 0.0, 0.0);
        let b = Landmark::new(1.0, 1.0, 0.0);
        assert!(distance(&a, &b).is_nan());
    }

    #[test]
    fn test_vector_algebra() {
        let v = vector(&Landmark::new(1.0, 1.0, 0.0), &Landmark::new(4.0, 5.0, 0.0));
        assert_eq!(v, Vector2::new(3.0, 4.0));
        assert!(approx(magnitude(v), 5.0));
        assert!(approx(dot(v, Vector2::new(1.0, 0.0)), 3.0));
    }

    #[test]
    fn test_angle_between() {
        let x = Vector2::new(1.0, 0.0);
        assert!(approx(angle_between(x, Vector2::new(0.0, 2.0)), 90.0));
        assert!(approx(angle_between(x, Vector2::new(-3.0, 0.0)), 180.0));
        assert!(approx(angle_between(x, Vector2::new(1.0, 1.0)), 45.0));
    }

    #[test]
    fn test_angle_clamps_parallel_drift() {
        let v = Vector2::new(0.1, 0.3);
        let w = Vector2::new(0.1 * 3.0, 0.3 * 3.0);
        let angle = angle_between(v, w);
        assert!(!angle.is_nan());
        assert!(angle.abs() < 0.1);
    }
}
