//! Points, vectors and Euclidean distance.
//!
//! Two spaces are in play: landmark space (normalized 3-D, [`Point3`]) and
//! canvas space (pixels, [`Point2`]).  Both implement [`Distance`], so the
//! free function [`distance`] works in either.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Point2 — canvas space
// ════════════════════════════════════════════════════════════════════════════

/// A point on the drawing surface, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    pub fn sub(self, other: Point2) -> Point2 {
        Point2::new(self.x - other.x, self.y - other.y)
    }

    pub fn dot(self, other: Point2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(self) -> f32 {
        self.dot(self).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Point3 — landmark space
// ════════════════════════════════════════════════════════════════════════════

/// A 3-D point or vector.  Used both for landmark positions and for the
/// difference vectors built from them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Point3 { x, y, z }
    }

    pub fn sub(self, other: Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn dot(self, other: Point3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Point3) -> Point3 {
        Point3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Drop the depth component (image-plane projection).
    pub fn xy(self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Distance
// ════════════════════════════════════════════════════════════════════════════

/// Euclidean distance between two points of the same space.
pub trait Distance {
    fn distance(&self, other: &Self) -> f32;
}

impl Distance for Point2 {
    fn distance(&self, other: &Self) -> f32 {
        self.sub(*other).norm()
    }
}

impl Distance for Point3 {
    fn distance(&self, other: &Self) -> f32 {
        self.sub(*other).norm()
    }
}

/// Euclidean distance between `a` and `b`.  Zero when they coincide.
pub fn distance<P: Distance>(a: &P, b: &P) -> f32 {
    a.distance(b)
}

/// Cosine of the angle between two vectors, or `None` when either has zero
/// length.
pub fn cos_angle(a: Point2, b: Point2) -> Option<f32> {
    let na = a.norm();
    let nb = b.norm();
    if na == 0.0 || nb == 0.0 {
        return None;
    }
    Some(a.dot(b) / (na * nb))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = Point3::new(0.31, 0.72, -0.05);
        assert_eq!(distance(&p, &p), 0.0);
        let q = Point2::new(480.0, 12.5);
        assert_eq!(distance(&q, &q), 0.0);
    }

    #[test]
    fn distance_2d_pythagorean() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn distance_3d_includes_depth() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 3.0, 6.0);
        assert!((distance(&a, &b) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Point3::new(1.0, 0.0, 0.0);
        let y = Point3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Point3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Point3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn cos_angle_degenerate_is_none() {
        assert_eq!(cos_angle(Point2::default(), Point2::new(1.0, 0.0)), None);
        let c = cos_angle(Point2::new(1.0, 0.0), Point2::new(0.0, 2.0)).unwrap();
        assert!(c.abs() < 1e-6);
    }
}
