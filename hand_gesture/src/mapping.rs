//! Landmark space ↔ canvas space.
//!
//! Classifiers always see raw tracker coordinates.  Mirroring for a selfie
//! view happens here, once: points are flipped horizontally on the way to
//! the canvas and handedness labels are swapped for display.

use crate::geometry::Point2;
use crate::landmark::{Handedness, Landmark};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasMapping {
    pub width:  f32,
    pub height: f32,
    /// Flip horizontally so the user sees themselves as in a mirror.
    pub mirror: bool,
}

impl CanvasMapping {
    pub fn new(width: usize, height: usize, mirror: bool) -> Self {
        CanvasMapping { width: width as f32, height: height as f32, mirror }
    }

    /// Landmark → canvas pixel.
    pub fn to_canvas(&self, lm: Landmark) -> Point2 {
        let x = if self.mirror { 1.0 - lm.x } else { lm.x };
        Point2::new(x * self.width, lm.y * self.height)
    }

    /// Canvas pixel → normalized tracker coordinates (inverse of
    /// [`to_canvas`](Self::to_canvas), ignoring depth).
    pub fn to_normalized(&self, p: Point2) -> Point2 {
        let x = p.x / self.width;
        let x = if self.mirror { 1.0 - x } else { x };
        Point2::new(x, p.y / self.height)
    }

    /// Label as the user perceives it on screen.
    pub fn display_handedness(&self, tracked: Handedness) -> Handedness {
        if self.mirror { tracked.mirrored() } else { tracked }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_flips_x_only() {
        let m = CanvasMapping::new(960, 720, true);
        let p = m.to_canvas(Landmark::new(0.25, 0.5, -0.1));
        assert_eq!(p, Point2::new(720.0, 360.0));
        let n = CanvasMapping::new(960, 720, false);
        assert_eq!(n.to_canvas(Landmark::new(0.25, 0.5, 0.0)), Point2::new(240.0, 360.0));
    }

    #[test]
    fn normalized_inverts_canvas() {
        for mirror in [true, false] {
            let m = CanvasMapping::new(960, 720, mirror);
            let lm = Landmark::new(0.3, 0.8, 0.0);
            let back = m.to_normalized(m.to_canvas(lm));
            assert!((back.x - lm.x).abs() < 1e-6);
            assert!((back.y - lm.y).abs() < 1e-6);
        }
    }

    #[test]
    fn handedness_swapped_once_when_mirrored() {
        let m = CanvasMapping::new(10, 10, true);
        assert_eq!(m.display_handedness(Handedness::Left), Handedness::Right);
        let n = CanvasMapping::new(10, 10, false);
        assert_eq!(n.display_handedness(Handedness::Left), Handedness::Left);
    }
}
