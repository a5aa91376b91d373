//! Synthetic hand poses.
//!
//! Canned 21-point hands, positioned so the index fingertip lands on a
//! chosen normalized image point.  The simulator uses them to stand in for a
//! real tracker; the classifier tests use them as known-good inputs.

use crate::geometry::{Point2, Point3};
use crate::landmark::{joint, HandObservation, Handedness, Landmark, LANDMARK_COUNT};

/// A canned posture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pose {
    /// Fingers up, palm toward the camera, no pinch.
    Open,
    /// Open hand with the thumb tip on the index tip.
    Pinch,
    /// Pinch with middle, ring and pinky folded down.
    PinchCurled,
    /// Open hand mirrored about the wrist: back of the hand to the camera.
    PalmAway,
    /// Open hand squashed horizontally, as seen edge-on.
    EdgeOn,
    /// Index finger extended and pointing back at the palm, others curled.
    Stop,
}

// Open hand, wrist at the origin, y growing downward.
const OPEN: [(f32, f32); LANDMARK_COUNT] = [
    ( 0.000,  0.00),  // wrist
    (-0.040, -0.03), (-0.070, -0.06), (-0.090, -0.09), (-0.130, -0.10),  // thumb
    (-0.050, -0.20), (-0.055, -0.26), (-0.060, -0.30), (-0.065, -0.34),  // index
    ( 0.000, -0.21), ( 0.000, -0.28), ( 0.000, -0.33), ( 0.000, -0.37),  // middle
    ( 0.040, -0.20), ( 0.045, -0.26), ( 0.050, -0.30), ( 0.055, -0.33),  // ring
    ( 0.110, -0.17), ( 0.120, -0.22), ( 0.130, -0.25), ( 0.140, -0.28),  // pinky
];

// Hand hanging from the wrist with the index bent back up toward the palm.
// Index tip at the origin; the palm centroid sits straight above it.
const STOP: [(f32, f32); LANDMARK_COUNT] = [
    ( 0.00, -0.16),  // wrist
    (-0.02, -0.12), (-0.04, -0.07), (-0.05, -0.02), (-0.14, -0.08),  // thumb
    (-0.03,  0.12), ( 0.00,  0.06), ( 0.00,  0.03), ( 0.00,  0.00),  // index
    (-0.01, -0.10), (-0.01,  0.00), (-0.01,  0.08), (-0.01,  0.16),  // middle
    ( 0.01, -0.10), ( 0.01,  0.00), ( 0.01,  0.09), ( 0.01,  0.17),  // ring
    ( 0.03, -0.10), ( 0.03, -0.01), ( 0.03,  0.07), ( 0.03,  0.16),  // pinky
];

fn template(pose: Pose) -> [Landmark; LANDMARK_COUNT] {
    let from = |t: &[(f32, f32); LANDMARK_COUNT]| (*t).map(|(x, y)| Point3::new(x, y, 0.0));
    let mut pts = match pose {
        Pose::Stop => from(&STOP),
        _          => from(&OPEN),
    };

    match pose {
        Pose::Pinch | Pose::PinchCurled => {
            let tip = pts[joint::INDEX_TIP];
            pts[joint::THUMB_TIP] = Point3::new(tip.x + 0.005, tip.y + 0.005, tip.z);
            if pose == Pose::PinchCurled {
                // Fold the tips down below the index PIP.
                for t in [joint::MIDDLE_TIP, joint::RING_TIP, joint::PINKY_TIP] {
                    pts[t].y = -0.18;
                }
            }
        }
        Pose::PalmAway => {
            for p in pts.iter_mut() { p.x = -p.x; }
        }
        Pose::EdgeOn => {
            for p in pts.iter_mut() { p.x *= 0.3; }
        }
        Pose::Open | Pose::Stop => {}
    }
    pts
}

/// Build a hand in `pose` whose index fingertip sits at `tip` (normalized
/// image coordinates).
pub fn hand_at(pose: Pose, tip: Point2) -> HandObservation {
    hand_with(pose, tip, Handedness::Right, 0.95)
}

/// Like [`hand_at`] with an explicit label and detection score.
pub fn hand_with(pose: Pose, tip: Point2, handedness: Handedness, score: f32) -> HandObservation {
    let mut pts = template(pose);
    let anchor = pts[joint::INDEX_TIP];
    let (dx, dy) = (tip.x - anchor.x, tip.y - anchor.y);
    for p in pts.iter_mut() {
        p.x += dx;
        p.y += dy;
    }
    // Pin the tip exactly; the translation above can be off by an ulp.
    pts[joint::INDEX_TIP] = Point3::new(tip.x, tip.y, anchor.z);
    HandObservation::new(pts, handedness, score)
}
