//! Hand skeleton overlay.
//!
//! Turns the hands of one frame into flat draw lists (bones and joints in
//! canvas pixels) that the visualizer rasterizes over the scene.  Nothing
//! here touches the window, so the overlay is testable on its own.

use hand_gesture::{
    joint, CanvasMapping, Color, ConfidenceBand, HandObservation, Handedness, Point2,
    LANDMARK_COUNT,
};

// ════════════════════════════════════════════════════════════════════════════
// Topology
// ════════════════════════════════════════════════════════════════════════════

/// Landmark pairs joined by a bone: five finger chains plus the palm arch.
pub const BONES: [(usize, usize); 23] = [
    // thumb
    (0, 1), (1, 2), (2, 3), (3, 4),
    // index
    (0, 5), (5, 6), (6, 7), (7, 8),
    // middle
    (0, 9), (9, 10), (10, 11), (11, 12),
    // ring
    (0, 13), (13, 14), (14, 15), (15, 16),
    // pinky
    (0, 17), (17, 18), (18, 19), (19, 20),
    // palm
    (5, 9), (9, 13), (13, 17),
];

const MIN_ALPHA:   f32   = 0.3;
const RING_COLOR:  Color = Color::WHITE;
const RING_WIDTH:  f32   = 2.0;
const UNKNOWN:     Color = Color::rgb(0x99, 0x99, 0x99);

/// Dot radius for a joint, in pixels.
pub fn joint_radius(index: usize) -> f32 {
    if index == joint::WRIST {
        5.0
    } else if joint::FINGERTIPS.contains(&index) {
        4.0
    } else {
        3.0
    }
}

/// Overlay colour for a displayed handedness, faded by detection score.
pub fn hand_color(handedness: Handedness, score: f32) -> Color {
    let base = match handedness {
        Handedness::Left    => Color::rgb(0x00, 0xFF, 0x88),
        Handedness::Right   => Color::rgb(0xFF, 0x88, 0x00),
        Handedness::Unknown => UNKNOWN,
    };
    base.with_alpha(score.max(MIN_ALPHA))
}

/// Bone width for the current pinch confidence.
pub fn bone_width(band: ConfidenceBand) -> f32 {
    match band {
        ConfidenceBand::High   => 3.0,
        ConfidenceBand::Medium => 2.0,
        ConfidenceBand::Low    => 1.0,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Draw lists
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub from:  Point2,
    pub to:    Point2,
    pub width: f32,
    pub color: Color,
}

/// A joint dot; `ring` draws an outline instead of a filled disc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2,
    pub radius: f32,
    pub color:  Color,
    pub ring:   Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonOverlay {
    pub lines:   Vec<Line>,
    pub circles: Vec<Circle>,
}

impl SkeletonOverlay {
    /// Build the overlay for every hand in a frame.
    ///
    /// `band` is the confidence band of the primary hand's pinch; secondary
    /// hands are drawn thin.
    pub fn build(hands: &[HandObservation], mapping: &CanvasMapping, band: ConfidenceBand) -> Self {
        let mut overlay = SkeletonOverlay::default();
        for (i, hand) in hands.iter().enumerate() {
            let width = if i == 0 { bone_width(band) } else { bone_width(ConfidenceBand::Low) };
            overlay.add_hand(hand, mapping, width);
        }
        overlay
    }

    fn add_hand(&mut self, hand: &HandObservation, mapping: &CanvasMapping, width: f32) {
        let color = hand_color(mapping.display_handedness(hand.handedness), hand.score);
        let pts: Vec<Point2> = hand.landmarks.iter().map(|&lm| mapping.to_canvas(lm)).collect();

        for &(a, b) in BONES.iter() {
            self.lines.push(Line { from: pts[a], to: pts[b], width, color });
        }
        for (i, &center) in pts.iter().enumerate().take(LANDMARK_COUNT) {
            let radius = joint_radius(i);
            self.circles.push(Circle { center, radius, color, ring: None });
            if i == joint::THUMB_TIP || i == joint::INDEX_TIP {
                self.circles.push(Circle {
                    center,
                    radius: radius + RING_WIDTH,
                    color:  RING_COLOR,
                    ring:   Some(RING_WIDTH),
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.circles.is_empty()
    }
}
