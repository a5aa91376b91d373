//! Palm orientation: is the palm presented to the camera?
//!
//! Both strategies are permissive heuristics.  Pick one in
//! [`GestureConfig`](crate::config::GestureConfig) and use it for every
//! frame.

use serde::{Deserialize, Serialize};

use crate::config::PALM_MIN_WIDTH;
use crate::geometry::Point3;
use crate::landmark::{joint, HandObservation};

/// Unit vector pointing from the hand toward the sensor, in the tracker's
/// depth convention.
const TOWARD_SENSOR: Point3 = Point3::new(0.0, 0.0, 1.0);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalmStrategy {
    /// Sign of the palm-plane normal (wrist→index MCP × wrist→pinky MCP)
    /// along the sensor axis.
    NormalVector,
    /// Horizontal spread of the index and pinky knuckles; no depth used.
    WidthHeuristic { min_width: f32 },
}

impl PalmStrategy {
    pub fn width_heuristic() -> Self {
        PalmStrategy::WidthHeuristic { min_width: PALM_MIN_WIDTH }
    }
}

/// True when the palm faces the sensor under `strategy`.
pub fn is_facing_sensor(hand: &HandObservation, strategy: PalmStrategy) -> bool {
    match strategy {
        PalmStrategy::NormalVector => palm_normal(hand).dot(TOWARD_SENSOR) > 0.0,
        PalmStrategy::WidthHeuristic { min_width } => {
            let spread = hand.at(joint::INDEX_MCP).x - hand.at(joint::PINKY_MCP).x;
            spread.abs() > min_width
        }
    }
}

/// Un-normalized palm-plane normal.
pub fn palm_normal(hand: &HandObservation) -> Point3 {
    let wrist = hand.wrist();
    let to_index = hand.at(joint::INDEX_MCP).sub(wrist);
    let to_pinky = hand.at(joint::PINKY_MCP).sub(wrist);
    to_index.cross(to_pinky)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;
    use crate::pose::{hand_at, Pose};

    const CENTER: Point2 = Point2::new(0.5, 0.5);

    #[test]
    fn open_palm_faces_under_both_strategies() {
        let hand = hand_at(Pose::Open, CENTER);
        assert!(is_facing_sensor(&hand, PalmStrategy::NormalVector));
        assert!(is_facing_sensor(&hand, PalmStrategy::width_heuristic()));
    }

    #[test]
    fn back_of_hand_flips_normal() {
        let hand = hand_at(Pose::PalmAway, CENTER);
        assert!(!is_facing_sensor(&hand, PalmStrategy::NormalVector));
        assert!(palm_normal(&hand).z < 0.0);
    }

    #[test]
    fn edge_on_hand_fails_width_heuristic() {
        let hand = hand_at(Pose::EdgeOn, CENTER);
        assert!(!is_facing_sensor(&hand, PalmStrategy::width_heuristic()));
    }

    #[test]
    fn width_threshold_is_strict() {
        let hand = hand_at(Pose::Open, CENTER);
        let spread = (hand.at(joint::INDEX_MCP).x - hand.at(joint::PINKY_MCP).x).abs();
        let at_limit = PalmStrategy::WidthHeuristic { min_width: spread };
        assert!(!is_facing_sensor(&hand, at_limit));
    }

    #[test]
    fn collapsed_hand_is_not_facing() {
        let hand = HandObservation::new(
            [Point3::new(0.5, 0.5, 0.0); crate::landmark::LANDMARK_COUNT],
            crate::landmark::Handedness::Unknown,
            1.0,
        );
        assert!(!is_facing_sensor(&hand, PalmStrategy::NormalVector));
    }
}
