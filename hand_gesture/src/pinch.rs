//! Pinch classification.
//!
//! The thumb-tip / index-tip gap is the primary "start drawing" signal.
//! Palm orientation and folded fingers only raise [`PinchAnalysis::confidence`];
//! they are not required for `is_pinching`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::GestureConfig;
use crate::geometry::distance;
use crate::landmark::{joint, HandObservation};
use crate::orientation::is_facing_sensor;

/// How the pinch distance threshold is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinchThreshold {
    /// Constant, in normalized landmark units.
    Fixed(f32),
    /// `scale × distance(thumb IP, index PIP)`; follows the hand's apparent
    /// size as it moves toward or away from the camera.
    Adaptive { scale: f32 },
}

impl PinchThreshold {
    pub fn resolve(&self, hand: &HandObservation) -> f32 {
        match *self {
            PinchThreshold::Fixed(t) => t,
            PinchThreshold::Adaptive { scale } => {
                scale * distance(&hand.at(joint::THUMB_IP), &hand.at(joint::INDEX_PIP))
            }
        }
    }
}

/// Folded-down state of the three non-pinching fingers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerCurl {
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerCurl {
    pub fn count(&self) -> usize {
        [self.middle, self.ring, self.pinky].iter().filter(|&&c| c).count()
    }
}

/// Qualitative confidence band, used for visual feedback only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn of(confidence: f32) -> Self {
        if confidence > 0.8 {
            ConfidenceBand::High
        } else if confidence > 0.6 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Per-frame pinch features.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchAnalysis {
    pub distance:    f32,
    pub threshold:   f32,
    pub is_pinching: bool,
    pub palm_facing: bool,
    /// Monotone score in `[0, 1]`; not a probability.
    pub confidence:  f32,
    pub curl:        FingerCurl,
}

impl PinchAnalysis {
    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::of(self.confidence)
    }
}

/// Analyse one hand for a thumb–index pinch.
pub fn analyze_pinch(hand: &HandObservation, cfg: &GestureConfig) -> PinchAnalysis {
    let palm_facing = is_facing_sensor(hand, cfg.palm_strategy);
    let gap = distance(&hand.thumb_tip(), &hand.index_tip());
    let threshold = cfg.pinch_threshold.resolve(hand);
    let is_pinching = gap < threshold;

    // Image y grows downward: a tip below the index PIP is folded.
    let reference = hand.at(joint::INDEX_PIP).y;
    let curl = FingerCurl {
        middle: hand.at(joint::MIDDLE_TIP).y > reference,
        ring:   hand.at(joint::RING_TIP).y   > reference,
        pinky:  hand.at(joint::PINKY_TIP).y  > reference,
    };

    let confidence = match (is_pinching, palm_facing) {
        (true, true)  => 0.8 + 0.05 * curl.count() as f32,
        (true, false) => 0.4,
        (false, _)    => 0.0,
    };

    trace!(gap, threshold, is_pinching, palm_facing, confidence, "pinch analysis");

    PinchAnalysis {
        distance: gap,
        threshold,
        is_pinching,
        palm_facing,
        confidence,
        curl,
    }
}
