//! Tunable thresholds.
//!
//! Every magic number used by the classifiers and the state machine lives
//! here as a named constant, and is carried at runtime in [`GestureConfig`]
//! so it can be loaded from JSON and overridden from the command line.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::orientation::PalmStrategy;
use crate::pinch::PinchThreshold;

// ════════════════════════════════════════════════════════════════════════════
// Defaults
// ════════════════════════════════════════════════════════════════════════════

/// Width heuristic: minimum `|indexMCP.x − pinkyMCP.x|`, as a fraction of
/// normalized image width, for the palm to count as facing.
pub const PALM_MIN_WIDTH: f32 = 0.15;

/// Adaptive pinch threshold = this × distance(thumb IP, index PIP).
pub const PINCH_JOINT_SCALE: f32 = 1.2;

/// Fixed pinch threshold in normalized landmark units.
pub const PINCH_FIXED_THRESHOLD: f32 = 0.05;

/// Stop gesture fires when the cosine between the finger direction and the
/// tip→palm vector exceeds this (0.5 ⇔ angle below 60°).
pub const STOP_COS_THRESHOLD: f32 = 0.5;

/// Majority-vote window, in frames.  One frame favours responsiveness;
/// raise it to trade start/stop latency for less flicker.
pub const STABILIZER_WINDOW: usize = 1;

/// Upper bound for the majority-vote window.
pub const MAX_STABILIZER_WINDOW: usize = 5;

/// Minimum time between accepted state transitions, in milliseconds
/// (about one frame at 60 fps).
pub const DEBOUNCE_MS: u64 = 16;

/// Segments shorter than this many canvas pixels are not emitted.
pub const MIN_SEGMENT_PX: f32 = 3.0;

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig
// ════════════════════════════════════════════════════════════════════════════

/// Runtime configuration for the gesture core.
///
/// Missing fields in a JSON document fall back to the defaults above.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub palm_strategy:      PalmStrategy,
    pub pinch_threshold:    PinchThreshold,
    pub stop_cos_threshold: f32,
    /// Stabilizer window (frames), `1..=MAX_STABILIZER_WINDOW`.
    pub stabilizer_window:  usize,
    pub debounce_ms:        u64,
    pub min_segment_px:     f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            palm_strategy:      PalmStrategy::NormalVector,
            pinch_threshold:    PinchThreshold::Adaptive { scale: PINCH_JOINT_SCALE },
            stop_cos_threshold: STOP_COS_THRESHOLD,
            stabilizer_window:  STABILIZER_WINDOW,
            debounce_ms:        DEBOUNCE_MS,
            min_segment_px:     MIN_SEGMENT_PX,
        }
    }
}

impl GestureConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Window size clamped to the supported range.
    pub fn window(&self) -> usize {
        self.stabilizer_window.clamp(1, MAX_STABILIZER_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: GestureConfig = serde_json::from_str(r#"{ "debounce_ms": 120 }"#).unwrap();
        assert_eq!(cfg.debounce(), Duration::from_millis(120));
        assert_eq!(cfg.stabilizer_window, STABILIZER_WINDOW);
        assert_eq!(cfg.palm_strategy, PalmStrategy::NormalVector);
    }

    #[test]
    fn tagged_strategies_deserialize() {
        let cfg: GestureConfig = serde_json::from_str(
            r#"{
                "palm_strategy":   { "width_heuristic": { "min_width": 0.2 } },
                "pinch_threshold": { "fixed": 0.04 }
            }"#,
        ).unwrap();
        assert_eq!(cfg.palm_strategy, PalmStrategy::WidthHeuristic { min_width: 0.2 });
        assert_eq!(cfg.pinch_threshold, PinchThreshold::Fixed(0.04));
    }

    #[test]
    fn window_is_clamped() {
        let mut cfg = GestureConfig::default();
        cfg.stabilizer_window = 0;
        assert_eq!(cfg.window(), 1);
        cfg.stabilizer_window = 40;
        assert_eq!(cfg.window(), MAX_STABILIZER_WINDOW);
    }
}
