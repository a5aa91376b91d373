//! Hand landmarks as delivered by the external tracker.
//!
//! A [`HandObservation`] always carries exactly [`LANDMARK_COUNT`] points,
//! indexed by the constants in [`joint`].  Raw input of any other length is
//! rejected at construction, so classifiers never see a missing joint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Point3;

/// Number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// A single landmark: normalized image coordinates (`x`, `y` in `[0, 1]`,
/// `y` growing downward) plus relative depth `z`.
pub type Landmark = Point3;

/// Landmark indices by anatomical role.
pub mod joint {
    pub const WRIST:      usize = 0;
    pub const THUMB_CMC:  usize = 1;
    pub const THUMB_MCP:  usize = 2;
    pub const THUMB_IP:   usize = 3;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_MCP:  usize = 5;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_DIP:  usize = 7;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP:   usize = 13;
    pub const RING_PIP:   usize = 14;
    pub const RING_DIP:   usize = 15;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_MCP:  usize = 17;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_DIP:  usize = 19;
    pub const PINKY_TIP:  usize = 20;

    /// The four knuckles that, with the wrist, outline the palm.
    pub const MCPS: [usize; 4] = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

    pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

/// Which hand the tracker believes it saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    /// Swap Left and Right.  Trackers label hands as seen by the camera, so a
    /// mirrored (selfie) display needs exactly one swap.
    pub fn mirrored(self) -> Self {
        match self {
            Handedness::Left    => Handedness::Right,
            Handedness::Right   => Handedness::Left,
            Handedness::Unknown => Handedness::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left    => "Left",
            Handedness::Right   => "Right",
            Handedness::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = std::convert::Infallible;

    /// Case-insensitive; anything unrecognised is `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "left"  => Handedness::Left,
            "right" => Handedness::Right,
            _       => Handedness::Unknown,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One frame's landmark set for a single tracked hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub landmarks:  [Landmark; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Tracker detection score in `[0, 1]`.
    pub score:      f32,
}

impl HandObservation {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT], handedness: Handedness, score: f32) -> Self {
        HandObservation {
            landmarks,
            handedness,
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Build from a slice of raw points.  Returns `None` unless exactly
    /// [`LANDMARK_COUNT`] points are given.
    pub fn from_points(points: &[Landmark], handedness: Handedness, score: f32) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(HandObservation::new(landmarks, handedness, score))
    }

    #[inline]
    pub fn at(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    pub fn wrist(&self)     -> Landmark { self.at(joint::WRIST) }
    pub fn thumb_tip(&self) -> Landmark { self.at(joint::THUMB_TIP) }
    pub fn index_tip(&self) -> Landmark { self.at(joint::INDEX_TIP) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_requires_exact_count() {
        let pts = vec![Landmark::default(); LANDMARK_COUNT];
        assert!(HandObservation::from_points(&pts, Handedness::Left, 0.9).is_some());
        assert!(HandObservation::from_points(&pts[..20], Handedness::Left, 0.9).is_none());
        let mut extra = pts.clone();
        extra.push(Landmark::default());
        assert!(HandObservation::from_points(&extra, Handedness::Left, 0.9).is_none());
    }

    #[test]
    fn score_is_clamped() {
        let hand = HandObservation::new([Landmark::default(); LANDMARK_COUNT], Handedness::Right, 1.7);
        assert_eq!(hand.score, 1.0);
    }

    #[test]
    fn handedness_mirror_is_an_involution() {
        for h in [Handedness::Left, Handedness::Right, Handedness::Unknown] {
            assert_eq!(h.mirrored().mirrored(), h);
        }
        assert_eq!(Handedness::Left.mirrored(), Handedness::Right);
        assert_eq!(Handedness::Unknown.mirrored(), Handedness::Unknown);
    }

    #[test]
    fn handedness_parses_loosely() {
        assert_eq!("Left".parse::<Handedness>().unwrap(), Handedness::Left);
        assert_eq!(" right ".parse::<Handedness>().unwrap(), Handedness::Right);
        assert_eq!("ambidextrous".parse::<Handedness>().unwrap(), Handedness::Unknown);
    }
}
