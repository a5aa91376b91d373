//! # hand_gesture
//!
//! Gesture-interpretation core for pinch-to-draw: turns per-frame hand
//! landmarks into drawing commands.
//!
//! ## Pipeline (one frame)
//!
//! | Stage | Module | Output |
//! |---|---|---|
//! | Palm orientation | [`orientation`] | facing / not facing |
//! | Pinch | [`pinch`] | [`PinchAnalysis`] |
//! | Stop gesture | [`stop`] | bool |
//! | Smoothing | [`stabilizer`] | stabilized pinch |
//! | State machine | [`session`] | [`SessionEffect`]s |
//!
//! Everything here is synchronous and allocation-light; nothing blocks and
//! nothing fails.  Degenerate geometry degrades to "not pinching" /
//! "not stop" rather than an error.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use hand_gesture::{CanvasMapping, DrawingSession, GestureConfig, Point2};
//! use hand_gesture::pose::{hand_at, Pose};
//!
//! let mut session = DrawingSession::new(
//!     GestureConfig::default(),
//!     CanvasMapping::new(960, 720, true),
//! );
//!
//! let r = session.process_frame(&[hand_at(Pose::Pinch, Point2::new(0.5, 0.5))], Duration::ZERO);
//! assert!(session.is_drawing());
//! assert_eq!(r.segments().count(), 0);
//!
//! let r = session.process_frame(
//!     &[hand_at(Pose::Open, Point2::new(0.45, 0.5))],
//!     Duration::from_millis(33),
//! );
//! assert_eq!(r.segments().count(), 1);
//! ```

pub mod config;
pub mod geometry;
pub mod landmark;
pub mod mapping;
pub mod orientation;
pub mod pinch;
pub mod pose;
pub mod session;
pub mod stabilizer;
pub mod stop;
pub mod stroke;

pub use config::GestureConfig;
pub use geometry::{distance, Distance, Point2, Point3};
pub use landmark::{joint, HandObservation, Handedness, Landmark, LANDMARK_COUNT};
pub use mapping::CanvasMapping;
pub use orientation::{is_facing_sensor, PalmStrategy};
pub use pinch::{analyze_pinch, ConfidenceBand, FingerCurl, PinchAnalysis, PinchThreshold};
pub use session::{
    DrawingSession, DrawingState, DrawingStatus, FrameFeatures, FrameReport, SessionEffect,
    StatusReason,
};
pub use stabilizer::GestureStabilizer;
pub use stop::{is_stop_gesture, palm_centroid};
pub use stroke::{Color, StrokeSegment, StrokeStyle};
