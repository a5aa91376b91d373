//! The draw/stop state machine.
//!
//! [`DrawingSession`] consumes one landmark frame at a time and returns what
//! should happen as data ([`SessionEffect`]s) instead of drawing anything
//! itself.  The caller applies segments to a surface and shows statuses.
//!
//! ```text
//!            pinch ∧ palm facing ∧ debounce
//!   ┌──────┐ ─────────────────────────────▶ ┌─────────┐
//!   │ Idle │                                │ Drawing │ ── palm facing: extend stroke
//!   └──────┘ ◀───────────────────────────── └─────────┘
//!            stop gesture       (immediate)
//!            no hand            (immediate)
//!            palm turned away   (debounced)
//! ```
//!
//! The pinch is only needed to *enter* Drawing.  Once drawing, the stroke
//! follows the index fingertip until one of the exits fires.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::config::GestureConfig;
use crate::geometry::{distance, Point2};
use crate::landmark::{HandObservation, Handedness};
use crate::mapping::CanvasMapping;
use crate::pinch::{analyze_pinch, PinchAnalysis};
use crate::stabilizer::GestureStabilizer;
use crate::stop::is_stop_gesture;
use crate::stroke::{Color, StrokeSegment, StrokeStyle};

// ════════════════════════════════════════════════════════════════════════════
// States, statuses, effects
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing,
}

/// Why a status was emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusReason {
    PinchStarted,
    StopGesture,
    PalmTurnedAway,
    HandLost,
    Cleared,
}

/// Informational status for the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawingStatus {
    pub state:  DrawingState,
    pub reason: StatusReason,
}

impl DrawingStatus {
    pub fn message(&self) -> &'static str {
        match self.reason {
            StatusReason::PinchStarted   => "Drawing: trace with your index finger",
            StatusReason::StopGesture    => "Stop gesture detected, drawing ended",
            StatusReason::PalmTurnedAway => "Palm turned away, drawing ended. Pinch to start again",
            StatusReason::HandLost       => "Hand lost. Show your palm and pinch to draw",
            StatusReason::Cleared        => "Canvas cleared",
        }
    }
}

impl fmt::Display for DrawingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Side effect requested by the session, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEffect {
    Segment(StrokeSegment),
    Status(DrawingStatus),
    ClearSurface,
}

/// Features of the primary hand, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameFeatures {
    /// Label as displayed (after any mirroring swap).
    pub handedness:   Handedness,
    pub pinch:        PinchAnalysis,
    pub stable_pinch: bool,
    pub stop:         bool,
    /// Index fingertip in canvas pixels.
    pub point:        Point2,
}

/// Result of one [`DrawingSession::process_frame`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub effects:  Vec<SessionEffect>,
    /// `None` when the frame had no hands.
    pub features: Option<FrameFeatures>,
    /// State after the frame.
    pub state:    DrawingState,
}

impl FrameReport {
    pub fn segments(&self) -> impl Iterator<Item = &StrokeSegment> {
        self.effects.iter().filter_map(|e| match e {
            SessionEffect::Segment(s) => Some(s),
            _ => None,
        })
    }

    pub fn statuses(&self) -> impl Iterator<Item = &DrawingStatus> {
        self.effects.iter().filter_map(|e| match e {
            SessionEffect::Status(s) => Some(s),
            _ => None,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DrawingSession
// ════════════════════════════════════════════════════════════════════════════

pub struct DrawingSession {
    config:          GestureConfig,
    mapping:         CanvasMapping,
    stabilizer:      GestureStabilizer,
    state:           DrawingState,
    last_point:      Option<Point2>,
    last_transition: Option<Duration>,
    style:           StrokeStyle,
}

impl DrawingSession {
    pub fn new(config: GestureConfig, mapping: CanvasMapping) -> Self {
        DrawingSession {
            stabilizer:      GestureStabilizer::new(config.window()),
            config,
            mapping,
            state:           DrawingState::Idle,
            last_point:      None,
            last_transition: None,
            style:           StrokeStyle::default(),
        }
    }

    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = StrokeStyle { width: StrokeStyle::clamp_width(style.width), ..style };
        self
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn state(&self)      -> DrawingState          { self.state }
    pub fn is_drawing(&self) -> bool                  { self.state == DrawingState::Drawing }
    pub fn last_point(&self) -> Option<Point2>        { self.last_point }
    pub fn style(&self)      -> StrokeStyle           { self.style }
    pub fn config(&self)     -> &GestureConfig        { &self.config }
    pub fn mapping(&self)    -> &CanvasMapping        { &self.mapping }
    pub fn stabilizer(&self) -> &GestureStabilizer    { &self.stabilizer }

    // ── configuration entry points ────────────────────────────────────────

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.style.width = StrokeStyle::clamp_width(width);
    }

    /// Request that the drawing surface be wiped.  Drawing state is kept.
    pub fn clear(&mut self) -> Vec<SessionEffect> {
        vec![
            SessionEffect::ClearSurface,
            SessionEffect::Status(DrawingStatus { state: self.state, reason: StatusReason::Cleared }),
        ]
    }

    // ── per-frame processing ──────────────────────────────────────────────

    /// Process one frame of hand observations taken at `now` (a monotonic
    /// clock reading).  The first hand is the primary one; others are
    /// ignored for control.
    pub fn process_frame(&mut self, hands: &[HandObservation], now: Duration) -> FrameReport {
        let mut report = FrameReport::default();

        let Some(primary) = hands.first() else {
            self.stabilizer.reset();
            if self.is_drawing() {
                self.transition(DrawingState::Idle, StatusReason::HandLost, now, &mut report);
            }
            report.state = self.state;
            return report;
        };

        let pinch = analyze_pinch(primary, &self.config);
        let stop = is_stop_gesture(primary, self.config.stop_cos_threshold);
        let stable_pinch = self.stabilizer.stabilize(pinch.is_pinching);
        let point = self.mapping.to_canvas(primary.index_tip());

        report.features = Some(FrameFeatures {
            handedness: self.mapping.display_handedness(primary.handedness),
            pinch,
            stable_pinch,
            stop,
            point,
        });

        match self.state {
            DrawingState::Drawing if stop => {
                self.transition(DrawingState::Idle, StatusReason::StopGesture, now, &mut report);
            }
            DrawingState::Idle => {
                if stable_pinch && pinch.palm_facing && self.debounce_allows(now) {
                    self.transition(DrawingState::Drawing, StatusReason::PinchStarted, now, &mut report);
                    self.last_point = Some(point);
                    self.stabilizer.reset();
                }
            }
            DrawingState::Drawing => {
                if pinch.palm_facing {
                    self.extend(point, &mut report);
                } else if self.debounce_allows(now) {
                    self.transition(DrawingState::Idle, StatusReason::PalmTurnedAway, now, &mut report);
                }
            }
        }

        report.state = self.state;
        report
    }

    fn debounce_allows(&self, now: Duration) -> bool {
        match self.last_transition {
            Some(t) => now.saturating_sub(t) >= self.config.debounce(),
            None    => true,
        }
    }

    fn transition(&mut self, to: DrawingState, reason: StatusReason, now: Duration, report: &mut FrameReport) {
        debug!(from = ?self.state, to = ?to, reason = ?reason, at_ms = now.as_millis() as u64, "drawing state changed");
        self.state = to;
        self.last_transition = Some(now);
        if to == DrawingState::Idle {
            self.last_point = None;
        }
        report.effects.push(SessionEffect::Status(DrawingStatus { state: to, reason }));
    }

    /// Continue the stroke to `point`, skipping sub-threshold jitter.
    fn extend(&mut self, point: Point2, report: &mut FrameReport) {
        match self.last_point {
            Some(prev) => {
                if distance(&prev, &point) >= self.config.min_segment_px {
                    report.effects.push(SessionEffect::Segment(StrokeSegment {
                        from:  prev,
                        to:    point,
                        style: self.style,
                    }));
                    self.last_point = Some(point);
                }
            }
            None => self.last_point = Some(point),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
