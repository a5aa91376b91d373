//! Top-level application state.
//!
//! `AppState` owns the `DrawingSession`, the stroke `Canvas`, and the
//! HUD text.  It consumes `HandFrame`s and `UiCommand`s and hands the
//! visualizer what to draw each frame.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use hand_gesture::{
    CanvasMapping, Color, ConfidenceBand, DrawingSession, FrameFeatures, GestureConfig,
    HandObservation, SessionEffect, StrokeStyle,
};
use stroke_canvas::{save_png, Brush, Canvas};

use crate::skeleton::SkeletonOverlay;
use crate::source::{
    check_record_path, spawn_frame_source, FrameRecorder, HandFrame, ReplayFrameSource, SimFrameSource,
    SimInput,
};
use crate::visualizer::{Hud, UiCommand, Visualizer};

/// Line width change per `[` / `]` press.
const WIDTH_STEP: f32 = 1.0;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub width:   usize,
    pub height:  usize,
    /// Selfie view: flip the picture and swap handedness labels.
    pub mirror:  bool,
    pub style:   StrokeStyle,
    pub brush:   Brush,
    pub gesture: GestureConfig,
    /// Read frames from a JSON-lines log (`-` for stdin) instead of the
    /// mouse simulator.
    pub replay:  Option<PathBuf>,
    /// Append every processed frame to this log.
    pub record:  Option<PathBuf>,
    /// Where saved images go.
    pub save_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:    960,
            height:   720,
            mirror:   true,
            style:    StrokeStyle::default(),
            brush:    Brush::default(),
            gesture:  GestureConfig::default(),
            replay:   None,
            record:   None,
            save_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn mapping(&self) -> CanvasMapping {
        CanvasMapping::new(self.width, self.height, self.mirror)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FPS meter
// ════════════════════════════════════════════════════════════════════════════

/// Smoothed frame rate from source timestamps.
#[derive(Clone, Copy, Debug, Default)]
pub struct FpsMeter {
    last: Option<Duration>,
    fps:  f32,
}

impl FpsMeter {
    pub fn tick(&mut self, now: Duration) {
        if let Some(prev) = self.last {
            let dt = now.saturating_sub(prev).as_secs_f32();
            if dt > 0.0 {
                let inst = 1.0 / dt;
                self.fps = if self.fps == 0.0 { inst } else { self.fps * 0.9 + inst * 0.1 };
            }
        }
        self.last = Some(now);
    }

    pub fn fps(&self) -> f32 { self.fps }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── drawing ───────────────────────────────────────────────────────────
    session:  DrawingSession,
    canvas:   Canvas,

    // ── last frame, for the overlay and diagnostics ───────────────────────
    hands:    Vec<HandObservation>,
    features: Option<FrameFeatures>,
    fps:      FpsMeter,

    // ── HUD ───────────────────────────────────────────────────────────────
    pub status: String,

    recorder: Option<FrameRecorder>,
    save_dir: PathBuf,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        let session = DrawingSession::new(cfg.gesture.clone(), cfg.mapping()).with_style(cfg.style);
        AppState {
            session,
            canvas:   Canvas::new(cfg.width, cfg.height).with_brush(cfg.brush),
            hands:    Vec::new(),
            features: None,
            fps:      FpsMeter::default(),
            status:   "Show your palm and pinch to draw".to_string(),
            recorder: None,
            save_dir: cfg.save_dir.clone(),
        }
    }

    pub fn with_recorder(mut self, recorder: FrameRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    // ── process one HandFrame ─────────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: HandFrame) {
        if let Some(rec) = self.recorder.as_mut() {
            if let Err(e) = rec.record(&frame) {
                warn!(error = %e, "recording stopped");
                self.recorder = None;
            }
        }

        self.fps.tick(frame.timestamp);
        let report = self.session.process_frame(&frame.hands, frame.timestamp);
        self.apply(&report.effects);
        self.features = report.features;
        self.hands = frame.hands;
    }

    fn apply(&mut self, effects: &[SessionEffect]) {
        let drawn = self.canvas.apply(effects);
        if drawn > 0 {
            debug!(segments = drawn, "committed");
        }
        for effect in effects {
            if let SessionEffect::Status(s) = effect {
                info!(state = ?s.state, reason = ?s.reason, "{}", s);
                self.status = s.message().to_string();
            }
        }
    }

    // ── process one UiCommand ─────────────────────────────────────────────

    /// Returns false once the app should quit.  `Save` needs the scene
    /// pixels and is handled by [`save_image`](Self::save_image).
    pub fn handle_command(&mut self, cmd: UiCommand) -> bool {
        match cmd {
            UiCommand::Quit => return false,
            UiCommand::Clear => {
                let effects = self.session.clear();
                self.apply(&effects);
            }
            UiCommand::SelectColor(i) => {
                if let Some(&color) = Color::PALETTE.get(i) {
                    self.session.set_color(color);
                    self.status = format!("Color {}", color);
                }
            }
            UiCommand::WidenLine | UiCommand::NarrowLine => {
                let step = if cmd == UiCommand::WidenLine { WIDTH_STEP } else { -WIDTH_STEP };
                self.session.set_line_width(self.session.style().width + step);
                self.status = format!("Line width {:.0}px", self.session.style().width);
            }
            UiCommand::Save => {}
        }
        true
    }

    /// Write `scene` as `gesture-drawing-<unix-ms>.png` in the save
    /// directory and return the path.
    pub fn save_image(&mut self, scene: &[u32]) -> Result<PathBuf> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let path = self.save_dir.join(format!("gesture-drawing-{}.png", stamp));
        save_png(&path, scene, self.canvas.width(), self.canvas.height())
            .with_context(|| format!("saving {}", path.display()))?;
        info!(path = %path.display(), "image saved");
        self.status = format!("Saved {}", file_name(&path));
        Ok(path)
    }

    /// Flush the frame log, if recording.
    pub fn finish(&mut self) -> Result<()> {
        match self.recorder.take() {
            Some(rec) => rec.finish(),
            None => Ok(()),
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn session(&self) -> &DrawingSession { &self.session }
    pub fn canvas(&self)  -> &Canvas         { &self.canvas }
    pub fn hands(&self)   -> &[HandObservation] { &self.hands }

    pub fn overlay(&self) -> SkeletonOverlay {
        let band = self.features.map(|f| f.pinch.band()).unwrap_or(ConfidenceBand::Low);
        SkeletonOverlay::build(&self.hands, self.session.mapping(), band)
    }

    /// One-line classifier readout for the primary hand.
    pub fn diagnostics(&self) -> String {
        let Some(f) = self.features else {
            return format!("NO HAND  FPS {:.0}  STATE {:?}", self.fps.fps(), self.session.state());
        };
        let p = f.pinch;
        format!(
            "{}  FPS {:.0}  PALM {}  PINCH {}/{}  CONF {:.2}  STATE {:?}  D {:.3} {} T {:.3}",
            f.handedness,
            self.fps.fps(),
            if p.palm_facing { "FACING" } else { "AWAY" },
            yes_no(p.is_pinching),
            yes_no(f.stable_pinch),
            p.confidence,
            self.session.state(),
            p.distance,
            if p.distance < p.threshold { "<" } else { ">" },
            p.threshold,
        )
    }
}

fn yes_no(b: bool) -> &'static str { if b { "Y" } else { "N" } }

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the window and the frame source (mouse simulator by default,
/// a frame log with `replay`), then drives the event/render loop at
/// ~60 fps until the window closes or `Q` is pressed.
pub fn run(cfg: AppConfig) -> Result<()> {
    // ── Frame source ──────────────────────────────────────────────────────
    let (sim_tx, frame_rx): (Option<mpsc::Sender<SimInput>>, Receiver<HandFrame>) = match &cfg.replay {
        Some(path) => {
            let paced = path.as_os_str() != "-";
            info!(path = %path.display(), paced, "replaying frame log");
            (None, spawn_frame_source(ReplayFrameSource::open(path, paced)?))
        }
        None => {
            let (tx, rx) = mpsc::channel();
            let source = SimFrameSource { rx, mapping: cfg.mapping() };
            (Some(tx), spawn_frame_source(source))
        }
    };

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(&cfg);
    if let Some(path) = &cfg.record {
        check_record_path(path)?;
        info!(path = %path.display(), "recording frames");
        app = app.with_recorder(FrameRecorder::create(path)?);
    }

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(cfg.width, cfg.height, sim_tx)?;
    let mut source_done = false;

    // ── Main loop ─────────────────────────────────────────────────────────
    'frames: while vis.is_open() {
        // 1. Window input
        for cmd in vis.poll_input() {
            if cmd == UiCommand::Save {
                if let Err(e) = app.save_image(vis.snapshot()) {
                    warn!(error = %e, "save failed");
                    app.status = "Save failed".to_string();
                }
            } else if !app.handle_command(cmd) {
                break 'frames;
            }
        }

        // 2. Drain frames
        while !source_done {
            match frame_rx.try_recv() {
                Ok(frame) => app.handle_frame(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!("frame source finished");
                    source_done = true;
                }
            }
        }

        // 3. Render
        let style = app.session().style();
        let debug = app.diagnostics();
        let hud = Hud { status: &app.status, debug: &debug, color: style.color, width: style.width };
        vis.render(app.canvas(), &app.overlay(), &hud);
    }

    app.finish()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::pose::{hand_at, Pose};
    use hand_gesture::{DrawingState, Point2};

    fn make_app() -> AppState {
        AppState::new(&AppConfig { mirror: false, ..AppConfig::default() })
    }

    fn frame(pose: Pose, x: f32, y: f32, ms: u64) -> HandFrame {
        HandFrame {
            timestamp: Duration::from_millis(ms),
            hands:     vec![hand_at(pose, Point2::new(x, y))],
        }
    }

    #[test]
    fn pinch_then_move_draws() {
        let mut app = make_app();
        app.handle_frame(frame(Pose::Pinch, 0.5, 0.5, 0));
        assert_eq!(app.session().state(), DrawingState::Drawing);
        assert!(app.canvas().is_blank());
        app.handle_frame(frame(Pose::Open, 0.55, 0.5, 33));
        assert!(!app.canvas().is_blank());
        assert!(app.status.starts_with("Drawing"));
    }

    #[test]
    fn losing_the_hand_updates_status() {
        let mut app = make_app();
        app.handle_frame(frame(Pose::Pinch, 0.5, 0.5, 0));
        app.handle_frame(HandFrame { timestamp: Duration::from_millis(33), hands: vec![] });
        assert_eq!(app.session().state(), DrawingState::Idle);
        assert!(app.status.starts_with("Hand lost"));
        assert!(app.hands().is_empty());
    }

    #[test]
    fn clear_wipes_canvas() {
        let mut app = make_app();
        app.handle_frame(frame(Pose::Pinch, 0.5, 0.5, 0));
        app.handle_frame(frame(Pose::Open, 0.6, 0.5, 33));
        assert!(app.handle_command(UiCommand::Clear));
        assert!(app.canvas().is_blank());
        assert_eq!(app.status, "Canvas cleared");
    }

    #[test]
    fn palette_and_width_keys() {
        let mut app = make_app();
        app.handle_command(UiCommand::SelectColor(4));
        assert_eq!(app.session().style().color, Color::BLUE);
        app.handle_command(UiCommand::SelectColor(99));
        assert_eq!(app.session().style().color, Color::BLUE);

        let w = app.session().style().width;
        app.handle_command(UiCommand::WidenLine);
        assert_eq!(app.session().style().width, w + 1.0);
        for _ in 0..200 { app.handle_command(UiCommand::NarrowLine); }
        assert_eq!(app.session().style().width, 1.0);
    }

    #[test]
    fn quit_command_stops() {
        let mut app = make_app();
        assert!(!app.handle_command(UiCommand::Quit));
    }

    #[test]
    fn overlay_follows_last_frame() {
        let mut app = make_app();
        assert!(app.overlay().is_empty());
        app.handle_frame(frame(Pose::Open, 0.5, 0.5, 0));
        assert_eq!(app.overlay().lines.len(), 23);
    }

    #[test]
    fn diagnostics_mentions_state() {
        let mut app = make_app();
        assert!(app.diagnostics().starts_with("NO HAND"));
        app.handle_frame(frame(Pose::Pinch, 0.5, 0.5, 0));
        let line = app.diagnostics();
        assert!(line.contains("Drawing"));
        assert!(line.contains("PALM FACING"));
        assert!(line.contains(" < "));
    }

    #[test]
    fn fps_from_timestamps() {
        let mut m = FpsMeter::default();
        for i in 0..10 { m.tick(Duration::from_millis(i * 20)); }
        assert!((m.fps() - 50.0).abs() < 0.5);
    }

    #[test]
    fn save_writes_png() {
        let dir = std::env::temp_dir().join(format!("pinch_draw_save_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let cfg = AppConfig { width: 4, height: 3, save_dir: dir.clone(), ..AppConfig::default() };
        let mut app = AppState::new(&cfg);
        let path = app.save_image(&[0xFF10_2030; 12]).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let name = file_name(&path);
        assert!(name.starts_with("gesture-drawing-") && name.ends_with(".png"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn recorded_frames_replay_identically() {
        let path = std::env::temp_dir().join(format!("pinch_draw_rec_{}.jsonl", std::process::id()));
        let frames = vec![
            frame(Pose::Pinch, 0.5, 0.5, 0),
            frame(Pose::Open, 0.6, 0.5, 33),
            frame(Pose::Open, 0.6, 0.6, 66),
        ];

        let mut live = make_app().with_recorder(FrameRecorder::create(&path).unwrap());
        for f in frames { live.handle_frame(f); }
        live.finish().unwrap();

        let mut replayed = make_app();
        let rx = spawn_frame_source(ReplayFrameSource::open(&path, false).unwrap());
        for f in rx.iter() { replayed.handle_frame(f); }

        assert_eq!(live.canvas().pixels(), replayed.canvas().pixels());
        assert!(!replayed.canvas().is_blank());
        std::fs::remove_file(&path).ok();
    }
}
