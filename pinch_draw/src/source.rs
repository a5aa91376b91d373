//! Landmark frame sources: simulated, replayed, or piped from a tracker.
//!
//! The public interface is [`HandFrame`] delivered over a `mpsc` channel.
//! The render loop doesn't need to know whether frames came from the mouse
//! simulator or from a recorded / live JSON-lines stream.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use hand_gesture::pose::{hand_with, Pose};
use hand_gesture::{CanvasMapping, HandObservation, Handedness, Landmark, Point2};

// ════════════════════════════════════════════════════════════════════════════
// HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// Everything the tracker reported for one processed video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    /// Monotonic time since the source started.
    pub timestamp: Duration,
    /// Zero, one or two hands; the first is the primary one.
    pub hands:     Vec<HandObservation>,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait — unified interface for sim and replay
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandFrame`]s over a channel.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandFrame>);
}

/// Spawn a frame source on its own thread and return the receiving end.
/// The channel disconnects when the source runs out of frames.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<HandFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// JSON-lines wire format
// ════════════════════════════════════════════════════════════════════════════

/// One line of a frame log.
#[derive(Debug, Serialize, Deserialize)]
struct FrameRecord {
    timestamp_ms: u64,
    #[serde(default)]
    hands: Vec<HandRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HandRecord {
    #[serde(default)]
    handedness: String,
    #[serde(default = "full_score")]
    score: f32,
    landmarks: Vec<Landmark>,
}

fn full_score() -> f32 { 1.0 }

/// Parse one JSON line into a frame.  Hands without exactly 21 landmarks
/// are dropped with a warning; the rest of the frame is kept.
pub fn parse_frame(line: &str) -> Result<HandFrame> {
    let record: FrameRecord = serde_json::from_str(line).context("malformed frame record")?;
    let hands = record
        .hands
        .into_iter()
        .filter_map(|h| {
            let handedness: Handedness = h.handedness.parse().unwrap_or_default();
            let hand = HandObservation::from_points(&h.landmarks, handedness, h.score);
            if hand.is_none() {
                warn!(count = h.landmarks.len(), "dropping hand with wrong landmark count");
            }
            hand
        })
        .collect();
    Ok(HandFrame {
        timestamp: Duration::from_millis(record.timestamp_ms),
        hands,
    })
}

/// Serialize a frame as one JSON line (no trailing newline).
pub fn format_frame(frame: &HandFrame) -> Result<String> {
    let record = FrameRecord {
        timestamp_ms: frame.timestamp.as_millis() as u64,
        hands: frame
            .hands
            .iter()
            .map(|h| HandRecord {
                handedness: h.handedness.to_string(),
                score:      h.score,
                landmarks:  h.landmarks.to_vec(),
            })
            .collect(),
    };
    serde_json::to_string(&record).context("serializing frame record")
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayFrameSource — recorded log or live tracker on stdin
// ════════════════════════════════════════════════════════════════════════════

/// Reads JSON-lines frames from a file or stdin.
///
/// With `paced` set, frames are released at their recorded intervals;
/// otherwise they are forwarded as fast as they are read, which is what a
/// live tracker piping into stdin wants.
pub struct ReplayFrameSource {
    reader: Box<dyn BufRead + Send>,
    paced:  bool,
}

impl ReplayFrameSource {
    /// Open `path`, or stdin when `path` is `-`.
    pub fn open(path: &Path, paced: bool) -> Result<Self> {
        let reader: Box<dyn BufRead + Send> = if path.as_os_str() == "-" {
            Box::new(BufReader::new(std::io::stdin()))
        } else {
            let file = File::open(path)
                .with_context(|| format!("opening frame log {}", path.display()))?;
            Box::new(BufReader::new(file))
        };
        Ok(ReplayFrameSource { reader, paced })
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R, paced: bool) -> Self {
        ReplayFrameSource { reader: Box::new(reader), paced }
    }
}

impl FrameSource for ReplayFrameSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let started = Instant::now();
        let mut first: Option<Duration> = None;
        let mut sent = 0usize;

        for (lineno, line) in self.reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!(error = %e, "frame log read failed; stopping replay");
                    break;
                }
            };
            if line.trim().is_empty() { continue; }

            let frame = match parse_frame(&line) {
                Ok(f) => f,
                Err(e) => {
                    warn!(line = lineno + 1, error = %e, "skipping frame");
                    continue;
                }
            };

            if self.paced {
                let origin = *first.get_or_insert(frame.timestamp);
                let due = frame.timestamp.saturating_sub(origin);
                if let Some(wait) = due.checked_sub(started.elapsed()) {
                    thread::sleep(wait);
                }
            }

            if tx.send(frame).is_err() { return; }
            sent += 1;
        }
        info!(frames = sent, "frame log finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameRecorder
// ════════════════════════════════════════════════════════════════════════════

/// Appends frames to a JSON-lines log that [`ReplayFrameSource`] can read.
pub struct FrameRecorder {
    out: BufWriter<File>,
}

impl FrameRecorder {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("creating frame log {}", path.display()))?;
        Ok(FrameRecorder { out: BufWriter::new(file) })
    }

    pub fn record(&mut self, frame: &HandFrame) -> Result<()> {
        let line = format_frame(frame)?;
        writeln!(self.out, "{}", line).context("writing frame log")
    }

    pub fn finish(mut self) -> Result<()> {
        self.out.flush().context("flushing frame log")
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource — mouse/keyboard hand simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Pointer and pose keys sampled from the window once per render frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimPointer {
    /// Canvas pixel under the mouse.
    pub pos:       Point2,
    pub pinch:     bool,
    pub stop:      bool,
    pub palm_away: bool,
    pub hidden:    bool,
}

/// Raw input from the simulation window.
#[derive(Clone, Debug)]
pub enum SimInput {
    Pointer(SimPointer),
    Quit,
}

/// Frame source driven by [`SimInput`]s sent from the visualizer's window.
///
/// Each pointer sample becomes one frame holding a synthetic hand whose
/// index fingertip sits under the mouse.
pub struct SimFrameSource {
    pub rx:      Receiver<SimInput>,
    pub mapping: CanvasMapping,
}

/// Build the frame a pointer sample stands for.
pub fn synthesize(pointer: &SimPointer, mapping: &CanvasMapping, timestamp: Duration) -> HandFrame {
    if pointer.hidden {
        return HandFrame { timestamp, hands: Vec::new() };
    }
    let pose = if pointer.stop {
        Pose::Stop
    } else if pointer.palm_away {
        Pose::PalmAway
    } else if pointer.pinch {
        Pose::Pinch
    } else {
        Pose::Open
    };
    let tip = mapping.to_normalized(pointer.pos);
    // Tracker labels are camera-relative: a right hand in a mirrored view
    // arrives labelled Left.
    let label = mapping.display_handedness(Handedness::Right);
    HandFrame {
        timestamp,
        hands: vec![hand_with(pose, tip, label, 0.95)],
    }
}

impl FrameSource for SimFrameSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let started = Instant::now();
        for input in self.rx {
            let pointer = match input {
                SimInput::Pointer(p) => p,
                SimInput::Quit => {
                    debug!("simulator quit");
                    return;
                }
            };
            let frame = synthesize(&pointer, &self.mapping, started.elapsed());
            if tx.send(frame).is_err() { return; }
        }
    }
}

/// Window-side end of the simulator channel.  Disconnects itself the first
/// time a send fails, so a finished simulator costs nothing per frame.
pub struct SimLink {
    tx: Option<Sender<SimInput>>,
}

impl SimLink {
    pub fn new(tx: Option<Sender<SimInput>>) -> Self {
        SimLink { tx }
    }

    pub fn is_connected(&self) -> bool { self.tx.is_some() }

    /// Returns false if the input was not delivered.
    pub fn send(&mut self, input: SimInput) -> bool {
        let Some(tx) = &self.tx else { return false };
        if tx.send(input).is_ok() {
            return true;
        }
        debug!("simulator stopped; no longer sending pointer samples");
        self.tx = None;
        false
    }
}

/// Fail early on an unusable `--record` target instead of mid-session.
pub fn check_record_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        bail!("record path {} is a directory", path.display());
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::LANDMARK_COUNT;
    use std::io::Cursor;

    fn landmarks_json(n: usize) -> String {
        let pts: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, i as f32 / 100.0))
            .collect();
        format!("[{}]", pts.join(","))
    }

    #[test]
    fn parses_frame_with_two_hands() {
        let line = format!(
            r#"{{"timestamp_ms": 1500, "hands": [
                {{"handedness": "Left",  "score": 0.9, "landmarks": {lm}}},
                {{"handedness": "right", "landmarks": {lm}}}
            ]}}"#,
            lm = landmarks_json(LANDMARK_COUNT)
        );
        let f = parse_frame(&line).unwrap();
        assert_eq!(f.timestamp, Duration::from_millis(1500));
        assert_eq!(f.hands.len(), 2);
        assert_eq!(f.hands[0].handedness, Handedness::Left);
        assert_eq!(f.hands[1].handedness, Handedness::Right);
        assert_eq!(f.hands[1].score, 1.0);
        assert!((f.hands[0].at(20).x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn short_hand_is_dropped_not_fatal() {
        let line = format!(
            r#"{{"timestamp_ms": 0, "hands": [{{"handedness": "Left", "landmarks": {}}}]}}"#,
            landmarks_json(5)
        );
        let f = parse_frame(&line).unwrap();
        assert!(f.hands.is_empty());
    }

    #[test]
    fn empty_frame_means_no_hands() {
        let f = parse_frame(r#"{"timestamp_ms": 42}"#).unwrap();
        assert!(f.hands.is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_frame("not json").is_err());
        assert!(parse_frame(r#"{"hands": []}"#).is_err());
    }

    #[test]
    fn formatted_frame_parses_back() {
        let mapping = CanvasMapping::new(960, 720, true);
        let pointer = SimPointer { pos: Point2::new(300.0, 200.0), pinch: true, ..Default::default() };
        let frame = synthesize(&pointer, &mapping, Duration::from_millis(250));
        let back = parse_frame(&format_frame(&frame).unwrap()).unwrap();
        assert_eq!(back.timestamp, frame.timestamp);
        assert_eq!(back.hands.len(), 1);
        assert_eq!(back.hands[0].handedness, frame.hands[0].handedness);
    }

    #[test]
    fn replay_skips_bad_lines_and_disconnects_at_end() {
        let log = format!(
            "{}\n\nnonsense\n{}\n",
            r#"{"timestamp_ms": 0, "hands": []}"#,
            r#"{"timestamp_ms": 16, "hands": []}"#
        );
        let rx = spawn_frame_source(ReplayFrameSource::from_reader(Cursor::new(log), false));
        let frames: Vec<HandFrame> = rx.iter().collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].timestamp, Duration::from_millis(16));
    }

    #[test]
    fn synthesized_tip_sits_under_pointer() {
        let mapping = CanvasMapping::new(960, 720, true);
        let pointer = SimPointer { pos: Point2::new(480.0, 360.0), ..Default::default() };
        let frame = synthesize(&pointer, &mapping, Duration::ZERO);
        let tip = mapping.to_canvas(frame.hands[0].index_tip());
        assert!((tip.x - 480.0).abs() < 1e-3);
        assert!((tip.y - 360.0).abs() < 1e-3);
        assert_eq!(frame.hands[0].handedness, Handedness::Left);
    }

    #[test]
    fn hidden_pointer_yields_empty_frame() {
        let mapping = CanvasMapping::new(100, 100, false);
        let pointer = SimPointer { hidden: true, pinch: true, ..Default::default() };
        assert!(synthesize(&pointer, &mapping, Duration::ZERO).hands.is_empty());
    }

    #[test]
    fn sim_link_disconnects_after_simulator_exits() {
        let (tx, rx) = mpsc::channel();
        let mut link = SimLink::new(Some(tx));
        assert!(link.send(SimInput::Pointer(SimPointer::default())));
        drop(rx);
        assert!(!link.send(SimInput::Pointer(SimPointer::default())));
        assert!(!link.is_connected());
        assert!(!link.send(SimInput::Quit));
    }

    #[test]
    fn unconnected_link_sends_nothing() {
        let mut link = SimLink::new(None);
        assert!(!link.is_connected());
        assert!(!link.send(SimInput::Quit));
    }

    #[test]
    fn sim_source_stops_on_quit() {
        let (tx, rx) = mpsc::channel();
        let frames = spawn_frame_source(SimFrameSource { rx, mapping: CanvasMapping::new(100, 100, false) });
        tx.send(SimInput::Pointer(SimPointer::default())).unwrap();
        tx.send(SimInput::Quit).unwrap();
        assert_eq!(frames.iter().count(), 1);
    }
}
