//! # pinch_draw
//!
//! Freehand drawing in the air: the index fingertip is the pen, a
//! thumb-index pinch with the palm toward the camera starts a stroke, and
//! a stop gesture, turning the palm away, or losing the hand ends it.
//!
//! ## Frame sources
//!
//! * (default) **Simulation**: the mouse is the fingertip of a synthetic
//!   hand and keys put it into poses.
//! * `--replay <file>`: a JSON-lines frame log, played back at its recorded
//!   pace.  `--replay -` reads the same format from stdin, unpaced, so an
//!   external hand tracker can pipe straight in.
//!
//! `--record <file>` writes every processed frame in the same format.
//!
//! ## Keys
//!
//! | Key | Action |
//! |---|---|
//! | mouse | move the index fingertip |
//! | left button / `P` | pinch |
//! | `X` (hold) | stop gesture |
//! | `F` (hold) | turn the palm away |
//! | `H` | hide / show the hand |
//! | `C` | clear the drawing |
//! | `S` | save `gesture-drawing-<unix-ms>.png` |
//! | `1`–`7` | stroke colour |
//! | `[` / `]` | narrower / wider line |
//! | `Q` / `Esc` | quit |

pub mod app;
pub mod skeleton;
pub mod source;
pub mod visualizer;
