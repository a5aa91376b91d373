//! Software-rendered window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                                              │
//! │  scene: backdrop + drawing + hand skeleton   │
//! │                                              │
//! ├──────────────────────────────────────────────┤
//! │  status bar                                  │
//! │  diagnostics line                            │
//! │  key legend                                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The scene is kept in its own buffer so "save" exports exactly what is
//! on screen above the HUD.

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{Context, Result};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use hand_gesture::{Color, Point2};
use stroke_canvas::{blend_over, Canvas};

use crate::skeleton::SkeletonOverlay;
use crate::source::{SimInput, SimLink, SimPointer};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const HUD_H:       usize = 64;
const FONT_SCALE:  usize = 2;
const BG_TOP:      u32   = 0xFF1A1A2E;
const BG_BOTTOM:   u32   = 0xFF0F3460;
const HUD_BG:      u32   = 0xFF16213E;
const STATUS_FG:   u32   = 0xFFEEEEEE;
const DEBUG_FG:    u32   = 0xFFAADDFF;
const LEGEND_FG:   u32   = 0xFF888888;
const SWATCH:      usize = 14;

// ════════════════════════════════════════════════════════════════════════════
// UiCommand — window keys that act on the app rather than the hand
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Clear,
    Save,
    /// Palette slot, 0-based.
    SelectColor(usize),
    WidenLine,
    NarrowLine,
    Quit,
}

/// What the HUD shows this frame.
pub struct Hud<'a> {
    pub status: &'a str,
    pub debug:  &'a str,
    pub color:  Color,
    pub width:  f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    width:      usize,
    height:     usize,
    backdrop:   Vec<u32>,
    scene:      Vec<u32>,
    buf:        Vec<u32>,
    /// Connected only when the simulator drives the hand.
    sim:        SimLink,
    hand_shown: bool,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            "Pinch Draw",
            width,
            height + HUD_H,
            WindowOptions { resize: false, ..WindowOptions::default() },
        )
        .context("opening window")?;

        window.limit_update_rate(Some(Duration::from_millis(16)));

        Ok(Visualizer {
            window,
            width,
            height,
            backdrop:   backdrop(width, height),
            scene:      vec![0; width * height],
            buf:        vec![HUD_BG; width * (height + HUD_H)],
            sim:        SimLink::new(sim_tx),
            hand_shown: true,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Scene pixels from the last rendered frame, without the HUD.
    pub fn snapshot(&self) -> &[u32] { &self.scene }

    /// Poll mouse and keys.  Sends one pointer sample to the simulator (if
    /// any) and returns the app-level commands pressed this frame.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut cmds = Vec::new();
        if !self.window.is_open() {
            cmds.push(UiCommand::Quit);
            return cmds;
        }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held    = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if pressed(Key::Q) || pressed(Key::Escape) {
            cmds.push(UiCommand::Quit);
        }
        if pressed(Key::C) { cmds.push(UiCommand::Clear); }
        if pressed(Key::S) { cmds.push(UiCommand::Save); }
        if held(Key::RightBracket) { cmds.push(UiCommand::WidenLine); }
        if held(Key::LeftBracket)  { cmds.push(UiCommand::NarrowLine); }

        let slots = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6, Key::Key7];
        for (i, &k) in slots.iter().enumerate() {
            if pressed(k) { cmds.push(UiCommand::SelectColor(i)); }
        }
        if pressed(Key::H) {
            self.hand_shown = !self.hand_shown;
        }

        if self.sim.is_connected() {
            let input = if cmds.contains(&UiCommand::Quit) {
                SimInput::Quit
            } else {
                SimInput::Pointer(self.pointer())
            };
            self.sim.send(input);
        }
        cmds
    }

    fn pointer(&self) -> SimPointer {
        let pos = self.window.get_mouse_pos(MouseMode::Discard);
        let in_scene = matches!(pos, Some((_, y)) if (y as usize) < self.height);
        let (x, y) = pos.unwrap_or((0.0, 0.0));
        SimPointer {
            pos:       Point2::new(x, y),
            pinch:     self.window.get_mouse_down(MouseButton::Left) || self.window.is_key_down(Key::P),
            stop:      self.window.is_key_down(Key::X),
            palm_away: self.window.is_key_down(Key::F),
            hidden:    !self.hand_shown || !in_scene,
        }
    }

    /// Render one frame.
    pub fn render(&mut self, canvas: &Canvas, overlay: &SkeletonOverlay, hud: &Hud<'_>) {
        // ── Scene ─────────────────────────────────────────────────────────
        self.scene.copy_from_slice(&self.backdrop);
        canvas.composite_onto(&mut self.scene);
        for line in &overlay.lines {
            self.stamp_line(line.from, line.to, line.width, line.color.0);
        }
        for c in &overlay.circles {
            self.stamp_circle(c.center, c.radius, c.ring, c.color.0);
        }

        let (w, h) = (self.width, self.height);
        self.buf[..w * h].copy_from_slice(&self.scene);

        // ── HUD ───────────────────────────────────────────────────────────
        self.fill_rect(0, h, w, HUD_H, HUD_BG);
        self.fill_rect(8, h + 6, SWATCH, SWATCH, hud.color.0 | 0xFF00_0000);
        self.draw_label(&format!("{:.0}PX", hud.width), 8 + SWATCH + 6, h + 8, STATUS_FG);
        self.draw_label(hud.status, 8 + SWATCH + 60, h + 8, STATUS_FG);
        self.draw_label(hud.debug, 8, h + 28, DEBUG_FG);
        self.draw_label(
            "MOUSE=TIP  LMB/P=PINCH  X=STOP  F=PALM AWAY  H=HIDE  C=CLEAR  S=SAVE  1-7=COLOR  [ ]=WIDTH  Q=QUIT",
            8, h + 48, LEGEND_FG,
        );

        self.window.update_with_buffer(&self.buf, w, h + HUD_H).ok();
    }

    // ── Scene primitives ──────────────────────────────────────────────────

    fn blend_scene(&mut self, x: isize, y: isize, color: u32, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.scene[idx] = blend_over(self.scene[idx], color, coverage) | 0xFF00_0000;
    }

    fn stamp_line(&mut self, a: Point2, b: Point2, width: f32, color: u32) {
        let r = width / 2.0;
        let x0 = (a.x.min(b.x) - r - 1.0).floor() as isize;
        let x1 = (a.x.max(b.x) + r + 1.0).ceil() as isize;
        let y0 = (a.y.min(b.y) - r - 1.0).floor() as isize;
        let y1 = (a.y.max(b.y) + r + 1.0).ceil() as isize;
        let ab = b.sub(a);
        let len_sq = ab.dot(ab);
        for y in y0.max(0)..=y1.min(self.height as isize - 1) {
            for x in x0.max(0)..=x1.min(self.width as isize - 1) {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 { (p.sub(a).dot(ab) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
                let closest = Point2::new(a.x + ab.x * t, a.y + ab.y * t);
                let d = p.sub(closest).norm();
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_scene(x, y, color, coverage);
                }
            }
        }
    }

    fn stamp_circle(&mut self, c: Point2, radius: f32, ring: Option<f32>, color: u32) {
        let reach = radius.ceil() as isize + 1;
        let (cx, cy) = (c.x.round() as isize, c.y.round() as isize);
        for y in cy - reach..=cy + reach {
            for x in cx - reach..=cx + reach {
                let d = Point2::new(x as f32 + 0.5, y as f32 + 0.5).sub(c).norm();
                let outer = (radius + 0.5 - d).clamp(0.0, 1.0);
                let coverage = match ring {
                    Some(thickness) => outer.min((d - (radius - thickness) + 0.5).clamp(0.0, 1.0)),
                    None            => outer,
                };
                if coverage > 0.0 {
                    self.blend_scene(x, y, color, coverage);
                }
            }
        }
    }

    // ── HUD primitives ────────────────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        let (bw, bh) = (self.width, self.height + HUD_H);
        for row in y..(y + h).min(bh) {
            for col in x..(x + w).min(bw) {
                self.buf[row * bw + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height + HUD_H {
            self.buf[y * self.width + x] = color;
        }
    }

    /// 3×5 bitmap font, doubled.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = 4 * FONT_SCALE;
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > self.width { break; }
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    for sy in 0..FONT_SCALE {
                        for sx in 0..FONT_SCALE {
                            self.set_pixel(cx + col * FONT_SCALE + sx, y + row * FONT_SCALE + sy, color);
                        }
                    }
                }
            }
            cx += advance;
        }
    }
}

/// Vertical gradient standing in for the camera picture.
fn backdrop(width: usize, height: usize) -> Vec<u32> {
    let mut px = Vec::with_capacity(width * height);
    for y in 0..height {
        let t = y as f32 / height.max(1) as f32;
        px.extend(std::iter::repeat(lerp_color(BG_TOP, BG_BOTTOM, t)).take(width));
    }
    px
}

fn lerp_color(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |shift: u32| {
        let (ca, cb) = ((a >> shift) & 0xFF, (b >> shift) & 0xFF);
        ((ca as f32) * (1.0 - t) + (cb as f32) * t) as u32
    };
    0xFF00_0000 | (ch(16) << 16) | (ch(8) << 8) | ch(0)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}
