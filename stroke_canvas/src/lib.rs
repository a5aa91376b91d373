//! # stroke_canvas
//!
//! The persistent drawing surface behind pinch-to-draw.
//!
//! Segments committed by a [`DrawingSession`](hand_gesture::DrawingSession)
//! accumulate in an ARGB raster that is never diffed or replayed; each new
//! segment composites *over* what is already there, so commit order is
//! significant and replaying the same sequence reproduces the same pixels.
//!
//! Rasterization and blending are written directly over `u32` pixels;
//! snapshots are handed to the `image` crate for PNG export.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{Color, Point2, StrokeSegment, StrokeStyle};
//! use stroke_canvas::Canvas;
//!
//! let mut canvas = Canvas::new(320, 240);
//! canvas.commit_segment(&StrokeSegment {
//!     from:  Point2::new(20.0, 20.0),
//!     to:    Point2::new(300.0, 200.0),
//!     style: StrokeStyle { color: Color::GREEN, width: 6.0 },
//! });
//! assert!(!canvas.is_blank());
//!
//! let mut frame = vec![0xFF202020; 320 * 240];
//! canvas.composite_onto(&mut frame);
//! ```

use std::path::Path;

use image::{ImageFormat, ImageResult, Rgba, RgbaImage};

use hand_gesture::{SessionEffect, StrokeSegment};

// ════════════════════════════════════════════════════════════════════════════
// Blending
// ════════════════════════════════════════════════════════════════════════════

const TRANSPARENT: u32 = 0x0000_0000;

#[inline]
fn unpack(c: u32) -> [f32; 4] {
    [
        ((c >> 24) & 0xFF) as f32 / 255.0,
        ((c >> 16) & 0xFF) as f32 / 255.0,
        ((c >>  8) & 0xFF) as f32 / 255.0,
        ( c        & 0xFF) as f32 / 255.0,
    ]
}

#[inline]
fn pack([a, r, g, b]: [f32; 4]) -> u32 {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
    (q(a) << 24) | (q(r) << 16) | (q(g) << 8) | q(b)
}

/// Source-over with straight (non-premultiplied) alpha.  `coverage` scales
/// the source alpha.
pub fn blend_over(dst: u32, src: u32, coverage: f32) -> u32 {
    let [da, dr, dg, db] = unpack(dst);
    let [sa, sr, sg, sb] = unpack(src);
    let sa = sa * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let oa = sa + da * (1.0 - sa);
    let mix = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / oa;
    pack([oa, mix(sr, dr), mix(sg, dg), mix(sb, db)])
}

/// Screen blend of `src` into the colour channels of `dst`; alpha is kept.
pub fn blend_screen(dst: u32, src: u32, coverage: f32) -> u32 {
    let [da, dr, dg, db] = unpack(dst);
    let [_, sr, sg, sb] = unpack(src);
    let t = coverage.clamp(0.0, 1.0);
    let scr = |s: f32, d: f32| {
        let screened = 1.0 - (1.0 - s) * (1.0 - d);
        d + (screened - d) * t
    };
    pack([da, scr(sr, dr), scr(sg, dg), scr(sb, db)])
}

// ════════════════════════════════════════════════════════════════════════════
// Brush — how a segment is stamped
// ════════════════════════════════════════════════════════════════════════════

/// Rendering options applied to every committed segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    /// Width of the soft halo beyond the stroke edge, in pixels (0 = off).
    pub glow: f32,
    /// Peak halo opacity at the stroke edge.
    pub glow_opacity: f32,
    /// Screen-blend a core line 2 px narrower than the stroke.
    pub bright_core: bool,
}

impl Default for Brush {
    fn default() -> Self {
        Brush { glow: 8.0, glow_opacity: 0.35, bright_core: true }
    }
}

impl Brush {
    /// Plain round-capped lines, no glow and no core.
    pub fn flat() -> Self {
        Brush { glow: 0.0, glow_opacity: 0.0, bright_core: false }
    }
}

/// Distance from `(px, py)` to the segment `a`–`b`.
fn segment_distance(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// Accumulating ARGB raster.  Fully transparent where nothing was drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width:  usize,
    height: usize,
    pixels: Vec<u32>,
    brush:  Brush,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![TRANSPARENT; width * height],
            brush:  Brush::default(),
        }
    }

    pub fn with_brush(mut self, brush: Brush) -> Self {
        self.brush = brush;
        self
    }

    pub fn width(&self)  -> usize  { self.width }
    pub fn height(&self) -> usize  { self.height }
    pub fn pixels(&self) -> &[u32] { &self.pixels }
    pub fn brush(&self)  -> Brush  { self.brush }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p >> 24 == 0)
    }

    /// Wipe everything drawn so far.
    pub fn clear(&mut self) {
        self.pixels.fill(TRANSPARENT);
    }

    /// Stamp one round-capped segment onto the surface.
    pub fn commit_segment(&mut self, seg: &StrokeSegment) {
        let color = seg.style.color.0;
        let r = (seg.style.width / 2.0).max(0.5);
        let core_r = (seg.style.width - 2.0) / 2.0;
        let glow = self.brush.glow.max(0.0);
        let reach = r + glow + 1.0;

        let (ax, ay, bx, by) = (seg.from.x, seg.from.y, seg.to.x, seg.to.y);
        let x0 = (ax.min(bx) - reach).floor().max(0.0) as usize;
        let y0 = (ay.min(by) - reach).floor().max(0.0) as usize;
        let x1 = ((ax.max(bx) + reach).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((ay.max(by) + reach).ceil().max(0.0) as usize).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let d = segment_distance(x as f32 + 0.5, y as f32 + 0.5, ax, ay, bx, by);
                let idx = y * self.width + x;
                let mut px = self.pixels[idx];

                if glow > 0.0 && d > r && d < r + glow {
                    let falloff = 1.0 - (d - r) / glow;
                    px = blend_over(px, color, self.brush.glow_opacity * falloff);
                }

                // One-pixel anti-aliased edge.
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    px = blend_over(px, color, coverage);
                }

                if self.brush.bright_core && core_r > 0.0 {
                    let core = (core_r + 0.5 - d).clamp(0.0, 1.0);
                    if core > 0.0 {
                        px = blend_screen(px, color, core);
                    }
                }

                self.pixels[idx] = px;
            }
        }
    }

    /// Apply session effects in order.  Returns the number of segments drawn.
    pub fn apply<'a, I>(&mut self, effects: I) -> usize
    where
        I: IntoIterator<Item = &'a SessionEffect>,
    {
        let mut drawn = 0;
        for effect in effects {
            match effect {
                SessionEffect::Segment(seg) => {
                    self.commit_segment(seg);
                    drawn += 1;
                }
                SessionEffect::ClearSurface => self.clear(),
                SessionEffect::Status(_) => {}
            }
        }
        drawn
    }

    /// Composite the drawing over `frame` (same dimensions, opaque ARGB).
    pub fn composite_onto(&self, frame: &mut [u32]) {
        for (dst, &src) in frame.iter_mut().zip(&self.pixels) {
            if src >> 24 != 0 {
                *dst = blend_over(*dst, src, 1.0);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PNG export
// ════════════════════════════════════════════════════════════════════════════

/// Convert packed ARGB pixels into an RGBA image.  Pixels beyond
/// `width * height` are ignored; missing ones stay transparent.
pub fn to_rgba_image(pixels: &[u32], width: usize, height: usize) -> RgbaImage {
    let w = width as u32;
    RgbaImage::from_fn(w, height as u32, |x, y| {
        let p = pixels.get((y * w + x) as usize).copied().unwrap_or(0);
        Rgba([(p >> 16) as u8, (p >> 8) as u8, p as u8, (p >> 24) as u8])
    })
}

/// Write `pixels` to `path` as a PNG.
pub fn save_png<P: AsRef<Path>>(path: P, pixels: &[u32], width: usize, height: usize) -> ImageResult<()> {
    to_rgba_image(pixels, width, height).save_with_format(path, ImageFormat::Png)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{Color, DrawingState, DrawingStatus, Point2, StatusReason, StrokeStyle};

    fn seg(x0: f32, y0: f32, x1: f32, y1: f32, color: Color, width: f32) -> StrokeSegment {
        StrokeSegment {
            from:  Point2::new(x0, y0),
            to:    Point2::new(x1, y1),
            style: StrokeStyle { color, width },
        }
    }

    #[test]
    fn new_canvas_is_blank() {
        let c = Canvas::new(64, 48);
        assert!(c.is_blank());
        assert_eq!(c.pixels().len(), 64 * 48);
        assert_eq!(c.get(64, 0), None);
    }

    #[test]
    fn flat_segment_paints_its_centre_line_only() {
        let mut c = Canvas::new(100, 100).with_brush(Brush::flat());
        c.commit_segment(&seg(10.0, 50.0, 90.0, 50.0, Color::RED, 6.0));
        assert_eq!(c.get(50, 50), Some(Color::RED.0));
        assert_eq!(c.get(10, 50), Some(Color::RED.0));
        assert_eq!(c.get(50, 10), Some(TRANSPARENT));
        assert_eq!(c.get(95, 50), Some(TRANSPARENT));
    }

    #[test]
    fn glow_reaches_beyond_the_edge() {
        let mut c = Canvas::new(100, 100);
        c.commit_segment(&seg(10.0, 50.0, 90.0, 50.0, Color::RED, 6.0));
        let halo = c.get(50, 57).unwrap();
        assert!(halo >> 24 > 0 && halo >> 24 < 0xFF);
        assert_eq!(c.get(50, 70), Some(TRANSPARENT));
    }

    #[test]
    fn later_stroke_wins_where_they_overlap() {
        let red  = seg(10.0, 50.0, 90.0, 50.0, Color::RED, 8.0);
        let blue = seg(50.0, 10.0, 50.0, 90.0, Color::BLUE, 8.0);

        let mut a = Canvas::new(100, 100);
        a.commit_segment(&red);
        a.commit_segment(&blue);

        let mut b = Canvas::new(100, 100);
        b.commit_segment(&blue);
        b.commit_segment(&red);

        let mut only_blue = Canvas::new(100, 100);
        only_blue.commit_segment(&blue);

        assert_eq!(a.get(50, 50), only_blue.get(50, 50));
        assert_ne!(a.get(50, 50), b.get(50, 50));
    }

    #[test]
    fn replay_is_deterministic() {
        let strokes = [
            seg(5.0, 5.0, 60.0, 40.0, Color::GREEN, 5.0),
            seg(60.0, 40.0, 20.0, 70.0, Color::YELLOW, 12.0),
            seg(20.0, 70.0, 20.0, 70.0, Color::WHITE, 3.0),
        ];
        let mut a = Canvas::new(80, 80);
        let mut b = Canvas::new(80, 80);
        for s in &strokes { a.commit_segment(s); }
        for s in &strokes { b.commit_segment(s); }
        assert_eq!(a, b);
    }

    #[test]
    fn zero_length_segment_is_a_dot() {
        let mut c = Canvas::new(40, 40).with_brush(Brush::flat());
        c.commit_segment(&seg(20.0, 20.0, 20.0, 20.0, Color::GREEN, 10.0));
        assert_eq!(c.get(20, 20), Some(Color::GREEN.0));
        assert_eq!(c.get(20, 30), Some(TRANSPARENT));
    }

    #[test]
    fn off_canvas_segment_is_clipped() {
        let mut c = Canvas::new(20, 20);
        c.commit_segment(&seg(-50.0, -50.0, 500.0, 500.0, Color::RED, 4.0));
        assert!(!c.is_blank());
    }

    #[test]
    fn apply_draws_in_order_and_honours_clear() {
        let mut c = Canvas::new(50, 50);
        let status = DrawingStatus { state: DrawingState::Drawing, reason: StatusReason::PinchStarted };
        let effects = vec![
            SessionEffect::Status(status),
            SessionEffect::Segment(seg(0.0, 0.0, 49.0, 49.0, Color::RED, 4.0)),
            SessionEffect::ClearSurface,
            SessionEffect::Segment(seg(0.0, 25.0, 49.0, 25.0, Color::BLUE, 4.0)),
        ];
        assert_eq!(c.apply(&effects), 2);
        assert_eq!(c.get(5, 5), Some(TRANSPARENT));
        assert!(c.get(25, 25).unwrap() >> 24 == 0xFF);
    }

    #[test]
    fn clear_blanks_surface() {
        let mut c = Canvas::new(30, 30);
        c.commit_segment(&seg(0.0, 0.0, 29.0, 29.0, Color::WHITE, 3.0));
        c.clear();
        assert!(c.is_blank());
    }

    #[test]
    fn composite_keeps_background_where_blank() {
        let mut c = Canvas::new(10, 10).with_brush(Brush::flat());
        c.commit_segment(&seg(0.0, 0.5, 10.0, 0.5, Color::RED, 1.0));
        let mut frame = vec![0xFF101010; 100];
        c.composite_onto(&mut frame);
        assert_eq!(frame[5 * 10 + 5], 0xFF101010);
        assert_eq!(frame[5], Color::RED.0);
    }

    #[test]
    fn blend_over_opaque_source_replaces() {
        assert_eq!(blend_over(0xFF123456, 0xFFABCDEF, 1.0), 0xFFABCDEF);
        assert_eq!(blend_over(0xFF123456, 0xFFABCDEF, 0.0), 0xFF123456);
        assert_eq!(blend_over(TRANSPARENT, 0xFF00FF00, 1.0), 0xFF00FF00);
    }

    #[test]
    fn screen_never_darkens() {
        let dst = 0xFF406080;
        let out = blend_screen(dst, 0xFF808080, 1.0);
        let [_, r0, g0, b0] = unpack(dst);
        let [_, r1, g1, b1] = unpack(out);
        assert!(r1 >= r0 && g1 >= g0 && b1 >= b0);
    }

    #[test]
    fn rgba_image_unpacks_argb() {
        let img = to_rgba_image(&[0xFFFF0000, 0x8000FF00], 2, 1);
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(1, 0), &Rgba([0, 255, 0, 128]));
    }

    #[test]
    fn saved_png_has_png_magic() {
        let path = std::env::temp_dir().join(format!("stroke_canvas_{}.png", std::process::id()));
        save_png(&path, &[0xFF10_2030; 6], 3, 2).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(image::open(&path).unwrap().to_rgba8().get_pixel(2, 1), &Rgba([0x10, 0x20, 0x30, 0xFF]));
        std::fs::remove_file(&path).ok();
    }
}
