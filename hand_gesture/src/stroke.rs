//! Stroke data model: colours, styles and committed segments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point2;

// ════════════════════════════════════════════════════════════════════════════
// Color
// ════════════════════════════════════════════════════════════════════════════

/// Packed `0xAARRGGBB` colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const RED:    Color = Color(0xFFFF0000);
    pub const ORANGE: Color = Color(0xFFFF8800);
    pub const YELLOW: Color = Color(0xFFFFDD00);
    pub const GREEN:  Color = Color(0xFF00CC44);
    pub const BLUE:   Color = Color(0xFF0088FF);
    pub const PURPLE: Color = Color(0xFFAA00FF);
    pub const WHITE:  Color = Color(0xFFFFFFFF);

    /// Selectable stroke colours, in palette order.
    pub const PALETTE: [Color; 7] = [
        Color::RED, Color::ORANGE, Color::YELLOW, Color::GREEN,
        Color::BLUE, Color::PURPLE, Color::WHITE,
    ];

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub fn alpha(self) -> u8 { (self.0 >> 24) as u8 }
    pub fn red(self)   -> u8 { (self.0 >> 16) as u8 }
    pub fn green(self) -> u8 { (self.0 >> 8) as u8 }
    pub fn blue(self)  -> u8 { self.0 as u8 }

    /// Same colour with alpha replaced by `a` in `[0, 1]`.
    pub fn with_alpha(self, a: f32) -> Self {
        let a = (a.clamp(0.0, 1.0) * 255.0).round() as u32;
        Color((self.0 & 0x00FF_FFFF) | (a << 24))
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(|rgb| Color(0xFF00_0000 | rgb))
    }
}

impl Default for Color {
    fn default() -> Self { Color::RED }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red(), self.green(), self.blue())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StrokeStyle / StrokeSegment
// ════════════════════════════════════════════════════════════════════════════

pub const DEFAULT_LINE_WIDTH: f32 = 8.0;
pub const MIN_LINE_WIDTH:     f32 = 1.0;
pub const MAX_LINE_WIDTH:     f32 = 64.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    /// Line width in canvas pixels.
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        StrokeStyle { color: Color::RED, width: DEFAULT_LINE_WIDTH }
    }
}

impl StrokeStyle {
    /// Clamp to `MIN_LINE_WIDTH..=MAX_LINE_WIDTH`; NaN and infinities fall
    /// back to `DEFAULT_LINE_WIDTH`.
    pub fn clamp_width(width: f32) -> f32 {
        if !width.is_finite() {
            return DEFAULT_LINE_WIDTH;
        }
        width.clamp(MIN_LINE_WIDTH, MAX_LINE_WIDTH)
    }
}

/// One committed line segment, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub from:  Point2,
    pub to:    Point2,
    pub style: StrokeStyle,
}

impl StrokeSegment {
    pub fn length(&self) -> f32 {
        self.to.sub(self.from).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_through_display() {
        let c = Color::from_hex("#12ab9f").unwrap();
        assert_eq!(c, Color::rgb(0x12, 0xab, 0x9f));
        assert_eq!(c.to_string(), "#12ab9f");
        assert!(Color::from_hex("#fff").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = Color::GREEN.with_alpha(0.5);
        assert_eq!(c.alpha(), 128);
        assert_eq!(c.0 & 0x00FF_FFFF, Color::GREEN.0 & 0x00FF_FFFF);
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(StrokeStyle::clamp_width(0.0), MIN_LINE_WIDTH);
        assert_eq!(StrokeStyle::clamp_width(500.0), MAX_LINE_WIDTH);
        assert_eq!(StrokeStyle::clamp_width(12.0), 12.0);
    }

    #[test]
    fn non_finite_width_falls_back_to_default() {
        assert_eq!(StrokeStyle::clamp_width(f32::NAN), DEFAULT_LINE_WIDTH);
        assert_eq!(StrokeStyle::clamp_width(f32::INFINITY), DEFAULT_LINE_WIDTH);
        assert_eq!(StrokeStyle::clamp_width(f32::NEG_INFINITY), DEFAULT_LINE_WIDTH);
    }
}
