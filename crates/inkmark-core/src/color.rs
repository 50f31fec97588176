//! Color strings carried by annotations.
//!
//! The model stores colors as CSS-style strings (`#rgb`, `#rrggbb`,
//! `#rrggbbaa`, `rgb(..)`, `rgba(..)`); they are decoded when painting and
//! exporting. Decoding never fails outright: callers fall back to black.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Channels normalized to `0.0..=1.0`, alpha dropped.
    pub fn to_rgb_f(self) -> RgbF {
        RgbF {
            r: self.r as f32 / 255.0,
            g: self.g as f32 / 255.0,
            b: self.b as f32 / 255.0,
        }
    }
}

impl From<Rgba8> for Color {
    fn from(color: Rgba8) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Normalized RGB triple handed to the document writer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbF {
    pub const BLACK: RgbF = RgbF { r: 0.0, g: 0.0, b: 0.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Parse a color string. Returns `None` for anything unrecognized.
pub fn parse_color(color: &str) -> Option<Rgba8> {
    let color = color.trim();

    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = color.to_ascii_lowercase();
    if let Some(body) = lower.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
        return parse_functional(body, true);
    }
    if let Some(body) = lower.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        return parse_functional(body, false);
    }

    None
}

/// Decode to normalized channels, defaulting to black.
pub fn normalized_rgb(color: Option<&str>) -> RgbF {
    color
        .and_then(parse_color)
        .map(Rgba8::to_rgb_f)
        .unwrap_or(RgbF::BLACK)
}

/// Decode for on-screen painting, defaulting to opaque black.
pub fn paint_color(color: &str) -> Rgba8 {
    parse_color(color).unwrap_or_else(Rgba8::black)
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            // #rgb -> #rrggbb
            let r = channel(&hex[0..1])? * 17;
            let g = channel(&hex[1..2])? * 17;
            let b = channel(&hex[2..3])? * 17;
            Some(Rgba8::new(r, g, b, 255))
        }
        6 => Some(Rgba8::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        )),
        8 => Some(Rgba8::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

fn parse_functional(body: &str, with_alpha: bool) -> Option<Rgba8> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        Some(v.clamp(0.0, 255.0) as u8)
    };

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if with_alpha {
        let a: f64 = parts[3].parse().ok()?;
        if !a.is_finite() {
            return None;
        }
        (a.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };

    Some(Rgba8::new(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_digit_hex() {
        assert_eq!(parse_color("#3b82f6"), Some(Rgba8::new(59, 130, 246, 255)));
        assert_eq!(parse_color("FF0000"), None);
    }

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(parse_color("#f00"), Some(Rgba8::new(255, 0, 0, 255)));
    }

    #[test]
    fn test_parse_hex_with_alpha() {
        assert_eq!(parse_color("#00ff0080"), Some(Rgba8::new(0, 255, 0, 128)));
    }

    #[test]
    fn test_parse_rgba() {
        assert_eq!(
            parse_color("rgba(255, 255, 0, 0.4)"),
            Some(Rgba8::new(255, 255, 0, 102))
        );
        assert_eq!(parse_color("rgb(1,2,3)"), Some(Rgba8::new(1, 2, 3, 255)));
    }

    #[test]
    fn test_malformed_defaults_to_black() {
        assert_eq!(normalized_rgb(Some("#zzzzzz")), RgbF::BLACK);
        assert_eq!(normalized_rgb(Some("rgba(1, 2)")), RgbF::BLACK);
        assert_eq!(normalized_rgb(Some("")), RgbF::BLACK);
        assert_eq!(normalized_rgb(None), RgbF::BLACK);
        assert_eq!(paint_color("chartreuse"), Rgba8::black());
    }

    #[test]
    fn test_normalized_channels() {
        let rgb = normalized_rgb(Some("#ff0000"));
        assert!((rgb.r - 1.0).abs() < f32::EPSILON);
        assert!(rgb.g.abs() < f32::EPSILON);
        assert!(rgb.b.abs() < f32::EPSILON);
    }
}
