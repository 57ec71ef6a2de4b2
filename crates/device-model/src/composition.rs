//! Per-request composition parameters: background fill and export size.

use serde::{Deserialize, Serialize};

/// Solid background fill for outputs that cannot carry transparency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BackgroundColor {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Color string in the `0xRRGGBB` form ffmpeg filters accept.
    pub fn to_ffmpeg(&self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Output size selection that preserves the native aspect ratio.
///
/// Tracks the native render size (the bezel's pixel dimensions) and lets
/// one axis be edited while the other follows. Dimensions are clamped to
/// `1..=16384`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSize {
    native_width: u32,
    native_height: u32,
    /// width / height of the native size.
    aspect_ratio: f64,
    pub width: u32,
    pub height: u32,
}

impl ExportSize {
    pub const MIN_DIMENSION: u32 = 1;
    pub const MAX_DIMENSION: u32 = 16384;

    /// Outputs above this pixel count are worth a slow-export hint.
    pub const HIGH_QUALITY_PIXEL_THRESHOLD: u64 = 4_000_000;

    pub fn native(width: u32, height: u32) -> Self {
        let width = Self::clamped(width);
        let height = Self::clamped(height);
        Self {
            native_width: width,
            native_height: height,
            aspect_ratio: width as f64 / height as f64,
            width,
            height,
        }
    }

    pub fn native_width(&self) -> u32 {
        self.native_width
    }

    pub fn native_height(&self) -> u32 {
        self.native_height
    }

    /// Whether the selection differs from the native size.
    pub fn size_changed(&self) -> bool {
        self.width != self.native_width || self.height != self.native_height
    }

    /// Under the threshold the export can afford high-quality scaling
    /// without a warning.
    pub fn is_high_quality(&self) -> bool {
        (self.width as u64 * self.height as u64) <= Self::HIGH_QUALITY_PIXEL_THRESHOLD
    }

    pub fn reset(&mut self) {
        self.width = self.native_width;
        self.height = self.native_height;
    }

    pub fn set_width_preserving_aspect(&mut self, new_width: u32) {
        let w = Self::clamped(new_width);
        self.width = w;
        let new_height = Self::clamped((w as f64 / self.aspect_ratio).round() as u32);
        if new_height != self.height {
            self.height = new_height;
        }
    }

    pub fn set_height_preserving_aspect(&mut self, new_height: u32) {
        let h = Self::clamped(new_height);
        self.height = h;
        let new_width = Self::clamped((h as f64 * self.aspect_ratio).round() as u32);
        if new_width != self.width {
            self.width = new_width;
        }
    }

    fn clamped(value: u32) -> u32 {
        value.clamp(Self::MIN_DIMENSION, Self::MAX_DIMENSION)
    }
}
