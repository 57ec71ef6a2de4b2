//! Pixel-space geometry for bezel artwork and captured media.
//!
//! All rectangles use the bezel image's top-left-origin pixel
//! coordinate space.

use serde::{Deserialize, Serialize};

/// A rectangle in bezel pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Swap x with y and width with height.
    ///
    /// Approximates the landscape screen region of a portrait bezel.
    /// Only valid for axis-aligned rectangular cutouts; a true rotation
    /// of an asymmetric shape would differ. A landscape-specific entry
    /// in the region table always takes precedence over this.
    pub fn swapped(&self) -> Self {
        Self {
            x: self.y,
            y: self.x,
            width: self.height,
            height: self.width,
        }
    }

    /// Scale origin and size uniformly, rounding to the nearest pixel.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: (self.x as f64 * factor).round() as u32,
            y: (self.y as f64 * factor).round() as u32,
            width: (self.width as f64 * factor).round() as u32,
            height: (self.height as f64 * factor).round() as u32,
        }
    }

    /// One past the right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// Device orientation implied by pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Orientation of raw pixel dimensions. A square input is portrait.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::Landscape)
    }

    /// Component used in bezel asset filenames.
    pub fn file_component(&self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }
}

/// Extra rotation applied on top of a video's own display orientation,
/// in quarter turns clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Parse a rotation from whole degrees. Accepts any multiple of 90,
    /// negative values included.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::R0),
            90 => Some(Self::R90),
            180 => Some(Self::R180),
            270 => Some(Self::R270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }

    /// Whether applying this rotation swaps width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Self::R90 | Self::R270)
    }

    /// Pixel dimensions after applying this rotation.
    pub fn apply(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// The rotation equivalent to this one followed by `other`.
    pub fn then(&self, other: Rotation) -> Rotation {
        // Sum stays within 0..720, so the parse cannot fail.
        Self::from_degrees((self.degrees() + other.degrees()) as i32).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_inclusive_rect_edges() {
        let rect = PixelRect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert!(rect.contains(10, 20));
        assert!(rect.contains(109, 69));
        assert!(!rect.contains(110, 69));
        assert_eq!(rect.area(), 5000);
    }

    #[test]
    fn test_swapped_exchanges_axes() {
        let rect = PixelRect::new(60, 59, 1170, 2532);
        let swapped = rect.swapped();
        assert_eq!(swapped, PixelRect::new(59, 60, 2532, 1170));
    }

    #[test]
    fn test_scaled_rounds_to_nearest_pixel() {
        let rect = PixelRect::new(10, 11, 100, 201);
        let scaled = rect.scaled(0.5);
        assert_eq!(scaled, PixelRect::new(5, 6, 50, 101));
        assert_eq!(rect.scaled(1.0), rect);
    }

    #[test]
    fn test_square_dimensions_are_portrait() {
        assert_eq!(Orientation::from_dimensions(999, 999), Orientation::Portrait);
        assert_eq!(
            Orientation::from_dimensions(1170, 2532),
            Orientation::Portrait
        );
        assert_eq!(
            Orientation::from_dimensions(2532, 1170),
            Orientation::Landscape
        );
    }

    #[test]
    fn test_orientation_file_component() {
        assert_eq!(Orientation::Portrait.file_component(), "Portrait");
        assert_eq!(Orientation::Landscape.file_component(), "Landscape");
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::R0));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::R90));
        assert_eq!(Rotation::from_degrees(360), Some(Rotation::R0));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::R270));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn test_rotation_round_trips_to_identity() {
        assert_eq!(Rotation::R90.then(Rotation::R270), Rotation::R0);
        assert_eq!(Rotation::R180.then(Rotation::R180), Rotation::R0);
        assert_eq!(Rotation::R270.then(Rotation::R90).apply(1170, 2532), (1170, 2532));
    }

    #[test]
    fn test_rotation_apply_swaps_for_quarter_turns() {
        assert_eq!(Rotation::R90.apply(1920, 1080), (1080, 1920));
        assert_eq!(Rotation::R180.apply(1920, 1080), (1920, 1080));
        assert_eq!(Rotation::R270.apply(1920, 1080), (1080, 1920));
    }

    proptest! {
        #[test]
        fn prop_swapped_is_an_involution(
            x in 0u32..10_000,
            y in 0u32..10_000,
            w in 1u32..10_000,
            h in 1u32..10_000,
        ) {
            let rect = PixelRect::new(x, y, w, h);
            prop_assert_eq!(rect.swapped().swapped(), rect);
        }

        #[test]
        fn prop_rotation_then_inverse_is_identity(quarters in 0u32..4) {
            let rotation = Rotation::from_degrees((quarters * 90) as i32).unwrap();
            let inverse = Rotation::from_degrees(360 - rotation.degrees() as i32).unwrap();
            prop_assert_eq!(rotation.then(inverse), Rotation::R0);
        }
    }
}
