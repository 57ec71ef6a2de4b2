//! Borrowed pixel-buffer view over decoded bezel artwork.

use framefit_common::{FramefitError, FramefitResult};
use image::RgbaImage;

/// Alpha channel offset within an RGBA pixel.
const ALPHA_OFFSET: usize = 3;

/// A borrowed view of decoded RGBA pixel data with an explicit stride.
///
/// Rows may carry padding: `bytes_per_row` can exceed
/// `width * bytes_per_pixel`. Only the alpha channel is read by the
/// detection passes.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    bytes_per_row: usize,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap raw pixel data, validating that every addressable pixel is
    /// inside `data`.
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
        bytes_per_row: usize,
    ) -> FramefitResult<Self> {
        if width == 0 || height == 0 {
            return Err(FramefitError::input("pixel buffer has zero dimensions"));
        }
        if bytes_per_pixel <= ALPHA_OFFSET {
            return Err(FramefitError::input(format!(
                "pixel format too narrow for an alpha channel: {bytes_per_pixel} bytes per pixel"
            )));
        }
        if bytes_per_row < width as usize * bytes_per_pixel {
            return Err(FramefitError::input(format!(
                "row stride {bytes_per_row} too small for width {width}"
            )));
        }
        // The final row needs no padding after its last pixel.
        let required = (height as usize - 1) * bytes_per_row + width as usize * bytes_per_pixel;
        if data.len() < required {
            return Err(FramefitError::input(format!(
                "pixel data truncated: {} bytes, need {required}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            bytes_per_pixel,
            bytes_per_row,
        })
    }

    /// View a decoded RGBA image. `RgbaImage` rows are tightly packed.
    pub fn from_rgba(image: &'a RgbaImage) -> Self {
        Self {
            data: image.as_raw(),
            width: image.width(),
            height: image.height(),
            bytes_per_pixel: 4,
            bytes_per_row: image.width() as usize * 4,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha of the pixel at (x, y). Callers must stay in bounds.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.bytes_per_row + x as usize * self.bytes_per_pixel + ALPHA_OFFSET]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(PixelBuffer::new(&[], 0, 0, 4, 0).is_err());
    }

    #[test]
    fn test_rejects_truncated_data() {
        let data = vec![0u8; 15];
        assert!(PixelBuffer::new(&data, 2, 2, 4, 8).is_err());
        let data = vec![0u8; 16];
        assert!(PixelBuffer::new(&data, 2, 2, 4, 8).is_ok());
    }

    #[test]
    fn test_rejects_narrow_pixel_format() {
        let data = vec![0u8; 64];
        assert!(PixelBuffer::new(&data, 4, 4, 3, 12).is_err());
    }

    #[test]
    fn test_alpha_respects_row_stride() {
        // Two 2-pixel rows with 4 bytes of padding per row.
        let mut data = vec![0u8; 24];
        data[3] = 10; // (0,0)
        data[7] = 20; // (1,0)
        data[12 + 3] = 30; // (0,1)
        data[12 + 7] = 40; // (1,1)
        let buffer = PixelBuffer::new(&data, 2, 2, 4, 12).unwrap();
        assert_eq!(buffer.alpha(0, 0), 10);
        assert_eq!(buffer.alpha(1, 0), 20);
        assert_eq!(buffer.alpha(0, 1), 30);
        assert_eq!(buffer.alpha(1, 1), 40);
    }

    #[test]
    fn test_from_rgba_reads_image_alpha() {
        let mut image = RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 0, 255]));
        image.put_pixel(2, 1, image::Rgba([0, 0, 0, 128]));
        let buffer = PixelBuffer::from_rgba(&image);
        assert_eq!(buffer.alpha(0, 0), 255);
        assert_eq!(buffer.alpha(2, 1), 128);
    }

    #[test]
    fn test_last_row_needs_no_padding() {
        // 2x2 RGBA with stride 12: row 0 padded, row 1 ends at the last pixel.
        let data = vec![0u8; 12 + 8];
        assert!(PixelBuffer::new(&data, 2, 2, 4, 12).is_ok());
    }
}
