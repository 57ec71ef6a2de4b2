//! Still compositing: one screenshot into one bezel frame.

use std::path::Path;

use framefit_asset_store::RegionStore;
use framefit_common::{FramefitError, FramefitResult};
use framefit_device_model::{BackgroundColor, DeviceColor, DeviceDefinition, Orientation, PixelRect};
use image::{imageops, GrayImage, Rgba, RgbaImage};

/// Composite a screenshot into a device bezel.
///
/// The output canvas has the bezel's pixel dimensions. The screenshot is
/// drawn at native size, centered on the screen cutout, clipped to the
/// screen mask when one is available, and the bezel is drawn on top so
/// its anti-aliased edges blend over the screenshot. An optional
/// background fill replaces the transparent margin for targets that
/// cannot represent alpha.
pub fn composite_still(
    store: &RegionStore,
    screenshot: &RgbaImage,
    device: &DeviceDefinition,
    color: &DeviceColor,
    orientation: Orientation,
    background: Option<BackgroundColor>,
) -> FramefitResult<RgbaImage> {
    let bezel_file = device.bezel_file_name(color, orientation);
    let bezel = store.library().load_bezel(&bezel_file)?;
    let (bezel_width, bezel_height) = bezel.dimensions();

    let region = store
        .resolve_screen_region(device, color, orientation)
        .ok_or_else(|| FramefitError::region_not_found(&bezel_file))?;

    let mut canvas = match background {
        Some(fill) => RgbaImage::from_pixel(bezel_width, bezel_height, Rgba(fill.to_rgba())),
        None => RgbaImage::new(bezel_width, bezel_height),
    };

    // A missing mask is not fatal; the bezel on top still hides the
    // straight edges for rectangular cutouts.
    let mask = match store.screen_mask(&bezel_file) {
        Some(mask) if mask.dimensions() == (bezel_width, bezel_height) => Some(mask),
        Some(_) => {
            tracing::warn!(
                "Screen mask size does not match bezel {}, drawing unclipped",
                bezel_file
            );
            None
        }
        None => None,
    };

    draw_screenshot(&mut canvas, screenshot, region, mask.as_deref());
    imageops::overlay(&mut canvas, &bezel, 0, 0);

    tracing::debug!(
        bezel = %bezel_file,
        screenshot_width = screenshot.width(),
        screenshot_height = screenshot.height(),
        "Composited still"
    );
    Ok(canvas)
}

/// Resize with Lanczos filtering. The caller is responsible for passing
/// dimensions that preserve the aspect ratio.
pub fn resize_image(image: &RgbaImage, width: u32, height: u32) -> FramefitResult<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(FramefitError::composition("Resize target must be non-zero"));
    }
    Ok(imageops::resize(image, width, height, imageops::FilterType::Lanczos3))
}

pub fn load_image(path: &Path) -> FramefitResult<RgbaImage> {
    let image = image::open(path)
        .map_err(|err| FramefitError::input(format!("Could not load image: {err}")))?;
    Ok(image.to_rgba8())
}

pub fn save_png(image: &RgbaImage, path: &Path) -> FramefitResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Draw the screenshot centered on the screen region, blending through
/// the mask's coverage. Pixels falling outside the canvas are skipped,
/// which handles screenshots admitted under the matcher's tolerance.
fn draw_screenshot(
    canvas: &mut RgbaImage,
    screenshot: &RgbaImage,
    region: PixelRect,
    mask: Option<&GrayImage>,
) {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let (shot_width, shot_height) = screenshot.dimensions();
    let draw_x = region.x as i64 + (region.width as i64 - shot_width as i64) / 2;
    let draw_y = region.y as i64 + (region.height as i64 - shot_height as i64) / 2;

    for sy in 0..shot_height {
        let cy = draw_y + sy as i64;
        if cy < 0 || cy >= canvas_height as i64 {
            continue;
        }
        for sx in 0..shot_width {
            let cx = draw_x + sx as i64;
            if cx < 0 || cx >= canvas_width as i64 {
                continue;
            }

            let coverage = match mask {
                Some(mask) => mask.get_pixel(cx as u32, cy as u32).0[0] as u32,
                None => 255,
            };
            if coverage == 0 {
                continue;
            }

            let mut src = *screenshot.get_pixel(sx, sy);
            if coverage < 255 {
                src.0[3] = ((src.0[3] as u32 * coverage + 127) / 255) as u8;
            }
            blend_over(canvas.get_pixel_mut(cx as u32, cy as u32), src);
        }
    }
}

/// Non-premultiplied source-over blend.
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let src_a = src.0[3] as u32;
    if src_a == 0 {
        return;
    }
    if src_a == 255 {
        *dst = src;
        return;
    }

    let dst_a = dst.0[3] as u32;
    // 255 * resulting alpha; exact rational blend to avoid drift.
    let out_a_num = src_a * 255 + dst_a * (255 - src_a);
    if out_a_num == 0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let num = src.0[channel] as u32 * src_a * 255 + dst.0[channel] as u32 * dst_a * (255 - src_a);
        out[channel] = ((num + out_a_num / 2) / out_a_num) as u8;
    }
    out[3] = ((out_a_num + 127) / 255) as u8;
    *dst = Rgba(out);
}
