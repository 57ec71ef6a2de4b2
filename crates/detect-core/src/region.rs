//! Screen-region detection by alpha-channel flood fill.

use framefit_device_model::PixelRect;

use crate::pixels::PixelBuffer;

/// Regions with a side at or below this are alpha holes unrelated to the
/// screen cutout.
pub const MIN_REGION_DIMENSION: u32 = 100;

/// Find the bounding box of a bezel's transparent screen cutout.
///
/// Flood-fills from the image center outward through connected
/// fully-transparent (alpha == 0) pixels; the bounding box of all filled
/// pixels is the screen region. The center is expected to sit inside the
/// screen area, so a non-transparent center means there is no region.
/// Returns `None` for that and for undersized results; both are
/// expected negative outcomes, not errors.
pub fn detect_screen_region(buffer: &PixelBuffer<'_>) -> Option<PixelRect> {
    let width = buffer.width() as i64;
    let height = buffer.height() as i64;

    let start_x = width / 2;
    let start_y = height / 2;

    if buffer.alpha(start_x as u32, start_y as u32) != 0 {
        tracing::debug!("center pixel is not transparent, no screen region");
        return None;
    }

    let mut visited = vec![false; (width * height) as usize];
    let mut stack: Vec<(i64, i64)> = vec![(start_x, start_y)];

    let (mut min_x, mut max_x) = (start_x, start_x);
    let (mut min_y, mut max_y) = (start_y, start_y);

    while let Some((x, y)) = stack.pop() {
        if x < 0 || x >= width || y < 0 || y >= height {
            continue;
        }
        let idx = (y * width + x) as usize;
        if visited[idx] {
            continue;
        }
        if buffer.alpha(x as u32, y as u32) != 0 {
            continue;
        }

        visited[idx] = true;

        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);

        stack.push((x - 1, y));
        stack.push((x + 1, y));
        stack.push((x, y - 1));
        stack.push((x, y + 1));
    }

    // Bounding box is inclusive on all sides.
    let rect = PixelRect::new(
        min_x as u32,
        min_y as u32,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    );

    if rect.width <= MIN_REGION_DIMENSION || rect.height <= MIN_REGION_DIMENSION {
        tracing::debug!(
            width = rect.width,
            height = rect.height,
            "detected hole too small to be a screen region"
        );
        return None;
    }

    Some(rect)
}
