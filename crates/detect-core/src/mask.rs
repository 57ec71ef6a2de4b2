//! Screen-mask detection: the exact screen-hole shape, anti-aliased
//! edge band included.

use image::GrayImage;

use crate::pixels::PixelBuffer;

/// Build a grayscale mask of the bezel's screen hole.
///
/// White (0xFF) marks pixels content may occupy, black (0x00) everything
/// else. Requires the same transparent-center precondition as region
/// detection; returns `None` when it does not hold.
///
/// Phase 1 floods through fully-transparent (alpha == 0) pixels from the
/// center. When it hits a semi-transparent pixel (0 < alpha < 255) it
/// records it as an edge candidate instead of stopping silently. Phase 2
/// expands from those candidates through connected semi-transparent
/// pixels: the anti-aliased border needs content at full opacity behind
/// it so the bezel's own partial alpha performs the blend when drawn on
/// top. Phase 2 stops at fully-opaque and fully-transparent pixels, so
/// it cannot leak into the transparent margin outside the artwork.
pub fn detect_screen_mask(buffer: &PixelBuffer<'_>) -> Option<GrayImage> {
    let width = buffer.width() as i64;
    let height = buffer.height() as i64;

    let start_x = width / 2;
    let start_y = height / 2;

    if buffer.alpha(start_x as u32, start_y as u32) != 0 {
        tracing::debug!("center pixel is not transparent, no screen mask");
        return None;
    }

    // Phase 1: interior.
    let mut visited = vec![false; (width * height) as usize];
    let mut stack: Vec<(i64, i64)> = vec![(start_x, start_y)];
    let mut edge_candidates: Vec<(i64, i64)> = Vec::new();

    while let Some((x, y)) = stack.pop() {
        if x < 0 || x >= width || y < 0 || y >= height {
            continue;
        }
        let idx = (y * width + x) as usize;
        if visited[idx] {
            continue;
        }
        let alpha = buffer.alpha(x as u32, y as u32);
        if alpha != 0 {
            if alpha < 255 {
                edge_candidates.push((x, y));
            }
            continue;
        }

        visited[idx] = true;

        stack.push((x - 1, y));
        stack.push((x + 1, y));
        stack.push((x, y - 1));
        stack.push((x, y + 1));
    }

    // Phase 2: anti-aliased edge band.
    let mut edge_stack = edge_candidates;
    while let Some((x, y)) = edge_stack.pop() {
        if x < 0 || x >= width || y < 0 || y >= height {
            continue;
        }
        let idx = (y * width + x) as usize;
        if visited[idx] {
            continue;
        }
        let alpha = buffer.alpha(x as u32, y as u32);
        if alpha == 0 || alpha == 255 {
            continue;
        }

        visited[idx] = true;

        edge_stack.push((x - 1, y));
        edge_stack.push((x + 1, y));
        edge_stack.push((x, y - 1));
        edge_stack.push((x, y + 1));
    }

    let mask_pixels: Vec<u8> = visited.iter().map(|&v| if v { 0xFF } else { 0x00 }).collect();

    GrayImage::from_raw(buffer.width(), buffer.height(), mask_pixels)
}
