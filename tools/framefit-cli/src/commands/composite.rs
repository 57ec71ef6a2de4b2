//! Frame a screenshot in a device bezel.

use std::path::PathBuf;

use anyhow::Context;
use framefit_asset_store::RegionStore;
use framefit_common::AssetPaths;
use framefit_detect_core::match_devices;
use framefit_device_model::{BackgroundColor, DeviceCatalog, ExportSize, Orientation};
use framefit_render_engine::still::{composite_still, load_image, resize_image, save_png};
use framefit_render_engine::video::is_video_path;

#[allow(clippy::too_many_arguments)]
pub fn run(
    assets: AssetPaths,
    input: PathBuf,
    output: Option<PathBuf>,
    device_id: Option<String>,
    color_id: Option<String>,
    landscape: bool,
    background: Option<String>,
    width: Option<u32>,
) -> anyhow::Result<()> {
    if is_video_path(&input) {
        anyhow::bail!(
            "{} is a video; use: framefit export {}",
            input.display(),
            input.display()
        );
    }

    let screenshot = load_image(&input).context("Could not load image.")?;
    let (shot_width, shot_height) = screenshot.dimensions();

    let store = RegionStore::open(&assets);
    let catalog = store.resolve_catalog(DeviceCatalog::builtin());

    let device = match &device_id {
        Some(id) => catalog
            .device(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown device id: {id}. Run: framefit devices"))?,
        None => {
            let matches = match_devices(shot_width, shot_height, catalog.devices());
            let Some(best) = matches.into_iter().next() else {
                println!("No matching device found for {shot_width}×{shot_height} screenshot.");
                return Ok(());
            };
            best.device
        }
    };

    let orientation = if landscape {
        Orientation::Landscape
    } else {
        Orientation::from_dimensions(shot_width, shot_height)
    };

    let color = match &color_id {
        Some(id) => device.color(id).cloned().ok_or_else(|| {
            let known = device
                .colors
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow::anyhow!("Unknown color {id} for {}. Known: {known}", device.id)
        })?,
        None => device.default_color().clone(),
    };

    let background = background
        .map(|hex| {
            BackgroundColor::parse_hex(&hex)
                .ok_or_else(|| anyhow::anyhow!("Invalid background color: {hex}. Use #RRGGBB"))
        })
        .transpose()?;

    println!("Framing screenshot: {}", input.display());
    println!("  Device: {} ({})", device.display_name, color.id);
    println!("  Orientation: {:?}", orientation);
    tracing::debug!(
        device = %device.id,
        width = shot_width,
        height = shot_height,
        "Compositing still"
    );

    let framed = composite_still(&store, &screenshot, &device, &color, orientation, background)
        .context("Failed to composite image.")?;

    let framed = match width {
        Some(target) => {
            let (native_width, native_height) = framed.dimensions();
            let mut size = ExportSize::native(native_width, native_height);
            size.set_width_preserving_aspect(target);
            if !size.is_high_quality() {
                println!("  Large output ({}x{}); saving may be slow.", size.width, size.height);
            }
            resize_image(&framed, size.width, size.height)?
        }
        None => framed,
    };

    let output_path = output.unwrap_or_else(|| super::default_output_path(&input, "png"));
    save_png(&framed, &output_path)?;

    println!("Framed screenshot saved to: {}", output_path.display());
    Ok(())
}
