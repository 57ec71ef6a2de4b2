//! Inspect a capture file and show matching devices.

use std::path::PathBuf;

use framefit_asset_store::RegionStore;
use framefit_common::AssetPaths;
use framefit_detect_core::match_devices;
use framefit_device_model::DeviceCatalog;
use framefit_render_engine::video::{is_video_path, probe_video};

pub fn run(assets: AssetPaths, input: PathBuf) -> anyhow::Result<()> {
    let store = RegionStore::open(&assets);
    let catalog = store.resolve_catalog(DeviceCatalog::builtin());

    if is_video_path(&input) {
        let info = probe_video(&input).map_err(|e| anyhow::anyhow!("Could not load video: {e}"))?;
        let (display_width, display_height) = info.displayed_dimensions();

        println!("Video: {}", input.display());
        println!("  Natural size: {}x{}", info.width, info.height);
        println!("  Rotation: {} degrees", info.rotation);
        println!("  Displayed size: {display_width}x{display_height}");
        println!(
            "  Duration: {:.2}s @ {:.2} fps",
            info.duration_secs, info.frame_rate
        );
        println!("  Audio: {}", if info.has_audio { "yes" } else { "no" });

        print_matches(display_width, display_height, &catalog);
    } else {
        let (width, height) =
            image::image_dimensions(&input).map_err(|_| anyhow::anyhow!("Could not load image."))?;

        println!("Image: {}", input.display());
        println!("  Size: {width}x{height}");

        print_matches(width, height, &catalog);
    }

    Ok(())
}

fn print_matches(width: u32, height: u32, catalog: &DeviceCatalog) {
    let matches = match_devices(width, height, catalog.devices());
    if matches.is_empty() {
        println!("  Matches: none");
        return;
    }

    println!("  Matches:");
    for candidate in &matches {
        println!(
            "    {:<16} {:<24} {:?}",
            candidate.device.id, candidate.device.display_name, candidate.orientation
        );
    }
}
