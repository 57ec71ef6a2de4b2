//! Show devices matching a capture resolution.

use framefit_asset_store::RegionStore;
use framefit_common::AssetPaths;
use framefit_detect_core::{match_devices, match_devices_exact};
use framefit_device_model::DeviceCatalog;

pub fn run(assets: AssetPaths, width: u32, height: u32, exact: bool) -> anyhow::Result<()> {
    let store = RegionStore::open(&assets);
    let catalog = store.resolve_catalog(DeviceCatalog::builtin());

    let matches = if exact {
        match_devices_exact(width, height, catalog.devices())
    } else {
        match_devices(width, height, catalog.devices())
    };

    if matches.is_empty() {
        println!("No matching device found for {width}×{height} screenshot.");
        return Ok(());
    }

    println!("Matches for {width}x{height}:");
    for candidate in &matches {
        println!(
            "  {:<16} {:<24} {:?}",
            candidate.device.id, candidate.device.display_name, candidate.orientation
        );
    }

    Ok(())
}
