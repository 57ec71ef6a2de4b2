//! List the known devices.

use framefit_asset_store::RegionStore;
use framefit_common::AssetPaths;
use framefit_device_model::DeviceCatalog;

pub fn run(assets: AssetPaths) -> anyhow::Result<()> {
    let store = RegionStore::open(&assets);
    let catalog = store.resolve_catalog(DeviceCatalog::builtin());

    println!("Known devices ({}):", catalog.len());
    for device in catalog.iter() {
        let region = match device.screen_region {
            Some(r) => format!("{}x{}", r.width, r.height),
            None => "unresolved".to_string(),
        };
        println!(
            "  {:<16} {:<24} {}",
            device.id, device.display_name, region
        );

        let colors = device
            .colors
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {:<16} colors: {} (default: {})",
            "", colors, device.default_color_id
        );
    }

    Ok(())
}
