//! Check external tools and bezel assets.

use framefit_asset_store::RegionStore;
use framefit_common::AssetPaths;
use framefit_device_model::DeviceCatalog;
use framefit_render_engine::video::command_exists;

pub fn run(assets: AssetPaths) -> anyhow::Result<()> {
    println!("FrameFit System Check");
    println!("{}", "=".repeat(50));

    let mut ready = true;

    // External tools
    for tool in ["ffmpeg", "ffprobe"] {
        if command_exists(tool) {
            println!("[OK] {tool} found on PATH");
        } else {
            ready = false;
            println!("[WARN] {tool} not found; video export will not work");
        }
    }

    // Assets
    println!();
    println!("Assets root: {}", assets.root.display());
    let store = RegionStore::open(&assets);

    match store.library().list_bezels() {
        Ok(bezels) if !bezels.is_empty() => {
            println!("[OK] Bezels: {}", bezels.len());

            let masks = bezels
                .iter()
                .filter(|name| store.mask_path(name).is_some())
                .count();
            if masks == bezels.len() {
                println!("[OK] Masks: {masks}/{} precomputed", bezels.len());
            } else {
                println!("[WARN] Masks: {masks}/{} precomputed", bezels.len());
            }
        }
        Ok(_) => {
            ready = false;
            println!("[WARN] Bezel directory is empty: {}", assets.bezels_dir().display());
        }
        Err(e) => {
            ready = false;
            println!("[WARN] {e}");
        }
    }

    if store.table().is_empty() {
        ready = false;
        println!(
            "[WARN] Region table missing or empty: {}",
            assets.regions_file().display()
        );
    } else {
        println!("[OK] Region table: {} entries", store.table().len());
    }

    // Catalog coverage
    let catalog = DeviceCatalog::builtin();
    let missing = store.verify_catalog(&catalog);
    if missing.is_empty() {
        println!(
            "[OK] All {} catalog devices have precomputed regions",
            catalog.len()
        );
    } else {
        ready = false;
        println!(
            "[WARN] {} catalog bezels missing from the region table:",
            missing.len()
        );
        for name in &missing {
            println!("       - {name}");
        }
        println!("       Run region-gen to rebuild the table.");
    }

    println!();
    if ready {
        println!("FrameFit is ready.");
    } else {
        println!("Some checks failed. See above for fixes.");
    }

    Ok(())
}
