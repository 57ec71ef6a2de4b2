//! Offline generator for the screen-region table and mask files.
//!
//! Flood-fills every artwork in the bezel directory and persists the
//! results so runtime lookups never need live detection:
//!
//!   <assets>/screen-regions.json   bezel filename -> screen rectangle
//!   <assets>/masks/<bezel>.png     one grayscale mask per bezel
//!
//! Incremental by default: existing table entries are kept, and mask
//! files are kept while at least as new as their source bezel.
//! `--force` regenerates everything. Entries whose source bezel no
//! longer exists are pruned. Exits non-zero when any bezel fails
//! detection.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;
use clap::Parser;
use framefit_asset_store::{BezelLibrary, RegionTable};
use framefit_common::{AppConfig, AssetPaths, ASSETS_ENV_VAR};
use framefit_detect_core::{detect_screen_mask, detect_screen_region, PixelBuffer};
use framefit_device_model::PixelRect;
use image::GrayImage;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate the precomputed screen-region table and mask files"
)]
struct Args {
    /// Asset root directory holding bezels/, masks/, screen-regions.json
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Regenerate everything, ignoring existing entries and mask files
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    framefit_common::logging::init_default_logging();

    let args = Args::parse();
    let assets = resolve_assets(args.assets);

    let library = BezelLibrary::new(assets.bezels_dir());
    let bezel_names = match library.list_bezels() {
        Ok(names) if !names.is_empty() => names,
        Ok(_) => {
            eprintln!("No bezel images found in {}", library.dir().display());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let on_disk: HashSet<&str> = bezel_names.iter().map(String::as_str).collect();

    // Regions.
    let mut table = if args.force {
        RegionTable::new()
    } else {
        match RegionTable::load(&assets.regions_file()) {
            Ok(table) => table,
            Err(e) => {
                tracing::debug!("Starting a fresh region table: {e}");
                RegionTable::new()
            }
        }
    };

    let pruned = table.retain_files(|name| on_disk.contains(name));

    let mut new_regions = 0usize;
    let mut skipped_regions = 0usize;
    let mut failures: Vec<String> = Vec::new();

    for name in &bezel_names {
        if table.contains(name) {
            skipped_regions += 1;
            continue;
        }
        match detect_region(&library, name) {
            Some(rect) => {
                tracing::info!(
                    bezel = %name,
                    x = rect.x,
                    y = rect.y,
                    width = rect.width,
                    height = rect.height,
                    "Detected screen region"
                );
                table.insert(name.clone(), rect);
                new_regions += 1;
            }
            None => failures.push(name.clone()),
        }
    }

    table.save(&assets.regions_file())?;
    println!(
        "Screen regions: {} total, {} new, {} skipped, {} pruned",
        table.len(),
        new_regions,
        skipped_regions,
        pruned
    );

    if !failures.is_empty() {
        eprintln!("Failed bezels ({}):", failures.len());
        for name in &failures {
            eprintln!("  - {name}");
        }
        std::process::exit(1);
    }

    // Masks.
    let masks_dir = assets.masks_dir();
    std::fs::create_dir_all(&masks_dir)?;

    for entry in std::fs::read_dir(&masks_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if path.is_file() && is_png && !on_disk.contains(name) {
            std::fs::remove_file(&path)?;
            tracing::info!(mask = %name, "Pruned stale mask");
        }
    }

    let mut new_masks = 0usize;
    let mut skipped_masks = 0usize;
    let mut mask_failures: Vec<String> = Vec::new();

    for name in &bezel_names {
        let mask_path = masks_dir.join(name);
        if !args.force && mask_is_current(&mask_path, &library, name) {
            skipped_masks += 1;
            continue;
        }
        match detect_mask(&library, name) {
            Some(mask) => match mask.save(&mask_path) {
                Ok(()) => new_masks += 1,
                Err(e) => {
                    tracing::warn!("Cannot save mask for {}: {}", name, e);
                    mask_failures.push(name.clone());
                }
            },
            None => mask_failures.push(name.clone()),
        }
    }

    println!(
        "Screen masks: {} total, {} new, {} skipped",
        new_masks + skipped_masks,
        new_masks,
        skipped_masks
    );

    if !mask_failures.is_empty() {
        eprintln!("Failed masks ({}):", mask_failures.len());
        for name in &mask_failures {
            eprintln!("  - {name}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn detect_region(library: &BezelLibrary, name: &str) -> Option<PixelRect> {
    let bezel = match library.load_bezel(name) {
        Ok(bezel) => bezel,
        Err(e) => {
            tracing::warn!("Cannot load {}: {}", name, e);
            return None;
        }
    };
    detect_screen_region(&PixelBuffer::from_rgba(&bezel))
}

fn detect_mask(library: &BezelLibrary, name: &str) -> Option<GrayImage> {
    let bezel = library.load_bezel(name).ok()?;
    detect_screen_mask(&PixelBuffer::from_rgba(&bezel))
}

/// A mask is current when it exists and is at least as new as its
/// source bezel.
fn mask_is_current(mask_path: &Path, library: &BezelLibrary, name: &str) -> bool {
    let Some(bezel_path) = library.bezel_path(name) else {
        return false;
    };
    match (modified_time(mask_path), modified_time(&bezel_path)) {
        (Some(mask_time), Some(bezel_time)) => mask_time >= bezel_time,
        _ => false,
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.modified().ok()
}

/// Asset root precedence: `--assets` flag, then `FRAMEFIT_ASSETS`, then
/// the config file, then the platform default.
fn resolve_assets(flag: Option<PathBuf>) -> AssetPaths {
    if let Some(root) = flag {
        return AssetPaths::with_root(root);
    }
    if let Ok(root) = std::env::var(ASSETS_ENV_VAR) {
        return AssetPaths::with_root(root);
    }
    AppConfig::load().assets
}
