//! Read-through store combining the persisted region table with
//! runtime detection fallback.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use framefit_common::AssetPaths;
use framefit_detect_core::{detect_screen_mask, detect_screen_region, PixelBuffer};
use framefit_device_model::{DeviceCatalog, DeviceColor, DeviceDefinition, Orientation, PixelRect};
use image::GrayImage;

use crate::library::BezelLibrary;
use crate::regions::RegionTable;

type LiveCell<T> = Arc<OnceLock<Option<T>>>;

/// Regions and masks for the bezel library.
///
/// Lookups hit the precomputed table first. On a miss the store runs
/// detection against the bezel pixels, at most once per filename; the
/// result (including a failed detection) is cached for the lifetime of
/// the store.
pub struct RegionStore {
    library: BezelLibrary,
    masks_dir: PathBuf,
    table: RegionTable,
    live_regions: Mutex<HashMap<String, LiveCell<PixelRect>>>,
    live_masks: Mutex<HashMap<String, LiveCell<Arc<GrayImage>>>>,
}

impl RegionStore {
    /// Open the store rooted at `paths`. A missing or unreadable region
    /// table is not fatal; the store starts empty and every lookup goes
    /// through runtime detection.
    pub fn open(paths: &AssetPaths) -> Self {
        let regions_file = paths.regions_file();
        let table = match RegionTable::load(&regions_file) {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(
                    "Cannot read region table at {}: {}",
                    regions_file.display(),
                    err
                );
                RegionTable::new()
            }
        };
        tracing::debug!(regions = table.len(), "Opened region store");

        Self {
            library: BezelLibrary::new(paths.bezels_dir()),
            masks_dir: paths.masks_dir(),
            table,
            live_regions: Mutex::new(HashMap::new()),
            live_masks: Mutex::new(HashMap::new()),
        }
    }

    pub fn library(&self) -> &BezelLibrary {
        &self.library
    }

    pub fn table(&self) -> &RegionTable {
        &self.table
    }

    /// Screen region for a bezel filename.
    pub fn screen_region(&self, file_name: &str) -> Option<PixelRect> {
        if let Some(rect) = self.table.get(file_name) {
            return Some(rect);
        }

        let cell = self.live_cell(&self.live_regions, file_name);
        *cell.get_or_init(|| {
            tracing::warn!(
                "No precomputed region for {}, falling back to runtime detection",
                file_name
            );
            self.detect_region_live(file_name)
        })
    }

    /// Screen mask for a bezel filename, preferring the mask file on
    /// disk over runtime detection.
    pub fn screen_mask(&self, file_name: &str) -> Option<Arc<GrayImage>> {
        let cell = self.live_cell(&self.live_masks, file_name);
        cell.get_or_init(|| self.load_or_detect_mask(file_name)).clone()
    }

    /// Path of the precomputed mask file, when one exists on disk.
    pub fn mask_path(&self, file_name: &str) -> Option<PathBuf> {
        let path = self.masks_dir.join(file_name);
        path.is_file().then_some(path)
    }

    /// Region for a device in a given color and orientation.
    ///
    /// Portrait uses the device's resolved region. Landscape prefers an
    /// entry for the landscape bezel of the chosen color and otherwise
    /// swaps the portrait region's axes.
    pub fn resolve_screen_region(
        &self,
        device: &DeviceDefinition,
        color: &DeviceColor,
        orientation: Orientation,
    ) -> Option<PixelRect> {
        match orientation {
            Orientation::Portrait => device.screen_region,
            Orientation::Landscape => {
                let landscape_file = device.bezel_file_name(color, Orientation::Landscape);
                self.screen_region(&landscape_file)
                    .or_else(|| device.screen_region.map(|rect| rect.swapped()))
            }
        }
    }

    /// Populate `screen_region` on every catalog entry from the default
    /// color's portrait bezel.
    pub fn resolve_catalog(&self, catalog: DeviceCatalog) -> DeviceCatalog {
        let devices = catalog
            .into_devices()
            .into_iter()
            .map(|mut device| {
                let file_name = device.default_bezel_file_name(Orientation::Portrait);
                device.screen_region = self.screen_region(&file_name);
                if device.screen_region.is_none() {
                    tracing::warn!(device = %device.id, "No screen region resolved");
                }
                device
            })
            .collect();
        DeviceCatalog::from_devices(devices)
    }

    /// Catalog bezels with no precomputed region entry. Checks the table
    /// only; runtime detection is not attempted.
    pub fn verify_catalog(&self, catalog: &DeviceCatalog) -> Vec<String> {
        catalog
            .devices()
            .iter()
            .map(|device| device.default_bezel_file_name(Orientation::Portrait))
            .filter(|file_name| !self.table.contains(file_name))
            .collect()
    }

    fn live_cell<T>(
        &self,
        map: &Mutex<HashMap<String, LiveCell<T>>>,
        file_name: &str,
    ) -> LiveCell<T> {
        let mut live = map.lock().unwrap();
        live.entry(file_name.to_string()).or_default().clone()
    }

    fn detect_region_live(&self, file_name: &str) -> Option<PixelRect> {
        let bezel = match self.library.load_bezel(file_name) {
            Ok(bezel) => bezel,
            Err(err) => {
                tracing::warn!("Cannot load {} for runtime detection: {}", file_name, err);
                return None;
            }
        };
        let pixels = PixelBuffer::from_rgba(&bezel);
        detect_screen_region(&pixels)
    }

    fn load_or_detect_mask(&self, file_name: &str) -> Option<Arc<GrayImage>> {
        let mask_path = self.masks_dir.join(file_name);
        if mask_path.is_file() {
            match image::open(&mask_path) {
                Ok(mask) => return Some(Arc::new(mask.to_luma8())),
                Err(err) => {
                    tracing::warn!("Cannot decode mask {}: {}", mask_path.display(), err);
                }
            }
        }

        tracing::warn!(
            "No precomputed mask for {}, falling back to runtime detection",
            file_name
        );
        let bezel = self.library.load_bezel(file_name).ok()?;
        let pixels = PixelBuffer::from_rgba(&bezel);
        detect_screen_mask(&pixels).map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framefit_device_model::DeviceColor;
    use image::{Rgba, RgbaImage};
    use std::path::Path;

    const HOLE: PixelRect = PixelRect {
        x: 100,
        y: 150,
        width: 200,
        height: 300,
    };

    fn make_bezel(width: u32, height: u32, hole: PixelRect) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(width, height, Rgba([30, 30, 30, 255]));
        for y in hole.y..hole.bottom() {
            for x in hole.x..hole.right() {
                image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        image
    }

    fn write_bezel(paths: &AssetPaths, file_name: &str) {
        std::fs::create_dir_all(paths.bezels_dir()).unwrap();
        make_bezel(400, 600, HOLE)
            .save(paths.bezels_dir().join(file_name))
            .unwrap();
    }

    fn paths_in(dir: &Path) -> AssetPaths {
        AssetPaths::with_root(dir)
    }

    fn test_device(region: Option<PixelRect>) -> DeviceDefinition {
        let mut device = DeviceDefinition::new(
            "testphone",
            "Test Phone",
            vec![DeviceColor::named("Black")],
            "Black",
            "Test Phone",
        );
        device.screen_region = region;
        device
    }

    #[test]
    fn test_table_entry_wins_over_detection() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let mut table = RegionTable::new();
        table.insert("a.png", PixelRect::new(1, 2, 300, 400));
        table.save(&paths.regions_file()).unwrap();

        let store = RegionStore::open(&paths);
        assert_eq!(store.screen_region("a.png"), Some(PixelRect::new(1, 2, 300, 400)));
    }

    #[test]
    fn test_fallback_detects_from_bezel_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        write_bezel(&paths, "fresh.png");

        let store = RegionStore::open(&paths);
        assert_eq!(store.screen_region("fresh.png"), Some(HOLE));
    }

    #[test]
    fn test_fallback_runs_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        write_bezel(&paths, "cached.png");

        let store = RegionStore::open(&paths);
        assert_eq!(store.screen_region("cached.png"), Some(HOLE));

        // A second lookup must serve the cached result, not re-detect.
        std::fs::remove_file(paths.bezels_dir().join("cached.png")).unwrap();
        assert_eq!(store.screen_region("cached.png"), Some(HOLE));
    }

    #[test]
    fn test_failed_detection_is_cached_too() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let store = RegionStore::open(&paths);
        assert_eq!(store.screen_region("late.png"), None);

        // The bezel appearing later does not retrigger detection.
        write_bezel(&paths, "late.png");
        assert_eq!(store.screen_region("late.png"), None);
    }

    #[test]
    fn test_screen_mask_prefers_mask_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        std::fs::create_dir_all(paths.masks_dir()).unwrap();

        let mut mask = GrayImage::new(4, 4);
        mask.put_pixel(1, 1, image::Luma([255]));
        mask.save(paths.masks_dir().join("m.png")).unwrap();

        let store = RegionStore::open(&paths);
        let loaded = store.screen_mask("m.png").unwrap();
        assert_eq!(loaded.dimensions(), (4, 4));
        assert_eq!(loaded.get_pixel(1, 1).0[0], 255);
        assert_eq!(loaded.get_pixel(0, 0).0[0], 0);

        assert!(store.mask_path("m.png").is_some());
        assert!(store.mask_path("other.png").is_none());
    }

    #[test]
    fn test_screen_mask_falls_back_to_detection() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        write_bezel(&paths, "nomask.png");

        let store = RegionStore::open(&paths);
        let mask = store.screen_mask("nomask.png").unwrap();
        assert_eq!(mask.dimensions(), (400, 600));
        assert_eq!(mask.get_pixel(200, 300).0[0], 255);
        assert_eq!(mask.get_pixel(10, 10).0[0], 0);
    }

    #[test]
    fn test_screen_mask_missing_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(&paths_in(dir.path()));
        assert!(store.screen_mask("ghost.png").is_none());
    }

    #[test]
    fn test_resolve_portrait_uses_device_region() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(&paths_in(dir.path()));

        let region = PixelRect::new(60, 59, 1170, 2532);
        let device = test_device(Some(region));
        let color = device.default_color().clone();

        assert_eq!(
            store.resolve_screen_region(&device, &color, Orientation::Portrait),
            Some(region)
        );
    }

    #[test]
    fn test_resolve_landscape_prefers_store_entry() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let landscape = PixelRect::new(59, 60, 2532, 1170);
        let mut table = RegionTable::new();
        table.insert("Test Phone - Black - Landscape.png", landscape);
        table.save(&paths.regions_file()).unwrap();

        let store = RegionStore::open(&paths);
        let device = test_device(Some(PixelRect::new(1, 2, 3, 4)));
        let color = device.default_color().clone();

        assert_eq!(
            store.resolve_screen_region(&device, &color, Orientation::Landscape),
            Some(landscape)
        );
    }

    #[test]
    fn test_resolve_landscape_swaps_portrait_region() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(&paths_in(dir.path()));

        let portrait = PixelRect::new(60, 59, 1170, 2532);
        let device = test_device(Some(portrait));
        let color = device.default_color().clone();

        assert_eq!(
            store.resolve_screen_region(&device, &color, Orientation::Landscape),
            Some(PixelRect::new(59, 60, 2532, 1170))
        );
    }

    #[test]
    fn test_resolve_catalog_fills_regions() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let region = PixelRect::new(10, 20, 500, 900);
        let mut table = RegionTable::new();
        table.insert("Test Phone - Black - Portrait.png", region);
        table.save(&paths.regions_file()).unwrap();

        let store = RegionStore::open(&paths);
        let catalog = DeviceCatalog::from_devices(vec![test_device(None)]);
        let resolved = store.resolve_catalog(catalog);

        assert_eq!(resolved.devices()[0].screen_region, Some(region));
    }

    #[test]
    fn test_verify_catalog_reports_missing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let mut covered = DeviceDefinition::new(
            "covered",
            "Covered",
            vec![DeviceColor::named("Blue")],
            "Blue",
            "Covered",
        );
        covered.screen_region = None;
        let missing = test_device(None);

        let mut table = RegionTable::new();
        table.insert("Covered - Blue - Portrait.png", PixelRect::new(0, 0, 200, 200));
        table.save(&paths.regions_file()).unwrap();

        let store = RegionStore::open(&paths);
        let catalog = DeviceCatalog::from_devices(vec![covered, missing]);

        assert_eq!(
            store.verify_catalog(&catalog),
            vec!["Test Phone - Black - Portrait.png".to_string()]
        );
    }
}
