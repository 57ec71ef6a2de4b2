//! Bezel artwork lookup and decoding.

use std::path::{Path, PathBuf};

use framefit_common::{FramefitError, FramefitResult};
use image::RgbaImage;

/// Filesystem view of the bezel artwork directory.
#[derive(Debug, Clone)]
pub struct BezelLibrary {
    bezels_dir: PathBuf,
}

impl BezelLibrary {
    pub fn new(bezels_dir: impl Into<PathBuf>) -> Self {
        Self {
            bezels_dir: bezels_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.bezels_dir
    }

    /// Full path of a bezel file, or `None` when it does not exist.
    pub fn bezel_path(&self, file_name: &str) -> Option<PathBuf> {
        let path = self.bezels_dir.join(file_name);
        path.is_file().then_some(path)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.bezel_path(file_name).is_some()
    }

    /// Decode a bezel into an RGBA buffer.
    pub fn load_bezel(&self, file_name: &str) -> FramefitResult<RgbaImage> {
        let path = self
            .bezel_path(file_name)
            .ok_or_else(|| FramefitError::bezel_not_found(file_name))?;
        let image = image::open(&path)
            .map_err(|e| FramefitError::asset(format!("failed to decode bezel {file_name}: {e}")))?;
        Ok(image.to_rgba8())
    }

    /// All bezel PNG filenames, sorted.
    pub fn list_bezels(&self) -> FramefitResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.bezels_dir).map_err(|e| {
            FramefitError::asset(format!(
                "cannot read bezel directory {}: {e}",
                self.bezels_dir.display()
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_png = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if !is_png || !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn write_png(dir: &Path, name: &str) {
        let image = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        image.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_bezel_path_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "iPhone 14 - Midnight - Portrait.png");
        let library = BezelLibrary::new(dir.path());

        assert!(library.contains("iPhone 14 - Midnight - Portrait.png"));
        assert!(!library.contains("iPhone 14 - Midnight - Landscape.png"));
    }

    #[test]
    fn test_load_missing_bezel_is_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let library = BezelLibrary::new(dir.path());

        let err = library.load_bezel("missing.png").unwrap_err();
        assert!(matches!(
            err,
            FramefitError::BezelNotFound { ref name } if name == "missing.png"
        ));
    }

    #[test]
    fn test_load_decodes_rgba() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "bezel.png");
        let library = BezelLibrary::new(dir.path());

        let image = library.load_bezel("bezel.png").unwrap();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_corrupt_bezel_is_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let library = BezelLibrary::new(dir.path());

        let err = library.load_bezel("broken.png").unwrap_err();
        assert!(matches!(err, FramefitError::Asset { .. }));
    }

    #[test]
    fn test_list_bezels_sorted_png_only() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png");
        write_png(dir.path(), "a.PNG");
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let library = BezelLibrary::new(dir.path());

        assert_eq!(library.list_bezels().unwrap(), vec!["a.PNG", "b.png"]);
    }
}
