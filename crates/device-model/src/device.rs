//! Device catalog entry types.

use serde::{Deserialize, Serialize};

use crate::geometry::{Orientation, PixelRect};

/// A color variant of a device's bezel artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceColor {
    pub id: String,
    pub display_name: String,
    /// Component used when deriving bezel asset filenames.
    pub file_component: String,
}

impl DeviceColor {
    /// Color whose id and file component both equal its name.
    pub fn named(name: &str) -> Self {
        Self {
            id: name.to_string(),
            display_name: name.to_string(),
            file_component: name.to_string(),
        }
    }

    /// Color whose bezel files use a component different from the name.
    pub fn named_with_file(name: &str, file: &str) -> Self {
        Self {
            id: name.to_string(),
            display_name: name.to_string(),
            file_component: file.to_string(),
        }
    }
}

/// One entry in the device catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDefinition {
    pub id: String,
    pub display_name: String,
    /// Available color variants, never empty.
    pub colors: Vec<DeviceColor>,
    /// Must reference a color in `colors`.
    pub default_color_id: String,
    /// Leading component of this device's bezel asset filenames.
    pub bezel_file_prefix: String,
    /// Portrait screen cutout, populated from the region table after
    /// construction. `None` until resolved.
    pub screen_region: Option<PixelRect>,
}

impl DeviceDefinition {
    pub fn new(
        id: &str,
        display_name: &str,
        colors: Vec<DeviceColor>,
        default_color_id: &str,
        bezel_file_prefix: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            colors,
            default_color_id: default_color_id.to_string(),
            bezel_file_prefix: bezel_file_prefix.to_string(),
            screen_region: None,
        }
    }

    /// The color referenced by `default_color_id`, falling back to the
    /// first color if the id is unknown. The fallback never fires for a
    /// well-formed catalog entry.
    pub fn default_color(&self) -> &DeviceColor {
        self.colors
            .iter()
            .find(|c| c.id == self.default_color_id)
            .unwrap_or(&self.colors[0])
    }

    pub fn color(&self, id: &str) -> Option<&DeviceColor> {
        self.colors.iter().find(|c| c.id == id)
    }

    /// Bezel asset filename for a color and orientation:
    /// `{prefix} - {color} - {Portrait|Landscape}.png`.
    pub fn bezel_file_name(&self, color: &DeviceColor, orientation: Orientation) -> String {
        format!(
            "{} - {} - {}.png",
            self.bezel_file_prefix,
            color.file_component,
            orientation.file_component()
        )
    }

    /// Bezel filename for the default color.
    pub fn default_bezel_file_name(&self, orientation: Orientation) -> String {
        self.bezel_file_name(self.default_color(), orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_device() -> DeviceDefinition {
        DeviceDefinition::new(
            "iphone14",
            "iPhone 14",
            vec![
                DeviceColor::named("Blue"),
                DeviceColor::named("Midnight"),
                DeviceColor::named("Starlight"),
            ],
            "Midnight",
            "iPhone 14",
        )
    }

    #[test]
    fn test_default_color_resolves_by_id() {
        let device = sample_device();
        assert_eq!(device.default_color().id, "Midnight");
    }

    #[test]
    fn test_default_color_falls_back_to_first() {
        let mut device = sample_device();
        device.default_color_id = "Nonexistent".to_string();
        assert_eq!(device.default_color().id, "Blue");
    }

    #[test]
    fn test_bezel_file_name_format() {
        let device = sample_device();
        let color = device.color("Midnight").unwrap();
        assert_eq!(
            device.bezel_file_name(color, Orientation::Portrait),
            "iPhone 14 - Midnight - Portrait.png"
        );
        assert_eq!(
            device.bezel_file_name(color, Orientation::Landscape),
            "iPhone 14 - Midnight - Landscape.png"
        );
    }

    #[test]
    fn test_color_lookup() {
        let device = sample_device();
        assert!(device.color("Blue").is_some());
        assert!(device.color("Gold").is_none());
    }
}
