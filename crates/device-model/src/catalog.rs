//! The builtin device registry.
//!
//! Catalog order matters: the matcher returns candidates in reverse
//! catalog order, so newer devices must be appended after older ones to
//! win ties when generations share identical screen dimensions.

use crate::device::{DeviceColor, DeviceDefinition};

/// Immutable ordered registry of known devices.
#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    devices: Vec<DeviceDefinition>,
}

impl DeviceCatalog {
    /// The builtin catalog, oldest device families first.
    pub fn builtin() -> Self {
        Self {
            devices: builtin_devices(),
        }
    }

    pub fn from_devices(devices: Vec<DeviceDefinition>) -> Self {
        Self { devices }
    }

    pub fn devices(&self) -> &[DeviceDefinition] {
        &self.devices
    }

    pub fn into_devices(self) -> Vec<DeviceDefinition> {
        self.devices
    }

    pub fn device(&self, id: &str) -> Option<&DeviceDefinition> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceDefinition> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn builtin_devices() -> Vec<DeviceDefinition> {
    vec![
        // iPhone 14 family
        DeviceDefinition::new(
            "iphone14",
            "iPhone 14",
            vec![
                DeviceColor::named("Blue"),
                DeviceColor::named("Midnight"),
                DeviceColor::named("Purple"),
                DeviceColor::named("Red"),
                DeviceColor::named("Starlight"),
            ],
            "Midnight",
            "iPhone 14",
        ),
        DeviceDefinition::new(
            "iphone14plus",
            "iPhone 14 Plus",
            vec![
                DeviceColor::named("Blue"),
                DeviceColor::named("Midnight"),
                DeviceColor::named("Purple"),
                DeviceColor::named("Red"),
                DeviceColor::named("Starlight"),
            ],
            "Midnight",
            "iPhone 14 Plus",
        ),
        DeviceDefinition::new(
            "iphone14pro",
            "iPhone 14 Pro",
            vec![
                DeviceColor::named("Deep Purple"),
                DeviceColor::named("Gold"),
                DeviceColor::named("Silver"),
                DeviceColor::named("Space Black"),
            ],
            "Space Black",
            "iPhone 14 Pro",
        ),
        DeviceDefinition::new(
            "iphone14promax",
            "iPhone 14 Pro Max",
            vec![
                DeviceColor::named("Deep Purple"),
                DeviceColor::named("Gold"),
                DeviceColor::named("Silver"),
                DeviceColor::named("Space Black"),
            ],
            "Space Black",
            "iPhone 14 Pro Max",
        ),
        // iPhone 15 family
        DeviceDefinition::new(
            "iphone15",
            "iPhone 15",
            vec![
                DeviceColor::named("Black"),
                DeviceColor::named("Blue"),
                DeviceColor::named("Green"),
                DeviceColor::named("Pink"),
                DeviceColor::named("Yellow"),
            ],
            "Black",
            "iPhone 15",
        ),
        DeviceDefinition::new(
            "iphone15plus",
            "iPhone 15 Plus",
            vec![
                DeviceColor::named("Black"),
                DeviceColor::named("Blue"),
                DeviceColor::named("Green"),
                DeviceColor::named("Pink"),
                DeviceColor::named("Yellow"),
            ],
            "Black",
            "iPhone 15 Plus",
        ),
        DeviceDefinition::new(
            "iphone15pro",
            "iPhone 15 Pro",
            vec![
                DeviceColor::named("Black Titanium"),
                DeviceColor::named("Blue Titanium"),
                DeviceColor::named("Natural Titanium"),
                DeviceColor::named("White Titanium"),
            ],
            "Black Titanium",
            "iPhone 15 Pro",
        ),
        DeviceDefinition::new(
            "iphone15promax",
            "iPhone 15 Pro Max",
            vec![
                DeviceColor::named("Black Titanium"),
                DeviceColor::named("Blue Titanium"),
                DeviceColor::named("Natural Titanium"),
                DeviceColor::named("White Titanium"),
            ],
            "Black Titanium",
            "iPhone 15 Pro Max",
        ),
        // iPhone 16 family
        DeviceDefinition::new(
            "iphone16",
            "iPhone 16",
            vec![
                DeviceColor::named("Black"),
                DeviceColor::named("Pink"),
                DeviceColor::named("Teal"),
                DeviceColor::named("Ultramarine"),
                DeviceColor::named("White"),
            ],
            "Black",
            "iPhone 16",
        ),
        DeviceDefinition::new(
            "iphone16plus",
            "iPhone 16 Plus",
            vec![
                DeviceColor::named("Black"),
                DeviceColor::named("Pink"),
                DeviceColor::named("Teal"),
                DeviceColor::named("Ultramarine"),
                DeviceColor::named("White"),
            ],
            "Black",
            "iPhone 16 Plus",
        ),
        DeviceDefinition::new(
            "iphone16pro",
            "iPhone 16 Pro",
            vec![
                DeviceColor::named("Black Titanium"),
                DeviceColor::named("Desert Titanium"),
                DeviceColor::named("Natural Titanium"),
                DeviceColor::named("White Titanium"),
            ],
            "Black Titanium",
            "iPhone 16 Pro",
        ),
        DeviceDefinition::new(
            "iphone16promax",
            "iPhone 16 Pro Max",
            vec![
                DeviceColor::named("Black Titanium"),
                DeviceColor::named("Desert Titanium"),
                DeviceColor::named("Natural Titanium"),
                DeviceColor::named("White Titanium"),
            ],
            "Black Titanium",
            "iPhone 16 Pro Max",
        ),
        // iPhone 17 family
        DeviceDefinition::new(
            "iphone17",
            "iPhone 17",
            vec![
                DeviceColor::named("Black"),
                DeviceColor::named("Lavender"),
                DeviceColor::named("Mist Blue"),
                DeviceColor::named("Sage"),
                DeviceColor::named("White"),
            ],
            "Black",
            "iPhone 17",
        ),
        DeviceDefinition::new(
            "iphone17pro",
            "iPhone 17 Pro",
            vec![
                DeviceColor::named("Silver"),
                DeviceColor::named("Cosmic Orange"),
                DeviceColor::named("Deep Blue"),
            ],
            "Silver",
            "iPhone 17 Pro",
        ),
        DeviceDefinition::new(
            "iphone17promax",
            "iPhone 17 Pro Max",
            vec![
                DeviceColor::named("Silver"),
                DeviceColor::named("Cosmic Orange"),
                DeviceColor::named("Deep Blue"),
            ],
            "Silver",
            "iPhone 17 Pro Max",
        ),
        DeviceDefinition::new(
            "iphoneair",
            "iPhone Air",
            vec![
                DeviceColor::named("Cloud White"),
                DeviceColor::named("Light Gold"),
                DeviceColor::named("Sky Blue"),
                DeviceColor::named("Space Black"),
            ],
            "Space Black",
            "iPhone Air",
        ),
        // iPad family
        DeviceDefinition::new(
            "ipad",
            "iPad",
            vec![DeviceColor::named("Silver")],
            "Silver",
            "iPad",
        ),
        DeviceDefinition::new(
            "ipadair11m2",
            "iPad Air 11\" M2",
            vec![
                DeviceColor::named("Blue"),
                DeviceColor::named("Purple"),
                DeviceColor::named("Space Gray"),
                DeviceColor::named("Stardust"),
            ],
            "Space Gray",
            "iPad Air 11\" - M2",
        ),
        DeviceDefinition::new(
            "ipadair13m2",
            "iPad Air 13\" M2",
            vec![
                DeviceColor::named("Blue"),
                DeviceColor::named("Purple"),
                DeviceColor::named("Space Gray"),
                DeviceColor::named("Stardust"),
            ],
            "Space Gray",
            "iPad Air 13\" - M2",
        ),
        DeviceDefinition::new(
            "ipadmini",
            "iPad mini",
            vec![DeviceColor::named("Starlight")],
            "Starlight",
            "iPad mini",
        ),
        DeviceDefinition::new(
            "ipadpro11m4",
            "iPad Pro 11\" M4",
            vec![DeviceColor::named("Silver"), DeviceColor::named("Space Gray")],
            "Silver",
            "iPad Pro 11 - M4",
        ),
        DeviceDefinition::new(
            "ipadpro13m4",
            "iPad Pro 13\" M4",
            vec![DeviceColor::named("Silver"), DeviceColor::named("Space Gray")],
            "Silver",
            "iPad Pro 13 - M4",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalog_size() {
        assert_eq!(DeviceCatalog::builtin().len(), 22);
    }

    #[test]
    fn test_device_ids_are_unique() {
        let catalog = DeviceCatalog::builtin();
        let ids: HashSet<&str> = catalog.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_every_entry_has_colors() {
        for device in DeviceCatalog::builtin().iter() {
            assert!(!device.colors.is_empty(), "{} has no colors", device.id);
        }
    }

    #[test]
    fn test_default_color_never_needs_fallback() {
        for device in DeviceCatalog::builtin().iter() {
            assert!(
                device.color(&device.default_color_id).is_some(),
                "{} default color {} is not in its color list",
                device.id,
                device.default_color_id
            );
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = DeviceCatalog::builtin();
        let device = catalog.device("iphone14").unwrap();
        assert_eq!(device.display_name, "iPhone 14");
        assert!(catalog.device("iphone99").is_none());
    }

    #[test]
    fn test_bezel_file_names_from_catalog_data() {
        let catalog = DeviceCatalog::builtin();

        let iphone = catalog.device("iphone16pro").unwrap();
        assert_eq!(
            iphone.default_bezel_file_name(Orientation::Portrait),
            "iPhone 16 Pro - Black Titanium - Portrait.png"
        );

        // iPad Air prefixes carry an inch mark, iPad Pro prefixes do not.
        let air = catalog.device("ipadair11m2").unwrap();
        assert_eq!(
            air.default_bezel_file_name(Orientation::Landscape),
            "iPad Air 11\" - M2 - Space Gray - Landscape.png"
        );
        let pro = catalog.device("ipadpro13m4").unwrap();
        assert_eq!(
            pro.default_bezel_file_name(Orientation::Portrait),
            "iPad Pro 13 - M4 - Silver - Portrait.png"
        );
    }

    #[test]
    fn test_screen_regions_start_unresolved() {
        for device in DeviceCatalog::builtin().iter() {
            assert!(device.screen_region.is_none());
        }
    }
}
