//! Resolution-based device matching.

use framefit_device_model::{DeviceDefinition, Orientation};

/// Native-resolution screenshots can be one pixel off the nominal
/// display size, so the standard matcher tolerates ±1 per axis.
pub const DIMENSION_TOLERANCE: u32 = 1;

/// A candidate device for a given capture resolution.
#[derive(Debug, Clone)]
pub struct DeviceMatch {
    pub device: DeviceDefinition,
    pub orientation: Orientation,
}

/// Match raw pixel dimensions against known screen regions with the
/// standard ±1 pixel tolerance.
pub fn match_devices(
    width: u32,
    height: u32,
    devices: &[DeviceDefinition],
) -> Vec<DeviceMatch> {
    match_devices_with_tolerance(width, height, devices, DIMENSION_TOLERANCE)
}

/// Strict variant requiring exact dimension equality.
pub fn match_devices_exact(
    width: u32,
    height: u32,
    devices: &[DeviceDefinition],
) -> Vec<DeviceMatch> {
    match_devices_with_tolerance(width, height, devices, 0)
}

/// The query and every candidate region are normalized to portrait form
/// (short side, long side) before comparison, so one portrait region per
/// device answers queries in both orientations. An empty result means
/// the resolution is unrecognized; that is an expected outcome, not an
/// error.
pub fn match_devices_with_tolerance(
    width: u32,
    height: u32,
    devices: &[DeviceDefinition],
    tolerance: u32,
) -> Vec<DeviceMatch> {
    let portrait_w = width.min(height);
    let portrait_h = width.max(height);
    let orientation = Orientation::from_dimensions(width, height);

    let mut matches = Vec::new();

    for device in devices {
        let Some(region) = device.screen_region else {
            continue;
        };
        let region_portrait_w = region.width.min(region.height);
        let region_portrait_h = region.width.max(region.height);
        if portrait_w.abs_diff(region_portrait_w) <= tolerance
            && portrait_h.abs_diff(region_portrait_h) <= tolerance
        {
            matches.push(DeviceMatch {
                device: device.clone(),
                orientation,
            });
        }
    }

    // Later catalog entries are newer devices; prefer them on ties.
    matches.reverse();
    matches
}
