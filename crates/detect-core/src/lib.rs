//! FrameFit Detect Core
//!
//! Bezel artwork analysis and resolution matching:
//! - **Region detection:** flood-fill bounding box of the screen cutout
//! - **Mask detection:** exact screen-hole shape including anti-aliased edges
//! - **Device matching:** resolution lookup with portrait normalization
//!
//! This crate is pure computation: no I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod mask;
pub mod matcher;
pub mod pixels;
pub mod region;

pub use mask::detect_screen_mask;
pub use matcher::{match_devices, match_devices_exact, DeviceMatch};
pub use pixels::PixelBuffer;
pub use region::detect_screen_region;
