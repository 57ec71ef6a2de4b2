//! FrameFit Device Model
//!
//! Data model for the device bezel catalog:
//! - **Geometry:** pixel rectangles, orientation, quarter-turn rotations
//! - **Devices:** color variants, catalog entries, bezel filename rules
//! - **Catalog:** the builtin device registry
//! - **Composition:** background fill and export size parameters
//!
//! Everything here is plain data; detection and rendering live in the
//! `framefit-detect-core` and `framefit-render-engine` crates.

pub mod catalog;
pub mod composition;
pub mod device;
pub mod geometry;

pub use catalog::DeviceCatalog;
pub use composition::{BackgroundColor, ExportSize};
pub use device::{DeviceColor, DeviceDefinition};
pub use geometry::{Orientation, PixelRect, Rotation};
