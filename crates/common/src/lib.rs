//! FrameFit Common Utilities
//!
//! Shared infrastructure for all FrameFit crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration and asset path resolution

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
