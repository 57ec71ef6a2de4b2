//! Error types shared across FrameFit crates.

use std::path::PathBuf;

/// Top-level error type for FrameFit operations.
///
/// Expected negative outcomes (no screen region detected, no device match)
/// are represented as `None`/empty results by the APIs that produce them,
/// not as variants here.
#[derive(Debug, thiserror::Error)]
pub enum FramefitError {
    /// Source media could not be read or decoded.
    #[error("Input error: {message}")]
    Input { message: String },

    /// A bundled artifact (bezel, region table, mask) is missing or corrupt.
    #[error("Asset error: {message}")]
    Asset { message: String },

    #[error("Bezel image not found: {name}")]
    BezelNotFound { name: String },

    #[error("Could not detect the screen region for {name}")]
    RegionNotFound { name: String },

    #[error("The source file does not contain a video track")]
    NoVideoTrack,

    /// Building the render plan or filter graph failed.
    #[error("Composition error: {message}")]
    Composition { message: String },

    /// The render process itself failed.
    #[error("Export failed: {message}")]
    Export { message: String },

    /// The export was cancelled by the caller. Not a failure.
    #[error("Export was cancelled")]
    ExportCancelled,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FramefitError.
pub type FramefitResult<T> = Result<T, FramefitError>;

impl FramefitError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset {
            message: msg.into(),
        }
    }

    pub fn bezel_not_found(name: impl Into<String>) -> Self {
        Self::BezelNotFound { name: name.into() }
    }

    pub fn region_not_found(name: impl Into<String>) -> Self {
        Self::RegionNotFound { name: name.into() }
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// True for the cancellation outcome, which callers must not report
    /// as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::ExportCancelled)
    }
}
