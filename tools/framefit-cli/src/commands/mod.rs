//! CLI subcommand implementations.

use std::path::{Path, PathBuf};

pub mod check;
pub mod composite;
pub mod devices;
pub mod export;
pub mod info;
pub mod match_cmd;

/// Timestamped default output path next to the input file:
/// `Framed <stem> <date> at <time>.<ext>`.
pub(crate) fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("capture");
    let timestamp = chrono::Local::now().format("%Y-%m-%d at %H.%M.%S");
    input.with_file_name(format!("Framed {stem} {timestamp}.{extension}"))
}
