//! FrameFit CLI - frame screenshots and screen recordings in device bezels.
//!
//! Usage:
//!   framefit devices                List known devices
//!   framefit match <W> <H>          Show devices matching a resolution
//!   framefit composite <IMAGE>      Frame a screenshot
//!   framefit export <VIDEO>         Frame a screen recording
//!   framefit info <PATH>            Inspect a capture file
//!   framefit check                  Check assets and external tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use framefit_common::{AppConfig, AssetPaths, ASSETS_ENV_VAR};

mod commands;

#[derive(Parser)]
#[command(
    name = "framefit",
    about = "Frame screenshots and screen recordings in device bezels",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Asset root directory holding bezels/, masks/, screen-regions.json
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known devices and their screen regions
    Devices,

    /// Show devices matching a capture resolution
    Match {
        /// Capture width in pixels
        width: u32,

        /// Capture height in pixels
        height: u32,

        /// Require exact dimensions instead of the standard tolerance
        #[arg(long)]
        exact: bool,
    },

    /// Frame a screenshot in a device bezel
    Composite {
        /// Source image file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Device id (defaults to the best resolution match)
        #[arg(long)]
        device: Option<String>,

        /// Color variant id (defaults to the device's default color)
        #[arg(long)]
        color: Option<String>,

        /// Use the landscape bezel
        #[arg(long)]
        landscape: bool,

        /// Background fill as #RRGGBB (default: transparent)
        #[arg(long)]
        background: Option<String>,

        /// Output width in pixels; height follows the aspect ratio
        #[arg(long)]
        width: Option<u32>,
    },

    /// Render a screen recording into a device bezel
    Export {
        /// Source video file (mov, mp4, m4v)
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Device id (defaults to the best resolution match)
        #[arg(long)]
        device: Option<String>,

        /// Color variant id (defaults to the device's default color)
        #[arg(long)]
        color: Option<String>,

        /// Extra clockwise rotation in degrees (multiple of 90)
        #[arg(long, default_value = "0")]
        rotate: i32,

        /// Background fill as #RRGGBB (default: white)
        #[arg(long)]
        background: Option<String>,

        /// Output width in pixels; height follows the aspect ratio
        #[arg(long)]
        width: Option<u32>,

        /// Write a framed first-frame PNG to this path instead of
        /// rendering the video
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// Inspect a capture file and show matching devices
    Info {
        /// Screenshot or video file
        input: PathBuf,
    },

    /// Check external tools and bezel assets
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    framefit_common::logging::init_logging(&framefit_common::LoggingConfig {
        level: log_level.to_string(),
        json: false,
    });

    let assets = resolve_assets(cli.assets);

    match cli.command {
        Commands::Devices => commands::devices::run(assets),
        Commands::Match {
            width,
            height,
            exact,
        } => commands::match_cmd::run(assets, width, height, exact),
        Commands::Composite {
            input,
            output,
            device,
            color,
            landscape,
            background,
            width,
        } => commands::composite::run(assets, input, output, device, color, landscape, background, width),
        Commands::Export {
            input,
            output,
            device,
            color,
            rotate,
            background,
            width,
            preview,
        } => {
            commands::export::run(
                assets, input, output, device, color, rotate, background, width, preview,
            )
            .await
        }
        Commands::Info { input } => commands::info::run(assets, input),
        Commands::Check => commands::check::run(assets),
    }
}

/// Asset root precedence: `--assets` flag, then `FRAMEFIT_ASSETS`, then
/// the config file, then the platform default.
fn resolve_assets(flag: Option<PathBuf>) -> AssetPaths {
    if let Some(root) = flag {
        return AssetPaths::with_root(root);
    }
    if let Ok(root) = std::env::var(ASSETS_ENV_VAR) {
        return AssetPaths::with_root(root);
    }
    AppConfig::load().assets
}
