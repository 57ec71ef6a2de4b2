//! Render a screen recording into a device bezel.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use framefit_asset_store::RegionStore;
use framefit_common::AssetPaths;
use framefit_detect_core::match_devices;
use framefit_device_model::{BackgroundColor, DeviceCatalog, ExportSize, Orientation, Rotation};
use framefit_render_engine::export::{export_video, CancelToken, ExportProgress, VideoExportJob};
use framefit_render_engine::still::{composite_still, resize_image, save_png};
use framefit_render_engine::video::{
    command_exists, extract_first_frame, is_video_path, probe_video, rotate_frame,
};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    assets: AssetPaths,
    input: PathBuf,
    output: Option<PathBuf>,
    device_id: Option<String>,
    color_id: Option<String>,
    rotate: i32,
    background: Option<String>,
    width: Option<u32>,
    preview: Option<PathBuf>,
) -> anyhow::Result<()> {
    if !is_video_path(&input) {
        anyhow::bail!(
            "{} is not a video file (mov, mp4, m4v); use: framefit composite",
            input.display()
        );
    }
    if !command_exists("ffmpeg") || !command_exists("ffprobe") {
        anyhow::bail!("ffmpeg and ffprobe are required for video export; run: framefit check");
    }

    let rotation = Rotation::from_degrees(rotate)
        .ok_or_else(|| anyhow::anyhow!("Rotation must be a multiple of 90 degrees"))?;

    let info = probe_video(&input).map_err(|e| anyhow::anyhow!("Could not load video: {e}"))?;
    let (display_width, display_height) = info.displayed_dimensions();

    // The extra rotation changes which way the frame faces, so matching
    // runs on the rotated dimensions.
    let (match_width, match_height) = rotation.apply(display_width, display_height);

    let store = RegionStore::open(&assets);
    let catalog = store.resolve_catalog(DeviceCatalog::builtin());

    let device = match &device_id {
        Some(id) => catalog
            .device(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown device id: {id}. Run: framefit devices"))?,
        None => {
            let matches = match_devices(match_width, match_height, catalog.devices());
            let Some(best) = matches.into_iter().next() else {
                println!("No matching device found for {match_width}×{match_height} video.");
                return Ok(());
            };
            best.device
        }
    };
    let orientation = Orientation::from_dimensions(match_width, match_height);

    let color = match &color_id {
        Some(id) => device.color(id).cloned().ok_or_else(|| {
            let known = device
                .colors
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow::anyhow!("Unknown color {id} for {}. Known: {known}", device.id)
        })?,
        None => device.default_color().clone(),
    };

    let background = match background {
        Some(hex) => BackgroundColor::parse_hex(&hex)
            .ok_or_else(|| anyhow::anyhow!("Invalid background color: {hex}. Use #RRGGBB"))?,
        None => BackgroundColor::WHITE,
    };

    let bezel_file = device.bezel_file_name(&color, orientation);
    let bezel_path = store
        .library()
        .bezel_path(&bezel_file)
        .ok_or_else(|| anyhow::anyhow!("Bezel image not found: {bezel_file}"))?;
    let (bezel_width, bezel_height) = image::image_dimensions(&bezel_path)?;

    let output_size = width.map(|target| {
        let mut size = ExportSize::native(bezel_width, bezel_height);
        size.set_width_preserving_aspect(target);
        if !size.is_high_quality() {
            println!("  Large output ({}x{}); export may be slow.", size.width, size.height);
        }
        (size.width, size.height)
    });

    // Preview mode renders the first frame through the still pipeline.
    if let Some(preview_path) = preview {
        let frame =
            extract_first_frame(&input).map_err(|e| anyhow::anyhow!("Could not load video: {e}"))?;
        let frame = rotate_frame(&frame, rotation);

        let framed = composite_still(&store, &frame, &device, &color, orientation, Some(background))
            .context("Failed to composite image.")?;
        let framed = match output_size {
            Some((w, h)) => resize_image(&framed, w, h)?,
            None => framed,
        };
        save_png(&framed, &preview_path)?;

        println!("Preview frame saved to: {}", preview_path.display());
        return Ok(());
    }

    let output_path = output.unwrap_or_else(|| super::default_output_path(&input, "mp4"));

    println!("Exporting framed video: {}", input.display());
    println!("  Device: {} ({})", device.display_name, color.id);
    println!(
        "  Source: {}x{}, {:.1}s{}",
        display_width,
        display_height,
        info.duration_secs,
        if info.has_audio { ", with audio" } else { "" }
    );
    if rotation != Rotation::R0 {
        println!("  Extra rotation: {} degrees", rotation.degrees());
    }
    println!("  Output: {}", output_path.display());
    println!("  Press Ctrl+C to cancel");

    let job = VideoExportJob {
        input,
        output: output_path,
        device,
        color,
        orientation,
        rotation,
        background,
        output_size,
    };

    let cancel = CancelToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\nCancelling export...");
                cancel.cancel();
            }
        })
    };

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        print!(
            "\r  Progress: {:.1}% (ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.eta_secs
        );
        let _ = std::io::stdout().flush();
    });

    let result = export_video(&store, job, Some(progress_cb), cancel).await;
    ctrl_c.abort();

    match result {
        Ok(path) => {
            println!("\nExport complete: {}", path.display());
            Ok(())
        }
        Err(err) if err.is_cancelled() => {
            println!("\nExport cancelled.");
            Ok(())
        }
        Err(err) => {
            println!("\n{err}");
            std::process::exit(1);
        }
    }
}
