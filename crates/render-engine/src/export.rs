//! Video export: bezel burned into every frame via ffmpeg.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use framefit_asset_store::RegionStore;
use framefit_common::{FramefitError, FramefitResult};
use framefit_device_model::{
    BackgroundColor, DeviceColor, DeviceDefinition, Orientation, PixelRect, Rotation,
};
use image::GrayImage;

use crate::video::{command_exists, probe_video};

/// A video export ready to be rendered.
#[derive(Debug, Clone)]
pub struct VideoExportJob {
    /// Source video file.
    pub input: PathBuf,

    /// Output file path.
    pub output: PathBuf,

    /// Target device, with its screen region resolved.
    pub device: DeviceDefinition,

    /// Bezel color variant.
    pub color: DeviceColor,

    /// Bezel orientation.
    pub orientation: Orientation,

    /// Extra rotation applied on top of the video's own metadata.
    pub rotation: Rotation,

    /// Fill behind the device; mp4 cannot carry the transparent margin.
    pub background: BackgroundColor,

    /// Output pixel size override. Defaults to the bezel's native size.
    pub output_size: Option<(u32, u32)>,
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0]. Reaches exactly 1.0 only with the
    /// terminal `Complete` report.
    pub progress: f64,

    /// Seconds of output rendered so far.
    pub out_time_secs: f64,

    /// Expected output duration in seconds.
    pub duration_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
    Failed,
    Cancelled,
}

/// Cooperative cancellation flag shared with an in-flight export.
///
/// Cancelling kills the encoder and removes the partial output file;
/// the export then returns `FramefitError::ExportCancelled`, which is
/// a distinct outcome from failure.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Render the export job to its output path.
///
/// This is the main entry point for video rendering. All audio tracks
/// of the source survive into the output.
pub async fn export_video(
    store: &RegionStore,
    job: VideoExportJob,
    progress: Option<ProgressCallback>,
    cancel: CancelToken,
) -> FramefitResult<PathBuf> {
    tracing::info!(
        input = %job.input.display(),
        output = %job.output.display(),
        device = %job.device.id,
        "Starting video export"
    );

    if !command_exists("ffmpeg") {
        return Err(FramefitError::export("ffmpeg not found in PATH"));
    }

    if let Some(parent) = job.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if let Some(cb) = &progress {
        cb(ExportProgress {
            progress: 0.0,
            out_time_secs: 0.0,
            duration_secs: 0.0,
            eta_secs: 0.0,
            stage: ExportStage::Preparing,
        });
    }

    let plan = build_export_plan(store, &job)?;

    if cancel.is_cancelled() {
        return Err(FramefitError::ExportCancelled);
    }

    run_ffmpeg(&plan, &job.output, progress, &cancel)?;

    tracing::info!(output = %job.output.display(), "Export finished");
    Ok(job.output)
}

#[derive(Debug, Clone)]
struct ExportPlan {
    ffmpeg_args: Vec<String>,
    expected_duration_secs: f64,
}

fn build_export_plan(store: &RegionStore, job: &VideoExportJob) -> FramefitResult<ExportPlan> {
    let plan_started = std::time::Instant::now();

    let bezel_file = job.device.bezel_file_name(&job.color, job.orientation);
    let bezel_path = store
        .library()
        .bezel_path(&bezel_file)
        .ok_or_else(|| FramefitError::bezel_not_found(&bezel_file))?;
    let (bezel_width, bezel_height) = image::image_dimensions(&bezel_path)?;

    let region = store
        .resolve_screen_region(&job.device, &job.color, job.orientation)
        .ok_or_else(|| FramefitError::region_not_found(&bezel_file))?;

    let info = probe_video(&job.input)?;
    if info.duration_secs <= 0.0 {
        return Err(FramefitError::input("Video reports no duration"));
    }

    let (render_width, render_height) = job.output_size.unwrap_or((bezel_width, bezel_height));
    if render_width == 0 || render_height == 0 {
        return Err(FramefitError::composition("Output size must be non-zero"));
    }

    let scale = render_width as f64 / bezel_width as f64;
    let scaled_region = clamp_region(region.scaled(scale), render_width, render_height);

    // Prefer the mask file on disk; otherwise materialize the detected
    // mask so ffmpeg can read it. No mask means no clipping, same as
    // the still path.
    let mask_input = match store.mask_path(&bezel_file) {
        Some(path) => Some(path),
        None => match store.screen_mask(&bezel_file) {
            Some(mask) => Some(ensure_mask_file(&mask, &bezel_file)?),
            None => None,
        },
    };

    let filter = build_filter_graph(
        render_width,
        render_height,
        scaled_region,
        job.rotation,
        job.background,
        info.frame_rate,
        mask_input.is_some(),
    );

    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-stats_period".to_string(),
        "0.1".to_string(),
        "-i".to_string(),
        job.input.display().to_string(),
    ];

    args.push("-loop".to_string());
    args.push("1".to_string());
    args.push("-i".to_string());
    args.push(bezel_path.display().to_string());

    if let Some(mask) = &mask_input {
        args.push("-loop".to_string());
        args.push("1".to_string());
        args.push("-i".to_string());
        args.push(mask.display().to_string());
    }

    args.push("-filter_complex".to_string());
    args.push(filter);
    args.push("-map".to_string());
    args.push("[vout]".to_string());
    args.push("-map".to_string());
    args.push("0:a?".to_string());
    args.push("-r".to_string());
    args.push(format_frame_rate(info.frame_rate));
    args.push("-t".to_string());
    args.push(format!("{:.6}", info.duration_secs));

    let mut codec = codec_args();
    args.append(&mut codec);

    args.push(job.output.display().to_string());

    tracing::info!(
        bezel = %bezel_file,
        render_width,
        render_height,
        duration_secs = info.duration_secs,
        frame_rate = info.frame_rate,
        has_mask = mask_input.is_some(),
        plan_build_ms = plan_started.elapsed().as_millis(),
        "Export plan built"
    );

    Ok(ExportPlan {
        ffmpeg_args: args,
        expected_duration_secs: info.duration_secs,
    })
}

fn run_ffmpeg(
    plan: &ExportPlan,
    output_path: &Path,
    progress: Option<ProgressCallback>,
    cancel: &CancelToken,
) -> FramefitResult<()> {
    tracing::debug!(args = ?plan.ffmpeg_args, "Running ffmpeg");
    let mut cmd = Command::new("ffmpeg");
    cmd.args(&plan.ffmpeg_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = std::time::Instant::now();
    let mut child = cmd
        .spawn()
        .map_err(|e| FramefitError::export(format!("Failed to start ffmpeg: {e}")))?;

    tracing::info!(pid = child.id(), "ffmpeg process started");

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| FramefitError::export("Failed to capture ffmpeg stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| FramefitError::export("Failed to capture ffmpeg stderr"))?;

    // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
    let stderr_task = std::thread::spawn(move || -> String {
        let mut reader = BufReader::new(stderr);
        let mut output = String::new();
        match reader.read_to_string(&mut output) {
            Ok(_) => output,
            Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
        }
    });

    let mut reader = BufReader::new(stdout);
    let mut line = String::new();
    let mut state = ProgressState::default();
    let mut tracker = ProgressTracker::default();
    let mut cancelled = false;

    // Progress lines arrive at least once per stats period, so the
    // cancel flag is observed within roughly one period.
    loop {
        if cancel.is_cancelled() {
            cancelled = true;
            let _ = child.kill();
            break;
        }

        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|e| FramefitError::export(format!("Failed reading ffmpeg progress: {e}")))?;
        if bytes == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((key, value)) = trimmed.split_once('=') {
            state.update(key, value);
            if key == "progress" {
                if let Some(cb) = &progress {
                    cb(progress_report(
                        &state,
                        &mut tracker,
                        plan.expected_duration_secs,
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        }
    }

    let status = child
        .wait()
        .map_err(|e| FramefitError::export(format!("Failed to wait on ffmpeg: {e}")))?;

    let stderr_output = stderr_task
        .join()
        .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

    if cancelled {
        if output_path.exists() {
            if let Err(err) = std::fs::remove_file(output_path) {
                tracing::warn!(
                    "Failed to remove partial output {}: {}",
                    output_path.display(),
                    err
                );
            }
        }
        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: tracker.last(),
                out_time_secs: state.out_time_secs,
                duration_secs: plan.expected_duration_secs,
                eta_secs: 0.0,
                stage: ExportStage::Cancelled,
            });
        }
        tracing::info!("Export cancelled, partial output removed");
        return Err(FramefitError::ExportCancelled);
    }

    if !status.success() {
        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: tracker.last(),
                out_time_secs: state.out_time_secs,
                duration_secs: plan.expected_duration_secs,
                eta_secs: 0.0,
                stage: ExportStage::Failed,
            });
        }
        return Err(FramefitError::export(format!(
            "ffmpeg exited with {}: {}",
            status,
            stderr_output.trim()
        )));
    }

    if let Some(cb) = &progress {
        cb(ExportProgress {
            progress: 1.0,
            out_time_secs: plan.expected_duration_secs,
            duration_secs: plan.expected_duration_secs,
            eta_secs: 0.0,
            stage: ExportStage::Complete,
        });
    }

    Ok(())
}

/// Assemble the filter graph: the source video is rotated, stretched
/// into the screen cutout, clipped by the mask, laid over the
/// background fill, and the bezel goes on top.
fn build_filter_graph(
    render_width: u32,
    render_height: u32,
    screen_region: PixelRect,
    rotation: Rotation,
    background: BackgroundColor,
    frame_rate: f64,
    has_mask: bool,
) -> String {
    let rotate = match rotation {
        Rotation::R0 => "",
        Rotation::R90 => "transpose=1,",
        Rotation::R180 => "hflip,vflip,",
        Rotation::R270 => "transpose=2,",
    };

    let mut graph = String::new();

    graph.push_str(&format!(
        "[0:v]setpts=PTS-STARTPTS,{rotate}scale={region_w}:{region_h}:flags=lanczos,format=rgba,pad={out_w}:{out_h}:{region_x}:{region_y}:color=black@0.0[placed]",
        region_w = screen_region.width,
        region_h = screen_region.height,
        region_x = screen_region.x,
        region_y = screen_region.y,
        out_w = render_width,
        out_h = render_height,
    ));

    if has_mask {
        // The mask multiplies the placed video's alpha rather than
        // replacing it, so mask pixels outside the video stay
        // transparent instead of turning opaque black.
        graph.push_str(&format!(
            ";[2:v]format=gray,scale={out_w}:{out_h}:flags=lanczos[mask];[placed]split[screen_rgb][screen_a];[screen_a]alphaextract[video_alpha];[video_alpha][mask]blend=all_mode=multiply[clip_alpha];[screen_rgb][clip_alpha]alphamerge[screen]",
            out_w = render_width,
            out_h = render_height,
        ));
    } else {
        graph.push_str(";[placed]null[screen]");
    }

    graph.push_str(&format!(
        ";color=c={bg}:s={out_w}x{out_h}:r={rate},format=rgba[backdrop];[backdrop][screen]overlay=format=auto[scene];[1:v]format=rgba,scale={out_w}:{out_h}:flags=lanczos[bezel];[scene][bezel]overlay=format=auto,scale=trunc(iw/2)*2:trunc(ih/2)*2,format=yuv420p[vout]",
        bg = background.to_ffmpeg(),
        out_w = render_width,
        out_h = render_height,
        rate = format_frame_rate(frame_rate),
    ));

    graph
}

fn codec_args() -> Vec<String> {
    vec![
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-profile:v".to_string(),
        "high".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-crf".to_string(),
        "18".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
    ]
}

/// Keep a scaled region inside the render bounds. Component-wise
/// rounding can push the far edge one pixel past the canvas, which the
/// pad filter rejects.
fn clamp_region(mut region: PixelRect, max_width: u32, max_height: u32) -> PixelRect {
    region.x = region.x.min(max_width.saturating_sub(1));
    region.y = region.y.min(max_height.saturating_sub(1));
    region.width = region.width.clamp(1, max_width - region.x);
    region.height = region.height.clamp(1, max_height - region.y);
    region
}

fn ensure_mask_file(mask: &GrayImage, bezel_file: &str) -> FramefitResult<PathBuf> {
    let slug: String = bezel_file
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let mask_path = std::env::temp_dir().join(format!("framefit-mask-{slug}.png"));

    mask.save(&mask_path).map_err(|e| {
        FramefitError::export(format!(
            "Failed to materialize screen mask {}: {e}",
            mask_path.display()
        ))
    })?;
    Ok(mask_path)
}

fn format_frame_rate(rate: f64) -> String {
    if (rate - rate.round()).abs() < 1e-9 {
        format!("{}", rate.round() as u64)
    } else {
        format!("{rate:.6}")
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports out_time_ms in microseconds.
            "out_time_ms" => {
                if let Ok(ms) = value.parse::<f64>() {
                    self.out_time_secs = ms / 1_000_000.0;
                }
            }
            "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

/// Keeps reported progress monotonic and below 1.0; the terminal 1.0 is
/// reserved for the Complete report.
#[derive(Debug, Default)]
struct ProgressTracker {
    last: f64,
}

impl ProgressTracker {
    fn observe(&mut self, fraction: f64) -> f64 {
        let fraction = fraction.clamp(0.0, 0.999);
        if fraction > self.last {
            self.last = fraction;
        }
        self.last
    }

    fn last(&self) -> f64 {
        self.last
    }
}

fn progress_report(
    state: &ProgressState,
    tracker: &mut ProgressTracker,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> ExportProgress {
    let raw = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        state.out_time_secs / expected_duration_secs
    };
    let progress = tracker.observe(raw);

    let eta_secs = if progress > 0.0 {
        ((elapsed_secs / progress) - elapsed_secs).max(0.0)
    } else {
        0.0
    };

    ExportProgress {
        progress,
        out_time_secs: state.out_time_secs,
        duration_secs: expected_duration_secs,
        eta_secs,
        stage: if state.complete {
            ExportStage::Finalizing
        } else {
            ExportStage::Rendering
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_state_parses_out_time() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "2500000");
        assert!((state.out_time_secs - 2.5).abs() < 1e-9);

        state.update("out_time_ms", "7500000");
        assert!((state.out_time_secs - 7.5).abs() < 1e-9);

        assert!(!state.complete);
        state.update("progress", "continue");
        assert!(!state.complete);
        state.update("progress", "end");
        assert!(state.complete);
    }

    #[test]
    fn test_progress_is_monotonic_and_capped() {
        let mut tracker = ProgressTracker::default();
        let mut state = ProgressState::default();

        state.update("out_time_us", "5000000");
        let first = progress_report(&state, &mut tracker, 10.0, 1.0);
        assert!((first.progress - 0.5).abs() < 1e-9);
        assert_eq!(first.stage, ExportStage::Rendering);

        // A regressed out_time must not move progress backwards.
        state.update("out_time_us", "3000000");
        let second = progress_report(&state, &mut tracker, 10.0, 2.0);
        assert!(second.progress >= first.progress);

        // Overshoot past the probed duration stays below 1.0.
        state.update("out_time_us", "15000000");
        let third = progress_report(&state, &mut tracker, 10.0, 3.0);
        assert!(third.progress < 1.0);
        assert!(third.progress >= second.progress);
    }

    #[test]
    fn test_progress_report_zero_duration() {
        let mut tracker = ProgressTracker::default();
        let mut state = ProgressState::default();
        state.update("out_time_us", "1000000");

        let report = progress_report(&state, &mut tracker, 0.0, 1.0);
        assert_eq!(report.progress, 0.0);
        assert_eq!(report.eta_secs, 0.0);
    }

    #[test]
    fn test_finalizing_stage_after_end_marker() {
        let mut tracker = ProgressTracker::default();
        let mut state = ProgressState::default();
        state.update("out_time_us", "10000000");
        state.update("progress", "end");

        let report = progress_report(&state, &mut tracker, 10.0, 5.0);
        assert_eq!(report.stage, ExportStage::Finalizing);
        assert!(report.progress < 1.0);
    }

    #[test]
    fn test_filter_graph_with_mask() {
        let graph = build_filter_graph(
            1290,
            2802,
            PixelRect::new(60, 135, 1170, 2532),
            Rotation::R0,
            BackgroundColor::WHITE,
            30.0,
            true,
        );

        assert!(graph.contains("scale=1170:2532:flags=lanczos"));
        assert!(graph.contains("pad=1290:2802:60:135:color=black@0.0"));
        assert!(graph.contains("[video_alpha][mask]blend=all_mode=multiply"));
        assert!(graph.contains("alphamerge"));
        assert!(graph.contains("color=c=0xFFFFFF:s=1290x2802:r=30"));
        assert!(graph.contains("[scene][bezel]overlay"));
        assert!(graph.ends_with("[vout]"));
        assert!(!graph.contains("transpose"));
    }

    #[test]
    fn test_filter_graph_without_mask_skips_clip_chain() {
        let graph = build_filter_graph(
            1290,
            2802,
            PixelRect::new(60, 135, 1170, 2532),
            Rotation::R0,
            BackgroundColor::BLACK,
            30.0,
            false,
        );

        assert!(graph.contains("[placed]null[screen]"));
        assert!(!graph.contains("alphamerge"));
        assert!(!graph.contains("[2:v]"));
    }

    #[test]
    fn test_filter_graph_rotation_filters() {
        let region = PixelRect::new(0, 0, 100, 200);
        let base = |rotation| {
            build_filter_graph(
                100,
                200,
                region,
                rotation,
                BackgroundColor::WHITE,
                30.0,
                false,
            )
        };

        assert!(base(Rotation::R90).contains("transpose=1,"));
        assert!(base(Rotation::R270).contains("transpose=2,"));
        assert!(base(Rotation::R180).contains("hflip,vflip,"));
        assert!(!base(Rotation::R0).contains("transpose"));
    }

    #[test]
    fn test_codec_args_target_mp4() {
        let args = codec_args();
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
    }

    #[test]
    fn test_clamp_region_keeps_rect_inside_canvas() {
        // Rounded scaling pushed the far edge one pixel out.
        let region = PixelRect::new(30, 68, 586, 1267);
        let clamped = clamp_region(region, 615, 1334);
        assert!(clamped.right() <= 615);
        assert!(clamped.bottom() <= 1334);
        assert_eq!(clamped.x, 30);

        let inside = PixelRect::new(60, 135, 1170, 2532);
        assert_eq!(clamp_region(inside, 1290, 2802), inside);
    }

    #[test]
    fn test_format_frame_rate() {
        assert_eq!(format_frame_rate(30.0), "30");
        assert_eq!(format_frame_rate(29.97003), "29.970030");
    }

    #[test]
    fn test_cancel_token_round_trip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_ensure_mask_file_writes_png() {
        let mask = GrayImage::from_pixel(4, 4, image::Luma([255]));
        let path = ensure_mask_file(&mask, "Test Phone - Black - Portrait.png").unwrap();
        assert!(path.is_file());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("framefit-mask-"));

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded.dimensions(), (4, 4));
        let _ = std::fs::remove_file(&path);
    }
}
