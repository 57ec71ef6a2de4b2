//! Video probing and frame extraction via ffprobe/ffmpeg.

use std::path::Path;
use std::process::Command;

use framefit_common::{FramefitError, FramefitResult};
use framefit_device_model::Rotation;
use image::RgbaImage;
use serde::Deserialize;

/// File extensions routed to the video pipeline.
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mov", "mp4", "m4v"];

pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.iter().any(|candidate| *candidate == ext)
        })
        .unwrap_or(false)
}

/// Properties of a video's primary video track.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Encoded (pre-rotation) width.
    pub width: u32,
    /// Encoded (pre-rotation) height.
    pub height: u32,
    /// Display rotation from container metadata, normalized to
    /// 0/90/180/270 degrees.
    pub rotation: u32,
    pub duration_secs: f64,
    /// Frames per second; falls back to 30 when the container does not
    /// report a usable rate.
    pub frame_rate: f64,
    pub has_audio: bool,
}

impl VideoInfo {
    /// Dimensions as displayed, after the container's own rotation
    /// metadata. Device matching must see these, not the encoded size.
    pub fn displayed_dimensions(&self) -> (u32, u32) {
        if self.rotation == 90 || self.rotation == 270 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Displayed dimensions after an extra user rotation on top of the
    /// container metadata.
    pub fn dimensions_with_rotation(&self, extra: Rotation) -> (u32, u32) {
        let (width, height) = self.displayed_dimensions();
        extra.apply(width, height)
    }
}

/// Probe a video file with ffprobe.
pub fn probe_video(path: &Path) -> FramefitResult<VideoInfo> {
    if !path.is_file() {
        return Err(FramefitError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|err| FramefitError::input(format!("Failed to run ffprobe: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FramefitError::input(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let probe: ProbeOutput = serde_json::from_slice(&output.stdout)?;
    video_info_from_probe(&probe)
}

/// First frame of the video, decoded display-oriented. ffmpeg applies
/// the container's rotation metadata during decode, so no further
/// correction is needed here.
pub fn extract_first_frame(path: &Path) -> FramefitResult<RgbaImage> {
    // The scratch path is unique per call and removed on drop, decode
    // failures included.
    let frame_file = tempfile::Builder::new()
        .prefix("framefit-frame-")
        .suffix(".png")
        .tempfile()
        .map_err(|err| FramefitError::input(format!("Failed to create scratch file: {err}")))?;

    let output = Command::new("ffmpeg")
        .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
        .arg(path)
        .args(["-frames:v", "1"])
        .arg(frame_file.path())
        .output()
        .map_err(|err| FramefitError::input(format!("Failed to run ffmpeg: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FramefitError::input(format!(
            "Could not decode first frame of {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let frame = image::open(frame_file.path())
        .map_err(|err| FramefitError::input(format!("Could not read extracted frame: {err}")))?;
    Ok(frame.to_rgba8())
}

/// Rotate a decoded frame clockwise in quarter turns.
pub fn rotate_frame(frame: &RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::R0 => frame.clone(),
        Rotation::R90 => image::imageops::rotate90(frame),
        Rotation::R180 => image::imageops::rotate180(frame),
        Rotation::R270 => image::imageops::rotate270(frame),
    }
}

pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    tags: Option<ProbeTags>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl ProbeStream {
    fn rotation_degrees(&self) -> u32 {
        let raw = self
            .side_data_list
            .iter()
            .find_map(|side| side.rotation)
            .or_else(|| {
                self.tags
                    .as_ref()
                    .and_then(|tags| tags.rotate.as_deref())
                    .and_then(|rotate| rotate.parse::<f64>().ok())
            });

        match raw {
            Some(degrees) => (degrees.round() as i64).rem_euclid(360) as u32,
            None => 0,
        }
    }

    fn frame_rate(&self) -> Option<f64> {
        [self.avg_frame_rate.as_deref(), self.r_frame_rate.as_deref()]
            .into_iter()
            .flatten()
            .find_map(parse_frame_rate)
    }
}

fn video_info_from_probe(probe: &ProbeOutput) -> FramefitResult<VideoInfo> {
    let video = probe
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .ok_or(FramefitError::NoVideoTrack)?;

    let width = video.width.unwrap_or(0);
    let height = video.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(FramefitError::input("Video stream reports zero dimensions"));
    }

    let duration_secs = probe
        .format
        .as_ref()
        .and_then(|format| format.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(0.0);

    let has_audio = probe
        .streams
        .iter()
        .any(|stream| stream.codec_type.as_deref() == Some("audio"));

    Ok(VideoInfo {
        width,
        height,
        rotation: video.rotation_degrees(),
        duration_secs,
        frame_rate: video.frame_rate().unwrap_or(30.0),
        has_audio,
    })
}

fn parse_frame_rate(raw: &str) -> Option<f64> {
    let rate = match raw.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = numerator.trim().parse::<f64>().ok()?;
            let denominator = denominator.trim().parse::<f64>().ok()?;
            if denominator == 0.0 {
                return None;
            }
            numerator / denominator
        }
        None => raw.trim().parse::<f64>().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
