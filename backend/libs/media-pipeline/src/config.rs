/// Transcoding configuration
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    pub enabled: bool,
    pub asset_path: Option<PathBuf>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            asset_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodingConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Container formats to produce, e.g. "mp4".
    pub formats: Vec<String>,
    /// Target heights in pixels; renditions above the source height are
    /// skipped.
    pub resolutions: Vec<u32>,
    /// Bitrate tiers, indexed by resolution band (<=360, <=720, above).
    pub bitrates: Vec<String>,
    pub output_dir: PathBuf,
    pub thumbnail_dir: PathBuf,
    pub watermark: WatermarkConfig,
}

impl Default for TranscodingConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            formats: vec!["mp4".to_string()],
            resolutions: vec![360, 720],
            bitrates: vec!["500k".to_string(), "1000k".to_string()],
            output_dir: PathBuf::from("uploads/videos"),
            thumbnail_dir: PathBuf::from("uploads/thumbnails"),
            watermark: WatermarkConfig::default(),
        }
    }
}

impl TranscodingConfig {
    /// Load configuration from environment variables, keeping the defaults
    /// for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
            formats: env_list("VIDEO_FORMATS").unwrap_or(defaults.formats),
            resolutions: env_list("VIDEO_RESOLUTIONS")
                .map(|values| values.iter().filter_map(|v| v.parse().ok()).collect())
                .unwrap_or(defaults.resolutions),
            bitrates: env_list("VIDEO_BITRATES").unwrap_or(defaults.bitrates),
            output_dir: env::var("VIDEO_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            thumbnail_dir: env::var("VIDEO_THUMBNAIL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.thumbnail_dir),
            watermark: WatermarkConfig {
                enabled: env::var("VIDEO_WATERMARK_ENABLED")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
                asset_path: env::var("VIDEO_WATERMARK_PATH")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from),
            },
        }
    }

    /// Bitrate tier for a target resolution: first tier up to 360p, second
    /// up to 720p, last configured tier above that.
    pub fn bitrate_for(&self, resolution: u32) -> &str {
        let tier = if resolution <= 360 {
            self.bitrates.first()
        } else if resolution <= 720 {
            self.bitrates.get(1)
        } else {
            self.bitrates.last()
        };
        tier.map(String::as_str).unwrap_or("2500k")
    }
}

fn env_list(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}
