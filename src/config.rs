use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::telemetry::FeedMode;

/// How the GPU telemetry feed is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub mode: FeedMode,
    /// Poll interval in milliseconds (poll mode only).
    pub poll_interval_ms: u64,
    /// Rolling window size; `None` keeps every sample for the session.
    pub window: Option<usize>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            mode: FeedMode::Poll,
            poll_interval_ms: 1000,
            window: Some(30),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the REST API (upload, synthesis, job trigger, telemetry).
    pub api_base: String,
    /// Base URL of the static media host serving generated audio and video.
    pub media_base: String,
    /// Text used when `say` is invoked with nothing to say.
    pub tts_placeholder: String,
    /// Video device node used for `photo` snapshots.
    pub camera_device: String,
    /// Client-side cap on the video-generation request.
    pub generation_timeout_secs: u64,
    /// Where recorded WAV files are saved; defaults to the download directory.
    pub save_dir: Option<PathBuf>,
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".into(),
            media_base: "http://localhost:1107".into(),
            tts_placeholder: "Happy New Year, and best wishes to all!".into(),
            camera_device: "/dev/video0".into(),
            generation_timeout_secs: 300,
            save_dir: None,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/digitman/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("digitman");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        let path = Self::path();
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }

    /// Resolved directory for locally saved recordings.
    pub fn save_dir(&self) -> PathBuf {
        self.save_dir
            .clone()
            .unwrap_or_else(|| dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}
