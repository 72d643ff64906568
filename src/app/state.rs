use std::fmt;
use std::path::PathBuf;

use crate::artifact;
use crate::config::Config;
use crate::recorder::Recorder;
use crate::synthesizer::SynthesisOutcome;
use crate::telemetry::{GpuSample, RollingWindow, TelemetrySample};

/// Events sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum AppEvent {
    SynthesisComplete(SynthesisOutcome),
    UploadFinished {
        kind: UploadKind,
        file_name: String,
        outcome: Result<String, String>,
    },
    GenerationComplete(Result<String, String>),
    GpuSample(GpuSample),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Audio,
    Image,
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadKind::Audio => write!(f, "audio"),
            UploadKind::Image => write!(f, "image"),
        }
    }
}

/// Video-synthesis job lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

/// One remote video-synthesis request and its expected result.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub audio_name: String,
    pub image_name: String,
    pub status: JobStatus,
    pub video_url: Option<String>,
}

impl GenerationJob {
    pub fn idle() -> Self {
        Self {
            audio_name: String::new(),
            image_name: String::new(),
            status: JobStatus::Idle,
            video_url: None,
        }
    }

    /// Status label, driven by the requesting flag and URL arrival only.
    /// The service offers no completion signal to check against.
    pub fn label(&self) -> &'static str {
        match self.status {
            JobStatus::Idle => "video not generated",
            JobStatus::Requesting => "video generating, please wait...",
            JobStatus::Succeeded => "video generated",
            JobStatus::Failed => "video generation failed",
        }
    }
}

/// A finished microphone recording, kept for (re-)upload.
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    pub file_name: String,
    pub wav: Vec<u8>,
    pub path: PathBuf,
}

/// Central application state, owned by the main event loop.
pub struct AppState {
    pub config: Config,
    pub client: reqwest::Client,
    pub recorder: Recorder,
    pub recorded: Option<RecordedAudio>,
    pub audio_name: String,
    pub audio_url: String,
    pub image_name: String,
    pub job: GenerationJob,
    pub telemetry: RollingWindow<TelemetrySample>,
    pub events: async_channel::Sender<AppEvent>,
}

impl AppState {
    pub fn new(config: Config, events: async_channel::Sender<AppEvent>) -> Self {
        let telemetry = RollingWindow::new(config.telemetry.window);
        Self {
            config,
            client: reqwest::Client::new(),
            recorder: Recorder::new(),
            recorded: None,
            audio_name: String::new(),
            audio_url: String::new(),
            image_name: String::new(),
            job: GenerationJob::idle(),
            telemetry,
            events,
        }
    }

    /// Install a new audio artifact. The companion image name is derived
    /// here and nowhere else, so it always mirrors the current audio name.
    pub fn set_audio_artifact(&mut self, file_name: &str, url: &str) {
        self.audio_name = file_name.to_string();
        self.audio_url = url.to_string();
        self.image_name = artifact::image_name_for(file_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        let (tx, _rx) = async_channel::unbounded();
        AppState::new(Config::default(), tx)
    }

    #[test]
    fn audio_artifact_keeps_image_name_in_sync() {
        let mut s = state();
        s.set_audio_artifact("recorded_audio_20240101_120000.wav", "");
        assert_eq!(s.image_name, "recorded_audio_20240101_120000.jpg");

        s.set_audio_artifact("generated_audio_20240307_0905.wav", "http://m/x.wav?1");
        assert_eq!(s.image_name, "generated_audio_20240307_0905.jpg");
    }

    #[test]
    fn job_labels_follow_the_loading_flag_and_url_arrival() {
        let mut job = GenerationJob::idle();
        assert_eq!(job.label(), "video not generated");
        job.status = JobStatus::Requesting;
        assert_eq!(job.label(), "video generating, please wait...");
        job.status = JobStatus::Succeeded;
        job.video_url = Some("http://m/v.mp4".into());
        assert_eq!(job.label(), "video generated");
        job.status = JobStatus::Failed;
        assert_eq!(job.label(), "video generation failed");
    }
}
