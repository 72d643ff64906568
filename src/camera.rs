use std::fs::File;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("cannot open camera device {device}: {source}")]
    Open {
        device: String,
        source: std::io::Error,
    },
    #[error("camera stream is stopped")]
    Stopped,
    #[error("frame grab failed: {0}")]
    Grab(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One acquired device handle. The handle stays open for the lifetime of the
/// stream so the device cannot be reclaimed underneath an active capture.
#[derive(Debug)]
pub struct Track {
    label: String,
    handle: Option<File>,
}

impl Track {
    /// Release the handle. Returns true only on the call that actually
    /// released it; later calls are no-ops.
    fn stop(&mut self) -> bool {
        self.handle.take().is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }
}

/// A live camera session: device handle acquired on open, released on
/// [`stop`] or drop, whichever comes first. Mirrors the recorder's
/// drop-to-release discipline so an abandoned session never leaks the device.
///
/// [`stop`]: CameraStream::stop
#[derive(Debug)]
pub struct CameraStream {
    device: PathBuf,
    tracks: Vec<Track>,
}

impl CameraStream {
    /// Open the device node and hold its video track.
    pub fn open(device: impl Into<PathBuf>) -> Result<Self, CameraError> {
        let device = device.into();
        let handle = File::open(&device).map_err(|source| CameraError::Open {
            device: device.display().to_string(),
            source,
        })?;
        log::info!("Camera open: {}", device.display());
        Ok(Self {
            tracks: vec![Track {
                label: "video0".into(),
                handle: Some(handle),
            }],
            device,
        })
    }

    /// Grab a single JPEG frame via ffmpeg. The session must still be live.
    pub async fn snapshot(&mut self) -> Result<Vec<u8>, CameraError> {
        if self.is_stopped() {
            return Err(CameraError::Stopped);
        }

        let out = std::env::temp_dir().join(format!(
            "digitman_snapshot_{}.jpg",
            std::process::id()
        ));
        let status = tokio::process::Command::new("ffmpeg")
            .arg("-y")
            .args(["-f", "v4l2"])
            .arg("-i")
            .arg(&self.device)
            .args(["-frames:v", "1"])
            .arg(&out)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await
            .map_err(|e| CameraError::Grab(format!("failed to spawn ffmpeg: {e}")))?;

        if !status.success() {
            return Err(CameraError::Grab(format!("ffmpeg exited with {status}")));
        }

        let bytes = tokio::fs::read(&out).await?;
        let _ = tokio::fs::remove_file(&out).await;
        Ok(bytes)
    }

    /// Stop every live track. Returns how many tracks this call released;
    /// stopping twice releases nothing the second time.
    pub fn stop(&mut self) -> usize {
        let mut released = 0;
        for track in &mut self.tracks {
            if track.stop() {
                log::info!("Stopped camera track {}", track.label);
                released += 1;
            }
        }
        released
    }

    pub fn is_stopped(&self) -> bool {
        self.tracks.iter().all(Track::is_stopped)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.stop();
    }
}
