use std::time::Duration;

use thiserror::Error;

/// Errors from the remote-service client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Both artifact names are required before a video job can be started.
    #[error("audio and image file names must both be provided")]
    MissingArtifact,

    /// The audio file name carries no `YYYYMMDD_HHMM` token to build the
    /// result video URL from.
    #[error("no timestamp token in audio file name {0:?}")]
    MalformedAudioName(String),

    /// The service answered 2xx but reported failure in its body.
    #[error("service rejected the request: {0}")]
    Rejected(String),

    #[error("unexpected status {0} from service")]
    BadStatus(reqwest::StatusCode),

    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
