use std::time::Duration;

use serde::Deserialize;

use crate::artifact;
use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct JobReply {
    #[serde(default)]
    error: Option<String>,
}

/// Start a video-synthesis job for a paired audio/image artifact and return
/// the URL the result will appear under.
///
/// The job endpoint only acknowledges acceptance; it neither returns the
/// result location nor offers status polling. On acceptance the expected URL
/// is built from the audio name's timestamp token, whatever the body says.
/// The whole exchange races `timeout` client-side; there is no retry.
pub async fn request_video(
    client: &reqwest::Client,
    api_base: &str,
    media_base: &str,
    audio_name: &str,
    image_name: &str,
    timeout: Duration,
) -> Result<String, ClientError> {
    // Validation failure must not issue the request at all
    if audio_name.is_empty() || image_name.is_empty() {
        return Err(ClientError::MissingArtifact);
    }

    let url = format!("{}/api/call-gradio-api", api_base.trim_end_matches('/'));
    let request = client
        .post(&url)
        .query(&[("audio_name", audio_name), ("image_name", image_name)])
        .send();

    let resp = tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| ClientError::TimedOut(timeout))??;

    if resp.status().is_success() {
        return artifact::video_url_for(media_base, audio_name);
    }

    let status = resp.status();
    match resp.json::<JobReply>().await {
        Ok(JobReply { error: Some(e) }) => Err(ClientError::Rejected(e)),
        _ => Err(ClientError::BadStatus(status)),
    }
}
