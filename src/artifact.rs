use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ClientError;

/// `YYYYMMDD_HHMM` token embedded in every generated artifact name. The
/// video-synthesis service names its output after this token, so the client
/// reconstructs result URLs from it instead of waiting for a server-side id.
static TIMESTAMP_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{8}_\d{4}").expect("valid timestamp regex"));

/// File name for a microphone recording, second resolution.
pub fn recorded_wav_name(now: DateTime<Local>) -> String {
    format!("recorded_audio_{}.wav", now.format("%Y%m%d_%H%M%S"))
}

/// File name the synthesis service uses for its output, minute resolution.
pub fn generated_wav_name(now: DateTime<Local>) -> String {
    format!("generated_audio_{}.wav", now.format("%Y%m%d_%H%M"))
}

/// Playable URL for a synthesized audio file. The trailing millisecond query
/// defeats intermediary caching of a name that is only minute-unique.
pub fn generated_audio_url(media_base: &str, now: DateTime<Local>) -> String {
    format!(
        "{}/{}?{}",
        media_base.trim_end_matches('/'),
        generated_wav_name(now),
        now.timestamp_millis()
    )
}

/// Companion image name for an audio artifact: same base name, `.jpg`
/// extension. Accepts either a bare file name or a full URL.
///
/// Invariant: the remote pairing only succeeds when the image name mirrors
/// the current audio artifact's base name, so this is the single place the
/// derivation happens.
pub fn image_name_for(audio: &str) -> String {
    let file = audio.rsplit('/').next().unwrap_or(audio);
    let file = file.split('?').next().unwrap_or(file);
    let base = file.split('.').next().unwrap_or(file);
    format!("{base}.jpg")
}

/// Extract the timestamp token from an artifact name.
pub fn timestamp_token(name: &str) -> Option<&str> {
    TIMESTAMP_TOKEN.find(name).map(|m| m.as_str())
}

/// Expected URL of the synthesized video for a given audio artifact. The
/// service never returns this URL; it is derived from the audio name's
/// timestamp token.
pub fn video_url_for(media_base: &str, audio_name: &str) -> Result<String, ClientError> {
    let token = timestamp_token(audio_name)
        .ok_or_else(|| ClientError::MalformedAudioName(audio_name.to_string()))?;
    Ok(format!(
        "{}/generated_audio_{token}_sig.mp4",
        media_base.trim_end_matches('/')
    ))
}
