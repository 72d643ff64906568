use serde::Deserialize;

use crate::error::ClientError;

/// `{success, message|error}` envelope shared by both upload endpoints.
#[derive(Debug, Deserialize)]
struct UploadReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Upload a recorded WAV as multipart field `file`.
/// Re-invoking re-uploads unconditionally; the store keeps the last copy.
pub async fn upload_audio(
    client: &reqwest::Client,
    api_base: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String, ClientError> {
    upload(
        client,
        &format!("{}/api/upload-audio", api_base.trim_end_matches('/')),
        "file",
        file_name,
        "audio/wav",
        bytes,
    )
    .await
}

/// Upload the reference photo as multipart field `image_file`.
pub async fn upload_image(
    client: &reqwest::Client,
    api_base: &str,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String, ClientError> {
    upload(
        client,
        &format!(
            "{}/api/upload-audio-and-image",
            api_base.trim_end_matches('/')
        ),
        "image_file",
        file_name,
        "image/jpeg",
        bytes,
    )
    .await
}

async fn upload(
    client: &reqwest::Client,
    url: &str,
    field: &'static str,
    file_name: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<String, ClientError> {
    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime)?;
    let form = reqwest::multipart::Form::new().part(field, part);

    let resp = client.post(url).multipart(form).send().await?;
    if !resp.status().is_success() {
        return Err(ClientError::BadStatus(resp.status()));
    }

    let reply: UploadReply = resp.json().await?;
    if reply.success {
        Ok(reply.message.unwrap_or_else(|| "uploaded".into()))
    } else {
        Err(ClientError::Rejected(
            reply.error.unwrap_or_else(|| "unknown error".into()),
        ))
    }
}
