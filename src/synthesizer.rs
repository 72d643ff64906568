use chrono::Local;

use crate::artifact;

/// Result of a synthesis request.
///
/// The service writes its output to the media host under a name derived from
/// the submission minute; nothing in the response body identifies the file.
/// The URL and name here are therefore derived from the client clock and are
/// emitted on every attempt. `confirmed` distinguishes a request the service
/// actually acknowledged from one whose outcome is unknown — the file may
/// still exist on the server when the call failed on the way back.
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub audio_url: String,
    pub file_name: String,
    pub confirmed: bool,
}

/// Ask the service to synthesize speech for `text`, falling back to
/// `placeholder` when the text is blank.
pub async fn synthesize(
    client: &reqwest::Client,
    api_base: &str,
    media_base: &str,
    text: &str,
    placeholder: &str,
) -> SynthesisOutcome {
    let tts_text = if text.trim().is_empty() { placeholder } else { text };

    let url = format!("{}/api/generate-audio", api_base.trim_end_matches('/'));
    let confirmed = match client
        .get(&url)
        .query(&[("tts_text", tts_text)])
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            // Body presence is all the contract offers
            match resp.text().await {
                Ok(body) => {
                    log::debug!("Synthesis response: {body}");
                    true
                }
                Err(e) => {
                    log::warn!("Synthesis response unreadable: {e}");
                    false
                }
            }
        }
        Ok(resp) => {
            log::warn!("Synthesis request returned {}", resp.status());
            false
        }
        Err(e) => {
            log::warn!("Synthesis request failed: {e}");
            false
        }
    };

    // Derived from the clock at completion, matching the minute the server
    // stamps its output with. Clock skew between client and server breaks
    // this pairing; the contract offers nothing better to key on.
    let now = Local::now();
    SynthesisOutcome {
        audio_url: artifact::generated_audio_url(media_base, now),
        file_name: artifact::generated_wav_name(now),
        confirmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use regex::Regex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    static GENERATED_NAME: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^generated_audio_\d{8}_\d{4}\.wav$").unwrap());

    #[tokio::test]
    async fn confirmed_outcome_with_timestamped_name_and_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/generate-audio"))
            .and(query_param("tts_text", "hello there"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let outcome = synthesize(&client, &server.uri(), "http://media.local:1107", "hello there", "fallback").await;

        assert!(outcome.confirmed);
        assert!(GENERATED_NAME.is_match(&outcome.file_name));
        let token = artifact::timestamp_token(&outcome.file_name).unwrap();
        assert!(outcome.audio_url.contains(token));
        assert!(outcome
            .audio_url
            .starts_with("http://media.local:1107/generated_audio_"));
    }

    #[tokio::test]
    async fn blank_text_falls_back_to_the_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/generate-audio"))
            .and(query_param("tts_text", "fallback text"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let outcome = synthesize(&client, &server.uri(), "http://m", "   ", "fallback text").await;
        assert!(outcome.confirmed);
    }

    #[tokio::test]
    async fn failed_request_still_yields_the_derived_artifact_unconfirmed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/generate-audio"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let outcome = synthesize(&client, &server.uri(), "http://m", "hi", "fallback").await;

        assert!(!outcome.confirmed);
        assert!(GENERATED_NAME.is_match(&outcome.file_name));
        assert!(!outcome.audio_url.is_empty());
    }
}
