use std::time::Duration;

use super::state::{AppEvent, AppState, GenerationJob, JobStatus, UploadKind};
use crate::telemetry::GpuSample;
use crate::{generator, synthesizer, telemetry, uploader};

/// Request speech synthesis on a background task.
pub fn dispatch_synthesis(state: &AppState, text: String) {
    let client = state.client.clone();
    let api_base = state.config.api_base.clone();
    let media_base = state.config.media_base.clone();
    let placeholder = state.config.tts_placeholder.clone();
    let events = state.events.clone();

    tokio::spawn(async move {
        let outcome =
            synthesizer::synthesize(&client, &api_base, &media_base, &text, &placeholder).await;
        let _ = events.send(AppEvent::SynthesisComplete(outcome)).await;
    });
}

/// Upload the current recording. Re-invoking re-uploads unconditionally.
pub fn dispatch_audio_upload(state: &AppState) {
    let Some(recorded) = state.recorded.clone() else {
        println!("No recorded audio to upload — use `record` first");
        return;
    };
    let client = state.client.clone();
    let api_base = state.config.api_base.clone();
    let events = state.events.clone();

    tokio::spawn(async move {
        let outcome = uploader::upload_audio(&client, &api_base, &recorded.file_name, recorded.wav)
            .await
            .map_err(|e| e.to_string());
        let _ = events
            .send(AppEvent::UploadFinished {
                kind: UploadKind::Audio,
                file_name: recorded.file_name,
                outcome,
            })
            .await;
    });
}

/// Upload reference-image bytes under the derived companion name.
pub fn dispatch_image_upload(state: &AppState, bytes: Vec<u8>) {
    if state.image_name.is_empty() {
        println!("No image name derived yet — record or synthesize audio first");
        return;
    }
    let file_name = state.image_name.clone();
    let client = state.client.clone();
    let api_base = state.config.api_base.clone();
    let events = state.events.clone();

    tokio::spawn(async move {
        let outcome = uploader::upload_image(&client, &api_base, &file_name, bytes)
            .await
            .map_err(|e| e.to_string());
        let _ = events
            .send(AppEvent::UploadFinished {
                kind: UploadKind::Image,
                file_name,
                outcome,
            })
            .await;
    });
}

/// Trigger the remote video-synthesis job for the current artifact pair.
pub fn dispatch_generation(state: &mut AppState) {
    if state.audio_name.is_empty() || state.image_name.is_empty() {
        println!("Audio and image file names must both be provided before generating");
        return;
    }

    state.job = GenerationJob {
        audio_name: state.audio_name.clone(),
        image_name: state.image_name.clone(),
        status: JobStatus::Requesting,
        video_url: None,
    };
    println!("{}", state.job.label());

    let client = state.client.clone();
    let api_base = state.config.api_base.clone();
    let media_base = state.config.media_base.clone();
    let audio_name = state.audio_name.clone();
    let image_name = state.image_name.clone();
    let timeout = Duration::from_secs(state.config.generation_timeout_secs);
    let events = state.events.clone();

    tokio::spawn(async move {
        let result = generator::request_video(
            &client,
            &api_base,
            &media_base,
            &audio_name,
            &image_name,
            timeout,
        )
        .await
        .map_err(|e| e.to_string());
        let _ = events.send(AppEvent::GenerationComplete(result)).await;
    });
}

/// Start the GPU telemetry feed. The feed and its forwarder both wind down
/// when the app-side event channel closes, so teardown happens exactly once.
pub fn spawn_telemetry(state: &AppState) {
    let client = state.client.clone();
    let mode = state.config.telemetry.mode;
    let api_base = state.config.api_base.clone();
    let interval = Duration::from_millis(state.config.telemetry.poll_interval_ms);
    let events = state.events.clone();

    let (tx, rx) = async_channel::bounded::<GpuSample>(32);

    tokio::spawn(async move {
        if let Err(e) = telemetry::run_feed(client, mode, api_base, interval, tx).await {
            log::warn!("Telemetry feed failed: {e}");
        }
    });

    tokio::spawn(async move {
        while let Ok(sample) = rx.recv().await {
            if events.send(AppEvent::GpuSample(sample)).await.is_err() {
                break;
            }
        }
    });
}
