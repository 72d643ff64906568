use chrono::Local;

use super::pipeline::dispatch_audio_upload;
use super::state::{AppState, RecordedAudio};
use crate::{artifact, recorder};

/// Start capturing microphone audio. Starting over an active capture
/// discards whatever the previous one buffered.
pub fn start_recording(state: &mut AppState) {
    if state.recorder.is_recording() {
        println!("Already recording — restarting discards the buffered audio");
    }
    match state.recorder.start() {
        Ok(()) => println!("Recording... say the voice-template line, then `stop`"),
        Err(e) => {
            log::error!("Failed to start recording: {e}");
            println!("Mic error: {e}");
        }
    }
}

/// Stop capturing, assemble the WAV, save it locally, and auto-upload it.
pub fn stop_recording(state: &mut AppState) {
    if !state.recorder.is_recording() {
        println!("Not recording");
        return;
    }

    let samples = state.recorder.stop();
    let sample_rate = state.recorder.sample_rate();
    if samples.is_empty() {
        println!("No audio captured");
        return;
    }
    log::info!(
        "Captured {} samples ({:.1}s at {}Hz)",
        samples.len(),
        samples.len() as f32 / sample_rate as f32,
        sample_rate
    );

    let wav = match recorder::samples_to_wav(&samples, sample_rate) {
        Ok(wav) => wav,
        Err(e) => {
            log::error!("WAV assembly failed: {e}");
            println!("Recording error: {e}");
            return;
        }
    };

    let file_name = artifact::recorded_wav_name(Local::now());
    let dir = state.config.save_dir();
    let path = dir.join(&file_name);
    if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| std::fs::write(&path, &wav)) {
        // Local save is a convenience copy; the upload still proceeds
        log::warn!("Could not save recording to {}: {e}", path.display());
    } else {
        println!("Saved {}", path.display());
    }

    state.set_audio_artifact(&file_name, "");
    state.recorded = Some(RecordedAudio { file_name, wav, path });
    dispatch_audio_upload(state);
}
