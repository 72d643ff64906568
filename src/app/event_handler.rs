use super::state::{AppEvent, AppState, JobStatus};
use crate::telemetry::TelemetrySample;

/// Apply one background event to the application state.
pub fn handle_event(state: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::SynthesisComplete(outcome) => {
            state.set_audio_artifact(&outcome.file_name, &outcome.audio_url);
            if outcome.confirmed {
                println!("Speech synthesized: {}", outcome.audio_url);
            } else {
                // The file may still exist server-side; the outcome is unknown
                println!(
                    "Synthesis submitted but unconfirmed — check the server for {}",
                    outcome.file_name
                );
            }
            println!("Reference image will be named {}", state.image_name);
        }
        AppEvent::UploadFinished {
            kind,
            file_name,
            outcome,
        } => match outcome {
            Ok(msg) => println!("Uploaded {kind} {file_name}: {msg}"),
            Err(e) => {
                log::error!("{kind} upload failed: {e}");
                println!("Upload of {kind} {file_name} failed: {e}");
            }
        },
        AppEvent::GenerationComplete(result) => {
            match result {
                Ok(url) => {
                    state.job.status = JobStatus::Succeeded;
                    state.job.video_url = Some(url.clone());
                    println!("{} — expect it at {url}", state.job.label());
                }
                Err(e) => {
                    state.job.status = JobStatus::Failed;
                    log::error!("Generation failed: {e}");
                    println!("{}: {e}", state.job.label());
                }
            }
        }
        AppEvent::GpuSample(sample) => {
            state.telemetry.push(TelemetrySample::now(sample));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::UploadKind;
    use crate::config::Config;
    use crate::synthesizer::SynthesisOutcome;
    use crate::telemetry::GpuSample;

    fn state() -> AppState {
        let (tx, _rx) = async_channel::unbounded();
        AppState::new(Config::default(), tx)
    }

    #[test]
    fn synthesis_event_installs_the_artifact_pair() {
        let mut s = state();
        handle_event(
            &mut s,
            AppEvent::SynthesisComplete(SynthesisOutcome {
                audio_url: "http://m/generated_audio_20240307_0905.wav?1".into(),
                file_name: "generated_audio_20240307_0905.wav".into(),
                confirmed: true,
            }),
        );
        assert_eq!(s.audio_name, "generated_audio_20240307_0905.wav");
        assert_eq!(s.image_name, "generated_audio_20240307_0905.jpg");
    }

    #[test]
    fn generation_events_drive_the_job_state_machine() {
        let mut s = state();
        s.job.status = JobStatus::Requesting;

        handle_event(
            &mut s,
            AppEvent::GenerationComplete(Ok("http://m/generated_audio_20240101_1200_sig.mp4".into())),
        );
        assert_eq!(s.job.status, JobStatus::Succeeded);
        assert_eq!(
            s.job.video_url.as_deref(),
            Some("http://m/generated_audio_20240101_1200_sig.mp4")
        );

        s.job.status = JobStatus::Requesting;
        handle_event(&mut s, AppEvent::GenerationComplete(Err("boom".into())));
        assert_eq!(s.job.status, JobStatus::Failed);
    }

    #[test]
    fn gpu_samples_land_in_the_bounded_window() {
        let mut s = state();
        let cap = s.config.telemetry.window.unwrap();
        for i in 0..cap + 5 {
            handle_event(
                &mut s,
                AppEvent::GpuSample(GpuSample {
                    utilization: i as f64,
                    ..GpuSample::default()
                }),
            );
        }
        assert_eq!(s.telemetry.len(), cap);
        assert_eq!(s.telemetry.latest().unwrap().gpu.utilization, (cap + 4) as f64);
    }

    #[test]
    fn upload_failure_leaves_artifact_state_untouched() {
        let mut s = state();
        s.set_audio_artifact("recorded_audio_20240101_120000.wav", "");
        handle_event(
            &mut s,
            AppEvent::UploadFinished {
                kind: UploadKind::Audio,
                file_name: "recorded_audio_20240101_120000.wav".into(),
                outcome: Err("network down".into()),
            },
        );
        assert_eq!(s.audio_name, "recorded_audio_20240101_120000.wav");
        assert_eq!(s.image_name, "recorded_audio_20240101_120000.jpg");
    }
}
