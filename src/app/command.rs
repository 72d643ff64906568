use super::pipeline::{dispatch_audio_upload, dispatch_generation, dispatch_image_upload, dispatch_synthesis};
use super::recording::{start_recording, stop_recording};
use super::state::AppState;
use crate::camera::CameraStream;
use crate::ui;

/// Handle one line of user input. Returns false when the app should quit.
pub async fn handle_command(state: &mut AppState, line: &str) -> bool {
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    match cmd {
        "" => {}
        "record" => start_recording(state),
        "stop" => stop_recording(state),
        "upload" => dispatch_audio_upload(state),
        "say" => dispatch_synthesis(state, rest.to_string()),
        "image" => import_image(state, rest).await,
        "photo" => take_photo(state).await,
        "generate" => dispatch_generation(state),
        "status" => print_status(state),
        "gpu" => println!("{}", ui::dashboard::render(&state.telemetry)),
        "help" => print_help(),
        "quit" | "exit" => return false,
        other => println!("Unknown command {other:?} — try `help`"),
    }
    true
}

/// Import a reference photo from disk, renamed to the derived companion
/// name and auto-uploaded.
async fn import_image(state: &mut AppState, path: &str) {
    if path.is_empty() {
        println!("Usage: image <path-to-photo>");
        return;
    }
    if state.image_name.is_empty() {
        println!("No image name derived yet — record or synthesize audio first");
        return;
    }
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            println!("Using {path} as {}", state.image_name);
            dispatch_image_upload(state, bytes);
        }
        Err(e) => println!("Cannot read {path}: {e}"),
    }
}

/// Snapshot the configured camera, then release the device before the
/// upload goes out.
async fn take_photo(state: &mut AppState) {
    if state.image_name.is_empty() {
        println!("No image name derived yet — record or synthesize audio first");
        return;
    }
    let mut stream = match CameraStream::open(&state.config.camera_device) {
        Ok(stream) => stream,
        Err(e) => {
            log::error!("Camera unavailable: {e}");
            println!("Cannot access the camera: {e}");
            return;
        }
    };

    let shot = stream.snapshot().await;
    stream.stop();

    match shot {
        Ok(bytes) => {
            println!("Captured a frame as {}", state.image_name);
            dispatch_image_upload(state, bytes);
        }
        Err(e) => println!("Snapshot failed: {e}"),
    }
}

fn print_status(state: &AppState) {
    fn show(v: &str) -> &str {
        if v.is_empty() {
            "(none)"
        } else {
            v
        }
    }
    println!("audio:  {}", show(&state.audio_name));
    println!("url:    {}", show(&state.audio_url));
    println!("image:  {}", show(&state.image_name));
    println!("job:    {}", state.job.label());
    if let Some(url) = &state.job.video_url {
        println!("video:  {url}");
    }
}

fn print_help() {
    println!(
        "\
commands:
  record          start recording the voice template
  stop            stop recording, save the WAV, and upload it
  upload          re-upload the last recording
  say <text>      synthesize speech for <text> (placeholder when empty)
  image <path>    upload a reference photo from disk
  photo           snapshot the camera and upload the frame
  generate        start the digital-human video job
  status          show artifact names and job state
  gpu             render the GPU telemetry dashboard
  quit            exit"
    );
}
