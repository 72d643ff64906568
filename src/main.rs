mod app;
mod artifact;
mod camera;
mod config;
mod error;
mod generator;
mod recorder;
mod synthesizer;
mod telemetry;
mod ui;
mod uploader;

use tokio::io::{AsyncBufReadExt, BufReader};

use app::{AppEvent, AppState};
use config::Config;

fn main() {
    env_logger::init();
    log::info!("digitman client starting");

    // block_on rather than spawn: the cpal stream held in AppState is !Send
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(e) = rt.block_on(run()) {
        log::error!("Fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    if let Err(e) = config.save() {
        log::warn!("Failed to write config: {e}");
    }
    log::info!(
        "API at {}, media at {}, telemetry {:?}",
        config.api_base,
        config.media_base,
        config.telemetry.mode
    );

    let (events_tx, events_rx) = async_channel::unbounded::<AppEvent>();
    let mut state = AppState::new(config, events_tx);
    app::spawn_telemetry(&state);

    println!("digitman — digital-human generation client (`help` for commands)");
    println!("Voice template line: \"I am recording a voice template.\"");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events_rx.recv() => match event {
                Ok(event) => app::handle_event(&mut state, event),
                Err(_) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !app::handle_command(&mut state, line.trim()).await {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    log::info!("digitman client exiting");
    Ok(())
}
