mod command;
mod event_handler;
mod pipeline;
mod recording;
mod state;

pub use command::handle_command;
pub use event_handler::handle_event;
pub use pipeline::spawn_telemetry;
pub use state::{AppEvent, AppState};
